//! Resume → candidate extraction: PDF text first, then the language model.

pub mod candidate;
pub mod prompts;
pub mod text;

pub use candidate::{CandidateExtractionError, CandidateExtractor};
pub use text::{ExtractionError, LocalPdfExtractor, TextExtractor, TikaClient};
