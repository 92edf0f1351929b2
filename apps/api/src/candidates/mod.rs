//! Candidate records: model, persistence, bulk rescoring and HTTP handlers.

pub mod handlers;
pub mod models;
pub mod rescoring;
pub mod store;
