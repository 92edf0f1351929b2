//! Candidate Extraction — resume text in, structured [`Candidate`] out.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::candidates::models::Candidate;
use crate::extraction::prompts::candidate_extraction_prompt;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, ChatModel, LlmError};

pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum CandidateExtractionError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model response contained no JSON object")]
    NoJson,

    #[error("model response did not match the candidate schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no phone number found in resume (got {0})")]
    MissingPhone(i64),
}

#[derive(Clone)]
pub struct CandidateExtractor {
    model: Arc<dyn ChatModel>,
}

impl CandidateExtractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Asks the model for the candidate behind `resume_text`.
    ///
    /// Every failure (call, missing object, schema mismatch) costs one of
    /// [`MAX_ATTEMPTS`]; the last error is returned once they run out.
    /// Scores on the returned candidate are not computed yet.
    pub async fn extract(&self, resume_text: &str) -> Result<Candidate, CandidateExtractionError> {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let prompt = candidate_extraction_prompt(&today, resume_text);

        let mut last_error = CandidateExtractionError::NoJson;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(&prompt).await {
                Ok(candidate) => {
                    debug!(attempt, phone = candidate.phone, "candidate extracted");
                    return Ok(candidate);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "candidate extraction attempt failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn attempt(&self, prompt: &str) -> Result<Candidate, CandidateExtractionError> {
        let response = self.model.complete(prompt, JSON_ONLY_SYSTEM).await?;
        let object = extract_json_object(&response).ok_or(CandidateExtractionError::NoJson)?;
        let mut candidate: Candidate = serde_json::from_value(object)?;
        // Derived and storage-owned fields never come from the model.
        candidate.apply_scores(Default::default());
        candidate.resume_path.clear();
        candidate.hash.clear();
        candidate.interview_record.clear();
        Ok(candidate)
    }
}

/// Finds the first complete JSON object in free-form model output.
///
/// Code fences are stripped, then a JSON parser is started at each `{` in
/// turn; the first start position that parses as an object wins.
pub fn extract_json_object(response: &str) -> Option<Value> {
    let text = strip_json_fences(response);
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value @ Value::Object(_))) => Some(value),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::candidates::models::{EducationLevel, JobPosition};

    /// Replays canned responses in order.
    struct ScriptedModel {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::default(),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }

    #[test]
    fn test_extract_json_object_handles_nested_braces() {
        let response = r#"{"name":"Li","meta":{"a":{"b":1}},"skills":["go"]}"#;
        let value = extract_json_object(response).unwrap();
        assert_eq!(value["meta"]["a"]["b"], 1);
        assert_eq!(value["skills"][0], "go");
    }

    #[test]
    fn test_extract_json_object_skips_prose_and_fences() {
        let response = "Sure! {not json} here it is:\n```json\n{\"name\": \"王五\", \"age\": 30}\n```\nDone.";
        let value = extract_json_object(response).unwrap();
        assert_eq!(value, json!({"name": "王五", "age": 30}));
    }

    #[test]
    fn test_extract_json_object_none_without_object() {
        assert!(extract_json_object("I could not read this resume.").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("{\"truncated\": ").is_none());
    }

    #[tokio::test]
    async fn test_extract_parses_candidate_and_ignores_scores() {
        let model = ScriptedModel::new(vec![Ok(r#"{"name":"张三","phone":13800138000,
            "education":"硕士","jobPosition":"后端","skills":["rust"],
            "averageScore":9.9,"hash":"forged"}"#
            .to_string())]);
        let extractor = CandidateExtractor::new(model.clone());

        let candidate = extractor.extract("/tmp/cv.pdf\nresume").await.unwrap();
        assert_eq!(candidate.name, "张三");
        assert_eq!(candidate.phone, 13800138000);
        assert_eq!(candidate.education, EducationLevel::Master);
        assert_eq!(candidate.job_position, JobPosition::BackEnd);
        assert_eq!(candidate.average_score, 0.0);
        assert_eq!(candidate.hash, "");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("/tmp/cv.pdf\nresume"));
        assert!(!prompts[0].contains("{today}"));
    }

    #[tokio::test]
    async fn test_extract_retries_until_valid_json() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::EmptyContent),
            Ok("no json here".to_string()),
            Ok(r#"{"name":"Li","age":25}"#.to_string()),
        ]);
        let extractor = CandidateExtractor::new(model.clone());

        let candidate = extractor.extract("text").await.unwrap();
        assert_eq!(candidate.name, "Li");
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_extract_gives_up_after_three_attempts() {
        let model = ScriptedModel::new(vec![
            Ok("nothing".to_string()),
            Ok("still nothing".to_string()),
            Ok(r#"{"age":"not a number"}"#.to_string()),
            Ok(r#"{"name":"too late"}"#.to_string()),
        ]);
        let extractor = CandidateExtractor::new(model.clone());

        let err = extractor.extract("text").await.unwrap_err();
        assert!(matches!(err, CandidateExtractionError::Json(_)), "got {err:?}");
        assert_eq!(model.calls(), 3);
    }
}
