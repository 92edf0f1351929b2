use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};

use crate::scoring::university::UniversityTable;
use crate::scoring::{score_candidate, Scores};

/// Highest degree a candidate holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EducationLevel {
    #[default]
    Unspecified,
    Bachelor,
    Master,
    Doctorate,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::Unspecified => "",
            EducationLevel::Bachelor => "bachelor",
            EducationLevel::Master => "master",
            EducationLevel::Doctorate => "doctorate",
        }
    }

    /// Accepts the English labels and the Chinese labels resumes are written with.
    /// Anything else is treated as unspecified.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "bachelor" | "本科" => EducationLevel::Bachelor,
            "master" | "硕士" => EducationLevel::Master,
            "doctorate" | "phd" | "博士" => EducationLevel::Doctorate,
            _ => EducationLevel::Unspecified,
        }
    }
}

/// Position the candidate applied for; selects the technical rule set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobPosition {
    #[default]
    Unspecified,
    FrontEnd,
    BackEnd,
    Operations,
    Embedded,
    Algorithm,
}

impl JobPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPosition::Unspecified => "",
            JobPosition::FrontEnd => "frontend",
            JobPosition::BackEnd => "backend",
            JobPosition::Operations => "operations",
            JobPosition::Embedded => "embedded",
            JobPosition::Algorithm => "algorithm",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "frontend" | "front-end" | "前端" => JobPosition::FrontEnd,
            "backend" | "back-end" | "后端" => JobPosition::BackEnd,
            "operations" | "devops" | "运维" => JobPosition::Operations,
            "embedded" | "嵌入式" => JobPosition::Embedded,
            "algorithm" | "算法" => JobPosition::Algorithm,
            _ => JobPosition::Unspecified,
        }
    }
}

macro_rules! label_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let label = Option::<String>::deserialize(deserializer)?;
                Ok(label.map(|l| <$ty>::from_label(&l)).unwrap_or_default())
            }
        }
    };
}

label_serde!(EducationLevel);
label_serde!(JobPosition);

/// Model output sometimes carries `null` for fields it could not find.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A candidate record. Keyed by phone number.
///
/// The four score fields are derived: they are recomputed by [`Candidate::rescore`]
/// and whatever a client or the model sends for them is discarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Candidate {
    #[serde(deserialize_with = "null_as_default")]
    pub phone: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub age: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    pub education: EducationLevel,
    #[serde(deserialize_with = "null_as_default")]
    pub major: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub years: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub blog: String,
    #[serde(deserialize_with = "null_as_default")]
    pub github: String,
    #[serde(deserialize_with = "null_as_default")]
    pub native: String,
    #[serde(deserialize_with = "null_as_default")]
    pub universities: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub companies: Vec<String>,
    pub job_position: JobPosition,
    #[serde(deserialize_with = "null_as_default")]
    pub expect_cities: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub expect_salary: i64,
    pub experience_score: f64,
    pub education_score: f64,
    pub technical_score: f64,
    pub average_score: f64,
    pub resume_path: String,
    pub hash: String,
    pub interview_record: String,
}

impl Candidate {
    pub fn scores(&self) -> Scores {
        Scores {
            experience: self.experience_score,
            education: self.education_score,
            technical: self.technical_score,
            average: self.average_score,
        }
    }

    pub fn apply_scores(&mut self, scores: Scores) {
        self.experience_score = scores.experience;
        self.education_score = scores.education;
        self.technical_score = scores.technical;
        self.average_score = scores.average;
    }

    /// Recomputes all derived scores from the candidate's current fields.
    pub fn rescore(&mut self, universities: &UniversityTable) {
        let scores = score_candidate(self, universities);
        self.apply_scores(scores);
    }
}

impl<'r> FromRow<'r, SqliteRow> for Candidate {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let education: String = row.try_get("education")?;
        let job_position: String = row.try_get("job_position")?;
        let Json(skills) = row.try_get::<Json<Vec<String>>, _>("skills")?;
        let Json(universities) = row.try_get::<Json<Vec<String>>, _>("universities")?;
        let Json(companies) = row.try_get::<Json<Vec<String>>, _>("companies")?;
        let Json(expect_cities) = row.try_get::<Json<Vec<String>>, _>("expect_cities")?;

        Ok(Candidate {
            phone: row.try_get("phone")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            email: row.try_get("email")?,
            education: EducationLevel::from_label(&education),
            major: row.try_get("major")?,
            skills,
            years: row.try_get("years")?,
            blog: row.try_get("blog")?,
            github: row.try_get("github")?,
            native: row.try_get("native")?,
            universities,
            companies,
            job_position: JobPosition::from_label(&job_position),
            expect_cities,
            expect_salary: row.try_get("expect_salary")?,
            experience_score: row.try_get("experience_score")?,
            education_score: row.try_get("education_score")?,
            technical_score: row.try_get("technical_score")?,
            average_score: row.try_get("average_score")?,
            resume_path: row.try_get("resume_path")?,
            hash: row.try_get("hash")?,
            interview_record: row.try_get("interview_record")?,
        })
    }
}

/// Merge-style update body for `PUT /talent/:id`. Absent fields are left as they are.
///
/// The phone number, scores and file linkage are not patchable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub education: Option<EducationLevel>,
    pub major: Option<String>,
    pub skills: Option<Vec<String>>,
    pub years: Option<i32>,
    pub blog: Option<String>,
    pub github: Option<String>,
    pub native: Option<String>,
    pub universities: Option<Vec<String>>,
    pub companies: Option<Vec<String>>,
    pub job_position: Option<JobPosition>,
    pub expect_cities: Option<Vec<String>>,
    pub expect_salary: Option<i64>,
    pub interview_record: Option<String>,
}

impl CandidatePatch {
    pub fn apply_to(self, candidate: &mut Candidate) {
        macro_rules! merge {
            ($patch:ident => $target:ident: $($field:ident),* $(,)?) => {
                $(if let Some(value) = $patch.$field {
                    $target.$field = value;
                })*
            };
        }
        let patch = self;
        merge!(
            patch => candidate:
            name,
            age,
            email,
            education,
            major,
            skills,
            years,
            blog,
            github,
            native,
            universities,
            companies,
            job_position,
            expect_cities,
            expect_salary,
            interview_record,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_model_payload() {
        let json = r#"{"name":"张三","age":28,"phone":13800138000,"email":"zs@example.com",
            "education":"硕士","universities":["浙江大学"],"major":"计算机科学与技术",
            "skills":["python","pytorch"],"years":3,"native":"杭州","expectCities":["上海"],
            "expectSalary":30000,"companies":["阿里巴巴"],"blog":"","github":"https://github.com/zs",
            "jobPosition":"算法"}"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.phone, 13800138000);
        assert_eq!(candidate.education, EducationLevel::Master);
        assert_eq!(candidate.job_position, JobPosition::Algorithm);
        assert_eq!(candidate.expect_cities, vec!["上海".to_string()]);
        assert_eq!(candidate.interview_record, "");
    }

    #[test]
    fn test_missing_fields_keep_zero_values() {
        let candidate: Candidate = serde_json::from_str(r#"{"name":"Li"}"#).unwrap();
        assert_eq!(candidate.phone, 0);
        assert!(candidate.skills.is_empty());
        assert_eq!(candidate.education, EducationLevel::Unspecified);
    }

    #[test]
    fn test_unknown_and_null_labels_are_unspecified() {
        let candidate: Candidate =
            serde_json::from_str(r#"{"education":"专科","jobPosition":null}"#).unwrap();
        assert_eq!(candidate.education, EducationLevel::Unspecified);
        assert_eq!(candidate.job_position, JobPosition::Unspecified);
    }

    #[test]
    fn test_labels_serialize_in_english() {
        let candidate = Candidate {
            education: EducationLevel::Doctorate,
            job_position: JobPosition::BackEnd,
            ..Default::default()
        };
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["education"], "doctorate");
        assert_eq!(value["jobPosition"], "backend");
        assert!(value.get("expectSalary").is_some());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut candidate = Candidate {
            phone: 1,
            name: "Old".into(),
            email: "old@example.com".into(),
            skills: vec!["go".into()],
            ..Default::default()
        };
        let patch: CandidatePatch =
            serde_json::from_str(r#"{"name":"New","skills":["rust","go"],"phone":99}"#).unwrap();
        patch.apply_to(&mut candidate);
        assert_eq!(candidate.name, "New");
        assert_eq!(candidate.email, "old@example.com");
        assert_eq!(candidate.skills, vec!["rust".to_string(), "go".to_string()]);
        assert_eq!(candidate.phone, 1);
    }
}
