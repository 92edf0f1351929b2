//! University prestige table.
//!
//! Raw prestige metrics come from an embedded ranking dataset and are remapped
//! onto 0–8 with a fixed three-segment piecewise-linear curve.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

const EMBEDDED_DATASET: &str = include_str!("../../data/universities.json");

/// Score for a university that is not in the table, and for an empty list.
pub const UNKNOWN_UNIVERSITY_SCORE: f64 = 0.1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniversityRecord {
    name_cn: String,
    #[serde(default)]
    name_en: Option<String>,
    score: f64,
}

/// Read-only name → raw metric lookup, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct UniversityTable {
    raw: HashMap<String, f64>,
}

impl UniversityTable {
    /// Loads the dataset compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_DATASET).context("embedded university dataset is malformed")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<UniversityRecord> = serde_json::from_str(json)?;
        let mut raw = HashMap::with_capacity(records.len() * 2);
        for record in records {
            raw.insert(record.name_cn.trim().to_string(), record.score);
            if let Some(name_en) = record.name_en {
                raw.insert(name_en.trim().to_lowercase(), record.score);
            }
        }
        Ok(Self { raw })
    }

    #[cfg(test)]
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        Self {
            raw: entries
                .into_iter()
                .map(|(name, score)| (name.trim().to_string(), score))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    fn raw_score(&self, name: &str) -> Option<f64> {
        let name = name.trim();
        self.raw
            .get(name)
            .or_else(|| self.raw.get(&name.to_lowercase()))
            .copied()
    }

    /// Normalized score for one university; unknown names get the 0.1 floor.
    pub fn score(&self, name: &str) -> f64 {
        self.raw_score(name)
            .map(normalize)
            .unwrap_or(UNKNOWN_UNIVERSITY_SCORE)
    }

    /// Best normalized score across `names`, never below the 0.1 floor.
    pub fn composite_score<S: AsRef<str>>(&self, names: &[S]) -> f64 {
        names
            .iter()
            .map(|name| self.score(name.as_ref()))
            .fold(UNKNOWN_UNIVERSITY_SCORE, f64::max)
    }
}

/// Maps a raw prestige metric onto 0–8.
///
/// | raw          | normalized                  |
/// |--------------|-----------------------------|
/// | 0            | 0                           |
/// | (0, 100]     | r / 100                     |
/// | (100, 300]   | 1 + (r - 100) * 5 / 200     |
/// | > 300        | 6 + (r - 300) * 2 / 776.1   |
pub fn normalize(raw: f64) -> f64 {
    if raw <= 0.0 {
        0.0
    } else if raw <= 100.0 {
        raw / 100.0
    } else if raw <= 300.0 {
        1.0 + (raw - 100.0) * 5.0 / 200.0
    } else {
        6.0 + (raw - 300.0) * 2.0 / 776.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bands() {
        assert_eq!(normalize(0.0), 0.0);
        assert!((normalize(50.0) - 0.5).abs() < 1e-9);
        assert!((normalize(100.0) - 1.0).abs() < 1e-9);
        assert!((normalize(150.0) - 2.25).abs() < 1e-9);
        assert!((normalize(300.0) - 6.0).abs() < 1e-9);
        assert!((normalize(1076.1) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_name_gets_floor() {
        let table = UniversityTable::from_entries([("北京大学", 900.0)]);
        assert_eq!(table.score("家里蹲大学"), UNKNOWN_UNIVERSITY_SCORE);
    }

    #[test]
    fn test_known_name_with_zero_metric_scores_zero() {
        let table = UniversityTable::from_entries([("某学院", 0.0)]);
        assert_eq!(table.score("某学院"), 0.0);
        // but the composite never drops below the floor
        assert_eq!(table.composite_score(&["某学院"]), UNKNOWN_UNIVERSITY_SCORE);
    }

    #[test]
    fn test_composite_takes_maximum() {
        let table = UniversityTable::from_entries([("A", 150.0), ("B", 50.0)]);
        assert!((table.composite_score(&["B", "A", "unknown"]) - 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_composite_of_empty_list_is_floor() {
        let table = UniversityTable::default();
        assert_eq!(table.composite_score::<&str>(&[]), UNKNOWN_UNIVERSITY_SCORE);
    }

    #[test]
    fn test_embedded_dataset_loads_both_names() {
        let table = UniversityTable::embedded().unwrap();
        assert!(table.len() > 0);
        let cn = table.score("清华大学");
        assert!(cn > 7.5 && cn <= 8.0, "score was {cn}");
        assert_eq!(table.score(" Tsinghua University "), cn);
        assert_eq!(table.score("tsinghua university"), cn);
    }
}
