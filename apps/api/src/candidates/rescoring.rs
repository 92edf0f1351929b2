//! Bulk rescoring: recompute every stored candidate's scores and report what moved.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::candidates::models::Candidate;
use crate::candidates::store;
use crate::scoring::university::UniversityTable;
use crate::scoring::{score_candidate, Scores};

/// Average-score changes at or below this are not written back.
pub const CHANGE_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreChange {
    /// The candidate with its recomputed scores.
    pub talent: Candidate,
    pub old_avg_score: f64,
    pub new_avg_score: f64,
    pub score_diff: f64,
    pub old_exp_score: f64,
    pub new_exp_score: f64,
    pub old_edu_score: f64,
    pub new_edu_score: f64,
    pub old_tech_score: f64,
    pub new_tech_score: f64,
}

impl ScoreChange {
    fn new(talent: Candidate, old: Scores, new: Scores) -> Self {
        Self {
            talent,
            old_avg_score: old.average,
            new_avg_score: new.average,
            score_diff: new.average - old.average,
            old_exp_score: old.experience,
            new_exp_score: new.experience,
            old_edu_score: old.education,
            new_edu_score: new.education,
            old_tech_score: old.technical,
            new_tech_score: new.technical,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RescoreReport {
    pub message: String,
    pub total_count: usize,
    pub updated_count: usize,
    pub no_change_count: usize,
    pub score_changes: Vec<ScoreChange>,
    /// Mean absolute change over updated candidates.
    pub average_change: f64,
    /// Largest change by magnitude, with its sign.
    pub maximum_change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_talent: Option<Candidate>,
}

/// Recomputes every candidate, persisting those whose average moved by more
/// than [`CHANGE_EPSILON`]. All writes share one transaction.
pub async fn rescore_all(
    pool: &SqlitePool,
    universities: &UniversityTable,
) -> Result<RescoreReport, sqlx::Error> {
    let candidates = store::list_all(pool).await?;

    let mut changes = Vec::new();
    let mut updates = Vec::new();
    let total_count = candidates.len();
    for mut candidate in candidates {
        let old = candidate.scores();
        let new = score_candidate(&candidate, universities);
        if (new.average - old.average).abs() > CHANGE_EPSILON {
            updates.push((candidate.phone, new));
            candidate.apply_scores(new);
            changes.push(ScoreChange::new(candidate, old, new));
        }
    }

    if !updates.is_empty() {
        let mut tx = pool.begin().await?;
        for (phone, scores) in updates {
            store::update_scores(&mut *tx, phone, scores).await?;
        }
        tx.commit().await?;
    }

    let report = summarize(total_count, changes);
    info!(
        total = report.total_count,
        updated = report.updated_count,
        "bulk rescoring complete"
    );
    Ok(report)
}

fn summarize(total_count: usize, score_changes: Vec<ScoreChange>) -> RescoreReport {
    let updated_count = score_changes.len();

    let average_change = if updated_count == 0 {
        0.0
    } else {
        score_changes.iter().map(|c| c.score_diff.abs()).sum::<f64>() / updated_count as f64
    };

    let largest = score_changes.iter().fold(None::<&ScoreChange>, |best, change| match best {
        Some(best) if best.score_diff.abs() >= change.score_diff.abs() => Some(best),
        _ => Some(change),
    });
    let maximum_change = largest.map_or(0.0, |change| change.score_diff);
    let maximum_talent = largest.map(|change| change.talent.clone());

    RescoreReport {
        message: format!("Recalculated scores for {total_count} candidates, {updated_count} changed"),
        total_count,
        updated_count,
        no_change_count: total_count - updated_count,
        score_changes,
        average_change,
        maximum_change,
        maximum_talent,
    }
}
