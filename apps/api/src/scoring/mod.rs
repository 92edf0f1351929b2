//! Scoring Engine — deterministic heuristic scores for a candidate.
//!
//! Three independent sub-scores (experience, education, technical) plus their
//! unweighted mean. Pure functions, no I/O. Rule tables live in [`rules`], the
//! university prestige lookup in [`university`].

pub mod rules;
pub mod university;

use crate::candidates::models::{Candidate, EducationLevel, JobPosition};
use rules::SkillRule;
use university::UniversityTable;

/// Upper bound for the education and technical scores.
pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scores {
    pub experience: f64,
    pub education: f64,
    pub technical: f64,
    pub average: f64,
}

/// Computes every derived score for `candidate`.
pub fn score_candidate(candidate: &Candidate, universities: &UniversityTable) -> Scores {
    let experience = experience_score(&candidate.companies, candidate.years);
    let education = education_score(
        universities,
        &candidate.universities,
        &candidate.major,
        candidate.education,
    );
    let technical = technical_score(
        candidate.job_position,
        &candidate.skills,
        &candidate.blog,
        &candidate.github,
    );
    Scores {
        experience,
        education,
        technical,
        average: average_score(experience, education, technical),
    }
}

/// Rounds to one decimal place.
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// True when any keyword contains any of `values` as a substring.
///
/// The direction matters: the *value* is searched for inside the *keyword*,
/// so the stored skill `java` matches the keyword `javascript`. Empty values
/// never match.
pub fn contains_any<S: AsRef<str>>(values: &[S], keywords: &[&str]) -> bool {
    values.iter().map(AsRef::as_ref).any(|value| {
        !value.is_empty() && keywords.iter().any(|keyword| keyword.contains(value))
    })
}

/// Base 5, raised to the highest matching employer tier, plus tenure bonuses.
/// Not clamped; the maximum reachable value is 10.
pub fn experience_score(companies: &[String], years: i32) -> f64 {
    let companies: Vec<String> = companies.iter().map(|c| c.to_lowercase()).collect();
    let companies: Vec<&str> = companies.iter().map(String::as_str).collect();

    // Tier names are the values here: an employer matches when its name contains one.
    let mut score = rules::EXPERIENCE_BASE;
    if contains_any(rules::TIER_C_EMPLOYERS, &companies) {
        score = rules::TIER_C_LEVEL;
    }
    if contains_any(rules::TIER_B_EMPLOYERS, &companies) {
        score = rules::TIER_B_LEVEL;
    }
    if contains_any(rules::TIER_A_EMPLOYERS, &companies) {
        score = rules::TIER_A_LEVEL;
    }

    let reached = rules::TENURE_THRESHOLDS
        .iter()
        .filter(|&&threshold| years >= threshold)
        .count();
    score + reached as f64 * rules::TENURE_BONUS
}

pub fn education_score(
    table: &UniversityTable,
    universities: &[String],
    major: &str,
    level: EducationLevel,
) -> f64 {
    let mut score = table.composite_score(universities);

    let major = major.to_lowercase();
    if contains_any(rules::TECHNICAL_MAJORS, &[major.as_str()]) {
        score += rules::TECHNICAL_MAJOR_BONUS;
    }
    match level {
        EducationLevel::Master => score += rules::MASTER_BONUS,
        EducationLevel::Doctorate => score += rules::DOCTORATE_BONUS,
        EducationLevel::Bachelor | EducationLevel::Unspecified => {}
    }

    round_score(score.min(MAX_SCORE))
}

pub fn technical_score(position: JobPosition, skills: &[String], blog: &str, github: &str) -> f64 {
    let mut score = rules::TECHNICAL_BASE;

    match position {
        JobPosition::BackEnd => {
            score += apply_rules(rules::BACKEND_RULES, skills);
            score += rules::BACKEND_BREADTH
                .iter()
                .filter(|&&keyword| contains_any(skills, &[keyword]))
                .count() as f64
                * rules::BACKEND_BREADTH_BONUS;
        }
        JobPosition::Algorithm => {
            if !contains_any(skills, &["python"]) {
                return rules::ALGORITHM_WITHOUT_PYTHON;
            }
        }
        JobPosition::FrontEnd => score += apply_rules(rules::FRONTEND_RULES, skills),
        JobPosition::Operations => score += apply_rules(rules::OPERATIONS_RULES, skills),
        JobPosition::Embedded => score += apply_rules(rules::EMBEDDED_RULES, skills),
        JobPosition::Unspecified => {}
    }

    if !blog.is_empty() {
        score += rules::BLOG_BONUS;
    }
    if !github.is_empty() {
        score += rules::GITHUB_BONUS;
    }

    round_score(score).min(MAX_SCORE)
}

pub fn average_score(experience: f64, education: f64, technical: f64) -> f64 {
    round_score((experience + education + technical) / 3.0)
}

fn apply_rules(rules: &[SkillRule], skills: &[String]) -> f64 {
    rules
        .iter()
        .filter(|rule| contains_any(skills, rule.keywords) != rule.required)
        .map(|rule| rule.points)
        .sum()
}
