//! Matching Engine (C7) — pure, deterministic, CPU-only. No I/O, no
//! randomness, no timestamps: every function here is a total function of
//! its inputs so that scoring can be unit-tested without a database or LLM.
//!
//! Two stages, run in order by callers (fan-out, bulk orchestrator, and the
//! synchronous rerun-matching endpoint all share this same pair of calls):
//! [`prefilter::should_consider`] first, then [`scoring::calculate_match_score`]
//! only for candidates that pass.

pub mod explain;
pub mod normalizer;
pub mod prefilter;
pub mod scoring;

pub use prefilter::should_consider;
pub use scoring::{calculate_match_score, ScoreResult};

use crate::models::candidate_matrix::{CandidateSkill, LocationSignals};
use crate::models::job::{LocationType, SeniorityLevel};
use crate::models::job_matrix::WeightedSkill;

/// Everything the engine needs to know about a candidate, borrowed from the
/// candidate row and its matrix. Deliberately decoupled from the `sqlx`
/// row types so this module has no persistence dependency.
pub struct CandidateProfile<'a> {
    pub headline: Option<&'a str>,
    pub roles: &'a [String],
    pub country: Option<&'a str>,
    pub skills: &'a [CandidateSkill],
    pub domains: &'a [String],
    pub total_years_experience: f64,
    pub location: &'a LocationSignals,
}

impl<'a> CandidateProfile<'a> {
    /// A candidate "looks like" an intern if their headline or any role
    /// mentions one of the intern-shaped tokens (§4.7.1, glossary).
    pub fn is_intern_shaped(&self) -> bool {
        const TOKENS: &[&str] = &["intern", "internship", "trainee", "apprentice", "student"];
        let haystacks = self.headline.into_iter().chain(self.roles.iter().map(String::as_str));
        haystacks.flat_map(|h| {
            let lower = h.to_lowercase();
            TOKENS.iter().map(move |t| lower.contains(t)).collect::<Vec<_>>()
        }).any(|hit| hit)
    }

    /// Non-soft-skill candidate skills, the pool every match/weight
    /// computation draws from.
    pub fn technical_skills(&self) -> Vec<&CandidateSkill> {
        self.skills
            .iter()
            .filter(|s| !normalizer::is_soft_skill(&s.name))
            .collect()
    }
}

/// Everything the engine needs to know about a job, borrowed from the job
/// row and its matrix.
pub struct JobProfile<'a> {
    pub title: &'a str,
    pub department: Option<&'a str>,
    pub description: &'a str,
    pub country: Option<&'a str>,
    pub location_type: LocationType,
    pub min_years_experience: f64,
    pub seniority_level: SeniorityLevel,
    pub required_skills: &'a [WeightedSkill],
    pub preferred_skills: &'a [WeightedSkill],
    pub experience_weight: i32,
    pub location_weight: i32,
    pub domain_weight: i32,
}

impl<'a> JobProfile<'a> {
    /// An internship job is one with no experience floor at all (§4.7.1).
    pub fn is_internship(&self) -> bool {
        self.min_years_experience == 0.0
    }

    pub fn skills_weight(&self) -> i32 {
        100 - self.experience_weight - self.location_weight - self.domain_weight
    }
}

/// A required/preferred skill matches a candidate's pool when its
/// normalized form, its original-lowercase form, or SQL-family
/// compatibility lines up with any candidate skill (§4.7.1, §4.7.2).
pub fn candidate_matches_skill(candidate_skills: &[&CandidateSkill], requirement: &str) -> bool {
    let req_norm = normalizer::normalize(requirement);
    let req_lower = requirement.to_lowercase();
    candidate_skills.iter().any(|cs| {
        cs_matches(&cs.name, &req_norm, &req_lower) || normalizer::are_sql_compatible(&cs.name, requirement)
    })
}

fn cs_matches(candidate_skill: &str, req_norm: &str, req_lower: &str) -> bool {
    normalizer::normalize(candidate_skill) == req_norm || candidate_skill.to_lowercase() == *req_lower
}

/// `weight · 0.3` for generic-tech skills (git, office suite, OS names, …),
/// otherwise the raw weight. Used throughout skills scoring (§4.7.2).
pub fn effective_weight(skill_name: &str, weight: i32) -> f64 {
    let base = weight as f64;
    if normalizer::is_generic_tech_skill(skill_name) {
        base * 0.3
    } else {
        base
    }
}
