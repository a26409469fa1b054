//! Scoring stage of the matching engine (§4.7.2). `calculate_match_score`
//! is total: every branch produces a number in `[0, 100]`, never a panic.

use crate::models::candidate_matrix::CandidateSkill;
use crate::models::job::{LocationType, SeniorityLevel};
use crate::models::job_matrix::WeightedSkill;
use crate::models::match_record::{Gap, MatchBreakdown};

use super::{candidate_matches_skill, effective_weight, explain, normalizer, CandidateProfile, JobProfile};

pub struct ScoreResult {
    pub score: f64,
    pub breakdown: MatchBreakdown,
    pub explanation: String,
    pub gaps: Vec<Gap>,
}

pub fn calculate_match_score(candidate: &CandidateProfile, job: &JobProfile) -> ScoreResult {
    let technical = candidate.technical_skills();
    let skills = skills_subscore(&technical, job);
    let experience = experience_subscore(candidate, job);
    let domain = domain_subscore(candidate, job);
    let location = location_subscore(candidate, job);

    let breakdown = MatchBreakdown {
        skills: skills.value,
        experience,
        domain,
        location,
    };

    let score = if skills.force_zero_total {
        0.0
    } else {
        weighted_final(&breakdown, job)
    };

    let gaps = explain::build_gaps(&technical, &skills.core, &skills.non_core, candidate, job);
    let explanation = explain::build_explanation(score, &breakdown, &gaps);

    ScoreResult { score, breakdown, explanation, gaps }
}

fn weighted_final(breakdown: &MatchBreakdown, job: &JobProfile) -> f64 {
    let skills_weight = job.skills_weight() as f64;
    let total = skills_weight + job.experience_weight as f64 + job.domain_weight as f64 + job.location_weight as f64;
    if total <= 0.0 {
        return 0.0;
    }
    let raw = (breakdown.skills * skills_weight
        + breakdown.experience * job.experience_weight as f64
        + breakdown.domain * job.domain_weight as f64
        + breakdown.location * job.location_weight as f64)
        / total;
    raw.round().clamp(0.0, 100.0)
}

pub(super) struct SkillsResult<'a> {
    pub value: f64,
    pub force_zero_total: bool,
    pub core: Vec<&'a WeightedSkill>,
    pub non_core: Vec<&'a WeightedSkill>,
}

fn partition_core<'a>(required: &'a [WeightedSkill]) -> (Vec<&'a WeightedSkill>, Vec<&'a WeightedSkill>) {
    let n_core = (3usize).max((0.3 * required.len() as f64).ceil() as usize).min(required.len());
    let mut by_weight: Vec<&WeightedSkill> = required.iter().collect();
    by_weight.sort_by(|a, b| b.weight.cmp(&a.weight));
    let core = by_weight[..n_core].to_vec();
    let non_core = by_weight[n_core..].to_vec();
    (core, non_core)
}

struct PartitionStats {
    matched_weight: f64,
    total_weight: f64,
    matched_count: usize,
    total_count: usize,
}

fn partition_stats(partition: &[&WeightedSkill], technical: &[&CandidateSkill]) -> PartitionStats {
    let mut matched_weight = 0.0;
    let mut total_weight = 0.0;
    let mut matched_count = 0usize;
    for s in partition {
        let w = effective_weight(&s.skill, s.weight);
        total_weight += w;
        if candidate_matches_skill(technical, &s.skill) {
            matched_weight += w;
            matched_count += 1;
        }
    }
    PartitionStats { matched_weight, total_weight, matched_count, total_count: partition.len() }
}

fn skills_subscore<'a>(technical: &[&CandidateSkill], job: &'a JobProfile) -> SkillsResult<'a> {
    if job.required_skills.is_empty() {
        let preferred = preferred_component(technical, job.preferred_skills).unwrap_or(0.0);
        let value = (preferred * 0.25).round();
        return SkillsResult { value, force_zero_total: false, core: vec![], non_core: vec![] };
    }

    let (core, non_core) = partition_core(job.required_skills);
    let core_stats = partition_stats(&core, technical);
    let non_core_stats = partition_stats(&non_core, technical);

    let core_ratio = ratio(core_stats.matched_weight, core_stats.total_weight);
    let non_core_ratio = ratio(non_core_stats.matched_weight, non_core_stats.total_weight);
    let core_match_fraction = if core_stats.total_count > 0 {
        core_stats.matched_count as f64 / core_stats.total_count as f64
    } else {
        0.0
    };

    let is_internship = job.is_internship();
    let has_candidate_tech_skill = !technical.is_empty();

    let required_component;
    let mut force_zero_total = false;

    if !is_internship && core_match_fraction == 0.0 {
        required_component = 0.0;
        force_zero_total = true;
    } else if !is_internship && core_match_fraction < 0.34 {
        required_component = (core_ratio * 40.0).round().min(25.0);
    } else if is_internship && core_match_fraction == 0.0 && !has_candidate_tech_skill {
        required_component = 0.0;
    } else {
        let combined = (core_ratio * 70.0 + non_core_ratio * 30.0).round();
        let overall = ratio(
            core_stats.matched_weight + non_core_stats.matched_weight,
            core_stats.total_weight + non_core_stats.total_weight,
        );
        let threshold = if is_internship { 0.2 } else { 0.3 };
        if overall < threshold {
            if is_internship && core_stats.matched_count >= 1 {
                required_component = (combined * 0.5).round();
            } else {
                required_component = 0.0;
            }
        } else {
            required_component = combined;
        }
    }

    // A job with no technical preferred skills has nothing to earn the
    // preferred 25% with; the 75/25 split only applies once preferred
    // skills exist to score against, otherwise a perfect required-skill
    // match is structurally capped at 75% (violates S3/S4).
    let value = match preferred_component(technical, job.preferred_skills) {
        Some(preferred) => (required_component * 0.75 + preferred * 0.25).round(),
        None => required_component.round(),
    };

    SkillsResult { value, force_zero_total, core, non_core }
}

fn preferred_component(technical: &[&CandidateSkill], preferred: &[WeightedSkill]) -> Option<f64> {
    let technical_only: Vec<&WeightedSkill> = preferred
        .iter()
        .filter(|s| !normalizer::is_soft_skill(&s.skill))
        .collect();
    if technical_only.is_empty() {
        return None;
    }
    let stats = partition_stats(&technical_only, technical);
    Some(ratio(stats.matched_weight, stats.total_weight) * 70.0)
}

fn ratio(matched: f64, total: f64) -> f64 {
    if total > 0.0 {
        matched / total
    } else {
        0.0
    }
}

fn experience_subscore(candidate: &CandidateProfile, job: &JobProfile) -> f64 {
    let years = candidate.total_years_experience;

    if job.is_internship() {
        return if candidate.is_intern_shaped() {
            if (years - 0.0).abs() < f64::EPSILON {
                100.0
            } else if (years - 1.0).abs() < f64::EPSILON {
                90.0
            } else if (years - 2.0).abs() < f64::EPSILON {
                75.0
            } else {
                0.0
            }
        } else if (years - 0.0).abs() < f64::EPSILON {
            100.0
        } else if (years - 1.0).abs() < f64::EPSILON {
            60.0
        } else {
            0.0
        };
    }

    let (min_w, max_w) = experience_window(job.seniority_level, job.min_years_experience);

    if years < min_w {
        let ratio = if min_w > 0.0 { years / min_w } else { 1.0 };
        if ratio < 0.8 {
            0.0
        } else {
            (30.0 + ratio * 50.0).round().clamp(30.0, 80.0)
        }
    } else if years <= max_w {
        100.0
    } else {
        let excess = years - max_w;
        if excess <= 1.0 {
            80.0
        } else if excess <= 2.0 {
            50.0
        } else {
            0.0
        }
    }
}

fn experience_window(seniority: SeniorityLevel, min_years: f64) -> (f64, f64) {
    match seniority {
        SeniorityLevel::Junior => (min_years.max(0.0), 2.0),
        SeniorityLevel::Mid => (min_years.max(2.0), 5.0),
        SeniorityLevel::Senior => (min_years.max(5.0), 10.0),
        SeniorityLevel::Lead => (min_years.max(7.0), 15.0),
        SeniorityLevel::Principal => (min_years.max(10.0), f64::INFINITY),
    }
}

const DOMAIN_PATTERNS: &[(&str, &[&str])] = &[
    ("mobile", &["mobile", "ios", "android", "react native", "flutter"]),
    ("web", &["web", "frontend", "front-end", "full stack", "fullstack"]),
    ("backend", &["backend", "back-end", "server-side", "api"]),
    ("devops", &["devops", "infrastructure", "sre", "site reliability", "ci/cd", "kubernetes"]),
    ("data", &["data engineer", "data pipeline", "etl", "data warehouse", "analytics"]),
    ("ml", &["machine learning", " ml ", "artificial intelligence", "deep learning", "nlp"]),
    ("security", &["security", "infosec", "penetration", "appsec"]),
    ("fintech", &["fintech", "payments", "banking", "trading"]),
    ("healthcare", &["healthcare", "health tech", "medical", "clinical"]),
    ("ecommerce", &["ecommerce", "e-commerce", "retail", "marketplace"]),
    ("saas", &["saas", "b2b software", "subscription"]),
    ("gaming", &["gaming", "game dev", "unity", "unreal"]),
    ("embedded", &["embedded", "firmware", "iot", "rtos"]),
    ("blockchain", &["blockchain", "crypto", "web3", "smart contract"]),
];

fn domain_subscore(candidate: &CandidateProfile, job: &JobProfile) -> f64 {
    let mut text = String::new();
    text.push_str(job.title);
    text.push(' ');
    if let Some(dept) = job.department {
        text.push_str(dept);
        text.push(' ');
    }
    let desc_clip: String = job.description.chars().take(2000).collect();
    text.push_str(&desc_clip);
    let haystack = format!(" {} ", text.to_lowercase());

    let job_keywords: Vec<&str> = DOMAIN_PATTERNS
        .iter()
        .filter(|(_, patterns)| patterns.iter().any(|p| haystack.contains(p)))
        .map(|(canonical, _)| *canonical)
        .collect();

    if job_keywords.is_empty() {
        return 50.0;
    }

    let candidate_tokens: std::collections::HashSet<String> = candidate
        .domains
        .iter()
        .chain(candidate.roles.iter())
        .map(|s| s.to_lowercase())
        .collect();

    let matched = job_keywords.iter().filter(|k| candidate_tokens.contains(**k)).count();
    let ratio = matched as f64 / job_keywords.len() as f64;

    if ratio >= 0.5 {
        100.0
    } else if ratio >= 0.25 {
        75.0
    } else if matched > 0 {
        60.0
    } else if candidate_tokens.is_empty() {
        40.0
    } else {
        30.0
    }
}

fn location_subscore(candidate: &CandidateProfile, job: &JobProfile) -> f64 {
    if job.location_type == LocationType::Remote {
        return 100.0;
    }

    let candidate_country = candidate.location.current_country.as_deref().or(candidate.country);

    let (cand_country, job_country) = match (candidate_country, job.country) {
        (Some(c), Some(j)) => (c, j),
        _ => {
            return if candidate.location.willing_to_relocate { 80.0 } else { 50.0 };
        }
    };

    if cand_country.eq_ignore_ascii_case(job_country) {
        return 100.0;
    }

    if candidate.location.willing_to_relocate {
        let preferred = candidate
            .location
            .preferred_locations
            .iter()
            .any(|p| p.eq_ignore_ascii_case(job_country));
        return if preferred { 90.0 } else { 70.0 };
    }

    match job.location_type {
        LocationType::Hybrid => 40.0,
        LocationType::Onsite => 20.0,
        LocationType::Remote => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate_matrix::{LocationSignals, SkillLevel};

    fn skill(name: &str) -> CandidateSkill {
        CandidateSkill { name: name.to_string(), level: SkillLevel::Intermediate, years_of_experience: 2.0 }
    }

    fn job<'a>(required: &'a [WeightedSkill]) -> JobProfile<'a> {
        JobProfile {
            title: "Backend Engineer",
            department: Some("Engineering"),
            description: "Build backend APIs",
            country: Some("US"),
            location_type: LocationType::Remote,
            min_years_experience: 3.0,
            seniority_level: SeniorityLevel::Mid,
            required_skills: required,
            preferred_skills: &[],
            experience_weight: 25,
            location_weight: 15,
            domain_weight: 10,
        }
    }

    #[test]
    fn test_p6_skills_boundedness() {
        let required = vec![
            WeightedSkill { skill: "Rust".into(), weight: 80 },
            WeightedSkill { skill: "PostgreSQL".into(), weight: 60 },
        ];
        let j = job(&required);
        let skills = vec![skill("Rust")];
        let location = LocationSignals::default();
        let candidate = CandidateProfile {
            headline: None,
            roles: &[],
            country: Some("US"),
            skills: &skills,
            domains: &[],
            total_years_experience: 4.0,
            location: &location,
        };
        let result = calculate_match_score(&candidate, &j);
        assert!(result.breakdown.skills >= 0.0 && result.breakdown.skills <= 100.0);
        assert!(result.score >= 0.0 && result.score <= 100.0);
    }

    #[test]
    fn test_s3_sql_family_scores_decently() {
        let required = vec![WeightedSkill { skill: "SQL".into(), weight: 80 }];
        let j = job(&required);
        let skills = vec![skill("MySQL")];
        let location = LocationSignals::default();
        let candidate = CandidateProfile {
            headline: None,
            roles: &[],
            country: Some("US"),
            skills: &skills,
            domains: &[],
            total_years_experience: 4.0,
            location: &location,
        };
        let result = calculate_match_score(&candidate, &j);
        assert!(result.breakdown.skills >= 60.0);
    }

    #[test]
    fn test_s2_react_native_mismatch_zeroes_skills() {
        let required = vec![WeightedSkill { skill: "React Native".into(), weight: 90 }];
        let j = job(&required);
        let skills = vec![skill("React")];
        let location = LocationSignals::default();
        let candidate = CandidateProfile {
            headline: None,
            roles: &[],
            country: Some("US"),
            skills: &skills,
            domains: &[],
            total_years_experience: 3.0,
            location: &location,
        };
        let result = calculate_match_score(&candidate, &j);
        assert_eq!(result.breakdown.skills, 0.0);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_s4_internship_score_at_least_70() {
        let required = vec![WeightedSkill { skill: "Python".into(), weight: 70 }];
        let mut j = job(&required);
        j.min_years_experience = 0.0;
        j.seniority_level = SeniorityLevel::Junior;
        j.location_type = LocationType::Remote;
        let skills = vec![skill("Python")];
        let location = LocationSignals::default();
        let candidate = CandidateProfile {
            headline: Some("Software Engineering Intern"),
            roles: &[],
            country: None,
            skills: &skills,
            domains: &[],
            total_years_experience: 1.0,
            location: &location,
        };
        let result = calculate_match_score(&candidate, &j);
        assert_eq!(result.breakdown.experience, 90.0);
        assert!(result.score >= 70.0);
    }

    #[test]
    fn test_location_remote_is_100() {
        let required: Vec<WeightedSkill> = vec![];
        let mut j = job(&required);
        j.location_type = LocationType::Remote;
        let skills: Vec<CandidateSkill> = vec![];
        let location = LocationSignals::default();
        let candidate = CandidateProfile {
            headline: None,
            roles: &[],
            country: Some("FR"),
            skills: &skills,
            domains: &[],
            total_years_experience: 0.0,
            location: &location,
        };
        assert_eq!(location_subscore(&candidate, &j), 100.0);
    }

    #[test]
    fn test_location_same_country_is_100() {
        let required: Vec<WeightedSkill> = vec![];
        let mut j = job(&required);
        j.location_type = LocationType::Onsite;
        j.country = Some("US");
        let skills: Vec<CandidateSkill> = vec![];
        let location = LocationSignals::default();
        let candidate = CandidateProfile {
            headline: None,
            roles: &[],
            country: Some("US"),
            skills: &skills,
            domains: &[],
            total_years_experience: 0.0,
            location: &location,
        };
        assert_eq!(location_subscore(&candidate, &j), 100.0);
    }
}
