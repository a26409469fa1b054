//! Deterministic explanation/gap generation, the post-step that runs after
//! scoring (§4.7.2). Never LLM-backed — purely derived from the same inputs
//! scoring used, so it stays in lockstep with the numbers it explains.

use crate::models::candidate_matrix::CandidateSkill;
use crate::models::job_matrix::WeightedSkill;
use crate::models::match_record::{Gap, GapSeverity, MatchBreakdown};

use super::{candidate_matches_skill, CandidateProfile, JobProfile};

pub fn build_gaps(
    technical: &[&CandidateSkill],
    core: &[&WeightedSkill],
    non_core: &[&WeightedSkill],
    candidate: &CandidateProfile,
    job: &JobProfile,
) -> Vec<Gap> {
    let mut gaps = Vec::new();

    for req in core {
        if !candidate_matches_skill(technical, &req.skill) {
            gaps.push(Gap {
                severity: GapSeverity::Critical,
                description: format!("Missing core required skill: {}", req.skill),
            });
        }
    }

    for req in non_core {
        if !candidate_matches_skill(technical, &req.skill) {
            gaps.push(Gap {
                severity: GapSeverity::Moderate,
                description: format!("Missing required skill: {}", req.skill),
            });
        }
    }

    if job.min_years_experience > 0.0 && candidate.total_years_experience < job.min_years_experience {
        gaps.push(Gap {
            severity: GapSeverity::Major,
            description: format!(
                "Has {:.1} years of experience, below the {:.1} years required",
                candidate.total_years_experience, job.min_years_experience
            ),
        });
    }

    if job.location_type == crate::models::job::LocationType::Onsite {
        let candidate_country = candidate.location.current_country.as_deref().or(candidate.country);
        if let (Some(cc), Some(jc)) = (candidate_country, job.country) {
            if !cc.eq_ignore_ascii_case(jc) {
                gaps.push(Gap {
                    severity: GapSeverity::Moderate,
                    description: format!("Candidate is based in {cc}, on-site role is in {jc}"),
                });
            }
        }
    }

    gaps
}

pub fn build_explanation(score: f64, breakdown: &MatchBreakdown, gaps: &[Gap]) -> String {
    let gap_note = if gaps.is_empty() {
        String::new()
    } else {
        format!(" {} gap(s) identified, see breakdown for detail.", gaps.len())
    };

    format!(
        "Overall match score is {score:.0}/100, combining a skills alignment of {:.0}/100, \
        an experience fit of {:.0}/100, a domain relevance of {:.0}/100, and a location \
        compatibility of {:.0}/100.{gap_note}",
        breakdown.skills, breakdown.experience, breakdown.domain, breakdown.location
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_mentions_all_four_subscores() {
        let breakdown = MatchBreakdown { skills: 80.0, experience: 70.0, domain: 60.0, location: 100.0 };
        let explanation = build_explanation(77.0, &breakdown, &[]);
        assert!(explanation.contains("77"));
        assert!(explanation.contains("80"));
        assert!(explanation.contains("70"));
        assert!(explanation.contains("60"));
        assert!(explanation.contains("100"));
    }

    #[test]
    fn test_explanation_notes_gap_count() {
        let breakdown = MatchBreakdown::default();
        let gaps = vec![Gap { severity: GapSeverity::Critical, description: "x".into() }];
        let explanation = build_explanation(0.0, &breakdown, &gaps);
        assert!(explanation.contains("1 gap"));
    }
}
