//! Pre-filter stage of the matching engine (§4.7.1). `should_consider` is
//! total — it never panics and always returns a bool — so it can run ahead
//! of scoring for every candidate×job pair without special-casing failure.

use crate::models::job::SeniorityLevel;

use super::{candidate_matches_skill, normalizer, CandidateProfile, JobProfile};

pub fn should_consider(candidate: &CandidateProfile, job: &JobProfile) -> bool {
    let years = candidate.total_years_experience;

    if job.is_internship() {
        let ok = if candidate.is_intern_shaped() {
            years <= 2.0
        } else {
            years == 0.0
        };
        if !ok {
            return false;
        }
    } else {
        // Underqualification.
        if job.min_years_experience > 0.0 && years < 0.8 * job.min_years_experience {
            return false;
        }

        // Overqualification by seniority.
        let overqualified = match job.seniority_level {
            SeniorityLevel::Junior => years > 3.0,
            SeniorityLevel::Mid => years > 8.0,
            SeniorityLevel::Senior => years > 15.0,
            SeniorityLevel::Lead | SeniorityLevel::Principal => false,
        };
        if overqualified {
            return false;
        }
    }

    if candidate.skills.is_empty() {
        return false;
    }

    let technical = candidate.technical_skills();
    let core_required: Vec<_> = job
        .required_skills
        .iter()
        .filter(|s| normalizer::is_core_candidate(&s.skill))
        .collect();

    if !core_required.is_empty() {
        if job.is_internship() {
            if technical.is_empty() {
                return false;
            }
        } else {
            let matched = core_required
                .iter()
                .any(|req| candidate_matches_skill(&technical, &req.skill));
            if !matched {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate_matrix::{CandidateSkill, LocationSignals, SkillLevel};
    use crate::models::job::LocationType;
    use crate::models::job_matrix::WeightedSkill;

    fn skill(name: &str) -> CandidateSkill {
        CandidateSkill {
            name: name.to_string(),
            level: SkillLevel::Intermediate,
            years_of_experience: 2.0,
        }
    }

    fn base_job<'a>(required: &'a [WeightedSkill]) -> JobProfile<'a> {
        JobProfile {
            title: "Software Engineer",
            department: None,
            description: "",
            country: None,
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

    fn base_candidate<'a>(skills: &'a [CandidateSkill], years: f64, location: &'a LocationSignals) -> CandidateProfile<'a> {
        CandidateProfile {
            headline: None,
            roles: &[],
            country: None,
            skills,
            domains: &[],
            total_years_experience: years,
            location,
        }
    }

    #[test]
    fn test_s1_soft_skill_only_is_rejected() {
        let required = vec![
            WeightedSkill { skill: "Communication".into(), weight: 80 },
            WeightedSkill { skill: "React Native".into(), weight: 80 },
        ];
        let job = base_job(&required);
        let skills = vec![skill("Communication")];
        let location = LocationSignals::default();
        let candidate = base_candidate(&skills, 4.0, &location);
        assert!(!should_consider(&candidate, &job));
    }

    #[test]
    fn test_s2_react_vs_react_native_excluded() {
        let required = vec![WeightedSkill { skill: "React Native".into(), weight: 90 }];
        let job = base_job(&required);
        let skills = vec![skill("React")];
        let location = LocationSignals::default();
        let candidate = base_candidate(&skills, 3.0, &location);
        assert!(!should_consider(&candidate, &job));
    }

    #[test]
    fn test_s3_sql_family_passes() {
        let required = vec![WeightedSkill { skill: "SQL".into(), weight: 80 }];
        let job = base_job(&required);
        let skills = vec![skill("MySQL")];
        let location = LocationSignals::default();
        let candidate = base_candidate(&skills, 4.0, &location);
        assert!(should_consider(&candidate, &job));
    }

    #[test]
    fn test_s4_internship_intern_shaped_included() {
        let required = vec![WeightedSkill { skill: "Python".into(), weight: 70 }];
        let mut job = base_job(&required);
        job.min_years_experience = 0.0;
        job.seniority_level = SeniorityLevel::Junior;
        let skills = vec![skill("Python")];
        let location = LocationSignals::default();
        let mut candidate = base_candidate(&skills, 1.0, &location);
        candidate.headline = Some("Software Engineering Intern");
        assert!(should_consider(&candidate, &job));
    }

    #[test]
    fn test_s5_overqualified_junior_excluded() {
        let required = vec![WeightedSkill { skill: "Python".into(), weight: 80 }];
        let mut job = base_job(&required);
        job.min_years_experience = 0.0;
        job.seniority_level = SeniorityLevel::Junior;
        let skills = vec![skill("Python")];
        let location = LocationSignals::default();
        let candidate = base_candidate(&skills, 5.0, &location);
        assert!(!should_consider(&candidate, &job));
    }

    #[test]
    fn test_no_skills_excluded() {
        let required = vec![WeightedSkill { skill: "Python".into(), weight: 80 }];
        let job = base_job(&required);
        let skills: Vec<CandidateSkill> = vec![];
        let location = LocationSignals::default();
        let candidate = base_candidate(&skills, 4.0, &location);
        assert!(!should_consider(&candidate, &job));
    }

    #[test]
    fn test_underqualification_excluded() {
        let required = vec![WeightedSkill { skill: "Python".into(), weight: 80 }];
        let job = base_job(&required);
        let skills = vec![skill("Python")];
        let location = LocationSignals::default();
        let candidate = base_candidate(&skills, 1.0, &location); // < 0.8 * 3.0
        assert!(!should_consider(&candidate, &job));
    }
}
