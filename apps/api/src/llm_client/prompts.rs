//! Prompt constants for the four logical LLM calls the core depends on (C2).
//! Kept alongside the client, never inlined at call sites, so prompt
//! wording changes in one place.

pub const EXTRACT_CANDIDATE_INFO_SYSTEM: &str =
    "You are an expert resume parser. Extract only the candidate's identity \
    fields from raw CV text. You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

pub const EXTRACT_CANDIDATE_INFO_TEMPLATE: &str = r#"Extract the candidate's identity information from this CV text.

Return a JSON object with this EXACT schema:
{
  "name": "Full Name",
  "email": "email@example.com",
  "phone": "+1 555 0100",
  "country": "United States",
  "country_code": "US",
  "headline": "Senior Backend Engineer"
}

All fields except "name" are optional — omit or null them if not present in the text.
If no plausible name can be found, still return your best guess; the caller
validates name quality independently.

CV TEXT:
{cv_text}"#;

pub const GENERATE_CANDIDATE_MATRIX_SYSTEM: &str =
    "You are an expert technical recruiter building a structured capability \
    profile from a CV. You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Ground every claim in the CV text — do not invent skills or experience.";

pub const GENERATE_CANDIDATE_MATRIX_TEMPLATE: &str = r#"Build a structured candidate matrix from this CV text.

Return a JSON object with this EXACT schema:
{
  "skills": [{"name": "Python", "level": "advanced", "years_of_experience": 5.0}],
  "roles": ["Backend Engineer", "Tech Lead"],
  "total_years_experience": 7.5,
  "domains": ["fintech", "backend"],
  "education": [{"degree": "BSc Computer Science", "institution": "MIT", "field": "Computer Science", "year": 2016}],
  "languages": ["English", "Spanish"],
  "location_signals": {"current_country": "US", "willing_to_relocate": false, "preferred_locations": []},
  "confidence": 0.85,
  "evidence": [{"field": "skills", "snippet": "5 years building Python microservices", "source_page": 1}]
}

`level` must be one of: beginner, intermediate, advanced, expert.
`confidence` is your overall confidence in this extraction, 0.0 to 1.0.

CV TEXT:
{cv_text}"#;

pub const GENERATE_JOB_MATRIX_SYSTEM: &str =
    "You are an expert technical recruiter translating a job posting into \
    weighted matching criteria. You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

pub const GENERATE_JOB_MATRIX_TEMPLATE: &str = r#"Build a weighted job matrix for matching candidates against this role.

Title: {title}
Description: {description}
Must-have skills (explicit): {must_have}
Nice-to-have skills (explicit): {nice_to_have}

Return a JSON object with this EXACT schema:
{
  "required_skills": [{"skill": "Rust", "weight": 90}],
  "preferred_skills": [{"skill": "Kubernetes", "weight": 40}],
  "experience_weight": 25,
  "location_weight": 15,
  "domain_weight": 10
}

Weights for individual skills are 0-100 and reflect relative importance within
their list. `experience_weight`, `location_weight`, and `domain_weight` are
non-negative integers that together with the implied skills weight
(100 − experience − location − domain) must sum to 100; the implied skills
weight MUST be greater than 0, so experience_weight + location_weight +
domain_weight must be less than 100."#;

pub const EXTRACT_JOB_INFO_SYSTEM: &str =
    "You are an expert at parsing job postings into structured records. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

pub const EXTRACT_JOB_INFO_TEMPLATE: &str = r#"Extract a structured job record from this posting text.

Return a JSON object with this EXACT schema:
{
  "title": "Senior Backend Engineer",
  "department": "Engineering",
  "company": "Acme Corp",
  "location_type": "remote",
  "country_code": "US",
  "city": "Remote",
  "description": "...",
  "must_have_skills": ["Rust", "PostgreSQL"],
  "nice_to_have_skills": ["Kubernetes"],
  "min_years_experience": 5,
  "seniority_level": "senior"
}

`location_type` must be one of: onsite, hybrid, remote.
`seniority_level` must be one of: junior, mid, senior, lead, principal.
`description` must be at least 50 characters — summarize the posting if the
source text is shorter, staying strictly factual.

POSTING TEXT:
{posting_text}"#;
