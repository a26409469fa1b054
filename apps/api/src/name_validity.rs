//! Name validity check (§4.3) — rejects garbage names from LLM output and,
//! when the LLM's name is unusable, falls back to scanning the CV text
//! directly for something that looks like a header line.

const BANNED_HEADER_TOKENS: &[&str] = &[
    "email",
    "phone",
    "address",
    "resume",
    "cv",
    "experience",
    "education",
    "skills",
    "objective",
];

/// A name is invalid if any of (a)-(d) in §4.3 hold.
pub fn is_invalid_name(name: &str) -> bool {
    let trimmed = name.trim();

    // (a) length < 2
    if trimmed.chars().count() < 2 {
        return true;
    }

    // (b) length > 30 and consists only of hex characters after removing whitespace
    let no_ws: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if no_ws.chars().count() > 30 && no_ws.chars().all(|c| c.is_ascii_hexdigit()) {
        return true;
    }

    // (c) fewer than 2 alphabetic characters
    let alpha_count = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    if alpha_count < 2 {
        return true;
    }

    // (d) more than 50% non-alphanumeric characters
    let total = trimmed.chars().count();
    let non_alnum = trimmed.chars().filter(|c| !c.is_alphanumeric() && !c.is_whitespace()).count();
    if total > 0 && (non_alnum as f64) / (total as f64) > 0.5 {
        return true;
    }

    false
}

/// Direct header extraction fallback (§4.3): take the first 2000 chars,
/// split into trimmed non-empty lines, scan the first 10 lines for a line
/// of 2-4 whitespace-separated tokens that looks like a person's name.
/// Returns `None` if no such line is found (caller raises `NameUnrecoverable`).
pub fn extract_name_from_header(cv_text: &str) -> Option<String> {
    let head: String = cv_text.chars().take(2000).collect();
    let lines: Vec<&str> = head
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(10)
        .collect();

    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 || tokens.len() > 4 {
            continue;
        }
        let first_char_upper = tokens[0]
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false);
        if !first_char_upper {
            continue;
        }
        let alpha_count = line.chars().filter(|c| c.is_alphabetic()).count();
        if alpha_count < 4 {
            continue;
        }
        let lower = line.to_lowercase();
        if BANNED_HEADER_TOKENS.iter().any(|t| lower.contains(t)) {
            continue;
        }
        return Some(line.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_short_name_invalid() {
        assert!(is_invalid_name("A"));
    }

    #[test]
    fn test_hex_blob_invalid() {
        assert!(is_invalid_name("a3f9c21e0b77d4568812ffeeccdd1029aabbccdd"));
    }

    #[test]
    fn test_too_few_alpha_invalid() {
        assert!(is_invalid_name("A1"));
    }

    #[test]
    fn test_mostly_symbols_invalid() {
        assert!(is_invalid_name("J@#$%oh"));
    }

    #[test]
    fn test_normal_name_valid() {
        assert!(!is_invalid_name("Jane Doe"));
    }

    #[test]
    fn test_header_extraction_finds_name() {
        let text = "Jane Doe\nSoftware Engineer\nemail: jane@example.com\nExperience\n...";
        assert_eq!(extract_name_from_header(text), Some("Jane Doe".to_string()));
    }

    #[test]
    fn test_header_extraction_skips_banned_lines() {
        let text = "Resume Objective\nJane Doe\nEmail jane@example.com";
        assert_eq!(extract_name_from_header(text), Some("Jane Doe".to_string()));
    }

    #[test]
    fn test_header_extraction_none_found() {
        let text = "objective\nskills\neducation";
        assert_eq!(extract_name_from_header(text), None);
    }
}
