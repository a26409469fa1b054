//! Skill Normalizer (C3) — deterministic, table-driven canonicalization and
//! classification of skill strings. Pure; no I/O, no regex, just character
//! class checks and ordered lookups (§4.4).
//!
//! Precedence is load-bearing and MUST stay in this order: compound/specific
//! forms are matched before their generic parent, so e.g. `react native`
//! never collapses into `react`.

use std::collections::HashSet;

/// Canonicalizes a skill string.
///
/// Matching happens against a whitespace/separator-normalized copy of the
/// input (lowercased, `.`/`_`/`-` turned into spaces, runs of whitespace
/// collapsed) so that `"Next.js"`, `"next js"`, and `"NEXTJS"` all hit the
/// same rule. The canonical forms themselves keep the hyphenation the
/// matching corpus expects (`react-native`, not `react native`).
pub fn normalize(raw: &str) -> String {
    let key = separator_normalized(raw);
    let has_react_or_next = key.contains("react") || key.contains("next");

    // 1. Compound/specific before generic.
    if key == "react native" || key == "reactnative" {
        return "react-native".to_string();
    }
    if key == "next js" || key == "nextjs" || key == "next" {
        return "nextjs".to_string();
    }
    if key == "nuxt" || key == "nuxt js" || key == "nuxtjs" {
        return "nuxtjs".to_string();
    }
    if key == "react" {
        return "react".to_string();
    }

    // 2. Standalone abbreviations.
    if key == "js" || key == "javascript" || key == "ecmascript" {
        return "javascript".to_string();
    }
    if key == "ts" || key == "typescript" {
        return "typescript".to_string();
    }
    if key == "py" || key == "python" || key == "python3" {
        return "python".to_string();
    }
    if key == "html" || key == "html5" {
        return "html".to_string();
    }
    if key == "css" || key == "css3" {
        return "css".to_string();
    }

    // 3. Node.js family, guarded against a React/Next prefix sharing the string.
    if !has_react_or_next && (key == "node" || key == "node js" || key == "nodejs") {
        return "nodejs".to_string();
    }

    // 4. Framework families.
    if key == "vue" || key == "vue js" || key == "vuejs" {
        return "vue".to_string();
    }
    if key == "angularjs" || key == "angular js" || key == "angular 1" || key == "angular1" {
        return "angularjs".to_string();
    }
    if key == "angular" || key == "angular 2" {
        return "angular".to_string();
    }
    if key == "express" || key == "express js" || key == "expressjs" {
        return "expressjs".to_string();
    }
    if key == "flutter" {
        return "flutter".to_string();
    }
    if key == "dart" {
        return "dart".to_string();
    }
    if key == "swiftui" || key == "swift ui" {
        return "swiftui".to_string();
    }
    if key == "swift" {
        return "swift".to_string();
    }
    if key == "objective c" || key == "objectivec" || key == "objc" {
        return "objective-c".to_string();
    }
    if key == "kotlin" {
        return "kotlin".to_string();
    }
    if key == "java" {
        return "java".to_string();
    }

    // 5. Databases, kept distinct from one another.
    if key == "sql" {
        return "sql".to_string();
    }
    if key == "mysql" {
        return "mysql".to_string();
    }
    if key == "postgresql" || key == "postgres" || key == "psql" {
        return "postgresql".to_string();
    }
    if key == "mssql" || key == "sql server" || key == "sqlserver" {
        return "mssql".to_string();
    }
    if key == "sqlite" || key == "sqlite3" {
        return "sqlite".to_string();
    }
    if key == "mongodb" || key == "mongo" {
        return "mongodb".to_string();
    }
    if key == "redis" {
        return "redis".to_string();
    }
    if key == "dynamodb" {
        return "dynamodb".to_string();
    }
    if key == "cassandra" {
        return "cassandra".to_string();
    }
    if key == "firebase" {
        return "firebase".to_string();
    }

    // 6. Cloud/DevOps/ML.
    if key == "aws" {
        return "aws".to_string();
    }
    if key == "azure" {
        return "azure".to_string();
    }
    if key == "gcp" {
        return "gcp".to_string();
    }
    if key == "docker" {
        return "docker".to_string();
    }
    if key == "kubernetes" || key == "k8s" {
        return "kubernetes".to_string();
    }
    if key == "ci cd" || key == "cicd" || key == "ci/cd" {
        return "cicd".to_string();
    }
    if key == "tensorflow" {
        return "tensorflow".to_string();
    }
    if key == "pytorch" {
        return "pytorch".to_string();
    }
    if key == "machine learning" || key == "machinelearning" || key == "ml" {
        return "machine-learning".to_string();
    }
    if key == "deep learning" || key == "deeplearning" {
        return "deep-learning".to_string();
    }

    // 7. Fallback: lowercase, strip `._ -`, return the remainder.
    raw.to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-' | ' '))
        .collect()
}

fn separator_normalized(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if matches!(c, '.' | '_' | '-') { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

const SOFT_SKILLS: &[&str] = &[
    "communication",
    "teamwork",
    "leadership",
    "projectmanagement",
    "problemsolving",
    "timemanagement",
    "adaptability",
    "creativity",
    "criticalthinking",
    "collaboration",
    "conflictresolution",
    "negotiation",
    "presentation",
    "publicspeaking",
    "mentoring",
    "coaching",
    "stakeholdermanagement",
    "customerservice",
    "interpersonalskills",
    "workethic",
    "attentiontodetail",
    "organization",
    "flexibility",
    "decisionmaking",
    "emotionalintelligence",
    "activelistening",
    "empathy",
    "selfmotivation",
    "multitasking",
    "strategicthinking",
    "teambuilding",
];

const GENERIC_TECH_SKILLS: &[&str] = &[
    "git",
    "github",
    "gitlab",
    "bitbucket",
    "microsoftoffice",
    "word",
    "excel",
    "powerpoint",
    "windows",
    "linux",
    "macos",
    "agile",
    "scrum",
    "kanban",
    "jira",
    "trello",
    "slack",
    "teams",
    "zoom",
];

const SQL_FAMILY: &[&str] = &["sql", "mysql", "postgresql", "mssql", "sqlite"];

/// True for a fixed set of ~30 soft-skill tokens (communication, teamwork, …).
pub fn is_soft_skill(raw: &str) -> bool {
    let fallback: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-' | ' '))
        .collect();
    SOFT_SKILLS.contains(&fallback.as_str())
}

/// True for a fixed set of generic tooling/platform tokens that carry little
/// signal on their own (git, office suite, OS names, agile ceremony tools).
pub fn is_generic_tech_skill(raw: &str) -> bool {
    let fallback: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-' | ' '))
        .collect();
    GENERIC_TECH_SKILLS.contains(&fallback.as_str())
}

/// True iff both skills normalize into the mutually-compatible SQL family,
/// so a candidate's `mysql` satisfies a job's `sql` requirement.
pub fn are_sql_compatible(a: &str, b: &str) -> bool {
    let na = normalize(a);
    let nb = normalize(b);
    SQL_FAMILY.contains(&na.as_str()) && SQL_FAMILY.contains(&nb.as_str())
}

/// A skill is "core" relevant only once soft/generic noise is removed.
pub fn is_core_candidate(raw: &str) -> bool {
    !is_soft_skill(raw) && !is_generic_tech_skill(raw)
}

pub fn normalized_set<'a, I: IntoIterator<Item = &'a str>>(skills: I) -> HashSet<String> {
    skills.into_iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p4_idempotence() {
        let samples = [
            "React",
            "React Native",
            "next.js",
            "Node.js",
            "PostgreSQL",
            "Communication",
            "Project Management",
            "k8s",
            "ci/cd",
            "Some Unknown Skill!",
        ];
        for s in samples {
            let once = normalize(s);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {s}");
        }
    }

    #[test]
    fn test_p5_non_collision() {
        assert_ne!(normalize("React"), normalize("React Native"));
        assert_ne!(normalize("Angular"), normalize("AngularJS"));
        assert_ne!(normalize("Next.js"), normalize("React"));
    }

    #[test]
    fn test_react_native_precedence() {
        assert_eq!(normalize("React Native"), "react-native");
        assert_eq!(normalize("react-native"), "react-native");
    }

    #[test]
    fn test_node_guarded_against_react_next() {
        assert_eq!(normalize("node"), "nodejs");
        assert_eq!(normalize("Node.js"), "nodejs");
        // A string that mentions react/next alongside node isn't a bare node token.
        assert_ne!(normalize("react node"), "nodejs");
    }

    #[test]
    fn test_standalone_abbreviations() {
        assert_eq!(normalize("JS"), "javascript");
        assert_eq!(normalize("ECMAScript"), "javascript");
        assert_eq!(normalize("ts"), "typescript");
        assert_eq!(normalize("py"), "python");
        assert_eq!(normalize("python3"), "python");
        assert_eq!(normalize("HTML5"), "html");
        assert_eq!(normalize("css3"), "css");
    }

    #[test]
    fn test_database_family_kept_distinct() {
        assert_eq!(normalize("postgres"), "postgresql");
        assert_eq!(normalize("Mongo"), "mongodb");
        assert_ne!(normalize("mysql"), normalize("postgresql"));
    }

    #[test]
    fn test_cloud_devops_ml() {
        assert_eq!(normalize("K8s"), "kubernetes");
        assert_eq!(normalize("CI/CD"), "cicd");
        assert_eq!(normalize("Machine Learning"), "machine-learning");
    }

    #[test]
    fn test_fallback_strips_separators() {
        assert_eq!(normalize("Some_Weird-Skill.Name"), "someweirdskillname");
    }

    #[test]
    fn test_is_soft_skill() {
        assert!(is_soft_skill("Communication"));
        assert!(is_soft_skill("Project Management"));
        assert!(!is_soft_skill("React"));
    }

    #[test]
    fn test_is_generic_tech_skill() {
        assert!(is_generic_tech_skill("GitHub"));
        assert!(is_generic_tech_skill("Jira"));
        assert!(!is_generic_tech_skill("React"));
    }

    #[test]
    fn test_sql_compatibility() {
        assert!(are_sql_compatible("SQL", "MySQL"));
        assert!(are_sql_compatible("sqlite", "mssql"));
        assert!(!are_sql_compatible("SQL", "MongoDB"));
    }
}
