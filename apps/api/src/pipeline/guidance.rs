//! Role-conditioned adaptation guidance — maps the analyzed role and
//! seniority to framing instructions, and the profile's technologies to
//! ecosystem hints, appended to the adapter's system prompt per offer.

use crate::pipeline::analyzer::{JobProfile, Seniority};

/// Ecosystem expansions for commonly named technologies. Used to hint the
/// adapter toward reformulations the offer is likely to reward.
const ECOSYSTEMS: &[(&str, &[&str])] = &[
    ("python", &["Django", "Flask", "FastAPI", "pytest"]),
    ("javascript", &["React", "Node.js", "Express", "TypeScript"]),
    ("typescript", &["React", "Node.js", "NestJS"]),
    ("java", &["Spring Boot", "Maven", "JUnit"]),
    ("go", &["gRPC", "Gin", "Docker"]),
    ("rust", &["Tokio", "Axum", "Serde"]),
    ("postgresql", &["SQL", "query optimization", "migrations"]),
    ("aws", &["EC2", "S3", "Lambda", "CloudFormation"]),
    ("kubernetes", &["Docker", "Helm", "CI/CD"]),
];

/// Builds role/seniority-conditioned guidance for the adapter.
/// Returns an empty string when no rule matches — the base system prompt
/// already covers the generic case.
pub fn role_guidance(profile: &JobProfile) -> String {
    let data = match profile {
        JobProfile::Parsed(data) => data,
        JobProfile::ParseError { .. } => return String::new(),
    };

    let role = data.role.to_lowercase();
    let mut lines: Vec<&str> = Vec::new();

    if data.seniority == Seniority::Lead
        || role.contains("lead")
        || role.contains("manager")
        || role.contains("head of")
    {
        lines.push(
            "ROLE FOCUS: leadership. Emphasize mentoring, technical direction, \
            and cross-team coordination already present in the CV.",
        );
    }

    if role.contains("devops") || role.contains("sre") || role.contains("site reliability") {
        lines.push(
            "ROLE FOCUS: automation and reliability. Emphasize infrastructure, \
            CI/CD, monitoring, and incident work already present in the CV.",
        );
    }

    if role.contains("full stack") || role.contains("fullstack") || role.contains("full-stack") {
        lines.push(
            "ROLE FOCUS: cross-stack breadth. Give frontend and backend work \
            equal weight when both appear in the CV.",
        );
    }

    lines.join("\n")
}

/// Builds per-offer technology-mapping hints: for each profile technology
/// with a known ecosystem, list plausible expansions, co-occurring offer
/// technologies and keywords first.
pub fn technology_hints(profile: &JobProfile) -> String {
    let data = match profile {
        JobProfile::Parsed(data) => data,
        JobProfile::ParseError { .. } => return String::new(),
    };

    let offer_terms: Vec<String> = data
        .technologies
        .iter()
        .map(|t| t.name.to_lowercase())
        .chain(data.keywords_ats.iter().map(|k| k.to_lowercase()))
        .collect();

    let mut hints = Vec::new();
    for tech in &data.technologies {
        if let Some((_, ecosystem)) = ECOSYSTEMS
            .iter()
            .find(|(name, _)| tech.name.eq_ignore_ascii_case(name))
        {
            hints.push(format!(
                "- {} may be expanded to: {}",
                tech.name,
                prioritized(ecosystem, &offer_terms).join(", ")
            ));
        }
    }

    if hints.is_empty() {
        String::new()
    } else {
        format!(
            "TECHNOLOGY MAPPING HINTS (apply rule b only where the CV supports it):\n{}",
            hints.join("\n")
        )
    }
}

/// Orders ecosystem members so those also named by the offer come first.
fn prioritized(ecosystem: &[&str], offer_terms: &[String]) -> Vec<String> {
    let (named, rest): (Vec<&&str>, Vec<&&str>) = ecosystem
        .iter()
        .partition(|member| offer_terms.iter().any(|t| t == &member.to_lowercase()));

    named
        .into_iter()
        .chain(rest)
        .map(|m| m.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyzer::{ProfileData, TechnologyEntry};

    fn profile_with(role: &str, seniority: Seniority, techs: &[&str], keywords: &[&str]) -> JobProfile {
        JobProfile::Parsed(ProfileData {
            role: role.to_string(),
            seniority,
            technologies: techs
                .iter()
                .map(|t| TechnologyEntry {
                    name: t.to_string(),
                    confidence: 0.9,
                })
                .collect(),
            keywords_ats: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_lead_role_gets_leadership_framing() {
        let profile = profile_with("Engineering Lead", Seniority::Lead, &[], &[]);
        assert!(role_guidance(&profile).contains("leadership"));
    }

    #[test]
    fn test_lead_seniority_alone_triggers_leadership() {
        let profile = profile_with("Backend Engineer", Seniority::Lead, &[], &[]);
        assert!(role_guidance(&profile).contains("leadership"));
    }

    #[test]
    fn test_sre_role_gets_automation_framing() {
        let profile = profile_with("Site Reliability Engineer", Seniority::Senior, &[], &[]);
        assert!(role_guidance(&profile).contains("automation"));
    }

    #[test]
    fn test_fullstack_role_gets_cross_stack_framing() {
        let profile = profile_with("Full Stack Developer", Seniority::Mid, &[], &[]);
        assert!(role_guidance(&profile).contains("cross-stack"));
    }

    #[test]
    fn test_plain_role_gets_no_guidance() {
        let profile = profile_with("Backend Engineer", Seniority::Senior, &[], &[]);
        assert!(role_guidance(&profile).is_empty());
    }

    #[test]
    fn test_sentinel_profile_gets_no_guidance() {
        let profile = JobProfile::parse_error("oops");
        assert!(role_guidance(&profile).is_empty());
        assert!(technology_hints(&profile).is_empty());
    }

    #[test]
    fn test_technology_hints_cover_known_ecosystems() {
        let profile = profile_with("Backend Engineer", Seniority::Senior, &["Python"], &[]);
        let hints = technology_hints(&profile);
        assert!(hints.contains("Python may be expanded to"));
        assert!(hints.contains("Django"));
    }

    #[test]
    fn test_cooccurring_ecosystem_members_come_first() {
        let profile = profile_with(
            "Backend Engineer",
            Seniority::Senior,
            &["Python"],
            &["FastAPI"],
        );
        let hints = technology_hints(&profile);
        let fastapi = hints.find("FastAPI").unwrap();
        let django = hints.find("Django").unwrap();
        assert!(fastapi < django, "offer-named FastAPI must be listed before Django");
    }

    #[test]
    fn test_unknown_technology_produces_no_hint() {
        let profile = profile_with("Backend Engineer", Seniority::Senior, &["COBOL"], &[]);
        assert!(technology_hints(&profile).is_empty());
    }
}
