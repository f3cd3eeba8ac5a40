//! The canonical structured record produced for every resume.
//!
//! Every field is independently optional: absence is a legitimate terminal
//! state, not an error. Heterogeneous shapes coming back from the model
//! (bare string vs structured object) are modeled as untagged enums so
//! deserialization never privileges one form over the other.

use serde::{Deserialize, Serialize};

/// Canonical schema field names, in output order.
///
/// The validator walks this list and emits its mapped/partial/unmapped
/// classifications in exactly this order, so responses are deterministic.
pub const CANONICAL_FIELDS: &[&str] = &[
    "desired_titles",
    "summary",
    "skills",
    "experience",
    "location_preference",
    "schedule",
    "salary_expectation",
    "availability",
    "links",
];

/// The target structured output for a processed resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CanonicalResumeRecord {
    /// Job titles the candidate is looking for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub desired_titles: Vec<String>,

    /// Free-text professional summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Skills, either bare names or structured entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<SkillEntry>,

    /// Work history, most entries first as they appear in the source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experience: Vec<ExperienceEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_preference: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_expectation: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<serde_json::Value>,

    /// External links (portfolio, repositories, profiles).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkEntry>,
}

/// A skill entry: either a bare name or a structured object.
///
/// Both forms are valid; the validator must not reject one in favor of
/// the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SkillEntry {
    Name(String),
    Detailed(Skill),
}

impl SkillEntry {
    /// The skill name regardless of form.
    pub fn name(&self) -> &str {
        match self {
            SkillEntry::Name(name) => name,
            SkillEntry::Detailed(skill) => &skill.name,
        }
    }
}

/// Structured skill form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub name: String,

    /// Proficiency on a 1–5 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One position in the candidate's work history.
///
/// `start`/`end` hold normalized dates (`YYYY-MM`, `YYYY` or `"present"`)
/// after validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExperienceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A link entry: bare URL string or labeled object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LinkEntry {
    Url(String),
    Labeled {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_entry_accepts_both_shapes() {
        let bare: SkillEntry = serde_json::from_str(r#""Rust""#).unwrap();
        assert_eq!(bare.name(), "Rust");

        let detailed: SkillEntry =
            serde_json::from_str(r#"{"name": "SQL", "level": 4, "type": "hard"}"#).unwrap();
        assert_eq!(detailed.name(), "SQL");
        match detailed {
            SkillEntry::Detailed(skill) => {
                assert_eq!(skill.level, Some(4));
                assert_eq!(skill.kind.as_deref(), Some("hard"));
            }
            SkillEntry::Name(_) => panic!("expected detailed form"),
        }
    }

    #[test]
    fn test_link_entry_accepts_both_shapes() {
        let bare: LinkEntry = serde_json::from_str(r#""https://example.com""#).unwrap();
        assert!(matches!(bare, LinkEntry::Url(_)));

        let labeled: LinkEntry =
            serde_json::from_str(r#"{"label": "GitHub", "url": "https://github.com/jane"}"#)
                .unwrap();
        assert!(matches!(labeled, LinkEntry::Labeled { .. }));
    }

    #[test]
    fn test_record_round_trips_with_absent_fields() {
        let record = CanonicalResumeRecord {
            desired_titles: vec!["Engineer".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("summary"));
        let back: CanonicalResumeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
