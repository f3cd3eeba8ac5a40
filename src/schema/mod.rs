//! Canonical resume schema and its defensive validator.

pub mod record;
pub mod validator;

pub use record::{
    CanonicalResumeRecord, ExperienceEntry, LinkEntry, Skill, SkillEntry, CANONICAL_FIELDS,
};
pub use validator::{parse_candidate, validate, ValidationMode, ValidationOutcome};
