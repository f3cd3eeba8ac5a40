//! Defensive, field-by-field validation of untrusted model output.
//!
//! Model output is best modeled as a loosely-typed associative structure
//! validated incrementally, not fed to a strict deserializer. Each canonical
//! field is classified as `mapped` (present and structurally valid),
//! `partial` (present but incomplete, coerced best-effort) or `unmapped`
//! (absent). The three sets are disjoint and together cover the full
//! canonical field list, in canonical order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::dates;
use crate::schema::record::{
    CanonicalResumeRecord, ExperienceEntry, LinkEntry, Skill, SkillEntry, CANONICAL_FIELDS,
};

/// Validation strictness, chosen once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Missing required fields and malformed values are hard failures.
    Strict,
    /// Missing/malformed values degrade to partial/unmapped classification.
    #[default]
    Flexible,
}

/// Result of a validation walk.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Best-effort record, populated even when strict errors are present
    /// so callers can return it for diagnostics.
    pub record: CanonicalResumeRecord,
    pub mapped: Vec<String>,
    pub partial: Vec<String>,
    pub unmapped: Vec<String>,
    /// Strict-mode error notes, `SCHEMA_VALIDATION_ERROR:`-prefixed.
    /// Always empty in flexible mode.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Mapped,
    Partial,
    Unmapped,
}

/// Recover a JSON object from raw model output.
///
/// Tolerates code fences and leading/trailing prose around the object.
/// Returns `None` when no object can be recovered at all; per the retry
/// policy that is a validation outcome, not an inference failure.
pub fn parse_candidate(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(unfenced) {
        return Some(value);
    }

    // Fall back to the outermost brace span.
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&unfenced[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Walk the canonical schema field-by-field and classify each one.
///
/// `required` names fields whose absence is a hard error in strict mode;
/// date sub-fields are best-effort in both modes and never produce errors.
pub fn validate(
    candidate: &Value,
    mode: ValidationMode,
    required: &[String],
    locale_hint: &str,
) -> ValidationOutcome {
    let mut record = CanonicalResumeRecord::default();
    let mut mapped = Vec::new();
    let mut partial = Vec::new();
    let mut unmapped = Vec::new();
    let mut errors = Vec::new();
    let mut notes: Vec<String> = Vec::new();

    let object = candidate.as_object();
    if object.is_none() && mode == ValidationMode::Strict && !candidate.is_null() {
        errors.push("SCHEMA_VALIDATION_ERROR: model output was not a JSON object".to_string());
    }

    for &field in CANONICAL_FIELDS {
        let value = object.and_then(|map| map.get(field)).unwrap_or(&Value::Null);

        if value.is_null() {
            if mode == ValidationMode::Strict && required.iter().any(|r| r == field) {
                errors.push(format!(
                    "SCHEMA_VALIDATION_ERROR: required field `{field}` missing"
                ));
            }
            unmapped.push(field.to_string());
            continue;
        }

        let class = match field {
            "desired_titles" => visit_desired_titles(value, &mut record, &mut notes),
            "summary" => visit_summary(value, &mut record, &mut notes),
            "skills" => visit_skills(value, &mut record, &mut notes),
            "experience" => visit_experience(value, locale_hint, &mut record, &mut notes),
            "links" => visit_links(value, &mut record, &mut notes),
            "location_preference" => {
                visit_freeform(field, value, &mut record.location_preference, &mut notes)
            }
            "schedule" => visit_freeform(field, value, &mut record.schedule, &mut notes),
            "salary_expectation" => {
                visit_freeform(field, value, &mut record.salary_expectation, &mut notes)
            }
            "availability" => visit_freeform(field, value, &mut record.availability, &mut notes),
            // CANONICAL_FIELDS contains nothing else.
            _ => Class::Unmapped,
        };

        match class {
            Class::Mapped => mapped.push(field.to_string()),
            Class::Partial => partial.push(field.to_string()),
            Class::Unmapped => unmapped.push(field.to_string()),
        }
    }

    // Coercion notes become errors only under strict validation.
    if mode == ValidationMode::Strict {
        errors.extend(
            notes
                .into_iter()
                .map(|n| format!("SCHEMA_VALIDATION_ERROR: {n}")),
        );
    }

    debug!(
        mapped = mapped.len(),
        partial = partial.len(),
        unmapped = unmapped.len(),
        errors = errors.len(),
        "schema validation walk finished"
    );

    ValidationOutcome {
        record,
        mapped,
        partial,
        unmapped,
        errors,
    }
}

/// Coerce any scalar-ish value into a display string.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn visit_desired_titles(
    value: &Value,
    record: &mut CanonicalResumeRecord,
    notes: &mut Vec<String>,
) -> Class {
    match value {
        Value::Array(items) => {
            let mut clean = true;
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => record.desired_titles.push(s.clone()),
                    other => {
                        // Keep the entry in degraded form rather than drop it.
                        let text = coerce_string(other).unwrap_or_else(|| other.to_string());
                        record.desired_titles.push(text);
                        notes.push(format!("`desired_titles[{i}]` is not a string"));
                        clean = false;
                    }
                }
            }
            if clean {
                Class::Mapped
            } else {
                Class::Partial
            }
        }
        Value::String(s) => {
            record.desired_titles.push(s.clone());
            notes.push("`desired_titles` was a bare string, expected an array".to_string());
            Class::Partial
        }
        _ => {
            notes.push("`desired_titles` has an unusable shape".to_string());
            Class::Partial
        }
    }
}

fn visit_summary(
    value: &Value,
    record: &mut CanonicalResumeRecord,
    notes: &mut Vec<String>,
) -> Class {
    match value {
        Value::String(s) => {
            record.summary = Some(s.clone());
            Class::Mapped
        }
        other => match coerce_string(other) {
            Some(text) => {
                record.summary = Some(text);
                notes.push("`summary` is not a string".to_string());
                Class::Partial
            }
            None => {
                notes.push("`summary` has an unusable shape".to_string());
                Class::Partial
            }
        },
    }
}

fn visit_skills(
    value: &Value,
    record: &mut CanonicalResumeRecord,
    notes: &mut Vec<String>,
) -> Class {
    let items = match value {
        Value::Array(items) => items,
        Value::String(s) => {
            record.skills.push(SkillEntry::Name(s.clone()));
            notes.push("`skills` was a bare string, expected an array".to_string());
            return Class::Partial;
        }
        _ => {
            notes.push("`skills` has an unusable shape".to_string());
            return Class::Partial;
        }
    };

    let mut clean = true;
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => record.skills.push(SkillEntry::Name(s.clone())),
            Value::Object(map) => {
                let name = map
                    .get("name")
                    .and_then(coerce_string)
                    .or_else(|| map.get("skill").and_then(coerce_string))
                    .or_else(|| map.get("label").and_then(coerce_string));
                let Some(name) = name else {
                    record.skills.push(SkillEntry::Name(item.to_string()));
                    notes.push(format!("`skills[{i}]` has no recognizable name"));
                    clean = false;
                    continue;
                };

                let raw_level = map.get("level").and_then(Value::as_u64);
                let level = raw_level.map(|l| l.clamp(1, 5) as u8);
                if raw_level.is_some_and(|l| !(1..=5).contains(&l)) {
                    notes.push(format!("`skills[{i}].level` outside 1-5, clamped"));
                    clean = false;
                }

                record.skills.push(SkillEntry::Detailed(Skill {
                    name,
                    level,
                    label: map.get("label").and_then(coerce_string),
                    kind: map.get("type").and_then(coerce_string),
                }));
            }
            other => {
                let text = coerce_string(other).unwrap_or_else(|| other.to_string());
                record.skills.push(SkillEntry::Name(text));
                notes.push(format!("`skills[{i}]` is neither string nor object"));
                clean = false;
            }
        }
    }

    if clean {
        Class::Mapped
    } else {
        Class::Partial
    }
}

fn visit_experience(
    value: &Value,
    locale_hint: &str,
    record: &mut CanonicalResumeRecord,
    notes: &mut Vec<String>,
) -> Class {
    let items = match value {
        Value::Array(items) => items,
        _ => {
            notes.push("`experience` has an unusable shape".to_string());
            return Class::Partial;
        }
    };

    let mut clean = true;
    for (i, item) in items.iter().enumerate() {
        let map = match item {
            Value::Object(map) => map,
            other => {
                // A bare string still names a position; keep it as the title.
                let title = coerce_string(other).unwrap_or_else(|| other.to_string());
                record.experience.push(ExperienceEntry {
                    title: Some(title),
                    ..Default::default()
                });
                notes.push(format!("`experience[{i}]` is not an object"));
                clean = false;
                continue;
            }
        };

        let mut entry = ExperienceEntry {
            employer: map
                .get("employer")
                .and_then(coerce_string)
                .or_else(|| map.get("company").and_then(coerce_string)),
            title: map
                .get("title")
                .and_then(coerce_string)
                .or_else(|| map.get("role").and_then(coerce_string)),
            description: map.get("description").and_then(coerce_string),
            location: map.get("location").and_then(coerce_string),
            start: None,
            end: None,
        };

        if entry.employer.is_none() && entry.title.is_none() {
            notes.push(format!("`experience[{i}]` has neither title nor employer"));
            clean = false;
        }

        // Dates are best-effort enrichment, never fatal: a phrase the
        // normalizer rejects is cleared and the field demoted to partial,
        // in strict mode too.
        for (key, slot) in [("start", &mut entry.start), ("end", &mut entry.end)] {
            if let Some(raw) = map.get(key).and_then(coerce_string) {
                match dates::normalize(&raw, locale_hint) {
                    Ok(normalized) => *slot = Some(normalized),
                    Err(_) => clean = false,
                }
            }
        }
        if entry.start.is_none() {
            clean = false;
        }

        record.experience.push(entry);
    }

    if clean {
        Class::Mapped
    } else {
        Class::Partial
    }
}

fn visit_links(
    value: &Value,
    record: &mut CanonicalResumeRecord,
    notes: &mut Vec<String>,
) -> Class {
    let items = match value {
        Value::Array(items) => items,
        Value::String(s) => {
            record.links.push(LinkEntry::Url(s.clone()));
            notes.push("`links` was a bare string, expected an array".to_string());
            return Class::Partial;
        }
        _ => {
            notes.push("`links` has an unusable shape".to_string());
            return Class::Partial;
        }
    };

    let mut clean = true;
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => record.links.push(LinkEntry::Url(s.clone())),
            Value::Object(map) => match map.get("url").and_then(coerce_string) {
                Some(url) => record.links.push(LinkEntry::Labeled {
                    label: map.get("label").and_then(coerce_string),
                    url,
                }),
                None => {
                    record.links.push(LinkEntry::Url(item.to_string()));
                    notes.push(format!("`links[{i}]` has no url"));
                    clean = false;
                }
            },
            other => {
                record.links.push(LinkEntry::Url(other.to_string()));
                notes.push(format!("`links[{i}]` is neither string nor object"));
                clean = false;
            }
        }
    }

    if clean {
        Class::Mapped
    } else {
        Class::Partial
    }
}

/// Free-form scalar-or-object preference fields.
fn visit_freeform(
    field: &str,
    value: &Value,
    slot: &mut Option<Value>,
    notes: &mut Vec<String>,
) -> Class {
    *slot = Some(value.clone());
    if value.is_array() {
        notes.push(format!("`{field}` is an array, expected scalar or object"));
        Class::Partial
    } else {
        Class::Mapped
    }
}
