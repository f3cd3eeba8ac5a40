//! Locale-aware date normalization.
//!
//! Converts free-form date phrases found in resumes ("January 2020",
//! "янв. 2021", "03/2019", "по настоящее время") into the canonical
//! `YYYY-MM` / `YYYY` forms or the `"present"` sentinel.
//!
//! Pure functions: no I/O, no shared state, safe to call concurrently.

use regex::Regex;

use crate::error::DateError;

/// Sentinel for an ongoing position.
pub const PRESENT: &str = "present";

/// Normalize a date phrase into `YYYY-MM`, `YYYY` or [`PRESENT`].
///
/// `locale_hint` orders the month-name lookup but never blocks it: resumes
/// mix languages freely, so both English and Russian maps are always
/// consulted. Already-normalized input passes through unchanged.
pub fn normalize(phrase: &str, locale_hint: &str) -> Result<String, DateError> {
    let trimmed = phrase.trim();
    if trimmed.is_empty() {
        return Err(DateError {
            phrase: phrase.to_string(),
        });
    }

    // Idempotent on canonical forms.
    if is_normalized(trimmed) {
        return Ok(trimmed.to_string());
    }

    let lower = trimmed.to_lowercase();

    if is_present_phrase(&lower) {
        return Ok(PRESENT.to_string());
    }

    // Numeric forms: MM/YYYY, MM.YYYY, YYYY/MM, YYYY.MM.
    let numeric = Regex::new(r"^(\d{1,4})\s*[/.]\s*(\d{1,4})$").unwrap();
    if let Some(caps) = numeric.captures(&lower) {
        let a = &caps[1];
        let b = &caps[2];
        if let Some(date) = pair_to_date(a, b).or_else(|| pair_to_date(b, a)) {
            return Ok(date);
        }
    }

    // Month-name forms: "January 2020", "2021 марта", "Sept. 2019".
    let mut year: Option<u32> = None;
    let mut month: Option<u32> = None;
    for token in lower.split(|c: char| c.is_whitespace() || c == ',') {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        if token.is_empty() {
            continue;
        }
        if year.is_none() && token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
            year = Some(token.parse().unwrap_or(0));
            continue;
        }
        if month.is_none() {
            month = month_from_name(token, locale_hint);
        }
    }

    match (year, month) {
        (Some(y), Some(m)) if y >= 1000 => Ok(format!("{y:04}-{m:02}")),
        (Some(y), None) if y >= 1000 => Ok(format!("{y:04}")),
        _ => Err(DateError {
            phrase: phrase.to_string(),
        }),
    }
}

/// True for strings already in `YYYY-MM`, `YYYY` or sentinel form.
pub fn is_normalized(s: &str) -> bool {
    if s == PRESENT {
        return true;
    }
    let canonical = Regex::new(r"^(\d{4})(?:-(\d{2}))?$").unwrap();
    match canonical.captures(s) {
        Some(caps) => match caps.get(2) {
            Some(m) => {
                let month: u32 = m.as_str().parse().unwrap_or(0);
                (1..=12).contains(&month)
            }
            None => true,
        },
        None => false,
    }
}

/// Interpret a (month, year) digit pair, rejecting impossible months.
fn pair_to_date(month: &str, year: &str) -> Option<String> {
    if year.len() != 4 || month.len() > 2 {
        return None;
    }
    let y: u32 = year.parse().ok()?;
    let m: u32 = month.parse().ok()?;
    if (1..=12).contains(&m) && y >= 1000 {
        Some(format!("{y:04}-{m:02}"))
    } else {
        None
    }
}

/// Phrases that mean "still ongoing", across supported locales.
fn is_present_phrase(lower: &str) -> bool {
    const PRESENT_PHRASES: &[&str] = &[
        "present",
        "current",
        "currently",
        "now",
        "ongoing",
        "to date",
        "настоящее время",
        "по настоящее время",
        "наст. время",
        "наст время",
        "по н.в.",
        "сейчас",
        "по сей день",
        "текущее время",
    ];
    PRESENT_PHRASES
        .iter()
        .any(|p| lower == *p || lower.trim_start_matches("to ").trim() == *p)
}

/// Map a localized month name or abbreviation to its two-digit number.
///
/// The hint's locale is tried first; the other locale is a fallback, not
/// an error.
fn month_from_name(token: &str, locale_hint: &str) -> Option<u32> {
    if locale_hint.starts_with("ru") {
        month_ru(token).or_else(|| month_en(token))
    } else {
        month_en(token).or_else(|| month_ru(token))
    }
}

fn month_en(token: &str) -> Option<u32> {
    let month = match token {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn month_ru(token: &str) -> Option<u32> {
    // Nominative, genitive (as written after day numbers) and common
    // abbreviations.
    let month = match token {
        "январь" | "января" | "янв" => 1,
        "февраль" | "февраля" | "фев" => 2,
        "март" | "марта" | "мар" => 3,
        "апрель" | "апреля" | "апр" => 4,
        "май" | "мая" => 5,
        "июнь" | "июня" | "июн" => 6,
        "июль" | "июля" | "июл" => 7,
        "август" | "августа" | "авг" => 8,
        "сентябрь" | "сентября" | "сент" | "сен" => 9,
        "октябрь" | "октября" | "окт" => 10,
        "ноябрь" | "ноября" | "нояб" | "ноя" => 11,
        "декабрь" | "декабря" | "дек" => 12,
        _ => return None,
    };
    Some(month)
}
