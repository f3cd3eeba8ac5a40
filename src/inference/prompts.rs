//! Instruction payloads for the inference capability.
//!
//! One variant per supported source language. Both variants steer the
//! model toward preserving source-language tokens (job titles, company
//! names) while normalizing structural fields into the canonical schema.

use sha2::{Digest, Sha256};

/// English instruction payload.
pub const EXTRACT_PROMPT_EN: &str = r#"You are extracting structured data from a resume.

Read the resume text and produce JSON with exactly these fields (omit any
field the resume gives no information for):
{
    "desired_titles": ["job titles the candidate wants"],
    "summary": "short professional summary",
    "skills": ["skill name" or {"name": "...", "level": 1-5, "type": "..."}],
    "experience": [{
        "employer": "...", "title": "...",
        "start": "date as written", "end": "date as written or ongoing",
        "description": "...", "location": "..."
    }],
    "location_preference": "...",
    "schedule": "...",
    "salary_expectation": "...",
    "availability": "...",
    "links": ["url" or {"label": "...", "url": "..."}]
}

Rules:
- Keep job titles, employer names and skill names exactly as written.
- Copy dates as they appear; do not invent or reformat them.
- Never fabricate a field the resume does not mention.
- Output only the JSON object."#;

/// Russian instruction payload.
///
/// Keeps source-language tokens intact: titles and employer names stay in
/// Russian while the field structure matches the canonical schema.
pub const EXTRACT_PROMPT_RU: &str = r#"Вы извлекаете структурированные данные из резюме.

Прочитайте текст резюме и выдайте JSON со следующими полями (пропускайте
поля, для которых в резюме нет информации):
{
    "desired_titles": ["желаемые должности"],
    "summary": "краткое описание кандидата",
    "skills": ["название навыка" или {"name": "...", "level": 1-5, "type": "..."}],
    "experience": [{
        "employer": "...", "title": "...",
        "start": "дата как в тексте", "end": "дата как в тексте или по настоящее время",
        "description": "...", "location": "..."
    }],
    "location_preference": "...",
    "schedule": "...",
    "salary_expectation": "...",
    "availability": "...",
    "links": ["url" или {"label": "...", "url": "..."}]
}

Правила:
- Должности, названия компаний и навыков оставляйте как в оригинале.
- Даты копируйте как написано, не переформатируйте.
- Не выдумывайте поля, которых нет в резюме.
- Выводите только JSON-объект."#;

/// Pick the instruction payload for a language hint.
///
/// Unknown hints fall back to English.
pub fn prompt_for_language(language_hint: &str) -> &'static str {
    if language_hint.starts_with("ru") {
        EXTRACT_PROMPT_RU
    } else {
        EXTRACT_PROMPT_EN
    }
}

/// Short fingerprint of a prompt, reported in result metadata so audit
/// records can correlate outputs with the instruction text that produced
/// them.
pub fn prompt_hash(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let hash = hasher.finalize();
    hex_prefix(&hash, 8)
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    bytes
        .iter()
        .take(len)
        .map(|b| format!("{b:02x}"))
        .collect()
}
