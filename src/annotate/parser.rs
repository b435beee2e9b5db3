//! Multi-strategy parser for the question-generation response.
//!
//! The generation service is asked for a JSON object with three category
//! keys, but what actually comes back is untrusted free text: sometimes clean
//! JSON, sometimes JSON inside a markdown fence, sometimes JSON buried in
//! prose, sometimes nothing recognizable at all. The parser is total over
//! that variant; it never fails, and anything unparseable degrades to three
//! empty category lists with the raw text preserved for display.
//!
//! Strategy order for text input:
//! 1. fenced ```` ```json ```` block
//! 2. slice from the first `{` to the last `}`
//! 3. free-text fallback (empty categories, raw display text)

use serde_json::{Map, Value};

/// Raw question payload before classification.
///
/// `Text` is what the generation service produces; `Structured` and `Legacy`
/// arise when re-reading persisted artifacts or older result files.
#[derive(Debug, Clone)]
pub enum RawQuestions {
    /// Already-structured JSON object.
    Structured(Map<String, Value>),
    /// Uncategorized flat list of questions (legacy artifact format).
    Legacy(Vec<String>),
    /// Unconstrained response text.
    Text(String),
}

impl From<String> for RawQuestions {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for RawQuestions {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Structured(map),
            Value::Array(items) => Self::Legacy(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect(),
            ),
            Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Canonical question partition extracted from a raw payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuestions {
    pub administrative: Vec<String>,
    pub research: Vec<String>,
    pub clinical: Vec<String>,
    /// Combined human-readable block (or the raw text when nothing parsed).
    pub display: String,
}

impl ParsedQuestions {
    pub fn total(&self) -> usize {
        self.administrative.len() + self.research.len() + self.clinical.len()
    }
}

/// Classify and extract the three question categories from a raw payload.
///
/// Never fails: every parse failure falls through to the free-text arm, which
/// yields empty category lists and the original string as display text.
pub fn parse(raw: RawQuestions) -> ParsedQuestions {
    match raw {
        RawQuestions::Structured(map) => from_object(&map),
        RawQuestions::Legacy(items) => ParsedQuestions {
            display: bullet_list(&items),
            ..Default::default()
        },
        RawQuestions::Text(text) => parse_text(&text),
    }
}

fn parse_text(text: &str) -> ParsedQuestions {
    if let Some(block) = extract_fenced_json(text)
        && let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&block)
    {
        return from_object(&map);
    }

    if let Some(slice) = extract_braced(text)
        && let Ok(Value::Object(map)) = serde_json::from_str::<Value>(slice)
    {
        return from_object(&map);
    }

    // No recognizable structure: keep the raw text, categories stay empty.
    ParsedQuestions {
        display: text.to_owned(),
        ..Default::default()
    }
}

/// Extract the contents of the first ```` ```json ```` fence, if any.
fn extract_fenced_json(text: &str) -> Option<String> {
    let start = text.find("```json")?;
    let body = &text[start + "```json".len()..];
    let end = body.find("```")?;
    Some(body[..end].trim().to_owned())
}

/// Slice from the first `{` to the last `}` inclusive.
fn extract_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn from_object(map: &Map<String, Value>) -> ParsedQuestions {
    let administrative = category(map, "administrative_questions", "administrative");
    let research = category(map, "research_questions", "research");
    let clinical = category(map, "clinical_questions", "clinical");

    let display = render_display(&administrative, &research, &clinical);

    ParsedQuestions {
        administrative,
        research,
        clinical,
        display,
    }
}

/// Fetch one category, preferring the canonical `*_questions` key over the
/// legacy bare key. Anything that is not an array of strings normalizes to
/// an empty list.
fn category(map: &Map<String, Value>, canonical: &str, legacy: &str) -> Vec<String> {
    let value = map.get(canonical).or_else(|| map.get(legacy));
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|q| format!("- {q}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_display(administrative: &[String], research: &[String], clinical: &[String]) -> String {
    let mut sections = Vec::new();
    for (title, items) in [
        ("Administrative Questions:", administrative),
        ("Research Questions:", research),
        ("Clinical Questions:", clinical),
    ] {
        if !items.is_empty() {
            sections.push(format!("{title}\n{}", bullet_list(items)));
        }
    }
    sections.join("\n\n")
}
