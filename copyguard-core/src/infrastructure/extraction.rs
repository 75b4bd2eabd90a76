// copyguard-core/src/infrastructure/extraction.rs

use serde_json::Value;
use tracing::debug;

/// Pulls the JSON object out of a model reply.
///
/// Tried in order: the whole reply, each fenced code block (```json or bare ```), the span
/// between the first `{` and the last `}`, then every balanced `{ … }` span. `None` when
/// nothing parses to an object; callers sanitize an empty object instead.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let found = parse_object(text.trim())
        .or_else(|| fenced_blocks(text).find_map(parse_object))
        .or_else(|| outer_span(text).and_then(parse_object))
        .or_else(|| balanced_spans(text).find_map(parse_object));

    if found.is_none() {
        debug!(chars = text.chars().count(), "No JSON object in generated text");
    }
    found
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn fenced_blocks(text: &str) -> impl Iterator<Item = &str> {
    // Odd segments between ``` markers are fence bodies
    text.split("```").skip(1).step_by(2).map(|block| {
        let (first_line, rest) = block.split_once('\n').unwrap_or((block, ""));
        let tag = first_line.trim();
        if tag.is_empty() || tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            rest
        } else {
            block
        }
    })
}

fn outer_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Balanced top-level `{ … }` spans, honoring JSON strings and escapes.
fn balanced_spans(text: &str) -> impl Iterator<Item = &str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if in_string {
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = idx;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=idx]);
                }
            }
            _ => {}
        }
    }
    spans.into_iter()
}
