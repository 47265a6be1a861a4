//! Recovery of JSON payloads the oracle embeds in free text. Responses may
//! arrive wrapped in markdown fences or surrounded by prose; callers strip
//! the wrapper, try a direct parse, then fall back to scanning for the first
//! balanced bracket group.

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

/// Strip markdown code fences from a response.
pub fn strip_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// The first balanced `open`..`close` group in `s`, honoring JSON string
/// literals and escapes so brackets inside strings don't miscount.
pub fn first_balanced(s: &str, open: char, close: char) -> Option<&str> {
    let start = s.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in s[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + idx + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a JSON array out of a free-text response: fence-strip, direct
/// parse, then first balanced `[...]` substring.
pub fn recover_array<T: DeserializeOwned>(raw: &str) -> Result<T> {
    recover(raw, '[', ']')
}

/// Parse a JSON object out of a free-text response: fence-strip, direct
/// parse, then first balanced `{...}` substring.
pub fn recover_object<T: DeserializeOwned>(raw: &str) -> Result<T> {
    recover(raw, '{', '}')
}

fn recover<T: DeserializeOwned>(raw: &str, open: char, close: char) -> Result<T> {
    let stripped = strip_fences(raw);
    if let Ok(value) = serde_json::from_str(stripped) {
        return Ok(value);
    }
    let candidate = first_balanced(stripped, open, close)
        .ok_or_else(|| anyhow!("no {open}{close}-delimited JSON found in response"))?;
    serde_json::from_str(candidate).map_err(|e| anyhow!("recovered JSON did not parse: {e}"))
}
