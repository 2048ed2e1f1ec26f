/// Utility functions for pulling the JSON payload out of model text parts.
///
/// Structured-output responses are normally bare JSON, but models sometimes wrap
/// the object in a markdown fence or a sentence of prose. Only that wrapping is
/// removed here; the object itself is never repaired.

/// Strip a surrounding markdown code fence (```json ... ``` or ``` ... ```)
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Find the byte range of the first balanced top-level JSON object,
/// accounting for braces inside string literals.
fn balanced_object_span(text: &str) -> Option<(usize, usize)> {
    let start = text.find('{')?;
    let mut brace_count = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => brace_count += 1,
            '}' if !in_string => {
                brace_count -= 1;
                if brace_count == 0 {
                    return Some((start, start + i + 1));
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract the JSON object from a model text part.
pub fn extract_json(text: &str) -> anyhow::Result<String> {
    // Already clean JSON
    let trimmed = text.trim();
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    let unfenced = strip_code_fence(trimmed);
    if serde_json::from_str::<serde_json::Value>(unfenced).is_ok() {
        tracing::debug!("Extracted JSON from markdown code block");
        return Ok(unfenced.to_string());
    }

    // Prose before or after the object
    if let Some((start, end)) = balanced_object_span(unfenced) {
        let candidate = &unfenced[start..end];
        if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
            tracing::debug!("Extracted JSON by matching braces");
            return Ok(candidate.to_string());
        }
    }

    anyhow::bail!(
        "Failed to extract valid JSON from response. Text length: {}, Preview (first 300 chars): {}",
        text.len(),
        text.chars().take(300).collect::<String>()
    )
}
