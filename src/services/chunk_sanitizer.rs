//! Cleans streamed model fragments into displayable HTML. Each chunk is
//! handled on its own; state never carries over between chunks.

use serde_json::Value;

const SSE_DATA_PREFIX: &str = "data:";
const CODE_FENCE: &str = "```";

/// Normalizes one raw fragment. Total: never panics, never errors.
///
/// - blank input becomes `""`
/// - a single leading `data:` is removed
/// - a surrounding code fence (with its language line) is unwrapped
/// - a JSON object carrying a non-blank scalar `html` value is replaced by its
///   text; anything after the first complete JSON value is ignored
pub fn sanitize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = raw.strip_prefix(SSE_DATA_PREFIX).unwrap_or(raw).trim();
    let text = strip_code_fence(text);

    if text.starts_with('{') {
        if let Some(html) = html_field(text) {
            return html;
        }
    }

    text.to_string()
}

/// Removes a fence opened at the start of `text`. The opening line is dropped
/// only when it ends in a newline past index 0; the body is cut at the last
/// fence when one follows the opening position.
pub fn strip_code_fence(text: &str) -> &str {
    if !text.starts_with(CODE_FENCE) {
        return text;
    }

    let mut body = text;
    if let Some(newline) = body.find('\n').filter(|&idx| idx > 0) {
        body = &body[newline + 1..];
    }
    if let Some(end) = body.rfind(CODE_FENCE).filter(|&idx| idx > 0) {
        body = body[..end].trim();
    }
    body
}

fn html_field(text: &str) -> Option<String> {
    let value = serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()?
        .ok()?;

    let html = match value.get("html")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!html.is_empty()).then_some(html)
}
