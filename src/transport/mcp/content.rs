//! Reduce the content fragments of one `tools/call` into a single value
//!
//! Rules, applied in order:
//!
//! 1. Keep only `text` fragments, preserving their order.
//! 2. Two or more survivors that each parse as a JSON object on their own
//!    are joined with `,` inside `[...]`. The original bytes of each
//!    fragment are kept, nothing is re-serialized.
//! 3. Otherwise the survivors are concatenated with no separator.
//! 4. An empty result becomes `Value::Null`.
//!
//! Rule 2 is checked per fragment, so one object split over two fragments
//! (`{"a": ` + `1}`) falls through to rule 3, which reassembles it.

use serde_json::Value;

use super::types::ResultFragment;

/// Normalize `fragments` into a JSON string value or `Value::Null`.
///
/// # Examples
///
/// ```
/// use serde_json::Value;
/// use toolbox_transport::transport::mcp::content::normalize;
/// use toolbox_transport::transport::mcp::types::ResultFragment;
///
/// let out = normalize(&[ResultFragment::text("Hello "), ResultFragment::text("World")]);
/// assert_eq!(out, Value::String("Hello World".to_string()));
/// assert_eq!(normalize(&[]), Value::Null);
/// ```
pub fn normalize(fragments: &[ResultFragment]) -> Value {
    let texts: Vec<&str> = fragments.iter().filter_map(ResultFragment::as_text).collect();

    let joined = if texts.len() >= 2 && texts.iter().all(|t| is_json_object(t)) {
        format!("[{}]", texts.join(","))
    } else {
        texts.concat()
    };

    if joined.is_empty() {
        Value::Null
    } else {
        Value::String(joined)
    }
}

fn is_json_object(text: &str) -> bool {
    matches!(serde_json::from_str::<Value>(text), Ok(Value::Object(_)))
}
