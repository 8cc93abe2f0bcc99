use serde_json::Value;

use crate::error::PayloadError;

/// Finds the JSON object in an LLM reply. The whole text is tried first,
/// then the span from the first `{` to the last `}` (which also covers
/// fenced code blocks).
pub fn extract_json_object(response: &str) -> Result<Value, PayloadError> {
    if let Ok(value) = serde_json::from_str::<Value>(response.trim()) {
        if value.is_object() {
            return Ok(value);
        }
    }

    let start = response.find('{').ok_or(PayloadError::NotFound)?;
    let end = response.rfind('}').ok_or(PayloadError::NotFound)?;
    if end < start {
        return Err(PayloadError::NotFound);
    }

    let value: Value =
        serde_json::from_str(&response[start..=end]).map_err(PayloadError::Invalid)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(PayloadError::NotFound)
    }
}
