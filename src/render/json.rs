//! JSON rendering and validation for outlines.

use serde_json::Value;

use crate::error::Result;
use crate::model::{DocumentOutline, HeadingLevel};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline to JSON.
pub fn to_json(outline: &DocumentOutline, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(outline)?,
        JsonFormat::Compact => serde_json::to_string(outline)?,
    };
    Ok(json)
}

/// Parse an outline from JSON.
pub fn from_json(json: &str) -> Result<DocumentOutline> {
    Ok(serde_json::from_str(json)?)
}

/// Check that a JSON value has the outline shape.
///
/// Returns a description of the first problem found.
pub fn validate_outline_json(value: &Value) -> std::result::Result<(), String> {
    let object = value.as_object().ok_or("top level is not an object")?;

    match object.get("title") {
        Some(Value::String(_)) => {}
        Some(_) => return Err("\"title\" is not a string".into()),
        None => return Err("missing \"title\"".into()),
    }

    let entries = match object.get("outline") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err("\"outline\" is not an array".into()),
        None => return Err("missing \"outline\"".into()),
    };

    for (i, entry) in entries.iter().enumerate() {
        let entry = entry
            .as_object()
            .ok_or_else(|| format!("outline[{}] is not an object", i))?;

        let level = entry
            .get("level")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("outline[{}] has no string \"level\"", i))?;
        level
            .parse::<HeadingLevel>()
            .map_err(|_| format!("outline[{}] has invalid level {:?}", i, level))?;

        if !matches!(entry.get("text"), Some(Value::String(_))) {
            return Err(format!("outline[{}] has no string \"text\"", i));
        }

        match entry.get("page").and_then(Value::as_u64) {
            Some(page) if page >= 1 => {}
            _ => return Err(format!("outline[{}] has no page number >= 1", i)),
        }
    }

    Ok(())
}

/// Whether a JSON value has the outline shape.
pub fn is_valid_outline_json(value: &Value) -> bool {
    validate_outline_json(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutlineEntry;
    use serde_json::json;

    fn sample() -> DocumentOutline {
        DocumentOutline {
            title: "Understanding AI".to_string(),
            outline: vec![
                OutlineEntry::new(HeadingLevel::H1, "Introduction", 1),
                OutlineEntry::new(HeadingLevel::H2, "What is AI?", 2),
            ],
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Understanding AI\""));
        assert!(json.contains("\"level\": \"H2\""));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines
        assert_eq!(from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_rendered_json_validates() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(is_valid_outline_json(&value));
        assert!(is_valid_outline_json(&json!({"title": "", "outline": []})));
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            (json!([]), "top level"),
            (json!({"outline": []}), "missing \"title\""),
            (json!({"title": 3, "outline": []}), "\"title\" is not"),
            (json!({"title": "T"}), "missing \"outline\""),
            (
                json!({"title": "T", "outline": [{"level": "H4", "text": "x", "page": 1}]}),
                "invalid level",
            ),
            (
                json!({"title": "T", "outline": [{"level": "H1", "page": 1}]}),
                "\"text\"",
            ),
            (
                json!({"title": "T", "outline": [{"level": "H1", "text": "x", "page": 0}]}),
                "page number",
            ),
            (
                json!({"title": "T", "outline": [{"level": "H1", "text": "x", "page": "2"}]}),
                "page number",
            ),
        ];

        for (value, expected) in cases {
            let err = validate_outline_json(&value).unwrap_err();
            assert!(err.contains(expected), "{} should mention {}", err, expected);
        }
    }
}
