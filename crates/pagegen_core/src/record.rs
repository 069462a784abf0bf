//! Field access on data records.

use serde_json::Value;

/// Look up a dot-path such as `author.name` or `tags.0` in a record.
///
/// Numeric parts index into arrays. `null` counts as absent.
pub fn lookup<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    let value = field.split('.').try_fold(record, |value, part| match value {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })?;

    (!value.is_null()).then_some(value)
}

/// Short type name for diagnostics.
pub const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_top_level() {
        let record = json!({ "id": 42, "title": "Hello" });
        assert_eq!(lookup(&record, "id"), Some(&json!(42)));
        assert_eq!(lookup(&record, "title"), Some(&json!("Hello")));
        assert_eq!(lookup(&record, "missing"), None);
    }

    #[test]
    fn test_lookup_nested_and_indexed() {
        let record = json!({
            "author": { "name": "Alice", "links": ["a", "b"] },
        });
        assert_eq!(lookup(&record, "author.name"), Some(&json!("Alice")));
        assert_eq!(lookup(&record, "author.links.1"), Some(&json!("b")));
        assert_eq!(lookup(&record, "author.links.9"), None);
        assert_eq!(lookup(&record, "author.name.first"), None);
    }

    #[test]
    fn test_lookup_null_is_absent() {
        let record = json!({ "slug": null });
        assert_eq!(lookup(&record, "slug"), None);
    }

    #[test]
    fn test_kind() {
        assert_eq!(kind(&json!({})), "object");
        assert_eq!(kind(&json!(1.5)), "number");
    }
}
