//! Validation of incoming JSON request bodies.
//!
//! Bodies are read from a loosely typed [`serde_json::Value`] rather than
//! deserialized straight into structs, so a wrong type in one field becomes a
//! field message instead of aborting the whole parse. Every reader records
//! its failure in a shared [`ValidationErrors`] and returns `None`.

mod bulk;
mod import;

use serde_json::{Map, Value};

pub use bulk::BulkActivation;
pub use import::{ProductImport, ProductInput, VariantInput};

use crate::types::Price;
use crate::validation::ValidationErrors;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const NOT_A_STRING: &str = "Not a valid string.";
pub(crate) const NOT_AN_INTEGER: &str = "A valid integer is required.";
pub(crate) const NOT_A_LIST: &str = "Expected a list of items.";
pub(crate) const NOT_AN_OBJECT: &str = "Expected a dictionary of items.";
pub(crate) const BLANK: &str = "This field may not be blank.";

/// Join a parent path and a key into `parent.key`.
pub(crate) fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Read a JSON object, recording an error if it is missing or not an object.
pub(crate) fn object<'v>(
    value: Option<&'v Value>,
    path: &str,
    errors: &mut ValidationErrors,
) -> Option<&'v Map<String, Value>> {
    match value {
        None | Some(Value::Null) => {
            errors.add(path, REQUIRED);
            None
        }
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            errors.add(path, NOT_AN_OBJECT);
            None
        }
    }
}

/// Read a JSON array, recording an error if it is missing or not an array.
pub(crate) fn array<'v>(
    map: &'v Map<String, Value>,
    key: &str,
    prefix: &str,
    errors: &mut ValidationErrors,
) -> Option<&'v Vec<Value>> {
    match map.get(key) {
        None | Some(Value::Null) => {
            errors.add(join(prefix, key), REQUIRED);
            None
        }
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            errors.add(join(prefix, key), NOT_A_LIST);
            None
        }
    }
}

fn check_length(text: &str, max: Option<usize>, path: String, errors: &mut ValidationErrors) -> bool {
    match max {
        Some(max) if text.chars().count() > max => {
            errors.add(
                path,
                format!("Ensure this field has no more than {max} characters."),
            );
            false
        }
        _ => true,
    }
}

/// Read a required, non-blank string. Surrounding whitespace is trimmed.
pub(crate) fn required_text(
    map: &Map<String, Value>,
    key: &str,
    prefix: &str,
    max: Option<usize>,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let path = join(prefix, key);
    match map.get(key) {
        None | Some(Value::Null) => {
            errors.add(path, REQUIRED);
            None
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                errors.add(path, BLANK);
                None
            } else if check_length(s, max, path, errors) {
                Some(s.to_owned())
            } else {
                None
            }
        }
        Some(_) => {
            errors.add(path, NOT_A_STRING);
            None
        }
    }
}

/// Read an optional string. Returns `Ok(None)` when the key is absent or null
/// and `Err(())` when a value is present but invalid.
pub(crate) fn optional_text(
    map: &Map<String, Value>,
    key: &str,
    prefix: &str,
    max: Option<usize>,
    errors: &mut ValidationErrors,
) -> Result<Option<String>, ()> {
    let path = join(prefix, key);
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            if check_length(s, max, path, errors) {
                Ok(Some(s.clone()))
            } else {
                Err(())
            }
        }
        Some(_) => {
            errors.add(path, NOT_A_STRING);
            Err(())
        }
    }
}

/// Read an external identifier from `external_id`, falling back to `id`.
///
/// Source platforms send numeric ids, so integers are accepted and kept in
/// their decimal form.
pub(crate) fn identifier(
    map: &Map<String, Value>,
    prefix: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let found = ["external_id", "id"]
        .into_iter()
        .find_map(|key| map.get(key).filter(|v| !v.is_null()).map(|v| (key, v)));
    let Some((key, value)) = found else {
        errors.add(join(prefix, "external_id"), REQUIRED);
        return None;
    };
    let path = join(prefix, key);

    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                errors.add(path, BLANK);
                None
            } else if check_length(s, Some(255), path, errors) {
                Some(s.to_owned())
            } else {
                None
            }
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => {
            errors.add(path, "Must be a string or an integer.");
            None
        }
    }
}

/// Read a price given as a JSON string or number.
///
/// Returns `Ok(None)` for an absent optional price and `Err(())` once an
/// error has been recorded.
pub(crate) fn price(
    map: &Map<String, Value>,
    key: &str,
    prefix: &str,
    required: bool,
    errors: &mut ValidationErrors,
) -> Result<Option<Price>, ()> {
    let path = join(prefix, key);
    let value = map.get(key);
    if is_missing(value) {
        if required {
            errors.add(path, REQUIRED);
            return Err(());
        }
        return Ok(None);
    }

    let parsed = match value {
        Some(Value::String(s)) => Price::parse(s),
        Some(Value::Number(n)) => Price::parse(&n.to_string()),
        _ => Err(crate::types::PriceError::Invalid),
    };

    parsed.map(Some).map_err(|e| errors.add(path, e.to_string()))
}

/// Read a non-negative integer that fits an `INTEGER` column.
pub(crate) fn non_negative_int(
    map: &Map<String, Value>,
    key: &str,
    prefix: &str,
    errors: &mut ValidationErrors,
) -> Option<i32> {
    let path = join(prefix, key);
    let number = match map.get(key) {
        None | Some(Value::Null) => {
            errors.add(path, REQUIRED);
            return None;
        }
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    let Some(number) = number else {
        errors.add(path, NOT_AN_INTEGER);
        return None;
    };
    if number < 0 {
        errors.add(path, "Ensure this value is greater than or equal to 0.");
        return None;
    }
    i32::try_from(number).map_or_else(
        |_| {
            errors.add(
                path,
                format!("Ensure this value is less than or equal to {}.", i32::MAX),
            );
            None
        },
        Some,
    )
}

/// Read a required boolean (`true`/`false`, or the strings `"true"`/`"false"`).
pub(crate) fn boolean(
    map: &Map<String, Value>,
    key: &str,
    prefix: &str,
    errors: &mut ValidationErrors,
) -> Option<bool> {
    let path = join(prefix, key);
    match map.get(key) {
        None | Some(Value::Null) => {
            errors.add(path, REQUIRED);
            None
        }
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Some(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Some(false),
        Some(_) => {
            errors.add(path, "Must be a valid boolean.");
            None
        }
    }
}

/// Require the request body itself to be a JSON object.
pub(crate) fn root(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    body.as_object().ok_or_else(|| {
        ValidationErrors::single("non_field_errors", "Invalid data. Expected a dictionary.")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn test_required_text_trims_and_rejects_blank() {
        let mut errors = ValidationErrors::new();
        let m = map(json!({"a": "  hi ", "b": "   ", "c": 4}));

        assert_eq!(required_text(&m, "a", "", None, &mut errors), Some("hi".into()));
        assert_eq!(required_text(&m, "b", "", None, &mut errors), None);
        assert_eq!(required_text(&m, "c", "", None, &mut errors), None);
        assert_eq!(required_text(&m, "d", "p", None, &mut errors), None);

        assert_eq!(errors.messages("b"), [BLANK]);
        assert_eq!(errors.messages("c"), [NOT_A_STRING]);
        assert_eq!(errors.messages("p.d"), [REQUIRED]);
    }

    #[test]
    fn test_identifier_accepts_integer_and_alias() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            identifier(&map(json!({"id": 123_456})), "", &mut errors),
            Some("123456".into())
        );
        assert_eq!(
            identifier(&map(json!({"external_id": "gid-1", "id": 9})), "", &mut errors),
            Some("gid-1".into())
        );
        assert!(errors.is_empty());

        assert_eq!(identifier(&map(json!({"id": 1.5})), "x", &mut errors), None);
        assert!(errors.contains("x.id"));
        assert_eq!(identifier(&map(json!({})), "y", &mut errors), None);
        assert!(errors.contains("y.external_id"));
    }

    #[test]
    fn test_price_from_string_and_number() {
        let mut errors = ValidationErrors::new();
        let m = map(json!({"s": "19.99", "n": 5, "f": 2.5, "bad": true}));

        assert_eq!(price(&m, "s", "", true, &mut errors).unwrap().unwrap().to_string(), "19.99");
        assert_eq!(price(&m, "n", "", true, &mut errors).unwrap().unwrap().to_string(), "5.00");
        assert_eq!(price(&m, "f", "", true, &mut errors).unwrap().unwrap().to_string(), "2.50");
        assert_eq!(price(&m, "none", "", false, &mut errors), Ok(None));
        assert!(errors.is_empty());

        assert!(price(&m, "bad", "", true, &mut errors).is_err());
        assert!(price(&m, "none", "", true, &mut errors).is_err());
        assert!(errors.contains("bad"));
        assert_eq!(errors.messages("none"), [REQUIRED]);
    }

    #[test]
    fn test_non_negative_int() {
        let mut errors = ValidationErrors::new();
        let m = map(json!({"a": 3, "b": "7", "c": -1, "d": 1.5, "e": 3_000_000_000_i64}));

        assert_eq!(non_negative_int(&m, "a", "", &mut errors), Some(3));
        assert_eq!(non_negative_int(&m, "b", "", &mut errors), Some(7));
        assert_eq!(non_negative_int(&m, "c", "", &mut errors), None);
        assert_eq!(non_negative_int(&m, "d", "", &mut errors), None);
        assert_eq!(non_negative_int(&m, "e", "", &mut errors), None);

        assert_eq!(errors.fields().collect::<Vec<_>>(), ["c", "d", "e"]);
    }

    #[test]
    fn test_boolean() {
        let mut errors = ValidationErrors::new();
        let m = map(json!({"t": true, "s": "False", "n": 1}));
        assert_eq!(boolean(&m, "t", "", &mut errors), Some(true));
        assert_eq!(boolean(&m, "s", "", &mut errors), Some(false));
        assert_eq!(boolean(&m, "n", "", &mut errors), None);
        assert!(errors.contains("n"));
    }
}
