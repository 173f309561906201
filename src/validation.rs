//! Field coercion and per-field error collection shared by the serializers.
//!
//! Messages follow the usual REST-framework wording so clients written
//! against that convention keep working.

use indexmap::IndexMap;
use recipe_db::Price;
use recipe_http::AppError;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::ValidateLength;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// One failing field and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// Every field that failed validation, in the order fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, error: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, error);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, error: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            error: error.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages recorded against `field`
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.error.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors.to_string();
        let details = errors
            .errors
            .into_iter()
            .map(|e| serde_json::json!({ "field": e.field, "error": e.error }))
            .collect();
        AppError::validation(details, message)
    }
}

/// Require the payload to be a JSON object.
pub fn expect_object(input: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    input.as_object().ok_or_else(|| {
        ValidationErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(input)
            ),
        )
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Text field rules.
#[derive(Debug, Clone, Copy)]
pub struct CharRules {
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub allow_blank: bool,
}

impl CharRules {
    pub const fn required_text(max_length: usize) -> Self {
        Self {
            max_length: Some(max_length),
            min_length: None,
            allow_blank: false,
        }
    }

    pub const fn optional_text(max_length: Option<usize>) -> Self {
        Self {
            max_length,
            min_length: None,
            allow_blank: true,
        }
    }
}

/// Coerce to a trimmed string. Numbers are accepted and stringified.
pub fn char_field(value: &Value, rules: CharRules) -> Result<String, String> {
    let text = match value {
        Value::Null => return Err(NOT_NULL.to_string()),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(INVALID_STRING.to_string()),
    };

    if text.is_empty() {
        return if rules.allow_blank {
            Ok(text)
        } else {
            Err(NOT_BLANK.to_string())
        };
    }

    let max = rules.max_length.map(|max| max as u64);
    if !text.validate_length(None, max, None) {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            rules.max_length.unwrap_or_default()
        ));
    }
    let min = rules.min_length.map(|min| min as u64);
    if !text.validate_length(min, None, None) {
        return Err(format!(
            "Ensure this field has at least {} characters.",
            rules.min_length.unwrap_or_default()
        ));
    }

    Ok(text)
}

/// Coerce to a 32-bit integer. Integral strings and floats are accepted.
pub fn integer_field(value: &Value) -> Result<i32, String> {
    let wide: i64 = match value {
        Value::Null => return Err(NOT_NULL.to_string()),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i,
            (None, Some(_), _) => i64::MAX,
            (None, None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
            _ => return Err(INVALID_INTEGER.to_string()),
        },
        Value::String(s) => parse_integral(s).ok_or_else(|| INVALID_INTEGER.to_string())?,
        _ => return Err(INVALID_INTEGER.to_string()),
    };

    if wide > i64::from(i32::MAX) {
        return Err(format!(
            "Ensure this value is less than or equal to {}.",
            i32::MAX
        ));
    }
    if wide < i64::from(i32::MIN) {
        return Err(format!(
            "Ensure this value is greater than or equal to {}.",
            i32::MIN
        ));
    }
    Ok(wide as i32)
}

/// Parse an integral string such as `"10"` or `" 10.00 "`. Values past `i64`
/// saturate so the range check reports them.
fn parse_integral(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let whole = match raw.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => raw,
    };

    let digits = whole.strip_prefix(['-', '+']).unwrap_or(whole);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match whole.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if whole.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

/// Coerce a JSON string or number to a [`Price`].
pub fn decimal_field(value: &Value) -> Result<Price, String> {
    let raw = match value {
        Value::Null => return Err(NOT_NULL.to_string()),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(recipe_db::PriceError::Invalid.to_string()),
    };
    raw.parse::<Price>().map_err(|e| e.to_string())
}

/// An ordered JSON object. Keys are emitted in insertion order.
pub type Representation = IndexMap<&'static str, Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn char_field_trims_and_checks_blank() {
        let rules = CharRules::required_text(10);
        assert_eq!(char_field(&json!("  Soup "), rules).unwrap(), "Soup");
        assert_eq!(char_field(&json!("   "), rules).unwrap_err(), NOT_BLANK);
        assert_eq!(char_field(&json!(null), rules).unwrap_err(), NOT_NULL);
        assert_eq!(char_field(&json!(["x"]), rules).unwrap_err(), INVALID_STRING);
        assert_eq!(char_field(&json!(42), rules).unwrap(), "42");
        assert_eq!(
            char_field(&json!("x".repeat(11)), rules).unwrap_err(),
            "Ensure this field has no more than 10 characters."
        );
        assert_eq!(
            char_field(&json!(""), CharRules::optional_text(None)).unwrap(),
            ""
        );

        // Length counts characters, not bytes
        assert_eq!(char_field(&json!("é".repeat(10)), rules).unwrap(), "é".repeat(10));
        let short = CharRules {
            min_length: Some(6),
            ..rules
        };
        assert_eq!(
            char_field(&json!("pw"), short).unwrap_err(),
            "Ensure this field has at least 6 characters."
        );
    }

    #[test]
    fn integer_field_accepts_integral_values() {
        assert_eq!(integer_field(&json!(10)).unwrap(), 10);
        assert_eq!(integer_field(&json!("15")).unwrap(), 15);
        assert_eq!(integer_field(&json!(20.0)).unwrap(), 20);
        assert_eq!(integer_field(&json!("10.00")).unwrap(), 10);
        assert_eq!(integer_field(&json!(" -7.0 ")).unwrap(), -7);
        assert_eq!(integer_field(&json!("10.05")).unwrap_err(), INVALID_INTEGER);
        assert_eq!(integer_field(&json!(".0")).unwrap_err(), INVALID_INTEGER);
        assert_eq!(integer_field(&json!(2.5)).unwrap_err(), INVALID_INTEGER);
        assert_eq!(integer_field(&json!("ten")).unwrap_err(), INVALID_INTEGER);
        assert_eq!(integer_field(&json!(true)).unwrap_err(), INVALID_INTEGER);
        assert!(integer_field(&json!(3_000_000_000_i64))
            .unwrap_err()
            .contains("less than or equal to 2147483647"));
        assert!(integer_field(&json!(18446744073709551615u64))
            .unwrap_err()
            .contains("less than or equal to 2147483647"));
        assert!(integer_field(&json!("-99999999999999999999"))
            .unwrap_err()
            .contains("greater than or equal to -2147483648"));
    }

    #[test]
    fn decimal_field_accepts_strings_and_numbers() {
        assert_eq!(decimal_field(&json!("5.00")).unwrap().cents(), 500);
        assert_eq!(decimal_field(&json!(5.25)).unwrap().cents(), 525);
        assert_eq!(decimal_field(&json!(7)).unwrap().cents(), 700);
        assert_eq!(
            decimal_field(&json!({})).unwrap_err(),
            "A valid number is required."
        );
    }

    #[test]
    fn non_object_payload_is_a_non_field_error() {
        let errors = expect_object(&json!([1, 2])).unwrap_err();
        assert_eq!(
            errors.for_field(NON_FIELD_ERRORS).collect::<Vec<_>>(),
            vec!["Invalid data. Expected a dictionary, but got list."]
        );
    }

    #[test]
    fn representation_keeps_insertion_order() {
        let mut repr = Representation::new();
        repr.insert("zeta", json!(1));
        repr.insert("alpha", json!("a"));

        assert_eq!(
            serde_json::to_string(&repr).unwrap(),
            r#"{"zeta":1,"alpha":"a"}"#
        );
        assert_eq!(repr.keys().copied().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn validation_errors_become_app_error_details() {
        let mut errors = ValidationErrors::new();
        errors.add("title", REQUIRED);
        errors.add("price", "A valid number is required.");

        match AppError::from(errors) {
            AppError::Validation { details, .. } => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0], json!({"field": "title", "error": REQUIRED}));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
