//! Argument extraction shared by the unit functions

use gauge_core::{GaugeError, Number, Value};

/// Extract a Number from a Value; numeric text is accepted
pub fn extract_number(value: &Value, func: &str, arg: &str) -> Result<Number, GaugeError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => s.parse::<Number>().map_err(GaugeError::from),
        Value::Null => Err(GaugeError::arg_type(func, arg, "Number", "Null")),
        Value::Error(e) => Err(e.clone()),
        other => Err(GaugeError::arg_type(func, arg, "Number", other.type_name())),
    }
}

/// Extract a Text string from a Value
pub fn extract_text<'a>(value: &'a Value, func: &str, arg: &str) -> Result<&'a str, GaugeError> {
    match value {
        Value::Text(s) => Ok(s),
        Value::Null => Err(GaugeError::arg_type(func, arg, "Text", "Null")),
        Value::Error(e) => Err(e.clone()),
        other => Err(GaugeError::arg_type(func, arg, "Text", other.type_name())),
    }
}

/// Inputs at the tool boundary are quantities, never negative
pub fn validate_non_negative(value: Number, func: &str, arg: &str) -> Result<Number, GaugeError> {
    if value.is_negative() {
        return Err(GaugeError::domain_error(format!(
            "{}(): {} must be zero or greater, got {}",
            func, arg, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_core::codes;

    #[test]
    fn test_extract_number() {
        let val = Value::from(42.0);
        assert_eq!(extract_number(&val, "test", "arg").unwrap().to_f64(), 42.0);
    }

    #[test]
    fn test_extract_number_from_text() {
        let val = Value::Text("12.5".to_string());
        assert_eq!(extract_number(&val, "test", "arg").unwrap().to_f64(), 12.5);

        let bad = Value::Text("twelve".to_string());
        assert_eq!(extract_number(&bad, "test", "arg").unwrap_err().code, codes::PARSE_ERROR);
    }

    #[test]
    fn test_extract_text() {
        let val = Value::Text("meters".to_string());
        assert_eq!(extract_text(&val, "test", "arg").unwrap(), "meters");

        let err = extract_text(&Value::Bool(true), "test", "arg").unwrap_err();
        assert_eq!(err.code, codes::ARG_TYPE);
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(Number::from_i64(0), "f", "value").is_ok());
        let err = validate_non_negative(Number::from_i64(-1), "f", "value").unwrap_err();
        assert_eq!(err.code, codes::DOMAIN_ERROR);
    }
}
