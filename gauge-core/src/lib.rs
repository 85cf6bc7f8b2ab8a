//! Gauge Core - Fundamental types
//!
//! This crate provides the core types used throughout Gauge:
//! - `Number`: Real numbers with stable text rendering
//! - `Value`: Runtime values (numbers, text, objects, errors)
//! - `GaugeError`: Structured errors for tool consumers

mod number;
mod value;
mod error;

pub use number::{Number, NumberError};
pub use value::Value;
pub use error::{GaugeError, Severity, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Number, Value, GaugeError, Severity};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;
        use std::collections::BTreeMap;

        #[test]
        fn test_from_f64() {
            let v: Value = 42.0.into();
            assert!(matches!(v, Value::Number(_)));
            assert_eq!(v.as_number().unwrap().to_f64(), 42.0);
        }

        #[test]
        fn test_from_str() {
            let v: Value = "hello".into();
            assert_eq!(v.as_text(), Some("hello"));
        }

        #[test]
        fn test_type_name() {
            assert_eq!(Value::Number(Number::from_i64(0)).type_name(), "Number");
            assert_eq!(Value::Text("".to_string()).type_name(), "Text");
            assert_eq!(Value::Bool(true).type_name(), "Bool");
            assert_eq!(Value::Null.type_name(), "Null");
        }

        #[test]
        fn test_get_field() {
            let mut obj = BTreeMap::new();
            obj.insert("value".to_string(), Value::from(1.5));
            let v = Value::Object(obj);
            assert_eq!(v.get("value").as_number().unwrap().to_f64(), 1.5);
            assert!(v.get("missing").is_error());
        }

        #[test]
        fn test_to_json() {
            let mut obj = BTreeMap::new();
            obj.insert("value".to_string(), Value::from(328.084));
            obj.insert("units".to_string(), Value::List(vec!["feet".into()]));
            let json = serde_json::Value::from(Value::Object(obj));
            assert_eq!(json["value"], serde_json::json!(328.084));
            assert_eq!(json["units"][0], "feet");
        }

        #[test]
        fn test_error_to_json() {
            let v = Value::Error(GaugeError::domain_error("negative"));
            let json = serde_json::Value::from(v);
            assert_eq!(json["_error"]["code"], codes::DOMAIN_ERROR);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_unknown_unit_lists_choices() {
            let err = GaugeError::unknown_unit("parsecs", "length", &["meters", "feet"]);
            assert_eq!(err.code, codes::UNKNOWN_UNIT);
            assert_eq!(err.suggestion.as_deref(), Some("Valid units for length: meters, feet"));
        }

        #[test]
        fn test_unknown_category() {
            let err = GaugeError::unknown_category("luminosity", &["length", "weight"]);
            assert_eq!(err.code, codes::UNKNOWN_CATEGORY);
            assert!(err.message.contains("luminosity"));
        }

        #[test]
        fn test_error_display() {
            let err = GaugeError::parse_error("unexpected token");
            let display = format!("{}", err);
            assert!(display.contains("PARSE_ERROR"));
            assert!(display.contains("suggestion"));
        }

        #[test]
        fn test_internal_is_fatal() {
            assert_eq!(GaugeError::internal("boom").severity, Severity::Fatal);
        }

        #[test]
        fn test_serialize_severity_lowercase() {
            let json = serde_json::to_value(GaugeError::arg_count("convert", 4, 2)).unwrap();
            assert_eq!(json["severity"], "error");
            assert_eq!(json["code"], codes::ARG_COUNT);
        }
    }
}
