//! Unit conversion functions for Gauge

use gauge_plugin::prelude::*;
use std::collections::BTreeMap;

use crate::helpers::{extract_number, extract_text, validate_non_negative};
use crate::{Conversion, TABLE};

fn conversion_to_value(conversion: &Conversion, precision: usize) -> Value {
    let mut obj = BTreeMap::new();
    obj.insert("category".to_string(), Value::Text(conversion.category.clone()));
    obj.insert("from_unit".to_string(), Value::Text(conversion.from_unit.clone()));
    obj.insert("to_unit".to_string(), Value::Text(conversion.to_unit.clone()));
    obj.insert("input".to_string(), Value::from(conversion.input));
    obj.insert("value".to_string(), Value::from(conversion.value));
    obj.insert("formula".to_string(), Value::Text(conversion.formula.clone()));
    obj.insert("summary".to_string(), Value::Text(conversion.summary_with_precision(precision)));
    Value::Object(obj)
}

// ============ convert ============

pub struct Convert;

static CONVERT_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("value", "Number", "Value to convert (zero or greater)"),
    ArgMeta::required("from_unit", "Text", "Source unit (e.g., \"meters\")"),
    ArgMeta::required("to_unit", "Text", "Target unit (e.g., \"feet\")"),
    ArgMeta::required("category", "Text", "Category both units belong to (e.g., \"length\")"),
];

static CONVERT_EXAMPLES: [&str; 3] = [
    "convert(100, \"meters\", \"feet\", \"length\") → 328.084",
    "convert(98.6, \"fahrenheit\", \"celsius\", \"temperature\") → 37",
    "convert(1, \"gigabytes\", \"bytes\", \"digital storage\") → 1000000000",
];

static CONVERT_RELATED: [&str; 3] = ["convert_all", "units_of", "categories"];

impl FunctionPlugin for Convert {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "convert",
            description: "Convert a value between two units of the same category, with the formula used",
            usage: "convert(value, from_unit, to_unit, category)",
            args: &CONVERT_ARGS,
            returns: "Object {value, formula, summary, ...}",
            examples: &CONVERT_EXAMPLES,
            category: "units",
            related: &CONVERT_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() < 4 {
            return Value::Error(GaugeError::arg_count("convert", 4, args.len()));
        }

        let value = match extract_number(&args[0], "convert", "value")
            .and_then(|n| validate_non_negative(n, "convert", "value"))
        {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };

        let from_unit = match extract_text(&args[1], "convert", "from_unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        let to_unit = match extract_text(&args[2], "convert", "to_unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        let category = match extract_text(&args[3], "convert", "category") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        match TABLE.convert(value.to_f64(), from_unit, to_unit, category) {
            Ok(conversion) => conversion_to_value(&conversion, ctx.precision),
            Err(e) => Value::Error(e.to_gauge_error(&TABLE)),
        }
    }
}

// ============ convert_all ============

pub struct ConvertAll;

static CONVERT_ALL_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("value", "Number", "Value to convert (zero or greater)"),
    ArgMeta::required("from_unit", "Text", "Source unit"),
    ArgMeta::required("category", "Text", "Category of the source unit"),
];

static CONVERT_ALL_EXAMPLES: [&str; 1] = [
    "convert_all(1, \"hours\", \"time\") → [{unit: \"seconds\", value: 3600}, ...]",
];

static CONVERT_ALL_RELATED: [&str; 1] = ["convert"];

impl FunctionPlugin for ConvertAll {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "convert_all",
            description: "Convert a value into every unit of its category",
            usage: "convert_all(value, from_unit, category)",
            args: &CONVERT_ALL_ARGS,
            returns: "List of Object {unit, value, display}",
            examples: &CONVERT_ALL_EXAMPLES,
            category: "units",
            related: &CONVERT_ALL_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() < 3 {
            return Value::Error(GaugeError::arg_count("convert_all", 3, args.len()));
        }

        let value = match extract_number(&args[0], "convert_all", "value")
            .and_then(|n| validate_non_negative(n, "convert_all", "value"))
        {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };

        let from_unit = match extract_text(&args[1], "convert_all", "from_unit") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        let category = match extract_text(&args[2], "convert_all", "category") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        match TABLE.convert_all(value.to_f64(), from_unit, category) {
            Ok(rows) => Value::List(rows.iter().map(|c| {
                let mut obj = BTreeMap::new();
                obj.insert("unit".to_string(), Value::Text(c.to_unit.clone()));
                obj.insert("value".to_string(), Value::from(c.value));
                obj.insert("display".to_string(), Value::Text(Number::from_f64(c.value).as_decimal(ctx.precision)));
                Value::Object(obj)
            }).collect()),
            Err(e) => Value::Error(e.to_gauge_error(&TABLE)),
        }
    }
}

// ============ categories ============

pub struct Categories;

static CATEGORIES_EXAMPLES: [&str; 1] = [
    "categories() → [\"length\", \"weight\", \"temperature\", ...]",
];

static CATEGORIES_RELATED: [&str; 1] = ["units_of"];

impl FunctionPlugin for Categories {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "categories",
            description: "List the measurement categories",
            usage: "categories()",
            args: &[],
            returns: "List of Text",
            examples: &CATEGORIES_EXAMPLES,
            category: "units",
            related: &CATEGORIES_RELATED,
        }
    }

    fn call(&self, _args: &[Value], _ctx: &EvalContext) -> Value {
        Value::List(TABLE.categories().into_iter().map(Value::from).collect())
    }
}

// ============ units_of ============

pub struct UnitsOf;

static UNITS_OF_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("category", "Text", "Category name (e.g., \"speed\")"),
];

static UNITS_OF_EXAMPLES: [&str; 1] = [
    "units_of(\"speed\") → [\"mps\", \"kph\", \"mph\", \"fps\", \"knots\"]",
];

static UNITS_OF_RELATED: [&str; 2] = ["categories", "convert"];

impl FunctionPlugin for UnitsOf {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "units_of",
            description: "List the units of a category",
            usage: "units_of(category)",
            args: &UNITS_OF_ARGS,
            returns: "List of Text",
            examples: &UNITS_OF_EXAMPLES,
            category: "units",
            related: &UNITS_OF_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.is_empty() {
            return Value::Error(GaugeError::arg_count("units_of", 1, 0));
        }

        let category = match extract_text(&args[0], "units_of", "category") {
            Ok(s) => s,
            Err(e) => return Value::Error(e),
        };

        match TABLE.units_of(category) {
            Ok(units) => Value::List(units.into_iter().map(Value::from).collect()),
            Err(e) => Value::Error(e.to_gauge_error(&TABLE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_plugin::PluginRegistry;
    use std::sync::Arc;

    fn eval_ctx() -> EvalContext {
        EvalContext::new(Arc::new(PluginRegistry::new()))
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_convert() {
        let args = vec![Value::from(100.0), text("meters"), text("feet"), text("length")];
        let result = Convert.call(&args, &eval_ctx());
        let value = result.get("value").as_number().unwrap().to_f64();
        assert!((value - 328.084).abs() < 1e-9);
        assert_eq!(result.get("summary").as_text(), Some("100.0 meters is equal to 328.08400 feet"));
        assert_eq!(result.get("formula").as_text(), Some("100.0 meters × 3.28084 = 328.08400 feet"));
    }

    #[test]
    fn test_summary_uses_display_precision() {
        let args = vec![Value::from(1.0), text("kilometers"), text("miles"), text("length")];
        let result = Convert.call(&args, &eval_ctx());
        let expected = TABLE.convert(1.0, "kilometers", "miles", "length").unwrap().summary();
        assert_eq!(result.get("summary").as_text(), Some(expected.as_str()));
        assert_eq!(expected, "1.0 kilometers is equal to 0.62137 miles");
    }

    #[test]
    fn test_convert_accepts_numeric_text() {
        let args = vec![text("32"), text("fahrenheit"), text("celsius"), text("temperature")];
        let result = Convert.call(&args, &eval_ctx());
        assert_eq!(result.get("value").as_number().unwrap().to_f64(), 0.0);
    }

    #[test]
    fn test_convert_rejects_negative() {
        let args = vec![Value::from(-1.0), text("meters"), text("feet"), text("length")];
        let result = Convert.call(&args, &eval_ctx());
        assert_eq!(result.as_error().unwrap().code, codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_convert_unknown_unit() {
        let args = vec![Value::from(5.0), text("meters"), text("feet"), text("volume")];
        let result = Convert.call(&args, &eval_ctx());
        let err = result.as_error().unwrap();
        assert_eq!(err.code, codes::UNKNOWN_UNIT);
        assert!(err.suggestion.as_deref().unwrap().contains("liters"));
    }

    #[test]
    fn test_convert_unknown_category() {
        let args = vec![Value::from(5.0), text("meters"), text("feet"), text("distance")];
        let result = Convert.call(&args, &eval_ctx());
        assert_eq!(result.as_error().unwrap().code, codes::UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_convert_arg_count() {
        let result = Convert.call(&[Value::from(1.0)], &eval_ctx());
        assert_eq!(result.as_error().unwrap().code, codes::ARG_COUNT);
    }

    #[test]
    fn test_convert_all() {
        let args = vec![Value::from(1.0), text("kilometers"), text("length")];
        let result = ConvertAll.call(&args, &eval_ctx());
        let rows = result.as_list().unwrap();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].get("unit").as_text(), Some("meters"));
        assert_eq!(rows[0].get("display").as_text(), Some("1000.00000"));
    }

    #[test]
    fn test_categories() {
        let result = Categories.call(&[], &eval_ctx());
        let list = result.as_list().unwrap();
        assert_eq!(list.len(), 10);
        assert_eq!(list[9].as_text(), Some("digital storage"));
    }

    #[test]
    fn test_units_of() {
        let result = UnitsOf.call(&[text("temperature")], &eval_ctx());
        let units: Vec<&str> = result.as_list().unwrap().iter().filter_map(|v| v.as_text()).collect();
        assert_eq!(units, vec!["celsius", "fahrenheit", "kelvin"]);
    }

    #[test]
    fn test_units_of_unknown() {
        let result = UnitsOf.call(&[text("luminosity")], &eval_ctx());
        assert_eq!(result.as_error().unwrap().code, codes::UNKNOWN_CATEGORY);
    }
}
