//! Converter: value + unit pair -> converted value and formula

use gauge_core::{GaugeError, Number};
use thiserror::Error;
use tracing::debug;

use crate::table::{ConversionRule, ConversionTable, TemperatureRule, TABLE};

/// Decimal places used by formulas and summaries for linear results
pub const DISPLAY_PRECISION: usize = gauge_plugin::DEFAULT_PRECISION;

/// Decimal places used by temperature formulas
const TEMPERATURE_PRECISION: usize = 2;

/// Validation failures, detected before any arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown unit '{unit}' for category '{category}'")]
    UnknownUnit { unit: String, category: String },
}

impl ConversionError {
    /// Structured form, listing the valid choices from `table`
    pub fn to_gauge_error(&self, table: &ConversionTable) -> GaugeError {
        match self {
            ConversionError::UnknownCategory(category) => {
                GaugeError::unknown_category(category, &table.categories())
            }
            ConversionError::UnknownUnit { unit, category } => {
                let valid = table.units_of(category).unwrap_or_default();
                GaugeError::unknown_unit(unit, category, &valid)
            }
        }
    }
}

/// Outcome of one conversion request
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub category: String,
    pub input: f64,
    pub from_unit: String,
    pub to_unit: String,
    /// Full precision; only display strings are rounded
    pub value: f64,
    pub formula: String,
}

impl Conversion {
    /// `"100.0 meters is equal to 328.08400 feet"`
    pub fn summary(&self) -> String {
        self.summary_with_precision(DISPLAY_PRECISION)
    }

    pub fn summary_with_precision(&self, places: usize) -> String {
        format!(
            "{} {} is equal to {} {}",
            Number::from_f64(self.input).repr(),
            self.from_unit,
            Number::from_f64(self.value).as_decimal(places),
            self.to_unit
        )
    }
}

impl ConversionTable {
    /// Convert `value` from `from_unit` to `to_unit` within `category`.
    ///
    /// Both units must belong to the category. Linear units scale by the
    /// ratio of their factors; temperature units go through Celsius.
    pub fn convert(
        &self,
        value: f64,
        from_unit: &str,
        to_unit: &str,
        category: &str,
    ) -> Result<Conversion, ConversionError> {
        let cat = self.category(category)?;
        let from = cat.unit(from_unit)?;
        let to = cat.unit(to_unit)?;

        let (result, formula) = match (from.rule, to.rule) {
            (ConversionRule::Linear(from_factor), ConversionRule::Linear(to_factor)) => {
                convert_linear(value, from_unit, to_unit, from_factor, to_factor)
            }
            (ConversionRule::Temperature(from_rule), ConversionRule::Temperature(to_rule)) => {
                convert_temperature(value, from_unit, to_unit, from_rule, to_rule)
            }
            // A category mixing rule kinds has no path between the two units
            _ => {
                return Err(ConversionError::UnknownUnit {
                    unit: to_unit.to_string(),
                    category: category.to_string(),
                })
            }
        };

        debug!(category, from = from_unit, to = to_unit, value, result, "converted");

        Ok(Conversion {
            category: category.to_string(),
            input: value,
            from_unit: from_unit.to_string(),
            to_unit: to_unit.to_string(),
            value: result,
            formula,
        })
    }

    /// Convert `value` into every unit of `category`, in definition order
    pub fn convert_all(
        &self,
        value: f64,
        from_unit: &str,
        category: &str,
    ) -> Result<Vec<Conversion>, ConversionError> {
        let cat = self.category(category)?;
        cat.unit(from_unit)?;
        cat.units()
            .iter()
            .map(|to| self.convert(value, from_unit, &to.name, category))
            .collect()
    }
}

fn convert_linear(value: f64, from_unit: &str, to_unit: &str, from_factor: f64, to_factor: f64) -> (f64, String) {
    let ratio = to_factor / from_factor;
    let result = value * ratio;
    let formula = format!(
        "{} {} × {} = {} {}",
        Number::from_f64(value).repr(),
        from_unit,
        Number::from_f64(ratio).repr(),
        Number::from_f64(result).as_decimal(DISPLAY_PRECISION),
        to_unit
    );
    (result, formula)
}

fn convert_temperature(
    value: f64,
    from_unit: &str,
    to_unit: &str,
    from_rule: TemperatureRule,
    to_rule: TemperatureRule,
) -> (f64, String) {
    // Same unit: no round trip through Celsius, so the value stays exact
    let result = if from_unit == to_unit {
        value
    } else {
        (to_rule.from_celsius)((from_rule.to_celsius)(value))
    };
    let formula = format!(
        "{} → {}°{}",
        (from_rule.pivot)(&Number::from_f64(value).repr()),
        Number::from_f64(result).as_decimal(TEMPERATURE_PRECISION),
        capitalize(to_unit)
    );
    (result, formula)
}

/// First letter upper-case, the rest lower-case
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Convert with the standard table
pub fn convert(value: f64, from_unit: &str, to_unit: &str, category: &str) -> Result<Conversion, ConversionError> {
    TABLE.convert(value, from_unit, to_unit, category)
}

/// Convert into every unit of a standard category
pub fn convert_all(value: f64, from_unit: &str, category: &str) -> Result<Vec<Conversion>, ConversionError> {
    TABLE.convert_all(value, from_unit, category)
}
