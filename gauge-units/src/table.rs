//! Conversion table: categories, their units, and how to convert among them
//!
//! Linear categories store one scale factor per unit relative to the
//! category's base unit (the unit with factor 1). Temperature units carry a
//! pair of functions through Celsius instead.

use std::fmt;
use std::sync::LazyLock;

use crate::ConversionError;

/// Standard table, built on first use and never mutated
pub static TABLE: LazyLock<ConversionTable> = LazyLock::new(ConversionTable::standard);

/// Non-linear rule for a temperature unit. Celsius is the pivot.
#[derive(Clone, Copy)]
pub struct TemperatureRule {
    /// Celsius -> this unit
    pub from_celsius: fn(f64) -> f64,
    /// This unit -> Celsius
    pub to_celsius: fn(f64) -> f64,
    /// Renders the to-Celsius step for an input, e.g. `(98.6°F - 32) × 5/9`
    pub pivot: fn(&str) -> String,
}

impl fmt::Debug for TemperatureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemperatureRule")
            .field("pivot", &(self.pivot)("x"))
            .finish()
    }
}

/// How a unit relates to the rest of its category
#[derive(Debug, Clone, Copy)]
pub enum ConversionRule {
    /// 1 base unit equals this many of the unit
    Linear(f64),
    Temperature(TemperatureRule),
}

/// A unit and its rule
#[derive(Debug, Clone)]
pub struct UnitDef {
    pub name: String,
    pub rule: ConversionRule,
}

/// A measurement category with its units in definition order
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    units: Vec<UnitDef>,
}

impl Category {
    pub fn new(name: &str) -> Self {
        Category {
            name: name.to_string(),
            units: Vec::new(),
        }
    }

    pub fn with_linear(self, unit: &str, factor: f64) -> Self {
        self.with_rule(unit, ConversionRule::Linear(factor))
    }

    pub fn with_temperature(self, unit: &str, rule: TemperatureRule) -> Self {
        self.with_rule(unit, ConversionRule::Temperature(rule))
    }

    /// Adds a unit; a later definition of the same name replaces the earlier one
    pub fn with_rule(mut self, unit: &str, rule: ConversionRule) -> Self {
        match self.units.iter_mut().find(|u| u.name == unit) {
            Some(existing) => existing.rule = rule,
            None => self.units.push(UnitDef { name: unit.to_string(), rule }),
        }
        self
    }

    /// Unit names in definition order
    pub fn unit_names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name.as_str()).collect()
    }

    pub fn units(&self) -> &[UnitDef] {
        &self.units
    }

    /// Look up a unit. Names are case-sensitive.
    pub fn unit(&self, name: &str) -> Result<&UnitDef, ConversionError> {
        self.units
            .iter()
            .find(|u| u.name == name)
            .ok_or_else(|| ConversionError::UnknownUnit {
                unit: name.to_string(),
                category: self.name.clone(),
            })
    }

    /// The pivot unit: linear factor 1, or the temperature unit whose
    /// Celsius mapping is the identity
    pub fn base_unit(&self) -> Option<&str> {
        self.units
            .iter()
            .find(|u| match u.rule {
                ConversionRule::Linear(factor) => factor == 1.0,
                ConversionRule::Temperature(rule) => (rule.from_celsius)(1.0) == 1.0 && (rule.from_celsius)(0.0) == 0.0,
            })
            .map(|u| u.name.as_str())
    }
}

/// Immutable mapping from category name to its units
#[derive(Debug, Clone)]
pub struct ConversionTable {
    categories: Vec<Category>,
}

impl ConversionTable {
    pub fn new(categories: Vec<Category>) -> Self {
        ConversionTable { categories }
    }

    /// Category names in definition order
    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn category(&self, name: &str) -> Result<&Category, ConversionError> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConversionError::UnknownCategory(name.to_string()))
    }

    /// Unit names of a category in definition order
    pub fn units_of(&self, category: &str) -> Result<Vec<&str>, ConversionError> {
        Ok(self.category(category)?.unit_names())
    }

    /// The built-in ten categories
    pub fn standard() -> Self {
        ConversionTable::new(vec![
            Category::new("length")
                .with_linear("meters", 1.0)
                .with_linear("kilometers", 0.001)
                .with_linear("miles", 0.000621371)
                .with_linear("feet", 3.28084)
                .with_linear("inches", 39.3701)
                .with_linear("centimeters", 100.0)
                .with_linear("millimeters", 1000.0)
                .with_linear("yards", 1.09361)
                .with_linear("nautical miles", 0.000539957),
            Category::new("weight")
                .with_linear("grams", 1.0)
                .with_linear("kilograms", 0.001)
                .with_linear("pounds", 0.00220462)
                .with_linear("ounces", 0.035274)
                .with_linear("stones", 0.000157473)
                .with_linear("tons", 0.000001),
            Category::new("temperature")
                .with_temperature("celsius", CELSIUS)
                .with_temperature("fahrenheit", FAHRENHEIT)
                .with_temperature("kelvin", KELVIN),
            Category::new("time")
                .with_linear("seconds", 1.0)
                .with_linear("minutes", 1.0 / 60.0)
                .with_linear("hours", 1.0 / 3600.0)
                .with_linear("days", 1.0 / 86400.0)
                .with_linear("weeks", 1.0 / 604800.0)
                .with_linear("months", 1.0 / 2628000.0)
                .with_linear("years", 1.0 / 31536000.0),
            Category::new("speed")
                .with_linear("mps", 1.0)
                .with_linear("kph", 3.6)
                .with_linear("mph", 2.23694)
                .with_linear("fps", 3.28084)
                .with_linear("knots", 1.94384),
            Category::new("area")
                .with_linear("square meters", 1.0)
                .with_linear("square kilometers", 0.000001)
                .with_linear("square miles", 3.861e-7)
                .with_linear("square feet", 10.7639)
                .with_linear("acres", 0.000247105)
                .with_linear("hectares", 0.0001),
            Category::new("volume")
                .with_linear("liters", 1.0)
                .with_linear("milliliters", 1000.0)
                .with_linear("cubic meters", 0.001)
                .with_linear("gallons", 0.264172)
                .with_linear("pints", 2.11338),
            Category::new("energy")
                .with_linear("joules", 1.0)
                .with_linear("kilojoules", 0.001)
                .with_linear("calories", 0.239006)
                .with_linear("kilocalories", 0.000239006)
                .with_linear("watt-hours", 0.000277778),
            Category::new("pressure")
                .with_linear("pascals", 1.0)
                .with_linear("kilopascals", 0.001)
                .with_linear("bars", 0.00001)
                .with_linear("atmospheres", 0.00000986923)
                .with_linear("PSI", 0.000145038),
            // Decimal prefixes over a bits base
            Category::new("digital storage")
                .with_linear("bits", 1.0)
                .with_linear("bytes", 0.125)
                .with_linear("kilobytes", 0.000125)
                .with_linear("megabytes", 0.000000125)
                .with_linear("gigabytes", 0.000000000125)
                .with_linear("terabytes", 0.000000000000125),
        ])
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ============ temperature rules ============

fn identity(v: f64) -> f64 {
    v
}

fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

fn celsius_to_kelvin(c: f64) -> f64 {
    c + 273.15
}

fn kelvin_to_celsius(k: f64) -> f64 {
    k - 273.15
}

fn celsius_pivot(v: &str) -> String {
    format!("{}°C", v)
}

fn fahrenheit_pivot(v: &str) -> String {
    format!("({}°F - 32) × 5/9", v)
}

fn kelvin_pivot(v: &str) -> String {
    format!("{}K - 273.15", v)
}

pub const CELSIUS: TemperatureRule = TemperatureRule {
    from_celsius: identity,
    to_celsius: identity,
    pivot: celsius_pivot,
};

pub const FAHRENHEIT: TemperatureRule = TemperatureRule {
    from_celsius: celsius_to_fahrenheit,
    to_celsius: fahrenheit_to_celsius,
    pivot: fahrenheit_pivot,
};

pub const KELVIN: TemperatureRule = TemperatureRule {
    from_celsius: celsius_to_kelvin,
    to_celsius: kelvin_to_celsius,
    pivot: kelvin_pivot,
};

/// Category names of the standard table
pub fn categories() -> Vec<&'static str> {
    TABLE.categories()
}

/// Unit names of a standard category
pub fn units_of(category: &str) -> Result<Vec<&'static str>, ConversionError> {
    TABLE.units_of(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_in_definition_order() {
        assert_eq!(categories(), vec![
            "length", "weight", "temperature", "time", "speed",
            "area", "volume", "energy", "pressure", "digital storage",
        ]);
    }

    #[test]
    fn test_units_of_length() {
        assert_eq!(units_of("length").unwrap(), vec![
            "meters", "kilometers", "miles", "feet", "inches",
            "centimeters", "millimeters", "yards", "nautical miles",
        ]);
    }

    #[test]
    fn test_units_of_unknown_category() {
        assert_eq!(
            units_of("luminosity"),
            Err(ConversionError::UnknownCategory("luminosity".to_string()))
        );
    }

    #[test]
    fn test_unit_names_are_case_sensitive() {
        let pressure = TABLE.category("pressure").unwrap();
        assert!(pressure.unit("PSI").is_ok());
        assert!(pressure.unit("psi").is_err());
    }

    #[test]
    fn test_every_linear_factor_is_positive() {
        for category in &TABLE.categories {
            for unit in category.units() {
                if let ConversionRule::Linear(factor) = unit.rule {
                    assert!(factor > 0.0, "{} / {} has factor {}", category.name, unit.name, factor);
                }
            }
        }
    }

    #[test]
    fn test_base_units() {
        assert_eq!(TABLE.category("length").unwrap().base_unit(), Some("meters"));
        assert_eq!(TABLE.category("digital storage").unwrap().base_unit(), Some("bits"));
        assert_eq!(TABLE.category("temperature").unwrap().base_unit(), Some("celsius"));
    }

    #[test]
    fn test_temperature_rules_invert() {
        for rule in [CELSIUS, FAHRENHEIT, KELVIN] {
            for c in [-40.0, 0.0, 37.0, 100.0] {
                let back = (rule.to_celsius)((rule.from_celsius)(c));
                assert!((back - c).abs() < 1e-9, "{} -> {}", c, back);
            }
        }
    }

    #[test]
    fn test_pivot_rendering() {
        assert_eq!((FAHRENHEIT.pivot)("98.6"), "(98.6°F - 32) × 5/9");
        assert_eq!((KELVIN.pivot)("300.0"), "300.0K - 273.15");
        assert_eq!((CELSIUS.pivot)("0.0"), "0.0°C");
    }

    #[test]
    fn test_same_unit_name_in_two_categories() {
        let table = ConversionTable::new(vec![
            Category::new("a").with_linear("unit", 1.0).with_linear("other", 2.0),
            Category::new("b").with_linear("unit", 1.0).with_linear("other", 10.0),
        ]);
        assert_eq!(table.units_of("a").unwrap(), vec!["unit", "other"]);
        assert!(matches!(
            table.category("b").unwrap().unit("other").unwrap().rule,
            ConversionRule::Linear(f) if f == 10.0
        ));
    }

    #[test]
    fn test_redefining_unit_replaces_rule() {
        let category = Category::new("x").with_linear("u", 1.0).with_linear("u", 3.0);
        assert_eq!(category.unit_names(), vec!["u"]);
    }
}
