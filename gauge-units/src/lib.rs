//! Gauge Units - Conversion table and converter
//!
//! Converts a value between two units of one measurement category and
//! explains the arithmetic performed.
//!
//! Categories:
//! - length, weight, time, speed, area, volume, energy, pressure,
//!   digital storage (linear scale factors against a base unit)
//! - temperature (celsius, fahrenheit, kelvin through a Celsius pivot)

mod table;
mod convert;
mod helpers;
mod functions;

pub use table::{
    categories, units_of, Category, ConversionRule, ConversionTable, TemperatureRule, UnitDef,
    CELSIUS, FAHRENHEIT, KELVIN, TABLE,
};
pub use convert::{convert, convert_all, Conversion, ConversionError, DISPLAY_PRECISION};

use gauge_plugin::PluginRegistry;

/// Load unit functions into registry
pub fn load_units_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        // Conversion (2 functions)
        .with_function(functions::Convert)
        .with_function(functions::ConvertAll)

        // Inspection (2 functions)
        .with_function(functions::Categories)
        .with_function(functions::UnitsOf)
}

/// Registry with every unit function loaded
pub fn standard_registry() -> PluginRegistry {
    load_units_library(PluginRegistry::new())
}
