//! Floating point numbers with stable text rendering
//!
//! Conversion factors are plain `f64`. `Number` wraps them so every surface
//! (formulas, summaries, JSON) renders values the same way.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Not a finite number: {0}")]
    NotFinite(String),
}

/// A real number as used by the converter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Number(f64);

impl Number {
    pub fn from_f64(value: f64) -> Self {
        Number(value)
    }

    pub fn from_i64(value: i64) -> Self {
        Number(value as f64)
    }

    pub fn to_f64(self) -> f64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }

    /// Fixed-point rendering with `places` decimals (e.g. `328.08400`)
    pub fn as_decimal(&self, places: usize) -> String {
        format!("{:.*}", places, self.0)
    }

    /// Shortest round-trip rendering.
    ///
    /// Integral values keep a trailing `.0` (`100.0`), and magnitudes below
    /// `1e-4` or at/above `1e16` switch to exponent form with a signed,
    /// two-digit exponent (`1e-09`, `1.25e+16`).
    pub fn repr(&self) -> String {
        let v = self.0;
        if v.is_nan() {
            return "nan".to_string();
        }
        if v.is_infinite() {
            return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
        }
        if v == 0.0 {
            return if v.is_sign_negative() { "-0.0".to_string() } else { "0.0".to_string() };
        }

        let abs = v.abs();
        if !(1e-4..1e16).contains(&abs) {
            let sci = format!("{:e}", v);
            return match sci.split_once('e') {
                Some((mantissa, exp)) => {
                    let exp: i32 = exp.parse().unwrap_or(0);
                    let sign = if exp < 0 { '-' } else { '+' };
                    format!("{}e{}{:02}", mantissa, sign, exp.abs())
                }
                None => sci,
            };
        }

        let plain = format!("{}", v);
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    }
}

impl FromStr for Number {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| NumberError::ParseError(trimmed.to_string()))?;
        if !value.is_finite() {
            return Err(NumberError::NotFinite(trimmed.to_string()));
        }
        Ok(Number(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr_integral_keeps_point() {
        assert_eq!(Number::from_i64(100).repr(), "100.0");
        assert_eq!(Number::from_f64(1e9).repr(), "1000000000.0");
        assert_eq!(Number::from_f64(0.0).repr(), "0.0");
    }

    #[test]
    fn test_repr_shortest_round_trip() {
        assert_eq!(Number::from_f64(3.28084).repr(), "3.28084");
        assert_eq!(Number::from_f64(98.6).repr(), "98.6");
        assert_eq!(Number::from_f64(0.000621371).repr(), "0.000621371");
    }

    #[test]
    fn test_repr_exponent_form() {
        assert_eq!(Number::from_f64(1e-9).repr(), "1e-09");
        assert_eq!(Number::from_f64(1.25e-10).repr(), "1.25e-10");
        assert_eq!(Number::from_f64(1e16).repr(), "1e+16");
        assert_eq!(Number::from_f64(-3.861e-7).repr(), "-3.861e-07");
    }

    #[test]
    fn test_as_decimal() {
        assert_eq!(Number::from_f64(328.084).as_decimal(5), "328.08400");
        assert_eq!(Number::from_f64(37.0).as_decimal(2), "37.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("42.5".parse::<Number>().unwrap().to_f64(), 42.5);
        assert_eq!(" 1e3 ".parse::<Number>().unwrap().to_f64(), 1000.0);
        assert!(matches!("abc".parse::<Number>(), Err(NumberError::ParseError(_))));
        assert!(matches!("inf".parse::<Number>(), Err(NumberError::NotFinite(_))));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Number::from_i64(-5).is_negative());
        assert!(!Number::from_i64(0).is_negative());
    }
}
