//! Lenient numeric decoding.
//!
//! The info API is not consistent about numeric fields: most arrive as
//! strings (`"0.0123"`), some as JSON numbers, and some are missing or null
//! depending on account type. Every numeric position field is therefore
//! decoded through the types in this module, which never fail:
//!
//! | Input                          | Result            |
//! |--------------------------------|-------------------|
//! | missing / `null`               | `0.0`             |
//! | number                         | its value         |
//! | string                         | parsed after trim, `0.0` if not numeric |
//! | `true` / `false`               | `1.0` / `0.0`     |
//! | object / array                 | `0.0`             |

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce any JSON value to `f64` following the table in the module docs.
pub fn coerce_f64(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Array(_) | Value::Object(_) => 0.0,
    }
}

/// An `f64` field that decodes from anything.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LenientF64(pub f64);

impl LenientF64 {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for LenientF64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self(coerce_f64(&value)))
    }
}

/// Leverage, read from the nested `{"type": "cross", "value": 20}` object.
///
/// Anything that is not an object, or an object without a usable `value`,
/// decodes as 0 (unknown leverage).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LenientLeverage(pub f64);

impl LenientLeverage {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for LenientLeverage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let leverage = value.get("value").map(coerce_f64).unwrap_or(0.0);
        Ok(Self(leverage))
    }
}
