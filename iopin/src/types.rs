//! Value types shared by the pin layer and every backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Error, Result};

/// Electrical direction of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// Whether a pin operates in analog or digital mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Analog,
    Digital,
}

/// Logic level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LogicValue {
    Low,
    High,
}

/// A value written to or read from a pin.
///
/// Digital pins carry a [`LogicValue`] (or a numeric duty cycle in [0, 1]
/// when writing PWM); analog pins carry numbers in the backend's native
/// range, or in caller units once interpolation is configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Logic(LogicValue),
    Int(i64),
    Float(f64),
}

impl Value {
    /// The numeric value, if this is not a logic level.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            Value::Logic(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    pub fn as_logic(&self) -> Option<LogicValue> {
        match *self {
            Value::Logic(level) => Some(level),
            _ => None,
        }
    }
}

impl From<LogicValue> for Value {
    fn from(level: LogicValue) -> Self {
        Value::Logic(level)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Logic(level) => write!(f, "{level}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for Value {
    type Err = Error;

    /// Parse `high`/`low`, then an integer, then a float.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(level) = s.parse::<LogicValue>() {
            return Ok(Value::Logic(level));
        }
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Value::Int(v));
        }
        s.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| Error::InvalidValue(format!("cannot parse '{s}' as a pin value")))
    }
}

/// Backend-chosen identifier of a pin, opaque to the pin layer.
///
/// Backends name their pins in their own addressing scheme: `D3` on a
/// microcontroller header, `MX50.2` for a PLC merker bit, `C1:13` for a
/// Modbus coil. An empty id is treated as "no pin".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhysicalPin(String);

impl PhysicalPin {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for PhysicalPin {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PhysicalPin {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PhysicalPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Driver-specific analog reference (e.g. `Default`, `Internal`, `AR1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalogReference(String);

impl AnalogReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnalogReference {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for AnalogReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("high", Value::Logic(LogicValue::High); "logic high")]
    #[test_case("LOW", Value::Logic(LogicValue::Low); "logic low any case")]
    #[test_case("42", Value::Int(42); "integer")]
    #[test_case("-3", Value::Int(-3); "negative integer")]
    #[test_case("0.25", Value::Float(0.25); "float")]
    fn test_value_parse(input: &str, expected: Value) {
        assert_eq!(input.parse::<Value>().unwrap(), expected);
    }

    #[test]
    fn test_value_parse_rejects_garbage() {
        let err = "not a number".parse::<Value>().unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)));
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Logic(LogicValue::High).as_f64(), None);
        assert!(!Value::from(LogicValue::Low).is_numeric());
    }

    #[test]
    fn test_enum_names() {
        assert_eq!(Direction::Output.to_string(), "output");
        assert_eq!("Input".parse::<Direction>().unwrap(), Direction::Input);
        assert_eq!("analog".parse::<PortType>().unwrap(), PortType::Analog);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
