//! Per-pin capability records published by backends.

use serde::{Deserialize, Serialize};

use crate::types::PhysicalPin;

/// Closed numeric interval, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Signed width of the interval.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp `value` into the interval, tolerating reversed bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(lo, hi)
    }
}

/// Analog side of a pin's capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalogCapability {
    pub input: bool,
    pub output: bool,
    /// Native range of values returned by reads
    pub read_range: Option<Bounds>,
    /// Native range of values accepted by writes
    pub write_range: Option<Bounds>,
}

/// Digital side of a pin's capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigitalCapability {
    pub input: bool,
    pub output: bool,
    pub pwm: bool,
}

/// Everything a backend declares about one of its physical pins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub id: PhysicalPin,
    /// Human-readable name, e.g. "Digital 3"
    pub name: String,
    pub analog: AnalogCapability,
    pub digital: DigitalCapability,
}

impl Capability {
    pub fn new(id: impl Into<PhysicalPin>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            analog: AnalogCapability::default(),
            digital: DigitalCapability::default(),
        }
    }

    pub fn with_analog(mut self, analog: AnalogCapability) -> Self {
        self.analog = analog;
        self
    }

    pub fn with_digital(mut self, digital: DigitalCapability) -> Self {
        self.digital = digital;
        self
    }

    /// Whether the pin can be used in analog mode at all.
    pub fn supports_analog(&self) -> bool {
        self.analog.input || self.analog.output
    }

    /// Whether the pin can be used in digital mode at all.
    pub fn supports_digital(&self) -> bool {
        self.digital.input || self.digital.output
    }
}

/// Find the record for `id` in a backend's capability list.
pub fn find<'a>(capabilities: &'a [Capability], id: &PhysicalPin) -> Option<&'a Capability> {
    capabilities.iter().find(|cap| &cap.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        let bounds = Bounds::new(0.0, 5.0);
        assert_eq!(bounds.clamp(-1.0), 0.0);
        assert_eq!(bounds.clamp(2.5), 2.5);
        assert_eq!(bounds.clamp(7.0), 5.0);

        let reversed = Bounds::new(5.0, 0.0);
        assert_eq!(reversed.clamp(7.0), 5.0);
        assert_eq!(reversed.span(), -5.0);
    }

    #[test]
    fn test_find() {
        let caps = vec![
            Capability::new("A0", "Analog 0").with_analog(AnalogCapability {
                input: true,
                read_range: Some(Bounds::new(0.0, 1023.0)),
                ..Default::default()
            }),
            Capability::new("D1", "Digital 1").with_digital(DigitalCapability {
                input: true,
                output: true,
                pwm: false,
            }),
        ];

        let a0 = find(&caps, &PhysicalPin::from("A0")).unwrap();
        assert!(a0.supports_analog());
        assert!(!a0.supports_digital());
        assert!(find(&caps, &PhysicalPin::from("A9")).is_none());
    }
}
