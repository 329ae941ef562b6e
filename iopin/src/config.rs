//! Pin setup loaded from TOML.
//!
//! A configuration names the driver and describes each logical pin once,
//! so applications don't have to repeat the same sequence of `map`,
//! `set_direction`, `set_type` and `set_interpolation` calls:
//!
//! ```toml
//! driver = "Dummy"
//!
//! [pins.led]
//! physical = "D3"
//! direction = "output"
//! type = "digital"
//!
//! [pins.temperature]
//! physical = "A0"
//! direction = "input"
//! type = "analog"
//! read_min = 0.0
//! read_max = 100.0
//! ```
//!
//! An optional `[setup]` table is handed unchanged to the driver's factory
//! (see [`registry::setup_driver`]). Each driver defines its own keys; the
//! `SISO Model` driver, for example, takes the state-space matrices:
//!
//! ```toml
//! driver = "SISO Model"
//!
//! [setup]
//! a = [[0.9]]
//! b = [0.1]
//! c = [1.0]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use toml::Table;

use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::pins::PinDriver;
use crate::registry;
use crate::tracing::prelude::*;
use crate::types::{Direction, PhysicalPin, PortType};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Registered driver name, matched case-insensitively
    pub driver: String,

    /// Logical pins by name
    #[serde(default)]
    pub pins: BTreeMap<String, PinConfig>,

    /// Driver-specific setup parameters, passed to the driver's factory
    #[serde(default)]
    pub setup: Option<Table>,
}

/// Setup of one logical pin. Keys left out are not applied.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PinConfig {
    pub physical: PhysicalPin,

    #[serde(default)]
    pub direction: Option<Direction>,

    #[serde(default, rename = "type")]
    pub port_type: Option<PortType>,

    #[serde(default)]
    pub read_min: Option<f64>,
    #[serde(default)]
    pub read_max: Option<f64>,
    #[serde(default)]
    pub write_min: Option<f64>,
    #[serde(default)]
    pub write_max: Option<f64>,
}

impl PinConfig {
    fn has_interpolation(&self) -> bool {
        self.read_min.is_some()
            || self.read_max.is_some()
            || self.write_min.is_some()
            || self.write_max.is_some()
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Create the configured driver and apply the pin setup to it.
    pub fn build(&self) -> Result<PinDriver<String, Box<dyn Driver>>> {
        let driver = registry::setup_driver(&self.driver, self.setup.as_ref())?;
        let mut pins = PinDriver::new(driver);
        self.apply(&mut pins)?;
        Ok(pins)
    }

    /// Apply the pin setup to an existing driver.
    ///
    /// Every pin is mapped first. Direction, type and interpolation follow,
    /// pin by pin in name order, stopping at the first error.
    pub fn apply<D: Driver>(&self, pins: &mut PinDriver<String, D>) -> Result<()> {
        for (name, pin) in &self.pins {
            pins.map(name.clone(), Some(pin.physical.clone()));
        }

        for (name, pin) in &self.pins {
            if let Some(direction) = pin.direction {
                pins.set_direction(name, direction)?;
            }
            if let Some(port_type) = pin.port_type {
                pins.set_type(name, port_type)?;
            }
            if pin.has_interpolation() {
                pins.set_interpolation(
                    name,
                    pin.read_min,
                    pin.read_max,
                    pin.write_min,
                    pin.write_max,
                )?;
            }
        }

        info!(
            driver = pins.driver().name(),
            pins = self.pins.len(),
            "Applied pin configuration"
        );
        Ok(())
    }
}
