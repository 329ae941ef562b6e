//! The pin layer: abstract pin ids on top of a [`Driver`].
//!
//! Application code names pins with ids of its own choosing and maps each
//! one to a backend's [`PhysicalPin`]. Swapping the device then means
//! redoing the mapping, not rewriting the read/write logic.
//!
//! ```
//! use iopin::drivers::dummy::Dummy;
//! use iopin::{Direction, LogicValue, PinDriver};
//!
//! let mut pins = PinDriver::new(Dummy::new());
//! pins.map("led", Some("D1".into()));
//! pins.map("button", Some("D2".into()));
//!
//! pins.set_direction(&"led", Direction::Output)?;
//! pins.write(&"led", LogicValue::High.into(), false)?;
//! let levels = pins.read_each(&["led", "button"])?;
//! assert_eq!(levels.len(), 2);
//! # Ok::<(), iopin::Error>(())
//! ```
//!
//! Each accessor has a single-pin form and a batch form (`*_each`). Batch
//! forms apply the single-pin operation to every id in order and stop at
//! the first failure.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::broadcast;
use crate::capability::{self, Capability};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::interpolation::Interpolation;
use crate::tracing::prelude::*;
use crate::types::{AnalogReference, Direction, PhysicalPin, PortType, Value};

/// Driver wrapper that owns the pin mapping and interpolation tables.
///
/// Both tables belong to this instance. Two `PinDriver`s over the same kind
/// of backend never share mappings.
pub struct PinDriver<K, D> {
    driver: D,
    mapping: HashMap<K, PhysicalPin>,
    interpolation: HashMap<K, Interpolation>,
}

impl<K, D> PinDriver<K, D>
where
    K: Eq + Hash + Clone + Debug,
    D: Driver,
{
    /// Wrap `driver` with empty mapping and interpolation tables.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            mapping: HashMap::new(),
            interpolation: HashMap::new(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Access the backend directly, e.g. for device-specific setup.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_inner(self) -> D {
        self.driver
    }

    // --- Mapping -----------------------------------------------------------

    /// Map abstract `pin` to `physical`, or remove the mapping when
    /// `physical` is `None` or empty.
    ///
    /// Interpolation configured for `pin` is kept across unmapping and
    /// remapping. Call [`set_interpolation`](Self::set_interpolation) again
    /// when the new physical pin has a different native range.
    pub fn map(&mut self, pin: K, physical: Option<PhysicalPin>) {
        match physical.filter(|p| !p.is_empty()) {
            Some(physical) => {
                debug!(driver = self.driver.name(), pin = ?pin, physical = %physical, "Mapped pin");
                self.mapping.insert(pin, physical);
            }
            None => {
                if self.mapping.remove(&pin).is_some() {
                    debug!(driver = self.driver.name(), pin = ?pin, "Unmapped pin");
                }
            }
        }
    }

    /// Current abstract to physical table.
    pub fn mapped_pins(&self) -> &HashMap<K, PhysicalPin> {
        &self.mapping
    }

    /// Physical id behind `pin`.
    pub fn resolve(&self, pin: &K) -> Result<&PhysicalPin> {
        resolve(&self.mapping, pin)
    }

    /// Capability records of the underlying device.
    pub fn capabilities(&mut self) -> Result<Vec<Capability>> {
        self.driver.capabilities()
    }

    // --- Direction and type ------------------------------------------------

    pub fn set_direction(&mut self, pin: &K, direction: Direction) -> Result<()> {
        let physical = resolve(&self.mapping, pin)?;
        trace!(pin = ?pin, physical = %physical, %direction, "set_direction");
        self.driver.set_direction(physical, direction)
    }

    pub fn set_direction_each(&mut self, pins: &[K], direction: Direction) -> Result<()> {
        broadcast::each(pins, |pin| self.set_direction(pin, direction))
    }

    pub fn direction(&mut self, pin: &K) -> Result<Direction> {
        let physical = resolve(&self.mapping, pin)?;
        self.driver.direction(physical)
    }

    pub fn direction_each(&mut self, pins: &[K]) -> Result<Vec<Direction>> {
        broadcast::collect(pins, |pin| self.direction(pin))
    }

    pub fn set_type(&mut self, pin: &K, port_type: PortType) -> Result<()> {
        let physical = resolve(&self.mapping, pin)?;
        trace!(pin = ?pin, physical = %physical, %port_type, "set_type");
        self.driver.set_type(physical, port_type)
    }

    pub fn set_type_each(&mut self, pins: &[K], port_type: PortType) -> Result<()> {
        broadcast::each(pins, |pin| self.set_type(pin, port_type))
    }

    pub fn pin_type(&mut self, pin: &K) -> Result<PortType> {
        let physical = resolve(&self.mapping, pin)?;
        self.driver.port_type(physical)
    }

    pub fn pin_type_each(&mut self, pins: &[K]) -> Result<Vec<PortType>> {
        broadcast::collect(pins, |pin| self.pin_type(pin))
    }

    // --- Interpolation -----------------------------------------------------

    /// Configure linear rescaling of reads and writes on `pin`.
    ///
    /// Reads are mapped from the backend's native read range onto
    /// `(read_min, read_max)`; writes from `(write_min, write_max)` onto the
    /// backend's native write range. A direction is enabled only when both
    /// of its bounds are given and the backend declares a range for it.
    /// Passing all four as `None` removes any configuration. A direction
    /// whose source range has zero width is rejected with
    /// [`Error::InvalidValue`] and leaves the previous configuration intact.
    pub fn set_interpolation(
        &mut self,
        pin: &K,
        read_min: Option<f64>,
        read_max: Option<f64>,
        write_min: Option<f64>,
        write_max: Option<f64>,
    ) -> Result<()> {
        if read_min.is_none() && read_max.is_none() && write_min.is_none() && write_max.is_none() {
            if self.interpolation.remove(pin).is_some() {
                debug!(pin = ?pin, "Cleared interpolation");
            }
            return Ok(());
        }

        let physical = resolve(&self.mapping, pin)?;
        let capabilities = self.driver.capabilities()?;
        let capability = capability::find(&capabilities, physical);
        if capability.is_none() {
            warn!(
                driver = self.driver.name(),
                physical = %physical,
                "No capability record for pin, interpolation not applied"
            );
        }

        match Interpolation::configure(capability, read_min, read_max, write_min, write_max)? {
            Some(interpolation) => {
                debug!(
                    pin = ?pin,
                    read = interpolation.read.is_some(),
                    write = interpolation.write.is_some(),
                    "Configured interpolation"
                );
                self.interpolation.insert(pin.clone(), interpolation);
            }
            None => {
                self.interpolation.remove(pin);
            }
        }
        Ok(())
    }

    pub fn set_interpolation_each(
        &mut self,
        pins: &[K],
        read_min: Option<f64>,
        read_max: Option<f64>,
        write_min: Option<f64>,
        write_max: Option<f64>,
    ) -> Result<()> {
        broadcast::each(pins, |pin| {
            self.set_interpolation(pin, read_min, read_max, write_min, write_max)
        })
    }

    /// Interpolation currently configured for `pin`, if any.
    pub fn interpolation(&self, pin: &K) -> Option<&Interpolation> {
        self.interpolation.get(pin)
    }

    // --- Read and write ----------------------------------------------------

    /// Write `value` to `pin`.
    ///
    /// With `pwm` set, `value` is a duty cycle and must be numeric; this is
    /// checked before the pin is even resolved. Values pass through the
    /// pin's write interpolation, if any, before reaching the backend.
    pub fn write(&mut self, pin: &K, value: Value, pwm: bool) -> Result<()> {
        if pwm && !value.is_numeric() {
            return Err(Error::InvalidValue(format!(
                "pwm is set, but {value} is not a number"
            )));
        }

        let physical = resolve(&self.mapping, pin)?;
        let value = match self.interpolation.get(pin).and_then(|i| i.write) {
            Some(linear) => {
                let x = value.as_f64().ok_or_else(|| {
                    Error::InvalidValue(format!(
                        "pin {pin:?} rescales writes, but {value} is not a number"
                    ))
                })?;
                Value::Float(linear.apply(x))
            }
            None => value,
        };

        trace!(pin = ?pin, physical = %physical, %value, pwm, "write");
        self.driver.write(physical, value, pwm)
    }

    pub fn write_each(&mut self, pins: &[K], value: Value, pwm: bool) -> Result<()> {
        broadcast::each(pins, |pin| self.write(pin, value, pwm))
    }

    /// Read `pin`, rescaled through its read interpolation if configured.
    ///
    /// Logic levels come back unscaled even with interpolation configured;
    /// only numbers have a range to map.
    pub fn read(&mut self, pin: &K) -> Result<Value> {
        let physical = resolve(&self.mapping, pin)?;
        let raw = self.driver.read(physical)?;
        trace!(pin = ?pin, physical = %physical, value = %raw, "read");

        let linear = self.interpolation.get(pin).and_then(|i| i.read);
        let value = match (linear, raw.as_f64()) {
            (Some(linear), Some(x)) => Value::Float(linear.apply(x)),
            _ => raw,
        };
        Ok(value)
    }

    pub fn read_each(&mut self, pins: &[K]) -> Result<Vec<Value>> {
        broadcast::collect(pins, |pin| self.read(pin))
    }

    // --- Analog reference and PWM frequency --------------------------------

    pub fn analog_references(&mut self) -> Result<Vec<AnalogReference>> {
        self.driver.analog_references()
    }

    /// Set the analog reference for the whole device (`pin` = `None`) or
    /// for one pin.
    pub fn set_analog_reference(
        &mut self,
        reference: &AnalogReference,
        pin: Option<&K>,
    ) -> Result<()> {
        let physical = resolve_optional(&self.mapping, pin)?;
        self.driver.set_analog_reference(reference, physical)
    }

    pub fn set_analog_reference_each(
        &mut self,
        reference: &AnalogReference,
        pins: &[K],
    ) -> Result<()> {
        broadcast::each(pins, |pin| self.set_analog_reference(reference, Some(pin)))
    }

    pub fn analog_reference(&mut self, pin: Option<&K>) -> Result<AnalogReference> {
        let physical = resolve_optional(&self.mapping, pin)?;
        self.driver.analog_reference(physical)
    }

    pub fn analog_reference_each(&mut self, pins: &[K]) -> Result<Vec<AnalogReference>> {
        broadcast::collect(pins, |pin| self.analog_reference(Some(pin)))
    }

    /// Set the PWM frequency in hertz for the whole device or one pin.
    pub fn set_pwm_frequency(&mut self, frequency: f64, pin: Option<&K>) -> Result<()> {
        let physical = resolve_optional(&self.mapping, pin)?;
        self.driver.set_pwm_frequency(frequency, physical)
    }

    pub fn set_pwm_frequency_each(&mut self, frequency: f64, pins: &[K]) -> Result<()> {
        broadcast::each(pins, |pin| self.set_pwm_frequency(frequency, Some(pin)))
    }
}

fn resolve<'a, K>(mapping: &'a HashMap<K, PhysicalPin>, pin: &K) -> Result<&'a PhysicalPin>
where
    K: Eq + Hash + Debug,
{
    mapping.get(pin).ok_or_else(|| Error::unmapped(pin))
}

fn resolve_optional<'a, K>(
    mapping: &'a HashMap<K, PhysicalPin>,
    pin: Option<&K>,
) -> Result<Option<&'a PhysicalPin>>
where
    K: Eq + Hash + Debug,
{
    pin.map(|pin| resolve(mapping, pin)).transpose()
}
