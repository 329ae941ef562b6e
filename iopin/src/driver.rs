//! Backend primitive contract.
//!
//! A [`Driver`] talks to one concrete device in that device's own pin
//! vocabulary ([`PhysicalPin`]). It knows nothing about abstract pin ids,
//! interpolation or broadcast calls; [`crate::pins::PinDriver`] layers those
//! on top. Each primitive validates what only the hardware can know
//! (direction support, value ranges, reference scope) and reports failures
//! as [`Error::UnsupportedOperation`](crate::Error::UnsupportedOperation) or
//! [`Error::InvalidValue`](crate::Error::InvalidValue).
//!
//! Backend expectations beyond the signatures:
//! - `set_direction(_, Output)` parks the pin at logic low.
//! - `write` on a pin currently set to input is silently ignored.
//! - `write` with `pwm` on a pin without PWM support is unsupported.
//! - With `pin` = `None`, analog reference and PWM frequency calls address
//!   the whole device; with `Some`, a single pin. Hardware that supports
//!   only one of the two scopes rejects the other.

use crate::capability::Capability;
use crate::error::Result;
use crate::types::{AnalogReference, Direction, PhysicalPin, PortType, Value};

pub trait Driver {
    /// Short driver name used in log context.
    fn name(&self) -> &str;

    /// Capability records for every pin the device exposes.
    ///
    /// Devices that cannot enumerate their pins (PLC memory areas, Modbus
    /// registers) return an empty list.
    fn capabilities(&mut self) -> Result<Vec<Capability>>;

    fn set_direction(&mut self, pin: &PhysicalPin, direction: Direction) -> Result<()>;

    fn direction(&mut self, pin: &PhysicalPin) -> Result<Direction>;

    fn set_type(&mut self, pin: &PhysicalPin, port_type: PortType) -> Result<()>;

    fn port_type(&mut self, pin: &PhysicalPin) -> Result<PortType>;

    fn write(&mut self, pin: &PhysicalPin, value: Value, pwm: bool) -> Result<()>;

    fn read(&mut self, pin: &PhysicalPin) -> Result<Value>;

    /// References accepted by [`Driver::set_analog_reference`].
    fn analog_references(&mut self) -> Result<Vec<AnalogReference>>;

    fn set_analog_reference(
        &mut self,
        reference: &AnalogReference,
        pin: Option<&PhysicalPin>,
    ) -> Result<()>;

    fn analog_reference(&mut self, pin: Option<&PhysicalPin>) -> Result<AnalogReference>;

    /// Set the PWM frequency in hertz.
    fn set_pwm_frequency(&mut self, frequency: f64, pin: Option<&PhysicalPin>) -> Result<()>;
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capabilities(&mut self) -> Result<Vec<Capability>> {
        (**self).capabilities()
    }

    fn set_direction(&mut self, pin: &PhysicalPin, direction: Direction) -> Result<()> {
        (**self).set_direction(pin, direction)
    }

    fn direction(&mut self, pin: &PhysicalPin) -> Result<Direction> {
        (**self).direction(pin)
    }

    fn set_type(&mut self, pin: &PhysicalPin, port_type: PortType) -> Result<()> {
        (**self).set_type(pin, port_type)
    }

    fn port_type(&mut self, pin: &PhysicalPin) -> Result<PortType> {
        (**self).port_type(pin)
    }

    fn write(&mut self, pin: &PhysicalPin, value: Value, pwm: bool) -> Result<()> {
        (**self).write(pin, value, pwm)
    }

    fn read(&mut self, pin: &PhysicalPin) -> Result<Value> {
        (**self).read(pin)
    }

    fn analog_references(&mut self) -> Result<Vec<AnalogReference>> {
        (**self).analog_references()
    }

    fn set_analog_reference(
        &mut self,
        reference: &AnalogReference,
        pin: Option<&PhysicalPin>,
    ) -> Result<()> {
        (**self).set_analog_reference(reference, pin)
    }

    fn analog_reference(&mut self, pin: Option<&PhysicalPin>) -> Result<AnalogReference> {
        (**self).analog_reference(pin)
    }

    fn set_pwm_frequency(&mut self, frequency: f64, pin: Option<&PhysicalPin>) -> Result<()> {
        (**self).set_pwm_frequency(frequency, pin)
    }
}
