//! In-memory simulated device.
//!
//! Behaves like a small microcontroller board: four digital pins (`D0` to
//! `D3`, PWM on `D1` and `D3`), an analog input `A0` and an analog in/out
//! pin `A1`. Nothing leaves the process; writes are remembered and reads
//! return the last written or [injected](Dummy::inject) value. Useful for
//! demos and for exercising application code without hardware.

use std::collections::BTreeMap;

use toml::Table;

use crate::capability::{AnalogCapability, Bounds, Capability, DigitalCapability};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::registry::{self, DriverDescriptor};
use crate::tracing::prelude::*;
use crate::types::{AnalogReference, Direction, LogicValue, PhysicalPin, PortType, Value};

pub const NAME: &str = "Dummy";

const ADC_RANGE: Bounds = Bounds::new(0.0, 1023.0);
const DAC_RANGE: Bounds = Bounds::new(0.0, 5.0);
const DUTY_RANGE: Bounds = Bounds::new(0.0, 1.0);

const REFERENCES: [&str; 3] = ["Default", "Internal", "External"];

#[derive(Debug)]
struct PinState {
    capability: Capability,
    direction: Direction,
    port_type: PortType,
    value: Value,
    pwm_frequency: Option<f64>,
}

impl PinState {
    fn new(capability: Capability) -> Self {
        let port_type = if capability.supports_digital() {
            PortType::Digital
        } else {
            PortType::Analog
        };
        Self {
            direction: Direction::Input,
            port_type,
            value: idle_value(&capability, port_type),
            pwm_frequency: None,
            capability,
        }
    }

    fn supports(&self, direction: Direction, port_type: PortType) -> bool {
        let (analog, digital) = (&self.capability.analog, &self.capability.digital);
        match (port_type, direction) {
            (PortType::Analog, Direction::Input) => analog.input,
            (PortType::Analog, Direction::Output) => analog.output,
            (PortType::Digital, Direction::Input) => digital.input,
            (PortType::Digital, Direction::Output) => digital.output,
        }
    }
}

// Logic low for digital pins, bottom of the native range for analog ones
fn idle_value(capability: &Capability, port_type: PortType) -> Value {
    match port_type {
        PortType::Digital => Value::Logic(LogicValue::Low),
        PortType::Analog => {
            let range = capability
                .analog
                .write_range
                .or(capability.analog.read_range)
                .unwrap_or(Bounds::new(0.0, 0.0));
            Value::Float(range.min)
        }
    }
}

/// Simulated board, see the module documentation.
#[derive(Debug)]
pub struct Dummy {
    pins: BTreeMap<PhysicalPin, PinState>,
    reference: AnalogReference,
    pwm_frequency: Option<f64>,
}

impl Default for Dummy {
    fn default() -> Self {
        Self::new()
    }
}

impl Dummy {
    pub fn new() -> Self {
        let pins = board_layout()
            .into_iter()
            .map(|cap| (cap.id.clone(), PinState::new(cap)))
            .collect();
        Self {
            pins,
            reference: AnalogReference::new(REFERENCES[0]),
            pwm_frequency: None,
        }
    }

    /// Set the value the next reads of `pin` return, as if driven from
    /// outside the device.
    pub fn inject(&mut self, pin: &PhysicalPin, value: Value) -> Result<()> {
        let state = self.pin_mut(pin)?;
        trace!(physical = %pin, %value, "Injected value");
        state.value = value;
        Ok(())
    }

    /// PWM frequency in effect for `pin`: its own setting, else the global
    /// one.
    pub fn pwm_frequency(&self, pin: &PhysicalPin) -> Option<f64> {
        self.pins
            .get(pin)
            .and_then(|state| state.pwm_frequency)
            .or(self.pwm_frequency)
    }

    fn pin(&self, pin: &PhysicalPin) -> Result<&PinState> {
        self.pins
            .get(pin)
            .ok_or_else(|| Error::UnsupportedOperation(format!("{NAME} has no pin {pin}")))
    }

    fn pin_mut(&mut self, pin: &PhysicalPin) -> Result<&mut PinState> {
        self.pins
            .get_mut(pin)
            .ok_or_else(|| Error::UnsupportedOperation(format!("{NAME} has no pin {pin}")))
    }
}

fn board_layout() -> Vec<Capability> {
    let mut layout: Vec<Capability> = (0..4)
        .map(|n| {
            Capability::new(format!("D{n}"), format!("Digital {n}")).with_digital(
                DigitalCapability {
                    input: true,
                    output: true,
                    pwm: n % 2 == 1,
                },
            )
        })
        .collect();
    layout.push(
        Capability::new("A0", "Analog 0").with_analog(AnalogCapability {
            input: true,
            output: false,
            read_range: Some(ADC_RANGE),
            write_range: None,
        }),
    );
    layout.push(
        Capability::new("A1", "Analog 1").with_analog(AnalogCapability {
            input: true,
            output: true,
            read_range: Some(ADC_RANGE),
            write_range: Some(DAC_RANGE),
        }),
    );
    layout
}

impl Driver for Dummy {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&mut self) -> Result<Vec<Capability>> {
        Ok(self
            .pins
            .values()
            .map(|state| state.capability.clone())
            .collect())
    }

    fn set_direction(&mut self, pin: &PhysicalPin, direction: Direction) -> Result<()> {
        let state = self.pin_mut(pin)?;
        if !state.supports(direction, state.port_type) {
            return Err(Error::UnsupportedOperation(format!(
                "{} pin {pin} does not support {direction}",
                state.port_type
            )));
        }
        state.direction = direction;
        if direction == Direction::Output {
            state.value = idle_value(&state.capability, state.port_type);
        }
        Ok(())
    }

    fn direction(&mut self, pin: &PhysicalPin) -> Result<Direction> {
        Ok(self.pin(pin)?.direction)
    }

    fn set_type(&mut self, pin: &PhysicalPin, port_type: PortType) -> Result<()> {
        let state = self.pin_mut(pin)?;
        let supported = match port_type {
            PortType::Analog => state.capability.supports_analog(),
            PortType::Digital => state.capability.supports_digital(),
        };
        if !supported {
            return Err(Error::UnsupportedOperation(format!(
                "pin {pin} can not be set as {port_type}"
            )));
        }
        if state.port_type != port_type {
            state.port_type = port_type;
            if !state.supports(state.direction, port_type) {
                state.direction = Direction::Input;
            }
            state.value = idle_value(&state.capability, port_type);
        }
        Ok(())
    }

    fn port_type(&mut self, pin: &PhysicalPin) -> Result<PortType> {
        Ok(self.pin(pin)?.port_type)
    }

    fn write(&mut self, pin: &PhysicalPin, value: Value, pwm: bool) -> Result<()> {
        let state = self.pin_mut(pin)?;
        if state.direction == Direction::Input {
            trace!(physical = %pin, "Ignoring write to input pin");
            return Ok(());
        }

        state.value = match state.port_type {
            PortType::Digital if pwm => {
                if !state.capability.digital.pwm {
                    return Err(Error::UnsupportedOperation(format!(
                        "pin {pin} does not support PWM"
                    )));
                }
                let duty = value.as_f64().ok_or_else(|| {
                    Error::InvalidValue(format!("PWM duty cycle must be a number, got {value}"))
                })?;
                Value::Float(DUTY_RANGE.clamp(duty))
            }
            PortType::Digital => match value {
                Value::Logic(_) => value,
                _ => {
                    return Err(Error::InvalidValue(format!(
                        "digital write expects high or low, got {value}"
                    )))
                }
            },
            PortType::Analog if pwm => {
                return Err(Error::UnsupportedOperation(format!(
                    "pin {pin} is analog, PWM needs a digital pin"
                )))
            }
            PortType::Analog => {
                let range = state.capability.analog.write_range.ok_or_else(|| {
                    Error::UnsupportedOperation(format!("pin {pin} does not support analog output"))
                })?;
                let level = value.as_f64().ok_or_else(|| {
                    Error::InvalidValue(format!("analog write expects a number, got {value}"))
                })?;
                Value::Float(range.clamp(level))
            }
        };
        Ok(())
    }

    fn read(&mut self, pin: &PhysicalPin) -> Result<Value> {
        Ok(self.pin(pin)?.value)
    }

    fn analog_references(&mut self) -> Result<Vec<AnalogReference>> {
        Ok(REFERENCES.iter().map(|r| AnalogReference::new(*r)).collect())
    }

    fn set_analog_reference(
        &mut self,
        reference: &AnalogReference,
        pin: Option<&PhysicalPin>,
    ) -> Result<()> {
        if pin.is_some() {
            return Err(Error::UnsupportedOperation(
                "Per pin analog reference is not supported".into(),
            ));
        }
        if !REFERENCES.contains(&reference.as_str()) {
            return Err(Error::InvalidValue(format!(
                "unknown analog reference {reference}"
            )));
        }
        self.reference = reference.clone();
        Ok(())
    }

    fn analog_reference(&mut self, pin: Option<&PhysicalPin>) -> Result<AnalogReference> {
        if pin.is_some() {
            return Err(Error::UnsupportedOperation(
                "Per pin analog reference is not supported".into(),
            ));
        }
        Ok(self.reference.clone())
    }

    fn set_pwm_frequency(&mut self, frequency: f64, pin: Option<&PhysicalPin>) -> Result<()> {
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(Error::InvalidValue(format!(
                "PWM frequency must be positive, got {frequency}"
            )));
        }
        match pin {
            None => self.pwm_frequency = Some(frequency),
            Some(pin) => {
                let state = self.pin_mut(pin)?;
                if !state.capability.digital.pwm {
                    return Err(Error::UnsupportedOperation(format!(
                        "pin {pin} does not support PWM"
                    )));
                }
                state.pwm_frequency = Some(frequency);
            }
        }
        Ok(())
    }
}

fn always() -> bool {
    true
}

fn create(setup: Option<&Table>) -> Result<Box<dyn Driver>> {
    registry::no_setup(NAME, setup)?;
    Ok(Box::new(Dummy::new()))
}

inventory::submit! {
    DriverDescriptor {
        name: NAME,
        available: always,
        create,
    }
}
