//! Simulated plant: a discrete-time single-input single-output
//! state-space model.
//!
//! Writing pin `U` sets the plant input; every read of pin `Y` advances the
//! model one sample and returns the new output:
//!
//! ```text
//! x[k+1] = A x[k] + B u
//! y      = C x[k+1] + D u
//! ```
//!
//! Handy for trying out control loops against the pin API before real
//! hardware is available.
//!
//! Setup parameters are the matrices `a`, `b`, `c` and optionally `d` of a
//! model that is already discrete. Continuous-time models have to be
//! discretised (e.g. zero-order hold at the intended sample time) before
//! they are handed over; no conversion happens here.

use serde::{Deserialize, Serialize};
use toml::Table;

use crate::capability::{AnalogCapability, Bounds, Capability};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::registry::DriverDescriptor;
use crate::tracing::prelude::*;
use crate::types::{AnalogReference, Direction, PhysicalPin, PortType, Value};

pub const NAME: &str = "SISO Model";

const INPUT_PIN: &str = "U";
const OUTPUT_PIN: &str = "Y";
const SIGNAL_RANGE: Bounds = Bounds::new(0.0, 100.0);

/// Matrices of a discrete state-space model with `n` states.
///
/// `a` is `n`×`n` (row-major), `b` and `c` have `n` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpace {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
    #[serde(default)]
    pub d: f64,
}

impl Default for StateSpace {
    /// First-order lag converging to twice its input.
    fn default() -> Self {
        Self {
            a: vec![vec![0.5]],
            b: vec![1.0],
            c: vec![1.0],
            d: 0.0,
        }
    }
}

impl StateSpace {
    fn order(&self) -> usize {
        self.a.len()
    }

    fn validate(&self) -> Result<()> {
        let n = self.order();
        if n == 0 {
            return Err(Error::Config("state-space model needs at least one state".into()));
        }
        if let Some(row) = self.a.iter().position(|row| row.len() != n) {
            return Err(Error::Config(format!(
                "A must be {n}x{n}, row {row} has {} entries",
                self.a[row].len()
            )));
        }
        if self.b.len() != n || self.c.len() != n {
            return Err(Error::Config(format!(
                "B and C must have {n} entries, got {} and {}",
                self.b.len(),
                self.c.len()
            )));
        }
        let finite = self
            .a
            .iter()
            .flatten()
            .chain(&self.b)
            .chain(&self.c)
            .chain(std::iter::once(&self.d))
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::Config("state-space coefficients must be finite".into()));
        }
        Ok(())
    }
}

/// Simulated plant, see the module documentation.
#[derive(Debug)]
pub struct SisoModel {
    model: StateSpace,
    state: Vec<f64>,
    input: f64,
}

impl Default for SisoModel {
    fn default() -> Self {
        Self {
            state: vec![0.0],
            model: StateSpace::default(),
            input: 0.0,
        }
    }
}

impl SisoModel {
    /// Build a plant from `model`, starting at rest with zero input.
    pub fn new(model: StateSpace) -> Result<Self> {
        model.validate()?;
        Ok(Self {
            state: vec![0.0; model.order()],
            model,
            input: 0.0,
        })
    }

    /// Current state vector.
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Return to rest with zero input.
    pub fn reset(&mut self) {
        self.state.iter_mut().for_each(|x| *x = 0.0);
        self.input = 0.0;
    }

    fn step(&mut self) -> f64 {
        let StateSpace { a, b, c, d } = &self.model;
        let next: Vec<f64> = a
            .iter()
            .zip(b)
            .map(|(row, b_i)| dot(row, &self.state) + b_i * self.input)
            .collect();
        self.state = next;
        let y = dot(c, &self.state) + d * self.input;
        trace!(u = self.input, y, "Model step");
        y
    }

    fn check_pin(pin: &PhysicalPin) -> Result<()> {
        match pin.as_str() {
            INPUT_PIN | OUTPUT_PIN => Ok(()),
            _ => Err(Error::UnsupportedOperation(format!("{NAME} has no pin {pin}"))),
        }
    }

    fn fixed_direction(pin: &PhysicalPin) -> Direction {
        if pin.as_str() == INPUT_PIN {
            Direction::Output
        } else {
            Direction::Input
        }
    }
}

impl Driver for SisoModel {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&mut self) -> Result<Vec<Capability>> {
        Ok(vec![
            Capability::new(INPUT_PIN, "U").with_analog(AnalogCapability {
                input: false,
                output: true,
                read_range: None,
                write_range: Some(SIGNAL_RANGE),
            }),
            Capability::new(OUTPUT_PIN, "Y").with_analog(AnalogCapability {
                input: true,
                output: false,
                read_range: Some(SIGNAL_RANGE),
                write_range: None,
            }),
        ])
    }

    fn set_direction(&mut self, pin: &PhysicalPin, direction: Direction) -> Result<()> {
        Self::check_pin(pin)?;
        if direction != Self::fixed_direction(pin) {
            return Err(Error::UnsupportedOperation(format!(
                "pin {pin} can not be used as {direction}"
            )));
        }
        Ok(())
    }

    fn direction(&mut self, pin: &PhysicalPin) -> Result<Direction> {
        Self::check_pin(pin)?;
        Ok(Self::fixed_direction(pin))
    }

    fn set_type(&mut self, pin: &PhysicalPin, port_type: PortType) -> Result<()> {
        Self::check_pin(pin)?;
        match port_type {
            PortType::Analog => Ok(()),
            PortType::Digital => Err(Error::UnsupportedOperation(format!(
                "{NAME} pins are analog only"
            ))),
        }
    }

    fn port_type(&mut self, pin: &PhysicalPin) -> Result<PortType> {
        Self::check_pin(pin)?;
        Ok(PortType::Analog)
    }

    fn write(&mut self, pin: &PhysicalPin, value: Value, pwm: bool) -> Result<()> {
        Self::check_pin(pin)?;
        if pin.as_str() != INPUT_PIN {
            trace!(physical = %pin, "Ignoring write to input pin");
            return Ok(());
        }
        if pwm {
            return Err(Error::UnsupportedOperation("Pin does not support PWM".into()));
        }
        let u = value.as_f64().ok_or_else(|| {
            Error::InvalidValue(format!("model input must be a number, got {value}"))
        })?;
        self.input = SIGNAL_RANGE.clamp(u);
        Ok(())
    }

    fn read(&mut self, pin: &PhysicalPin) -> Result<Value> {
        Self::check_pin(pin)?;
        if pin.as_str() == INPUT_PIN {
            return Ok(Value::Float(self.input));
        }
        Ok(Value::Float(self.step()))
    }

    fn analog_references(&mut self) -> Result<Vec<AnalogReference>> {
        Ok(Vec::new())
    }

    fn set_analog_reference(
        &mut self,
        _reference: &AnalogReference,
        _pin: Option<&PhysicalPin>,
    ) -> Result<()> {
        Err(Error::UnsupportedOperation(format!(
            "{NAME} has no analog reference"
        )))
    }

    fn analog_reference(&mut self, _pin: Option<&PhysicalPin>) -> Result<AnalogReference> {
        Err(Error::UnsupportedOperation(format!(
            "{NAME} has no analog reference"
        )))
    }

    fn set_pwm_frequency(&mut self, _frequency: f64, pin: Option<&PhysicalPin>) -> Result<()> {
        if let Some(pin) = pin {
            Self::check_pin(pin)?;
        }
        Ok(())
    }
}

fn dot(lhs: &[f64], rhs: &[f64]) -> f64 {
    lhs.iter().zip(rhs).map(|(l, r)| l * r).sum()
}

fn always() -> bool {
    true
}

fn create(setup: Option<&Table>) -> Result<Box<dyn Driver>> {
    let Some(table) = setup else {
        return Ok(Box::new(SisoModel::default()));
    };
    let model: StateSpace = toml::Value::Table(table.clone())
        .try_into()
        .map_err(|e| Error::Config(format!("{NAME} setup: {e}")))?;
    Ok(Box::new(SisoModel::new(model)?))
}

inventory::submit! {
    DriverDescriptor {
        name: NAME,
        available: always,
        create,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn y(model: &mut SisoModel) -> f64 {
        model.read(&OUTPUT_PIN.into()).unwrap().as_f64().unwrap()
    }

    #[test]
    fn test_default_model_step_response() {
        let mut model = SisoModel::default();
        model.write(&INPUT_PIN.into(), Value::Int(1), false).unwrap();

        for expected in [1.0, 1.5, 1.75, 1.875] {
            assert!((y(&mut model) - expected).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_second_order_model() {
        // Two integrators in series, output is the second state
        let model = StateSpace {
            a: vec![vec![1.0, 0.0], vec![1.0, 1.0]],
            b: vec![1.0, 0.0],
            c: vec![0.0, 1.0],
            d: 0.0,
        };
        let mut plant = SisoModel::new(model).unwrap();
        plant.write(&INPUT_PIN.into(), Value::Float(2.0), false).unwrap();

        assert!((y(&mut plant) - 0.0).abs() < TOLERANCE);
        assert!((y(&mut plant) - 2.0).abs() < TOLERANCE);
        assert!((y(&mut plant) - 6.0).abs() < TOLERANCE);
        assert_eq!(plant.state(), &[6.0, 6.0]);

        plant.reset();
        assert_eq!(plant.state(), &[0.0, 0.0]);
    }

    #[test]
    fn test_feedthrough() {
        let model = StateSpace {
            d: 0.5,
            ..StateSpace::default()
        };
        let mut plant = SisoModel::new(model).unwrap();
        plant.write(&INPUT_PIN.into(), Value::Int(4), false).unwrap();
        assert!((y(&mut plant) - 6.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_shape_validation() {
        let bad_a = StateSpace {
            a: vec![vec![1.0, 0.0], vec![1.0]],
            b: vec![1.0, 0.0],
            c: vec![0.0, 1.0],
            d: 0.0,
        };
        assert!(matches!(SisoModel::new(bad_a), Err(Error::Config(_))));

        let bad_b = StateSpace {
            b: vec![1.0, 2.0],
            ..StateSpace::default()
        };
        assert!(matches!(SisoModel::new(bad_b), Err(Error::Config(_))));

        let empty = StateSpace {
            a: vec![],
            b: vec![],
            c: vec![],
            d: 0.0,
        };
        assert!(matches!(SisoModel::new(empty), Err(Error::Config(_))));
    }

    #[test]
    fn test_factory_reads_setup_table() {
        let setup: Table = toml::from_str("a = [[0.5]]\nb = [2.0]\nc = [1.0]\nd = 1.0").unwrap();
        let mut plant = create(Some(&setup)).unwrap();
        plant.write(&"U".into(), Value::Int(1), false).unwrap();
        // x = 2, y = x + d * u
        assert_eq!(plant.read(&"Y".into()).unwrap(), Value::Float(3.0));

        let bad: Table = toml::from_str("a = [[0.5]]\nb = [1.0, 1.0]\nc = [1.0]").unwrap();
        assert!(matches!(create(Some(&bad)), Err(Error::Config(_))));

        let malformed: Table = toml::from_str("a = 0.5").unwrap();
        assert!(matches!(create(Some(&malformed)), Err(Error::Config(_))));
    }

    #[test]
    fn test_pins_are_fixed() {
        let mut plant = SisoModel::default();
        assert_eq!(plant.direction(&"U".into()).unwrap(), Direction::Output);
        assert_eq!(plant.direction(&"Y".into()).unwrap(), Direction::Input);
        assert!(matches!(
            plant.set_direction(&"Y".into(), Direction::Output),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            plant.set_type(&"U".into(), PortType::Digital),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            plant.write(&"U".into(), Value::Float(0.5), true),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            plant.read(&"X".into()),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_input_is_clamped() {
        let mut plant = SisoModel::default();
        plant.write(&"U".into(), Value::Float(250.0), false).unwrap();
        assert_eq!(plant.read(&"U".into()).unwrap(), Value::Float(100.0));
    }
}
