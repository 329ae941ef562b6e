//! iopin: one pin-level API over many I/O backends.
//!
//! Applications name their pins with their own keys, map them onto a
//! backend's physical pins, and then read and write through a
//! [`PinDriver`] without caring which device sits underneath. Backends
//! implement [`Driver`] and register with the [`registry`].

pub mod broadcast;
pub mod capability;
pub mod config;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod interpolation;
pub mod pins;
pub mod registry;
pub mod retry;
pub mod tracing;
pub mod types;

pub use capability::{AnalogCapability, Bounds, Capability, DigitalCapability};
pub use config::{Config, PinConfig};
pub use driver::Driver;
pub use error::{Error, Result};
pub use interpolation::{Interpolation, Linear};
pub use pins::PinDriver;
pub use types::{AnalogReference, Direction, LogicValue, PhysicalPin, PortType, Value};
