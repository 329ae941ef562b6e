//! Built-in simulated backends.
//!
//! Both register themselves with the [`registry`](crate::registry) and need
//! no hardware, so they are always available.

pub mod dummy;
pub mod siso;
