//! Affine rescaling of analog values between a backend's native range and
//! caller-chosen units.
//!
//! Reads map the backend's declared `read_range` onto the caller's
//! `(read_min, read_max)`. Writes go the other way: the caller's
//! `(write_min, write_max)` maps onto the backend's `write_range` before the
//! value is dispatched.

use crate::capability::{Bounds, Capability};
use crate::error::{Error, Result};

/// One direction of rescaling: `domain` values map linearly onto `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    domain: Bounds,
    target: Bounds,
}

impl Linear {
    /// Build a mapping, rejecting a zero-width or non-finite domain.
    ///
    /// A zero-width target is allowed and maps everything to one value.
    pub fn new(domain: Bounds, target: Bounds) -> Result<Self> {
        let finite = [domain.min, domain.max, target.min, target.max]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidValue(format!(
                "interpolation bounds must be finite: {domain:?} -> {target:?}"
            )));
        }
        if domain.span() == 0.0 {
            return Err(Error::InvalidValue(format!(
                "interpolation domain has zero width: [{}, {}]",
                domain.min, domain.max
            )));
        }
        Ok(Self { domain, target })
    }

    pub fn domain(&self) -> Bounds {
        self.domain
    }

    pub fn target(&self) -> Bounds {
        self.target
    }

    /// Map `x` from the domain onto the target.
    ///
    /// `(d_hi*t_lo - d_lo*t_hi + x*(t_hi - t_lo)) / (d_hi - d_lo)`. Values
    /// outside the domain extrapolate; clamping is the backend's job.
    pub fn apply(&self, x: f64) -> f64 {
        let Bounds { min: d_lo, max: d_hi } = self.domain;
        let Bounds { min: t_lo, max: t_hi } = self.target;
        (d_hi * t_lo - d_lo * t_hi + x * (t_hi - t_lo)) / (d_hi - d_lo)
    }
}

/// Interpolation configured for one abstract pin.
///
/// At least one direction is always present; a pin with neither has no
/// entry at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    pub read: Option<Linear>,
    pub write: Option<Linear>,
}

impl Interpolation {
    /// Work out the interpolation for a pin from caller bounds and the
    /// backend's capability record.
    ///
    /// A direction is active only when both of its caller bounds are given
    /// and the backend declares a native range for it. Returns `None` when
    /// neither direction can be activated.
    pub fn configure(
        capability: Option<&Capability>,
        read_min: Option<f64>,
        read_max: Option<f64>,
        write_min: Option<f64>,
        write_max: Option<f64>,
    ) -> Result<Option<Self>> {
        let native_read = capability.and_then(|cap| cap.analog.read_range);
        let native_write = capability.and_then(|cap| cap.analog.write_range);

        let read = match (pair(read_min, read_max), native_read) {
            (Some(caller), Some(native)) => Some(Linear::new(native, caller)?),
            _ => None,
        };
        let write = match (pair(write_min, write_max), native_write) {
            (Some(caller), Some(native)) => Some(Linear::new(caller, native)?),
            _ => None,
        };

        if read.is_none() && write.is_none() {
            return Ok(None);
        }
        Ok(Some(Self { read, write }))
    }
}

fn pair(min: Option<f64>, max: Option<f64>) -> Option<Bounds> {
    match (min, max) {
        (Some(min), Some(max)) => Some(Bounds::new(min, max)),
        _ => None,
    }
}
