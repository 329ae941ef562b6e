//! Bounded retry for backends with transient "busy" failures.
//!
//! Some devices (PLCs with a pending job, shared buses) refuse a request
//! while they finish something else. Backends wrap such requests in
//! [`retry_on_busy`]; the pin layer itself never retries.

use crate::error::{Error, Result};
use crate::tracing::prelude::*;

/// Attempts used by PLC-style backends.
pub const DEFAULT_BUSY_ATTEMPTS: usize = 3;

/// Run `op` up to `attempts` times while it fails with [`Error::Busy`].
///
/// Any other error is returned at once. When every attempt reports busy,
/// the last busy error is returned. `attempts` of zero is treated as one.
pub fn retry_on_busy<T, F>(attempts: usize, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if e.is_busy() && attempt < attempts => {
                debug!(attempt, attempts, error = %e, "Device busy, retrying");
                attempt += 1;
            }
            Err(e @ Error::Busy(_)) => {
                warn!(attempts, error = %e, "Device still busy, giving up");
                return Err(e);
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_succeeds_after_transient_busy() {
        let mut calls = 0;
        let value = retry_on_busy(DEFAULT_BUSY_ATTEMPTS, || {
            calls += 1;
            if calls < 3 {
                Err(Error::Busy("Job pending".into()))
            } else {
                Ok(calls)
            }
        })
        .unwrap();
        assert_eq!(value, 3);
    }

    #[test_case(3, 3; "default budget")]
    #[test_case(1, 1; "single attempt")]
    #[test_case(0, 1; "zero treated as one")]
    fn test_gives_up_after_budget(attempts: usize, expected_calls: usize) {
        let mut calls = 0;
        let result: Result<()> = retry_on_busy(attempts, || {
            calls += 1;
            Err(Error::Busy("Job pending".into()))
        });
        assert!(matches!(result, Err(Error::Busy(_))));
        assert_eq!(calls, expected_calls);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<()> = retry_on_busy(DEFAULT_BUSY_ATTEMPTS, || {
            calls += 1;
            Err(Error::UnsupportedOperation("Can not write to Input".into()))
        });
        assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
        assert_eq!(calls, 1);
    }
}
