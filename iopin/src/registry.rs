//! Driver registry.
//!
//! Drivers register themselves with `inventory::submit!` and are looked up
//! by name at runtime; there is no filesystem scanning or dynamic loading.
//! Applications with their own backends submit a [`DriverDescriptor`] the
//! same way:
//!
//! ```ignore
//! inventory::submit! {
//!     iopin::registry::DriverDescriptor {
//!         name: "MyBoard",
//!         available: my_board_present,
//!         create: create_my_board,
//!     }
//! }
//! ```
//!
//! `create` receives the driver's setup parameters, the `[setup]` table of a
//! [`Config`](crate::config::Config), or `None` for a default instance.

use toml::Table;

use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::tracing::prelude::*;

/// Registration record for one driver.
pub struct DriverDescriptor {
    /// Name used to select the driver, matched case-insensitively
    pub name: &'static str,
    /// Whether the driver can run on this platform
    pub available: fn() -> bool,
    /// Construct a fresh driver instance from optional setup parameters
    pub create: fn(Option<&Table>) -> Result<Box<dyn Driver>>,
}

impl std::fmt::Debug for DriverDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverDescriptor")
            .field("name", &self.name)
            .field("available", &(self.available)())
            .finish()
    }
}

inventory::collect!(DriverDescriptor);

/// Names of drivers usable on this platform, sorted.
pub fn available_drivers() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = inventory::iter::<DriverDescriptor>()
        .filter(|desc| (desc.available)())
        .map(|desc| desc.name)
        .collect();
    names.sort_unstable();
    names
}

/// Registration record for `name`, whether or not it is available.
pub fn driver_info(name: &str) -> Option<&'static DriverDescriptor> {
    inventory::iter::<DriverDescriptor>().find(|desc| desc.name.eq_ignore_ascii_case(name))
}

/// Create a new instance of the driver called `name` with its default setup.
pub fn new_driver(name: &str) -> Result<Box<dyn Driver>> {
    setup_driver(name, None)
}

/// Create a new instance of the driver called `name`, passing `setup` to
/// its factory.
pub fn setup_driver(name: &str, setup: Option<&Table>) -> Result<Box<dyn Driver>> {
    let desc =
        driver_info(name).ok_or_else(|| Error::DriverNotFound(name.to_string()))?;
    if !(desc.available)() {
        warn!(
            driver = desc.name,
            "Driver is registered but not available on this platform"
        );
        return Err(Error::DriverNotFound(format!(
            "{} (not available on this platform)",
            desc.name
        )));
    }
    debug!(driver = desc.name, setup = setup.is_some(), "Creating driver");
    (desc.create)(setup)
}

/// Reject setup parameters for drivers that take none.
pub fn no_setup(driver: &str, setup: Option<&Table>) -> Result<()> {
    match setup {
        Some(table) if !table.is_empty() => Err(Error::Config(format!(
            "{driver} takes no setup parameters, got {}",
            table.keys().cloned().collect::<Vec<_>>().join(", ")
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never() -> bool {
        false
    }

    fn create_dummy(_setup: Option<&Table>) -> Result<Box<dyn Driver>> {
        Ok(Box::new(crate::drivers::dummy::Dummy::new()))
    }

    inventory::submit! {
        DriverDescriptor {
            name: "Unavailable",
            available: never,
            create: create_dummy,
        }
    }

    #[test]
    fn test_builtin_drivers_listed() {
        let names = available_drivers();
        assert!(names.contains(&"Dummy"));
        assert!(names.contains(&"SISO Model"));
        assert!(!names.contains(&"Unavailable"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let driver = new_driver("dummy").unwrap();
        assert_eq!(driver.name(), "Dummy");
        assert_eq!(driver_info("siso model").unwrap().name, "SISO Model");
    }

    #[test]
    fn test_unknown_driver() {
        assert!(matches!(new_driver("Teletype"), Err(Error::DriverNotFound(_))));
        assert!(driver_info("Teletype").is_none());
    }

    #[test]
    fn test_setup_reaches_factory() {
        let setup: Table = toml::from_str("a = [[0.0]]\nb = [1.0]\nc = [3.0]").unwrap();
        let mut driver = setup_driver("SISO Model", Some(&setup)).unwrap();
        driver
            .write(&"U".into(), crate::types::Value::Int(2), false)
            .unwrap();
        assert_eq!(
            driver.read(&"Y".into()).unwrap(),
            crate::types::Value::Float(6.0)
        );
    }

    #[test]
    fn test_setup_rejected_by_driver_without_parameters() {
        let setup: Table = toml::from_str("port = \"/dev/ttyACM0\"").unwrap();
        assert!(matches!(
            setup_driver("Dummy", Some(&setup)),
            Err(Error::Config(_))
        ));
        assert!(setup_driver("Dummy", Some(&Table::new())).is_ok());
    }

    #[test]
    fn test_unavailable_driver_cannot_be_created() {
        assert!(driver_info("Unavailable").is_some());
        assert!(matches!(new_driver("Unavailable"), Err(Error::DriverNotFound(_))));
    }
}
