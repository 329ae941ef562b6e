//! Command-line front end for iopin.
//!
//! Lists registered drivers, shows what a driver's pins can do, and reads
//! or writes pins described by a TOML configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use iopin::tracing::{self, prelude::*};
use iopin::{registry, Capability, Config, Value};

/// Pin-level access to I/O devices through interchangeable drivers
#[derive(Parser, Debug)]
#[command(name = "iopin", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List drivers available on this platform
    ListDrivers,

    /// Show the pin capabilities of a driver
    Capabilities {
        /// Driver name, e.g. "Dummy"
        driver: String,
    },

    /// Read pins described by a configuration file
    Read {
        /// Configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Pins to read; all configured pins when omitted
        pins: Vec<String>,
    },

    /// Write one pin described by a configuration file
    Write {
        /// Configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Pin to write
        pin: String,

        /// "high", "low", an integer or a float
        value: String,

        /// Write the value as a PWM duty cycle
        #[arg(long)]
        pwm: bool,
    },

    /// Print an example configuration
    Example,
}

const EXAMPLE: &str = r#"# iopin configuration example
driver = "Dummy"

[pins.led]
physical = "D3"
direction = "output"
type = "digital"

[pins.temperature]
physical = "A0"
direction = "input"
type = "analog"
# Rescale the raw 0..1023 reading to degrees
read_min = 0.0
read_max = 100.0

[pins.heater]
physical = "A1"
direction = "output"
type = "analog"
# Accept percent, written to the native 0..5 range
write_min = 0.0
write_max = 100.0
"#;

fn main() -> Result<()> {
    tracing::init_journald_or_stdout();
    let cli = Cli::parse();

    match cli.command {
        Commands::ListDrivers => list_drivers(),
        Commands::Capabilities { driver } => show_capabilities(&driver)?,
        Commands::Read { config, pins } => read_pins(&config, pins)?,
        Commands::Write {
            config,
            pin,
            value,
            pwm,
        } => write_pin(&config, &pin, &value, pwm)?,
        Commands::Example => print!("{EXAMPLE}"),
    }
    Ok(())
}

fn list_drivers() {
    println!("Available drivers:");
    for name in registry::available_drivers() {
        println!("  {name}");
    }
}

fn show_capabilities(name: &str) -> Result<()> {
    let mut driver = registry::new_driver(name)?;
    let capabilities = driver
        .capabilities()
        .with_context(|| format!("querying capabilities of {name}"))?;

    println!(
        "{:<8} {:<16} {:<10} {:<18} {:<18} ANALOG",
        "PIN", "NAME", "DIGITAL", "READ RANGE", "WRITE RANGE"
    );
    for capability in &capabilities {
        println!("{}", describe(capability));
    }
    Ok(())
}

fn describe(capability: &Capability) -> String {
    let flags = |input: bool, output: bool, pwm: bool| {
        let mut s = String::new();
        s.push(if input { 'i' } else { '-' });
        s.push(if output { 'o' } else { '-' });
        s.push(if pwm { 'p' } else { '-' });
        s
    };
    let range = |bounds: Option<iopin::Bounds>| match bounds {
        Some(b) => format!("{}..{}", b.min, b.max),
        None => "-".to_string(),
    };

    let digital = &capability.digital;
    let analog = &capability.analog;
    format!(
        "{:<8} {:<16} {:<10} {:<18} {:<18} {}",
        capability.id.as_str(),
        capability.name,
        flags(digital.input, digital.output, digital.pwm),
        range(analog.read_range),
        range(analog.write_range),
        flags(analog.input, analog.output, false),
    )
}

fn load(path: &Path) -> Result<Config> {
    Config::load_from(path).with_context(|| format!("loading {}", path.display()))
}

fn read_pins(path: &Path, requested: Vec<String>) -> Result<()> {
    let config = load(path)?;
    let mut pins = config.build()?;

    let names = if requested.is_empty() {
        config.pins.keys().cloned().collect()
    } else {
        requested
    };
    debug!(pins = ?names, "Reading");

    let values = pins.read_each(&names)?;
    for (name, value) in names.iter().zip(values) {
        println!("{name} = {value}");
    }
    Ok(())
}

fn write_pin(path: &Path, pin: &str, value: &str, pwm: bool) -> Result<()> {
    let config = load(path)?;
    let mut pins = config.build()?;
    let value: Value = value.parse()?;

    pins.write(&pin.to_string(), value, pwm)
        .with_context(|| format!("writing {value} to {pin}"))?;
    info!(pin, %value, pwm, "Wrote pin");
    Ok(())
}
