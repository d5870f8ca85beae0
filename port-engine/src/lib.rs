//! Port Engine
//!
//! Hardware-independent core of the four-port battery station: sensor
//! acquisition, median conditioning, charge/energy integration and the
//! safety state machine that drives each port's load switch.
//!
//! # Control Flow
//! ```text
//! Station::tick
//!   ├─ Acquisition (every SAMPLE_INTERVAL_MS)
//!   │    sensor -> validate -> PortFilter -> ChargeIntegrator -> PortRecord
//!   └─ SafetyMonitor (every call)
//!        PortRecord -> PowerSwitch + status + Notifier
//! ```
//!
//! Hardware is reached only through the traits in [`hal`]; the firmware
//! crate implements them for the INA226 sensors, MOSFET outputs and the
//! event channel.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod acquisition;
pub mod battery;
pub mod error;
pub mod filter;
pub mod hal;
pub mod input;
pub mod integrator;
pub mod limits;
pub mod port;
pub mod report;
pub mod safety;
pub mod station;

pub use battery::{BatteryKind, BatteryProfile, Mode, PortStatus, BATTERY_PROFILES};
pub use error::{ConfigError, Error, SensorError};
pub use hal::{Notifier, PortSensor, PowerSwitch, RawReading};
pub use limits::{SafetyLimits, NUM_PORTS};
pub use port::{Measurement, PortRecord, PortSnapshot};
pub use station::{PortCommand, Station};
