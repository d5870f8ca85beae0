//! Error types
//!
//! Expected electrical and sensor faults are not errors in this sense: they
//! become port state transitions. These types cover rejected configuration
//! writes and collaborator failures reported to the caller.

use core::fmt;

/// Rejected write through the configuration surface
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Port index outside `0..NUM_PORTS`
    InvalidPort(usize),
    /// Custom cutoff outside the accepted window (V)
    CutoffOutOfRange(f32),
    /// Unknown operation mode code
    UnknownMode(u8),
    /// Unknown battery chemistry code
    UnknownBatteryKind(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort(port) => write!(f, "invalid port {}", port),
            Self::CutoffOutOfRange(volts) => write!(f, "cutoff {:.2}V out of range", volts),
            Self::UnknownMode(code) => write!(f, "unknown mode {}", code),
            Self::UnknownBatteryKind(code) => write!(f, "unknown battery type {}", code),
        }
    }
}

/// Sensor collaborator failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Device did not answer on the bus
    NotFound,
    /// Device answered with an unexpected identity
    UnexpectedDevice,
    /// Bus transfer failed while configuring the device
    Bus,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("Sensor not found"),
            Self::UnexpectedDevice => f.write_str("Unexpected sensor"),
            Self::Bus => f.write_str("Sensor bus error"),
        }
    }
}

/// Failure of a command through the configuration surface
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Config(ConfigError),
    Sensor(SensorError),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => e.fmt(f),
            Self::Sensor(e) => e.fmt(f),
        }
    }
}
