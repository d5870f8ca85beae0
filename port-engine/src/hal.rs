//! Collaborator traits
//!
//! The engine only sees a port's hardware through these seams. The firmware
//! implements them over the INA226 driver, GPIO outputs and the event
//! channel; the tests implement them with scripted mocks.

use crate::error::SensorError;
use crate::port::Measurement;

/// Unfiltered voltage/current pair as read from a sensor
pub type RawReading = Measurement;

/// Voltage/current sensor of one port
pub trait PortSensor {
    /// Probes and configures the device
    fn initialize(&mut self) -> Result<(), SensorError>;

    /// Reads one sample. Must always return; transient I/O failure is
    /// reported as non-finite values, which validation rejects.
    fn read_raw(&mut self) -> RawReading;
}

/// Load switch of one port
pub trait PowerSwitch {
    /// Called every control cycle, so it has to be idempotent
    fn set_energized(&mut self, energized: bool);
}

/// Presentation layer hooks, fired at most once per status transition
pub trait Notifier {
    fn notify_complete(&mut self, port: usize);
    fn notify_error(&mut self, port: usize);
}
