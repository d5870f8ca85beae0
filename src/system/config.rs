//! Hardware Configuration
//!
//! Board-level constants: sensor wiring, loop timing and buzzer feedback.
//! Engine limits (voltage window, sample interval, filter size) live in
//! `port_engine::limits`.

use embassy_time::Duration;
use port_engine::NUM_PORTS;

/// INA226 addresses, one per port (A1/A0 strapped 00, 01, 10, 11)
pub const SENSOR_ADDRESSES: [u8; NUM_PORTS] = [0x40, 0x41, 0x42, 0x43];

/// Sensor bus clock (fast mode)
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Shunt resistor on every port (Ω)
pub const SHUNT_RESISTANCE_OHMS: f32 = 0.1;

/// Current the sensor calibration is scaled for (A)
pub const MAX_EXPECTED_CURRENT: f32 = 3.2;

/// Control loop period; the engine rate-limits sampling on its own
pub const CONTROL_LOOP_PERIOD: Duration = Duration::from_millis(10);

/// Interval of the status block on the log
pub const STATUS_REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Encoder push button debounce
pub const ENCODER_DEBOUNCE: Duration = Duration::from_millis(50);

// buzzer feedback: tone (Hz) and duration per event
pub const BEEP_COMPLETE_HZ: u32 = 3000;
pub const BEEP_COMPLETE: Duration = Duration::from_millis(500);
pub const BEEP_ERROR_HZ: u32 = 1500;
pub const BEEP_ERROR: Duration = Duration::from_millis(200);
pub const BEEP_INPUT_HZ: u32 = 2500;
pub const BEEP_INPUT: Duration = Duration::from_millis(50);
