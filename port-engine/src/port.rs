//! Port State
//!
//! One [`PortRecord`] exists per physical port for the whole runtime. The
//! engine writes measurements, accumulators and status; the configuration
//! surface writes mode, chemistry, cutoff and the active flag. Both run on
//! the same thread, so plain `&mut` access is all the synchronization needed.
//!
//! # Invariants
//! - accumulators never drop below zero
//! - `status == Error` implies `active == false` (the switch follows on the
//!   next safety pass, which runs in the same loop iteration)
//! - `mode == Safety` implies `active == false`

use core::fmt::Write;

use heapless::String;

use crate::battery::{BatteryKind, BatteryProfile, Mode, PortStatus};
use crate::error::ConfigError;
use crate::limits::{CUSTOM_CUTOFF_MAX, CUSTOM_CUTOFF_MIN};

/// Capacity of a port fault description
pub const ERROR_MESSAGE_LEN: usize = 64;

/// Short fault description shown on the presentation surfaces
pub type ErrorMessage = String<ERROR_MESSAGE_LEN>;

/// Filtered voltage/current pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Volts
    pub voltage: f32,
    /// Amps, positive while discharging
    pub current: f32,
}

impl Measurement {
    pub const fn new(voltage: f32, current: f32) -> Self {
        Self { voltage, current }
    }

    /// Instantaneous power (W)
    pub fn power(&self) -> f32 {
        self.voltage * self.current
    }
}

/// Shared per-port data record
#[derive(Debug, Clone, PartialEq)]
pub struct PortRecord {
    // measurements
    pub voltage: f32,
    pub current: f32,
    pub power: f32,
    /// mAh since last reset
    pub accumulated_charge: f32,
    /// Wh since last reset
    pub accumulated_energy: f32,

    // configuration
    pub mode: Mode,
    pub battery_kind: BatteryKind,
    pub custom_cutoff: f32,
    pub use_custom_cutoff: bool,

    // status
    pub status: PortStatus,
    pub active: bool,
    /// Session start (ms), `None` until the port is first activated
    pub start_time: Option<u64>,
    /// Last successful accumulation (ms), `None` until seeded
    pub last_update: Option<u64>,
    /// The median window holds only real samples, so the filtered values
    /// carry no start-up bias
    pub settled: bool,

    // error tracking
    pub consecutive_error_count: u32,
    pub error_message: ErrorMessage,
}

impl Default for PortRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl PortRecord {
    /// Power-on state: Safety mode, Li-ion, idle
    pub const fn new() -> Self {
        Self {
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
            accumulated_charge: 0.0,
            accumulated_energy: 0.0,
            mode: Mode::Safety,
            battery_kind: BatteryKind::LiIon,
            custom_cutoff: 3.0,
            use_custom_cutoff: false,
            status: PortStatus::Idle,
            active: false,
            start_time: None,
            last_update: None,
            settled: false,
            consecutive_error_count: 0,
            error_message: String::new(),
        }
    }

    pub fn profile(&self) -> &'static BatteryProfile {
        self.battery_kind.profile()
    }

    /// Cutoff actually applied: operator override if set, else the chemistry default
    pub fn effective_cutoff(&self) -> f32 {
        if self.use_custom_cutoff {
            self.custom_cutoff
        } else {
            self.profile().cutoff_voltage
        }
    }

    pub fn battery_name(&self) -> &'static str {
        self.battery_kind.name()
    }

    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    pub fn status_name(&self) -> &'static str {
        self.status.name()
    }

    /// Discharge has reached the effective cutoff
    pub fn should_stop_discharge(&self) -> bool {
        self.mode == Mode::Discharging && self.voltage <= self.effective_cutoff()
    }

    /// Writes a filtered reading into the measurement fields
    pub fn apply_measurement(&mut self, measurement: Measurement) {
        self.voltage = measurement.voltage;
        self.current = measurement.current;
        self.power = measurement.power();
    }

    /// Zeroes accumulators and error state and restarts the session clock.
    ///
    /// Mode, chemistry and cutoff configuration are left untouched.
    pub fn reset(&mut self, now: u64) {
        self.accumulated_charge = 0.0;
        self.accumulated_energy = 0.0;
        self.start_time = Some(now);
        self.last_update = None;
        self.consecutive_error_count = 0;
        self.error_message.clear();
        self.status = PortStatus::Idle;
    }

    /// Operator mode change. Clears any latched fault.
    pub fn set_mode(&mut self, mode: Mode, now: u64) {
        self.mode = mode;
        self.clear_fault();
        self.last_update = None;
        self.settled = false;
        if mode == Mode::Safety {
            self.active = false;
        } else {
            self.active = true;
            if self.start_time.is_none() {
                self.start_time = Some(now);
            }
        }
    }

    pub fn set_battery_kind(&mut self, kind: BatteryKind) {
        self.battery_kind = kind;
    }

    /// Sets and enables an operator cutoff override
    pub fn set_custom_cutoff(&mut self, volts: f32) -> Result<(), ConfigError> {
        if !(CUSTOM_CUTOFF_MIN..=CUSTOM_CUTOFF_MAX).contains(&volts) {
            return Err(ConfigError::CutoffOutOfRange(volts));
        }
        self.custom_cutoff = volts;
        self.use_custom_cutoff = true;
        Ok(())
    }

    /// Falls back to the chemistry default cutoff
    pub fn clear_custom_cutoff(&mut self) {
        self.use_custom_cutoff = false;
    }

    /// Toggles participation in sampling and switching. The integrator is
    /// re-seeded so the inactive gap is never accumulated.
    pub fn set_active(&mut self, active: bool) {
        if active != self.active {
            self.last_update = None;
        }
        self.active = active;
    }

    /// Latches the Error status with a description of the cause
    pub fn fault(&mut self, args: core::fmt::Arguments<'_>) {
        self.status = PortStatus::Error;
        self.active = false;
        self.error_message.clear();
        // a message longer than the buffer is cut short, which is fine for display
        let _ = self.error_message.write_fmt(args);
    }

    fn clear_fault(&mut self) {
        self.status = PortStatus::Idle;
        self.consecutive_error_count = 0;
        self.error_message.clear();
    }

    /// Instantaneous copy for telemetry
    pub fn snapshot(&self) -> PortSnapshot {
        PortSnapshot {
            voltage: self.voltage,
            current: self.current,
            power: self.power,
            accumulated_charge: self.accumulated_charge,
            accumulated_energy: self.accumulated_energy,
            mode: self.mode,
            battery_kind: self.battery_kind,
            custom_cutoff: self.custom_cutoff,
            use_custom_cutoff: self.use_custom_cutoff,
            effective_cutoff: self.effective_cutoff(),
            status: self.status,
            active: self.active,
            start_time: self.start_time,
            error_message: self.error_message.clone(),
        }
    }
}

/// Read-only telemetry view of one port
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortSnapshot {
    pub voltage: f32,
    pub current: f32,
    pub power: f32,
    pub accumulated_charge: f32,
    pub accumulated_energy: f32,
    pub mode: Mode,
    pub battery_kind: BatteryKind,
    pub custom_cutoff: f32,
    pub use_custom_cutoff: bool,
    pub effective_cutoff: f32,
    pub status: PortStatus,
    pub active: bool,
    pub start_time: Option<u64>,
    pub error_message: ErrorMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discharging_record() -> PortRecord {
        let mut record = PortRecord::new();
        record.set_battery_kind(BatteryKind::LiFePo4);
        record.set_mode(Mode::Discharging, 1_000);
        record
    }

    #[test]
    fn test_power_on_defaults() {
        let record = PortRecord::new();
        assert_eq!(record.mode, Mode::Safety);
        assert_eq!(record.battery_kind, BatteryKind::LiIon);
        assert_eq!(record.status, PortStatus::Idle);
        assert!(!record.active);
        assert!(record.last_update.is_none());
    }

    #[test]
    fn test_effective_cutoff_uses_table_then_override() {
        let mut record = discharging_record();
        assert_eq!(record.effective_cutoff(), 2.5);

        record.set_custom_cutoff(2.8).unwrap();
        assert_eq!(record.effective_cutoff(), 2.8);

        record.clear_custom_cutoff();
        assert_eq!(record.effective_cutoff(), 2.5);
    }

    #[test]
    fn test_custom_cutoff_range_is_enforced() {
        let mut record = PortRecord::new();
        assert_eq!(
            record.set_custom_cutoff(1.5),
            Err(ConfigError::CutoffOutOfRange(1.5))
        );
        assert_eq!(
            record.set_custom_cutoff(3.6),
            Err(ConfigError::CutoffOutOfRange(3.6))
        );
        assert!(!record.use_custom_cutoff);
        assert!(record.set_custom_cutoff(3.5).is_ok());
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let mut record = discharging_record();
        record.set_custom_cutoff(2.7).unwrap();
        record.accumulated_charge = 120.0;
        record.accumulated_energy = 0.4;
        record.consecutive_error_count = 4;
        record.fault(format_args!("Overcurrent: {:.2}A", 3.4));

        record.reset(5_000);

        assert_eq!(record.accumulated_charge, 0.0);
        assert_eq!(record.accumulated_energy, 0.0);
        assert!(record.error_message.is_empty());
        assert_eq!(record.consecutive_error_count, 0);
        assert_eq!(record.status, PortStatus::Idle);
        assert_eq!(record.start_time, Some(5_000));
        assert_eq!(record.mode, Mode::Discharging);
        assert_eq!(record.battery_kind, BatteryKind::LiFePo4);
        assert_eq!(record.custom_cutoff, 2.7);
        assert!(record.use_custom_cutoff);
    }

    #[test]
    fn test_set_mode_activates_and_clears_fault() {
        let mut record = discharging_record();
        assert!(record.active);
        assert_eq!(record.start_time, Some(1_000));

        record.fault(format_args!("Overvoltage: {:.2}V", 4.61));
        assert_eq!(record.status, PortStatus::Error);
        assert!(!record.active);
        assert_eq!(record.error_message.as_str(), "Overvoltage: 4.61V");

        record.set_mode(Mode::Charging, 9_000);
        assert_eq!(record.status, PortStatus::Idle);
        assert!(record.error_message.is_empty());
        assert!(record.active);
        // session start is kept across mode changes
        assert_eq!(record.start_time, Some(1_000));

        record.set_mode(Mode::Safety, 10_000);
        assert!(!record.active);
    }

    #[test]
    fn test_should_stop_discharge_only_when_discharging() {
        let mut record = discharging_record();
        record.apply_measurement(Measurement::new(2.5, 1.0));
        assert!(record.should_stop_discharge());

        record.apply_measurement(Measurement::new(2.6, 1.0));
        assert!(!record.should_stop_discharge());

        record.set_mode(Mode::Charging, 2_000);
        record.apply_measurement(Measurement::new(2.4, 1.0));
        assert!(!record.should_stop_discharge());
    }

    #[test]
    fn test_long_fault_message_is_truncated() {
        let mut record = PortRecord::new();
        record.fault(format_args!("{:>80}", "x"));
        assert_eq!(record.status, PortStatus::Error);
        assert!(record.error_message.len() <= ERROR_MESSAGE_LEN);
    }

    #[test]
    fn test_snapshot_copies_fields() {
        let mut record = discharging_record();
        record.apply_measurement(Measurement::new(3.2, 1.5));
        record.accumulated_charge = 12.5;
        let snapshot = record.snapshot();
        assert_eq!(snapshot.voltage, 3.2);
        assert_eq!(snapshot.current, 1.5);
        assert!((snapshot.power - 4.8).abs() < 1e-5);
        assert_eq!(snapshot.accumulated_charge, 12.5);
        assert_eq!(snapshot.mode, Mode::Discharging);
        assert_eq!(snapshot.effective_cutoff, 2.5);
        assert!(snapshot.active);
    }
}
