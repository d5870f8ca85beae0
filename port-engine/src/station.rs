//! Station
//!
//! Top-level coordinator. Owns the port records, the acquisition loop, the
//! load switches and the safety monitor, and exposes the configuration
//! surface and the telemetry export.
//!
//! One control cycle is a single [`Station::tick`]: acquisition (if due),
//! then the safety pass for every port. Configuration writes made between
//! two ticks take effect on the next one.

use crate::acquisition::Acquisition;
use crate::battery::{BatteryKind, Mode};
use crate::error::{ConfigError, Error};
use crate::hal::{Notifier, PortSensor, PowerSwitch};
use crate::limits::{SafetyLimits, NUM_PORTS};
use crate::port::{PortRecord, PortSnapshot};
use crate::safety::SafetyMonitor;

/// Operator command addressed to one port
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortCommand {
    SetMode(usize, Mode),
    SetBatteryKind(usize, BatteryKind),
    SetCustomCutoff(usize, f32),
    ClearCustomCutoff(usize),
    SetActive(usize, bool),
    Reset(usize),
    ReinitializeSensor(usize),
}

pub struct Station<S, W> {
    records: [PortRecord; NUM_PORTS],
    acquisition: Acquisition<S>,
    switches: [W; NUM_PORTS],
    safety: SafetyMonitor,
}

impl<S: PortSensor, W: PowerSwitch> Station<S, W> {
    pub fn new(sensors: [S; NUM_PORTS], switches: [W; NUM_PORTS], limits: SafetyLimits) -> Self {
        Self {
            records: core::array::from_fn(|_| PortRecord::new()),
            acquisition: Acquisition::new(sensors, limits),
            switches,
            safety: SafetyMonitor::new(limits),
        }
    }

    /// Forces every switch off, then brings up the sensors.
    ///
    /// `now` becomes the session start of every port.
    pub fn begin(&mut self, now: u64) {
        for switch in self.switches.iter_mut() {
            switch.set_energized(false);
        }
        for record in self.records.iter_mut() {
            record.start_time = Some(now);
        }
        self.acquisition.begin(&mut self.records);

        let ready = (0..NUM_PORTS).filter(|&port| self.acquisition.sensor_ready(port)).count();
        info!("Station ready, {} of {} sensors found", ready, NUM_PORTS);
    }

    /// One control cycle. Returns whether an acquisition pass ran.
    pub fn tick<N: Notifier>(&mut self, now: u64, notifier: &mut N) -> bool {
        let sampled = self.acquisition.sample(&mut self.records, now, notifier);

        let ports = self.records.iter_mut().zip(self.switches.iter_mut());
        for (port, (record, switch)) in ports.enumerate() {
            self.safety.evaluate(port, record, switch, notifier);
        }
        sampled
    }

    fn check_port(port: usize) -> Result<(), ConfigError> {
        if port < NUM_PORTS {
            Ok(())
        } else {
            Err(ConfigError::InvalidPort(port))
        }
    }

    pub fn set_mode(&mut self, port: usize, mode: Mode, now: u64) -> Result<(), ConfigError> {
        Self::check_port(port)?;
        let record = &mut self.records[port];
        record.set_mode(mode, now);
        self.acquisition.clear_filter(port, record);
        info!("Port {}: mode {}", port, mode.name());
        Ok(())
    }

    pub fn set_battery_kind(&mut self, port: usize, kind: BatteryKind) -> Result<(), ConfigError> {
        Self::check_port(port)?;
        self.records[port].set_battery_kind(kind);
        info!("Port {}: battery {}", port, kind.name());
        Ok(())
    }

    pub fn set_custom_cutoff(&mut self, port: usize, volts: f32) -> Result<(), ConfigError> {
        Self::check_port(port)?;
        self.records[port].set_custom_cutoff(volts)?;
        info!("Port {}: custom cutoff {} V", port, volts);
        Ok(())
    }

    pub fn clear_custom_cutoff(&mut self, port: usize) -> Result<(), ConfigError> {
        Self::check_port(port)?;
        self.records[port].clear_custom_cutoff();
        Ok(())
    }

    pub fn set_active(&mut self, port: usize, active: bool) -> Result<(), ConfigError> {
        Self::check_port(port)?;
        self.records[port].set_active(active);
        Ok(())
    }

    /// Zeroes the port's totals and fault state, keeping its configuration
    pub fn reset(&mut self, port: usize, now: u64) -> Result<(), ConfigError> {
        Self::check_port(port)?;
        let record = &mut self.records[port];
        record.reset(now);
        self.acquisition.clear_filter(port, record);
        info!("Port {}: data reset", port);
        Ok(())
    }

    pub fn reinitialize_sensor(&mut self, port: usize) -> Result<(), Error> {
        Self::check_port(port)?;
        self.acquisition.reinitialize(port, &mut self.records[port])?;
        Ok(())
    }

    /// Dispatches an operator command
    pub fn apply(&mut self, command: PortCommand, now: u64) -> Result<(), Error> {
        match command {
            PortCommand::SetMode(port, mode) => self.set_mode(port, mode, now)?,
            PortCommand::SetBatteryKind(port, kind) => self.set_battery_kind(port, kind)?,
            PortCommand::SetCustomCutoff(port, volts) => self.set_custom_cutoff(port, volts)?,
            PortCommand::ClearCustomCutoff(port) => self.clear_custom_cutoff(port)?,
            PortCommand::SetActive(port, active) => self.set_active(port, active)?,
            PortCommand::Reset(port) => self.reset(port, now)?,
            PortCommand::ReinitializeSensor(port) => self.reinitialize_sensor(port)?,
        }
        Ok(())
    }

    pub fn record(&self, port: usize) -> Option<&PortRecord> {
        self.records.get(port)
    }

    pub fn records(&self) -> &[PortRecord; NUM_PORTS] {
        &self.records
    }

    /// Instantaneous telemetry copy of every port
    pub fn snapshot(&self) -> [PortSnapshot; NUM_PORTS] {
        core::array::from_fn(|port| self.records[port].snapshot())
    }

    pub fn sensor_ready(&self, port: usize) -> bool {
        port < NUM_PORTS && self.acquisition.sensor_ready(port)
    }
}
