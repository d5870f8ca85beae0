//! Safety/Mode State Machine
//!
//! The only code that decides whether a port's load switch is energized.
//! Runs every control cycle, independent of the sample interval.
//!
//! # Rules
//! Evaluated in this order; the electrical checks run last and always win:
//! 1. Discharging and active: switch on until the effective cutoff is
//!    reached, then Complete
//! 2. Charging and active: switch off, Complete once the cell is full and the
//!    charger has tapered off
//! 3. Safety: switch off, inactive, Idle
//! 4. Critically low voltage
//! 5. Overvoltage
//! 6. Overcurrent
//!
//! Rules 1 and 2 only reach a completion verdict once the port's
//! conditioner has settled; until then the discharge switch stays off.
//!
//! # Error latch
//! A port in Error stays switched off and keeps its first fault message
//! until an operator mode change or reset clears it.

use crate::battery::{Mode, PortStatus};
use crate::hal::{Notifier, PowerSwitch};
use crate::limits::SafetyLimits;
use crate::port::PortRecord;

pub struct SafetyMonitor {
    limits: SafetyLimits,
}

impl SafetyMonitor {
    pub const fn new(limits: SafetyLimits) -> Self {
        Self { limits }
    }

    /// Runs one safety pass for `port` and drives its switch.
    ///
    /// Returns the commanded switch state.
    pub fn evaluate<W: PowerSwitch, N: Notifier>(
        &self,
        port: usize,
        record: &mut PortRecord,
        switch: &mut W,
        notifier: &mut N,
    ) -> bool {
        let latched = record.status == PortStatus::Error;

        let mut energized = if latched {
            record.active = false;
            false
        } else {
            self.apply_mode(port, record, notifier)
        };

        if self.check_electrical(port, record, latched) {
            energized = false;
            if !latched {
                notifier.notify_error(port);
            }
        }

        switch.set_energized(energized);
        energized
    }

    fn apply_mode<N: Notifier>(
        &self,
        port: usize,
        record: &mut PortRecord,
        notifier: &mut N,
    ) -> bool {
        match record.mode {
            Mode::Discharging if record.active => {
                if !record.settled {
                    // the zero-primed median reads below every cutoff and
                    // would complete the session on its first sample
                    record.status = PortStatus::Active;
                    false
                } else if record.should_stop_discharge() {
                    info!("Port {}: discharge complete at {} V", port, record.voltage);
                    Self::complete(port, record, notifier);
                    false
                } else {
                    record.status = PortStatus::Active;
                    true
                }
            }
            Mode::Charging if record.active => {
                if record.settled && self.charge_complete(record) {
                    info!("Port {}: charge complete at {} V", port, record.voltage);
                    Self::complete(port, record, notifier);
                } else {
                    record.status = PortStatus::Active;
                }
                // charging is external, the switch only ever loads the cell
                false
            }
            Mode::Safety => {
                record.active = false;
                record.status = PortStatus::Idle;
                false
            }
            _ => false,
        }
    }

    fn charge_complete(&self, record: &PortRecord) -> bool {
        let full = record.profile().max_voltage - self.limits.charge_complete_margin;
        record.voltage >= full && libm::fabsf(record.current) < self.limits.charge_complete_current
    }

    fn complete<N: Notifier>(port: usize, record: &mut PortRecord, notifier: &mut N) {
        let entering = record.status != PortStatus::Complete;
        record.status = PortStatus::Complete;
        record.active = false;
        if entering {
            notifier.notify_complete(port);
        }
    }

    /// Checks 4 to 6. Returns whether any of them fired.
    fn check_electrical(&self, port: usize, record: &mut PortRecord, latched: bool) -> bool {
        let voltage = record.voltage;
        let current = record.current;
        let mut fired = false;

        if voltage > self.limits.no_battery_voltage && voltage < self.limits.min_voltage {
            fired = true;
            if !latched {
                record.fault(format_args!("Voltage critically low: {:.2}V", voltage));
            }
        }

        if voltage > self.limits.max_voltage {
            fired = true;
            if !latched {
                record.fault(format_args!("Overvoltage: {:.2}V", voltage));
            }
        }

        if libm::fabsf(current) > self.limits.max_current {
            fired = true;
            if !latched {
                record.fault(format_args!("Overcurrent: {:.2}A", current));
            }
        }

        if fired {
            record.active = false;
            if !latched {
                error!("Port {}: {}", port, record.error_message.as_str());
            }
        }
        fired
    }
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self::new(SafetyLimits::DEFAULT)
    }
}
