//! Sensor Acquisition Loop
//!
//! Rate-limited sampling across all ports. Each pass reads one raw sample
//! from every port that is active, not faulted and has a working sensor,
//! validates it and routes it through the port's [`PortFilter`] and the
//! [`ChargeIntegrator`].
//!
//! # Sensor faults
//! A rejected reading bumps the port's consecutive error counter and leaves
//! measurements and accumulators untouched. Once the counter exceeds the
//! configured threshold the port is faulted. A valid reading resets the
//! counter.
//!
//! # Initialization
//! A sensor that fails to initialize faults its port and is skipped by every
//! later pass until [`Acquisition::reinitialize`] succeeds for it.

use crate::battery::PortStatus;
use crate::error::SensorError;
use crate::filter::PortFilter;
use crate::hal::{Notifier, PortSensor, RawReading};
use crate::integrator::ChargeIntegrator;
use crate::limits::{SafetyLimits, NUM_PORTS};
use crate::port::PortRecord;

/// Why a raw reading was rejected
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadingFault {
    /// NaN or infinite voltage or current
    NotFinite,
    /// Voltage outside the absolute plausible window (V)
    VoltageOutOfRange(f32),
    /// Current magnitude above the configured maximum (A)
    CurrentOutOfRange(f32),
}

/// Checks a raw reading against the absolute limits
pub fn validate(raw: &RawReading, limits: &SafetyLimits) -> Result<(), ReadingFault> {
    if !raw.voltage.is_finite() || !raw.current.is_finite() {
        return Err(ReadingFault::NotFinite);
    }
    if raw.voltage < limits.min_voltage || raw.voltage > limits.max_voltage {
        return Err(ReadingFault::VoltageOutOfRange(raw.voltage));
    }
    if libm::fabsf(raw.current) > limits.max_current {
        return Err(ReadingFault::CurrentOutOfRange(raw.current));
    }
    Ok(())
}

/// Sensors, conditioners and the integrator for all ports
pub struct Acquisition<S> {
    sensors: [S; NUM_PORTS],
    filters: [PortFilter; NUM_PORTS],
    sensor_ready: [bool; NUM_PORTS],
    /// Last initialization failure of each port
    init_error: [Option<SensorError>; NUM_PORTS],
    integrator: ChargeIntegrator,
    limits: SafetyLimits,
    last_sample: Option<u64>,
}

impl<S: PortSensor> Acquisition<S> {
    pub fn new(sensors: [S; NUM_PORTS], limits: SafetyLimits) -> Self {
        Self {
            sensors,
            filters: core::array::from_fn(|_| PortFilter::new()),
            sensor_ready: [false; NUM_PORTS],
            init_error: [None; NUM_PORTS],
            integrator: ChargeIntegrator::new(&limits),
            limits,
            last_sample: None,
        }
    }

    /// Initializes every sensor. A failing sensor faults its own port only.
    pub fn begin(&mut self, records: &mut [PortRecord; NUM_PORTS]) {
        for port in 0..NUM_PORTS {
            // failures are already logged and recorded on the port
            let _ = self.init_sensor(port, &mut records[port]);
        }
    }

    /// Retries initialization of one sensor
    ///
    /// On success the port is sampled again as soon as it is active and not
    /// faulted; a latched Error still needs an operator mode change or reset.
    pub fn reinitialize(
        &mut self,
        port: usize,
        record: &mut PortRecord,
    ) -> Result<(), SensorError> {
        self.init_sensor(port, record)
    }

    fn init_sensor(&mut self, port: usize, record: &mut PortRecord) -> Result<(), SensorError> {
        match self.sensors[port].initialize() {
            Ok(()) => {
                info!("Port {}: sensor ready", port);
                self.sensor_ready[port] = true;
                self.init_error[port] = None;
                self.filters[port].clear();
                record.settled = false;
                Ok(())
            }
            Err(e) => {
                error!("Port {}: sensor initialization failed: {:?}", port, e);
                self.sensor_ready[port] = false;
                self.init_error[port] = Some(e);
                record.fault(format_args!("{}", e));
                Err(e)
            }
        }
    }

    pub fn sensor_ready(&self, port: usize) -> bool {
        self.sensor_ready[port]
    }

    /// Restarts a port's conditioner, e.g. after a mode change or reset
    ///
    /// A port whose sensor failed to initialize stays in Error until
    /// [`Acquisition::reinitialize`] succeeds.
    pub fn clear_filter(&mut self, port: usize, record: &mut PortRecord) {
        self.filters[port].clear();
        record.settled = false;
        if let Some(e) = self.init_error[port] {
            record.fault(format_args!("{}", e));
        }
    }

    /// Runs one acquisition pass if the sample interval has elapsed.
    ///
    /// Returns whether a pass ran.
    pub fn sample<N: Notifier>(
        &mut self,
        records: &mut [PortRecord; NUM_PORTS],
        now: u64,
        notifier: &mut N,
    ) -> bool {
        if let Some(last) = self.last_sample {
            if now.saturating_sub(last) < self.limits.sample_interval_ms {
                return false;
            }
        }
        self.last_sample = Some(now);

        for (port, record) in records.iter_mut().enumerate() {
            if !record.active || record.status == PortStatus::Error || !self.sensor_ready[port] {
                continue;
            }
            self.sample_port(port, record, now, notifier);
        }
        true
    }

    fn sample_port<N: Notifier>(
        &mut self,
        port: usize,
        record: &mut PortRecord,
        now: u64,
        notifier: &mut N,
    ) {
        let raw = self.sensors[port].read_raw();

        if let Err(fault) = validate(&raw, &self.limits) {
            record.consecutive_error_count = record.consecutive_error_count.saturating_add(1);
            debug!(
                "Port {}: rejected reading {:?} ({} in a row)",
                port, fault, record.consecutive_error_count
            );
            if record.consecutive_error_count > self.limits.sensor_fault_threshold {
                error!("Port {}: too many invalid readings", port);
                record.fault(format_args!("Invalid readings"));
                notifier.notify_error(port);
            }
            return;
        }

        record.consecutive_error_count = 0;
        let filtered = self.filters[port].push(raw);
        record.apply_measurement(filtered);
        record.settled = self.filters[port].is_settled();
        self.integrator.integrate(port, record, filtered, now);
    }
}
