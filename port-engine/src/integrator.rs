//! Charge/Energy Integrator
//!
//! Integrates filtered current and power over wall time into the port's mAh
//! and Wh totals. A step is only accumulated when the elapsed time since the
//! last successful update is plausible:
//!
//! ```text
//! elapsed == 0                       -> skipped
//! elapsed >  max_elapsed_ms          -> skipped, timestamp resynchronized
//! elapsed in hours > max_elapsed_h   -> skipped, timestamp resynchronized
//! otherwise                          -> charge += |I| * 1000 * h
//!                                       energy += V * I * h
//! ```
//!
//! The first update after activation or reset only seeds the timestamp.

use crate::limits::SafetyLimits;
use crate::port::{Measurement, PortRecord};

const MS_PER_HOUR: f32 = 3_600_000.0;
const MA_PER_A: f32 = 1000.0;

/// Which branch an integration step took
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrationStep {
    /// First update since activation, timestamp seeded
    Seeded,
    /// Totals advanced over `elapsed_ms`
    Accumulated { elapsed_ms: u64 },
    /// No time has passed
    ZeroElapsed,
    /// Elapsed time above the millisecond bound, treated as a timestamp glitch
    ElapsedOutlier { elapsed_ms: u64 },
    /// Elapsed time above the hour bound
    DurationOutlier { elapsed_ms: u64 },
}

/// Numerical integrator with outlier rejection
#[derive(Debug, Clone, Copy)]
pub struct ChargeIntegrator {
    max_elapsed_ms: u64,
    max_elapsed_hours: f32,
}

impl ChargeIntegrator {
    pub const fn new(limits: &SafetyLimits) -> Self {
        Self {
            max_elapsed_ms: limits.max_elapsed_ms,
            max_elapsed_hours: limits.max_elapsed_hours,
        }
    }

    /// Advances the record's totals with `reading`, taken at `now` (ms)
    pub fn integrate(
        &self,
        port: usize,
        record: &mut PortRecord,
        reading: Measurement,
        now: u64,
    ) -> IntegrationStep {
        let Some(last_update) = record.last_update else {
            record.last_update = Some(now);
            return IntegrationStep::Seeded;
        };

        // the clock is monotonic; a backwards step reads as zero elapsed
        let elapsed_ms = now.saturating_sub(last_update);
        record.last_update = Some(now);

        if elapsed_ms == 0 {
            return IntegrationStep::ZeroElapsed;
        }

        if elapsed_ms > self.max_elapsed_ms {
            warn!("Port {}: elapsed time too large ({} ms), resynchronizing", port, elapsed_ms);
            return IntegrationStep::ElapsedOutlier { elapsed_ms };
        }

        let elapsed_hours = elapsed_ms as f32 / MS_PER_HOUR;
        if elapsed_hours > self.max_elapsed_hours {
            warn!(
                "Port {}: elapsed hours too large ({}), skipping accumulation",
                port, elapsed_hours
            );
            return IntegrationStep::DurationOutlier { elapsed_ms };
        }

        record.accumulated_charge += libm::fabsf(reading.current) * MA_PER_A * elapsed_hours;
        record.accumulated_energy += reading.power() * elapsed_hours;

        // transient reverse current must not pull the totals below zero
        record.accumulated_charge = record.accumulated_charge.max(0.0);
        record.accumulated_energy = record.accumulated_energy.max(0.0);

        IntegrationStep::Accumulated { elapsed_ms }
    }
}

impl Default for ChargeIntegrator {
    fn default() -> Self {
        Self::new(&SafetyLimits::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_record(at: u64) -> PortRecord {
        let mut record = PortRecord::new();
        record.last_update = Some(at);
        record
    }

    #[test]
    fn test_first_update_only_seeds() {
        let integrator = ChargeIntegrator::default();
        let mut record = PortRecord::new();
        let step = integrator.integrate(0, &mut record, Measurement::new(3.7, 1.0), 123_456);
        assert_eq!(step, IntegrationStep::Seeded);
        assert_eq!(record.last_update, Some(123_456));
        assert_eq!(record.accumulated_charge, 0.0);
        assert_eq!(record.accumulated_energy, 0.0);
    }

    #[test]
    fn test_one_hour_at_one_amp() {
        let integrator = ChargeIntegrator::default();
        let mut record = seeded_record(0);
        // 7200 steps of 500 ms = 1 h
        for step in 1..=7200u64 {
            integrator.integrate(0, &mut record, Measurement::new(3.7, 1.0), step * 500);
        }
        assert!((record.accumulated_charge - 1000.0).abs() < 1.0);
        assert!((record.accumulated_energy - 3.7).abs() < 0.01);
    }

    #[test]
    fn test_zero_elapsed_is_skipped() {
        let integrator = ChargeIntegrator::default();
        let mut record = seeded_record(1_000);
        let step = integrator.integrate(0, &mut record, Measurement::new(3.7, 2.0), 1_000);
        assert_eq!(step, IntegrationStep::ZeroElapsed);
        assert_eq!(record.accumulated_charge, 0.0);
    }

    #[test]
    fn test_elapsed_outlier_only_moves_timestamp() {
        let integrator = ChargeIntegrator::default();
        let mut record = seeded_record(1_000);
        record.accumulated_charge = 42.0;
        record.accumulated_energy = 0.15;

        let step = integrator.integrate(0, &mut record, Measurement::new(3.7, 2.0), 11_001);

        assert_eq!(step, IntegrationStep::ElapsedOutlier { elapsed_ms: 10_001 });
        assert_eq!(record.accumulated_charge, 42.0);
        assert_eq!(record.accumulated_energy, 0.15);
        assert_eq!(record.last_update, Some(11_001));
    }

    #[test]
    fn test_elapsed_at_bound_is_accumulated() {
        let integrator = ChargeIntegrator::default();
        let mut record = seeded_record(0);
        let step = integrator.integrate(0, &mut record, Measurement::new(3.6, 1.8), 10_000);
        assert_eq!(step, IntegrationStep::Accumulated { elapsed_ms: 10_000 });
        assert!((record.accumulated_charge - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_duration_outlier_is_second_defense() {
        let limits = SafetyLimits {
            max_elapsed_ms: 3_600_000,
            max_elapsed_hours: 0.1,
            ..SafetyLimits::DEFAULT
        };
        let integrator = ChargeIntegrator::new(&limits);
        let mut record = seeded_record(0);

        let step = integrator.integrate(0, &mut record, Measurement::new(3.7, 1.0), 400_000);

        assert_eq!(step, IntegrationStep::DurationOutlier { elapsed_ms: 400_000 });
        assert_eq!(record.accumulated_charge, 0.0);
        assert_eq!(record.last_update, Some(400_000));
    }

    #[test]
    fn test_negative_current_never_drives_totals_negative() {
        let integrator = ChargeIntegrator::default();
        let mut record = seeded_record(0);
        let currents = [-2.9, -0.1, 0.4, -3.0, -1.5, 0.05, -2.2];
        let mut now = 0;
        for (i, current) in currents.iter().cycle().take(200).enumerate() {
            now += 250 + (i as u64 % 7) * 100;
            integrator.integrate(0, &mut record, Measurement::new(3.3, *current), now);
            assert!(record.accumulated_charge >= 0.0);
            assert!(record.accumulated_energy >= 0.0);
        }
    }

    #[test]
    fn test_backwards_clock_reads_as_zero_elapsed() {
        let integrator = ChargeIntegrator::default();
        let mut record = seeded_record(5_000);
        let step = integrator.integrate(0, &mut record, Measurement::new(3.7, 1.0), 4_000);
        assert_eq!(step, IntegrationStep::ZeroElapsed);
        assert_eq!(record.accumulated_charge, 0.0);
    }
}
