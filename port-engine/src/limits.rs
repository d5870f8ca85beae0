// Variable Naming Scheme
// *_VOLTAGE / *_CURRENT limits are absolute and apply to every chemistry.
// Faults on these limits force the port switch off and latch the Error status.
// Sensor readings outside the same window are rejected before filtering.

/// Number of physical battery ports
pub const NUM_PORTS: usize = 4;

/// Minimum time between two acquisition passes (2 Hz)
pub const SAMPLE_INTERVAL_MS: u64 = 500;

/// Median filter window (odd, so the median is a real sample)
pub const FILTER_SAMPLES: usize = 5;

// absolute cell window
pub const MIN_VOLTAGE: f32 = 2.0;
pub const MAX_VOLTAGE: f32 = 4.5;
pub const MAX_DISCHARGE_CURRENT: f32 = 3.0;

/// Readings at or below this are an empty slot, not a deep-discharged cell
pub const NO_BATTERY_VOLTAGE: f32 = 0.1;

/// Invalid readings tolerated in a row before the port is faulted
pub const SENSOR_FAULT_THRESHOLD: u32 = 10;

// integration sanity bounds
pub const MAX_ELAPSED_MS: u64 = 10_000;
pub const MAX_ELAPSED_HOURS: f32 = 0.1;

// charge completion: within 0.1V of the chemistry maximum with the charger tapered off
pub const CHARGE_COMPLETE_MARGIN: f32 = 0.1;
pub const CHARGE_COMPLETE_CURRENT: f32 = 0.05;

// window accepted for an operator cutoff override
pub const CUSTOM_CUTOFF_MIN: f32 = 2.0;
pub const CUSTOM_CUTOFF_MAX: f32 = 3.5;

/// Limits the engine evaluates against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyLimits {
    pub min_voltage: f32,
    pub max_voltage: f32,
    pub max_current: f32,
    pub no_battery_voltage: f32,
    pub sensor_fault_threshold: u32,
    pub sample_interval_ms: u64,
    pub max_elapsed_ms: u64,
    pub max_elapsed_hours: f32,
    pub charge_complete_margin: f32,
    pub charge_complete_current: f32,
}

impl SafetyLimits {
    pub const DEFAULT: SafetyLimits = SafetyLimits {
        min_voltage: MIN_VOLTAGE,
        max_voltage: MAX_VOLTAGE,
        max_current: MAX_DISCHARGE_CURRENT,
        no_battery_voltage: NO_BATTERY_VOLTAGE,
        sensor_fault_threshold: SENSOR_FAULT_THRESHOLD,
        sample_interval_ms: SAMPLE_INTERVAL_MS,
        max_elapsed_ms: MAX_ELAPSED_MS,
        max_elapsed_hours: MAX_ELAPSED_HOURS,
        charge_complete_margin: CHARGE_COMPLETE_MARGIN,
        charge_complete_current: CHARGE_COMPLETE_CURRENT,
    };
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}
