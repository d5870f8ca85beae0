//! Signal Conditioner
//!
//! Suppresses sensor noise and single-sample spikes before readings reach the
//! accumulators.
//!
//! # Filtering
//! - One median window per quantity (voltage, current), `FILTER_SAMPLES` wide
//! - Each new raw sample replaces the oldest one in the window
//! - The reported value is the median of the whole window
//!
//! # Start-up bias
//! The windows start out filled with zeros, and a cleared window is refilled
//! with zeros. Until `FILTER_SAMPLES` real samples have arrived the median is
//! pulled towards zero. [`PortFilter::is_settled`] tells the caller when
//! that phase is over.

use moving_median::MovingMedian;

use crate::limits::FILTER_SAMPLES;
use crate::port::Measurement;

/// Median filter over the last `FILTER_SAMPLES` values of one quantity
pub struct SampleFilter {
    filter: MovingMedian<f32, FILTER_SAMPLES>,
}

impl SampleFilter {
    /// Create a new filter with a zero-filled window
    pub fn new() -> Self {
        let mut filter = Self {
            filter: MovingMedian::new(),
        };
        filter.prime();
        filter
    }

    /// Add a new value and return the median of the window
    pub fn update(&mut self, value: f32) -> f32 {
        self.filter.add_value(value);
        self.filter.median()
    }

    /// Reset the window to all zeros
    pub fn reset(&mut self) {
        self.filter = MovingMedian::new();
        self.prime();
    }

    fn prime(&mut self) {
        for _ in 0..FILTER_SAMPLES {
            self.filter.add_value(0.0);
        }
    }
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Voltage and current conditioning for one port
pub struct PortFilter {
    voltage: SampleFilter,
    current: SampleFilter,
    /// Real samples since the last reset, saturating at the window size
    samples: usize,
}

impl PortFilter {
    pub fn new() -> Self {
        Self {
            voltage: SampleFilter::new(),
            current: SampleFilter::new(),
            samples: 0,
        }
    }

    /// Feeds one raw reading and returns the filtered pair
    pub fn push(&mut self, raw: Measurement) -> Measurement {
        self.samples = (self.samples + 1).min(FILTER_SAMPLES);
        Measurement {
            voltage: self.voltage.update(raw.voltage),
            current: self.current.update(raw.current),
        }
    }

    /// The window no longer contains any of the initial zeros
    pub fn is_settled(&self) -> bool {
        self.samples >= FILTER_SAMPLES
    }

    pub fn clear(&mut self) {
        self.voltage.reset();
        self.current.reset();
        self.samples = 0;
    }
}

impl Default for PortFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn true_median(window: &[f32]) -> f32 {
        let mut sorted = [0.0f32; FILTER_SAMPLES];
        sorted.copy_from_slice(window);
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        sorted[FILTER_SAMPLES / 2]
    }

    #[test]
    fn test_full_window_reports_true_median() {
        let samples = [
            3.71, 3.69, 9.9, 3.70, 3.68, 0.2, 3.72, 3.66, 3.74, 4.9, 3.65, 3.67,
        ];
        let mut filter = SampleFilter::new();
        for (i, sample) in samples.iter().enumerate() {
            let median = filter.update(*sample);
            if i + 1 >= FILTER_SAMPLES {
                let window = &samples[i + 1 - FILTER_SAMPLES..=i];
                assert_eq!(median, true_median(window), "window ending at {}", i);
            }
        }
    }

    #[test]
    fn test_single_spike_is_rejected() {
        let mut filter = SampleFilter::new();
        for _ in 0..FILTER_SAMPLES {
            filter.update(3.7);
        }
        assert_eq!(filter.update(12.0), 3.7);
        assert_eq!(filter.update(0.0), 3.7);
    }

    #[test]
    fn test_startup_is_biased_towards_zero() {
        let mut filter = SampleFilter::new();
        // [3.7, 0, 0, 0, 0] and [3.7, 3.7, 0, 0, 0]
        assert_eq!(filter.update(3.7), 0.0);
        assert_eq!(filter.update(3.7), 0.0);
        // three real samples out of five win the median
        assert_eq!(filter.update(3.7), 3.7);
    }

    #[test]
    fn test_reset_refills_window_with_zeros() {
        let mut filter = SampleFilter::new();
        for _ in 0..FILTER_SAMPLES {
            filter.update(3.7);
        }
        filter.reset();
        // the window is full again, so the median is always a sample
        assert_eq!(filter.update(4.1), 0.0);
        assert_eq!(filter.update(4.1), 0.0);
        assert_eq!(filter.update(4.1), 4.1);
    }

    #[test]
    fn test_port_filter_settles_after_window() {
        let mut filter = PortFilter::new();
        for _ in 0..FILTER_SAMPLES - 1 {
            filter.push(Measurement::new(3.7, 1.0));
            assert!(!filter.is_settled());
        }
        let filtered = filter.push(Measurement::new(3.7, 1.0));
        assert!(filter.is_settled());
        assert_eq!(filtered, Measurement::new(3.7, 1.0));
    }

    #[test]
    fn test_port_filter_clear_restarts_bias() {
        let mut filter = PortFilter::new();
        for _ in 0..FILTER_SAMPLES {
            filter.push(Measurement::new(3.7, 1.0));
        }
        filter.clear();
        assert!(!filter.is_settled());
        assert_eq!(filter.push(Measurement::new(3.6, 0.5)), Measurement::new(0.0, 0.0));
    }
}
