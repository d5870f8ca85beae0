//! Encoder input hand-off
//!
//! Edge handlers run with minimal work: they only bump an atomic step
//! counter or raise an atomic press flag in [`EncoderInput`]. The control
//! loop drains both with [`EncoderInput::take`] and turns the result into
//! port selection and mode commands through [`PortSelector`].

use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::battery::Mode;
use crate::limits::NUM_PORTS;
use crate::port::PortRecord;
use crate::station::PortCommand;

/// Input accumulated since the last [`EncoderInput::take`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputDelta {
    /// Net detents, clockwise positive
    pub steps: i32,
    pub pressed: bool,
}

/// Single-word mailboxes between the edge handlers and the control loop
pub struct EncoderInput {
    steps: AtomicI32,
    pressed: AtomicBool,
}

impl EncoderInput {
    pub const fn new() -> Self {
        Self {
            steps: AtomicI32::new(0),
            pressed: AtomicBool::new(false),
        }
    }

    pub fn record_step(&self, clockwise: bool) {
        let step = if clockwise { 1 } else { -1 };
        self.steps.fetch_add(step, Ordering::Relaxed);
    }

    pub fn record_press(&self) {
        self.pressed.store(true, Ordering::Release);
    }

    /// Reads and clears everything recorded so far
    pub fn take(&self) -> InputDelta {
        InputDelta {
            steps: self.steps.swap(0, Ordering::Relaxed),
            pressed: self.pressed.swap(false, Ordering::Acquire),
        }
    }
}

impl Default for EncoderInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Port selection driven by the encoder
#[derive(Debug, Default)]
pub struct PortSelector {
    selected: usize,
}

impl PortSelector {
    pub const fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Moves the selection by `delta.steps`, wrapping over the ports, and
    /// turns a press into a mode change of the selected port
    pub fn handle(
        &mut self,
        delta: InputDelta,
        records: &[PortRecord; NUM_PORTS],
    ) -> Option<PortCommand> {
        if delta.steps != 0 {
            let ports = NUM_PORTS as i64;
            self.selected = (self.selected as i64 + delta.steps as i64).rem_euclid(ports) as usize;
            debug!("Selected port {}", self.selected);
        }

        if delta.pressed {
            let mode: Mode = records[self.selected].mode.next();
            Some(PortCommand::SetMode(self.selected, mode))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> [PortRecord; NUM_PORTS] {
        core::array::from_fn(|_| PortRecord::new())
    }

    #[test]
    fn test_take_clears_mailboxes() {
        let input = EncoderInput::new();
        input.record_step(true);
        input.record_step(true);
        input.record_step(false);
        input.record_press();

        assert_eq!(input.take(), InputDelta { steps: 1, pressed: true });
        assert_eq!(input.take(), InputDelta::default());
    }

    #[test]
    fn test_selection_wraps_both_ways() {
        let records = records();
        let mut selector = PortSelector::new();

        selector.handle(InputDelta { steps: -1, pressed: false }, &records);
        assert_eq!(selector.selected(), NUM_PORTS - 1);

        selector.handle(InputDelta { steps: 2, pressed: false }, &records);
        assert_eq!(selector.selected(), 1);

        selector.handle(InputDelta { steps: 4 * NUM_PORTS as i32, pressed: false }, &records);
        assert_eq!(selector.selected(), 1);
    }

    #[test]
    fn test_press_cycles_mode_of_selected_port() {
        let mut records = records();
        let mut selector = PortSelector::new();

        let command = selector.handle(InputDelta { steps: 2, pressed: true }, &records);
        assert_eq!(command, Some(PortCommand::SetMode(2, Mode::Charging)));

        records[2].set_mode(Mode::Discharging, 0);
        let command = selector.handle(InputDelta { steps: 0, pressed: true }, &records);
        assert_eq!(command, Some(PortCommand::SetMode(2, Mode::Safety)));

        assert_eq!(selector.handle(InputDelta { steps: 1, pressed: false }, &records), None);
    }
}
