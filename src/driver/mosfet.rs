//! MOSFET load switch
//!
//! One logic-level N-channel MOSFET per port connects the cell to its load
//! resistor. The gate output is created low, so a port never conducts before
//! the engine has decided it should.

use embassy_rp::Peri;
use embassy_rp::gpio::{Level, Output, Pin};
use port_engine::PowerSwitch;

pub struct MosfetSwitch(Output<'static>);

impl MosfetSwitch {
    pub fn new(pin: Peri<'static, impl Pin>) -> Self {
        Self(Output::new(pin, Level::Low))
    }
}

impl PowerSwitch for MosfetSwitch {
    fn set_energized(&mut self, energized: bool) {
        self.0.set_level(if energized { Level::High } else { Level::Low });
    }
}
