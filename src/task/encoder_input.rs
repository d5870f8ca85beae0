//! Rotary encoder handling
//!
//! Waits for encoder edges and records them into [`ENCODER_INPUT`]. All
//! interpretation (port selection, mode changes) happens in the control
//! loop, which drains the counters once per iteration.
//!
//! # Direction
//! Sampled on the falling edge of CLK: DT high means clockwise.

use embassy_futures::select::{Either, select};
use embassy_rp::gpio::{Input, Level, Pull};
use embassy_time::Timer;
use port_engine::input::EncoderInput;

use crate::system::config::ENCODER_DEBOUNCE;
use crate::system::resources::EncoderResources;

/// Step counter and press flag shared with the control loop
pub static ENCODER_INPUT: EncoderInput = EncoderInput::new();

#[embassy_executor::task]
pub async fn encoder_input(r: EncoderResources) {
    let mut clk = Input::new(r.clk, Pull::Up);
    let dt = Input::new(r.dt, Pull::Up);
    let mut sw = Input::new(r.sw, Pull::Up);

    loop {
        match select(clk.wait_for_falling_edge(), sw.wait_for_falling_edge()).await {
            Either::First(()) => {
                ENCODER_INPUT.record_step(dt.get_level() == Level::High);
            }
            Either::Second(()) => {
                if debounce(&mut sw).await {
                    ENCODER_INPUT.record_press();
                }
            }
        }
    }
}

/// Confirms a press after the debounce delay and waits for the release
async fn debounce(button: &mut Input<'static>) -> bool {
    Timer::after(ENCODER_DEBOUNCE).await;
    if button.is_high() {
        return false;
    }
    button.wait_for_high().await;
    true
}
