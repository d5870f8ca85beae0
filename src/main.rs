//! Battery station firmware entry point
//!
//! Initializes the system and spawns the control, input, indicator and
//! report tasks.

#![no_std]
#![no_main]

use crate::task::{
    encoder_input::encoder_input, indicate::indicate, port_control::port_control,
    status_report::status_report,
};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use system::resources::{AssignedResources, BuzzerResources, EncoderResources, PortResources};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Sensor and switch drivers
mod driver;
/// System core modules
mod system;
/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups for each task
    let r = split_resources!(p);

    // Control loop first: it drives all MOSFET gates low before anything else runs
    spawner.spawn(port_control(r.ports)).unwrap();
    spawner.spawn(encoder_input(r.encoder)).unwrap();
    spawner.spawn(indicate(r.buzzer)).unwrap();
    spawner.spawn(status_report()).unwrap();
}
