//! Port control loop
//!
//! Owns the [`Station`] and runs the cooperative control loop that keeps
//! every port in a safe electrical state.
//!
//! # Loop Iteration
//! 1. Drain encoder input and apply the resulting command
//! 2. `Station::tick`: acquisition every 500 ms, safety pass every iteration
//! 3. Publish telemetry for the report and indicator tasks
//!
//! # Bring-up Order
//! The MOSFET gates are configured low before the sensor bus is touched, and
//! `Station::begin` commands every switch off again before any sensor is
//! probed.

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_rp::i2c::{self, I2c};
use embassy_sync::blocking_mutex::{Mutex, raw::NoopRawMutex};
use embassy_time::{Instant, Ticker};
use port_engine::input::PortSelector;
use port_engine::{NUM_PORTS, SafetyLimits, Station};

use crate::driver::ina226::Ina226;
use crate::driver::mosfet::MosfetSwitch;
use crate::system::config::{CONTROL_LOOP_PERIOD, I2C_FREQUENCY_HZ, SENSOR_ADDRESSES};
use crate::system::event::{EventNotifier, Events, try_send_event};
use crate::system::resources::PortResources;
use crate::system::state::{self, Telemetry};
use crate::task::encoder_input::ENCODER_INPUT;

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

#[embassy_executor::task]
pub async fn port_control(r: PortResources) {
    let switches = [
        MosfetSwitch::new(r.mosfet_0),
        MosfetSwitch::new(r.mosfet_1),
        MosfetSwitch::new(r.mosfet_2),
        MosfetSwitch::new(r.mosfet_3),
    ];

    let mut config = i2c::Config::default();
    config.frequency = I2C_FREQUENCY_HZ;
    let bus = Mutex::<NoopRawMutex, _>::new(RefCell::new(I2c::new_blocking(
        r.i2c, r.scl, r.sda, config,
    )));
    let sensors = SENSOR_ADDRESSES.map(|address| Ina226::new(I2cDevice::new(&bus), address));

    let mut station = Station::new(sensors, switches, SafetyLimits::DEFAULT);
    station.begin(now_ms());
    try_send_event(Events::SystemReady);

    let mut notifier = EventNotifier;
    let mut selector = PortSelector::new();
    let mut ticker = Ticker::every(CONTROL_LOOP_PERIOD);

    loop {
        let now = now_ms();

        let delta = ENCODER_INPUT.take();
        if let Some(command) = selector.handle(delta, station.records()) {
            match station.apply(command, now) {
                Ok(()) => {
                    info!("Applied {}", command);
                    try_send_event(Events::InputAccepted);
                }
                Err(e) => warn!("Rejected {}: {}", command, e),
            }
        }

        station.tick(now, &mut notifier);

        state::publish(Telemetry {
            timestamp: now,
            ports: station.snapshot(),
            sensor_ready: core::array::from_fn(|port| station.sensor_ready(port)),
            selected_port: selector.selected(),
        })
        .await;

        ticker.next().await;
    }
}

/// Port count the wiring in `PortResources` is laid out for
const _: () = assert!(NUM_PORTS == 4);
