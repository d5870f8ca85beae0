//! Hardware Resource Management
//!
//! Allocates pins and peripherals to the tasks that own them. Each group is
//! moved into exactly one task, so no peripheral is ever shared between tasks.
//!
//! # Resource Groups
//! - Ports: sensor I2C bus and the four MOSFET gate outputs
//! - Encoder: rotary encoder quadrature inputs and push button
//! - Buzzer: PWM slice and pin of the passive buzzer

use assign_resources::assign_resources;
use embassy_rp::{Peri, peripherals};

assign_resources! {
    /// INA226 sensor bus and MOSFET gates, owned by the control loop
    ports: PortResources {
        i2c: I2C0,
        sda: PIN_4,
        scl: PIN_5,
        mosfet_0: PIN_10,
        mosfet_1: PIN_11,
        mosfet_2: PIN_12,
        mosfet_3: PIN_13,
    },
    /// Rotary encoder with push button
    encoder: EncoderResources {
        clk: PIN_14,
        dt: PIN_15,
        sw: PIN_16,
    },
    /// Passive buzzer driven by PWM (GPIO17 is slice 0, channel B)
    buzzer: BuzzerResources {
        pwm: PWM_SLICE0,
        pin: PIN_17,
    },
}
