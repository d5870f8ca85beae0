//! Buzzer Indicator Module
//!
//! Audible feedback for port and input events. The buzzer is passive, so
//! each tone is a 50% PWM square wave at the event's frequency.
//!
//! # Tones
//! - Port complete: 3000 Hz, 500 ms
//! - Port fault: 1500 Hz, 200 ms, three times
//! - Input accepted / system ready: 2500 Hz, 50 ms

use defmt::info;
use embassy_rp::pwm::{self, Pwm};
use embassy_time::{Duration, Timer};

use crate::system::config::{
    BEEP_COMPLETE, BEEP_COMPLETE_HZ, BEEP_ERROR, BEEP_ERROR_HZ, BEEP_INPUT, BEEP_INPUT_HZ,
};
use crate::system::event::{self, Events};
use crate::system::resources::BuzzerResources;

/// Pause between repeated fault tones
const FAULT_GAP: Duration = Duration::from_millis(100);

/// Fault tone repetitions
const FAULT_REPEAT: usize = 3;

#[embassy_executor::task]
pub async fn indicate(r: BuzzerResources) {
    let mut buzzer = Pwm::new_output_b(r.pwm, r.pin, silent_config(BEEP_INPUT_HZ));

    loop {
        match event::wait().await {
            Events::PortComplete(port) => {
                info!("Port {} complete", port);
                beep(&mut buzzer, BEEP_COMPLETE_HZ, BEEP_COMPLETE).await;
            }
            Events::PortFault(port) => {
                info!("Port {} fault", port);
                for _ in 0..FAULT_REPEAT {
                    beep(&mut buzzer, BEEP_ERROR_HZ, BEEP_ERROR).await;
                    Timer::after(FAULT_GAP).await;
                }
            }
            Events::InputAccepted | Events::SystemReady => {
                beep(&mut buzzer, BEEP_INPUT_HZ, BEEP_INPUT).await;
            }
        }
    }
}

/// Plays one tone, then silences the buzzer
async fn beep(buzzer: &mut Pwm<'static>, frequency_hz: u32, duration: Duration) {
    let mut config = silent_config(frequency_hz);
    config.compare_b = config.top / 2;
    buzzer.set_config(&config);

    Timer::after(duration).await;

    buzzer.set_config(&silent_config(frequency_hz));
}

/// PWM configuration for `frequency_hz` with the output held low
fn silent_config(frequency_hz: u32) -> pwm::Config {
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();

    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let divider = ((clock_freq_hz / frequency_hz) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (frequency_hz * divider as u32)) as u16 - 1;

    let mut config = pwm::Config::default();
    config.divider = divider.into();
    config.top = period;
    config.compare_b = 0;
    config
}
