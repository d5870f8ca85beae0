//! Periodic status report
//!
//! Every `STATUS_REPORT_INTERVAL` logs a status block for all ports followed
//! by the CSV records of the active ports. The CSV lines are the log export
//! format; they are not stored on the device.

use defmt::info;
use embassy_time::{Instant, Ticker};
use port_engine::report::{self, CSV_HEADER};

use crate::system::config::STATUS_REPORT_INTERVAL;
use crate::system::state;

#[embassy_executor::task]
pub async fn status_report() {
    let mut ticker = Ticker::every(STATUS_REPORT_INTERVAL);

    loop {
        ticker.next().await;

        let Some(telemetry) = state::latest().await else {
            continue;
        };

        info!("===== System Status =====");
        info!("Uptime: {} s", Instant::now().as_secs());
        for (port, snapshot) in telemetry.ports.iter().enumerate() {
            let marker = if port == telemetry.selected_port { ">" } else { " " };
            info!("{}{}", marker, report::status_line(port, snapshot).as_str());
            if !telemetry.sensor_ready[port] {
                info!("  Sensor offline");
            }
            if !snapshot.error_message.is_empty() {
                info!("  Error: {}", snapshot.error_message.as_str());
            }
        }

        let mut header_logged = false;
        for (port, snapshot) in telemetry.ports.iter().enumerate() {
            if !snapshot.active {
                continue;
            }
            if !header_logged {
                info!("{}", CSV_HEADER);
                header_logged = true;
            }
            info!("{}", report::csv_line(port, snapshot, telemetry.timestamp).as_str());
        }
    }
}
