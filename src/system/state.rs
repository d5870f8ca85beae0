//! System State Management
//!
//! Telemetry published by the port control task for every other task.
//! The `Station` itself stays owned by the control task; readers only ever
//! see the last published copy.
//!
//! # State Access Pattern
//! ```rust
//! if let Some(telemetry) = TELEMETRY.lock().await.as_ref() {
//!     // read the snapshot here
//! }
//! ```

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use port_engine::{NUM_PORTS, PortSnapshot};

/// Last published telemetry, `None` until the first control cycle ran
pub static TELEMETRY: Mutex<CriticalSectionRawMutex, Option<Telemetry>> = Mutex::new(None);

/// Copy of every port's state at one instant
#[derive(Clone)]
pub struct Telemetry {
    /// Uptime at publication (ms)
    pub timestamp: u64,
    pub ports: [PortSnapshot; NUM_PORTS],
    /// Sensor initialized and sampled
    pub sensor_ready: [bool; NUM_PORTS],
    /// Port currently selected with the encoder
    pub selected_port: usize,
}

/// Replaces the published telemetry
pub async fn publish(telemetry: Telemetry) {
    *TELEMETRY.lock().await = Some(telemetry);
}

/// Copy of the latest telemetry
pub async fn latest() -> Option<Telemetry> {
    TELEMETRY.lock().await.clone()
}
