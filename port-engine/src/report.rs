//! Telemetry text export
//!
//! Fixed-capacity text renderings of a [`PortSnapshot`]: the CSV log format
//! and the one-line status summary printed by the periodic status report.

use core::fmt::Write;

use heapless::String;

use crate::port::PortSnapshot;

/// Column header matching [`csv_line`]
pub const CSV_HEADER: &str =
    "Timestamp,Port,Voltage(V),Current(A),Power(W),mAh,Wh,Mode,Battery,Status";

pub const LINE_LEN: usize = 128;

pub type Line = String<LINE_LEN>;

/// Whole seconds since the port's session start
pub fn session_seconds(snapshot: &PortSnapshot, now: u64) -> u64 {
    now.saturating_sub(snapshot.start_time.unwrap_or(0)) / 1000
}

/// One CSV record, without line terminator
pub fn csv_line(port: usize, snapshot: &PortSnapshot, now: u64) -> Line {
    let mut line = Line::new();
    // the longest possible record fits the buffer, a failed write only truncates
    let _ = write!(
        line,
        "{},{},{:.3},{:.3},{:.3},{:.1},{:.2},{},{},{}",
        session_seconds(snapshot, now),
        port,
        snapshot.voltage,
        snapshot.current,
        snapshot.power,
        snapshot.accumulated_charge,
        snapshot.accumulated_energy,
        snapshot.mode.name(),
        snapshot.battery_kind.name(),
        snapshot.status.name(),
    );
    line
}

/// Human-readable status summary of one port
pub fn status_line(port: usize, snapshot: &PortSnapshot) -> Line {
    let mut line = Line::new();
    let _ = write!(
        line,
        "Port {}: {} | {} | {} | {:.3}V {:.3}A {:.2}W | {:.1} mAh {:.2} Wh | cutoff {:.1}V",
        port,
        snapshot.status.name(),
        snapshot.mode.name(),
        snapshot.battery_kind.name(),
        snapshot.voltage,
        snapshot.current,
        snapshot.power,
        snapshot.accumulated_charge,
        snapshot.accumulated_energy,
        snapshot.effective_cutoff,
    );
    line
}
