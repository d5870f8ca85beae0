//! System Events
//!
//! Defines events and channels for inter-task communication.
//!
//! The control loop publishes through [`try_send_event`] only: a full
//! channel drops the event instead of stalling the safety pass.

use defmt::{Format, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use port_engine::Notifier;

/// Multi-producer, single-consumer event channel with capacity of 10
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Events, 10> = Channel::new();

/// Sends an event without waiting, dropping it if the channel is full
pub fn try_send_event(event: Events) {
    if EVENT_CHANNEL.sender().try_send(event).is_err() {
        warn!("Event channel full, dropped {}", event);
    }
}

/// Receives the next event from the system channel
pub async fn wait() -> Events {
    EVENT_CHANNEL.receiver().receive().await
}

/// System-wide events
#[derive(Debug, Clone, Copy, Format, PartialEq)]
pub enum Events {
    /// A port finished its charge or discharge session
    PortComplete(usize),
    /// A port entered the Error status
    PortFault(usize),
    /// An encoder command was applied
    InputAccepted,
    /// Power-on, sensors brought up
    SystemReady,
}

/// Engine notifier backed by the event channel
pub struct EventNotifier;

impl Notifier for EventNotifier {
    fn notify_complete(&mut self, port: usize) {
        try_send_event(Events::PortComplete(port));
    }

    fn notify_error(&mut self, port: usize) {
        try_send_event(Events::PortFault(port));
    }
}
