//! Embassy tasks
pub mod encoder_input;
pub mod indicate;
pub mod port_control;
pub mod status_report;
