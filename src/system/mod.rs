//! Core system components shared between tasks
pub mod config;
pub mod event;
pub mod resources;
pub mod state;
