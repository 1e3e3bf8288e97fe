//! Core domain + application logic for the Liam's Server bot.
//!
//! This crate does not know about Discord or HTTP. The gateway, the anime
//! metadata service and the paste service live behind ports (traits)
//! implemented in adapter crates.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod updates;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
