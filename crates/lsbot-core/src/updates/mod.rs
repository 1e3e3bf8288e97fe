//! Scheduled jobs that poll external state.

use std::sync::Arc;

use crate::{messaging::port::GatewayPort, scheduler::TaskDescriptor, state::AppState};

pub mod track;

/// Every periodic task the bot runs.
pub fn all(state: &AppState, gateway: Arc<dyn GatewayPort>) -> Vec<TaskDescriptor> {
    vec![track::TrackUpdate::new(state.clone(), gateway).descriptor()]
}
