//! Shared node state, accessible from HTTP handlers.

use perk_rewards::RewardEngine;
use std::sync::Arc;
use std::time::Instant;

/// State shared across API handlers.
pub struct AppState {
    /// The reward engine serving all endpoints.
    pub engine: Arc<RewardEngine>,
    /// Which rail settles rewards (for /status).
    pub rail_id: String,
    /// When the node started.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<RewardEngine>, rail_id: String) -> Self {
        Self {
            engine,
            rail_id,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
