use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TransferError;
use crate::traits::ITokenRail;

/// Registry of token rails keyed by their `rail_id()`.
///
/// The node registers every rail it can construct from its config and then
/// selects the configured one at startup.
pub struct RailRegistry {
    rails: HashMap<String, Arc<dyn ITokenRail>>,
}

impl RailRegistry {
    /// Create a registry with no rails registered.
    pub fn new() -> Self {
        Self {
            rails: HashMap::new(),
        }
    }

    /// Register a rail, keyed by its `rail_id()`.
    pub fn register(&mut self, rail: Arc<dyn ITokenRail>) {
        let id = rail.rail_id().to_string();
        tracing::info!(rail_id = %id, "registering token rail");
        self.rails.insert(id, rail);
    }

    /// Get a rail by its ID.
    pub fn get(&self, rail_id: &str) -> Result<Arc<dyn ITokenRail>, TransferError> {
        self.rails
            .get(rail_id)
            .cloned()
            .ok_or_else(|| TransferError::RailNotFound(rail_id.to_string()))
    }

    /// List all registered rail IDs.
    pub fn rail_ids(&self) -> Vec<String> {
        self.rails.keys().cloned().collect()
    }

    /// Number of registered rails.
    pub fn len(&self) -> usize {
        self.rails.len()
    }

    /// Whether the registry has no rails.
    pub fn is_empty(&self) -> bool {
        self.rails.is_empty()
    }
}

impl Default for RailRegistry {
    fn default() -> Self {
        Self::new()
    }
}
