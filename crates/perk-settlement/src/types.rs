use chrono::{DateTime, Utc};
use perk_core::{Coins, WalletAddress};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(pub Uuid);

impl TransferId {
    /// Create a new random transfer ID (UUID v7 — time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof that a transfer settled on the underlying rail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Transfer identifier.
    pub transfer_id: TransferId,
    /// Rail that processed the transfer.
    pub rail_id: String,
    /// Destination wallet.
    pub recipient: WalletAddress,
    /// Amount in reward units.
    pub amount: Coins,
    /// Transaction reference on the underlying rail.
    pub tx_hash: String,
    /// When the rail confirmed the transfer.
    pub confirmed_at: DateTime<Utc>,
}
