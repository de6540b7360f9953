use chrono::{DateTime, Utc};
use perk_core::WalletAddress;
use serde::{Deserialize, Serialize};

use crate::ledger::AccrualLedger;

/// Durable per-wallet reward state — the unit of eligibility.
///
/// Created on first touch by the welcome-bonus flow (richer account
/// provisioning lives outside this service); afterwards only read and
/// conditionally updated by the engine. `version` is the optimistic
/// concurrency token: every successful store update increments it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub wallet: WalletAddress,
    /// Set once the one-time welcome bonus has been paid.
    #[serde(default)]
    pub welcome_granted: bool,
    /// Last successful daily check-in.
    #[serde(default)]
    pub last_check_in: Option<DateTime<Utc>>,
    /// When the current mining cycle was started.
    #[serde(default)]
    pub last_mine_time: Option<DateTime<Utc>>,
    /// True while a started mining cycle has not yet been claimed.
    #[serde(default)]
    pub mining_ready: bool,
    /// Coins already settled, per day and game kind.
    #[serde(default)]
    pub game_earnings: AccrualLedger,
    /// Coins accrued but not yet settled, per day and game kind.
    #[serde(default)]
    pub pending_rewards: AccrualLedger,
    /// Informational: when pending rewards were last claimed.
    #[serde(default)]
    pub last_game_reward_claim: Option<DateTime<Utc>>,
    /// Optimistic-concurrency token.
    #[serde(default)]
    pub version: u64,
}

impl IdentityProfile {
    /// A fresh profile with no reward history.
    pub fn new(wallet: WalletAddress) -> Self {
        Self {
            wallet,
            welcome_granted: false,
            last_check_in: None,
            last_mine_time: None,
            mining_ready: false,
            game_earnings: AccrualLedger::new(),
            pending_rewards: AccrualLedger::new(),
            last_game_reward_claim: None,
            version: 0,
        }
    }
}
