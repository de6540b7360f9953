//! Perk Reward Engine
//!
//! The eligibility and issuance core: per-wallet reward state, pure
//! cooldown/cap rules, and the commit protocol that orders the external
//! settlement call before the local record update while serializing all
//! mutations per identity.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod profile;
pub mod rules;
pub mod store;

pub use engine::{
    AccrualReceipt, GameStats, IssueReceipt, PendingClaimReceipt, RewardEngine, ScoreReceipt,
};
pub use error::RewardError;
pub use ledger::AccrualLedger;
pub use locks::IdentityLocks;
pub use profile::IdentityProfile;
pub use rules::Refusal;
pub use store::{MemoryStore, ProfileStore, StoreError};
