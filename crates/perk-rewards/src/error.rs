use perk_core::{CoreError, WalletAddress};
use perk_settlement::TransferError;

use crate::rules::Refusal;
use crate::store::StoreError;

/// Reward-engine errors.
///
/// `Divergence` is deliberately its own class: the transfer has settled on
/// the external ledger but the local eligibility record did not update, so
/// ledger and state disagree until an operator reconciles them. It must
/// never be folded into a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown wallet: {0}")]
    UnknownWallet(WalletAddress),

    #[error("{reason}")]
    Ineligible {
        reason: String,
        retry_after_hours: Option<u64>,
    },

    #[error("token transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("profile store error: {0}")]
    Store(StoreError),

    #[error(
        "state divergence for {wallet}: transfer {tx_hash} confirmed but the profile update failed"
    )]
    Divergence {
        wallet: WalletAddress,
        tx_hash: String,
        #[source]
        source: StoreError,
    },
}

impl From<CoreError> for RewardError {
    fn from(err: CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<Refusal> for RewardError {
    fn from(refusal: Refusal) -> Self {
        Self::Ineligible {
            reason: refusal.reason,
            retry_after_hours: refusal.retry_after_hours,
        }
    }
}
