use async_trait::async_trait;
use perk_core::{Coins, WalletAddress};

use crate::error::TransferError;
use crate::types::TransferReceipt;

/// Token rail interface.
///
/// Each implementation bridges reward issuance to a concrete way of moving
/// tokens (an on-chain relayer, an internal ledger, etc.). A rail performs
/// exactly one transfer attempt per call and does not guarantee idempotency
/// across retries — a caller retrying a timed-out call may pay twice.
#[async_trait]
pub trait ITokenRail: Send + Sync {
    /// Transfer `amount` reward units to `recipient`.
    ///
    /// The rail owns any unit/decimals conversion required by the underlying
    /// ledger. On error nothing has been observed to settle; a timeout means
    /// the outcome is unknown to the caller.
    async fn transfer(
        &self,
        recipient: &WalletAddress,
        amount: Coins,
    ) -> Result<TransferReceipt, TransferError>;

    /// Return the unique identifier of this rail (e.g. "rail-internal").
    fn rail_id(&self) -> &str;
}
