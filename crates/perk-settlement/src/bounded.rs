use async_trait::async_trait;
use perk_core::{Coins, WalletAddress};
use std::sync::Arc;
use std::time::Duration;

use crate::error::TransferError;
use crate::traits::ITokenRail;
use crate::types::TransferReceipt;

/// Wraps a rail with a hard deadline on each transfer attempt.
///
/// An elapsed deadline surfaces as `TransferError::Timeout`; the underlying
/// transfer may or may not have landed, which is why callers treat a timeout
/// as a failed action and leave any retry decision to an operator.
pub struct DeadlineRail {
    inner: Arc<dyn ITokenRail>,
    deadline: Duration,
}

impl DeadlineRail {
    pub fn new(inner: Arc<dyn ITokenRail>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl ITokenRail for DeadlineRail {
    async fn transfer(
        &self,
        recipient: &WalletAddress,
        amount: Coins,
    ) -> Result<TransferReceipt, TransferError> {
        match tokio::time::timeout(self.deadline, self.inner.transfer(recipient, amount)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    wallet = %recipient,
                    amount,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "transfer deadline elapsed"
                );
                Err(TransferError::Timeout(self.deadline.as_millis() as u64))
            }
        }
    }

    fn rail_id(&self) -> &str {
        self.inner.rail_id()
    }
}
