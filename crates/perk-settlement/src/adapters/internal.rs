use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use perk_core::{Coins, WalletAddress};
use uuid::Uuid;

use crate::error::TransferError;
use crate::traits::ITokenRail;
use crate::types::{TransferId, TransferReceipt};

/// An individual ledger entry in the double-entry bookkeeping system.
#[derive(Debug, Clone)]
struct LedgerEntry {
    /// Unique ID for this entry.
    _id: Uuid,
    /// Account affected ("treasury" or a wallet address).
    account: String,
    /// Positive = credit, negative = debit.
    delta: i128,
    /// Associated transfer.
    transfer_id: TransferId,
}

/// Off-chain, in-memory token rail.
///
/// Implements a double-entry ledger funded by a treasury account. Every
/// confirmed transfer debits the treasury and credits the recipient wallet.
/// Used for tests and local development; the transfer count it exposes is
/// what the double-payment tests assert against.
pub struct InternalRail {
    /// Double-entry ledger.
    ledger: DashMap<Uuid, LedgerEntry>,
    /// Balance tracker: account -> signed balance in reward units.
    balances: DashMap<String, i128>,
    /// Confirmed transfers keyed by TransferId.
    transfers: DashMap<Uuid, TransferReceipt>,
}

const TREASURY_ACCOUNT: &str = "treasury";

impl InternalRail {
    /// Create a rail with the given treasury balance (reward units).
    pub fn new(treasury: u128) -> Self {
        let balances = DashMap::new();
        balances.insert(TREASURY_ACCOUNT.to_string(), treasury as i128);
        Self {
            ledger: DashMap::new(),
            balances,
            transfers: DashMap::new(),
        }
    }

    /// Remaining treasury balance.
    pub fn treasury_balance(&self) -> i128 {
        self.balances
            .get(TREASURY_ACCOUNT)
            .map(|v| *v)
            .unwrap_or(0)
    }

    /// Credited balance of a wallet.
    pub fn balance_of(&self, wallet: &WalletAddress) -> i128 {
        self.balances.get(wallet.as_str()).map(|v| *v).unwrap_or(0)
    }

    /// Number of confirmed transfers.
    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// Synthetic transaction hash: blake3 over the transfer identity.
    fn tx_hash(transfer_id: &TransferId, recipient: &WalletAddress, amount: Coins) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(transfer_id.as_uuid().as_bytes());
        hasher.update(recipient.as_str().as_bytes());
        hasher.update(&amount.to_le_bytes());
        format!("0x{}", hex::encode(hasher.finalize().as_bytes()))
    }

    /// Record a double-entry pair: debit treasury, credit recipient.
    fn record_entries(&self, transfer_id: TransferId, recipient: &WalletAddress, amount: Coins) {
        let value = amount as i128;

        let debit_id = Uuid::now_v7();
        self.ledger.insert(
            debit_id,
            LedgerEntry {
                _id: debit_id,
                account: TREASURY_ACCOUNT.to_string(),
                delta: -value,
                transfer_id,
            },
        );

        let credit_id = Uuid::now_v7();
        self.ledger.insert(
            credit_id,
            LedgerEntry {
                _id: credit_id,
                account: recipient.as_str().to_string(),
                delta: value,
                transfer_id,
            },
        );

        self.balances
            .entry(TREASURY_ACCOUNT.to_string())
            .and_modify(|b| *b -= value)
            .or_insert(-value);
        self.balances
            .entry(recipient.as_str().to_string())
            .and_modify(|b| *b += value)
            .or_insert(value);
    }
}

#[async_trait]
impl ITokenRail for InternalRail {
    async fn transfer(
        &self,
        recipient: &WalletAddress,
        amount: Coins,
    ) -> Result<TransferReceipt, TransferError> {
        let available = self.treasury_balance();
        if available < amount as i128 {
            return Err(TransferError::InsufficientTreasury {
                available: available.max(0) as u128,
                required: amount as u128,
            });
        }

        let transfer_id = TransferId::new();
        self.record_entries(transfer_id, recipient, amount);

        let receipt = TransferReceipt {
            transfer_id,
            rail_id: self.rail_id().to_string(),
            recipient: recipient.clone(),
            amount,
            tx_hash: Self::tx_hash(&transfer_id, recipient, amount),
            confirmed_at: Utc::now(),
        };
        self.transfers.insert(transfer_id.0, receipt.clone());

        tracing::info!(
            transfer_id = %transfer_id,
            wallet = %recipient,
            amount,
            "internal transfer confirmed"
        );
        Ok(receipt)
    }

    fn rail_id(&self) -> &str {
        "rail-internal"
    }
}
