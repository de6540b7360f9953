use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Reward units. Always non-negative integers; conversion to the settlement
/// ledger's native base units (decimals) is the rail's concern.
pub type Coins = u64;

/// An EVM-style wallet address: `0x` followed by 40 hex characters.
/// Stored lowercase so map lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse and normalize a wallet address.
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
            return Err(CoreError::InvalidWallet(format!(
                "wallet address must start with '0x', got: {}",
                raw
            )));
        }
        let hex_part = &trimmed[2..];
        if hex_part.len() != 40 {
            return Err(CoreError::InvalidWallet(format!(
                "wallet address must have 40 hex characters after '0x', got {}",
                hex_part.len()
            )));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidWallet(format!(
                "wallet address contains non-hex characters: {}",
                raw
            )));
        }
        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    /// The normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC calendar date used to partition per-day bookkeeping.
/// Serialized as `YYYY-MM-DD`. Rolls over at UTC midnight.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DayKey(pub NaiveDate);

impl DayKey {
    /// The calendar day of the given instant, in UTC.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.date_naive())
    }

    /// The day after this one.
    pub fn next(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Wall-clock hours elapsed between two instants, as a fraction.
pub fn elapsed_hours(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - since).num_milliseconds() as f64 / 3_600_000.0
}

/// Whole hours remaining until `cooldown_hours` have elapsed since `since`,
/// rounded up for user-facing messages. Zero once the cooldown has passed.
pub fn remaining_whole_hours(since: DateTime<Utc>, now: DateTime<Utc>, cooldown_hours: u32) -> u64 {
    let remaining = cooldown_hours as f64 - elapsed_hours(since, now);
    if remaining <= 0.0 {
        0
    } else {
        remaining.ceil() as u64
    }
}
