/// Settlement-rail errors.
///
/// A failed or timed-out transfer has made no local state change and is safe
/// for the caller to retry; the rail itself never retries because the
/// underlying transfer is not idempotent.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("rail not registered: {0}")]
    RailNotFound(String),

    #[error("insufficient treasury balance: available {available}, required {required}")]
    InsufficientTreasury { available: u128, required: u128 },

    #[error("transfer rejected by rail: {0}")]
    Rejected(String),

    #[error("transfer timed out after {0} ms")]
    Timeout(u64),

    #[error("relayer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed relayer response: {0}")]
    MalformedResponse(String),

    #[error("internal rail error: {0}")]
    Internal(String),
}
