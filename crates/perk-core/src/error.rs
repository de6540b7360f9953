/// Core domain validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid wallet address: {0}")]
    InvalidWallet(String),

    #[error("invalid game kind: {0}")]
    InvalidGameKind(String),

    #[error("invalid score: {0}")]
    InvalidScore(String),
}
