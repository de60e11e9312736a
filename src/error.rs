use thiserror::Error;

/// Errors surfaced by the ledger core and its collaborators.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("chain has no genesis block")]
    EmptyChain,

    #[error("invalid request: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("could not fetch chain from {node}: {reason}")]
    Fetch { node: String, reason: String },

    #[error("invalid chain: {0}")]
    InvalidChain(String),

    #[error("chain head moved while solving the proof")]
    StaleMiningJob,

    #[error("mining abandoned after {after_secs}s without a proof")]
    MiningAbandoned { after_secs: u64 },

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(vec![msg.into()])
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
