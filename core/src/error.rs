use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Invalid aggregate for customer '{customer_id}': {reason}")]
    InvalidAggregate { customer_id: String, reason: String },

    #[error("Invalid order '{order_id}': {reason}")]
    InvalidOrder { order_id: String, reason: String },

    #[error("Invalid scoring config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScoringError {
    pub fn invalid_aggregate(customer_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAggregate {
            customer_id: customer_id.to_string(),
            reason:      reason.into(),
        }
    }
}

pub type ScoringResult<T> = Result<T, ScoringError>;
