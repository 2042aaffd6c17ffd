use thiserror::Error;

#[derive(Error, Debug)]
pub enum LotteryError {
    #[error("Upstream fetch failed for {resource}: {message}")]
    UpstreamFetch { resource: String, message: String },

    #[error("Malformed response for {resource}: {reason}")]
    MalformedResponse { resource: String, reason: String },

    #[error("Empty distribution: no eligible country carries a positive weight")]
    EmptyDistribution,

    #[error("Unknown country '{code}'")]
    UnknownCountry { code: String },

    #[error("Invalid weight {weight} for country {id}")]
    InvalidWeight { id: String, weight: f64 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LotteryError {
    pub fn malformed(resource: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            resource: resource.to_string(),
            reason:   reason.into(),
        }
    }
}

pub type LotteryResult<T> = Result<T, LotteryError>;
