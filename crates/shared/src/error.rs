use std::path::PathBuf;
use std::time::Duration;

/// Why a call to the text-generation service did not produce a summary.
/// Never leaves the summarizer: every variant degrades to the fallback.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("request to text-generation service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("text-generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("text-generation service returned no text")]
    EmptyResponse,

    #[error("text-generation service did not answer within {0:?}")]
    Timeout(Duration),
}

/// Errors raised when sending a rendered digest. Unlike summary failures
/// these reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("missing SMTP configuration: set {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("invalid EMAIL_SMTP_PORT value: {0:?}")]
    InvalidPort(String),

    #[error("no recipients given")]
    NoRecipients,

    #[error("invalid email address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
