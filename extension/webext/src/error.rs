use serde_json::Value;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a wrapped host operation can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host reported an error for the operation that just completed.
    #[error("{0}")]
    Host(String),
    /// The host entry point threw before any completion was scheduled.
    #[error("host call threw: {0}")]
    Thrown(Value),
    /// The other side replied, but with `success` not set to `true`.
    #[error("request was not acknowledged: {0}")]
    Nack(Value),
    /// A required argument was missing; the host was never called.
    #[error("{0}")]
    Validation(String),
    #[error("host dropped the completion callback without calling it")]
    CallbackDropped,
    #[error("failed to convert host value")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
