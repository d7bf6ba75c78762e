use thiserror::Error;

use crate::persist::PersistError;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid status url: {0}")]
    InvalidUrl(String),
    #[error("status endpoint returned http {0}")]
    HttpStatus(u16),
    #[error("could not decode status payload: {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("status channel gave up after {attempts} attempts: {detail}")]
    RetriesExhausted { attempts: u32, detail: String },
}

impl ChannelError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ChannelError::Timeout;
        }
        if err.is_decode() {
            return ChannelError::Decode(err.to_string());
        }
        ChannelError::Network(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("download endpoint returned http {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid download url: {0}")]
    InvalidUrl(String),
    #[error("could not open the download in a browser")]
    FallbackBlocked { url: String },
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl RetrievalError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        RetrievalError::Network(err.to_string())
    }
}
