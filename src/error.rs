//! Error types for broodje

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Trigger error: {0}")]
    Trigger(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        Error::Llm(msg.into())
    }

    pub fn trigger(msg: impl Into<String>) -> Self {
        Error::Trigger(msg.into())
    }
}
