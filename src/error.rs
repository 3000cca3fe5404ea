//! Error types for vistrigger.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed handshake record: {0:?}")]
    MalformedRecord(String),

    #[error("Malformed payload frame: {0}")]
    MalformedFrame(&'static str),

    #[error("Unable to watch for the trigger signal: {0}")]
    Watch(String),
}

pub type Result<T> = std::result::Result<T, Error>;
