use std::{io, num::ParseIntError};
use thiserror::Error;

/// Errors produced while concealing or revealing a payload.
#[derive(Debug, Error)]
pub enum Error {
    #[error("bit width must be 1, 2 or 3, got {0}")]
    InvalidBitWidth(u8),

    #[error("bit width must be an integer: {0}")]
    ParseBitWidth(#[from] ParseIntError),

    #[error("payload needs {required} container bytes, but only {available} are available")]
    Capacity { required: u64, available: usize },

    #[error("container holds {available} bytes, but {required} are needed to reveal the payload")]
    TruncatedContainer { required: u64, available: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
