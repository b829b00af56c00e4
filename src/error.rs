// src/error.rs

use thiserror::Error;

/// Errors surfaced by the heading and lane components.
#[derive(Debug, Error)]
pub enum SteeringError {
    /// Caller supplied data that does not satisfy a component contract
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Frame is empty or not an 8-bit, 3-channel image
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SteeringError>;
