//! Error types for the gait metrics library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "capture")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[cfg(feature = "capture")]
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame arrived (or dispatch was started) before the detector was ready
    #[error("Pose detector is not initialized")]
    DetectorUnavailable,

    /// The detector rejected a single frame
    #[error("Detection failed: {0}")]
    DetectionFailure(String),

    /// The acquisition layer could not decode an image or video
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed line in a recorded landmark session
    #[error("Replay format error on line {line}: {message}")]
    ReplayFormat {
        /// 1-based line number in the session file
        line: usize,
        /// Parser message
        message: String,
    },

    /// Model loading or inference error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model output processing error
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
