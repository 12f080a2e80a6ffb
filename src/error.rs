//! # Centralized Error Handling
//!
//! Unified error types for the crate using `thiserror`.
//!
//! Only genuine failures live here. The negative return codes htslib uses
//! for "tag undefined", "type mismatch" and "tag absent" are ordinary
//! outcomes and are reported through [`crate::accessor::Outcome`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vcfbuf operations
#[derive(Error, Debug)]
pub enum VcfBufError {
    /// Allocation failed, either on our side or inside an htslib decode call (code -4)
    #[error("Out of memory: {context}")]
    OutOfMemory { context: String },

    /// htslib could not open the file
    #[error("Failed to open variant file: {path}")]
    Open { path: PathBuf },

    /// htslib could not parse the header
    #[error("Failed to read header from {path}")]
    Header { path: PathBuf },

    /// `bcf_read` reported a decoding error
    #[error("Failed to read record (htslib code {code})")]
    Read { code: i32 },

    /// Tag names are passed to htslib as C strings
    #[error("Invalid tag {tag:?}: contains an interior nul byte")]
    InvalidTag { tag: String },

    /// Configuration errors (invalid CLI arguments)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File not found errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using VcfBufError
pub type Result<T> = std::result::Result<T, VcfBufError>;

impl VcfBufError {
    /// Create an out-of-memory error with context
    pub fn out_of_memory(context: impl Into<String>) -> Self {
        Self::OutOfMemory {
            context: context.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for allocation failures
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}
