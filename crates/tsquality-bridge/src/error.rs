//! Error types for tsquality-bridge
//!
//! Every recoverable failure of a single file's pipeline is a
//! [`BridgeError`]. Failures that indicate a bug in the bridge itself
//! (decoded length mismatch, double release, access to a region that is
//! not live) are not represented here: they panic.

use std::path::PathBuf;
use thiserror::Error;

use crate::memory::RegionRole;

/// Errors produced while analysing one file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// The analysis routine rejected the dataset, or the dataset has no
    /// rows or value columns to analyse
    #[error("Invalid dataset: {reason}")]
    InvalidDataset { reason: String },

    /// The foreign allocator returned a null address
    #[error("Allocation failed: {size} bytes requested for {role} region")]
    AllocationFailure { size: usize, role: RegionRole },

    /// The file could not be read
    #[error("Failed to read {path}: {message}")]
    AcquisitionFailure { path: PathBuf, message: String },

    /// The encoded input does not fit the foreign calling convention
    #[error("Dataset too large: {len} bytes exceeds the module's length parameter")]
    DatasetTooLarge { len: usize },

    /// A read or write fell outside the module's linear memory
    #[error("Out of bounds: address {address:#x}, {len} bytes")]
    OutOfBounds { address: usize, len: usize },

    /// No `.csv` file was supplied to a batch
    #[error("1 or more csv needed")]
    NoCsvFiles,

    /// The foreign module could not be loaded or is missing a symbol
    #[error("Failed to load analysis module: {0}")]
    ModuleLoad(String),
}

impl BridgeError {
    /// Shorthand for an [`BridgeError::InvalidDataset`] with a reason
    pub fn invalid(reason: impl Into<String>) -> Self {
        BridgeError::InvalidDataset {
            reason: reason.into(),
        }
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The separator is not usable as a single field byte
    #[error("Invalid separator: {0}")]
    InvalidSeparator(String),

    /// A foreign symbol name is empty
    #[error("Missing symbol name: {0}")]
    MissingSymbol(String),

    /// The configuration file could not be parsed
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// I/O errors while reading a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
