// This module defines the error type shared by every layer of jitci using the thiserror
// crate. CiError covers configuration failures detected at startup (unsupported host
// architecture, an unknown compiler name, a word size that does not match the selected
// architecture), register catalog self-consistency failures, compiler delegate failures,
// descriptor parsing errors, listener failures and the one recoverable steady-state
// condition: invoking installed code that has been invalidated. CiResult<T> is the
// convenience alias used throughout the crate.

//! Error types for the compiler interface.

use thiserror::Error;

/// Main error type for the compiler interface.
#[derive(Error, Debug)]
pub enum CiError {
    #[error("No runtime available for the {arch} architecture")]
    UnsupportedArchitecture { arch: String },

    #[error("Compiler '{name}' not found")]
    CompilerNotFound { name: String },

    #[error("Word size mismatch for {arch}: architecture uses {expected} bytes, VM reports {actual}")]
    WordSizeMismatch {
        arch: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Illegal state: {reason}")]
    IllegalState { reason: String },

    #[error("no compiler selected")]
    NoCompilerSelected,

    #[error("Compilation failed: {message}")]
    Compilation { message: String },

    #[error("Installed code '{name}' has been invalidated")]
    InvalidInstalledCode { name: String },

    #[error("Installed code '{name}' cannot be executed: no executor attached")]
    NotExecutable { name: String },

    #[error("Invalid method descriptor '{descriptor}': {reason}")]
    InvalidSignature { descriptor: String, reason: String },

    #[error("Not a primitive or void type character: '{ch}'")]
    InvalidTypeChar { ch: char },

    #[error("Event listener failed: {source}")]
    Listener {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CiError {
    /// Wrap an arbitrary listener failure.
    pub fn listener<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Listener { source: err.into() }
    }
}

/// Result type alias for compiler interface operations.
pub type CiResult<T> = Result<T, CiError>;
