//! Error types for companion generation

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a candidate record produced no companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The record, or a scope enclosing it, is not `pub`
    InaccessibleType,

    /// The descriptor cannot be turned into compilable source
    InvalidDescriptor,
}

impl FailureKind {
    /// Stable diagnostic code for this failure.
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::InaccessibleType => "VR0001",
            FailureKind::InvalidDescriptor => "VR0002",
        }
    }
}

/// A candidate that failed validation and was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The record or an enclosing scope is not reachable from generated code
    #[error("type `{subject}` is not reachable from generated code; the record and every enclosing module must be `pub`")]
    InaccessibleType {
        /// Name of the offending record
        subject: String,
    },

    /// The descriptor is internally inconsistent
    #[error("cannot generate a companion for `{subject}`: {reason}")]
    InvalidDescriptor {
        /// Name of the offending record
        subject: String,
        /// What is wrong with it
        reason: String,
    },
}

impl ValidationFailure {
    /// Which kind of failure this is.
    pub fn kind(&self) -> FailureKind {
        match self {
            ValidationFailure::InaccessibleType { .. } => FailureKind::InaccessibleType,
            ValidationFailure::InvalidDescriptor { .. } => FailureKind::InvalidDescriptor,
        }
    }

    /// Name of the record the failure is about.
    pub fn subject(&self) -> &str {
        match self {
            ValidationFailure::InaccessibleType { subject }
            | ValidationFailure::InvalidDescriptor { subject, .. } => subject,
        }
    }

    pub(crate) fn invalid(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationFailure::InvalidDescriptor {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while reading and resolving Rust source into descriptors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A source file could not be read or an output could not be written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The source text is not valid Rust
    #[error("Rust syntax error: {0}")]
    Parse(#[from] syn::Error),

    /// The marked item is outside what companions can mirror
    #[error("unsupported record `{record}`: {reason}")]
    Unsupported {
        /// Name of the marked item
        record: String,
        /// What makes it unsupported
        reason: String,
    },
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported(record: impl Into<String>, reason: impl Into<String>) -> Self {
        SourceError::Unsupported {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for generation
pub type Result<T> = std::result::Result<T, ValidationFailure>;
