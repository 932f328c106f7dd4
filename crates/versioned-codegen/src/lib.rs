//! # Versioned Codegen
//!
//! Generates version-tracking companion types for value records.
//!
//! A companion mirrors a record's public surface (one getter per readable
//! member, one setter per writable member, one constructor per public
//! constructor) but keeps the record inside a `versioned::Versioned`, so every
//! setter call bumps a version counter.
//!
//! ## Architecture
//!
//! ```text
//! Rust source ─[discover]─► Candidate ─[resolve]─► ValueRecordDescriptor
//!                                                         │
//!                                       [validate + emit] ▼
//!                          Report ◄─[Generator]─ GeneratedSource
//! ```
//!
//! - [`discover`]: finds marked structs and reads their public surface
//! - [`emit`]: pure descriptor → tokens/text, deterministic
//! - [`Generator`]: batch driver, one diagnostic per skipped candidate
//! - [`build`]: build-script helper writing units into `OUT_DIR`
//!
//! Descriptors can also come from elsewhere: they are plain `serde` data.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod build;
pub mod config;
pub mod descriptor;
pub mod discover;
pub mod emit;
pub mod error;
pub mod generator;

// Re-export main types
pub use config::{GeneratorConfig, Severity};
pub use descriptor::{
    Accessibility, Constructor, Member, MemberKind, Param, Scope, ValueRecordDescriptor,
};
pub use discover::Candidate;
pub use emit::{emit_companion, emit_extension, generate, generate_with, validate, GeneratedSource};
pub use error::{FailureKind, Result, SourceError, ValidationFailure};
pub use generator::{Diagnostic, Generator, Report};

/// Versioned Codegen version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
