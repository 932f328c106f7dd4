//! # Versioned
//!
//! Change tracking for plain value records.
//!
//! [`Versioned`] wraps a `Copy` record, routes every mutation through
//! [`Versioned::update`] and counts those calls. The record's own definition
//! stays untouched.
//!
//! Companion types that mirror a record's public surface (same getters and
//! setters, same constructors) but mutate through a `Versioned` are generated
//! either in place by the [`versioned`] attribute, or at build time by the
//! `versioned-codegen` crate for records marked with [`record`].
//!
//! ## Architecture
//!
//! ```text
//! record ─┬─ #[versioned] ─────────────► companion V_<Name> (same module)
//!         └─ #[record] + build script ─► companion V_<Name> (generated module)
//!                                              │
//!                                              ▼
//!                                     Versioned<'a, Name> ─► Owned | Borrowed
//! ```
//!
//! ## Example
//!
//! ```
//! use versioned::versioned;
//!
//! #[versioned]
//! #[derive(Debug, Clone, Copy)]
//! pub struct Stock {
//!     pub quantity: i32,
//!     pub unit_weight: i32,
//! }
//!
//! let mut stock = V_Stock::from_value(Stock { quantity: 0, unit_weight: 2 });
//! stock.set_quantity(10);
//! assert_eq!(stock.quantity(), 10);
//! assert_eq!(stock.version(), 1);
//! ```
//!
//! Not thread-safe: `Versioned` holds `Cell`s and is therefore `!Sync`.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Lets generated code name this crate as `::versioned` from inside it.
extern crate self as versioned;

mod storage;
mod wrapper;

pub use versioned_macros::{record, versioned};
pub use wrapper::Versioned;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[versioned]
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Gauge {
        pub level: u8,
    }

    #[test]
    fn test_in_crate_companion_expands() {
        let mut gauge = V_Gauge::from_value(Gauge { level: 1 });
        gauge.set_level(2);
        assert_eq!(gauge.level(), 2);
        assert_eq!(gauge.version(), 1);
    }
}
