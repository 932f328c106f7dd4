//! Records that go through `versioned_codegen::build` at build time.
//!
//! The companions live in [`generated`], compiled from `$OUT_DIR/versioned`.

pub mod inventory;

/// Companions generated from [`inventory`].
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/versioned/versioned.rs"));
}
