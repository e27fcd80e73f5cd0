//! # Toolbind
//!
//! Binds loosely typed tool calls from an agent loop to native Rust
//! functions. See [`toolbind_core`] for the engine itself.

pub use toolbind_core::*;
