//! # Utilities Module
//!
//! ## Role
//! Cross-cutting helpers that don't belong in the core accessor modules.
//!
//! ## Sub-modules
//! - `workspace`: Per-tag decode buffers reused across records

pub mod workspace;
