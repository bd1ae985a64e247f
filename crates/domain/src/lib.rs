//! # Mople Domain
//!
//! Domain types shared by the Mople client crates.
//!
//! This crate contains:
//! - The credential pair and session events
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Protocol constants (header names, storage keys)
//!
//! ## Architecture
//! - No dependencies on other Mople crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
