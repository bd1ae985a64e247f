//! Key-value preference storage

pub mod ports;

pub use ports::PreferenceStore;
