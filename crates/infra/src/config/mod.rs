//! Client configuration loading
//!
//! Environment variables take precedence; a probed JSON or TOML file is the
//! fallback. Every loaded configuration is validated before it is returned.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
