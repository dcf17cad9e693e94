//! Configuration loading
//!
//! Builds a [`wikibase_domain::WikibaseConfig`] from environment variables or
//! a `config.json`/`config.toml` file.

pub mod loader;

// Re-export commonly used items
pub use loader::{find_config_path, load, load_from_env, load_from_file};
