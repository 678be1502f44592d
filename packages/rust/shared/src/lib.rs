//! Shared types, error model, and configuration for brochure.
//!
//! This crate is the foundation depended on by all other brochure crates.
//! It provides:
//! - [`BrochureError`] — the unified error type
//! - Domain types ([`Page`], [`LinkSelection`], [`SelectedLink`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OllamaConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{BrochureError, Result};
pub use types::{LinkSelection, Page, SelectedLink};
