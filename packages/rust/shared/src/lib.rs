//! Shared types, error model, and configuration for ContactScout.
//!
//! This crate is the foundation depended on by all other ContactScout crates.
//! It provides:
//! - [`ContactScoutError`]: the unified error type for file-level failures
//! - Domain types ([`RowWindow`], [`WindowPosition`], company header candidates)
//! - Configuration ([`AppConfig`], [`GeminiConfig`], config loading, credential lookup)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiKey, AppConfig, GeminiConfig, PipelineConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_api_key, resolve_api_key_with,
};
pub use error::{ContactScoutError, Result};
pub use types::{COMPANY_HEADER_CANDIDATES, EMAIL_COLUMN, RowWindow, WindowPosition};
