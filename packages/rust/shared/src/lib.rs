//! Shared types, error model, and configuration for AssetLens.
//!
//! This crate is the foundation depended on by all other AssetLens crates.
//! It provides:
//! - [`AssetLensError`]: the unified error type
//! - Domain types ([`AssetManifest`], [`ProviderResponse`], [`FusedDocument`])
//! - Configuration ([`AppConfig`], [`ProviderConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExtractionConfig, ProviderConfig, ServerConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{AssetLensError, Result};
pub use types::{
    AssetManifest, FusedDocument, ImageAsset, LayoutElement, LayoutTag, LinkAsset, ProviderLink,
    ProviderMetadata, ProviderResponse, StructuredDocument,
};
