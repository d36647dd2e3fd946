//! Fusion and orchestration for AssetLens.
//!
//! This crate ties the provider client and the asset extractor together into
//! the enhanced scrape workflow (see [`pipeline::EnhancedScraper`]) and owns
//! the rendering of the fused, AI-ready document.

pub mod assets;
pub mod fuse;
pub mod pipeline;

pub use assets::AssetSource;
pub use fuse::{LinkGroups, classify_links, fuse};
pub use pipeline::{EnhancedScraper, ScrapeOutcome};
