//! Client for the remote page-scraping provider.
//!
//! The provider renders a URL and returns markdown, HTML, a link list, a
//! screenshot and page metadata. This crate owns the wire contract for that
//! exchange and the text normalization applied to its free-text fields.
//!
//! This crate provides:
//! - [`ProviderClient`]: bearer-authenticated scrape requests
//! - [`ScrapeOptions`]: request parameters with the contract defaults
//! - [`sanitize_quotes`]: typographic punctuation folding

mod client;
mod sanitize;

pub use client::{OutputFormat, PageAction, ProviderClient, ScrapeOptions};
pub use sanitize::sanitize_quotes;
