//! Page fetching and HTML content extraction.
//!
//! This crate provides:
//! - [`Fetcher`] — single-GET page retrieval with a browser User-Agent
//! - [`extract`] — best-effort extraction of visible text and anchor targets
//!
//! [`Fetcher::fetch_page`] composes both into a [`brochure_shared::Page`].

pub mod extract;
pub mod fetch;

pub use extract::{Extracted, extract};
pub use fetch::Fetcher;
