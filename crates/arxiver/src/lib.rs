//! A library for fetching paper metadata from the arXiv API and downloading the matching PDF
//! into a local directory.
//!
//! The two entry points are [`MetadataFetcher`], which turns an identifier into a structured
//! [`PaperMetadata`] record, and [`PaperDownloader`], which names the PDF after the paper's
//! title and writes it to disk. Both issue their requests through the [`Transport`] trait so the
//! HTTP layer can be swapped out by an embedding host or by tests.
//!
//! # Example
//! ```rust,no_run
//! use arxiver::{MetadataFetcher, PaperDownloader, PaperIdentity};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!   let identity = PaperIdentity::new("1706.03762").with_version("v7");
//!
//!   let metadata = MetadataFetcher::new().fetch(&identity).await?;
//!   println!("Title: {}", metadata.title);
//!
//!   let path = PaperDownloader::new().download(&identity).await?;
//!   println!("Saved to: {}", path.display());
//!
//!   Ok(())
//! }
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]
use std::{
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
  sync::Arc,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, trace, warn};
#[cfg(test)] use tracing_test::traced_test;
use url::Url;

pub mod config;
pub mod download;
pub mod errors;
pub mod format;
pub mod metadata;
pub mod transport;
pub mod xml;
#[cfg(test)] mod tests;

pub use config::Config;
pub use download::{PaperDownloader, TitleLookup};
pub use errors::ArxiverError;
pub use metadata::{MetadataFetcher, PaperIdentity, PaperMetadata};
pub use transport::{HttpResponse, ReqwestTransport, Transport};

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, ArxiverError>;
