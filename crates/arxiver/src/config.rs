//! Endpoints and defaults shared by the fetcher and the downloader.
//!
//! The library reads no environment variables or files. A [`Config`] is built in code, or
//! deserialized by the embedding application, and handed to
//! [`MetadataFetcher::from_config`](crate::MetadataFetcher::from_config) and
//! [`PaperDownloader::from_config`](crate::PaperDownloader::from_config).
//!
//! # Examples
//!
//! ```
//! use arxiver::{Config, TitleLookup};
//!
//! # fn example() -> arxiver::Result<()> {
//! let config = Config::default()
//!   .with_metadata_endpoint("http://localhost:8080/api/query")?
//!   .with_output_dir("papers")
//!   .with_title_lookup(TitleLookup::Metadata);
//!
//! assert_eq!(config.pdf_endpoint, "https://arxiv.org/pdf");
//! # Ok(())
//! # }
//! ```

use super::*;

/// The arXiv Atom query endpoint.
pub const DEFAULT_METADATA_ENDPOINT: &str = "https://export.arxiv.org/api/query";

/// Base under which arXiv serves PDFs.
pub const DEFAULT_PDF_ENDPOINT: &str = "https://arxiv.org/pdf";

/// Directory downloads land in when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "./downloads";

/// Settings for fetching metadata and downloading PDFs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Metadata query endpoint; the identifier is appended as `?id_list={id}{version}`
  pub metadata_endpoint: String,
  /// PDF base; files are fetched from `{pdf_endpoint}/{id}{version}.pdf`
  pub pdf_endpoint:      String,
  /// Directory PDFs are written to
  pub output_dir:        PathBuf,
  /// How the downloader obtains the title used for the filename
  pub title_lookup:      TitleLookup,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      metadata_endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
      pdf_endpoint:      DEFAULT_PDF_ENDPOINT.to_string(),
      output_dir:        PathBuf::from(DEFAULT_OUTPUT_DIR),
      title_lookup:      TitleLookup::default(),
    }
  }
}

impl Config {
  /// Sets the metadata endpoint.
  ///
  /// # Errors
  ///
  /// Returns [`ArxiverError::InvalidUrl`] if `endpoint` is not an absolute URL.
  pub fn with_metadata_endpoint(mut self, endpoint: &str) -> Result<Self> {
    self.metadata_endpoint = validate_endpoint(endpoint)?;
    Ok(self)
  }

  /// Sets the PDF endpoint.
  ///
  /// # Errors
  ///
  /// Returns [`ArxiverError::InvalidUrl`] if `endpoint` is not an absolute URL.
  pub fn with_pdf_endpoint(mut self, endpoint: &str) -> Result<Self> {
    self.pdf_endpoint = validate_endpoint(endpoint)?;
    Ok(self)
  }

  /// Sets the output directory.
  pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.output_dir = dir.as_ref().to_path_buf();
    self
  }

  /// Sets the title lookup strategy.
  pub fn with_title_lookup(mut self, title_lookup: TitleLookup) -> Self {
    self.title_lookup = title_lookup;
    self
  }
}

/// Checks that `endpoint` parses as an absolute URL and strips trailing slashes so identifiers
/// can be appended verbatim.
pub(crate) fn validate_endpoint(endpoint: &str) -> Result<String> {
  Url::parse(endpoint)?;
  Ok(endpoint.trim_end_matches('/').to_string())
}
