//! Downloading a paper's PDF into a local directory.
//!
//! [`PaperDownloader`] names the file after the paper's title and fetches the PDF from a
//! fixed base URL (`https://arxiv.org/pdf/{id}{version}.pdf`). It does not use the PDF link in
//! the metadata. A download runs these steps in order:
//!
//! 1. obtain the title, see [`TitleLookup`]
//! 2. derive `{output_dir}/{sanitized_title}.pdf`
//! 3. create the output directory, including parents
//! 4. GET the PDF; a non-success status or an empty body fails the download
//! 5. write the bytes, replacing any existing file at that path
//!
//! Because the directory is created before the PDF is requested, a failed PDF request still
//! leaves the directory behind. If writing the file fails, the partial file is removed.
//!
//! # Examples
//!
//! ```no_run
//! use arxiver::{PaperDownloader, PaperIdentity, TitleLookup};
//!
//! # async fn example() -> arxiver::Result<()> {
//! let downloader = PaperDownloader::new().with_title_lookup(TitleLookup::Metadata);
//! let path = downloader.download_into(&PaperIdentity::new("1706.03762"), "papers").await?;
//! assert_eq!(path.file_name().unwrap(), "attention_is_all_you_need.pdf");
//! # Ok(())
//! # }
//! ```

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::*;

/// How the downloader obtains the title it names the file after.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleLookup {
  /// Scan the raw metadata body for the first `<title>` element
  #[default]
  Scan,
  /// Parse the full metadata record and use its title
  Metadata,
}

impl Display for TitleLookup {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TitleLookup::Scan => write!(f, "scan"),
      TitleLookup::Metadata => write!(f, "metadata"),
    }
  }
}

impl FromStr for TitleLookup {
  type Err = ArxiverError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    if s.eq_ignore_ascii_case("scan") {
      Ok(TitleLookup::Scan)
    } else if s.eq_ignore_ascii_case("metadata") {
      Ok(TitleLookup::Metadata)
    } else {
      Err(ArxiverError::InvalidTitleLookup(s.to_owned()))
    }
  }
}

/// Downloads papers into a directory, one file per title.
///
/// Calls share no mutable state. Concurrent downloads of papers with the same title race on
/// the final write and the last writer wins.
#[derive(Clone)]
pub struct PaperDownloader {
  /// Fetcher used for the title lookup.
  fetcher:      MetadataFetcher,
  /// Transport used for the PDF request.
  transport:    Arc<dyn Transport>,
  /// PDF base without trailing slash.
  pdf_endpoint: String,
  /// Directory used by [`PaperDownloader::download`].
  output_dir:   PathBuf,
  /// How the title is obtained.
  title_lookup: TitleLookup,
}

impl PaperDownloader {
  /// Creates a downloader for arXiv with the default settings of [`Config`].
  pub fn new() -> Self {
    let config = Config::default();
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new());
    Self {
      fetcher: MetadataFetcher::with_default_endpoint(transport.clone()),
      transport,
      pdf_endpoint: config.pdf_endpoint,
      output_dir:   config.output_dir,
      title_lookup: config.title_lookup,
    }
  }

  /// Creates a downloader from `config`, sending every request through `transport`.
  ///
  /// # Errors
  ///
  /// Returns [`ArxiverError::InvalidUrl`] if either configured endpoint is not an absolute URL.
  pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
    Ok(Self {
      fetcher: MetadataFetcher::from_config(config, transport.clone())?,
      transport,
      pdf_endpoint: config::validate_endpoint(&config.pdf_endpoint)?,
      output_dir: config.output_dir.clone(),
      title_lookup: config.title_lookup,
    })
  }

  /// Replaces the title lookup strategy.
  pub fn with_title_lookup(mut self, title_lookup: TitleLookup) -> Self {
    self.title_lookup = title_lookup;
    self
  }

  /// Replaces the default output directory.
  pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.output_dir = dir.as_ref().to_path_buf();
    self
  }

  /// The fetcher used for title lookups.
  pub fn metadata_fetcher(&self) -> &MetadataFetcher { &self.fetcher }

  /// The PDF URL for `identity`.
  pub fn pdf_url(&self, identity: &PaperIdentity) -> String {
    format!("{}/{}.{}", self.pdf_endpoint, identity.key(), format::PDF_EXTENSION)
  }

  /// Looks up the title used to name the file.
  ///
  /// # Errors
  ///
  /// Returns [`ArxiverError::MissingTitle`] if the metadata carries no title, besides the
  /// request errors of [`MetadataFetcher::fetch_feed`].
  pub async fn title(&self, identity: &PaperIdentity) -> Result<String> {
    match self.title_lookup {
      TitleLookup::Scan => {
        let body = self.fetcher.fetch_feed(identity).await?;
        format::scan_title(&body).ok_or(ArxiverError::MissingTitle)
      },
      TitleLookup::Metadata => Ok(self.fetcher.fetch(identity).await?.title),
    }
  }

  /// Downloads the PDF for `identity` into the configured output directory.
  ///
  /// See [`PaperDownloader::download_into`].
  pub async fn download(&self, identity: &PaperIdentity) -> Result<PathBuf> {
    self.download_into(identity, &self.output_dir).await
  }

  /// Downloads the PDF for `identity` into `output_dir` and returns the written path.
  ///
  /// # Errors
  ///
  /// - [`ArxiverError::MissingTitle`] if no title could be found; nothing is created
  /// - [`ArxiverError::UpstreamStatus`] if either request answers with a non-success status
  /// - [`ArxiverError::EmptyBody`] if the PDF response is empty; no file is written
  /// - [`ArxiverError::Filesystem`] if the directory or file cannot be written
  pub async fn download_into(
    &self,
    identity: &PaperIdentity,
    output_dir: impl AsRef<Path>,
  ) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();

    let title = self.title(identity).await?;
    let path = output_dir.join(format::pdf_filename(&title));
    debug!("Resolved {identity} to {title:?}, writing to {}", path.display());

    tokio::fs::create_dir_all(output_dir).await?;

    let url = self.pdf_url(identity);
    debug!("Downloading PDF from: {url}");
    let response = self.transport.get(&url).await?.error_for_status(&url)?;
    if response.body.is_empty() {
      return Err(ArxiverError::EmptyBody { url });
    }

    write_file(&path, &response.body).await?;
    info!("Paper downloaded to {}", path.display());
    Ok(path)
  }
}

impl Default for PaperDownloader {
  fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for PaperDownloader {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PaperDownloader")
      .field("fetcher", &self.fetcher)
      .field("pdf_endpoint", &self.pdf_endpoint)
      .field("output_dir", &self.output_dir)
      .field("title_lookup", &self.title_lookup)
      .finish_non_exhaustive()
  }
}

/// Writes `bytes` to `path`, truncating an existing file.
async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
  let file = tokio::fs::File::create(path).await?;
  write_or_remove(path, file, bytes).await
}

/// Writes `bytes` through `writer`, which was opened on `path`, and removes `path` if the write
/// does not complete.
async fn write_or_remove<W: AsyncWrite + Unpin>(
  path: &Path,
  mut writer: W,
  bytes: &[u8],
) -> Result<()> {
  let written = async {
    writer.write_all(bytes).await?;
    writer.flush().await
  }
  .await;

  if let Err(e) = written {
    drop(writer);
    warn!("Failed writing {}, removing partial file: {e}", path.display());
    if let Err(cleanup) = tokio::fs::remove_file(path).await {
      warn!("Could not remove {}: {cleanup}", path.display());
    }
    return Err(e.into());
  }

  trace!("Wrote {} bytes to {}", bytes.len(), path.display());
  Ok(())
}
