use std::sync::Mutex;

use reqwest::StatusCode;
use tempfile::tempdir;
use tokio_test::{assert_err, assert_ok};

use super::*;

/// Atom response for `1706.03762`, as served by the arXiv API.
pub(crate) const ATTENTION_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?search_query%3D%26id_list%3D1706.03762%26start%3D0%26max_results%3D10" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=&amp;id_list=1706.03762&amp;start=0&amp;max_results=10</title>
  <id>http://arxiv.org/api/zUwBFJ+vAUSpXAR7QFveSY/bZos</id>
  <updated>2024-11-10T00:00:00-05:00</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">1</opensearch:totalResults>
  <opensearch:startIndex xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">0</opensearch:startIndex>
  <opensearch:itemsPerPage xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">10</opensearch:itemsPerPage>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <summary>  The dominant sequence transduction models are based on complex recurrent or
convolutional neural networks in an encoder-decoder configuration. The best
performing models also connect the encoder and decoder through an attention
mechanism. We propose a new simple network architecture, the Transformer, based
solely on attention mechanisms, dispensing with recurrence and convolutions
entirely. Experiments on two machine translation tasks show these models to be
superior in quality while being more parallelizable and requiring significantly
less time to train. Our model achieves 28.4 BLEU on the WMT 2014
English-to-German translation task, improving over the existing best results,
including ensembles by over 2 BLEU. On the WMT 2014 English-to-French
translation task, our model establishes a new single-model state-of-the-art
BLEU score of 41.8 after training for 3.5 days on eight GPUs, a small fraction
of the training costs of the best models from the literature. We show that the
Transformer generalizes well to other tasks by applying it successfully to
English constituency parsing both with large and limited training data.
</summary>
    <author>
      <name>Ashish Vaswani</name>
    </author>
    <author>
      <name>Noam Shazeer</name>
    </author>
    <author>
      <name>Niki Parmar</name>
    </author>
    <author>
      <name>Jakob Uszkoreit</name>
    </author>
    <author>
      <name>Llion Jones</name>
    </author>
    <author>
      <name>Aidan N. Gomez</name>
    </author>
    <author>
      <name>Lukasz Kaiser</name>
    </author>
    <author>
      <name>Illia Polosukhin</name>
    </author>
    <arxiv:comment xmlns:arxiv="http://arxiv.org/schemas/atom">15 pages, 5 figures</arxiv:comment>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>
"#;

/// A minimal feed carrying nothing but a title.
pub(crate) const SAMPLE_FEED: &str = r#"
  <feed xmlns="http://www.w3.org/2005/Atom">
    <entry>
      <title>Sample Paper Title for Testing</title>
    </entry>
  </feed>
"#;

/// Stand-in PDF bytes.
pub(crate) const MOCK_PDF: &[u8] = b"Mock PDF content";

/// A [`Transport`] that answers from a fixed routing table and records every requested URL.
///
/// A request is answered by the first route whose fragment occurs in the URL; unmatched
/// requests get a `404`.
pub(crate) struct MockTransport {
  routes:   Vec<(String, HttpResponse)>,
  requests: Mutex<Vec<String>>,
}

impl MockTransport {
  pub(crate) fn new() -> Self { Self { routes: Vec::new(), requests: Mutex::new(Vec::new()) } }

  pub(crate) fn route(mut self, fragment: &str, response: HttpResponse) -> Self {
    self.routes.push((fragment.to_string(), response));
    self
  }

  pub(crate) fn requests(&self) -> Vec<String> { self.requests.lock().unwrap().clone() }
}

#[async_trait]
impl Transport for MockTransport {
  async fn get(&self, url: &str) -> Result<HttpResponse> {
    self.requests.lock().unwrap().push(url.to_string());
    Ok(
      self
        .routes
        .iter()
        .find(|(fragment, _)| url.contains(fragment.as_str()))
        .map(|(_, response)| response.clone())
        .unwrap_or_else(|| HttpResponse::new(StatusCode::NOT_FOUND, "")),
    )
  }
}

/// Builds a default-configured downloader over `transport`, keeping a handle for inspection.
pub(crate) fn mock_downloader(transport: MockTransport) -> (PaperDownloader, Arc<MockTransport>) {
  let transport = Arc::new(transport);
  let downloader = PaperDownloader::from_config(&Config::default(), transport.clone()).unwrap();
  (downloader, transport)
}

#[traced_test]
#[tokio::test]
async fn test_fetch_then_download_same_title() -> anyhow::Result<()> {
  let dir = tempdir()?;
  let (downloader, transport) = mock_downloader(
    MockTransport::new()
      .route("api/query", HttpResponse::new(StatusCode::OK, ATTENTION_FEED))
      .route("pdf", HttpResponse::new(StatusCode::OK, MOCK_PDF)),
  );
  let identity = PaperIdentity::new("1706.03762").with_version("v7");

  let metadata = downloader.metadata_fetcher().fetch(&identity).await?;
  let path = downloader.download_into(&identity, dir.path()).await?;

  // The scanned title and the parsed title name the same file.
  assert_eq!(path, dir.path().join(format::pdf_filename(&metadata.title)));
  // The advertised PDF link and the fixed PDF base point at the same paper.
  assert!(downloader.pdf_url(&identity).ends_with("1706.03762v7.pdf"));
  assert!(metadata.pdf_url.ends_with("1706.03762v7"));
  assert_eq!(transport.requests().len(), 3);
  Ok(())
}

#[tokio::test]
async fn test_concurrent_downloads_are_independent() -> anyhow::Result<()> {
  let dir = tempdir()?;
  let (downloader, transport) = mock_downloader(
    MockTransport::new()
      .route("api/query", HttpResponse::new(StatusCode::OK, SAMPLE_FEED))
      .route("pdf", HttpResponse::new(StatusCode::OK, MOCK_PDF)),
  );

  let mut handles = Vec::new();
  for id in ["2410.19414", "2410.19415", "2410.19416"] {
    let downloader = downloader.clone();
    let output_dir = dir.path().join(id);
    handles.push(tokio::spawn(async move {
      downloader.download_into(&PaperIdentity::new(id), output_dir).await
    }));
  }

  for handle in handles {
    let path = assert_ok!(handle.await?);
    assert_eq!(std::fs::read(path)?, MOCK_PDF);
  }
  assert_eq!(transport.requests().len(), 6);
  Ok(())
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
  let config = Config { pdf_endpoint: "not a url".into(), ..Config::default() };
  assert_err!(PaperDownloader::from_config(&config, Arc::new(MockTransport::new())));

  let config = Config { metadata_endpoint: "/relative".into(), ..Config::default() };
  assert_err!(MetadataFetcher::from_config(&config, Arc::new(MockTransport::new())));
}
