//! Title handling for turning paper titles into filenames.
//!
//! This module converts a paper title into a filesystem-friendly stem and offers the
//! lightweight title scan used when a full metadata parse is not wanted. Sanitizing is
//! deterministic: two titles that differ only by letter case or by which non-alphanumeric
//! separators they use map to the same stem. Stems are not unique across papers, so
//! downloading two papers with the same title writes to the same file.
//!
//! # Examples
//!
//! ```
//! use arxiver::format;
//!
//! assert_eq!(format::sanitize_title("Attention Is All You Need"), "attention_is_all_you_need");
//! assert_eq!(format::pdf_filename("BERT: Pre-training"), "bert__pre_training.pdf");
//! ```

use lazy_static::lazy_static;
use regex::Regex;

/// Extension appended to every downloaded file.
pub const PDF_EXTENSION: &str = "pdf";

/// Collapses every run of whitespace into a single space and trims the ends.
///
/// ```
/// use arxiver::format::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Deep\n    Residual   Learning "), "Deep Residual Learning");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Derives a filename stem from a title.
///
/// ASCII letters are lowercased, ASCII digits are kept and every other character, including
/// whitespace, punctuation and non-ASCII letters, becomes `_`. Runs are not collapsed, so
/// `"A: B"` becomes `"a__b"`.
///
/// ```
/// use arxiver::format::sanitize_title;
///
/// assert_eq!(sanitize_title("GPT-4 Technical Report"), "gpt_4_technical_report");
/// assert_eq!(sanitize_title("gpt 4 TECHNICAL/report"), "gpt_4_technical_report");
/// ```
pub fn sanitize_title(title: &str) -> String {
  title
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
    .collect()
}

/// The full filename for a title: the whitespace-normalized, sanitized stem plus `.pdf`.
pub fn pdf_filename(title: &str) -> String {
  format!("{}.{PDF_EXTENSION}", sanitize_title(&normalize_whitespace(title)))
}

/// Finds the first `<title>` element in a raw metadata body without parsing the document.
///
/// The match runs from the first attribute-free `<title>` opener, optionally namespace
/// prefixed, to the next closing tag and may span lines. Standard XML entities are decoded and
/// whitespace is normalized. In an arXiv feed the feed-level `<title type="html">` query echo is
/// skipped because it carries an attribute, so the first match is the entry title. An entry
/// `<title>` carrying attributes is skipped the same way, so such a feed yields `None` here while
/// [`PaperMetadata::from_feed`](crate::PaperMetadata::from_feed) still finds the title.
///
/// Returns `None` when no title element exists or its text is blank.
///
/// ```
/// use arxiver::format::scan_title;
///
/// let feed = r#"<feed><title type="html">query</title><entry><title>Deep
///   Learning</title></entry></feed>"#;
/// assert_eq!(scan_title(feed).as_deref(), Some("Deep Learning"));
/// assert_eq!(scan_title("<feed><entry/></feed>"), None);
/// ```
pub fn scan_title(body: &str) -> Option<String> {
  lazy_static! {
    static ref TITLE: Regex =
      Regex::new(r"(?s)<(?:[A-Za-z_][\w.-]*:)?title>(.*?)</(?:[A-Za-z_][\w.-]*:)?title>").unwrap();
  }

  let raw = TITLE.captures(body)?.get(1)?.as_str();
  // Fall back to the raw text when it holds a stray `&` that is not an entity.
  let text = quick_xml::escape::unescape(raw)
    .map(|text| text.into_owned())
    .unwrap_or_else(|_| raw.to_string());
  let title = normalize_whitespace(&text);
  (!title.is_empty()).then_some(title)
}
