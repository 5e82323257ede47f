//! A shape-tolerant view over XML documents.
//!
//! Atom feeds are converted into a [`serde_json::Value`] tree so fields can be read by path
//! without a fixed schema. The conversion follows a few simple rules:
//!
//! - element names are namespace-local, so `<arxiv:comment>` is stored under `comment`
//! - attributes are stored as `@name` keys; namespace declarations are dropped
//! - text content is stored under `#text`
//! - an element with nothing but text collapses to a plain string, and an empty element
//!   collapses to `""`
//! - repeated sibling elements become an array in document order
//!
//! Because a single `<author>` yields an object while two yield an array, readers go through
//! [`OneOrMany`] instead of checking shapes at every call site.
//!
//! # Examples
//!
//! ```
//! use arxiver::xml::{parse_document, text_of, OneOrMany};
//!
//! let doc = parse_document(
//!   "<entry><author><name>Ada</name></author><author><name>Alan</name></author></entry>",
//! )
//! .unwrap();
//! let names: Vec<String> =
//!   OneOrMany::of(doc["entry"].get("author")).iter().map(|a| text_of(a.get("name"))).collect();
//! assert_eq!(names, ["Ada", "Alan"]);
//! ```

use quick_xml::{
  events::{BytesStart, Event},
  Reader,
};
use serde_json::Map;

use super::*;

/// Key under which an element's text content is stored.
pub const TEXT_KEY: &str = "#text";

/// Prefix applied to attribute names.
pub const ATTRIBUTE_PREFIX: char = '@';

/// Parses an XML document into a [`Value`] tree.
///
/// The returned value is an object keyed by the root element's name.
///
/// # Errors
///
/// Returns [`ArxiverError::Xml`] for malformed input, including mismatched or unclosed tags.
pub fn parse_document(xml: &str) -> Result<Value> {
  let mut reader = Reader::from_str(xml);
  let mut stack: Vec<(String, Map<String, Value>)> = Vec::new();
  let mut current = Map::new();

  loop {
    match reader.read_event().map_err(xml_error)? {
      Event::Start(ref e) => {
        let element = attributes(e)?;
        stack.push((local_name(e), std::mem::replace(&mut current, element)));
      },
      Event::Empty(ref e) => {
        let element = attributes(e)?;
        insert_child(&mut current, local_name(e), collapse(element));
      },
      Event::Text(e) => push_text(&mut current, &e.unescape().map_err(xml_error)?),
      Event::CData(e) => push_text(&mut current, &String::from_utf8_lossy(&e.into_inner())),
      Event::End(_) => {
        let Some((name, parent)) = stack.pop() else {
          return Err(ArxiverError::Xml("unexpected closing tag".into()));
        };
        let element = std::mem::replace(&mut current, parent);
        insert_child(&mut current, name, collapse(element));
      },
      Event::Eof => break,
      _ => (),
    }
  }

  if let Some((name, _)) = stack.last() {
    return Err(ArxiverError::Xml(format!("unclosed element `{name}`")));
  }

  Ok(Value::Object(current))
}

/// The normalized shape of a field that may occur zero, one or many times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OneOrMany<'a> {
  /// The field does not occur
  Absent,
  /// The field occurs exactly once
  One(&'a Value),
  /// The field occurs repeatedly, in document order
  Many(&'a [Value]),
}

impl<'a> OneOrMany<'a> {
  /// Classifies a looked-up field.
  pub fn of(value: Option<&'a Value>) -> Self {
    match value {
      None | Some(Value::Null) => OneOrMany::Absent,
      Some(Value::Array(items)) => OneOrMany::Many(items),
      Some(value) => OneOrMany::One(value),
    }
  }

  /// Iterates over every occurrence in document order.
  pub fn iter(&self) -> std::slice::Iter<'a, Value> {
    let items: &'a [Value] = match *self {
      OneOrMany::Absent => &[],
      OneOrMany::One(value) => std::slice::from_ref(value),
      OneOrMany::Many(items) => items,
    };
    items.iter()
  }

  /// Number of occurrences.
  pub fn len(&self) -> usize { self.iter().len() }

  /// Whether the field is absent.
  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// The first occurrence, if any.
  pub fn first(&self) -> Option<&'a Value> { self.iter().next() }
}

/// Reads the text of a field.
///
/// A plain string is used as is, otherwise the element's `#text` child is used. Anything else
/// yields an empty string. The result is always trimmed.
pub fn text_of(value: Option<&Value>) -> String {
  let text = match value {
    Some(Value::String(text)) => text.as_str(),
    Some(Value::Object(element)) =>
      element.get(TEXT_KEY).and_then(Value::as_str).unwrap_or_default(),
    _ => "",
  };
  text.trim().to_string()
}

/// Reads an attribute off an element.
pub fn attribute<'a>(element: &'a Value, name: &str) -> Option<&'a str> {
  element.get(format!("{ATTRIBUTE_PREFIX}{name}").as_str()).and_then(Value::as_str)
}

/// Wraps any displayable parser error.
fn xml_error(e: impl Display) -> ArxiverError { ArxiverError::Xml(e.to_string()) }

/// Namespace-local name of an element.
fn local_name(e: &BytesStart) -> String {
  String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Collects an element's attributes, skipping namespace declarations.
fn attributes(e: &BytesStart) -> Result<Map<String, Value>> {
  let mut element = Map::new();
  for attr in e.attributes().flatten() {
    if attr.key.as_namespace_binding().is_some() {
      continue;
    }
    let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
    let value = attr.unescape_value().map_err(xml_error)?;
    element.insert(format!("{ATTRIBUTE_PREFIX}{key}"), Value::String(value.into_owned()));
  }
  Ok(element)
}

/// Appends text content, ignoring whitespace between elements.
fn push_text(element: &mut Map<String, Value>, text: &str) {
  if text.trim().is_empty() {
    return;
  }
  match element.get_mut(TEXT_KEY) {
    Some(Value::String(existing)) => existing.push_str(text),
    _ => {
      element.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    },
  }
}

/// Reduces a finished element to its simplest representation.
fn collapse(mut element: Map<String, Value>) -> Value {
  if element.is_empty() {
    return Value::String(String::new());
  }
  if element.len() == 1 {
    if let Some(text) = element.remove(TEXT_KEY) {
      return text;
    }
  }
  Value::Object(element)
}

/// Adds a child, turning repeated names into an array.
fn insert_child(parent: &mut Map<String, Value>, name: String, value: Value) {
  match parent.get_mut(&name) {
    Some(Value::Array(items)) => items.push(value),
    Some(existing) => {
      let first = existing.take();
      *existing = Value::Array(vec![first, value]);
    },
    None => {
      parent.insert(name, value);
    },
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use serde_json::json;

  use super::*;

  #[test]
  fn test_parse_collapses_and_groups() {
    let doc = parse_document(
      r#"<?xml version="1.0" encoding="UTF-8"?>
      <feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
        <title type="html">Query</title>
        <entry>
          <title>  A Title  </title>
          <arxiv:comment>12 pages</arxiv:comment>
          <category term="cs.CL"/>
          <category term="cs.LG"/>
          <empty></empty>
        </entry>
      </feed>"#,
    )
    .unwrap();

    assert_eq!(
      doc,
      json!({
        "feed": {
          "title": { "@type": "html", "#text": "Query" },
          "entry": {
            "title": "  A Title  ",
            "comment": "12 pages",
            "category": [{ "@term": "cs.CL" }, { "@term": "cs.LG" }],
            "empty": ""
          }
        }
      })
    );
  }

  #[test]
  fn test_parse_entities_and_cdata() {
    let doc = parse_document("<a><b>Fish &amp; Chips</b><c><![CDATA[<raw>]]></c></a>").unwrap();
    assert_eq!(doc["a"]["b"], "Fish & Chips");
    assert_eq!(doc["a"]["c"], "<raw>");
  }

  #[test]
  fn test_parse_rejects_malformed() {
    assert!(matches!(parse_document("<a><b></a>"), Err(ArxiverError::Xml(_))));
    assert!(matches!(parse_document("<a><b>"), Err(ArxiverError::Xml(_))));
  }

  #[test]
  fn test_one_or_many() {
    let many = json!([{ "name": "Ada" }, { "name": "Alan" }, { "name": "Grace" }]);
    let one = json!({ "name": "Ada" });

    assert_eq!(OneOrMany::of(None), OneOrMany::Absent);
    assert_eq!(OneOrMany::of(Some(&Value::Null)).len(), 0);
    assert_eq!(OneOrMany::of(Some(&one)).len(), 1);
    assert_eq!(OneOrMany::of(Some(&one)).first(), Some(&one));

    let names: Vec<String> =
      OneOrMany::of(Some(&many)).iter().map(|author| text_of(author.get("name"))).collect();
    assert_eq!(names, ["Ada", "Alan", "Grace"]);
  }

  #[test]
  fn test_text_of() {
    assert_eq!(text_of(Some(&json!("  plain  "))), "plain");
    assert_eq!(text_of(Some(&json!({ "@type": "html", "#text": " mixed " }))), "mixed");
    assert_eq!(text_of(Some(&json!({ "@type": "html" }))), "");
    assert_eq!(text_of(None), "");
  }

  #[test]
  fn test_attribute() {
    let link = json!({ "@title": "pdf", "@href": "http://arxiv.org/pdf/1706.03762v7" });
    assert_eq!(attribute(&link, "href"), Some("http://arxiv.org/pdf/1706.03762v7"));
    assert_eq!(attribute(&link, "rel"), None);
    assert_eq!(attribute(&json!("text"), "href"), None);
  }
}
