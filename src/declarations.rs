//! `property: value;` declaration splitting.
//!
//! This is deliberately not a CSS parser. It reads whatever well-formed
//! declarations it can find and silently drops the rest, so comparators can
//! still inspect a half-typed answer.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered property -> value mapping.
///
/// Keys and values are always trimmed and non-empty. Re-declaring a property
/// keeps its original position and takes the newer value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclarationMap {
  entries: Vec<(String, String)>,
}

impl DeclarationMap {
  pub fn new() -> Self { Self::default() }

  /// Insert or overwrite. Empty keys/values (after trimming) are ignored.
  pub fn insert(&mut self, property: &str, value: &str) {
    let (property, value) = (property.trim(), value.trim());
    if property.is_empty() || value.is_empty() {
      return;
    }
    match self.entries.iter_mut().find(|(k, _)| k == property) {
      Some(slot) => slot.1 = value.to_string(),
      None => self.entries.push((property.to_string(), value.to_string())),
    }
  }

  pub fn get(&self, property: &str) -> Option<&str> {
    self.entries.iter().find(|(k, _)| k == property).map(|(_, v)| v.as_str())
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

impl<'a> FromIterator<(&'a str, &'a str)> for DeclarationMap {
  fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
    let mut map = DeclarationMap::new();
    for (k, v) in iter {
      map.insert(k, v);
    }
    map
  }
}

impl Serialize for DeclarationMap {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut m = serializer.serialize_map(Some(self.entries.len()))?;
    for (k, v) in &self.entries {
      m.serialize_entry(k, v)?;
    }
    m.end()
  }
}

/// Returns the text between the first `{` and the next `}`, or the whole
/// input when there is no such pair. Nested braces are not tracked.
pub fn block_body(text: &str) -> &str {
  if let Some(open) = text.find('{') {
    if let Some(len) = text[open + 1..].find('}') {
      return &text[open + 1..open + 1 + len];
    }
  }
  text
}

/// Split a CSS-like string into declarations. Never fails.
pub fn parse(text: &str) -> DeclarationMap {
  let mut map = DeclarationMap::new();
  for fragment in block_body(text).split(';') {
    if let Some((property, value)) = fragment.split_once(':') {
      map.insert(property, value);
    }
  }
  map
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_simple_declarations() {
    let map = parse("width: 10px; height:20px;");
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("width"), Some("10px"));
    assert_eq!(map.get("height"), Some("20px"));
    assert_eq!(map.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["width", "height"]);
  }

  #[test]
  fn empty_input_yields_empty_map() {
    assert!(parse("").is_empty());
    assert!(parse("   ;;  ").is_empty());
  }

  #[test]
  fn extracts_first_brace_block() {
    let map = parse(".x { color: red }");
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("color"), Some("red"));

    // only the first block is read
    let map = parse(".a { color: red; } .b { width: 1px; }");
    assert_eq!(map.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["color"]);
  }

  #[test]
  fn last_duplicate_wins_in_first_position() {
    let map = parse("a:1;b:3;a:2;");
    assert_eq!(map.get("a"), Some("2"));
    assert_eq!(map.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["a", "b"]);
  }

  #[test]
  fn drops_malformed_fragments() {
    let map = parse("width: ; : 5px; garbage; height: 50px; border:");
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("height"), Some("50px"));
  }

  #[test]
  fn value_keeps_text_after_first_colon() {
    let map = parse("background: url(http://x/y.png);");
    assert_eq!(map.get("background"), Some("url(http://x/y.png)"));
  }

  #[test]
  fn unmatched_brace_parses_whole_text() {
    assert_eq!(block_body("} width: 1px {"), "} width: 1px {");
    assert_eq!(block_body("a { b"), "a { b");
  }

  #[test]
  fn parse_is_pure() {
    let input = ".box { width: 1px; height: 2px }";
    assert_eq!(parse(input), parse(input));
  }

  #[test]
  fn serializes_in_declaration_order() {
    let map = parse("z: 1; a: 2;");
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"z":"1","a":"2"}"#);
  }
}
