//! Selector-prefix scoping so preview styles stay inside their own container.
//!
//! Textual, single pass. Comma-separated selector lists get one prefix for the
//! whole list, comments containing braces are not understood, and nested
//! blocks other than at-rules are treated like top-level ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Prefix every selector in `css` with `scope` (e.g. `#preview-...`).
pub fn scope(css: &str, scope: &str) -> String {
  let mut out = String::with_capacity(css.len() + scope.len() * 4);
  let mut segment_start = 0;

  for (i, ch) in css.char_indices() {
    match ch {
      '{' => {
        let selector = &css[segment_start..i];
        let trimmed = selector.trim();
        if selector.is_empty() || trimmed.starts_with('@') {
          out.push_str(selector);
          out.push('{');
        } else {
          let leading = &selector[..selector.len() - selector.trim_start().len()];
          out.push_str(leading);
          out.push_str(scope);
          out.push(' ');
          out.push_str(trimmed);
          out.push_str(" {");
        }
        segment_start = i + 1;
      }
      '}' => {
        out.push_str(&css[segment_start..=i]);
        segment_start = i + 1;
      }
      _ => {}
    }
  }
  out.push_str(&css[segment_start..]);
  out
}

/// Source of fresh container ids for scoped renders.
///
/// Ids combine wall-clock millis, a process-wide sequence and a random base36
/// suffix, so two previews rendered in the same millisecond never collide.
#[derive(Debug)]
pub struct ScopeIds {
  prefix: &'static str,
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl ScopeIds {
  pub const PREVIEW: ScopeIds = ScopeIds { prefix: "preview" };
  pub const EXAMPLE: ScopeIds = ScopeIds { prefix: "example" };

  /// A new element id (without `#`).
  pub fn next_id(&self) -> String {
    let millis = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_millis())
      .unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}-{}", self.prefix, millis, seq, random_suffix(9))
  }
}

fn random_suffix(len: usize) -> String {
  const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  let mut rng = rand::thread_rng();
  (0..len)
    .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
    .collect()
}
