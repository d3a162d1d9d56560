//! Footnote references and definitions.
//!
//! A reference `[^label]` and a definition paragraph `[^label]: body` are tied
//! together only through the label: the reference gets the id
//! `footnote-reference:{label}` and links to `#footnote:{label}`, the
//! definition gets the id `footnote:{label}` and links back.
use std::sync::LazyLock;

use log::error;
use regex::{Captures, Regex};

use crate::utils::never_matching_regex;

const REFERENCE_PREFIX: &str = "footnote-reference";
const FOOTNOTE_PREFIX: &str = "footnote";

static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)^\[\^([^\]]+)\]:(.*)$").unwrap_or_else(|e| {
    error!("Failed to compile DEFINITION regex: {e}");
    never_matching_regex()
  })
});

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[\^([^\]]+)\]").unwrap_or_else(|e| {
    error!("Failed to compile REFERENCE regex: {e}");
    never_matching_regex()
  })
});

/// Whether the whole text is a footnote definition.
#[must_use]
pub fn is_definition(text: &str) -> bool {
  DEFINITION.is_match(text)
}

/// Turn a `[^label]: body` definition into its back-linking marker + body.
/// Text that is not a definition is returned unchanged.
#[must_use]
pub fn interpolate_definition(text: &str) -> String {
  DEFINITION
    .replace(text, |caps: &Captures| {
      let label = &caps[1];
      format!(
        "<sup class=\"footnote-text\" data-number=\"{label}\" \
         id=\"{FOOTNOTE_PREFIX}:{label}\"><a \
         href=\"#{REFERENCE_PREFIX}:{label}\">{label}</a></sup>{}",
        &caps[2]
      )
    })
    .into_owned()
}

/// Replace every `[^label]` that is not directly followed by `:` or `(` with
/// a superscript marker linking to the definition.
#[must_use]
pub fn interpolate_references(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut copied = 0;
  let mut search_from = 0;

  while let Some(caps) = REFERENCE.captures_at(text, search_from) {
    let Some(whole) = caps.get(0) else { break };
    let followed_by = text[whole.end()..].chars().next();
    if matches!(followed_by, Some(':' | '(')) {
      // Not a reference; retry from just after the opening bracket.
      search_from = whole.start() + 1;
      continue;
    }

    out.push_str(&text[copied..whole.start()]);
    out.push_str(&reference_marker(&caps[1]));
    copied = whole.end();
    search_from = whole.end();
  }

  out.push_str(&text[copied..]);
  out
}

fn reference_marker(label: &str) -> String {
  format!(
    "<sup class=\"footnote-mark\" data-number=\"{label}\" \
     id=\"{REFERENCE_PREFIX}:{label}\"><a \
     href=\"#{FOOTNOTE_PREFIX}:{label}\">{label}</a></sup>"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reference_marker() {
    assert_eq!(
      interpolate_references("Claim[^1] made."),
      "Claim<sup class=\"footnote-mark\" data-number=\"1\" \
       id=\"footnote-reference:1\"><a href=\"#footnote:1\">1</a></sup> made."
    );
  }

  #[test]
  fn test_reference_skips_definitions_and_links() {
    assert_eq!(interpolate_references("[^1]: body"), "[^1]: body");
    assert_eq!(interpolate_references("[^x](url)"), "[^x](url)");
  }

  #[test]
  fn test_multiple_references() {
    let out = interpolate_references("a[^1] b[^note] c");
    assert!(out.contains("id=\"footnote-reference:1\""));
    assert!(out.contains("id=\"footnote-reference:note\""));
    assert!(out.ends_with("</sup> c"));
  }

  #[test]
  fn test_definition() {
    assert!(is_definition("[^1]: Explanation."));
    assert!(is_definition("[^1]: spans\nlines"));
    assert!(!is_definition("Text [^1]: not at start"));
    assert_eq!(
      interpolate_definition("[^1]: Explanation."),
      "<sup class=\"footnote-text\" data-number=\"1\" id=\"footnote:1\"><a \
       href=\"#footnote-reference:1\">1</a></sup> Explanation."
    );
  }
}
