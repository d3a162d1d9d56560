//! Bare URL autolinking for HTML fragments.
use std::sync::LazyLock;

use log::error;
use regex::{Captures, Regex};

use crate::utils::never_matching_regex;

static AUTOLINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(https?://[^\s<>"')\}]+)"#).unwrap_or_else(|e| {
    error!("Failed to compile AUTOLINK_PATTERN regex: {e}");
    never_matching_regex()
  })
});

/// Existing anchors (with their contents) and any other tag are copied
/// verbatim so URLs in attributes or link text are never wrapped twice.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?is)<a\b.*?</a>|<[^>]*>").unwrap_or_else(|e| {
    error!("Failed to compile PROTECTED regex: {e}");
    never_matching_regex()
  })
});

/// Wrap bare `http(s)://` URLs in anchors.
///
/// Trailing sentence punctuation is kept outside the link.
#[must_use]
pub fn autolink(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut copied = 0;

  for protected in PROTECTED.find_iter(html) {
    out.push_str(&link_text(&html[copied..protected.start()]));
    out.push_str(protected.as_str());
    copied = protected.end();
  }
  out.push_str(&link_text(&html[copied..]));
  out
}

fn link_text(text: &str) -> String {
  AUTOLINK_PATTERN
    .replace_all(text, |caps: &Captures| {
      let found = &caps[1];
      let url = found.trim_end_matches(['.', ',', ';', ':', '!', '?']);
      let trailing = &found[url.len()..];
      format!("<a href=\"{url}\">{url}</a>{trailing}")
    })
    .into_owned()
}
