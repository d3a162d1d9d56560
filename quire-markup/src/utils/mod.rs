use std::sync::LazyLock;

pub mod codeblock;

use log::error;
use regex::Regex;

use self::codeblock::FenceTracker;

/// A footnote definition at the start of a line: `[^label]:`.
static FOOTNOTE_DEFINITION_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^ {0,3}\[\^[^\]]+\]:").unwrap_or_else(|e| {
    error!("Failed to compile FOOTNOTE_DEFINITION_LINE regex: {e}");
    never_matching_regex()
  })
});

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<[^>]*>").unwrap_or_else(|e| {
    error!("Failed to compile HTML_TAG regex: {e}");
    never_matching_regex()
  })
});

/// Escape footnote definitions so the parser keeps them as paragraph text.
///
/// A definition such as `[^1]: Explanation.` is otherwise a valid link
/// reference definition and would be swallowed before the paragraph renderer
/// ever sees it. Lines inside fenced code blocks are left alone.
#[must_use]
pub fn protect_footnote_definitions(markdown: &str) -> String {
  let mut output = String::with_capacity(markdown.len() + 16);
  let mut fences = FenceTracker::new();

  for line in markdown.split_inclusive('\n') {
    let inside = fences.in_code_block();
    fences = fences.process_line(line);

    if !inside && !fences.in_code_block() {
      if let Some(found) = FOOTNOTE_DEFINITION_LINE.find(line) {
        let bracket = found.as_str().len() - found.as_str().trim_start().len();
        output.push_str(&line[..bracket]);
        output.push('\\');
        output.push_str(&line[bracket..]);
        continue;
      }
    }
    output.push_str(line);
  }

  output
}

/// Remove every tag from an HTML fragment, leaving its text content.
#[must_use]
pub fn strip_tags(html: &str) -> String {
  HTML_TAG.replace_all(html, "").into_owned()
}

/// Create a regex that never matches anything.
///
/// Used as a fallback when a static pattern fails to compile, so a broken
/// pattern disables one feature instead of taking the render down.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::expect_used,
      reason = "This pattern is guaranteed to be valid"
    )]
    Regex::new(r"^\b$").expect("regex pattern ^\\b$ should always compile")
  })
}
