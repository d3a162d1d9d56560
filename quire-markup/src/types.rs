//! Types for quire-markup public API and internal use.
use serde::{Deserialize, Serialize};

/// A numbered heading as it was rendered into a chapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
  /// Displayed number, e.g. `2.1.3`.
  pub number: String,
  /// Heading level (1-6).
  pub level:  u8,
  /// Visible heading text with all markup removed.
  pub text:   String,
  /// Anchor id of the heading element: the custom `{#id}` when given,
  /// otherwise the number.
  pub id:     String,
}

/// Result of rendering one chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterResult {
  /// Rendered HTML output.
  pub html: String,

  /// Every heading in document order (for `ToC`, navigation, etc).
  pub headings: Vec<Heading>,

  /// Title of the chapter, if found (the first level-1 heading).
  pub title: Option<String>,

  /// Non-fatal problems hit while rendering, such as images whose size
  /// could not be read.
  pub warnings: Vec<String>,
}
