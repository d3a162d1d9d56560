//! Type definitions for the chapter processor.
//!
//! # Examples
//!
//! ```
//! use quire_markup::{ChapterProcessor, RenderOptions};
//!
//! let options = RenderOptions {
//!   chapter: 2,
//!   sanitize: true,
//!   ..Default::default()
//! };
//!
//! let processor = ChapterProcessor::new(options);
//! ```

use std::path::PathBuf;

use crate::{probe::DimensionProber, syntax::SyntaxManager};

/// Options for rendering one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct RenderOptions {
  /// Reject `javascript:`, `vbscript:` and `data:` link and image targets.
  pub sanitize: bool,

  /// Optional: Base URL that relative link targets are resolved against.
  pub base_url: Option<String>,

  /// Self-close void elements (`<br />`, `<hr />`, `<img />`, `<input />`).
  pub xhtml: bool,

  /// Directory image paths are resolved against for size probing.
  pub basedir: PathBuf,

  /// Chapter number; seeds heading numbering.
  pub chapter: u32,

  /// Enable syntax highlighting for code listings.
  pub highlight_code: bool,

  /// Replacement for hard tabs in code listings.
  pub tab_replace: String,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      sanitize:       false,
      base_url:       None,
      xhtml:          false,
      basedir:        PathBuf::new(),
      chapter:        1,
      highlight_code: true,
      tab_replace:    "\t".to_string(),
    }
  }
}

impl RenderOptions {
  /// Options for chapter `chapter` with images under `basedir`.
  #[must_use]
  pub fn for_chapter(chapter: u32, basedir: impl Into<PathBuf>) -> Self {
    Self {
      chapter,
      basedir: basedir.into(),
      ..Self::default()
    }
  }
}

/// Renders chapters of a book.
///
/// Immutable once built; every [`ChapterProcessor::render`] call starts from
/// fresh render state, so one processor can render many chapters in turn.
pub struct ChapterProcessor {
  pub(crate) options:        RenderOptions,
  pub(crate) syntax_manager: Option<SyntaxManager>,
  pub(crate) prober:         Option<Box<dyn DimensionProber>>,
}

impl std::fmt::Debug for ChapterProcessor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ChapterProcessor")
      .field("options", &self.options)
      .field("syntax_manager", &self.syntax_manager)
      .field("prober", &self.prober.is_some())
      .finish()
  }
}
