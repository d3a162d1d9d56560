//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! Syntect's own HTML generators either inline theme colors or nest one span
//! per scope atom. Listings here are styled by stylesheet classes in the
//! highlight.js vocabulary, so this backend walks the scope stack itself and
//! emits one flat `hljs-{category}` span per token run.

use std::sync::OnceLock;

use syntect::{
  parsing::{ParseState, Scope, ScopeStack, SyntaxSet},
  util::LinesWithEndings,
};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};
use crate::inline::escape_html;

/// Syntect-based syntax highlighter
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
  /// Get the syntect SyntaxSet.
  fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
  }
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    Self::syntax_set()
      .syntaxes()
      .iter()
      .flat_map(|syntax| {
        std::iter::once(syntax.name.to_lowercase())
          .chain(syntax.file_extensions.iter().map(|ext| ext.to_lowercase()))
      })
      .collect()
  }

  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String> {
    let syntax_set = Self::syntax_set();
    let syntax = syntax_set
      .find_syntax_by_token(language)
      .ok_or_else(|| SyntaxError::UnsupportedLanguage(language.to_string()))?;

    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut spans = SpanWriter::default();

    for line in LinesWithEndings::from(code) {
      let ops = state
        .parse_line(line, syntax_set)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;

      let mut cursor = 0;
      for (offset, op) in ops {
        if offset > cursor {
          spans.push(&line[cursor..offset], category(&stack));
          cursor = offset;
        }
        stack
          .apply(&op)
          .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
      }
      if cursor < line.len() {
        spans.push(&line[cursor..], category(&stack));
      }
    }

    Ok(spans.finish())
  }
}

/// Category of the innermost scope that has a highlight.js equivalent.
fn category(stack: &ScopeStack) -> Option<&'static str> {
  stack
    .as_slice()
    .iter()
    .rev()
    .find_map(|scope: &Scope| hljs_category(&scope.build_string()))
}

fn hljs_category(scope: &str) -> Option<&'static str> {
  let mut atoms = scope.split('.');
  let first = atoms.next()?;
  let second = atoms.next().unwrap_or_default();
  let third = atoms.next().unwrap_or_default();

  let category = match (first, second) {
    ("comment", _) => "comment",
    ("string", "regexp") => "regexp",
    ("string", _) => "string",
    ("constant", "numeric") => "number",
    ("constant", "character") => "char",
    ("constant", _) => "literal",
    ("keyword", "operator") => "operator",
    ("keyword" | "storage", _) => "keyword",
    ("entity", "name") if third == "tag" => "name",
    ("entity", "name") => "title",
    ("entity", "other") => "attr",
    ("support", "type" | "class") => "type",
    ("support", _) => "built_in",
    ("variable", "parameter") => "params",
    ("variable", _) => "variable",
    ("markup", "heading") => "section",
    ("markup", "bold") => "strong",
    ("markup", "italic") => "emphasis",
    ("markup", "quote") => "quote",
    ("markup", "inserted") => "addition",
    ("markup", "deleted") => "deletion",
    ("meta", "preprocessor") => "meta",
    _ => return None,
  };
  Some(category)
}

/// Accumulates consecutive text of the same category into one span.
/// Newlines are always written outside spans, so every line of the output is
/// balanced on its own.
#[derive(Default)]
struct SpanWriter {
  out:      String,
  current:  Option<&'static str>,
  buffered: String,
}

impl SpanWriter {
  fn push(&mut self, text: &str, category: Option<&'static str>) {
    for piece in text.split_inclusive('\n') {
      let (content, newline) = piece
        .strip_suffix('\n')
        .map_or((piece, false), |content| (content, true));

      if !content.is_empty() {
        if category != self.current {
          self.flush();
          self.current = category;
        }
        self.buffered.push_str(&escape_html(content, true));
      }

      if newline {
        self.flush();
        self.out.push('\n');
      }
    }
  }

  fn flush(&mut self) {
    if self.buffered.is_empty() {
      return;
    }
    match self.current {
      Some(category) => {
        self.out.push_str("<span class=\"hljs-");
        self.out.push_str(category);
        self.out.push_str("\">");
        self.out.push_str(&self.buffered);
        self.out.push_str("</span>");
      },
      None => self.out.push_str(&self.buffered),
    }
    self.buffered.clear();
  }

  fn finish(mut self) -> String {
    self.flush();
    self.out
  }
}

/// Create a Syntect-based syntax manager with configuration
///
/// # Errors
///
/// Currently infallible; the `Result` matches other backend constructors.
pub fn create_syntect_manager(
  config: SyntaxConfig,
) -> SyntaxResult<SyntaxManager> {
  Ok(SyntaxManager::new(Box::new(SyntectHighlighter), config))
}
