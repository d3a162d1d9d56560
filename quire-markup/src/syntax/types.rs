//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};
use crate::inline::escape_html;

/// Trait for syntax highlighting backends.
///
/// Implementations turn source text into HTML where every highlighted token
/// is wrapped as `<span class="hljs-{category}">…</span>`. Plain text must
/// be HTML-escaped. A token that spans several lines may keep its span open
/// across the newline; the code listing renderer repairs `hljs-comment` and
/// `css` spans of that shape.
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Highlight code, restricted to exactly the given language.
  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String>;
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Whether to fall back to escaped plain text for unsupported languages
  pub fallback_to_plain: bool,

  /// Replacement for hard tabs in listings.
  pub tab_replace: String,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let language_aliases = [
      ("js", "javascript"),
      ("ts", "typescript"),
      ("py", "python"),
      ("rb", "ruby"),
      ("sh", "bash"),
      ("shell", "bash"),
      ("yml", "yaml"),
      ("md", "markdown"),
      ("rs", "rust"),
    ]
    .into_iter()
    .map(|(alias, target)| (alias.to_string(), target.to_string()))
    .collect();

    Self {
      language_aliases,
      fallback_to_plain: true,
      tab_replace: "\t".to_string(),
    }
  }
}

/// High-level syntax highlighting manager.
///
/// Wraps a backend with alias resolution, tab replacement and the plain-text
/// fallback.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl std::fmt::Debug for SyntaxManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SyntaxManager")
      .field("highlighter", &self.highlighter.name())
      .field("config", &self.config)
      .finish()
  }
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Create a new syntax manager with the default configuration
  #[must_use]
  pub fn with_highlighter(highlighter: Box<dyn SyntaxHighlighter>) -> Self {
    Self::new(highlighter, SyntaxConfig::default())
  }

  /// Get the underlying highlighter
  #[must_use]
  pub fn highlighter(&self) -> &dyn SyntaxHighlighter {
    self.highlighter.as_ref()
  }

  /// Get the configuration
  #[must_use]
  pub const fn config(&self) -> &SyntaxConfig {
    &self.config
  }

  /// Update the tab replacement string.
  pub fn set_tab_replace(&mut self, tab_replace: impl Into<String>) {
    self.config.tab_replace = tab_replace.into();
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let lowered = language.to_lowercase();
    self
      .config
      .language_aliases
      .get(&lowered)
      .cloned()
      .unwrap_or(lowered)
  }

  /// Highlight code with alias resolution, tab replacement and fallback.
  ///
  /// # Errors
  ///
  /// Returns an error when the backend fails, or when the language is not
  /// supported and the plain-text fallback is disabled.
  pub fn highlight_code(
    &self,
    code: &str,
    language: &str,
  ) -> SyntaxResult<String> {
    let resolved_language = self.resolve_language(language);
    let code = if self.config.tab_replace == "\t" {
      code.to_string()
    } else {
      code.replace('\t', &self.config.tab_replace)
    };

    if self.highlighter.supports_language(&resolved_language) {
      return self.highlighter.highlight(&code, &resolved_language);
    }

    if self.config.fallback_to_plain {
      log::debug!(
        "{} does not know '{resolved_language}', rendering plain text",
        self.highlighter.name()
      );
      return Ok(escape_html(&code, true));
    }

    Err(SyntaxError::UnsupportedLanguage(resolved_language))
  }
}
