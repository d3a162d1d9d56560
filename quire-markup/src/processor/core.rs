//! Core implementation of the chapter processor.
//!
//! This module contains the main implementation of `ChapterProcessor`: owning
//! the collaborators, preparing the source and assembling the result.
use log::{debug, trace};

use super::{
  types::{ChapterProcessor, RenderOptions},
  walk::render_document,
};
use crate::{
  probe::{DimensionProber, create_default_prober},
  renderer::ChapterRenderer,
  syntax::{SyntaxHighlighter, SyntaxManager, create_default_manager},
  types::ChapterResult,
  utils::protect_footnote_definitions,
};

impl ChapterProcessor {
  /// Create a new `ChapterProcessor` with the given options and the default
  /// highlighter and image prober for the enabled features.
  #[must_use]
  pub fn new(options: RenderOptions) -> Self {
    let syntax_manager = if options.highlight_code {
      create_default_manager()
        .map_err(|e| debug!("Rendering listings without highlighting: {e}"))
        .ok()
    } else {
      None
    };

    let prober = create_default_prober()
      .map_err(|e| debug!("Rendering figures without sizes: {e}"))
      .ok();

    let mut processor = Self {
      options,
      syntax_manager,
      prober,
    };
    processor.sync_tab_replace();
    processor
  }

  /// Highlight listings with `highlighter` instead of the default backend.
  #[must_use]
  pub fn with_highlighter(
    mut self,
    highlighter: Box<dyn SyntaxHighlighter>,
  ) -> Self {
    self.syntax_manager = Some(SyntaxManager::with_highlighter(highlighter));
    self.sync_tab_replace();
    self
  }

  /// Read figure sizes with `prober` instead of the default backend.
  #[must_use]
  pub fn with_prober(mut self, prober: Box<dyn DimensionProber>) -> Self {
    self.prober = Some(prober);
    self
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &RenderOptions {
    &self.options
  }

  /// The syntax manager used for listings, if highlighting is available.
  #[must_use]
  pub const fn syntax_manager(&self) -> Option<&SyntaxManager> {
    self.syntax_manager.as_ref()
  }

  fn sync_tab_replace(&mut self) {
    if let Some(manager) = self.syntax_manager.as_mut() {
      manager.set_tab_replace(self.options.tab_replace.clone());
    }
  }

  /// Render one chapter of markdown.
  ///
  /// Every call uses fresh render state: numbering restarts from the
  /// configured chapter number.
  #[must_use]
  pub fn render(&self, markdown: &str) -> ChapterResult {
    let source = protect_footnote_definitions(markdown);

    let mut renderer = ChapterRenderer::new(&self.options);
    if self.options.highlight_code {
      if let Some(manager) = &self.syntax_manager {
        renderer = renderer.with_syntax(manager);
      }
    }
    if let Some(prober) = &self.prober {
      renderer = renderer.with_prober(prober.as_ref());
    }

    let html = render_document(&source, &mut renderer);
    let (headings, warnings) = renderer.into_parts();
    trace!(
      "Rendered chapter {} with {} headings and {} warnings",
      self.options.chapter,
      headings.len(),
      warnings.len()
    );

    let title = headings
      .iter()
      .find(|heading| heading.level == 1)
      .map(|heading| heading.text.clone());

    ChapterResult {
      html,
      headings,
      title,
      warnings,
    }
  }
}
