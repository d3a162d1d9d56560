//! # Quire - book-style Markdown rendering
//!
//! Renders Markdown chapters into HTML for long-form publications: numbered
//! headings, footnotes, captioned figures, highlighted code listings laid out
//! with line numbers and quotations with citations.
//!
//! ## Quick Start
//!
//! ```rust
//! use quire_markup::{ChapterProcessor, RenderOptions};
//!
//! let processor =
//!   ChapterProcessor::new(RenderOptions::for_chapter(3, "book"));
//! let result = processor.render(
//!   "# Harbours\n\n## Tides\n\nWater[^1] rises.\n\n[^1]: Twice a day.",
//! );
//!
//! assert_eq!(result.title.as_deref(), Some("Harbours"));
//! assert_eq!(result.headings[1].number, "3.1");
//! ```
//!
//! ## Features
//!
//! - **Stateful construct rendering** through [`ConstructRenderer`], driven
//!   by a `comrak` tree walk
//! - **Paragraph grouping**: consecutive paragraphs share one
//!   `<div class="paragraphs">`
//! - **Figures** sized from the image file, with captions and credits
//! - **Code listings** highlighted by `syntect`, one table row per line
//! - **Error recovery**: failed probes and highlighter errors become warnings
//!
//! ## Custom collaborators
//!
//! ```rust
//! use quire_markup::{
//!   ChapterProcessor,
//!   RenderOptions,
//!   probe::{DimensionProber, ImageSize, ProbeResult},
//! };
//!
//! struct Square;
//!
//! impl DimensionProber for Square {
//!   fn probe(&self, _path: &std::path::Path) -> ProbeResult<ImageSize> {
//!     Ok(ImageSize { width: 300, height: 300 })
//!   }
//! }
//!
//! let processor = ChapterProcessor::new(RenderOptions::default())
//!   .with_prober(Box::new(Square));
//! let result = processor.render("![Logo](logo.png)");
//! assert!(result.html.contains("image no-caption small"));
//! ```

pub mod inline;
pub mod probe;
pub mod processor;
pub mod renderer;
pub mod syntax;
mod types;
pub mod utils;

pub use crate::{
  processor::{
    ChapterProcessor,
    RenderOptions,
    process_markdown_file,
    process_markdown_string,
    process_with_recovery,
  },
  renderer::{ChapterRenderer, ConstructKind, ConstructRenderer, RenderState},
  types::{ChapterResult, Heading},
};
