//! Chapter processing.
//!
//! - [`core`]: `ChapterProcessor` implementation and the render pipeline
//! - [`walk`]: comrak tree walk driving a `ConstructRenderer`
//! - [`process`]: High-level processing functions with error recovery
//! - [`types`]: Configuration and processor types
pub mod core;
pub mod process;
pub mod types;
pub mod walk;

pub use process::{
  process_markdown_file,
  process_markdown_string,
  process_with_recovery,
};
pub use types::{ChapterProcessor, RenderOptions};
pub use walk::{render_document, render_inline_markdown};
