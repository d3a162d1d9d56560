//! Main processing functions for chapter content.
use std::{fs, io, path::Path};

use log::error;

use super::types::{ChapterProcessor, RenderOptions};
use crate::types::ChapterResult;

/// Fallback markup for a chapter that could not be rendered at all.
const CRITICAL_ERROR_HTML: &str =
  "<div class=\"error\">Critical error processing markdown content</div>";

/// Render a chapter with panic recovery.
///
/// A panic anywhere in rendering is logged and replaced by an error block, so
/// one broken chapter never takes down a whole book build.
///
/// # Arguments
///
/// * `processor` - The configured chapter processor
/// * `content` - The raw markdown content to process
#[must_use]
pub fn process_with_recovery(
  processor: &ChapterProcessor,
  content: &str,
) -> ChapterResult {
  match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor.render(content)
  })) {
    Ok(result) => result,
    Err(panic_err) => {
      let message = panic_message(panic_err.as_ref());
      error!("Panic during chapter processing: {message}");
      ChapterResult {
        html:     CRITICAL_ERROR_HTML.to_string(),
        headings: Vec::new(),
        title:    None,
        warnings: vec![format!("Rendering failed: {message}")],
      }
    },
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  payload
    .downcast_ref::<String>()
    .cloned()
    .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_string()))
    .unwrap_or_else(|| "unknown error".to_string())
}

/// Render a markdown string with a throwaway processor.
#[must_use]
pub fn process_markdown_string(
  content: &str,
  options: &RenderOptions,
) -> ChapterResult {
  let processor = ChapterProcessor::new(options.clone());
  process_with_recovery(&processor, content)
}

/// Read and render a chapter file. Unless already set, images are resolved
/// against the file's directory.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn process_markdown_file(
  path: &Path,
  options: &RenderOptions,
) -> io::Result<ChapterResult> {
  let content = fs::read_to_string(path)?;
  let mut options = options.clone();
  if options.basedir.as_os_str().is_empty() {
    if let Some(parent) = path.parent() {
      options.basedir = parent.to_path_buf();
    }
  }
  Ok(process_markdown_string(&content, &options))
}
