#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use std::path::Path;

use quire_markup::{
  ChapterProcessor,
  RenderOptions,
  probe::{DimensionProber, ImageSize, ProbeError, ProbeResult},
};

/// Fails every probe, as if no image exists on disk.
struct Unreadable;

impl DimensionProber for Unreadable {
  fn probe(&self, path: &Path) -> ProbeResult<ImageSize> {
    Err(ProbeError::Unreadable {
      path:   path.display().to_string(),
      reason: "no such file".to_string(),
    })
  }
}

/// A prober that fails the test when called.
struct MustNotProbe;

impl DimensionProber for MustNotProbe {
  fn probe(&self, path: &Path) -> ProbeResult<ImageSize> {
    panic!("unexpected probe of {}", path.display());
  }
}

#[cfg(feature = "image-probe")]
fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
  image::RgbImage::new(width, height)
    .save(dir.join(name))
    .expect("write png fixture");
}

#[cfg(feature = "image-probe")]
#[test]
fn test_probed_figure_from_disk() {
  let dir = tempfile::tempdir().expect("tempdir");
  write_png(dir.path(), "wide.png", 800, 400);
  write_png(dir.path(), "icon.png", 320, 240);

  let processor = ChapterProcessor::new(RenderOptions {
    highlight_code: false,
    ..RenderOptions::for_chapter(1, dir.path())
  });
  let result = processor.render(
    "![Harbour](wide.png \"The harbour at dawn\")\n\n![Icon](icon.png)\n",
  );

  assert!(result.warnings.is_empty(), "{:?}", result.warnings);
  assert!(result.html.contains(
    "<img alt=\"Harbour\" src=\"wide.png\" width=\"800\" height=\"400\" \
     loading=\"lazy\">"
  ));
  assert!(
    result
      .html
      .contains("<div class=\"ratio\" style=\"padding-top: 50.000000%;\">")
  );
  assert!(
    result
      .html
      .contains("<figcaption><p>The harbour at dawn</p></figcaption>")
  );
  assert!(result.html.contains("<div class=\"image no-caption small\">"));
  assert!(result.html.contains("padding-top: 75.000000%;"));
}

#[test]
fn test_figure_paragraph_is_not_wrapped() {
  let processor = ChapterProcessor::new(RenderOptions {
    highlight_code: false,
    ..RenderOptions::default()
  })
  .with_prober(Box::new(Unreadable));
  let result = processor.render("Text.\n\n![Alt](missing.png)\n\nMore.\n");

  assert!(
    result
      .html
      .contains("<p>Text.</p>\n<figure><div class=\"image no-caption\">")
  );
  assert!(!result.html.contains("<p><figure>"));
  assert_eq!(result.warnings.len(), 1);
  assert!(result.warnings[0].contains("missing.png"));
  assert_eq!(
    result.html.matches("<div class=\"paragraphs\">").count(),
    1,
    "paragraphs around a figure share one group"
  );
}

#[test]
fn test_video_embed_is_not_probed() {
  let processor = ChapterProcessor::new(RenderOptions {
    highlight_code: false,
    ..RenderOptions::default()
  })
  .with_prober(Box::new(MustNotProbe));
  let result = processor.render(
    "![Talk](https://www.youtube.com/watch?v=abc123 \"Conference talk\")\n",
  );

  assert!(
    result
      .html
      .contains("<iframe src=\"https://www.youtube.com/embed/abc123\"")
  );
  assert!(result.html.contains("padding-top: 56.25%;"));
  assert!(result.warnings.is_empty());
}

#[test]
fn test_caption_markdown_and_credit() {
  let processor = ChapterProcessor::new(RenderOptions {
    highlight_code: false,
    ..RenderOptions::default()
  })
  .with_prober(Box::new(Unreadable));
  let result = processor.render(
    "![Dunes](dunes.jpg \"Dunes at *noon* Credit: \
     https://photos.example/ana\")\n",
  );

  assert!(result.html.contains(
    "<figcaption><p>Dunes at <em>noon</em></p><footer><a \
      href=\"https://photos.example/ana\">https://photos.example/ana</a>\
     </footer></figcaption>"
  ));
}

#[test]
fn test_credit_at_start_stays_in_caption() {
  let processor = ChapterProcessor::new(RenderOptions {
    highlight_code: false,
    ..RenderOptions::default()
  })
  .with_prober(Box::new(Unreadable));
  let result = processor.render("![x](x.png \"credit: nobody\")\n");
  assert!(
    result
      .html
      .contains("<figcaption><p>credit: nobody</p></figcaption>")
  );
  assert!(!result.html.contains("<footer>"));
}
