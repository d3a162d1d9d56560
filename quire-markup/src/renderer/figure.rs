use std::sync::LazyLock;

use html_escape::encode_double_quoted_attribute;
use log::{debug, error};
use regex::Regex;

use super::{ChapterRenderer, ConstructKind};
use crate::{
  inline::{autolink, clean_url, escape_html},
  probe::ImageSize,
  processor::walk::render_inline_markdown,
  utils::never_matching_regex,
};

const VIDEO_HOST: &str = "youtube.com";
const CREDIT_MARK: &str = "credit:";

/// Video id after a short link, `v/`, `u/x/`, `embed/` or `watch?v=`.
static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r".*(?:youtu.be/|v/|u/\w/|embed/|watch\?v=)([^#&?]*).*")
    .unwrap_or_else(|e| {
      error!("Failed to compile VIDEO_ID regex: {e}");
      never_matching_regex()
    })
});

fn video_embed(href: &str) -> String {
  let id = VIDEO_ID
    .captures(href)
    .and_then(|caps| caps.get(1))
    .map_or("null", |id| id.as_str());

  format!(
    "<div class=\"iframe\"><iframe src=\"https://www.youtube.com/embed/{}\" \
     frameborder=\"0\" allow=\"accelerometer; autoplay; encrypted-media; \
     gyroscope; picture-in-picture\" allowfullscreen></iframe><div \
     class=\"ratio\" style=\"padding-top: 56.25%;\"></div></div>",
    encode_double_quoted_attribute(id)
  )
}

/// Split `Caption credit: Someone` into caption and credit. A title that
/// starts with the marker is all caption.
fn split_credit(title: &str) -> (&str, Option<&str>) {
  // ASCII lowering keeps byte offsets aligned with `title`.
  match title.to_ascii_lowercase().find(CREDIT_MARK) {
    Some(idx) if idx > 0 => (
      title[..idx].trim(),
      Some(title[idx + CREDIT_MARK.len()..].trim()),
    ),
    _ => (title, None),
  }
}

impl ChapterRenderer<'_> {
  pub(super) fn render_image(
    &mut self,
    href: &str,
    title: Option<&str>,
    alt: &str,
  ) -> String {
    let prefix = self.state.before_construct(ConstructKind::Image, None);

    if self.options.sanitize && clean_url(true, None, href).is_none() {
      debug!("Dropping unsafe image source, rendering alt text only");
      return format!("{prefix}{}", escape_html(alt, false));
    }

    let embed = href.contains(VIDEO_HOST);
    let size = if embed { None } else { self.probe(href) };

    let (caption, credit) = split_credit(title.unwrap_or_default());
    let credit = credit
      .map(|credit| format!("<footer>{}</footer>", autolink(credit)))
      .unwrap_or_default();
    let figcaption = if caption.is_empty() {
      String::new()
    } else {
      format!(
        "<figcaption><p>{}</p>{credit}</figcaption>",
        render_inline_markdown(&autolink(caption))
      )
    };

    let mut classes = String::new();
    if caption.is_empty() {
      classes.push_str(" no-caption");
    }
    if size.is_some_and(ImageSize::is_small) {
      classes.push_str(" small");
    }

    let content = if embed {
      video_embed(href)
    } else {
      let dimensions = size
        .map(|size| {
          format!(
            " width=\"{}\" height=\"{}\" loading=\"lazy\"",
            size.width, size.height
          )
        })
        .unwrap_or_default();
      format!(
        "<div class=\"img\"><img alt=\"{}\" src=\"{}\"{dimensions}{}></div>",
        encode_double_quoted_attribute(alt),
        encode_double_quoted_attribute(href),
        self.void_close()
      )
    };
    let ratio = size
      .map(|size| {
        format!(
          "<div class=\"ratio\" style=\"padding-top: {}%;\"></div>",
          size.ratio_percent()
        )
      })
      .unwrap_or_default();

    format!(
      "{prefix}<figure><div \
       class=\"image{classes}\">{content}{ratio}</div>{figcaption}</figure>\n"
    )
  }

  fn probe(&mut self, href: &str) -> Option<ImageSize> {
    let prober = self.prober?;
    // Site-absolute sources still live under the base directory.
    let path = self.options.basedir.join(href.trim_start_matches('/'));
    match prober.probe(&path) {
      Ok(size) if size.width > 0 && size.height > 0 => Some(size),
      Ok(size) => {
        debug!(
          "Ignoring empty size {}x{} of {href}",
          size.width, size.height
        );
        None
      },
      Err(e) => {
        self.warn(format!("Unable to read size of \"{href}\": {e}"));
        None
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::RefCell,
    path::{Path, PathBuf},
  };

  use super::*;
  use crate::{
    probe::{DimensionProber, ProbeError, ProbeResult},
    processor::types::RenderOptions,
    renderer::ConstructRenderer,
  };

  struct FixedProber {
    size:  Option<ImageSize>,
    calls: RefCell<Vec<PathBuf>>,
  }

  impl FixedProber {
    fn new(size: Option<ImageSize>) -> Self {
      Self {
        size,
        calls: RefCell::new(Vec::new()),
      }
    }
  }

  impl DimensionProber for FixedProber {
    fn probe(&self, path: &Path) -> ProbeResult<ImageSize> {
      self.calls.borrow_mut().push(path.to_path_buf());
      self.size.ok_or_else(|| ProbeError::Unreadable {
        path:   path.display().to_string(),
        reason: "missing".to_string(),
      })
    }
  }

  #[test]
  fn test_split_credit() {
    assert_eq!(
      split_credit("Harbour at dawn Credit: Jane Doe"),
      ("Harbour at dawn", Some("Jane Doe"))
    );
    assert_eq!(split_credit("credit: Jane Doe"), ("credit: Jane Doe", None));
    assert_eq!(split_credit("No credit"), ("No credit", None));
  }

  #[test]
  fn test_video_id() {
    assert!(
      video_embed("https://www.youtube.com/watch?v=abc123&t=4")
        .contains("src=\"https://www.youtube.com/embed/abc123\"")
    );
    assert!(
      video_embed("https://www.youtube.com/embed/xyz")
        .contains("/embed/xyz\"")
    );
    assert!(video_embed("https://www.youtube.com/").contains("/embed/null\""));
  }

  #[test]
  fn test_probed_figure() {
    let options = RenderOptions {
      basedir: "book".into(),
      ..RenderOptions::default()
    };
    let prober = FixedProber::new(Some(ImageSize {
      width:  800,
      height: 400,
    }));
    let mut renderer = ChapterRenderer::new(&options).with_prober(&prober);
    let html =
      renderer.image("img/harbour.png", Some("The *harbour*"), "Boats");

    assert_eq!(
      html,
      "<figure><div class=\"image\"><div class=\"img\"><img alt=\"Boats\" \
       src=\"img/harbour.png\" width=\"800\" height=\"400\" \
       loading=\"lazy\"></div><div class=\"ratio\" style=\"padding-top: \
       50.000000%;\"></div></div><figcaption><p>The \
       <em>harbour</em></p></figcaption></figure>\n"
    );
    assert_eq!(prober.calls.borrow().as_slice(), [PathBuf::from(
      "book/img/harbour.png"
    )]);
  }

  #[test]
  fn test_absolute_source_resolved_under_basedir() {
    let options = RenderOptions {
      basedir: "book".into(),
      ..RenderOptions::default()
    };
    let prober = FixedProber::new(Some(ImageSize {
      width:  10,
      height: 10,
    }));
    let mut renderer = ChapterRenderer::new(&options).with_prober(&prober);
    let html = renderer.image("/img/a.png", None, "");

    assert!(html.contains("src=\"/img/a.png\""));
    assert_eq!(prober.calls.borrow().as_slice(), [PathBuf::from(
      "book/img/a.png"
    )]);
  }

  #[test]
  fn test_zero_size_is_not_used() {
    let options = RenderOptions::default();
    for (width, height) in [(0, 300), (300, 0)] {
      let prober = FixedProber::new(Some(ImageSize { width, height }));
      let mut renderer = ChapterRenderer::new(&options).with_prober(&prober);
      let html = renderer.image("blank.png", None, "");

      assert!(html.contains("<img alt=\"\" src=\"blank.png\"></div>"));
      assert!(!html.contains("ratio"));
      assert!(!html.contains("small"));
      assert!(renderer.warnings().is_empty());
    }
  }

  #[test]
  fn test_small_uncaptioned_figure() {
    let options = RenderOptions::default();
    let prober = FixedProber::new(Some(ImageSize {
      width:  400,
      height: 100,
    }));
    let mut renderer = ChapterRenderer::new(&options).with_prober(&prober);
    let html = renderer.image("icon.png", None, "");
    assert!(html.contains("<div class=\"image no-caption small\">"));
    assert!(html.contains("padding-top: 25.000000%;"));
    assert!(!html.contains("figcaption"));
  }

  #[test]
  fn test_probe_failure_warns() {
    let options = RenderOptions::default();
    let prober = FixedProber::new(None);
    let mut renderer = ChapterRenderer::new(&options).with_prober(&prober);
    let html = renderer.image("gone.png", Some("Gone"), "x");

    assert!(html.contains("<img alt=\"x\" src=\"gone.png\"></div>"));
    assert!(!html.contains("ratio"));
    assert_eq!(renderer.warnings().len(), 1);
    assert!(
      renderer.warnings()[0]
        .starts_with("Unable to read size of \"gone.png\"")
    );
  }

  #[test]
  fn test_video_is_not_probed() {
    let options = RenderOptions::default();
    let prober = FixedProber::new(None);
    let mut renderer = ChapterRenderer::new(&options).with_prober(&prober);
    let html =
      renderer.image("https://www.youtube.com/watch?v=abc123", None, "");

    assert!(html.contains("https://www.youtube.com/embed/abc123"));
    assert!(prober.calls.borrow().is_empty());
    assert!(renderer.warnings().is_empty());
  }

  #[test]
  fn test_credit_footer() {
    let options = RenderOptions::default();
    let mut renderer = ChapterRenderer::new(&options);
    let html = renderer.image(
      "a.png",
      Some("Dunes credit: https://example.com/photographer"),
      "",
    );
    assert!(html.contains(
      "<figcaption><p>Dunes</p><footer><a \
       href=\"https://example.com/photographer\">\
       https://example.com/photographer</a></footer></figcaption>"
    ));
  }

  #[test]
  fn test_unsafe_image_source() {
    let options = RenderOptions {
      sanitize: true,
      ..RenderOptions::default()
    };
    let mut renderer = ChapterRenderer::new(&options);
    assert_eq!(
      renderer.image("javascript:alert(1)", None, "a <b>"),
      "a &lt;b&gt;"
    );
  }
}
