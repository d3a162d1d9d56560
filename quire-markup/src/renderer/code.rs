use std::{
  fmt::Write,
  panic::{AssertUnwindSafe, catch_unwind},
  sync::LazyLock,
};

use html_escape::encode_double_quoted_attribute;
use log::error;
use regex::Regex;

use super::{ChapterRenderer, ConstructKind};
use crate::{
  inline::{escape_angle_brackets, escape_html},
  utils::never_matching_regex,
};

const SPAN_CLOSE: &str = "</span>";

static SPAN_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<span\b[^>]*>|</span>").unwrap_or_else(|e| {
    error!("Failed to compile SPAN_TAG regex: {e}");
    never_matching_regex()
  })
});

/// Close every span still open at a line break and reopen it on the next
/// line, so each line of the listing is balanced on its own. Multi-line
/// comments and embedded stylesheets are the usual offenders.
fn split_multiline_spans(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut open: Vec<&str> = Vec::new();
  let mut copied = 0;

  for tag in SPAN_TAG.find_iter(html) {
    copy_text(&mut out, &html[copied..tag.start()], &open);
    if tag.as_str() == SPAN_CLOSE {
      open.pop();
    } else {
      open.push(tag.as_str());
    }
    out.push_str(tag.as_str());
    copied = tag.end();
  }
  copy_text(&mut out, &html[copied..], &open);

  out
}

fn copy_text(out: &mut String, text: &str, open: &[&str]) {
  let mut lines = text.split('\n');
  if let Some(first) = lines.next() {
    out.push_str(first);
  }
  for line in lines {
    out.push_str(&SPAN_CLOSE.repeat(open.len()));
    out.push('\n');
    open.iter().for_each(|tag| out.push_str(tag));
    out.push_str(line);
  }
}

/// A close tag at the very start of a line belongs to a span opened on an
/// earlier line.
fn drop_stray_close(line: &str) -> String {
  if line.trim_start().starts_with(SPAN_CLOSE) {
    line.replacen(SPAN_CLOSE, "", 1)
  } else {
    line.to_string()
  }
}

impl ChapterRenderer<'_> {
  pub(super) fn render_code(
    &mut self,
    code: &str,
    info: Option<&str>,
    _escaped: bool,
  ) -> String {
    let prefix = self.state.before_construct(ConstructKind::Code, None);

    let Some(lang) = info.and_then(|info| info.split_whitespace().next())
    else {
      return format!(
        "{prefix}<div class=\"code\"><pre><code>{}</code></pre></div>\n",
        escape_html(code, true)
      );
    };

    if lang == "ascii" {
      return format!(
        "{prefix}<div class=\"code code-ascii\"><pre>{}</pre></div>\n",
        escape_angle_brackets(code)
      );
    }

    let highlighted = split_multiline_spans(&self.highlight(code, lang));
    let mut rows = String::new();
    for (idx, line) in highlighted.split('\n').enumerate() {
      let line = drop_stray_close(line.strip_suffix('\r').unwrap_or(line));
      let _ = write!(
        rows,
        "<tr><td class=\"line-number\" data-pseudo-content=\"{}\"></td>\
         <td><pre>{line}</pre></td></tr>",
        idx + 1
      );
    }

    format!(
      "{prefix}<div class=\"code code-{}\"><table \
       class=\"code-table\">{rows}</table></div>\n",
      encode_double_quoted_attribute(lang)
    )
  }

  /// Highlight `code`, degrading to escaped plain text when no highlighter
  /// is configured or the highlighter fails.
  fn highlight(&mut self, code: &str, lang: &str) -> String {
    let options = self.options;
    let plain = || escape_html(&code.replace('\t', &options.tab_replace), true);
    let Some(manager) = self.syntax else {
      return plain();
    };

    let highlighted =
      catch_unwind(AssertUnwindSafe(|| manager.highlight_code(code, lang)));
    match highlighted {
      Ok(Ok(html)) => html,
      Ok(Err(e)) => {
        let fallback = plain();
        self.warn(format!("Unable to highlight {lang} listing: {e}"));
        fallback
      },
      Err(_) => {
        let fallback = plain();
        self.warn(format!("Highlighter panicked on {lang} listing"));
        fallback
      },
    }
  }
}
