//! Construct renderers for book-style HTML.
//!
//! A parser walks the document depth-first and calls one
//! [`ConstructRenderer`] method per construct, handing over the HTML already
//! rendered for the construct's children. [`ChapterRenderer`] is the
//! implementation used for chapters: it numbers headings, groups consecutive
//! paragraphs, turns images into figures, lays out code listings as numbered
//! tables and pulls citations out of block quotes.
//!
//! A renderer holds the state of exactly one document. Create a new one for
//! every document.
mod code;
mod figure;
mod heading;
mod quote;
pub mod state;

use html_escape::encode_double_quoted_attribute;
use log::debug;

pub use self::state::{ConstructKind, RenderState};
use crate::{
  inline::{
    clean_url,
    escape_html,
    interpolate_definition,
    interpolate_references,
    is_definition,
    prevent_widow,
  },
  probe::DimensionProber,
  processor::types::RenderOptions,
  syntax::SyntaxManager,
  types::Heading,
};

/// Paragraph text starting with one of these tags is still wrapped in `<p>`;
/// any other leading tag means the content is already block markup.
const INLINE_LEADING_TAGS: [&str; 4] = ["<em", "<del", "<a ", "<strong"];

/// One method per construct. Every method receives its children already
/// rendered and returns the construct's HTML fragment, which the caller
/// concatenates in document order.
pub trait ConstructRenderer {
  fn heading(&mut self, text: &str, level: u8) -> String;
  fn paragraph(&mut self, text: &str) -> String;
  fn blockquote(&mut self, quote: &str) -> String;
  /// `escaped` is accepted for parser compatibility; the raw code is always
  /// what gets highlighted.
  fn code(&mut self, code: &str, info: Option<&str>, escaped: bool) -> String;
  fn html(&mut self, html: &str) -> String;
  fn hr(&mut self) -> String;
  fn list(&mut self, body: &str, ordered: bool, start: usize) -> String;
  fn list_item(&mut self, text: &str) -> String;
  fn checkbox(&mut self, checked: bool) -> String;
  fn table(&mut self, header: &str, body: &str) -> String;
  fn table_row(&mut self, content: &str) -> String;
  fn table_cell(&mut self, content: &str, header: bool) -> String;
  fn image(&mut self, href: &str, title: Option<&str>, alt: &str) -> String;
  fn link(&mut self, href: &str, title: Option<&str>, text: &str) -> String;
  fn strong(&mut self, text: &str) -> String;
  fn em(&mut self, text: &str) -> String;
  fn codespan(&mut self, text: &str) -> String;
  fn br(&mut self) -> String;
  fn del(&mut self, text: &str) -> String;
  fn text(&mut self, text: &str) -> String;

  /// Called before the children of a blockquote or list item are rendered.
  fn enter_container(&mut self) {}

  /// Called after the children of a blockquote or list item, before the
  /// container's own method.
  fn leave_container(&mut self) {}

  /// Called once with the whole document to close anything still open.
  fn finish(&mut self, html: String) -> String;
}

/// Renderer for one chapter.
pub struct ChapterRenderer<'a> {
  state:    RenderState,
  options:  &'a RenderOptions,
  syntax:   Option<&'a SyntaxManager>,
  prober:   Option<&'a dyn DimensionProber>,
  headings: Vec<Heading>,
  warnings: Vec<String>,

  /// Prefixes earned by table rows and cells. Those are rendered before
  /// their table, so the prefixes are emitted in front of it instead.
  hoisted: String,
}

impl<'a> ChapterRenderer<'a> {
  #[must_use]
  pub fn new(options: &'a RenderOptions) -> Self {
    Self {
      state: RenderState::new(options.chapter),
      options,
      syntax: None,
      prober: None,
      headings: Vec::new(),
      warnings: Vec::new(),
      hoisted: String::new(),
    }
  }

  /// Highlight code listings with `manager`.
  #[must_use]
  pub const fn with_syntax(mut self, manager: &'a SyntaxManager) -> Self {
    self.syntax = Some(manager);
    self
  }

  /// Read figure sizes with `prober`.
  #[must_use]
  pub fn with_prober(mut self, prober: &'a dyn DimensionProber) -> Self {
    self.prober = Some(prober);
    self
  }

  #[must_use]
  pub const fn state(&self) -> &RenderState {
    &self.state
  }

  /// Headings rendered so far.
  #[must_use]
  pub fn headings(&self) -> &[Heading] {
    &self.headings
  }

  /// Warnings collected so far.
  #[must_use]
  pub fn warnings(&self) -> &[String] {
    &self.warnings
  }

  /// Consume the renderer, keeping what it collected.
  #[must_use]
  pub fn into_parts(self) -> (Vec<Heading>, Vec<String>) {
    (self.headings, self.warnings)
  }

  fn warn(&mut self, message: String) {
    log::warn!("{message}");
    self.warnings.push(message);
  }

  const fn void_close(&self) -> &'static str {
    if self.options.xhtml { " /" } else { "" }
  }

  fn prefix(&mut self, kind: ConstructKind) -> &'static str {
    self.state.before_construct(kind, None)
  }
}

impl ConstructRenderer for ChapterRenderer<'_> {
  fn heading(&mut self, text: &str, level: u8) -> String {
    self.render_heading(text, level)
  }

  fn paragraph(&mut self, text: &str) -> String {
    let prefix = self.prefix(ConstructKind::Paragraph);
    let trimmed = text.trim();

    if trimmed.starts_with('<')
      && !INLINE_LEADING_TAGS
        .iter()
        .any(|tag| trimmed.starts_with(tag))
    {
      return format!("{prefix}{text}");
    }

    if is_definition(text) {
      return format!(
        "{prefix}<span class=\"footnote\">{}</span>\n",
        interpolate_definition(text)
      );
    }

    format!("{prefix}<p>{text}</p>\n")
  }

  fn blockquote(&mut self, quote: &str) -> String {
    self.render_blockquote(quote)
  }

  fn code(&mut self, code: &str, info: Option<&str>, escaped: bool) -> String {
    self.render_code(code, info, escaped)
  }

  fn html(&mut self, html: &str) -> String {
    let prefix = self.prefix(ConstructKind::Html);
    format!("{prefix}{html}")
  }

  fn hr(&mut self) -> String {
    let prefix = self.prefix(ConstructKind::Hr);
    format!("{prefix}<hr{}>", self.void_close())
  }

  fn list(&mut self, body: &str, ordered: bool, start: usize) -> String {
    let prefix = self.prefix(ConstructKind::List);
    let tag = if ordered { "ol" } else { "ul" };
    let start = if ordered && start != 1 {
      format!(" start=\"{start}\"")
    } else {
      String::new()
    };
    format!("{prefix}<{tag}{start}>\n{body}</{tag}>\n")
  }

  fn list_item(&mut self, text: &str) -> String {
    let prefix = self.prefix(ConstructKind::ListItem);
    format!("{prefix}<li>{text}</li>\n")
  }

  fn checkbox(&mut self, checked: bool) -> String {
    let prefix = self.prefix(ConstructKind::Checkbox);
    let checked = if checked { "checked=\"\" " } else { "" };
    format!(
      "{prefix}<input {checked}disabled=\"\" type=\"checkbox\"{}> ",
      self.void_close()
    )
  }

  fn table(&mut self, header: &str, body: &str) -> String {
    let hoisted = std::mem::take(&mut self.hoisted);
    let prefix = self.prefix(ConstructKind::Table);
    let body = if body.is_empty() {
      String::new()
    } else {
      format!("<tbody>{body}</tbody>")
    };
    format!(
      "{hoisted}{prefix}<table>\n<thead>\n{header}</thead>\n{body}</table>\n"
    )
  }

  fn table_row(&mut self, content: &str) -> String {
    let prefix = self.prefix(ConstructKind::TableRow);
    self.hoisted.push_str(prefix);
    format!("<tr>\n{content}</tr>\n")
  }

  fn table_cell(&mut self, content: &str, header: bool) -> String {
    let prefix = self.prefix(ConstructKind::TableCell);
    self.hoisted.push_str(prefix);
    let tag = if header { "th" } else { "td" };
    format!("<{tag}>{content}</{tag}>\n")
  }

  fn image(&mut self, href: &str, title: Option<&str>, alt: &str) -> String {
    self.render_image(href, title, alt)
  }

  fn link(&mut self, href: &str, title: Option<&str>, text: &str) -> String {
    let prefix = self.prefix(ConstructKind::Link);

    if text.contains("iframe") {
      return format!("{prefix}{text}");
    }

    let Some(href) = clean_url(
      self.options.sanitize,
      self.options.base_url.as_deref(),
      href,
    ) else {
      debug!("Dropping link target, rendering text only");
      return format!("{prefix}{text}");
    };

    let title = title
      .filter(|title| !title.is_empty())
      .map(|title| {
        format!(" title=\"{}\"", encode_double_quoted_attribute(title))
      })
      .unwrap_or_default();

    format!(
      "{prefix}<a href=\"{}\"{title}>{text}</a>",
      escape_html(&href, false)
    )
  }

  fn strong(&mut self, text: &str) -> String {
    let prefix = self.prefix(ConstructKind::Strong);
    format!("{prefix}<strong>{text}</strong>")
  }

  fn em(&mut self, text: &str) -> String {
    let prefix = self.prefix(ConstructKind::Em);
    format!("{prefix}<em>{text}</em>")
  }

  fn codespan(&mut self, text: &str) -> String {
    let prefix = self.prefix(ConstructKind::Codespan);
    format!("{prefix}<code>{text}</code>")
  }

  fn br(&mut self) -> String {
    let prefix = self.prefix(ConstructKind::Br);
    format!("{prefix} <br{}>", self.void_close())
  }

  fn del(&mut self, text: &str) -> String {
    let prefix = self.prefix(ConstructKind::Del);
    format!("{prefix}<del>{text}</del>")
  }

  fn text(&mut self, text: &str) -> String {
    let prefix = self.prefix(ConstructKind::Text);
    format!("{prefix}{}", interpolate_references(&prevent_widow(text)))
  }

  fn enter_container(&mut self) {
    self.state.enter_container();
  }

  fn leave_container(&mut self) {
    self.state.leave_container();
  }

  fn finish(&mut self, html: String) -> String {
    let mut html = html;
    if !self.hoisted.is_empty() {
      // Rows without an enclosing table; nothing left to put them in front of.
      html.push_str(&std::mem::take(&mut self.hoisted));
    }
    self.state.finish(html)
  }
}
