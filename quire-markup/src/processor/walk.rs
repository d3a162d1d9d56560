//! Drives a [`ConstructRenderer`] over a comrak syntax tree.
//!
//! The walk is depth-first and renders children before their parent, so
//! every construct method receives finished HTML for its contents. Adjacent
//! text and soft-break nodes are merged into a single `text` call.
use comrak::{
  Arena,
  markdown_to_html,
  nodes::{AstNode, ListType, NodeValue},
  options::Options,
  parse_document,
};
use html_escape::encode_text;
use log::trace;

use crate::renderer::ConstructRenderer;

/// Build the comrak options used for chapters.
fn comrak_options() -> Options<'static> {
  let mut options = Options::default();
  options.extension.table = true;
  options.extension.strikethrough = true;
  options.extension.header_ids = None;
  options.render.r#unsafe = true;
  options
}

/// Parse `markdown` and render it through `renderer`, including the final
/// flush.
pub fn render_document<R: ConstructRenderer>(
  markdown: &str,
  renderer: &mut R,
) -> String {
  let arena = Arena::new();
  let options = comrak_options();
  let root = parse_document(&arena, markdown, &options);

  let html = render_block(root, renderer, false);
  renderer.finish(html)
}

/// Render a short piece of inline markdown, such as a figure caption, to
/// HTML without a surrounding paragraph.
#[must_use]
pub fn render_inline_markdown(markdown: &str) -> String {
  let html = markdown_to_html(markdown, &comrak_options());
  let html = html.trim();
  html
    .strip_prefix("<p>")
    .and_then(|inner| inner.strip_suffix("</p>"))
    .unwrap_or(html)
    .replace("&amp;", "&")
}

fn render_children<'a, R: ConstructRenderer>(
  node: &'a AstNode<'a>,
  renderer: &mut R,
  tight: bool,
) -> String {
  node
    .children()
    .map(|child| render_block(child, renderer, tight))
    .collect()
}

/// Render a block node. `tight` is set for the contents of tight lists, whose
/// paragraphs are emitted as bare inline content.
fn render_block<'a, R: ConstructRenderer>(
  node: &'a AstNode<'a>,
  renderer: &mut R,
  tight: bool,
) -> String {
  match &node.data.borrow().value {
    NodeValue::Paragraph => render_paragraph(node, renderer, tight, false),
    NodeValue::Heading(heading) => {
      let text = render_inlines(node, renderer, false);
      renderer.heading(&text, heading.level)
    },
    NodeValue::BlockQuote => {
      renderer.enter_container();
      let quote = render_children(node, renderer, false);
      renderer.leave_container();
      renderer.blockquote(&quote)
    },
    NodeValue::List(list) => {
      let body = render_children(node, renderer, list.tight);
      renderer.list(&body, list.list_type == ListType::Ordered, list.start)
    },
    NodeValue::Item(_) => {
      renderer.enter_container();
      let text = render_item(node, renderer, tight);
      renderer.leave_container();
      renderer.list_item(&text)
    },
    NodeValue::CodeBlock(block) => {
      let code = block.literal.strip_suffix('\n').unwrap_or(&block.literal);
      let info = Some(block.info.as_str()).filter(|info| !info.is_empty());
      renderer.code(code, info, false)
    },
    NodeValue::HtmlBlock(block) => renderer.html(&block.literal),
    NodeValue::ThematicBreak => renderer.hr(),
    NodeValue::Table(..) => render_table(node, renderer),
    other => {
      trace!("Rendering children of {other:?}");
      render_children(node, renderer, tight)
    },
  }
}

fn render_paragraph<'a, R: ConstructRenderer>(
  node: &'a AstNode<'a>,
  renderer: &mut R,
  tight: bool,
  detect_task: bool,
) -> String {
  let text = render_inlines(node, renderer, detect_task);
  if tight { text } else { renderer.paragraph(&text) }
}

/// Render a list item. A task marker (`[ ]` or `[x]`) opening the item's
/// first paragraph becomes a checkbox.
fn render_item<'a, R: ConstructRenderer>(
  node: &'a AstNode<'a>,
  renderer: &mut R,
  tight: bool,
) -> String {
  let mut out = String::new();
  for (idx, child) in node.children().enumerate() {
    let paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
    if idx == 0 && paragraph {
      out.push_str(&render_paragraph(child, renderer, tight, true));
    } else {
      out.push_str(&render_block(child, renderer, tight));
    }
  }
  out
}

fn render_table<'a, R: ConstructRenderer>(
  node: &'a AstNode<'a>,
  renderer: &mut R,
) -> String {
  let mut header = String::new();
  let mut body = String::new();

  for row in node.children() {
    let NodeValue::TableRow(is_header) = row.data.borrow().value else {
      continue;
    };
    let cells: String = row
      .children()
      .map(|cell| {
        let content = render_inlines(cell, renderer, false);
        renderer.table_cell(&content, is_header)
      })
      .collect();
    let rendered = renderer.table_row(&cells);
    if is_header {
      header.push_str(&rendered);
    } else {
      body.push_str(&rendered);
    }
  }

  renderer.table(&header, &body)
}

/// Split a leading task marker off `text`.
fn task_marker(text: &str) -> Option<(bool, &str)> {
  if let Some(rest) = text.strip_prefix("[ ] ") {
    return Some((false, rest));
  }
  text
    .strip_prefix("[x] ")
    .or_else(|| text.strip_prefix("[X] "))
    .map(|rest| (true, rest))
}

fn render_inlines<'a, R: ConstructRenderer>(
  node: &'a AstNode<'a>,
  renderer: &mut R,
  detect_task: bool,
) -> String {
  let mut out = String::new();
  let mut run = String::new();
  let mut detect_task = detect_task;

  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(text) => {
        run.push_str(text);
        continue;
      },
      NodeValue::SoftBreak => {
        run.push('\n');
        continue;
      },
      _ => {},
    }
    flush_text(&mut run, &mut out, renderer, &mut detect_task);
    out.push_str(&render_inline(child, renderer));
  }
  flush_text(&mut run, &mut out, renderer, &mut detect_task);

  out
}

fn flush_text<R: ConstructRenderer>(
  run: &mut String,
  out: &mut String,
  renderer: &mut R,
  detect_task: &mut bool,
) {
  if std::mem::take(detect_task) && out.is_empty() {
    if let Some((checked, rest)) = task_marker(run) {
      let rest = rest.to_string();
      out.push_str(&renderer.checkbox(checked));
      *run = rest;
    }
  }
  if !run.is_empty() {
    out.push_str(&renderer.text(&encode_text(run)));
    run.clear();
  }
}

fn render_inline<'a, R: ConstructRenderer>(
  node: &'a AstNode<'a>,
  renderer: &mut R,
) -> String {
  match &node.data.borrow().value {
    NodeValue::Emph => {
      let text = render_inlines(node, renderer, false);
      renderer.em(&text)
    },
    NodeValue::Strong => {
      let text = render_inlines(node, renderer, false);
      renderer.strong(&text)
    },
    NodeValue::Strikethrough => {
      let text = render_inlines(node, renderer, false);
      renderer.del(&text)
    },
    NodeValue::Code(code) => renderer.codespan(&encode_text(&code.literal)),
    NodeValue::LineBreak => renderer.br(),
    // Inline tags stay inside their paragraph; they never affect grouping.
    NodeValue::HtmlInline(html) => html.to_string(),
    NodeValue::Link(link) => {
      let text = render_inlines(node, renderer, false);
      let title = Some(link.title.as_str()).filter(|title| !title.is_empty());
      renderer.link(&link.url, title, &text)
    },
    NodeValue::Image(link) => {
      let alt = plain_text(node);
      let title = Some(link.title.as_str()).filter(|title| !title.is_empty());
      renderer.image(&link.url, title, &alt)
    },
    NodeValue::Text(text) => renderer.text(&encode_text(text)),
    NodeValue::SoftBreak => renderer.text("\n"),
    other => {
      trace!("Rendering inline children of {other:?}");
      render_inlines(node, renderer, false)
    },
  }
}

/// Concatenated text content of a subtree, used for image alt text.
fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(code) => text.push_str(&code.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      _ => text.push_str(&plain_text(child)),
    }
  }
  text
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Records the order of construct calls.
  #[derive(Default)]
  struct Recorder {
    calls: Vec<String>,
  }

  impl ConstructRenderer for Recorder {
    fn heading(&mut self, text: &str, level: u8) -> String {
      self.calls.push(format!("heading{level}:{text}"));
      format!("<h{level}>{text}</h{level}>")
    }
    fn paragraph(&mut self, text: &str) -> String {
      self.calls.push(format!("paragraph:{text}"));
      format!("<p>{text}</p>")
    }
    fn blockquote(&mut self, quote: &str) -> String {
      self.calls.push("blockquote".to_string());
      format!("<q>{quote}</q>")
    }
    fn code(
      &mut self,
      code: &str,
      info: Option<&str>,
      _escaped: bool,
    ) -> String {
      self.calls.push(format!("code:{}:{code}", info.unwrap_or("-")));
      String::new()
    }
    fn html(&mut self, html: &str) -> String {
      self.calls.push("html".to_string());
      html.to_string()
    }
    fn hr(&mut self) -> String {
      self.calls.push("hr".to_string());
      "<hr>".to_string()
    }
    fn list(&mut self, body: &str, ordered: bool, start: usize) -> String {
      self.calls.push(format!("list:{ordered}:{start}"));
      format!("<l>{body}</l>")
    }
    fn list_item(&mut self, text: &str) -> String {
      self.calls.push(format!("item:{text}"));
      format!("<li>{text}</li>")
    }
    fn checkbox(&mut self, checked: bool) -> String {
      self.calls.push(format!("checkbox:{checked}"));
      format!("[{checked}]")
    }
    fn table(&mut self, header: &str, body: &str) -> String {
      self.calls.push("table".to_string());
      format!("<t>{header}|{body}</t>")
    }
    fn table_row(&mut self, content: &str) -> String {
      self.calls.push("row".to_string());
      format!("<r>{content}</r>")
    }
    fn table_cell(&mut self, content: &str, header: bool) -> String {
      self.calls.push(format!("cell:{header}:{content}"));
      content.to_string()
    }
    fn image(&mut self, href: &str, title: Option<&str>, alt: &str) -> String {
      self.calls.push(format!("image:{href}:{}:{alt}", title.unwrap_or("-")));
      "<img>".to_string()
    }
    fn link(&mut self, href: &str, _title: Option<&str>, text: &str) -> String {
      self.calls.push(format!("link:{href}:{text}"));
      format!("<a>{text}</a>")
    }
    fn strong(&mut self, text: &str) -> String {
      self.calls.push("strong".to_string());
      format!("<b>{text}</b>")
    }
    fn em(&mut self, text: &str) -> String {
      self.calls.push("em".to_string());
      format!("<i>{text}</i>")
    }
    fn codespan(&mut self, text: &str) -> String {
      self.calls.push(format!("codespan:{text}"));
      format!("<c>{text}</c>")
    }
    fn br(&mut self) -> String {
      self.calls.push("br".to_string());
      "<br>".to_string()
    }
    fn del(&mut self, text: &str) -> String {
      self.calls.push("del".to_string());
      format!("<s>{text}</s>")
    }
    fn text(&mut self, text: &str) -> String {
      self.calls.push(format!("text:{text}"));
      text.to_string()
    }
    fn enter_container(&mut self) {
      self.calls.push("enter".to_string());
    }
    fn leave_container(&mut self) {
      self.calls.push("leave".to_string());
    }
    fn finish(&mut self, html: String) -> String {
      self.calls.push("finish".to_string());
      html
    }
  }

  #[test]
  fn test_children_render_before_parents() {
    let mut recorder = Recorder::default();
    let html =
      render_document("# Title\n\nSome *very* nice text.\n", &mut recorder);
    assert_eq!(html, "<h1>Title</h1><p>Some <i>very</i> nice text.</p>");
    assert_eq!(recorder.calls, [
      "text:Title",
      "heading1:Title",
      "text:Some ",
      "text:very",
      "em",
      "text: nice text.",
      "paragraph:Some <i>very</i> nice text.",
      "finish",
    ]);
  }

  #[test]
  fn test_soft_breaks_merge_into_text() {
    let mut recorder = Recorder::default();
    render_document("one\ntwo & 2 < 3\n", &mut recorder);
    assert_eq!(recorder.calls[0], "text:one\ntwo &amp; 2 &lt; 3");
  }

  #[test]
  fn test_tight_list_with_tasks() {
    let mut recorder = Recorder::default();
    let html = render_document("3. [x] done\n4. [ ] open\n", &mut recorder);
    assert_eq!(
      html,
      "<l><li>[true]done</li><li>[false]open</li></l>"
    );
    assert!(recorder.calls.contains(&"list:true:3".to_string()));
    assert!(!recorder.calls.iter().any(|call| call.starts_with("paragraph")));
  }

  #[test]
  fn test_loose_list_paragraphs() {
    let mut recorder = Recorder::default();
    let html = render_document("- a\n\n- b\n", &mut recorder);
    assert_eq!(html, "<l><li><p>a</p></li><li><p>b</p></li></l>");
  }

  #[test]
  fn test_containers_wrap_their_children() {
    let mut recorder = Recorder::default();
    render_document("> quoted\n>\n> - x\n", &mut recorder);
    assert_eq!(recorder.calls, [
      "enter",
      "text:quoted",
      "paragraph:quoted",
      "enter",
      "text:x",
      "leave",
      "item:x",
      "list:false:1",
      "leave",
      "blockquote",
      "finish",
    ]);
  }

  #[test]
  fn test_code_block_and_span() {
    let mut recorder = Recorder::default();
    render_document(
      "```rust title\nfn x() {}\n```\n\nuse `a<b`\n",
      &mut recorder,
    );
    assert_eq!(recorder.calls[0], "code:rust title:fn x() {}");
    assert!(recorder.calls.contains(&"codespan:a&lt;b".to_string()));
  }

  #[test]
  fn test_image_and_link_arguments() {
    let mut recorder = Recorder::default();
    render_document(
      "![A *bold* view](img/a.png \"Caption\") [site](https://example.com)\n",
      &mut recorder,
    );
    assert!(
      recorder
        .calls
        .contains(&"image:img/a.png:Caption:A bold view".to_string())
    );
    assert!(
      recorder
        .calls
        .contains(&"link:https://example.com:site".to_string())
    );
  }

  #[test]
  fn test_table_walk() {
    let mut recorder = Recorder::default();
    let html = render_document("| A |\n|---|\n| 1 |\n", &mut recorder);
    assert_eq!(html, "<t><r>A</r>|<r>1</r></t>");
    assert_eq!(recorder.calls, [
      "text:A", "cell:true:A", "row", "text:1", "cell:false:1", "row", "table",
      "finish",
    ]);
  }

  #[test]
  fn test_render_inline_markdown() {
    assert_eq!(
      render_inline_markdown("Fish &amp; *chips*"),
      "Fish & <em>chips</em>"
    );
    assert_eq!(render_inline_markdown("plain"), "plain");
  }

  #[test]
  fn test_task_marker() {
    assert_eq!(task_marker("[ ] a"), Some((false, "a")));
    assert_eq!(task_marker("[X] a"), Some((true, "a")));
    assert_eq!(task_marker("[y] a"), None);
  }
}
