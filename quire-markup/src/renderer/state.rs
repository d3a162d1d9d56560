//! Cross-construct render state.
//!
//! Construct callbacks arrive one at a time with no view of their siblings.
//! [`RenderState`] remembers just enough of what came before to number
//! headings and to wrap runs of consecutive paragraphs in a single
//! `<div class="paragraphs">` group. Blockquotes and list items are
//! containers: their paragraphs are left ungrouped and the outer group state
//! is restored when the container is done.

/// Opens a paragraph group.
pub const GROUP_OPEN: &str = "<div class=\"paragraphs\">";
/// Closes a paragraph group.
pub const GROUP_CLOSE: &str = "</div>";

/// Every construct the renderer can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructKind {
  Heading,
  Paragraph,
  Image,
  Code,
  Blockquote,
  List,
  ListItem,
  Checkbox,
  Html,
  Hr,
  Link,
  Strong,
  Em,
  Codespan,
  Br,
  Del,
  Text,
  Table,
  TableRow,
  TableCell,
}

impl ConstructKind {
  /// Whether the construct occupies its own block. List items are not
  /// block-level here: only the enclosing list closes a paragraph group.
  #[must_use]
  pub const fn is_block(self) -> bool {
    matches!(
      self,
      Self::Heading
        | Self::Html
        | Self::Table
        | Self::Code
        | Self::Hr
        | Self::List
        | Self::Blockquote
        | Self::Paragraph
        | Self::TableRow
        | Self::TableCell
    )
  }
}

/// Mutable state of one document render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
  chapter:              u32,
  section:              u32,
  subsection:           u32,
  last_construct:       Option<ConstructKind>,
  last_block_construct: Option<ConstructKind>,
  paragraph_group_open: bool,

  /// Group state of the enclosing scopes, innermost last. Paragraphs inside
  /// a container are never grouped.
  outer_scopes: Vec<(bool, Option<ConstructKind>)>,
}

impl RenderState {
  #[must_use]
  pub const fn new(chapter: u32) -> Self {
    Self {
      chapter,
      section: 0,
      subsection: 0,
      last_construct: None,
      last_block_construct: None,
      paragraph_group_open: false,
      outer_scopes: Vec::new(),
    }
  }

  /// Start rendering the children of a blockquote or list item.
  pub fn enter_container(&mut self) {
    self
      .outer_scopes
      .push((self.paragraph_group_open, self.last_block_construct));
    self.paragraph_group_open = false;
    self.last_block_construct = None;
  }

  /// Return to the scope around the container, as it was on entry.
  pub fn leave_container(&mut self) {
    if let Some((open, last_block)) = self.outer_scopes.pop() {
      self.paragraph_group_open = open;
      self.last_block_construct = last_block;
    }
  }

  /// Whether constructs are currently rendered inside a container.
  #[must_use]
  pub const fn in_container(&self) -> bool {
    !self.outer_scopes.is_empty()
  }

  /// Record that `kind` is about to be rendered and return the fragment
  /// that must precede it: a group opener, a group closer, or nothing.
  ///
  /// `level` is only consulted for headings.
  pub fn before_construct(
    &mut self,
    kind: ConstructKind,
    level: Option<u8>,
  ) -> &'static str {
    if kind == ConstructKind::Heading {
      match level {
        Some(2) => {
          self.section += 1;
          self.subsection = 0;
        },
        Some(3) => self.subsection += 1,
        _ => {},
      }
    }

    let previous_block = self.last_block_construct;
    self.last_construct = Some(kind);
    if kind.is_block() {
      self.last_block_construct = Some(kind);
    }

    if kind == ConstructKind::Paragraph
      && previous_block != Some(ConstructKind::Paragraph)
      && !self.in_container()
    {
      self.paragraph_group_open = true;
      return GROUP_OPEN;
    }

    if kind != ConstructKind::Paragraph
      && kind.is_block()
      && self.paragraph_group_open
    {
      self.paragraph_group_open = false;
      return GROUP_CLOSE;
    }

    ""
  }

  /// Displayed number of a heading at `level` given the current counters.
  #[must_use]
  pub fn heading_number(&self, level: u8) -> String {
    match level {
      1 => self.chapter.to_string(),
      2 => format!("{}.{}", self.chapter, self.section),
      _ => format!("{}.{}.{}", self.chapter, self.section, self.subsection),
    }
  }

  /// Forget an open group whose opener was cut away by the caller.
  pub const fn discard_open_group(&mut self) {
    self.paragraph_group_open = false;
  }

  #[must_use]
  pub const fn paragraph_group_open(&self) -> bool {
    self.paragraph_group_open
  }

  #[must_use]
  pub const fn last_construct(&self) -> Option<ConstructKind> {
    self.last_construct
  }

  #[must_use]
  pub const fn last_block_construct(&self) -> Option<ConstructKind> {
    self.last_block_construct
  }

  /// Close a group left open at the end of the document.
  pub fn finish(&mut self, mut html: String) -> String {
    if self.paragraph_group_open {
      self.paragraph_group_open = false;
      html.push_str(GROUP_CLOSE);
    }
    html
  }
}

#[cfg(test)]
mod tests {
  use super::{ConstructKind::*, *};

  #[test]
  fn test_heading_counters() {
    let mut state = RenderState::new(4);
    let mut numbers = Vec::new();
    for level in [1, 2, 3, 3, 2, 3, 4] {
      state.before_construct(Heading, Some(level));
      numbers.push(state.heading_number(level));
    }
    assert_eq!(numbers, [
      "4", "4.1", "4.1.1", "4.1.2", "4.2", "4.2.1", "4.2.1"
    ]);
  }

  #[test]
  fn test_level_three_before_any_section() {
    let mut state = RenderState::new(1);
    state.before_construct(Heading, Some(3));
    assert_eq!(state.heading_number(3), "1.0.1");
  }

  #[test]
  fn test_paragraph_group_opens_once() {
    let mut state = RenderState::new(1);
    assert_eq!(state.before_construct(Paragraph, None), GROUP_OPEN);
    assert_eq!(state.before_construct(Text, None), "");
    assert_eq!(state.before_construct(Paragraph, None), "");
    assert!(state.paragraph_group_open());
    assert_eq!(state.before_construct(Code, None), GROUP_CLOSE);
    assert!(!state.paragraph_group_open());
    assert_eq!(state.last_block_construct(), Some(Code));
  }

  #[test]
  fn test_inline_constructs_do_not_close_group() {
    let mut state = RenderState::new(1);
    state.before_construct(Paragraph, None);
    for kind in [Strong, Em, Link, Image, Br, ListItem, Checkbox] {
      assert_eq!(state.before_construct(kind, None), "");
    }
    assert!(state.paragraph_group_open());
    assert_eq!(state.last_construct(), Some(Checkbox));
    assert_eq!(state.last_block_construct(), Some(Paragraph));
  }

  #[test]
  fn test_finish_flushes_open_group() {
    let mut state = RenderState::new(1);
    state.before_construct(Paragraph, None);
    assert_eq!(state.finish("<p>x</p>".to_string()), "<p>x</p></div>");
    assert_eq!(state.finish("y".to_string()), "y");
  }

  #[test]
  fn test_discarded_group_is_not_closed() {
    let mut state = RenderState::new(1);
    state.before_construct(Paragraph, None);
    state.discard_open_group();
    assert_eq!(state.before_construct(Blockquote, None), "");
    assert_eq!(state.finish(String::new()), "");
  }

  #[test]
  fn test_container_keeps_groups_balanced() {
    let mut state = RenderState::new(1);
    assert_eq!(state.before_construct(Paragraph, None), GROUP_OPEN);

    state.enter_container();
    assert!(state.in_container());
    assert_eq!(state.before_construct(Paragraph, None), "");
    assert_eq!(state.before_construct(List, None), "");
    assert_eq!(state.before_construct(Paragraph, None), "");
    state.leave_container();

    assert!(!state.in_container());
    assert!(state.paragraph_group_open());
    assert_eq!(state.before_construct(Blockquote, None), GROUP_CLOSE);
    assert_eq!(state.before_construct(Paragraph, None), GROUP_OPEN);
  }
}
