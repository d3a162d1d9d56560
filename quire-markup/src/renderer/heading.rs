use std::sync::LazyLock;

use html_escape::decode_html_entities;
use log::error;
use regex::Regex;

use super::{ChapterRenderer, ConstructKind};
use crate::{
  types::Heading,
  utils::{never_matching_regex, strip_tags},
};

/// Trailing `{#id}`, possibly glued to the text by the widow `&nbsp;`.
static CUSTOM_ID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(&nbsp;)?\{#(.*)\}$").unwrap_or_else(|e| {
    error!("Failed to compile CUSTOM_ID regex: {e}");
    never_matching_regex()
  })
});

/// Split `text` into its visible part and the custom id, if one is given.
fn split_custom_id(text: &str) -> (&str, Option<&str>) {
  let Some(caps) = CUSTOM_ID.captures(text) else {
    return (text, None);
  };
  match (caps.get(0), caps.get(2)) {
    (Some(whole), Some(id)) if !id.as_str().is_empty() => {
      (text[..whole.start()].trim_end(), Some(id.as_str()))
    },
    _ => (text, None),
  }
}

impl ChapterRenderer<'_> {
  pub(super) fn render_heading(&mut self, text: &str, level: u8) -> String {
    let prefix = self
      .state
      .before_construct(ConstructKind::Heading, Some(level));
    let number = self.state.heading_number(level);
    let (visible, custom_id) = split_custom_id(text);

    let plain = decode_html_entities(&strip_tags(visible))
      .replace('\u{a0}', " ")
      .trim()
      .to_string();
    self.headings.push(Heading {
      number: number.clone(),
      level,
      text: plain,
      id: custom_id.map_or_else(|| number.clone(), str::to_string),
    });

    let (id_attr, body) = match custom_id {
      Some(id) => (
        format!(" id=\"{id}\""),
        format!("<a href=\"#{id}\">{visible}</a>"),
      ),
      None => (String::new(), visible.to_string()),
    };

    format!(
      "{prefix}<h{level}{id_attr}><span id=\"{number}\"><a \
       href=\"#{number}\">{number}</a></span> {body}</h{level}>\n"
    )
  }
}
