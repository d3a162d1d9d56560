/// Glue the last word of a text run to the one before it with `&nbsp;` so a
/// paragraph never ends on a single dangling word.
///
/// Only applies when the last space is neither the first nor the final
/// character of the run.
#[must_use]
pub fn prevent_widow(text: &str) -> String {
  match text.rfind(' ') {
    Some(idx) if idx > 0 && idx != text.len() - 1 => {
      format!("{}&nbsp;{}", &text[..idx], &text[idx + 1..])
    },
    _ => text.to_string(),
  }
}

/// Escape only `<`, for verbatim blocks such as ASCII diagrams.
#[must_use]
pub fn escape_angle_brackets(text: &str) -> String {
  text.replace('<', "&lt;")
}
