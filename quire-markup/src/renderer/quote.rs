use super::{ChapterRenderer, ConstructKind, state::GROUP_OPEN};
use crate::inline::autolink;

/// A citation starts on its own line with an em dash.
const CITATION_MARK: &str = "\n—";
const OPENING_QUOTES: [char; 3] = ['"', '“', '„'];
const CLOSING_QUOTES: [char; 3] = ['"', '”', '“'];

/// Split the last `\n— Author` line off the quote. The citation runs up to
/// the `</p>` that closes its paragraph.
fn split_citation(quote: &str) -> (&str, Option<&str>) {
  match quote.rfind(CITATION_MARK) {
    Some(idx) if idx > 0 => {
      let citation = &quote[idx..];
      let citation = match citation.find("</p>") {
        Some(end) if end > 0 => &citation[..end],
        _ => citation,
      };
      (quote[..idx].trim(), Some(citation))
    },
    _ => (quote, None),
  }
}

/// Drop one surrounding `<p>…</p>` and one pair of quotation marks.
fn strip_quote_marks(body: &str) -> &str {
  let mut body = body.trim();
  if let Some(rest) = body.strip_prefix("<p>") {
    body = rest.trim();
  }
  if let Some(rest) = body.strip_prefix(OPENING_QUOTES) {
    body = rest.trim();
  }
  if let Some(rest) = body.strip_suffix("</p>") {
    body = rest.trim();
  }
  if let Some(rest) = body.strip_suffix(CLOSING_QUOTES) {
    body = rest.trim();
  }
  body
}

impl ChapterRenderer<'_> {
  pub(super) fn render_blockquote(&mut self, quote: &str) -> String {
    // Without container calls from the walk, the quote's first paragraph
    // opened a group that would never close inside the quote.
    let quote = match quote.strip_prefix(GROUP_OPEN) {
      Some(rest) => {
        self.state.discard_open_group();
        rest
      },
      None => quote,
    };

    let prefix = self.state.before_construct(ConstructKind::Blockquote, None);
    let (body, citation) = split_citation(quote);
    let footer = citation
      .map(|citation| autolink(&format!("<footer>{citation}</footer>")))
      .unwrap_or_default();

    format!(
      "{prefix}<blockquote>\n<p>{}</p>{footer}</blockquote>\n",
      strip_quote_marks(body)
    )
  }
}
