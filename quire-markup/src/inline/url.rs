//! URL sanitization, resolution and attribute escaping for link targets.
use std::sync::LazyLock;

use html_escape::encode_double_quoted_attribute;
use log::{debug, error};
use percent_encoding::{
  AsciiSet,
  NON_ALPHANUMERIC,
  percent_decode_str,
  utf8_percent_encode,
};
use regex::{Captures, Regex};

use crate::utils::never_matching_regex;

/// Characters `encodeURI` leaves untouched, on top of ASCII alphanumerics.
const URI_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b';')
  .remove(b',')
  .remove(b'/')
  .remove(b'?')
  .remove(b':')
  .remove(b'@')
  .remove(b'&')
  .remove(b'=')
  .remove(b'+')
  .remove(b'$')
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')')
  .remove(b'#');

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)&(#\d+|#x[0-9a-f]+|\w+);?").unwrap_or_else(|e| {
    error!("Failed to compile ENTITY regex: {e}");
    never_matching_regex()
  })
});

static NON_WORD_OR_COLON: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"[^\w:]").unwrap_or_else(|e| {
    error!("Failed to compile NON_WORD_OR_COLON regex: {e}");
    never_matching_regex()
  })
});

/// Empty, scheme-qualified, query-only or fragment-only hrefs never get a
/// base URL prepended.
static ORIGIN_INDEPENDENT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^$|^[a-z][a-z0-9+.\-]*:|^[?#]").unwrap_or_else(|e| {
    error!("Failed to compile ORIGIN_INDEPENDENT regex: {e}");
    never_matching_regex()
  })
});

static JUST_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^:]+:/*[^/]*$").unwrap_or_else(|e| {
    error!("Failed to compile JUST_DOMAIN regex: {e}");
    never_matching_regex()
  })
});

static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([^:]+:/*[^/]*)").unwrap_or_else(|e| {
    error!("Failed to compile DOMAIN regex: {e}");
    never_matching_regex()
  })
});

/// Escape HTML special characters.
///
/// With `encode` set every `&` is escaped; otherwise ampersands that already
/// start an entity (`&amp;`, `&#39;`) are left alone so escaping stays
/// idempotent on pre-escaped input. `html-escape` has no entity-preserving
/// mode, so that branch walks the characters itself.
///
/// Single quotes always become `&#39;`. `encode_safe` would write `&#x27;`
/// and also escape `/`, which changes URLs and listing text.
#[must_use]
pub fn escape_html(html: &str, encode: bool) -> String {
  if encode {
    return encode_double_quoted_attribute(html).replace('\'', "&#39;");
  }

  let mut out = String::with_capacity(html.len());
  for (idx, ch) in html.char_indices() {
    match ch {
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      '&' if !starts_entity(&html[idx + 1..]) => out.push_str("&amp;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Whether `rest` (the text after an `&`) continues as `#?\w+;`.
fn starts_entity(rest: &str) -> bool {
  let body = rest.strip_prefix('#').unwrap_or(rest);
  let word_len = body
    .char_indices()
    .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
    .map_or(body.len(), |(i, _)| i);
  word_len > 0 && body[word_len..].starts_with(';')
}

/// Decode numeric entities and `&colon;`; other named entities are dropped.
#[must_use]
pub fn unescape_entities(html: &str) -> String {
  ENTITY
    .replace_all(html, |caps: &Captures| {
      let name = caps[1].to_lowercase();
      if name == "colon" {
        return ":".to_string();
      }
      let code = if let Some(hex) = name.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
      } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
      } else {
        None
      };
      code
        .and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_default()
    })
    .into_owned()
}

/// Prepare a link target for output.
///
/// Returns `None` when `sanitize` is enabled and the target uses a scheme
/// that can execute code, or when it cannot be decoded. Relative targets are
/// resolved against `base` and the result is percent-encoded the way
/// `encodeURI` does, without double-encoding existing escapes.
#[must_use]
pub fn clean_url(
  sanitize: bool,
  base: Option<&str>,
  href: &str,
) -> Option<String> {
  if sanitize {
    let unescaped = unescape_entities(href);
    let Ok(decoded) = percent_decode_str(&unescaped).decode_utf8() else {
      debug!("Rejecting undecodable URL: {href}");
      return None;
    };
    let protocol = NON_WORD_OR_COLON.replace_all(&decoded, "").to_lowercase();
    if BLOCKED_SCHEMES
      .iter()
      .any(|scheme| protocol.starts_with(scheme))
    {
      debug!("Rejecting unsafe URL: {href}");
      return None;
    }
  }

  let target = match base {
    Some(base) if !base.is_empty() && !ORIGIN_INDEPENDENT.is_match(href) => {
      resolve_url(base, href)
    },
    _ => href.to_string(),
  };

  Some(
    utf8_percent_encode(&target, URI_RESERVED)
      .to_string()
      .replace("%25", "%"),
  )
}

/// Resolve `href` against `base`.
///
/// Everything in the base after the last `/` of its path is ignored; a bare
/// origin such as `https://example.com` gets a trailing slash.
#[must_use]
pub fn resolve_url(base: &str, href: &str) -> String {
  let base = if JUST_DOMAIN.is_match(base) {
    format!("{base}/")
  } else {
    base
      .rfind('/')
      .map_or_else(String::new, |idx| base[..=idx].to_string())
  };
  let relative_base = !base.contains(':');

  if href.starts_with("//") {
    if relative_base {
      return href.to_string();
    }
    let scheme = base.find(':').map_or("", |idx| &base[..=idx]);
    format!("{scheme}{href}")
  } else if href.starts_with('/') {
    if relative_base {
      return href.to_string();
    }
    let origin = DOMAIN.find(&base).map_or("", |m| m.as_str());
    format!("{origin}{href}")
  } else {
    format!("{base}{href}")
  }
}
