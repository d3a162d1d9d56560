//! Text-level rewriters shared by the construct renderers.
//!
//! Everything in here is a pure function over strings: no render state is
//! read or written.
pub mod autolink;
pub mod footnote;
pub mod text;
pub mod url;

pub use autolink::autolink;
pub use footnote::{
  interpolate_definition,
  interpolate_references,
  is_definition,
};
pub use text::{escape_angle_brackets, prevent_widow};
pub use url::{clean_url, escape_html, resolve_url};
