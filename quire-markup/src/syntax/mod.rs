//! Provides a trait-based architecture for syntax highlighting of code
//! listings so backends can be swapped or faked.
//! Currently supported backends:
//! - **Syntect** - Uses Sublime Text syntax definitions, with two-face added
//!   for extended syntax definitions

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{SyntaxError, SyntaxResult};
pub use types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager};

// Syntect backend implementation
#[cfg(feature = "syntect")] mod syntect;
#[cfg(feature = "syntect")] pub use syntect::*;

/// Create the default syntax manager based on available features.
///
/// **Note**: While the `syntect` feature is enabled, the two-face crate
/// will also be pulled to provide additional syntax definitions.
///
/// # Errors
///
/// Returns [`SyntaxError::NoBackendAvailable`] if no backend feature is
/// enabled.
pub fn create_default_manager() -> SyntaxResult<SyntaxManager> {
  #[cfg(feature = "syntect")]
  {
    create_syntect_manager(SyntaxConfig::default())
  }

  #[cfg(not(feature = "syntect"))]
  {
    Err(SyntaxError::NoBackendAvailable)
  }
}
