/// Tracks fenced code blocks while scanning markdown source line by line.
///
/// Line-based preprocessing must leave the contents of fenced listings
/// untouched, so every rewrite consults the tracker before touching a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  fence_char:  Option<char>,
  fence_count: usize,
}

impl FenceTracker {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      fence_char:  None,
      fence_count: 0,
    }
  }

  /// Whether the last processed line left us inside a fenced block.
  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.fence_char.is_some()
  }

  /// Feed one source line and return the state that applies to the *next*
  /// line. Fence lines themselves count as part of the block.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let trimmed = line.trim_start();
    let Some(marker) = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))
    else {
      return *self;
    };

    let count = trimmed.chars().take_while(|&c| c == marker).count();
    if count < 3 {
      return *self;
    }

    match self.fence_char {
      None => {
        Self {
          fence_char:  Some(marker),
          fence_count: count,
        }
      },
      // A closing fence may not carry an info string.
      Some(open) if open == marker && count >= self.fence_count => {
        if trimmed[count..].trim().is_empty() {
          Self::new()
        } else {
          *self
        }
      },
      Some(_) => *self,
    }
  }
}
