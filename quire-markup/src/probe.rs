//! Image dimension probing for figures.
//!
//! Figures reserve their aspect ratio before the image loads, which needs the
//! pixel size of the file on disk. Probing only reads image headers.
use std::path::Path;

/// Result type for dimension probing.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while probing an image.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
  #[error("Unable to read size of \"{path}\": {reason}")]
  Unreadable { path: String, reason: String },
  #[error("Image \"{0}\" reports a zero dimension")]
  EmptyImage(String),
  #[error(
    "No image prober available. Enable the 'image-probe' feature or supply \
     a custom prober."
  )]
  NoProberAvailable,
}

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
  pub width:  u32,
  pub height: u32,
}

impl ImageSize {
  /// Height as a percentage of width, formatted with six decimals for the
  /// `padding-top` ratio box.
  #[must_use]
  pub fn ratio_percent(self) -> String {
    format!(
      "{:.6}",
      f64::from(self.height) / f64::from(self.width) * 100.0
    )
  }

  /// Images this narrow are laid out at their natural size.
  #[must_use]
  pub const fn is_small(self) -> bool {
    self.width <= 400
  }
}

/// Trait for image dimension probing backends.
pub trait DimensionProber {
  /// Read the pixel size of the image at `path`.
  ///
  /// # Errors
  ///
  /// Returns an error when the file is missing, unreadable, or not a
  /// recognised image format.
  fn probe(&self, path: &Path) -> ProbeResult<ImageSize>;
}

/// Prober backed by the `image` crate; decodes headers only.
#[cfg(feature = "image-probe")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageProber;

#[cfg(feature = "image-probe")]
impl DimensionProber for ImageProber {
  fn probe(&self, path: &Path) -> ProbeResult<ImageSize> {
    let (width, height) =
      image::image_dimensions(path).map_err(|e| ProbeError::Unreadable {
        path:   path.display().to_string(),
        reason: e.to_string(),
      })?;

    if width == 0 || height == 0 {
      return Err(ProbeError::EmptyImage(path.display().to_string()));
    }

    Ok(ImageSize { width, height })
  }
}

/// Create the default prober based on available features.
///
/// # Errors
///
/// Returns [`ProbeError::NoProberAvailable`] when the `image-probe` feature
/// is disabled.
pub fn create_default_prober() -> ProbeResult<Box<dyn DimensionProber>> {
  #[cfg(feature = "image-probe")]
  {
    Ok(Box::new(ImageProber))
  }

  #[cfg(not(feature = "image-probe"))]
  {
    Err(ProbeError::NoProberAvailable)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ratio_percent() {
    let size = ImageSize {
      width:  800,
      height: 400,
    };
    assert_eq!(size.ratio_percent(), "50.000000");
    assert!(!size.is_small());

    let size = ImageSize {
      width:  300,
      height: 200,
    };
    assert_eq!(size.ratio_percent(), "66.666667");
    assert!(size.is_small());
  }

  #[cfg(feature = "image-probe")]
  #[test]
  fn test_image_prober_reads_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wide.png");
    image::RgbImage::new(640, 480)
      .save(&path)
      .expect("write png");

    let size = ImageProber.probe(&path).expect("probe png");
    assert_eq!(size, ImageSize {
      width:  640,
      height: 480,
    });
  }

  #[cfg(feature = "image-probe")]
  #[test]
  fn test_image_prober_missing_file() {
    let result = ImageProber.probe(Path::new("/definitely/not/here.png"));
    assert!(matches!(result, Err(ProbeError::Unreadable { .. })));
  }
}
