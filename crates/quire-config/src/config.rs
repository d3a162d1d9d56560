use std::{
  fs,
  path::{Path, PathBuf},
  str::FromStr,
};

use quire_markup::RenderOptions;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File names probed, in order, by [`Config::find_config_file`].
const CONFIG_FILENAMES: [&str; 4] =
  ["quire.toml", "quire.json", ".config/quire.toml", ".config/quire.json"];

/// Renderer configuration as written in a `quire.toml` or `quire.json` file.
///
/// Every field is optional so that several files can be layered with
/// [`Config::merge`]; unset fields take the [`RenderOptions`] defaults when
/// converted with [`Config::render_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Number of the chapter, used as the first component of heading numbers.
  pub chapter: Option<u32>,

  /// Directory that relative image paths are resolved against.
  pub basedir: Option<PathBuf>,

  /// Base that relative link targets are resolved against.
  pub base_url: Option<String>,

  /// Whether to drop links and images with script-capable schemes.
  pub sanitize: Option<bool>,

  /// Whether void elements are closed XHTML-style.
  pub xhtml: Option<bool>,

  /// Whether to enable syntax highlighting for code listings.
  pub highlight_code: Option<bool>,

  /// How to handle hard tabs in code listings.
  pub tab_replace: Option<String>,
}

impl Config {
  /// Load configuration from a TOML or JSON file, chosen by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {e}",
        path.display()
      ))
    })?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);
    match extension.as_deref() {
      Some("json") => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {e}",
            path.display()
          ))
        })
      },
      Some("toml") => {
        Self::from_toml_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {e}",
            path.display()
          ))
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Parse configuration from TOML text.
  ///
  /// # Errors
  ///
  /// Returns an error if the text is not valid TOML or has mistyped fields.
  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(content)?)
  }

  /// Load and merge `config_files` in order, falling back to a discovered
  /// file, then apply `KEY=VALUE` overrides.
  ///
  /// # Errors
  ///
  /// Returns an error if any file fails to load or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if config_files.is_empty() {
      match Self::find_config_file() {
        Some(discovered) => {
          log::info!("Using discovered config file: {}", discovered.display());
          Self::from_file(&discovered)?
        },
        None => Self::default(),
      }
    } else {
      let mut merged = Self::default();
      for path in config_files {
        merged.merge(Self::from_file(path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    };

    config.apply_overrides(config_overrides)?;
    Ok(config)
  }

  /// Search the working directory for a config file.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    Self::find_config_file_in(&current_dir)
  }

  fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|filename| dir.join(filename))
      .find(|path| path.is_file())
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not `KEY=VALUE`, names an unknown
  /// key, or carries a value that does not parse as the field's type.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    log::debug!("Overriding config key {key}");
    match key {
      "chapter" => self.chapter = Some(parse_value(key, value)?),
      "basedir" => self.basedir = Some(PathBuf::from(value)),
      "base_url" => self.base_url = non_empty(value),
      "sanitize" => self.sanitize = Some(parse_value(key, value)?),
      "xhtml" => self.xhtml = Some(parse_value(key, value)?),
      "highlight_code" => self.highlight_code = Some(parse_value(key, value)?),
      "tab_replace" => self.tab_replace = Some(value.to_string()),
      _ => return Err(ConfigError::UnknownKey(key.to_string())),
    }
    Ok(())
  }

  /// Merge another config into this one. Fields set in `other` win.
  pub fn merge(&mut self, other: Self) {
    let Self {
      chapter,
      basedir,
      base_url,
      sanitize,
      xhtml,
      highlight_code,
      tab_replace,
    } = other;

    self.chapter = chapter.or(self.chapter);
    self.basedir = basedir.or_else(|| self.basedir.take());
    self.base_url = base_url.or_else(|| self.base_url.take());
    self.sanitize = sanitize.or(self.sanitize);
    self.xhtml = xhtml.or(self.xhtml);
    self.highlight_code = highlight_code.or(self.highlight_code);
    self.tab_replace = tab_replace.or_else(|| self.tab_replace.take());
  }

  /// Options for a chapter renderer, with unset fields at their defaults.
  #[must_use]
  pub fn render_options(&self) -> RenderOptions {
    let defaults = RenderOptions::default();
    RenderOptions {
      sanitize:       self.sanitize.unwrap_or(defaults.sanitize),
      base_url:       self.base_url.clone().or(defaults.base_url),
      xhtml:          self.xhtml.unwrap_or(defaults.xhtml),
      basedir:        self.basedir.clone().unwrap_or(defaults.basedir),
      chapter:        self.chapter.unwrap_or(defaults.chapter),
      highlight_code: self.highlight_code.unwrap_or(defaults.highlight_code),
      tab_replace:    self.tab_replace.clone().unwrap_or(defaults.tab_replace),
    }
  }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  value.parse().map_err(|e: T::Err| {
    ConfigError::InvalidValue {
      key:    key.to_string(),
      reason: e.to_string(),
    }
  })
}

fn non_empty(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}
