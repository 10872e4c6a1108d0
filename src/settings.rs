//! Persisted macro settings
//!
//! Settings hold the ordered list of macro definitions. They are stored as
//! JSON by default:
//!
//! ```json
//! {
//!   "replacements": [
//!     { "name": "greet", "replacement": "Hello $0!", "args": 1 }
//!   ]
//! }
//! ```
//!
//! Missing keys fall back to defaults and a missing file is an empty list.
//! With the `data-loading` feature, `.toml`, `.yaml` and `.yml` files use the
//! same schema.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::definition::MacroDefinition;
use crate::utils::error::{SettingsError, SettingsResult};

/// On-disk representation of the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    #[cfg(feature = "data-loading")]
    Toml,
    #[cfg(feature = "data-loading")]
    Yaml,
}

impl SettingsFormat {
    /// Pick a format from the file extension. No extension means JSON.
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            None | Some("json") => Ok(SettingsFormat::Json),
            #[cfg(feature = "data-loading")]
            Some("toml") => Ok(SettingsFormat::Toml),
            #[cfg(feature = "data-loading")]
            Some("yaml") | Some("yml") => Ok(SettingsFormat::Yaml),
            Some(other) => Err(SettingsError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

/// The ordered macro definition list, as persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub replacements: Vec<MacroDefinition>,
}

impl Settings {
    pub fn new(replacements: Vec<MacroDefinition>) -> Self {
        Self { replacements }
    }

    /// Parse settings text. Blank input and JSON `null` give empty settings.
    pub fn parse(text: &str, format: SettingsFormat) -> SettingsResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings = match format {
            SettingsFormat::Json => serde_json::from_str::<Option<Settings>>(text)?,
            #[cfg(feature = "data-loading")]
            SettingsFormat::Toml => Some(
                toml::from_str::<Settings>(text).map_err(|e| SettingsError::format("TOML", e))?,
            ),
            #[cfg(feature = "data-loading")]
            SettingsFormat::Yaml => serde_yaml::from_str::<Option<Settings>>(text)
                .map_err(|e| SettingsError::format("YAML", e))?,
        };
        Ok(settings.unwrap_or_default())
    }

    pub fn from_json(text: &str) -> SettingsResult<Self> {
        Self::parse(text, SettingsFormat::Json)
    }

    /// Render settings text in the given format.
    pub fn render(&self, format: SettingsFormat) -> SettingsResult<String> {
        let text = match format {
            SettingsFormat::Json => serde_json::to_string_pretty(self)?,
            #[cfg(feature = "data-loading")]
            SettingsFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| SettingsError::format("TOML", e))?
            }
            #[cfg(feature = "data-loading")]
            SettingsFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| SettingsError::format("YAML", e))?
            }
        };
        Ok(text)
    }

    pub fn to_json(&self) -> SettingsResult<String> {
        self.render(SettingsFormat::Json)
    }

    /// Load settings from a file. A file that does not exist yields empty settings.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let format = SettingsFormat::from_path(path)?;
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no settings file, starting empty");
                return Ok(Self::default());
            }
            Err(err) => return Err(SettingsError::io(path, err)),
        };
        let settings = Self::parse(&text, format)?;
        tracing::info!(
            path = %path.display(),
            macros = settings.replacements.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Write settings to a file, replacing its contents.
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        let format = SettingsFormat::from_path(path)?;
        let mut text = self.render(format)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        fs::write(path, text).map_err(|err| SettingsError::io(path, err))?;
        tracing::info!(
            path = %path.display(),
            macros = self.replacements.len(),
            "settings saved"
        );
        Ok(())
    }
}
