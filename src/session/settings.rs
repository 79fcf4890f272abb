use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::batch::BatchOpts;
use crate::foundation::error::{TextToolError, TextToolResult};

/// Process-wide settings, loaded once from a JSON file.
///
/// Every field is optional in the file; missing fields take the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextToolSettings {
    /// Directory holding the alias table and the font files it names.
    pub data_dir: PathBuf,
    /// Alias table file name, relative to `data_dir`.
    pub fonts_file: PathBuf,
    /// Alias used when a request does not name a font.
    pub default_font: String,
    /// Request limits.
    pub limits: LimitSettings,
    /// Batch rendering knobs.
    pub render: RenderSettings,
}

impl Default for TextToolSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            fonts_file: PathBuf::from("fonts.json"),
            default_font: "default".to_owned(),
            limits: LimitSettings::default(),
            render: RenderSettings::default(),
        }
    }
}

/// Request limits enforced before any rendering starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitSettings {
    /// Capacity of the batch job queue.
    pub max_task: usize,
    /// Maximum literal text length, in chars.
    pub max_chars_per_task: usize,
    /// Maximum number of segments per request.
    pub max_images_per_task: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_task: 20,
            max_chars_per_task: 20_000,
            max_images_per_task: 1_000,
        }
    }
}

/// Batch rendering knobs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// Rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Whole-batch timeout in milliseconds. `None` disables it.
    pub batch_timeout_ms: Option<u64>,
}

impl RenderSettings {
    /// Batch options derived from these settings.
    pub fn batch_opts(&self) -> BatchOpts {
        BatchOpts {
            threads: self.threads,
            timeout: self.batch_timeout_ms.map(Duration::from_millis),
        }
    }
}

impl TextToolSettings {
    /// Read settings from a JSON file.
    pub fn from_path(path: &Path) -> TextToolResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TextToolError::config(format!("failed to read settings '{}': {e}", path.display()))
        })?;
        let settings: Self = serde_json::from_str(&raw).map_err(|e| {
            TextToolError::config(format!("invalid settings '{}': {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that serde cannot express.
    pub fn validate(&self) -> TextToolResult<()> {
        if self.default_font.trim().is_empty() {
            return Err(TextToolError::config("'default_font' must not be empty"));
        }
        if self.limits.max_task == 0 {
            return Err(TextToolError::config("'limits.max_task' must be >= 1"));
        }
        if self.limits.max_images_per_task == 0 {
            return Err(TextToolError::config(
                "'limits.max_images_per_task' must be >= 1",
            ));
        }
        if self.render.threads == Some(0) {
            return Err(TextToolError::config("'render.threads' must be >= 1 when set"));
        }
        Ok(())
    }

    /// Full path of the alias table.
    pub fn fonts_path(&self) -> PathBuf {
        self.data_dir.join(&self.fonts_file)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/settings.rs"]
mod tests;
