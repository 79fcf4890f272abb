use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{TextToolError, TextToolResult};

/// One registered font: alias, resolved path and file bytes.
#[derive(Clone, Debug)]
pub struct FontEntry {
    /// Caller-facing alias.
    pub alias: String,
    /// Absolute or data-dir-joined path of the font file.
    pub path: PathBuf,
    /// Raw font file bytes.
    pub bytes: Arc<[u8]>,
}

/// Immutable alias -> font table.
#[derive(Clone, Debug, Default)]
pub struct FontRegistry {
    entries: BTreeMap<String, FontEntry>,
    default_alias: String,
}

impl FontRegistry {
    /// Build a registry from already-loaded entries.
    pub fn from_entries(
        entries: impl IntoIterator<Item = FontEntry>,
        default_alias: impl Into<String>,
    ) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.alias.clone(), e))
                .collect(),
            default_alias: default_alias.into(),
        }
    }

    /// Load the alias table `fonts_file` (a JSON object `alias -> relative path`).
    ///
    /// Paths are resolved against `data_dir`. A missing table yields an empty registry, entries whose
    /// file cannot be read are skipped with a warning.
    #[tracing::instrument(skip_all, fields(table = %fonts_file.display()))]
    pub fn load(
        data_dir: &Path,
        fonts_file: &Path,
        default_alias: impl Into<String>,
    ) -> TextToolResult<Self> {
        let default_alias = default_alias.into();
        let raw = match std::fs::read_to_string(fonts_file) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("font alias table not found, no fonts registered");
                return Ok(Self::from_entries([], default_alias));
            }
            Err(e) => {
                return Err(TextToolError::config(format!(
                    "failed to read font alias table '{}': {e}",
                    fonts_file.display()
                )));
            }
        };

        let table: BTreeMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            TextToolError::config(format!(
                "font alias table '{}' must be a JSON object of alias -> path: {e}",
                fonts_file.display()
            ))
        })?;

        let mut entries = Vec::with_capacity(table.len());
        for (alias, rel) in table {
            let norm = normalize_rel_path(&rel)?;
            let path = data_dir.join(Path::new(&norm));
            match std::fs::read(&path) {
                Ok(bytes) if !bytes.is_empty() => entries.push(FontEntry {
                    alias,
                    path,
                    bytes: Arc::from(bytes),
                }),
                Ok(_) => tracing::warn!(%alias, path = %path.display(), "font file is empty, skipped"),
                Err(e) => {
                    tracing::warn!(%alias, path = %path.display(), error = %e, "font file unreadable, skipped")
                }
            }
        }

        tracing::debug!(count = entries.len(), "font alias table loaded");
        Ok(Self::from_entries(entries, default_alias))
    }

    /// Alias used when a request does not name a font.
    pub fn default_alias(&self) -> &str {
        &self.default_alias
    }

    /// Resolve an alias to its font entry.
    pub fn resolve(&self, alias: &str) -> TextToolResult<&FontEntry> {
        self.entries
            .get(alias)
            .ok_or_else(|| TextToolError::FontNotFound {
                alias: alias.to_owned(),
            })
    }

    /// Return `true` when `alias` is registered.
    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Registered aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when no fonts are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize and validate data-dir-relative font paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> TextToolResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(TextToolError::config("font paths must be relative"));
    }
    if s.is_empty() {
        return Err(TextToolError::config("font path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(TextToolError::config("font paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(TextToolError::config("font path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/registry.rs"]
mod tests;
