//! Helpers shared by unit tests.

use std::path::PathBuf;
use std::sync::Arc;

use crate::fonts::{FontEntry, FontRegistry};

const FONT_CANDIDATES: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// A real font from `TEXTTOOL_TEST_FONT` or a common system location, registered as `alias`.
pub(crate) fn local_font(alias: &str) -> Option<FontEntry> {
    let env = std::env::var_os("TEXTTOOL_TEST_FONT").map(PathBuf::from);
    let path = env
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from))
        .find(|p| p.is_file())?;
    let bytes = std::fs::read(&path).ok()?;
    Some(FontEntry {
        alias: alias.to_owned(),
        path,
        bytes: Arc::from(bytes),
    })
}

/// A registry entry whose bytes are not a font.
pub(crate) fn bogus_font(alias: &str) -> FontEntry {
    FontEntry {
        alias: alias.to_owned(),
        path: PathBuf::from(format!("{alias}.ttf")),
        bytes: Arc::from(b"not a font".to_vec()),
    }
}

pub(crate) fn registry(entries: impl IntoIterator<Item = FontEntry>) -> Arc<FontRegistry> {
    Arc::new(FontRegistry::from_entries(entries, "default"))
}

/// Scratch directory under `target/` for tests that touch the filesystem.
pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_scratch").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
