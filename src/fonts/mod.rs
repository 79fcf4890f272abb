//! Font alias registry.
//!
//! Aliases map short caller-facing names to font files below a data directory. The table is read
//! once and is immutable afterwards; share it with `Arc<FontRegistry>`.

mod registry;

pub use registry::{FontEntry, FontRegistry};
