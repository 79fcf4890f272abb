//! texttool renders short text into tightly fitted RGBA images.
//!
//! A `generate` command carries inline `key:value` parameters followed by literal text. The text is
//! split into segments, each segment is rendered into one image, and several images are packaged
//! into one zip archive:
//!
//! - Parse arguments with [`parse_generate_args`]
//! - Split the text with [`segment_text`]
//! - Render one segment with [`TextRenderer`], or a whole [`BatchJob`] with [`render_batch`]
//! - Package a batch through a [`BatchSink`] such as [`ZipSink`]
//!
//! [`TextTool`] wires these together behind the `generate`, `font_list` and `task` commands.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod batch;
pub mod fonts;
pub mod params;
pub mod render;
pub mod segment;
pub mod session;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;

pub use crate::foundation::color::Rgba8;
pub use crate::foundation::error::{SegmentFailure, TextToolError, TextToolResult};

pub use crate::batch::{
    BatchJob, BatchOpts, BatchSink, CancelToken, InMemorySink, ZipSink, package, render_batch,
};
pub use crate::fonts::{FontEntry, FontRegistry};
pub use crate::params::{
    CenterMode, Dimension, GenerationConfig, Mode, ParsedArgs, parse_generate_args,
};
pub use crate::render::{RenderedImage, TextRenderer};
pub use crate::segment::{Segment, segment_text};
pub use crate::session::{Delivery, JobQueue, JobTicket, Reply, TextTool, TextToolSettings};
