//! Text rasterization.
//!
//! A segment is laid out with parley, its ink extents are measured on a scratch surface, the canvas
//! is sized and the text placed by [`placement`], and the final image is drawn with `vello_cpu`.

mod cpu;
mod image;
pub(crate) mod placement;
mod text;

pub use cpu::TextRenderer;
pub use image::RenderedImage;
pub use placement::{CanvasPlan, MAX_CANVAS_EDGE, TextMetrics, plan_canvas};
