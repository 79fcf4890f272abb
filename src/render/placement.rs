//! Canvas sizing and text placement.
//!
//! Everything here works in layout coordinates: origin at the top-left of the line box, y down,
//! output pixels (dpi scaling already applied).

use kurbo::{Point, Rect, Vec2};

use crate::foundation::error::{TextToolError, TextToolResult};
use crate::params::{CenterMode, Dimension, GenerationConfig};

/// Largest canvas edge the raster backend accepts.
pub const MAX_CANVAS_EDGE: u32 = u16::MAX as u32;

/// Measured extents of one laid-out segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// Nominal box: advance width by line-box height.
    pub advance: Rect,
    /// Bounding box of inked pixels; `None` for blank text.
    pub ink: Option<Rect>,
}

impl TextMetrics {
    /// Box whose center is placed on the anchor.
    pub fn anchor_box(&self, mode: CenterMode) -> Rect {
        match (mode, self.ink) {
            (CenterMode::Visual, Some(ink)) => ink,
            _ => self.advance,
        }
    }

    /// Extent that auto sizing keeps inside the canvas.
    pub fn content_box(&self, mode: CenterMode) -> Rect {
        match (mode, self.ink) {
            (CenterMode::Visual, Some(ink)) => ink,
            (CenterMode::Geometry, Some(ink)) => self.advance.union(ink),
            (_, None) => self.advance,
        }
    }
}

/// Resolved canvas size and the translation applied to the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasPlan {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Whole-pixel translation from layout coordinates to canvas coordinates.
    pub offset: Vec2,
    /// Anchor point in canvas coordinates.
    pub anchor: Point,
}

/// Size the canvas and place the text for `config`.
///
/// An auto-sized axis wraps the pixel-snapped content box plus padding, and the ratio only moves
/// the content within whatever slack is left, so auto sizing never clips. A fixed axis places the
/// anchor box center at `pad + ratio * inner` and may clip.
pub fn plan_canvas(metrics: &TextMetrics, config: &GenerationConfig) -> TextToolResult<CanvasPlan> {
    let scale = config.scale();
    let pad = scaled(config.padding, scale);
    let center = metrics.anchor_box(config.center_mode).center();
    let content = snap_out(metrics.content_box(config.center_mode));
    let line_h = snap_out(metrics.advance).height();

    let width = match config.canvas_width {
        Dimension::Fixed(w) => scaled(w, scale),
        Dimension::Auto => auto_extent(content.width(), pad),
    };
    let height = match config.canvas_height {
        Dimension::Fixed(h) => scaled(h, scale),
        Dimension::Auto => auto_extent(content.height().max(line_h), pad),
    };

    if width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
        return Err(TextToolError::render(format!(
            "canvas {width}x{height} exceeds the {MAX_CANVAS_EDGE} px edge limit"
        )));
    }
    let inner_w = i64::from(width) - 2 * i64::from(pad);
    let inner_h = i64::from(height) - 2 * i64::from(pad);
    let fixed_w = matches!(config.canvas_width, Dimension::Fixed(_));
    let fixed_h = matches!(config.canvas_height, Dimension::Fixed(_));
    if (inner_w <= 0 && fixed_w) || (inner_h <= 0 && fixed_h) {
        return Err(TextToolError::render(format!(
            "canvas {width}x{height} leaves no drawable area inside {pad} px padding"
        )));
    }
    if inner_w <= 0 || inner_h <= 0 {
        // Auto-sized blank text: nothing to place, the canvas is padding only.
        return Ok(CanvasPlan {
            width,
            height,
            offset: Vec2::ZERO,
            anchor: Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0),
        });
    }

    let pad = f64::from(pad);
    let (inner_w, inner_h) = (inner_w as f64, inner_h as f64);
    let anchor = Point::new(
        pad + config.x_offset_ratio * inner_w,
        pad + config.y_offset_ratio * inner_h,
    );

    let dx = if fixed_w {
        (anchor.x - center.x).round()
    } else {
        pad - content.x0 + slack_shift(inner_w - content.width(), config.x_offset_ratio)
    };
    let dy = if fixed_h {
        (anchor.y - center.y).round()
    } else {
        pad - content.y0 + slack_shift(inner_h - content.height(), config.y_offset_ratio)
    };

    Ok(CanvasPlan {
        width,
        height,
        offset: Vec2::new(dx, dy),
        anchor,
    })
}

/// Grow `rect` outward to whole pixels, ignoring float noise at the edges.
fn snap_out(rect: Rect) -> Rect {
    const EPS: f64 = 1e-6;
    Rect::new(
        (rect.x0 + EPS).floor(),
        (rect.y0 + EPS).floor(),
        (rect.x1 - EPS).ceil(),
        (rect.y1 - EPS).ceil(),
    )
}

fn auto_extent(content: f64, pad: u32) -> u32 {
    let inner = content.max(0.0).min(f64::from(u32::MAX)) as u32;
    inner.saturating_add(pad.saturating_mul(2)).max(1)
}

fn slack_shift(slack: f64, ratio: f64) -> f64 {
    (slack.max(0.0) * ratio).round()
}

fn scaled(v: u32, scale: f64) -> u32 {
    (f64::from(v) * scale).round().min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/render/placement.rs"]
mod tests;
