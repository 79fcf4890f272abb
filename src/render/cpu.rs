use std::sync::Arc;

use kurbo::Rect;

use crate::fonts::FontRegistry;
use crate::foundation::color::unpremultiply_rgba8_in_place;
use crate::foundation::error::{TextToolError, TextToolResult};
use crate::params::GenerationConfig;
use crate::render::image::RenderedImage;
use crate::render::placement::{CanvasPlan, MAX_CANVAS_EDGE, TextMetrics, plan_canvas};
use crate::render::text::{TextLayoutEngine, fill_layout};

/// Pixel budget of one scratch tile used for ink measurement.
const INK_TILE_PIXELS: u32 = 1 << 22;

/// CPU text renderer.
///
/// Holds parley caches, so it is not shared between threads; build one per worker. The font
/// registry is shared read-only.
pub struct TextRenderer {
    fonts: Arc<FontRegistry>,
    engine: TextLayoutEngine,
}

impl TextRenderer {
    /// Create a renderer over a shared font registry.
    pub fn new(fonts: Arc<FontRegistry>) -> Self {
        Self {
            fonts,
            engine: TextLayoutEngine::new(),
        }
    }

    /// Render one segment of text under `config`.
    ///
    /// Characters missing from the requested font are drawn with the registry's default font.
    /// Fails with [`TextToolError::FontNotFound`] for unregistered aliases and
    /// [`TextToolError::Render`] for unusable fonts or impossible canvases. Nothing is retried.
    #[tracing::instrument(skip_all, fields(font = %config.font_alias, chars = text.chars().count()))]
    pub fn render(&mut self, text: &str, config: &GenerationConfig) -> TextToolResult<RenderedImage> {
        let fonts = Arc::clone(&self.fonts);
        let font = fonts.resolve(&config.font_alias)?;
        let fallback = fonts.resolve(fonts.default_alias()).ok();
        let size_px = (f64::from(config.font_size) * config.scale()) as f32;

        // Blank text still needs line metrics for the auto height.
        let shaped = if text.is_empty() { " " } else { text };
        let layout = self.engine.layout_plain(shaped, font, fallback, size_px)?;
        let advance_w = if text.is_empty() {
            0.0
        } else {
            f64::from(layout.full_width())
        };
        let advance = Rect::new(0.0, 0.0, advance_w, f64::from(layout.height()));

        let ink = if text.is_empty() {
            None
        } else {
            measure_ink(&layout, advance, size_px)?
        };

        let metrics = TextMetrics { advance, ink };
        let plan = plan_canvas(&metrics, config)?;
        tracing::debug!(
            width = plan.width,
            height = plan.height,
            dx = plan.offset.x,
            dy = plan.offset.y,
            "canvas planned"
        );

        let layout = (!text.is_empty()).then_some(&layout);
        draw_canvas(&plan, config, layout)
    }
}

/// Render the layout on scratch tiles and return the bounding box of inked pixels in layout
/// coordinates.
///
/// The scratch area spans the advance box plus a margin on every side. It is cut into vertical
/// tiles, so text longer than any single raster surface still measures.
fn measure_ink(
    layout: &parley::Layout<crate::foundation::color::Rgba8>,
    advance: Rect,
    size_px: f32,
) -> TextToolResult<Option<Rect>> {
    // Glyphs may overhang the nominal box by bearings, accents or descenders.
    let margin = (f64::from(size_px).ceil() as u32).saturating_add(2);
    let total_w = (advance.width().ceil() as u32).saturating_add(margin.saturating_mul(2));
    let h = (advance.height().ceil() as u32).saturating_add(margin.saturating_mul(2));
    let tile_w = (INK_TILE_PIXELS / h.max(1)).clamp(256, MAX_CANVAS_EDGE).min(total_w);
    let (w16, h16) = surface_dims(tile_w, h)?;
    let m = f64::from(margin);

    let mut ink: Option<Rect> = None;
    let mut tile_x = 0u32;
    while tile_x < total_w {
        let left = f64::from(tile_x);
        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((m - left, m)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        let window = ((left - m) as f32, (left - m + f64::from(tile_w)) as f32);
        fill_layout(&mut ctx, layout, Some(window));
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);

        if let Some((x0, y0, x1, y1)) = alpha_bounds(pixmap.data_as_u8_slice(), tile_w) {
            let tile_ink = Rect::new(
                f64::from(x0) + left - m,
                f64::from(y0) - m,
                f64::from(x1) + left - m,
                f64::from(y1) - m,
            );
            ink = Some(ink.map_or(tile_ink, |r| r.union(tile_ink)));
        }
        tile_x = tile_x.saturating_add(tile_w);
    }
    if total_w > tile_w {
        tracing::debug!(total_w, tile_w, "ink measured in tiles");
    }
    Ok(ink)
}

/// Half-open pixel bounds `(x0, y0, x1, y1)` of all pixels with non-zero alpha.
pub(crate) fn alpha_bounds(rgba: &[u8], width: u32) -> Option<(u32, u32, u32, u32)> {
    if width == 0 {
        return None;
    }
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (row_i, row) in rgba.chunks_exact(width as usize * 4).enumerate() {
        let y = row_i as u32;
        for (col_i, px) in row.chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let x = col_i as u32;
            bounds = Some(match bounds {
                None => (x, y, x + 1, y + 1),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
            });
        }
    }
    bounds
}

fn draw_canvas(
    plan: &CanvasPlan,
    config: &GenerationConfig,
    layout: Option<&parley::Layout<crate::foundation::color::Rgba8>>,
) -> TextToolResult<RenderedImage> {
    let (w16, h16) = surface_dims(plan.width, plan.height)?;
    let mut ctx = vello_cpu::RenderContext::new(w16, h16);

    if config.bg_color.a > 0 {
        ctx.set_paint(config.bg_color.to_peniko());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(plan.width),
            f64::from(plan.height),
        ));
    }
    if let Some(layout) = layout {
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            plan.offset.x,
            plan.offset.y,
        )));
        ctx.set_paint(config.text_color.to_peniko());
        fill_layout(&mut ctx, layout, None);
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut pixmap);
    let mut data = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_rgba8_in_place(&mut data);

    Ok(RenderedImage {
        width: plan.width,
        height: plan.height,
        dpi: config.dpi,
        data,
    })
}

fn surface_dims(width: u32, height: u32) -> TextToolResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| TextToolError::render(format!("surface width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| TextToolError::render(format!("surface height {height} exceeds u16")))?;
    if w == 0 || h == 0 {
        return Err(TextToolError::render("surface must be at least 1x1"));
    }
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
