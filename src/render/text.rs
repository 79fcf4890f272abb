use std::collections::HashMap;

use crate::fonts::FontEntry;
use crate::foundation::color::Rgba8;
use crate::foundation::error::{TextToolError, TextToolResult};

/// Stateful helper for building single-paragraph parley layouts from registry fonts.
///
/// Font bytes are registered with parley once per alias.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    families: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh parley contexts.
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &FontEntry) -> TextToolResult<String> {
        if let Some(name) = self.families.get(&font.alias) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            TextToolError::render(format!(
                "font '{}' ({}) contains no usable font family",
                font.alias,
                font.path.display()
            ))
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TextToolError::render("registered font family has no name"))?
            .to_string();

        self.families
            .insert(font.alias.clone(), family_name.clone());
        Ok(family_name)
    }

    /// Shape and lay out `text` without wrapping.
    ///
    /// Characters the primary font cannot draw fall back to `fallback` when given. Each glyph run
    /// records the font that was actually chosen for it.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        font: &FontEntry,
        fallback: Option<&FontEntry>,
        size_px: f32,
    ) -> TextToolResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TextToolError::render("text size must be finite and > 0"));
        }

        let mut families = vec![self.family_for(font)?];
        if let Some(fallback) = fallback.filter(|f| f.alias != font.alias) {
            match self.family_for(fallback) {
                Ok(name) if !families.contains(&name) => families.push(name),
                Ok(_) => {}
                Err(err) => tracing::warn!(alias = %fallback.alias, %err, "fallback font unusable"),
            }
        }
        let stack: Vec<parley::style::FontFamily<'_>> = families
            .iter()
            .map(|name| parley::style::FontFamily::Named(std::borrow::Cow::Borrowed(name.as_str())))
            .collect();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::List(std::borrow::Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Fill every glyph run of `layout` with the current paint and transform of `ctx`.
///
/// Runs whose horizontal extent misses `clip_x` are skipped.
pub(crate) fn fill_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<Rgba8>,
    clip_x: Option<(f32, f32)>,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let mut x = run.offset();
            let y = run.baseline();
            let font_size = run.run().font_size();
            let glyphs: Vec<vello_cpu::Glyph> = run
                .glyphs()
                .map(|g| {
                    let glyph = vello_cpu::Glyph {
                        id: g.id,
                        x: x + g.x,
                        y: y - g.y,
                    };
                    x += g.advance;
                    glyph
                })
                .filter(|g| {
                    // Glyph ink stays within two ems of its origin.
                    let reach = 2.0 * font_size;
                    clip_x.is_none_or(|(lo, hi)| g.x + reach >= lo && g.x - reach <= hi)
                })
                .collect();
            if glyphs.is_empty() {
                continue;
            }
            ctx.glyph_run(run.run().font())
                .font_size(font_size)
                .fill_glyphs(glyphs.into_iter());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
