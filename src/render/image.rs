use crate::foundation::error::{TextToolError, TextToolResult};

/// One rendered segment as straight-alpha RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Resolution the image was rendered at.
    pub dpi: u32,
    /// RGBA8 bytes, tightly packed, row-major, not premultiplied.
    pub data: Vec<u8>,
}

impl RenderedImage {
    /// Pixel at `(x, y)` as `[r, g, b, a]`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Encode as 8-bit RGBA PNG with the resolution recorded in a `pHYs` chunk.
    pub fn encode_png(&self) -> TextToolResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| TextToolError::render("image byte len does not match dimensions"))?;
        let png_err = |e: png::EncodingError| TextToolError::render(format!("png encode failed: {e}"));

        let mut buf = Vec::new();
        let mut encoder = png::Encoder::new(&mut buf, img.width(), img.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = dpi_to_pixels_per_meter(self.dpi);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header().map_err(png_err)?;
        writer.write_image_data(img.as_raw()).map_err(png_err)?;
        writer.finish().map_err(png_err)?;
        Ok(buf)
    }
}

/// Convert dots per inch to the pixels-per-meter unit PNG stores.
pub(crate) fn dpi_to_pixels_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) / 0.0254).round() as u32
}

#[cfg(test)]
#[path = "../../tests/unit/render/image.rs"]
mod tests;
