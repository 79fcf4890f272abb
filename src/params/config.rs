use std::fmt;
use std::str::FromStr;

use crate::foundation::color::Rgba8;

/// Baseline resolution all pixel quantities are expressed in.
pub const DEFAULT_DPI: u32 = 72;
/// Font size (in points at 72 dpi) used when `font_size` is omitted.
pub const DEFAULT_FONT_SIZE: u32 = 48;

/// How literal text is split into segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Whole text as one image.
    #[default]
    Single,
    /// One image per character.
    Char,
    /// One image per whitespace-separated word.
    Word,
    /// One image per line.
    Line,
    /// One image per `|`-separated token.
    Token,
}

impl Mode {
    /// Parameter spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Char => "char",
            Self::Word => "word",
            Self::Line => "line",
            Self::Token => "token",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "char" => Ok(Self::Char),
            "word" => Ok(Self::Word),
            "line" => Ok(Self::Line),
            "token" => Ok(Self::Token),
            _ => Err("expected one of single, char, word, line, token".to_owned()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which box of the rendered text is placed on the anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CenterMode {
    /// Center of the nominal advance/line box.
    Geometry,
    /// Center of the inked glyph pixels.
    #[default]
    Visual,
}

impl CenterMode {
    /// Parameter spelling of the center mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::Visual => "visual",
        }
    }
}

impl FromStr for CenterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geometry" => Ok(Self::Geometry),
            "visual" => Ok(Self::Visual),
            _ => Err("expected one of geometry, visual".to_owned()),
        }
    }
}

impl fmt::Display for CenterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canvas dimension: derived from the text, or fixed (in 72-dpi pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Computed from font metrics / glyph extents.
    #[default]
    Auto,
    /// Explicit size before dpi scaling.
    Fixed(u32),
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            return Ok(Self::Auto);
        }
        match s.parse::<u32>() {
            Ok(0) | Err(_) => Err("expected a positive integer or 'auto'".to_owned()),
            Ok(v) => Ok(Self::Fixed(v)),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(v) => write!(f, "{v}"),
        }
    }
}

/// Fully resolved configuration for one generation request.
///
/// Every field is populated; parsing never produces a partial config.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    /// Segmentation mode.
    pub mode: Mode,
    /// Font alias, resolved through the font registry at render time.
    pub font_alias: String,
    /// Background fill.
    pub bg_color: Rgba8,
    /// Glyph fill.
    pub text_color: Rgba8,
    /// Anchor box selection.
    pub center_mode: CenterMode,
    /// Output resolution; pixel quantities scale by `dpi / 72`.
    pub dpi: u32,
    /// Inset on every side, in 72-dpi pixels.
    pub padding: u32,
    /// Horizontal anchor position within the padded area, `0..=1`.
    pub x_offset_ratio: f64,
    /// Vertical anchor position within the padded area, `0..=1`.
    pub y_offset_ratio: f64,
    /// Font size in points (pixels at 72 dpi).
    pub font_size: u32,
    /// Canvas height.
    pub canvas_height: Dimension,
    /// Canvas width.
    pub canvas_width: Dimension,
}

impl GenerationConfig {
    /// Default configuration using `font_alias` as the font.
    pub fn with_font(font_alias: impl Into<String>) -> Self {
        Self {
            mode: Mode::Single,
            font_alias: font_alias.into(),
            bg_color: Rgba8::TRANSPARENT,
            text_color: Rgba8::BLACK,
            center_mode: CenterMode::Visual,
            dpi: DEFAULT_DPI,
            padding: 0,
            x_offset_ratio: 0.5,
            y_offset_ratio: 0.5,
            font_size: DEFAULT_FONT_SIZE,
            canvas_height: Dimension::Auto,
            canvas_width: Dimension::Auto,
        }
    }

    /// Multiplier from 72-dpi units to output pixels.
    pub fn scale(&self) -> f64 {
        f64::from(self.dpi) / f64::from(DEFAULT_DPI)
    }

    /// Canonical parameter form, one `key:value` per element, in key-table order.
    ///
    /// Re-parsing the joined output yields an identical config.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            format!("mode:{}", self.mode),
            format!("font:{}", self.font_alias),
            format!("bg_color:{}", self.bg_color),
            format!("text_color:{}", self.text_color),
            format!("center_mode:{}", self.center_mode),
            format!("dpi:{}", self.dpi),
            format!("padding:{}", self.padding),
            format!("x_offset_ratio:{}", self.x_offset_ratio),
            format!("y_offset_ratio:{}", self.y_offset_ratio),
            format!("font_size:{}", self.font_size),
            format!("canvas_height:{}", self.canvas_height),
            format!("canvas_width:{}", self.canvas_width),
        ]
    }
}
