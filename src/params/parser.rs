use std::str::FromStr;

use crate::foundation::color::Rgba8;
use crate::foundation::error::{TextToolError, TextToolResult};
use crate::params::config::{CenterMode, Dimension, GenerationConfig, Mode};

/// Recognized parameter keys, in canonical order.
pub const PARAM_KEYS: [&str; 12] = [
    "mode",
    "font",
    "bg_color",
    "text_color",
    "center_mode",
    "dpi",
    "padding",
    "x_offset_ratio",
    "y_offset_ratio",
    "font_size",
    "canvas_height",
    "canvas_width",
];

const MAX_DPI: u32 = 1200;
const MAX_FONT_SIZE: u32 = 1000;

/// Result of scanning a `generate` argument string.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedArgs {
    /// Fully populated configuration.
    pub config: GenerationConfig,
    /// Literal text following the parameters, verbatim.
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    Params,
    Text,
}

enum Token<'a> {
    Param { key: &'a str, value: &'a str },
    NearMiss { key: &'a str, suggestion: &'static str },
    Literal,
}

/// Scan `raw` into a configuration and the literal text that follows it.
///
/// Parameters must come first. The first token that is not a recognized `key:value` pair starts
/// the literal text, and everything from there on (including later `key:value`-shaped tokens and
/// all whitespace) is kept verbatim. A `key:value` token whose key is a near miss of a recognized
/// key is rejected instead of being read as text.
pub fn parse_generate_args(raw: &str, default_font: &str) -> TextToolResult<ParsedArgs> {
    let mut config = GenerationConfig::with_font(default_font);
    let mut seen = [false; PARAM_KEYS.len()];
    let mut state = ScanState::Params;
    let mut text_start = raw.len();
    let mut pos = 0usize;

    while state == ScanState::Params {
        let rest = &raw[pos..];
        let Some(skip) = rest.find(|c: char| !c.is_whitespace()) else {
            break;
        };
        let start = pos + skip;
        let end = raw[start..]
            .find(char::is_whitespace)
            .map_or(raw.len(), |n| start + n);

        match classify(&raw[start..end]) {
            Token::Param { key, value } => {
                let slot = key_slot(key);
                if seen[slot] {
                    return Err(TextToolError::parameter(key, value, "duplicate parameter"));
                }
                seen[slot] = true;
                apply(&mut config, key, value)?;
                pos = end;
            }
            Token::NearMiss { key, suggestion } => {
                return Err(TextToolError::UnknownParameter {
                    key: key.to_owned(),
                    suggestion: suggestion.to_owned(),
                });
            }
            Token::Literal => {
                text_start = start;
                state = ScanState::Text;
            }
        }
    }

    Ok(ParsedArgs {
        config,
        text: raw[text_start..].to_owned(),
    })
}

fn classify(token: &str) -> Token<'_> {
    let Some((key, value)) = token.split_once(':') else {
        return Token::Literal;
    };
    if key.is_empty() || value.is_empty() || !key.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
    {
        return Token::Literal;
    }
    if PARAM_KEYS.contains(&key) {
        return Token::Param { key, value };
    }
    match nearest_key(key) {
        Some(suggestion) => Token::NearMiss { key, suggestion },
        None => Token::Literal,
    }
}

fn key_slot(key: &str) -> usize {
    PARAM_KEYS.iter().position(|k| *k == key).unwrap_or(0)
}

// A near miss shares the first letter of a recognized key and is within the edit budget of the
// written key, so ordinary words like `note:` or `code:` stay literal text.
fn nearest_key(key: &str) -> Option<&'static str> {
    let budget = near_miss_budget(key);
    let first = key.chars().next()?;
    PARAM_KEYS
        .iter()
        .filter(|k| k.starts_with(first))
        .map(|k| (edit_distance(key, k), *k))
        .filter(|(d, _)| *d <= budget)
        .min_by_key(|(d, _)| *d)
        .map(|(_, k)| k)
}

fn near_miss_budget(key: &str) -> usize {
    if key.chars().count() < 6 { 1 } else { 2 }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let subst = prev[j] + usize::from(ca != *cb);
            cur[j + 1] = subst.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn apply(config: &mut GenerationConfig, key: &str, value: &str) -> TextToolResult<()> {
    let bad = |reason: String| TextToolError::parameter(key, value, reason);
    match key {
        "mode" => config.mode = Mode::from_str(value).map_err(bad)?,
        "font" => config.font_alias = value.to_owned(),
        "bg_color" => config.bg_color = Rgba8::from_str(value).map_err(bad)?,
        "text_color" => config.text_color = Rgba8::from_str(value).map_err(bad)?,
        "center_mode" => config.center_mode = CenterMode::from_str(value).map_err(bad)?,
        "dpi" => config.dpi = parse_bounded_u32(value, 1, MAX_DPI).map_err(bad)?,
        "padding" => config.padding = parse_bounded_u32(value, 0, u32::MAX).map_err(bad)?,
        "x_offset_ratio" => config.x_offset_ratio = parse_ratio(value).map_err(bad)?,
        "y_offset_ratio" => config.y_offset_ratio = parse_ratio(value).map_err(bad)?,
        "font_size" => config.font_size = parse_bounded_u32(value, 1, MAX_FONT_SIZE).map_err(bad)?,
        "canvas_height" => config.canvas_height = Dimension::from_str(value).map_err(bad)?,
        "canvas_width" => config.canvas_width = Dimension::from_str(value).map_err(bad)?,
        _ => return Err(bad("unrecognized parameter".to_owned())),
    }
    Ok(())
}

fn parse_bounded_u32(value: &str, min: u32, max: u32) -> Result<u32, String> {
    let v = value
        .parse::<u32>()
        .map_err(|_| "expected a non-negative integer".to_owned())?;
    if v < min || v > max {
        return Err(format!("must be within {min}..={max}"));
    }
    Ok(v)
}

fn parse_ratio(value: &str) -> Result<f64, String> {
    let v = value
        .parse::<f64>()
        .map_err(|_| "expected a number".to_owned())?;
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err("must be within 0..=1".to_owned());
    }
    Ok(v)
}

#[cfg(test)]
#[path = "../../tests/unit/params/parser.rs"]
mod tests;
