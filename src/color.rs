// SPDX-License-Identifier: PMPL-1.0-or-later
//! CSS color parsing and WCAG relative luminance.
//!
//! Supports hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()`/`rgba()`,
//! `hsl()`/`hsla()` in comma or space syntax, the CSS named colors most
//! seen in the wild, and `transparent`.
//! <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>

/// An sRGB color with alpha in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, alpha: 0.0 };

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }

    /// Composite this color over an opaque backdrop
    pub fn over(&self, backdrop: Color) -> Color {
        if self.is_opaque() {
            return Color::rgb(self.r, self.g, self.b);
        }
        let a = self.alpha.clamp(0.0, 1.0);
        let mix = |top: u8, bottom: u8| -> u8 {
            (top as f64 * a + bottom as f64 * (1.0 - a)).round().clamp(0.0, 255.0) as u8
        };
        Color::rgb(
            mix(self.r, backdrop.r),
            mix(self.g, backdrop.g),
            mix(self.b, backdrop.b),
        )
    }

    /// WCAG relative luminance
    pub fn luminance(&self) -> f64 {
        relative_luminance(self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.alpha)
        }
    }
}

/// Linearize one 8-bit sRGB channel
fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Calculate relative luminance per WCAG 2.x
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * linearize(r) + 0.7152 * linearize(g) + 0.0722 * linearize(b)
}

/// Contrast ratio between two opaque colors, in `1.0..=21.0`
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let l1 = a.luminance();
    let l2 = b.luminance();
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Parse any supported CSS color value
pub fn parse_color(value: &str) -> Option<Color> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(hex) = v.strip_prefix('#') {
        parse_hex(hex)
    } else if let Some(args) = function_args(&v, "rgba").or_else(|| function_args(&v, "rgb")) {
        parse_rgb_args(args)
    } else if let Some(args) = function_args(&v, "hsla").or_else(|| function_args(&v, "hsl")) {
        parse_hsl_args(args)
    } else {
        parse_named_color(&v)
    }
}

/// Parse hex digits without the leading `#`
pub fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let short = |i: usize| u8::from_str_radix(&hex[i..i + 1].repeat(2), 16).ok();
    let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(short(0)?, short(1)?, short(2)?)),
        4 => Some(Color { alpha: short(3)? as f64 / 255.0, ..Color::rgb(short(0)?, short(1)?, short(2)?) }),
        6 => Some(Color::rgb(long(0)?, long(2)?, long(4)?)),
        8 => Some(Color { alpha: long(6)? as f64 / 255.0, ..Color::rgb(long(0)?, long(2)?, long(4)?) }),
        _ => None,
    }
}

/// Arguments of `name(...)`, if `value` is that function
fn function_args<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Split function arguments on commas, whitespace and the `/` alpha separator
fn split_args(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_channel(token: &str) -> Option<u8> {
    let value = match token.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? / 100.0 * 255.0,
        None => token.parse::<f64>().ok()?,
    };
    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(token: Option<&&str>) -> Option<f64> {
    match token {
        None => Some(1.0),
        Some(t) => {
            let value = match t.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => t.parse::<f64>().ok()?,
            };
            Some(value.clamp(0.0, 1.0))
        }
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts = split_args(args);
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }
    Some(Color {
        r: parse_channel(parts[0])?,
        g: parse_channel(parts[1])?,
        b: parse_channel(parts[2])?,
        alpha: parse_alpha(parts.get(3))?,
    })
}

fn parse_hsl_args(args: &str) -> Option<Color> {
    let parts = split_args(args);
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }
    let hue = parts[0].trim_end_matches("deg").parse::<f64>().ok()?;
    let sat = parts[1].strip_suffix('%')?.parse::<f64>().ok()? / 100.0;
    let light = parts[2].strip_suffix('%')?.parse::<f64>().ok()? / 100.0;
    let (r, g, b) = hsl_to_rgb(hue, sat.clamp(0.0, 1.0), light.clamp(0.0, 1.0));
    Some(Color { r, g, b, alpha: parse_alpha(parts.get(3))? })
}

/// Convert HSL (hue in degrees) to 8-bit RGB
pub fn hsl_to_rgb(hue: f64, sat: f64, light: f64) -> (u8, u8, u8) {
    let h = hue.rem_euclid(360.0) / 360.0;
    let q = if light < 0.5 { light * (1.0 + sat) } else { light + sat - light * sat };
    let p = 2.0 * light - q;
    let channel = |t: f64| -> u8 {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };
    (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

/// Parse a named CSS color
pub fn parse_named_color(name: &str) -> Option<Color> {
    let rgb = match name {
        "transparent" => return Some(Color::TRANSPARENT),
        "white" => (255, 255, 255),
        "black" => (0, 0, 0),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "gray" | "grey" => (128, 128, 128),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "dimgray" | "dimgrey" => (105, 105, 105),
        "gainsboro" => (220, 220, 220),
        "whitesmoke" => (245, 245, 245),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "darkred" => (139, 0, 0),
        "olive" => (128, 128, 0),
        "lime" => (0, 255, 0),
        "darkgreen" => (0, 100, 0),
        "aqua" | "cyan" => (0, 255, 255),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        "darkblue" => (0, 0, 139),
        "royalblue" => (65, 105, 225),
        "steelblue" => (70, 130, 180),
        "skyblue" => (135, 206, 235),
        "lightblue" => (173, 216, 230),
        "fuchsia" | "magenta" => (255, 0, 255),
        "purple" => (128, 0, 128),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "pink" => (255, 192, 203),
        "hotpink" => (255, 105, 180),
        "orange" => (255, 165, 0),
        "darkorange" => (255, 140, 0),
        "gold" => (255, 215, 0),
        "brown" => (165, 42, 42),
        "chocolate" => (210, 105, 30),
        "tomato" => (255, 99, 71),
        "crimson" => (220, 20, 60),
        "coral" => (255, 127, 80),
        "salmon" => (250, 128, 114),
        "beige" => (245, 245, 220),
        "ivory" => (255, 255, 240),
        "khaki" => (240, 230, 140),
        "lavender" => (230, 230, 250),
        "slategray" | "slategrey" => (112, 128, 144),
        "darkslategray" | "darkslategrey" => (47, 79, 79),
        _ => return None,
    };
    Some(Color::rgb(rgb.0, rgb.1, rgb.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#fff"), Some(Color::WHITE));
        assert_eq!(parse_color("#000"), Some(Color::BLACK));
        assert_eq!(parse_color("#FF0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("#00ff0080").map(|c| c.g), Some(255));
        assert!(parse_color("#00ff0000").unwrap().is_transparent());
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ggg"), None);
    }

    #[test]
    fn test_parse_rgb_color() {
        assert_eq!(parse_color("rgb(255, 0, 0)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("rgb(119 119 119)"), Some(Color::rgb(119, 119, 119)));
        assert_eq!(parse_color("rgb(100%, 0%, 0%)"), Some(Color::rgb(255, 0, 0)));
        let half = parse_color("rgba(0, 128, 0, 0.5)").unwrap();
        assert_eq!((half.r, half.g, half.b), (0, 128, 0));
        assert!((half.alpha - 0.5).abs() < 1e-9);
        assert!(parse_color("rgba(0, 0, 0, 0)").unwrap().is_transparent());
        assert_eq!(parse_color("rgb(1, 2)"), None);
    }

    #[test]
    fn test_parse_hsl_color() {
        assert_eq!(parse_color("hsl(0, 100%, 50%)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("hsl(120deg 100% 25%)"), Some(Color::rgb(0, 128, 0)));
        assert_eq!(parse_color("hsl(0, 0%, 100%)"), Some(Color::WHITE));
    }

    #[test]
    fn test_parse_named_and_unknown() {
        assert_eq!(parse_color("White"), Some(Color::WHITE));
        assert!(parse_color("transparent").unwrap().is_transparent());
        assert_eq!(parse_color("var(--brand)"), None);
        assert_eq!(parse_color("not-a-color"), None);
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        let ratio = contrast_ratio(Color::BLACK, Color::WHITE);
        assert!((ratio - 21.0).abs() < 0.01, "Black on white should be 21:1, got {:.2}", ratio);
    }

    #[test]
    fn test_contrast_ratio_grey_on_white() {
        let ratio = contrast_ratio(Color::rgb(119, 119, 119), Color::WHITE);
        assert!((ratio - 4.48).abs() < 0.01, "#777 on white should be ~4.48:1, got {:.3}", ratio);
    }

    #[test]
    fn test_contrast_ratio_same_color() {
        let ratio = contrast_ratio(Color::rgb(128, 128, 128), Color::rgb(128, 128, 128));
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_compositing() {
        let half_black = Color { alpha: 0.5, ..Color::BLACK };
        assert_eq!(half_black.over(Color::WHITE), Color::rgb(128, 128, 128));
        assert_eq!(Color::rgb(1, 2, 3).over(Color::WHITE), Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_relative_luminance() {
        assert!((relative_luminance(255, 255, 255) - 1.0).abs() < 1e-9);
        assert!(relative_luminance(0, 0, 0).abs() < 1e-9);
    }
}
