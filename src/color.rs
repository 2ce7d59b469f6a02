//! Border color parsing and native encoding
//!
//! User-facing colors are `#RRGGBB` hex strings plus the keywords `default`
//! (let the compositor draw its normal border) and `none` (suppress the
//! border). The native write primitive takes a BGR-ordered colorref with
//! sentinel values for both keywords; the channel swap lives entirely in this
//! module.

use crate::constants::anim;

/// A parsed user color: an explicit RGB value or one of the sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    /// 24-bit color, `0xRRGGBB`
    Rgb(u32),
    /// Keyword `default`: the compositor's normal border
    Default,
    /// Keyword `none`: no border at all
    None,
    /// Anything that failed to parse
    Invalid,
}

impl ColorSpec {
    /// Parse user input into a color spec.
    ///
    /// Accepts `default`, `none`, and 6-digit hex with or without a leading
    /// `#`, case-insensitively. Everything else is `Invalid`.
    pub fn parse(input: &str) -> ColorSpec {
        let v = input.trim().to_ascii_lowercase();
        match v.as_str() {
            "default" => return ColorSpec::Default,
            "none" => return ColorSpec::None,
            _ => {}
        }
        let hex = v.strip_prefix('#').unwrap_or(&v);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return ColorSpec::Invalid;
        }
        // Validated above, cannot fail
        ColorSpec::Rgb(u32::from_str_radix(hex, 16).unwrap_or(0))
    }

    /// Encode for the native write primitive.
    pub fn to_colorref(self) -> Colorref {
        match self {
            ColorSpec::Rgb(rgb) => Colorref::from_rgb(rgb),
            ColorSpec::Default => Colorref::DEFAULT,
            ColorSpec::None => Colorref::NONE,
            ColorSpec::Invalid => Colorref::INVALID,
        }
    }

    /// Display form, the inverse of [`ColorSpec::parse`] for RGB values.
    ///
    /// The sentinels all display as `#000000`; they are not meant to
    /// round-trip visually.
    pub fn to_display(self) -> String {
        match self {
            ColorSpec::Rgb(rgb) => format!("#{rgb:06X}"),
            _ => "#000000".to_string(),
        }
    }
}

/// Normalize arbitrary color input to `#RRGGBB` uppercase, or pass through
/// the lowercase keywords `default`/`none` unchanged.
///
/// Idempotent; anything that does not end up exactly 7 characters long after
/// prefixing `#` collapses to `#000000`.
pub fn normalize(input: &str) -> String {
    let s = input.trim();
    if s.is_empty() {
        return "#000000".to_string();
    }
    let lower = s.to_ascii_lowercase();
    if lower == "default" || lower == "none" {
        return lower;
    }
    let prefixed = if s.starts_with('#') {
        s.to_string()
    } else {
        format!("#{s}")
    };
    if prefixed.len() != 7 {
        return "#000000".to_string();
    }
    prefixed.to_ascii_uppercase()
}

/// Extract an animation anchor from a rule color field.
///
/// `default`/`none` carry no anchor (the engine substitutes red/blue); other
/// input is normalized first, so malformed lengths collapse to black while a
/// right-length string with non-hex digits yields no anchor.
pub fn anchor_rgb(input: &str) -> Option<u32> {
    let n = normalize(input);
    if n == "default" || n == "none" {
        return None;
    }
    u32::from_str_radix(&n[1..], 16).ok()
}

/// Linear interpolation between two `0xRRGGBB` colors, per channel,
/// truncated to integer.
pub fn lerp_rgb(a: Option<u32>, b: Option<u32>, t: f64) -> u32 {
    let a = a.unwrap_or(anim::START_FALLBACK);
    let b = b.unwrap_or(anim::END_FALLBACK);
    let (ar, ag, ab) = split_rgb(a);
    let (br, bg, bb) = split_rgb(b);
    let r = (ar as f64 + (br as f64 - ar as f64) * t) as u32;
    let g = (ag as f64 + (bg as f64 - ag as f64) * t) as u32;
    let b = (ab as f64 + (bb as f64 - ab as f64) * t) as u32;
    join_rgb(r, g, b)
}

/// Split `0xRRGGBB` into channels.
pub fn split_rgb(rgb: u32) -> (u32, u32, u32) {
    ((rgb >> 16) & 0xFF, (rgb >> 8) & 0xFF, rgb & 0xFF)
}

/// Join channels into `0xRRGGBB`.
pub fn join_rgb(r: u32, g: u32, b: u32) -> u32 {
    (r << 16) | (g << 8) | b
}

/// Native border color value: BGR byte order plus sentinel encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colorref(pub u32);

impl Colorref {
    /// Sentinel: draw the compositor's normal border
    pub const DEFAULT: Colorref = Colorref(0xFFFF_FFFF);

    /// Sentinel: draw no border
    pub const NONE: Colorref = Colorref(0xFFFF_FFFE);

    /// Sentinel: input failed to parse
    pub const INVALID: Colorref = Colorref(0x0000_00FF);

    /// Encode a `0xRRGGBB` value into BGR order.
    pub fn from_rgb(rgb: u32) -> Colorref {
        let (r, g, b) = split_rgb(rgb);
        Colorref((b << 16) | (g << 8) | r)
    }

    /// True for the three values that must never reach the write primitive.
    pub fn is_sentinel(self) -> bool {
        matches!(self, Colorref::DEFAULT | Colorref::NONE | Colorref::INVALID)
    }

    /// Decode back to a TrueColor `0xRRGGBB` pixel for the X11 backend.
    pub fn to_x11_pixel(self) -> u32 {
        let b = (self.0 >> 16) & 0xFF;
        let g = (self.0 >> 8) & 0xFF;
        let r = self.0 & 0xFF;
        join_rgb(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(ColorSpec::parse("default"), ColorSpec::Default);
        assert_eq!(ColorSpec::parse("  Default "), ColorSpec::Default);
        assert_eq!(ColorSpec::parse("none"), ColorSpec::None);
        assert_eq!(ColorSpec::parse("NONE"), ColorSpec::None);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(ColorSpec::parse("#C6A0F6"), ColorSpec::Rgb(0xC6A0F6));
        assert_eq!(ColorSpec::parse("c6a0f6"), ColorSpec::Rgb(0xC6A0F6));
        assert_eq!(ColorSpec::parse("#ffffff"), ColorSpec::Rgb(0xFFFFFF));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(ColorSpec::parse("not-a-color"), ColorSpec::Invalid);
        assert_eq!(ColorSpec::parse("#fff"), ColorSpec::Invalid);
        assert_eq!(ColorSpec::parse("#gggggg"), ColorSpec::Invalid);
        assert_eq!(ColorSpec::parse(""), ColorSpec::Invalid);
        assert_eq!(ColorSpec::parse("#1234567"), ColorSpec::Invalid);
    }

    #[test]
    fn test_colorref_is_bgr() {
        assert_eq!(ColorSpec::Rgb(0x336699).to_colorref(), Colorref(0x996633));
        assert_eq!(Colorref::from_rgb(0xFF0000), Colorref(0x0000FF));
    }

    #[test]
    fn test_colorref_sentinels() {
        assert_eq!(ColorSpec::Default.to_colorref(), Colorref::DEFAULT);
        assert_eq!(ColorSpec::None.to_colorref(), Colorref::NONE);
        assert_eq!(ColorSpec::Invalid.to_colorref(), Colorref::INVALID);
        assert!(Colorref::DEFAULT.is_sentinel());
        assert!(Colorref::NONE.is_sentinel());
        assert!(Colorref::INVALID.is_sentinel());
        assert!(!Colorref::from_rgb(0x123456).is_sentinel());
    }

    #[test]
    fn test_x11_pixel_round_trip() {
        assert_eq!(Colorref::from_rgb(0x336699).to_x11_pixel(), 0x336699);
        assert_eq!(Colorref::from_rgb(0xC6A0F6).to_x11_pixel(), 0xC6A0F6);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("c6a0f6"), "#C6A0F6");
        assert_eq!(normalize("#c6a0f6"), "#C6A0F6");
        assert_eq!(normalize("Default"), "default");
        assert_eq!(normalize("NONE"), "none");
        assert_eq!(normalize(""), "#000000");
        assert_eq!(normalize("abc"), "#000000");
        assert_eq!(normalize("#12345678"), "#000000");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["c6a0f6", "#FFffFF", "default", "none", "", "junk"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_round_trip_valid_hex() {
        for s in ["#C6A0F6", "#000000", "#FFFFFF", "#123ABC"] {
            let spec = ColorSpec::parse(s);
            assert_eq!(normalize(&spec.to_display()), s.to_string());
        }
    }

    #[test]
    fn test_sentinels_display_as_black() {
        assert_eq!(ColorSpec::Default.to_display(), "#000000");
        assert_eq!(ColorSpec::None.to_display(), "#000000");
        assert_eq!(ColorSpec::Invalid.to_display(), "#000000");
    }

    #[test]
    fn test_anchor_rgb() {
        assert_eq!(anchor_rgb("#ff0000"), Some(0xFF0000));
        assert_eq!(anchor_rgb("0000ff"), Some(0x0000FF));
        assert_eq!(anchor_rgb("default"), None);
        assert_eq!(anchor_rgb("none"), None);
        // Wrong length collapses to black via normalize
        assert_eq!(anchor_rgb("abc"), Some(0x000000));
        // Right length but not hex survives normalize, then fails decoding
        assert_eq!(anchor_rgb("zzzzzz"), None);
    }

    #[test]
    fn test_lerp_endpoints() {
        for (a, b) in [(0x000000, 0xFFFFFF), (0xC6A0F6, 0x123456), (0xFF0000, 0x0000FF)] {
            assert_eq!(lerp_rgb(Some(a), Some(b), 0.0), a);
            assert_eq!(lerp_rgb(Some(a), Some(b), 1.0), b);
        }
    }

    #[test]
    fn test_lerp_defaults_to_red_blue() {
        assert_eq!(lerp_rgb(None, None, 0.0), 0xFF0000);
        assert_eq!(lerp_rgb(None, None, 1.0), 0x0000FF);
    }

    #[test]
    fn test_lerp_midpoint_truncates() {
        // 0x00 -> 0xFF at t=0.5 is 127.5, truncated to 127
        assert_eq!(lerp_rgb(Some(0x000000), Some(0xFFFFFF), 0.5), 0x7F7F7F);
    }
}
