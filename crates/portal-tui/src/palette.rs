//! Terminal colours derived from the theme configuration.
//!
//! Theme colours are CSS strings (`#1351af`, `rgba(0, 0, 0, 0.14)`,
//! `hsl(222.2 84% 4.9%)`). Translucent colours are composited over the
//! mode's background since the terminal has no alpha.

use ftui_render::cell::PackedRgba;
use ftui_style::{Style, StyleFlags};
use portal_core::theme::{ThemeConfig, ThemeMode};
use tracing::warn;

/// An opaque colour plus the alpha it was declared with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssColor {
    pub rgb: [u8; 3],
    pub alpha: f32,
}

impl CssColor {
    const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self {
            rgb: [r, g, b],
            alpha: 1.0,
        }
    }

    /// Composite over an opaque `base`.
    #[must_use]
    pub fn over(self, base: [u8; 3]) -> [u8; 3] {
        mix(base, self.rgb, self.alpha)
    }
}

/// Parse the CSS colour forms the theme uses. Named colours are not
/// supported.
#[must_use]
pub fn parse_color(raw: &str) -> Option<CssColor> {
    let raw = raw.trim().to_ascii_lowercase();
    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex);
    }
    let (name, args) = raw.strip_suffix(')')?.split_once('(')?;
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .filter(|part| !part.is_empty())
        .collect();
    match name.trim() {
        "rgb" | "rgba" => parse_rgb(&parts),
        "hsl" | "hsla" => parse_hsl(&parts),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<CssColor> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..=i)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(CssColor::opaque(
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
        )),
        6 => Some(CssColor::opaque(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(CssColor {
            rgb: [pair(0)?, pair(2)?, pair(4)?],
            alpha: f32::from(pair(6)?) / 255.0,
        }),
        _ => None,
    }
}

fn parse_alpha(part: Option<&&str>) -> Option<f32> {
    let Some(raw) = part else {
        return Some(1.0);
    };
    let alpha = match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok()? / 100.0,
        None => raw.parse::<f32>().ok()?,
    };
    Some(alpha.clamp(0.0, 1.0))
}

fn channel(raw: &str) -> Option<u8> {
    let value = match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok()? * 2.55,
        None => raw.parse::<f32>().ok()?,
    };
    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn parse_rgb(parts: &[&str]) -> Option<CssColor> {
    if parts.len() < 3 {
        return None;
    }
    Some(CssColor {
        rgb: [channel(parts[0])?, channel(parts[1])?, channel(parts[2])?],
        alpha: parse_alpha(parts.get(3))?,
    })
}

fn parse_hsl(parts: &[&str]) -> Option<CssColor> {
    if parts.len() < 3 {
        return None;
    }
    let hue = parts[0].trim_end_matches("deg").parse::<f32>().ok()?;
    let pct = |raw: &str| {
        raw.trim_end_matches('%')
            .parse::<f32>()
            .ok()
            .map(|v| (v / 100.0).clamp(0.0, 1.0))
    };
    let (s, l) = (pct(parts[1])?, pct(parts[2])?);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Some(CssColor {
        rgb: [to_u8(r), to_u8(g), to_u8(b)],
        alpha: parse_alpha(parts.get(3))?,
    })
}

fn mix(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    [lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])]
}

const fn packed(rgb: [u8; 3]) -> PackedRgba {
    PackedRgba::rgb(rgb[0], rgb[1], rgb[2])
}

fn resolve(raw: &str, fallback: &str, base: [u8; 3]) -> [u8; 3] {
    let color = parse_color(raw).or_else(|| {
        warn!(color = raw, "unrecognised theme colour, using default");
        parse_color(fallback)
    });
    color.map_or(base, |color| color.over(base))
}

/// Resolved colours for one theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub mode: ThemeMode,
    pub bg: PackedRgba,
    pub surface: PackedRgba,
    pub text: PackedRgba,
    pub muted: PackedRgba,
    pub border: PackedRgba,
    pub primary: PackedRgba,
    pub secondary: PackedRgba,
    pub alert: PackedRgba,
    pub success: PackedRgba,
    pub highlight: PackedRgba,
    pub ink: PackedRgba,
}

impl Palette {
    #[must_use]
    pub fn from_theme(theme: &ThemeConfig, mode: ThemeMode) -> Self {
        let defaults = ThemeConfig::default();
        let (c, d) = (&theme.colors, &defaults.colors);
        let (bg_raw, bg_default, text_raw, text_default, border_raw, border_default) = match mode
        {
            ThemeMode::Light => (
                &c.background,
                &d.background,
                &c.text,
                &d.text,
                &c.border,
                &d.border,
            ),
            ThemeMode::Dark => (
                &c.background_dark,
                &d.background_dark,
                &c.text_dark,
                &d.text_dark,
                &c.border_dark,
                &d.border_dark,
            ),
        };

        let bg = resolve(bg_raw, bg_default, [0, 0, 0]);
        let text = resolve(text_raw, text_default, bg);
        let opaque = |raw: &String, fallback: &String| resolve(raw, fallback, bg);

        Self {
            mode,
            bg: packed(bg),
            surface: packed(mix(bg, text, 0.08)),
            text: packed(text),
            muted: packed(mix(bg, text, 0.55)),
            border: packed(resolve(border_raw, border_default, bg)),
            primary: packed(opaque(&c.primary, &d.primary)),
            secondary: packed(opaque(&c.secondary, &d.secondary)),
            alert: packed(opaque(&c.tertiary, &d.tertiary)),
            success: packed(opaque(&c.quaternary, &d.quaternary)),
            highlight: packed(opaque(&c.quinary, &d.quinary)),
            ink: packed(opaque(&c.senary, &d.senary)),
        }
    }

    pub fn base(&self) -> Style {
        Style::new().fg(self.text).bg(self.bg)
    }

    pub fn header(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    pub fn header_button(&self) -> Style {
        Style::new()
            .fg(self.primary)
            .bg(self.surface)
            .attrs(StyleFlags::BOLD)
    }

    pub fn status_bar(&self) -> Style {
        Style::new().fg(self.muted).bg(self.surface)
    }

    pub fn title(&self) -> Style {
        Style::new().fg(self.primary).attrs(StyleFlags::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::new().fg(self.muted)
    }

    pub fn border(&self) -> Style {
        Style::new().fg(self.border).bg(self.bg)
    }

    /// Revealed outer cell.
    pub fn outer_visible(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    /// Hidden outer cell: present but unreadable.
    pub fn outer_blurred(&self) -> Style {
        Style::new()
            .fg(self.border)
            .bg(self.bg)
            .attrs(StyleFlags::DIM)
    }

    pub fn inner(&self) -> Style {
        Style::new().fg(self.primary).bg(self.bg)
    }

    /// Toggled inner cell.
    pub fn inner_active(&self) -> Style {
        Style::new()
            .fg(self.bg)
            .bg(self.primary)
            .attrs(StyleFlags::BOLD)
    }

    pub fn center(&self) -> Style {
        Style::new()
            .fg(self.ink)
            .bg(self.highlight)
            .attrs(StyleFlags::BOLD)
    }

    /// Keyboard focus outline.
    pub fn focus(&self) -> Style {
        Style::new().fg(self.highlight).attrs(StyleFlags::BOLD)
    }

    pub fn tooltip(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    pub fn modal(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    /// Fill colour behind an open modal.
    #[must_use]
    pub fn backdrop(&self) -> PackedRgba {
        self.border
    }

    pub fn link(&self) -> Style {
        Style::new()
            .fg(self.secondary)
            .attrs(StyleFlags::UNDERLINE)
    }

    pub fn error(&self) -> Style {
        Style::new().fg(self.alert).attrs(StyleFlags::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::new()
            .fg(self.bg)
            .bg(self.primary)
            .attrs(StyleFlags::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(parse_color("#1351af").map(|c| c.rgb), Some([0x13, 0x51, 0xaf]));
        assert_eq!(parse_color("#fff").map(|c| c.rgb), Some([255, 255, 255]));
        let translucent = parse_color("#00000080").expect("8-digit hex");
        assert!((translucent.alpha - 0.502).abs() < 0.01);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn rgba_composites_over_background() {
        let border = parse_color("rgba(0, 0, 0, 0.14)").expect("rgba");
        assert_eq!(border.rgb, [0, 0, 0]);
        assert!((border.alpha - 0.14).abs() < f32::EPSILON);
        assert_eq!(border.over([200, 200, 200]), [172, 172, 172]);
        assert_eq!(parse_color("rgb(10 20 30)").map(|c| c.rgb), Some([10, 20, 30]));
        assert_eq!(parse_color("rgb(10, 20)"), None);
    }

    #[test]
    fn hsl_converts() {
        let dark = parse_color("hsl(222.2 84% 4.9%)").expect("hsl");
        assert_eq!(dark.rgb, [2, 8, 23]);
        assert_eq!(parse_color("hsl(0, 100%, 50%)").map(|c| c.rgb), Some([255, 0, 0]));
        assert_eq!(parse_color("hsl(120deg 100% 25%)").map(|c| c.rgb), Some([0, 128, 0]));
    }

    #[test]
    fn unknown_forms_are_rejected() {
        assert_eq!(parse_color("rebeccapurple"), None);
        assert_eq!(parse_color("lab(50 20 30)"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn modes_use_their_own_background() {
        let theme = ThemeConfig::default();
        let light = Palette::from_theme(&theme, ThemeMode::Light);
        let dark = Palette::from_theme(&theme, ThemeMode::Dark);
        assert_eq!(light.bg, PackedRgba::rgb(0xff, 0xe0, 0xbf));
        assert_eq!(dark.bg, PackedRgba::rgb(2, 8, 23));
        assert_ne!(light.text, dark.text);
        assert_eq!(light.primary, dark.primary);
    }

    #[test]
    fn bad_override_falls_back_to_default_colour() {
        let mut theme = ThemeConfig::default();
        theme.colors.primary = "not-a-colour".to_string();
        let palette = Palette::from_theme(&theme, ThemeMode::Light);
        assert_eq!(palette.primary, PackedRgba::rgb(0x13, 0x51, 0xaf));
    }
}
