//! Named color themes and time-driven rainbow cycling.
//!
//! Every theme resolves to a fixed palette and a background. Resolution is
//! total: unrecognized names fall back to [`Theme::Pastel`].

use crate::color::Rgba;
use rand::RngExt;

/// Cycle speed the scenes use for rainbow sampling (ten seconds per cycle).
pub const RAINBOW_CYCLE_SPEED: f64 = 0.1;

const PASTEL: [Rgba; 7] = [
    Rgba::hex(0xFFB3BA), // soft pink
    Rgba::hex(0xBAFFC9), // mint green
    Rgba::hex(0xBAE1FF), // sky blue
    Rgba::hex(0xFFFFBA), // cream yellow
    Rgba::hex(0xFFDFBA), // light orange
    Rgba::hex(0xE0BBE4), // lavender
    Rgba::hex(0xFEC8D8), // peach pink
];

const BRIGHT: [Rgba; 7] = [
    Rgba::hex(0xFF6B6B),
    Rgba::hex(0x4ECDC4),
    Rgba::hex(0x45B7D1),
    Rgba::hex(0xFFA07A),
    Rgba::hex(0x98D8C8),
    Rgba::hex(0xF7DC6F),
    Rgba::hex(0xBB8FCE),
];

const HIGH_CONTRAST: [Rgba; 7] = [
    Rgba::hex(0xFFFFFF),
    Rgba::hex(0x000000),
    Rgba::hex(0xFF0000),
    Rgba::hex(0x00FF00),
    Rgba::hex(0x0000FF),
    Rgba::hex(0xFFFF00),
    Rgba::hex(0xFF00FF),
];

const RAINBOW: [Rgba; 7] = [
    Rgba::hex(0xFF0000), // red
    Rgba::hex(0xFF7F00), // orange
    Rgba::hex(0xFFFF00), // yellow
    Rgba::hex(0x00FF00), // green
    Rgba::hex(0x0000FF), // blue
    Rgba::hex(0x4B0082), // indigo
    Rgba::hex(0x9400D3), // violet
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Pastel,
    Bright,
    HighContrast,
    Rainbow,
}

impl Theme {
    /// All themes, in the order a selector cycles through them.
    pub const ALL: [Theme; 4] = [Theme::Pastel, Theme::Bright, Theme::HighContrast, Theme::Rainbow];

    /// Resolve a theme name. Case-insensitive; anything unknown is pastel.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bright" => Theme::Bright,
            "high-contrast" => Theme::HighContrast,
            "rainbow" => Theme::Rainbow,
            _ => Theme::Pastel,
        }
    }

    /// Canonical identifier, as accepted by [`Theme::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Theme::Pastel => "pastel",
            Theme::Bright => "bright",
            Theme::HighContrast => "high-contrast",
            Theme::Rainbow => "rainbow",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Theme::Pastel => "Pastel",
            Theme::Bright => "Bright",
            Theme::HighContrast => "High Contrast",
            Theme::Rainbow => "Rainbow",
        }
    }

    pub fn palette(self) -> &'static [Rgba] {
        match self {
            Theme::Pastel => &PASTEL,
            Theme::Bright => &BRIGHT,
            Theme::HighContrast => &HIGH_CONTRAST,
            Theme::Rainbow => &RAINBOW,
        }
    }

    pub fn background(self) -> Rgba {
        match self {
            Theme::Pastel => Rgba::hex(0x2D2D44),
            Theme::Bright => Rgba::hex(0x1A1A2E),
            Theme::HighContrast => Rgba::hex(0x000000),
            Theme::Rainbow => Rgba::hex(0x0A0A1A),
        }
    }

    /// Palette entry with wrap-around indexing.
    pub fn color(self, index: usize) -> Rgba {
        let palette = self.palette();
        palette[index % palette.len()]
    }

    /// Whether entity colors are sampled from time each frame instead of stored.
    pub fn is_cycling(self) -> bool {
        self == Theme::Rainbow
    }

    /// The theme after this one in [`Theme::ALL`].
    pub fn next(self) -> Self {
        let idx = Theme::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Theme::ALL[(idx + 1) % Theme::ALL.len()]
    }
}

impl From<&str> for Theme {
    fn from(name: &str) -> Self {
        Theme::from_name(name)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Palette for a theme name (pastel when unknown).
pub fn resolve_palette(theme_id: &str) -> &'static [Rgba] {
    Theme::from_name(theme_id).palette()
}

/// Background color for a theme name (pastel when unknown).
pub fn resolve_background(theme_id: &str) -> Rgba {
    Theme::from_name(theme_id).background()
}

/// Rainbow color at `elapsed` seconds, completing one cycle every
/// `1 / cycle_speed` seconds.
///
/// The palette entries are control points spaced evenly over a repeating
/// 0..1 parameter; the last entry blends back into the first, so the result is
/// continuous across the cycle boundary. Alpha is always 1.
pub fn rainbow_color(elapsed: f64, cycle_speed: f64) -> Rgba {
    let palette = &RAINBOW;
    let n = palette.len();
    let u = (elapsed * cycle_speed).rem_euclid(1.0);
    let pos = u * n as f64;
    let index = (pos.floor() as usize) % n;
    let next = (index + 1) % n;
    let frac = pos - pos.floor();
    palette[index].lerp(palette[next], frac).with_alpha(1.0)
}

/// Uniform pick from the theme's palette.
pub fn random_color(theme: Theme, rng: &mut impl RngExt) -> Rgba {
    let palette = theme.palette();
    palette[rng.random_range(0..palette.len())]
}
