use crate::color::Rgba;
use crossterm::style::Color;

/// How to render sub-cell pixels to terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Unicode braille characters (2x4 per cell = highest resolution)
    Braille,
    /// Half-block characters ▀ (1x2 per cell, full color per pixel)
    HalfBlock,
}

impl RenderMode {
    /// Sub-cell pixels per terminal cell, (columns, rows).
    pub fn cell_pixels(self) -> (usize, usize) {
        match self {
            RenderMode::Braille => (2, 4),
            RenderMode::HalfBlock => (1, 2),
        }
    }
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Monochrome glyphs, no escape codes
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

/// Channel distance from the background above which a pixel counts as lit.
const LIT_THRESHOLD: f64 = 0.12;

/// Opaque RGBA pixels in sub-cell space, one frame at a time.
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    /// Opaque pixel colors, row-major
    pub pixels: Vec<Rgba>,
    /// Color the canvas was last cleared to
    pub background: Rgba,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
}

impl Canvas {
    pub fn new(
        term_cols: usize,
        term_rows: usize,
        render_mode: RenderMode,
        color_mode: ColorMode,
    ) -> Self {
        let (cw, ch) = render_mode.cell_pixels();
        let (px_w, px_h) = (term_cols * cw, term_rows * ch);
        Canvas {
            width: px_w,
            height: px_h,
            pixels: vec![Rgba::BLACK; px_w * px_h],
            background: Rgba::BLACK,
            render_mode,
            color_mode,
        }
    }

    pub fn clear(&mut self, background: Rgba) {
        let background = background.with_alpha(1.0);
        self.background = background;
        self.pixels.fill(background);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Source-over blend `color` onto a pixel. Bounds-checked.
    #[inline]
    pub fn blend(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let a = color.a.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let idx = y * self.width + x;
        self.pixels[idx] = self.pixels[idx].lerp(color.with_alpha(1.0), a);
    }

    /// Whether a pixel stands out from the background.
    #[inline]
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(|p| {
            let bg = self.background;
            (p.r - bg.r).abs().max((p.g - bg.g).abs()).max((p.b - bg.b).abs()) > LIT_THRESHOLD
        })
    }

    /// (columns, rows) of terminal cells this canvas covers.
    pub fn term_size(&self) -> (usize, usize) {
        let (cw, ch) = self.render_mode.cell_pixels();
        (self.width / cw, self.height / ch)
    }

    /// Encode the frame as cursor-addressed terminal output.
    pub fn render(&self) -> String {
        match self.render_mode {
            RenderMode::Braille => super::braille::render(self),
            RenderMode::HalfBlock => super::halfblock::render(self),
        }
    }

    pub fn map_color(&self, color: Rgba) -> Color {
        let (r, g, b) = color.to_rgb8();
        match self.color_mode {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                // Nearest entry in the 6x6x6 color cube
                let q = |c: u8| (c as u16 * 5 + 127) / 255;
                Color::AnsiValue((16 + 36 * q(r) + 6 * q(g) + q(b)) as u8)
            }
            ColorMode::Ansi16 => nearest_ansi16(color),
        }
    }
}

/// xterm defaults for the sixteen basic colors.
const ANSI16: [(Color, u32); 16] = [
    (Color::Black, 0x000000),
    (Color::DarkRed, 0xCD0000),
    (Color::DarkGreen, 0x00CD00),
    (Color::DarkYellow, 0xCDCD00),
    (Color::DarkBlue, 0x0000EE),
    (Color::DarkMagenta, 0xCD00CD),
    (Color::DarkCyan, 0x00CDCD),
    (Color::Grey, 0xE5E5E5),
    (Color::DarkGrey, 0x7F7F7F),
    (Color::Red, 0xFF0000),
    (Color::Green, 0x00FF00),
    (Color::Yellow, 0xFFFF00),
    (Color::Blue, 0x5C5CFF),
    (Color::Magenta, 0xFF00FF),
    (Color::Cyan, 0x00FFFF),
    (Color::White, 0xFFFFFF),
];

fn nearest_ansi16(color: Rgba) -> Color {
    let dist = |hex: u32| {
        let c = Rgba::hex(hex);
        (c.r - color.r).powi(2) + (c.g - color.g).powi(2) + (c.b - color.b).powi(2)
    };
    ANSI16
        .iter()
        .min_by(|a, b| dist(a.1).total_cmp(&dist(b.1)))
        .map_or(Color::White, |&(c, _)| c)
}

/// SGR parameters selecting `color` as the foreground, or the background when
/// `background` is set.
pub fn sgr(color: Color, background: bool) -> String {
    let (extended, shift) = if background { (48, 10) } else { (38, 0) };
    let basic = |code: u8| (code + shift).to_string();
    match color {
        Color::Rgb { r, g, b } => format!("{extended};2;{r};{g};{b}"),
        Color::AnsiValue(v) => format!("{extended};5;{v}"),
        Color::Black => basic(30),
        Color::DarkRed => basic(31),
        Color::DarkGreen => basic(32),
        Color::DarkYellow => basic(33),
        Color::DarkBlue => basic(34),
        Color::DarkMagenta => basic(35),
        Color::DarkCyan => basic(36),
        Color::Grey => basic(37),
        Color::DarkGrey => basic(90),
        Color::Red => basic(91),
        Color::Green => basic(92),
        Color::Yellow => basic(93),
        Color::Blue => basic(94),
        Color::Magenta => basic(95),
        Color::Cyan => basic(96),
        Color::White => basic(97),
        _ if background => basic(30),
        _ => basic(37),
    }
}
