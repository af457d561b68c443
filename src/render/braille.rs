use super::canvas::{Canvas, ColorMode, sgr};

/// Braille dot positions within a 2x4 cell:
/// (0,0) (1,0)    dot1 dot4
/// (0,1) (1,1)    dot2 dot5
/// (0,2) (1,2)    dot3 dot6
/// (0,3) (1,3)    dot7 dot8
///
/// Unicode braille: U+2800 + dot_bits
const BRAILLE_OFFSET: u32 = 0x2800;
const DOT_MAP: [(usize, usize, u32); 8] = [
    (0, 0, 0x01), // dot 1
    (0, 1, 0x02), // dot 2
    (0, 2, 0x04), // dot 3
    (1, 0, 0x08), // dot 4
    (1, 1, 0x10), // dot 5
    (1, 2, 0x20), // dot 6
    (0, 3, 0x40), // dot 7
    (1, 3, 0x80), // dot 8
];

/// Dots are lit where a pixel stands out from the background; the cell
/// takes the average color of its lit dots.
pub fn render(canvas: &Canvas) -> String {
    let term_cols = canvas.width / 2;
    let term_rows = canvas.height / 4;
    let mut out = String::with_capacity(term_cols * term_rows * 20);
    let colored = canvas.color_mode != ColorMode::Mono;
    let background = sgr(canvas.map_color(canvas.background), true);

    for row in 0..term_rows {
        if colored {
            out.push_str(&format!("\x1b[{}m", background));
        }
        for col in 0..term_cols {
            let (px, py) = (col * 2, row * 4);

            let mut bits: u32 = 0;
            let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
            let mut lit_count = 0u32;

            for &(dx, dy, bit) in &DOT_MAP {
                let (x, y) = (px + dx, py + dy);
                if canvas.is_lit(x, y) {
                    bits |= bit;
                    let p = canvas.pixels[y * canvas.width + x];
                    r += p.r;
                    g += p.g;
                    b += p.b;
                    lit_count += 1;
                }
            }

            let ch = char::from_u32(BRAILLE_OFFSET + bits).unwrap_or(' ');

            if colored && lit_count > 0 {
                let n = lit_count as f64;
                let color = canvas.map_color(crate::color::Rgba::new(r / n, g / n, b / n, 1.0));
                out.push_str(&format!("\x1b[{}m{}", sgr(color, false), ch));
            } else {
                out.push(ch);
            }
        }
        if colored {
            out.push_str("\x1b[0m");
        }
        // Use cursor movement instead of \n to avoid blank line issues
        out.push_str(&format!("\x1b[{};1H", row + 2)); // move to next row (1-indexed)
    }
    out
}
