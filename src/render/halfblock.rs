use super::canvas::{Canvas, ColorMode, sgr};

/// Append an SGR sequence for whichever of `fg`/`bg` changed since the last cell.
fn push_sgr(out: &mut String, fg: String, bg: String, last_fg: &mut String, last_bg: &mut String) {
    let fg_changed = fg != *last_fg;
    let bg_changed = bg != *last_bg;
    match (fg_changed, bg_changed) {
        (true, true) => {
            out.push_str("\x1b[");
            out.push_str(&fg);
            out.push(';');
            out.push_str(&bg);
            out.push('m');
        }
        (true, false) => {
            out.push_str("\x1b[");
            out.push_str(&fg);
            out.push('m');
        }
        (false, true) => {
            out.push_str("\x1b[");
            out.push_str(&bg);
            out.push('m');
        }
        (false, false) => {}
    }
    if fg_changed {
        *last_fg = fg;
    }
    if bg_changed {
        *last_bg = bg;
    }
}

/// One terminal cell per pixel pair: the top pixel is the foreground of `▀`,
/// the bottom pixel its background.
pub fn render(canvas: &Canvas) -> String {
    let term_cols = canvas.width;
    let term_rows = canvas.height / 2;
    let mut out = String::with_capacity(term_cols * term_rows * 10);

    let mut last_fg = String::new();
    let mut last_bg = String::new();

    for row in 0..term_rows {
        for col in 0..term_cols {
            let (top_y, bot_y) = (row * 2, row * 2 + 1);

            if canvas.color_mode == ColorMode::Mono {
                match (canvas.is_lit(col, top_y), canvas.is_lit(col, bot_y)) {
                    (true, true) => out.push('█'),
                    (true, false) => out.push('▀'),
                    (false, true) => out.push('▄'),
                    (false, false) => out.push(' '),
                }
                continue;
            }

            let top = canvas.pixels[top_y * canvas.width + col];
            let bot = canvas.pixels[bot_y * canvas.width + col];
            let fg = sgr(canvas.map_color(top), false);
            let bg = sgr(canvas.map_color(bot), true);
            push_sgr(&mut out, fg, bg, &mut last_fg, &mut last_bg);
            out.push('▀');
        }
        if canvas.color_mode != ColorMode::Mono {
            out.push_str("\x1b[0m");
            last_fg.clear();
            last_bg.clear();
        }
        // Move to next row
        out.push_str(&format!("\x1b[{};1H", row + 2));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::render::RenderMode;

    #[test]
    fn test_uniform_canvas_emits_one_color_change_per_row() {
        let mut canvas = Canvas::new(4, 2, RenderMode::HalfBlock, ColorMode::TrueColor);
        canvas.clear(Rgba::hex(0x1e1e2e));
        let out = render(&canvas);
        assert_eq!(out.matches('▀').count(), 8);
        assert_eq!(out.matches("38;2;30;30;46;48;2;30;30;46m").count(), 2);
    }

    #[test]
    fn test_mono_uses_block_glyphs() {
        let mut canvas = Canvas::new(2, 1, RenderMode::HalfBlock, ColorMode::Mono);
        canvas.clear(Rgba::BLACK);
        canvas.blend(0, 0, Rgba::WHITE);
        canvas.blend(1, 1, Rgba::WHITE);
        let out = render(&canvas);
        assert!(out.starts_with("▀▄"));
        assert!(!out.contains("38;"));
    }
}
