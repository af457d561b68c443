//! Scan conversion of draw primitives onto the pixel canvas.
//!
//! Scenes draw in logical units; the canvas is presented to them at a
//! logical size whose smaller scale fits [`LOGICAL_MIN`], so a terminal of any
//! size shows the same composition.

use super::canvas::Canvas;
use crate::color::Rgba;
use crate::draw::{DrawCommand, DrawList, Viewport};
use glam::DVec2;

/// Smallest logical canvas handed to the scenes.
pub const LOGICAL_MIN: DVec2 = DVec2::new(800.0, 600.0);

/// Maps logical scene coordinates to canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Pixels per logical unit.
    pub scale: f64,
}

impl Projection {
    /// Projection and logical viewport for a canvas of `width` x `height`
    /// pixels. Both dimensions must be non-zero.
    pub fn fit(width: usize, height: usize) -> (Projection, Viewport) {
        let px = DVec2::new(width as f64, height as f64);
        let scale = (px / LOGICAL_MIN).min_element();
        (Projection { scale }, Viewport::new(DVec2::ZERO, px / scale))
    }

    #[inline]
    pub fn to_pixels(&self, p: DVec2) -> DVec2 {
        p * self.scale
    }

    #[inline]
    pub fn to_logical(&self, p: DVec2) -> DVec2 {
        p / self.scale
    }

    /// Logical point at the centre of terminal cell (`col`, `row`).
    pub fn cell_to_logical(&self, col: u16, row: u16, cell: (usize, usize)) -> DVec2 {
        let px = DVec2::new(
            (col as f64 + 0.5) * cell.0 as f64,
            (row as f64 + 0.5) * cell.1 as f64,
        );
        self.to_logical(px)
    }

    /// Stroke width in pixels, never thinner than one pixel.
    #[inline]
    fn stroke(&self, thickness: f64) -> f64 {
        (thickness * self.scale).max(1.0)
    }
}

/// Paint every command in order.
pub fn rasterize(canvas: &mut Canvas, list: &DrawList, proj: &Projection) {
    for cmd in list {
        match *cmd {
            DrawCommand::CircleFilled { center, radius, color } => {
                fill_circle(canvas, proj.to_pixels(center), radius * proj.scale, color);
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
                thickness,
            } => {
                ring(
                    canvas,
                    proj.to_pixels(center),
                    radius * proj.scale,
                    proj.stroke(thickness),
                    color,
                );
            }
            DrawCommand::RectFilled { min, max, color } => {
                fill_rect(canvas, proj.to_pixels(min), proj.to_pixels(max), color);
            }
            DrawCommand::Rect {
                min,
                max,
                color,
                thickness,
            } => {
                let (min, max) = (proj.to_pixels(min), proj.to_pixels(max));
                let t = proj.stroke(thickness);
                fill_rect(canvas, min, DVec2::new(max.x, min.y + t), color);
                fill_rect(canvas, DVec2::new(min.x, max.y - t), max, color);
                fill_rect(canvas, DVec2::new(min.x, min.y + t), DVec2::new(min.x + t, max.y - t), color);
                fill_rect(canvas, DVec2::new(max.x - t, min.y + t), DVec2::new(max.x, max.y - t), color);
            }
            DrawCommand::Line {
                from,
                to,
                color,
                thickness,
            } => {
                line(
                    canvas,
                    proj.to_pixels(from),
                    proj.to_pixels(to),
                    proj.stroke(thickness),
                    color,
                );
            }
        }
    }
}

/// Pixel index range covering `lo..hi`, clipped to `0..limit`.
fn span(lo: f64, hi: f64, limit: usize) -> std::ops::Range<usize> {
    let start = lo.floor().max(0.0) as usize;
    let end = (hi.ceil().max(0.0) as usize).min(limit);
    start.min(end)..end
}

#[inline]
fn pixel_center(x: usize, y: usize) -> DVec2 {
    DVec2::new(x as f64 + 0.5, y as f64 + 0.5)
}

fn fill_circle(canvas: &mut Canvas, c: DVec2, r: f64, color: Rgba) {
    // Sub-pixel discs still show up as a dot
    if r < std::f64::consts::FRAC_1_SQRT_2 {
        if c.x >= 0.0 && c.y >= 0.0 {
            canvas.blend(c.x as usize, c.y as usize, color);
        }
        return;
    }
    let r2 = r * r;
    for y in span(c.y - r, c.y + r, canvas.height) {
        for x in span(c.x - r, c.x + r, canvas.width) {
            if pixel_center(x, y).distance_squared(c) <= r2 {
                canvas.blend(x, y, color);
            }
        }
    }
}

fn ring(canvas: &mut Canvas, c: DVec2, r: f64, width: f64, color: Rgba) {
    let half = width / 2.0;
    let outer = r + half;
    for y in span(c.y - outer, c.y + outer, canvas.height) {
        for x in span(c.x - outer, c.x + outer, canvas.width) {
            if (pixel_center(x, y).distance(c) - r).abs() <= half {
                canvas.blend(x, y, color);
            }
        }
    }
}

fn fill_rect(canvas: &mut Canvas, min: DVec2, max: DVec2, color: Rgba) {
    if max.x <= min.x || max.y <= min.y {
        return;
    }
    for y in span(min.y, max.y, canvas.height) {
        for x in span(min.x, max.x, canvas.width) {
            let p = pixel_center(x, y);
            // Slivers narrower than a pixel still cover the pixel they sit in
            let inside_x = (p.x >= min.x && p.x <= max.x) || max.x - min.x < 1.0;
            let inside_y = (p.y >= min.y && p.y <= max.y) || max.y - min.y < 1.0;
            if inside_x && inside_y {
                canvas.blend(x, y, color);
            }
        }
    }
}

fn line(canvas: &mut Canvas, a: DVec2, b: DVec2, width: f64, color: Rgba) {
    let half = width / 2.0;
    let ab = b - a;
    let len2 = ab.length_squared();
    let lo = a.min(b) - DVec2::splat(half);
    let hi = a.max(b) + DVec2::splat(half);
    for y in span(lo.y, hi.y, canvas.height) {
        for x in span(lo.x, hi.x, canvas.width) {
            let p = pixel_center(x, y);
            let t = if len2 > 0.0 {
                ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            if p.distance(a + ab * t) <= half {
                canvas.blend(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    fn canvas(w: usize, h: usize) -> Canvas {
        // Half-block: one pixel per column, two per row
        let mut c = Canvas::new(w, h / 2, RenderMode::HalfBlock, ColorMode::TrueColor);
        c.clear(Rgba::BLACK);
        c
    }

    fn lit(c: &Canvas) -> usize {
        (0..c.height)
            .flat_map(|y| (0..c.width).map(move |x| (x, y)))
            .filter(|&(x, y)| c.is_lit(x, y))
            .count()
    }

    #[test]
    fn test_fit_keeps_logical_minimum() {
        let (proj, vp) = Projection::fit(160, 96);
        assert!((proj.scale - 0.16).abs() < 1e-12);
        assert!((vp.size.x - 1000.0).abs() < 1e-9);
        assert!((vp.size.y - 600.0).abs() < 1e-9);
        assert!(vp.size.x >= LOGICAL_MIN.x && vp.size.y >= LOGICAL_MIN.y - 1e-9);
    }

    #[test]
    fn test_cell_to_logical_round_trip() {
        let proj = Projection { scale: 0.5 };
        let p = proj.cell_to_logical(3, 1, (1, 2));
        assert_eq!(proj.to_pixels(p), DVec2::new(3.5, 3.0));
    }

    #[test]
    fn test_filled_circle_area() {
        let mut c = canvas(40, 40);
        let mut list = DrawList::new();
        list.circle_filled(DVec2::new(20.0, 20.0), 10.0, Rgba::WHITE);
        rasterize(&mut c, &list, &Projection { scale: 1.0 });
        let area = lit(&c) as f64;
        let expected = std::f64::consts::PI * 100.0;
        assert!((area - expected).abs() / expected < 0.1, "area {area}");
    }

    #[test]
    fn test_tiny_disc_lights_its_pixel() {
        let mut c = canvas(10, 10);
        let mut list = DrawList::new();
        list.circle_filled(DVec2::new(3.9, 6.95), 0.2, Rgba::WHITE);
        rasterize(&mut c, &list, &Projection { scale: 1.0 });
        assert_eq!(lit(&c), 1);
        assert!(c.is_lit(3, 6));
    }

    #[test]
    fn test_transparent_draws_leave_canvas_untouched() {
        let mut c = canvas(10, 10);
        let mut list = DrawList::new();
        list.rect_filled(DVec2::ZERO, DVec2::splat(10.0), Rgba::WHITE.with_alpha(0.0));
        rasterize(&mut c, &list, &Projection { scale: 1.0 });
        assert_eq!(lit(&c), 0);
    }

    #[test]
    fn test_thin_line_is_continuous() {
        let mut c = canvas(20, 20);
        let mut list = DrawList::new();
        list.line(DVec2::new(0.0, 10.0), DVec2::new(20.0, 10.0), Rgba::WHITE, 0.1);
        rasterize(&mut c, &list, &Projection { scale: 1.0 });
        for x in 0..20 {
            assert!(c.is_lit(x, 9) || c.is_lit(x, 10), "gap at {x}");
        }
    }

    #[test]
    fn test_rect_outline_leaves_interior() {
        let mut c = canvas(20, 20);
        let mut list = DrawList::new();
        list.rect(DVec2::new(2.0, 2.0), DVec2::new(18.0, 18.0), Rgba::WHITE, 2.0);
        rasterize(&mut c, &list, &Projection { scale: 1.0 });
        assert!(c.is_lit(2, 10));
        assert!(c.is_lit(10, 2));
        assert!(!c.is_lit(10, 10));
    }

    #[test]
    fn test_shapes_off_canvas_are_clipped() {
        let mut c = canvas(10, 10);
        let mut list = DrawList::new();
        list.circle_filled(DVec2::new(-50.0, -50.0), 5.0, Rgba::WHITE);
        list.line(DVec2::new(-5.0, 5.0), DVec2::new(50.0, 5.0), Rgba::WHITE, 1.0);
        rasterize(&mut c, &list, &Projection { scale: 1.0 });
        assert!(lit(&c) > 0);
    }
}
