use super::{DEFAULT_CANVAS, EntityCounts, Scene};
use crate::color::Rgba;
use crate::draw::{DrawList, Viewport};
use crate::theme::{RAINBOW_CYCLE_SPEED, Theme, rainbow_color, random_color};
use glam::DVec2;
use rand::RngExt;
use rand::rngs::StdRng;

pub const DEFAULT_SHAPES: usize = 30;
pub const MIN_SHAPES: usize = 5;
pub const MAX_SHAPES: usize = 100;

/// Velocities are expressed per 1/60 s frame.
const FRAME_RATE: f64 = 60.0;

struct Shape {
    pos: DVec2,
    vel: DVec2,
    size: f64,
    rotation: f64,
    rotation_speed: f64,
    color: Rgba,
    alpha: f64,
}

/// Bubbles drifting around and bouncing off the canvas edges
pub struct FloatingShapes {
    shapes: Vec<Shape>,
    shape_count: usize,
    canvas: DVec2,
    time: f64,
    speed: f64,
    theme: Theme,
    rng: StdRng,
}

impl FloatingShapes {
    pub fn new() -> Self {
        Self::with_rng(super::seeded_rng(None))
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(super::seeded_rng(Some(seed)))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        let mut scene = FloatingShapes {
            shapes: Vec::new(),
            shape_count: DEFAULT_SHAPES,
            canvas: DEFAULT_CANVAS,
            time: 0.0,
            speed: 1.0,
            theme: Theme::default(),
            rng,
        };
        scene.initialize();
        scene
    }

    /// Change the number of shapes (clamped) and reseed them.
    pub fn set_shape_count(&mut self, count: usize) {
        self.shape_count = count.clamp(MIN_SHAPES, MAX_SHAPES);
        self.initialize();
    }

    pub fn shape_count(&self) -> usize {
        self.shape_count
    }

    fn spawn(&mut self) -> Shape {
        let base = self.canvas.min_element();
        let min_size = base * 0.02;
        let max_size = base * 0.06;
        let rng = &mut self.rng;
        Shape {
            pos: DVec2::new(
                rng.random::<f64>() * self.canvas.x,
                rng.random::<f64>() * self.canvas.y,
            ),
            vel: DVec2::new(
                (rng.random::<f64>() - 0.5) * 2.0,
                (rng.random::<f64>() - 0.5) * 2.0,
            ),
            size: min_size + rng.random::<f64>() * (max_size - min_size),
            rotation: rng.random::<f64>() * std::f64::consts::TAU,
            rotation_speed: (rng.random::<f64>() - 0.5) * 0.02,
            color: random_color(self.theme, rng),
            alpha: 0.7 + rng.random::<f64>() * 0.3,
        }
    }

    fn shape_color(&self, shape: &Shape) -> Rgba {
        if self.theme.is_cycling() {
            // Neighbouring shapes sit close together in the cycle
            let t = self.time + shape.pos.x * 0.001 + shape.pos.y * 0.001;
            rainbow_color(t, RAINBOW_CYCLE_SPEED).with_alpha(shape.alpha)
        } else {
            shape.color.with_alpha(shape.alpha)
        }
    }
}

impl Default for FloatingShapes {
    fn default() -> Self {
        Self::new()
    }
}

/// Reflect the velocity on each axis where `pos` left `0..=bound`, then clamp
/// `pos` back inside.
fn bounce(pos: &mut DVec2, vel: &mut DVec2, bound: DVec2) {
    if pos.x < 0.0 || pos.x > bound.x {
        vel.x = -vel.x;
    }
    if pos.y < 0.0 || pos.y > bound.y {
        vel.y = -vel.y;
    }
    *pos = pos.clamp(DVec2::ZERO, bound);
}

impl Scene for FloatingShapes {
    fn name(&self) -> &str {
        "Floating Shapes"
    }

    fn initialize(&mut self) {
        self.shapes.clear();
        for _ in 0..self.shape_count {
            let shape = self.spawn();
            self.shapes.push(shape);
        }
    }

    fn update(&mut self, dt: f64) {
        let step = self.speed * dt * FRAME_RATE;
        self.time += dt * self.speed;
        for shape in &mut self.shapes {
            shape.pos += shape.vel * step;
            shape.rotation += shape.rotation_speed * step;
            bounce(&mut shape.pos, &mut shape.vel, self.canvas);
        }
    }

    fn resize(&mut self, size: DVec2) {
        if size == self.canvas || size.min_element() <= 0.0 {
            return;
        }
        let scale = size.min_element() / self.canvas.min_element();
        for shape in &mut self.shapes {
            shape.pos = shape.pos / self.canvas * size;
            shape.size *= scale;
        }
        self.canvas = size;
    }

    fn draw(&self, viewport: &Viewport) -> DrawList {
        let mut list = DrawList::with_capacity(self.shapes.len() * 3);
        let border = Rgba::WHITE.with_alpha(0.5);
        for shape in &self.shapes {
            let pos = viewport.origin + shape.pos;
            list.circle_filled(pos, shape.size, self.shape_color(shape));
            list.circle(pos, shape.size, border, 2.0);
            // Sheen that turns with the shape
            let sheen = DVec2::from_angle(shape.rotation) * shape.size * 0.45;
            list.circle_filled(pos + sheen, shape.size * 0.2, Rgba::WHITE.with_alpha(0.25));
        }
        list
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        // Rainbow colors are sampled per frame
        if !theme.is_cycling() {
            for shape in &mut self.shapes {
                shape.color = random_color(theme, &mut self.rng);
            }
        }
    }

    fn apply_counts(&mut self, counts: &EntityCounts) {
        self.set_shape_count(counts.shape_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_velocity_stays_put() {
        let mut scene = FloatingShapes::with_seed(1);
        for shape in &mut scene.shapes {
            shape.vel = DVec2::ZERO;
        }
        let before: Vec<DVec2> = scene.shapes.iter().map(|s| s.pos).collect();
        for _ in 0..120 {
            scene.update(1.0 / 60.0);
        }
        let after: Vec<DVec2> = scene.shapes.iter().map(|s| s.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_leaving_bounds_reflects_and_clamps() {
        let mut scene = FloatingShapes::with_seed(2);
        scene.shapes.truncate(1);
        scene.shapes[0].pos = DVec2::new(795.0, 5.0);
        scene.shapes[0].vel = DVec2::new(1.0, -1.0);
        scene.update(0.5); // 30 frames worth of motion
        let shape = &scene.shapes[0];
        assert_eq!(shape.pos, DVec2::new(800.0, 0.0));
        assert_eq!(shape.vel, DVec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_bounce_only_flips_offending_axis() {
        let mut pos = DVec2::new(-3.0, 50.0);
        let mut vel = DVec2::new(-2.0, 0.5);
        bounce(&mut pos, &mut vel, DVec2::new(100.0, 100.0));
        assert_eq!(pos, DVec2::new(0.0, 50.0));
        assert_eq!(vel, DVec2::new(2.0, 0.5));
    }

    #[test]
    fn test_shape_count_is_clamped() {
        let mut scene = FloatingShapes::with_seed(3);
        scene.set_shape_count(1);
        assert_eq!(scene.shapes.len(), MIN_SHAPES);
        scene.set_shape_count(1000);
        assert_eq!(scene.shapes.len(), MAX_SHAPES);
        scene.set_shape_count(42);
        assert_eq!(scene.shape_count(), 42);
    }

    #[test]
    fn test_initialize_is_repeatable() {
        let mut scene = FloatingShapes::with_seed(4);
        scene.initialize();
        scene.initialize();
        assert_eq!(scene.shapes.len(), DEFAULT_SHAPES);
    }

    #[test]
    fn test_resize_rescales_positions_and_sizes() {
        let mut scene = FloatingShapes::with_seed(5);
        scene.shapes[0].pos = DVec2::new(400.0, 300.0);
        let size = scene.shapes[0].size;
        scene.resize(DVec2::new(1600.0, 300.0));
        assert_eq!(scene.shapes[0].pos, DVec2::new(800.0, 150.0));
        assert!((scene.shapes[0].size - size * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_theme_switch_recolors_from_new_palette() {
        let mut scene = FloatingShapes::with_seed(6);
        scene.set_theme(Theme::HighContrast);
        assert!(
            scene
                .shapes
                .iter()
                .all(|s| Theme::HighContrast.palette().contains(&s.color))
        );
    }

    #[test]
    fn test_rainbow_keeps_stored_colors() {
        let mut scene = FloatingShapes::with_seed(7);
        let before: Vec<Rgba> = scene.shapes.iter().map(|s| s.color).collect();
        scene.set_theme(Theme::Rainbow);
        let after: Vec<Rgba> = scene.shapes.iter().map(|s| s.color).collect();
        assert_eq!(before, after);
    }
}
