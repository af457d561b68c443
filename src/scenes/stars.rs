use super::{DEFAULT_CANVAS, EntityCounts, Scene};
use crate::color::Rgba;
use crate::draw::{DrawList, Viewport};
use crate::theme::{RAINBOW_CYCLE_SPEED, Theme, rainbow_color, random_color};
use glam::DVec2;
use rand::RngExt;
use rand::rngs::StdRng;

pub const DEFAULT_STARS: usize = 15;
pub const MIN_STARS: usize = 5;
pub const MAX_STARS: usize = 50;

/// Seconds spent fading in, and again fading out.
const FADE: f64 = 0.5;

struct Star {
    pos: DVec2,
    size: f64,
    life: f64,
    max_life: f64,
    glow: f64,
    color: Rgba,
}

/// Glow for a star `life` seconds into a `max_life` second lifetime.
fn glow_at(life: f64, max_life: f64) -> f64 {
    if life < FADE {
        life / FADE
    } else if life > max_life - FADE {
        ((max_life - life) / FADE).max(0.0)
    } else {
        1.0
    }
}

/// Stars that fade in, glow, fade out and reappear elsewhere.
///
/// The pool is a fixed set of slots: a star that reaches the end of its life
/// is respawned in the same slot, so the star count never changes between
/// calls to `set_max_stars`.
pub struct GlowingStars {
    stars: Vec<Star>,
    max_stars: usize,
    canvas: DVec2,
    time: f64,
    speed: f64,
    theme: Theme,
    rng: StdRng,
}

impl GlowingStars {
    pub fn new() -> Self {
        Self::with_rng(super::seeded_rng(None))
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(super::seeded_rng(Some(seed)))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        let mut scene = GlowingStars {
            stars: Vec::new(),
            max_stars: DEFAULT_STARS,
            canvas: DEFAULT_CANVAS,
            time: 0.0,
            speed: 1.0,
            theme: Theme::default(),
            rng,
        };
        scene.initialize();
        scene
    }

    /// Change the pool size (clamped) and reseed every slot.
    pub fn set_max_stars(&mut self, count: usize) {
        self.max_stars = count.clamp(MIN_STARS, MAX_STARS);
        self.initialize();
    }

    pub fn max_stars(&self) -> usize {
        self.max_stars
    }

    /// Number of live stars; always equal to `max_stars`.
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    fn spawn(&mut self) -> Star {
        let rng = &mut self.rng;
        Star {
            pos: DVec2::new(
                rng.random::<f64>() * self.canvas.x,
                rng.random::<f64>() * self.canvas.y,
            ),
            size: 3.0 + rng.random::<f64>() * 8.0,
            life: 0.0,
            max_life: 2.0 + rng.random::<f64>() * 3.0,
            glow: 0.0,
            color: random_color(self.theme, rng),
        }
    }

    fn star_color(&self, index: usize, star: &Star) -> Rgba {
        if self.theme.is_cycling() {
            rainbow_color(self.time + index as f64 * 0.7, RAINBOW_CYCLE_SPEED)
        } else {
            star.color
        }
    }
}

impl Default for GlowingStars {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for GlowingStars {
    fn name(&self) -> &str {
        "Glowing Stars"
    }

    fn initialize(&mut self) {
        self.stars.clear();
        for _ in 0..self.max_stars {
            let star = self.spawn();
            self.stars.push(star);
        }
    }

    fn update(&mut self, dt: f64) {
        let dt = dt * self.speed;
        self.time += dt;
        for i in 0..self.stars.len() {
            let star = &mut self.stars[i];
            star.life += dt;
            star.glow = glow_at(star.life, star.max_life);
            if star.life >= star.max_life {
                self.stars[i] = self.spawn();
            }
        }
    }

    fn resize(&mut self, size: DVec2) {
        if size == self.canvas || size.min_element() <= 0.0 {
            return;
        }
        for star in &mut self.stars {
            star.pos = star.pos / self.canvas * size;
        }
        self.canvas = size;
    }

    fn draw(&self, viewport: &Viewport) -> DrawList {
        let mut list = DrawList::with_capacity(self.stars.len() * 2);
        for (i, star) in self.stars.iter().enumerate() {
            let pos = viewport.origin + star.pos;
            let color = self.star_color(i, star);
            list.circle_filled(pos, star.size * 3.0, color.with_alpha(star.glow * 0.5));
            list.circle_filled(pos, star.size, color.with_alpha(star.glow));
        }
        list
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if !theme.is_cycling() {
            for star in &mut self.stars {
                star.color = random_color(theme, &mut self.rng);
            }
        }
    }

    fn apply_counts(&mut self, counts: &EntityCounts) {
        self.set_max_stars(counts.star_count);
    }
}
