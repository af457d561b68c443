use super::Scene;
use crate::color::Rgba;
use crate::draw::{DrawList, Viewport};
use crate::theme::{RAINBOW_CYCLE_SPEED, Theme, rainbow_color};
use glam::DVec2;
use std::f64::consts::{FRAC_PI_3, TAU};

const ARM_LENGTH: f64 = 200.0;
/// Pivot distance below the top of the canvas.
const PIVOT_DROP: f64 = 100.0;
/// Swing amplitude (60 degrees).
const AMPLITUDE: f64 = FRAC_PI_3;
const WATCH_RADIUS: f64 = 40.0;
const STRING_COLOR: Rgba = Rgba::new(0.88, 0.88, 0.88, 1.0);
/// Palette slot for the watch face.
const FACE_SLOT: usize = 5;

/// Pocket watch swinging on a string
pub struct Pendulum {
    time: f64,
    speed: f64,
    theme: Theme,
    color: Rgba,
}

impl Pendulum {
    pub fn new() -> Self {
        let theme = Theme::default();
        Pendulum {
            time: 0.0,
            speed: 1.0,
            theme,
            color: theme.color(FACE_SLOT),
        }
    }

    /// Current swing angle in radians, 0 when hanging straight down.
    pub fn angle(&self) -> f64 {
        AMPLITUDE * (self.time * 2.0).sin()
    }

    /// Pivot and bob positions for a viewport.
    pub fn arm(&self, viewport: &Viewport) -> (DVec2, DVec2) {
        let pivot = DVec2::new(viewport.center().x, viewport.origin.y + PIVOT_DROP);
        let angle = self.angle();
        let bob = pivot + DVec2::new(angle.sin(), angle.cos()) * ARM_LENGTH;
        (pivot, bob)
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for Pendulum {
    fn name(&self) -> &str {
        "Pendulum"
    }

    fn initialize(&mut self) {
        self.time = 0.0;
    }

    fn update(&mut self, dt: f64) {
        self.time += dt * self.speed;
    }

    fn draw(&self, viewport: &Viewport) -> DrawList {
        let (pivot, bob) = self.arm(viewport);
        let face = if self.theme.is_cycling() {
            rainbow_color(self.time, RAINBOW_CYCLE_SPEED)
        } else {
            self.color
        };
        let white = Rgba::WHITE;

        let mut list = DrawList::with_capacity(17);
        list.line(pivot, bob, STRING_COLOR, 2.0);
        list.circle_filled(bob, WATCH_RADIUS, face);
        list.circle(bob, WATCH_RADIUS, white, 3.0);

        // Hour ticks
        for hour in 0..12 {
            let dir = DVec2::from_angle(hour as f64 / 12.0 * TAU);
            list.line(
                bob + dir * (WATCH_RADIUS - 5.0),
                bob + dir * WATCH_RADIUS,
                white,
                2.0,
            );
        }

        // Hands are painted on; they swing with the bob, not the clock
        list.line(bob, bob - DVec2::new(0.0, WATCH_RADIUS * 0.6), white, 3.0);
        list.line(bob, bob + DVec2::new(WATCH_RADIUS * 0.4, 0.0), white, 2.0);
        list
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.color = theme.color(FACE_SLOT);
    }
}
