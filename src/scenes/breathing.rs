use super::Scene;
use crate::color::Rgba;
use crate::draw::{DrawList, Viewport};
use crate::theme::{RAINBOW_CYCLE_SPEED, Theme, rainbow_color};
use glam::DVec2;

/// Smallest radius, as a fraction of the smaller canvas dimension.
const MIN_SIZE: f64 = 0.08;
/// Largest radius, as a fraction of the smaller canvas dimension.
const MAX_SIZE: f64 = 0.3;

/// Single circle that slowly grows and shrinks.
pub struct BreathingCircle {
    time: f64,
    speed: f64,
    theme: Theme,
    color: Rgba,
}

impl BreathingCircle {
    pub fn new() -> Self {
        let theme = Theme::default();
        BreathingCircle {
            time: 0.0,
            speed: 1.0,
            theme,
            color: theme.color(0),
        }
    }

    /// Breath phase in 0..=1; 0 is fully exhaled.
    pub fn phase(&self) -> f64 {
        ((self.time * 2.0).sin() + 1.0) / 2.0
    }

    /// Current radius for a canvas whose smaller side is `base_size`.
    pub fn radius(&self, base_size: f64) -> f64 {
        let min = MIN_SIZE * base_size;
        let max = MAX_SIZE * base_size;
        min + (max - min) * self.phase()
    }

    fn current_color(&self) -> Rgba {
        if self.theme.is_cycling() {
            rainbow_color(self.time, RAINBOW_CYCLE_SPEED)
        } else {
            self.color
        }
    }
}

impl Default for BreathingCircle {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for BreathingCircle {
    fn name(&self) -> &str {
        "Breathing Circle"
    }

    fn initialize(&mut self) {
        self.time = 0.0;
        self.color = self.theme.color(0);
    }

    fn update(&mut self, dt: f64) {
        self.time += dt * self.speed;
    }

    fn draw(&self, viewport: &Viewport) -> DrawList {
        let center = viewport.center();
        let size = self.radius(viewport.base_size());
        let color = self.current_color();

        let mut list = DrawList::with_capacity(3);
        // Glow
        list.circle_filled(center, size * 1.5, color.with_alpha(0.3));
        list.circle_filled(center, size, color);
        // Highlight
        list.circle_filled(
            center - DVec2::splat(size * 0.3),
            size * 0.4,
            Rgba::WHITE.with_alpha(0.3),
        );
        list
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.color = theme.color(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::DrawCommand;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_starts_at_min_radius() {
        let mut scene = BreathingCircle::new();
        scene.initialize();
        scene.update(0.0);
        assert!((scene.radius(600.0) - MIN_SIZE * 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_reaches_max_radius_at_quarter_pi() {
        let mut scene = BreathingCircle::new();
        scene.initialize();
        let steps = 100;
        for _ in 0..steps {
            scene.update(FRAC_PI_4 / steps as f64);
        }
        assert!((scene.phase() - 1.0).abs() < 1e-9);
        assert!((scene.radius(600.0) - MAX_SIZE * 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_speed_scales_clock() {
        let mut scene = BreathingCircle::new();
        scene.set_speed(2.0);
        scene.update(FRAC_PI_4 / 2.0);
        assert!((scene.phase() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_uses_first_palette_color() {
        let mut scene = BreathingCircle::new();
        scene.set_theme(Theme::Bright);
        let list = scene.draw(&Viewport::sized(800.0, 600.0));
        match list.commands()[1] {
            DrawCommand::CircleFilled { center, color, .. } => {
                assert_eq!(center, DVec2::new(400.0, 300.0));
                assert_eq!(color, Theme::Bright.color(0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rainbow_color_follows_clock() {
        let mut scene = BreathingCircle::new();
        scene.set_theme(Theme::Rainbow);
        scene.update(2.5);
        let list = scene.draw(&Viewport::sized(800.0, 600.0));
        assert_eq!(list.commands()[1].color(), rainbow_color(2.5, RAINBOW_CYCLE_SPEED));
    }
}
