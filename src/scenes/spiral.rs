use super::{EntityCounts, Scene};
use crate::color::Rgba;
use crate::draw::{DrawList, Viewport};
use crate::theme::{RAINBOW_CYCLE_SPEED, Theme, rainbow_color};
use glam::DVec2;
use std::f64::consts::{PI, TAU};

pub const DEFAULT_ARMS: usize = 1;
pub const MIN_ARMS: usize = 1;
pub const MAX_ARMS: usize = 6;

const TURNS: usize = 8;
/// Angular indices per arm, one per degree.
const POINTS: usize = 360 * TURNS;
/// Segment stride in angular indices.
const STEP: usize = 2;
const LINE_WIDTH: f64 = 3.0;

/// Palette slots used by even and odd arms.
const ARM_COLORS: [usize; 2] = [5, 0];

/// Rotating spiral with interleaved arms
pub struct InfiniteSpiral {
    rotation: f64,
    time: f64,
    speed: f64,
    arms: usize,
    theme: Theme,
    colors: [Rgba; 2],
}

impl InfiniteSpiral {
    pub fn new() -> Self {
        let theme = Theme::default();
        InfiniteSpiral {
            rotation: 0.0,
            time: 0.0,
            speed: 1.0,
            arms: DEFAULT_ARMS,
            theme,
            colors: ARM_COLORS.map(|slot| theme.color(slot)),
        }
    }

    pub fn set_spiral_count(&mut self, count: usize) {
        self.arms = count.clamp(MIN_ARMS, MAX_ARMS);
    }

    pub fn spiral_count(&self) -> usize {
        self.arms
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    fn arm_color(&self, arm: usize) -> Rgba {
        if self.theme.is_cycling() {
            rainbow_color(self.time + arm as f64 * 1.5, RAINBOW_CYCLE_SPEED)
        } else {
            self.colors[arm % 2]
        }
    }
}

impl Default for InfiniteSpiral {
    fn default() -> Self {
        Self::new()
    }
}

/// Point `index` (in degrees along the arm) of an arm rotated by `phase`.
fn arm_point(center: DVec2, max_radius: f64, phase: f64, index: usize) -> DVec2 {
    let angle = index as f64 / 180.0 * PI + phase;
    let radius = index as f64 / POINTS as f64 * max_radius;
    center + DVec2::from_angle(angle) * radius
}

impl Scene for InfiniteSpiral {
    fn name(&self) -> &str {
        "Infinite Spiral"
    }

    fn initialize(&mut self) {
        self.rotation = 0.0;
        self.time = 0.0;
    }

    fn update(&mut self, dt: f64) {
        self.rotation += dt * self.speed * 0.5;
        self.time += dt * self.speed;
    }

    fn draw(&self, viewport: &Viewport) -> DrawList {
        let center = viewport.center();
        let max_radius = viewport.base_size() * 0.4;
        let mut list = DrawList::with_capacity(self.arms * POINTS / STEP);

        for arm in 0..self.arms {
            let phase = self.rotation + arm as f64 / self.arms as f64 * TAU;
            let color = self.arm_color(arm);
            let mut prev = arm_point(center, max_radius, phase, 0);
            for i in (STEP..POINTS).step_by(STEP) {
                let point = arm_point(center, max_radius, phase, i);
                list.line(prev, point, color, LINE_WIDTH);
                prev = point;
            }
        }
        list
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.colors = ARM_COLORS.map(|slot| theme.color(slot));
    }

    fn apply_counts(&mut self, counts: &EntityCounts) {
        self.set_spiral_count(counts.spiral_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::DrawCommand;

    #[test]
    fn test_rotation_advances_at_half_speed() {
        let mut scene = InfiniteSpiral::new();
        scene.set_speed(2.0);
        scene.update(1.0);
        assert!((scene.rotation() - 1.0).abs() < 1e-12);
        scene.initialize();
        assert_eq!(scene.rotation(), 0.0);
    }

    #[test]
    fn test_segments_per_arm() {
        let mut scene = InfiniteSpiral::new();
        scene.set_spiral_count(3);
        let list = scene.draw(&Viewport::sized(800.0, 600.0));
        assert_eq!(list.len(), 3 * (POINTS / STEP - 1));
    }

    #[test]
    fn test_arms_alternate_colors() {
        let mut scene = InfiniteSpiral::new();
        scene.set_theme(Theme::Bright);
        scene.set_spiral_count(2);
        let list = scene.draw(&Viewport::sized(800.0, 600.0));
        let per_arm = POINTS / STEP - 1;
        assert_eq!(list.commands()[0].color(), Theme::Bright.color(5));
        assert_eq!(list.commands()[per_arm].color(), Theme::Bright.color(0));
    }

    #[test]
    fn test_arm_starts_at_center_and_stays_inside_radius() {
        let scene = InfiniteSpiral::new();
        let vp = Viewport::sized(800.0, 600.0);
        let list = scene.draw(&vp);
        let DrawCommand::Line { from, .. } = list.commands()[0] else {
            panic!("expected a line");
        };
        assert_eq!(from, vp.center());
        for cmd in &list {
            if let DrawCommand::Line { to, .. } = cmd {
                assert!(to.distance(vp.center()) <= 240.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_spiral_count_is_clamped() {
        let mut scene = InfiniteSpiral::new();
        scene.set_spiral_count(0);
        assert_eq!(scene.spiral_count(), MIN_ARMS);
        scene.set_spiral_count(99);
        assert_eq!(scene.spiral_count(), MAX_ARMS);
    }
}
