use super::{EntityCounts, Scene};
use crate::color::Rgba;
use crate::draw::{DrawList, Viewport};
use crate::theme::{RAINBOW_CYCLE_SPEED, Theme, rainbow_color};
use glam::DVec2;
use std::f64::consts::TAU;

pub const DEFAULT_WAVES: usize = 3;
pub const MIN_WAVES: usize = 1;
pub const MAX_WAVES: usize = 10;

/// Amplitude as a fraction of the smaller canvas dimension.
const AMPLITUDE: f64 = 0.08;
/// Horizontal sample spacing.
const SAMPLE_STEP: usize = 2;
const LINE_WIDTH: f64 = 4.0;

/// Stacked sine waves rolling across the canvas
pub struct FlowingWaves {
    time: f64,
    speed: f64,
    waves: usize,
    theme: Theme,
    primary: Rgba,
    secondary: Rgba,
}

impl FlowingWaves {
    pub fn new() -> Self {
        let theme = Theme::default();
        FlowingWaves {
            time: 0.0,
            speed: 1.0,
            waves: DEFAULT_WAVES,
            theme,
            primary: theme.color(0),
            secondary: theme.color(1),
        }
    }

    pub fn set_wave_count(&mut self, count: usize) {
        self.waves = count.clamp(MIN_WAVES, MAX_WAVES);
    }

    pub fn wave_count(&self) -> usize {
        self.waves
    }

    fn wave_color(&self, w: usize) -> Rgba {
        if self.theme.is_cycling() {
            rainbow_color(self.time * 0.5 + w as f64 * 0.3, RAINBOW_CYCLE_SPEED)
        } else if w % 2 == 0 {
            self.primary
        } else {
            self.secondary
        }
    }

    /// Vertical offset of wave `w` from the canvas centre line.
    fn offset(&self, w: usize, amplitude: f64) -> f64 {
        (w as f64 - (self.waves - 1) as f64 / 2.0) * amplitude * 2.0
    }
}

impl Default for FlowingWaves {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for FlowingWaves {
    fn name(&self) -> &str {
        "Flowing Waves"
    }

    fn initialize(&mut self) {
        self.time = 0.0;
        self.primary = self.theme.color(0);
        self.secondary = self.theme.color(1);
    }

    fn update(&mut self, dt: f64) {
        self.time += dt * self.speed;
    }

    fn draw(&self, viewport: &Viewport) -> DrawList {
        let center_y = viewport.center().y;
        let wavelength = viewport.size.x / 2.0;
        let amplitude = AMPLITUDE * viewport.base_size();
        let samples = viewport.size.x.max(0.0) as usize / SAMPLE_STEP + 1;
        let mut list = DrawList::with_capacity(self.waves * samples);

        for w in 0..self.waves {
            let color = self.wave_color(w);
            let base_y = center_y + self.offset(w, amplitude);
            let phase = w as f64 / self.waves as f64 * TAU;

            let mut prev: Option<DVec2> = None;
            for x in (0..samples).map(|i| (i * SAMPLE_STEP) as f64) {
                let y = base_y + ((x / wavelength) * TAU + self.time * 2.0 + phase).sin() * amplitude;
                let point = DVec2::new(viewport.origin.x + x, y);
                if let Some(p) = prev {
                    list.line(p, point, color, LINE_WIDTH);
                }
                prev = Some(point);
            }
        }
        list
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.primary = theme.color(0);
        self.secondary = theme.color(1);
    }

    fn apply_counts(&mut self, counts: &EntityCounts) {
        self.set_wave_count(counts.wave_count);
    }
}
