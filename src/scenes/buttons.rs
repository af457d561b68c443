use super::{DEFAULT_CANVAS, Scene};
use crate::color::Rgba;
use crate::draw::{DrawList, Viewport};
use crate::theme::{RAINBOW_CYCLE_SPEED, Theme, rainbow_color, random_color};
use glam::DVec2;
use rand::RngExt;
use rand::rngs::StdRng;

pub const COLUMNS: usize = 8;
pub const ROWS: usize = 6;

/// Fraction of its grid slot a button fills.
const FILL: f64 = 0.8;
/// Glow eases toward its target at this many units per second.
const EASE_RATE: f64 = 2.0;
const OFF_COLOR: Rgba = Rgba::new(0.27, 0.27, 0.27, 1.0);
const OFF_BORDER: Rgba = Rgba::new(0.4, 0.4, 0.4, 1.0);

#[derive(Debug, Clone)]
pub struct Button {
    /// Centre, canvas-relative.
    pub center: DVec2,
    pub size: DVec2,
    pub glowing: bool,
    pub color: Rgba,
    pub intensity: f64,
}

impl Button {
    pub fn contains(&self, point: DVec2) -> bool {
        let half = self.size / 2.0;
        point.x >= self.center.x - half.x
            && point.x <= self.center.x + half.x
            && point.y >= self.center.y - half.y
            && point.y <= self.center.y + half.y
    }
}

/// Grid of toggle buttons. Clicking one flips it and sends a ripple of
/// random toggles and recolors across the rest of the grid.
pub struct ButtonGrid {
    buttons: Vec<Button>,
    canvas: DVec2,
    time: f64,
    speed: f64,
    theme: Theme,
    rng: StdRng,
}

impl ButtonGrid {
    pub fn new() -> Self {
        Self::with_rng(super::seeded_rng(None))
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(super::seeded_rng(Some(seed)))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        let mut scene = ButtonGrid {
            buttons: Vec::with_capacity(COLUMNS * ROWS),
            canvas: DEFAULT_CANVAS,
            time: 0.0,
            speed: 1.0,
            theme: Theme::default(),
            rng,
        };
        scene.initialize();
        scene
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Index of the button under a canvas-relative point.
    pub fn button_at(&self, point: DVec2) -> Option<usize> {
        self.buttons.iter().position(|b| b.contains(point))
    }

    /// Toggle button `index`, then ripple: 3 to 5 other buttons are switched
    /// on (70%) or off (30%) and roughly a third of all buttons are recolored.
    pub fn press(&mut self, index: usize) {
        let Some(button) = self.buttons.get_mut(index) else {
            return;
        };
        button.glowing = !button.glowing;

        for pick in self.ripple_targets(index) {
            self.buttons[pick].glowing = self.rng.random_bool(0.7);
        }

        for button in &mut self.buttons {
            if self.rng.random_bool(0.3) {
                button.color = random_color(self.theme, &mut self.rng);
            }
        }
    }

    /// Three to five distinct buttons other than `index`.
    fn ripple_targets(&mut self, index: usize) -> Vec<usize> {
        let mut others: Vec<usize> = (0..self.buttons.len()).filter(|&i| i != index).collect();
        let count = self.rng.random_range(3..=5).min(others.len());
        let mut picks = Vec::with_capacity(count);
        for _ in 0..count {
            let slot = self.rng.random_range(0..others.len());
            picks.push(others.swap_remove(slot));
        }
        picks
    }

    fn button_color(&self, index: usize, button: &Button) -> Rgba {
        if self.theme.is_cycling() {
            rainbow_color(self.time + index as f64 * 0.25, RAINBOW_CYCLE_SPEED)
        } else {
            button.color
        }
    }
}

impl Default for ButtonGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for ButtonGrid {
    fn name(&self) -> &str {
        "Button Grid"
    }

    fn initialize(&mut self) {
        self.buttons.clear();
        let slot = self.canvas / DVec2::new(COLUMNS as f64, ROWS as f64);
        for row in 0..ROWS {
            for col in 0..COLUMNS {
                let glowing = self.rng.random_bool(0.5);
                let intensity = if glowing {
                    0.8 + self.rng.random::<f64>() * 0.2
                } else {
                    0.0
                };
                let color = random_color(self.theme, &mut self.rng);
                self.buttons.push(Button {
                    center: DVec2::new(col as f64 + 0.5, row as f64 + 0.5) * slot,
                    size: slot * FILL,
                    glowing,
                    color,
                    intensity,
                });
            }
        }
    }

    fn update(&mut self, dt: f64) {
        let dt = dt * self.speed;
        self.time += dt;
        let step = dt * EASE_RATE;
        for button in &mut self.buttons {
            button.intensity = if button.glowing {
                (button.intensity + step).min(1.0)
            } else {
                (button.intensity - step).max(0.0)
            };
        }
    }

    /// The grid is rebuilt from scratch; toggle state does not survive.
    fn resize(&mut self, size: DVec2) {
        if size == self.canvas || size.min_element() <= 0.0 {
            return;
        }
        self.canvas = size;
        self.initialize();
        tracing::debug!(width = size.x, height = size.y, "button grid rebuilt");
    }

    fn draw(&self, viewport: &Viewport) -> DrawList {
        let mut list = DrawList::with_capacity(self.buttons.len() * 3);
        for (i, button) in self.buttons.iter().enumerate() {
            let center = viewport.origin + button.center;
            let half = button.size / 2.0;
            let color = self.button_color(i, button);

            if button.glowing && button.intensity > 0.0 {
                let spread = DVec2::splat(button.intensity * 15.0);
                list.rect_filled(
                    center - half - spread,
                    center + half + spread,
                    color.with_alpha(button.intensity * 0.3),
                );
            }

            let body = if button.glowing { color } else { OFF_COLOR };
            list.rect_filled(center - half, center + half, body);

            let border = if button.glowing { Rgba::WHITE } else { OFF_BORDER };
            list.rect(center - half, center + half, border, 2.0);
        }
        list
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if !theme.is_cycling() {
            for button in &mut self.buttons {
                button.color = random_color(theme, &mut self.rng);
            }
        }
    }

    fn handle_click(&mut self, point: DVec2) -> bool {
        match self.button_at(point) {
            Some(index) => {
                self.press(index);
                true
            }
            None => false,
        }
    }
}
