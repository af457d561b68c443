pub mod breathing;
pub mod buttons;
pub mod floating;
pub mod pendulum;
pub mod spiral;
pub mod stars;
pub mod waves;

use crate::draw::{DrawList, Viewport};
use crate::theme::Theme;
use glam::DVec2;
use rand::RngExt;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Canvas size scenes assume until the first resize.
pub const DEFAULT_CANVAS: DVec2 = DVec2::new(800.0, 600.0);

/// Every scene implements this trait.
///
/// Lifecycle: `initialize` when activated (and whenever entity layout must be
/// rebuilt), `update` once per frame, `resize` when the canvas changes size,
/// `draw` to read out the frame, `cleanup` once on deactivation.
pub trait Scene {
    /// Human-readable name, also the case-insensitive registry key.
    fn name(&self) -> &str;

    /// (Re)seed entity state. Safe to call any number of times.
    fn initialize(&mut self);

    /// Advance the simulation by `dt` seconds, scaled by the scene speed.
    fn update(&mut self, dt: f64);

    /// Emit this frame's primitives. Never mutates simulation state.
    fn draw(&self, viewport: &Viewport) -> DrawList;

    /// Canvas size changed. Default: geometry is derived at draw time.
    fn resize(&mut self, _size: DVec2) {}

    /// Called once when the scene stops being active. Default is a no-op.
    fn cleanup(&mut self) {}

    fn set_speed(&mut self, speed: f64);

    fn set_theme(&mut self, _theme: Theme) {}

    /// Pick up whichever configured entity count this scene uses.
    fn apply_counts(&mut self, _counts: &EntityCounts) {}

    /// Click at a canvas-relative point. Returns true if the scene reacted.
    fn handle_click(&mut self, _point: DVec2) -> bool {
        false
    }
}

/// Configured entity counts. Each scene clamps the field it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCounts {
    pub spiral_count: usize,
    pub wave_count: usize,
    pub shape_count: usize,
    pub star_count: usize,
}

impl Default for EntityCounts {
    fn default() -> Self {
        EntityCounts {
            spiral_count: spiral::DEFAULT_ARMS,
            wave_count: waves::DEFAULT_WAVES,
            shape_count: floating::DEFAULT_SHAPES,
            star_count: stars::DEFAULT_STARS,
        }
    }
}

/// All available scenes with descriptions.
pub const SCENES: &[(&str, &str)] = &[
    ("Breathing Circle", "Softly pulsing circle to breathe along with"),
    ("Floating Shapes", "Drifting bubbles bouncing off the edges"),
    ("Glowing Stars", "Stars fading in and out at random spots"),
    ("Infinite Spiral", "Slowly rotating multi-arm spiral"),
    ("Flowing Waves", "Layered sine waves rolling across the canvas"),
    ("Button Grid", "Grid of glowing buttons that ripple when clicked"),
    ("Pendulum", "Pocket watch swinging on a string"),
];

/// Create a scene by name (case-insensitive). `seed` makes its randomness
/// reproducible; `None` seeds from the thread generator.
pub fn create(name: &str, seed: Option<u64>) -> Option<Box<dyn Scene>> {
    let rng = seeded_rng(seed);
    let scene: Box<dyn Scene> = match name.trim().to_ascii_lowercase().as_str() {
        "breathing circle" => Box::new(breathing::BreathingCircle::new()),
        "floating shapes" => Box::new(floating::FloatingShapes::with_rng(rng)),
        "glowing stars" => Box::new(stars::GlowingStars::with_rng(rng)),
        "infinite spiral" => Box::new(spiral::InfiniteSpiral::new()),
        "flowing waves" => Box::new(waves::FlowingWaves::new()),
        "button grid" => Box::new(buttons::ButtonGrid::with_rng(rng)),
        "pendulum" => Box::new(pendulum::Pendulum::new()),
        _ => return None,
    };
    Some(scene)
}

/// One instance of every scene. Each gets its own generator, derived from
/// `seed` when given.
pub fn create_all(seed: Option<u64>) -> Vec<Box<dyn Scene>> {
    SCENES
        .iter()
        .enumerate()
        .filter_map(|(i, &(name, _))| create(name, seed.map(|s| s.wrapping_add(i as u64))))
        .collect()
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    StdRng::seed_from_u64(seed)
}
