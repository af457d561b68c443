//! Scene registry and the single-active-scene state machine.

use crate::draw::{DrawList, Viewport};
use crate::scenes::{EntityCounts, Scene};
use crate::theme::Theme;
use glam::DVec2;
use std::collections::BTreeMap;

/// Scene the manager points at before the first switch.
pub const DEFAULT_SCENE: &str = "pendulum";

/// Owns every registered scene and forwards frame calls to the current one.
///
/// The current scene is looked up by name on every call, so the manager may
/// point at a name that has not been registered yet. At most one scene is
/// initialized and not yet cleaned up at any time.
pub struct SceneManager {
    scenes: BTreeMap<String, Box<dyn Scene>>,
    current: String,
    /// Whether `current` has been initialized and not cleaned up since.
    live: bool,
    speed: f64,
    theme: Theme,
    last_size: Option<DVec2>,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl SceneManager {
    pub fn new() -> Self {
        Self::with_default(DEFAULT_SCENE)
    }

    /// Manager whose current scene starts as `name`.
    pub fn with_default(name: &str) -> Self {
        SceneManager {
            scenes: BTreeMap::new(),
            current: key(name),
            live: false,
            speed: 1.0,
            theme: Theme::default(),
            last_size: None,
        }
    }

    /// Add a scene, replacing any scene registered under the same name.
    ///
    /// Replacing the live scene cleans up the old instance and initializes
    /// the new one in its place.
    pub fn register(&mut self, mut scene: Box<dyn Scene>) {
        let name = key(scene.name());
        scene.set_theme(self.theme);
        let replacing_live = self.live && name == self.current;
        if replacing_live {
            scene.set_speed(self.speed);
        }
        if let Some(mut old) = self.scenes.insert(name.clone(), scene) {
            if replacing_live {
                old.cleanup();
                self.last_size = None;
                if let Some(new) = self.scenes.get_mut(&name) {
                    new.initialize();
                }
            }
        }
        tracing::debug!(scene = %name, "registered scene");
    }

    /// Make `name` the active scene. Unknown names leave everything as is and
    /// return false. Switching to the current scene restarts it.
    pub fn switch(&mut self, name: &str) -> bool {
        let target = key(name);
        if !self.scenes.contains_key(&target) {
            tracing::warn!(scene = %name, "switch to unknown scene ignored");
            return false;
        }

        if self.live
            && let Some(old) = self.scenes.get_mut(&self.current)
        {
            old.cleanup();
        }
        self.live = false;

        self.current = target;
        self.last_size = None;
        if let Some(scene) = self.scenes.get_mut(&self.current) {
            scene.set_speed(self.speed);
            scene.initialize();
            self.live = true;
        }
        tracing::debug!(scene = %self.current, "switched scene");
        true
    }

    /// Step `offset` places through the sorted scene list from the current
    /// scene, wrapping around, and switch there.
    pub fn cycle(&mut self, offset: isize) -> bool {
        let names: Vec<String> = self.scenes.keys().cloned().collect();
        if names.is_empty() {
            return false;
        }
        let len = names.len() as isize;
        let idx = names.iter().position(|n| *n == self.current).unwrap_or(0) as isize;
        let next = (idx + offset).rem_euclid(len) as usize;
        self.switch(&names[next])
    }

    pub fn update(&mut self, dt: f64) {
        if let Some(scene) = self.scenes.get_mut(&self.current) {
            scene.update(dt);
        }
    }

    /// Resize the current scene if the viewport size changed, then draw it.
    pub fn draw(&mut self, viewport: &Viewport) -> DrawList {
        let Some(scene) = self.scenes.get_mut(&self.current) else {
            return DrawList::new();
        };
        if self.last_size != Some(viewport.size) {
            scene.resize(viewport.size);
            self.last_size = Some(viewport.size);
        }
        scene.draw(viewport)
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        if let Some(scene) = self.scenes.get_mut(&self.current) {
            scene.set_speed(speed);
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Apply a theme by name to every registered scene.
    pub fn set_theme(&mut self, name: &str) {
        self.apply_theme(Theme::from_name(name));
    }

    pub fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        for scene in self.scenes.values_mut() {
            scene.set_theme(theme);
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Hand configured entity counts to every registered scene.
    pub fn apply_counts(&mut self, counts: &EntityCounts) {
        for scene in self.scenes.values_mut() {
            scene.apply_counts(counts);
        }
    }

    /// Forward a canvas-relative click. Returns true if the scene reacted.
    pub fn handle_click(&mut self, point: DVec2) -> bool {
        self.scenes
            .get_mut(&self.current)
            .is_some_and(|scene| scene.handle_click(point))
    }

    /// Registry key of the current scene (lower-case).
    pub fn current_scene_name(&self) -> &str {
        &self.current
    }

    pub fn current_scene(&self) -> Option<&dyn Scene> {
        self.scenes.get(&self.current).map(|s| s.as_ref())
    }

    /// Registry keys in sorted order.
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    /// Human-readable name for a registry key.
    pub fn display_name(&self, name: &str) -> Option<&str> {
        self.scenes.get(&key(name)).map(|s| s.name())
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Scene that records lifecycle calls.
    struct Recorder {
        name: String,
        log: Log,
        speed: f64,
    }

    impl Recorder {
        fn boxed(name: &str, log: &Log) -> Box<dyn Scene> {
            Box::new(Recorder {
                name: name.to_string(),
                log: Rc::clone(log),
                speed: 1.0,
            })
        }

        fn record(&self, event: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.name, event));
        }
    }

    impl Scene for Recorder {
        fn name(&self) -> &str {
            &self.name
        }
        fn initialize(&mut self) {
            self.record("init");
        }
        fn update(&mut self, dt: f64) {
            self.record(&format!("update {}", dt * self.speed));
        }
        fn draw(&self, _viewport: &Viewport) -> DrawList {
            DrawList::new()
        }
        fn resize(&mut self, size: DVec2) {
            self.record(&format!("resize {}x{}", size.x, size.y));
        }
        fn cleanup(&mut self) {
            self.record("cleanup");
        }
        fn set_speed(&mut self, speed: f64) {
            self.speed = speed;
        }
        fn handle_click(&mut self, _point: DVec2) -> bool {
            self.record("click");
            true
        }
    }

    fn manager_with(names: &[&str]) -> (SceneManager, Log) {
        let log: Log = Rc::default();
        let mut manager = SceneManager::new();
        for name in names {
            manager.register(Recorder::boxed(name, &log));
        }
        (manager, log)
    }

    #[test]
    fn test_cleanup_precedes_initialize() {
        let (mut manager, log) = manager_with(&["Alpha", "Beta"]);
        assert!(manager.switch("alpha"));
        assert!(manager.switch("beta"));
        assert_eq!(*log.borrow(), ["Alpha:init", "Alpha:cleanup", "Beta:init"]);
    }

    #[test]
    fn test_unknown_switch_is_a_no_op() {
        let (mut manager, log) = manager_with(&["Alpha"]);
        manager.switch("Alpha");
        assert!(!manager.switch("gamma"));
        assert_eq!(manager.current_scene_name(), "alpha");
        assert_eq!(*log.borrow(), ["Alpha:init"]);
    }

    #[test]
    fn test_default_scene_is_resolved_lazily() {
        let (mut manager, log) = manager_with(&[]);
        assert_eq!(manager.current_scene_name(), DEFAULT_SCENE);
        assert!(manager.current_scene().is_none());
        manager.update(0.1);
        manager.register(Recorder::boxed("Pendulum", &log));
        assert_eq!(manager.display_name(DEFAULT_SCENE), Some("Pendulum"));
        manager.update(0.5);
        assert_eq!(*log.borrow(), ["Pendulum:update 0.5"]);
    }

    #[test]
    fn test_switch_is_case_insensitive() {
        let (mut manager, _log) = manager_with(&["Pendulum"]);
        assert!(manager.switch("PENDULUM"));
        assert_eq!(manager.current_scene().map(|s| s.name()), Some("Pendulum"));
    }

    #[test]
    fn test_switch_to_current_restarts() {
        let (mut manager, log) = manager_with(&["Alpha"]);
        manager.switch("alpha");
        manager.switch("Alpha");
        assert_eq!(*log.borrow(), ["Alpha:init", "Alpha:cleanup", "Alpha:init"]);
    }

    #[test]
    fn test_speed_reaches_scene_switched_to_later() {
        let (mut manager, log) = manager_with(&["Alpha", "Beta"]);
        manager.switch("alpha");
        manager.set_speed(2.0);
        manager.switch("beta");
        manager.update(0.25);
        assert_eq!(log.borrow().last().map(String::as_str), Some("Beta:update 0.5"));
    }

    #[test]
    fn test_draw_resizes_only_on_change() {
        let (mut manager, log) = manager_with(&["Alpha"]);
        manager.switch("alpha");
        let vp = Viewport::sized(800.0, 600.0);
        manager.draw(&vp);
        manager.draw(&vp);
        manager.draw(&Viewport::sized(1000.0, 600.0));
        assert_eq!(
            *log.borrow(),
            ["Alpha:init", "Alpha:resize 800x600", "Alpha:resize 1000x600"]
        );
    }

    #[test]
    fn test_register_overwrites_by_name() {
        let (mut manager, log) = manager_with(&["Alpha"]);
        manager.register(Recorder::boxed("ALPHA", &log));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.display_name("alpha"), Some("ALPHA"));
    }

    #[test]
    fn test_replacing_live_scene_cleans_up_old_instance() {
        let (mut manager, log) = manager_with(&["Alpha"]);
        manager.switch("alpha");
        manager.register(Recorder::boxed("alpha", &log));
        assert_eq!(*log.borrow(), ["Alpha:init", "Alpha:cleanup", "alpha:init"]);
    }

    #[test]
    fn test_cycle_wraps_in_sorted_order() {
        let (mut manager, _log) = manager_with(&["Beta", "Alpha", "Gamma"]);
        manager.switch("gamma");
        assert!(manager.cycle(1));
        assert_eq!(manager.current_scene_name(), "alpha");
        assert!(manager.cycle(-1));
        assert_eq!(manager.current_scene_name(), "gamma");
    }

    #[test]
    fn test_click_goes_to_current_scene_only() {
        let (mut manager, log) = manager_with(&["Alpha", "Beta"]);
        assert!(!SceneManager::new().handle_click(DVec2::ZERO));
        manager.switch("beta");
        assert!(manager.handle_click(DVec2::new(1.0, 1.0)));
        assert_eq!(log.borrow().last().map(String::as_str), Some("Beta:click"));
    }

    proptest! {
        #[test]
        fn unknown_names_never_change_current(
            start in prop::sample::select(vec!["alpha", "beta", "gamma"]),
            target in "[a-z]{1,8}",
        ) {
            prop_assume!(!["alpha", "beta", "gamma"].contains(&target.as_str()));
            let (mut manager, log) = manager_with(&["Alpha", "Beta", "Gamma"]);
            manager.switch(start);
            let events = log.borrow().len();
            prop_assert!(!manager.switch(&target));
            prop_assert_eq!(manager.current_scene_name(), start);
            prop_assert_eq!(log.borrow().len(), events);
        }

        #[test]
        fn at_most_one_scene_is_live(switches in proptest::collection::vec(0usize..4, 1..30)) {
            let names = ["Alpha", "Beta", "Gamma", "Missing"];
            let (mut manager, log) = manager_with(&names[..3]);
            for i in switches {
                manager.switch(names[i]);
            }
            let mut live = 0i32;
            for event in log.borrow().iter() {
                if event.ends_with(":init") {
                    live += 1;
                } else if event.ends_with(":cleanup") {
                    live -= 1;
                }
                prop_assert!((0..=1).contains(&live));
            }
        }
    }
}
