//! Themeable, speed-adjustable looping visual scenes.
//!
//! A [`SceneManager`] owns a set of [`Scene`]s and drives whichever one is
//! active: the caller feeds it frame deltas with [`SceneManager::update`] and
//! collects draw primitives with [`SceneManager::draw`]. Colors come from
//! [`Theme`] palettes or, for the rainbow theme, from
//! [`theme::rainbow_color`] sampled against the scene clock.

pub mod color;
pub mod config;
pub mod control;
pub mod draw;
pub mod error;
pub mod manager;
pub mod render;
pub mod scenes;
pub mod theme;

pub use color::Rgba;
pub use draw::{DrawCommand, DrawList, Viewport};
pub use error::{Error, Result};
pub use manager::SceneManager;
pub use scenes::{EntityCounts, Scene};
pub use theme::Theme;
