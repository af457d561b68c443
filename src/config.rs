use crate::error::{Error, Result};
use crate::render::{ColorMode, RenderMode};
use crate::scenes::EntityCounts;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration loaded from the config file.
/// All fields are optional. CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Scene shown at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Global animation speed multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Color theme: pastel, bright, high-contrast, rainbow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Target FPS (1-120)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    /// Default render mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderModeConfig>,
    /// Default color mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorModeConfig>,
    /// Hide status bar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
    /// Arms drawn by the spiral (1-6)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spiral_count: Option<usize>,
    /// Waves drawn by the wave scene (1-10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_count: Option<usize>,
    /// Bubbles in the floating shapes scene (5-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_count: Option<usize>,
    /// Stars alive at once (5-50)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_count: Option<usize>,
}

impl Config {
    /// Configured entity counts, defaults where unset. Scenes clamp them.
    pub fn entity_counts(&self) -> EntityCounts {
        let defaults = EntityCounts::default();
        EntityCounts {
            spiral_count: self.spiral_count.unwrap_or(defaults.spiral_count),
            wave_count: self.wave_count.unwrap_or(defaults.wave_count),
            shape_count: self.shape_count.unwrap_or(defaults.shape_count),
            star_count: self.star_count.unwrap_or(defaults.star_count),
        }
    }
}

/// Render mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderModeConfig {
    Braille,
    HalfBlock,
}

impl From<RenderModeConfig> for RenderMode {
    fn from(c: RenderModeConfig) -> Self {
        match c {
            RenderModeConfig::Braille => RenderMode::Braille,
            RenderModeConfig::HalfBlock => RenderMode::HalfBlock,
        }
    }
}

/// Color mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeConfig {
    Mono,
    Ansi16,
    Ansi256,
    TrueColor,
}

impl From<ColorModeConfig> for ColorMode {
    fn from(c: ColorModeConfig) -> Self {
        match c {
            ColorModeConfig::Mono => ColorMode::Mono,
            ColorModeConfig::Ansi16 => ColorMode::Ansi16,
            ColorModeConfig::Ansi256 => ColorMode::Ansi256,
            ColorModeConfig::TrueColor => ColorMode::TrueColor,
        }
    }
}

/// Get the config file path: ~/.config/sensory/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sensory").join("config.toml"))
}

/// Parse config file contents.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    toml::from_str(contents).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load config from `path`. A missing file is an empty config.
pub fn load_config_from(path: &Path) -> Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Load config from the default location. Problems are logged and the
/// defaults used instead.
///
/// The returned path is where changed selections may be saved. It is `None`
/// when there is no config directory or the existing file could not be read,
/// so a broken file is never overwritten.
pub fn load_config() -> (Config, Option<PathBuf>) {
    let Some(path) = config_path() else {
        return (Config::default(), None);
    };
    match load_config_from(&path) {
        Ok(config) => (config, Some(path)),
        Err(e) => {
            tracing::warn!("{e}; using defaults");
            (Config::default(), None)
        }
    }
}

/// Write the commented template to `path`, creating parent directories.
/// Never overwrites an existing file.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::ConfigExists(path.to_path_buf()));
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    std::fs::write(path, default_config_string()).map_err(|e| Error::io(path, e))
}

/// Write `config` to `path`, replacing the file. Unset fields are omitted.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let contents = toml::to_string(config).map_err(|source| Error::ConfigSerialize {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r#"# sensory configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Scene shown at startup (use --list to see all)
# scene = "breathing circle"

# Animation speed multiplier (0.1-3.0)
# speed = 1.0

# Color theme: pastel, bright, high-contrast, rainbow
# theme = "pastel"

# Target FPS (1-120)
# fps = 30

# Render mode: braille, half-block
# render = "half-block"

# Color mode: mono, ansi16, ansi256, true-color
# color = "true-color"

# Hide status bar
# clean = false

# Per-scene entity counts
# spiral_count = 1
# wave_count = 3
# shape_count = 30
# star_count = 15
"#
    .to_string()
}
