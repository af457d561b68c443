use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind},
    execute, terminal,
};
use sensory::config::{self, Config};
use sensory::control::{self, ControlMessage, ControlSource};
use sensory::render::{Canvas, ColorMode, Projection, RenderMode, rasterize};
use sensory::{Error, Result, SceneManager, Theme, manager, scenes};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "sensory", about = "Calming looping scenes for the terminal")]
struct Cli {
    /// Scene to show (use --list to see all)
    scene: Option<String>,

    /// Color theme: pastel, bright, high-contrast, rainbow
    #[arg(short, long)]
    theme: Option<String>,

    /// Animation speed multiplier (0.1-3.0)
    #[arg(short, long)]
    speed: Option<f64>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Hide the status bar
    #[arg(long)]
    clean: bool,

    /// Seed for the scenes' random generators
    #[arg(long)]
    seed: Option<u64>,

    /// List available scenes and themes and exit
    #[arg(short, long)]
    list: bool,

    /// Read JSON control messages from stdin
    #[arg(long, conflicts_with = "control_file")]
    control_stdin: bool,

    /// Watch a file for JSON control messages
    #[arg(long, value_name = "PATH")]
    control_file: Option<PathBuf>,

    /// Write logs to this file (filter with SENSORY_LOG)
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,

    /// Write a commented default config file and exit
    #[arg(long)]
    init_config: bool,
}

/// Scene shown when neither the command line nor the config names one.
const START_SCENE: &str = "breathing circle";
const SPEED_MIN: f64 = 0.1;
const SPEED_MAX: f64 = 3.0;
const SPEED_STEP: f64 = 0.1;
const DEFAULT_FPS: u32 = 30;
/// Longest frame step fed to the scenes, so a stall does not jump them ahead.
const MAX_DT: f64 = 0.25;

const RENDER_MODES: [RenderMode; 2] = [RenderMode::HalfBlock, RenderMode::Braille];
const COLOR_MODES: [ColorMode; 4] = [
    ColorMode::TrueColor,
    ColorMode::Ansi256,
    ColorMode::Ansi16,
    ColorMode::Mono,
];

/// Player settings after merging CLI flags over the config file.
struct Settings {
    scene: String,
    theme: Theme,
    speed: f64,
    fps: u32,
    render: RenderMode,
    color: ColorMode,
    clean: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: &Config) -> Self {
        Settings {
            scene: cli
                .scene
                .clone()
                .or_else(|| config.scene.clone())
                .unwrap_or_else(|| START_SCENE.to_string()),
            theme: Theme::from_name(cli.theme.as_deref().or(config.theme.as_deref()).unwrap_or("")),
            speed: cli.speed.or(config.speed).unwrap_or(1.0).clamp(SPEED_MIN, SPEED_MAX),
            fps: cli.fps.or(config.fps).unwrap_or(DEFAULT_FPS).clamp(1, 120),
            render: cli
                .render
                .or(config.render.map(Into::into))
                .unwrap_or(RenderMode::HalfBlock),
            color: cli
                .color
                .or(config.color.map(Into::into))
                .unwrap_or(ColorMode::TrueColor),
            clean: cli.clean || config.clean.unwrap_or(false),
        }
    }
}

/// The loaded config file, kept so scene, theme and speed changes made with
/// the keyboard can be written back to it.
struct Selections {
    config: Config,
    path: Option<PathBuf>,
}

impl Selections {
    fn record(&mut self, manager: &SceneManager) {
        self.config.scene = Some(manager.current_scene_name().to_string());
        self.config.theme = Some(manager.theme().name().to_string());
        // Keyboard steps accumulate float error; store one decimal
        self.config.speed = Some((manager.speed() * 10.0).round() / 10.0);
    }

    fn save(&mut self, manager: &SceneManager) {
        self.record(manager);
        let Some(path) = &self.path else { return };
        match config::save_config(path, &self.config) {
            Ok(()) => tracing::debug!(path = %path.display(), "selections saved"),
            Err(e) => tracing::warn!("{e}"),
        }
    }
}

fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let filter = tracing_subscriber::EnvFilter::try_from_env("SENSORY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .try_init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    if cli.show_config {
        let path = config::config_path().ok_or(Error::NoConfigDir)?;
        println!("{}", path.display());
        return Ok(());
    }

    if cli.init_config {
        let path = config::config_path().ok_or(Error::NoConfigDir)?;
        config::write_default_config(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if cli.list {
        println!("Available scenes:");
        for &(name, desc) in scenes::SCENES {
            println!("  {:<18} {}", name, desc);
        }
        let themes: Vec<&str> = Theme::ALL.iter().map(|t| t.name()).collect();
        println!("\nThemes: {}", themes.join(", "));
        println!("Render modes: braille, half-block");
        println!("Color modes: mono, ansi16, ansi256, true-color");
        return Ok(());
    }

    let (config, save_path) = config::load_config();
    let settings = Settings::resolve(&cli, &config);

    let mut manager = SceneManager::new();
    for scene in scenes::create_all(cli.seed) {
        manager.register(scene);
    }
    manager.apply_counts(&config.entity_counts());
    manager.apply_theme(settings.theme);
    manager.set_speed(settings.speed);
    if !manager.switch(&settings.scene) {
        manager.switch(manager::DEFAULT_SCENE);
    }

    let control = if cli.control_stdin {
        Some(control::spawn_reader(ControlSource::Stdin))
    } else {
        cli.control_file
            .clone()
            .map(|path| control::spawn_reader(ControlSource::File(path)))
    };

    tracing::info!(scene = %manager.current_scene_name(), theme = settings.theme.name(), "player started");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        event::EnableMouseCapture
    )?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let mut selections = Selections {
        config,
        path: save_path,
    };
    let result = run_loop(&mut writer, &settings, &mut manager, &mut selections, control.as_ref());

    // Cleanup
    execute!(
        writer,
        event::DisableMouseCapture,
        cursor::Show,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()?;

    tracing::info!("player stopped");
    result
}

fn next_in<T: Copy + PartialEq>(modes: &[T], current: T) -> T {
    let idx = modes.iter().position(|&m| m == current).unwrap_or(0);
    modes[(idx + 1) % modes.len()]
}

fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    settings: &Settings,
    manager: &mut SceneManager,
    selections: &mut Selections,
    control: Option<&mpsc::Receiver<ControlMessage>>,
) -> Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let frame_dur = Duration::from_secs_f64(1.0 / settings.fps as f64);

    let mut render_mode = settings.render;
    let mut color_mode = settings.color;
    let mut hide_status = settings.clean;

    let display_rows = |rows: u16, hide: bool| -> usize {
        if hide {
            rows as usize
        } else {
            // Reserve 1 row for status bar
            (rows as usize).saturating_sub(1)
        }
    };
    let mut canvas = Canvas::new(cols as usize, display_rows(rows, hide_status), render_mode, color_mode);

    let mut last_frame = Instant::now();
    let mut frame_count: u64 = 0;
    let mut actual_fps: f64 = 0.0;
    let mut fps_update = Instant::now();
    let mut rebuild_canvas = false;

    loop {
        // Handle input (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    if w >= 10 && h >= 5 {
                        cols = w;
                        rows = h;
                        rebuild_canvas = true;
                    }
                }
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                }) => {
                    let (cell_w, cell_h) = render_mode.cell_pixels();
                    if (row as usize) * cell_h < canvas.height && (column as usize) * cell_w < canvas.width {
                        let (proj, _) = Projection::fit(canvas.width, canvas.height);
                        let point = proj.cell_to_logical(column, row, (cell_w, cell_h));
                        manager.handle_click(point);
                    }
                }
                Event::Key(KeyEvent { code, .. }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Right | KeyCode::Char('n') => {
                        if manager.cycle(1) {
                            selections.save(manager);
                        }
                    }
                    KeyCode::Left | KeyCode::Char('p') => {
                        if manager.cycle(-1) {
                            selections.save(manager);
                        }
                    }
                    KeyCode::Char('t') => {
                        manager.apply_theme(manager.theme().next());
                        selections.save(manager);
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        let speed = (manager.speed() + SPEED_STEP).clamp(SPEED_MIN, SPEED_MAX);
                        manager.set_speed(speed);
                        selections.save(manager);
                    }
                    KeyCode::Char('-') => {
                        let speed = (manager.speed() - SPEED_STEP).clamp(SPEED_MIN, SPEED_MAX);
                        manager.set_speed(speed);
                        selections.save(manager);
                    }
                    // Cycle render mode
                    KeyCode::Char('r') => {
                        render_mode = next_in(&RENDER_MODES, render_mode);
                        rebuild_canvas = true;
                    }
                    // Cycle color mode
                    KeyCode::Char('c') => {
                        color_mode = next_in(&COLOR_MODES, color_mode);
                        rebuild_canvas = true;
                    }
                    // Toggle status bar
                    KeyCode::Char('h') => {
                        hide_status = !hide_status;
                        rebuild_canvas = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        if let Some(rx) = control {
            while let Ok(msg) = rx.try_recv() {
                msg.apply(manager);
            }
        }

        // Rebuild canvas if mode changed or terminal resized
        if rebuild_canvas && cols >= 10 && rows >= 5 {
            // Re-read size to get the settled value
            let (settled_cols, settled_rows) = terminal::size()?;
            if settled_cols >= 10 && settled_rows >= 5 {
                cols = settled_cols;
                rows = settled_rows;
            }
            canvas = Canvas::new(cols as usize, display_rows(rows, hide_status), render_mode, color_mode);
            tracing::debug!(cols, rows, ?render_mode, ?color_mode, "canvas rebuilt");
            // Reset terminal state completely
            write!(stdout, "\x1b[2J\x1b[H")?;
            stdout.flush()?;
            rebuild_canvas = false;
        }

        // Timing
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64().min(MAX_DT);
        last_frame = now;

        // Update & render
        manager.update(dt);
        canvas.clear(manager.theme().background());
        if canvas.width > 0 && canvas.height > 0 {
            let (proj, viewport) = Projection::fit(canvas.width, canvas.height);
            let list = manager.draw(&viewport);
            rasterize(&mut canvas, &list, &proj);
        }
        let frame = canvas.render();

        // Verify terminal size hasn't changed before writing
        // If it changed, skip this frame to avoid writing wrong-sized data
        let (check_cols, check_rows) = terminal::size()?;
        if check_cols != cols || check_rows != rows {
            cols = check_cols;
            rows = check_rows;
            rebuild_canvas = true;
            // Sleep briefly to let terminal settle
            std::thread::sleep(Duration::from_millis(50));
            continue;
        }

        // Build entire frame into buffer before flushing
        stdout.write_all(b"\x1b[H")?;
        stdout.write_all(frame.as_bytes())?;

        // Status bar
        frame_count += 1;
        if fps_update.elapsed() >= Duration::from_secs(1) {
            actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
            frame_count = 0;
            fps_update = Instant::now();
        }
        if !hide_status {
            let scene = manager
                .current_scene()
                .map(|s| s.name())
                .unwrap_or(manager.current_scene_name());
            let status = format!(
                " {} | {} | x{:.1} | {:?} | {:?} | {:.0} fps | [←/→] scene  [t] theme  [+/-] speed  [r] render  [c] color  [h] hide  [q] quit ",
                scene,
                manager.theme().display_name(),
                manager.speed(),
                render_mode,
                color_mode,
                actual_fps,
            );
            let w = cols as usize;
            let truncated: String = status.chars().take(w).collect();
            let padded = format!("{:<width$}", truncated, width = w);
            write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, padded)?;
        }

        // Single flush per frame
        stdout.flush()?;

        // Sleep to target FPS
        let elapsed = last_frame.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["sensory", "flowing waves", "--speed", "9", "--render", "braille"]);
        let config = config::parse_config(
            "scene = \"pendulum\"\ntheme = \"bright\"\nspeed = 0.5\nfps = 500\n",
            std::path::Path::new("t.toml"),
        )
        .unwrap();
        let settings = Settings::resolve(&cli, &config);
        assert_eq!(settings.scene, "flowing waves");
        assert_eq!(settings.theme, Theme::Bright);
        assert_eq!(settings.speed, SPEED_MAX);
        assert_eq!(settings.fps, 120);
        assert_eq!(settings.render, RenderMode::Braille);
        assert_eq!(settings.color, ColorMode::TrueColor);
    }

    #[test]
    fn test_defaults_without_config() {
        let cli = Cli::parse_from(["sensory"]);
        let settings = Settings::resolve(&cli, &Config::default());
        assert_eq!(settings.scene, START_SCENE);
        assert_eq!(settings.theme, Theme::Pastel);
        assert_eq!(settings.speed, 1.0);
        assert!(!settings.clean);
    }

    #[test]
    fn test_control_sources_conflict() {
        assert!(Cli::try_parse_from(["sensory", "--control-stdin", "--control-file", "x"]).is_err());
    }

    #[test]
    fn test_selections_record_manager_state() {
        let mut manager = SceneManager::new();
        for scene in scenes::create_all(Some(1)) {
            manager.register(scene);
        }
        manager.switch("Glowing Stars");
        manager.apply_theme(Theme::HighContrast);
        manager.set_speed(1.0 + SPEED_STEP + SPEED_STEP);

        let mut selections = Selections {
            config: Config {
                fps: Some(60),
                ..Config::default()
            },
            path: None,
        };
        // No path: nothing is written, state is still recorded
        selections.save(&manager);
        assert_eq!(selections.config.scene.as_deref(), Some("glowing stars"));
        assert_eq!(selections.config.theme.as_deref(), Some("high-contrast"));
        assert_eq!(selections.config.speed, Some(1.2));
        assert_eq!(selections.config.fps, Some(60));
    }

    #[test]
    fn test_next_in_wraps() {
        assert_eq!(next_in(&RENDER_MODES, RenderMode::Braille), RenderMode::HalfBlock);
        assert_eq!(next_in(&COLOR_MODES, ColorMode::Mono), ColorMode::TrueColor);
    }
}
