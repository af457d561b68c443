//! Line-oriented JSON control channel.
//!
//! Each line is one [`ControlMessage`]; every field is optional:
//!
//! ```text
//! {"scene": "flowing waves", "speed": 1.5, "theme": "rainbow", "click": [120.0, 80.0]}
//! ```

use crate::error::Result;
use crate::manager::SceneManager;
use glam::DVec2;
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct ControlMessage {
    pub scene: Option<String>,
    pub speed: Option<f64>,
    pub theme: Option<String>,
    /// Click in logical canvas coordinates.
    pub click: Option<[f64; 2]>,
}

impl ControlMessage {
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Apply to the manager in a fixed order: scene, theme, speed, click.
    pub fn apply(&self, manager: &mut SceneManager) {
        if let Some(scene) = &self.scene {
            manager.switch(scene);
        }
        if let Some(theme) = &self.theme {
            manager.set_theme(theme);
        }
        if let Some(speed) = self.speed {
            manager.set_speed(speed.max(0.0));
        }
        if let Some([x, y]) = self.click {
            manager.handle_click(DVec2::new(x, y));
        }
    }
}

pub enum ControlSource {
    Stdin,
    File(PathBuf),
}

fn parse_logged(line: &str) -> Option<ControlMessage> {
    match ControlMessage::parse(line) {
        Ok(msg) => Some(msg),
        Err(e) => {
            tracing::warn!("{e}");
            None
        }
    }
}

/// Parse the last non-empty line of `contents`, if any.
fn last_message(contents: &str) -> Option<ControlMessage> {
    let line = contents.lines().rfind(|l| !l.trim().is_empty())?;
    parse_logged(line)
}

/// Follows a control file, handing out each appended line once.
struct FileTail {
    path: PathBuf,
    /// Byte offset just past the last complete line consumed.
    offset: u64,
}

impl FileTail {
    /// Start at the end of the file. Its current last line is returned so a
    /// message written before startup still takes effect.
    fn open(path: PathBuf) -> (Self, Option<ControlMessage>) {
        let (offset, initial) = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                // A trailing partial line is left for the next read
                let complete = contents.rfind('\n').map_or(0, |i| i + 1);
                (complete as u64, last_message(&contents[..complete]))
            }
            Err(_) => (0, None),
        };
        (FileTail { path, offset }, initial)
    }

    /// Complete lines appended since the last read. A file that shrank is
    /// read again from the start.
    fn read_new(&mut self) -> Vec<ControlMessage> {
        use std::io::{Read, Seek, SeekFrom};

        let Ok(mut file) = std::fs::File::open(&self.path) else {
            return Vec::new();
        };
        let len = file.metadata().map(|m| m.len()).unwrap_or(0);
        if len < self.offset {
            self.offset = 0;
        }
        let mut bytes = Vec::new();
        if file.seek(SeekFrom::Start(self.offset)).is_err() || file.read_to_end(&mut bytes).is_err() {
            return Vec::new();
        }
        let Some(end) = bytes.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        self.offset += end as u64 + 1;
        String::from_utf8_lossy(&bytes[..end])
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(parse_logged)
            .collect()
    }
}

/// Read control messages on a background thread.
///
/// Stdin is read line by line. A file contributes its last line at startup,
/// then every line appended to it, each delivered exactly once.
pub fn spawn_reader(source: ControlSource) -> mpsc::Receiver<ControlMessage> {
    let (tx, rx) = mpsc::channel::<ControlMessage>();

    match source {
        ControlSource::Stdin => {
            std::thread::spawn(move || {
                use std::io::BufRead;
                let stdin = std::io::BufReader::new(std::io::stdin());
                for line in stdin.lines() {
                    let Ok(line) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Some(msg) = parse_logged(&line)
                        && tx.send(msg).is_err()
                    {
                        break;
                    }
                }
            });
        }
        ControlSource::File(path) => {
            std::thread::spawn(move || {
                let (mut tail, initial) = FileTail::open(path.clone());
                if let Some(msg) = initial
                    && tx.send(msg).is_err()
                {
                    return;
                }

                let (file_tx, file_rx) = mpsc::channel();
                let mut watcher = match notify::recommended_watcher(move |res| {
                    let _ = file_tx.send(res);
                }) {
                    Ok(w) => w,
                    Err(e) => {
                        tracing::warn!("cannot watch {}: {e}", path.display());
                        return;
                    }
                };
                if let Err(e) =
                    notify::Watcher::watch(&mut watcher, &path, notify::RecursiveMode::NonRecursive)
                {
                    tracing::warn!("cannot watch {}: {e}", path.display());
                    return;
                }
                while let Ok(res) = file_rx.recv() {
                    let event: notify::Event = match res {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("watch error on {}: {e}", path.display());
                            continue;
                        }
                    };
                    // Our own reads raise access events
                    if !matches!(
                        event.kind,
                        notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                    ) {
                        continue;
                    }
                    for msg in tail.read_new() {
                        if tx.send(msg).is_err() {
                            return;
                        }
                    }
                }
            });
        }
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes;

    fn manager() -> SceneManager {
        let mut manager = SceneManager::new();
        for scene in scenes::create_all(Some(9)) {
            manager.register(scene);
        }
        manager
    }

    #[test]
    fn test_parse_partial_message() {
        let msg = ControlMessage::parse(r#"{"theme": "bright"}"#).unwrap();
        assert_eq!(msg.theme.as_deref(), Some("bright"));
        assert!(msg.scene.is_none() && msg.speed.is_none() && msg.click.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ControlMessage::parse("switch to waves").is_err());
    }

    #[test]
    fn test_last_message_skips_trailing_blank_lines() {
        let msg = last_message("{\"speed\": 1.0}\n{\"speed\": 2.0}\n\n").unwrap();
        assert_eq!(msg.speed, Some(2.0));
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sensory-control-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("control.jsonl");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn append(path: &std::path::Path, text: &str) {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn test_tail_delivers_each_appended_line_once() {
        let path = temp_file("tail", "{\"speed\": 1.0}\n");
        let (mut tail, initial) = FileTail::open(path.clone());
        assert_eq!(initial.and_then(|m| m.speed), Some(1.0));
        assert!(tail.read_new().is_empty());

        append(&path, "{\"click\": [50, 50]}\n");
        let msgs = tail.read_new();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].click, Some([50.0, 50.0]));
        // Rereading without new writes yields nothing
        assert!(tail.read_new().is_empty());
        assert!(tail.read_new().is_empty());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_tail_waits_for_complete_lines() {
        let path = temp_file("partial", "");
        let (mut tail, initial) = FileTail::open(path.clone());
        assert!(initial.is_none());

        append(&path, "{\"scene\": \"pend");
        assert!(tail.read_new().is_empty());
        append(&path, "ulum\"}\n{\"theme\": \"bright\"}\n");
        let msgs = tail.read_new();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].scene.as_deref(), Some("pendulum"));
        assert_eq!(msgs[1].theme.as_deref(), Some("bright"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_tail_restarts_after_truncation() {
        let path = temp_file("truncate", "{\"speed\": 1.0}\n{\"speed\": 2.0}\n");
        let (mut tail, _) = FileTail::open(path.clone());
        std::fs::write(&path, "{\"speed\": 3.0}\n").unwrap();
        let msgs = tail.read_new();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].speed, Some(3.0));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_watched_file_delivers_one_message_per_appended_line() {
        use std::time::Duration;

        let path = temp_file("watch", "");
        let rx = spawn_reader(ControlSource::File(path.clone()));
        // Let the watcher register before writing
        std::thread::sleep(Duration::from_millis(300));
        append(&path, "{\"click\": [50, 50]}\n");

        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(msg.click, Some([50.0, 50.0]));
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_apply_switches_and_themes() {
        let mut manager = manager();
        let msg = ControlMessage::parse(r#"{"scene": "Flowing Waves", "theme": "RAINBOW", "speed": -1}"#).unwrap();
        msg.apply(&mut manager);
        assert_eq!(manager.current_scene_name(), "flowing waves");
        assert_eq!(manager.theme(), crate::Theme::Rainbow);
        assert_eq!(manager.speed(), 0.0);
    }

    #[test]
    fn test_apply_click_toggles_first_button() {
        // The first outline drawn belongs to button 0: white when glowing
        fn first_border(manager: &mut SceneManager) -> crate::Rgba {
            let list = manager.draw(&crate::Viewport::sized(800.0, 600.0));
            list.iter()
                .find_map(|c| match *c {
                    crate::DrawCommand::Rect { color, .. } => Some(color),
                    _ => None,
                })
                .unwrap()
        }

        let mut manager = manager();
        manager.switch("button grid");
        let before = first_border(&mut manager);
        let msg = ControlMessage::parse(r#"{"click": [50.0, 50.0]}"#).unwrap();
        msg.apply(&mut manager);
        let after = first_border(&mut manager);
        assert_ne!(before, after);
        assert!(before == crate::Rgba::WHITE || after == crate::Rgba::WHITE);
    }
}
