use std::{collections::HashMap, fs, path::Path, time::Duration};

use blockfall_engine::{Button, GameConfig};
use crossterm::event::KeyCode;
use serde_with::serde_as;

use crate::{error::AppError, frame_ticker::FrameTicker};

/// User-adjustable settings, optionally read from a JSON file.
/// Missing fields fall back to their defaults.
#[serde_as]
#[derive(PartialEq, Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fps: u32,
    pub drop_interval_ms: u64,
    #[serde_as(as = "Vec<(_, _)>")]
    pub keybinds: HashMap<KeyCode, Button>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: 60,
            drop_interval_ms: 1000,
            keybinds: Self::default_keybinds(),
        }
    }
}

impl Settings {
    pub fn default_keybinds() -> HashMap<KeyCode, Button> {
        HashMap::from([
            (KeyCode::Left, Button::MoveLeft),
            (KeyCode::Right, Button::MoveRight),
            (KeyCode::Up, Button::Rotate),
            (KeyCode::Down, Button::DropSoft),
        ])
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let save_str = fs::read_to_string(path).map_err(|source| AppError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&save_str).map_err(|source| AppError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Command line values win over whatever the file said.
    /// The frame rate ends up within what the frame ticker supports.
    pub fn apply_overrides(&mut self, fps: Option<u32>, drop_interval_ms: Option<u64>) {
        if let Some(fps) = fps {
            self.fps = fps;
        }
        if let Some(ms) = drop_interval_ms {
            self.drop_interval_ms = ms;
        }
        let fps = self.fps.clamp(FrameTicker::MIN_FPS, FrameTicker::MAX_FPS);
        if fps != self.fps {
            log::warn!("frame rate {} out of range, using {fps}", self.fps);
            self.fps = fps;
        }
    }

    pub fn game_config(&self, seed: Option<u64>) -> GameConfig {
        GameConfig {
            drop_interval: Duration::from_millis(self.drop_interval_ms),
            seed,
            ..GameConfig::default()
        }
    }
}

pub fn format_key(key: KeyCode) -> String {
    format!(
        "[{}]",
        match key {
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            k => format!("{:?}", k),
        }
    )
}

pub fn format_keybinds(button: Button, keybinds: &HashMap<KeyCode, Button>) -> String {
    let mut keys = keybinds
        .iter()
        .filter_map(|(&k, &b)| (b == button).then_some(format_key(k)))
        .collect::<Vec<String>>();
    keys.sort();
    keys.join(" ")
}
