/// Widget configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const DEFAULT_SNIPPET: &str = "function greet(name) {\n  return `Hello, ${name}!`;\n}\n\nconsole.log(greet(\"world\"));\n";

/// How the widget picks between its dark and light styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Follow the OS preference.
    #[default]
    System,
    Dark,
    Light,
}

impl ThemeMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Parses a mode name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        [Self::System, Self::Dark, Self::Light]
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Widget configuration, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// "System", "Dark" or "Light".
    pub theme: String,
    /// Language tag used when no session record exists.
    pub default_language: String,
    pub word_wrap: bool,
    pub show_line_numbers: bool,
    /// Spaces inserted by the Tab key (1..=8).
    pub indent_width: usize,
    /// Insert a tab character instead of spaces.
    pub use_tabs: bool,
    /// Content shown when no session record exists.
    pub default_snippet: String,
    /// How long transient notices stay visible, in seconds (1..=30).
    pub notification_secs: u64,
    /// Session database path. Empty = next to the config file.
    pub session_path: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System.name().to_string(),
            default_language: "javascript".to_string(),
            word_wrap: false,
            show_line_numbers: true,
            indent_width: 2,
            use_tabs: false,
            default_snippet: DEFAULT_SNIPPET.to_string(),
            notification_secs: 2,
            session_path: String::new(),
        }
    }
}

impl WidgetConfig {
    /// Returns the config file path: the platform config directory, or next
    /// to the executable when there is none.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("codepad").join("codepad.json"))
            .or_else(|| {
                std::env::current_exe()
                    .ok()
                    .and_then(|p| p.parent().map(|d| d.join("codepad.json")))
            })
            .unwrap_or_else(|| PathBuf::from("codepad.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<WidgetConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Keep the broken file for the user to fix
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.indent_width = self.indent_width.clamp(1, 8);
        self.notification_secs = self.notification_secs.clamp(1, 30);
        match ThemeMode::parse(&self.theme) {
            Some(mode) => self.theme = mode.name().to_string(),
            None => self.theme = ThemeMode::System.name().to_string(),
        }
    }

    pub fn theme_mode(&self) -> ThemeMode {
        ThemeMode::parse(&self.theme).unwrap_or_default()
    }

    /// Returns the session database path, resolved against `config_path`'s
    /// directory when not set explicitly.
    pub fn resolve_session_path(&self, config_path: &Path) -> PathBuf {
        if !self.session_path.is_empty() {
            return PathBuf::from(&self.session_path);
        }
        config_path
            .parent()
            .map(|d| d.join("codepad-session.redb"))
            .unwrap_or_else(|| PathBuf::from("codepad-session.redb"))
    }
}
