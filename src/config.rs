//! User configuration — keybindings, widget defaults, and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/parallax-tui/config.toml` (default
//! `~/.config/parallax-tui/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::engine::BoundPolicy;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    JumpTop,
    JumpBottom,
    SpeedUp,
    SpeedDown,
    ToggleBound,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used when serialising).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::JumpTop,
        Action::JumpBottom,
        Action::SpeedUp,
        Action::SpeedDown,
        Action::ToggleBound,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::JumpTop => "jump_top",
            Action::JumpBottom => "jump_bottom",
            Action::SpeedUp => "speed_up",
            Action::SpeedDown => "speed_down",
            Action::ToggleBound => "toggle_bound",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        match s {
            "scroll_up" => Some(Action::ScrollUp),
            "scroll_down" => Some(Action::ScrollDown),
            "page_up" => Some(Action::PageUp),
            "page_down" => Some(Action::PageDown),
            "jump_top" => Some(Action::JumpTop),
            "jump_bottom" => Some(Action::JumpBottom),
            "speed_up" => Some(Action::SpeedUp),
            "speed_down" => Some(Action::SpeedDown),
            "toggle_bound" => Some(Action::ToggleBound),
            "quit" => Some(Action::Quit),
            _ => None,
        }
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared (platform-specific modifiers like SUPER are ignored).
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"PgDn"`, `"Ctrl+c"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            other => format!("{other:?}"),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"PageDown"`, `"Ctrl+c"`, `"q"`).
    fn to_config_string(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            other => format!("{other:?}"),
        });
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"PageDown"`, `"q"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.len() == 1 => KeyCode::Char(s.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration — keybindings and widget defaults.
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Pixels moved per scroll key press / wheel notch.
    pub scroll_step: f64,
    /// Speed multiplier used when the command line doesn't set one.
    pub default_speed: f64,
    /// Boundary behavior used when the command line doesn't set one.
    pub bound_policy: BoundPolicy,
}

impl AppConfig {
    /// Hard-coded default keybindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(
            ScrollUp,
            vec![KeyBind::new(KeyCode::Up, n), KeyBind::new(KeyCode::Char('k'), n)],
        );
        m.insert(
            ScrollDown,
            vec![KeyBind::new(KeyCode::Down, n), KeyBind::new(KeyCode::Char('j'), n)],
        );
        m.insert(PageUp, vec![KeyBind::new(KeyCode::PageUp, n)]);
        m.insert(
            PageDown,
            vec![KeyBind::new(KeyCode::PageDown, n), KeyBind::new(KeyCode::Char(' '), n)],
        );
        m.insert(
            JumpTop,
            vec![KeyBind::new(KeyCode::Home, n), KeyBind::new(KeyCode::Char('g'), n)],
        );
        m.insert(
            JumpBottom,
            vec![
                KeyBind::new(KeyCode::End, n),
                KeyBind::new(KeyCode::Char('G'), KeyModifiers::SHIFT),
            ],
        );
        m.insert(
            SpeedUp,
            vec![KeyBind::new(KeyCode::Char('+'), n), KeyBind::new(KeyCode::Char('='), n)],
        );
        m.insert(SpeedDown, vec![KeyBind::new(KeyCode::Char('-'), n)]);
        m.insert(ToggleBound, vec![KeyBind::new(KeyCode::Char('b'), n)]);
        m.insert(Quit, vec![KeyBind::new(KeyCode::Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}/{}: speed | {}: bound | {}: quit",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::SpeedUp),
            self.short_binding(Action::SpeedDown),
            self.short_binding(Action::ToggleBound),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                return Self::parse_config(&contents);
            }
        }
        Self::parse_config("")
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut bindings = Self::default_bindings();
        let mut scroll_step = 4.0;
        let mut default_speed = 0.5;
        let mut bound_policy = BoundPolicy::Freeze;

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            // Widget settings.
            match key {
                "scroll_step" => {
                    if let Ok(v) = value.parse::<f64>() {
                        // Keep this bounded so one notch never skips a screen.
                        scroll_step = v.clamp(1.0, 32.0);
                    }
                    continue;
                }
                "speed" => {
                    if let Ok(v) = value.parse::<f64>() {
                        default_speed = v;
                    }
                    continue;
                }
                "bound_policy" => {
                    bound_policy = match value {
                        "clamp" => BoundPolicy::Clamp,
                        _ => BoundPolicy::Freeze,
                    };
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };

            let mut parsed = Vec::new();
            for part in value.split(',') {
                let part = part.trim().trim_matches('"');
                if let Some(bind) = KeyBind::parse(part) {
                    parsed.push(bind);
                }
            }
            if !parsed.is_empty() {
                bindings.insert(action, parsed);
            }
        }

        Self {
            bindings,
            scroll_step,
            default_speed,
            bound_policy,
        }
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# parallax-tui configuration".to_string(),
            String::new(),
            "# Widget defaults".to_string(),
            format!("scroll_step = {}", self.scroll_step),
            format!("speed = {}", self.default_speed),
            format!("bound_policy = {}", self.bound_policy.label()),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Home, End, PageUp, PageDown, Space".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/parallax-tui/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("parallax-tui").join("config.toml")
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::parse_config("");
        assert_eq!(config.scroll_step, 4.0);
        assert_eq!(config.default_speed, 0.5);
        assert_eq!(config.bound_policy, BoundPolicy::Freeze);
        assert!(config.bindings.contains_key(&Action::Quit));
    }

    #[test]
    fn widget_settings_parse_and_clamp() {
        let config = AppConfig::parse_config(
            "scroll_step = 500\nspeed = 0.25\nbound_policy = clamp\n",
        );
        assert_eq!(config.scroll_step, 32.0, "scroll_step is bounded");
        assert_eq!(config.default_speed, 0.25);
        assert_eq!(config.bound_policy, BoundPolicy::Clamp);
    }

    #[test]
    fn binding_lines_override_defaults() {
        let config = AppConfig::parse_config("scroll_down = s, PageDown\n");
        let binds = &config.bindings[&Action::ScrollDown];
        assert_eq!(binds.len(), 2);
        assert_eq!(binds[0].code, KeyCode::Char('s'));
        assert_eq!(binds[1].code, KeyCode::PageDown);
    }

    #[test]
    fn serialise_parse_roundtrip_preserves_settings() {
        let mut config = AppConfig::parse_config("");
        config.scroll_step = 8.0;
        config.default_speed = 0.75;
        config.bound_policy = BoundPolicy::Clamp;
        config
            .bindings
            .insert(Action::Quit, vec![KeyBind::new(KeyCode::Char('x'), KeyModifiers::NONE)]);

        let reparsed = AppConfig::parse_config(&config.serialise());
        assert_eq!(reparsed.scroll_step, 8.0);
        assert_eq!(reparsed.default_speed, 0.75);
        assert_eq!(reparsed.bound_policy, BoundPolicy::Clamp);
        assert_eq!(reparsed.bindings[&Action::Quit], config.bindings[&Action::Quit]);
    }

    #[test]
    fn match_key_compares_modifiers() {
        let mut config = AppConfig::parse_config("");
        config.bindings.insert(
            Action::JumpBottom,
            vec![KeyBind::new(KeyCode::Char('G'), KeyModifiers::SHIFT)],
        );
        config.bindings.insert(
            Action::ScrollDown,
            vec![KeyBind::new(KeyCode::Char('G'), KeyModifiers::NONE)],
        );
        let shifted = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(config.match_key(shifted), Some(Action::JumpBottom));
        let plain = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::NONE);
        assert_eq!(config.match_key(plain), Some(Action::ScrollDown));
    }
}
