//! Configuration file (`config.conf`) and theme.
//!
//! Plain `key = value` lines with `#` comments. Unknown keys are ignored,
//! bad values fall back to the default. A missing file is created with
//! the defaults so users have something to edit.
//!
use ratatui::style::Color;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::error::{Context, Result};

const APP_DIR: &str = "book-manager";

/// `<config_dir>/book-manager`, or the working directory when unknown.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `<data_dir>/book-manager`, or the working directory when unknown.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Color palette for the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Theme {
    /// Catppuccin Mocha.
    pub fn mocha() -> Self {
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            muted: Color::Rgb(0x7f, 0x84, 0x9c),
            title: Color::Rgb(0xcb, 0xa6, 0xf7),
            border: Color::Rgb(0x58, 0x5b, 0x70),
            header_bg: Color::Rgb(0x31, 0x32, 0x44),
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf),
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a),
            success: Color::Rgb(0xa6, 0xe3, 0xa1),
            warning: Color::Rgb(0xfa, 0xb3, 0x87),
            error: Color::Rgb(0xf3, 0x8b, 0xa8),
        }
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Color> {
        Some(match key {
            "text" => &mut self.text,
            "muted" => &mut self.muted,
            "title" => &mut self.title,
            "border" => &mut self.border,
            "header_bg" => &mut self.header_bg,
            "header_fg" => &mut self.header_fg,
            "status_bg" => &mut self.status_bg,
            "status_fg" => &mut self.status_fg,
            "highlight_fg" => &mut self.highlight_fg,
            "highlight_bg" => &mut self.highlight_bg,
            "success" => &mut self.success,
            "warning" => &mut self.warning,
            "error" => &mut self.error,
            _ => return None,
        })
    }

    fn entries(&self) -> [(&'static str, Color); 13] {
        [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("success", self.success),
            ("warning", self.warning),
            ("error", self.error),
        ]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

/// Parse "#RRGGBB", "RRGGBB" or "reset".
pub fn parse_color(s: &str) -> Option<Color> {
    let lower = s.trim().to_ascii_lowercase();
    if lower == "reset" {
        return Some(Color::Reset);
    }
    let hex = lower.strip_prefix('#').unwrap_or(&lower);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn color_to_str(c: Color) -> String {
    match c {
        Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
        _ => "reset".to_string(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub token_file: PathBuf,
    pub log_file: PathBuf,
    pub timeout: Duration,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        let data = data_dir();
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            token_file: data.join("token"),
            log_file: data.join("book-manager.log"),
            timeout: Duration::from_secs(10),
            theme: Theme::mocha(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub token_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Defaults overridden by the recognised lines of `contents`.
    pub fn parse(contents: &str) -> Self {
        let mut cfg = Self::default();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let (key, val) = (key.trim(), val.trim());
            if key.is_empty() || val.is_empty() {
                continue;
            }
            match key {
                "api_base_url" => cfg.api_base_url = val.trim_end_matches('/').to_string(),
                "token_file" => cfg.token_file = PathBuf::from(val),
                "log_file" => cfg.log_file = PathBuf::from(val),
                "timeout_secs" => match val.parse::<u64>() {
                    Ok(secs) if secs > 0 => cfg.timeout = Duration::from_secs(secs),
                    _ => tracing::warn!(value = val, "ignoring invalid timeout_secs"),
                },
                _ => {
                    let Some(color) = parse_color(val) else {
                        continue;
                    };
                    if let Some(slot) = cfg.theme.slot_mut(key) {
                        *slot = color;
                    }
                }
            }
        }
        cfg
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_ctx(|| format!("read config {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    pub fn to_file_string(&self) -> String {
        let mut buf = String::new();
        buf.push_str("# book-manager configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");
        let _ = writeln!(&mut buf, "api_base_url = {}", self.api_base_url);
        let _ = writeln!(&mut buf, "token_file = {}", self.token_file.display());
        let _ = writeln!(&mut buf, "log_file = {}", self.log_file.display());
        let _ = writeln!(&mut buf, "timeout_secs = {}", self.timeout.as_secs());
        buf.push('\n');
        for (k, v) in self.theme.entries() {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        }
        buf
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_ctx(|| format!("create config directory {}", dir.display()))?;
        }
        std::fs::write(path, self.to_file_string())
            .with_ctx(|| format!("write config {}", path.display()))
    }

    /// Read `path`, or write the defaults there when it does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::from_file(path);
        }
        let cfg = Self::default();
        if let Err(e) = cfg.write_file(path) {
            tracing::debug!(error = %e, "could not write default config");
        }
        Ok(cfg)
    }

    pub fn apply(mut self, o: Overrides) -> Self {
        if let Some(url) = o.api_base_url {
            self.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(p) = o.token_file {
            self.token_file = p;
        }
        if let Some(p) = o.log_file {
            self.log_file = p;
        }
        if let Some(secs) = o.timeout_secs.filter(|s| *s > 0) {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }
}
