use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::content::ContentMode;
use crate::nav::{NavModel, NavPolicy};
use crate::theme::Theme;

const APP_DIR: &str = "Linkshelf";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub accessibility: AccessibilityConfig,
    #[serde(default)]
    pub appearance: AppearanceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_source() -> String {
    "resources.json".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path (relative to the config directory) or `http(s)` URL.
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavModelConfig {
    #[default]
    Toggle,
    SingleSelection,
}

impl From<NavModelConfig> for NavModel {
    fn from(value: NavModelConfig) -> Self {
        match value {
            NavModelConfig::Toggle => NavModel::Toggle,
            NavModelConfig::SingleSelection => NavModel::SingleSelection,
        }
    }
}

fn default_collapsible_depth() -> usize {
    2
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    pub model: NavModelConfig,
    #[serde(default = "default_collapsible_depth")]
    pub collapsible_depth: usize,
    #[serde(default = "default_true")]
    pub show_links: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            model: NavModelConfig::Toggle,
            collapsible_depth: default_collapsible_depth(),
            show_links: true,
        }
    }
}

impl From<&NavigationConfig> for NavPolicy {
    fn from(value: &NavigationConfig) -> Self {
        NavPolicy {
            model: value.model.into(),
            collapsible_depth: value.collapsible_depth,
            show_links: value.show_links,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentModeConfig {
    #[default]
    Document,
    SingleNode,
}

impl From<ContentModeConfig> for ContentMode {
    fn from(value: ContentModeConfig) -> Self {
        match value {
            ContentModeConfig::Document => ContentMode::Document,
            ContentModeConfig::SingleNode => ContentMode::SingleNode,
        }
    }
}

fn default_indent_px() -> u32 {
    24
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub mode: ContentModeConfig,
    #[serde(default = "default_indent_px")]
    pub indent_px: u32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            mode: ContentModeConfig::Document,
            indent_px: default_indent_px(),
        }
    }
}

fn default_max_results() -> usize {
    50
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Prune the navigation and content panes to matches while typing.
    #[serde(default)]
    pub filter_tree: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            filter_tree: false,
            max_results: default_max_results(),
        }
    }
}

fn default_retention_days() -> u32 {
    30
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: default_retention_days(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemeConfig {
    #[default]
    Light,
    Dark,
}

impl From<ThemeConfig> for Theme {
    fn from(value: ThemeConfig) -> Self {
        match value {
            ThemeConfig::Light => Theme::Light,
            ThemeConfig::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RendererConfig {
    #[default]
    Auto,
    Wgpu,
    Glow,
}

fn default_font_size() -> u32 {
    15
}

fn default_window_width() -> u32 {
    1100
}

fn default_window_height() -> u32 {
    720
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceConfig {
    /// Used until a theme has been stored in the preferences.
    #[serde(default)]
    pub default_theme: ThemeConfig,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default)]
    pub renderer: RendererConfig,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            default_theme: ThemeConfig::Light,
            font_size: default_font_size(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            renderer: RendererConfig::Auto,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Loads the user config, writing defaults on first run.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(config) => config.normalized(),
                Err(err) => {
                    warn!(path = %path.display(), %err, "invalid config; using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                let config = Self::default();
                config.save_to(path);
                config
            }
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        match toml::to_string_pretty(self) {
            Ok(content) => {
                if let Err(err) = fs::write(path, content) {
                    warn!(path = %path.display(), %err, "could not write config");
                }
            }
            Err(err) => warn!(%err, "could not serialize config"),
        }
    }

    pub fn normalized(mut self) -> Self {
        self.appearance.font_size = self.appearance.font_size.clamp(8, 48);
        self.appearance.window_width = self.appearance.window_width.max(320);
        self.appearance.window_height = self.appearance.window_height.max(240);
        self.accessibility.retention_days = self.accessibility.retention_days.max(1);
        self.accessibility.timeout_secs = self.accessibility.timeout_secs.max(1);
        // Single-node content follows the active folder, which only the
        // single-selection model has.
        if self.navigation.model == NavModelConfig::Toggle
            && self.content.mode == ContentModeConfig::SingleNode
        {
            warn!("content.mode = \"single_node\" needs navigation.model = \"single_selection\"; using document mode");
            self.content.mode = ContentModeConfig::Document;
        }
        self
    }
}
