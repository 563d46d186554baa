use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Value stored under the `theme` preference key.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Glyph for the toggle button: the theme a click switches to.
    pub fn toggle_glyph(self) -> &'static str {
        match self {
            Theme::Light => "🌙",
            Theme::Dark => "🌞",
        }
    }
}

/// Hex colors (`#RRGGBB`) the shell paints with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub dark_mode: bool,
    pub background: &'static str,
    pub input_background: &'static str,
    pub text: &'static str,
    pub selected_row: &'static str,
    pub hint_text: &'static str,
    pub highlight: &'static str,
    pub accent: &'static str,
}

const PAPER: Palette = Palette {
    dark_mode: false,
    background: "#FFFFFF",
    input_background: "#F2F2F2",
    text: "#141414",
    selected_row: "#DADADA",
    hint_text: "#707070",
    highlight: "#FFE58A",
    accent: "#1F6FEB",
};

const OBSIDIAN: Palette = Palette {
    dark_mode: true,
    background: "#282828",
    input_background: "#383838",
    text: "#E0E0E0",
    selected_row: "#505050",
    hint_text: "#808080",
    highlight: "#7A5C00",
    accent: "#58A6FF",
};

pub fn apply_theme(theme: Theme) -> Palette {
    match theme {
        Theme::Light => PAPER,
        Theme::Dark => OBSIDIAN,
    }
}
