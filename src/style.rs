use eframe::egui::{self, Color32, FontFamily, FontId, TextStyle, Visuals};
use linkshelf_core::theme::Palette;

pub struct Colors {
    pub text: Color32,
    pub hint: Color32,
    pub highlight: Color32,
    pub accent: Color32,
    pub selected_row: Color32,
}

impl Colors {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            text: parse_hex_color(palette.text, Color32::from_rgb(224, 224, 224)),
            hint: parse_hex_color(palette.hint_text, Color32::from_rgb(128, 128, 128)),
            highlight: parse_hex_color(palette.highlight, Color32::from_rgb(255, 229, 138)),
            accent: parse_hex_color(palette.accent, Color32::from_rgb(88, 166, 255)),
            selected_row: parse_hex_color(palette.selected_row, Color32::from_rgb(80, 80, 80)),
        }
    }
}

/// Installs `palette` and the body font size on `ctx`.
pub fn apply_palette(ctx: &egui::Context, palette: &Palette, font_size: u32) {
    let mut style = (*ctx.style()).clone();
    style.visuals = if palette.dark_mode {
        Visuals::dark()
    } else {
        Visuals::light()
    };

    let bg = parse_hex_color(palette.background, Color32::from_rgb(40, 40, 40));
    let input_bg = parse_hex_color(palette.input_background, Color32::from_rgb(56, 56, 56));
    let colors = Colors::from_palette(palette);
    style.visuals.panel_fill = bg;
    style.visuals.window_fill = bg;
    style.visuals.extreme_bg_color = input_bg;
    style.visuals.override_text_color = Some(colors.text);
    style.visuals.hyperlink_color = colors.accent;
    style.visuals.selection.bg_fill = colors.selected_row;
    style.visuals.widgets.noninteractive.fg_stroke.color = colors.text;
    style.visuals.widgets.inactive.fg_stroke.color = colors.text;
    style.visuals.widgets.hovered.fg_stroke.color = colors.text;
    style.visuals.widgets.active.fg_stroke.color = colors.text;

    let size = font_size.clamp(8, 48) as f32;
    style
        .text_styles
        .insert(TextStyle::Body, FontId::new(size, FontFamily::Proportional));
    style
        .text_styles
        .insert(TextStyle::Button, FontId::new(size, FontFamily::Proportional));
    style.text_styles.insert(
        TextStyle::Heading,
        FontId::new(size + 6.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}

/// Font size for a content heading: level 1 is largest, level 6 is body size.
pub fn heading_size(base: u32, level: u8) -> f32 {
    let base = base.clamp(8, 48) as f32;
    base + 2.0 * (6u8.saturating_sub(level)) as f32
}

pub fn parse_hex_color(input: &str, fallback: Color32) -> Color32 {
    let s = input.trim();
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return fallback;
    }

    let Ok(v) = u32::from_str_radix(hex, 16) else {
        return fallback;
    };

    let r = ((v >> 16) & 0xFF) as u8;
    let g = ((v >> 8) & 0xFF) as u8;
    let b = (v & 0xFF) as u8;
    Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(
            parse_hex_color("#282828", Color32::BLACK),
            Color32::from_rgb(40, 40, 40)
        );
        assert_eq!(
            parse_hex_color(" e0e0e0 ", Color32::BLACK),
            Color32::from_rgb(224, 224, 224)
        );
    }

    #[test]
    fn invalid_hex_falls_back() {
        assert_eq!(parse_hex_color("#12345", Color32::RED), Color32::RED);
        assert_eq!(parse_hex_color("#GGGGGG", Color32::RED), Color32::RED);
    }

    #[test]
    fn headings_shrink_with_level() {
        assert!(heading_size(15, 1) > heading_size(15, 2));
        assert_eq!(heading_size(15, 6), 15.0);
    }
}
