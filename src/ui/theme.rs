//! Color palette for the pixel window

use ratatui::style::Color;

pub struct Theme {
    pub border: Color,
    pub title: Color,
    /// Letterbox area outside the pixel grid
    pub backdrop: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    border: Color::Rgb(108, 112, 134),
    title: Color::Rgb(249, 226, 175),
    backdrop: Color::Rgb(30, 30, 46),
};

/// Named colors understood by the drawing builtins
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("lime", (0, 255, 0)),
    ("blue", (0, 0, 255)),
    ("navy", (0, 0, 128)),
    ("yellow", (255, 255, 0)),
    ("orange", (255, 165, 0)),
    ("purple", (128, 0, 128)),
    ("pink", (255, 192, 203)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("gray", (190, 190, 190)),
    ("grey", (190, 190, 190)),
    ("darkgray", (169, 169, 169)),
    ("darkgrey", (169, 169, 169)),
    ("lightgray", (211, 211, 211)),
    ("lightgrey", (211, 211, 211)),
    ("brown", (165, 42, 42)),
    ("gold", (255, 215, 0)),
    ("silver", (192, 192, 192)),
    ("teal", (0, 128, 128)),
    ("maroon", (176, 48, 96)),
    ("olive", (128, 128, 0)),
    ("darkgreen", (0, 100, 0)),
    ("darkblue", (0, 0, 139)),
    ("lightblue", (173, 216, 230)),
    ("skyblue", (135, 206, 235)),
];

/// Parse a color name (`"red"`, `"dark green"`) or `#rgb` / `#rrggbb`.
pub fn parse_color(text: &str) -> Option<Color> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex);
    }
    let name: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, (r, g, b))| Color::Rgb(*r, *g, *b))
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Color::Rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::Rgb(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_color("Red"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_color("dark green"), Some(Color::Rgb(0, 100, 0)));
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gggggg"), None);
    }
}
