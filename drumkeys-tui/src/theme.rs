//! Themes for drumkeys

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    /// Primary foreground color (text)
    pub fg: Color,
    /// Dimmed foreground (secondary text, resting pad borders)
    pub fg_dim: Color,
    /// Background color
    pub bg: Color,
    /// Highlight color (active pads)
    pub highlight: Color,
    /// Accent color (sound names, meters)
    pub accent: Color,
    /// Warning color
    pub warning: Color,
    /// Error/danger color
    pub danger: Color,
}

impl Theme {
    /// Look up a built-in theme by name
    pub fn by_name(name: &str) -> Option<Theme> {
        match name.to_lowercase().as_str() {
            "classic" | "gold" => Some(CLASSIC),
            "green" | "phosphor" | "phosphor-green" => Some(CRT_GREEN),
            "amber" | "orange" => Some(CRT_AMBER),
            _ => None,
        }
    }

    /// Get style for normal text
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for dimmed text
    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for highlighted items
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for borders
    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Get title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Pad border, blended from resting to highlight by `level` (0.0 - 1.0)
    pub fn pad_border(&self, level: f32) -> Style {
        let style = Style::default().fg(blend(self.fg_dim, self.highlight, level));
        if level > 0.5 {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Glow under a pad, `None` when too faint to draw
    pub fn pad_glow(&self, level: f32) -> Option<Style> {
        (level > 0.05).then(|| Style::default().fg(blend(self.bg, self.highlight, level)))
    }

    /// Get style for meters/bars based on level (0.0 - 1.0)
    pub fn meter_style(&self, level: f32) -> Style {
        let color = if level > 0.9 {
            self.danger
        } else if level > 0.75 {
            self.warning
        } else {
            self.accent
        };
        Style::default().fg(color)
    }
}

/// Linear blend between two colors; non-RGB colors switch at the midpoint
pub fn blend(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    match (from, to) {
        (Color::Rgb(r0, g0, b0), Color::Rgb(r1, g1, b1)) => {
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            Color::Rgb(mix(r0, r1), mix(g0, g1), mix(b0, b1))
        }
        _ if t < 0.5 => from,
        _ => to,
    }
}

/// Gold-on-charcoal, the look of the browser kit
pub const CLASSIC: Theme = Theme {
    name: "classic",
    fg: Color::Rgb(255, 255, 255),        // white captions
    fg_dim: Color::Rgb(120, 120, 120),    // resting border
    bg: Color::Rgb(20, 20, 20),           // charcoal
    highlight: Color::Rgb(255, 198, 0),   // #ffc600 - gold
    accent: Color::Rgb(255, 198, 0),      // sound names
    warning: Color::Rgb(255, 255, 100),   // yellow
    danger: Color::Rgb(255, 100, 100),    // red
};

/// Classic phosphor green CRT theme
pub const CRT_GREEN: Theme = Theme {
    name: "phosphor-green",
    fg: Color::Rgb(51, 255, 51),          // #33ff33 - phosphor green
    fg_dim: Color::Rgb(25, 128, 25),      // dimmed green
    bg: Color::Rgb(0, 10, 0),             // near black with green tint
    highlight: Color::Rgb(180, 255, 180), // bright green
    accent: Color::Rgb(100, 255, 100),    // medium green
    warning: Color::Rgb(255, 255, 100),   // yellow-green
    danger: Color::Rgb(255, 100, 100),    // red warning
};

/// Amber CRT theme (1980s monochrome)
pub const CRT_AMBER: Theme = Theme {
    name: "amber",
    fg: Color::Rgb(255, 176, 0),          // #ffb000 - amber
    fg_dim: Color::Rgb(128, 88, 0),       // dimmed amber
    bg: Color::Rgb(10, 5, 0),             // near black with amber tint
    highlight: Color::Rgb(255, 220, 128), // bright amber
    accent: Color::Rgb(255, 200, 64),     // medium amber
    warning: Color::Rgb(255, 255, 100),   // yellow
    danger: Color::Rgb(255, 100, 100),    // red warning
};

impl Default for Theme {
    fn default() -> Self {
        CLASSIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("Classic").unwrap().name, "classic");
        assert_eq!(Theme::by_name("green").unwrap().name, "phosphor-green");
        assert_eq!(Theme::by_name("amber").unwrap().name, "amber");
        assert!(Theme::by_name("vaporwave").is_none());
    }

    #[test]
    fn test_blend_endpoints() {
        let a = Color::Rgb(0, 100, 200);
        let b = Color::Rgb(200, 100, 0);
        assert_eq!(blend(a, b, 0.0), a);
        assert_eq!(blend(a, b, 1.0), b);
        assert_eq!(blend(a, b, 0.5), Color::Rgb(100, 100, 100));
        assert_eq!(blend(a, b, 7.0), b);
    }

    #[test]
    fn test_blend_named_colors() {
        assert_eq!(blend(Color::Gray, Color::Yellow, 0.2), Color::Gray);
        assert_eq!(blend(Color::Gray, Color::Yellow, 0.8), Color::Yellow);
    }

    #[test]
    fn test_pad_glow_threshold() {
        assert!(CLASSIC.pad_glow(0.0).is_none());
        assert!(CLASSIC.pad_glow(0.5).is_some());
    }
}
