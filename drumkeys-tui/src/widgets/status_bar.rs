//! Status bar widget - mode indicator, messages and master level

use crate::app::MessageType;
use crate::theme::Theme;
use drumkeys_input::Mode;
use drumkeys_kit::Board;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Cells in the peak meter
const METER_WIDTH: usize = 8;

/// Widget for displaying the status bar
pub struct StatusBarWidget<'a> {
    mode: Mode,
    message: Option<&'a str>,
    message_type: MessageType,
    theme: &'a Theme,
    master_volume: f32,
    peak_level: f32,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, theme: &'a Theme) -> Self {
        Self {
            mode,
            message: None,
            message_type: MessageType::Info,
            theme,
            master_volume: 1.0,
            peak_level: 0.0,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: MessageType) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    pub fn levels(mut self, master_volume: f32, peak_level: f32) -> Self {
        self.master_volume = master_volume;
        self.peak_level = peak_level;
        self
    }

    fn mode_string(&self) -> (&'static str, Style) {
        match self.mode {
            Mode::Play => (self.mode.display_name(), self.theme.highlight()),
            Mode::Help => (self.mode.display_name(), Style::from(self.theme.accent)),
        }
    }

    fn meter(&self) -> Line<'static> {
        let level = self.peak_level.clamp(0.0, 1.0);
        let lit = (level * METER_WIDTH as f32).round() as usize;
        Line::from(vec![
            Span::styled(
                format!("VOL {:>3}% ", (self.master_volume * 100.0).round() as i32),
                self.theme.normal(),
            ),
            Span::styled("▮".repeat(lit), self.theme.meter_style(level)),
            Span::styled("▯".repeat(METER_WIDTH - lit), self.theme.dim()),
        ])
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(8),  // Mode indicator
            Constraint::Min(20),    // Message area
            Constraint::Length(18), // Volume and meter
            Constraint::Length(22), // Help hint
        ])
        .split(area);

        // Mode indicator
        let (mode_text, mode_style) = self.mode_string();
        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(mode_text, mode_style),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        // Message area
        let content = if let Some(msg) = self.message {
            // Color message based on type
            let msg_style = match self.message_type {
                MessageType::Info => self.theme.dim(),
                MessageType::Success => Style::from(self.theme.accent),
                MessageType::Warning => Style::default().fg(self.theme.warning),
                MessageType::Error => Style::default().fg(self.theme.danger),
            };
            Line::from(Span::styled(msg, msg_style))
        } else {
            Line::from(Span::styled("Ready. Hit a key to play", self.theme.dim()))
        };
        Paragraph::new(content).render(chunks[1], buf);

        Paragraph::new(self.meter()).render(chunks[2], buf);

        // Help hint
        let help = match self.mode {
            Mode::Play => "F1:help  Esc:quit",
            Mode::Help => "Esc/F1:close help",
        };
        let help_line = Line::from(Span::styled(help, self.theme.dim()));
        Paragraph::new(help_line).render(chunks[3], buf);
    }
}

/// Width of the help box, borders included
const HELP_WIDTH: usize = 48;

/// Help overlay listing the bound keys and the reserved controls
pub struct HelpWidget<'a> {
    theme: &'a Theme,
    board: &'a Board,
}

impl<'a> HelpWidget<'a> {
    pub fn new(theme: &'a Theme, board: &'a Board) -> Self {
        Self { theme, board }
    }

    fn row(text: &str) -> String {
        let inner = HELP_WIDTH - 4;
        let text: String = text.chars().take(inner).collect();
        format!("║ {:<width$} ║", text, width = inner)
    }

    fn rule(left: char, fill: char, right: char) -> String {
        let mut line = String::with_capacity(HELP_WIDTH * 3);
        line.push(left);
        line.extend(std::iter::repeat(fill).take(HELP_WIDTH - 2));
        line.push(right);
        line
    }

    fn help_lines(&self) -> Vec<String> {
        let mut lines = vec![
            Self::rule('╔', '═', '╗'),
            Self::row("DRUMKEYS - keyboard drum kit"),
            Self::rule('╠', '═', '╣'),
            Self::row("PADS"),
        ];

        for element in self.board.elements() {
            lines.push(Self::row(&format!(
                "  {:<8} {}",
                element.label(),
                element.sound()
            )));
        }
        if self.board.is_empty() {
            lines.push(Self::row("  (no keys bound)"));
        }

        lines.extend([
            Self::rule('╠', '─', '╣'),
            Self::row("CONTROLS"),
            Self::row("  Up / Down     Master volume +/- 5%"),
            Self::row("  F2            Stop all sounds"),
            Self::row("  F1 / Esc      Close this help"),
            Self::row("  Ctrl-C/Ctrl-Q Quit"),
            Self::rule('╚', '═', '╝'),
        ]);
        lines
    }
}

impl Widget for HelpWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear background
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                buf[(x, y)].set_char(' ').set_style(self.theme.normal());
            }
        }

        let help_text = self.help_lines();
        let total_lines = help_text.len() as u16;
        let visible_lines = area.height.min(total_lines);

        let start_x = area.x + area.width.saturating_sub(HELP_WIDTH as u16) / 2;
        let start_y = area.y + area.height.saturating_sub(visible_lines) / 2;

        for (i, line) in help_text.iter().take(visible_lines as usize).enumerate() {
            let y = start_y + i as u16;

            for (j, ch) in line.chars().enumerate() {
                let x = start_x + j as u16;
                if x >= area.x + area.width {
                    break;
                }

                let style = if matches!(
                    ch,
                    '║' | '╔' | '╗' | '╚' | '╝' | '═' | '╠' | '╣' | '─'
                ) {
                    self.theme.border()
                } else {
                    self.theme.normal()
                };

                buf[(x, y)].set_char(ch).set_style(style);
            }
        }
    }
}
