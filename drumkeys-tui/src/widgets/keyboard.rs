//! Keyboard widget - one pad per bound key

use crate::theme::{blend, Theme};
use drumkeys_audio::{PlaybackState, VoiceState};
use drumkeys_kit::{Board, KeyElement, StyleProperty};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

/// Width of one pad slot, including the cell the frame grows into
const SLOT_WIDTH: u16 = 13;
/// Height of one pad slot, including the grow margin and the glow row
const SLOT_HEIGHT: u16 = 7;
/// Transform value past which a pad draws its enlarged frame
const GROW_THRESHOLD: f32 = 0.5;

/// Renders the board as a grid of pads in binding order
pub struct KeyboardWidget<'a> {
    board: &'a Board,
    theme: &'a Theme,
    voices: &'a [VoiceState],
}

impl<'a> KeyboardWidget<'a> {
    pub fn new(board: &'a Board, theme: &'a Theme) -> Self {
        Self {
            board,
            theme,
            voices: &[],
        }
    }

    /// Voice states, indexed like the pads, to mark clips still sounding
    pub fn voices(mut self, voices: &'a [VoiceState]) -> Self {
        self.voices = voices;
        self
    }

    fn is_sounding(&self, element: &KeyElement) -> bool {
        self.voices
            .get(element.id().0)
            .is_some_and(|v| v.playback == PlaybackState::Playing)
    }

    /// Slot rectangles for `count` pads, centered in `area`
    fn layout(area: Rect, count: usize) -> Vec<Rect> {
        let columns = (area.width / SLOT_WIDTH).max(1) as usize;
        let columns = columns.min(count.max(1));
        let rows = count.div_ceil(columns);

        let grid_width = columns as u16 * SLOT_WIDTH;
        let grid_height = rows as u16 * SLOT_HEIGHT;
        let x0 = area.x + area.width.saturating_sub(grid_width) / 2;
        let y0 = area.y + area.height.saturating_sub(grid_height) / 2;

        (0..count)
            .map(|i| {
                let x = x0 + (i % columns) as u16 * SLOT_WIDTH;
                let y = y0 + (i / columns) as u16 * SLOT_HEIGHT;
                Rect::new(x, y, SLOT_WIDTH, SLOT_HEIGHT).intersection(area)
            })
            .collect()
    }

    fn render_pad(&self, element: &KeyElement, slot: Rect, buf: &mut Buffer) {
        if slot.width < 5 || slot.height < 4 {
            return;
        }

        let transform = element.value(StyleProperty::Transform);
        let border = element.value(StyleProperty::BorderColor);
        let shadow = element.value(StyleProperty::BoxShadow);

        // Bottom row of the slot is reserved for the glow
        let body = Rect::new(slot.x, slot.y, slot.width, slot.height - 1);
        let pad = if transform > GROW_THRESHOLD {
            body
        } else {
            Rect::new(
                body.x + 1,
                body.y + 1,
                body.width.saturating_sub(2),
                body.height.saturating_sub(2),
            )
        };

        let border_type = if transform > GROW_THRESHOLD {
            BorderType::Thick
        } else {
            BorderType::Rounded
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(self.theme.pad_border(border));
        let inner = block.inner(pad);
        block.render(pad, buf);

        let label_style = self
            .theme
            .normal()
            .fg(blend(self.theme.fg, self.theme.highlight, border))
            .add_modifier(Modifier::BOLD);
        let sound_style = if self.is_sounding(element) {
            Style::default().fg(self.theme.accent)
        } else {
            self.theme.dim()
        };
        let lines = vec![
            Line::from(Span::styled(element.label().to_string(), label_style)),
            Line::from(Span::styled(element.sound().to_uppercase(), sound_style)),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);

        if let Some(style) = self.theme.pad_glow(shadow) {
            let y = slot.y + slot.height - 1;
            for x in pad.x + 1..pad.x + pad.width.saturating_sub(1) {
                buf[(x, y)].set_char('▀').set_style(style);
            }
        }
    }
}

impl Widget for KeyboardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let elements = self.board.elements();
        if elements.is_empty() {
            Paragraph::new(Line::from(Span::styled("No keys bound", self.theme.dim())))
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        for (element, slot) in elements.iter().zip(Self::layout(area, elements.len())) {
            self.render_pad(element, slot, buf);
        }
    }
}
