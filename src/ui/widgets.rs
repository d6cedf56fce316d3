//! Custom widgets for the flashcard TUI.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph, Widget, Wrap},
};

use super::theme::{icons, Theme};
use crate::models::{Face, Flashcard};

/// Height of one card slot in the grid, borders included.
pub const CARD_HEIGHT: u16 = 7;
const MIN_CARD_WIDTH: u16 = 28;
const MAX_COLUMNS: u16 = 4;

// ══════════════════════════════════════════════════════════════════════════
// Header Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct Header<'a> {
    model: &'a str,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(model: &'a str, theme: &'a Theme) -> Self {
        Self { model, theme }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::raw(icons::CARD),
            Span::raw(" "),
            Span::styled("flipdeck", self.theme.title()),
            Span::styled(
                format!("  ·  {}", self.model),
                Style::default().fg(self.theme.colors.text_dim),
            ),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Generate Button Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct GenerateButton<'a> {
    enabled: bool,
    theme: &'a Theme,
}

impl<'a> GenerateButton<'a> {
    pub const LABEL: &'static str = " Generate ";

    pub fn new(enabled: bool, theme: &'a Theme) -> Self {
        Self { enabled, theme }
    }

    /// Screen area the button occupies inside `row`, used for hit-testing.
    pub fn area(row: Rect) -> Rect {
        let width = (Self::LABEL.len() as u16 + 4).min(row.width);
        Rect {
            width,
            height: row.height.min(1),
            ..row
        }
    }
}

impl Widget for GenerateButton<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = if self.enabled {
            format!("{}{}", icons::SPARKLE, Self::LABEL)
        } else {
            format!("…{}", Self::LABEL)
        };
        Paragraph::new(label)
            .style(self.theme.button(self.enabled))
            .alignment(Alignment::Center)
            .render(Self::area(area), buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Flashcard Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct FlashcardWidget<'a> {
    index: usize,
    card: &'a Flashcard,
    face: Face,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> FlashcardWidget<'a> {
    pub fn new(index: usize, card: &'a Flashcard, face: Face, focused: bool, theme: &'a Theme) -> Self {
        Self { index, card, face, focused, theme }
    }
}

impl Widget for FlashcardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label_style = match self.face {
            Face::Front => self.theme.card_front(),
            Face::Back => self.theme.card_back(),
        };
        let pressed = self.face == Face::Back;
        let (marker, state) = if pressed {
            (icons::PRESSED, "pressed")
        } else {
            (icons::RELEASED, "not pressed")
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if self.focused { BorderType::Thick } else { BorderType::Rounded })
            .border_style(self.theme.card_border(self.focused))
            .style(Style::default().bg(self.theme.colors.bg_card))
            .title(Line::from(vec![
                Span::styled(
                    format!(" #{} ", self.index + 1),
                    Style::default().fg(self.theme.colors.text_muted),
                ),
                Span::styled(self.face.label(), label_style),
                Span::raw(" "),
            ]))
            .title_bottom(
                Line::from(Span::styled(
                    format!(" {marker} {state} "),
                    Style::default().fg(self.theme.colors.text_dim),
                ))
                .right_aligned(),
            );

        let inner = block.inner(area);
        block.render(area, buf);

        let content = self.card.face_text(self.face);
        let content_width = inner.width.saturating_sub(2);
        if content_width == 0 || inner.height == 0 {
            return;
        }

        // Center vertically on the wrapped height
        let content_height = textwrap::wrap(content, content_width as usize).len() as u16;
        let vertical_padding = inner.height.saturating_sub(content_height) / 2;

        let content_area = Rect {
            x: inner.x + 1,
            y: inner.y + vertical_padding,
            width: content_width,
            height: inner.height.saturating_sub(vertical_padding),
        };

        Paragraph::new(content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(self.theme.colors.text))
            .render(content_area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Card Grid Layout
// ══════════════════════════════════════════════════════════════════════════

/// Number of card columns that fit in `width`.
pub fn grid_columns(width: u16) -> usize {
    (width / MIN_CARD_WIDTH).clamp(1, MAX_COLUMNS) as usize
}

/// Visible `(card index, slot)` pairs, scrolled so `selected` stays in view.
pub fn card_slots(area: Rect, count: usize, selected: usize) -> Vec<(usize, Rect)> {
    let mut slots = Vec::new();
    if count == 0 || area.width == 0 || area.height == 0 {
        return slots;
    }

    let columns = grid_columns(area.width);
    let visible_rows = ((area.height / CARD_HEIGHT) as usize).max(1);
    let first_row = (selected / columns).saturating_sub(visible_rows - 1);
    let card_width = area.width / columns as u16;

    for row in 0..visible_rows {
        let y = area.y + row as u16 * CARD_HEIGHT;
        for col in 0..columns {
            let index = (first_row + row) * columns + col;
            if index >= count {
                return slots;
            }
            slots.push((
                index,
                Rect {
                    x: area.x + col as u16 * card_width,
                    y,
                    width: card_width,
                    height: CARD_HEIGHT.min(area.bottom() - y),
                },
            ));
        }
    }
    slots
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let last = self.hints.len().saturating_sub(1);
        let spans: Vec<Span> = self
            .hints
            .iter()
            .enumerate()
            .flat_map(|(i, (key, desc))| {
                let mut spans = vec![
                    Span::styled(*key, self.theme.key_highlight()),
                    Span::styled(format!(" {}", desc), self.theme.key_hint()),
                ];
                if i < last {
                    spans.push(Span::styled(" │ ", Style::default().fg(self.theme.colors.text_dim)));
                }
                spans
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
