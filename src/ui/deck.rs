//! Rendered card set and its per-card flip state.
//!
//! The deck is always replaced wholesale. Flip state lives here, indexed by
//! card position, and is reset whenever a new card set is rendered.

use crossterm::event::KeyCode;

use crate::models::{Face, Flashcard};

/// How a card was activated. Every activation flips the card the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Pointer,
    Key,
}

impl Activation {
    /// Keys that activate the focused card: Enter and Space.
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Self::Key),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct CardDeck {
    cards: Vec<Flashcard>,
    flipped: Vec<bool>,
    selected: usize,
}

impl CardDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole card set. Every card starts front side up.
    pub fn render(&mut self, cards: Vec<Flashcard>) {
        self.flipped = vec![false; cards.len()];
        self.cards = cards;
        self.selected = 0;
    }

    pub fn clear(&mut self) {
        self.render(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Flashcard> {
        self.cards.get(index)
    }

    /// Invert the flip state of one card. Returns the new state.
    pub fn toggle(&mut self, index: usize, activation: Activation) -> Option<bool> {
        let flipped = self.flipped.get_mut(index)?;
        *flipped = !*flipped;
        tracing::debug!(index, flipped = *flipped, ?activation, "Card toggled");
        Some(*flipped)
    }

    /// Exposed pressed state; `false` for out-of-range indices.
    pub fn is_pressed(&self, index: usize) -> bool {
        self.flipped.get(index).copied().unwrap_or(false)
    }

    pub fn face(&self, index: usize) -> Face {
        Face::from_flipped(self.is_pressed(index))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Focus
    // ══════════════════════════════════════════════════════════════════════

    pub fn selected(&self) -> Option<usize> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.cards.len() {
            self.selected = index;
        }
    }

    /// Move focus by `delta` positions, clamped to the deck.
    pub fn move_selection(&mut self, delta: isize) {
        if self.cards.is_empty() {
            return;
        }
        let last = self.cards.len() - 1;
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, last as isize) as usize;
    }

    pub fn toggle_selected(&mut self, activation: Activation) -> Option<bool> {
        let index = self.selected()?;
        self.toggle(index, activation)
    }
}
