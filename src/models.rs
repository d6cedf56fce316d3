//! Data model for generated flashcards.

use serde::Serialize;

/// A single term/definition pair.
///
/// Both fields are trimmed and non-empty. Cards carry no identity beyond
/// their position in the sequence they were parsed into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
}

impl Flashcard {
    /// Build a card from raw text, trimming both sides.
    ///
    /// Returns `None` when either side is empty after trimming.
    pub fn new(term: &str, definition: &str) -> Option<Self> {
        let term = term.trim();
        let definition = definition.trim();
        if term.is_empty() || definition.is_empty() {
            return None;
        }

        Some(Self {
            term: term.to_string(),
            definition: definition.to_string(),
        })
    }

    /// Text shown on the requested face.
    pub fn face_text(&self, face: Face) -> &str {
        match face {
            Face::Front => &self.term,
            Face::Back => &self.definition,
        }
    }
}

/// Which side of a card is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front, // term
    Back,  // definition
}

impl Face {
    pub fn from_flipped(flipped: bool) -> Self {
        if flipped {
            Self::Back
        } else {
            Self::Front
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Front => "TERM",
            Self::Back => "DEFINITION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_both_sides() {
        let card = Flashcard::new("  Hello ", " Hola\t").unwrap();
        assert_eq!(card.term, "Hello");
        assert_eq!(card.definition, "Hola");
    }

    #[test]
    fn new_rejects_blank_sides() {
        assert!(Flashcard::new("   ", "Hola").is_none());
        assert!(Flashcard::new("Hello", "").is_none());
    }

    #[test]
    fn face_text_follows_flip_state() {
        let card = Flashcard::new("Hello", "Hola").unwrap();
        assert_eq!(card.face_text(Face::from_flipped(false)), "Hello");
        assert_eq!(card.face_text(Face::from_flipped(true)), "Hola");
        assert_eq!(Face::Back.label(), "DEFINITION");
    }

    #[test]
    fn serializes_as_term_and_definition() {
        let card = Flashcard::new("Hello", "Hola").unwrap();
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            serde_json::json!({ "term": "Hello", "definition": "Hola" })
        );
    }
}
