//! Line-oriented parser for `Term: Definition` text.
//!
//! Every line is handled on its own. Only the first colon separates the
//! term from the definition; later colons belong to the definition.
//! Lines that do not yield a complete pair are skipped without error.

use crate::models::Flashcard;

/// Parse a block of text into cards, preserving line order.
pub fn parse(text: &str) -> Vec<Flashcard> {
    text.lines().filter_map(parse_line).collect()
}

/// Parse a single line. Returns `None` for lines that are not a pair.
pub fn parse_line(line: &str) -> Option<Flashcard> {
    let (term, definition) = line.split_once(':')?;
    Flashcard::new(term, definition)
}
