//! Turns raw user input into `Term: Definition` text.
//!
//! Input that already looks like a list is used as-is. Anything else is
//! treated as a topic and expanded by a [`TextGenerator`].

use crate::generator::{GenerateError, TextGenerator};

/// How a piece of (trimmed) input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Already a list of pairs; parsed directly.
    FormattedList,
    /// A topic name to send to the generator.
    Topic,
}

impl InputKind {
    /// A line break plus a colon means "already formatted".
    ///
    /// This is a heuristic, not a format check: a multi-line topic that
    /// happens to contain a colon is still classified as a list.
    pub fn classify(trimmed: &str) -> Self {
        if trimmed.contains('\n') && trimmed.contains(':') {
            Self::FormattedList
        } else {
            Self::Topic
        }
    }

    /// Status text shown while this kind of input is being resolved.
    pub fn progress_message(&self) -> &'static str {
        match self {
            Self::FormattedList => "Parsing flashcards...",
            Self::Topic => "Generating flashcards...",
        }
    }
}

/// Request sent to the generator for a topic.
pub fn build_prompt(topic: &str) -> String {
    format!(
        "Generate a list of flashcards for the topic of \"{topic}\". Each flashcard should have a term and a concise definition. Format the output as a list of \"Term: Definition\" pairs, with each pair on a new line. Ensure terms and definitions are distinct and clearly separated by a single colon. Here's an example output:\nHello: Hola\nGoodbye: Adiós"
    )
}

/// Produce line-oriented text for `input`.
///
/// A generator that answers with no text resolves to an empty string.
pub async fn resolve<G>(input: &str, kind: InputKind, generator: &G) -> Result<String, GenerateError>
where
    G: TextGenerator + ?Sized,
{
    match kind {
        InputKind::FormattedList => Ok(input.to_string()),
        InputKind::Topic => {
            let text = generator.generate(&build_prompt(input)).await?;
            Ok(text.unwrap_or_default())
        }
    }
}
