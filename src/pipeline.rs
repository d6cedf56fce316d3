//! The resolve → parse pipeline behind the "generate" trigger.
//!
//! All failures stop here and become an [`Outcome`]; nothing propagates
//! further. In-flight requests are serialized with a [`BusyFlag`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::generator::TextGenerator;
use crate::models::Flashcard;
use crate::parser;
use crate::resolver::{self, InputKind};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a topic or some terms and definitions.";
pub const NO_VALID_CARDS_MESSAGE: &str =
    "No valid flashcards could be generated. Please check the format.";
pub const EMPTY_RESPONSE_MESSAGE: &str =
    "Failed to generate flashcards or received an empty response. Please try again.";
const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Blank or whitespace-only input; nothing was attempted.
    EmptyInput,
    /// At least one card was parsed.
    Cards(Vec<Flashcard>),
    /// Text was obtained but no line was a valid pair.
    NoValidCards,
    /// The generator answered for a topic but produced no text.
    EmptyResponse,
    /// The generator failed; carries the error description.
    Failed(String),
    /// A formatted list resolved to no text. Nothing to report.
    Unchanged,
}

impl Outcome {
    /// User-facing status text, `None` when the status line should clear.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::EmptyInput => Some(EMPTY_INPUT_MESSAGE.to_string()),
            Self::Cards(_) | Self::Unchanged => None,
            Self::NoValidCards => Some(NO_VALID_CARDS_MESSAGE.to_string()),
            Self::EmptyResponse => Some(EMPTY_RESPONSE_MESSAGE.to_string()),
            Self::Failed(description) => {
                let description = if description.trim().is_empty() {
                    UNKNOWN_ERROR
                } else {
                    description.as_str()
                };
                Some(format!("An error occurred: {description}"))
            }
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Cards(_) | Self::Unchanged)
    }

    pub fn into_cards(self) -> Vec<Flashcard> {
        match self {
            Self::Cards(cards) => cards,
            _ => Vec::new(),
        }
    }
}

/// Input that passed the emptiness check, ready to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub input: String,
    pub kind: InputKind,
}

/// Trim and classify raw input. Blank input short-circuits.
pub fn prepare(raw: &str) -> Result<Prepared, Outcome> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(Outcome::EmptyInput);
    }

    Ok(Prepared {
        input: input.to_string(),
        kind: InputKind::classify(input),
    })
}

/// Resolve and parse prepared input.
pub async fn execute<G>(prepared: &Prepared, generator: &G) -> Outcome
where
    G: TextGenerator + ?Sized,
{
    let text = match resolver::resolve(&prepared.input, prepared.kind, generator).await {
        Ok(text) => text,
        Err(e) => {
            error!("Error generating content: {}", e);
            return Outcome::Failed(e.to_string());
        }
    };

    if text.is_empty() {
        return match prepared.kind {
            InputKind::Topic => {
                warn!("Generator returned no text");
                Outcome::EmptyResponse
            }
            InputKind::FormattedList => Outcome::Unchanged,
        };
    }

    let cards = parser::parse(&text);
    info!(cards = cards.len(), kind = ?prepared.kind, "Parsed flashcards");
    if cards.is_empty() {
        Outcome::NoValidCards
    } else {
        Outcome::Cards(cards)
    }
}

/// Full pipeline for one raw input.
pub async fn run<G>(raw: &str, generator: &G) -> Outcome
where
    G: TextGenerator + ?Sized,
{
    match prepare(raw) {
        Ok(prepared) => execute(&prepared, generator).await,
        Err(outcome) => outcome,
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Busy State
// ══════════════════════════════════════════════════════════════════════════

/// Shared "request in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark busy. Returns `None` if a request is already in flight.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Clears the busy flag when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
