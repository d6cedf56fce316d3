//! TUI module for flipdeck.

mod app;
mod deck;
pub mod theme;
mod widgets;

pub use app::App;
