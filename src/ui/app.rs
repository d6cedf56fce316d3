//! Main application state and logic.

use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::Style,
    widgets::{block::BorderType, Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

use super::deck::{Activation, CardDeck};
use super::theme::Theme;
use super::widgets::{self, FlashcardWidget, GenerateButton, Header, KeyHints, CARD_HEIGHT};
use crate::config::Config;
use crate::generator::TextGenerator;
use crate::pipeline::{self, BusyFlag, BusyGuard, Outcome};

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Cards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Progress,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

/// A finished pipeline run. The busy flag stays set until this is applied.
struct Completion {
    outcome: Outcome,
    _busy: BusyGuard,
}

pub struct App {
    pub running: bool,

    // Config and theme
    /// Settings as stored on disk. CLI overrides never land here.
    pub config: Config,
    pub config_path: PathBuf,
    pub theme: Theme,
    /// Effective model name, shown in the header.
    pub model: String,

    pub focus: Focus,
    pub input: String,
    pub deck: CardDeck,
    pub status: Option<Status>,

    // Generation
    generator: Arc<dyn TextGenerator>,
    busy: BusyFlag,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
    bootstrapped: bool,

    // Hit-testing state from the last frame
    input_area: Rect,
    button_area: Rect,
    card_slots: Vec<(usize, Rect)>,
    grid_columns: usize,
}

impl App {
    pub fn new(
        config: Config,
        model: String,
        generator: Arc<dyn TextGenerator>,
        initial_input: String,
    ) -> Self {
        let theme = Theme::from_name(&config.theme);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            running: true,
            config,
            config_path: Config::default_path(),
            theme,
            model,
            focus: Focus::Input,
            input: initial_input,
            deck: CardDeck::new(),
            status: None,
            generator,
            busy: BusyFlag::new(),
            completions_tx,
            completions_rx,
            bootstrapped: false,
            input_area: Rect::default(),
            button_area: Rect::default(),
            card_slots: Vec::new(),
            grid_columns: 1,
        }
    }

    /// Run the pipeline once if the input arrived pre-filled.
    pub fn bootstrap(&mut self) {
        if self.bootstrapped {
            return;
        }
        self.bootstrapped = true;

        if !self.input.trim().is_empty() {
            info!("Input pre-filled, generating on startup");
            self.generate();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Start the resolve → parse pipeline for the current input.
    ///
    /// Ignored while a request is already in flight.
    pub fn generate(&mut self) {
        if self.busy.is_busy() {
            debug!("Generate ignored, request in flight");
            return;
        }

        let prepared = match pipeline::prepare(&self.input) {
            Ok(prepared) => prepared,
            Err(outcome) => {
                self.apply_outcome(outcome);
                return;
            }
        };

        let Some(busy) = self.busy.try_acquire() else {
            return;
        };

        self.deck.clear();
        self.card_slots.clear();
        self.set_status(prepared.kind.progress_message(), StatusKind::Progress);
        info!(kind = ?prepared.kind, "Starting generation");

        let generator = Arc::clone(&self.generator);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = pipeline::execute(&prepared, generator.as_ref()).await;
            // The receiver lives as long as the app; a failed send means we are shutting down.
            let _ = completions.send(Completion {
                outcome,
                _busy: busy,
            });
        });
    }

    /// Apply any finished pipeline runs. Releases the busy flag.
    pub fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply_outcome(completion.outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome.message() {
            Some(text) => self.set_status(&text, StatusKind::Error),
            None => self.status = None,
        }

        self.deck.render(outcome.into_cards());
        self.card_slots.clear();
        if !self.deck.is_empty() {
            self.focus = Focus::Cards;
        }
    }

    fn set_status(&mut self, text: &str, kind: StatusKind) {
        self.status = Some(Status {
            text: text.to_string(),
            kind,
        });
    }

    pub fn cycle_theme(&mut self) {
        let new_theme_name = self.theme.name.next();
        self.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        if let Err(e) = self.config.save_to(&self.config_path) {
            warn!("Failed to save config: {:#}", e);
        }
    }

    /// Flip a card and move focus to it.
    fn activate_card(&mut self, index: usize, activation: Activation) {
        self.deck.select(index);
        self.deck.toggle(index, activation);
        self.focus = Focus::Cards;
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                Event::Paste(text) => self.handle_paste(&text),
                _ => {}
            }
        }
        self.drain_completions();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.running = false;
                    return;
                }
                KeyCode::Char('g') => {
                    self.generate();
                    return;
                }
                _ => {}
            }
        }

        match self.focus {
            Focus::Input => self.handle_input_keys(key),
            Focus::Cards => self.handle_card_keys(key.code),
        }
    }

    fn handle_input_keys(&mut self, key: KeyEvent) {
        // Only plain or shifted characters are text; other chords are ignored.
        let typing = key.modifiers.difference(KeyModifiers::SHIFT).is_empty();
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Cards,
            KeyCode::Enter => self.input.push('\n'),
            KeyCode::Char(c) if typing => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            _ => {}
        }
    }

    fn handle_card_keys(&mut self, key: KeyCode) {
        // Activation keys are consumed here and never reach the input.
        if let Some(activation) = Activation::from_key(key) {
            self.deck.toggle_selected(activation);
            return;
        }

        let columns = self.grid_columns as isize;
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab | KeyCode::Char('i') => self.focus = Focus::Input,
            KeyCode::Char('g') => self.generate(),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Left | KeyCode::Char('h') => self.deck.move_selection(-1),
            KeyCode::Right | KeyCode::Char('l') => self.deck.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.deck.move_selection(-columns),
            KeyCode::Down | KeyCode::Char('j') => self.deck.move_selection(columns),
            KeyCode::Home => self.deck.select(0),
            KeyCode::End => self.deck.select(self.deck.len().saturating_sub(1)),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let position = Position::new(mouse.column, mouse.row);

        if self.button_area.contains(position) {
            self.generate();
            return;
        }

        if self.input_area.contains(position) {
            self.focus = Focus::Input;
            return;
        }

        let hit = self
            .card_slots
            .iter()
            .find(|(_, slot)| slot.contains(position))
            .map(|(index, _)| *index);
        if let Some(index) = hit {
            self.activate_card(index, Activation::Pointer);
        }
    }

    fn handle_paste(&mut self, text: &str) {
        self.input.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
        self.focus = Focus::Input;
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rendering
    // ══════════════════════════════════════════════════════════════════════

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Clear with background
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.colors.bg_dark)),
            area,
        );

        let chunks = Layout::vertical([
            Constraint::Length(1),           // Header
            Constraint::Length(1),           // Spacing
            Constraint::Length(8),           // Input
            Constraint::Length(1),           // Button + status
            Constraint::Length(1),           // Spacing
            Constraint::Min(CARD_HEIGHT),    // Cards
            Constraint::Length(1),           // Hints
        ])
        .split(area);

        frame.render_widget(Header::new(&self.model, &self.theme), chunks[0]);
        self.render_input(frame, chunks[2]);
        self.render_controls(frame, chunks[3]);
        self.render_cards(frame, chunks[5]);
        self.render_hints(frame, chunks[6]);
    }

    fn render_input(&mut self, frame: &mut Frame, area: Rect) {
        self.input_area = area;
        let focused = self.focus == Focus::Input;
        let border_style = self.theme.input_border(focused);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(" Topic or Term: Definition list ")
            .title_style(border_style);
        let inner = block.inner(area);

        if self.input.is_empty() {
            let placeholder = Paragraph::new("e.g. Colors in Spanish, or paste lines like  Hello: Hola")
                .style(Style::default().fg(self.theme.colors.text_dim))
                .block(block);
            frame.render_widget(placeholder, area);
            if focused {
                frame.set_cursor_position(Position::new(inner.x, inner.y));
            }
            return;
        }

        // Keep the last line in view
        let line_count = self.input.split('\n').count();
        let scroll = line_count.saturating_sub(inner.height as usize);

        let paragraph = Paragraph::new(self.input.as_str())
            .style(Style::default().fg(self.theme.colors.text))
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
            .block(block);
        frame.render_widget(paragraph, area);

        if focused && inner.width > 0 && inner.height > 0 {
            let last_line = self.input.rsplit('\n').next().unwrap_or("");
            let col = (last_line.width() as u16).min(inner.width - 1);
            let row = line_count
                .saturating_sub(scroll + 1)
                .min(inner.height as usize - 1) as u16;
            frame.set_cursor_position(Position::new(inner.x + col, inner.y + row));
        }
    }

    fn render_controls(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::horizontal([
            Constraint::Length(16), // Button
            Constraint::Min(1),     // Status
        ])
        .split(area);

        self.button_area = GenerateButton::area(chunks[0]);
        frame.render_widget(GenerateButton::new(!self.is_busy(), &self.theme), chunks[0]);

        if let Some(ref status) = self.status {
            let style = match status.kind {
                StatusKind::Progress => self.theme.status_progress(),
                StatusKind::Error => self.theme.status_error(),
            };
            frame.render_widget(Paragraph::new(status.text.as_str()).style(style), chunks[1]);
        }
    }

    fn render_cards(&mut self, frame: &mut Frame, area: Rect) {
        self.grid_columns = widgets::grid_columns(area.width);

        if self.deck.is_empty() {
            self.card_slots.clear();
            let hint = if self.is_busy() {
                ""
            } else {
                "No flashcards yet. Type a topic and press Ctrl+G."
            };
            let empty = Paragraph::new(hint)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(self.theme.colors.text_dim));
            frame.render_widget(empty, area);
            return;
        }

        let selected = self.deck.selected().unwrap_or(0);
        self.card_slots = widgets::card_slots(area, self.deck.len(), selected);

        let cards_focused = self.focus == Focus::Cards;
        for &(index, slot) in &self.card_slots {
            if let Some(card) = self.deck.get(index) {
                let widget = FlashcardWidget::new(
                    index,
                    card,
                    self.deck.face(index),
                    cards_focused && index == selected,
                    &self.theme,
                );
                frame.render_widget(widget, slot);
            }
        }
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let theme_hint = format!("[{}]", self.theme.name.display_name());
        let hints: Vec<(&str, &str)> = match self.focus {
            Focus::Input => vec![
                ("Ctrl+G", "generate"),
                ("Enter", "new line"),
                ("Tab", "cards"),
                ("Ctrl+C", "quit"),
            ],
            Focus::Cards => vec![
                ("←↑↓→", "nav"),
                ("Enter/Space", "flip"),
                ("g", "generate"),
                ("Tab", "edit input"),
                ("t", theme_hint.as_str()),
                ("q", "quit"),
            ],
        };
        frame.render_widget(KeyHints::new(&hints, &self.theme), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerateError;
    use crate::resolver::tests::ScriptedGenerator;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Holds every request until `release` is called.
    struct GatedGenerator {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for GatedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<Option<String>, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(Some("Red: Rojo".to_string()))
        }
    }

    fn app_with(generator: Arc<dyn TextGenerator>, input: &str) -> App {
        let config = Config::default();
        let model = config.model.clone();
        App::new(config, model, generator, input.to_string())
    }

    async fn settle(app: &mut App) {
        for _ in 0..500 {
            app.drain_completions();
            if !app.is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("pipeline did not finish");
    }

    fn draw(app: &mut App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[tokio::test]
    async fn test_blank_input_reports_error_without_calling_generator() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(Some("a: b".into()))));
        let mut app = app_with(generator.clone(), "   ");
        app.generate();

        assert!(!app.is_busy());
        assert!(app.deck.is_empty());
        assert_eq!(
            app.status,
            Some(Status {
                text: pipeline::EMPTY_INPUT_MESSAGE.to_string(),
                kind: StatusKind::Error,
            })
        );
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_formatted_list_renders_cards() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = app_with(generator.clone(), "Hello: Hola\nGoodbye: Adiós");
        app.generate();
        assert_eq!(
            app.status.as_ref().map(|s| s.text.as_str()),
            Some("Parsing flashcards...")
        );

        settle(&mut app).await;
        assert_eq!(app.deck.len(), 2);
        assert_eq!(app.deck.get(1).unwrap().definition, "Adiós");
        assert_eq!(app.status, None);
        assert_eq!(app.focus, Focus::Cards);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_generator_failure_leaves_deck_empty() {
        let generator = Arc::new(ScriptedGenerator::answering(Err(
            GenerateError::MissingApiKey,
        )));
        let mut app = app_with(generator, "Colors");
        app.generate();
        assert_eq!(
            app.status.as_ref().map(|s| s.text.as_str()),
            Some("Generating flashcards...")
        );

        settle(&mut app).await;
        assert!(app.deck.is_empty());
        let status = app.status.clone().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.starts_with("An error occurred: No API key configured"));
    }

    #[tokio::test]
    async fn test_generate_is_inert_while_in_flight() {
        let generator = Arc::new(GatedGenerator {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let mut app = app_with(generator.clone(), "Colors");

        app.generate();
        assert!(app.is_busy());
        app.generate();
        app.handle_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));

        // Header, spacing and the 8-row input sit above the button row
        let terminal = draw(&mut app);
        let row: String = (0..16u16)
            .map(|x| terminal.backend().buffer()[(x, 10u16)].symbol().to_string())
            .collect();
        assert!(row.contains('…'), "button should render disabled: {row:?}");

        generator.gate.notify_one();
        settle(&mut app).await;
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.deck.len(), 1);

        // Re-enabled once the outcome is applied
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_bootstrap_runs_once_for_prefilled_input() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(Some("Red: Rojo".into()))));
        let mut app = app_with(generator.clone(), "Colors");
        app.bootstrap();
        settle(&mut app).await;
        app.bootstrap();
        settle(&mut app).await;

        assert_eq!(generator.calls(), 1);
        assert_eq!(app.deck.len(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_skips_blank_input() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = app_with(generator.clone(), "  ");
        app.bootstrap();

        assert_eq!(app.status, None);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_click_and_keys_flip_cards_independently() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = app_with(generator, "a: 1\nb: 2\nc: 3");
        app.generate();
        settle(&mut app).await;
        draw(&mut app);

        // Pointer activation on the second card
        let (_, slot) = app.card_slots[1];
        app.handle_mouse(click(slot.x + 2, slot.y + 2));
        assert!(!app.deck.is_pressed(0));
        assert!(app.deck.is_pressed(1));
        assert!(!app.deck.is_pressed(2));

        // Keyboard activation on the same card undoes it
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(!app.deck.is_pressed(1));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.deck.is_pressed(1));
        assert!(!app.deck.is_pressed(0));

        // Space was consumed, not typed into the input
        assert_eq!(app.input, "a: 1\nb: 2\nc: 3");
    }

    #[tokio::test]
    async fn test_regenerating_resets_flip_state() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = app_with(generator, "a: 1\nb: 2");
        app.generate();
        settle(&mut app).await;
        app.handle_key(key(KeyCode::Enter));
        assert!(app.deck.is_pressed(0));

        app.generate();
        settle(&mut app).await;
        assert!(!app.deck.is_pressed(0));
        assert_eq!(app.deck.len(), 2);
    }

    #[tokio::test]
    async fn test_input_editing_and_paste() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = app_with(generator, "");
        for c in "Hi: x".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Backspace));
        app.handle_paste("\r\nBye: y\r\n");
        assert_eq!(app.input, "Hi: x\nBye: y\n");
        assert_eq!(app.focus, Focus::Input);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Cards);
    }

    #[tokio::test]
    async fn test_render_shows_cards_and_status() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = app_with(generator, "Hello: Hola\nnothing");
        app.generate();
        settle(&mut app).await;

        let terminal = draw(&mut app);
        let buffer = terminal.backend().buffer();
        let (_, slot) = app.card_slots[0];
        let card_text: String = (slot.top()..slot.bottom())
            .flat_map(|y| (slot.left()..slot.right()).map(move |x| (x, y)))
            .map(|(x, y)| buffer[(x, y)].symbol().to_string())
            .collect();
        assert!(card_text.contains("Hello"));
        assert!(card_text.contains("TERM"));
        assert!(!card_text.contains("Hola"));
    }

    #[tokio::test]
    async fn test_theme_change_saves_only_disk_settings() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = App::new(
            Config::default(),
            "cli-only-model".to_string(),
            generator,
            String::new(),
        );
        app.config_path = dir.path().join("config.toml");

        app.cycle_theme();

        let saved = Config::load_from(&app.config_path).unwrap();
        assert_eq!(saved.theme, "gruvbox");
        assert_eq!(saved.model, Config::default().model);
        assert_eq!(saved.api_base, Config::default().api_base);
        assert_eq!(app.model, "cli-only-model");
    }

    #[tokio::test]
    async fn test_huge_input_renders_without_overflow() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = app_with(generator.clone(), &"x\n".repeat(65_535));
        draw(&mut app);

        let mut app = app_with(generator, &"x\n".repeat(70_000));
        draw(&mut app);
        assert_eq!(app.focus, Focus::Input);
    }

    #[tokio::test]
    async fn test_control_chords_are_not_typed() {
        let generator = Arc::new(ScriptedGenerator::answering(Ok(None)));
        let mut app = app_with(generator, "");
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('v'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        assert_eq!(app.input, "");

        app.handle_key(KeyEvent::new(KeyCode::Char('H'), KeyModifiers::SHIFT));
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.input, "Hi");
    }
}
