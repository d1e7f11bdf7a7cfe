//! TUI (Terminal User Interface) module for Number Quest
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # Layout
//! Title, status line and guess input on top; the game master's commentary
//! and secret hint on the left; the guess history on the right; key help at
//! the bottom.
//!
//! # State Machine
//! - `EnteringGuess` → `GameOver` when a guess hits the target
//! - `GameOver` → `EnteringGuess` when a new game starts

use crate::controller::{GameInterface, Region, UserAction};
use crate::error::ValidationError;
use crate::game_state::{GuessRecord, SessionState};
use crate::rules::{MAX_VALUE, MIN_VALUE, Outcome};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;

const MAX_INPUT_DIGITS: usize = 3;
const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const CELEBRATION_FRAMES: u16 = 30;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const DIM_STYLE: Style = Style::new().fg(Color::DarkGray);

const CELEBRATION_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiState {
    EnteringGuess,
    /// Target found; only a new game or quitting is accepted.
    GameOver,
}

fn outcome_style(outcome: Outcome) -> Style {
    match outcome {
        Outcome::TooHigh => Style::new().fg(Color::Red).add_modifier(Modifier::BOLD),
        Outcome::TooLow => Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Outcome::Correct => SUCCESS_STYLE,
    }
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    state: TuiState,
    history: &'a [GuessRecord],
    current_input: &'a str,
    status: &'a str,
    commentary: &'a str,
    commentary_pending: bool,
    hint: Option<&'a str>,
    hint_pending: bool,
    error_message: &'a str,
    celebration_frame: Option<u16>,
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and display of the session.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    state: TuiState,
    history: Vec<GuessRecord>,
    current_input: String,
    status: String,
    commentary: String,
    commentary_pending: bool,
    hint: Option<String>,
    hint_pending: bool,
    error_message: String,
    celebration_frames_left: u16,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete: alternate screen, cursor hidden");

        Ok(Self {
            terminal,
            state: TuiState::EnteringGuess,
            history: Vec::new(),
            current_input: String::new(),
            status: String::new(),
            commentary: String::new(),
            commentary_pending: false,
            hint: None,
            hint_pending: false,
            error_message: String::new(),
            celebration_frames_left: 0,
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let celebration_frame = (self.celebration_frames_left > 0)
            .then(|| CELEBRATION_FRAMES - self.celebration_frames_left);
        let ctx = RenderContext {
            state: self.state,
            history: &self.history,
            current_input: &self.current_input,
            status: &self.status,
            commentary: &self.commentary,
            commentary_pending: self.commentary_pending,
            hint: self.hint.as_deref(),
            hint_pending: self.hint_pending,
            error_message: &self.error_message,
            celebration_frame,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Input
                Constraint::Min(8),    // Game master + history
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0], ctx.history.len());
        Self::render_status(f, chunks[1], ctx.status, ctx.celebration_frame);
        Self::render_input(f, chunks[2], ctx);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[3]);
        Self::render_game_master(f, body[0], ctx);
        Self::render_history(f, body[1], ctx.history);
        Self::render_instructions(f, chunks[4], ctx);
    }

    fn render_title(f: &mut Frame, area: Rect, attempts: usize) {
        let title = Line::from(vec![
            Span::styled("NUMBER QUEST", HEADER_STYLE),
            Span::styled(format!("   시도 횟수: {attempts}"), INFO_STYLE),
            Span::styled(format!("   범위: {MIN_VALUE} - {MAX_VALUE}"), DIM_STYLE),
        ]);
        let paragraph = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str, celebration_frame: Option<u16>) {
        let status_text = if status.is_empty() { "준비" } else { status };
        let line = match celebration_frame {
            Some(frame) => Self::celebration_line(status_text, frame),
            None => Line::from(Span::styled(status_text, HEADER_STYLE)),
        };
        let paragraph = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title("상태"));
        f.render_widget(paragraph, area);
    }

    /// Colour-cycling banner shown for a short while after a win.
    fn celebration_line(text: &str, frame: u16) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, star) in ["*", "+", "*"].iter().enumerate() {
            let color = CELEBRATION_COLORS[(usize::from(frame) + i) % CELEBRATION_COLORS.len()];
            spans.push(Span::styled(format!("{star} "), Style::new().fg(color)));
        }
        let color = CELEBRATION_COLORS[usize::from(frame) % CELEBRATION_COLORS.len()];
        spans.push(Span::styled(
            text.to_string(),
            Style::new().fg(color).add_modifier(Modifier::BOLD),
        ));
        for (i, star) in [" *", " +", " *"].iter().enumerate() {
            let color = CELEBRATION_COLORS[(usize::from(frame) + 3 + i) % CELEBRATION_COLORS.len()];
            spans.push(Span::styled((*star).to_string(), Style::new().fg(color)));
        }
        Line::from(spans)
    }

    fn render_input(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let line = match ctx.state {
            TuiState::EnteringGuess => Line::from(vec![
                Span::raw("숫자 입력: "),
                Span::styled(
                    format!("{:<width$}", ctx.current_input, width = MAX_INPUT_DIGITS),
                    Style::new().fg(Color::White).bg(Color::DarkGray),
                ),
                Span::styled("_", DIM_STYLE),
            ]),
            TuiState::GameOver => Line::from(Span::styled("N 키를 누르면 새 게임을 시작합니다", SUCCESS_STYLE)),
        };
        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_game_master(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let mut lines = Vec::new();

        let commentary_style = if ctx.commentary_pending {
            DIM_STYLE.add_modifier(Modifier::ITALIC)
        } else {
            MESSAGE_STYLE.add_modifier(Modifier::ITALIC)
        };
        lines.push(Line::from(Span::styled(
            format!("\"{}\"", ctx.commentary),
            commentary_style,
        )));
        if ctx.commentary_pending {
            lines.push(Line::from(Span::styled("(생각 중...)", DIM_STYLE)));
        }
        lines.push(Line::from(""));

        if let Some(hint) = ctx.hint {
            lines.push(Line::from(vec![
                Span::styled("비밀 힌트: ", INFO_STYLE),
                Span::raw(hint.to_string()),
            ]));
        } else if ctx.hint_pending {
            lines.push(Line::from(Span::styled("힌트를 찾는 중...", DIM_STYLE)));
        } else if ctx.state == TuiState::EnteringGuess {
            lines.push(Line::from(Span::styled(
                "힌트가 필요하신가요? ? 키를 누르세요",
                Style::new().fg(Color::Blue),
            )));
        }

        if !ctx.error_message.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(ctx.error_message, ERROR_STYLE)));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("게임 마스터").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_history(f: &mut Frame, area: Rect, history: &[GuessRecord]) {
        let lines: Vec<Line> = if history.is_empty() {
            vec![Line::from(Span::styled("아직 기록이 없습니다.", DIM_STYLE))]
        } else {
            history
                .iter()
                .map(|record| {
                    Line::from(vec![
                        Span::styled(format!("#{:<3}", record.sequence), DIM_STYLE),
                        Span::styled(
                            format!("{:>3}  ", record.value),
                            Style::new().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(record.outcome.label(), outcome_style(record.outcome)),
                    ])
                })
                .collect()
        };

        let paragraph =
            Paragraph::new(lines).block(Block::default().title("추측 기록").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let text = match ctx.state {
            TuiState::EnteringGuess if ctx.hint.is_some() || ctx.hint_pending => {
                "숫자 입력 | ENTER: 제출 | ESC: 종료"
            }
            TuiState::EnteringGuess => "숫자 입력 | ENTER: 제출 | ?: 힌트 | ESC: 종료",
            TuiState::GameOver => "N: 새 게임 | ESC: 종료",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn handle_input(&mut self) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }

        let key = match event::read()? {
            Event::Key(key) => key,
            other => {
                debug_log!("handle_input() - Ignoring non-key event: {:?}", other);
                return Ok(None);
            }
        };

        // Only process Press events, ignore Release and Repeat to avoid double input
        if key.kind != event::KeyEventKind::Press {
            return Ok(None);
        }

        // Filter out garbage from terminal escape sequences (alt-tab and friends)
        if let KeyCode::Char(c) = key.code
            && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
        {
            debug_log!("handle_input() - Ignoring invalid character: {:?}", c);
            return Ok(None);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(UserAction::Exit));
        }

        Ok(match self.state {
            TuiState::EnteringGuess => self.handle_guess_input(key),
            TuiState::GameOver => Self::handle_game_over_input(key),
        })
    }

    fn has_modifier_keys(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
    }

    fn handle_guess_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        if Self::has_modifier_keys(&key) {
            debug_log!("handle_guess_input() - Ignoring key with modifier: {:?}", key.modifiers);
            return None;
        }
        self.error_message.clear();

        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.current_input.len() < MAX_INPUT_DIGITS {
                    self.current_input.push(c);
                } else {
                    self.error_message =
                        format!("최대 {MAX_INPUT_DIGITS}자리까지 입력할 수 있어요 ({MIN_VALUE}-{MAX_VALUE})");
                }
                None
            }
            KeyCode::Backspace => {
                self.current_input.pop();
                None
            }
            KeyCode::Enter => {
                let guess = std::mem::take(&mut self.current_input);
                Some(UserAction::Guess(guess))
            }
            KeyCode::Char('?' | 'h' | 'H') => Some(UserAction::Hint),
            KeyCode::Esc => Some(UserAction::Exit),
            KeyCode::Char(c) => {
                self.error_message = format!("숫자만 입력할 수 있어요! ('{c}'은(는) 숫자가 아닙니다)");
                None
            }
            _ => None,
        }
    }

    fn handle_game_over_input(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char('n' | 'N') => Some(UserAction::NewGame),
            KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
            _ => None,
        }
    }

    fn tick_celebration(&mut self) {
        self.celebration_frames_left = self.celebration_frames_left.saturating_sub(1);
    }

    fn sync_history(&mut self, session: &SessionState) {
        self.history = session.guesses().to_vec();
    }
}

impl GameInterface for TuiInterface {
    fn show_welcome(&mut self, session: &SessionState, greeting: &str) {
        self.sync_history(session);
        self.commentary = greeting.to_string();
        self.status = format!("{MIN_VALUE}에서 {MAX_VALUE} 사이의 숫자를 맞춰보세요!");
        self.draw_or_log();
    }

    fn read_action(&mut self, _session: &SessionState) -> Option<UserAction> {
        if self.draw().is_err() {
            info_log!("read_action() - Draw failed, returning Exit");
            return Some(UserAction::Exit);
        }
        let action = match self.handle_input() {
            Ok(action) => action,
            Err(e) => {
                info_log!("read_action() - Input error ({}), returning Exit", e);
                Some(UserAction::Exit)
            }
        };
        self.tick_celebration();
        action
    }

    fn show_rejection(&mut self, error: &ValidationError) {
        self.error_message = format!(
            "{MIN_VALUE}에서 {MAX_VALUE} 사이의 유효한 숫자를 입력해주세요. ({error})"
        );
        self.draw_or_log();
    }

    fn show_notice(&mut self, message: &str) {
        self.error_message = message.to_string();
        self.draw_or_log();
    }

    fn show_outcome(&mut self, session: &SessionState, outcome: Outcome) {
        self.sync_history(session);
        self.error_message.clear();
        if let Some(latest) = session.latest() {
            self.status = outcome.status_message(latest.value);
        }
        if outcome.is_correct() {
            self.state = TuiState::GameOver;
            self.celebration_frames_left = CELEBRATION_FRAMES;
        }
        self.draw_or_log();
    }

    fn show_thinking(&mut self, region: Region) {
        match region {
            Region::Commentary => self.commentary_pending = true,
            Region::Hint => self.hint_pending = true,
        }
        self.draw_or_log();
    }

    fn show_commentary(&mut self, text: &str) {
        self.commentary = text.to_string();
        self.commentary_pending = false;
        self.draw_or_log();
    }

    fn show_hint(&mut self, text: &str) {
        self.hint = Some(text.to_string());
        self.hint_pending = false;
        self.draw_or_log();
    }

    fn show_new_game(&mut self, session: &SessionState, greeting: &str) {
        self.state = TuiState::EnteringGuess;
        self.sync_history(session);
        self.current_input.clear();
        self.commentary = greeting.to_string();
        self.commentary_pending = false;
        self.hint = None;
        self.hint_pending = false;
        self.error_message.clear();
        self.celebration_frames_left = 0;
        self.status = format!("새 게임이 시작되었습니다! {MIN_VALUE}~{MAX_VALUE} 사이의 숫자를 입력하세요.");
        self.draw_or_log();
    }

    fn show_exit(&mut self) {
        self.status = "게임을 종료합니다...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
