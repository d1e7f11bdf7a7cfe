use crate::config::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::controller::{GameInterface, Region, UserAction};
use crate::error::ValidationError;
use crate::game_state::{GuessRecord, SessionState};
use crate::rules::{MAX_VALUE, MIN_VALUE, Outcome};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;

const HISTORY_PREVIEW: usize = 5;

/// Number Quest: guess the number with a language-model game master
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use the plain line-based interface instead of the full-screen one
    #[arg(long)]
    pub plain: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long = "legacy-api-key", env = "API_KEY", hide = true, hide_env_values = true)]
    pub legacy_api_key: Option<String>,

    /// Model name passed to generateContent
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the Gemini API
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Write logs here instead of the default data directory
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// UI Input/Output functions

fn parse_command(input: &str) -> UserAction {
    match input.trim().to_lowercase().as_str() {
        "exit" | "quit" | "q" => UserAction::Exit,
        "hint" | "h" | "?" => UserAction::Hint,
        "new" | "next" | "n" => UserAction::NewGame,
        _ => UserAction::Guess(input.trim().to_string()),
    }
}

pub fn read_action<R: BufRead>(reader: &mut R, game_over: bool) -> UserAction {
    if game_over {
        println!("\n새 게임은 'new', 종료는 'exit'를 입력하세요:");
    } else {
        println!(
            "\n{MIN_VALUE}-{MAX_VALUE} 사이의 숫자를 입력하세요 (비밀 힌트: 'hint', 종료: 'exit'):"
        );
    }
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) | Err(_) => UserAction::Exit,
        Ok(_) => parse_command(&input),
    }
}

fn format_record(record: &GuessRecord) -> String {
    format!(
        "#{:<3} {:>3}  {}  ({})",
        record.sequence,
        record.value,
        record.outcome.label(),
        record.created_at.format("%H:%M:%S")
    )
}

pub fn display_history(session: &SessionState) {
    if session.guesses().is_empty() {
        println!("아직 기록이 없습니다.");
        return;
    }
    println!("추측 기록:");
    for record in session.guesses().iter().take(HISTORY_PREVIEW) {
        println!("  {}", format_record(record));
    }
    if session.attempt_count() > HISTORY_PREVIEW {
        println!("  ...외 {}개", session.attempt_count() - HISTORY_PREVIEW);
    }
}

pub fn display_celebration() {
    println!("*  .  *  .  *  .  *  .  *  .  *");
    println!("      축 하 합 니 다 !");
    println!("*  .  *  .  *  .  *  .  *  .  *");
}

pub fn display_game_master(text: &str) {
    println!("[게임 마스터] \"{text}\"");
}

/// Line-oriented front end over any `BufRead`.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn show_welcome(&mut self, _session: &SessionState, greeting: &str) {
        println!("NUMBER QUEST");
        println!("{MIN_VALUE}에서 {MAX_VALUE} 사이의 숫자를 맞춰보세요!");
        display_game_master(greeting);
    }

    fn read_action(&mut self, session: &SessionState) -> Option<UserAction> {
        Some(read_action(&mut self.reader, session.is_over()))
    }

    fn show_rejection(&mut self, error: &ValidationError) {
        println!("{MIN_VALUE}에서 {MAX_VALUE} 사이의 유효한 숫자를 입력해주세요. ({error})");
    }

    fn show_notice(&mut self, message: &str) {
        println!("{message}");
    }

    fn show_outcome(&mut self, session: &SessionState, outcome: Outcome) {
        if let Some(latest) = session.latest() {
            println!("{}", outcome.status_message(latest.value));
        }
        println!("시도 횟수: {}", session.attempt_count());
        display_history(session);
        if outcome.is_correct() {
            display_celebration();
        }
    }

    fn show_thinking(&mut self, region: Region) {
        match region {
            Region::Commentary => println!("(게임 마스터가 생각 중...)"),
            Region::Hint => println!("(힌트를 찾는 중...)"),
        }
    }

    fn show_commentary(&mut self, text: &str) {
        display_game_master(text);
    }

    fn show_hint(&mut self, text: &str) {
        println!("비밀 힌트: {text}");
    }

    fn show_new_game(&mut self, _session: &SessionState, greeting: &str) {
        println!("새 게임이 시작되었습니다! {MIN_VALUE}~{MAX_VALUE} 사이의 숫자를 입력하세요.");
        display_game_master(greeting);
    }

    fn show_exit(&mut self) {
        println!("게임을 종료합니다.");
    }

    fn awaits_commentary(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_cli_defaults() {
        let cli = Cli::try_parse_from(["number-quest", "--plain"]).unwrap();
        assert!(cli.plain);
        assert_eq!(cli.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_parse_cli_log_file() {
        let cli = Cli::try_parse_from(["number-quest", "--log-file", "/tmp/nq.log"]).unwrap();
        assert!(!cli.plain);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/nq.log")));
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("exit"), UserAction::Exit);
        assert_eq!(parse_command("QUIT\n"), UserAction::Exit);
        assert_eq!(parse_command("hint"), UserAction::Hint);
        assert_eq!(parse_command("?"), UserAction::Hint);
        assert_eq!(parse_command("new"), UserAction::NewGame);
        assert_eq!(parse_command("Next"), UserAction::NewGame);
        assert_eq!(parse_command(" 42 \n"), UserAction::Guess("42".to_string()));
        assert_eq!(parse_command("abc"), UserAction::Guess("abc".to_string()));
        assert_eq!(parse_command(""), UserAction::Guess(String::new()));
    }

    #[test]
    fn test_read_action_guess() {
        let mut reader = Cursor::new("37\n");
        assert_eq!(
            read_action(&mut reader, false),
            UserAction::Guess("37".to_string())
        );
    }

    #[test]
    fn test_read_action_eof_exits() {
        let mut reader = Cursor::new("");
        assert_eq!(read_action(&mut reader, false), UserAction::Exit);
    }

    #[test]
    fn test_read_action_reads_one_line_at_a_time() {
        let mut reader = Cursor::new("10\nhint\nexit\n");
        assert_eq!(read_action(&mut reader, false), UserAction::Guess("10".to_string()));
        assert_eq!(read_action(&mut reader, false), UserAction::Hint);
        assert_eq!(read_action(&mut reader, true), UserAction::Exit);
    }

    #[test]
    fn test_format_record() {
        let session = SessionState::with_target(50).unwrap();
        let (session, _) = session.submit_guess("75").unwrap();
        let line = format_record(session.latest().unwrap());
        assert!(line.starts_with("#1"));
        assert!(line.contains("75"));
        assert!(line.contains(Outcome::TooHigh.label()));
    }

    #[test]
    fn test_cli_interface_reads_from_reader() {
        let session = SessionState::with_target(50).unwrap();
        let mut interface = CliInterface::new(Cursor::new("new\n"));
        assert_eq!(interface.read_action(&session), Some(UserAction::NewGame));
        assert_eq!(interface.read_action(&session), Some(UserAction::Exit));
        assert!(interface.awaits_commentary());
    }
}
