// Library interface for number-quest
// This allows integration tests to access internal modules

pub mod cli;
pub mod commentary;
pub mod config;
pub mod controller;
pub mod error;
pub mod game_state;
pub mod gemini;
pub mod logging;
pub mod rules;
pub mod tui;

// Re-export commonly used items for easier testing
pub use commentary::{Commentator, LanguageModel, PromptRequest, ResponseSlot};
pub use controller::{GameController, GameInterface, Region, UserAction, game_loop};
pub use error::{AppError, CommentaryError, ValidationError};
pub use game_state::{
    GuessRecord, Phase, SessionState, reset_session, start_session, submit_guess,
};
pub use rules::{MAX_VALUE, MIN_VALUE, Outcome, evaluate, parse_guess};
