//! Session state for one round of the number game.
//!
//! Every transition returns a new `SessionState`; the caller keeps the single
//! current value. A session is `Active` until a guess hits the target, then
//! `Over` until it is replaced by a fresh session.

use crate::error::ValidationError;
use crate::rules::{Outcome, check_range, evaluate, parse_guess, random_target};
use crate::{debug_log, info_log};
use chrono::{DateTime, Local};
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Over,
}

/// One accepted guess. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub value: u8,
    pub outcome: Outcome,
    /// 1-based position of this guess within its session.
    pub sequence: usize,
    pub created_at: DateTime<Local>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionState {
    target: u8,
    guesses: Vec<GuessRecord>,
    is_over: bool,
}

impl SessionState {
    /// Start a session with a target drawn from the thread-local RNG.
    #[must_use]
    pub fn start() -> Self {
        Self::start_with_rng(&mut rand::rng())
    }

    pub fn start_with_rng<R: Rng>(rng: &mut R) -> Self {
        let target = random_target(rng);
        info_log!("Starting new session");
        Self {
            target,
            guesses: Vec::new(),
            is_over: false,
        }
    }

    /// Start a session with a known target.
    pub fn with_target(target: u8) -> Result<Self, ValidationError> {
        let target = check_range(i64::from(target))?;
        Ok(Self {
            target,
            guesses: Vec::new(),
            is_over: false,
        })
    }

    /// Validate `raw` and apply it as a guess.
    ///
    /// Returns the next state together with the outcome, or `None` as the
    /// outcome when the session is already over (the guess is ignored).
    /// Input is validated before the over check, so a bad entry is reported
    /// even after the game has ended.
    pub fn submit_guess(&self, raw: &str) -> Result<(Self, Option<Outcome>), ValidationError> {
        let value = parse_guess(raw)?;

        if self.is_over {
            debug_log!("Ignoring guess {} on finished session", value);
            return Ok((self.clone(), None));
        }

        let outcome = evaluate(value, self.target);
        let record = GuessRecord {
            value,
            outcome,
            sequence: self.guesses.len() + 1,
            created_at: Local::now(),
        };

        let mut guesses = Vec::with_capacity(self.guesses.len() + 1);
        guesses.push(record);
        guesses.extend(self.guesses.iter().cloned());

        info_log!("Guess #{} = {} -> {:?}", guesses.len(), value, outcome);

        let next = Self {
            target: self.target,
            guesses,
            is_over: outcome.is_correct(),
        };
        Ok((next, Some(outcome)))
    }

    /// Throw this session away and start a new one.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self::start()
    }

    pub fn reset_with_rng<R: Rng>(&self, rng: &mut R) -> Self {
        Self::start_with_rng(rng)
    }

    #[must_use]
    pub fn target(&self) -> u8 {
        self.target
    }

    /// Guess history, most recent first.
    #[must_use]
    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.is_over
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.is_over { Phase::Over } else { Phase::Active }
    }

    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.guesses.len()
    }

    /// Values of all guesses so far, most recent first.
    #[must_use]
    pub fn previous_values(&self) -> Vec<u8> {
        self.guesses.iter().map(|g| g.value).collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&GuessRecord> {
        self.guesses.first()
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("target", &"<hidden>")
            .field("guesses", &self.guesses)
            .field("is_over", &self.is_over)
            .finish()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::start()
    }
}

/// Start a fresh session.
#[must_use]
pub fn start_session() -> SessionState {
    SessionState::start()
}

pub fn submit_guess(
    state: &SessionState,
    raw_input: &str,
) -> Result<(SessionState, Option<Outcome>), ValidationError> {
    state.submit_guess(raw_input)
}

#[must_use]
pub fn reset_session(state: &SessionState) -> SessionState {
    state.reset()
}
