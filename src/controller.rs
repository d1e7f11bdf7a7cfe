//! The shared game loop behind both front ends.
//!
//! Session transitions run synchronously here. Commentary and hints are
//! requested on the tokio runtime and come back over a channel; each result
//! carries the token of its display region and is dropped if a newer request
//! for that region has been issued since.

use crate::commentary::{Commentator, GREETING, NEW_GAME_GREETING, ResponseSlot};
use crate::config::GeminiConfig;
use crate::error::ValidationError;
use crate::game_state::SessionState;
use crate::rules::Outcome;
use crate::{debug_log, info_log};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

pub const GAME_OVER_NOTICE: &str = "게임이 끝났습니다. 새 게임을 시작해주세요.";
pub const FINISH_FIRST_NOTICE: &str = "현재 게임을 먼저 끝내주세요!";
pub const HINT_USED_NOTICE: &str = "힌트는 한 게임에 한 번만 받을 수 있어요.";

/// Something the player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Guess(String),
    Hint,
    NewGame,
    Exit,
}

/// Display region an asynchronous response is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Commentary,
    Hint,
}

#[derive(Debug)]
struct Delivery {
    region: Region,
    token: u64,
    text: String,
}

/// A front end the game loop can drive.
pub trait GameInterface {
    fn show_welcome(&mut self, session: &SessionState, greeting: &str);
    /// Next player action, or `None` if there is nothing yet.
    fn read_action(&mut self, session: &SessionState) -> Option<UserAction>;
    fn show_rejection(&mut self, error: &ValidationError);
    fn show_notice(&mut self, message: &str);
    fn show_outcome(&mut self, session: &SessionState, outcome: Outcome);
    /// A request for `region` is in flight.
    fn show_thinking(&mut self, region: Region);
    fn show_commentary(&mut self, text: &str);
    fn show_hint(&mut self, text: &str);
    fn show_new_game(&mut self, session: &SessionState, greeting: &str);
    fn show_exit(&mut self);

    /// Front ends that block on input want pending responses delivered
    /// before they read again.
    fn awaits_commentary(&self) -> bool {
        false
    }
}

pub struct GameController {
    session: SessionState,
    commentator: Commentator,
    runtime: Handle,
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
    commentary_slot: ResponseSlot,
    hint_slot: ResponseSlot,
    awaiting_commentary: bool,
    awaiting_hint: bool,
    hint_requested: bool,
    wait_limit: Duration,
}

impl GameController {
    pub fn new(session: SessionState, commentator: Commentator, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            session,
            commentator,
            runtime,
            tx,
            rx,
            commentary_slot: ResponseSlot::new(),
            hint_slot: ResponseSlot::new(),
            awaiting_commentary: false,
            awaiting_hint: false,
            hint_requested: false,
            wait_limit: GeminiConfig::default().wait_limit(),
        }
    }

    /// How long a blocking front end waits for a pending response. Should
    /// outlast the model client's request timeout; see
    /// [`GeminiConfig::wait_limit`].
    #[must_use]
    pub fn with_wait_limit(mut self, limit: Duration) -> Self {
        self.wait_limit = limit;
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn run<I: GameInterface>(&mut self, interface: &mut I) {
        interface.show_welcome(&self.session, GREETING);

        loop {
            if interface.awaits_commentary() {
                self.wait_for_pending(interface);
            } else {
                self.deliver_ready(interface);
            }

            let Some(action) = interface.read_action(&self.session) else {
                continue;
            };
            debug_log!("Action: {:?}", action);

            match action {
                UserAction::Guess(raw) => self.handle_guess(interface, &raw),
                UserAction::Hint => self.handle_hint(interface),
                UserAction::NewGame => self.handle_new_game(interface),
                UserAction::Exit => {
                    info_log!("Player quit");
                    interface.show_exit();
                    break;
                }
            }
        }
    }

    fn handle_guess<I: GameInterface>(&mut self, interface: &mut I, raw: &str) {
        let previous = self.session.previous_values();
        let attempt_count = self.session.attempt_count();

        match self.session.submit_guess(raw) {
            Err(e) => {
                debug_log!("Rejected input {:?}: {}", raw, e);
                interface.show_rejection(&e);
            }
            Ok((_, None)) => {
                debug_log!("Ignoring guess {:?} on a finished session", raw);
            }
            Ok((next, Some(outcome))) => {
                self.session = next;
                interface.show_outcome(&self.session, outcome);
                if let Some(latest) = self.session.latest() {
                    self.spawn_commentary(interface, latest.value, attempt_count, previous);
                }
            }
        }
    }

    fn handle_hint<I: GameInterface>(&mut self, interface: &mut I) {
        if self.session.is_over() {
            interface.show_notice(GAME_OVER_NOTICE);
            return;
        }
        if self.hint_requested {
            interface.show_notice(HINT_USED_NOTICE);
            return;
        }
        self.hint_requested = true;

        let token = self.hint_slot.issue();
        self.awaiting_hint = true;
        interface.show_thinking(Region::Hint);

        let commentator = self.commentator.clone();
        let tx = self.tx.clone();
        let target = self.session.target();
        let previous = self.session.previous_values();
        self.runtime.spawn(async move {
            let text = commentator.request_hint(target, &previous).await;
            let _ = tx.send(Delivery {
                region: Region::Hint,
                token,
                text,
            });
        });
    }

    fn handle_new_game<I: GameInterface>(&mut self, interface: &mut I) {
        if !self.session.is_over() {
            interface.show_notice(FINISH_FIRST_NOTICE);
            return;
        }
        self.session = self.session.reset();
        self.commentary_slot.invalidate();
        self.hint_slot.invalidate();
        self.awaiting_commentary = false;
        self.awaiting_hint = false;
        self.hint_requested = false;
        interface.show_new_game(&self.session, NEW_GAME_GREETING);
    }

    fn spawn_commentary<I: GameInterface>(
        &mut self,
        interface: &mut I,
        guess: u8,
        attempt_count: usize,
        previous: Vec<u8>,
    ) {
        let token = self.commentary_slot.issue();
        self.awaiting_commentary = true;
        interface.show_thinking(Region::Commentary);

        let commentator = self.commentator.clone();
        let tx = self.tx.clone();
        let target = self.session.target();
        self.runtime.spawn(async move {
            let text = commentator
                .request_commentary(guess, target, attempt_count, &previous)
                .await;
            let _ = tx.send(Delivery {
                region: Region::Commentary,
                token,
                text,
            });
        });
    }

    /// Hand finished responses to the interface without blocking.
    fn deliver_ready<I: GameInterface>(&mut self, interface: &mut I) {
        while let Ok(delivery) = self.rx.try_recv() {
            self.deliver(interface, delivery);
        }
    }

    /// Block until every accepted in-flight response has arrived or the wait
    /// limit runs out.
    fn wait_for_pending<I: GameInterface>(&mut self, interface: &mut I) {
        let deadline = Instant::now() + self.wait_limit;
        while self.awaiting_commentary || self.awaiting_hint {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(delivery) => self.deliver(interface, delivery),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("Gave up waiting for commentary");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.deliver_ready(interface);
    }

    fn deliver<I: GameInterface>(&mut self, interface: &mut I, delivery: Delivery) {
        let (slot, awaiting) = match delivery.region {
            Region::Commentary => (&self.commentary_slot, &mut self.awaiting_commentary),
            Region::Hint => (&self.hint_slot, &mut self.awaiting_hint),
        };
        if !slot.accepts(delivery.token) {
            debug_log!(
                "Dropping stale {:?} response (token {})",
                delivery.region,
                delivery.token
            );
            return;
        }
        *awaiting = false;
        match delivery.region {
            Region::Commentary => interface.show_commentary(&delivery.text),
            Region::Hint => interface.show_hint(&delivery.text),
        }
    }
}

/// Play sessions on `interface` until the player exits.
pub fn game_loop<I: GameInterface>(
    interface: &mut I,
    commentator: Commentator,
    runtime: Handle,
    wait_limit: Duration,
) {
    let mut controller = GameController::new(SessionState::start(), commentator, runtime)
        .with_wait_limit(wait_limit);
    controller.run(interface);
}
