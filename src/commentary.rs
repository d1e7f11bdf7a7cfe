//! Game-master commentary and hints from a language model.
//!
//! `Commentator` never fails: whatever goes wrong with the model call, the
//! caller gets a usable line of text back.

use crate::error::CommentaryError;
use crate::rules::{MAX_VALUE, MIN_VALUE};
use crate::{debug_log, info_log};
use async_trait::async_trait;
use std::sync::Arc;

pub const GREETING: &str = "안녕! 나는 너의 게임 마스터 제미나이야. 행운을 빌어!";
pub const NEW_GAME_GREETING: &str = "오, 새로운 도전인가요? 이번엔 좀 더 어려울지도 몰라요!";

const COMMENTARY_TEMPERATURE: f32 = 0.8;
const COMMENTARY_TOP_P: f32 = 0.9;
const HINT_TEMPERATURE: f32 = 0.9;
const CLOSE_DISTANCE: u8 = 5;
const FAR_DISTANCE: u8 = 30;

/// Fixed lines used when the model gives nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallbacks {
    /// Model answered with no text, or with text we refused to show.
    pub empty: &'static str,
    /// Transport or API failure.
    pub failed: &'static str,
    pub missing_key: &'static str,
}

pub const COMMENTARY_FALLBACKS: Fallbacks = Fallbacks {
    empty: "흥미진진한 전개네요! 다음 숫자는 무엇일까요?",
    failed: "오호, 과연 이 숫자가 맞을까요? 계속 도전해보세요!",
    missing_key: "API 키가 설정되지 않았습니다. 환경 변수를 확인해주세요.",
};

pub const HINT_FALLBACKS: Fallbacks = Fallbacks {
    empty: "숫자의 기운이 심상치 않군요...",
    failed: "흐음... 좀 더 집중해보세요!",
    missing_key: "API 키를 설정해주세요.",
};

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_p: Option<f32>,
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &PromptRequest) -> Result<String, CommentaryError>;
}

fn join_values(values: &[u8]) -> String {
    values
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt for the line shown after a guess.
///
/// `attempt_count` is the number of guesses made before this one.
#[must_use]
pub fn commentary_prompt(
    guess: u8,
    target: u8,
    attempt_count: usize,
    previous_guesses: &[u8],
) -> PromptRequest {
    let attempt = attempt_count + 1;
    let prompt = if guess == target {
        format!(
            "The player WON! They guessed the target number {target} in {attempt} attempts.\n\
             Give a grand, celebratory 2-sentence congratulatory message in Korean."
        )
    } else {
        let direction = if guess < target { "LOW" } else { "HIGH" };
        let distance = guess.abs_diff(target);
        format!(
            "You are a witty and encouraging game show host for a 'Guess the Number' game ({MIN_VALUE}-{MAX_VALUE}).\n\
             The player just guessed {guess}. The target is {target}.\n\
             This is attempt number {attempt}.\n\
             The guess is too {direction}.\n\
             The distance from the target is {distance}.\n\
             Previous guesses: {previous}.\n\
             \n\
             Provide a short, 1-2 sentence response in Korean.\n\
             Be funny, supportive, or slightly mysterious.\n\
             If they are very close (within {CLOSE_DISTANCE}), be excited.\n\
             If they are very far (more than {FAR_DISTANCE}), give a playful tease.\n\
             Do not reveal the target number.",
            previous = join_values(previous_guesses),
        )
    };

    PromptRequest {
        prompt,
        temperature: COMMENTARY_TEMPERATURE,
        top_p: Some(COMMENTARY_TOP_P),
    }
}

#[must_use]
pub fn hint_prompt(target: u8, previous_guesses: &[u8]) -> PromptRequest {
    let prompt = format!(
        "The target number is {target}. The player has already guessed: {previous}.\n\
         Provide a cryptic but helpful hint in Korean about the target number without revealing it directly.\n\
         For example, mention if it's prime, even/odd, its relation to a famous number, or its tens digit in a riddle-like way.\n\
         Keep it to one short sentence.",
        previous = join_values(previous_guesses),
    );
    PromptRequest {
        prompt,
        temperature: HINT_TEMPERATURE,
        top_p: None,
    }
}

/// True when `text` contains `number` as a standalone run of ASCII digits.
#[must_use]
pub fn mentions_number(text: &str, number: u8) -> bool {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .any(|run| run.trim_start_matches('0').parse::<u64>().ok() == Some(u64::from(number)))
}

/// Wraps a `LanguageModel` and turns every failure into a fallback line.
#[derive(Clone)]
pub struct Commentator {
    model: Arc<dyn LanguageModel>,
}

impl Commentator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Commentary for a guess that was just evaluated.
    pub async fn request_commentary(
        &self,
        guess: u8,
        target: u8,
        attempt_count: usize,
        previous_guesses: &[u8],
    ) -> String {
        let request = commentary_prompt(guess, target, attempt_count, previous_guesses);
        let text = self.generate_or_fallback(&request, COMMENTARY_FALLBACKS).await;
        // Plain digit match: when the target equals a number the prompt itself
        // uses (FAR_DISTANCE, CLOSE_DISTANCE) an innocent echo of it is also
        // replaced. Expected for those targets.
        if guess != target && mentions_number(&text, target) {
            log::warn!("Commentary mentioned the target; replacing with fallback");
            return COMMENTARY_FALLBACKS.empty.to_string();
        }
        text
    }

    pub async fn request_hint(&self, target: u8, previous_guesses: &[u8]) -> String {
        let request = hint_prompt(target, previous_guesses);
        let text = self.generate_or_fallback(&request, HINT_FALLBACKS).await;
        if mentions_number(&text, target) {
            log::warn!("Hint gave away the target; replacing with fallback");
            return HINT_FALLBACKS.empty.to_string();
        }
        text
    }

    async fn generate_or_fallback(&self, request: &PromptRequest, fallbacks: Fallbacks) -> String {
        debug_log!("Sending prompt ({} chars)", request.prompt.len());
        match self.model.generate(request).await {
            Ok(text) if text.trim().is_empty() => {
                info_log!("Model returned no text");
                fallbacks.empty.to_string()
            }
            Ok(text) => text.trim().to_string(),
            Err(CommentaryError::MissingApiKey) => {
                log::warn!("No API key configured; using fallback text");
                fallbacks.missing_key.to_string()
            }
            Err(e) => {
                log::warn!("Commentary request failed: {e}");
                fallbacks.failed.to_string()
            }
        }
    }
}

/// Hands out request tokens for one display region.
///
/// Only the most recently issued token is accepted, so a slow response can
/// not overwrite the text of a newer one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSlot {
    latest: u64,
}

impl ResponseSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    #[must_use]
    pub fn accepts(&self, token: u64) -> bool {
        token != 0 && token == self.latest
    }

    /// Invalidate whatever is in flight without issuing a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns a canned result and records the prompts it saw.
    struct ScriptedModel {
        reply: Mutex<Option<Result<String, CommentaryError>>>,
        seen: Mutex<Vec<PromptRequest>>,
    }

    impl ScriptedModel {
        fn new(reply: Result<String, CommentaryError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, request: &PromptRequest) -> Result<String, CommentaryError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    #[test]
    fn test_commentary_prompt_for_low_guess() {
        let request = commentary_prompt(20, 50, 2, &[80, 10]);
        assert!(request.prompt.contains("just guessed 20"));
        assert!(request.prompt.contains("attempt number 3"));
        assert!(request.prompt.contains("too LOW"));
        assert!(request.prompt.contains("distance from the target is 30"));
        assert!(request.prompt.contains("Previous guesses: 80, 10."));
        assert!(request.prompt.contains("Korean"));
        assert!(request.prompt.contains("Do not reveal the target number"));
        assert_eq!(request.temperature, 0.8);
        assert_eq!(request.top_p, Some(0.9));
    }

    #[test]
    fn test_commentary_prompt_for_high_guess() {
        let request = commentary_prompt(90, 50, 0, &[]);
        assert!(request.prompt.contains("too HIGH"));
        assert!(request.prompt.contains("attempt number 1"));
        assert!(request.prompt.contains("Previous guesses: ."));
    }

    #[test]
    fn test_commentary_prompt_for_win() {
        let request = commentary_prompt(50, 50, 4, &[1, 2, 3, 4]);
        assert!(request.prompt.contains("WON"));
        assert!(request.prompt.contains("in 5 attempts"));
        assert!(!request.prompt.contains("too LOW"));
        assert!(!request.prompt.contains("too HIGH"));
    }

    #[test]
    fn test_hint_prompt() {
        let request = hint_prompt(37, &[50, 25]);
        assert!(request.prompt.contains("The target number is 37"));
        assert!(request.prompt.contains("already guessed: 50, 25."));
        assert!(request.prompt.contains("without revealing it directly"));
        assert_eq!(request.temperature, 0.9);
        assert_eq!(request.top_p, None);
    }

    #[test]
    fn test_mentions_number() {
        assert!(mentions_number("정답은 42입니다", 42));
        assert!(mentions_number("42", 42));
        assert!(mentions_number("(007)", 7));
        assert!(!mentions_number("142보다 작아요", 42));
        assert!(!mentions_number("4와 2", 42));
        assert!(!mentions_number("no digits here", 42));
    }

    #[test]
    fn test_response_slot_accepts_only_latest() {
        let mut slot = ResponseSlot::new();
        assert!(!slot.accepts(0));
        let first = slot.issue();
        assert!(slot.accepts(first));
        let second = slot.issue();
        assert!(!slot.accepts(first));
        assert!(slot.accepts(second));
        slot.invalidate();
        assert!(!slot.accepts(second));
    }

    #[tokio::test]
    async fn test_commentary_passes_model_text_through() {
        let model = ScriptedModel::new(Ok("  좋은 시도예요!  ".to_string()));
        let commentator = Commentator::new(model.clone());
        let text = commentator.request_commentary(30, 50, 0, &[]).await;
        assert_eq!(text, "좋은 시도예요!");
        assert_eq!(model.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commentary_failure_yields_fallback() {
        let model = ScriptedModel::new(Err(CommentaryError::Decode("boom".to_string())));
        let commentator = Commentator::new(model);
        let text = commentator.request_commentary(30, 50, 0, &[]).await;
        assert_eq!(text, COMMENTARY_FALLBACKS.failed);
        assert!(!text.is_empty());
    }

    #[tokio::test]
    async fn test_hint_failure_yields_fallback() {
        let model = ScriptedModel::new(Err(CommentaryError::Api {
            status: 503,
            body: "unavailable".to_string(),
        }));
        let commentator = Commentator::new(model);
        let text = commentator.request_hint(50, &[]).await;
        assert_eq!(text, HINT_FALLBACKS.failed);
    }

    #[tokio::test]
    async fn test_missing_key_fallbacks() {
        let commentator = Commentator::new(ScriptedModel::new(Err(CommentaryError::MissingApiKey)));
        assert_eq!(
            commentator.request_commentary(1, 2, 0, &[]).await,
            COMMENTARY_FALLBACKS.missing_key
        );
        let commentator = Commentator::new(ScriptedModel::new(Err(CommentaryError::MissingApiKey)));
        assert_eq!(commentator.request_hint(2, &[]).await, HINT_FALLBACKS.missing_key);
    }

    #[tokio::test]
    async fn test_blank_reply_yields_empty_fallback() {
        let commentator = Commentator::new(ScriptedModel::new(Ok("   \n".to_string())));
        assert_eq!(
            commentator.request_commentary(10, 20, 0, &[]).await,
            COMMENTARY_FALLBACKS.empty
        );
        let commentator = Commentator::new(ScriptedModel::new(Ok(String::new())));
        assert_eq!(commentator.request_hint(20, &[]).await, HINT_FALLBACKS.empty);
    }

    #[tokio::test]
    async fn test_leaked_target_is_replaced() {
        let commentator = Commentator::new(ScriptedModel::new(Ok("정답은 64야!".to_string())));
        assert_eq!(commentator.request_hint(64, &[]).await, HINT_FALLBACKS.empty);

        let commentator = Commentator::new(ScriptedModel::new(Ok("64에 가까워요".to_string())));
        assert_eq!(
            commentator.request_commentary(60, 64, 0, &[]).await,
            COMMENTARY_FALLBACKS.empty
        );
    }

    #[tokio::test]
    async fn test_winning_commentary_may_name_the_number() {
        let commentator = Commentator::new(ScriptedModel::new(Ok("64 정답! 축하해요!".to_string())));
        let text = commentator.request_commentary(64, 64, 3, &[1, 2, 3]).await;
        assert_eq!(text, "64 정답! 축하해요!");
    }

    #[tokio::test]
    async fn test_echoed_prompt_threshold_is_replaced_when_it_equals_target() {
        let reply = format!("아직 {FAR_DISTANCE} 넘게 차이나요!");
        let commentator = Commentator::new(ScriptedModel::new(Ok(reply.clone())));
        assert_eq!(
            commentator
                .request_commentary(90, FAR_DISTANCE, 0, &[])
                .await,
            COMMENTARY_FALLBACKS.empty
        );

        let commentator = Commentator::new(ScriptedModel::new(Ok(reply.clone())));
        assert_eq!(commentator.request_commentary(90, 20, 0, &[]).await, reply);
    }
}
