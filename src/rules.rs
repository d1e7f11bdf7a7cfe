use crate::error::ValidationError;
use rand::Rng;

pub const MIN_VALUE: u8 = 1;
pub const MAX_VALUE: u8 = 100;

/// Result of comparing a guess with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Guess is above the target; the player must go lower.
    TooHigh,
    /// Guess is below the target; the player must go higher.
    TooLow,
    Correct,
}

impl Outcome {
    /// Short label shown next to a guess in the history.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::TooHigh => "낮춰주세요",
            Self::TooLow => "높여주세요",
            Self::Correct => "정답",
        }
    }

    /// Status line for a guess with this outcome.
    #[must_use]
    pub fn status_message(self, guess: u8) -> String {
        match self {
            Self::TooHigh => format!("{guess}보다 작습니다!"),
            Self::TooLow => format!("{guess}보다 큽니다!"),
            Self::Correct => format!("축하합니다! 정답은 {guess}이었습니다!"),
        }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        self == Self::Correct
    }
}

#[must_use]
pub fn evaluate(guess: u8, target: u8) -> Outcome {
    match guess.cmp(&target) {
        std::cmp::Ordering::Greater => Outcome::TooHigh,
        std::cmp::Ordering::Less => Outcome::TooLow,
        std::cmp::Ordering::Equal => Outcome::Correct,
    }
}

/// Parse raw player input into a guess in `MIN_VALUE..=MAX_VALUE`.
pub fn parse_guess(raw: &str) -> Result<u8, ValidationError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    check_range(value)
}

pub(crate) fn check_range(value: i64) -> Result<u8, ValidationError> {
    if (i64::from(MIN_VALUE)..=i64::from(MAX_VALUE)).contains(&value) {
        u8::try_from(value).map_err(|_| ValidationError::OutOfRange(value))
    } else {
        Err(ValidationError::OutOfRange(value))
    }
}

/// Draw a target uniformly from `MIN_VALUE..=MAX_VALUE`.
pub fn random_target<R: Rng>(rng: &mut R) -> u8 {
    rng.random_range(MIN_VALUE..=MAX_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_evaluate_matches_ordering_for_every_pair() {
        for target in MIN_VALUE..=MAX_VALUE {
            for guess in MIN_VALUE..=MAX_VALUE {
                let outcome = evaluate(guess, target);
                assert_eq!(outcome == Outcome::Correct, guess == target);
                assert_eq!(outcome == Outcome::TooHigh, guess > target);
                assert_eq!(outcome == Outcome::TooLow, guess < target);
            }
        }
    }

    #[test]
    fn test_evaluate_boundaries() {
        assert_eq!(evaluate(1, 100), Outcome::TooLow);
        assert_eq!(evaluate(100, 1), Outcome::TooHigh);
        assert_eq!(evaluate(1, 1), Outcome::Correct);
        assert_eq!(evaluate(100, 100), Outcome::Correct);
    }

    #[test]
    fn test_parse_guess_accepts_range() {
        assert_eq!(parse_guess("1"), Ok(1));
        assert_eq!(parse_guess("100"), Ok(100));
        assert_eq!(parse_guess("  42\n"), Ok(42));
        assert_eq!(parse_guess("+7"), Ok(7));
    }

    #[test]
    fn test_parse_guess_rejects_out_of_range() {
        assert_eq!(parse_guess("0"), Err(ValidationError::OutOfRange(0)));
        assert_eq!(parse_guess("150"), Err(ValidationError::OutOfRange(150)));
        assert_eq!(parse_guess("-3"), Err(ValidationError::OutOfRange(-3)));
    }

    #[test]
    fn test_parse_guess_rejects_non_numbers() {
        assert!(matches!(parse_guess("abc"), Err(ValidationError::NotANumber(_))));
        assert!(matches!(parse_guess(""), Err(ValidationError::NotANumber(_))));
        assert!(matches!(parse_guess("   "), Err(ValidationError::NotANumber(_))));
        assert!(matches!(parse_guess("12abc"), Err(ValidationError::NotANumber(_))));
        assert!(matches!(parse_guess("50.5"), Err(ValidationError::NotANumber(_))));
        assert!(matches!(
            parse_guess("99999999999999999999999"),
            Err(ValidationError::NotANumber(_))
        ));
    }

    #[test]
    fn test_validation_messages_are_korean() {
        assert!(parse_guess("abc").unwrap_err().to_string().contains("정수가 아닙니다"));
        assert!(parse_guess("150").unwrap_err().to_string().contains("1-100 범위"));
    }

    #[test]
    fn test_random_target_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let target = random_target(&mut rng);
            assert!((MIN_VALUE..=MAX_VALUE).contains(&target));
        }
    }

    #[test]
    fn test_random_target_reaches_both_ends() {
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<u8> = (0..5000).map(|_| random_target(&mut rng)).collect();
        assert!(draws.contains(&MIN_VALUE));
        assert!(draws.contains(&MAX_VALUE));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::TooHigh.label(), "낮춰주세요");
        assert_eq!(Outcome::TooLow.label(), "높여주세요");
        assert_eq!(Outcome::Correct.label(), "정답");
        assert_eq!(Outcome::TooHigh.status_message(75), "75보다 작습니다!");
        assert_eq!(Outcome::TooLow.status_message(25), "25보다 큽니다!");
        assert!(Outcome::Correct.status_message(50).contains("50"));
        assert!(Outcome::Correct.is_correct());
        assert!(!Outcome::TooLow.is_correct());
    }
}
