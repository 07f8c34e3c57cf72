use serde_json::Value;
use std::cmp::Ordering;

/// Result of comparing one guess against a game's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    TooLow,
    TooHigh,
    NotANumber,
}

impl GuessOutcome {
    /// Hint sent back to the guesser, or `None` when the guess won
    pub fn feedback(self) -> Option<&'static str> {
        match self {
            GuessOutcome::Correct => None,
            GuessOutcome::TooLow => Some("Try a greater number"),
            GuessOutcome::TooHigh => Some("Try a smaller number"),
            GuessOutcome::NotANumber => Some("Guess must be a whole number"),
        }
    }
}

/// Reads a guess sent either as a JSON integer or as text
pub fn parse_guess(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Compare a parsed guess with the answer
pub fn evaluate(guess: Option<i64>, answer: i64) -> GuessOutcome {
    match guess.map(|g| g.cmp(&answer)) {
        Some(Ordering::Equal) => GuessOutcome::Correct,
        Some(Ordering::Less) => GuessOutcome::TooLow,
        Some(Ordering::Greater) => GuessOutcome::TooHigh,
        None => GuessOutcome::NotANumber,
    }
}
