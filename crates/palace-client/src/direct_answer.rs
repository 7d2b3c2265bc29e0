//! Best-effort "direct answer" for date questions.
//!
//! Only English month names are recognised. The result is a literal slice of
//! the top hit's text and is not authoritative.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::models::Memory;

pub const DIRECT_ANSWER_MIN_SCORE: f64 = 0.80;

const DATE_QUESTION_MARKER: &str = "when is";

static MONTH_DAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2}(?:st|nd|rd|th)?\b",
    )
    .expect("month/day pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectAnswer {
    pub text: String,
    pub source_memory_id: Uuid,
}

/// `results` must be in backend ranking order; only the first entry is used.
pub fn extract_direct_answer(query: &str, results: &[Memory]) -> Option<DirectAnswer> {
    if !query.to_lowercase().contains(DATE_QUESTION_MARKER) {
        return None;
    }

    let top = results.first()?;
    let score = top.similarity_score?;
    if score <= DIRECT_ANSWER_MIN_SCORE {
        return None;
    }

    MONTH_DAY_PATTERN
        .find(&top.content)
        .map(|found| DirectAnswer {
            text: found.as_str().to_string(),
            source_memory_id: top.id,
        })
}
