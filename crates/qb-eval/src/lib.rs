//! Answer evaluation library for Quizbank
//!
//! This crate provides the grading rule for choice questions and the retention
//! rule that decides whether a question stays in the learner's wrong set.
//! Everything here is pure: persistence lives in `qb-db` and `qb-core`.

use std::collections::BTreeSet;

/// Consecutive correct answers needed before a question leaves the wrong set.
pub const WRONG_SET_EXIT_STREAK: u32 = 3;

/// Retention state of a single question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Retention {
    /// Whether the question is currently in the wrong set
    pub is_wrong: bool,
    /// Consecutive correct submissions
    pub correct_streak: u32,
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Whether the submitted tag set equals the canonical answer
    pub is_correct: bool,
    /// Retention state after applying this submission
    pub retention: Retention,
}

/// Split a comma-joined answer into its set of option tags.
///
/// Tags are trimmed and blank entries dropped. Tags stay case-sensitive:
/// `"a"` and `"A"` are different options.
///
/// # Arguments
///
/// * `answer` - A comma-joined tag list such as `"A,C"`
///
/// # Returns
///
/// The ordered, de-duplicated set of tags
pub fn parse_tags(answer: &str) -> BTreeSet<&str> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Build the canonical comma-joined form of a tag selection.
///
/// The result is sorted and free of duplicates and blanks, so two selections
/// holding the same tags always produce the same string.
pub fn canonical_answer<I, S>(tags: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let owned: Vec<S> = tags.into_iter().collect();
    let set: BTreeSet<&str> = owned
        .iter()
        .map(|tag| tag.as_ref().trim())
        .filter(|tag| !tag.is_empty())
        .collect();

    set.into_iter().collect::<Vec<_>>().join(",")
}

/// Grade a submission against the canonical answer.
///
/// Comparison is set equality: order and repeated tags are ignored. Tags that
/// are not part of the question's options never match anything.
pub fn is_answer_correct(answer: &str, user_answer: &str) -> bool {
    parse_tags(answer) == parse_tags(user_answer)
}

/// Compute the retention state after a graded submission.
///
/// # Arguments
///
/// * `current` - Retention state before the submission
/// * `is_correct` - Result of grading the submission
///
/// # Algorithm
///
/// * Correct answers extend the streak, incorrect answers reset it to zero
/// * An incorrect answer always puts the question (back) into the wrong set
/// * A question in the wrong set only leaves it once the streak reaches
///   [`WRONG_SET_EXIT_STREAK`]
/// * A question outside the wrong set that is answered correctly stays out
pub fn next_retention(current: Retention, is_correct: bool) -> Retention {
    let correct_streak = if is_correct {
        current.correct_streak.saturating_add(1)
    } else {
        0
    };

    let leaves_wrong_set = current.is_wrong && correct_streak >= WRONG_SET_EXIT_STREAK;

    let is_wrong = if leaves_wrong_set {
        false
    } else {
        current.is_wrong || !is_correct
    };

    Retention {
        is_wrong,
        correct_streak,
    }
}

/// Grade a submission and derive the next retention state in one step.
pub fn evaluate(answer: &str, current: Retention, user_answer: &str) -> Evaluation {
    let is_correct = is_answer_correct(answer, user_answer);

    Evaluation {
        is_correct,
        retention: next_retention(current, is_correct),
    }
}
