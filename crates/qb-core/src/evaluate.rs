//! Answer submission: grading, learner-state update and audit record.

use qb_db::{
    Store,
    models::{NewLearningRecord, Question},
};
use qb_eval::Retention;

use crate::{aggregate::recompute_bank_stats, error::CoreError};

/// Result of grading one submission, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    /// The question with its learner state updated
    pub question: Question,
    /// Audit entry for this submission
    pub record: NewLearningRecord,
}

/// Grade `user_answer` against `question` without touching storage.
///
/// The streak continues from the question's current state, so progress made
/// in earlier sessions carries over.
pub fn apply_answer(question: &Question, user_answer: &str) -> AnswerOutcome {
    let current = Retention {
        is_wrong: question.is_wrong,
        correct_streak: question.correct_streak,
    };
    let evaluation = qb_eval::evaluate(&question.answer, current, user_answer);

    let mut updated = question.clone();
    updated.is_completed = true;
    updated.user_answer = user_answer.to_string();
    updated.is_correct = Some(evaluation.is_correct);
    updated.is_wrong = evaluation.retention.is_wrong;
    updated.correct_streak = evaluation.retention.correct_streak;

    AnswerOutcome {
        is_correct: evaluation.is_correct,
        record: NewLearningRecord::for_question(question, user_answer, evaluation.is_correct),
        question: updated,
    }
}

/// Persist a graded submission and refresh the bank counters.
///
/// Succeeds once the question row and its record are committed. The counters
/// are derived data: a failed refresh is logged and corrected by the next one.
pub async fn persist_answer(store: &Store, outcome: &AnswerOutcome) -> Result<(), CoreError> {
    // Single transaction for the question row and its audit record
    store.record_answer(&outcome.question, &outcome.record).await?;

    let bank_id = &outcome.question.bank_id;
    if let Err(e) = recompute_bank_stats(store, bank_id).await {
        tracing::error!(bank_id, "Answer saved but bank counters not refreshed: {e}");
    }

    Ok(())
}

/// Grade and persist a submission in one call.
pub async fn submit_answer(
    store: &Store,
    question: &Question,
    user_answer: &str,
) -> Result<AnswerOutcome, CoreError> {
    let outcome = apply_answer(question, user_answer);
    persist_answer(store, &outcome).await?;

    tracing::debug!(
        question_id = %question.id,
        is_correct = outcome.is_correct,
        is_wrong = outcome.question.is_wrong,
        "Answer recorded"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use qb_db::models::QuestionKind;

    use super::*;

    fn question(answer: &str) -> Question {
        Question {
            id: "bank_1_q1".into(),
            bank_id: "bank_1".into(),
            stem: "Pick".into(),
            kind: QuestionKind::MultipleChoice,
            answer: answer.into(),
            options_json: "[]".into(),
            explanation: String::new(),
            is_favorite: true,
            is_wrong: false,
            is_completed: false,
            user_answer: String::new(),
            is_correct: None,
            correct_streak: 0,
        }
    }

    #[test]
    fn test_correct_answer_completes_question() {
        let outcome = apply_answer(&question("A,C"), "C,A");

        assert!(outcome.is_correct);
        assert!(outcome.question.is_completed);
        assert_eq!(outcome.question.user_answer, "C,A");
        assert_eq!(outcome.question.is_correct, Some(true));
        assert!(!outcome.question.is_wrong);
        assert_eq!(outcome.question.correct_streak, 1);
        // Favorite flag is untouched
        assert!(outcome.question.is_favorite);
    }

    #[test]
    fn test_record_keeps_raw_answer() {
        let outcome = apply_answer(&question("A"), "B");

        assert!(!outcome.is_correct);
        assert_eq!(outcome.record.question_id, "bank_1_q1");
        assert_eq!(outcome.record.bank_id, "bank_1");
        assert_eq!(outcome.record.user_answer, "B");
        assert!(!outcome.record.is_correct);
        assert!(outcome.question.is_wrong);
    }

    #[test]
    fn test_resubmission_continues_streak() {
        let mut q = question("A");
        q.is_wrong = true;
        q.correct_streak = 2;
        q.is_completed = true;
        q.user_answer = "A".into();
        q.is_correct = Some(true);

        let outcome = apply_answer(&q, "A");
        assert!(!outcome.question.is_wrong);
        assert_eq!(outcome.question.correct_streak, 3);
    }
}
