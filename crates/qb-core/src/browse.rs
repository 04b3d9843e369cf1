//! Read-side helpers over a list of questions.

use qb_db::models::Question;
use serde::Serialize;

/// Progress counters over a set of questions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestionStats {
    pub total: usize,
    pub completed: usize,
    pub correct: usize,
    /// Questions currently in the wrong set
    pub wrong: usize,
}

impl QuestionStats {
    pub fn of(questions: &[Question]) -> Self {
        questions.iter().fold(Self::default(), |mut stats, question| {
            stats.total += 1;
            if question.is_completed {
                stats.completed += 1;
            }
            if question.is_correct == Some(true) {
                stats.correct += 1;
            }
            if question.is_wrong {
                stats.wrong += 1;
            }
            stats
        })
    }
}

/// Indices of questions whose stem contains `query`, ignoring case.
///
/// A blank query matches nothing.
pub fn search(questions: &[Question], query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    questions
        .iter()
        .enumerate()
        .filter(|(_, question)| question.stem.to_lowercase().contains(&needle))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use qb_db::models::QuestionKind;

    use super::*;

    fn question(stem: &str) -> Question {
        Question {
            id: format!("bank_1_{stem}"),
            bank_id: "bank_1".into(),
            stem: stem.into(),
            kind: QuestionKind::SingleChoice,
            answer: "A".into(),
            options_json: "[]".into(),
            explanation: String::new(),
            is_favorite: false,
            is_wrong: false,
            is_completed: false,
            user_answer: String::new(),
            is_correct: None,
            correct_streak: 0,
        }
    }

    #[test]
    fn test_search_ignores_case() {
        let questions = vec![
            question("Capital of France"),
            question("Largest ocean"),
            question("capital of Peru"),
        ];

        assert_eq!(search(&questions, "CAPITAL"), vec![0, 2]);
        assert_eq!(search(&questions, "ocean"), vec![1]);
        assert!(search(&questions, "desert").is_empty());
        assert!(search(&questions, "  ").is_empty());
    }

    #[test]
    fn test_stats_counts() {
        let mut answered = question("a");
        answered.is_completed = true;
        answered.is_correct = Some(true);

        let mut missed = question("b");
        missed.is_completed = true;
        missed.is_correct = Some(false);
        missed.is_wrong = true;

        let stats = QuestionStats::of(&[answered, missed, question("c")]);
        assert_eq!(
            stats,
            QuestionStats {
                total: 3,
                completed: 2,
                correct: 1,
                wrong: 1,
            }
        );
    }
}
