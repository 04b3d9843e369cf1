use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Question type, stored as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum QuestionKind {
    /// Exactly one option is correct
    SingleChoice = 1,
    /// One or more options are correct
    MultipleChoice = 2,
    /// Two options, true or false
    TrueFalse = 3,
}

impl QuestionKind {
    /// Map the integer code used by question documents.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::SingleChoice),
            2 => Some(Self::MultipleChoice),
            3 => Some(Self::TrueFalse),
            _ => None,
        }
    }

    /// Integer code used by question documents and the database
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Whether several options may be selected at once
    pub const fn allows_multiple(self) -> bool {
        matches!(self, Self::MultipleChoice)
    }
}

/// One answer option of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option tag (A, B, C, D...)
    pub tag: String,
    /// Option text
    pub value: String,
}

/// Serialize options into the portable `options_json` column format.
pub fn encode_options(options: &[QuestionOption]) -> Result<String, serde_json::Error> {
    serde_json::to_string(options)
}

/// Question model - immutable content plus the learner's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    /// Unique question identifier (`{bank_id}_{original_id}`)
    pub id: String,
    /// Bank this question belongs to
    pub bank_id: String,
    /// Question text
    pub stem: String,
    /// Question type
    pub kind: QuestionKind,
    /// Canonical correct answer, comma-joined option tags (e.g. "A" or "A,C")
    pub answer: String,
    /// Options serialized as a JSON array of `{tag, value}`
    pub options_json: String,
    /// Explanation shown after answering
    pub explanation: String,
    /// Marked as favorite by the learner
    pub is_favorite: bool,
    /// Currently in the wrong set
    pub is_wrong: bool,
    /// Answered at least once
    pub is_completed: bool,
    /// Last submitted answer, comma-joined tags
    pub user_answer: String,
    /// Result of the last submission, `None` while unanswered
    pub is_correct: Option<bool>,
    /// Consecutive correct answers while in the wrong set
    pub correct_streak: u32,
}

impl Question {
    /// Decode the ordered option list.
    pub fn options(&self) -> Result<Vec<QuestionOption>, serde_json::Error> {
        serde_json::from_str(&self.options_json)
    }

    pub const fn is_multiple_choice(&self) -> bool {
        self.kind.allows_multiple()
    }

    /// Tags of the canonical answer, trimmed and without blanks.
    pub fn answer_tags(&self) -> impl Iterator<Item = &str> {
        self.answer.split(',').map(str::trim).filter(|tag| !tag.is_empty())
    }
}

/// Bank model - a set of questions imported together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Bank {
    /// Unique bank identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Number of questions, fixed at import
    pub total_count: u32,
    /// Questions answered at least once
    pub completed_count: u32,
    /// Questions whose last answer was correct
    pub correct_count: u32,
    /// Saved session index, clamped when read
    pub last_position: u32,
    /// When the bank was imported
    pub import_time: DateTime<Utc>,
}

impl Bank {
    /// Create a freshly imported bank with zeroed progress.
    pub fn new(id: impl Into<String>, name: impl Into<String>, total_count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            total_count,
            completed_count: 0,
            correct_count: 0,
            last_position: 0,
            import_time: Utc::now(),
        }
    }

    /// Index to resume at in a sequence of `len` questions.
    ///
    /// Returns `None` for an empty sequence, otherwise the saved position
    /// clamped to the last question.
    pub fn resume_index(&self, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        let saved = usize::try_from(self.last_position).unwrap_or(usize::MAX);
        Some(saved.min(last))
    }
}

/// Learning record - one entry per answer submission
/// Append-only, removed only together with its bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LearningRecord {
    /// Monotonic identifier assigned by the database
    pub id: i64,
    /// Answered question
    pub question_id: String,
    /// Bank of the answered question
    pub bank_id: String,
    /// Raw submitted answer
    pub user_answer: String,
    /// Whether the submission was correct
    pub is_correct: bool,
    /// When the answer was submitted
    pub timestamp: DateTime<Utc>,
}

/// Insert shape for LearningRecord, the id is set by the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLearningRecord {
    pub question_id: String,
    pub bank_id: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl NewLearningRecord {
    /// Record a submission for `question` happening now.
    pub fn for_question(
        question: &Question,
        user_answer: impl Into<String>,
        is_correct: bool,
    ) -> Self {
        Self {
            question_id: question.id.clone(),
            bank_id: question.bank_id.clone(),
            user_answer: user_answer.into(),
            is_correct,
            timestamp: Utc::now(),
        }
    }
}

/// Which questions of a bank a query returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionFilter {
    /// Every question, in natural order
    #[default]
    All,
    /// Questions marked as favorite
    Favorites,
    /// Questions in the wrong set
    Wrong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_kind_codes() {
        assert_eq!(QuestionKind::from_code(1), Some(QuestionKind::SingleChoice));
        assert_eq!(QuestionKind::from_code(2), Some(QuestionKind::MultipleChoice));
        assert_eq!(QuestionKind::from_code(3), Some(QuestionKind::TrueFalse));
        assert_eq!(QuestionKind::from_code(0), None);
        assert_eq!(QuestionKind::from_code(4), None);
        assert_eq!(QuestionKind::TrueFalse.code(), 3);
        assert!(QuestionKind::MultipleChoice.allows_multiple());
        assert!(!QuestionKind::TrueFalse.allows_multiple());
    }

    #[test]
    fn test_options_keep_source_order() {
        let options = vec![
            QuestionOption {
                tag: "B".into(),
                value: "second".into(),
            },
            QuestionOption {
                tag: "A".into(),
                value: "first, with \"quotes\"".into(),
            },
        ];
        let encoded = encode_options(&options).unwrap();
        let question = Question {
            id: "bank_1_q1".into(),
            bank_id: "bank_1".into(),
            stem: "stem".into(),
            kind: QuestionKind::SingleChoice,
            answer: "A".into(),
            options_json: encoded,
            explanation: String::new(),
            is_favorite: false,
            is_wrong: false,
            is_completed: false,
            user_answer: String::new(),
            is_correct: None,
            correct_streak: 0,
        };

        assert_eq!(question.options().unwrap(), options);

        let multi = Question {
            answer: " C, A ,,".into(),
            kind: QuestionKind::MultipleChoice,
            ..question
        };
        assert_eq!(multi.answer_tags().collect::<Vec<_>>(), ["C", "A"]);
        assert!(multi.is_multiple_choice());
    }

    #[test]
    fn test_resume_index_clamps() {
        let mut bank = Bank::new("bank_1", "Bank", 10);
        bank.last_position = 5;

        assert_eq!(bank.resume_index(10), Some(5));
        assert_eq!(bank.resume_index(3), Some(2));
        assert_eq!(bank.resume_index(0), None);

        bank.last_position = 0;
        assert_eq!(bank.resume_index(1), Some(0));
    }
}
