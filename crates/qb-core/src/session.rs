//! Study sessions.
//!
//! A session owns a working copy of a bank's questions (or of a filtered
//! subset), the current position and the answer state of the current
//! question. The working copy is a one-shot snapshot taken at load time:
//! changes made elsewhere never reorder or shrink it underneath the learner.
//!
//! State machine:
//!
//! ```text
//! no session --load_bank / load_filtered--> browsing(i, revealed = persisted state of i)
//! browsing(i, false) --toggle_answer_tag* , submit--> browsing(i, true)
//! browsing(i, _) --advance / jump_to--> browsing(j, revealed = persisted state of j)
//! browsing --close--> no session
//! ```

use std::collections::BTreeSet;

use qb_db::models::{Question, QuestionFilter, QuestionOption};
use qb_eval::{canonical_answer, parse_tags};
use rand::seq::SliceRandom;

use crate::{
    AppState,
    browse::{self, QuestionStats},
    error::CoreError,
    evaluate::apply_answer,
};

/// Order in which a session presents its questions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderingMode {
    /// Natural (import) order
    #[default]
    Sequential,
    /// One shuffle per load, kept while navigating
    Random,
}

/// How questions are worked through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StudyMode {
    /// Select, submit, get graded
    #[default]
    Practice,
    /// Answer shown straight away, nothing is graded
    Memorize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Bank(String),
    Filtered { bank_id: String, filter: QuestionFilter },
}

impl Scope {
    fn bank_id(&self) -> &str {
        match self {
            Self::Bank(bank_id) | Self::Filtered { bank_id, .. } => bank_id,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    state: AppState,
    scope: Option<Scope>,
    questions: Vec<Question>,
    index: usize,
    ordering: OrderingMode,
    study: StudyMode,
    selected: BTreeSet<String>,
    revealed: bool,
    last_evaluation: Option<bool>,
}

impl Session {
    /// Create a session with nothing loaded.
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            scope: None,
            questions: Vec::new(),
            index: 0,
            ordering: OrderingMode::default(),
            study: StudyMode::default(),
            selected: BTreeSet::new(),
            revealed: false,
            last_evaluation: None,
        }
    }

    // --- Loading ---

    /// Load every question of a bank and resume at its saved position.
    ///
    /// On failure the previously loaded session is left as it was.
    pub async fn load_bank(&mut self, bank_id: &str) -> Result<(), CoreError> {
        self.persist_position();
        // Queued position writes must land before the saved position is read
        self.state.writes.flush().await;

        let bank = self
            .state
            .store
            .get_bank(bank_id)
            .await?
            .ok_or_else(|| CoreError::bank_not_found(bank_id))?;
        let mut questions = self
            .state
            .store
            .list_questions(bank_id, QuestionFilter::All)
            .await?;

        self.apply_ordering(&mut questions);
        let index = bank.resume_index(questions.len()).unwrap_or(0);

        tracing::info!(
            bank_id,
            questions = questions.len(),
            index,
            ordering = ?self.ordering,
            "Loaded study session"
        );

        self.install(Scope::Bank(bank.id), questions, index);
        Ok(())
    }

    /// Load the favorite or wrong questions of a bank, starting at the first one.
    ///
    /// Filtered sessions never save their position.
    pub async fn load_filtered(
        &mut self,
        bank_id: &str,
        filter: QuestionFilter,
    ) -> Result<(), CoreError> {
        self.persist_position();
        self.state.writes.flush().await;

        if self.state.store.get_bank(bank_id).await?.is_none() {
            return Err(CoreError::bank_not_found(bank_id));
        }
        let mut questions = self.state.store.list_questions(bank_id, filter).await?;
        self.apply_ordering(&mut questions);

        tracing::info!(
            bank_id,
            ?filter,
            questions = questions.len(),
            "Loaded filtered study session"
        );

        self.install(
            Scope::Filtered {
                bank_id: bank_id.to_string(),
                filter,
            },
            questions,
            0,
        );
        Ok(())
    }

    fn apply_ordering(&self, questions: &mut [Question]) {
        if self.ordering == OrderingMode::Random {
            questions.shuffle(&mut rand::thread_rng());
        }
    }

    fn install(&mut self, scope: Scope, questions: Vec<Question>, index: usize) {
        self.scope = Some(scope);
        self.questions = questions;
        self.index = index;
        self.restore_current();
    }

    /// Seed the answer state of the current question from its learner state.
    fn restore_current(&mut self) {
        self.selected.clear();
        self.revealed = false;
        self.last_evaluation = None;

        let Some(question) = self.questions.get(self.index) else {
            return;
        };

        match self.study {
            StudyMode::Memorize => {
                self.selected = question.answer_tags().map(str::to_string).collect();
                self.revealed = true;
            }
            StudyMode::Practice if question.is_completed => {
                self.selected = owned_tags(&question.user_answer);
                self.revealed = true;
                self.last_evaluation = question.is_correct;
            }
            StudyMode::Practice => {}
        }
    }

    // --- Answering ---

    /// Select or deselect an option of the current question.
    ///
    /// Single-choice and true/false questions keep exactly one selected tag;
    /// multiple-choice questions flip the tag. Ignored once the answer is revealed.
    pub fn toggle_answer_tag(&mut self, tag: &str) {
        if self.revealed || self.study == StudyMode::Memorize {
            return;
        }
        let multiple = match self.current_question() {
            Some(question) => question.is_multiple_choice(),
            None => return,
        };

        if multiple {
            if !self.selected.remove(tag) {
                self.selected.insert(tag.to_string());
            }
        } else {
            self.selected.clear();
            self.selected.insert(tag.to_string());
        }
    }

    /// Grade the current selection and reveal the answer.
    ///
    /// Returns `None` without doing anything when there is no current
    /// question, nothing is selected, the answer is already revealed or the
    /// session is in memorize mode. Storage failures are logged and also
    /// return `None`, leaving the session unchanged.
    pub async fn submit(&mut self) -> Option<bool> {
        if self.study == StudyMode::Memorize || self.revealed {
            return None;
        }
        if self.selected.is_empty() {
            tracing::debug!("Submit ignored: nothing selected");
            return None;
        }
        let question = self.questions.get(self.index)?;

        let outcome = apply_answer(question, &canonical_answer(&self.selected));
        let is_correct = outcome.is_correct;
        let updated = outcome.question.clone();

        if let Err(e) = self.state.writes.record_answer(outcome).await {
            tracing::error!(question_id = %updated.id, "Answer not saved: {e}");
            return None;
        }

        self.questions[self.index] = updated;
        self.revealed = true;
        self.last_evaluation = Some(is_correct);
        Some(is_correct)
    }

    // --- Navigation ---

    /// Move one question forward or back. No-op at either end.
    pub fn advance(&mut self, direction: Direction) -> bool {
        let target = match direction {
            Direction::Next => self
                .index
                .checked_add(1)
                .filter(|next| *next < self.questions.len()),
            Direction::Previous => self.index.checked_sub(1),
        };

        match target {
            Some(target) if target < self.questions.len() => {
                self.move_to(target);
                true
            }
            _ => false,
        }
    }

    /// Move to any question of the session. No-op when out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.questions.len() {
            return false;
        }
        self.move_to(index);
        true
    }

    fn move_to(&mut self, index: usize) {
        self.index = index;
        self.restore_current();
        self.persist_position();
    }

    /// Queue the current index as the bank's saved position (bank sessions only).
    fn persist_position(&self) {
        if let Some(Scope::Bank(bank_id)) = &self.scope {
            let position = u32::try_from(self.index).unwrap_or(u32::MAX);
            self.state.writes.save_position(bank_id, position);
        }
    }

    // --- Favorites and modes ---

    /// Flip the favorite flag of the current question.
    ///
    /// The working copy changes immediately; the write happens in the background.
    /// Returns the new flag, or `None` when there is no current question.
    pub fn toggle_favorite(&mut self) -> Option<bool> {
        let question = self.questions.get_mut(self.index)?;
        question.is_favorite = !question.is_favorite;

        let is_favorite = question.is_favorite;
        self.state.writes.save_question(question.clone());
        Some(is_favorite)
    }

    /// Change the ordering mode. A bank session is reloaded (and reshuffled).
    pub async fn set_ordering_mode(&mut self, mode: OrderingMode) -> Result<(), CoreError> {
        self.ordering = mode;

        if let Some(Scope::Bank(bank_id)) = self.scope.clone() {
            self.load_bank(&bank_id).await?;
        }
        Ok(())
    }

    /// Switch between practice and memorize for the current question onwards.
    pub fn set_study_mode(&mut self, mode: StudyMode) {
        self.study = mode;
        self.restore_current();
    }

    // --- Teardown ---

    /// Wait for queued writes to be applied.
    pub async fn flush(&self) {
        self.state.writes.flush().await;
    }

    /// End the session: save the position one final time and wait for all writes.
    pub async fn close(&mut self) {
        self.persist_position();
        self.state.writes.flush().await;

        self.scope = None;
        self.questions.clear();
        self.index = 0;
        self.restore_current();
    }

    // --- Accessors ---

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    /// Options of the current question in display order.
    pub fn current_options(&self) -> Vec<QuestionOption> {
        let Some(question) = self.current_question() else {
            return Vec::new();
        };
        question.options().unwrap_or_else(|e| {
            tracing::warn!(question_id = %question.id, "Unreadable options: {e}");
            Vec::new()
        })
    }

    pub const fn current_index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub const fn selected_tags(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn last_evaluation(&self) -> Option<bool> {
        self.last_evaluation
    }

    pub const fn ordering_mode(&self) -> OrderingMode {
        self.ordering
    }

    pub const fn study_mode(&self) -> StudyMode {
        self.study
    }

    pub const fn is_active(&self) -> bool {
        self.scope.is_some()
    }

    pub fn bank_id(&self) -> Option<&str> {
        self.scope.as_ref().map(Scope::bank_id)
    }

    pub fn filter(&self) -> Option<QuestionFilter> {
        match &self.scope {
            Some(Scope::Filtered { filter, .. }) => Some(*filter),
            _ => None,
        }
    }

    pub const fn is_filtered(&self) -> bool {
        matches!(self.scope, Some(Scope::Filtered { .. }))
    }

    pub const fn can_go_previous(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.index + 1 < self.questions.len()
    }

    /// Session indices of questions whose stem contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<usize> {
        browse::search(&self.questions, query)
    }

    /// Progress counters of the working copy.
    pub fn stats(&self) -> QuestionStats {
        QuestionStats::of(&self.questions)
    }
}

impl Drop for Session {
    // Teardown without `close`: the final position still gets queued
    fn drop(&mut self) {
        self.persist_position();
    }
}

fn owned_tags(answer: &str) -> BTreeSet<String> {
    parse_tags(answer).into_iter().map(str::to_string).collect()
}
