use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::watch;

use crate::{
    live::{self, LiveSequence},
    models::{Bank, LearningRecord, NewLearningRecord, Question, QuestionFilter},
    repositories::{bank, question, record},
};

/// Storage handle shared by everything that reads or writes banks.
///
/// Cloning is cheap: clones share the pool and the change counter. Every
/// committed mutation bumps the counter so live sequences can refresh.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    changes: Arc<watch::Sender<u64>>,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            pool,
            changes: Arc::new(changes),
        }
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }

    // --- Banks ---

    /// One-shot snapshot of all banks, newest import first.
    pub async fn list_banks(&self) -> Result<Vec<Bank>, sqlx::Error> {
        bank::list_all(&self.pool).await
    }

    /// Bank list that is re-delivered after every change.
    pub async fn watch_banks(&self) -> Result<LiveSequence<Bank>, sqlx::Error> {
        let pool = self.pool.clone();
        live::spawn(self.changes.subscribe(), move || {
            let pool = pool.clone();
            async move { bank::list_all(&pool).await }
        })
        .await
    }

    pub async fn get_bank(&self, bank_id: &str) -> Result<Option<Bank>, sqlx::Error> {
        bank::get_by_id(&self.pool, bank_id).await
    }

    pub async fn upsert_bank(&self, value: &Bank) -> Result<(), sqlx::Error> {
        bank::upsert(&self.pool, value).await?;
        self.notify();
        Ok(())
    }

    pub async fn update_bank_counts(
        &self,
        bank_id: &str,
        completed_count: u32,
        correct_count: u32,
    ) -> Result<bool, sqlx::Error> {
        let updated =
            bank::update_counts(&self.pool, bank_id, completed_count, correct_count).await?;
        if updated {
            self.notify();
        }
        Ok(updated)
    }

    pub async fn update_last_position(
        &self,
        bank_id: &str,
        last_position: u32,
    ) -> Result<bool, sqlx::Error> {
        let updated = bank::update_last_position(&self.pool, bank_id, last_position).await?;
        if updated {
            self.notify();
        }
        Ok(updated)
    }

    /// Delete a bank together with its questions and learning records.
    pub async fn delete_bank(&self, bank_id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        record::delete_by_bank(&mut *tx, bank_id).await?;
        question::delete_by_bank(&mut *tx, bank_id).await?;
        let deleted = bank::delete(&mut *tx, bank_id).await?;

        tx.commit().await?;
        self.notify();
        Ok(deleted)
    }

    /// Insert a bank and all of its questions atomically.
    pub async fn insert_bank_with_questions(
        &self,
        value: &Bank,
        questions: &[Question],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        bank::upsert(&mut *tx, value).await?;
        question::insert_many(&mut *tx, questions).await?;

        tx.commit().await?;
        self.notify();
        Ok(())
    }

    /// Insert a bank and its questions only if no bank exists yet.
    ///
    /// The transaction takes the write lock before the emptiness check, so
    /// concurrent callers run one after the other and all but the first skip.
    /// Returns false when the insert was skipped.
    pub async fn insert_first_bank(
        &self,
        value: &Bank,
        questions: &[Question],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        if bank::count(&mut *tx).await? > 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        bank::upsert(&mut *tx, value).await?;
        question::insert_many(&mut *tx, questions).await?;

        tx.commit().await?;
        self.notify();
        Ok(true)
    }

    // --- Questions ---

    /// One-shot snapshot of a bank's questions.
    pub async fn list_questions(
        &self,
        bank_id: &str,
        filter: QuestionFilter,
    ) -> Result<Vec<Question>, sqlx::Error> {
        question::list_by_bank(&self.pool, bank_id, filter).await
    }

    /// Question list that is re-delivered after every change.
    pub async fn watch_questions(
        &self,
        bank_id: &str,
        filter: QuestionFilter,
    ) -> Result<LiveSequence<Question>, sqlx::Error> {
        let pool = self.pool.clone();
        let bank_id = bank_id.to_string();
        live::spawn(self.changes.subscribe(), move || {
            let pool = pool.clone();
            let bank_id = bank_id.clone();
            async move { question::list_by_bank(&pool, &bank_id, filter).await }
        })
        .await
    }

    pub async fn get_question(&self, question_id: &str) -> Result<Option<Question>, sqlx::Error> {
        question::get_by_id(&self.pool, question_id).await
    }

    pub async fn bulk_insert_questions(&self, questions: &[Question]) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let inserted = question::insert_many(&mut *tx, questions).await?;
        tx.commit().await?;
        self.notify();
        Ok(inserted)
    }

    /// Write the full learner state of a question.
    pub async fn update_question(&self, value: &Question) -> Result<bool, sqlx::Error> {
        let updated = question::update_learner_state(&self.pool, value).await?;
        if updated {
            self.notify();
        }
        Ok(updated)
    }

    pub async fn count_completed(&self, bank_id: &str) -> Result<u32, sqlx::Error> {
        question::count_completed(&self.pool, bank_id).await
    }

    pub async fn count_correct(&self, bank_id: &str) -> Result<u32, sqlx::Error> {
        question::count_correct(&self.pool, bank_id).await
    }

    // --- Learning records ---

    pub async fn insert_learning_record(
        &self,
        value: &NewLearningRecord,
    ) -> Result<i64, sqlx::Error> {
        let id = record::insert(&self.pool, value).await?;
        self.notify();
        Ok(id)
    }

    /// Learning records of a bank, newest first.
    pub async fn list_records(&self, bank_id: &str) -> Result<Vec<LearningRecord>, sqlx::Error> {
        record::list_by_bank(&self.pool, bank_id).await
    }

    pub async fn delete_records_for_bank(&self, bank_id: &str) -> Result<u64, sqlx::Error> {
        let deleted = record::delete_by_bank(&self.pool, bank_id).await?;
        self.notify();
        Ok(deleted)
    }

    /// Save a question's learner state and append its learning record atomically.
    pub async fn record_answer(
        &self,
        value: &Question,
        entry: &NewLearningRecord,
    ) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        question::update_learner_state(&mut *tx, value).await?;
        let record_id = record::insert(&mut *tx, entry).await?;

        tx.commit().await?;
        self.notify();
        Ok(record_id)
    }
}
