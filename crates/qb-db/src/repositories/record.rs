use sqlx::{Executor, Sqlite};

use crate::models::{LearningRecord, NewLearningRecord};

/// Append a record and return its id.
pub async fn insert<'e, E>(executor: E, record: &NewLearningRecord) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        // language=SQLite
        r#"
            INSERT INTO learning_records (question_id, bank_id, user_answer, is_correct, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&record.question_id)
    .bind(&record.bank_id)
    .bind(&record.user_answer)
    .bind(record.is_correct)
    .bind(record.timestamp)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Records of a bank, newest first.
pub async fn list_by_bank<'e, E>(
    executor: E,
    bank_id: &str,
) -> Result<Vec<LearningRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as(
        // language=SQLite
        r#"
            SELECT id, question_id, bank_id, user_answer, is_correct, timestamp
            FROM learning_records
            WHERE bank_id = ?1
            ORDER BY timestamp DESC, id DESC
        "#,
    )
    .bind(bank_id)
    .fetch_all(executor)
    .await
}

pub async fn delete_by_bank<'e, E>(executor: E, bank_id: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        // language=SQLite
        r#"
            DELETE FROM learning_records
            WHERE bank_id = ?1
        "#,
    )
    .bind(bank_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
