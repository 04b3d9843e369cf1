use sqlx::{Executor, Sqlite};

use crate::models::Bank;

/// All banks, most recently imported first.
pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Bank>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as(
        // language=SQLite
        r#"
            SELECT id, name, total_count, completed_count, correct_count, last_position, import_time
            FROM question_banks
            ORDER BY import_time DESC, id
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_by_id<'e, E>(executor: E, bank_id: &str) -> Result<Option<Bank>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as(
        // language=SQLite
        r#"
            SELECT id, name, total_count, completed_count, correct_count, last_position, import_time
            FROM question_banks
            WHERE id = ?1
        "#,
    )
    .bind(bank_id)
    .fetch_optional(executor)
    .await
}

pub async fn count<'e, E>(executor: E) -> Result<u32, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        // language=SQLite
        r#"
            SELECT COUNT(*) FROM question_banks
        "#,
    )
    .fetch_one(executor)
    .await
}

pub async fn upsert<'e, E>(executor: E, bank: &Bank) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        // language=SQLite
        r#"
            INSERT INTO question_banks (
                id, name, total_count, completed_count, correct_count, last_position, import_time
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id)
            DO UPDATE SET
                name = ?2,
                total_count = ?3,
                completed_count = ?4,
                correct_count = ?5,
                last_position = ?6,
                import_time = ?7
        "#,
    )
    .bind(&bank.id)
    .bind(&bank.name)
    .bind(bank.total_count)
    .bind(bank.completed_count)
    .bind(bank.correct_count)
    .bind(bank.last_position)
    .bind(bank.import_time)
    .execute(executor)
    .await?;
    Ok(())
}

/// Write the derived progress counters. Returns false when the bank does not exist.
pub async fn update_counts<'e, E>(
    executor: E,
    bank_id: &str,
    completed_count: u32,
    correct_count: u32,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        // language=SQLite
        r#"
            UPDATE question_banks
            SET completed_count = ?2,
                correct_count = ?3
            WHERE id = ?1
        "#,
    )
    .bind(bank_id)
    .bind(completed_count)
    .bind(correct_count)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Save the session position. Returns false when the bank does not exist.
pub async fn update_last_position<'e, E>(
    executor: E,
    bank_id: &str,
    last_position: u32,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        // language=SQLite
        r#"
            UPDATE question_banks
            SET last_position = ?2
            WHERE id = ?1
        "#,
    )
    .bind(bank_id)
    .bind(last_position)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, bank_id: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        // language=SQLite
        r#"
            DELETE FROM question_banks
            WHERE id = ?1
        "#,
    )
    .bind(bank_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
