use sqlx::{Executor, Sqlite, SqliteConnection};

use crate::models::{Question, QuestionFilter};

/// Questions of a bank in natural (import) order, optionally filtered.
pub async fn list_by_bank<'e, E>(
    executor: E,
    bank_id: &str,
    filter: QuestionFilter,
) -> Result<Vec<Question>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = match filter {
        QuestionFilter::All => {
            // language=SQLite
            r#"
                SELECT id, bank_id, stem, kind, answer, options_json, explanation,
                       is_favorite, is_wrong, is_completed, user_answer, is_correct, correct_streak
                FROM questions
                WHERE bank_id = ?1
                ORDER BY position, id
            "#
        }
        QuestionFilter::Favorites => {
            // language=SQLite
            r#"
                SELECT id, bank_id, stem, kind, answer, options_json, explanation,
                       is_favorite, is_wrong, is_completed, user_answer, is_correct, correct_streak
                FROM questions
                WHERE bank_id = ?1 AND is_favorite = 1
                ORDER BY position, id
            "#
        }
        QuestionFilter::Wrong => {
            // language=SQLite
            r#"
                SELECT id, bank_id, stem, kind, answer, options_json, explanation,
                       is_favorite, is_wrong, is_completed, user_answer, is_correct, correct_streak
                FROM questions
                WHERE bank_id = ?1 AND is_wrong = 1
                ORDER BY position, id
            "#
        }
    };

    sqlx::query_as(sql).bind(bank_id).fetch_all(executor).await
}

pub async fn get_by_id<'e, E>(
    executor: E,
    question_id: &str,
) -> Result<Option<Question>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as(
        // language=SQLite
        r#"
            SELECT id, bank_id, stem, kind, answer, options_json, explanation,
                   is_favorite, is_wrong, is_completed, user_answer, is_correct, correct_streak
            FROM questions
            WHERE id = ?1
        "#,
    )
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

/// Insert questions keeping their slice order as the natural ordering.
///
/// Positions continue after the highest position already stored for each bank,
/// so repeated calls append rather than interleave. An id that already exists
/// fails the insert and leaves the stored question untouched.
pub async fn insert_many(
    conn: &mut SqliteConnection,
    questions: &[Question],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;

    for question in questions {
        let result = sqlx::query(
            // language=SQLite
            r#"
                INSERT INTO questions (
                    id, bank_id, position, stem, kind, answer, options_json, explanation,
                    is_favorite, is_wrong, is_completed, user_answer, is_correct, correct_streak
                )
                VALUES (
                    ?1, ?2,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM questions WHERE bank_id = ?2),
                    ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13
                )
            "#,
        )
        .bind(&question.id)
        .bind(&question.bank_id)
        .bind(&question.stem)
        .bind(question.kind)
        .bind(&question.answer)
        .bind(&question.options_json)
        .bind(&question.explanation)
        .bind(question.is_favorite)
        .bind(question.is_wrong)
        .bind(question.is_completed)
        .bind(&question.user_answer)
        .bind(question.is_correct)
        .bind(question.correct_streak)
        .execute(&mut *conn)
        .await?;

        inserted += result.rows_affected();
    }

    Ok(inserted)
}

/// Write the full learner state of a question.
///
/// Content fields are never touched. Returns false when the question does not exist.
pub async fn update_learner_state<'e, E>(
    executor: E,
    question: &Question,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        // language=SQLite
        r#"
            UPDATE questions
            SET is_favorite = ?2,
                is_wrong = ?3,
                is_completed = ?4,
                user_answer = ?5,
                is_correct = ?6,
                correct_streak = ?7
            WHERE id = ?1
        "#,
    )
    .bind(&question.id)
    .bind(question.is_favorite)
    .bind(question.is_wrong)
    .bind(question.is_completed)
    .bind(&question.user_answer)
    .bind(question.is_correct)
    .bind(question.correct_streak)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_completed<'e, E>(executor: E, bank_id: &str) -> Result<u32, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        // language=SQLite
        r#"
            SELECT COUNT(*) FROM questions
            WHERE bank_id = ?1 AND is_completed = 1
        "#,
    )
    .bind(bank_id)
    .fetch_one(executor)
    .await
}

pub async fn count_correct<'e, E>(executor: E, bank_id: &str) -> Result<u32, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        // language=SQLite
        r#"
            SELECT COUNT(*) FROM questions
            WHERE bank_id = ?1 AND is_correct = 1
        "#,
    )
    .bind(bank_id)
    .fetch_one(executor)
    .await
}

pub async fn delete_by_bank<'e, E>(executor: E, bank_id: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        // language=SQLite
        r#"
            DELETE FROM questions
            WHERE bank_id = ?1
        "#,
    )
    .bind(bank_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
