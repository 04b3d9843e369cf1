//! Bank progress counters derived from the question set.

use qb_db::{Store, models::Bank};

use crate::error::CoreError;

/// Recompute a bank's completed and correct counters from its questions.
///
/// Idempotent. A missing bank is not an error: nothing is written and `None`
/// is returned.
pub async fn recompute_bank_stats(store: &Store, bank_id: &str) -> Result<Option<Bank>, CoreError> {
    let Some(mut bank) = store.get_bank(bank_id).await? else {
        tracing::debug!(bank_id, "Skipping stats recompute for missing bank");
        return Ok(None);
    };

    let completed_count = store.count_completed(bank_id).await?;
    let correct_count = store.count_correct(bank_id).await?;

    if bank.completed_count != completed_count || bank.correct_count != correct_count {
        store
            .update_bank_counts(bank_id, completed_count, correct_count)
            .await?;
        bank.completed_count = completed_count;
        bank.correct_count = correct_count;
    }

    Ok(Some(bank))
}
