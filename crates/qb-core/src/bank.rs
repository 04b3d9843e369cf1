//! Bank listing and management.

use qb_db::{
    LiveSequence,
    models::{Bank, LearningRecord},
};

use crate::{AppState, error::CoreError};

/// All banks, newest import first.
pub async fn list_banks(state: &AppState) -> Result<Vec<Bank>, CoreError> {
    Ok(state.store.list_banks().await?)
}

/// Bank list re-delivered whenever any bank or question changes.
pub async fn watch_banks(state: &AppState) -> Result<LiveSequence<Bank>, CoreError> {
    Ok(state.store.watch_banks().await?)
}

/// Look a bank up, `None` when it does not exist.
pub async fn get_bank(state: &AppState, bank_id: &str) -> Result<Option<Bank>, CoreError> {
    Ok(state.store.get_bank(bank_id).await?)
}

/// Delete a bank with its questions and learning records.
///
/// Pending session writes are applied first so none of them lands after the
/// delete.
pub async fn delete_bank(state: &AppState, bank_id: &str) -> Result<(), CoreError> {
    state.writes.flush().await;

    if !state.store.delete_bank(bank_id).await? {
        return Err(CoreError::bank_not_found(bank_id));
    }

    tracing::info!(bank_id, "Deleted question bank");
    Ok(())
}

/// Every answer submitted for a bank, newest first.
pub async fn learning_history(
    state: &AppState,
    bank_id: &str,
) -> Result<Vec<LearningRecord>, CoreError> {
    if state.store.get_bank(bank_id).await?.is_none() {
        return Err(CoreError::bank_not_found(bank_id));
    }
    Ok(state.store.list_records(bank_id).await?)
}
