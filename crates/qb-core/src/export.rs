//! Bank export.
//!
//! The export document carries every stored field of the bank, its questions
//! and its learning records, plus the decoded options of each question so the
//! file can be read without knowing the column encoding.

use qb_db::models::{Bank, LearningRecord, Question, QuestionFilter, QuestionOption};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::CoreError};

/// Format marker written into every export
pub const EXPORT_FORMAT: &str = "quizbank-export/1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankExport {
    pub format: String,
    pub bank: Bank,
    pub questions: Vec<ExportedQuestion>,
    pub records: Vec<LearningRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub options: Vec<QuestionOption>,
}

impl BankExport {
    /// Read an export document back.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CoreError> {
        let export: Self = serde_json::from_slice(bytes)?;

        if export.format != EXPORT_FORMAT {
            return Err(CoreError::Format(format!(
                "unsupported export format {}",
                export.format
            )));
        }
        Ok(export)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Collect everything stored for a bank into an export document.
pub async fn collect_bank_export(state: &AppState, bank_id: &str) -> Result<BankExport, CoreError> {
    // Session writes still in the queue belong in the export
    state.writes.flush().await;

    let bank = state
        .store
        .get_bank(bank_id)
        .await?
        .ok_or_else(|| CoreError::bank_not_found(bank_id))?;

    let questions = state
        .store
        .list_questions(bank_id, QuestionFilter::All)
        .await?
        .into_iter()
        .map(|question| {
            let options = question.options()?;
            Ok(ExportedQuestion { question, options })
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;

    let records = state.store.list_records(bank_id).await?;

    Ok(BankExport {
        format: EXPORT_FORMAT.to_string(),
        bank,
        questions,
        records,
    })
}

/// Serialize a bank's full question set and history as pretty JSON.
pub async fn export_bank_data(state: &AppState, bank_id: &str) -> Result<String, CoreError> {
    let export = collect_bank_export(state, bank_id).await?;

    tracing::info!(
        bank_id,
        questions = export.questions.len(),
        records = export.records.len(),
        "Exported question bank"
    );

    export.to_json()
}
