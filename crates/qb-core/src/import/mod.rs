//! Importing question documents into banks.
//!
//! User-supplied documents always create a new bank with a fresh id, so the
//! same file can be imported any number of times. The bundled default
//! document uses a stable id and is only imported into an empty store.

pub mod document;

use std::fmt;

use uuid::Uuid;

use crate::{AppState, error::CoreError};

pub use document::{QuestionDocument, build_bank, parse_document};

/// Outcome of an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Id of the created bank, `None` when the import was skipped
    pub bank_id: Option<String>,
    pub bank_name: String,
    /// Number of imported questions
    pub imported: usize,
}

impl ImportSummary {
    pub const fn skipped(&self) -> bool {
        self.bank_id.is_none()
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped() {
            write!(f, "A question bank already exists, skipped importing {}", self.bank_name)
        } else {
            write!(f, "Imported {} questions into {}", self.imported, self.bank_name)
        }
    }
}

/// Fresh bank id for a user import, time-ordered and unique.
pub fn generate_bank_id() -> String {
    format!("bank_{}", Uuid::now_v7().simple())
}

/// Stable bank id for the bundled default document.
pub fn default_bank_id(document: &QuestionDocument) -> String {
    format!("bank_default_{}", document.obj.id)
}

/// Import a document as a new bank named `display_name`.
///
/// The bank row and all questions are committed together or not at all.
pub async fn import_bank(
    state: &AppState,
    bytes: &[u8],
    display_name: &str,
) -> Result<ImportSummary, CoreError> {
    let document = parse_document(bytes)?;
    let bank_id = generate_bank_id();
    let (bank, questions) = build_bank(&document, &bank_id, display_name)?;

    state.store.insert_bank_with_questions(&bank, &questions).await?;

    tracing::info!(
        bank_id = %bank.id,
        questions = questions.len(),
        "Imported question bank {display_name}"
    );

    Ok(ImportSummary {
        bank_id: Some(bank.id),
        bank_name: bank.name,
        imported: questions.len(),
    })
}

/// Read a user-selected document through the source and import it.
pub async fn import_from_source(
    state: &AppState,
    source_ref: &str,
    display_name: &str,
) -> Result<ImportSummary, CoreError> {
    let bytes = state.source.open_for_read(source_ref).await?;
    import_bank(state, &bytes, display_name).await
}

/// Import the bundled default document unless any bank already exists.
///
/// Checking the whole bank set, not just the default id, keeps installs that
/// already hold a single imported bank from getting a second one.
pub async fn import_default_bank(state: &AppState) -> Result<ImportSummary, CoreError> {
    let bank_name = state.config.default_bank_name.clone();
    let skipped = ImportSummary {
        bank_id: None,
        bank_name: bank_name.clone(),
        imported: 0,
    };

    if !state.store.list_banks().await?.is_empty() {
        tracing::debug!("Banks already present, default import skipped");
        return Ok(skipped);
    }

    let bytes = state
        .source
        .read_bundled_asset(&state.config.default_bank_asset)
        .await?;
    let document = parse_document(&bytes)?;
    let bank_id = default_bank_id(&document);
    let (bank, questions) = build_bank(&document, &bank_id, &bank_name)?;

    if !state.store.insert_first_bank(&bank, &questions).await? {
        tracing::debug!("Another import won the race, default import skipped");
        return Ok(skipped);
    }

    tracing::info!(
        bank_id = %bank.id,
        questions = questions.len(),
        "Imported default question bank"
    );

    Ok(ImportSummary {
        bank_id: Some(bank.id),
        bank_name,
        imported: questions.len(),
    })
}
