//! Question document format accepted by the importer.
//!
//! ```json
//! {"status": 200, "obj": {"id": "...", "list": [
//!     {"id": "...", "stemlist": [{"text": "...", "type": 1}], "answer": "A,C",
//!      "options": [{"tag": "A", "value": "...", "valuelist": []}], "type": 2, "jx": "..."}
//! ]}}
//! ```

use std::collections::HashSet;

use qb_db::models::{Bank, Question, QuestionKind, QuestionOption, encode_options};
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::error::CoreError;

/// Status code a well-formed document carries
pub const SUCCESS_STATUS: i64 = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDocument {
    pub status: i64,
    #[serde(default)]
    pub msg: Option<String>,
    pub obj: DocumentBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentBody {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<i64>,
    pub list: Vec<DocumentQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentQuestion {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub stemlist: Vec<TextItem>,
    #[serde(default)]
    pub jxlist: Option<Vec<TextItem>>,
    pub answer: String,
    pub options: Vec<DocumentOption>,
    #[serde(rename = "type")]
    pub kind: i64,
    #[serde(default)]
    pub jx: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextItem {
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentOption {
    pub tag: String,
    pub value: String,
    #[serde(default)]
    pub valuelist: Vec<TextItem>,
}

/// Identifiers are strings in the format, but numeric ids are common in the wild.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number id, found {other}"
        ))),
    }
}

/// Parse and validate a raw question document.
pub fn parse_document(bytes: &[u8]) -> Result<QuestionDocument, CoreError> {
    let document: QuestionDocument = serde_json::from_slice(bytes)?;

    if document.status != SUCCESS_STATUS {
        return Err(CoreError::Format(format!(
            "document status is {}, expected {SUCCESS_STATUS}",
            document.status
        )));
    }

    Ok(document)
}

/// Map a validated document onto a new bank and its questions.
///
/// Question ids become `{bank_id}_{original_id}`. Options keep their source
/// order and tags.
pub fn build_bank(
    document: &QuestionDocument,
    bank_id: &str,
    bank_name: &str,
) -> Result<(Bank, Vec<Question>), CoreError> {
    let mut seen = HashSet::with_capacity(document.obj.list.len());
    let mut questions = Vec::with_capacity(document.obj.list.len());

    for source in &document.obj.list {
        if !seen.insert(source.id.as_str()) {
            return Err(CoreError::Format(format!(
                "question id {} appears more than once",
                source.id
            )));
        }

        let kind = QuestionKind::from_code(source.kind).ok_or_else(|| {
            CoreError::Format(format!(
                "question {} has unknown type {}",
                source.id, source.kind
            ))
        })?;

        let options: Vec<QuestionOption> = source
            .options
            .iter()
            .map(|option| QuestionOption {
                tag: option.tag.clone(),
                value: option.value.clone(),
            })
            .collect();

        questions.push(Question {
            id: format!("{bank_id}_{}", source.id),
            bank_id: bank_id.to_string(),
            stem: source
                .stemlist
                .first()
                .map(|item| item.text.clone())
                .unwrap_or_default(),
            kind,
            answer: source.answer.clone(),
            options_json: encode_options(&options)?,
            explanation: source.jx.clone().unwrap_or_default(),
            is_favorite: false,
            is_wrong: false,
            is_completed: false,
            user_answer: String::new(),
            is_correct: None,
            correct_streak: 0,
        });
    }

    let total_count = u32::try_from(questions.len())
        .map_err(|_| CoreError::Format("too many questions in one document".to_string()))?;

    Ok((Bank::new(bank_id, bank_name, total_count), questions))
}
