use serde::Serialize;

use crate::models::domain::GeneratedItem;

/// Wire form of one successfully generated question.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedItemEvent<'a> {
    #[serde(flatten)]
    pub item: &'a GeneratedItem,
    #[serde(rename = "questionId")]
    pub question_id: &'a str,
}

/// Wire form of one failed generation unit.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationErrorEvent<'a> {
    pub error: String,
    #[serde(rename = "questionId")]
    pub question_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct DeleteQuestionResponse {
    pub message: String,
}
