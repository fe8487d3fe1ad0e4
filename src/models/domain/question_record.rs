use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::AppResult,
    models::domain::{
        generated_item::GeneratedItem,
        question::{DifficultyLevel, QuestionType},
    },
};

pub const AI_CREATOR: &str = "AI";

/// Question bank row written for every generated item.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionRecord {
    pub id: String,
    pub batch_id: String,
    pub question_type: String,
    pub content: String,
    /// JSON array of option strings, choice questions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    pub answer: String,
    pub analysis: String,
    pub difficulty: i32,
    pub subject: String,
    pub created_by: String,
    pub is_ai_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuestionRecord {
    pub fn from_generated(
        item: &GeneratedItem,
        batch_id: &str,
        subject: &str,
        question_type: QuestionType,
        level: DifficultyLevel,
    ) -> AppResult<Self> {
        let options = match (question_type, &item.options) {
            (QuestionType::Choice, Some(options)) => Some(serde_json::to_string(options)?),
            _ => None,
        };

        Ok(QuestionRecord {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            question_type: question_type.label().to_string(),
            content: item.question.clone(),
            options,
            answer: item.answer.clone(),
            analysis: item.explain.clone(),
            difficulty: level.score(),
            subject: subject.to_string(),
            created_by: AI_CREATOR.to_string(),
            is_ai_generated: true,
            created_at: Some(Utc::now()),
        })
    }
}
