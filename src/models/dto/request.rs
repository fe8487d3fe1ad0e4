use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::question::{DifficultyLevel, QuestionType};

/// Upper bound on questions per batch accepted at the HTTP boundary.
pub const MAX_QUESTIONS_PER_BATCH: i32 = 50;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[validate(length(min = 1, max = 50))]
    pub subject: String,

    #[serde(default)]
    #[validate(length(max = 20))]
    pub knowledge_points: Vec<String>,

    #[serde(alias = "difficultyLevel")]
    pub level: DifficultyLevel,

    #[serde(rename = "type", alias = "questionType")]
    pub question_type: QuestionType,

    // Zero and negative counts are coerced to one by the generator.
    #[validate(range(max = 50))]
    pub count: i32,
}

impl GenerationRequest {
    pub fn effective_count(&self) -> usize {
        self.count.max(1) as usize
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OutlineOptimizeRequest {
    #[validate(length(min = 1))]
    pub message: String,

    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanRequest {
    #[validate(length(min = 1))]
    pub outline: String,

    #[serde(default)]
    pub template: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub conversation_id: String,
}
