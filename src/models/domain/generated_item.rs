use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, AppResult},
    models::domain::question::QuestionType,
};

pub const CHOICE_LABELS: [&str; 4] = ["A", "B", "C", "D"];
pub const JUDGE_ANSWERS: [&str; 2] = ["正确", "错误"];

/// One question as returned by the completion provider.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GeneratedItem {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub answer: String,
    #[serde(default)]
    pub explain: String,
}

impl GeneratedItem {
    /// Checks the item against the shape requested for `question_type` and
    /// normalises it. Options only survive on choice questions.
    pub fn validated_for(mut self, question_type: QuestionType) -> AppResult<Self> {
        if self.question.trim().is_empty() {
            return Err(AppError::ParseError("generated question is empty".into()));
        }
        self.answer = self.answer.trim().to_string();

        match question_type {
            QuestionType::Choice => {
                let options = self.options.as_deref().unwrap_or_default();
                if options.len() != CHOICE_LABELS.len() {
                    return Err(AppError::ParseError(format!(
                        "choice question needs {} options, got {}",
                        CHOICE_LABELS.len(),
                        options.len()
                    )));
                }
                for (option, label) in options.iter().zip(CHOICE_LABELS) {
                    if !option.trim_start().starts_with(&format!("{label}.")) {
                        return Err(AppError::ParseError(format!(
                            "option '{}' is not labeled '{}.'",
                            option, label
                        )));
                    }
                }
                if !CHOICE_LABELS.contains(&self.answer.as_str()) {
                    return Err(AppError::ParseError(format!(
                        "choice answer must be one of A-D, got '{}'",
                        self.answer
                    )));
                }
            }
            QuestionType::Judge => {
                if !JUDGE_ANSWERS.contains(&self.answer.as_str()) {
                    return Err(AppError::ParseError(format!(
                        "judge answer must be 正确 or 错误, got '{}'",
                        self.answer
                    )));
                }
                self.options = None;
            }
            QuestionType::Fill | QuestionType::Short => {
                if self.answer.is_empty() {
                    return Err(AppError::ParseError("generated answer is empty".into()));
                }
                self.options = None;
            }
        }

        Ok(self)
    }
}
