use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    /// Human-readable label interpolated into prompts.
    pub fn label(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "简单",
            DifficultyLevel::Medium => "中等",
            DifficultyLevel::Hard => "困难",
        }
    }

    /// Stored difficulty on the 1-5 scale used by the question bank.
    pub fn score(self) -> i32 {
        match self {
            DifficultyLevel::Easy => 1,
            DifficultyLevel::Medium => 3,
            DifficultyLevel::Hard => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionType {
    Choice,
    Judge,
    Fill,
    Short,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Choice => "选择题",
            QuestionType::Judge => "判断题",
            QuestionType::Fill => "填空题",
            QuestionType::Short => "简答题",
        }
    }
}
