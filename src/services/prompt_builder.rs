//! Prompt assembly for the generation pipelines. Every function here is pure;
//! request constraints are checked at the HTTP boundary, not here.

use crate::{
    constants::{
        question_prompt::{
            CHOICE_SHAPE, DEFAULT_KNOWLEDGE_POINT, JUDGE_SHAPE, KNOWLEDGE_POINT_DELIMITER,
            OPEN_ANSWER_SHAPE, QUESTION_SYSTEM_PROMPT,
        },
        teaching_design_prompt::{LESSON_PLAN_PROMPT, OUTLINE_OPTIMIZE_PROMPT},
    },
    models::{domain::QuestionType, dto::request::GenerationRequest},
};

/// A system instruction paired with the user turn it governs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub fn question_shape(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::Choice => CHOICE_SHAPE,
        QuestionType::Judge => JUDGE_SHAPE,
        QuestionType::Fill | QuestionType::Short => OPEN_ANSWER_SHAPE,
    }
}

pub fn knowledge_phrase(knowledge_points: &[String]) -> String {
    if knowledge_points.is_empty() {
        DEFAULT_KNOWLEDGE_POINT.to_string()
    } else {
        knowledge_points.join(KNOWLEDGE_POINT_DELIMITER)
    }
}

pub fn build_question_prompt(request: &GenerationRequest) -> Prompt {
    let user = format!(
        "你是一名{}教师，现在请针对知识点「{}」设计一道 {}（{} 难度）。请严格按下述 JSON 模式输出：\n{}\n",
        request.subject,
        knowledge_phrase(&request.knowledge_points),
        request.question_type.label(),
        request.level.label(),
        question_shape(request.question_type),
    );

    Prompt {
        system: QUESTION_SYSTEM_PROMPT.to_string(),
        user,
    }
}

pub fn build_outline_prompt(outline: &str) -> Prompt {
    Prompt {
        system: OUTLINE_OPTIMIZE_PROMPT.to_string(),
        user: outline.to_string(),
    }
}

pub fn build_lesson_plan_prompt(outline: &str, template: Option<&str>) -> Prompt {
    let mut user = format!("<outline>\n{}\n</outline>", outline.trim());
    if let Some(template) = template.map(str::trim).filter(|t| !t.is_empty()) {
        user.push_str(&format!("\n<template>\n{}\n</template>", template));
    }

    Prompt {
        system: LESSON_PLAN_PROMPT.to_string(),
        user,
    }
}
