#[cfg(test)]
pub mod fixtures {
    use crate::models::{
        domain::{DifficultyLevel, GeneratedItem, QuestionType},
        dto::request::GenerationRequest,
    };

    /// Raw model reply for a valid judge question.
    pub const JUDGE_REPLY: &str =
        r#"{"question":"惯性与质量有关","answer":"正确","explain":"质量是惯性的量度"}"#;

    /// Raw model reply for a valid choice question, fenced the way models often answer.
    pub const CHOICE_REPLY: &str = "```json\n{\"question\":\"下列哪个是矢量？\",\"options\":[\"A. 质量\",\"B. 速度\",\"C. 时间\",\"D. 温度\"],\"answer\":\"B\",\"explain\":\"速度有大小和方向\"}\n```";

    /// A physics request about Newton's laws.
    pub fn generation_request(question_type: QuestionType, count: i32) -> GenerationRequest {
        GenerationRequest {
            subject: "物理".to_string(),
            knowledge_points: vec!["牛顿定律".to_string()],
            level: DifficultyLevel::Hard,
            question_type,
            count,
        }
    }

    pub fn choice_item() -> GeneratedItem {
        GeneratedItem {
            question: "下列哪个是矢量？".to_string(),
            options: Some(vec![
                "A. 质量".to_string(),
                "B. 速度".to_string(),
                "C. 时间".to_string(),
                "D. 温度".to_string(),
            ]),
            answer: "B".to_string(),
            explain: "速度有大小和方向".to_string(),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::QuestionType;

    #[test]
    fn test_fixture_choice_item_is_valid() {
        let item = choice_item()
            .validated_for(QuestionType::Choice)
            .expect("fixture should be valid");
        assert_eq!(item.answer, "B");
    }

    #[test]
    fn test_fixture_replies_parse() {
        let judge: crate::models::domain::GeneratedItem =
            serde_json::from_str(JUDGE_REPLY).expect("judge reply parses");
        assert_eq!(judge.answer, "正确");

        let fenced = crate::services::chunk_sanitizer::strip_code_fence(CHOICE_REPLY);
        let choice: crate::models::domain::GeneratedItem =
            serde_json::from_str(fenced).expect("choice reply parses");
        assert_eq!(choice, choice_item());
    }
}
