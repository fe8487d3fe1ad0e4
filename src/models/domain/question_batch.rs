use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BATCH_NAME_SUFFIX: &str = "练习";

/// A group of generated questions sharing one id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionBatch {
    pub batch_id: String,
    pub batch_name: String,
    /// Filled by read-side aggregation, never stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuestionBatch {
    pub fn new(subject: &str, knowledge_points: &[String]) -> Self {
        QuestionBatch {
            batch_id: Uuid::new_v4().to_string(),
            batch_name: batch_name(subject, knowledge_points),
            item_count: None,
            created_at: Some(Utc::now()),
        }
    }
}

/// Only the first knowledge point ends up in the name. Stored batch names
/// already rely on this shape.
pub fn batch_name(subject: &str, knowledge_points: &[String]) -> String {
    let mut name = subject.to_string();
    if let Some(first) = knowledge_points.first() {
        name.push('-');
        name.push_str(first);
    }
    name.push_str(BATCH_NAME_SUFFIX);
    name
}
