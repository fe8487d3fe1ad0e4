use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{ChatMessage, QuestionBatch, QuestionRecord},
    repositories::{ConversationMemory, QuestionRepository},
};

/// Read side of the question bank plus conversation transcripts.
pub struct QuestionBankService {
    repository: Arc<dyn QuestionRepository>,
    memory: Arc<dyn ConversationMemory>,
}

impl QuestionBankService {
    pub fn new(repository: Arc<dyn QuestionRepository>, memory: Arc<dyn ConversationMemory>) -> Self {
        Self { repository, memory }
    }

    pub async fn list_batches(&self) -> AppResult<Vec<QuestionBatch>> {
        self.repository.list_batches().await
    }

    pub async fn get_batch(&self, batch_id: &str) -> AppResult<QuestionBatch> {
        self.repository
            .find_batch(batch_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Batch with id '{}' not found", batch_id)))
    }

    pub async fn list_questions_by_batch(&self, batch_id: &str) -> AppResult<Vec<QuestionRecord>> {
        self.get_batch(batch_id).await?;
        self.repository.list_by_batch(batch_id).await
    }

    pub async fn list_questions(&self) -> AppResult<Vec<QuestionRecord>> {
        self.repository.list_all().await
    }

    pub async fn delete_question(&self, id: &str) -> AppResult<()> {
        if !self.repository.delete_question(id).await? {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                id
            )));
        }

        log::info!("Deleted question {}", id);
        Ok(())
    }

    pub async fn conversation_history(&self, conversation_id: &str) -> Vec<ChatMessage> {
        self.memory.recent(conversation_id).await
    }
}
