#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use tokio::sync::RwLock;

use teachai_server::{
    errors::{AppError, AppResult},
    models::domain::{ChatMessage, QuestionBatch, QuestionRecord},
    repositories::QuestionRepository,
    services::{
        completion_provider::{CompletionProvider, ResponseSchema, TextStream},
        prompt_builder::Prompt,
    },
};

pub const JUDGE_REPLY: &str =
    r#"{"question":"惯性与质量有关","answer":"正确","explain":"质量是惯性的量度"}"#;

/// Write operations in the order the repository saw them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Batch(String),
    Question(String),
}

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    batches: Arc<RwLock<HashMap<String, QuestionBatch>>>,
    questions: Arc<RwLock<Vec<QuestionRecord>>>,
    journal: Arc<RwLock<Vec<WriteOp>>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn journal(&self) -> Vec<WriteOp> {
        self.journal.read().await.clone()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn insert_batch(&self, batch: &QuestionBatch) -> AppResult<()> {
        let mut batches = self.batches.write().await;
        if batches.contains_key(&batch.batch_id) {
            return Err(AppError::DatabaseError(format!(
                "duplicate batch id '{}'",
                batch.batch_id
            )));
        }
        batches.insert(batch.batch_id.clone(), batch.clone());
        self.journal
            .write()
            .await
            .push(WriteOp::Batch(batch.batch_id.clone()));
        Ok(())
    }

    async fn insert_question(&self, record: QuestionRecord) -> AppResult<QuestionRecord> {
        self.questions.write().await.push(record.clone());
        self.journal
            .write()
            .await
            .push(WriteOp::Question(record.batch_id.clone()));
        Ok(record)
    }

    async fn find_batch(&self, batch_id: &str) -> AppResult<Option<QuestionBatch>> {
        Ok(self.batches.read().await.get(batch_id).cloned())
    }

    async fn list_batches(&self) -> AppResult<Vec<QuestionBatch>> {
        let questions = self.questions.read().await;
        let mut batches: Vec<QuestionBatch> = self.batches.read().await.values().cloned().collect();
        for batch in &mut batches {
            let count = questions
                .iter()
                .filter(|q| q.batch_id == batch.batch_id)
                .count();
            batch.item_count = Some(count as i64);
        }
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(batches)
    }

    async fn list_by_batch(&self, batch_id: &str) -> AppResult<Vec<QuestionRecord>> {
        let questions = self.questions.read().await;
        Ok(questions
            .iter()
            .filter(|q| q.batch_id == batch_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<QuestionRecord>> {
        let mut questions = self.questions.read().await.clone();
        questions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(questions)
    }

    async fn delete_question(&self, id: &str) -> AppResult<bool> {
        let mut questions = self.questions.write().await;
        let before = questions.len();
        questions.retain(|q| q.id != id);
        Ok(questions.len() < before)
    }
}

type StructuredScript = Box<dyn Fn(usize) -> AppResult<String> + Send + Sync>;

/// Provider answering from a script instead of a model.
pub struct ScriptedProvider {
    structured: StructuredScript,
    stream_chunks: Vec<String>,
    structured_calls: AtomicUsize,
    stream_requests: Mutex<Vec<Vec<ChatMessage>>>,
    latency: Option<Duration>,
}

impl ScriptedProvider {
    /// `structured` receives the zero-based call number.
    pub fn new(
        structured: impl Fn(usize) -> AppResult<String> + Send + Sync + 'static,
        stream_chunks: &[&str],
    ) -> Self {
        Self {
            structured: Box::new(structured),
            stream_chunks: stream_chunks.iter().map(|c| c.to_string()).collect(),
            structured_calls: AtomicUsize::new(0),
            stream_requests: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Each structured call sleeps for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn always(reply: &'static str) -> Self {
        Self::new(move |_| Ok(reply.to_string()), &[])
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn stream_requests(&self) -> Vec<Vec<ChatMessage>> {
        self.stream_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete_structured(
        &self,
        _prompt: &Prompt,
        _schema: Option<ResponseSchema>,
    ) -> AppResult<String> {
        let call = self.structured_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        (self.structured)(call)
    }

    async fn complete_stream(&self, messages: Vec<ChatMessage>) -> AppResult<TextStream> {
        self.stream_requests.lock().unwrap().push(messages);
        let chunks: Vec<AppResult<String>> = self.stream_chunks.iter().cloned().map(Ok).collect();
        Ok(stream::iter(chunks).boxed())
    }
}
