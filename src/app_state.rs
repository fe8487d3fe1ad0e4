use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ConversationMemory, InMemoryConversationMemory, MongoQuestionRepository,
        QuestionRepository,
    },
    services::{
        completion_provider::{CompletionProvider, OpenAiCompletionProvider},
        question_bank_service::QuestionBankService,
        question_generation_service::QuestionGenerationService,
        teaching_design_service::TeachingDesignService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub question_generation_service: Arc<QuestionGenerationService>,
    pub teaching_design_service: Arc<TeachingDesignService>,
    pub question_bank_service: Arc<QuestionBankService>,
    /// Absent when wired without MongoDB; readiness then reports it disabled.
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let question_repository = Arc::new(MongoQuestionRepository::new(&db));
        question_repository.ensure_indexes().await?;

        let provider = Arc::new(OpenAiCompletionProvider::new(&config));
        let memory = Arc::new(InMemoryConversationMemory::new(
            config.chat_memory_max_messages,
        ));

        Ok(Self::from_components(
            config,
            provider,
            question_repository,
            memory,
            Some(db),
        ))
    }

    pub fn from_components(
        config: Config,
        provider: Arc<dyn CompletionProvider>,
        question_repository: Arc<dyn QuestionRepository>,
        memory: Arc<dyn ConversationMemory>,
        db: Option<Database>,
    ) -> Self {
        let question_generation_service = Arc::new(QuestionGenerationService::new(
            Arc::clone(&provider),
            Arc::clone(&question_repository),
            config.generation_max_concurrency,
        ));
        let teaching_design_service = Arc::new(TeachingDesignService::new(
            provider,
            Arc::clone(&memory),
        ));
        let question_bank_service =
            Arc::new(QuestionBankService::new(question_repository, memory));

        Self {
            question_generation_service,
            teaching_design_service,
            question_bank_service,
            db,
            config: Arc::new(config),
        }
    }
}
