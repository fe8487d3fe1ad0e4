use std::sync::Arc;

use futures::StreamExt;
use uuid::Uuid;

use crate::{
    constants::teaching_design_prompt::FAIL_TOKEN,
    errors::AppResult,
    models::domain::ChatMessage,
    repositories::ConversationMemory,
    services::{
        chunk_sanitizer::sanitize,
        completion_provider::{CompletionProvider, TextStream},
        prompt_builder::{build_lesson_plan_prompt, build_outline_prompt, Prompt},
    },
};

/// A streamed reply and the conversation it was recorded under.
pub struct DesignStream {
    pub conversation_id: String,
    pub fragments: TextStream,
}

/// Conversational outline optimization and lesson-plan drafting.
pub struct TeachingDesignService {
    provider: Arc<dyn CompletionProvider>,
    memory: Arc<dyn ConversationMemory>,
}

impl TeachingDesignService {
    pub fn new(provider: Arc<dyn CompletionProvider>, memory: Arc<dyn ConversationMemory>) -> Self {
        Self { provider, memory }
    }

    pub async fn optimize_outline(
        &self,
        message: &str,
        conversation_id: Option<String>,
    ) -> AppResult<DesignStream> {
        let conversation_id = conversation_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.converse(build_outline_prompt(message), conversation_id)
            .await
    }

    pub async fn create_lesson_plan(
        &self,
        outline: &str,
        template: Option<&str>,
        conversation_id: &str,
    ) -> AppResult<DesignStream> {
        self.converse(
            build_lesson_plan_prompt(outline, template),
            conversation_id.to_string(),
        )
        .await
    }

    /// Sends `[system, history.., user]`, records the user turn up front and
    /// the raw assistant reply once the provider stream completes.
    async fn converse(&self, prompt: Prompt, conversation_id: String) -> AppResult<DesignStream> {
        let history = self.memory.recent(&conversation_id).await;
        log::info!(
            "Streaming reply for conversation {} with {} prior message(s)",
            conversation_id,
            history.len()
        );

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(prompt.system));
        messages.extend(history);
        messages.push(ChatMessage::user(prompt.user.clone()));

        self.memory
            .append(&conversation_id, ChatMessage::user(prompt.user))
            .await;

        let mut upstream = self.provider.complete_stream(messages).await?;
        let memory = Arc::clone(&self.memory);
        let id = conversation_id.clone();

        let fragments = async_stream::stream! {
            let mut reply = String::new();
            while let Some(fragment) = upstream.next().await {
                match fragment {
                    Ok(raw) => {
                        reply.push_str(&raw);
                        yield Ok(sanitize(&raw));
                    }
                    Err(e) => {
                        log::warn!("Reply stream for conversation {} failed: {}", id, e);
                        yield Err(e);
                        return;
                    }
                }
            }

            if reply.trim() == FAIL_TOKEN {
                log::warn!("Model could not satisfy layout rules for conversation {}", id);
            }
            if !reply.is_empty() {
                memory.append(&id, ChatMessage::assistant(reply)).await;
            }
        };

        Ok(DesignStream {
            conversation_id,
            fragments: fragments.boxed(),
        })
    }
}
