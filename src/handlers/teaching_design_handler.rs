use std::sync::Arc;

use actix_web::{post, web, HttpResponse};
use futures::StreamExt;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    handlers::sse::{data_frame, event_frame, event_stream},
    models::dto::request::{LessonPlanRequest, OutlineOptimizeRequest},
    services::teaching_design_service::DesignStream,
};

pub const CONVERSATION_ID_HEADER: &str = "X-Conversation-Id";

#[post("/api/teacher/ai/outline/optimize")]
pub async fn optimize_outline(
    state: web::Data<Arc<AppState>>,
    request: web::Json<OutlineOptimizeRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let reply = state
        .teaching_design_service
        .optimize_outline(&request.message, request.conversation_id)
        .await?;
    Ok(stream_reply(reply))
}

#[post("/api/teacher/ai/lesson-plans")]
pub async fn create_lesson_plan(
    state: web::Data<Arc<AppState>>,
    request: web::Json<LessonPlanRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let reply = state
        .teaching_design_service
        .create_lesson_plan(
            &request.outline,
            request.template.as_deref(),
            &request.conversation_id,
        )
        .await?;
    Ok(stream_reply(reply))
}

/// Mid-stream failures arrive as a final `event: error` message since the
/// status line has already been sent.
fn stream_reply(reply: DesignStream) -> HttpResponse {
    let frames = reply.fragments.map(|fragment| {
        Ok::<_, actix_web::Error>(match fragment {
            Ok(html) => data_frame(&html),
            Err(e) => event_frame("error", &e.to_string()),
        })
    });

    let mut builder = HttpResponse::Ok();
    builder.insert_header((CONVERSATION_ID_HEADER, reply.conversation_id.as_str()));
    event_stream(builder, frames)
}
