use std::sync::Arc;

use actix_web::{post, web, HttpRequest, HttpResponse};
use futures::StreamExt;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    handlers::sse::{data_frame, event_stream, BATCH_ID_HEADER},
    middleware::get_request_id,
    models::dto::request::GenerationRequest,
};

/// Streams one `data:` message per generated question as units finish.
#[post("/api/teacher/ai/questions/generate")]
pub async fn generate_questions(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    request: web::Json<GenerationRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    log::info!(
        "Generation requested [{}]: subject={} type={:?} count={}",
        get_request_id(&req).unwrap_or_default(),
        request.subject,
        request.question_type,
        request.count
    );

    let run = state
        .question_generation_service
        .run_batch(request)
        .await?;

    let frames = run
        .events
        .map(|event| Ok::<_, actix_web::Error>(data_frame(&event)));

    let mut builder = HttpResponse::Ok();
    builder.insert_header((BATCH_ID_HEADER, run.batch.batch_id.as_str()));
    Ok(event_stream(builder, frames))
}
