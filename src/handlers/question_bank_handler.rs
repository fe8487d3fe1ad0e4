use std::sync::Arc;

use actix_web::{delete, get, web, HttpResponse};

use crate::{app_state::AppState, errors::AppError};

#[get("/api/teacher/ai/batches")]
pub async fn list_batches(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let batches = state.question_bank_service.list_batches().await?;
    Ok(HttpResponse::Ok().json(batches))
}

#[get("/api/teacher/ai/batches/{batch_id}/questions")]
pub async fn list_batch_questions(
    state: web::Data<Arc<AppState>>,
    batch_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let questions = state
        .question_bank_service
        .list_questions_by_batch(&batch_id)
        .await?;
    Ok(HttpResponse::Ok().json(questions))
}

#[get("/api/teacher/ai/questions")]
pub async fn list_questions(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let questions = state.question_bank_service.list_questions().await?;
    Ok(HttpResponse::Ok().json(questions))
}

#[delete("/api/teacher/ai/questions/{id}")]
pub async fn delete_question(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.question_bank_service.delete_question(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/api/teacher/ai/conversations/{conversation_id}")]
pub async fn get_conversation(
    state: web::Data<Arc<AppState>>,
    conversation_id: web::Path<String>,
) -> HttpResponse {
    let messages = state
        .question_bank_service
        .conversation_history(&conversation_id)
        .await;
    HttpResponse::Ok().json(messages)
}
