use std::sync::Arc;

use actix_web::{get, web, HttpResponse};

use crate::app_state::AppState;

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
pub async fn health_check_ready(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let mongodb = match &state.db {
        Some(db) => match db.health_check().await {
            Ok(()) => "ok",
            Err(e) => {
                log::warn!("Readiness check failed: {}", e);
                "error"
            }
        },
        None => "disabled",
    };
    let ready = mongodb != "error";

    let response = serde_json::json!({
        "status": if ready { "ready" } else { "not_ready" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "mongodb": mongodb
        }
    });

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[get("/health/live")]
pub async fn health_check_live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
