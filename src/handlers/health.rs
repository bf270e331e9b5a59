use actix_web::HttpResponse;
use chrono::Utc;
use serde_json::json;

/// Liveness probe. Does not touch the database.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "Healthy",
        "timestamp": Utc::now(),
    }))
}
