use actix_web::{web, HttpResponse};
use chrono::{SecondsFormat, Utc};

/// ANY /api/status - liveness probe, no dependencies
pub async fn status() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/status", web::route().to(status));
}
