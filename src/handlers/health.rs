use actix_web::HttpResponse;
use serde_json::json;

/// GET /up
#[utoipa::path(
    get,
    path = "/up",
    responses((status = 200, description = "Service is running")),
    tag = "health"
)]
pub async fn up() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
