use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::{DomainError, ValidationErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not authorized")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::EmptyCart => AppError::EmptyCart,
            DomainError::NotFound(entity) => AppError::NotFound(entity.to_string()),
            DomainError::Invalid(errors) => AppError::Validation(errors),
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::Persistence(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EmptyCart | AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(_) | AppError::BadRequest(_) | AppError::Unauthorized | AppError::Forbidden => {
                json!({ "error": self.to_string() })
            }
            AppError::EmptyCart => json!({ "error": "empty_cart" }),
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                json!({ "error": "Internal server error" })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

fn rejected(message: String, req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejecting undecodable request to {}: {}", req.path(), message);
    AppError::BadRequest(message).into()
}

/// Extractor configs that answer undecodable bodies, queries and paths with
/// the same JSON error body as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, req| rejected(err.to_string(), req))
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, req| rejected(err.to_string(), req))
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, req| rejected(err.to_string(), req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body())
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn empty_cart_and_validation_return_422() {
        assert_eq!(
            AppError::EmptyCart.error_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let errors = ValidationErrors::single("value", "can't be blank");
        assert_eq!(
            AppError::Validation(errors).error_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[actix_web::test]
    async fn undecodable_requests_get_json_400s() {
        use actix_web::{test, App};
        use serde::Deserialize;

        #[derive(Deserialize)]
        struct Envelope {
            #[allow(dead_code)]
            rating: serde_json::Value,
        }

        #[derive(Deserialize)]
        struct Paging {
            #[allow(dead_code)]
            page: i64,
        }

        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(query_config())
                .app_data(path_config())
                .route("/ratings", web::post().to(|_: web::Json<Envelope>| async { HttpResponse::Created().finish() }))
                .route("/orders", web::get().to(|_: web::Query<Paging>| async { HttpResponse::Ok().finish() }))
                .route("/orders/{id}", web::get().to(|_: web::Path<i64>| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let requests = [
            test::TestRequest::post()
                .uri("/ratings")
                .set_json(json!({ "value": 5, "product_id": 1 }))
                .to_request(),
            test::TestRequest::post()
                .uri("/ratings")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json")
                .to_request(),
            test::TestRequest::get().uri("/orders?page=first").to_request(),
            test::TestRequest::get().uri("/orders/abc").to_request(),
        ];

        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert!(body["error"].is_string(), "unexpected body {body}");
        }
    }

    #[test]
    fn identity_errors_return_401_and_403() {
        assert_eq!(AppError::Unauthorized.error_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.error_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn bodies_name_the_failure() {
        assert_eq!(
            body_of(AppError::NotFound("Cart".to_string())).await,
            json!({ "error": "Cart not found" })
        );
        assert_eq!(body_of(AppError::EmptyCart).await, json!({ "error": "empty_cart" }));
        assert_eq!(
            body_of(AppError::Validation(ValidationErrors::single("value", "must be an integer"))).await,
            json!({ "errors": { "value": ["must be an integer"] } })
        );
    }

    #[actix_web::test]
    async fn internal_details_are_not_leaked() {
        assert_eq!(
            body_of(AppError::Internal("relation \"ratings\" does not exist".to_string())).await,
            json!({ "error": "Internal server error" })
        );
    }

    #[test]
    fn domain_errors_map_one_to_one() {
        assert!(matches!(AppError::from(DomainError::EmptyCart), AppError::EmptyCart));
        assert!(matches!(
            AppError::from(DomainError::NotFound("Rating")),
            AppError::NotFound(ref e) if e == "Rating"
        ));
        assert!(matches!(AppError::from(DomainError::Forbidden), AppError::Forbidden));
        assert!(matches!(
            AppError::from(DomainError::Invalid(ValidationErrors::new())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::Persistence("oops".to_string())),
            AppError::Internal(_)
        ));
    }
}
