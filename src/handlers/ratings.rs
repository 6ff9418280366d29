use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rating::{CategoryAverage, Rating, RatingDetails, RatingParams};
use crate::domain::rating_query::{PaginationMeta, RatingQueryParams};
use crate::errors::AppError;
use crate::handlers::identity::require_actor;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRatingRequest {
    /// `{"value": 1..5, "product_id": id}`; integer strings are accepted too.
    #[schema(value_type = Object)]
    pub rating: RatingParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingResponse {
    pub id: i64,
    pub value: i32,
    pub product_id: i64,
    pub user_id: i64,
    pub created_at: String,
}

impl From<&Rating> for RatingResponse {
    fn from(r: &Rating) -> Self {
        Self {
            id: r.id,
            value: r.value,
            product_id: r.product_id,
            user_id: r.user_id,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRef {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingDetailsResponse {
    pub id: i64,
    pub value: i32,
    pub product_id: i64,
    pub user_id: i64,
    pub created_at: String,
    pub product: ProductRef,
    pub user: UserRef,
}

impl From<RatingDetails> for RatingDetailsResponse {
    fn from(d: RatingDetails) -> Self {
        Self {
            id: d.rating.id,
            value: d.rating.value,
            product_id: d.rating.product_id,
            user_id: d.rating.user_id,
            created_at: d.rating.created_at.to_rfc3339(),
            product: ProductRef { id: d.product.id, name: d.product.name },
            user: UserRef { id: d.user.id, email: d.user.email },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationResponse {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub per_page: i64,
}

impl From<PaginationMeta> for PaginationResponse {
    fn from(m: PaginationMeta) -> Self {
        Self {
            current_page: m.current_page,
            total_pages: m.total_pages,
            total_count: m.total_count,
            per_page: m.per_page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingListResponse {
    pub success: bool,
    pub data: Vec<RatingDetailsResponse>,
    pub pagination: PaginationResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryAverageResponse {
    pub category_id: i64,
    pub category_name: String,
    pub average_rating: f64,
    pub ratings_count: i64,
}

impl From<CategoryAverage> for CategoryAverageResponse {
    fn from(a: CategoryAverage) -> Self {
        Self {
            category_id: a.category_id,
            category_name: a.category_name,
            average_rating: a.average_rating,
            ratings_count: a.ratings_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryAveragesResponse {
    pub success: bool,
    pub data: Vec<CategoryAverageResponse>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /ratings
#[utoipa::path(
    post,
    path = "/ratings",
    params(("X-User-Id" = i64, Header, description = "Authenticated user")),
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating stored", body = RatingResponse),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Field-keyed validation errors"),
    ),
    tag = "ratings"
)]
pub async fn create_rating(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateRatingRequest>,
) -> Result<HttpResponse, AppError> {
    let params = body.into_inner().rating;
    let actor = require_actor(&state, &req).await?;

    let ratings = state.ratings.clone();
    let rating = web::block(move || ratings.create(&actor, &params))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(RatingResponse::from(&rating)))
}

/// GET /ratings
///
/// Filters, sorts and paginates ratings. Parameters that cannot be parsed
/// are ignored; `sort_by` outside the whitelist falls back to `created_at`.
#[utoipa::path(
    get,
    path = "/ratings",
    params(
        ("product_id" = Option<i64>, Query, description = "Exact product"),
        ("user_id" = Option<i64>, Query, description = "Exact author"),
        ("min_rating" = Option<i32>, Query, description = "value >= min_rating"),
        ("max_rating" = Option<i32>, Query, description = "value <= max_rating"),
        ("from_date" = Option<String>, Query, description = "Created at or after (date or RFC 3339)"),
        ("to_date" = Option<String>, Query, description = "Created at or before (date or RFC 3339)"),
        ("sort_by" = Option<String>, Query, description = "value | created_at | product_id | user_id"),
        ("direction" = Option<String>, Query, description = "asc | desc (default)"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default 25, max 100)"),
    ),
    responses(
        (status = 200, description = "A page of ratings", body = RatingListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "ratings"
)]
pub async fn list_ratings(
    state: web::Data<AppState>,
    query: web::Query<RatingQueryParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();

    let ratings = state.ratings.clone();
    let page = web::block(move || ratings.list(&params))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(RatingListResponse {
        success: true,
        data: page.ratings.into_iter().map(RatingDetailsResponse::from).collect(),
        pagination: page.pagination.into(),
    }))
}

/// GET /ratings/category_averages
#[utoipa::path(
    get,
    path = "/ratings/category_averages",
    responses(
        (status = 200, description = "Mean rating per category with at least one rating", body = CategoryAveragesResponse),
    ),
    tag = "ratings"
)]
pub async fn category_averages(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ratings = state.ratings.clone();
    let averages = web::block(move || ratings.category_averages())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CategoryAveragesResponse {
        success: true,
        data: averages.into_iter().map(CategoryAverageResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/ratings/{id}",
    params(("id" = i64, Path, description = "Rating id")),
    responses(
        (status = 200, description = "Rating with product and user", body = RatingDetailsResponse),
        (status = 404, description = "Rating not found"),
    ),
    tag = "ratings"
)]
pub async fn get_rating(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let ratings = state.ratings.clone();
    let rating = web::block(move || ratings.get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(RatingDetailsResponse::from(rating)))
}
