use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::order::OrderView;
use crate::errors::AppError;
use crate::handlers::carts::LineItemResponse;
use crate::handlers::identity::require_actor;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    /// One of pending, confirmed, shipped, delivered
    pub status: String,
    /// Decimal total as a string, e.g. "16197.00"
    pub total_price: String,
    pub created_at: String,
    pub updated_at: String,
    pub line_items: Vec<LineItemResponse>,
}

impl From<&OrderView> for OrderResponse {
    fn from(order: &OrderView) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status.to_string(),
            total_price: order.total_price.to_string(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            line_items: order.lines.iter().map(LineItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: String,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checks out the caller's cart. The order and its line items are written
/// and the cart is destroyed inside one database transaction, so either both
/// happen or neither does.
#[utoipa::path(
    post,
    path = "/orders",
    params(("X-User-Id" = i64, Header, description = "Authenticated user")),
    responses(
        (status = 201, description = "Order created from the cart", body = OrderResponse),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Cart not found"),
        (status = 422, description = "Cart is empty"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&state, &req).await?;

    let carts = state.carts.clone();
    let orders = state.orders.clone();
    let order = web::block(move || {
        let cart_id = carts.cart_id_for_user(actor.user_id)?;
        orders.checkout(cart_id, &actor)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(&order)))
}

/// GET /orders/{id}
///
/// Returns the order together with its line items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Order belongs to someone else"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let actor = require_actor(&state, &req).await?;

    let orders = state.orders.clone();
    let order = web::block(move || orders.get_order(&actor, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}

/// GET /orders
///
/// Returns a paginated list of orders (without their lines), newest first.
/// Admins see every order, everyone else only their own.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let actor = require_actor(&state, &req).await?;

    let orders = state.orders.clone();
    let result = web::block(move || orders.list_orders(&actor, page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PATCH /orders/{id}
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Unknown status"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;
    let actor = require_actor(&state, &req).await?;

    let orders = state.orders.clone();
    let order = web::block(move || orders.update_status(&actor, order_id, &status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    log::info!("Order {} is now {}", order.id, order.status);
    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}
