use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::cart::{Cart, LineItem};
use crate::errors::AppError;
use crate::handlers::identity::{current_actor, guest_cart_token, CART_TOKEN_HEADER};
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddLineItemRequest {
    pub product_id: i64,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLineItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price captured when the product was added, e.g. "99.00"
    pub price: String,
    pub total_price: String,
}

impl From<&LineItem> for LineItemResponse {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price.to_string(),
            total_price: item.total_price().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub id: i64,
    pub line_items: Vec<LineItemResponse>,
    pub total_price: String,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            id: cart.id,
            line_items: cart.line_items.iter().map(LineItemResponse::from).collect(),
            total_price: cart.total_price().to_string(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn resolve_cart(state: &web::Data<AppState>, req: &HttpRequest) -> Result<Cart, AppError> {
    let user_id = current_actor(state, req).await?.map(|a| a.user_id);
    let guest_token = guest_cart_token(req);

    let carts = state.carts.clone();
    let cart = web::block(move || carts.current_cart(user_id, guest_token))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(cart)
}

/// GET /cart
///
/// Returns the caller's cart, creating it on first use.
#[utoipa::path(
    get,
    path = "/cart",
    params(
        ("X-User-Id" = Option<i64>, Header, description = "Authenticated user"),
        ("X-Cart-Token" = Option<String>, Header, description = "Guest cart token"),
    ),
    responses(
        (status = 200, description = "Current cart", body = CartResponse),
        (status = 401, description = "Unknown user"),
    ),
    tag = "cart"
)]
pub async fn show_cart(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let cart = resolve_cart(&state, &req).await?;
    Ok(HttpResponse::Ok()
        .insert_header((CART_TOKEN_HEADER, cart.token.to_string()))
        .json(CartResponse::from(&cart)))
}

/// POST /cart/line_items
///
/// Adds a product to the cart. Adding a product that is already in the cart
/// increases its quantity.
#[utoipa::path(
    post,
    path = "/cart/line_items",
    request_body = AddLineItemRequest,
    responses(
        (status = 201, description = "Line item added", body = LineItemResponse),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid quantity"),
    ),
    tag = "cart"
)]
pub async fn add_line_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AddLineItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let cart = resolve_cart(&state, &req).await?;
    let token = cart.token;

    let carts = state.carts.clone();
    let item = web::block(move || carts.add_product(&cart, body.product_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created()
        .insert_header((CART_TOKEN_HEADER, token.to_string()))
        .json(LineItemResponse::from(&item)))
}

/// PATCH /cart/line_items/{id}
#[utoipa::path(
    patch,
    path = "/cart/line_items/{id}",
    params(("id" = i64, Path, description = "Line item id")),
    request_body = UpdateLineItemRequest,
    responses(
        (status = 200, description = "Quantity updated", body = LineItemResponse),
        (status = 404, description = "Line item not in this cart"),
        (status = 422, description = "Invalid quantity"),
    ),
    tag = "cart"
)]
pub async fn update_line_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateLineItemRequest>,
) -> Result<HttpResponse, AppError> {
    let line_item_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    let cart = resolve_cart(&state, &req).await?;
    let token = cart.token;

    let carts = state.carts.clone();
    let item = web::block(move || carts.update_line_item(&cart, line_item_id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok()
        .insert_header((CART_TOKEN_HEADER, token.to_string()))
        .json(LineItemResponse::from(&item)))
}

/// DELETE /cart/line_items/{id}
#[utoipa::path(
    delete,
    path = "/cart/line_items/{id}",
    params(("id" = i64, Path, description = "Line item id")),
    responses(
        (status = 204, description = "Line item removed"),
        (status = 404, description = "Line item not in this cart"),
    ),
    tag = "cart"
)]
pub async fn remove_line_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let line_item_id = path.into_inner();
    let cart = resolve_cart(&state, &req).await?;
    let token = cart.token;

    let carts = state.carts.clone();
    web::block(move || carts.remove_line_item(&cart, line_item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent()
        .insert_header((CART_TOKEN_HEADER, token.to_string()))
        .finish())
}
