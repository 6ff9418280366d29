use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::product::{Product, ProductParams};
use crate::errors::AppError;
use crate::handlers::identity::{current_actor, require_actor};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductAttributes {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Decimal price as a string, e.g. "99.90"
    pub price: Option<String>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub product: ProductAttributes,
}

impl From<ProductRequest> for ProductParams {
    fn from(body: ProductRequest) -> Self {
        let p = body.product;
        ProductParams {
            name: p.name,
            description: p.description,
            price: p.price,
            category_id: p.category_id,
            brand_id: p.brand_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub category_id: i64,
    pub brand_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            category_id: p.category_id,
            brand_id: p.brand_id,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// GET /products
///
/// Suppliers only see products of the brands they supply.
#[utoipa::path(
    get,
    path = "/products",
    responses((status = 200, description = "Visible products", body = [ProductResponse])),
    tag = "products"
)]
pub async fn list_products(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&state, &req).await?;

    let products = state.products.clone();
    let list = web::block(move || products.list(actor.as_ref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(list.into_iter().map(ProductResponse::from).collect::<Vec<_>>()))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let products = state.products.clone();
    let product = web::block(move || products.get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Customers may not create products"),
        (status = 422, description = "Invalid attributes"),
    ),
    tag = "products"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let params = ProductParams::from(body.into_inner());
    let actor = require_actor(&state, &req).await?;

    let products = state.products.clone();
    let product = web::block(move || products.create(&actor, params))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PATCH /products/{id}
///
/// Attributes left out keep their stored value.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 403, description = "Not allowed to edit this product"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid attributes"),
    ),
    tag = "products"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let params = ProductParams::from(body.into_inner());
    let actor = require_actor(&state, &req).await?;

    let products = state.products.clone();
    let product = web::block(move || products.update(&actor, id, params))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Not allowed to delete this product"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let actor = require_actor(&state, &req).await?;

    let products = state.products.clone();
    web::block(move || products.delete(&actor, id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
