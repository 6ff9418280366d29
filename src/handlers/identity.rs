//! Request identity.
//!
//! Authentication happens upstream; the authenticated user id arrives in
//! `X-User-Id`. Anonymous visitors name their guest cart with the random
//! token in `X-Cart-Token`, which cart responses echo back.

use actix_web::{web, HttpRequest};
use uuid::Uuid;

use crate::domain::policy::Actor;
use crate::errors::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const CART_TOKEN_HEADER: &str = "X-Cart-Token";

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// A malformed user id is an authentication failure, not an anonymous request.
fn user_id(req: &HttpRequest) -> Result<Option<i64>, AppError> {
    match header_value(req, USER_ID_HEADER) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            log::warn!("Rejecting malformed {} header {:?}", USER_ID_HEADER, raw);
            AppError::Unauthorized
        }),
    }
}

/// An unusable guest cart token is treated as absent; a fresh cart is issued instead.
pub fn guest_cart_token(req: &HttpRequest) -> Option<Uuid> {
    header_value(req, CART_TOKEN_HEADER).and_then(|raw| raw.parse().ok())
}

/// The signed-in actor, if any. An id naming no user is rejected.
pub async fn current_actor(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<Option<Actor>, AppError> {
    let Some(user_id) = user_id(req)? else {
        return Ok(None);
    };

    let identity = state.identity.clone();
    let actor = web::block(move || identity.find_actor(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match actor {
        Some(actor) => Ok(Some(actor)),
        None => {
            log::warn!("Rejecting unknown user {}", user_id);
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn require_actor(state: &web::Data<AppState>, req: &HttpRequest) -> Result<Actor, AppError> {
    current_actor(state, req).await?.ok_or(AppError::Unauthorized)
}
