use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::{Cart, LineItem};
use super::errors::{DomainError, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DomainError::Invalid(ValidationErrors::single(
                    "status",
                    "is not included in the list",
                ))
            })
    }
}

/// A line copied out of a cart: product, quantity and the price captured in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineInput {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// An order that has been built from a cart but not yet persisted.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_price: BigDecimal,
    pub lines: Vec<OrderLineInput>,
}

impl OrderDraft {
    /// Snapshot a cart into a pending order for `user_id`.
    ///
    /// Fails with `EmptyCart` when there is no cart or it holds no line items.
    pub fn from_cart(cart: Option<&Cart>, user_id: i64) -> Result<Self, DomainError> {
        let cart = match cart {
            Some(cart) if !cart.is_empty() => cart,
            _ => return Err(DomainError::EmptyCart),
        };

        let lines = cart
            .line_items
            .iter()
            .map(|l| OrderLineInput {
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.price.clone(),
            })
            .collect();

        Ok(Self {
            user_id,
            status: OrderStatus::Pending,
            total_price: cart.total_price(),
            lines,
        })
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<LineItem>,
}

#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: i64,
}
