use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::{DomainError, ValidationErrors};

/// Owner of a line item: the cart it sits in, or the order it was copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemOwner {
    Cart(i64),
    Order(i64),
}

impl LineItemOwner {
    pub const CART: &'static str = "Cart";
    pub const ORDER: &'static str = "Order";

    pub fn kind(&self) -> &'static str {
        match self {
            LineItemOwner::Cart(_) => Self::CART,
            LineItemOwner::Order(_) => Self::ORDER,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            LineItemOwner::Cart(id) | LineItemOwner::Order(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, id: i64) -> Result<Self, DomainError> {
        match kind {
            Self::CART => Ok(LineItemOwner::Cart(id)),
            Self::ORDER => Ok(LineItemOwner::Order(id)),
            other => Err(DomainError::Persistence(format!(
                "unknown line item owner kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price captured when the product was added.
    pub price: BigDecimal,
    pub owner: LineItemOwner,
}

impl LineItem {
    pub fn total_price(&self) -> BigDecimal {
        &self.price * &BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct Cart {
    pub id: i64,
    pub user_id: Option<i64>,
    /// Unguessable handle a guest presents to reopen the cart.
    pub token: Uuid,
    pub line_items: Vec<LineItem>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    pub fn total_price(&self) -> BigDecimal {
        self.line_items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.total_price())
    }

    /// Guest carts are open to anyone holding their token; owned carts only to their owner.
    pub fn is_accessible_by(&self, user_id: i64) -> bool {
        self.user_id.map_or(true, |owner| owner == user_id)
    }
}

pub fn validate_quantity(quantity: i32) -> Result<i32, DomainError> {
    if quantity > 0 {
        Ok(quantity)
    } else {
        Err(DomainError::Invalid(ValidationErrors::single(
            "quantity",
            "must be greater than 0",
        )))
    }
}
