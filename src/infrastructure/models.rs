use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cart::{LineItem, LineItemOwner};
use crate::domain::errors::DomainError;
use crate::domain::order::OrderView;
use crate::domain::product::{Product, ProductInput};
use crate::domain::rating::Rating;
use crate::schema::{carts, line_items, orders, products, ratings, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub category_id: i64,
    pub brand_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: &'a BigDecimal,
    pub category_id: i64,
    pub brand_id: Option<i64>,
}

impl<'a> From<&'a ProductInput> for NewProductRow<'a> {
    fn from(input: &'a ProductInput) -> Self {
        Self {
            name: &input.name,
            description: input.description.as_deref(),
            price: &input.price,
            category_id: input.category_id,
            brand_id: input.brand_id,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            brand_id: row.brand_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub token: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub user_id: Option<i64>,
    pub token: Uuid,
}

impl NewCartRow {
    pub fn for_user(user_id: Option<i64>) -> Self {
        Self {
            user_id,
            token: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = line_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LineItemRow {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: BigDecimal,
    pub buyable_type: String,
    pub buyable_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = line_items)]
pub struct NewLineItemRow {
    pub product_id: i64,
    pub quantity: i32,
    pub price: BigDecimal,
    pub buyable_type: &'static str,
    pub buyable_id: i64,
}

impl NewLineItemRow {
    pub fn owned_by(owner: LineItemOwner, product_id: i64, quantity: i32, price: BigDecimal) -> Self {
        Self {
            product_id,
            quantity,
            price,
            buyable_type: owner.kind(),
            buyable_id: owner.id(),
        }
    }
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = DomainError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        Ok(LineItem {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
            owner: LineItemOwner::from_parts(&row.buyable_type, row.buyable_id)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub user_id: i64,
    pub status: &'static str,
    pub total_price: &'a BigDecimal,
}

impl OrderRow {
    pub fn into_view(self, lines: Vec<LineItemRow>) -> Result<OrderView, DomainError> {
        Ok(OrderView {
            id: self.id,
            user_id: self.user_id,
            status: self
                .status
                .parse()
                .map_err(|_| DomainError::Persistence(format!("unknown order status '{}'", self.status)))?,
            total_price: self.total_price,
            created_at: self.created_at,
            updated_at: self.updated_at,
            lines: lines
                .into_iter()
                .map(LineItem::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RatingRow {
    pub id: i64,
    pub value: i32,
    pub product_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ratings)]
pub struct NewRatingRow {
    pub value: i32,
    pub product_id: i64,
    pub user_id: i64,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            id: row.id,
            value: row.value,
            product_id: row.product_id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
