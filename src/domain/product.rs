use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::errors::{DomainError, ValidationErrors};

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub category_id: i64,
    pub brand_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw product attributes as submitted. Every field is optional so the same
/// shape serves creation and partial updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductParams {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Decimal as a string, e.g. "99.90".
    pub price: Option<String>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
}

/// Validated product attributes, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub category_id: i64,
    pub brand_id: Option<i64>,
}

impl ProductParams {
    /// Fill the attributes not given here from the stored product.
    pub fn merged_onto(self, product: &Product) -> ProductParams {
        ProductParams {
            name: self.name.or_else(|| Some(product.name.clone())),
            description: self.description.or_else(|| product.description.clone()),
            price: self.price.or_else(|| Some(product.price.to_string())),
            category_id: self.category_id.or(Some(product.category_id)),
            brand_id: self.brand_id.or(product.brand_id),
        }
    }

    pub fn validate(self) -> Result<ProductInput, DomainError> {
        let mut errors = ValidationErrors::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                errors.add("name", "can't be blank");
                String::new()
            }
        };

        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("price", "can't be blank");
                None
            }
            Some(raw) => match BigDecimal::from_str(raw) {
                Ok(price) if price < BigDecimal::from(0) => {
                    errors.add("price", "must be greater than or equal to 0");
                    None
                }
                Ok(price) => Some(price),
                Err(_) => {
                    errors.add("price", "is not a number");
                    None
                }
            },
        };

        if self.category_id.is_none() {
            errors.add("category_id", "can't be blank");
        }

        match (price, self.category_id) {
            (Some(price), Some(category_id)) if errors.is_empty() => Ok(ProductInput {
                name,
                description: self.description,
                price,
                category_id,
                brand_id: self.brand_id,
            }),
            _ => Err(DomainError::Invalid(errors)),
        }
    }
}
