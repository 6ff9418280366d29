use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::errors::{DomainError, ValidationErrors};
use super::rating_query::PaginationMeta;

pub const MIN_VALUE: i64 = 1;
pub const MAX_VALUE: i64 = 5;

/// Rating attributes exactly as submitted. Kept as raw JSON so that strings,
/// floats and missing keys can each be reported precisely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingParams {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub product_id: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRating {
    pub value: i32,
    pub product_id: i64,
}

enum Integer {
    Blank,
    NotANumber,
    Fractional,
    Whole(i64),
}

fn classify(raw: Option<&Value>) -> Integer {
    match raw {
        None | Some(Value::Null) => Integer::Blank,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Integer::Whole(i),
            None => Integer::Fractional,
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Integer::Blank
            } else if let Ok(i) = s.parse::<i64>() {
                Integer::Whole(i)
            } else if s.parse::<f64>().is_ok() {
                Integer::Fractional
            } else {
                Integer::NotANumber
            }
        }
        Some(_) => Integer::NotANumber,
    }
}

impl RatingParams {
    pub fn validate(&self) -> Result<NewRating, DomainError> {
        let mut errors = ValidationErrors::new();

        let value = match classify(self.value.as_ref()) {
            Integer::Blank => {
                errors.add("value", "can't be blank");
                None
            }
            Integer::NotANumber => {
                errors.add("value", "is not a number");
                None
            }
            Integer::Fractional => {
                errors.add("value", "must be an integer");
                None
            }
            Integer::Whole(v) if v < MIN_VALUE => {
                errors.add("value", format!("must be greater than or equal to {MIN_VALUE}"));
                None
            }
            Integer::Whole(v) if v > MAX_VALUE => {
                errors.add("value", format!("must be less than or equal to {MAX_VALUE}"));
                None
            }
            Integer::Whole(v) => i32::try_from(v).ok(),
        };

        let product_id = match classify(self.product_id.as_ref()) {
            Integer::Blank => {
                errors.add("product_id", "can't be blank");
                None
            }
            Integer::Whole(id) => Some(id),
            Integer::NotANumber | Integer::Fractional => {
                errors.add("product_id", "is invalid");
                None
            }
        };

        match (value, product_id) {
            (Some(value), Some(product_id)) if errors.is_empty() => {
                Ok(NewRating { value, product_id })
            }
            _ => Err(DomainError::Invalid(errors)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rating {
    pub id: i64,
    pub value: i32,
    pub product_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
}

/// A rating with its product and author attached.
#[derive(Debug, Clone)]
pub struct RatingDetails {
    pub rating: Rating,
    pub product: ProductSummary,
    pub user: UserSummary,
}

#[derive(Debug, Clone)]
pub struct RatingPage {
    pub ratings: Vec<RatingDetails>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAverage {
    pub category_id: i64,
    pub category_name: String,
    pub average_rating: f64,
    pub ratings_count: i64,
}

impl CategoryAverage {
    /// Build from one row of the grouped aggregate; the mean is rounded half-up to 2 places.
    pub fn from_aggregate(
        category_id: i64,
        category_name: String,
        average: Option<BigDecimal>,
        ratings_count: i64,
    ) -> Self {
        let average_rating = average
            .map(|avg| avg.with_scale_round(2, RoundingMode::HalfUp))
            .and_then(|avg| avg.to_f64())
            .unwrap_or(0.0);

        Self {
            category_id,
            category_name,
            average_rating,
            ratings_count,
        }
    }
}
