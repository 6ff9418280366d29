use std::collections::HashMap;

use bigdecimal::BigDecimal;
use diesel::dsl::{avg, count};
use diesel::pg::Pg;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::{DomainError, ValidationErrors};
use crate::domain::ports::RatingRepository;
use crate::domain::rating::{
    CategoryAverage, NewRating, ProductSummary, Rating, RatingDetails, RatingPage, UserSummary,
};
use crate::domain::rating_query::{PaginationMeta, RatingFilters, RatingQuery, Sort, SortColumn, SortDirection};
use crate::schema::{categories, products, ratings, users};

use super::models::{NewRatingRow, RatingRow};

#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Filter stage: every present filter narrows the set (AND).
fn filtered(filters: &RatingFilters) -> ratings::BoxedQuery<'static, Pg> {
    let mut query = ratings::table.into_boxed();

    if let Some(product_id) = filters.product_id {
        query = query.filter(ratings::product_id.eq(product_id));
    }
    if let Some(user_id) = filters.user_id {
        query = query.filter(ratings::user_id.eq(user_id));
    }
    if let Some(min) = filters.min_rating {
        query = query.filter(ratings::value.ge(min));
    }
    if let Some(max) = filters.max_rating {
        query = query.filter(ratings::value.le(max));
    }
    if let Some(from) = filters.from {
        query = query.filter(ratings::created_at.ge(from));
    }
    if let Some(to) = filters.to {
        query = query.filter(ratings::created_at.le(to));
    }
    query
}

/// Sort stage. Columns come from a closed enum; `id` breaks ties so pages are stable.
fn sorted(query: ratings::BoxedQuery<'static, Pg>, sort: Sort) -> ratings::BoxedQuery<'static, Pg> {
    use SortColumn::*;
    use SortDirection::*;

    let query = match (sort.column, sort.direction) {
        (Value, Asc) => query.order_by(ratings::value.asc()),
        (Value, Desc) => query.order_by(ratings::value.desc()),
        (CreatedAt, Asc) => query.order_by(ratings::created_at.asc()),
        (CreatedAt, Desc) => query.order_by(ratings::created_at.desc()),
        (ProductId, Asc) => query.order_by(ratings::product_id.asc()),
        (ProductId, Desc) => query.order_by(ratings::product_id.desc()),
        (UserId, Asc) => query.order_by(ratings::user_id.asc()),
        (UserId, Desc) => query.order_by(ratings::user_id.desc()),
    };
    match sort.direction {
        Asc => query.then_order_by(ratings::id.asc()),
        Desc => query.then_order_by(ratings::id.desc()),
    }
}

/// Hydration stage: one query per related table for the whole page.
fn hydrate(conn: &mut PgConnection, rows: Vec<RatingRow>) -> Result<Vec<RatingDetails>, DomainError> {
    let mut product_ids: Vec<i64> = rows.iter().map(|r| r.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let mut user_ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let products: HashMap<i64, String> = products::table
        .filter(products::id.eq_any(product_ids))
        .select((products::id, products::name))
        .load::<(i64, String)>(conn)?
        .into_iter()
        .collect();
    let users: HashMap<i64, String> = users::table
        .filter(users::id.eq_any(user_ids))
        .select((users::id, users::email))
        .load::<(i64, String)>(conn)?
        .into_iter()
        .collect();

    rows.into_iter()
        .map(|row| {
            let product = products
                .get(&row.product_id)
                .map(|name| ProductSummary { id: row.product_id, name: name.clone() })
                .ok_or(DomainError::NotFound("Product"))?;
            let user = users
                .get(&row.user_id)
                .map(|email| UserSummary { id: row.user_id, email: email.clone() })
                .ok_or(DomainError::NotFound("User"))?;
            Ok(RatingDetails { rating: Rating::from(row), product, user })
        })
        .collect()
}

impl RatingRepository for DieselRatingRepository {
    fn create(&self, user_id: i64, rating: NewRating) -> Result<Rating, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let product_exists: i64 = products::table
                .find(rating.product_id)
                .count()
                .get_result(conn)?;
            if product_exists == 0 {
                return Err(DomainError::Invalid(ValidationErrors::single("product", "must exist")));
            }

            let row = diesel::insert_into(ratings::table)
                .values(&NewRatingRow {
                    value: rating.value,
                    product_id: rating.product_id,
                    user_id,
                })
                .returning(RatingRow::as_returning())
                .get_result(conn)?;
            Ok(row.into())
        })
    }

    fn find_by_id(&self, id: i64) -> Result<Option<RatingDetails>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = ratings::table
            .find(id)
            .select(RatingRow::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(hydrate(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn list(&self, query: &RatingQuery) -> Result<RatingPage, DomainError> {
        let mut conn = self.pool.get()?;

        // Count and page read one snapshot so the metadata matches the rows.
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let total_count: i64 = filtered(&query.filters).count().get_result(conn)?;

                let rows = sorted(filtered(&query.filters), query.sort)
                    .select(RatingRow::as_select())
                    .limit(query.page.per_page)
                    .offset(query.page.offset())
                    .load(conn)?;

                Ok(RatingPage {
                    ratings: hydrate(conn, rows)?,
                    pagination: PaginationMeta::new(query.page, total_count),
                })
            })
    }

    fn category_averages(&self) -> Result<Vec<CategoryAverage>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = ratings::table
            .inner_join(products::table.inner_join(categories::table))
            .group_by((categories::id, categories::name))
            .select((
                categories::id,
                categories::name,
                avg(ratings::value),
                count(ratings::id),
            ))
            .order_by(categories::id.asc())
            .load::<(i64, String, Option<BigDecimal>, i64)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(id, name, average, n)| CategoryAverage::from_aggregate(id, name, average, n))
            .collect())
    }
}
