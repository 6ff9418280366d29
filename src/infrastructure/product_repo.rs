use diesel::dsl::now;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbPool;
use crate::domain::errors::{DomainError, ValidationErrors};
use crate::domain::policy::ProductScope;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductInput};
use crate::schema::{brands, categories, products};

use super::models::{NewProductRow, ProductRow};

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Referenced category and brand must exist.
fn check_references(conn: &mut PgConnection, input: &ProductInput) -> Result<(), DomainError> {
    let mut errors = ValidationErrors::new();

    let category: i64 = categories::table
        .find(input.category_id)
        .count()
        .get_result(conn)?;
    if category == 0 {
        errors.add("category", "must exist");
    }

    if let Some(brand_id) = input.brand_id {
        let brand: i64 = brands::table.find(brand_id).count().get_result(conn)?;
        if brand == 0 {
            errors.add("brand", "must exist");
        }
    }

    errors.into_result(())
}

impl ProductRepository for DieselProductRepository {
    fn list(&self, scope: &ProductScope) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = products::table.into_boxed();
        if let ProductScope::Brands(brand_ids) = scope {
            query = query.filter(products::brand_id.eq_any(brand_ids.clone()));
        }

        let rows = query
            .select(ProductRow::as_select())
            .order(products::id.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn create(&self, input: &ProductInput) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            check_references(conn, input)?;
            let row = diesel::insert_into(products::table)
                .values(NewProductRow::from(input))
                .returning(ProductRow::as_returning())
                .get_result(conn)?;
            log::info!("Created product {} '{}'", row.id, row.name);
            Ok(row.into())
        })
    }

    fn update(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            check_references(conn, input)?;
            let row = diesel::update(products::table.find(id))
                .set((
                    products::name.eq(&input.name),
                    products::description.eq(input.description.as_deref()),
                    products::price.eq(&input.price),
                    products::category_id.eq(input.category_id),
                    products::brand_id.eq(input.brand_id),
                    products::updated_at.eq(now),
                ))
                .returning(ProductRow::as_returning())
                .get_result(conn)
                .optional()?;
            Ok(row.map(Product::from))
        })
    }

    fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        match diesel::delete(products::table.find(id)).execute(&mut conn) {
            Ok(deleted) => Ok(deleted > 0),
            // Line items and ratings keep their product.
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Err(DomainError::Invalid(ValidationErrors::single(
                    "base",
                    "product is still referenced by line items or ratings",
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}
