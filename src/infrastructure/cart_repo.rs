use bigdecimal::BigDecimal;
use diesel::dsl::now;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{Cart, LineItem, LineItemOwner};
use crate::domain::errors::{DomainError, ValidationErrors};
use crate::domain::ports::CartRepository;
use crate::schema::{carts, line_items, products};

use super::models::{CartRow, LineItemRow, NewCartRow, NewLineItemRow};

#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(super) fn load_cart_lines(conn: &mut PgConnection, cart_id: i64) -> QueryResult<Vec<LineItemRow>> {
    line_items::table
        .filter(line_items::buyable_type.eq(LineItemOwner::CART))
        .filter(line_items::buyable_id.eq(cart_id))
        .order(line_items::id.asc())
        .select(LineItemRow::as_select())
        .load(conn)
}

pub(super) fn hydrate_cart(conn: &mut PgConnection, row: CartRow) -> Result<Cart, DomainError> {
    let line_items = load_cart_lines(conn, row.id)?
        .into_iter()
        .map(LineItem::try_from)
        .collect::<Result<_, _>>()?;
    Ok(Cart {
        id: row.id,
        user_id: row.user_id,
        token: row.token,
        line_items,
    })
}

fn find_user_cart(conn: &mut PgConnection, user_id: i64) -> QueryResult<Option<CartRow>> {
    carts::table
        .filter(carts::user_id.eq(user_id))
        .select(CartRow::as_select())
        .first(conn)
        .optional()
}

/// Lock the cart row so line item changes serialize with a concurrent checkout.
fn lock_cart(conn: &mut PgConnection, cart_id: i64) -> Result<(), DomainError> {
    carts::table
        .find(cart_id)
        .select(carts::id)
        .for_update()
        .first::<i64>(conn)
        .optional()?
        .map(|_| ())
        .ok_or(DomainError::NotFound("Cart"))
}

impl CartRepository for DieselCartRepository {
    fn find_or_create_for_user(&self, user_id: i64) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;

        if let Some(row) = find_user_cart(&mut conn, user_id)? {
            return hydrate_cart(&mut conn, row);
        }

        // A concurrent request may create the cart first; the partial unique
        // index turns our insert into a no-op and the re-read finds theirs.
        diesel::insert_into(carts::table)
            .values(&NewCartRow::for_user(Some(user_id)))
            .on_conflict_do_nothing()
            .execute(&mut conn)?;
        let row = find_user_cart(&mut conn, user_id)?.ok_or(DomainError::NotFound("Cart"))?;
        log::debug!("Created cart {} for user {}", row.id, user_id);
        hydrate_cart(&mut conn, row)
    }

    fn find_or_create_guest(&self, token: Option<Uuid>) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;

        if let Some(token) = token {
            let existing = carts::table
                .filter(carts::token.eq(token))
                .filter(carts::user_id.is_null())
                .select(CartRow::as_select())
                .first(&mut conn)
                .optional()?;
            if let Some(row) = existing {
                return hydrate_cart(&mut conn, row);
            }
        }

        let row = diesel::insert_into(carts::table)
            .values(&NewCartRow::for_user(None))
            .returning(CartRow::as_returning())
            .get_result(&mut conn)?;
        log::debug!("Created guest cart {}", row.id);
        hydrate_cart(&mut conn, row)
    }

    fn find_id_for_user(&self, user_id: i64) -> Result<Option<i64>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(find_user_cart(&mut conn, user_id)?.map(|row| row.id))
    }

    fn add_product(&self, cart_id: i64, product_id: i64, quantity: i32) -> Result<LineItem, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_cart(conn, cart_id)?;

            let price: BigDecimal = products::table
                .find(product_id)
                .select(products::price)
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Product"))?;

            let existing = line_items::table
                .filter(line_items::buyable_type.eq(LineItemOwner::CART))
                .filter(line_items::buyable_id.eq(cart_id))
                .filter(line_items::product_id.eq(product_id))
                .select(LineItemRow::as_select())
                .first(conn)
                .optional()?;

            // Re-adding a product bumps the quantity and keeps the originally captured price.
            let row = match existing {
                Some(line) => {
                    let total = line.quantity.checked_add(quantity).ok_or_else(|| {
                        DomainError::Invalid(ValidationErrors::single("quantity", "is too large"))
                    })?;
                    diesel::update(line_items::table.find(line.id))
                        .set((line_items::quantity.eq(total), line_items::updated_at.eq(now)))
                        .returning(LineItemRow::as_returning())
                        .get_result(conn)?
                }
                None => diesel::insert_into(line_items::table)
                    .values(&NewLineItemRow::owned_by(
                        LineItemOwner::Cart(cart_id),
                        product_id,
                        quantity,
                        price,
                    ))
                    .returning(LineItemRow::as_returning())
                    .get_result(conn)?,
            };

            LineItem::try_from(row)
        })
    }

    fn update_quantity(&self, cart_id: i64, line_item_id: i64, quantity: i32) -> Result<LineItem, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_cart(conn, cart_id)?;

            let row = diesel::update(
                line_items::table
                    .filter(line_items::id.eq(line_item_id))
                    .filter(line_items::buyable_type.eq(LineItemOwner::CART))
                    .filter(line_items::buyable_id.eq(cart_id)),
            )
            .set((line_items::quantity.eq(quantity), line_items::updated_at.eq(now)))
            .returning(LineItemRow::as_returning())
            .get_result(conn)
            .optional()?
            .ok_or(DomainError::NotFound("Line item"))?;

            LineItem::try_from(row)
        })
    }

    fn remove_line_item(&self, cart_id: i64, line_item_id: i64) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_cart(conn, cart_id)?;

            let deleted = diesel::delete(
                line_items::table
                    .filter(line_items::id.eq(line_item_id))
                    .filter(line_items::buyable_type.eq(LineItemOwner::CART))
                    .filter(line_items::buyable_id.eq(cart_id)),
            )
            .execute(conn)?;

            if deleted == 0 {
                Err(DomainError::NotFound("Line item"))
            } else {
                Ok(())
            }
        })
    }
}
