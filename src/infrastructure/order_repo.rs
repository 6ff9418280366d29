use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::cart::LineItemOwner;
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderDraft, OrderStatus, OrderView};
use crate::domain::policy::OrderScope;
use crate::domain::ports::OrderRepository;
use crate::schema::{carts, line_items, orders};

use super::cart_repo::hydrate_cart;
use super::models::{CartRow, LineItemRow, NewLineItemRow, NewOrderRow, OrderRow};

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn load_order_lines(conn: &mut PgConnection, order_id: i64) -> QueryResult<Vec<LineItemRow>> {
    line_items::table
        .filter(line_items::buyable_type.eq(LineItemOwner::ORDER))
        .filter(line_items::buyable_id.eq(order_id))
        .order(line_items::id.asc())
        .select(LineItemRow::as_select())
        .load(conn)
}

impl OrderRepository for DieselOrderRepository {
    fn create_from_cart(&self, cart_id: i64, user_id: i64) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the cart. A concurrent checkout of the same cart waits
            //    here and then finds the row gone.
            let cart_row = carts::table
                .find(cart_id)
                .select(CartRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Cart"))?;
            let cart = hydrate_cart(conn, cart_row)?;
            if !cart.is_accessible_by(user_id) {
                return Err(DomainError::NotFound("Cart"));
            }

            // 2. Snapshot the cart into a pending order.
            let draft = OrderDraft::from_cart(Some(&cart), user_id)?;

            // 3. Insert the order
            let order = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    user_id: draft.user_id,
                    status: draft.status.as_str(),
                    total_price: &draft.total_price,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 4. Copy the lines; the order owns fresh rows, not the cart's.
            let new_lines: Vec<NewLineItemRow> = draft
                .lines
                .into_iter()
                .map(|l| {
                    NewLineItemRow::owned_by(
                        LineItemOwner::Order(order.id),
                        l.product_id,
                        l.quantity,
                        l.unit_price,
                    )
                })
                .collect();
            let lines = diesel::insert_into(line_items::table)
                .values(&new_lines)
                .returning(LineItemRow::as_returning())
                .get_results(conn)?;

            // 5. Destroy the cart and its lines in the same transaction.
            diesel::delete(
                line_items::table
                    .filter(line_items::buyable_type.eq(LineItemOwner::CART))
                    .filter(line_items::buyable_id.eq(cart.id)),
            )
            .execute(conn)?;
            diesel::delete(carts::table.find(cart.id)).execute(conn)?;

            order.into_view(lines)
        })
    }

    fn find_by_id(&self, id: i64) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = load_order_lines(&mut conn, order.id)?;
        order.into_view(lines).map(Some)
    }

    fn list(&self, scope: OrderScope, page: i64, limit: i64) -> Result<ListResult<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1).saturating_mul(limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let scoped = || -> orders::BoxedQuery<'static, Pg> {
                let query = orders::table.into_boxed();
                match scope {
                    OrderScope::All => query,
                    OrderScope::OwnedBy(user_id) => query.filter(orders::user_id.eq(user_id)),
                }
            };

            let total: i64 = scoped().count().get_result(conn)?;

            let rows = scoped()
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            let items = rows
                .into_iter()
                .map(|o| o.into_view(vec![]))
                .collect::<Result<_, _>>()?;

            Ok(ListResult { items, total })
        })
    }

    fn update_status(&self, id: i64, status: OrderStatus) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = diesel::update(orders::table.find(id))
            .set((orders::status.eq(status.as_str()), orders::updated_at.eq(now)))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = load_order_lines(&mut conn, order.id)?;
        order.into_view(lines).map(Some)
    }
}
