use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderView};
use crate::domain::policy::{Action, Actor, OrderPolicy, Policy};
use crate::domain::ports::OrderRepository;

#[derive(Clone)]
pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Turn the user's cart into a pending order. A missing cart counts as empty.
    pub fn checkout(&self, cart_id: Option<i64>, actor: &Actor) -> Result<OrderView, DomainError> {
        OrderPolicy::authorize(actor, Action::Create, None)?;

        let Some(cart_id) = cart_id else {
            log::info!("Checkout rejected for user {}: no cart", actor.user_id);
            return Err(DomainError::EmptyCart);
        };

        match self.repo.create_from_cart(cart_id, actor.user_id) {
            Ok(order) => {
                log::info!(
                    "Cart {} checked out into order {} for user {} (total {})",
                    cart_id,
                    order.id,
                    actor.user_id,
                    order.total_price
                );
                Ok(order)
            }
            Err(e) => {
                log::warn!("Checkout of cart {} for user {} failed: {}", cart_id, actor.user_id, e);
                Err(e)
            }
        }
    }

    pub fn get_order(&self, actor: &Actor, id: i64) -> Result<OrderView, DomainError> {
        let order = self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Order"))?;
        OrderPolicy::authorize(actor, Action::Show, Some(&order))?;
        Ok(order)
    }

    pub fn list_orders(&self, actor: &Actor, page: i64, limit: i64) -> Result<ListResult<OrderView>, DomainError> {
        OrderPolicy::authorize(actor, Action::Index, None)?;
        self.repo.list(OrderPolicy::scope(actor), page, limit)
    }

    pub fn update_status(&self, actor: &Actor, id: i64, status: &str) -> Result<OrderView, DomainError> {
        let order = self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Order"))?;
        OrderPolicy::authorize(actor, Action::Update, Some(&order))?;
        let status = status.parse()?;
        self.repo
            .update_status(order.id, status)?
            .ok_or(DomainError::NotFound("Order"))
    }
}
