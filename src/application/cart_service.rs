use uuid::Uuid;

use crate::domain::cart::{validate_quantity, Cart, LineItem};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

#[derive(Clone)]
pub struct CartService<R> {
    repo: R,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// A signed-in user always gets their own cart; the guest cart token is only
    /// consulted for anonymous requests.
    pub fn current_cart(&self, user_id: Option<i64>, guest_token: Option<Uuid>) -> Result<Cart, DomainError> {
        match user_id {
            Some(user_id) => self.repo.find_or_create_for_user(user_id),
            None => self.repo.find_or_create_guest(guest_token),
        }
    }

    pub fn cart_id_for_user(&self, user_id: i64) -> Result<Option<i64>, DomainError> {
        self.repo.find_id_for_user(user_id)
    }

    pub fn add_product(&self, cart: &Cart, product_id: i64, quantity: Option<i32>) -> Result<LineItem, DomainError> {
        let quantity = validate_quantity(quantity.unwrap_or(1))?;
        let item = self.repo.add_product(cart.id, product_id, quantity)?;
        log::debug!("Cart {} now holds {} x product {}", cart.id, item.quantity, product_id);
        Ok(item)
    }

    pub fn update_line_item(&self, cart: &Cart, line_item_id: i64, quantity: i32) -> Result<LineItem, DomainError> {
        let quantity = validate_quantity(quantity)?;
        self.repo.update_quantity(cart.id, line_item_id, quantity)
    }

    pub fn remove_line_item(&self, cart: &Cart, line_item_id: i64) -> Result<(), DomainError> {
        self.repo.remove_line_item(cart.id, line_item_id)
    }
}
