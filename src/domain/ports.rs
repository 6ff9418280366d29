use uuid::Uuid;

use super::cart::{Cart, LineItem};
use super::errors::DomainError;
use super::order::{ListResult, OrderStatus, OrderView};
use super::policy::{Actor, OrderScope, ProductScope};
use super::product::{Product, ProductInput};
use super::rating::{CategoryAverage, NewRating, Rating, RatingDetails, RatingPage};
use super::rating_query::RatingQuery;

pub trait CartRepository: Send + Sync + 'static {
    /// The user's cart, created on first use.
    fn find_or_create_for_user(&self, user_id: i64) -> Result<Cart, DomainError>;
    /// The guest cart holding `token` if it exists and has no owner, otherwise a new guest cart.
    fn find_or_create_guest(&self, token: Option<Uuid>) -> Result<Cart, DomainError>;
    fn find_id_for_user(&self, user_id: i64) -> Result<Option<i64>, DomainError>;
    fn add_product(&self, cart_id: i64, product_id: i64, quantity: i32) -> Result<LineItem, DomainError>;
    fn update_quantity(&self, cart_id: i64, line_item_id: i64, quantity: i32) -> Result<LineItem, DomainError>;
    fn remove_line_item(&self, cart_id: i64, line_item_id: i64) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Convert the cart into a pending order for `user_id` and delete the cart, atomically.
    fn create_from_cart(&self, cart_id: i64, user_id: i64) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: i64) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, scope: OrderScope, page: i64, limit: i64) -> Result<ListResult<OrderView>, DomainError>;
    fn update_status(&self, id: i64, status: OrderStatus) -> Result<Option<OrderView>, DomainError>;
}

pub trait RatingRepository: Send + Sync + 'static {
    fn create(&self, user_id: i64, rating: NewRating) -> Result<Rating, DomainError>;
    fn find_by_id(&self, id: i64) -> Result<Option<RatingDetails>, DomainError>;
    fn list(&self, query: &RatingQuery) -> Result<RatingPage, DomainError>;
    fn category_averages(&self) -> Result<Vec<CategoryAverage>, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn list(&self, scope: &ProductScope) -> Result<Vec<Product>, DomainError>;
    fn find_by_id(&self, id: i64) -> Result<Option<Product>, DomainError>;
    fn create(&self, input: &ProductInput) -> Result<Product, DomainError>;
    fn update(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, DomainError>;
    fn delete(&self, id: i64) -> Result<bool, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    /// Load a user with role and supplied brands.
    fn find_actor(&self, user_id: i64) -> Result<Option<Actor>, DomainError>;
}
