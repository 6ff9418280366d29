pub mod carts;
pub mod health;
pub mod identity;
pub mod orders;
pub mod products;
pub mod ratings;
