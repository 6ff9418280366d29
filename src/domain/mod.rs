pub mod cart;
pub mod errors;
pub mod order;
pub mod policy;
pub mod ports;
pub mod product;
pub mod rating;
pub mod rating_query;
