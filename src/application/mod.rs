pub mod cart_service;
pub mod identity_service;
pub mod order_service;
pub mod product_service;
pub mod rating_service;
