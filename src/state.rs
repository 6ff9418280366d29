//! Services shared by every handler.

use crate::application::cart_service::CartService;
use crate::application::identity_service::IdentityService;
use crate::application::order_service::OrderService;
use crate::application::product_service::ProductService;
use crate::application::rating_service::RatingService;
use crate::db::DbPool;
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::product_repo::DieselProductRepository;
use crate::infrastructure::rating_repo::DieselRatingRepository;
use crate::infrastructure::user_repo::DieselUserRepository;

/// Cloned into every actix worker; each service holds its own pool handle.
#[derive(Clone)]
pub struct AppState {
    pub carts: CartService<DieselCartRepository>,
    pub orders: OrderService<DieselOrderRepository>,
    pub products: ProductService<DieselProductRepository>,
    pub ratings: RatingService<DieselRatingRepository>,
    pub identity: IdentityService<DieselUserRepository>,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            carts: CartService::new(DieselCartRepository::new(pool.clone())),
            orders: OrderService::new(DieselOrderRepository::new(pool.clone())),
            products: ProductService::new(DieselProductRepository::new(pool.clone())),
            ratings: RatingService::new(DieselRatingRepository::new(pool.clone())),
            identity: IdentityService::new(DieselUserRepository::new(pool)),
        }
    }
}
