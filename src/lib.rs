pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for version in applied {
        log::info!("Applied migration {}", version);
    }
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::up,
        handlers::carts::show_cart,
        handlers::carts::add_line_item,
        handlers::carts::update_line_item,
        handlers::carts::remove_line_item,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::ratings::create_rating,
        handlers::ratings::list_ratings,
        handlers::ratings::category_averages,
        handlers::ratings::get_rating,
    ),
    tags(
        (name = "cart", description = "Current cart and its line items"),
        (name = "orders", description = "Checkout and order history"),
        (name = "products", description = "Catalog"),
        (name = "ratings", description = "Product ratings"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = AppState::new(pool);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(errors::json_config())
            .app_data(errors::query_config())
            .app_data(errors::path_config())
            .wrap(Logger::default())
            .route("/up", web::get().to(handlers::health::up))
            .service(
                web::scope("/cart")
                    .route("", web::get().to(handlers::carts::show_cart))
                    .route("/line_items", web::post().to(handlers::carts::add_line_item))
                    .route("/line_items/{id}", web::patch().to(handlers::carts::update_line_item))
                    .route("/line_items/{id}", web::delete().to(handlers::carts::remove_line_item)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}", web::patch().to(handlers::orders::update_order)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("", web::post().to(handlers::products::create_product))
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::patch().to(handlers::products::update_product))
                    .route("/{id}", web::delete().to(handlers::products::delete_product)),
            )
            .service(
                web::scope("/ratings")
                    .route("", web::post().to(handlers::ratings::create_rating))
                    .route("", web::get().to(handlers::ratings::list_ratings))
                    // Registered before `/{id}` so the literal segment wins.
                    .route("/category_averages", web::get().to(handlers::ratings::category_averages))
                    .route("/{id}", web::get().to(handlers::ratings::get_rating)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
