pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::checkout_service::CheckoutService;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::place_order,
        handlers::orders::verify_payment,
        handlers::orders::user_orders,
        handlers::orders::list_orders,
        handlers::orders::update_status,
    ),
    components(schemas(
        handlers::orders::PlaceOrderRequest,
        handlers::orders::PlaceOrderItem,
        handlers::orders::PlaceOrderResponse,
        handlers::orders::VerifyPaymentRequest,
        handlers::orders::VerifyPaymentResponse,
        handlers::orders::UserOrdersRequest,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderResponse,
        handlers::orders::OrdersListResponse,
        handlers::orders::UpdateStatusRequest,
    )),
    tags((name = "orders", description = "Checkout and payment verification"))
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: Arc<CheckoutService>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::from(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/api/order")
                    .route("/place", web::post().to(handlers::orders::place_order))
                    .route("/verify", web::post().to(handlers::orders::verify_payment))
                    .route("/userorders", web::post().to(handlers::orders::user_orders))
                    .route("/list", web::get().to(handlers::orders::list_orders))
                    .route("/status", web::post().to(handlers::orders::update_status)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
