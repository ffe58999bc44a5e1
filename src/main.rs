use std::env;
use std::sync::Arc;

use checkout_service::infrastructure::order_store::DieselOrderStore;
use checkout_service::infrastructure::paystack::PaystackClient;
use checkout_service::infrastructure::user_directory::DieselUserDirectory;
use checkout_service::{build_server, create_pool, run_migrations, CheckoutService};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let secret_key = env::var("PAYSTACK_SECRET_KEY").expect("PAYSTACK_SECRET_KEY must be set");
    let gateway_url =
        env::var("PAYSTACK_BASE_URL").unwrap_or_else(|_| "https://api.paystack.co".to_string());
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    let service = Arc::new(CheckoutService::new(
        Arc::new(DieselUserDirectory::new(pool.clone())),
        Arc::new(DieselOrderStore::new(pool)),
        Arc::new(PaystackClient::new(gateway_url, secret_key)),
        frontend_url,
    ));

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(service, &host, port)?.await
}
