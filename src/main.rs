use std::env;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use registrar_backend::gateway::{PgRecordGateway, RecordGateway};
use registrar_backend::handlers::{self, AppState};
use registrar_backend::utils::auth::TokenVerifier;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    // Validate JWT secret
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    if jwt_secret.is_empty() {
        panic!("JWT_SECRET cannot be empty");
    }
    let verifier = TokenVerifier::new(&jwt_secret);

    // Initialize the database gateway
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let gateway = PgRecordGateway::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    let gateway: Arc<dyn RecordGateway> = Arc::new(gateway);

    let state = web::Data::new(AppState::new(gateway, verifier));

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    info!("Starting server at {}", bind_addr);

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
