//! Shelfwise Server - library inventory and circulation
//!
//! REST API server for shelving, cataloging and lending books.

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfwise_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{redis::RedisService, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("shelfwise_server={},tower_http=debug", config.logging.level).into()
    });

    let json = config.logging.is_json();
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting Shelfwise Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let redis_service = RedisService::new(&config.redis)
        .await
        .context("Failed to connect to Redis")?;

    tracing::info!(
        cart_ttl_seconds = config.redis.cart_ttl_seconds,
        "Connected to Redis"
    );

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let repository = Repository::new(pool);
    let services = Services::new(repository, redis_service);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Locations
        .route("/areas", get(api::locations::list_areas).post(api::locations::create_area))
        .route(
            "/areas/:id",
            get(api::locations::get_area)
                .put(api::locations::update_area)
                .delete(api::locations::delete_area),
        )
        .route(
            "/bookshelves",
            get(api::locations::list_bookshelves).post(api::locations::create_bookshelf),
        )
        .route(
            "/bookshelves/:id",
            get(api::locations::get_bookshelf)
                .put(api::locations::update_bookshelf)
                .delete(api::locations::delete_bookshelf),
        )
        .route(
            "/shelf-layers",
            get(api::locations::list_shelf_layers).post(api::locations::create_shelf_layer),
        )
        .route(
            "/shelf-layers/:id",
            get(api::locations::get_shelf_layer)
                .put(api::locations::update_shelf_layer)
                .delete(api::locations::delete_shelf_layer),
        )
        .route("/locations/tree", get(api::locations::location_tree))
        // Books
        .route("/books", get(api::books::list_books).post(api::books::create_book))
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route("/books/barcode/:barcode", get(api::books::get_book_by_barcode))
        // Borrow cart
        .route(
            "/borrow/user",
            get(api::carts::get_borrow_cart).post(api::carts::set_borrow_user),
        )
        .route("/borrow/books", post(api::carts::add_borrow_item))
        .route("/borrow/books/:index", delete(api::carts::remove_borrow_item))
        .route("/borrow/complete", post(api::carts::complete_borrow))
        // Return cart
        .route(
            "/return/user",
            get(api::carts::get_return_cart).post(api::carts::set_return_user),
        )
        .route("/return/books", post(api::carts::add_return_item))
        .route("/return/books/:index", delete(api::carts::remove_return_item))
        .route("/return/complete", post(api::carts::complete_return))
        // Direct circulation
        .route("/borrow", post(api::circulation::borrow_direct))
        .route("/borrow/return", post(api::circulation::return_direct))
        .route("/borrow/scan", post(api::circulation::scan))
        .route("/borrow/records", get(api::circulation::list_records))
        .route("/borrowers/:phone/loans", get(api::circulation::borrower_loans))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
