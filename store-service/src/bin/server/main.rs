use std::sync::Arc;

use auth::TokenIssuer;
use sqlx::postgres::PgPoolOptions;
use store_service::config::Config;
use store_service::domain::product::service::ProductService;
use store_service::domain::review::service::ReviewService;
use store_service::domain::user::service::UserService;
use store_service::inbound::http::router::create_router;
use store_service::inbound::http::router::AppState;
use store_service::outbound::mailer::TracingMailer;
use store_service::outbound::repositories::product::PostgresProductRepository;
use store_service::outbound::repositories::review::PostgresReviewRepository;
use store_service::outbound::repositories::user::PostgresUserRepository;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "store_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "store-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        base_url = %config.app.base_url,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_issuer = Arc::new(TokenIssuer::new(
        config.jwt.secret.as_bytes(),
        config.jwt.expiration_hours,
    ));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let review_repository = Arc::new(PostgresReviewRepository::new(pg_pool.clone()));
    let product_repository = Arc::new(PostgresProductRepository::new(pg_pool));
    let mailer = Arc::new(TracingMailer::new(config.mail.from_address.clone()));

    let user_service = Arc::new(UserService::new(
        user_repository,
        mailer,
        Arc::clone(&token_issuer),
        config.app.base_url.clone(),
    ));
    let review_service = Arc::new(ReviewService::new(
        review_repository,
        Arc::clone(&product_repository),
    ));
    let product_service = Arc::new(ProductService::new(product_repository));

    let state = AppState {
        user_service,
        review_service,
        product_service,
        token_issuer,
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(state);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
