use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use axum::body::Body;
use axum::extract::Request as MiddlewareRequest;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::middleware::Next;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::products::create_product::create_product;
use super::handlers::products::delete_product::delete_product;
use super::handlers::products::get_product::get_product;
use super::handlers::products::list_products::list_products;
use super::handlers::products::update_product::update_product;
use super::handlers::reviews::create_review::create_review;
use super::handlers::reviews::delete_review::delete_review;
use super::handlers::reviews::list_reviews::list_reviews;
use super::handlers::reviews::update_review::update_review;
use super::handlers::users::current_user::current_user;
use super::handlers::users::delete_user::delete_user;
use super::handlers::users::list_users::list_users;
use super::handlers::users::login::login;
use super::handlers::users::register::register;
use super::handlers::users::update_user::update_user;
use super::handlers::users::verify_email::verify_email;
use super::middleware::authenticate as auth_middleware;
use super::middleware::enforce_roles;
use super::middleware::ADMIN_ONLY;
use super::middleware::ANY_USER;
use crate::domain::product::service::ProductService;
use crate::domain::review::service::ReviewService;
use crate::domain::user::service::UserService;
use crate::outbound::mailer::TracingMailer;
use crate::outbound::repositories::product::PostgresProductRepository;
use crate::outbound::repositories::review::PostgresReviewRepository;
use crate::outbound::repositories::user::PostgresUserRepository;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<PostgresUserRepository, TracingMailer>>,
    pub review_service: Arc<ReviewService<PostgresReviewRepository, PostgresProductRepository>>,
    pub product_service: Arc<ProductService<PostgresProductRepository>>,
    pub token_issuer: Arc<TokenIssuer>,
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/users/auth/register", post(register))
        .route("/api/users/auth/login", post(login))
        .route("/api/users/verify-email/:user_id/:token", get(verify_email))
        .route("/api/products", get(list_products))
        .route("/api/products/:product_id", get(get_product));

    // Authentication wraps the role check, so a bad token is always a 401
    // before any 403 can happen
    let user_routes = Router::new()
        .route("/api/users/current-user", get(current_user))
        .route("/api/users", put(update_user))
        .route("/api/users/:user_id", axum::routing::delete(delete_user))
        .route(
            "/api/reviews/:id",
            post(create_review).put(update_review).delete(delete_review),
        )
        .route_layer(middleware::from_fn(
            |req: MiddlewareRequest, next: Next| enforce_roles(req, next, ANY_USER),
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/api/users", get(list_users))
        .route("/api/reviews", get(list_reviews))
        .route("/api/products", post(create_product))
        .route(
            "/api/products/:product_id",
            put(update_product).delete(delete_product),
        )
        .route_layer(middleware::from_fn(
            |req: MiddlewareRequest, next: Next| enforce_roles(req, next, ADMIN_ONLY),
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
