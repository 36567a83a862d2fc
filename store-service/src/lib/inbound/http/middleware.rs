use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::policy::IdentityContext;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Required-role sets attached to route groups at registration time.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const ANY_USER: &[Role] = &[Role::Admin, Role::NormalUser];

/// Access-control guard: validates the bearer token and attaches an
/// [`IdentityContext`] to the request extensions.
///
/// Pure gate: it never mutates state. Every authentication failure mode
/// (missing header, invalid/expired/malformed token, identity deleted since
/// issue) collapses to 401 for the client while staying distinguishable in
/// the logs. An infrastructure failure during the identity lookup is not an
/// authentication failure and surfaces as 500.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims = state.token_issuer.validate(token).map_err(|e| {
        tracing::warn!("Session token rejected: {}", e);
        unauthorized("Invalid or expired token")
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::error!("Failed to parse user ID from token subject: {}", e);
        unauthorized("Invalid token format")
    })?;

    let role: Role = claims.role.parse().map_err(|e| {
        tracing::error!("Failed to parse role claim: {}", e);
        unauthorized("Invalid token format")
    })?;

    // A valid signature is not enough: the identity must still exist
    if let Err(e) = state.user_service.get_user(&user_id).await {
        return Err(identity_rejection(&user_id, &e));
    }

    req.extensions_mut()
        .insert(IdentityContext::new(user_id, role));

    Ok(next.run(req).await)
}

/// Role policy enforcer, layered strictly inside [`authenticate`].
pub async fn enforce_roles(
    req: Request,
    next: Next,
    allowed: &'static [Role],
) -> Result<Response, Response> {
    check_role(req.extensions().get::<IdentityContext>().copied(), allowed)?;

    Ok(next.run(req).await)
}

/// Missing identity context means the guard did not run: that is an
/// authentication failure (401), never a role failure (403).
fn check_role(
    identity: Option<IdentityContext>,
    allowed: &[Role],
) -> Result<IdentityContext, Response> {
    let Some(identity) = identity else {
        return Err(unauthorized("Missing authentication"));
    };

    if !allowed.contains(&identity.role) {
        tracing::warn!(user_id = %identity.id, role = %identity.role, "Role check failed");
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Access denied, you are not allowed"
            })),
        )
            .into_response());
    }

    Ok(identity)
}

/// Map a failed identity lookup to a response. A vanished subject means the
/// token no longer authenticates anyone (401); anything else is an
/// infrastructure failure the client cannot repair by re-authenticating.
fn identity_rejection(user_id: &UserId, err: &UserError) -> Response {
    match err {
        UserError::NotFound(_) => {
            tracing::warn!(user_id = %user_id, "Token subject no longer resolves");
            unauthorized("Invalid or expired token")
        }
        other => {
            tracing::error!(user_id = %user_id, "Identity lookup failed: {}", other);
            internal_error("Internal server error")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": message
        })),
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message
        })),
    )
        .into_response()
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
    })
}
