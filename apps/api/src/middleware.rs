use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use bazaar_core::{AppError, UserIdentity};
use bazaar_infrastructure::with_principal;

use crate::error::ApiResult;

/// Header carrying the login of the principal authenticated upstream.
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";

/// Binds the upstream-authenticated principal, if any, for the rest of the request.
pub async fn bind_principal(request: Request, next: Next) -> ApiResult<Response> {
    let principal = request
        .headers()
        .get(AUTHENTICATED_USER_HEADER)
        .map(|value| {
            value.to_str().map_err(|_| {
                AppError::Unauthorized(format!("{AUTHENTICATED_USER_HEADER} must be visible ASCII"))
            })
        })
        .transpose()?
        .map(str::trim)
        .filter(|login| !login.is_empty())
        .map(UserIdentity::from_email);

    let Some(principal) = principal else {
        return Ok(next.run(request).await);
    };

    Ok(with_principal(principal, next.run(request)).await)
}
