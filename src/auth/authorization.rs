//! Ownership and role based authorization gates

use crate::{
    auth::middleware::AuthContext, error::AppError, extract::ApiPath, middleware::AppState,
    repository::UserStore,
};
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use uuid::Uuid;

/// Decide whether `ctx` may act on a resource owned by `owner_id`.
///
/// The owner is always allowed. Anyone else needs the admin flag on their
/// stored user record; a failed or empty lookup is a server error.
pub async fn check_ownership(
    owner_id: Uuid,
    ctx: &AuthContext,
    users: &dyn UserStore,
) -> Result<(), AppError> {
    if owner_id == ctx.user_id {
        return Ok(());
    }

    let user = match users.find_by_id(ctx.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::error!(user_id = %ctx.user_id, "Authenticated user no longer exists");
            return Err(AppError::internal_error("error checking user permissions"));
        }
        Err(e) => {
            tracing::error!(user_id = %ctx.user_id, error = %e, "User lookup failed");
            return Err(AppError::internal_error("error checking user permissions"));
        }
    };

    if user.is_admin {
        tracing::debug!(user_id = %ctx.user_id, %owner_id, "Admin override");
        return Ok(());
    }

    tracing::warn!(user_id = %ctx.user_id, %owner_id, "Ownership check failed");
    Err(AppError::forbidden("not authorized to perform this action"))
}

/// Route middleware guarding `/{id}` place mutations
pub async fn require_place_owner(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    WithRejection(Path(place_id), _): ApiPath<Uuid>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let place = match state.places.find_by_id(place_id).await {
        Ok(Some(place)) => place,
        Ok(None) => return Err(AppError::not_found("activity not found")),
        Err(e) => {
            tracing::error!(%place_id, error = %e, "Place lookup failed");
            return Err(AppError::internal_error("error retrieving activity"));
        }
    };

    check_ownership(place.user_id, &ctx, state.users.as_ref()).await?;

    Ok(next.run(req).await)
}

/// Admin check on the token claims alone
pub fn check_admin(ctx: Option<&AuthContext>) -> Result<(), AppError> {
    match ctx {
        None => Err(AppError::unauthorized("authentication required")),
        Some(ctx) if ctx.is_admin => Ok(()),
        Some(ctx) => {
            tracing::warn!(user_id = %ctx.user_id, "Admin access denied");
            Err(AppError::forbidden("admin access required"))
        }
    }
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    check_admin(req.extensions().get::<AuthContext>())?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(is_admin: bool) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            username: "carol".to_string(),
            is_admin,
        }
    }

    #[test]
    fn test_check_admin() {
        assert_eq!(
            check_admin(None).unwrap_err().status_code(),
            axum::http::StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            check_admin(Some(&ctx(false))).unwrap_err().status_code(),
            axum::http::StatusCode::FORBIDDEN
        );
        assert!(check_admin(Some(&ctx(true))).is_ok());
    }
}
