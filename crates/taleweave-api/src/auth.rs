//! Request identity: bearer tokens for members, session ids for guests.
//!
//! Handlers take one of the extractors below. [`MaybeViewer`] never rejects
//! an anonymous request; [`CurrentViewer`] needs a member or guest;
//! [`MemberUser`] and [`AdminUser`] narrow that further.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use taleweave_core::error::DomainError;
use taleweave_core::identity::Viewer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying a guest's client-generated session id.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Claims of a member token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Member user id.
    pub sub: Uuid,
    /// Member email.
    pub email: String,
    /// Expiry (UTC Unix timestamp).
    pub exp: i64,
}

/// Validates an HS256 member token and returns its viewer.
///
/// # Errors
///
/// Returns `DomainError::Unauthorized` for a bad signature, an expired token,
/// or the reserved guest subject.
pub fn viewer_from_token(token: &str, secret: &str) -> Result<Viewer, DomainError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| DomainError::Unauthorized("invalid or expired token".into()))?;
    Viewer::member(data.claims.sub, data.claims.email)
}

/// Signs an HS256 member token.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if encoding fails.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, DomainError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| DomainError::Infrastructure(format!("token encoding failed: {e}")))
}

fn viewer_from_parts(parts: &Parts, state: &AppState) -> Result<Option<Viewer>, DomainError> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                DomainError::Unauthorized("expected Authorization: Bearer <token>".into())
            })?;
        return viewer_from_token(token.trim(), &state.settings.jwt_secret).map(Some);
    }
    if let Some(header) = parts.headers.get(SESSION_ID_HEADER) {
        let session_id = header
            .to_str()
            .map_err(|_| DomainError::Unauthorized("invalid guest session id".into()))?;
        return Viewer::guest(session_id).map(Some);
    }
    Ok(None)
}

/// The caller's identity, if any. Malformed credentials still reject.
#[derive(Debug, Clone)]
pub struct MaybeViewer(pub Option<Viewer>);

impl MaybeViewer {
    /// Whether the caller is on the admin allow-list.
    #[must_use]
    pub fn is_admin(&self, state: &AppState) -> bool {
        self.0
            .as_ref()
            .is_some_and(|v| state.settings.admins.is_admin(v))
    }
}

impl FromRequestParts<AppState> for MaybeViewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(viewer_from_parts(parts, state)?))
    }
}

/// A member or guest.
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub Viewer);

impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        viewer_from_parts(parts, state)?
            .map(Self)
            .ok_or_else(|| {
                DomainError::Unauthorized("a bearer token or X-Session-Id header is required".into())
                    .into()
            })
    }
}

/// An authenticated member.
#[derive(Debug, Clone)]
pub struct MemberUser {
    /// Member user id.
    pub user_id: Uuid,
    /// Member email.
    pub email: String,
    /// The same identity as a viewer.
    pub viewer: Viewer,
}

impl FromRequestParts<AppState> for MemberUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentViewer(viewer) = CurrentViewer::from_request_parts(parts, state).await?;
        match &viewer {
            Viewer::Member { user_id, email } => Ok(Self {
                user_id: *user_id,
                email: email.clone(),
                viewer: viewer.clone(),
            }),
            Viewer::Guest { .. } => Err(DomainError::Unauthorized(
                "sign in to use this feature".into(),
            )
            .into()),
        }
    }
}

/// A member on the admin allow-list. Others get 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub MemberUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let member = MemberUser::from_request_parts(parts, state).await?;
        state.settings.admins.authorize(&member.viewer)?;
        Ok(Self(member))
    }
}
