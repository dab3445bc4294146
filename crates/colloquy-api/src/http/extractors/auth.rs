//! Staff bearer-token authentication extractor.
//!
//! Staff routes share a single bearer token. When no token is configured,
//! the feature is disabled entirely (503) rather than defaulting open or
//! failing silently. Tokens are SHA-256 hashed and compared as digests,
//! never as raw strings.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::http::error::AppError;
use crate::state::{AppState, hash_token};

/// Authenticated staff request marker. Extracting this validates the
/// bearer token against the configured staff token.
pub struct StaffAuth;

impl FromRequestParts<AppState> for StaffAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected_hash) = state.staff_token_hash.as_deref() else {
            return Err(AppError::ServiceUnavailable(
                "Staff access is not configured on this deployment".to_string(),
            ));
        };

        let token = extract_bearer_token(parts)?;
        if hash_token(&token) == expected_hash {
            Ok(StaffAuth)
        } else {
            Err(AppError::Unauthorized("Invalid staff token".to_string()))
        }
    }
}

/// Extract the bearer token from the `Authorization` header.
fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    let Some(auth) = parts.headers.get("authorization") else {
        return Err(AppError::Unauthorized(
            "Missing staff token. Provide via 'Authorization: Bearer <token>' header."
                .to_string(),
        ));
    };
    let auth_str = auth
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".to_string()))?;
    match auth_str.strip_prefix("Bearer ") {
        Some(token) => Ok(token.trim().to_string()),
        None => Err(AppError::Unauthorized(
            "Authorization header must use the Bearer scheme".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/staff/sessions");
        if let Some(value) = value {
            builder = builder.header("authorization", value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_extracts_bearer_token() {
        let parts = parts_with_header(Some("Bearer staff-secret"));
        assert_eq!(extract_bearer_token(&parts).unwrap(), "staff-secret");
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let parts = parts_with_header(None);
        assert!(matches!(
            extract_bearer_token(&parts).unwrap_err(),
            AppError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_non_bearer_scheme_is_unauthorized() {
        let parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            extract_bearer_token(&parts).unwrap_err(),
            AppError::Unauthorized(_)
        ));
    }
}
