//! Shared-secret verification
//!
//! Access control is a single shared-secret comparison checked once per
//! request batch. The comparison is constant-time; the three failure modes
//! map to distinct error codes so callers can tell a client mistake from a
//! deployment mistake.

use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Verify a client-supplied secret against the configured one.
///
/// - configured secret absent → `Misconfigured` (500)
/// - provided secret absent/empty → `Unauthorized` "password required" (401)
/// - mismatch → `Unauthorized` "invalid password" (401)
pub fn verify_shared_secret(
    configured: Option<&str>,
    provided: Option<&str>,
) -> Result<(), AppError> {
    let configured = configured
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Misconfigured("GALLERY_PASSWORD is not set".to_string()))?;

    let provided = provided
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Password required".to_string()))?;

    if bool::from(provided.as_bytes().ct_eq(configured.as_bytes())) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Invalid password".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorMetadata;

    #[test]
    fn test_correct_secret_passes() {
        assert!(verify_shared_secret(Some("hunter2"), Some("hunter2")).is_ok());
    }

    #[test]
    fn test_missing_provided_secret_is_unauthorized() {
        let err = verify_shared_secret(Some("hunter2"), None).unwrap_err();
        assert_eq!(err.http_status_code(), 401);
        assert!(err.client_message().contains("required"));

        let err = verify_shared_secret(Some("hunter2"), Some("")).unwrap_err();
        assert_eq!(err.http_status_code(), 401);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let err = verify_shared_secret(Some("hunter2"), Some("hunter3")).unwrap_err();
        assert_eq!(err.http_status_code(), 401);
        assert!(err.client_message().contains("Invalid"));
    }

    #[test]
    fn test_unconfigured_secret_is_server_error() {
        let err = verify_shared_secret(None, Some("hunter2")).unwrap_err();
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "SERVER_MISCONFIGURED");

        let err = verify_shared_secret(Some(""), Some("hunter2")).unwrap_err();
        assert_eq!(err.http_status_code(), 500);
    }
}
