use super::*;

#[test]
fn refresh_expired_message() {
    assert_eq!(ClientError::RefreshExpired.to_string(), "refresh token expired");
}

#[test]
fn reauth_failed_message() {
    assert_eq!(ClientError::ReauthFailed.to_string(), "failed to re-authenticate");
}

#[test]
fn needs_login_only_for_terminal_auth_failures() {
    assert!(ClientError::RefreshExpired.needs_login());
    assert!(ClientError::ReauthFailed.needs_login());
    assert!(!ClientError::InvalidUrl("x".into()).needs_login());
    assert!(!ClientError::Status { status: 500, body: String::new() }.needs_login());
}

#[test]
fn storage_error_wraps_into_client_error() {
    let err: ClientError = StorageError::Poisoned.into();
    assert!(err.to_string().contains("storage lock poisoned"));
}
