use super::*;

fn status(status: u16, error: Option<&str>, message: Option<&str>) -> ApiError {
    ApiError::Status {
        status,
        body: ErrorBody { error: error.map(str::to_owned), message: message.map(str::to_owned) },
    }
}

// =============================================================================
// ErrorBody / ApiError
// =============================================================================

#[test]
fn error_body_parse_reads_both_fields() {
    let body = ErrorBody::parse(r#"{"error":"Unauthorized","message":"Authentication required"}"#);
    assert_eq!(body.error.as_deref(), Some("Unauthorized"));
    assert_eq!(body.message.as_deref(), Some("Authentication required"));
}

#[test]
fn error_body_parse_tolerates_non_json() {
    assert_eq!(ErrorBody::parse("<html>502</html>"), ErrorBody::default());
    assert_eq!(ErrorBody::parse(""), ErrorBody::default());
}

#[test]
fn server_message_prefers_message_over_error() {
    let err = status(400, Some("Bad Request"), Some("name is required"));
    assert_eq!(err.server_message(), Some("name is required"));
    assert_eq!(err.server_error(), Some("Bad Request"));
}

#[test]
fn server_message_falls_back_to_error() {
    let err = status(401, Some("Invalid username or password"), None);
    assert_eq!(err.server_message(), Some("Invalid username or password"));
}

#[test]
fn status_display_includes_body() {
    let err = status(401, Some("Unauthorized"), Some("Authentication required"));
    assert_eq!(err.to_string(), "server returned 401: Unauthorized (Authentication required)");
    assert_eq!(status(500, None, None).to_string(), "server returned 500");
}

// =============================================================================
// SessionError
// =============================================================================

#[test]
fn authentication_uses_server_message() {
    let err = SessionError::authentication(status(401, Some("Invalid username or password"), None));
    assert_eq!(err.message(), "Invalid username or password");
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.error_code(), "E_AUTHENTICATION");
    assert_eq!(err.to_string(), "Invalid username or password");
}

#[test]
fn authentication_falls_back_without_body() {
    let err = SessionError::authentication(status(502, None, None));
    assert_eq!(err.message(), LOGIN_FAILED_MESSAGE);
}

#[test]
fn registration_maps_username_taken() {
    let err = SessionError::registration(status(400, Some("Username already taken"), None));
    assert_eq!(err.registration_kind(), Some(RegistrationErrorKind::UsernameTaken));
    assert_eq!(err.message(), "Username is already taken");
    assert_eq!(err.error_code(), "E_USERNAME_TAKEN");
}

#[test]
fn registration_maps_email_registered() {
    let err = SessionError::registration(status(400, Some("Email already registered"), None));
    assert_eq!(err.registration_kind(), Some(RegistrationErrorKind::EmailRegistered));
    assert_eq!(err.message(), "Email is already registered");
    assert_eq!(err.error_code(), "E_EMAIL_REGISTERED");
}

#[test]
fn registration_only_maps_duplicates_on_400() {
    let err = SessionError::registration(status(500, Some("Username already taken"), None));
    assert_eq!(err.registration_kind(), Some(RegistrationErrorKind::Rejected));
    assert_eq!(err.message(), "Username already taken");
}

#[test]
fn registration_prefers_error_then_message_then_fallback() {
    let err = SessionError::registration(status(500, Some("Failed to save user"), Some("ignored")));
    assert_eq!(err.message(), "Failed to save user");

    let err = SessionError::registration(status(422, None, Some("Unprocessable")));
    assert_eq!(err.message(), "Unprocessable");

    let err = SessionError::registration(status(500, None, None));
    assert_eq!(err.message(), REGISTER_FAILED_MESSAGE);
    assert_eq!(err.error_code(), "E_REGISTRATION");
}

#[test]
fn profile_update_and_password_change_fallbacks() {
    let err = SessionError::profile_update(status(400, Some("Email already in use"), None));
    assert_eq!(err.message(), "Email already in use");
    assert_eq!(err.error_code(), "E_PROFILE_UPDATE");
    assert_eq!(SessionError::profile_update(status(500, None, None)).message(), PROFILE_UPDATE_FAILED_MESSAGE);

    let err = SessionError::password_change(status(400, Some("Current password is incorrect"), None));
    assert_eq!(err.message(), "Current password is incorrect");
    assert_eq!(err.error_code(), "E_PASSWORD_CHANGE");
    assert_eq!(SessionError::password_change(status(500, None, None)).message(), PASSWORD_CHANGE_FAILED_MESSAGE);
}

#[test]
fn non_registration_errors_have_no_kind() {
    let err = SessionError::authentication(status(401, None, None));
    assert_eq!(err.registration_kind(), None);
}
