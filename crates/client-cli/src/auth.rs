//! Auth gateway client: registration, login, password reset and verification.
//!
//! Form checks run before any request is sent and fail with `ValidationError`.
//! They only spare a round trip; the server still has the final word and its
//! refusals come back as `ClientError::Server` with a 4xx status.

use std::sync::Arc;

use shared::{
    actions, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    ResetCompleteRequest, ResetRequest, ResetRequestResponse, UserSummary, VerifyResponse,
};

use crate::error::{AuthError, ClientError, ClientResult, ValidationError};
use crate::gateway::{Gateway, GatewayError, Request, Service};
use crate::session::Session;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Sign-up form contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
}

/// What the backend did with a reset request
#[derive(Debug, Clone, PartialEq)]
pub enum ResetOutcome {
    /// Direct-token mode: the token is handed back to the client
    TokenIssued { token: String, expires_at: Option<String> },
    /// Email-delivery mode, or unknown address; nothing to do but wait
    EmailSent { message: Option<String> },
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("Email"));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Mismatch is reported before length
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password"));
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

pub fn validate_registration(form: &Registration) -> Result<(), ValidationError> {
    validate_email(&form.email)?;
    if form.username.trim().is_empty() {
        return Err(ValidationError::MissingField("Username"));
    }
    validate_new_password(&form.password, &form.confirm_password)?;
    if !form.accept_terms {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthClient {
    gateway: Arc<dyn Gateway>,
}

impl AuthClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> Arc<dyn Gateway> {
        self.gateway.clone()
    }

    /// Create an account. Does not sign in; the caller logs in afterwards.
    pub async fn register(&self, form: &Registration) -> ClientResult<Option<UserSummary>> {
        validate_registration(form)?;

        let body = RegisterRequest {
            email: form.email.trim().to_string(),
            username: form.username.trim().to_string(),
            full_name: form
                .full_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            password: form.password.clone(),
        };
        let request = Request::post(Service::Auth)
            .action(actions::REGISTER)
            .json(&body)?;

        match self.gateway.call(request).await {
            Ok(reply) => {
                let resp: RegisterResponse = reply.decode()?;
                tracing::info!("account registered");
                Ok(resp.user)
            }
            Err(err) => Err(match err.rejection() {
                Some((409, _)) => AuthError::Duplicate.into(),
                Some((400, failure)) => rejected(failure.text()),
                _ => err.into(),
            }),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        if email.trim().is_empty() {
            return Err(ValidationError::MissingField("Email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("Password").into());
        }

        let request = Request::post(Service::Auth)
            .action(actions::LOGIN)
            .json(&LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })?;

        match self.gateway.call(request).await {
            Ok(reply) => {
                let resp: LoginResponse = reply.decode()?;
                tracing::info!(user_id = resp.user.id, "signed in");
                Ok(Session::new(resp.session_token, resp.user))
            }
            Err(err) => Err(match err.rejection() {
                Some((401, _)) => AuthError::InvalidCredentials.into(),
                Some((400, failure)) => rejected(failure.text()),
                _ => err.into(),
            }),
        }
    }

    pub async fn request_password_reset(&self, email: &str) -> ClientResult<ResetOutcome> {
        validate_email(email)?;

        let request = Request::post(Service::Auth)
            .action(actions::RESET_REQUEST)
            .json(&ResetRequest {
                email: email.trim().to_string(),
            })?;

        match self.gateway.call(request).await {
            Ok(reply) => {
                let resp: ResetRequestResponse = reply.decode()?;
                Ok(match resp.token.filter(|t| !t.is_empty()) {
                    Some(token) => ResetOutcome::TokenIssued {
                        token,
                        expires_at: resp.expires_at,
                    },
                    None => ResetOutcome::EmailSent {
                        message: resp.message,
                    },
                })
            }
            Err(err) => Err(match err.rejection() {
                Some((400, failure)) => rejected(failure.text()),
                _ => err.into(),
            }),
        }
    }

    pub async fn complete_password_reset(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ClientResult<()> {
        if token.trim().is_empty() {
            return Err(ValidationError::MissingField("Reset token").into());
        }
        validate_new_password(new_password, confirm_password)?;

        let request = Request::post(Service::Auth)
            .action(actions::RESET_COMPLETE)
            .json(&ResetCompleteRequest {
                token: token.trim().to_string(),
                new_password: new_password.to_string(),
            })?;

        match self.gateway.call(request).await {
            Ok(_) => {
                tracing::info!("password reset completed");
                Ok(())
            }
            Err(err) => Err(match err.rejection() {
                Some((400, failure)) => reset_failure(failure.text().unwrap_or_default()),
                _ => err.into(),
            }),
        }
    }

    /// Current server-side copy of the user behind `token`
    pub async fn verify(&self, token: &str) -> ClientResult<UserSummary> {
        let request = Request::get(Service::Auth)
            .action(actions::VERIFY)
            .token(token);

        match self.gateway.call(request).await {
            Ok(reply) => {
                let resp: VerifyResponse = reply.decode()?;
                Ok(resp.user)
            }
            Err(err) => Err(session_failure(err)),
        }
    }
}

fn rejected(text: Option<&str>) -> ClientError {
    ClientError::server(Some(400), text.unwrap_or("Request rejected"))
}

fn reset_failure(text: &str) -> ClientError {
    let lower = text.to_lowercase();
    if lower.contains("already used") || lower.contains("has expired") {
        AuthError::ExpiredResetToken.into()
    } else if lower.contains("at least") || lower.contains("required") {
        ClientError::server(Some(400), text)
    } else {
        AuthError::InvalidResetToken.into()
    }
}

/// 401 from any session-protected call
pub(crate) fn session_failure(err: GatewayError) -> ClientError {
    match err.rejection() {
        Some((401, failure)) => {
            let expired = failure
                .text()
                .map(|t| t.to_lowercase().contains("expired"))
                .unwrap_or(false);
            if expired {
                AuthError::SessionExpired.into()
            } else {
                AuthError::SessionInvalid.into()
            }
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;
    use serde_json::json;

    fn user_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "email": "ann@example.com",
            "username": "ann",
            "credits": 0,
            "plan": "free",
            "is_admin": false
        })
    }

    fn form() -> Registration {
        Registration {
            email: "ann@example.com".to_string(),
            username: "ann".to_string(),
            full_name: Some("  ".to_string()),
            password: "longenough".to_string(),
            confirm_password: "longenough".to_string(),
            accept_terms: true,
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("ann@example.com").is_ok());
        assert_eq!(validate_email(" "), Err(ValidationError::MissingField("Email")));
        assert_eq!(validate_email("ann.example.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("ann@localhost"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("@example.com"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(
            validate_new_password("abc", "abd"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_new_password("short", "short"),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );
        assert!(validate_new_password("exactly8", "exactly8").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let gateway = Arc::new(FakeGateway::new());
        let client = AuthClient::new(gateway.clone());

        let mut bad = form();
        bad.confirm_password = "different1".to_string();
        let err = client.register(&bad).await.unwrap_err();
        assert_eq!(err, ClientError::Validation(ValidationError::PasswordMismatch));

        let mut bad = form();
        bad.accept_terms = false;
        assert!(client.register(&bad).await.is_err());
        assert!(client.login("", "x").await.is_err());

        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_register_maps_conflict_and_server_validation() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .fail(Service::Auth, Some(actions::REGISTER), 409, json!({"error": "User already exists"}))
            .fail(Service::Auth, Some(actions::REGISTER), 400, json!({"error": "Username is taken"}));
        let client = AuthClient::new(gateway.clone());

        let err = client.register(&form()).await.unwrap_err();
        assert_eq!(err, ClientError::Auth(AuthError::Duplicate));

        let err = client.register(&form()).await.unwrap_err();
        assert_eq!(err, ClientError::server(Some(400), "Username is taken"));
        assert!(!matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_drops_blank_full_name() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.ok(Service::Auth, Some(actions::REGISTER), json!({"user": user_json(1)}));
        let client = AuthClient::new(gateway.clone());

        let user = client.register(&form()).await.unwrap();
        assert_eq!(user.map(|u| u.id), Some(1));
        let body = gateway.calls()[0].body.clone().unwrap();
        assert!(body.get("full_name").is_none());
        assert!(gateway.calls()[0].token.is_none());
    }

    #[tokio::test]
    async fn test_login_success_and_bad_credentials() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .ok(
                Service::Auth,
                Some(actions::LOGIN),
                json!({"session_token": "tok-1", "user": user_json(5)}),
            )
            .fail(Service::Auth, Some(actions::LOGIN), 401, json!({"error": "Invalid email or password"}));
        let client = AuthClient::new(gateway);

        let session = client.login("ann@example.com", "longenough").await.unwrap();
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.user.id, 5);

        let err = client.login("ann@example.com", "wrong").await.unwrap_err();
        assert_eq!(err, ClientError::Auth(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_reset_request_supports_both_modes() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .ok(
                Service::Auth,
                Some(actions::RESET_REQUEST),
                json!({"message": "Password reset token generated", "token": "abc", "expires_at": "2026-01-01T00:00:00"}),
            )
            .ok(
                Service::Auth,
                Some(actions::RESET_REQUEST),
                json!({"message": "If email exists, reset link will be sent"}),
            );
        let client = AuthClient::new(gateway);

        let first = client.request_password_reset("ann@example.com").await.unwrap();
        assert!(matches!(first, ResetOutcome::TokenIssued { ref token, .. } if token == "abc"));

        let second = client.request_password_reset("ann@example.com").await.unwrap();
        assert!(matches!(second, ResetOutcome::EmailSent { message: Some(_) }));
    }

    #[tokio::test]
    async fn test_reset_complete_error_kinds() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .fail(Service::Auth, Some(actions::RESET_COMPLETE), 400, json!({"error": "Token has expired or already used"}))
            .fail(Service::Auth, Some(actions::RESET_COMPLETE), 400, json!({"error": "Invalid or expired token"}))
            .fail(Service::Auth, Some(actions::RESET_COMPLETE), 400, json!({"error": "Password must be at least 8 characters"}));
        let client = AuthClient::new(gateway);

        let err = client.complete_password_reset("t", "longenough", "longenough").await.unwrap_err();
        assert_eq!(err, ClientError::Auth(AuthError::ExpiredResetToken));
        let err = client.complete_password_reset("t", "longenough", "longenough").await.unwrap_err();
        assert_eq!(err, ClientError::Auth(AuthError::InvalidResetToken));
        let err = client.complete_password_reset("t", "longenough", "longenough").await.unwrap_err();
        assert!(err.is_refusal());
    }

    #[tokio::test]
    async fn test_verify_distinguishes_expired_from_invalid() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .fail(Service::Auth, Some(actions::VERIFY), 401, json!({"error": "Session expired"}))
            .fail(Service::Auth, Some(actions::VERIFY), 401, json!({"error": "Invalid session token"}))
            .ok(Service::Auth, Some(actions::VERIFY), json!({"user": user_json(9)}));
        let client = AuthClient::new(gateway.clone());

        assert_eq!(
            client.verify("t").await.unwrap_err(),
            ClientError::Auth(AuthError::SessionExpired)
        );
        assert_eq!(
            client.verify("t").await.unwrap_err(),
            ClientError::Auth(AuthError::SessionInvalid)
        );
        assert_eq!(client.verify("t").await.unwrap().id, 9);
        assert_eq!(gateway.calls()[2].token.as_deref(), Some("t"));
    }
}
