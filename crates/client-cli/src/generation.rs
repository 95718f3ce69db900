//! Generation client.
//!
//! A generation is two independent calls: the image request itself and the
//! metadata write that makes the image durable. They fail separately and log
//! under separate targets (`photoset::generation`, `photoset::persist`) so one
//! is never reported as the other.

use std::sync::Arc;

use shared::{
    codes, GenerateRequest, GenerateResponse, GeneratedImage, ImageId, ImageSize, OwnerRef,
    SaveImageRequest, SaveImageResponse, Theme, DEFAULT_MODEL,
};

use crate::auth::session_failure;
use crate::error::{AuthError, ClientError, QuotaError, ValidationError};
use crate::gateway::{Gateway, GatewayError, Request, Service};
use crate::session::{Session, SessionStore};

/// Prompt used when only a theme was chosen
pub fn fallback_prompt(theme: Theme) -> String {
    format!("a professional {} photoshoot portrait", theme.id())
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub theme: Option<Theme>,
    pub size: ImageSize,
    pub model: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            theme: None,
            size: ImageSize::default(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_theme(mut self, theme: Option<Theme>) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Text actually sent, and whether it was synthesised from the theme
    pub fn effective_prompt(&self) -> Result<(String, bool), ValidationError> {
        let prompt = self.prompt.trim();
        if !prompt.is_empty() {
            return Ok((prompt.to_string(), false));
        }
        match self.theme {
            Some(theme) => Ok((fallback_prompt(theme), true)),
            None => Err(ValidationError::EmptyPrompt),
        }
    }
}

/// Remaining allowance after a successful generation.
///
/// Which counter the server fills depends on the account mode; the other one is
/// null and must not be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    FreeGenerations(u32),
    Credits(u32),
    /// Neither or both counters present
    Unreported,
}

impl Remaining {
    pub fn from_response(resp: &GenerateResponse) -> Self {
        match (resp.remaining_free, resp.remaining_credits) {
            (Some(free), None) => Remaining::FreeGenerations(free),
            (None, Some(credits)) => Remaining::Credits(credits),
            (free, credits) => {
                tracing::warn!(
                    target: "photoset::generation",
                    ?free,
                    ?credits,
                    "expected exactly one remaining counter"
                );
                Remaining::Unreported
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// `image` is the in-session record; its id is set once persisted
    Success {
        image: GeneratedImage,
        remaining: Remaining,
    },
    QuotaExceeded(QuotaError),
    Error(ClientError),
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }
}

/// Outcome of the metadata write
#[derive(Debug, Clone, PartialEq)]
pub enum Persistence {
    /// `created_at` is the server's timestamp when it sent one
    Saved { id: ImageId, created_at: Option<String> },
    Failed { reason: String },
}

/// Everything one press of the generate button produced
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub result: GenerationResult,
    /// Only present after a successful generation
    pub persistence: Option<Persistence>,
    pub used_fallback_prompt: bool,
}

impl Generation {
    fn failed(err: impl Into<ClientError>) -> Self {
        Self {
            result: GenerationResult::Error(err.into()),
            persistence: None,
            used_fallback_prompt: false,
        }
    }
}

#[derive(Clone)]
pub struct GenerationClient {
    gateway: Arc<dyn Gateway>,
}

impl GenerationClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// The image request alone. Never retried.
    pub async fn generate(&self, session: &Session, request: &GenerationRequest) -> GenerationResult {
        let (prompt, _) = match request.effective_prompt() {
            Ok(p) => p,
            Err(e) => return GenerationResult::Error(e.into()),
        };

        let body = GenerateRequest {
            prompt: prompt.clone(),
            size: request.size,
            model: request.model.clone(),
        };
        let call = match Request::post(Service::Generate).token(&session.token).json(&body) {
            Ok(call) => call,
            Err(e) => return GenerationResult::Error(e.into()),
        };

        match self.gateway.call(call).await {
            Ok(reply) => match reply.decode::<GenerateResponse>() {
                Ok(resp) => {
                    let remaining = Remaining::from_response(&resp);
                    let image = GeneratedImage::in_session(
                        OwnerRef::from_user(&session.user),
                        resp.prompt.unwrap_or(prompt),
                        resp.image_url,
                        request.theme.map(|t| t.id().to_string()),
                        resp.model.unwrap_or_else(|| request.model.clone()),
                    );
                    tracing::info!(
                        target: "photoset::generation",
                        user_id = session.user.id,
                        ?remaining,
                        "image generated"
                    );
                    GenerationResult::Success { image, remaining }
                }
                Err(e) => {
                    tracing::error!(target: "photoset::generation", "unreadable response: {}", e);
                    GenerationResult::Error(e.into())
                }
            },
            Err(err) => classify_failure(err),
        }
    }

    /// Metadata write for an already generated image
    pub async fn persist(&self, image: &GeneratedImage) -> Persistence {
        let call = match Request::post(Service::SaveImage).json(&SaveImageRequest::for_image(image)) {
            Ok(call) => call,
            Err(e) => return persist_failed(e),
        };
        match self.gateway.call(call).await {
            Ok(reply) => match reply.decode::<SaveImageResponse>() {
                Ok(resp) => {
                    tracing::info!(target: "photoset::persist", image_id = resp.image_id, "image saved");
                    Persistence::Saved {
                        id: resp.image_id,
                        created_at: resp.created_at,
                    }
                }
                Err(e) => persist_failed(e),
            },
            Err(e) => persist_failed(e),
        }
    }

    /// Full flow: verified session, generation, counters, then persistence.
    ///
    /// Quota results short-circuit before anything is persisted. A failed
    /// metadata write leaves the generated image in the result.
    pub async fn run(&self, store: &SessionStore, request: &GenerationRequest) -> Generation {
        let used_fallback_prompt = match request.effective_prompt() {
            Ok((_, fallback)) => fallback,
            Err(e) => return Generation::failed(e),
        };
        let session = match store.ensure_verified().await {
            Ok(session) => session,
            Err(e) => return Generation::failed(e),
        };

        let mut result = self.generate(&session, request).await;
        let mut persistence = None;

        match &mut result {
            GenerationResult::Success { image, remaining } => {
                match *remaining {
                    Remaining::FreeGenerations(left) => store.apply_free_remaining(left).await,
                    Remaining::Credits(left) => store.apply_credit_delta(left).await,
                    Remaining::Unreported => {}
                }
                let saved = self.persist(image).await;
                if let Persistence::Saved { id, created_at } = &saved {
                    image.id = Some(*id);
                    if created_at.is_some() {
                        image.created_at = created_at.clone();
                    }
                }
                persistence = Some(saved);
            }
            GenerationResult::Error(e) if e.invalidates_session() => store.invalidate().await,
            _ => {}
        }

        Generation {
            result,
            persistence,
            used_fallback_prompt,
        }
    }
}

fn classify_failure(err: GatewayError) -> GenerationResult {
    if let Some((_, failure)) = err.rejection() {
        match failure.code() {
            Some(codes::LIMIT_EXCEEDED) => {
                return GenerationResult::QuotaExceeded(QuotaError::FreeLimitReached {
                    limit: failure.free_limit,
                })
            }
            Some(codes::NO_CREDITS) => return GenerationResult::QuotaExceeded(QuotaError::NoCreditsLeft),
            Some(codes::AUTH_REQUIRED) => {
                return GenerationResult::Error(AuthError::SessionInvalid.into())
            }
            _ => {}
        }
    }
    let err = session_failure(err);
    tracing::error!(target: "photoset::generation", "generation failed: {}", err);
    GenerationResult::Error(err)
}

fn persist_failed(err: GatewayError) -> Persistence {
    let reason = ClientError::from(err).to_string();
    tracing::error!(target: "photoset::persist", "image metadata not saved: {}", reason);
    Persistence::Failed { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthClient;
    use crate::gateway::fake::FakeGateway;
    use crate::session::{MemoryStorage, SessionState};
    use serde_json::json;
    use std::time::Duration;

    fn free_user() -> serde_json::Value {
        json!({
            "id": 1,
            "email": "ann@example.com",
            "username": "ann",
            "free_generations_used": 2,
            "free_generations_limit": 3
        })
    }

    fn credit_user() -> serde_json::Value {
        json!({
            "id": 2,
            "email": "bob@example.com",
            "username": "bob",
            "credits": 10,
            "subscription_status": "active"
        })
    }

    async fn signed_in(gateway: Arc<FakeGateway>, user: serde_json::Value) -> SessionStore {
        gateway.ok(
            Service::Auth,
            Some(shared::actions::LOGIN),
            json!({"session_token": "tok", "user": user}),
        );
        let store = SessionStore::new(
            AuthClient::new(gateway),
            Arc::new(MemoryStorage::new()),
            Duration::from_secs(1),
        );
        store.login("someone@example.com", "longenough").await.unwrap();
        store
    }

    #[test]
    fn test_theme_only_uses_fallback_prompt() {
        let req = GenerationRequest::new("   ").with_theme(Some(Theme::Vintage));
        let (prompt, fallback) = req.effective_prompt().unwrap();
        assert_eq!(prompt, "a professional vintage photoshoot portrait");
        assert!(fallback, "theme-only prompt must be flagged as a fallback");

        let req = GenerationRequest::new("sunset portrait").with_theme(Some(Theme::Vintage));
        assert_eq!(req.effective_prompt().unwrap(), ("sunset portrait".to_string(), false));

        assert_eq!(
            GenerationRequest::new("").effective_prompt(),
            Err(ValidationError::EmptyPrompt)
        );
    }

    #[test]
    fn test_remaining_requires_exactly_one_counter() {
        let resp = |free: Option<u32>, credits: Option<u32>| GenerateResponse {
            image_url: "u".to_string(),
            remaining_free: free,
            remaining_credits: credits,
            prompt: None,
            model: None,
            subscription_status: Default::default(),
        };
        assert_eq!(Remaining::from_response(&resp(Some(0), None)), Remaining::FreeGenerations(0));
        assert_eq!(Remaining::from_response(&resp(None, Some(9))), Remaining::Credits(9));
        assert_eq!(Remaining::from_response(&resp(Some(1), Some(9))), Remaining::Unreported);
        assert_eq!(Remaining::from_response(&resp(None, None)), Remaining::Unreported);
    }

    #[tokio::test]
    async fn test_free_tier_success_updates_counter_and_persists() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone(), free_user()).await;
        gateway
            .ok(
                Service::Generate,
                None,
                json!({"image_url": "https://img/1.png", "remaining_free": 0, "remaining_credits": null}),
            )
            .ok(
                Service::SaveImage,
                None,
                json!({"image_id": 41, "created_at": "2026-10-16T09:30:00"}),
            );

        let client = GenerationClient::new(gateway.clone());
        let outcome = client.run(&store, &GenerationRequest::new("sunset portrait")).await;

        match &outcome.result {
            GenerationResult::Success { image, remaining } => {
                assert_eq!(*remaining, Remaining::FreeGenerations(0));
                assert_eq!(image.id, Some(41));
                assert_eq!(image.created_at.as_deref(), Some("2026-10-16T09:30:00"));
                assert_eq!(image.owner.id, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(outcome.persistence, Some(Persistence::Saved { id: 41, .. })));
        let user = store.snapshot().user().cloned().unwrap();
        assert_eq!(user.free_generations_remaining(), 0);

        let generate_call = gateway
            .calls()
            .into_iter()
            .find(|c| c.service == Service::Generate)
            .unwrap();
        assert_eq!(generate_call.token.as_deref(), Some("tok"));
        assert_eq!(generate_call.body.unwrap()["size"], "1024x1024");
    }

    #[tokio::test]
    async fn test_credit_tier_success_reports_credits() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone(), credit_user()).await;
        gateway
            .ok(
                Service::Generate,
                None,
                json!({"image_url": "https://img/2.png", "remaining_free": null, "remaining_credits": 9}),
            )
            .ok(Service::SaveImage, None, json!({"image_id": 42}));

        let outcome = GenerationClient::new(gateway)
            .run(&store, &GenerationRequest::new("studio headshot"))
            .await;
        assert!(matches!(
            outcome.result,
            GenerationResult::Success { remaining: Remaining::Credits(9), .. }
        ));
        assert_eq!(store.snapshot().user().unwrap().credits, 9);
    }

    #[tokio::test]
    async fn test_quota_exceeded_skips_persistence() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone(), free_user()).await;
        gateway.fail(
            Service::Generate,
            None,
            403,
            json!({"error": "Free generations limit exceeded", "code": "LIMIT_EXCEEDED", "free_used": 3, "free_limit": 3}),
        );

        let outcome = GenerationClient::new(gateway.clone())
            .run(&store, &GenerationRequest::new("sunset portrait"))
            .await;
        assert_eq!(
            outcome.result,
            GenerationResult::QuotaExceeded(QuotaError::FreeLimitReached { limit: Some(3) })
        );
        assert!(outcome.persistence.is_none());
        assert_eq!(gateway.calls_to(Service::SaveImage), 0);
    }

    #[tokio::test]
    async fn test_no_credits_is_quota() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone(), credit_user()).await;
        gateway.fail(Service::Generate, None, 403, json!({"error": "No credits remaining", "code": "NO_CREDITS"}));

        let outcome = GenerationClient::new(gateway)
            .run(&store, &GenerationRequest::new("x"))
            .await;
        assert_eq!(outcome.result, GenerationResult::QuotaExceeded(QuotaError::NoCreditsLeft));
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_image_and_differs_from_generation_failure() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone(), free_user()).await;
        gateway
            .ok(Service::Generate, None, json!({"image_url": "https://img/3.png", "remaining_free": 0}))
            .fail(Service::SaveImage, None, 500, json!({"error": "Database not configured"}));

        let outcome = GenerationClient::new(gateway)
            .run(&store, &GenerationRequest::new("sunset portrait"))
            .await;
        match &outcome.result {
            GenerationResult::Success { image, .. } => {
                assert_eq!(image.image_url, "https://img/3.png");
                assert!(!image.is_durable());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(outcome.persistence, Some(Persistence::Failed { .. })));
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces_message_without_persist() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone(), free_user()).await;
        gateway.fail(Service::Generate, None, 500, json!({"error": "OpenAI API key not configured"}));

        let outcome = GenerationClient::new(gateway.clone())
            .run(&store, &GenerationRequest::new("sunset portrait"))
            .await;
        assert_eq!(
            outcome.result,
            GenerationResult::Error(ClientError::server(Some(500), "OpenAI API key not configured"))
        );
        assert_eq!(gateway.calls_to(Service::SaveImage), 0);
    }

    #[tokio::test]
    async fn test_auth_required_drops_session() {
        let gateway = Arc::new(FakeGateway::new());
        let store = signed_in(gateway.clone(), free_user()).await;
        gateway.fail(
            Service::Generate,
            None,
            401,
            json!({"error": "Invalid or expired session", "code": "AUTH_REQUIRED"}),
        );

        let outcome = GenerationClient::new(gateway)
            .run(&store, &GenerationRequest::new("x"))
            .await;
        assert!(matches!(outcome.result, GenerationResult::Error(ClientError::Auth(_))));
        assert_eq!(store.snapshot(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_signed_out_run_sends_nothing() {
        let gateway = Arc::new(FakeGateway::new());
        let store = SessionStore::new(
            AuthClient::new(gateway.clone()),
            Arc::new(MemoryStorage::new()),
            Duration::from_secs(1),
        );
        let outcome = GenerationClient::new(gateway.clone())
            .run(&store, &GenerationRequest::new("sunset portrait"))
            .await;
        assert_eq!(
            outcome.result,
            GenerationResult::Error(AuthError::NotSignedIn.into())
        );
        assert!(gateway.calls().is_empty());
    }
}
