//! Admin operations.
//!
//! The admin flag on the local session only decides whether to try; the server
//! enforces access on every call and its 401/403 answers are authoritative.

use std::sync::Arc;

use shared::{
    actions, AddPhotoshootRequest, AddShowcaseRequest, AdminStats, CreatePromoRequest,
    CreatePromoResponse, CreatedResponse, GeneratedImage, ImagesResponse, PhotoshootExample,
    PhotoshootsResponse, PromoCode, PromoId, PromosResponse, ShowcaseId, ShowcaseItem,
    ShowcaseResponse, ShowcaseUpdate, StatsResponse, TogglePromoRequest, TogglePromoResponse,
    UserSummary, UsersResponse,
};

use crate::auth::session_failure;
use crate::error::{AuthError, ClientError, ClientResult, ValidationError};
use crate::gateway::{Gateway, GatewayError, Request, Service};
use crate::session::Session;

/// Generations granted by a new promo code unless specified
pub const DEFAULT_PROMO_GENERATIONS: u32 = 15;

/// One refresh of every admin tab; each part fails on its own
#[derive(Debug)]
pub struct AdminOverview {
    pub stats: ClientResult<AdminStats>,
    pub users: ClientResult<Vec<UserSummary>>,
    pub images: ClientResult<Vec<GeneratedImage>>,
    pub promos: ClientResult<Vec<PromoCode>>,
}

#[derive(Clone)]
pub struct AdminClient {
    gateway: Arc<dyn Gateway>,
}

impl AdminClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    async fn call(&self, session: &Session, request: Request) -> ClientResult<crate::gateway::Reply> {
        require_admin(session)?;
        self.gateway
            .call(request.token(&session.token))
            .await
            .map_err(admin_failure)
    }

    pub async fn list_stats(&self, session: &Session) -> ClientResult<AdminStats> {
        let reply = self
            .call(session, Request::get(Service::Auth).action(actions::ADMIN_STATS))
            .await?;
        Ok(reply.decode::<StatsResponse>()?.stats)
    }

    pub async fn list_users(&self, session: &Session) -> ClientResult<Vec<UserSummary>> {
        let reply = self
            .call(session, Request::get(Service::Auth).action(actions::ADMIN_USERS))
            .await?;
        Ok(reply.decode::<UsersResponse>()?.users)
    }

    /// Platform-wide, not scoped to one owner
    pub async fn list_images(&self, session: &Session) -> ClientResult<Vec<GeneratedImage>> {
        let reply = self
            .call(session, Request::get(Service::Auth).action(actions::ADMIN_IMAGES))
            .await?;
        let resp: ImagesResponse = reply.decode()?;
        Ok(resp.images.into_iter().map(GeneratedImage::from).collect())
    }

    pub async fn list_promos(&self, session: &Session) -> ClientResult<Vec<PromoCode>> {
        let reply = self
            .call(session, Request::get(Service::Admin).action(actions::LIST_PROMOS))
            .await?;
        Ok(reply.decode::<PromosResponse>()?.promos)
    }

    /// The server picks the code string
    pub async fn create_promo(
        &self,
        session: &Session,
        generations: Option<u32>,
        max_uses: Option<u32>,
    ) -> ClientResult<CreatePromoResponse> {
        let body = CreatePromoRequest {
            generations: generations.unwrap_or(DEFAULT_PROMO_GENERATIONS),
            max_uses,
        };
        let request = Request::post(Service::Admin)
            .action(actions::CREATE_PROMO)
            .json(&body)?;
        let resp: CreatePromoResponse = self.call(session, request).await?.decode()?;
        tracing::info!(generations = body.generations, "promo code created");
        Ok(resp)
    }

    /// Returns the new active flag as reported by the server
    pub async fn toggle_promo(&self, session: &Session, promo_id: PromoId) -> ClientResult<bool> {
        let request = Request::post(Service::Admin)
            .action(actions::TOGGLE_PROMO)
            .json(&TogglePromoRequest { promo_id })?;
        let resp: TogglePromoResponse = self.call(session, request).await?.decode()?;
        Ok(resp.is_active)
    }

    /// Curated items of one gallery category, in the server's display order
    pub async fn list_gallery(&self, session: &Session, category: &str) -> ClientResult<Vec<ShowcaseItem>> {
        let request = Request::get(Service::Admin)
            .action(actions::LIST_GALLERY)
            .query("category", category);
        Ok(self.call(session, request).await?.decode::<ShowcaseResponse>()?.items)
    }

    pub async fn add_gallery(&self, session: &Session, item: &AddShowcaseRequest) -> ClientResult<ShowcaseId> {
        if item.image_url.trim().is_empty() {
            return Err(ValidationError::MissingField("Image URL").into());
        }
        let request = Request::post(Service::Admin)
            .action(actions::ADD_GALLERY)
            .json(item)?;
        let created: CreatedResponse = self.call(session, request).await?.decode()?;
        tracing::info!(id = created.id, category = %item.category, "gallery item added");
        Ok(created.id)
    }

    pub async fn update_gallery(&self, session: &Session, update: &ShowcaseUpdate) -> ClientResult<()> {
        if update.is_empty() {
            return Err(ValidationError::MissingField("Change").into());
        }
        let request = Request::put(Service::Admin)
            .action(actions::UPDATE_GALLERY)
            .json(update)?;
        self.call(session, request).await?;
        Ok(())
    }

    pub async fn list_photoshoots(&self, session: &Session) -> ClientResult<Vec<PhotoshootExample>> {
        let request = Request::get(Service::Admin).action(actions::LIST_PHOTOSHOOTS);
        Ok(self.call(session, request).await?.decode::<PhotoshootsResponse>()?.items)
    }

    pub async fn add_photoshoot(&self, session: &Session, example: &AddPhotoshootRequest) -> ClientResult<ShowcaseId> {
        if example.image_url.trim().is_empty() {
            return Err(ValidationError::MissingField("Image URL").into());
        }
        if example.title.trim().is_empty() {
            return Err(ValidationError::MissingField("Title").into());
        }
        let request = Request::post(Service::Admin)
            .action(actions::ADD_PHOTOSHOOT)
            .json(example)?;
        let created: CreatedResponse = self.call(session, request).await?.decode()?;
        tracing::info!(id = created.id, "photoshoot example added");
        Ok(created.id)
    }

    /// Load all tabs concurrently. Failures are logged here; callers keep
    /// whatever they showed before for the failed parts.
    pub async fn overview(&self, session: &Session) -> AdminOverview {
        let (stats, users, images, promos) = futures::join!(
            self.list_stats(session),
            self.list_users(session),
            self.list_images(session),
            self.list_promos(session),
        );
        for (part, err) in [
            ("stats", stats.as_ref().err()),
            ("users", users.as_ref().err()),
            ("images", images.as_ref().err()),
            ("promos", promos.as_ref().err()),
        ] {
            if let Some(err) = err {
                tracing::warn!("admin {} refresh failed: {}", part, err);
            }
        }
        AdminOverview {
            stats,
            users,
            images,
            promos,
        }
    }
}

pub fn require_admin(session: &Session) -> ClientResult<()> {
    if session.user.is_admin {
        Ok(())
    } else {
        Err(AuthError::NotAdmin.into())
    }
}

fn admin_failure(err: GatewayError) -> ClientError {
    match err.rejection() {
        Some((403, _)) => AuthError::NotAdmin.into(),
        _ => session_failure(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;
    use serde_json::json;

    fn session(is_admin: bool) -> Session {
        let user = serde_json::from_value(json!({
            "id": 1,
            "email": "root@example.com",
            "username": "root",
            "is_admin": is_admin
        }))
        .unwrap();
        Session::new("admin-tok", user)
    }

    #[tokio::test]
    async fn test_non_admin_is_refused_before_any_request() {
        let gateway = Arc::new(FakeGateway::new());
        let client = AdminClient::new(gateway.clone());
        let err = client.list_stats(&session(false)).await.unwrap_err();
        assert_eq!(err, ClientError::Auth(AuthError::NotAdmin));
        assert!(client.create_promo(&session(false), None, None).await.is_err());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_server_refusal_overrides_local_flag() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .fail(Service::Auth, Some(actions::ADMIN_USERS), 403, json!({"error": "Admin access required"}))
            .fail(Service::Admin, Some(actions::LIST_PROMOS), 401, json!({"error": "INVALID_SESSION"}));
        let client = AdminClient::new(gateway);

        assert_eq!(
            client.list_users(&session(true)).await.unwrap_err(),
            ClientError::Auth(AuthError::NotAdmin)
        );
        assert_eq!(
            client.list_promos(&session(true)).await.unwrap_err(),
            ClientError::Auth(AuthError::SessionInvalid)
        );
    }

    #[tokio::test]
    async fn test_create_promo_defaults_and_uses_server_code() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.ok(
            Service::Admin,
            Some(actions::CREATE_PROMO),
            json!({"promo_code": "X7K2P9QW1Z", "id": 12, "generations": 15}),
        );
        let client = AdminClient::new(gateway.clone());

        let created = client.create_promo(&session(true), None, Some(5)).await.unwrap();
        assert_eq!(created.promo_code, "X7K2P9QW1Z");
        let call = &gateway.calls()[0];
        assert_eq!(call.token.as_deref(), Some("admin-tok"));
        assert_eq!(call.body.as_ref().unwrap()["generations"], 15);
        assert_eq!(call.body.as_ref().unwrap()["max_uses"], 5);
    }

    #[tokio::test]
    async fn test_toggle_returns_server_flag() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.ok(Service::Admin, Some(actions::TOGGLE_PROMO), json!({"is_active": false}));
        let client = AdminClient::new(gateway);
        assert!(!client.toggle_promo(&session(true), 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_gallery_listing_is_filtered_by_category() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.ok(
            Service::Admin,
            Some(actions::LIST_GALLERY),
            json!({"items": [
                {"id": 2, "image_url": "https://img/b.png", "title": "Noir", "theme": "noir", "is_visible": true, "display_order": 5},
                {"id": 1, "image_url": "https://img/a.png", "title": null, "is_visible": false, "display_order": 0}
            ]}),
        );
        let client = AdminClient::new(gateway.clone());

        let items = client.list_gallery(&session(true), shared::GALLERY_CATEGORY).await.unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 1]);
        assert!(!items[1].is_visible);
        let call = &gateway.calls()[0];
        assert_eq!(call.query, vec![("category", "gallery".to_string())]);
        assert_eq!(call.token.as_deref(), Some("admin-tok"));
    }

    #[tokio::test]
    async fn test_add_and_update_gallery_item() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .ok(Service::Admin, Some(actions::ADD_GALLERY), json!({"id": 17}))
            .ok(Service::Admin, Some(actions::UPDATE_GALLERY), json!({}));
        let client = AdminClient::new(gateway.clone());

        let item = AddShowcaseRequest {
            image_url: "https://img/new.png".to_string(),
            title: "Golden hour".to_string(),
            description: String::new(),
            theme: "outdoor".to_string(),
            category: shared::GALLERY_CATEGORY.to_string(),
        };
        assert_eq!(client.add_gallery(&session(true), &item).await.unwrap(), 17);

        let hide = ShowcaseUpdate {
            id: 17,
            is_visible: Some(false),
            ..Default::default()
        };
        client.update_gallery(&session(true), &hide).await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls[0].method, crate::gateway::Method::Post);
        assert_eq!(calls[0].body.as_ref().unwrap()["category"], "gallery");
        assert_eq!(calls[1].method, crate::gateway::Method::Put);
        assert_eq!(calls[1].body.as_ref().unwrap(), &json!({"id": 17, "is_visible": false}));
    }

    #[tokio::test]
    async fn test_showcase_input_checked_before_sending() {
        let gateway = Arc::new(FakeGateway::new());
        let client = AdminClient::new(gateway.clone());

        let empty_update = ShowcaseUpdate {
            id: 4,
            ..Default::default()
        };
        assert!(matches!(
            client.update_gallery(&session(true), &empty_update).await,
            Err(ClientError::Validation(_))
        ));
        let untitled = AddPhotoshootRequest {
            image_url: "https://img/p.png".to_string(),
            title: "  ".to_string(),
            description: String::new(),
            theme_id: "studio".to_string(),
            icon: "Image".to_string(),
        };
        assert!(matches!(
            client.add_photoshoot(&session(true), &untitled).await,
            Err(ClientError::Validation(_))
        ));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_photoshoot_examples_round_trip() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .ok(Service::Admin, Some(actions::ADD_PHOTOSHOOT), json!({"id": 9}))
            .ok(
                Service::Admin,
                Some(actions::LIST_PHOTOSHOOTS),
                json!({"items": [{"id": 9, "image_url": "https://img/p.png", "title": "Studio",
                    "theme_id": "studio", "icon": "Camera", "is_visible": true, "display_order": 0}]}),
            );
        let client = AdminClient::new(gateway);

        let example = AddPhotoshootRequest {
            image_url: "https://img/p.png".to_string(),
            title: "Studio".to_string(),
            description: String::new(),
            theme_id: "studio".to_string(),
            icon: "Camera".to_string(),
        };
        assert_eq!(client.add_photoshoot(&session(true), &example).await.unwrap(), 9);
        let listed = client.list_photoshoots(&session(true)).await.unwrap();
        assert_eq!(listed[0].theme_id.as_deref(), Some("studio"));
        assert_eq!(listed[0].icon.as_deref(), Some("Camera"));
    }

    #[tokio::test]
    async fn test_showcase_calls_need_admin() {
        let gateway = Arc::new(FakeGateway::new());
        let client = AdminClient::new(gateway.clone());
        assert_eq!(
            client.list_photoshoots(&session(false)).await.unwrap_err(),
            ClientError::Auth(AuthError::NotAdmin)
        );
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_overview_keeps_partial_results() {
        let gateway = Arc::new(FakeGateway::new());
        gateway
            .ok(
                Service::Auth,
                Some(actions::ADMIN_STATS),
                json!({"stats": {"total_users": 4, "total_images": 9, "total_credits_used": 2, "active_users": 1}}),
            )
            .ok(Service::Auth, Some(actions::ADMIN_USERS), json!({"users": []}))
            .ok(
                Service::Auth,
                Some(actions::ADMIN_IMAGES),
                json!({"images": [{
                    "id": 5,
                    "prompt": "p",
                    "image_url": "https://img/5.png",
                    "theme": "",
                    "user": {"id": 2, "username": "bob", "email": "bob@example.com"}
                }]}),
            );
        // promos left unscripted: the fake answers with a transport error
        let client = AdminClient::new(gateway);

        let overview = client.overview(&session(true)).await;
        assert_eq!(overview.stats.unwrap().active_users_this_week, 1);
        assert!(overview.users.unwrap().is_empty());
        let images = overview.images.unwrap();
        assert_eq!(images[0].owner.id, 2);
        assert_eq!(images[0].theme, None);
        assert!(matches!(overview.promos, Err(ClientError::Transport(_))));
    }
}
