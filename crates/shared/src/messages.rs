use serde::{Deserialize, Serialize};

use crate::models::{
    AdminStats, GeneratedImage, ImageId, ImageSize, OwnerRef, PaidPlan, PhotoshootExample,
    PromoCode, PromoId, ShowcaseId, ShowcaseItem, SubscriptionStatus, UserId, UserSummary,
    DEFAULT_MODEL,
};

/// Header carrying the session token on protected calls
pub const SESSION_HEADER: &str = "X-Session-Token";

/// Machine-readable values of the `code` / `error` fields in failure bodies
pub mod codes {
    pub const LIMIT_EXCEEDED: &str = "LIMIT_EXCEEDED";
    pub const NO_CREDITS: &str = "NO_CREDITS";
    pub const AUTH_REQUIRED: &str = "AUTH_REQUIRED";
    pub const INVALID_SESSION: &str = "INVALID_SESSION";
    pub const ADMIN_ONLY: &str = "ADMIN_ONLY";
    pub const PROMO_CODE_REQUIRED: &str = "PROMO_CODE_REQUIRED";
    pub const PROMO_NOT_FOUND: &str = "PROMO_NOT_FOUND";
    pub const PROMO_INACTIVE: &str = "PROMO_INACTIVE";
    pub const PROMO_EXHAUSTED: &str = "PROMO_EXHAUSTED";
    pub const PROMO_ALREADY_USED: &str = "PROMO_ALREADY_USED";
}

/// Backend actions, sent as the `action` query parameter
pub mod actions {
    pub const REGISTER: &str = "register";
    pub const LOGIN: &str = "login";
    pub const VERIFY: &str = "verify";
    pub const RESET_REQUEST: &str = "reset-request";
    pub const RESET_COMPLETE: &str = "reset-complete";
    pub const ADMIN_STATS: &str = "admin_stats";
    pub const ADMIN_USERS: &str = "admin_users";
    pub const ADMIN_IMAGES: &str = "admin_images";
    pub const LIST_PROMOS: &str = "list-promos";
    pub const CREATE_PROMO: &str = "create-promo";
    pub const TOGGLE_PROMO: &str = "toggle-promo";
    pub const ACTIVATE_PROMO: &str = "activate-promo";
    pub const ADD_GALLERY: &str = "add-gallery";
    pub const LIST_GALLERY: &str = "list-gallery";
    pub const UPDATE_GALLERY: &str = "update-gallery";
    pub const ADD_PHOTOSHOOT: &str = "add-photoshoot";
    pub const LIST_PHOTOSHOOTS: &str = "list-photoshoots";
    pub const CREATE_ORDER: &str = "create-order";
    pub const CAPTURE_ORDER: &str = "capture-order";
}

// ============================================================================
// Failure body
// ============================================================================

/// Body of a rejected call (`success` false or absent, usually non-2xx).
///
/// Every endpoint uses `error`; some add a `code` and a human `message`, and the
/// generation quota failures carry their counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub free_used: Option<u32>,
    #[serde(default)]
    pub free_limit: Option<u32>,
    #[serde(default)]
    pub credits: Option<i64>,
}

impl Failure {
    /// `code` if present, otherwise `error` (the admin function puts codes there)
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().or(self.error.as_deref())
    }

    /// Best human-readable text: `message`, then `error`
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub session_token: String,
    pub user: UserSummary,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// The token is only present when the backend runs in direct-token mode;
/// in email-delivery mode it only confirms that a link was sent.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetRequestResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetCompleteRequest {
    pub token: String,
    pub new_password: String,
}

/// Plain `{success: true, message?}` acknowledgement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Generation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub size: ImageSize,
    pub model: String,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: ImageSize::default(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Successful generation. Exactly one of the remaining counters is meaningful,
/// depending on whether the account is on the free tier or on credits.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub image_url: String,
    #[serde(default)]
    pub remaining_free: Option<u32>,
    #[serde(default)]
    pub remaining_credits: Option<u32>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
}

/// Metadata write for a generated image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveImageRequest {
    pub user_id: UserId,
    pub prompt: String,
    pub image_url: String,
    pub theme: Option<String>,
    pub model: String,
}

impl SaveImageRequest {
    pub fn for_image(image: &GeneratedImage) -> Self {
        Self {
            user_id: image.owner.id,
            prompt: image.prompt.clone(),
            image_url: image.image_url.clone(),
            theme: image.theme.clone(),
            model: image.model.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveImageResponse {
    pub image_id: ImageId,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Row of the per-user image listing
#[derive(Debug, Clone, Deserialize)]
pub struct UserImageRecord {
    pub id: ImageId,
    pub user_id: UserId,
    pub prompt: String,
    pub image_url: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<UserImageRecord> for GeneratedImage {
    fn from(record: UserImageRecord) -> Self {
        GeneratedImage {
            id: Some(record.id),
            prompt: record.prompt,
            image_url: record.image_url,
            theme: record.theme.filter(|t| !t.is_empty()),
            model: record.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            created_at: record.created_at,
            owner: OwnerRef {
                id: record.user_id,
                username: None,
                email: None,
            },
            is_favorite: record.is_favorite,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserImagesResponse {
    #[serde(default)]
    pub images: Vec<UserImageRecord>,
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub stats: AdminStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<UserSummary>,
}

/// Row of the platform-wide image listing
#[derive(Debug, Clone, Deserialize)]
pub struct AdminImageRecord {
    pub id: ImageId,
    pub prompt: String,
    pub image_url: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub user: OwnerRef,
}

impl From<AdminImageRecord> for GeneratedImage {
    fn from(record: AdminImageRecord) -> Self {
        GeneratedImage {
            id: Some(record.id),
            prompt: record.prompt,
            image_url: record.image_url,
            theme: record.theme.filter(|t| !t.is_empty()),
            model: record.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            created_at: record.created_at,
            owner: record.user,
            is_favorite: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub images: Vec<AdminImageRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromosResponse {
    #[serde(default)]
    pub promos: Vec<PromoCode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePromoRequest {
    pub generations: u32,
    pub max_uses: Option<u32>,
}

/// The backend generates the code string
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePromoResponse {
    pub promo_code: String,
    #[serde(default)]
    pub id: Option<PromoId>,
    #[serde(default)]
    pub generations: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TogglePromoRequest {
    pub promo_id: PromoId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TogglePromoResponse {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivatePromoRequest {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivatePromoResponse {
    pub generations_added: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Category of the public gallery page; other categories are free-form
pub const GALLERY_CATEGORY: &str = "gallery";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddShowcaseRequest {
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub theme: String,
    pub category: String,
}

/// Partial update; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowcaseUpdate {
    pub id: ShowcaseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

impl ShowcaseUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image_url.is_none() && self.is_visible.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowcaseResponse {
    #[serde(default)]
    pub items: Vec<ShowcaseItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPhotoshootRequest {
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub theme_id: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoshootsResponse {
    #[serde(default)]
    pub items: Vec<PhotoshootExample>,
}

/// Id of a row the admin backend just inserted
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResponse {
    pub id: ShowcaseId,
}

// ============================================================================
// Billing
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub plan: PaidPlan,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    #[serde(default)]
    pub approve_link: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOrderRequest {
    pub order_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureOrderResponse {
    pub order_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub credits_added: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_omits_missing_full_name() {
        let req = RegisterRequest {
            email: "a@b.io".to_string(),
            username: "ann".to_string(),
            full_name: None,
            password: "secret123".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("full_name"));
        assert!(json.contains("\"username\":\"ann\""));
    }

    #[test]
    fn test_login_response_parses_backend_body() {
        let json = r#"{"success":true,"session_token":"tok","expires_at":"2025-02-01T00:00:00","user":{"id":1,"email":"a@b.io","username":"ann","full_name":null,"credits":50,"plan":"free","avatar_url":null,"is_admin":false}}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.session_token, "tok");
        assert_eq!(resp.user.credits, 50);
    }

    #[test]
    fn test_reset_request_response_both_modes() {
        let direct: ResetRequestResponse =
            serde_json::from_str(r#"{"success":true,"token":"abc","message":"Password reset token generated"}"#).unwrap();
        assert_eq!(direct.token.as_deref(), Some("abc"));

        let email: ResetRequestResponse =
            serde_json::from_str(r#"{"success":true,"message":"If email exists, reset link will be sent"}"#).unwrap();
        assert_eq!(email.token, None);
    }

    #[test]
    fn test_generate_request_wire_shape() {
        let req = GenerateRequest::new("sunset portrait");
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"prompt":"sunset portrait","size":"1024x1024","model":"dall-e-3"}"#);
    }

    #[test]
    fn test_generate_response_free_tier() {
        let json = r#"{"success":true,"image_url":"https://img/1.png","prompt":"p","model":"dall-e-3","remaining_free":0,"remaining_credits":null,"subscription_status":null}"#;
        let resp: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.remaining_free, Some(0));
        assert_eq!(resp.remaining_credits, None);
        assert_eq!(resp.subscription_status, SubscriptionStatus::None);
    }

    #[test]
    fn test_failure_quota_body() {
        let json = r#"{"error":"Free generations limit exceeded","code":"LIMIT_EXCEEDED","free_used":3,"free_limit":3,"message":"You have used all 3 free generations."}"#;
        let failure: Failure = serde_json::from_str(json).unwrap();
        assert_eq!(failure.code(), Some(codes::LIMIT_EXCEEDED));
        assert_eq!(failure.free_limit, Some(3));
        assert_eq!(failure.text(), Some("You have used all 3 free generations."));
    }

    #[test]
    fn test_failure_code_falls_back_to_error() {
        let failure: Failure = serde_json::from_str(r#"{"error":"ADMIN_ONLY"}"#).unwrap();
        assert_eq!(failure.code(), Some(codes::ADMIN_ONLY));
    }

    #[test]
    fn test_admin_image_record_into_generated_image() {
        let json = r#"{"id":9,"prompt":"p","image_url":"https://img/9.png","theme":"","model":null,"created_at":null,"user":{"id":2,"username":"bob","email":"b@c.io"}}"#;
        let record: AdminImageRecord = serde_json::from_str(json).unwrap();
        let image = GeneratedImage::from(record);
        assert_eq!(image.id, Some(9));
        assert_eq!(image.theme, None);
        assert_eq!(image.model, DEFAULT_MODEL);
        assert_eq!(image.owner.username.as_deref(), Some("bob"));
        assert!(image.is_durable());
    }

    #[test]
    fn test_save_image_request_from_in_session_image() {
        let owner = OwnerRef { id: 4, username: None, email: None };
        let image = GeneratedImage::in_session(owner, "p", "https://img/2.png", Some("studio".to_string()), "dall-e-3");
        let req = SaveImageRequest::for_image(&image);
        assert_eq!(req.user_id, 4);
        assert_eq!(req.theme.as_deref(), Some("studio"));
    }

    #[test]
    fn test_create_order_request_plan_id() {
        let json = serde_json::to_string(&CreateOrderRequest { plan: PaidPlan::Standard }).unwrap();
        assert_eq!(json, r#"{"plan":"standard"}"#);
    }

    #[test]
    fn test_showcase_update_sends_only_set_fields() {
        let update = ShowcaseUpdate {
            id: 3,
            is_visible: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"id":3,"is_visible":false}"#);
        assert!(ShowcaseUpdate { id: 3, ..Default::default() }.is_empty());
    }

    #[test]
    fn test_showcase_listing_tolerates_nulls() {
        let resp: ShowcaseResponse = serde_json::from_str(
            r#"{"success": true, "items": [{"id": 1, "image_url": "https://img/a.png", "title": "Studio",
                "description": null, "theme": "studio", "is_visible": null, "display_order": 2}]}"#,
        )
        .unwrap();
        let item = &resp.items[0];
        assert_eq!(item.description, None);
        assert!(!item.is_visible);
        assert_eq!(item.display_order, 2);
    }
}
