use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend row ids are plain integers.
pub type UserId = i64;
pub type ImageId = i64;
pub type PromoId = i64;
pub type ShowcaseId = i64;

/// Free generations granted before a subscription is required.
pub const DEFAULT_FREE_GENERATIONS_LIMIT: u32 = 3;

/// Model sent when the user does not pick one.
pub const DEFAULT_MODEL: &str = "dall-e-3";

/// Error for the `FromStr` impls in this module
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseValueError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_free_limit() -> u32 {
    DEFAULT_FREE_GENERATIONS_LIMIT
}

// ============================================================================
// Users
// ============================================================================

/// Account plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Starter,
    Standard,
    Premium,
    Unlimited,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Standard => "standard",
            Plan::Premium => "premium",
            Plan::Unlimited => "unlimited",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription state as reported by the backend.
///
/// The backend stores this as a nullable string; `null` and `"none"` both mean
/// the account is on the free tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum SubscriptionStatus {
    #[default]
    None,
    Active,
    Other(String),
}

impl From<Option<String>> for SubscriptionStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            None | Some("none") | Some("") => SubscriptionStatus::None,
            Some("active") => SubscriptionStatus::Active,
            Some(other) => SubscriptionStatus::Other(other.to_string()),
        }
    }
}

impl From<SubscriptionStatus> for Option<String> {
    fn from(value: SubscriptionStatus) -> Self {
        match value {
            SubscriptionStatus::None => Some("none".to_string()),
            SubscriptionStatus::Active => Some("active".to_string()),
            SubscriptionStatus::Other(s) => Some(s),
        }
    }
}

/// Which counter the backend debits for this account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMode {
    /// Counted against `free_generations_used / free_generations_limit`
    FreeTier,
    /// Debits one credit per generation
    Credits,
}

/// Denormalised copy of the backend user record.
///
/// Display-only: every number here is whatever the server last said and is
/// stale after any round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub credits: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plan: Plan,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub free_generations_used: u32,
    #[serde(default = "default_free_limit")]
    pub free_generations_limit: u32,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserSummary {
    pub fn account_mode(&self) -> AccountMode {
        match self.subscription_status {
            SubscriptionStatus::Active => AccountMode::Credits,
            _ => AccountMode::FreeTier,
        }
    }

    pub fn free_generations_remaining(&self) -> u32 {
        self.free_generations_limit
            .saturating_sub(self.free_generations_used)
    }

    /// Full name when present, otherwise the username, otherwise the email
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ if !self.username.is_empty() => self.username.as_str(),
            _ => self.email.as_str(),
        }
    }
}

// ============================================================================
// Images
// ============================================================================

/// Who generated an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl OwnerRef {
    pub fn from_user(user: &UserSummary) -> Self {
        Self {
            id: user.id,
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
        }
    }
}

/// A generated image reference. The client only ever holds the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Assigned by the backend once the metadata write succeeded
    pub id: Option<ImageId>,
    pub prompt: String,
    pub image_url: String,
    pub theme: Option<String>,
    pub model: String,
    pub created_at: Option<String>,
    pub owner: OwnerRef,
    #[serde(default)]
    pub is_favorite: bool,
}

impl GeneratedImage {
    /// Record for an image produced in this session, before it is persisted
    pub fn in_session(
        owner: OwnerRef,
        prompt: impl Into<String>,
        image_url: impl Into<String>,
        theme: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            prompt: prompt.into(),
            image_url: image_url.into(),
            theme,
            model: model.into(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            owner,
            is_favorite: false,
        }
    }

    /// Durable means the backend acknowledged the metadata write
    pub fn is_durable(&self) -> bool {
        self.id.is_some()
    }
}

/// Output resolution accepted by the generation backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1792x1024")]
    Landscape,
    #[serde(rename = "1024x1792")]
    Portrait,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::Square, ImageSize::Landscape, ImageSize::Portrait];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square => "1024x1024",
            ImageSize::Landscape => "1792x1024",
            ImageSize::Portrait => "1024x1792",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ImageSize::Square => ImageSize::Landscape,
            ImageSize::Landscape => ImageSize::Portrait,
            ImageSize::Portrait => ImageSize::Square,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageSize::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| ParseValueError::new("image size", s))
    }
}

/// Photoshoot themes offered by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Professional,
    Fashion,
    Casual,
    Outdoor,
    Vintage,
    Studio,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Professional,
        Theme::Fashion,
        Theme::Casual,
        Theme::Outdoor,
        Theme::Vintage,
        Theme::Studio,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Theme::Professional => "professional",
            Theme::Fashion => "fashion",
            Theme::Casual => "casual",
            Theme::Outdoor => "outdoor",
            Theme::Vintage => "vintage",
            Theme::Studio => "studio",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Theme {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Theme::ALL
            .into_iter()
            .find(|theme| theme.id() == needle)
            .ok_or_else(|| ParseValueError::new("theme", s))
    }
}

/// Display language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Ru,
            Language::Ru => Language::En,
        }
    }
}

impl FromStr for Language {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            _ => Err(ParseValueError::new("language", s)),
        }
    }
}

// ============================================================================
// Admin
// ============================================================================

/// Promo code as owned by the admin backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: PromoId,
    pub code: String,
    #[serde(rename = "generations")]
    pub generations_granted: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_count: u32,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Curated picture shown on the public gallery and examples pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowcaseItem {
    pub id: ShowcaseId,
    pub image_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_visible: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
}

/// Sample photoshoot tile for one theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoshootExample {
    pub id: ShowcaseId,
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme_id: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_visible: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
}

/// Platform-wide counters for the admin overview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_images: u64,
    pub total_credits_used: u64,
    #[serde(rename = "active_users")]
    pub active_users_this_week: u64,
}

// ============================================================================
// Billing
// ============================================================================

/// Plans that can be bought through checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaidPlan {
    Starter,
    Standard,
    Premium,
}

impl PaidPlan {
    pub const ALL: [PaidPlan; 3] = [PaidPlan::Starter, PaidPlan::Standard, PaidPlan::Premium];

    pub fn id(&self) -> &'static str {
        match self {
            PaidPlan::Starter => "starter",
            PaidPlan::Standard => "standard",
            PaidPlan::Premium => "premium",
        }
    }

    /// Price in USD as the checkout backend quotes it
    pub fn price(&self) -> &'static str {
        match self {
            PaidPlan::Starter => "5.00",
            PaidPlan::Standard => "10.00",
            PaidPlan::Premium => "15.00",
        }
    }

    pub fn credits(&self) -> u32 {
        match self {
            PaidPlan::Starter => 50,
            PaidPlan::Standard => 100,
            PaidPlan::Premium => 200,
        }
    }
}

impl FromStr for PaidPlan {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        PaidPlan::ALL
            .into_iter()
            .find(|plan| plan.id() == needle)
            .ok_or_else(|| ParseValueError::new("plan", s))
    }
}
