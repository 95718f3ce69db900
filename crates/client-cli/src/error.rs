//! Client error taxonomy.
//!
//! Every failure a user action can hit ends up as one `ClientError`, and every
//! `ClientError` renders to exactly one titled notification. Client-side
//! validation and server-side refusals are separate variants so the UI never
//! presents one as the other.

use shared::Language;

use crate::i18n;

/// Failures detected locally before any request is sent
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Enter a prompt or choose a theme")]
    EmptyPrompt,

    #[error("You must accept the terms of use")]
    TermsNotAccepted,
}

/// Identity and authorisation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    Duplicate,

    #[error("Session is invalid, please sign in again")]
    SessionInvalid,

    #[error("Session has expired, please sign in again")]
    SessionExpired,

    #[error("Reset token is invalid")]
    InvalidResetToken,

    #[error("Reset token has expired or was already used")]
    ExpiredResetToken,

    #[error("Sign in to continue")]
    NotSignedIn,

    #[error("Admin access required")]
    NotAdmin,
}

/// Generation quota exhausted. Routes to the upgrade flow, not an error screen.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuotaError {
    #[error("All free generations used{}", .limit.map(|l| format!(" ({} of {})", l, l)).unwrap_or_default())]
    FreeLimitReached { limit: Option<u32> },

    #[error("No credits left")]
    NoCreditsLeft,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error("Could not reach the server: {0}")]
    Transport(String),

    /// Non-2xx or `success: false`; a 4xx means the server refused the input
    #[error("Server error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Server { status: Option<u16>, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Local storage error: {0}")]
    Storage(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::Server {
            status,
            message: message.into(),
        }
    }

    /// The server refused the request itself rather than failing on it
    pub fn is_refusal(&self) -> bool {
        matches!(self, ClientError::Server { status: Some(400..=499), .. })
    }

    /// Quota results send the user to pricing instead of showing a failure
    pub fn routes_to_pricing(&self) -> bool {
        matches!(self, ClientError::Quota(_))
    }

    /// Whether the current session must be dropped
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            ClientError::Auth(AuthError::SessionInvalid) | ClientError::Auth(AuthError::SessionExpired)
        )
    }

    pub fn notification(&self, lang: Language) -> Notification {
        let strings = i18n::strings(lang);
        let (level, title) = match self {
            ClientError::Validation(_) => (Level::Error, strings.errors.validation),
            ClientError::Auth(_) => (Level::Error, strings.errors.auth),
            ClientError::Quota(_) => (Level::Info, strings.errors.quota),
            ClientError::Transport(_) => (Level::Error, strings.errors.transport),
            ClientError::Server { .. } if self.is_refusal() => (Level::Error, strings.errors.rejected),
            ClientError::Server { .. } => (Level::Error, strings.errors.server),
            ClientError::Config(_) | ClientError::Storage(_) => (Level::Error, strings.errors.local),
        };
        let description = match self {
            ClientError::Server { message, .. } if self.is_refusal() => message.clone(),
            _ => self.to_string(),
        };
        Notification::new(level, title, description)
    }
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// One user-visible message with a short title and a description
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(level: Level, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Level::Success, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Level::Info, title, description)
    }
}
