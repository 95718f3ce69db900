//! Share links for a generated image

use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use shared::{Language, ParseValueError};

use crate::i18n;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Twitter,
    Facebook,
    Vk,
    Telegram,
    WhatsApp,
    Pinterest,
    LinkedIn,
    Reddit,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::Twitter,
        Platform::Facebook,
        Platform::Vk,
        Platform::Telegram,
        Platform::WhatsApp,
        Platform::Pinterest,
        Platform::LinkedIn,
        Platform::Reddit,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Vk => "vk",
            Platform::Telegram => "telegram",
            Platform::WhatsApp => "whatsapp",
            Platform::Pinterest => "pinterest",
            Platform::LinkedIn => "linkedin",
            Platform::Reddit => "reddit",
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            Platform::Twitter => "https://twitter.com/intent/tweet",
            Platform::Facebook => "https://www.facebook.com/sharer/sharer.php",
            Platform::Vk => "https://vk.com/share.php",
            Platform::Telegram => "https://t.me/share/url",
            Platform::WhatsApp => "https://wa.me/",
            Platform::Pinterest => "https://pinterest.com/pin/create/button/",
            Platform::LinkedIn => "https://www.linkedin.com/sharing/share-offsite/",
            Platform::Reddit => "https://reddit.com/submit",
        }
    }

    /// Query parameters in the order each platform documents them
    fn params(&self, page: &str, text: &str, image_url: &str) -> Vec<(&'static str, String)> {
        match self {
            Platform::Twitter => vec![("text", text.to_string()), ("url", page.to_string())],
            Platform::Facebook => vec![("u", page.to_string()), ("quote", text.to_string())],
            Platform::Vk => vec![
                ("url", page.to_string()),
                ("title", text.to_string()),
                ("image", image_url.to_string()),
            ],
            Platform::Telegram => vec![("url", page.to_string()), ("text", text.to_string())],
            Platform::WhatsApp => vec![("text", format!("{} {}", text, page))],
            Platform::Pinterest => vec![
                ("url", page.to_string()),
                ("media", image_url.to_string()),
                ("description", text.to_string()),
            ],
            Platform::LinkedIn => vec![("url", page.to_string())],
            Platform::Reddit => vec![("url", page.to_string()), ("title", text.to_string())],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.id() == needle)
            .ok_or_else(|| ParseValueError::new("platform", s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub platform: Platform,
    pub url: String,
}

/// One link per platform. `page_url` is the public site link from config.
pub fn share_links(page_url: &str, image_url: &str, prompt: &str, lang: Language) -> Vec<ShareLink> {
    let text = i18n::strings(lang).share_text(prompt);
    Platform::ALL
        .into_iter()
        .filter_map(|platform| {
            let mut url = match Url::parse(platform.endpoint()) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("bad share endpoint for {}: {}", platform, e);
                    return None;
                }
            };
            url.query_pairs_mut()
                .extend_pairs(platform.params(page_url, &text, image_url));
            Some(ShareLink {
                platform,
                url: url.to_string(),
            })
        })
        .collect()
}
