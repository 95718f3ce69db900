//! Personal gallery: persisted images merged with the ones generated this run

use std::collections::HashSet;
use std::sync::Arc;

use shared::{GeneratedImage, UserImagesResponse};

use crate::error::ClientResult;
use crate::gateway::{Gateway, Request, Service};
use crate::session::Session;

pub const PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct GalleryClient {
    gateway: Arc<dyn Gateway>,
}

impl GalleryClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list_user_images(&self, session: &Session) -> ClientResult<Vec<GeneratedImage>> {
        let request = Request::get(Service::Images)
            .query("user_id", session.user.id)
            .query("limit", PAGE_SIZE)
            .query("offset", 0);
        let resp: UserImagesResponse = self.gateway.call(request).await?.decode()?;
        Ok(resp.images.into_iter().map(GeneratedImage::from).collect())
    }
}

/// Row shown in the gallery view
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub image: GeneratedImage,
    /// False for an in-session image whose metadata write failed
    pub saved: bool,
}

#[derive(Debug, Default)]
pub struct Gallery {
    persisted: Vec<GeneratedImage>,
    /// Oldest first
    generated: Vec<GeneratedImage>,
    favorites: HashSet<String>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the server listing; favourites it reports are picked up
    pub fn set_persisted(&mut self, images: Vec<GeneratedImage>) {
        for image in &images {
            if image.is_favorite {
                self.favorites.insert(image.image_url.clone());
            }
        }
        self.persisted = images;
    }

    pub fn add_generated(&mut self, image: GeneratedImage) {
        self.generated.push(image);
    }

    /// Newest first: this run's images, then the server listing without the
    /// entries already shown
    pub fn items(&self) -> Vec<GalleryItem> {
        let session_ids: HashSet<_> = self.generated.iter().filter_map(|i| i.id).collect();
        let session_urls: HashSet<_> = self.generated.iter().map(|i| i.image_url.as_str()).collect();

        let fresh = self.generated.iter().rev().map(|image| (image, image.is_durable()));
        let stored = self
            .persisted
            .iter()
            .filter(|image| {
                !image.id.map(|id| session_ids.contains(&id)).unwrap_or(false)
                    && !session_urls.contains(image.image_url.as_str())
            })
            .map(|image| (image, true));

        fresh
            .chain(stored)
            .map(|(image, saved)| {
                let mut image = image.clone();
                image.is_favorite = self.favorites.contains(&image.image_url);
                GalleryItem { image, saved }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty() && self.persisted.is_empty()
    }

    /// Local only; returns the new state
    pub fn toggle_favorite(&mut self, image_url: &str) -> bool {
        if self.favorites.remove(image_url) {
            false
        } else {
            self.favorites.insert(image_url.to_string());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;
    use serde_json::json;
    use shared::OwnerRef;

    fn owner() -> OwnerRef {
        OwnerRef {
            id: 1,
            username: None,
            email: None,
        }
    }

    fn stored(id: i64, url: &str) -> GeneratedImage {
        let mut image = GeneratedImage::in_session(owner(), "p", url, None, "dall-e-3");
        image.id = Some(id);
        image
    }

    #[test]
    fn test_session_images_first_and_unsaved_marked() {
        let mut gallery = Gallery::new();
        gallery.set_persisted(vec![stored(2, "https://img/2.png"), stored(1, "https://img/1.png")]);
        gallery.add_generated(stored(3, "https://img/3.png"));
        gallery.add_generated(GeneratedImage::in_session(owner(), "p", "https://img/4.png", None, "dall-e-3"));

        let items = gallery.items();
        let urls: Vec<_> = items.iter().map(|i| i.image.image_url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://img/4.png", "https://img/3.png", "https://img/2.png", "https://img/1.png"]
        );
        assert!(!items[0].saved);
        assert!(items[1].saved);
    }

    #[test]
    fn test_reloaded_listing_does_not_duplicate_session_image() {
        let mut gallery = Gallery::new();
        assert!(gallery.is_empty());
        gallery.add_generated(stored(3, "https://img/3.png"));
        assert!(!gallery.is_empty());
        gallery.set_persisted(vec![stored(3, "https://img/3.png"), stored(1, "https://img/1.png")]);
        assert_eq!(gallery.len(), 2);
    }

    #[test]
    fn test_favorite_toggle_is_local() {
        let mut gallery = Gallery::new();
        gallery.set_persisted(vec![stored(1, "https://img/1.png")]);
        assert!(gallery.toggle_favorite("https://img/1.png"));
        assert!(gallery.items()[0].image.is_favorite);
        assert!(!gallery.toggle_favorite("https://img/1.png"));
        assert!(!gallery.items()[0].image.is_favorite);
    }

    #[tokio::test]
    async fn test_list_user_images_query() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.ok(
            Service::Images,
            None,
            json!({"images": [{"id": 8, "user_id": 1, "prompt": "p", "image_url": "https://img/8.png", "is_favorite": true}]}),
        );
        let session = Session::new(
            "tok",
            serde_json::from_value(json!({"id": 1, "email": "ann@example.com"})).unwrap(),
        );

        let images = GalleryClient::new(gateway.clone())
            .list_user_images(&session)
            .await
            .unwrap();
        assert_eq!(images[0].id, Some(8));
        assert!(images[0].is_favorite);

        let call = &gateway.calls()[0];
        assert_eq!(
            call.query,
            vec![
                ("user_id", "1".to_string()),
                ("limit", "100".to_string()),
                ("offset", "0".to_string())
            ]
        );
    }
}
