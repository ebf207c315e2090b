//! PhotoPrism album API.
//!
//! The reconciler talks to PhotoPrism through the [`AlbumService`] trait;
//! [`PhotoprismClient`] is the HTTP implementation.

pub mod client;

pub use client::PhotoprismClient;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// An album on the PhotoPrism server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Album {
    #[serde(rename = "UID")]
    pub uid: String,
    #[serde(rename = "Title")]
    pub title: String,
}

/// A photo indexed by PhotoPrism.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Photo {
    #[serde(rename = "UID")]
    pub uid: String,
    /// Directory of the original, relative to the PhotoPrism originals folder
    #[serde(rename = "Path", default)]
    pub path: String,
    /// File name of the original
    #[serde(rename = "Name", default)]
    pub name: String,
}

impl Photo {
    /// `path/name` as shown in PhotoPrism.
    pub fn display_path(&self) -> String {
        if self.path.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.path, self.name)
        }
    }
}

/// Album operations needed to reconcile memberships.
#[async_trait::async_trait]
pub trait AlbumService: Send + Sync {
    /// List all albums.
    async fn list_albums(&self) -> Result<Vec<Album>>;

    /// Create an album with the given title.
    async fn create_album(&self, title: &str) -> Result<Album>;

    /// List up to `limit` photos in an album.
    async fn album_photos(&self, album_uid: &str, limit: usize) -> Result<Vec<Photo>>;

    /// Search photos whose file name contains `query`.
    async fn find_photos_by_filename(&self, query: &str, limit: usize) -> Result<Vec<Photo>>;

    /// Add photos to an album in one request.
    async fn add_photos(&self, album_uid: &str, photo_uids: &[String]) -> Result<()>;

    /// Remove photos from an album in one request.
    async fn remove_photos(&self, album_uid: &str, photo_uids: &[String]) -> Result<()>;
}
