//! Shared fakes for integration tests.
//!
//! [`FakeExtractor`] stands in for exiftool and records every extraction.
//! [`FakeAlbumService`] is an in-memory PhotoPrism that records every call.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use picturedb::photoprism::{Album, AlbumService, Photo};
use picturedb_db::models::MembershipPair;
use picturedb_exif::{Error, ExtractedMetadata, MetadataExtractor, Result};

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ExtractorState {
    calls: Vec<PathBuf>,
    metadata: HashMap<PathBuf, ExtractedMetadata>,
    failing: HashSet<PathBuf>,
}

/// Extractor returning canned metadata. Clones share state.
#[derive(Clone, Default)]
pub struct FakeExtractor {
    state: Arc<Mutex<ExtractorState>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata returned for `path` from now on.
    pub fn set(&self, path: &Path, metadata: ExtractedMetadata) {
        let mut state = self.state.lock().unwrap();
        state.failing.remove(path);
        state.metadata.insert(path.to_path_buf(), metadata);
    }

    /// Make extraction of `path` fail from now on.
    pub fn fail(&self, path: &Path) {
        self.state.lock().unwrap().failing.insert(path.to_path_buf());
    }

    /// Number of extractions so far.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Paths extracted so far, in call order.
    pub fn extracted(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl MetadataExtractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn extract(&self, path: &Path) -> Result<ExtractedMetadata> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(path.to_path_buf());

        if state.failing.contains(path) {
            return Err(Error::extraction(path, "corrupt file"));
        }

        Ok(state.metadata.get(path).cloned().unwrap_or_default())
    }
}

/// Metadata with the given keywords and rating.
pub fn metadata(keywords: &[&str], rating: Option<i64>) -> ExtractedMetadata {
    ExtractedMetadata {
        rating,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        ..Default::default()
    }
}

/// Create an empty picture file, creating parent directories.
pub fn write_picture(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"picture").unwrap();
}

/// Set a file's modification time relative to now.
pub fn set_mtime(path: &Path, offset_secs: i64) {
    let now = SystemTime::now();
    let time = if offset_secs >= 0 {
        now + Duration::from_secs(offset_secs as u64)
    } else {
        now - Duration::from_secs(offset_secs.unsigned_abs())
    };

    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

// ---------------------------------------------------------------------------
// Album service
// ---------------------------------------------------------------------------

/// A remote call recorded by [`FakeAlbumService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListAlbums,
    CreateAlbum(String),
    AlbumPhotos(String),
    Find(String),
    Add(String, Vec<String>),
    Remove(String, Vec<String>),
}

#[derive(Default)]
struct ServiceState {
    albums: Vec<Album>,
    members: HashMap<String, Vec<String>>,
    library: Vec<Photo>,
    calls: Vec<Call>,
    next_uid: usize,
    fail_on: Option<&'static str>,
}

/// In-memory PhotoPrism.
#[derive(Default)]
pub struct FakeAlbumService {
    state: Mutex<ServiceState>,
}

impl FakeAlbumService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a photo to the library; `file` is `dir/name`.
    pub fn add_library_photo(&self, uid: &str, file: &str) {
        let (path, name) = match file.rsplit_once('/') {
            Some((path, name)) => (path.to_string(), name.to_string()),
            None => (String::new(), file.to_string()),
        };
        self.state.lock().unwrap().library.push(Photo {
            uid: uid.to_string(),
            path,
            name,
        });
    }

    /// Add an existing album with the given member uids.
    pub fn add_album(&self, uid: &str, title: &str, members: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.albums.push(Album {
            uid: uid.to_string(),
            title: title.to_string(),
        });
        state.members.insert(
            uid.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
    }

    /// Make the named operation fail.
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().fail_on = Some(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Member uids of the album titled `title`, sorted.
    pub fn members_of(&self, title: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let uid = match state.albums.iter().find(|a| a.title == title) {
            Some(album) => album.uid.clone(),
            None => return Vec::new(),
        };
        let mut members = state.members.get(&uid).cloned().unwrap_or_default();
        members.sort();
        members
    }

    /// Calls that change album membership.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateAlbum(_) | Call::Add(..) | Call::Remove(..)))
            .collect()
    }

    fn record(&self, call: Call, operation: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_on == Some(operation) {
            anyhow::bail!("{} failed (500 Internal Server Error)", operation);
        }
        Ok(())
    }

    fn photo(&self, uid: &str) -> Photo {
        let state = self.state.lock().unwrap();
        state
            .library
            .iter()
            .find(|p| p.uid == uid)
            .cloned()
            .unwrap_or(Photo {
                uid: uid.to_string(),
                path: String::new(),
                name: format!("{}.jpg", uid),
            })
    }
}

#[async_trait::async_trait]
impl AlbumService for FakeAlbumService {
    async fn list_albums(&self) -> anyhow::Result<Vec<Album>> {
        self.record(Call::ListAlbums, "list_albums")?;
        Ok(self.state.lock().unwrap().albums.clone())
    }

    async fn create_album(&self, title: &str) -> anyhow::Result<Album> {
        self.record(Call::CreateAlbum(title.to_string()), "create_album")?;
        let mut state = self.state.lock().unwrap();
        state.next_uid += 1;
        let album = Album {
            uid: format!("new{}", state.next_uid),
            title: title.to_string(),
        };
        state.albums.push(album.clone());
        state.members.insert(album.uid.clone(), Vec::new());
        Ok(album)
    }

    async fn album_photos(&self, album_uid: &str, limit: usize) -> anyhow::Result<Vec<Photo>> {
        self.record(Call::AlbumPhotos(album_uid.to_string()), "album_photos")?;
        let uids = self
            .state
            .lock()
            .unwrap()
            .members
            .get(album_uid)
            .cloned()
            .unwrap_or_default();
        Ok(uids.iter().take(limit).map(|uid| self.photo(uid)).collect())
    }

    async fn find_photos_by_filename(
        &self,
        query: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Photo>> {
        self.record(Call::Find(query.to_string()), "find_photos_by_filename")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .library
            .iter()
            .filter(|p| p.display_path().contains(query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn add_photos(&self, album_uid: &str, photo_uids: &[String]) -> anyhow::Result<()> {
        self.record(
            Call::Add(album_uid.to_string(), photo_uids.to_vec()),
            "add_photos",
        )?;
        let mut state = self.state.lock().unwrap();
        let members = state.members.entry(album_uid.to_string()).or_default();
        for uid in photo_uids {
            if !members.contains(uid) {
                members.push(uid.clone());
            }
        }
        Ok(())
    }

    async fn remove_photos(&self, album_uid: &str, photo_uids: &[String]) -> anyhow::Result<()> {
        self.record(
            Call::Remove(album_uid.to_string(), photo_uids.to_vec()),
            "remove_photos",
        )?;
        let mut state = self.state.lock().unwrap();
        if let Some(members) = state.members.get_mut(album_uid) {
            members.retain(|uid| !photo_uids.contains(uid));
        }
        Ok(())
    }
}

/// Membership pair without a PhotoPrism path override.
pub fn pair(album: &str, path: &str) -> MembershipPair {
    MembershipPair {
        album: album.to_string(),
        path: path.to_string(),
        photoprism_path: None,
    }
}
