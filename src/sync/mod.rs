//! Album reconciliation.
//!
//! Converges PhotoPrism album memberships to the grouping computed from the
//! local index. Each album is resolved (or created), its desired members are
//! looked up by file name, missing members are added in one batch and extra
//! members are either removed in one batch or reported.

use crate::photoprism::{Album, AlbumService, Photo};
use anyhow::Result;
use picturedb_db::models::MembershipPair;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Default number of members fetched per album.
pub const DEFAULT_MEMBER_LIMIT: usize = 1000;

/// Desired members of one album, in query order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumGroup {
    pub title: String,
    pub members: Vec<MembershipPair>,
}

/// Group membership pairs by album title.
///
/// Albums keep the order in which they first appear; members keep query order.
pub fn group_by_album(pairs: Vec<MembershipPair>) -> Vec<AlbumGroup> {
    let mut groups: Vec<AlbumGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for pair in pairs {
        match index.get(&pair.album) {
            Some(&idx) => groups[idx].members.push(pair),
            None => {
                index.insert(pair.album.clone(), groups.len());
                groups.push(AlbumGroup {
                    title: pair.album.clone(),
                    members: vec![pair],
                });
            }
        }
    }

    groups
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Remove members that are not in the desired set instead of warning.
    pub delete_extras: bool,
    /// Upper bound on members fetched per album. Larger albums are truncated.
    pub member_limit: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            delete_extras: false,
            member_limit: DEFAULT_MEMBER_LIMIT,
        }
    }
}

/// What happened to one album.
#[derive(Debug, Clone, Default)]
pub struct AlbumOutcome {
    pub title: String,
    pub album_uid: String,
    pub created: bool,
    /// Photo uids added in this run.
    pub added: Vec<String>,
    /// Photo uids that were already members.
    pub already_present: Vec<String>,
    /// Query paths with no PhotoPrism match.
    pub missing: Vec<String>,
    /// Photo uids removed in this run.
    pub removed: Vec<String>,
    /// Members that should not be in the album but were left in place.
    pub extras: Vec<Photo>,
}

impl AlbumOutcome {
    /// True when the album was already in the desired state.
    pub fn is_unchanged(&self) -> bool {
        !self.created && self.added.is_empty() && self.removed.is_empty()
    }
}

/// Reconciles albums against an [`AlbumService`].
pub struct AlbumSync<'a> {
    service: &'a dyn AlbumService,
    options: SyncOptions,
}

impl<'a> AlbumSync<'a> {
    pub fn new(service: &'a dyn AlbumService, options: SyncOptions) -> Self {
        Self { service, options }
    }

    /// Reconcile every group in order. The first remote error aborts the run.
    pub async fn reconcile(&self, groups: &[AlbumGroup]) -> Result<Vec<AlbumOutcome>> {
        let albums = self.service.list_albums().await?;
        debug!("PhotoPrism has {} albums", albums.len());

        let mut outcomes = Vec::with_capacity(groups.len());
        for group in groups {
            outcomes.push(self.sync_album(&albums, group).await?);
        }

        Ok(outcomes)
    }

    async fn sync_album(&self, albums: &[Album], group: &AlbumGroup) -> Result<AlbumOutcome> {
        let title = group.title.as_str();
        let mut outcome = AlbumOutcome {
            title: title.to_string(),
            ..Default::default()
        };

        // Titles are matched exactly; the first album with the title wins.
        let current = match albums.iter().find(|a| a.title == title) {
            Some(album) => {
                debug!("Album {} exists already", title);
                outcome.album_uid = album.uid.clone();
                self.service
                    .album_photos(&album.uid, self.options.member_limit)
                    .await?
            }
            None => {
                info!("Creating album {}", title);
                let album = self.service.create_album(title).await?;
                outcome.album_uid = album.uid;
                outcome.created = true;
                Vec::new()
            }
        };

        let current_uids: HashSet<&str> = current.iter().map(|p| p.uid.as_str()).collect();
        let mut matched: HashSet<String> = HashSet::new();
        let mut pending: HashSet<String> = HashSet::new();

        let total = group.members.len();
        for (idx, member) in group.members.iter().enumerate() {
            let query = member.lookup_path();
            debug!(
                "Searching {} in PhotoPrism [{:.0}%]",
                query,
                (idx + 1) as f64 / total as f64 * 100.0
            );

            let hits = self.service.find_photos_by_filename(query, 1).await?;
            let photo = match hits.into_iter().next() {
                Some(photo) => photo,
                None => {
                    warn!(
                        "{} not found in PhotoPrism, did you forget to index?",
                        query
                    );
                    outcome.missing.push(query.to_string());
                    continue;
                }
            };

            if current_uids.contains(photo.uid.as_str()) {
                debug!("Skipping {} (already contained in {})", member.path, title);
                if matched.insert(photo.uid.clone()) {
                    outcome.already_present.push(photo.uid);
                }
            } else if pending.insert(photo.uid.clone()) {
                info!("Adding {} to {}", member.path, title);
                outcome.added.push(photo.uid);
            }
        }

        if !outcome.added.is_empty() {
            self.service
                .add_photos(&outcome.album_uid, &outcome.added)
                .await?;
        }

        let mut seen: HashSet<String> = HashSet::new();
        let extras: Vec<Photo> = current
            .into_iter()
            .filter(|p| !matched.contains(&p.uid) && seen.insert(p.uid.clone()))
            .collect();

        if self.options.delete_extras {
            for photo in &extras {
                info!("Deleting {} from {}", photo.display_path(), title);
            }
            outcome.removed = extras.into_iter().map(|p| p.uid).collect();
            if !outcome.removed.is_empty() {
                self.service
                    .remove_photos(&outcome.album_uid, &outcome.removed)
                    .await?;
            }
        } else {
            for photo in &extras {
                warn!(
                    "{} is in PhotoPrism album {} but should not be there (use --delete to delete extra pictures)",
                    photo.display_path(),
                    title
                );
            }
            outcome.extras = extras;
        }

        Ok(outcome)
    }
}
