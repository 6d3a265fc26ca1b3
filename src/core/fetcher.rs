//! # List Data Fetcher
//!
//! Maps a `QueryParameters` snapshot to one page of posts. Deduplication and
//! freshness come from the `QueryCache` in front of the transport; the fetcher
//! itself never retries.
//!
//! It also serves post detail and the create/update/delete mutations, since
//! those must invalidate the list pages it caches.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::api::{
    CreatePost, FetchError, ListPage, LoginRequest, Post, PostsApi, SessionStore, UpdatePost, User,
};
use crate::core::cache::{DEFAULT_GC_TIME, KeyPrefix, QueryCache, QueryKey, QueryStatus};
use crate::core::query::QueryParameters;
use crate::core::validation::{validate_create, validate_update};

pub const DEFAULT_LIST_STALE_TIME: Duration = Duration::from_secs(30);
pub const DEFAULT_DETAIL_STALE_TIME: Duration = Duration::from_secs(60);

/// Freshness windows for the two cached resources, and how long an unused
/// entry is kept before it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub list_stale_time: Duration,
    pub detail_stale_time: Duration,
    pub gc_time: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            list_stale_time: DEFAULT_LIST_STALE_TIME,
            detail_stale_time: DEFAULT_DETAIL_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

pub struct ListDataFetcher {
    api: Arc<dyn PostsApi>,
    lists: QueryCache<ListPage>,
    details: QueryCache<Post>,
}

impl ListDataFetcher {
    pub fn new(api: Arc<dyn PostsApi>, settings: CacheSettings) -> Self {
        Self {
            api,
            lists: QueryCache::with_gc_time(settings.list_stale_time, settings.gc_time),
            details: QueryCache::with_gc_time(settings.detail_stale_time, settings.gc_time),
        }
    }

    /// Fetches the page identified by `params`. Invalid parameters are
    /// rejected before any request is built.
    pub async fn fetch(&self, params: QueryParameters) -> Result<ListPage, FetchError> {
        params.validate()?;
        let api = self.api.clone();
        let request = params.clone();
        self.lists
            .get_or_fetch(QueryKey::PostList(params), move || async move {
                api.list_posts(&request).await
            })
            .await
    }

    pub fn list_status(&self, params: &QueryParameters) -> QueryStatus {
        self.lists.status(&QueryKey::PostList(params.clone()))
    }

    /// Last page fetched for `params`, fresh or not.
    pub fn cached_page(&self, params: &QueryParameters) -> Option<ListPage> {
        self.lists.peek(&QueryKey::PostList(params.clone()))
    }

    pub async fn fetch_post(&self, id: &str) -> Result<Post, FetchError> {
        let api = self.api.clone();
        let post_id = id.to_string();
        self.details
            .get_or_fetch(QueryKey::PostDetail(id.to_string()), move || async move {
                api.get_post(&post_id).await
            })
            .await
    }

    pub async fn create_post(&self, post: CreatePost) -> Result<Post, FetchError> {
        validate_create(&post)?;
        let created = self.api.create_post(&post).await?;
        info!("Created post {}", created.id);
        self.invalidate(&KeyPrefix::PostLists);
        Ok(created)
    }

    pub async fn update_post(&self, id: &str, post: UpdatePost) -> Result<Post, FetchError> {
        validate_update(&post)?;
        let updated = self.api.update_post(id, &post).await?;
        info!("Updated post {}", id);
        self.invalidate(&KeyPrefix::PostDetail(id.to_string()));
        self.invalidate(&KeyPrefix::PostLists);
        Ok(updated)
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), FetchError> {
        let response = self.api.delete_post(id).await?;
        if !response.ok {
            warn!("Delete of {} reported ok=false ({} deleted)", id, response.deleted);
        } else {
            info!("Deleted post {}", id);
        }
        self.invalidate(&KeyPrefix::PostDetail(id.to_string()));
        self.invalidate(&KeyPrefix::PostLists);
        Ok(())
    }

    /// Drops cached entries matching `prefix` from both caches.
    pub fn invalidate(&self, prefix: &KeyPrefix) {
        self.lists.invalidate(prefix);
        self.details.invalidate(prefix);
    }
}

/// Logs in and stores the returned token in `session`. A login whose token
/// cannot be stored is reported as a failure.
pub async fn login(
    api: &dyn PostsApi,
    session: &dyn SessionStore,
    email: &str,
    password: &str,
) -> Result<User, FetchError> {
    let response = api
        .login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
    session
        .save(&response.token, &response.user)
        .map_err(|e| {
            warn!("Failed to persist session: {}", e);
            FetchError::Session(e.to_string())
        })?;
    info!("Logged in as {}", response.user.email);
    Ok(response.user)
}
