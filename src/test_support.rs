//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::api::{
    Category, CreatePost, DeletePostResponse, FetchError, ListPage, LoginRequest, LoginResponse,
    Post, PostsApi, UpdatePost, User,
};
use crate::core::query::QueryParameters;

pub fn sample_post(id: &str) -> Post {
    Post {
        id: id.to_string(),
        user_id: "u1".to_string(),
        title: format!("Post {id}"),
        body: "Body".to_string(),
        category: Category::Free,
        tags: vec![],
        created_at: Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap(),
    }
}

pub fn sample_page(count: usize, next: Option<&str>, prev: Option<&str>) -> ListPage {
    ListPage {
        items: (0..count).map(|i| sample_post(&format!("p{i}"))).collect(),
        next_cursor: next.map(str::to_string),
        prev_cursor: prev.map(str::to_string),
    }
}

/// In-memory `PostsApi` that counts calls and returns scripted pages.
#[derive(Default)]
pub struct MockApi {
    pages: Mutex<HashMap<QueryParameters, ListPage>>,
    list_error: Mutex<Option<FetchError>>,
    last_list_params: Mutex<Option<QueryParameters>>,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page returned for exactly `params`. Unknown params get an empty page.
    pub fn set_page(&self, params: QueryParameters, page: ListPage) {
        self.pages.lock().unwrap().insert(params, page);
    }

    pub fn fail_lists_with(&self, error: FetchError) {
        *self.list_error.lock().unwrap() = Some(error);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub fn last_list_params(&self) -> Option<QueryParameters> {
        self.last_list_params.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostsApi for MockApi {
    async fn list_posts(&self, params: &QueryParameters) -> Result<ListPage, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_list_params.lock().unwrap() = Some(params.clone());
        if let Some(error) = self.list_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(params)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_post(&self, id: &str) -> Result<Post, FetchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(sample_post(id))
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post, FetchError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Post {
            title: post.title.clone(),
            body: post.body.clone(),
            category: post.category,
            tags: post.tags.clone(),
            ..sample_post("new")
        })
    }

    async fn update_post(&self, id: &str, post: &UpdatePost) -> Result<Post, FetchError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        let mut updated = sample_post(id);
        if let Some(title) = &post.title {
            updated.title = title.clone();
        }
        Ok(updated)
    }

    async fn delete_post(&self, _id: &str) -> Result<DeletePostResponse, FetchError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        Ok(DeletePostResponse { ok: true, deleted: 1 })
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, FetchError> {
        Ok(LoginResponse {
            token: format!("token-{}", credentials.email),
            user: User {
                id: "u1".to_string(),
                email: credentials.email.clone(),
            },
        })
    }
}
