//! HTTP transport for the posts REST API.
//!
//! Every request carries `Authorization: Bearer <token>` when the session
//! store has one. A 401 on anything but the login call clears the session
//! before the error is returned, so the next screen can ask for a new login.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::auth::SessionStore;
use super::error::FetchError;
use super::types::{
    CreatePost, DeletePostResponse, ListPage, LoginRequest, LoginResponse, Post, UpdatePost,
};
use crate::core::query::QueryParameters;

pub const DEFAULT_BASE_URL: &str = "https://fe-hiring-rest-api.vercel.app";

/// Remote operations the client needs. Implemented over HTTP by
/// [`HttpTransport`] and in memory by the test support module.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// `GET /posts`
    async fn list_posts(&self, params: &QueryParameters) -> Result<ListPage, FetchError>;

    /// `GET /posts/:id`
    async fn get_post(&self, id: &str) -> Result<Post, FetchError>;

    /// `POST /posts`
    async fn create_post(&self, post: &CreatePost) -> Result<Post, FetchError>;

    /// `PATCH /posts/:id`
    async fn update_post(&self, id: &str, post: &UpdatePost) -> Result<Post, FetchError>;

    /// `DELETE /posts/:id`
    async fn delete_post(&self, id: &str) -> Result<DeletePostResponse, FetchError>;

    /// `POST /auth/login`
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, FetchError>;
}

/// Error bodies usually look like `{"message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
    session: Arc<dyn SessionStore>,
}

impl HttpTransport {
    /// Creates a transport for `base_url` (no trailing path).
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("HTTP client setup failed: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            client,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and decodes a JSON body.
    ///
    /// `session_bound` marks requests whose 401 means the stored session is
    /// dead (everything except login).
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session_bound: bool,
    ) -> Result<T, FetchError> {
        let request = if session_bound {
            self.authorized(request)
        } else {
            request
        };

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        debug!("posts API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            warn!("posts API error: {} - {}", status.as_u16(), message);
            if status == StatusCode::UNAUTHORIZED && session_bound {
                warn!("Session rejected by server, clearing stored token");
                self.session.clear();
            }
            return Err(FetchError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Unexpected response shape: {}", e);
            FetchError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl PostsApi for HttpTransport {
    async fn list_posts(&self, params: &QueryParameters) -> Result<ListPage, FetchError> {
        params.validate()?;
        let query = params.to_query_pairs();
        info!("GET /posts {:?}", query);
        let request = self.client.get(self.url("/posts")).query(&query);
        let page: ListPage = self.send(request, true).await?;
        debug!(
            "Received {} posts (next={:?}, prev={:?})",
            page.items.len(),
            page.next_cursor,
            page.prev_cursor
        );
        Ok(page)
    }

    async fn get_post(&self, id: &str) -> Result<Post, FetchError> {
        info!("GET /posts/{}", id);
        let request = self.client.get(self.url(&format!("/posts/{id}")));
        self.send(request, true).await
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post, FetchError> {
        info!("POST /posts (category={})", post.category);
        let request = self.client.post(self.url("/posts")).json(post);
        self.send(request, true).await
    }

    async fn update_post(&self, id: &str, post: &UpdatePost) -> Result<Post, FetchError> {
        info!("PATCH /posts/{}", id);
        let request = self.client.patch(self.url(&format!("/posts/{id}"))).json(post);
        self.send(request, true).await
    }

    async fn delete_post(&self, id: &str) -> Result<DeletePostResponse, FetchError> {
        info!("DELETE /posts/{}", id);
        let request = self.client.delete(self.url(&format!("/posts/{id}")));
        self.send(request, true).await
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, FetchError> {
        info!("POST /auth/login ({})", credentials.email);
        let request = self.client.post(self.url("/auth/login")).json(credentials);
        self.send(request, false).await
    }
}
