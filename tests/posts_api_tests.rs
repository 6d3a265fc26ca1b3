use std::sync::Arc;
use std::time::Duration;

use postboard::api::{
    Category, CreatePost, FetchError, HttpTransport, PostsApi, SessionStore, StaticSession,
};
use postboard::core::controller::QueryStateController;
use postboard::core::fetcher::{CacheSettings, ListDataFetcher, login};
use postboard::core::query::{QueryParameters, SortField};
use postboard::core::session::FileSessionStore;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param, query_param_is_missing},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn post_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "userId": "u1",
        "title": format!("Post {id}"),
        "body": "Body",
        "category": "FREE",
        "tags": ["rust"],
        "createdAt": "2025-01-15T09:30:00Z"
    })
}

fn page_json(ids: &[&str], next: Option<&str>, prev: Option<&str>) -> serde_json::Value {
    json!({
        "items": ids.iter().map(|id| post_json(id)).collect::<Vec<_>>(),
        "nextCursor": next,
        "prevCursor": prev,
    })
}

fn transport(server: &MockServer, session: Arc<StaticSession>) -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(server.uri(), session, Duration::from_secs(5)).unwrap())
}

fn fetcher(server: &MockServer, session: Arc<StaticSession>) -> ListDataFetcher {
    ListDataFetcher::new(transport(server, session), CacheSettings::default())
}

// ============================================================================
// Query Serialization
// ============================================================================

#[tokio::test]
async fn test_default_params_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("limit", "10"))
        .and(query_param("sort", "createdAt"))
        .and(query_param("order", "desc"))
        .and(query_param_is_missing("nextCursor"))
        .and(query_param_is_missing("prevCursor"))
        .and(query_param_is_missing("category"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["a", "b"], Some("n1"), None)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, Arc::new(StaticSession::default()));
    let page = fetcher.fetch(QueryParameters::default()).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, "a");
    assert_eq!(page.next_cursor.as_deref(), Some("n1"));
    assert_eq!(page.prev_cursor, None);
}

#[tokio::test]
async fn test_filters_and_search_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("sort", "title"))
        .and(query_param("order", "asc"))
        .and(query_param("category", "NOTICE"))
        .and(query_param("search", "공지 사항"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["a"], None, None)))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = QueryStateController::new();
    controller.set_sort(SortField::Title);
    controller.set_category(Some(Category::Notice));
    controller.set_search_term("  공지 사항 ");
    controller.commit_search();

    let fetcher = fetcher(&server, Arc::new(StaticSession::default()));
    let page = fetcher.fetch(controller.params()).await.unwrap();
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[], None, None)))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(StaticSession::new(Some("secret-token".to_string())));
    let fetcher = fetcher(&server, session);
    assert!(fetcher.fetch(QueryParameters::default()).await.is_ok());
}

// ============================================================================
// Paging Scenarios
// ============================================================================

#[tokio::test]
async fn test_next_page_then_filter_returns_to_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param_is_missing("nextCursor"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["a"], Some("c1"), None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("nextCursor", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["b"], Some("c2"), Some("p2"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("category", "QNA"))
        .and(query_param_is_missing("nextCursor"))
        .and(query_param_is_missing("prevCursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["q"], None, None)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, Arc::new(StaticSession::default()));
    let mut controller = QueryStateController::new();

    let first = fetcher.fetch(controller.params()).await.unwrap();
    assert!(controller.go_to_next_page(first.next_cursor.as_deref()));
    let second = fetcher.fetch(controller.params()).await.unwrap();
    assert_eq!(second.items[0].id, "b");

    assert!(controller.set_category(Some(Category::Qna)));
    let filtered = fetcher.fetch(controller.params()).await.unwrap();
    assert_eq!(filtered.items[0].id, "q");
}

#[tokio::test]
async fn test_prev_page_sends_only_prev_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("prevCursor", "p1"))
        .and(query_param_is_missing("nextCursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["a"], Some("n1"), None)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, Arc::new(StaticSession::default()));
    let mut controller = QueryStateController::new();
    controller.go_to_next_page(Some("n1"));
    controller.go_to_prev_page(Some("p1"));

    let page = fetcher.fetch(controller.params()).await.unwrap();
    assert_eq!(page.prev_cursor, None);
}

#[tokio::test]
async fn test_concurrent_identical_requests_share_one_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(&["a"], None, None))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, Arc::new(StaticSession::default()));
    let (a, b) = tokio::join!(
        fetcher.fetch(QueryParameters::default()),
        fetcher.fetch(QueryParameters::default())
    );
    assert_eq!(a.unwrap(), b.unwrap());

    // Within the freshness window the cached page is reused
    assert!(fetcher.fetch(QueryParameters::default()).await.is_ok());
}

// ============================================================================
// Error Handling
// ============================================================================

#[tokio::test]
async fn test_server_error_surfaces_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "database down"})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, Arc::new(StaticSession::default()));
    let result = fetcher.fetch(QueryParameters::default()).await;
    assert_eq!(
        result,
        Err(FetchError::Server {
            status: 500,
            message: "database down".to_string()
        })
    );
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"items\": 3}"))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, Arc::new(StaticSession::default()));
    let result = fetcher.fetch(QueryParameters::default()).await;
    assert!(matches!(result, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind and drop a server so the port is closed
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let session = Arc::new(StaticSession::default());
    let transport = HttpTransport::new(uri, session, Duration::from_secs(2)).unwrap();
    let result = transport.list_posts(&QueryParameters::default()).await;
    assert!(matches!(result, Err(FetchError::Network(_))));
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "invalid token"})))
        .mount(&server)
        .await;

    let session = Arc::new(StaticSession::new(Some("expired".to_string())));
    let fetcher = fetcher(&server, session.clone());
    let err = fetcher.fetch(QueryParameters::default()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(session.token(), None);
}

// ============================================================================
// Auth and Mutations
// ============================================================================

#[tokio::test]
async fn test_login_stores_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "admin@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh",
            "user": {"id": "u1", "email": "admin@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(StaticSession::default());
    let api = transport(&server, session.clone());
    let user = login(api.as_ref(), session.as_ref(), "admin@example.com", "pw")
        .await
        .unwrap();

    assert_eq!(user.email, "admin@example.com");
    assert_eq!(session.token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad credentials"})))
        .mount(&server)
        .await;

    let session = Arc::new(StaticSession::new(Some("still-valid".to_string())));
    let api = transport(&server, session.clone());
    let result = login(api.as_ref(), session.as_ref(), "admin@example.com", "wrong").await;

    assert!(matches!(result, Err(FetchError::Server { status: 401, .. })));
    assert_eq!(session.token().as_deref(), Some("still-valid"));
}

#[tokio::test]
async fn test_login_reports_unwritable_session_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh",
            "user": {"id": "u1", "email": "admin@example.com"}
        })))
        .mount(&server)
        .await;

    // The session directory is a regular file, so the token cannot be written
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let session_path = blocker.join("session.json");
    let store = FileSessionStore::open(session_path.clone());

    let api = transport(&server, Arc::new(StaticSession::default()));
    let result = login(api.as_ref(), &store, "admin@example.com", "pw").await;

    assert!(matches!(result, Err(FetchError::Session(_))));
    assert_eq!(FileSessionStore::open(session_path).token(), None);
}

#[tokio::test]
async fn test_create_refreshes_cached_lists() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&["a"], None, None)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(body_json(json!({
            "title": "Hello",
            "body": "First post",
            "category": "FREE",
            "tags": []
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(post_json("new")))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, Arc::new(StaticSession::new(Some("t".to_string()))));
    fetcher.fetch(QueryParameters::default()).await.unwrap();
    let created = fetcher
        .create_post(CreatePost {
            title: "Hello".to_string(),
            body: "First post".to_string(),
            category: Category::Free,
            tags: vec![],
        })
        .await
        .unwrap();
    assert_eq!(created.id, "new");

    // Cached page was invalidated, so this goes to the server again
    fetcher.fetch(QueryParameters::default()).await.unwrap();
}

#[tokio::test]
async fn test_delete_hits_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/posts/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "deleted": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, Arc::new(StaticSession::new(Some("t".to_string()))));
    assert!(fetcher.delete_post("p1").await.is_ok());
}
