//! Integration tests for the resume backend.
//!
//! Each test spawns the full router on an ephemeral port and drives it over
//! HTTP. Chat tests point the upstream client at a fake completion server.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, OpenRouterConfig};
use crate::db::init_database;
use crate::{create_router, AppState};

const ROOT_KEY: &str = "test-root-key";

/// Configuration used by tests; the database path is replaced per fixture.
pub(crate) fn test_config(root_key: Option<&str>) -> Config {
    Config {
        root_key: root_key.map(str::to_string),
        db_path: PathBuf::from("unused.sqlite"),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
        openrouter: OpenRouterConfig {
            api_key: None,
            model: "openai/gpt-4o-mini".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        },
        persona: "You are the site owner.".to_string(),
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    token: Option<String>,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_config(test_config(Some(ROOT_KEY))).await
    }

    async fn with_config(mut config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        config.db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&config.db_path)
            .await
            .expect("Failed to init DB");
        let token = config.root_key.clone();
        let app = create_router(AppState::new(pool, config));

        let (base_url, _) = serve(app).await;

        TestFixture {
            client: Client::new(),
            base_url,
            token,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn create(&self, path: &str, body: Value) -> Value {
        let resp = self
            .authed(self.client.post(self.url(path)))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201, "create {} failed", path);
        resp.json().await.unwrap()
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .authed(self.client.get(self.url(path)))
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }
}

/// Bind an ephemeral port and serve `app` on it.
async fn serve(app: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to start
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    (format!("http://{}", addr), handle)
}

fn bootcamp_body(title: &str) -> Value {
    json!({
        "title": title,
        "subtitle": "Ship real services",
        "description": "Backend engineering",
        "long_description": "A long description of the bootcamp.",
        "tech_stack": ["rust", "axum", "sqlite"],
        "duration": "10 weeks",
        "level": "Intermediate",
        "price": "Free",
        "highlights": ["Code review", "Pairing"],
        "modules": [
            {"title": "Basics", "description": "Syntax", "duration": "1 week", "topics": ["types"]},
            {"title": "Async", "description": "Tokio", "duration": "2 weeks", "topics": ["futures", "tasks"]}
        ],
        "project_features": ["REST API"],
        "target_audience": ["Developers"],
        "status": "active",
        "enrolled_count": 3
    })
}

fn journal_body(title: &str, published_on: &str) -> Value {
    json!({
        "title": title,
        "body": "Today I learned about traits.",
        "summary": "Traits",
        "published_on": published_on,
        "tags": ["rust", "traits"]
    })
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_writes_require_bearer_token() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/stories"))
        .json(&json!({"media": "m", "mimetype": "image/png", "title": "t", "description": "d"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = fixture
        .client
        .delete(fixture.url("/api/stories/some-id"))
        .bearer_auth("wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Reads stay open
    let resp = fixture
        .client
        .get(fixture.url("/api/stories"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_writes_closed_without_root_key() {
    let fixture = TestFixture::with_config(test_config(None)).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/memes/categories"))
        .bearer_auth("")
        .json(&json!({"name": "closed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Public routes keep working
    let (status, _) = fixture.get_json("/api/memes/categories").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_bootcamp_crud() {
    let fixture = TestFixture::new().await;

    let created = fixture.create("/api/bootcamps", bootcamp_body("Rust Camp")).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["tech_stack"], json!(["rust", "axum", "sqlite"]));
    assert_eq!(created["modules"][1]["topics"], json!(["futures", "tasks"]));
    assert_eq!(created["images"], json!([]));

    let (status, fetched) = fixture.get_json(&format!("/api/bootcamps/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched, created);

    // Partial update: only status changes
    let resp = fixture
        .authed(fixture.client.put(fixture.url(&format!("/api/bootcamps/{}", id))))
        .json(&json!({"status": "completed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["title"], "Rust Camp");
    assert_eq!(updated["modules"], created["modules"]);
    assert_ne!(updated["updated_at"], created["updated_at"]);

    // Empty update returns the stored record unchanged
    let resp = fixture
        .authed(fixture.client.put(fixture.url(&format!("/api/bootcamps/{}", id))))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    let unchanged: Value = resp.json().await.unwrap();
    assert_eq!(unchanged, updated);

    let (_, list) = fixture.get_json("/api/bootcamps").await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let resp = fixture
        .authed(fixture.client.delete(fixture.url(&format!("/api/bootcamps/{}", id))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Bootcamp deleted successfully");

    let (status, body) = fixture.get_json(&format!("/api/bootcamps/{}", id)).await;
    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_validation_error_shape() {
    let fixture = TestFixture::new().await;

    let mut body = bootcamp_body("Bad Camp");
    body["tech_stack"] = json!([]);
    body["status"] = json!("archived");
    body["title"] = json!("");

    let resp = fixture
        .authed(fixture.client.post(fixture.url("/api/bootcamps")))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "tech_stack", "status"]);

    let (_, list) = fixture.get_json("/api/bootcamps").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .authed(fixture.client.post(fixture.url("/api/journal")))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_journal_ordering_and_tag_updates() {
    let fixture = TestFixture::new().await;

    fixture.create("/api/journal", journal_body("older", "2024-01-10")).await;
    let newer = fixture.create("/api/journal", journal_body("newer", "2024-02-10")).await;
    let id = newer["id"].as_str().unwrap();

    let (_, list) = fixture.get_json("/api/journal").await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["newer", "older"]);

    let resp = fixture
        .authed(fixture.client.put(fixture.url(&format!("/api/journal/{}", id))))
        .json(&json!({"tags": []}))
        .send()
        .await
        .unwrap();
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["tags"], json!([]));
    assert_eq!(updated["summary"], "Traits");
}

#[tokio::test]
async fn test_meme_category_cascade() {
    let fixture = TestFixture::new().await;

    let category = fixture
        .create("/api/memes/categories", json!({"name": "programming"}))
        .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    for src in ["a.png", "b.png", "c.png"] {
        fixture
            .create(
                "/api/memes",
                json!({"category_id": category_id, "type": "img", "src": src}),
            )
            .await;
    }

    let (status, with_memes) = fixture
        .get_json(&format!("/api/memes/categories/{}", category_id))
        .await;
    assert_eq!(status, 200);
    let srcs: Vec<&str> = with_memes["memes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["src"].as_str().unwrap())
        .collect();
    assert_eq!(srcs, vec!["c.png", "b.png", "a.png"]);
    assert_eq!(with_memes["memes"][0]["type"], "img");

    let resp = fixture
        .authed(
            fixture
                .client
                .delete(fixture.url(&format!("/api/memes/categories/{}", category_id))),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, _) = fixture
        .get_json(&format!("/api/memes/categories/{}", category_id))
        .await;
    assert_eq!(status, 404);

    let (_, categories) = fixture.get_json("/api/memes/categories").await;
    assert!(categories.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_deletes_are_lenient() {
    let fixture = TestFixture::new().await;

    for path in [
        "/api/bootcamps/missing",
        "/api/journal/missing",
        "/api/memes/missing",
        "/api/memes/categories/missing",
        "/api/stories/missing",
        "/api/contacts/missing",
    ] {
        let resp = fixture
            .authed(fixture.client.delete(fixture.url(path)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "DELETE {}", path);
    }
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .authed(fixture.client.put(fixture.url("/api/stories/missing")))
        .json(&json!({"title": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_contacts_public_submit_protected_read() {
    let fixture = TestFixture::new().await;

    for n in 1..=45 {
        let resp = fixture
            .client
            .post(fixture.url("/api/contacts"))
            .json(&json!({
                "name": format!("Visitor {}", n),
                "email": format!("v{}@example.com", n),
                "message": "Hi!"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let resp = fixture
        .client
        .get(fixture.url("/api/contacts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let (status, page) = fixture.get_json("/api/contacts?page=2&page_size=20").await;
    assert_eq!(status, 200);
    assert_eq!(page["total"], 45);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["page"], 2);
    let contacts = page["contacts"].as_array().unwrap();
    assert_eq!(contacts.len(), 20);
    assert_eq!(contacts[0]["name"], "Visitor 25");
    assert_eq!(contacts[19]["name"], "Visitor 6");

    // Garbage pagination falls back to the defaults
    let (_, page) = fixture.get_json("/api/contacts?page=zero&page_size=1000").await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["page_size"], 20);
}

#[tokio::test]
async fn test_contact_email_validation() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contacts"))
        .json(&json!({"name": "Ada", "email": "not-an-email", "message": "Hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "email");
}

#[tokio::test]
async fn test_resource_dispatcher() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/resource").await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("resource parameter is required"));

    let (status, _) = fixture.get_json("/api/resource?resource=users").await;
    assert_eq!(status, 400);

    let (status, body) = fixture.get_json("/api/resource/id?resource=journal").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "ID is required");

    let created = fixture
        .create("/api/resource?resource=journal", journal_body("via dispatcher", "2024-03-03"))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = fixture
        .get_json(&format!("/api/resource/id?resource=journal&id={}", id))
        .await;
    assert_eq!(status, 200);
    assert_eq!(fetched["title"], "via dispatcher");

    let (_, list) = fixture.get_json("/api/resource?resource=journal").await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let resp = fixture
        .authed(
            fixture
                .client
                .put(fixture.url(&format!("/api/resource/id?resource=journal&id={}", id))),
        )
        .json(&json!({"title": "renamed"}))
        .send()
        .await
        .unwrap();
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["title"], "renamed");

    let resp = fixture
        .authed(
            fixture
                .client
                .delete(fixture.url(&format!("/api/resource/id?resource=journal&id={}", id))),
        )
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Journal entry deleted successfully");

    let (status, _) = fixture.get_json("/api/resource?resource=memes").await;
    assert_eq!(status, 405);

    // Writes through the dispatcher are protected too
    let resp = fixture
        .client
        .post(fixture.url("/api/resource?resource=categories"))
        .json(&json!({"name": "sneaky"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

// ==================== CHAT ====================

/// A stand-in for the completion upstream that records every request.
#[derive(Clone)]
struct FakeUpstream {
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    status: StatusCode,
    reply: Value,
}

async fn fake_completion(
    State(upstream): State<FakeUpstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    upstream.requests.lock().unwrap().push((headers, body));
    (upstream.status, Json(upstream.reply.clone())).into_response()
}

impl FakeUpstream {
    async fn start(status: StatusCode, reply: Value) -> (Self, String) {
        let upstream = FakeUpstream {
            requests: Arc::new(Mutex::new(Vec::new())),
            status,
            reply,
        };
        let app = Router::new()
            .route("/chat/completions", post(fake_completion))
            .with_state(upstream.clone());
        let (base_url, _) = serve(app).await;
        (upstream, base_url)
    }

    fn requests(&self) -> Vec<(HeaderMap, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn chat_fixture(model: &str, status: StatusCode, reply: Value) -> (TestFixture, FakeUpstream) {
    let (upstream, base_url) = FakeUpstream::start(status, reply).await;
    let mut config = test_config(Some(ROOT_KEY));
    config.openrouter = OpenRouterConfig {
        api_key: Some("upstream-key".to_string()),
        model: model.to_string(),
        base_url,
    };
    (TestFixture::with_config(config).await, upstream)
}

fn answer(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

async fn send_chat(fixture: &TestFixture, session_id: &str, message: &str) -> reqwest::Response {
    fixture
        .client
        .post(fixture.url("/api/chat"))
        .header("referer", "https://example.com/about")
        .json(&json!({"session_id": session_id, "message": message}))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_chat_context_window() {
    let (fixture, upstream) =
        chat_fixture("openai/gpt-4o-mini", StatusCode::OK, answer("Sure!")).await;

    for n in 1..=6 {
        let resp = send_chat(&fixture, "visitor-42", &format!("question {}", n)).await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["answer"], "Sure!");
        assert_eq!(body["session_id"], "visitor-42");
        assert!(body["message_id"].is_string());
    }

    let requests = upstream.requests();
    assert_eq!(requests.len(), 6);

    let (headers, first) = &requests[0];
    assert_eq!(headers["authorization"], "Bearer upstream-key");
    assert_eq!(headers["http-referer"], "https://example.com/about");
    assert_eq!(headers["x-title"], "Resume Backend");
    assert_eq!(first["model"], "openai/gpt-4o-mini");
    assert!(first.get("extra_body").is_none());
    assert_eq!(
        first["messages"],
        json!([
            {"role": "system", "content": "You are the site owner."},
            {"role": "user", "content": "question 1"}
        ])
    );

    // Sixth turn: persona, the latest five stored messages, then the new question
    let (_, sixth) = &requests[5];
    let messages = sixth["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 7);
    let contents: Vec<&str> = messages[1..6]
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(
        contents,
        vec!["Sure!", "question 4", "Sure!", "question 5", "Sure!"]
    );
    assert_eq!(messages[6]["content"], "question 6");
    assert_eq!(messages[6]["role"], "user");
}

#[tokio::test]
async fn test_chat_think_model_enables_reasoning() {
    let (fixture, upstream) =
        chat_fixture("vendor/model-thinking", StatusCode::OK, answer("Hmm.")).await;

    let resp = send_chat(&fixture, "s1", "hello").await;
    assert_eq!(resp.status(), 200);

    let (_, body) = &upstream.requests()[0];
    assert_eq!(body["extra_body"], json!({"reasoning": {"enabled": true}}));
}

#[tokio::test]
async fn test_chat_passes_upstream_errors_through() {
    let upstream_error = json!({"error": {"message": "Rate limit exceeded", "code": 429}});
    let (fixture, _upstream) = chat_fixture(
        "openai/gpt-4o-mini",
        StatusCode::TOO_MANY_REQUESTS,
        upstream_error.clone(),
    )
    .await;

    let resp = send_chat(&fixture, "s2", "hello").await;
    assert_eq!(resp.status(), 429);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, upstream_error);
}

#[tokio::test]
async fn test_chat_passthrough_keeps_upstream_content_type() {
    let upstream = Router::new().route(
        "/chat/completions",
        post(|| async {
            (
                StatusCode::BAD_GATEWAY,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "upstream unavailable",
            )
        }),
    );
    let (base_url, _) = serve(upstream).await;

    let mut config = test_config(Some(ROOT_KEY));
    config.openrouter.api_key = Some("upstream-key".to_string());
    config.openrouter.base_url = base_url;
    let fixture = TestFixture::with_config(config).await;

    let resp = send_chat(&fixture, "s4", "hello").await;
    assert_eq!(resp.status(), 502);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(resp.text().await.unwrap(), "upstream unavailable");
}

#[tokio::test]
async fn test_chat_rejects_unexpected_upstream_shape() {
    let (fixture, _upstream) =
        chat_fixture("openai/gpt-4o-mini", StatusCode::OK, json!({"choices": []})).await;

    let resp = send_chat(&fixture, "s3", "hello").await;
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_chat_validation() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/chat"))
        .json(&json!({"message": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "session_id");
}
