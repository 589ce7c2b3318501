use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};
use sitekeep_api::{ApiConfig, build_router};
use sitekeep_store::SiteRepository;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

const KEY: &str = "letmein";
const VALID: &str = r#"{"brand":{"name":"Acme"},"contact":{"phone":"1","email":"a@b.com","address":"X"}}"#;

struct Fixture {
    dir: TempDir,
    app: Router,
}

impl Fixture {
    fn with(api_key: &str, origins: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let config = ApiConfig {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            api_key: api_key.to_string(),
            json_path: None,
            content_root: dir.path().join("api"),
            bind: "127.0.0.1:0".parse().unwrap(),
        };
        let repository = SiteRepository::new(document_path(dir.path()));
        let app = build_router(&config, repository);
        Self { dir, app }
    }

    fn new() -> Self {
        Self::with(KEY, &[])
    }

    fn stored(&self) -> Option<Vec<u8>> {
        std::fs::read(document_path(self.dir.path())).ok()
    }

    fn seed(&self, body: &str) {
        let path = document_path(self.dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    async fn get(&self) -> Response {
        self.app
            .clone()
            .oneshot(Request::builder().uri("/api/site").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post(&self, key: Option<&str>, body: impl Into<Body>) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri("/api/site")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            request = request.header("x-api-key", key);
        }
        self.app
            .clone()
            .oneshot(request.body(body.into()).unwrap())
            .await
            .unwrap()
    }
}

fn document_path(root: &Path) -> PathBuf {
    root.join("data").join("site.json")
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body")
        .to_vec()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Failed to parse JSON")
}

async fn assert_rejected(fixture: &Fixture, body: &str, expected: &str) {
    let response = fixture.post(Some(KEY), body.to_string()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    assert_eq!(json_body(response).await, json!({ "message": expected }));
}

#[tokio::test]
async fn get_before_any_write_is_not_found() {
    let fixture = Fixture::new();
    let response = fixture.get().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({ "message": "Site data not found." })
    );
}

#[tokio::test]
async fn valid_post_is_stored_and_served_verbatim() {
    let fixture = Fixture::new();
    let response = fixture.post(Some(KEY), VALID).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "ok": true }));

    let response = fixture.get().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(body_bytes(response).await, VALID.as_bytes());
}

#[tokio::test]
async fn formatting_and_unknown_fields_survive_round_trip() {
    let fixture = Fixture::new();
    let body = "{\n  \"brand\": {\"name\": \"Acme\", \"motto\": \"ünïcode\"},\n  \"contact\": {\"phone\": \"1\", \"email\": \"a@b.com\", \"address\": \"X\"},\n  \"pricing\": [1.0, 2e3]\n}\n";
    assert_eq!(fixture.post(Some(KEY), body).await.status(), StatusCode::OK);
    assert_eq!(body_bytes(fixture.get().await).await, body.as_bytes());
}

#[tokio::test]
async fn missing_contact_is_reported() {
    let fixture = Fixture::new();
    assert_rejected(
        &fixture,
        r#"{"brand":{"name":"Acme"}}"#,
        "Missing required field: contact.",
    )
    .await;
}

#[tokio::test]
async fn each_validation_failure_has_its_message() {
    let fixture = Fixture::new();
    let cases = [
        ("", "Empty request body."),
        ("   \n", "Empty request body."),
        ("{not json", "Invalid JSON payload."),
        ("[]", "Invalid JSON format."),
        ("42", "Invalid JSON format."),
        ("{}", "Missing required field: brand.name."),
        (r#"{"brand":{"name":""}}"#, "Missing required field: brand.name."),
        (
            r#"{"brand":{"name":"Acme"},"contact":{"email":"a@b.com","address":"X"}}"#,
            "Missing required field: contact.phone.",
        ),
        (
            r#"{"brand":{"name":"Acme"},"contact":{"phone":"1","address":"X"}}"#,
            "Missing required field: contact.email.",
        ),
        (
            r#"{"brand":{"name":"Acme"},"contact":{"phone":"1","email":"a@b.com","address":" "}}"#,
            "Missing required field: contact.address.",
        ),
    ];
    for (body, expected) in cases {
        assert_rejected(&fixture, body, expected).await;
    }
    assert!(fixture.stored().is_none());
}

#[tokio::test]
async fn rejected_body_leaves_previous_document() {
    let fixture = Fixture::new();
    fixture.seed(VALID);
    assert_rejected(
        &fixture,
        r#"{"brand":{"name":"Acme"},"contact":{"phone":"1","email":"a@b.com"}}"#,
        "Missing required field: contact.address.",
    )
    .await;
    assert_eq!(fixture.stored().as_deref(), Some(VALID.as_bytes()));
}

#[tokio::test]
async fn wrong_or_missing_key_is_unauthorized_and_writes_nothing() {
    let fixture = Fixture::new();
    fixture.seed(VALID);
    let replacement = VALID.replace("Acme", "Mallory");

    for key in [None, Some(""), Some("LETMEIN"), Some("letmein ")] {
        let response = fixture.post(key, replacement.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "key: {key:?}");
    }
    // Credential is checked before the body.
    let response = fixture.post(Some("nope"), "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(fixture.stored().as_deref(), Some(VALID.as_bytes()));
}

#[tokio::test]
async fn blank_configured_key_refuses_all_writes() {
    let fixture = Fixture::with("", &[]);
    for key in [None, Some(""), Some("anything")] {
        let response = fixture.post(key, VALID).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    assert!(fixture.stored().is_none());
}

#[tokio::test]
async fn replace_creates_the_data_directory() {
    let fixture = Fixture::new();
    assert!(!fixture.dir.path().join("data").exists());
    assert_eq!(fixture.post(Some(KEY), VALID).await.status(), StatusCode::OK);
    assert!(fixture.dir.path().join("data").is_dir());

    let leftovers: Vec<_> = std::fs::read_dir(fixture.dir.path().join("data"))
        .unwrap()
        .flatten()
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn later_write_replaces_earlier() {
    let fixture = Fixture::new();
    let second = VALID.replace("Acme", "Globex");
    assert_eq!(fixture.post(Some(KEY), VALID).await.status(), StatusCode::OK);
    assert_eq!(fixture.post(Some(KEY), second.clone()).await.status(), StatusCode::OK);
    assert_eq!(body_bytes(fixture.get().await).await, second.as_bytes());
}

#[tokio::test]
async fn cors_headers_only_for_configured_origins() {
    let fixture = Fixture::with(KEY, &["https://site.example"]);
    fixture.seed(VALID);

    let allowed = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/site")
                .header(header::ORIGIN, "https://site.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://site.example"
    );

    let other = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/site")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(!other.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn preflight_allows_the_key_header() {
    let fixture = Fixture::with(KEY, &["https://site.example"]);
    let response = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/site")
                .header(header::ORIGIN, "https://site.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-api-key,content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://site.example"
    );
}

#[tokio::test]
async fn no_cors_headers_without_configuration() {
    let fixture = Fixture::new();
    fixture.seed(VALID);
    let response = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/site")
                .header(header::ORIGIN, "https://site.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
