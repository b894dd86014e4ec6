#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use menu_api::auth::JwtAuthenticator;
use menu_api::config::AppConfig;
use menu_api::database::MemoryStore;
use menu_api::media::LocalImageStore;
use menu_api::{app, AppState, ServiceOptions};

pub const TEST_SECRET: &str = "test-secret";
const BOUNDARY: &str = "menu-api-test-boundary";

/// A real server process, for the checks that need a socket
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    media_root: PathBuf,
    child: Child,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let media_root = scratch_dir("server");

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_menu-api"));
        // An empty DATABASE_URL selects the in-memory store even when .env names one
        cmd.env("MENU_API_PORT", port.to_string())
            .env("DATABASE_URL", "")
            .env("APP_ENV", "development")
            .env("JWT_SECRET", TEST_SECRET)
            .env("MEDIA_ROOT", &media_root)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            media_root,
            child,
        })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("menu-api-{}-{}", label, uuid::Uuid::new_v4()))
}

/// In-process application backed by the memory store
pub struct TestApp {
    router: Router,
    token: String,
    pub media_root: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(ServiceOptions::default(), 1024 * 1024)
    }

    pub fn with_options(options: ServiceOptions) -> Self {
        Self::build(options, 1024 * 1024)
    }

    pub fn with_image_limit(max_image_bytes: usize) -> Self {
        Self::build(ServiceOptions::default(), max_image_bytes)
    }

    fn build(options: ServiceOptions, max_image_bytes: usize) -> Self {
        let media_root = scratch_dir("app");
        let auth = JwtAuthenticator::new(TEST_SECRET, 1).expect("authenticator");
        let token = auth.issue_token("tester").expect("token");

        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(LocalImageStore::new(media_root.clone(), max_image_bytes)),
            Arc::new(auth),
        )
        .with_options(options);

        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;

        Self {
            router: app(state, &config),
            token,
            media_root,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body")
            .to_vec();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            json,
        }
    }

    fn request(&self, method: Method, uri: &str, authed: bool) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        if authed {
            builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token))
        } else {
            builder
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(self.request(Method::GET, uri, false).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_authed(&self, uri: &str) -> TestResponse {
        self.send(self.request(Method::GET, uri, true).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value, authed: bool) -> TestResponse {
        let request = self
            .request(method, uri, authed)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.json(Method::POST, uri, body, true).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.json(Method::PUT, uri, body, true).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.json(Method::PATCH, uri, body, true).await
    }

    pub async fn delete(&self, uri: &str, authed: bool) -> TestResponse {
        self.send(self.request(Method::DELETE, uri, authed).body(Body::empty()).unwrap())
            .await
    }

    pub async fn upload(
        &self,
        uri: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
        authed: bool,
    ) -> TestResponse {
        self.upload_field(uri, "image", file_name, content_type, bytes, authed)
            .await
    }

    pub async fn upload_field(
        &self,
        uri: &str,
        field: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
        authed: bool,
    ) -> TestResponse {
        let request = self
            .request(Method::POST, uri, authed)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(field, file_name, content_type, bytes)))
            .unwrap();
        self.send(request).await
    }

    /// Create a menu and return its `data` object
    pub async fn create_menu(&self, name: &str) -> Value {
        let resp = self
            .post("/menus", json!({ "name": name, "description": format!("{}Desc", name) }))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create menu: {}", resp.json);
        resp.data().clone()
    }

    /// Create a dish under `menu_id` and return its `data` object
    pub async fn create_dish(&self, menu_id: i64, name: &str) -> Value {
        let mut payload = dish_payload();
        payload["name"] = json!(name);
        let resp = self.post(&format!("/menus/{}/dishes", menu_id), payload).await;
        assert_eq!(resp.status, StatusCode::CREATED, "create dish: {}", resp.json);
        resp.data().clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub json: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.json["data"]
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.json["field_errors"][field].as_str()
    }
}

pub fn dish_payload() -> Value {
    json!({
        "name": "TestDishName1",
        "description": "TestDishDescription1",
        "price": "20.55",
        "preparation_time": "00:00:30",
        "is_vegetarian": true
    })
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("id")
}

/// Smallest valid PNG header, enough for type sniffing by extension
pub fn png_bytes() -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0]
}

fn multipart_body(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\nContent-Type: {c}\r\n\r\n",
            b = BOUNDARY,
            f = field,
            n = file_name,
            c = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
