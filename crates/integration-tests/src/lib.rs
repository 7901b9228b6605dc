//! Integration tests for the Sneako mock server.
//!
//! Each test starts the full application (router, middleware, file-backed
//! store) on an ephemeral local port over a temporary data directory, and
//! talks to it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sneako-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Login, registration, profile
//! - `cart` - Cart handlers and the cart 405 rule
//! - `resources` - Generic override, named overrides, default router
//! - `persistence` - Files on disk, restarts, write failures, concurrency

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use reqwest::Client;
use serde_json::Value;
use sneako_mockserver::config::MockServerConfig;
use sneako_mockserver::state::AppState;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// API prefix the test servers use.
pub const API_PREFIX: &str = "/api/v1";

/// A mock server running in the background of a test.
pub struct TestServer {
    pub client: Client,
    addr: SocketAddr,
    data_dir: PathBuf,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server over a new, empty data directory.
    ///
    /// The directory is deleted when the returned `TempDir` is dropped.
    pub async fn fresh() -> (TempDir, Self) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let server = Self::start(dir.path()).await;
        (dir, server)
    }

    /// Start a server over `data_dir`, with default settings otherwise.
    pub async fn start(data_dir: &Path) -> Self {
        Self::start_with(data_dir, &[]).await
    }

    /// Start a server over `data_dir` with extra environment settings.
    pub async fn start_with(data_dir: &Path, vars: &[(&str, &str)]) -> Self {
        let dir = data_dir.to_string_lossy().into_owned();
        let config = MockServerConfig::from_lookup(|key| {
            if key == "MOCKSERVER_DATA_DIR" {
                return Some(dir.clone());
            }
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
        .expect("Invalid test configuration");

        let state = AppState::new(config).expect("Failed to open data directory");
        let app = sneako_mockserver::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            client: Client::new(),
            addr,
            data_dir: data_dir.to_path_buf(),
            handle,
        }
    }

    /// Absolute URL of a path outside the API prefix.
    pub fn root_url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    /// Absolute URL of an API path, e.g. `url("cart/1")`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "http://{}{API_PREFIX}/{}",
            self.addr,
            path.trim_start_matches('/')
        )
    }

    /// `GET` an API path and decode the JSON body.
    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        decode(resp).await
    }

    /// Send a JSON body to an API path and decode the JSON response.
    pub async fn send_json(&self, method: reqwest::Method, path: &str, body: &Value) -> (u16, Value) {
        let resp = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        decode(resp).await
    }

    /// `POST` a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        self.send_json(reqwest::Method::POST, path, body).await
    }

    /// `PUT` a JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> (u16, Value) {
        self.send_json(reqwest::Method::PUT, path, body).await
    }

    /// `DELETE` an API path; returns the status and raw body.
    pub async fn delete(&self, path: &str) -> (u16, String) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = resp.status().as_u16();
        (status, resp.text().await.expect("Failed to read body"))
    }

    /// The data directory this server writes to.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Parsed contents of a collection's backing file.
    pub fn read_file(&self, resource: &str) -> Value {
        let raw = fs::read_to_string(self.data_dir.join(format!("{resource}.json")))
            .expect("Failed to read collection file");
        serde_json::from_str(&raw).expect("Collection file is not JSON")
    }

    /// Records stored in a collection's backing file.
    pub fn file_records(&self, resource: &str) -> Vec<Value> {
        self.read_file(resource)
            .get(resource)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Write a collection file before a server starts.
pub fn write_collection(dir: &Path, resource: &str, records: &Value) {
    let mut file = serde_json::Map::new();
    file.insert(resource.to_string(), records.clone());
    fs::write(
        dir.join(format!("{resource}.json")),
        serde_json::to_vec_pretty(&Value::Object(file)).expect("Failed to encode collection"),
    )
    .expect("Failed to write collection file");
}

/// Status and JSON body of a response. An empty body decodes as `null`.
pub async fn decode(resp: reqwest::Response) -> (u16, Value) {
    let status = resp.status().as_u16();
    let text = resp.text().await.expect("Failed to read body");
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).expect("Response body is not JSON")
    };
    (status, body)
}

/// The `id` field of a record as a string.
pub fn id_of(record: &Value) -> String {
    record
        .get("id")
        .and_then(Value::as_str)
        .expect("record has no string id")
        .to_string()
}
