//! Integration and unit tests for the library backend.
//!
//! - **auth_api_tests**: register, the three login paths, logout, `me`, profile
//! - **resource_api_tests**: catalog, circulation and content endpoints
//! - **upload_api_tests**: multipart handling and the upload allow-list
//! - **error_tests**: `AppError` mapping and field validation helpers
//! - **config_tests**: embedded defaults and validation
//! - **db_tests**: schema creation and store accessors
//! - **health_api_tests**: probes, metrics and version
//!
//! [`TestApp`] builds the full router over a scratch SQLite file and upload
//! directory, with cheap Argon2 parameters so hashing does not dominate.

pub mod config_tests;
pub mod db_tests;
pub mod upload_api_tests;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    config::{AppConfig, PasswordConfig},
    db, routes,
    state::AppState,
};

pub const BOUNDARY: &str = "library-test-boundary";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` of the first `Set-Cookie` header, ready to send back.
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// A file part for [`TestApp::multipart`]: field, file name, contents.
pub type FilePart<'a> = (&'a str, &'a str, &'a [u8]);

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new().filename(dir.path().join("library.db")).create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(4).connect_with(options).await.unwrap();
        db::init_db(&pool).await.unwrap();

        let mut config = AppConfig::default();
        config.uploads.dir = dir.path().join("uploads").display().to_string();
        config.passwords = PasswordConfig { memory_kib: 1024, iterations: 1, parallelism: 1 };
        tweak(&mut config);

        let state = AppState::new(pool, config).unwrap();
        let app = routes::router(state.clone());
        Self { app, state, dir }
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let res = self.app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
        TestResponse { status, headers, body }
    }

    pub async fn request(&self, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&b).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, cookie, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, cookie, None).await
    }

    pub async fn multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
    ) -> TestResponse {
        self.multipart_request(Method::POST, uri, cookie, fields, files).await
    }

    pub async fn multipart_request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
            );
        }
        for (name, filename, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn admin_cookie(&self) -> String {
        let admin = &self.state.config.admin;
        let res = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": admin.email, "password": admin.password, "secretKey": admin.secret_key }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "admin login failed: {:?}", res.body);
        res.cookie().unwrap()
    }

    /// Registers an account and returns its session cookie and id.
    pub async fn register(&self, email: &str, password: &str, extra: Value) -> (String, String) {
        let mut body = json!({ "email": email, "password": password });
        if let (Some(obj), Value::Object(more)) = (body.as_object_mut(), extra) {
            obj.extend(more);
        }
        let res = self.post("/api/auth/register", None, body).await;
        assert_eq!(res.status, StatusCode::OK, "register failed: {:?}", res.body);
        (res.cookie().unwrap(), res.body["user"]["id"].as_str().unwrap().to_string())
    }

    /// Files currently in the upload directory.
    pub fn stored_uploads(&self) -> Vec<String> {
        match std::fs::read_dir(self.state.uploads.dir()) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.file_name().to_string_lossy().to_string()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
