//! File uploads.
//!
//! Routes that accept files take a [`FormData`], which reads either a
//! `multipart/form-data` body (text fields plus file parts) or a JSON object.
//! File parts are checked against the allowed extension globs and the size cap
//! while the body is read, but only written to disk when the handler calls
//! [`UploadStore::save`], after its own validation has passed. Files saved for
//! a record that is then not written are removed with [`UploadStore::settle`].

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use rand::Rng;

use crate::{
    config::UploadConfig,
    error::{validation, AppError, AppResult},
    metrics::Metrics,
    state::AppState,
};

/// A file part held in memory until the handler decides to keep it.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub field: String,
    pub original_name: String,
    pub data: Bytes,
}

/// Writes accepted uploads under the upload directory.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_path: String,
    max_file_bytes: u64,
    allowed: GlobSet,
    metrics: Metrics,
}

impl UploadStore {
    pub fn new(cfg: &UploadConfig, metrics: Metrics) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &cfg.allowed {
            builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
        }
        Ok(Self {
            dir: PathBuf::from(&cfg.dir),
            public_path: cfg.public_path.trim_end_matches('/').to_string(),
            max_file_bytes: cfg.max_file_bytes,
            allowed: builder.build()?,
            metrics,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    /// Rejects files whose name or size is not acceptable.
    pub fn check(&self, file: &PendingFile) -> AppResult<()> {
        let name = Path::new(&file.original_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name.is_empty() || !self.allowed.is_match(&name) {
            return Err(AppError::ValidationError {
                field: file.field.clone(),
                message: format!("File type not allowed: {}", file.original_name),
            });
        }
        if file.data.len() as u64 > self.max_file_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File {} exceeds maximum size of {} bytes",
                file.original_name, self.max_file_bytes
            )));
        }
        Ok(())
    }

    /// Writes the file and returns the public path it is served from.
    pub async fn save(&self, file: PendingFile) -> AppResult<String> {
        self.check(&file)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = unique_filename(&file.original_name);
        let target = self.dir.join(&filename);
        tokio::fs::write(&target, &file.data).await?;

        self.metrics.add_upload(file.data.len() as u64);
        tracing::info!(field = %file.field, size = file.data.len(), path = %target.display(), "Stored upload");
        Ok(format!("{}/{}", self.public_path, filename))
    }

    pub async fn save_optional(&self, file: Option<PendingFile>) -> AppResult<Option<String>> {
        match file {
            Some(f) => self.save(f).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn save_all(&self, files: Vec<PendingFile>) -> AppResult<Vec<String>> {
        let mut paths = Vec::with_capacity(files.len());
        for f in files {
            match self.save(f).await {
                Ok(path) => paths.push(path),
                Err(e) => {
                    self.discard(&paths).await;
                    return Err(e);
                }
            }
        }
        Ok(paths)
    }

    /// Maps a public upload path back to the file under the upload directory.
    /// Only flat names directly below the mount are accepted.
    pub fn local_path(&self, public_path: &str) -> Option<PathBuf> {
        public_path
            .strip_prefix(&self.public_path)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.'))
            .map(|name| self.dir.join(name))
    }

    /// Removes files previously returned by [`save`](Self::save). Paths outside
    /// the upload mount are ignored.
    pub async fn discard(&self, public_paths: &[String]) {
        for path in public_paths {
            let Some(target) = self.local_path(path) else {
                continue;
            };
            let size = tokio::fs::metadata(&target).await.map(|m| m.len()).unwrap_or(0);
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {
                    self.metrics.remove_upload(size);
                    tracing::info!(path = %target.display(), "Discarded upload");
                }
                Err(e) => tracing::warn!(path = %target.display(), error = %e, "Failed to discard upload"),
            }
        }
    }

    /// Passes `result` through, discarding `stored` when it is an error.
    pub async fn settle<T>(&self, stored: &[String], result: AppResult<T>) -> AppResult<T> {
        if result.is_err() {
            self.discard(stored).await;
        }
        result
    }
}

/// `<unix millis>-<random><.ext>`; the extension is kept only if it is plain alphanumeric.
fn unique_filename(original: &str) -> String {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}-{}{}", millis, suffix, ext)
}

/// Request body of a route that accepts uploads.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<PendingFile>>,
}

impl FormData {
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            files: HashMap::new(),
        }
    }

    /// Trimmed text value; empty strings count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> AppResult<String> {
        validation::require(self.text(name), name)
    }

    pub fn integer(&self, name: &str) -> AppResult<Option<i64>> {
        match self.text(name) {
            None => Ok(None),
            Some(v) => v.parse::<i64>().map(Some).map_err(|_| AppError::ValidationError {
                field: name.to_string(),
                message: format!("{} must be an integer", name),
            }),
        }
    }

    pub fn take_file(&mut self, name: &str) -> Option<PendingFile> {
        self.files.get_mut(name).and_then(|v| if v.is_empty() { None } else { Some(v.remove(0)) })
    }

    pub fn take_files(&mut self, name: &str) -> Vec<PendingFile> {
        self.files.remove(name).unwrap_or_default()
    }

    pub fn add_file(&mut self, file: PendingFile) {
        self.files.entry(file.field.clone()).or_default().push(file);
    }

    fn from_json(bytes: &[u8]) -> AppResult<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;
        let serde_json::Value::Object(map) = value else {
            return Err(AppError::BadRequest("Request body must be a JSON object".to_string()));
        };
        let mut form = Self::default();
        for (key, value) in map {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => continue,
            };
            form.fields.insert(key, text);
        }
        Ok(form)
    }
}

impl FromRequest<AppState> for FormData {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Self::from_json(&bytes);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(original_name) if !original_name.is_empty() => {
                    let data = field.bytes().await?;
                    // Browsers send an empty part for an untouched file input.
                    if data.is_empty() {
                        continue;
                    }
                    let file = PendingFile { field: name, original_name, data };
                    state.uploads.check(&file)?;
                    form.add_file(file);
                }
                _ => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> UploadStore {
        UploadStore::new(
            &UploadConfig {
                dir: dir.display().to_string(),
                public_path: "/server/uploads/".to_string(),
                max_file_bytes: 16,
                allowed: vec!["*.pdf".to_string(), "*.png".to_string()],
            },
            Metrics::new(),
        )
        .unwrap()
    }

    fn pending(name: &str, data: &'static [u8]) -> PendingFile {
        PendingFile { field: "pdf".to_string(), original_name: name.to_string(), data: Bytes::from_static(data) }
    }

    #[test]
    fn test_unique_filename_keeps_extension() {
        let name = unique_filename("Lecture Notes.PDF");
        assert!(name.ends_with(".pdf"));
        assert!(name.split('-').next().unwrap().parse::<u128>().is_ok());

        let bare = unique_filename("README");
        assert!(!bare.contains('.'));

        let odd = unique_filename("evil.p h p");
        assert!(!odd.contains(' '));
    }

    #[test]
    fn test_check_extension_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        assert!(s.check(&pending("notes.pdf", b"%PDF-1.4")).is_ok());
        assert!(s.check(&pending("COVER.PNG", b"png")).is_ok());
        assert!(matches!(s.check(&pending("shell.sh", b"#!")), Err(AppError::ValidationError { .. })));
        assert!(matches!(
            s.check(&pending("big.pdf", b"0123456789abcdefXYZ")),
            Err(AppError::PayloadTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_save_writes_file_and_returns_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        let path = s.save(pending("a.pdf", b"%PDF")).await.unwrap();
        assert!(path.starts_with("/server/uploads/"));
        let filename = path.trim_start_matches("/server/uploads/");
        let written = std::fs::read(dir.path().join(filename)).unwrap();
        assert_eq!(written, b"%PDF");
    }

    #[tokio::test]
    async fn test_settle_discards_files_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        let kept = s.save(pending("keep.pdf", b"%PDF")).await.unwrap();
        let dropped = s.save(pending("drop.pdf", b"%PDF-1")).await.unwrap();

        let ok: AppResult<u8> = s.settle(&[kept.clone()], Ok(1)).await;
        assert_eq!(ok.unwrap(), 1);
        let failed: AppResult<u8> = s.settle(&[dropped.clone()], Err(AppError::NotFound("Book not found".into()))).await;
        assert!(failed.is_err());

        assert!(dir.path().join(kept.trim_start_matches("/server/uploads/")).is_file());
        assert!(!dir.path().join(dropped.trim_start_matches("/server/uploads/")).exists());
        let snapshot = s.metrics.get_snapshot();
        assert_eq!(snapshot.files_uploaded, 1);
        assert_eq!(snapshot.bytes_uploaded, 4);

        // Foreign or escaping paths are never touched.
        std::fs::write(dir.path().join("outside.txt"), b"x").unwrap();
        s.discard(&["https://example.com/outside.txt".to_string(), "/server/uploads/../outside.txt".to_string()])
            .await;
        assert!(dir.path().join("outside.txt").is_file());
    }

    #[test]
    fn test_form_from_json() {
        let form = FormData::from_json(br#"{"bookName":" Dune ","totalCopies":3,"flag":true,"skip":null}"#).unwrap();
        assert_eq!(form.text("bookName").as_deref(), Some("Dune"));
        assert_eq!(form.integer("totalCopies").unwrap(), Some(3));
        assert_eq!(form.text("flag").as_deref(), Some("true"));
        assert_eq!(form.text("skip"), None);
        assert!(form.required("description").is_err());
        assert!(FormData::from_json(b"[1,2]").is_err());
        assert!(FormData::from_json(b"").unwrap().text("x").is_none());
    }

    #[test]
    fn test_take_file_order() {
        let mut form = FormData::default();
        form.add_file(PendingFile { field: "images".into(), original_name: "1.png".into(), data: Bytes::new() });
        form.add_file(PendingFile { field: "images".into(), original_name: "2.png".into(), data: Bytes::new() });
        assert_eq!(form.take_file("images").unwrap().original_name, "1.png");
        assert_eq!(form.take_files("images").len(), 1);
        assert!(form.take_file("images").is_none());
    }
}
