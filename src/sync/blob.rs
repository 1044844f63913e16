use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Method, StatusCode};
use std::sync::LazyLock;
use uuid::Uuid;

use super::{BlobStore, GatewayError, GatewayResult};

static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9]{1,8}$").unwrap());

const FALLBACK_EXTENSION: &str = "bin";

/// Storage path for a new image owned by `collection/record_id`.
///
/// Format: `images/<collection>/<record id>/<uuid>.<ext>`. The extension is
/// taken from the uploaded file name when it looks sane, else `bin`.
pub fn image_path(collection: &str, record_id: &str, file_name: &str) -> String {
    format!(
        "images/{}/{}/{}.{}",
        collection,
        record_id,
        Uuid::new_v4().simple(),
        image_extension(file_name)
    )
}

pub fn image_extension(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if EXTENSION_RE.is_match(&ext) {
        ext
    } else {
        FALLBACK_EXTENSION.to_string()
    }
}

/// Blob store reached with plain `PUT`/`DELETE` under one base URL.
#[derive(Clone)]
pub struct HttpBlobStore {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl HttpBlobStore {
    pub fn new(base_url: &str, token: Option<String>) -> GatewayResult<Self> {
        let http = Client::builder().build().map_err(|source| GatewayError::Http {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put_object(&self, path: &str, bytes: Vec<u8>) -> GatewayResult<()> {
        let url = self.url(path);
        let resp = self
            .request(Method::PUT, &url)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|source| GatewayError::Http {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                method: "PUT",
                url,
                status,
                body,
            });
        }
        log::debug!("Stored blob {}", path);
        Ok(())
    }

    async fn object_url(&self, path: &str) -> GatewayResult<String> {
        Ok(self.url(path))
    }

    async fn delete_object(&self, path: &str) -> GatewayResult<()> {
        let url = self.url(path);
        let resp = self
            .request(Method::DELETE, &url)
            .send()
            .await
            .map_err(|source| GatewayError::Http {
                url: url.clone(),
                source,
            })?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()), // already gone
            status => Err(GatewayError::Status {
                method: "DELETE",
                url,
                status,
                body: resp.text().await.unwrap_or_default(),
            }),
        }
    }
}
