//! Fetch and storage collaborators. These are the only places the pipeline awaits.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use crate::{
    assets::decode::{decode_image, load_image},
    foundation::error::{BacktextError, BacktextResult},
    raster::canvas::Canvas,
};

/// Loads a source image from a URL or a local path.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch and decode `source`.
    async fn fetch(&self, source: &str) -> BacktextResult<Canvas>;
}

/// Accepts a finished local file and returns a durable public URL for it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Publish `local` and return its URL.
    async fn upload(&self, local: &Path) -> BacktextResult<String>;
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetches `http(s)://` sources with `reqwest` and everything else from disk.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_dir: PathBuf,
}

impl HttpFetcher {
    /// Fetcher resolving relative paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_dir: base_dir.into(),
        }
    }

    /// Local paths tried for `source`, in order.
    ///
    /// `/uploads/...` refers to the service's upload tree and resolves against `base_dir`.
    pub fn local_candidates(&self, source: &str) -> Vec<PathBuf> {
        let as_given = PathBuf::from(source);
        let rebased = match source.strip_prefix('/') {
            Some(rest) if source.starts_with("/uploads/") => self.base_dir.join(rest),
            _ if as_given.is_absolute() => return vec![as_given],
            _ => self.base_dir.join(source),
        };
        vec![as_given, rebased]
    }

    async fn fetch_remote(&self, url: &str) -> BacktextResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {url}"))
            .map_err(|e| BacktextError::io(format!("{e:#}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BacktextError::io(format!(
                "request failed for {url}: HTTP {status}"
            )));
        }
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("failed to read response body from {url}"))
            .map_err(|e| BacktextError::io(format!("{e:#}")))?;
        Ok(bytes.to_vec())
    }

    /// First existing file among [`HttpFetcher::local_candidates`].
    async fn resolve_local(&self, source: &str) -> BacktextResult<PathBuf> {
        let candidates = self.local_candidates(source);
        for path in &candidates {
            let is_file = tokio::fs::metadata(path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                tracing::debug!(path = %path.display(), "resolved local image");
                return Ok(path.clone());
            }
        }
        let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        Err(BacktextError::io(format!(
            "image not found: {source} (tried {})",
            tried.join(", ")
        )))
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, source: &str) -> BacktextResult<Canvas> {
        if is_remote(source) {
            let bytes = self.fetch_remote(source).await?;
            decode_image(&bytes)
        } else {
            load_image(&self.resolve_local(source).await?).await
        }
    }
}

/// Publishes files by copying them into a directory served under `url_prefix`.
#[derive(Clone, Debug)]
pub struct LocalPublicStore {
    public_dir: PathBuf,
    url_prefix: String,
}

impl LocalPublicStore {
    /// Store copying into `public_dir` and answering URLs under `url_prefix`.
    pub fn new(public_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            public_dir: public_dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Directory files are copied into.
    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }
}

/// `<stem>_<8 hex>.<ext>` with spaces in the stem replaced by `_`.
pub fn unique_object_name(local: &Path) -> String {
    let stem = local
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image")
        .replace(' ', "_");
    let ext = local
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{stem}_{}.{ext}", &id[..8])
}

#[async_trait]
impl ObjectStore for LocalPublicStore {
    async fn upload(&self, local: &Path) -> BacktextResult<String> {
        let name = unique_object_name(local);
        tokio::fs::create_dir_all(&self.public_dir)
            .await
            .with_context(|| format!("create public dir {}", self.public_dir.display()))
            .map_err(|e| BacktextError::io(format!("{e:#}")))?;
        let dest = self.public_dir.join(&name);
        tokio::fs::copy(local, &dest)
            .await
            .with_context(|| format!("publish {} to {}", local.display(), dest.display()))
            .map_err(|e| BacktextError::io(format!("{e:#}")))?;
        let url = format!("{}/{name}", self.url_prefix.trim_end_matches('/'));
        tracing::info!(url = %url, "published artifact");
        Ok(url)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/io.rs"]
mod tests;
