//! Media gallery listings.
//!
//! Listings come from the remote blob store when a token is
//! configured and fall back to a local directory otherwise. Failures
//! on either path degrade to an empty gallery rather than failing the
//! page.

use crate::config::GalleryConfig;
use log::warn;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Endpoint listing stored blobs
const BLOB_LIST_URL: &str = "https://blob.vercel-storage.com";
/// Timeout before a remote listing attempt is abandoned
const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound on blobs requested per listing
const REMOTE_LIST_LIMIT: &str = "1000";

/// File extensions that are shown in the gallery
const ALLOWED_MEDIA_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "webp", "mp4", "mov", "avi"];

/// One gallery entry. Remote items carry a direct URL, local items
/// are served by the media route instead.
#[derive(Debug, Clone, Serialize)]
pub struct MediaItem {
    /// File name without any path
    pub name: String,
    /// Direct URL for remotely stored media
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Version token for cache busting
    pub v: u64,
}

/// Checks a file name against the allowed media extensions
pub fn allowed_media_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            ALLOWED_MEDIA_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Response structure for a blob listing
#[derive(Deserialize)]
struct BlobListing {
    #[serde(default)]
    blobs: Vec<BlobEntry>,
}

#[derive(Deserialize)]
struct BlobEntry {
    url: String,
    pathname: String,
    #[serde(default, rename = "uploadedAt")]
    uploaded_at: Option<serde_json::Value>,
}

impl BlobEntry {
    /// Derives a cache-busting version from the upload timestamp,
    /// falling back to the current time when it's missing or in an
    /// unexpected shape
    fn version(&self) -> u64 {
        self.uploaded_at
            .as_ref()
            .and_then(|value| match value {
                serde_json::Value::Number(number) => number.as_u64(),
                serde_json::Value::String(value) => chrono::DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|time| time.timestamp_millis() as u64),
                _ => None,
            })
            .unwrap_or_else(unix_millis_now)
    }
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Lists the media stored remotely under the year prefix. Any failure
/// along the way produces None so the caller can degrade.
async fn list_remote_blobs(token: &str, prefix: &str, year: i32) -> Option<Vec<MediaItem>> {
    let client = Client::new();
    let response = client
        .get(BLOB_LIST_URL)
        .query(&[
            ("limit", REMOTE_LIST_LIMIT),
            ("prefix", &format!("{prefix}/{year}/")),
        ])
        .bearer_auth(token)
        .timeout(REMOTE_TIMEOUT)
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?;

    let listing: BlobListing = response.json().await.ok()?;

    let mut items: Vec<MediaItem> = listing
        .blobs
        .into_iter()
        .filter_map(|blob| {
            let name = blob.pathname.rsplit('/').next()?.to_string();
            if name.is_empty() || !allowed_media_file(&name) {
                return None;
            }
            let v = blob.version();
            Some(MediaItem {
                name,
                url: Some(blob.url),
                v,
            })
        })
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Some(items)
}

/// Lists the media stored on disk under `{root}/{year}`. A missing or
/// unreadable directory is an empty gallery.
async fn list_local_media(root: &str, year: i32) -> Vec<MediaItem> {
    let mut items = Vec::new();
    let mut dir = match tokio::fs::read_dir(format!("{root}/{year}")).await {
        Ok(dir) => dir,
        Err(_) => return items,
    };

    while let Ok(Some(entry)) = dir.next_entry().await {
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if !allowed_media_file(&name) {
            continue;
        }

        // Modification time doubles as the cache-busting version
        let v = match entry.metadata().await.and_then(|meta| meta.modified()) {
            Ok(modified) => modified
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis() as u64)
                .unwrap_or_else(|_| unix_millis_now()),
            Err(_) => unix_millis_now(),
        };

        items.push(MediaItem { name, url: None, v });
    }

    items.sort_by(|a, b| a.name.cmp(&b.name));
    items
}

/// Lists the gallery media for the provided year, preferring the
/// remote store when a token is configured. A failed or empty remote
/// listing falls back to the bundled local files.
pub async fn list_media(config: &GalleryConfig, year: i32) -> Vec<MediaItem> {
    if let Some(token) = &config.blob_token {
        match list_remote_blobs(token, &config.blob_prefix, year).await {
            Some(items) if !items.is_empty() => return items,
            Some(_) => {}
            None => warn!("Remote media listing failed for {year}, using bundled files"),
        }
    }

    list_local_media(&config.root, year).await
}

#[cfg(test)]
mod test {
    use super::allowed_media_file;

    #[test]
    fn test_allowed_media_file() {
        assert!(allowed_media_file("team.JPG"));
        assert!(allowed_media_file("goal.mp4"));
        assert!(allowed_media_file("celebration.webp"));
        assert!(!allowed_media_file("notes.txt"));
        assert!(!allowed_media_file("archive.zip"));
        assert!(!allowed_media_file("noextension"));
        assert!(!allowed_media_file(".hidden"));
    }
}
