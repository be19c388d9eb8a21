use crate::{
    config::Config,
    middleware::auth::Auth,
    services::gallery::{self, MediaItem},
};
use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Years the gallery keeps media for
const GALLERY_YEARS: &[i32] = &[2025, 2026];

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /api/gallery
pub fn router() -> Router {
    Router::new()
        .route("/", get(get_gallery))
        .route("/media/{year}/{filename}", get(get_media))
}

#[derive(Deserialize)]
struct GalleryQuery {
    /// Year tab to list, defaults to the first gallery year
    year: Option<i32>,
}

#[derive(Serialize)]
struct GalleryResponse {
    active_year: i32,
    media_files: Vec<MediaItem>,
}

/// GET /api/gallery
///
/// Lists the media for the requested year. Unknown years fall back
/// to the default tab, and listing failures show an empty gallery
/// rather than an error.
async fn get_gallery(
    Extension(config): Extension<Arc<Config>>,
    _auth: Auth,
    Query(query): Query<GalleryQuery>,
) -> Json<GalleryResponse> {
    let year = query
        .year
        .filter(|year| GALLERY_YEARS.contains(year))
        .unwrap_or(GALLERY_YEARS[0]);

    let media_files = gallery::list_media(&config.gallery, year).await;

    Json(GalleryResponse {
        active_year: year,
        media_files,
    })
}

/// GET /api/gallery/media/{year}/{filename}
///
/// Serves a single media file. Remotely stored media redirects to
/// its public URL, bundled files are read from disk and sent with
/// caching disabled so a replaced file shows up immediately.
async fn get_media(
    Extension(config): Extension<Arc<Config>>,
    Path((year, filename)): Path<(i32, String)>,
) -> Response {
    if !GALLERY_YEARS.contains(&year)
        || filename.contains(['/', '\\'])
        || !gallery::allowed_media_file(&filename)
    {
        return StatusCode::NOT_FOUND.into_response();
    }

    // Prefer the remote copy when the blob store has one
    let items = gallery::list_media(&config.gallery, year).await;
    if let Some(url) = items
        .iter()
        .find(|item| item.name == filename)
        .and_then(|item| item.url.as_deref())
    {
        return Redirect::to(url).into_response();
    }

    let path = format!("{}/{year}/{filename}", config.gallery.root);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (
                    header::CACHE_CONTROL,
                    "no-store, no-cache, must-revalidate, max-age=0",
                ),
                (header::PRAGMA, "no-cache"),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod test {
    use super::router;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Extension,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Bundled media files are served with caching disabled, unknown
    /// files and years are not found
    #[tokio::test]
    async fn test_local_media_served_without_caching() {
        let root = std::env::temp_dir().join(format!("touchline-media-{}", std::process::id()));
        tokio::fs::create_dir_all(root.join("2025")).await.unwrap();
        tokio::fs::write(root.join("2025/team.png"), b"png-bytes")
            .await
            .unwrap();

        let mut config = Config::default();
        config.gallery.root = root.to_string_lossy().into_owned();
        let app = router().layer(Extension(Arc::new(config)));

        let request = |uri: &str| {
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };

        let res = app
            .clone()
            .oneshot(request("/media/2025/team.png"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cache = res
            .headers()
            .get(header::CACHE_CONTROL)
            .expect("Missing cache control header");
        assert!(cache.to_str().unwrap().contains("no-store"));

        let res = app
            .clone()
            .oneshot(request("/media/2025/missing.png"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .oneshot(request("/media/2027/team.png"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
