//! Development server over the output directory.
//!
//! Files are served by `tower-http`'s `ServeDir`. Extensionless page URLs
//! are mapped to their `.html` file, so `/about` serves `about.html`.

use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use axum::{
    Router,
    extract::{Request, State},
    http::Uri,
    middleware,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Create the development server router.
pub fn create_router(output_dir: &Path) -> Router {
    let root = Arc::new(output_dir.to_path_buf());

    Router::new()
        .fallback_service(ServeDir::new(output_dir))
        .layer(middleware::map_request_with_state(root, rewrite_html))
        .layer(TraceLayer::new_for_http())
}

/// Point the request at `<path>.html` when that file exists.
async fn rewrite_html(State(root): State<Arc<PathBuf>>, mut req: Request) -> Request {
    if let Some((file, uri)) = html_candidate(&root, req.uri()) {
        let is_file = tokio::fs::metadata(&file)
            .await
            .is_ok_and(|meta| meta.is_file());
        if is_file {
            tracing::debug!(from = %req.uri(), to = %uri, "serving html page");
            *req.uri_mut() = uri;
        }
    }
    req
}

/// The `.html` file a request could map to, and the rewritten URI.
///
/// Paths ending in `/` or `.html`, and paths that would leave `root`, have
/// no candidate.
fn html_candidate(root: &Path, uri: &Uri) -> Option<(PathBuf, Uri)> {
    let path = uri.path();
    if path.ends_with('/') || path.ends_with(".html") {
        return None;
    }

    let decoded = urlencoding::decode(path).ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));
    if relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let mut file_name = relative.as_os_str().to_os_string();
    file_name.push(".html");
    let file = root.join(file_name);

    let rewritten = match uri.query() {
        Some(query) => format!("{path}.html?{query}"),
        None => format!("{path}.html"),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(rewritten.parse().ok()?);
    let uri = Uri::from_parts(parts).ok()?;

    Some((file, uri))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::{
        body::{Body, to_bytes},
        http::StatusCode,
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("blog/first")).unwrap();
        fs::write(dir.path().join("about.html"), "about page").unwrap();
        fs::write(dir.path().join("blog/first.html"), "first post").unwrap();
        fs::write(dir.path().join("blog/first/index.html"), "first index").unwrap();
        fs::write(dir.path().join("robots.txt"), "robot").unwrap();
        dir
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[test]
    fn test_html_candidate() {
        let root = Path::new("/srv/out");

        let (file, uri) = html_candidate(root, &"/about".parse().unwrap()).unwrap();
        assert_eq!(file, PathBuf::from("/srv/out/about.html"));
        assert_eq!(uri, "/about.html");

        let (_, uri) = html_candidate(root, &"/blog/post?ref=feed".parse().unwrap()).unwrap();
        assert_eq!(uri, "/blog/post.html?ref=feed");

        let (file, _) = html_candidate(root, &"/hello%20world".parse().unwrap()).unwrap();
        assert_eq!(file, PathBuf::from("/srv/out/hello world.html"));
    }

    #[test]
    fn test_html_candidate_skips() {
        let root = Path::new("/srv/out");
        for uri in ["/", "/blog/", "/about.html", "/../secret"] {
            assert!(
                html_candidate(root, &uri.parse().unwrap()).is_none(),
                "{uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_extensionless_path_serves_html() {
        let dir = site();
        let (status, body) = get(create_router(dir.path()), "/about").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "about page");
    }

    #[tokio::test]
    async fn test_html_file_preferred_over_directory() {
        let dir = site();
        let (status, body) = get(create_router(dir.path()), "/blog/first").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "first post");
    }

    #[tokio::test]
    async fn test_trailing_slash_uses_directory_index() {
        let dir = site();
        let (status, body) = get(create_router(dir.path()), "/blog/first/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "first index");
    }

    #[tokio::test]
    async fn test_plain_files_served_unchanged() {
        let dir = site();
        let (status, body) = get(create_router(dir.path()), "/robots.txt").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "robot");
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let dir = site();
        let (status, _) = get(create_router(dir.path()), "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
