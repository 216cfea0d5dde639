//! Static files under a document root.
//!
//! ```text
//! GET /a/b ──▶ resolve(root, "/a/b") ──┬─ traversal ─────────────▶ 404
//!                                      ├─ file ──────────────────▶ 200 + Content-Type
//!                                      ├─ dir, no trailing "/" ──▶ 301 Location: /a/b/
//!                                      ├─ dir with "/" + index ──▶ 200 index file
//!                                      └─ otherwise ─────────────▶ fallback (or 404)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lift_http::{AppFuture, AppResult, Application, Request, Response, SharedApplication};
use tracing::debug;

pub const DEFAULT_INDEX: &str = "index.html";

/// Serves files from a directory, deferring misses to a fallback.
pub struct DocumentRoot {
    root: PathBuf,
    index: Vec<String>,
    fallback: Option<SharedApplication>,
}

impl DocumentRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: vec![DEFAULT_INDEX.to_string()],
            fallback: None,
        }
    }

    /// Directory index names, tried in order.
    pub fn with_index<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index = names.into_iter().map(Into::into).collect();
        self
    }

    /// Application for requests that match no file.
    pub fn fallback(mut self, app: impl Application) -> Self {
        self.fallback = Some(Arc::new(app));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path onto the filesystem.
    ///
    /// Returns `None` if the path tries to leave the root.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for part in url_path.split('/') {
            match part {
                "" | "." => {}
                ".." => return None,
                p if p.contains('\\') || p.contains('\0') => return None,
                p => path.push(p),
            }
        }
        Some(path)
    }
}

impl Application for DocumentRoot {
    fn handle(&self, request: Request) -> AppFuture {
        let resolved = self.resolve(request.path());
        let index = self.index.clone();
        let fallback = self.fallback.clone();
        Box::pin(async move { serve(resolved, &index, fallback, request).await })
    }
}

async fn serve(
    resolved: Option<PathBuf>,
    index: &[String],
    fallback: Option<SharedApplication>,
    request: Request,
) -> AppResult<Response> {
    let Some(target) = resolved else {
        debug!(path = request.path(), "rejected path outside document root");
        return Ok(Response::not_found());
    };
    let head = request.method().eq_ignore_ascii_case("HEAD");
    let readable = head || request.method().eq_ignore_ascii_case("GET");

    if readable {
        if let Ok(meta) = tokio::fs::metadata(&target).await {
            if meta.is_file() {
                return file_response(&target, head).await;
            }
            if meta.is_dir() {
                if !request.path().ends_with('/') {
                    let mut location = format!("{}/", request.path());
                    if !request.query().is_empty() {
                        location.push('?');
                        location.push_str(&request.query_string());
                    }
                    return Ok(Response::redirect(301, location));
                }
                for name in index {
                    let candidate = target.join(name);
                    if tokio::fs::metadata(&candidate)
                        .await
                        .is_ok_and(|m| m.is_file())
                    {
                        return file_response(&candidate, head).await;
                    }
                }
            }
        }
    }

    match fallback {
        Some(app) => app.handle(request).await,
        None if readable => Ok(Response::not_found()),
        None => Ok(Response::new(405, Default::default(), "Method Not Allowed")
            .with_header("Allow", "GET, HEAD")),
    }
}

async fn file_response(path: &Path, head: bool) -> AppResult<Response> {
    let body = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = body.len(), "serving file");
    let resp = Response::ok(if head { Vec::new() } else { body })
        .with_header("Content-Type", content_type(path));
    Ok(resp)
}

/// Serves one fixed file for every request (a front-controller page).
pub struct StaticFile {
    path: PathBuf,
}

impl StaticFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Application for StaticFile {
    fn handle(&self, request: Request) -> AppFuture {
        let path = self.path.clone();
        let head = request.method().eq_ignore_ascii_case("HEAD");
        Box::pin(async move { file_response(&path, head).await })
    }
}

/// Content type by file extension. Text types carry a UTF-8 charset.
pub fn content_type(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::TEXT {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_http::{QueryParams, handler_fn};

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "Home").unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        std::fs::write(dir.path().join("subdir/index.html"), "subdir").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        dir
    }

    async fn get(app: &DocumentRoot, path: &str) -> Response {
        app.handle(Request::new("GET", path)).await.unwrap()
    }

    // ── resolution ─────────────────────────────────────────────────

    #[test]
    fn resolve_rejects_traversal() {
        let root = DocumentRoot::new("/srv/www");
        assert_eq!(root.resolve("/../etc/passwd"), None);
        assert_eq!(root.resolve("/a/../../b"), None);
        assert_eq!(
            root.resolve("/a/./b.txt"),
            Some(PathBuf::from("/srv/www/a/b.txt"))
        );
        assert_eq!(root.resolve("/"), Some(PathBuf::from("/srv/www")));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type(Path::new("a/b.CSS")), "text/css; charset=utf-8");
        assert_eq!(content_type(Path::new("logo.png")), "image/png");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
        assert_eq!(content_type(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(content_type(Path::new("app.wasm")), "application/wasm");
        assert_eq!(content_type(Path::new("notes.txt")), "text/plain; charset=utf-8");
    }

    // ── serving ────────────────────────────────────────────────────

    #[tokio::test]
    async fn root_serves_index() {
        let dir = site();
        let resp = get(&DocumentRoot::new(dir.path()), "/").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body().as_ref(), b"Home");
        assert_eq!(
            resp.headers().get("content-type"),
            Some("text/html; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn explicit_file() {
        let dir = site();
        let resp = get(&DocumentRoot::new(dir.path()), "/hello.txt").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body().as_ref(), b"hello");
        assert_eq!(
            resp.headers().get("content-type"),
            Some("text/plain; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn directory_without_slash_redirects() {
        let dir = site();
        let resp = get(&DocumentRoot::new(dir.path()), "/subdir").await;
        assert_eq!(resp.status(), 301);
        assert_eq!(resp.headers().get("location"), Some("/subdir/"));
    }

    #[tokio::test]
    async fn redirect_keeps_query() {
        let dir = site();
        let mut query = QueryParams::new();
        query.append("a", "1");
        let req = Request::new("GET", "/subdir").with_query(query);
        let resp = DocumentRoot::new(dir.path()).handle(req).await.unwrap();
        assert_eq!(resp.headers().get("location"), Some("/subdir/?a=1"));
    }

    #[tokio::test]
    async fn directory_with_slash_serves_index() {
        let dir = site();
        let resp = get(&DocumentRoot::new(dir.path()), "/subdir/").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body().as_ref(), b"subdir");
    }

    #[tokio::test]
    async fn custom_index_names_in_order() {
        let dir = site();
        std::fs::write(dir.path().join("subdir/default.htm"), "default").unwrap();
        let root = DocumentRoot::new(dir.path()).with_index(["default.htm", "index.html"]);
        let resp = get(&root, "/subdir/").await;
        assert_eq!(resp.body().as_ref(), b"default");
    }

    #[tokio::test]
    async fn missing_file_goes_to_fallback() {
        let dir = site();
        let root = DocumentRoot::new(dir.path()).fallback(handler_fn(|req: Request| async move {
            Ok(Response::ok(format!("app {}", req.path())))
        }));
        let resp = get(&root, "/no/such/file").await;
        assert_eq!(resp.body().as_ref(), b"app /no/such/file");

        // A directory without an index also falls through.
        let resp = get(&root, "/empty/").await;
        assert_eq!(resp.body().as_ref(), b"app /empty/");
    }

    #[tokio::test]
    async fn missing_file_without_fallback_is_404() {
        let dir = site();
        let resp = get(&DocumentRoot::new(dir.path()), "/missing.txt").await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn traversal_is_404_not_fallback() {
        let dir = site();
        let root = DocumentRoot::new(dir.path().join("subdir"))
            .fallback(handler_fn(|_req: Request| async { Ok(Response::ok("app")) }));
        let resp = get(&root, "/../hello.txt").await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn head_has_headers_but_no_body() {
        let dir = site();
        let resp = DocumentRoot::new(dir.path())
            .handle(Request::new("HEAD", "/style.css"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert!(resp.body().is_empty());
        assert_eq!(
            resp.headers().get("content-type"),
            Some("text/css; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn post_without_fallback_is_405() {
        let dir = site();
        let resp = DocumentRoot::new(dir.path())
            .handle(Request::new("POST", "/hello.txt"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 405);
    }

    #[tokio::test]
    async fn static_file_serves_entry_page_for_any_path() {
        let dir = site();
        let page = StaticFile::new(dir.path().join("index.html"));
        let resp = page.handle(Request::new("GET", "/any/route")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body().as_ref(), b"Home");
    }
}
