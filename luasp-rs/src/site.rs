//! Request-path routing onto documents under a site root.
//!
//! [`Site::serve`] decides whether a request path belongs to a Lua rule,
//! finds the document (trying index pages for directories), reads it, and
//! renders it on a blocking worker with a fresh interpreter per request.
//! Concurrent requests therefore never share Lua state.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::SiteConfig;

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Result of serving one request path.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The document after interpretation.
    Rendered(Vec<u8>),
    NotFound,
    Forbidden,
    /// No rule covers the path; the next handler should take it.
    Pass,
}

impl Outcome {
    /// HTTP-style status code, or `None` for [`Outcome::Pass`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Rendered(_) => Some(200),
            Outcome::NotFound => Some(404),
            Outcome::Forbidden => Some(403),
            Outcome::Pass => None,
        }
    }
}

/// A request that matched a rule but could not be rendered.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("{path}: {source}")]
    Render {
        path: String,
        #[source]
        source: crate::Error,
    },

    #[error("{path}: render exceeded deadline of {:.3}s", .limit.as_secs_f64())]
    Timeout { path: String, limit: Duration },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SiteError {
    /// Every site error is a server-side failure.
    pub fn status(&self) -> u16 {
        500
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Turn a request path into a path relative to the site root.
///
/// `.` segments are dropped and `..` never climbs above the root.  Returns
/// `None` when a segment holds a backslash or NUL byte.
pub fn clean_path(request: &str) -> Option<PathBuf> {
    let mut parts: Vec<&str> = Vec::new();
    for seg in request.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s if s.contains(['\\', '\0']) => return None,
            s => parts.push(s),
        }
    }
    let rel: PathBuf = parts.iter().collect();
    rel.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then_some(rel)
}

// ── Site ──────────────────────────────────────────────────────────────────────

/// Serves documents from [`SiteConfig::root`] through the interpreter.
#[derive(Debug, Clone)]
pub struct Site {
    config: SiteConfig,
}

impl Site {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    /// Serve `request` (e.g. `/docs/index.html`).
    pub async fn serve(&self, request: &str) -> Result<Outcome, SiteError> {
        let Some(rule) = self.config.rule_for(request) else {
            tracing::debug!(path = request, "no rule matched");
            return Ok(Outcome::Pass);
        };
        tracing::debug!(path = request, base = %rule.base_path, "rule matched");

        let Some(rel) = clean_path(request) else {
            tracing::warn!(path = request, "rejected malformed path");
            return Ok(Outcome::Forbidden);
        };

        let Some(file) = self.locate(request, &rel).await else {
            return Ok(Outcome::NotFound);
        };

        let contents = match tokio::fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Outcome::NotFound),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => return Ok(Outcome::Forbidden),
            Err(source) => {
                return Err(SiteError::Io { path: request.to_owned(), source });
            }
        };

        let started = Instant::now();
        let rendered = self.render(request, contents).await?;
        tracing::info!(
            path = request,
            file = %file.display(),
            bytes = rendered.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rendered"
        );
        Ok(Outcome::Rendered(rendered))
    }

    /// Map a request onto a file, trying index pages for directories.
    ///
    /// Returns `None` for a directory with no index page.  Missing files are
    /// left for the read to report.
    async fn locate(&self, request: &str, rel: &Path) -> Option<PathBuf> {
        let path = self.config.root.join(rel);
        let is_dir = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.is_dir(),
            Err(_) => request.ends_with('/'),
        };
        if !is_dir {
            return Some(path);
        }

        for name in &self.config.index_pages {
            let candidate = path.join(name);
            if tokio::fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                tracing::debug!(index = %candidate.display(), "using index page");
                return Some(candidate);
            }
        }
        None
    }

    /// Interpret `contents` off the async runtime, under the configured
    /// deadline.
    async fn render(&self, request: &str, contents: Vec<u8>) -> Result<Vec<u8>, SiteError> {
        let task = tokio::task::spawn_blocking(move || crate::render(&contents));

        let joined = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    // The worker keeps running; the caller decides what to do with it.
                    tracing::warn!(path = request, ?limit, "render deadline exceeded");
                    return Err(SiteError::Timeout { path: request.to_owned(), limit });
                }
            },
            None => task.await,
        };

        joined?.map_err(|source| SiteError::Render { path: request.to_owned(), source })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
