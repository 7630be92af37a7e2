//! Request-scoped routing input.

use axum::http::{header, Request};
use url::form_urlencoded;

use crate::routing::rewriter::SplitTarget;

/// What the policy needs to know about one request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    hostname: String,
    path: String,
    query: Vec<(String, String)>,
    raw_query: Option<String>,
    fragment: Option<String>,
}

impl RequestContext {
    /// Build from a host and a raw target (`/path?query#fragment`).
    pub fn new(hostname: impl Into<String>, target: &str) -> Self {
        let split = SplitTarget::parse(target);
        let query = split
            .query
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self {
            hostname: hostname.into(),
            path: split.path.to_string(),
            query,
            raw_query: split.query.map(str::to_string),
            fragment: split.fragment.map(str::to_string),
        }
    }

    /// Build from an incoming request. `Host` wins over the URI authority.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let hostname = req
            .headers()
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .or_else(|| req.uri().authority().map(|a| a.as_str().to_string()))
            .unwrap_or_default();
        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Self::new(hostname, target)
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded query pairs in request order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The raw target, query and fragment included verbatim.
    pub fn target(&self) -> String {
        SplitTarget {
            path: &self.path,
            query: self.raw_query.as_deref(),
            fragment: self.fragment.as_deref(),
        }
        .reattach(&self.path)
    }
}
