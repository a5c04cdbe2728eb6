//! Propagation kernel extraction.
//!
//! # Responsibilities
//! - Derive the header subset carrying trace-propagation metadata
//! - Apply the default redaction policy (credentials, cookies, framing)
//! - Normalize header names case-insensitively
//!
//! # Design Decisions
//! - Extraction is pure and total: it never fails and has no side effects
//! - One fresh `Kernel` per request; immutable after construction
//! - Duplicate header names are deduplicated, first occurrence wins
//! - Non-UTF-8 header values are skipped; they cannot carry recognized
//!   propagation data

pub mod policy;

pub use policy::is_kernel_header;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;

/// Predicate over header names deciding inclusion in a [`Kernel`].
///
/// Cheap to clone and safe to share across concurrent requests. The default
/// filter admits everything outside the redaction policy's excluded sets.
#[derive(Clone)]
pub struct HeaderFilter(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl HeaderFilter {
    /// Wrap a custom predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Returns true if the named header may enter a kernel.
    pub fn allows(&self, name: &str) -> bool {
        (self.0)(name)
    }
}

impl Default for HeaderFilter {
    fn default() -> Self {
        Self::new(policy::is_kernel_header)
    }
}

impl fmt::Debug for HeaderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HeaderFilter(..)")
    }
}

/// The subset of inbound headers relevant to trace propagation.
///
/// Keys are normalized to lowercase; values are kept verbatim. Built once
/// per request and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kernel {
    headers: HashMap<String, String>,
}

impl Kernel {
    /// Extract a kernel from the request headers.
    ///
    /// Includes exactly the headers whose name satisfies the filter. For a
    /// header present more than once, the first occurrence wins.
    pub fn from_headers(headers: &HeaderMap, filter: &HeaderFilter) -> Self {
        let mut kernel = HashMap::new();
        for (name, value) in headers {
            if !filter.allows(name.as_str()) {
                continue;
            }
            let Ok(value) = value.to_str() else {
                continue;
            };
            kernel
                .entry(name.as_str().to_string())
                .or_insert_with(|| value.to_string());
        }
        Self { headers: kernel }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns true if the named header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over `(name, value)` pairs. No ordering guarantee.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Header names, sorted. Safe to log; values never are.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.headers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
