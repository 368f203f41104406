//! Catalog lookups and source metadata extraction
//!
//! The [`Catalog`] maps component schemes discovered in integration source
//! text to dependency coordinates; it is read-only and deterministic. The
//! [`MetadataExtractor`] classifies source units: which schemes they use and
//! whether any of them needs an inbound HTTP service. Both are external
//! collaborators from the pipeline's perspective; the implementations here
//! ([`StaticCatalog`], [`UriScanner`]) are the defaults the operator wires in.

use std::collections::{BTreeMap, BTreeSet};

use crate::crd::SourceSpec;

/// Read-only store mapping component schemes to dependency coordinates
pub trait Catalog: Send + Sync {
    /// Dependency coordinate for a component scheme, if the catalog knows it
    fn dependency_for_scheme(&self, scheme: &str) -> Option<String>;

    /// Coordinate every integration depends on
    fn base_dependency(&self) -> String;

    /// Fixed dependency of the integration runtime
    fn runtime_dependency(&self) -> String;

    /// Whether consumers of this scheme require an inbound HTTP service
    fn requires_http_service(&self, scheme: &str) -> bool;
}

/// Map-backed catalog
#[derive(Clone, Debug)]
pub struct StaticCatalog {
    components: BTreeMap<String, String>,
    http_schemes: BTreeSet<String>,
    base: String,
    runtime: String,
}

impl StaticCatalog {
    /// Create an empty catalog with the given base and runtime coordinates
    pub fn new(base: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self {
            components: BTreeMap::new(),
            http_schemes: BTreeSet::new(),
            base: base.into(),
            runtime: runtime.into(),
        }
    }

    /// Register a component scheme and its dependency coordinate
    pub fn with_component(
        mut self,
        scheme: impl Into<String>,
        coordinate: impl Into<String>,
    ) -> Self {
        self.components.insert(scheme.into(), coordinate.into());
        self
    }

    /// Mark a scheme as requiring an inbound HTTP service when consumed
    pub fn with_http_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.http_schemes.insert(scheme.into());
        self
    }

    /// The default Camel component catalog
    pub fn default_camel() -> Self {
        let mut catalog = Self::new("camel:core", "runtime:jvm");
        for scheme in [
            "direct", "log", "timer", "http", "undertow", "servlet", "jetty", "netty-http",
            "rest",
        ] {
            catalog = catalog.with_component(scheme, format!("camel:{scheme}"));
        }
        for scheme in ["undertow", "servlet", "jetty", "netty-http", "rest"] {
            catalog = catalog.with_http_scheme(scheme);
        }
        catalog
    }
}

impl Catalog for StaticCatalog {
    fn dependency_for_scheme(&self, scheme: &str) -> Option<String> {
        self.components.get(scheme).cloned()
    }

    fn base_dependency(&self) -> String {
        self.base.clone()
    }

    fn runtime_dependency(&self) -> String {
        self.runtime.clone()
    }

    fn requires_http_service(&self, scheme: &str) -> bool {
        self.http_schemes.contains(scheme)
    }
}

/// Classification of one or more source units
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceMetadata {
    /// Component schemes the source endpoints use
    pub schemes: BTreeSet<String>,
    /// Whether any used scheme requires an inbound HTTP service
    pub requires_http_service: bool,
}

/// Classifies integration source text
///
/// Pure function over the source content; no cluster state is consulted.
pub trait MetadataExtractor: Send + Sync {
    /// Classify one source unit
    fn extract(&self, catalog: &dyn Catalog, source: &SourceSpec) -> SourceMetadata;
}

/// Default extractor scanning double-quoted endpoint URIs
///
/// Endpoint URIs appear in double-quoted literals across the supported
/// source languages (`from("direct:foo")`, `uri="timer:tick"`); the scanner
/// collects every quoted `scheme:path` literal and keeps the scheme.
#[derive(Clone, Copy, Debug, Default)]
pub struct UriScanner;

impl MetadataExtractor for UriScanner {
    fn extract(&self, catalog: &dyn Catalog, source: &SourceSpec) -> SourceMetadata {
        let mut schemes = BTreeSet::new();
        for segment in quoted_segments(&source.content) {
            if let Some(scheme) = endpoint_scheme(segment) {
                schemes.insert(scheme.to_string());
            }
        }
        let requires_http_service = schemes.iter().any(|s| catalog.requires_http_service(s));
        SourceMetadata {
            schemes,
            requires_http_service,
        }
    }
}

/// Classify all sources of an integration with the default scanner
pub fn extract_all(catalog: &dyn Catalog, sources: &[SourceSpec]) -> SourceMetadata {
    let scanner = UriScanner;
    let mut all = SourceMetadata::default();
    for source in sources {
        let meta = scanner.extract(catalog, source);
        all.schemes.extend(meta.schemes);
        all.requires_http_service |= meta.requires_http_service;
    }
    all
}

fn quoted_segments(content: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find('"') {
        let after = &rest[start + 1..];
        match after.find('"') {
            Some(end) => {
                segments.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    segments
}

/// The scheme of an endpoint URI literal, or None when the literal is not one
fn endpoint_scheme(literal: &str) -> Option<&str> {
    let (scheme, path) = literal.split_once(':')?;
    if path.is_empty() {
        return None;
    }
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_lowercase() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '+') {
        return None;
    }
    Some(scheme)
}
