//! Build data model and the Builder dispatch contract
//!
//! A [`BuildRequest`] is created once per build attempt and never mutated.
//! Dispatching it through a [`Builder`] returns a single-value channel that
//! eventually carries exactly one [`BuildResult`] correlated to the request.
//! Dispatch itself never fails: build outcomes travel only inside the
//! delivered result.
//!
//! Implementations hold a [`ResultChannel`] while working. The channel
//! guarantees delivery on every exit path - explicit completion, failure, or
//! abandonment (drop, panic unwind, task cancellation) - so whatever awaits
//! the receiver can never deadlock.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::debug;

use crate::crd::{Build, Language};

/// Uniquely names a build
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildIdentifier {
    /// Build name
    pub name: String,
    /// Disambiguates builds sharing a name (e.g., across namespaces)
    pub qualifier: String,
}

/// One unit of integration code, owned by the request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildSource {
    /// Source file name
    pub name: String,
    /// Source text
    pub content: String,
    /// Source language
    pub language: Language,
}

/// A build unit: created once per build attempt, never mutated
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildRequest {
    /// Unique identity of this build
    pub identifier: BuildIdentifier,
    /// The code to build
    pub source: BuildSource,
    /// Dependency coordinates the artifact must carry
    pub dependencies: Vec<String>,
}

impl From<&Build> for BuildRequest {
    fn from(build: &Build) -> Self {
        Self {
            identifier: BuildIdentifier {
                name: build.metadata.name.clone().unwrap_or_default(),
                qualifier: build.metadata.namespace.clone().unwrap_or_default(),
            },
            source: BuildSource {
                name: build.spec.source.name.clone(),
                content: build.spec.source.content.clone(),
                language: build.spec.source.language.clone(),
            },
            dependencies: build.spec.dependencies.clone(),
        }
    }
}

/// Progress of one build request
///
/// Only advances forward; Completed and Error are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// No build has been requested yet
    #[default]
    NotRequested,
    /// The builder accepted the request
    Started,
    /// An artifact was produced
    Completed,
    /// The build failed
    Error,
}

impl Status {
    /// Returns true for states no result may leave
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Returns true when `next` is a legal forward transition from this state
    pub fn advances_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Self::NotRequested, Self::Started)
                | (Self::NotRequested, Self::Completed)
                | (Self::NotRequested, Self::Error)
                | (Self::Started, Self::Completed)
                | (Self::Started, Self::Error)
        )
    }
}

/// Outcome of exactly one [`BuildRequest`]
#[derive(Clone, Debug)]
pub struct BuildResult {
    /// The request this result answers (back-reference, shared not owned)
    pub request: Arc<BuildRequest>,
    /// Final progress state
    pub status: Status,
    /// Image coordinates on success
    pub image: Option<String>,
    /// Failure detail on error
    pub error: Option<String>,
}

/// Supertype of all builders
///
/// Dispatch is non-blocking and infallible: the returned channel eventually
/// carries exactly one result whose back-reference equals the dispatched
/// request. Consumption may happen on an unrelated control-flow path,
/// arbitrarily later, concurrently with other in-flight builds.
pub trait Builder: Send + Sync {
    /// Dispatch one build request
    fn build(&self, request: BuildRequest) -> oneshot::Receiver<BuildResult>;
}

/// Delivery guard for one build's result
///
/// Opened from a request, it yields the receiver handed back to the
/// dispatcher. Exactly one result is sent: through [`complete`](Self::complete)
/// or [`fail`](Self::fail), or - if the builder abandons the channel without
/// delivering - through the drop guard, which reports an error result instead
/// of leaving the receiver waiting forever.
#[derive(Debug)]
pub struct ResultChannel {
    request: Arc<BuildRequest>,
    tx: Option<oneshot::Sender<BuildResult>>,
}

impl ResultChannel {
    /// Open a channel for the given request
    pub fn open(request: BuildRequest) -> (Self, oneshot::Receiver<BuildResult>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                request: Arc::new(request),
                tx: Some(tx),
            },
            rx,
        )
    }

    /// The request this channel answers
    pub fn request(&self) -> &Arc<BuildRequest> {
        &self.request
    }

    /// Deliver a successful result carrying the produced image
    pub fn complete(mut self, image: impl Into<String>) {
        self.send(Status::Completed, Some(image.into()), None);
    }

    /// Deliver a failed result carrying the error detail
    pub fn fail(mut self, error: impl Into<String>) {
        self.send(Status::Error, None, Some(error.into()));
    }

    fn send(&mut self, status: Status, image: Option<String>, error: Option<String>) {
        if let Some(tx) = self.tx.take() {
            let result = BuildResult {
                request: Arc::clone(&self.request),
                status,
                image,
                error,
            };
            // Nobody awaiting the receiver is fine; delivery is best-effort
            // once the consumer is gone.
            if tx.send(result).is_err() {
                debug!(
                    build = %self.request.identifier.name,
                    "build result dropped: receiver no longer listening"
                );
            }
        }
    }
}

impl Drop for ResultChannel {
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.send(
                Status::Error,
                None,
                Some("build abandoned before a result was delivered".to_string()),
            );
        }
    }
}
