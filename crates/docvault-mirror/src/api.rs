//! Remote collaboration-service API contract.

use async_trait::async_trait;
use bytes::Bytes;

/// Errors from the remote collaboration service, classified so the
/// placement algorithm can decide between retrying, falling through to the
/// next strategy, and giving up.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// Authentication/token failure. Aborts mirroring (no strategy will
    /// fare better), but mirroring failure is never fatal to ingestion.
    #[error("remote authentication failed: {0}")]
    Auth(String),
    /// Quota or permission rejection specific to the attempted placement.
    /// The next strategy may still succeed.
    #[error("remote placement rejected: {0}")]
    Placement(String),
    /// Network-level failure; retryable within the same strategy.
    #[error("transient remote error: {0}")]
    Transient(String),
    /// Any other API failure.
    #[error("remote API error: {0}")]
    Api(String),
}

impl RemoteError {
    /// Whether a retry of the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Whether the error is specific to the attempted placement.
    pub fn is_placement(&self) -> bool {
        matches!(self, Self::Placement(_))
    }
}

/// The three-operation surface of the external document service, plus
/// folder provisioning for placement. Token lifecycle is owned by a
/// separate collaborator; implementations only attach whatever credential
/// they were constructed with.
#[async_trait]
pub trait RemoteDocService: Send + Sync + std::fmt::Debug + 'static {
    /// Upload a file under the given parent folder (None = service root).
    /// Returns the remote file identifier.
    async fn upload(
        &self,
        name: &str,
        data: Bytes,
        parent: Option<&str>,
    ) -> Result<String, RemoteError>;

    /// Convert an uploaded file into the service's native editable format.
    /// Returns the editable document identifier.
    async fn convert(&self, remote_id: &str) -> Result<String, RemoteError>;

    /// Grant `recipient` the given role on a file or document.
    async fn share(
        &self,
        remote_id: &str,
        recipient: &str,
        role: &str,
    ) -> Result<bool, RemoteError>;

    /// Find or create a folder with the given name under `parent`.
    /// Returns the folder identifier.
    async fn ensure_folder(
        &self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<String, RemoteError>;
}
