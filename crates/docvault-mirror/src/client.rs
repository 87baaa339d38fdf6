//! Mirror client — placement with fallback, then best-effort sub-steps.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use docvault_core::config::mirror::MirrorConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::warning::Warning;
use docvault_entity::document::MirrorState;

use crate::api::{RemoteDocService, RemoteError};
use crate::placement::PlacementStrategy;

/// Result of a successful mirroring run.
///
/// Conversion and sharing are independent best-effort sub-steps: their
/// failures land in `warnings` without failing the mirror.
#[derive(Debug, Clone)]
pub struct MirrorOutcome {
    /// Confirmed remote identifiers.
    pub state: MirrorState,
    /// Sub-step degradations.
    pub warnings: Vec<Warning>,
}

/// Uploads a copy of a stored document into the external collaboration
/// service.
#[derive(Debug, Clone)]
pub struct MirrorClient {
    /// Remote service API.
    api: Arc<dyn RemoteDocService>,
    /// Placement strategies in fallback order.
    strategies: Vec<PlacementStrategy>,
    /// Whether to convert uploads to the native editable format.
    convert_to_native: bool,
    /// Recipient granted access after upload.
    share_with: Option<String>,
    /// Role granted to the recipient.
    share_role: String,
    /// Transient retries within one strategy.
    max_transient_retries: u32,
}

impl MirrorClient {
    /// Create a mirror client with the configured fallback order.
    pub fn new(api: Arc<dyn RemoteDocService>, config: &MirrorConfig) -> Self {
        Self {
            api,
            strategies: PlacementStrategy::ordered_from_config(config),
            convert_to_native: config.convert_to_native,
            share_with: config.share_with.clone(),
            share_role: config.share_role.clone(),
            max_transient_retries: config.max_transient_retries,
        }
    }

    /// Override the placement order (primarily for tests).
    pub fn with_strategies(mut self, strategies: Vec<PlacementStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Mirror a document into the remote service.
    ///
    /// Walks the placement strategies in order; the first successful
    /// upload wins and the rest are abandoned. Auth failures abort
    /// immediately since no placement will fare better.
    pub async fn mirror(
        &self,
        owner_id: Uuid,
        display_name: &str,
        data: Bytes,
    ) -> AppResult<MirrorOutcome> {
        let mut last_error: Option<RemoteError> = None;

        for strategy in &self.strategies {
            let parent = match self
                .with_retries(|| strategy.resolve_parent(self.api.as_ref(), owner_id))
                .await
            {
                Ok(parent) => parent,
                Err(e @ (RemoteError::Placement(_) | RemoteError::Transient(_))) => {
                    debug!(strategy = %strategy, error = %e, "Placement resolution failed; trying next");
                    last_error = Some(e);
                    continue;
                }
                Err(e) => {
                    return Err(AppError::external_service(format!(
                        "Mirroring aborted: {e}"
                    )));
                }
            };

            let remote_id = match self
                .with_retries(|| self.api.upload(display_name, data.clone(), parent.as_deref()))
                .await
            {
                Ok(id) => id,
                Err(e @ (RemoteError::Placement(_) | RemoteError::Transient(_))) => {
                    debug!(strategy = %strategy, error = %e, "Upload failed; trying next placement");
                    last_error = Some(e);
                    continue;
                }
                Err(e) => {
                    return Err(AppError::external_service(format!(
                        "Mirroring aborted: {e}"
                    )));
                }
            };

            debug!(strategy = %strategy, remote_id = %remote_id, "Remote upload placed");
            return Ok(self.finish(remote_id).await);
        }

        let detail = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no placement strategies configured".to_string());
        Err(AppError::external_service(format!(
            "All remote placements failed: {detail}"
        )))
    }

    /// Run the best-effort conversion and sharing sub-steps.
    async fn finish(&self, remote_file_id: String) -> MirrorOutcome {
        let mut warnings = Vec::new();

        let remote_doc_id = if self.convert_to_native {
            match self.with_retries(|| self.api.convert(&remote_file_id)).await {
                Ok(doc_id) => Some(doc_id),
                Err(e) => {
                    warn!(remote_id = %remote_file_id, error = %e, "Native conversion failed");
                    warnings.push(Warning::mirror(format!(
                        "Remote copy stored but conversion failed: {e}"
                    )));
                    None
                }
            }
        } else {
            None
        };

        let shared = match &self.share_with {
            Some(recipient) => {
                let target = remote_doc_id.as_deref().unwrap_or(&remote_file_id);
                match self
                    .with_retries(|| self.api.share(target, recipient, &self.share_role))
                    .await
                {
                    Ok(granted) => granted,
                    Err(e) => {
                        warn!(remote_id = %remote_file_id, error = %e, "Sharing failed");
                        warnings.push(Warning::mirror(format!(
                            "Remote copy stored but sharing failed: {e}"
                        )));
                        false
                    }
                }
            }
            None => false,
        };

        MirrorOutcome {
            state: MirrorState {
                remote_file_id,
                remote_doc_id,
                shared,
            },
            warnings,
        }
    }

    /// Retry transient failures in place, up to the configured bound.
    async fn with_retries<T, F, Fut>(&self, mut op: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Err(e) if e.is_transient() && attempt < self.max_transient_retries => {
                    attempt += 1;
                    debug!(attempt, error = %e, "Transient remote error; retrying");
                    tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                }
                other => return other,
            }
        }
    }
}
