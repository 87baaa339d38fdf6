//! Duplicate detection and display-name disambiguation.
//!
//! Duplicate detection is an optimization, not a safety property: a
//! metadata lookup failure degrades to non-duplicate treatment with a
//! warning instead of failing the upload.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use docvault_core::warning::Warning;
use docvault_database::DocumentStore;

/// Outcome of duplicate resolution for one upload.
#[derive(Debug, Clone)]
pub struct DuplicateResolution {
    /// Whether the upload matches an existing record's content.
    pub is_duplicate: bool,
    /// Disambiguated display name.
    pub display_name: String,
    /// Dense position within the duplicate group (0 = original).
    pub sequence: i32,
    /// The group's sequence-0 record, when this is a duplicate.
    pub original_document_id: Option<Uuid>,
    /// Set when detection degraded and the upload was treated as original.
    pub warning: Option<Warning>,
}

/// Resolves duplicates within an owner's documents by content hash.
#[derive(Debug, Clone)]
pub struct DuplicateResolver {
    store: Arc<dyn DocumentStore>,
}

impl DuplicateResolver {
    /// Create a new resolver over the metadata store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Resolve an upload against the owner's existing duplicate group.
    ///
    /// Disambiguation is keyed by the group's canonical (sequence-0)
    /// display name: repeated uploads of the same bytes read as copies of
    /// the original artifact regardless of what each upload was called.
    pub async fn resolve(
        &self,
        owner_id: Uuid,
        original_name: &str,
        content_hash: &str,
    ) -> DuplicateResolution {
        let group = match self.store.find_duplicates(owner_id, content_hash).await {
            Ok(group) => group,
            Err(e) => {
                warn!(
                    owner_id = %owner_id,
                    error = %e,
                    "Duplicate lookup failed; treating upload as original"
                );
                return DuplicateResolution {
                    is_duplicate: false,
                    display_name: fallback_name(original_name),
                    sequence: 0,
                    original_document_id: None,
                    warning: Some(Warning::duplicate_detection(format!(
                        "Duplicate detection unavailable: {e}"
                    ))),
                };
            }
        };

        if group.is_empty() {
            return DuplicateResolution {
                is_duplicate: false,
                display_name: original_name.to_string(),
                sequence: 0,
                original_document_id: None,
                warning: None,
            };
        }

        let original = group.iter().find(|d| d.duplicate_sequence == 0);
        let canonical = original
            .map(|d| d.display_name.clone())
            .unwrap_or_else(|| original_name.to_string());
        let used: HashSet<&str> = group.iter().map(|d| d.display_name.as_str()).collect();
        let sequence = group.len() as i32;

        DuplicateResolution {
            is_duplicate: true,
            display_name: disambiguate(&canonical, sequence, &used),
            sequence,
            original_document_id: original.map(|d| d.id),
            warning: None,
        }
    }
}

/// Produce `canonical (N).ext`, probing forward when a candidate name is
/// already taken in the group (e.g., a user manually uploaded a file
/// already named that way).
fn disambiguate(canonical: &str, sequence: i32, used: &HashSet<&str>) -> String {
    let mut n = sequence;
    loop {
        let candidate = numbered_name(canonical, n);
        if !used.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Insert ` (N)` before the extension of `name`.
fn numbered_name(name: &str, n: i32) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &name[..dot], n, &name[dot..]),
        _ => format!("{name} ({n})"),
    }
}

/// A display name for degraded mode: a fresh suffix so the record is
/// recognizable as an ungrouped copy.
fn fallback_name(name: &str) -> String {
    let tag = &Uuid::new_v4().simple().to_string()[..8];
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], tag, &name[dot..]),
        _ => format!("{name}-{tag}"),
    }
}
