//! External mirror configuration.

use serde::{Deserialize, Serialize};

/// Configuration for mirroring documents into the external
/// document-collaboration service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Whether mirroring is attempted at all.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the collaboration service API.
    #[serde(default)]
    pub base_url: String,
    /// Static bearer token (token refresh is owned by an external manager;
    /// this value is only a fallback for simple deployments).
    #[serde(default)]
    pub api_token: String,
    /// Shared team folder tried first for placement.
    #[serde(default)]
    pub shared_folder_id: Option<String>,
    /// Configured parent folder under which per-owner subfolders are
    /// provisioned on first use.
    #[serde(default)]
    pub parent_folder_id: Option<String>,
    /// Folder name used for the client-owned fallback placement.
    #[serde(default = "default_owned_folder_name")]
    pub owned_folder_name: String,
    /// Recipient granted access after upload (None = skip sharing).
    #[serde(default)]
    pub share_with: Option<String>,
    /// Role granted to the share recipient.
    #[serde(default = "default_share_role")]
    pub share_role: String,
    /// Whether to convert uploads into the service's native editable format.
    #[serde(default = "default_true")]
    pub convert_to_native: bool,
    /// Per-request timeout for remote API calls.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Transient-error retries within a single placement strategy.
    #[serde(default = "default_transient_retries")]
    pub max_transient_retries: u32,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            api_token: String::new(),
            shared_folder_id: None,
            parent_folder_id: None,
            owned_folder_name: default_owned_folder_name(),
            share_with: None,
            share_role: default_share_role(),
            convert_to_native: default_true(),
            request_timeout_seconds: default_request_timeout(),
            max_transient_retries: default_transient_retries(),
        }
    }
}

fn default_owned_folder_name() -> String {
    "DocVault".to_string()
}

fn default_share_role() -> String {
    "reader".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

fn default_transient_retries() -> u32 {
    2
}
