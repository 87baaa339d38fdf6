//! Remote placement strategies.
//!
//! The fallback order is a first-class value: an ordered list of
//! strategies, each of which resolves the parent folder an upload should
//! land in. The client walks the list with a clear stop condition instead
//! of burying the order in nested error handling.

use std::fmt;

use uuid::Uuid;

use docvault_core::config::mirror::MirrorConfig;

use crate::api::{RemoteDocService, RemoteError};

/// One way of choosing where an upload lands in the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementStrategy {
    /// A shared team folder, used as-is.
    SharedFolder {
        /// Remote folder identifier.
        folder_id: String,
    },
    /// A configured parent folder with a per-owner subfolder provisioned
    /// on first use.
    OwnerSubfolder {
        /// Remote identifier of the configured parent.
        parent_id: String,
    },
    /// A folder owned by the client itself, created on first use.
    OwnedFolder {
        /// Folder name to find or create at the service root.
        name: String,
    },
    /// Unparented placement at the service root.
    Root,
}

impl PlacementStrategy {
    /// Build the configured fallback order.
    pub fn ordered_from_config(config: &MirrorConfig) -> Vec<Self> {
        let mut strategies = Vec::new();
        if let Some(folder_id) = &config.shared_folder_id {
            strategies.push(Self::SharedFolder {
                folder_id: folder_id.clone(),
            });
        }
        if let Some(parent_id) = &config.parent_folder_id {
            strategies.push(Self::OwnerSubfolder {
                parent_id: parent_id.clone(),
            });
        }
        strategies.push(Self::OwnedFolder {
            name: config.owned_folder_name.clone(),
        });
        strategies.push(Self::Root);
        strategies
    }

    /// Resolve the parent folder this strategy places uploads under.
    ///
    /// Returns `None` for unparented root placement.
    pub async fn resolve_parent(
        &self,
        api: &dyn RemoteDocService,
        owner_id: Uuid,
    ) -> Result<Option<String>, RemoteError> {
        match self {
            Self::SharedFolder { folder_id } => Ok(Some(folder_id.clone())),
            Self::OwnerSubfolder { parent_id } => {
                let subfolder = api
                    .ensure_folder(&owner_id.to_string(), Some(parent_id))
                    .await?;
                Ok(Some(subfolder))
            }
            Self::OwnedFolder { name } => {
                let folder = api.ensure_folder(name, None).await?;
                Ok(Some(folder))
            }
            Self::Root => Ok(None),
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedFolder { folder_id } => write!(f, "shared folder {folder_id}"),
            Self::OwnerSubfolder { parent_id } => {
                write!(f, "owner subfolder under {parent_id}")
            }
            Self::OwnedFolder { name } => write!(f, "owned folder '{name}'"),
            Self::Root => write!(f, "service root"),
        }
    }
}
