//! Azimuth Workspace - authorized access to ML workspace resources
//!
//! Turns a credential (any of the three `azimuth-identity` variants) and a
//! (subscription, resource group, name) triple into a [`WorkspaceHandle`],
//! or a typed failure naming the operator remedy:
//!
//! - [`WorkspaceError::AccessDenied`] - the identity lacks access, or the
//!   subscription/resource-group pairing is wrong
//! - [`WorkspaceError::AmbiguousTenant`] - the identity belongs to several
//!   tenants and none was specified
//!
//! ```no_run
//! use std::sync::Arc;
//! use azimuth_identity::ClientSecretCredential;
//! use azimuth_workspace::{WorkspaceParams, acquire_workspace};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = Arc::new(ClientSecretCredential::from_env()?);
//! let params = WorkspaceParams::new("subscription-guid", "my-rg", "my-workspace");
//! let handle = acquire_workspace(credential, &params).await?;
//! println!("{} in {}", handle.name, handle.location);
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]
#![forbid(unsafe_code)]

/// Resource manager client
pub mod client;
/// Error types
pub mod error;
/// Workspace handle model
pub mod handle;
/// Lookup parameters
pub mod params;

use std::sync::Arc;

use azimuth_identity::TokenCredential;

pub use crate::client::{ARM_SCOPE, DEFAULT_ARM_ENDPOINT, WorkspaceClient};
pub use crate::error::{Result, WorkspaceError};
pub use crate::handle::{WorkspaceHandle, WorkspaceProperties};
pub use crate::params::WorkspaceParams;

/// Acquire an authorized handle to a workspace with the given credential.
///
/// Validates `params`, requests a token for the resource manager scope, and
/// performs the lookup. The interactive credential variant may start a
/// device-code sign-in as a side effect of the first call.
pub async fn acquire_workspace(
    credential: Arc<dyn TokenCredential>,
    params: &WorkspaceParams,
) -> Result<WorkspaceHandle> {
    WorkspaceClient::new(credential).get_workspace(params).await
}
