use thiserror::Error;

/// Failures while resolving network resources at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no network found with Name tag '{name}'")]
    NetworkNotFound { name: String },

    #[error("no security group named '{group_name}' in network '{network_id}'")]
    AccessGroupNotFound {
        network_id: String,
        group_name: String,
    },

    #[error("provider call failed: {0}")]
    Provider(String),
}
