use thiserror::Error;

use keywire_core::Net;

use crate::resolve::PinGroupId;

/// Problems with the supplied matrix, cables or keys. Detected before any
/// optimization starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("key \"{key}\" has no row/column assignment in the matrix")]
    MissingNetAssignment { key: String },

    #[error("matrix refers to unknown key \"{key}\"")]
    UnknownKey { key: String },

    #[error("key \"{key}\" appears in the matrix twice ({first} and {second})")]
    DuplicateMatrixCell {
        key: String,
        first: String,
        second: String,
    },

    #[error("{net_type} net \"{net}\" of key \"{key}\" does not map to a pin of any cable")]
    UnresolvedNet {
        key: String,
        net: String,
        net_type: Net,
    },

    #[error("key \"{key}\" has index {index} but is at position {position}")]
    KeyIndexMismatch {
        key: String,
        index: usize,
        position: usize,
    },

    #[error("turning radius must be a positive number, got {radius}")]
    InvalidTurningRadius { radius: f64 },

    #[error(transparent)]
    Cable(#[from] keywire_core::Error),
}

/// Invariant violations inside the optimizer. These indicate a defect, not a
/// user mistake.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InternalError {
    #[error("solver found no feasible route for {group}")]
    NoFeasibleSolution { group: GroupLabel },

    #[error("route for {group} does not form a single chain from the cable: {reason}")]
    BrokenChain { group: GroupLabel, reason: String },

    #[error("route for {group} violates the model: {reason}")]
    InfeasibleAssignment { group: GroupLabel, reason: String },

    #[error("failed to start solver threads: {0}")]
    ThreadPool(String),
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("internal routing error: {0}")]
    Internal(#[from] InternalError),
}

impl From<keywire_core::Error> for RouteError {
    fn from(e: keywire_core::Error) -> Self {
        RouteError::Config(ConfigError::Cable(e))
    }
}

/// Human readable pin-group name used in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLabel(pub PinGroupId);

impl std::fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pin {} of cable {}",
            self.0.net,
            self.0.pin + 1,
            self.0.placement
        )
    }
}
