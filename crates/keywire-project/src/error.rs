use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse project: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse KLE layout: {0}")]
    Kle(String),

    #[error("key \"{key}\" uses part \"{part}\", which has no terminal geometry")]
    MissingTerminals { key: String, part: String },

    #[error("key \"{key}\" names no part and the project has no default_part")]
    NoPart { key: String },

    #[error("placement {placement} refers to cable {cable}, but the mainboard has {count}")]
    UnknownCable {
        placement: usize,
        cable: usize,
        count: usize,
    },

    #[error("project must give exactly one of \"keys\" and \"kle\"")]
    KeySource,

    #[error("duplicate key id \"{key}\"")]
    DuplicateKey { key: String },

    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error(transparent)]
    Board(#[from] keywire_core::Error),
}
