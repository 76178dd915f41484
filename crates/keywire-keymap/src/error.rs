use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KeymapError {
    #[error("key \"{key}\" is at row {row}, col {col}, outside the {rows}x{cols} matrix")]
    OutOfRange {
        key: String,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("keys \"{first}\" and \"{second}\" both occupy row {row}, col {col}")]
    CellConflict {
        row: usize,
        col: usize,
        first: String,
        second: String,
    },

    #[error("layout must be a JSON array of rows")]
    InvalidLayout,

    #[error("layout key #{index} has no routed key")]
    LayoutKeyMissing { index: usize },

    #[error("failed to serialize keymap: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for KeymapError {
    fn from(e: serde_json::Error) -> Self {
        KeymapError::Serialize(e.to_string())
    }
}
