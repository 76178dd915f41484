use thiserror::Error;

use crate::Net;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("wire name \"{wire}\" lacks a trailing number")]
    MalformedWireName { wire: String },

    #[error("wire group {start}..{end} ({net}) does not fit a cable of {n_wire} wires")]
    MalformedWireGroup {
        start: usize,
        end: usize,
        net: Net,
        n_wire: usize,
    },

    #[error("cable pin pitch must be positive, got {pitch}")]
    InvalidPitch { pitch: f64 },

    #[error("unknown mainboard \"{name}\" (known: {known})")]
    UnknownMainboard { name: String, known: String },
}
