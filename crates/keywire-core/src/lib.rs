//! Core data model shared by the routing, keymap and rendering crates.

pub mod cable;
pub mod error;
pub mod key;
pub mod mainboard;
pub mod net;
pub mod pose;

pub use cable::{Entry, FlatCable, FlatCablePlacement, PinRef, WireGroup, DEFAULT_WIRE_PITCH};
pub use error::Error;
pub use key::{Key, TerminalGeometry, TerminalPair};
pub use mainboard::Mainboard;
pub use net::{Net, SwitchOrientation, TerminalDirection};
pub use pose::{normalize_angle, Pose};
