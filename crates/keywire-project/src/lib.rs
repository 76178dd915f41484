//! Project files: mainboard, cable placements, switch parts, matrix and key
//! layout, resolved into the inputs of a routing run.

pub mod cache;
pub mod error;
pub mod kle;
pub mod parts;
pub mod project;

pub use cache::{content_hash, LayoutCache};
pub use error::Error;
pub use kle::{KleKey, KleLayout};
pub use parts::{PartLibrary, PartSpec, TerminalPairSpec, TerminalSpec};
pub use project::{
    KeySpec, KleSource, MainboardSpec, PlacementSpec, Project, ProjectFile, SolveSpec,
    DEFAULT_KEY_PITCH, LED_PART_SUFFIX,
};
