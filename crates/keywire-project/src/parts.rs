//! Terminal geometry of switch footprints, as written in project files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use keywire_core::{Pose, TerminalGeometry, TerminalPair};

/// A solder point relative to the switch centre: centimetres and degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TerminalSpec {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
}

impl TerminalSpec {
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.angle.to_radians())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TerminalPairSpec {
    pub left: TerminalSpec,
    pub right: TerminalSpec,
}

impl TerminalPairSpec {
    fn pair(&self) -> TerminalPair {
        TerminalPair {
            left: self.left.pose(),
            right: self.right.pose(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PartSpec {
    pub row: TerminalPairSpec,
    pub col: TerminalPairSpec,
}

impl PartSpec {
    #[must_use]
    pub fn geometry(&self) -> TerminalGeometry {
        TerminalGeometry {
            row: self.row.pair(),
            col: self.col.pair(),
        }
    }
}

/// Parts by name, in file order.
pub type PartLibrary = IndexMap<String, PartSpec>;
