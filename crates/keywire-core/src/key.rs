use serde::{Deserialize, Serialize};

use crate::{Net, Pose, SwitchOrientation, TerminalDirection};

/// Local solder-point poses for one net, relative to the switch frame.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TerminalPair {
    pub left: Pose,
    pub right: Pose,
}

impl TerminalPair {
    #[must_use]
    pub fn get(&self, dir: TerminalDirection) -> &Pose {
        match dir {
            TerminalDirection::Left => &self.left,
            TerminalDirection::Right => &self.right,
        }
    }
}

/// Row and column terminals of one switch footprint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TerminalGeometry {
    pub row: TerminalPair,
    pub col: TerminalPair,
}

impl TerminalGeometry {
    #[must_use]
    pub fn pair(&self, net: Net) -> &TerminalPair {
        match net {
            Net::Row => &self.row,
            Net::Col => &self.col,
        }
    }

    #[must_use]
    pub fn get(&self, net: Net, dir: TerminalDirection) -> &Pose {
        self.pair(net).get(dir)
    }
}

/// One key switch, fixed for the duration of a routing run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Key {
    /// Name used by the matrix to refer to this key.
    pub id: String,
    /// Stable index; equals the key's position in the run's key list.
    pub index: usize,
    pub pose: Pose,
    #[serde(default)]
    pub orientation: SwitchOrientation,
    pub terminals: TerminalGeometry,
    /// Firmware key code, e.g. `KC_A`.
    #[serde(default)]
    pub code: Option<String>,
    /// Position of the key in the source layout, used when echoing the layout back.
    #[serde(default)]
    pub layout_index: usize,
}

impl Key {
    /// Heading of the switch frame: key heading plus switch orientation.
    #[must_use]
    pub fn switch_frame(&self) -> Pose {
        self.pose.turned(self.orientation.angle())
    }

    /// Absolute pose of a solder point.
    #[must_use]
    pub fn terminal_pose(&self, net: Net, dir: TerminalDirection) -> Pose {
        self.switch_frame().compose(self.terminals.get(net, dir))
    }
}
