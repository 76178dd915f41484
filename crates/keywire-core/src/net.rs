use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

/// The two halves of the key matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Net {
    Row,
    Col,
}

impl Net {
    pub const ALL: [Net; 2] = [Net::Row, Net::Col];

    #[must_use]
    pub fn other(self) -> Net {
        match self {
            Net::Row => Net::Col,
            Net::Col => Net::Row,
        }
    }
}

impl fmt::Display for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Net::Row => f.write_str("row"),
            Net::Col => f.write_str("col"),
        }
    }
}

/// Which of a key's two solder points a wire uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TerminalDirection {
    Left,
    Right,
}

impl TerminalDirection {
    pub const ALL: [TerminalDirection; 2] = [TerminalDirection::Left, TerminalDirection::Right];

    #[must_use]
    pub fn opposite(self) -> TerminalDirection {
        match self {
            TerminalDirection::Left => TerminalDirection::Right,
            TerminalDirection::Right => TerminalDirection::Left,
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            TerminalDirection::Left => 0,
            TerminalDirection::Right => 1,
        }
    }
}

/// Rotation of the switch inside its key footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchOrientation {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

impl SwitchOrientation {
    /// Extra heading (radians) the orientation adds to the key heading.
    #[must_use]
    pub fn angle(self) -> f64 {
        match self {
            SwitchOrientation::Front => 0.0,
            SwitchOrientation::Back => PI,
            SwitchOrientation::Left => -FRAC_PI_2,
            SwitchOrientation::Right => FRAC_PI_2,
        }
    }
}
