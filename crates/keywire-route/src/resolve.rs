//! Cable entries, terminal poses and pin-group assignment.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use keywire_core::{Entry, FlatCablePlacement, Key, Net, PinRef, Pose, TerminalDirection};

use crate::error::ConfigError;

/// `row_name -> col_name -> key_id`.
pub type Matrix = IndexMap<String, IndexMap<String, String>>;

/// Which way a wire passes a solder point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    /// The wire arrives at the terminal.
    Entering,
    /// The wire leaves the terminal; the pose is turned around.
    Leaving,
}

/// Identifies one physical pin of one placed cable for one net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinGroupId {
    pub net: Net,
    pub placement: usize,
    pub pin: usize,
}

/// Where a key's row or column wire lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    pub group: PinGroupId,
    pub logical: usize,
}

/// Matrix position of one key after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAssignment {
    pub key: usize,
    pub row_name: String,
    pub col_name: String,
    pub row: PinAssignment,
    pub col: PinAssignment,
}

impl KeyAssignment {
    #[must_use]
    pub fn net(&self, net: Net) -> &PinAssignment {
        match net {
            Net::Row => &self.row,
            Net::Col => &self.col,
        }
    }

    #[must_use]
    pub fn logical_row(&self) -> usize {
        self.row.logical
    }

    #[must_use]
    pub fn logical_col(&self) -> usize {
        self.col.logical
    }
}

/// Keys grouped by the pin their nets land on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinGroups {
    pub assignments: Vec<KeyAssignment>,
    pub groups: BTreeMap<PinGroupId, Vec<usize>>,
}

/// Entry poses of every pin of `placement` that carries `net`, by pin.
///
/// Pin `i` sits `i * pitch` along the placement angle from the anchor (counted
/// from the far end when flipped). Wires leave at `angle + 90°`, or
/// `angle - 90°` when flipped.
#[must_use]
pub fn entries(placement: &FlatCablePlacement, net: Net) -> BTreeMap<usize, Entry> {
    let cable = &placement.cable;
    let axis = Pose::new(placement.anchor[0], placement.anchor[1], placement.angle);
    let heading = if placement.flip {
        placement.angle - FRAC_PI_2
    } else {
        placement.angle + FRAC_PI_2
    };
    let mut out = BTreeMap::new();
    for g in cable.groups_for(net) {
        for pin in g.start..g.end {
            let slot = if placement.flip {
                cable.n_wire.saturating_sub(1 + pin)
            } else {
                pin
            };
            let at = axis.shifted([slot as f64 * cable.pitch, 0.0]);
            out.insert(
                pin,
                Entry {
                    pose: Pose::new(at.x, at.y, heading),
                    pin,
                    logical: g.logical_start + pin - g.start,
                },
            );
        }
    }
    out
}

/// Absolute pose of a key terminal, oriented for how the wire passes it.
#[must_use]
pub fn terminal_pose(key: &Key, net: Net, dir: TerminalDirection, approach: Approach) -> Pose {
    let pose = key.terminal_pose(net, dir);
    match approach {
        Approach::Entering => pose,
        Approach::Leaving => pose.reversed(),
    }
}

/// First placement whose cable knows `wire_name`, with the resolved pin.
fn find_pin(
    placements: &[FlatCablePlacement],
    wire_name: &str,
    net: Net,
) -> Result<Option<(usize, PinRef)>, ConfigError> {
    for (i, p) in placements.iter().enumerate() {
        if let Some(pin) = p.cable.resolve_wire(wire_name, net)? {
            return Ok(Some((i, pin)));
        }
    }
    Ok(None)
}

fn assign_net(
    placements: &[FlatCablePlacement],
    key: &Key,
    net: Net,
    wire_name: &str,
) -> Result<PinAssignment, ConfigError> {
    let (placement, pin) =
        find_pin(placements, wire_name, net)?.ok_or_else(|| ConfigError::UnresolvedNet {
            key: key.id.clone(),
            net: wire_name.to_string(),
            net_type: net,
        })?;
    Ok(PinAssignment {
        group: PinGroupId {
            net,
            placement,
            pin: pin.pin,
        },
        logical: pin.logical,
    })
}

/// Assign every key to its row and column pin-groups.
///
/// Fails before any optimization when a key is missing from the matrix, the
/// matrix names an unknown key, or a net name does not land on any cable.
pub fn resolve_pin_groups(
    matrix: &Matrix,
    keys: &[Key],
    placements: &[FlatCablePlacement],
) -> Result<PinGroups, ConfigError> {
    for p in placements {
        p.cable.validate()?;
    }

    let by_id: FxHashMap<&str, usize> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k.id.as_str(), i))
        .collect();
    let mut cells: Vec<Option<(&str, &str)>> = vec![None; keys.len()];
    for (row_name, cols) in matrix {
        for (col_name, key_id) in cols {
            let Some(&i) = by_id.get(key_id.as_str()) else {
                return Err(ConfigError::UnknownKey {
                    key: key_id.clone(),
                });
            };
            if let Some((r, c)) = cells[i] {
                return Err(ConfigError::DuplicateMatrixCell {
                    key: key_id.clone(),
                    first: format!("{r}/{c}"),
                    second: format!("{row_name}/{col_name}"),
                });
            }
            cells[i] = Some((row_name.as_str(), col_name.as_str()));
        }
    }

    let mut out = PinGroups::default();
    for (i, key) in keys.iter().enumerate() {
        let Some((row_name, col_name)) = cells[i] else {
            return Err(ConfigError::MissingNetAssignment {
                key: key.id.clone(),
            });
        };
        let row = assign_net(placements, key, Net::Row, row_name)?;
        let col = assign_net(placements, key, Net::Col, col_name)?;
        for a in [row, col] {
            out.groups.entry(a.group).or_default().push(i);
        }
        out.assignments.push(KeyAssignment {
            key: i,
            row_name: row_name.to_string(),
            col_name: col_name.to_string(),
            row,
            col,
        });
    }
    Ok(out)
}
