//! Complete asymmetric cost matrix of one pin-group.

use keywire_core::{Entry, Key, Net, TerminalDirection};

use crate::dubins::DubinsPlanner;
use crate::resolve::{terminal_pose, Approach};

/// A key terminal inside one pin-group: local key index plus direction.
pub type Terminal = (usize, TerminalDirection);

pub(crate) fn slot((key, dir): Terminal) -> usize {
    key * 2 + dir.index()
}

/// `between[(a, b)]` is the cost of a wire leaving terminal `a` and arriving
/// at terminal `b`; `from_start[b]` is the cost from the cable entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    from_start: Vec<f64>,
    between: Vec<f64>,
}

impl DistanceMatrix {
    /// Evaluate the path metric for every ordered terminal pair of `keys`.
    #[must_use]
    pub fn build(keys: &[&Key], net: Net, entry: &Entry, planner: &DubinsPlanner) -> Self {
        Self::from_fn(
            keys.len(),
            |(k, d)| planner.length(&entry.pose, &terminal_pose(keys[k], net, d, Approach::Entering)),
            |(k1, d1), (k2, d2)| {
                planner.length(
                    &terminal_pose(keys[k1], net, d1, Approach::Leaving),
                    &terminal_pose(keys[k2], net, d2, Approach::Entering),
                )
            },
        )
    }

    /// Build from arbitrary cost functions. Pairs on the same key are never
    /// queried and are stored as infinity.
    pub fn from_fn<S, B>(n: usize, mut start: S, mut between: B) -> Self
    where
        S: FnMut(Terminal) -> f64,
        B: FnMut(Terminal, Terminal) -> f64,
    {
        let terminals: Vec<Terminal> = (0..n)
            .flat_map(|k| TerminalDirection::ALL.map(|d| (k, d)))
            .collect();
        let from_start = terminals.iter().map(|&t| start(t)).collect();
        let mut costs = vec![f64::INFINITY; terminals.len() * terminals.len()];
        for &a in &terminals {
            for &b in &terminals {
                if a.0 != b.0 {
                    costs[slot(a) * terminals.len() + slot(b)] = between(a, b);
                }
            }
        }
        Self {
            n,
            from_start,
            between: costs,
        }
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[must_use]
    pub fn from_start(&self, to: Terminal) -> f64 {
        self.from_start[slot(to)]
    }

    #[must_use]
    pub fn between(&self, from: Terminal, to: Terminal) -> f64 {
        self.between[slot(from) * 2 * self.n + slot(to)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use keywire_core::{Pose, TerminalGeometry, TerminalPair};
    use std::f64::consts::PI;

    fn key(index: usize, x: f64) -> Key {
        let pair = TerminalPair {
            left: Pose::new(-0.5, 0.0, 0.0),
            right: Pose::new(0.5, 0.0, 0.0),
        };
        Key {
            id: format!("k{index}"),
            index,
            pose: Pose::new(x, 0.0, 0.0),
            orientation: Default::default(),
            terminals: TerminalGeometry { row: pair, col: pair },
            code: None,
            layout_index: index,
        }
    }

    #[test]
    fn straight_chain_costs() {
        let a = key(0, 1.0);
        let b = key(1, 3.0);
        let entry = Entry {
            pose: Pose::new(0.0, 0.0, 0.0),
            pin: 0,
            logical: 0,
        };
        let planner = DubinsPlanner::new(0.1);
        let m = DistanceMatrix::build(&[&a, &b], Net::Row, &entry, &planner);
        assert_eq!(m.len(), 2);
        assert_abs_diff_eq!(
            m.from_start((0, TerminalDirection::Left)),
            0.5,
            epsilon = 1e-9
        );
        // Leaving poses are turned around, so continuing straight on from the
        // right terminal of `a` needs a U-turn.
        let uturn = m.between((0, TerminalDirection::Right), (1, TerminalDirection::Left));
        assert!(uturn > 1.0 + PI * 0.1 - 1e-9);
        assert!(m.between((0, TerminalDirection::Left), (0, TerminalDirection::Right)).is_infinite());
    }

    #[test]
    fn from_fn_is_asymmetric() {
        let m = DistanceMatrix::from_fn(2, |_| 1.0, |a, b| (slot(a) * 10 + slot(b)) as f64);
        let l0 = (0, TerminalDirection::Left);
        let r1 = (1, TerminalDirection::Right);
        assert_eq!(m.between(l0, r1), 3.0);
        assert_eq!(m.between(r1, l0), 30.0);
    }
}
