//! Per pin-group optimization: cost matrix, integer program, solve, and
//! reconstruction of the visiting order and wire polylines.

use rayon::ThreadPool;
use std::time::Duration;
use tracing::{debug, warn};

use keywire_core::{Entry, Key, Net, TerminalDirection};

use crate::distance::{DistanceMatrix, Terminal};
use crate::dubins::DubinsPlanner;
use crate::error::{GroupLabel, InternalError};
use crate::model::RouteModel;
use crate::resolve::{terminal_pose, Approach, PinGroupId};
use crate::solver::{solve, SolveStatus};

/// One key on a wire: the terminal the wire arrives at. It leaves through
/// the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Index into the run's key list.
    pub key: usize,
    pub enter: TerminalDirection,
}

impl Visit {
    #[must_use]
    pub fn exit(&self) -> TerminalDirection {
        self.enter.opposite()
    }
}

/// Solved route of one pin-group.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAssignment {
    pub group: PinGroupId,
    pub entry: Entry,
    pub visits: Vec<Visit>,
    /// `legs[0]` runs from the cable entry to the first key, `legs[i]` from
    /// key `i - 1` to key `i`.
    pub legs: Vec<Vec<[f64; 2]>>,
    pub length: f64,
    /// `false` when the time budget expired before the search finished.
    pub optimal: bool,
}

pub struct RouteOptimizer<'p> {
    planner: DubinsPlanner,
    pool: &'p ThreadPool,
    time_limit: Duration,
    polyline_step: f64,
}

impl<'p> RouteOptimizer<'p> {
    #[must_use]
    pub fn new(
        planner: DubinsPlanner,
        pool: &'p ThreadPool,
        time_limit: Duration,
        polyline_step: f64,
    ) -> Self {
        Self {
            planner,
            pool,
            time_limit,
            polyline_step,
        }
    }

    /// Route the wire of `group` through `members` (indices into `keys`).
    ///
    /// Returns `Ok(None)` for an empty group; no model is built.
    pub fn optimize(
        &self,
        group: PinGroupId,
        entry: &Entry,
        keys: &[Key],
        members: &[usize],
    ) -> Result<Option<RouteAssignment>, InternalError> {
        if members.is_empty() {
            return Ok(None);
        }
        let label = GroupLabel(group);
        let local: Vec<&Key> = members.iter().map(|&i| &keys[i]).collect();
        let dist = DistanceMatrix::build(&local, group.net, entry, &self.planner);
        let model = RouteModel::new(&dist);
        let outcome = solve(&model, self.pool, self.time_limit);
        let Some(incumbent) = outcome.incumbent else {
            return Err(InternalError::NoFeasibleSolution { group: label });
        };
        debug!(
            "{label}: {} keys, length {:.3}, {} nodes, {:?}",
            members.len(),
            incumbent.cost,
            outcome.nodes,
            outcome.status
        );
        if outcome.status == SolveStatus::TimeLimit {
            warn!("{label}: time budget expired, keeping best route found");
        }

        let assignment = model
            .encode(&incumbent.sequence)
            .map_err(|reason| InternalError::InfeasibleAssignment {
                group: label,
                reason,
            })?;
        model
            .check(&assignment)
            .map_err(|reason| InternalError::InfeasibleAssignment {
                group: label,
                reason,
            })?;
        let sequence = model
            .decode(&assignment)
            .map_err(|reason| InternalError::BrokenChain {
                group: label,
                reason,
            })?;
        verify_chain(&sequence, members.len()).map_err(|reason| InternalError::BrokenChain {
            group: label,
            reason,
        })?;

        let legs = self.realize(&local, group.net, entry, &sequence);
        let visits = sequence
            .iter()
            .map(|&(k, d)| Visit {
                key: members[k],
                enter: d,
            })
            .collect();
        Ok(Some(RouteAssignment {
            group,
            entry: *entry,
            visits,
            legs,
            length: model.objective(&assignment),
            optimal: outcome.status == SolveStatus::Optimal,
        }))
    }

    fn realize(
        &self,
        keys: &[&Key],
        net: Net,
        entry: &Entry,
        sequence: &[Terminal],
    ) -> Vec<Vec<[f64; 2]>> {
        let mut from = entry.pose;
        let mut legs = Vec::with_capacity(sequence.len());
        for &(k, d) in sequence {
            let to = terminal_pose(keys[k], net, d, Approach::Entering);
            legs.push(self.planner.plan(&from, &to, self.polyline_step).1);
            from = terminal_pose(keys[k], net, d.opposite(), Approach::Leaving);
        }
        legs
    }
}

/// The decoded chain must visit each of the `n` keys exactly once.
fn verify_chain(sequence: &[Terminal], n: usize) -> Result<(), String> {
    if sequence.len() != n {
        return Err(format!("visits {} keys, expected {n}", sequence.len()));
    }
    let mut seen = vec![false; n];
    for &(k, _) in sequence {
        match seen.get_mut(k) {
            Some(s) if !*s => *s = true,
            Some(_) => return Err(format!("key {k} visited twice")),
            None => return Err(format!("key {k} out of range")),
        }
    }
    Ok(())
}
