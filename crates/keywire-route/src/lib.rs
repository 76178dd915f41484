//! Wire routing for hand-wired keyboards.
//!
//! Every physical pin of a flat cable carries one row or column net to a set
//! of keys. For each such pin-group the wire is threaded from the cable entry
//! through every key, entering at one solder terminal and leaving at the
//! other, along the shortest chain of bounded-curvature (Dubins) paths.

pub mod distance;
pub mod dubins;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod resolve;
pub mod solver;

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use keywire_core::{Entry, FlatCablePlacement, Key, Net};

pub use distance::{DistanceMatrix, Terminal};
pub use dubins::{plan, DubinsPath, DubinsPlanner, PathType};
pub use error::{ConfigError, GroupLabel, InternalError, RouteError};
pub use model::{RouteModel, Vertex};
pub use optimizer::{RouteAssignment, RouteOptimizer, Visit};
pub use resolve::{
    entries, resolve_pin_groups, terminal_pose, Approach, KeyAssignment, Matrix, PinAssignment,
    PinGroupId, PinGroups,
};
pub use solver::{solve, SolveOutcome, SolveStatus};

/// Minimum bend radius of the stock ribbon wire, in centimetres.
pub const DEFAULT_TURNING_RADIUS: f64 = 0.2;

/// Knobs of one routing run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOptions {
    /// Wall-clock budget per pin-group.
    pub time_limit: Duration,
    /// Worker threads of the branch-and-bound search.
    pub threads: usize,
    pub turning_radius: f64,
    /// Spacing of sampled polyline points.
    pub polyline_step: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(5),
            threads: 4,
            turning_radius: DEFAULT_TURNING_RADIUS,
            polyline_step: 0.02,
        }
    }
}

/// Everything a routing run reads.
#[derive(Debug, Clone, Copy)]
pub struct RouteInput<'a> {
    pub matrix: &'a Matrix,
    pub placements: &'a [FlatCablePlacement],
    pub keys: &'a [Key],
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub keys: Vec<Key>,
    /// Row/column assignment of each key, in key order.
    pub assignments: Vec<KeyAssignment>,
    /// Entry of every pin, by `(net, placement)` then pin.
    pub entries: BTreeMap<(Net, usize), BTreeMap<usize, Entry>>,
    pub routes: BTreeMap<PinGroupId, RouteAssignment>,
}

impl RouteResult {
    /// Routes of one net, in pin order.
    pub fn routes_for(&self, net: Net) -> impl Iterator<Item = &RouteAssignment> {
        self.routes.values().filter(move |r| r.group.net == net)
    }

    /// Total wire length of all routes.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.routes.values().map(|r| r.length).sum()
    }
}

/// Pin-groups and cable entries of a run, resolved but not yet optimized.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub pin_groups: PinGroups,
    /// Entry of every pin, by `(net, placement)` then pin.
    pub entries: BTreeMap<(Net, usize), BTreeMap<usize, Entry>>,
}

impl RoutePlan {
    /// Number of wires that will be routed.
    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.pin_groups.groups.len()
    }
}

/// Route every pin-group of `input`. All-or-nothing: any error aborts the run.
pub fn generate_route(
    input: &RouteInput<'_>,
    options: &SolveOptions,
) -> Result<RouteResult, RouteError> {
    let plan = resolve_route(input, options)?;
    optimize_route(input, plan, options)
}

/// Validate `input` and `options`, then resolve every key's pins and every
/// pin's cable entry.
pub fn resolve_route(input: &RouteInput<'_>, options: &SolveOptions) -> Result<RoutePlan, RouteError> {
    if !(options.turning_radius.is_finite() && options.turning_radius > 0.0) {
        return Err(ConfigError::InvalidTurningRadius {
            radius: options.turning_radius,
        }
        .into());
    }
    for (position, key) in input.keys.iter().enumerate() {
        if key.index != position {
            return Err(ConfigError::KeyIndexMismatch {
                key: key.id.clone(),
                index: key.index,
                position,
            }
            .into());
        }
    }

    let pin_groups = resolve_pin_groups(input.matrix, input.keys, input.placements)?;
    let entries = input
        .placements
        .iter()
        .enumerate()
        .flat_map(|(i, p)| Net::ALL.map(|net| ((net, i), resolve::entries(p, net))))
        .collect();
    info!(
        "routing {} keys over {} pin-groups",
        input.keys.len(),
        pin_groups.groups.len()
    );
    Ok(RoutePlan {
        pin_groups,
        entries,
    })
}

/// Solve every pin-group of a plan made by [`resolve_route`] for the same
/// `input`.
pub fn optimize_route(
    input: &RouteInput<'_>,
    plan: RoutePlan,
    options: &SolveOptions,
) -> Result<RouteResult, RouteError> {
    let RoutePlan {
        pin_groups,
        entries,
    } = plan;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.max(1))
        .build()
        .map_err(|e| InternalError::ThreadPool(e.to_string()))?;
    let optimizer = RouteOptimizer::new(
        DubinsPlanner::new(options.turning_radius),
        &pool,
        options.time_limit,
        options.polyline_step,
    );

    let mut routes = BTreeMap::new();
    for (&group, members) in &pin_groups.groups {
        let Some(entry) = entries
            .get(&(group.net, group.placement))
            .and_then(|e| e.get(&group.pin))
        else {
            return Err(InternalError::BrokenChain {
                group: GroupLabel(group),
                reason: "pin has no cable entry".to_string(),
            }
            .into());
        };
        debug!("optimizing {} ({} keys)", GroupLabel(group), members.len());
        if let Some(route) = optimizer.optimize(group, entry, input.keys, members)? {
            routes.insert(group, route);
        }
    }

    let result = RouteResult {
        keys: input.keys.to_vec(),
        assignments: pin_groups.assignments,
        entries,
        routes,
    };
    info!(
        "routed {} wires, total length {:.2} cm",
        result.routes.len(),
        result.total_length()
    );
    Ok(result)
}
