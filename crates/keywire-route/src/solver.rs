//! Time-boxed parallel branch-and-bound over a [`RouteModel`].
//!
//! The search branches on the next arc of the chain (which key is visited
//! next and through which terminal). A node is pruned when its cost plus the
//! cheapest possible way to enter every remaining key cannot beat the
//! incumbent. Root branches are shared among the workers of the supplied
//! rayon pool; the incumbent is shared and seeded by a greedy chain so a
//! feasible answer exists from the start.

use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use keywire_core::TerminalDirection;

use crate::distance::Terminal;
use crate::model::{RouteModel, Vertex};

const EPS: f64 = 1e-9;
const DEADLINE_CHECK_INTERVAL: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The search space was exhausted; the incumbent is optimal.
    Optimal,
    /// The time budget ran out; the incumbent may be sub-optimal.
    TimeLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    pub sequence: Vec<Terminal>,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub incumbent: Option<Incumbent>,
    pub status: SolveStatus,
    pub nodes: u64,
}

struct Shared {
    best_bits: AtomicU64,
    incumbent: Mutex<Option<Incumbent>>,
    deadline: Instant,
    timed_out: AtomicBool,
    nodes: AtomicU64,
}

impl Shared {
    fn best(&self) -> f64 {
        f64::from_bits(self.best_bits.load(Ordering::Relaxed))
    }

    fn offer(&self, sequence: &[Terminal], cost: f64) {
        let Ok(mut guard) = self.incumbent.lock() else {
            return;
        };
        let better = match guard.as_ref() {
            None => true,
            Some(cur) => {
                cost < cur.cost - EPS
                    || ((cost - cur.cost).abs() <= EPS && sequence < cur.sequence.as_slice())
            }
        };
        if better {
            *guard = Some(Incumbent {
                sequence: sequence.to_vec(),
                cost,
            });
            self.best_bits.fetch_min(cost.to_bits(), Ordering::Relaxed);
        }
    }

    fn out_of_time(&self) -> bool {
        if self.timed_out.load(Ordering::Relaxed) {
            return true;
        }
        if Instant::now() >= self.deadline {
            self.timed_out.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }
}

struct Search<'m, 'a> {
    model: &'m RouteModel<'a>,
    shared: &'m Shared,
    min_in: Vec<f64>,
    sequence: Vec<Terminal>,
    visited: Vec<bool>,
    nodes: u64,
}

impl Search<'_, '_> {
    fn tail(&self) -> Vertex {
        match self.sequence.last() {
            None => Vertex::Start,
            Some(&(k, d)) => Vertex::Terminal(k, d.opposite()),
        }
    }

    fn candidates(&self) -> Vec<(Terminal, f64)> {
        let tail = self.tail();
        let mut out: Vec<(Terminal, f64)> = (0..self.visited.len())
            .filter(|&k| !self.visited[k])
            .flat_map(|k| TerminalDirection::ALL.map(|d| (k, d)))
            .filter_map(|t| self.model.cost(tail, t.into()).map(|c| (t, c)))
            .collect();
        out.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        out
    }

    fn dfs(&mut self, cost: f64, remaining: f64) {
        self.nodes += 1;
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 && self.shared.out_of_time() {
            return;
        }
        if self.sequence.len() == self.visited.len() {
            self.shared.offer(&self.sequence, cost);
            return;
        }
        for ((k, d), c) in self.candidates() {
            let next_cost = cost + c;
            let next_remaining = remaining - self.min_in[k];
            if next_cost + next_remaining > self.shared.best() + EPS {
                continue;
            }
            if self.shared.timed_out.load(Ordering::Relaxed) {
                return;
            }
            self.visited[k] = true;
            self.sequence.push((k, d));
            self.dfs(next_cost, next_remaining);
            self.sequence.pop();
            self.visited[k] = false;
        }
    }
}

/// Cheapest way into each key from anywhere.
fn min_incoming(model: &RouteModel<'_>) -> Vec<f64> {
    let mut min_in = vec![f64::INFINITY; model.num_keys()];
    for arc in model.arcs() {
        if let Some(k) = arc.head.key() {
            min_in[k] = min_in[k].min(arc.cost);
        }
    }
    min_in
}

/// Nearest-neighbour chain used to seed the incumbent.
fn greedy(model: &RouteModel<'_>) -> Option<Incumbent> {
    let n = model.num_keys();
    let mut visited = vec![false; n];
    let mut sequence = Vec::with_capacity(n);
    let mut cost = 0.0;
    let mut tail = Vertex::Start;
    for _ in 0..n {
        let (t, c) = (0..n)
            .filter(|&k| !visited[k])
            .flat_map(|k| TerminalDirection::ALL.map(|d| (k, d)))
            .filter_map(|t| model.cost(tail, t.into()).map(|c| (t, c)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        visited[t.0] = true;
        sequence.push(t);
        cost += c;
        tail = Vertex::Terminal(t.0, t.1.opposite());
    }
    Some(Incumbent { sequence, cost })
}

/// Solve `model` within `time_limit` on `pool`.
#[must_use]
pub fn solve(model: &RouteModel<'_>, pool: &ThreadPool, time_limit: Duration) -> SolveOutcome {
    let n = model.num_keys();
    let shared = Shared {
        best_bits: AtomicU64::new(f64::INFINITY.to_bits()),
        incumbent: Mutex::new(None),
        deadline: Instant::now() + time_limit,
        timed_out: AtomicBool::new(false),
        nodes: AtomicU64::new(0),
    };
    if let Some(seed) = greedy(model) {
        shared.offer(&seed.sequence, seed.cost);
    }

    let min_in = min_incoming(model);
    let total_min: f64 = min_in.iter().sum();
    let roots: Vec<(Terminal, f64)> = (0..n)
        .flat_map(|k| TerminalDirection::ALL.map(|d| (k, d)))
        .filter_map(|t| model.cost(Vertex::Start, t.into()).map(|c| (t, c)))
        .collect();

    pool.install(|| {
        roots.par_iter().for_each(|&((k, d), c)| {
            if shared.out_of_time() {
                return;
            }
            let remaining = total_min - min_in[k];
            if c + remaining > shared.best() + EPS {
                return;
            }
            let mut search = Search {
                model,
                shared: &shared,
                min_in: min_in.clone(),
                sequence: vec![(k, d)],
                visited: (0..n).map(|i| i == k).collect(),
                nodes: 0,
            };
            search.dfs(c, remaining);
            shared.nodes.fetch_add(search.nodes, Ordering::Relaxed);
        });
    });

    let status = if shared.timed_out.load(Ordering::Relaxed) {
        SolveStatus::TimeLimit
    } else {
        SolveStatus::Optimal
    };
    let nodes = shared.nodes.load(Ordering::Relaxed);
    let incumbent = shared.incumbent.into_inner().ok().flatten();
    SolveOutcome {
        incumbent,
        status,
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use TerminalDirection::{Left, Right};

    fn pool(threads: usize) -> ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
    }

    /// Keys on a line at x = 1, 2, ...; entering through Left and leaving
    /// through Right is free apart from the gap.
    fn line(n: usize) -> DistanceMatrix {
        let x = |k: usize| (k + 1) as f64;
        let penalty = |d: TerminalDirection| if d == Left { 0.0 } else { 5.0 };
        DistanceMatrix::from_fn(
            n,
            |(k, d)| x(k) + penalty(d),
            |(k1, _), (k2, d2)| (x(k2) - x(k1)).abs() + penalty(d2),
        )
    }

    #[test]
    fn single_key_picks_cheaper_terminal() {
        let dist = DistanceMatrix::from_fn(1, |(_, d)| if d == Left { 4.0 } else { 2.5 }, |_, _| 0.0);
        let model = RouteModel::new(&dist);
        let out = solve(&model, &pool(1), Duration::from_secs(5));
        let inc = out.incumbent.unwrap();
        assert_eq!(inc.sequence, vec![(0, Right)]);
        assert_eq!(inc.cost, 2.5);
        assert_eq!(out.status, SolveStatus::Optimal);
    }

    #[test]
    fn line_is_visited_in_order() {
        let dist = line(6);
        let model = RouteModel::new(&dist);
        let out = solve(&model, &pool(4), Duration::from_secs(5));
        let inc = out.incumbent.unwrap();
        let expected: Vec<Terminal> = (0..6).map(|k| (k, Left)).collect();
        assert_eq!(inc.sequence, expected);
        assert!((inc.cost - 6.0).abs() < 1e-9);
        assert_eq!(out.status, SolveStatus::Optimal);
    }

    #[test]
    fn beats_greedy_when_greedy_is_wrong() {
        // Greedy goes to key 0 first (cost 1) and then pays 10 to reach key 1;
        // visiting key 1 first costs 2 + 2.
        let dist = DistanceMatrix::from_fn(
            2,
            |(k, _)| if k == 0 { 1.0 } else { 2.0 },
            |(k1, _), _| if k1 == 0 { 10.0 } else { 2.0 },
        );
        let model = RouteModel::new(&dist);
        let seed = greedy(&model).unwrap();
        assert_eq!(seed.cost, 11.0);
        let out = solve(&model, &pool(2), Duration::from_secs(5));
        let inc = out.incumbent.unwrap();
        assert_eq!(inc.cost, 4.0);
        assert_eq!(inc.sequence[0].0, 1);
    }

    #[test]
    fn equal_cost_tie_goes_to_the_smaller_sequence() {
        // Greedy takes key 1 first (1 + 2); key 0 first costs 2 + 1 as well.
        let dist = DistanceMatrix::from_fn(
            2,
            |(k, _)| if k == 0 { 2.0 } else { 1.0 },
            |(k1, _), _| if k1 == 0 { 1.0 } else { 2.0 },
        );
        let model = RouteModel::new(&dist);
        assert_eq!(greedy(&model).unwrap().sequence, vec![(1, Left), (0, Left)]);
        for threads in [1, 4] {
            let out = solve(&model, &pool(threads), Duration::from_secs(5));
            let inc = out.incumbent.unwrap();
            assert_eq!(inc.sequence, vec![(0, Left), (1, Left)]);
            assert_eq!(inc.cost, 3.0);
            assert_eq!(out.status, SolveStatus::Optimal);
        }
    }

    #[test]
    fn zero_budget_still_returns_the_seed() {
        let dist = line(4);
        let model = RouteModel::new(&dist);
        let out = solve(&model, &pool(1), Duration::ZERO);
        assert!(out.incumbent.is_some());
        assert_eq!(out.status, SolveStatus::TimeLimit);
    }

    #[test]
    fn empty_model_has_empty_incumbent() {
        let dist = DistanceMatrix::from_fn(0, |_| 0.0, |_, _| 0.0);
        let model = RouteModel::new(&dist);
        let out = solve(&model, &pool(1), Duration::from_secs(1));
        assert_eq!(out.incumbent.unwrap().sequence, Vec::<Terminal>::new());
    }
}
