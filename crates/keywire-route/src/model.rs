//! 0/1 integer program of one pin-group.
//!
//! Vertices are the `2N` key terminals plus a synthetic `Start` (the cable
//! entry) and `Goal` (end of chain). `x[i, j]` selects the arc from `i` to `j`
//! for every `i` in terminals + `Start`, `j` in terminals + `Goal`, where `i`
//! and `j` belong to different keys and `(Start, Goal)` is excluded. A
//! terminal as tail means the wire leaves the key there; as head, it enters.
//!
//! Constraints:
//! 1. every terminal has in-degree + out-degree <= 1;
//! 2. exactly one arc leaves `Start`;
//! 3. every key is left exactly once (towards another key or `Goal`);
//! 4. every key is entered exactly once (from `Start` or another key);
//! 5. exactly one arc enters `Goal`;
//! 6. `y[n] - (N + 1) * sum_d x[(n, .), (m, .)] >= y[m] - N` for keys `n != m`.
//!
//! Arcs into `Goal` cost nothing.

use rustc_hash::FxHashMap;

use keywire_core::TerminalDirection;

use crate::distance::{DistanceMatrix, Terminal};

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Vertex {
    Start,
    Terminal(usize, TerminalDirection),
    Goal,
}

impl Vertex {
    #[must_use]
    pub fn key(self) -> Option<usize> {
        match self {
            Vertex::Terminal(k, _) => Some(k),
            Vertex::Start | Vertex::Goal => None,
        }
    }
}

impl From<Terminal> for Vertex {
    fn from((k, d): Terminal) -> Self {
        Vertex::Terminal(k, d)
    }
}

/// One binary decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcVar {
    pub tail: Vertex,
    pub head: Vertex,
    pub cost: f64,
}

/// Values of the `x` and `y` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub x: Vec<bool>,
    pub y: Vec<f64>,
}

#[derive(Debug)]
pub struct RouteModel<'a> {
    dist: &'a DistanceMatrix,
    arcs: Vec<ArcVar>,
    index: FxHashMap<(Vertex, Vertex), usize>,
}

impl<'a> RouteModel<'a> {
    #[must_use]
    pub fn new(dist: &'a DistanceMatrix) -> Self {
        let n = dist.len();
        let terminals: Vec<Vertex> = (0..n)
            .flat_map(|k| TerminalDirection::ALL.map(|d| Vertex::Terminal(k, d)))
            .collect();
        let tails = std::iter::once(Vertex::Start).chain(terminals.iter().copied());
        let mut arcs = Vec::new();
        for tail in tails {
            for head in terminals.iter().copied().chain(std::iter::once(Vertex::Goal)) {
                let same_key = tail.key().is_some() && tail.key() == head.key();
                if same_key || (tail == Vertex::Start && head == Vertex::Goal) {
                    continue;
                }
                let cost = arc_cost(dist, tail, head);
                arcs.push(ArcVar { tail, head, cost });
            }
        }
        let index = arcs
            .iter()
            .enumerate()
            .map(|(i, a)| ((a.tail, a.head), i))
            .collect();
        Self { dist, arcs, index }
    }

    #[must_use]
    pub fn num_keys(&self) -> usize {
        self.dist.len()
    }

    #[must_use]
    pub fn arcs(&self) -> &[ArcVar] {
        &self.arcs
    }

    #[must_use]
    pub fn arc(&self, tail: Vertex, head: Vertex) -> Option<usize> {
        self.index.get(&(tail, head)).copied()
    }

    /// Cost of the arc `tail -> head`, `None` when no such variable exists.
    #[must_use]
    pub fn cost(&self, tail: Vertex, head: Vertex) -> Option<f64> {
        self.arc(tail, head).map(|i| self.arcs[i].cost)
    }

    #[must_use]
    pub fn objective(&self, a: &Assignment) -> f64 {
        self.arcs
            .iter()
            .zip(&a.x)
            .filter(|(_, on)| **on)
            .map(|(arc, _)| arc.cost)
            .sum()
    }

    /// Variable values for a visiting order.
    ///
    /// `sequence[i]` is the terminal through which the `i`-th key is entered;
    /// the wire leaves through the opposite one.
    pub fn encode(&self, sequence: &[Terminal]) -> Result<Assignment, String> {
        let n = self.num_keys();
        let mut x = vec![false; self.arcs.len()];
        let mut y = vec![0.0; n];
        let mut tail = Vertex::Start;
        for (pos, &(k, d)) in sequence.iter().enumerate() {
            if k >= n {
                return Err(format!("key {k} is out of range"));
            }
            let head = Vertex::Terminal(k, d);
            let arc = self
                .arc(tail, head)
                .ok_or_else(|| format!("no arc {tail:?} -> {head:?}"))?;
            x[arc] = true;
            y[k] = (n - pos) as f64;
            tail = Vertex::Terminal(k, d.opposite());
        }
        let arc = self
            .arc(tail, Vertex::Goal)
            .ok_or_else(|| "empty sequence has no arc to the goal".to_string())?;
        x[arc] = true;
        Ok(Assignment { x, y })
    }

    /// Check every constraint family; the error names the first violation.
    pub fn check(&self, a: &Assignment) -> Result<(), String> {
        let n = self.num_keys();
        if a.x.len() != self.arcs.len() || a.y.len() != n {
            return Err("assignment does not match the model".to_string());
        }
        let mut degree: FxHashMap<Vertex, usize> = FxHashMap::default();
        let mut left = vec![0usize; n];
        let mut entered = vec![0usize; n];
        let mut from_start = 0;
        let mut into_goal = 0;
        let mut link = vec![vec![false; n]; n];
        for (arc, _) in self.arcs.iter().zip(&a.x).filter(|(_, on)| **on) {
            *degree.entry(arc.tail).or_default() += 1;
            *degree.entry(arc.head).or_default() += 1;
            match arc.tail {
                Vertex::Start => from_start += 1,
                Vertex::Terminal(k, _) => left[k] += 1,
                Vertex::Goal => {}
            }
            match arc.head {
                Vertex::Goal => into_goal += 1,
                Vertex::Terminal(k, _) => entered[k] += 1,
                Vertex::Start => {}
            }
            if let (Some(t), Some(h)) = (arc.tail.key(), arc.head.key()) {
                link[t][h] = true;
            }
        }
        for (v, d) in &degree {
            if matches!(v, Vertex::Terminal(..)) && *d > 1 {
                return Err(format!("terminal {v:?} is used {d} times"));
            }
        }
        if from_start != 1 {
            return Err(format!("{from_start} arcs leave the start"));
        }
        if into_goal != 1 {
            return Err(format!("{into_goal} arcs enter the goal"));
        }
        if let Some(k) = (0..n).find(|&k| left[k] != 1) {
            return Err(format!("key {k} is left {} times", left[k]));
        }
        if let Some(k) = (0..n).find(|&k| entered[k] != 1) {
            return Err(format!("key {k} is entered {} times", entered[k]));
        }
        let big = (n + 1) as f64;
        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                let on = if link[i][j] { 1.0 } else { 0.0 };
                if a.y[i] - big * on < a.y[j] - n as f64 - TOLERANCE {
                    return Err(format!("ordering of keys {i} and {j} forms a subtour"));
                }
            }
        }
        Ok(())
    }

    /// Follow the selected arcs from `Start` until `Goal`.
    pub fn decode(&self, a: &Assignment) -> Result<Vec<Terminal>, String> {
        let n = self.num_keys();
        let mut out: FxHashMap<Vertex, Vertex> = FxHashMap::default();
        for (arc, _) in self.arcs.iter().zip(&a.x).filter(|(_, on)| **on) {
            if out.insert(arc.tail, arc.head).is_some() {
                return Err(format!("{:?} has more than one outgoing arc", arc.tail));
            }
        }
        let mut sequence = Vec::with_capacity(n);
        let mut at = Vertex::Start;
        loop {
            let next = *out
                .get(&at)
                .ok_or_else(|| format!("chain stops at {at:?}"))?;
            match next {
                Vertex::Goal => break,
                Vertex::Terminal(k, d) => {
                    if sequence.len() == n {
                        return Err("chain is longer than the group".to_string());
                    }
                    sequence.push((k, d));
                    at = Vertex::Terminal(k, d.opposite());
                }
                Vertex::Start => return Err("chain returns to the start".to_string()),
            }
        }
        Ok(sequence)
    }
}

fn arc_cost(dist: &DistanceMatrix, tail: Vertex, head: Vertex) -> f64 {
    match (tail, head) {
        (_, Vertex::Goal) => 0.0,
        (Vertex::Start, Vertex::Terminal(k, d)) => dist.from_start((k, d)),
        (Vertex::Terminal(k1, d1), Vertex::Terminal(k2, d2)) => dist.between((k1, d1), (k2, d2)),
        _ => f64::INFINITY,
    }
}
