//! Shortest bounded-curvature paths between two oriented points.
//!
//! A Dubins path is the shortest forward-only path for a vehicle with a
//! minimum turning radius. It is always one of six words built from left arcs
//! (L), right arcs (R) and straight segments (S): LSL, RSR, LSR, RSL, RLR,
//! LRL. Here the "vehicle" is a wire leaving one solder point and arriving at
//! the next one, and the radius models how tightly the wire can bend.

use keywire_core::Pose;
use std::f64::consts::TAU;

/// Below this, a normalized segment length is treated as zero.
const SNAP_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    Left,
    Straight,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    LSL,
    RSR,
    LSR,
    RSL,
    RLR,
    LRL,
}

impl PathType {
    pub const ALL: [PathType; 6] = [
        PathType::LSL,
        PathType::RSR,
        PathType::LSR,
        PathType::RSL,
        PathType::RLR,
        PathType::LRL,
    ];

    #[must_use]
    pub fn segments(self) -> [SegmentType; 3] {
        use SegmentType::{Left as L, Right as R, Straight as S};
        match self {
            PathType::LSL => [L, S, L],
            PathType::RSR => [R, S, R],
            PathType::LSR => [L, S, R],
            PathType::RSL => [R, S, L],
            PathType::RLR => [R, L, R],
            PathType::LRL => [L, R, L],
        }
    }
}

/// A solved path. Segment lengths are normalized by the turning radius.
#[derive(Debug, Clone, PartialEq)]
pub struct DubinsPath {
    pub start: Pose,
    pub radius: f64,
    pub kind: PathType,
    pub params: [f64; 3],
}

impl DubinsPath {
    /// Total length in world units.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.params.iter().sum::<f64>() * self.radius
    }

    /// Pose reached after travelling `distance` along the path.
    #[must_use]
    pub fn pose_at(&self, distance: f64) -> Pose {
        let mut t = (distance / self.radius).max(0.0);
        let mut local = Pose::new(0.0, 0.0, self.start.heading);
        for (seg, len) in self.kind.segments().iter().zip(self.params) {
            let step = t.min(len);
            local = advance(&local, *seg, step);
            t -= step;
            if t <= 0.0 {
                break;
            }
        }
        Pose::new(
            self.start.x + local.x * self.radius,
            self.start.y + local.y * self.radius,
            local.heading,
        )
    }

    #[must_use]
    pub fn end_pose(&self) -> Pose {
        self.pose_at(self.length())
    }

    /// Points along the path roughly `step` apart, both endpoints included.
    #[must_use]
    pub fn sample(&self, step: f64) -> Vec<[f64; 2]> {
        let length = self.length();
        let mut points = vec![self.start.xy()];
        if length <= 0.0 {
            points.push(self.start.xy());
            return points;
        }
        let step = if step > 0.0 { step } else { length };
        let n = ((length / step).ceil() as usize).max(1);
        for i in 1..=n {
            let d = length * i as f64 / n as f64;
            points.push(self.pose_at(d).xy());
        }
        points
    }
}

/// Path planner with a fixed minimum turning radius.
#[derive(Debug, Clone, Copy)]
pub struct DubinsPlanner {
    turning_radius: f64,
}

impl DubinsPlanner {
    /// `turning_radius` must be positive; see [`crate::RouteError`] for how
    /// callers validate it.
    #[must_use]
    pub fn new(turning_radius: f64) -> Self {
        Self { turning_radius }
    }

    #[must_use]
    pub fn turning_radius(&self) -> f64 {
        self.turning_radius
    }

    /// Shortest path from `from` to `to`.
    #[must_use]
    pub fn shortest(&self, from: &Pose, to: &Pose) -> DubinsPath {
        let r = self.turning_radius;
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let d = dx.hypot(dy) / r;
        let theta = if d > 0.0 { mod2pi(dy.atan2(dx)) } else { 0.0 };
        let alpha = mod2pi(from.heading - theta);
        let beta = mod2pi(to.heading - theta);

        let degenerate = DubinsPath {
            start: *from,
            radius: r,
            kind: PathType::LSL,
            params: [0.0; 3],
        };
        if d <= SNAP_EPS && (alpha - beta).abs().min(TAU - (alpha - beta).abs()) <= SNAP_EPS {
            return degenerate;
        }

        PathType::ALL
            .iter()
            .filter_map(|&kind| {
                word(kind, alpha, beta, d).map(|params| DubinsPath {
                    start: *from,
                    radius: r,
                    kind,
                    params,
                })
            })
            .min_by(|a, b| a.length().total_cmp(&b.length()))
            .unwrap_or(degenerate)
    }

    /// Length of the shortest path; the quantity the optimizer minimizes.
    #[must_use]
    pub fn length(&self, from: &Pose, to: &Pose) -> f64 {
        self.shortest(from, to).length()
    }

    /// Length and a sampled polyline of the shortest path.
    #[must_use]
    pub fn plan(&self, from: &Pose, to: &Pose, step: f64) -> (f64, Vec<[f64; 2]>) {
        let path = self.shortest(from, to);
        (path.length(), path.sample(step))
    }
}

/// Free-function form of [`DubinsPlanner::plan`].
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn plan(
    x0: f64,
    y0: f64,
    theta0: f64,
    x1: f64,
    y1: f64,
    theta1: f64,
    turning_radius: f64,
    step: f64,
) -> (f64, Vec<[f64; 2]>) {
    DubinsPlanner::new(turning_radius).plan(
        &Pose::new(x0, y0, theta0),
        &Pose::new(x1, y1, theta1),
        step,
    )
}

fn mod2pi(a: f64) -> f64 {
    let m = a.rem_euclid(TAU);
    if m >= TAU - SNAP_EPS {
        0.0
    } else {
        m
    }
}

/// Move a unit-radius pose along one segment of normalized length `t`.
fn advance(p: &Pose, seg: SegmentType, t: f64) -> Pose {
    let h = p.heading;
    match seg {
        SegmentType::Left => Pose::new(
            p.x + (h + t).sin() - h.sin(),
            p.y - (h + t).cos() + h.cos(),
            h + t,
        ),
        SegmentType::Right => Pose::new(
            p.x - (h - t).sin() + h.sin(),
            p.y + (h - t).cos() - h.cos(),
            h - t,
        ),
        SegmentType::Straight => Pose::new(p.x + t * h.cos(), p.y + t * h.sin(), h),
    }
}

fn word(kind: PathType, alpha: f64, beta: f64, d: f64) -> Option<[f64; 3]> {
    let (sa, ca) = alpha.sin_cos();
    let (sb, cb) = beta.sin_cos();
    let c_ab = (alpha - beta).cos();
    match kind {
        PathType::LSL => {
            let p_sq = 2.0 + d * d - 2.0 * c_ab + 2.0 * d * (sa - sb);
            if p_sq < -SNAP_EPS {
                return None;
            }
            let p_sq = p_sq.max(0.0);
            let tmp = (cb - ca).atan2(d + sa - sb);
            Some([mod2pi(tmp - alpha), p_sq.sqrt(), mod2pi(beta - tmp)])
        }
        PathType::RSR => {
            let p_sq = 2.0 + d * d - 2.0 * c_ab + 2.0 * d * (sb - sa);
            if p_sq < -SNAP_EPS {
                return None;
            }
            let p_sq = p_sq.max(0.0);
            let tmp = (ca - cb).atan2(d - sa + sb);
            Some([mod2pi(alpha - tmp), p_sq.sqrt(), mod2pi(tmp - beta)])
        }
        PathType::LSR => {
            let p_sq = -2.0 + d * d + 2.0 * c_ab + 2.0 * d * (sa + sb);
            if p_sq < -SNAP_EPS {
                return None;
            }
            let p_sq = p_sq.max(0.0);
            let p = p_sq.sqrt();
            let tmp = (-ca - cb).atan2(d + sa + sb) - (-2.0f64).atan2(p);
            Some([mod2pi(tmp - alpha), p, mod2pi(tmp - beta)])
        }
        PathType::RSL => {
            let p_sq = -2.0 + d * d + 2.0 * c_ab - 2.0 * d * (sa + sb);
            if p_sq < -SNAP_EPS {
                return None;
            }
            let p_sq = p_sq.max(0.0);
            let p = p_sq.sqrt();
            let tmp = (ca + cb).atan2(d - sa - sb) - 2.0f64.atan2(p);
            Some([mod2pi(alpha - tmp), p, mod2pi(beta - tmp)])
        }
        PathType::RLR => {
            let tmp = (6.0 - d * d + 2.0 * c_ab + 2.0 * d * (sa - sb)) / 8.0;
            if tmp.abs() > 1.0 + SNAP_EPS {
                return None;
            }
            let tmp = tmp.clamp(-1.0, 1.0);
            let phi = (ca - cb).atan2(d - sa + sb);
            let p = mod2pi(TAU - tmp.acos());
            let t = mod2pi(alpha - phi + mod2pi(p / 2.0));
            Some([t, p, mod2pi(alpha - beta - t + p)])
        }
        PathType::LRL => {
            let tmp = (6.0 - d * d + 2.0 * c_ab + 2.0 * d * (sb - sa)) / 8.0;
            if tmp.abs() > 1.0 + SNAP_EPS {
                return None;
            }
            let tmp = tmp.clamp(-1.0, 1.0);
            let phi = (ca - cb).atan2(d + sa - sb);
            let p = mod2pi(TAU - tmp.acos());
            let t = mod2pi(-alpha - phi + p / 2.0);
            Some([t, p, mod2pi(beta - alpha - t + p)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use keywire_core::normalize_angle;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn turn_bound(radius: f64, dheading: f64) -> f64 {
        radius * dheading.abs().min(TAU - dheading.abs()).min(PI)
    }

    #[test]
    fn identical_poses_give_zero_length() {
        let (len, pts) = plan(1.0, 2.0, 0.7, 1.0, 2.0, 0.7, 0.2, 0.05);
        assert_eq!(len, 0.0);
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0], pts[1]);
    }

    #[test]
    fn collinear_same_heading_is_straight() {
        for d in [0.001, 0.3, 1.0, 12.5] {
            let (len, _) = plan(0.0, 0.0, 0.0, d, 0.0, 0.0, 0.2, 0.05);
            assert_abs_diff_eq!(len, d, epsilon = 1e-9);
        }
    }

    #[test]
    fn rotated_straight_line() {
        let h = 0.9;
        let planner = DubinsPlanner::new(0.5);
        let from = Pose::new(1.0, 1.0, h);
        let to = Pose::new(1.0 + 3.0 * h.cos(), 1.0 + 3.0 * h.sin(), h);
        assert_abs_diff_eq!(planner.length(&from, &to), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn u_turn_is_half_circle() {
        let planner = DubinsPlanner::new(1.0);
        let from = Pose::new(0.0, 0.0, 0.0);
        let to = Pose::new(0.0, 2.0, PI);
        assert_abs_diff_eq!(planner.length(&from, &to), PI, epsilon = 1e-9);
    }

    #[test]
    fn quarter_turn() {
        let planner = DubinsPlanner::new(1.0);
        let path = planner.shortest(&Pose::new(0.0, 0.0, 0.0), &Pose::new(1.0, 1.0, FRAC_PI_2));
        assert_abs_diff_eq!(path.length(), FRAC_PI_2, epsilon = 1e-9);
        assert_eq!(path.kind.segments()[0], SegmentType::Left);
    }

    #[test]
    fn sampled_polyline_ends_at_goal() {
        let planner = DubinsPlanner::new(0.2);
        let from = Pose::new(0.0, 0.0, 0.3);
        let to = Pose::new(-1.0, 0.4, -2.0);
        let (len, pts) = planner.plan(&from, &to, 0.01);
        let last = pts.last().unwrap();
        assert_abs_diff_eq!(last[0], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(last[1], 0.4, epsilon = 1e-6);
        let walked: f64 = pts
            .windows(2)
            .map(|w| (w[1][0] - w[0][0]).hypot(w[1][1] - w[0][1]))
            .sum();
        assert!(walked <= len + 1e-9);
        assert!(walked > len * 0.99);
    }

    #[test]
    fn length_is_at_least_euclidean_and_turn_bound() {
        let planner = DubinsPlanner::new(0.4);
        let from = Pose::new(0.0, 0.0, 0.0);
        let to = Pose::new(0.1, 0.0, PI);
        let len = planner.length(&from, &to);
        assert!(len >= from.distance(&to));
        assert!(len >= turn_bound(0.4, PI) - 1e-9);
    }

    fn any_pose() -> impl Strategy<Value = Pose> {
        (-5.0..5.0f64, -5.0..5.0f64, -PI..PI).prop_map(|(x, y, h)| Pose::new(x, y, h))
    }

    proptest! {
        #[test]
        fn shortest_path_ends_at_the_goal(
            from in any_pose(),
            to in any_pose(),
            radius in 0.05..2.0f64,
        ) {
            let end = DubinsPlanner::new(radius).shortest(&from, &to).end_pose();
            prop_assert!((end.x - to.x).abs() < 1e-6, "x {} vs {}", end.x, to.x);
            prop_assert!((end.y - to.y).abs() < 1e-6, "y {} vs {}", end.y, to.y);
            let dh = normalize_angle(end.heading - to.heading);
            prop_assert!(dh.min(TAU - dh) < 1e-6, "heading off by {dh}");
        }

        #[test]
        fn never_shorter_than_the_straight_line(
            from in any_pose(),
            to in any_pose(),
            radius in 0.05..2.0f64,
        ) {
            let len = DubinsPlanner::new(radius).length(&from, &to);
            prop_assert!(len >= from.distance(&to) - 1e-9);
        }

        #[test]
        fn aligned_goal_ahead_is_reached_straight(d in 0.0..20.0f64, radius in 0.01..5.0f64) {
            let (len, _) = plan(0.0, 0.0, 0.0, d, 0.0, 0.0, radius, 0.1);
            prop_assert!((len - d).abs() <= 1e-9 * (1.0 + d), "{len} vs {d}");
        }
    }
}
