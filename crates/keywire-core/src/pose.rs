use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// A position on the board plane with a heading.
///
/// Lengths are centimetres; `heading` is radians, counter-clockwise from +X.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    #[must_use]
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    #[must_use]
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Express `local` (given in this pose's frame) in the parent frame.
    #[must_use]
    pub fn compose(&self, local: &Pose) -> Pose {
        let [dx, dy] = rotate_vec([local.x, local.y], self.heading);
        Pose {
            x: self.x + dx,
            y: self.y + dy,
            heading: self.heading + local.heading,
        }
    }

    /// Move along `shift`, rotated into this pose's frame.
    #[must_use]
    pub fn shifted(&self, shift: [f64; 2]) -> Pose {
        let [dx, dy] = rotate_vec(shift, self.heading);
        Pose {
            x: self.x + dx,
            y: self.y + dy,
            heading: self.heading,
        }
    }

    /// Same position, heading turned by `angle`.
    #[must_use]
    pub fn turned(&self, angle: f64) -> Pose {
        Pose {
            heading: self.heading + angle,
            ..*self
        }
    }

    /// Same position facing the opposite way.
    #[must_use]
    pub fn reversed(&self) -> Pose {
        self.turned(PI)
    }

    #[must_use]
    pub fn distance(&self, other: &Pose) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Equal position and equivalent heading, within `eps`.
    #[must_use]
    pub fn approx_eq(&self, other: &Pose, eps: f64) -> bool {
        let dh = normalize_angle(self.heading - other.heading);
        self.distance(other) <= eps && (dh.abs() <= eps || (TAU - dh).abs() <= eps)
    }
}

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}

pub(crate) fn rotate_vec(v: [f64; 2], angle: f64) -> [f64; 2] {
    let (s, c) = angle.sin_cos();
    [v[0] * c - v[1] * s, v[0] * s + v[1] * c]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn compose_rotates_local_offset() {
        let key = Pose::new(1.0, 2.0, FRAC_PI_2);
        let p = key.compose(&Pose::new(0.5, 0.0, 0.25));
        assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.heading, FRAC_PI_2 + 0.25, epsilon = 1e-12);
    }

    #[test]
    fn shifted_keeps_heading() {
        let p = Pose::new(0.0, 0.0, PI).shifted([2.0, 0.0]);
        assert_abs_diff_eq!(p.x, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.heading, PI, epsilon = 1e-12);
    }

    #[test]
    fn normalize_wraps_negative_and_large_angles() {
        assert_abs_diff_eq!(normalize_angle(-FRAC_PI_2), 3.0 * FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(5.0 * PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn reversed_pose_is_approx_equal_after_two_flips() {
        let p = Pose::new(3.0, -1.0, 0.3);
        assert!(p.reversed().reversed().approx_eq(&p, 1e-9));
        assert!(!p.reversed().approx_eq(&p, 1e-9));
    }
}
