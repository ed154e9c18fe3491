//! 3-D geometry: position/covariance aliases and polyline walking.
//!
//! Positions are `f64` 3-vectors in an arbitrary Cartesian frame (the demo
//! uses metres).  A planned path is the ordered list of waypoints still
//! ahead of the agent; its first segment starts at the agent's current
//! position, which is never stored in the list itself.

use nalgebra::{Matrix3, Vector3};

/// A position or displacement.
pub type Vec3 = Vector3<f64>;

/// A 3×3 covariance matrix.
pub type Cov3 = Matrix3<f64>;

/// `true` if every component is finite.
#[inline]
pub fn is_finite(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Total length of the polyline `start → waypoints[0] → … → waypoints[n-1]`.
pub fn path_length(start: Vec3, waypoints: &[Vec3]) -> f64 {
    let mut prev = start;
    let mut total = 0.0;
    for &w in waypoints {
        total += (w - prev).norm();
        prev = w;
    }
    total
}

/// Where a walker ends up after travelling `distance` along a polyline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WalkPoint {
    /// Position reached.
    pub position: Vec3,
    /// Number of waypoints fully reached (and therefore consumed).
    pub consumed: usize,
    /// Unit direction of the segment being travelled, `None` once the walker
    /// has stopped at the final waypoint (or the path was empty).
    pub heading: Option<Vec3>,
}

/// Walk `distance` along `start → waypoints…`, clamping at the last waypoint.
///
/// Zero-length segments are skipped so `heading` is always a unit vector.
pub fn walk(start: Vec3, waypoints: &[Vec3], distance: f64) -> WalkPoint {
    let mut pos = start;
    let mut remaining = distance.max(0.0);

    for (i, &w) in waypoints.iter().enumerate() {
        let seg = w - pos;
        let len = seg.norm();
        if len <= f64::EPSILON {
            pos = w;
            continue;
        }
        let dir = seg / len;
        if remaining < len {
            return WalkPoint {
                position: pos + dir * remaining,
                consumed: i,
                heading:  Some(dir),
            };
        }
        remaining -= len;
        pos = w;
        // Landing exactly on an intermediate waypoint: keep the heading of
        // the segment just finished.
        if remaining <= 0.0 && i + 1 < waypoints.len() {
            return WalkPoint { position: pos, consumed: i + 1, heading: Some(dir) };
        }
    }

    WalkPoint { position: pos, consumed: waypoints.len(), heading: None }
}

/// Rotate `v` about the vertical (z) axis by `angle` radians.
#[inline]
pub fn rotate_z(v: Vec3, angle: f64) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(c * v.x - s * v.y, s * v.x + c * v.y, v.z)
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Axis-aligned box the agents live in.  Both corners are inclusive.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The cube `[0, size]³`.
    pub fn cube(size: f64) -> Self {
        Self { min: Vec3::zeros(), max: Vec3::repeat(size) }
    }

    /// `true` if the corners are finite and `min ≤ max` on every axis.
    pub fn is_valid(&self) -> bool {
        is_finite(&self.min) && is_finite(&self.max) && (0..3).all(|i| self.min[i] <= self.max[i])
    }

    #[inline]
    pub fn contains(&self, p: &Vec3) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    /// The closest point of the box to `p`.
    #[inline]
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        p.zip_zip_map(&self.min, &self.max, |v, lo, hi| v.max(lo).min(hi))
    }
}
