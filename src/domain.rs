//! The outer triangle and the barycentric frame it defines.

use crate::{
    utils::orient_2d,
    Barycentric, MeshError, Point,
};

/// Relative area below which the outer triangle counts as degenerate.
const DEGENERATE_AREA_RATIO: f64 = 1e-12;

/// Fixed enclosing triangle. Its corners are the barycentric basis points
/// (1,0,0), (0,1,0), (0,0,1) and never leave the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterTriangle {
    corners: [Point; 3],
    /// determinant of the 2x2 affine system, cached for `cartesian_to_barycentric`
    det: f64,
}

impl OuterTriangle {
    /// Build the frame, rejecting collinear or zero area corners.
    pub fn new(corners: [Point; 3]) -> Result<Self, MeshError> {
        let [a, b, c] = corners;
        if corners
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(MeshError::DegenerateDomain);
        }
        if orient_2d(a, b, c).is_collinear() {
            return Err(MeshError::DegenerateDomain);
        }

        let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
        let scale = a.dist2(b).max(b.dist2(c)).max(c.dist2(a));
        if det.abs() <= DEGENERATE_AREA_RATIO * scale {
            return Err(MeshError::DegenerateDomain);
        }

        Ok(Self { corners, det })
    }

    /// Equilateral outer triangle around the circle at `center`: apex above,
    /// the base tangent to the circle below it.
    pub fn from_incircle(center: Point, radius: f64) -> Result<Self, MeshError> {
        if !(radius.is_finite() && radius > 0.) {
            return Err(MeshError::DegenerateDomain);
        }
        Self::new(incircle_corners(center, radius))
    }

    pub fn corners(&self) -> [Point; 3] {
        self.corners
    }

    /// Affine combination of the corners. No normalization is done, weights
    /// that do not sum to 1 give a meaningless point.
    pub fn to_cartesian(&self, p: Barycentric) -> Point {
        let [ca, cb, cc] = self.corners;
        Point::new(
            p.a * ca.x + p.b * cb.x + p.c * cc.x,
            p.a * ca.y + p.b * cb.y + p.c * cc.y,
        )
    }

    /// Unique weights with a + b + c = 1 that map back to `p`.
    pub fn cartesian_to_barycentric(&self, p: Point) -> Barycentric {
        let [ca, cb, cc] = self.corners;
        let a = ((cb.y - cc.y) * (p.x - cc.x) + (cc.x - cb.x) * (p.y - cc.y)) / self.det;
        let b = ((cc.y - ca.y) * (p.x - cc.x) + (ca.x - cc.x) * (p.y - cc.y)) / self.det;
        Barycentric::new(a, b, 1. - a - b)
    }

    /// Squared Euclidean distance, measured in Cartesian space.
    pub fn squared_distance(&self, p1: Barycentric, p2: Barycentric) -> f64 {
        self.to_cartesian(p1).dist2(self.to_cartesian(p2))
    }

    /// Twice the signed Cartesian area of the outer triangle.
    pub fn doubled_area(&self) -> f64 {
        self.det
    }
}

/// Corners of the equilateral triangle whose incircle is (`center`, `radius`).
pub(crate) fn incircle_corners(center: Point, radius: f64) -> [Point; 3] {
    let half_side = radius * 3f64.sqrt();
    [
        Point::new(center.x, center.y + 2. * radius),
        Point::new(center.x - half_side, center.y - radius),
        Point::new(center.x + half_side, center.y - radius),
    ]
}
