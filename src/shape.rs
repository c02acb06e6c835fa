use crate::{edges::EdgeId, VertexId};

/// A point in Cartesian (display) space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Default for Point {
    fn default() -> Self {
        Self { x: 0., y: 0. }
    }
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist2(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Barycentric weights relative to the three corners of the outer triangle.
///
/// Mesh vertices and synthetic points (circumcenters, samples, the viewer)
/// share this one value type. Weights are never differenced directly as a
/// distance; go through [`crate::OuterTriangle::squared_distance`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Barycentric {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Barycentric {
    /// The outer corners as unit basis points, in vertex index order.
    pub const CORNERS: [Barycentric; 3] = [
        Barycentric::new(1., 0., 0.),
        Barycentric::new(0., 1., 0.),
        Barycentric::new(0., 0., 1.),
    ];

    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn weights(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    pub fn sum(&self) -> f64 {
        self.a + self.b + self.c
    }

    /// Smallest of the three weights, negative when the point lies outside
    /// the reference triangle.
    pub fn min_weight(&self) -> f64 {
        self.a.min(self.b).min(self.c)
    }

    /// Reinterpret local weights over `frame` as a point in the frame's own
    /// coordinate system: the same affine combination of the frame points.
    pub fn globalize(&self, frame: &[Barycentric; 3]) -> Barycentric {
        let [p, q, r] = frame;
        Barycentric {
            a: p.a * self.a + q.a * self.b + r.a * self.c,
            b: p.b * self.a + q.b * self.b + r.b * self.c,
            c: p.c * self.a + q.c * self.b + r.c * self.c,
        }
    }

    pub fn centroid(points: &[Barycentric; 3]) -> Barycentric {
        Barycentric::new(1. / 3., 1. / 3., 1. / 3.).globalize(points)
    }

    /// The outer side every given point lies exactly on, if any.
    ///
    /// Side `k` is the one opposite corner `k`, where weight `k` is zero.
    pub fn common_side(points: &[Barycentric]) -> Option<usize> {
        (0..3).find(|k| points.iter().all(|p| p.weights()[*k] == 0.))
    }
}

impl From<(f64, f64, f64)> for Barycentric {
    fn from((a, b, c): (f64, f64, f64)) -> Self {
        Self::new(a, b, c)
    }
}

/// Unordered pair of vertex ids, stored with the lower id first.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Edge {
    /// p is the lower end
    pub p: VertexId,
    /// q is the higher end
    pub q: VertexId,
}

impl Edge {
    pub fn new(v1: VertexId, v2: VertexId) -> Self {
        debug_assert!(v1 != v2, "edge endpoints must differ");
        if v1 <= v2 {
            Self { p: v1, q: v2 }
        } else {
            Self { p: v2, q: v1 }
        }
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.p == v || self.q == v
    }

    /// Whether the edge joins exactly `v1` and `v2`, in either order.
    pub fn joins(&self, v1: VertexId, v2: VertexId) -> bool {
        *self == Edge::new(v1, v2)
    }
}

/// Circumcenter (outer barycentric) and squared Cartesian circumradius.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circumcircle {
    pub center: Barycentric,
    pub radius_sq: f64,
}

/// The triangle struct stored in the mesh.
///
/// `edges[0]` joins `points[0]` and `points[1]`, `edges[1]` joins `points[1]`
/// and `points[2]`, `edges[2]` closes the cycle. The circumcircle is cached
/// at creation; a triangle whose vertices change is replaced, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub points: [VertexId; 3],
    pub edges: [EdgeId; 3],
    pub circumcircle: Circumcircle,
}

impl Triangle {
    /// get point index
    #[inline(always)]
    pub fn point_index(&self, point: VertexId) -> Option<usize> {
        self.points.iter().position(|p| *p == point)
    }

    /// Index into `edges` of the edge joining `p` and `q`
    pub fn edge_index(&self, p: VertexId, q: VertexId) -> Option<usize> {
        let i = self.point_index(p)?;
        let j = self.point_index(q)?;
        match (i, j) {
            (0, 1) | (1, 0) => Some(0),
            (1, 2) | (2, 1) => Some(1),
            (2, 0) | (0, 2) => Some(2),
            _ => None,
        }
    }

    /// Whether the vertex is one of the triangle's corners
    pub fn has_point(&self, point: VertexId) -> bool {
        self.point_index(point).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_is_unordered() {
        let e1 = Edge::new(VertexId::from_index(4), VertexId::from_index(1));
        let e2 = Edge::new(VertexId::from_index(1), VertexId::from_index(4));
        assert_eq!(e1, e2);
        assert_eq!(e1.p, VertexId::from_index(1));
        assert!(e1.joins(VertexId::from_index(4), VertexId::from_index(1)));
        assert!(e1.contains(VertexId::from_index(4)));
        assert!(!e1.contains(VertexId::from_index(2)));
    }

    #[test]
    fn test_globalize() {
        // corners are the identity frame
        let p = Barycentric::new(0.2, 0.3, 0.5);
        assert_eq!(p.globalize(&Barycentric::CORNERS), p);

        // midpoint of the first two frame points
        let frame = [
            Barycentric::new(0.5, 0.5, 0.),
            Barycentric::new(0., 0.5, 0.5),
            Barycentric::new(0.5, 0., 0.5),
        ];
        let m = Barycentric::new(0.5, 0.5, 0.).globalize(&frame);
        assert!((m.a - 0.25).abs() < 1e-12);
        assert!((m.b - 0.5).abs() < 1e-12);
        assert!((m.c - 0.25).abs() < 1e-12);
        assert!((m.sum() - 1.).abs() < 1e-12);
    }

    #[test]
    fn test_common_side() {
        let mid_ab = Barycentric::new(0.5, 0.5, 0.);
        assert_eq!(
            Barycentric::common_side(&[Barycentric::CORNERS[0], Barycentric::CORNERS[1], mid_ab]),
            Some(2)
        );
        assert_eq!(
            Barycentric::common_side(&[Barycentric::CORNERS[0], Barycentric::CORNERS[2], mid_ab]),
            None
        );
        assert_eq!(Barycentric::common_side(&[Barycentric::new(0.2, 0.3, 0.5)]), None);
    }

    #[test]
    fn test_triangle_edge_index() {
        let v = |i| VertexId::from_index(i);
        let e = |i| EdgeId::from_index(i);
        let t = Triangle {
            points: [v(0), v(3), v(5)],
            edges: [e(0), e(1), e(2)],
            circumcircle: Circumcircle {
                center: Barycentric::new(1. / 3., 1. / 3., 1. / 3.),
                radius_sq: 1.,
            },
        };
        assert_eq!(t.edge_index(v(3), v(0)), Some(0));
        assert_eq!(t.edge_index(v(3), v(5)), Some(1));
        assert_eq!(t.edge_index(v(0), v(5)), Some(2));
        assert_eq!(t.edge_index(v(0), v(1)), None);
        assert!(t.has_point(v(5)));
        assert!(!t.has_point(v(1)));
    }
}
