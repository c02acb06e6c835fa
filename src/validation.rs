use std::collections::{HashMap, HashSet};

use crate::{error::ValidationError, utils::orient_2d, Mesh};

/// Relative slack on the empty circumcircle check, absorbs rounding in the
/// cached circumcircles.
const DELAUNAY_SLACK: f64 = 1e-9;

/// Relative slack between the summed triangle areas and the outer area.
const COVERAGE_SLACK: f64 = 1e-9;

impl Mesh {
    /// Check the structural and Delaunay invariants of the whole mesh.
    ///
    /// Quadratic in the mesh size, meant for tests and debugging.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_topology()?;
        self.validate_delaunay()
    }

    /// Every live edge is used by one or two live triangles, triangles only
    /// reference live edges and their edges close a cycle over their points.
    /// Every triangle keeps the winding of the outer triangle and together
    /// they cover it exactly once.
    pub fn validate_topology(&self) -> Result<(), ValidationError> {
        let mut refs = HashMap::new();
        let [a, b, c] = self.domain().corners();
        let winding = orient_2d(a, b, c);
        let mut covered = 0.;

        for (tid, triangle) in self.triangles().iter() {
            for (i, eid) in triangle.edges.iter().enumerate() {
                let Some(edge) = self.edges().get(*eid) else {
                    return Err(ValidationError::DanglingEdge {
                        triangle: tid,
                        edge: *eid,
                    });
                };
                let p = triangle.points[i];
                let q = triangle.points[(i + 1) % 3];
                if p == q || !edge.joins(p, q) {
                    return Err(ValidationError::BrokenCycle { triangle: tid });
                }
                *refs.entry(*eid).or_insert(0usize) += 1;
            }
            if triangle.edges[0] == triangle.edges[1]
                || triangle.edges[1] == triangle.edges[2]
                || triangle.edges[2] == triangle.edges[0]
            {
                return Err(ValidationError::BrokenCycle { triangle: tid });
            }

            let Some([p, q, r]) = self.triangle_points(tid) else {
                return Err(ValidationError::BrokenCycle { triangle: tid });
            };
            if orient_2d(p, q, r) != winding {
                return Err(ValidationError::InvertedTriangle { triangle: tid });
            }
            covered += ((q.x - p.x) * (r.y - p.y) - (r.x - p.x) * (q.y - p.y)).abs();
        }

        let expected = self.domain().doubled_area().abs();
        if (covered - expected).abs() > COVERAGE_SLACK * expected {
            return Err(ValidationError::CoverageMismatch { covered, expected });
        }

        let mut seen = HashSet::new();
        for (eid, edge) in self.edges().iter() {
            let count = refs.get(&eid).copied().unwrap_or(0);
            if !(1..=2).contains(&count) {
                return Err(ValidationError::EdgeReferenceCount { edge: eid, count });
            }
            if !seen.insert(edge) {
                return Err(ValidationError::DuplicateEdge(edge));
            }
        }

        Ok(())
    }

    /// No vertex lies strictly inside any live circumcircle.
    pub fn validate_delaunay(&self) -> Result<(), ValidationError> {
        let domain = self.domain();
        for (tid, triangle) in self.triangles().iter() {
            let circle = &triangle.circumcircle;
            let slack = DELAUNAY_SLACK * circle.radius_sq.max(1.);
            for (vertex, point) in self.vertices().iter() {
                if triangle.has_point(vertex) {
                    continue;
                }
                if domain.squared_distance(point, circle.center) < circle.radius_sq - slack {
                    tracing::warn!(?tid, ?vertex, "delaunay violation");
                    return Err(ValidationError::DelaunayViolation {
                        triangle: tid,
                        vertex,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::ValidationError, Mesh, Point};

    #[test]
    fn test_validate_after_inserts() {
        let mut mesh =
            Mesh::new([Point::new(0., 0.), Point::new(10., 0.), Point::new(5., 10.)]).unwrap();
        for (x, y) in [(5., 3.), (3., 2.), (7., 2.), (5., 6.), (4.9, 3.1), (2., 1.)] {
            mesh.insert_from_cartesian(x, y).unwrap();
            mesh.validate().unwrap();
        }
    }

    #[test]
    fn test_detects_dangling_edge() {
        let mut mesh =
            Mesh::new([Point::new(0., 0.), Point::new(10., 0.), Point::new(5., 10.)]).unwrap();
        let (eid, _) = mesh.edges().iter().next().unwrap();
        mesh.edges_mut().remove(eid);
        assert!(matches!(
            mesh.validate_topology(),
            Err(ValidationError::DanglingEdge { .. })
        ));
    }

    #[test]
    fn test_detects_inverted_triangle() {
        let mut mesh =
            Mesh::new([Point::new(0., 0.), Point::new(10., 0.), Point::new(5., 10.)]).unwrap();
        mesh.insert_from_cartesian(5., 3.).unwrap();
        mesh.validate().unwrap();

        // same edges, reversed winding
        let (tid, _) = mesh.triangles().iter().next().unwrap();
        let mut t = mesh.triangles_mut().remove(tid).unwrap();
        t.points.swap(0, 1);
        t.edges.swap(1, 2);
        mesh.triangles_mut().insert(t);

        assert!(matches!(
            mesh.validate_topology(),
            Err(ValidationError::InvertedTriangle { .. })
        ));
    }

    #[test]
    fn test_detects_overlap() {
        let mut mesh =
            Mesh::new([Point::new(0., 0.), Point::new(10., 0.), Point::new(5., 10.)]).unwrap();
        mesh.insert_from_cartesian(5., 3.).unwrap();

        let (_, t) = mesh.triangles().iter().next().unwrap();
        let t = *t;
        mesh.triangles_mut().insert(t);

        assert!(matches!(
            mesh.validate_topology(),
            Err(ValidationError::CoverageMismatch { .. })
        ));
    }
}
