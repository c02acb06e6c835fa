use crate::{
    domain::{incircle_corners, OuterTriangle},
    mesh::DEFAULT_TOLERANCE,
    Mesh, MeshError, Point,
};

/// Mesh Builder
///
/// # Example
/// ```rust
///    use lod_mesh::{MeshBuilder, Point};
///
///    let mut mesh = MeshBuilder::new([
///        Point::new(0., 0.),
///        Point::new(10., 0.),
///        Point::new(5., 10.),
///    ])
///    .tolerance(1e-9)
///    .add_point(Point::new(5., 3.))
///    .build()
///    .unwrap();
///
///    assert_eq!(mesh.triangle_count(), 3);
///    mesh.insert((0.2, 0.3, 0.5)).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    corners: [Point; 3],
    tolerance: f64,
    points: Vec<Point>,
}

impl MeshBuilder {
    /// Create a new Builder with the outer triangle corners
    pub fn new(corners: [Point; 3]) -> Self {
        Self {
            corners,
            tolerance: DEFAULT_TOLERANCE,
            points: vec![],
        }
    }

    /// Builder for the equilateral outer triangle around the circle at
    /// `center`, see [`OuterTriangle::from_incircle`]. A radius that is not
    /// positive fails the build with a degenerate domain.
    pub fn from_incircle(center: Point, radius: f64) -> Self {
        Self::new(incircle_corners(center, radius.max(0.)))
    }

    /// Allowed deviation of `a + b + c` from 1 for inserted points
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Add a single Cartesian point, inserted right after construction
    pub fn add_point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    /// Add multiple [`Point`], batch version for `Self::add_point`
    pub fn add_points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.points.extend(points);
        self
    }

    /// build the mesh
    ///
    /// Seed points that the mesh refuses (outside the outer triangle,
    /// duplicates) are skipped, a degenerate domain or tolerance fails.
    pub fn build(self) -> Result<Mesh, MeshError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.) {
            return Err(MeshError::InvalidConfig("tolerance must be positive"));
        }
        let domain = OuterTriangle::new(self.corners)?;
        let mut mesh = Mesh::with_domain(domain, self.tolerance)?;

        for point in self.points {
            if let Err(err) = mesh.insert_from_cartesian(point.x, point.y) {
                tracing::debug!(?point, %err, "seed point skipped");
            }
        }

        Ok(mesh)
    }
}
