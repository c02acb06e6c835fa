use rand::Rng;

use crate::{
    context::InsertContext,
    domain::OuterTriangle,
    edges::EdgeStore,
    observer::Observer,
    points::Vertices,
    sampling,
    shape::{Edge, Triangle},
    triangles::{TriangleId, TriangleStore},
    utils::{circumcircle, in_triangle},
    Barycentric, MeshError, Point, VertexId,
};

/// Default tolerance on `a + b + c - 1` for inserted points.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// The region of influence of one accepted insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub vertex: VertexId,
    /// triangles whose circumcircle enclosed the vertex, now removed
    pub removed: Vec<TriangleId>,
    /// triangles fanning out of the vertex across the cavity
    pub created: Vec<TriangleId>,
}

/// Delaunay mesh over a fixed outer triangle.
///
/// Vertices live in barycentric coordinates of the outer triangle. The only
/// way to change the topology is [`Mesh::insert`]; everything else is a read
/// only view, for the refiner and for whoever draws the mesh.
#[derive(Debug)]
pub struct Mesh {
    domain: OuterTriangle,
    tolerance: f64,
    vertices: Vertices,
    edges: EdgeStore,
    triangles: TriangleStore,
    /// circumradius^2 of the outer triangle, the coarsest scale
    root_radius_sq: f64,

    // reusable staging buffers
    context: InsertContext,
}

impl Mesh {
    /// Mesh with the default tolerance, see [`crate::MeshBuilder`] for the rest.
    pub fn new(corners: [Point; 3]) -> Result<Self, MeshError> {
        Self::with_domain(OuterTriangle::new(corners)?, DEFAULT_TOLERANCE)
    }

    /// The three corners, their three edges and the one triangle spanning them.
    pub(crate) fn with_domain(domain: OuterTriangle, tolerance: f64) -> Result<Self, MeshError> {
        let vertices = Vertices::with_corners();
        let corners = [VertexId(0), VertexId(1), VertexId(2)];

        let mut edges = EdgeStore::new();
        let ab = edges.insert(Edge::new(corners[0], corners[1]));
        let bc = edges.insert(Edge::new(corners[1], corners[2]));
        let ca = edges.insert(Edge::new(corners[2], corners[0]));

        let root = circumcircle(&domain, &Barycentric::CORNERS)?;
        let mut triangles = TriangleStore::new();
        triangles.insert(Triangle {
            points: corners,
            edges: [ab, bc, ca],
            circumcircle: root,
        });

        Ok(Self {
            domain,
            tolerance,
            vertices,
            edges,
            triangles,
            root_radius_sq: root.radius_sq,
            context: InsertContext::new(),
        })
    }

    pub fn domain(&self) -> &OuterTriangle {
        &self.domain
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn root_radius_sq(&self) -> f64 {
        self.root_radius_sq
    }

    pub fn vertices(&self) -> &Vertices {
        &self.vertices
    }

    pub fn edges(&self) -> &EdgeStore {
        &self.edges
    }

    pub fn triangles(&self) -> &TriangleStore {
        &self.triangles
    }

    #[cfg(test)]
    pub(crate) fn edges_mut(&mut self) -> &mut EdgeStore {
        &mut self.edges
    }

    #[cfg(test)]
    pub(crate) fn triangles_mut(&mut self) -> &mut TriangleStore {
        &mut self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id)
    }

    /// Cartesian position of a vertex
    pub fn vertex_position(&self, id: VertexId) -> Option<Point> {
        self.vertices.get(id).map(|p| self.domain.to_cartesian(p))
    }

    /// Barycentric corners of a live triangle
    pub fn triangle_barycentric(&self, id: TriangleId) -> Option<[Barycentric; 3]> {
        let t = self.triangles.get(id)?;
        Some(t.points.map(|p| self.vertices.get_unchecked(p)))
    }

    /// Cartesian corners of a live triangle
    pub fn triangle_points(&self, id: TriangleId) -> Option<[Point; 3]> {
        self.triangle_barycentric(id)
            .map(|points| points.map(|p| self.domain.to_cartesian(p)))
    }

    /// The live triangle containing `point`, boundary included.
    pub fn locate(&self, point: Barycentric) -> Option<TriangleId> {
        let p = self.domain.to_cartesian(point);
        self.triangles
            .iter()
            .map(|(id, _)| id)
            .find(|id| matches!(self.triangle_points(*id), Some(t) if in_triangle(p, t)))
    }

    /// Insert a point given in outer barycentric weights.
    ///
    /// The weights must sum to 1 within the mesh tolerance and none may be
    /// negative. On error nothing changes, except for
    /// [`MeshError::PointOutsideCavity`] where the vertex slot is still used.
    pub fn insert(&mut self, point: impl Into<Barycentric>) -> Result<Insertion, MeshError> {
        self.insert_with_observer(point, &mut ())
    }

    /// Convert a Cartesian point to the outer frame and insert it.
    pub fn insert_from_cartesian(&mut self, x: f64, y: f64) -> Result<Insertion, MeshError> {
        let point = self.domain.cartesian_to_barycentric(Point::new(x, y));
        self.insert(point)
    }

    /// Run insert with observer
    pub fn insert_with_observer(
        &mut self,
        point: impl Into<Barycentric>,
        observer: &mut impl Observer,
    ) -> Result<Insertion, MeshError> {
        let point = point.into();
        match self.try_insert(point) {
            Ok(insertion) => {
                observer.vertex_inserted(&insertion, self);
                Ok(insertion)
            }
            Err(err) => {
                observer.insertion_rejected(point, &err, self);
                Err(err)
            }
        }
    }

    fn try_insert(&mut self, point: Barycentric) -> Result<Insertion, MeshError> {
        let sum = point.sum();
        if !((sum - 1.).abs() <= self.tolerance) {
            return Err(MeshError::InvalidBarycentricCoordinate { sum });
        }
        let point = Barycentric::new(point.a / sum, point.b / sum, point.c / sum);
        if point.min_weight() < 0. {
            return Err(MeshError::PointOutsideDomain { point });
        }

        self.context.stage(
            &self.domain,
            &self.vertices,
            &self.edges,
            &self.triangles,
            point,
        )?;

        let vertex = self.vertices.push(point);
        if self.context.is_empty() {
            tracing::debug!(?vertex, "point outside every circumcircle");
            return Err(MeshError::PointOutsideCavity { vertex });
        }

        Ok(self.commit(vertex))
    }

    /// Apply the staged cavity rebuild. Cannot fail.
    fn commit(&mut self, vertex: VertexId) -> Insertion {
        let context = &mut self.context;

        let removed = context.bad_triangles.clone();
        for tid in &removed {
            self.triangles.remove(*tid);
        }

        for edge in context.new_edges.drain(..) {
            self.edges.insert(edge);
        }

        let created = context
            .new_triangles
            .drain(..)
            .map(|triangle| self.triangles.insert(triangle))
            .collect::<Vec<_>>();

        for eid in context.interior_edges.drain(..) {
            self.edges.remove(eid);
        }

        tracing::debug!(
            ?vertex,
            removed = removed.len(),
            created = created.len(),
            "vertex inserted"
        );

        Insertion {
            vertex,
            removed,
            created,
        }
    }

    /// Insert `count` points drawn uniformly over the outer triangle.
    /// Returns how many were accepted.
    pub fn insert_random<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> usize {
        let mut accepted = 0;
        for _ in 0..count {
            let point = sampling::uniform_in_triangle(rng);
            match self.insert(point) {
                Ok(_) => accepted += 1,
                Err(err) => tracing::debug!(%err, "random point dropped"),
            }
        }
        accepted
    }
}
