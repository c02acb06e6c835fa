use std::collections::{HashMap, HashSet};

use crate::{
    domain::OuterTriangle,
    edges::{EdgeId, EdgeStore},
    points::Vertices,
    shape::{Edge, Triangle},
    triangles::{TriangleId, TriangleStore},
    utils::{circumcircle, dist2_to_triangle, orient_2d},
    Barycentric, MeshError, VertexId,
};

/// Staging area for a single insertion.
///
/// Everything an insertion will change is computed here against the
/// untouched mesh; the mesh only commits once staging succeeded, so a failed
/// insertion never leaves a half rebuilt cavity behind. Buffers are reused
/// across insertions to reduce alloc overhead.
#[derive(Debug, Default)]
pub struct InsertContext {
    /// the cavity: connected triangles around the new point, removed on commit
    pub(crate) bad_triangles: Vec<TriangleId>,
    in_cavity: HashSet<TriangleId>,
    /// every triangle whose circumcircle strictly encloses the new point,
    /// indexed by edge, at most two owners per edge
    candidate_edges: HashMap<EdgeId, [Option<TriangleId>; 2]>,
    /// how many cavity triangles reference each touched edge
    edge_refs: HashMap<EdgeId, u32>,
    /// cavity rim, each edge walked in its cavity triangle's winding
    boundary: Vec<(EdgeId, VertexId, VertexId)>,
    /// (outgoing, incoming) rim edges per vertex
    rim_degree: HashMap<VertexId, (u32, u32)>,
    /// edges referenced by more than one cavity triangle plus outer edges
    /// split by the new point, removed on commit
    pub(crate) interior_edges: Vec<EdgeId>,
    /// spoke edge joining an existing vertex to the new one, by existing vertex
    spokes: HashMap<VertexId, EdgeId>,
    pub(crate) new_edges: Vec<Edge>,
    pub(crate) new_triangles: Vec<Triangle>,
}

impl InsertContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.bad_triangles.clear();
        self.in_cavity.clear();
        self.candidate_edges.clear();
        self.edge_refs.clear();
        self.boundary.clear();
        self.rim_degree.clear();
        self.interior_edges.clear();
        self.spokes.clear();
        self.new_edges.clear();
        self.new_triangles.clear();
    }

    /// Whether the last staged point opened no cavity at all
    pub fn is_empty(&self) -> bool {
        self.bad_triangles.is_empty()
    }

    /// Stage the insertion of `point` as the vertex after the current last one.
    ///
    /// The cavity starts at the triangle holding the point and only grows
    /// across edges into neighbours whose circumcircle encloses the point.
    /// Every fan triangle must keep the winding of the outer triangle, a rim
    /// edge seen from behind pulls the triangle across it into the cavity.
    ///
    /// New edge ids are predicted from the edge store, they become real in
    /// the order of `new_edges` when the mesh commits.
    pub(crate) fn stage(
        &mut self,
        domain: &OuterTriangle,
        vertices: &Vertices,
        edges: &EdgeStore,
        triangles: &TriangleStore,
        point: Barycentric,
    ) -> Result<(), MeshError> {
        self.clear();

        let target = domain.to_cartesian(point);
        let position = |v: VertexId| domain.to_cartesian(vertices.get_unchecked(v));

        // strict: a point exactly on a circumcircle keeps the triangle
        let mut seed: Option<(TriangleId, f64)> = None;
        for (tid, triangle) in triangles.iter() {
            let circle = &triangle.circumcircle;
            if domain.squared_distance(point, circle.center) < circle.radius_sq {
                for eid in triangle.edges {
                    let owners = self.candidate_edges.entry(eid).or_default();
                    if owners[0].is_none() {
                        owners[0] = Some(tid);
                    } else {
                        owners[1] = Some(tid);
                    }
                }
            }

            if !matches!(seed, Some((_, d2)) if d2 == 0.) {
                let d2 = dist2_to_triangle(target, triangle.points.map(position));
                if seed.map_or(true, |(_, best)| d2 < best) {
                    seed = Some((tid, d2));
                }
            }
        }
        if self.candidate_edges.is_empty() {
            return Ok(());
        }
        let Some((seed, _)) = seed else {
            return Ok(());
        };
        let Some(seed_triangle) = triangles.get(seed) else {
            return Ok(());
        };

        // a duplicate vertex lies exactly on its incident circumcircles,
        // rounding must not let it open a cavity
        let duplicate = seed_triangle
            .points
            .iter()
            .any(|v| domain.squared_distance(vertices.get_unchecked(*v), point) == 0.);
        if duplicate {
            return Ok(());
        }

        self.in_cavity.insert(seed);
        self.bad_triangles.push(seed);
        let mut next = 0;
        while let Some(tid) = self.bad_triangles.get(next).copied() {
            next += 1;
            let Some(triangle) = triangles.get(tid) else {
                continue;
            };
            for eid in triangle.edges {
                let Some(owners) = self.candidate_edges.get(&eid).copied() else {
                    continue;
                };
                for neighbor in owners.into_iter().flatten() {
                    if self.in_cavity.insert(neighbor) {
                        self.bad_triangles.push(neighbor);
                    }
                }
            }
        }

        let [a, b, c] = domain.corners();
        let winding = orient_2d(a, b, c);
        loop {
            self.collect_boundary(vertices, triangles, point);

            let flipped = self
                .boundary
                .iter()
                .find(|(_, v1, v2)| orient_2d(position(*v1), position(*v2), target) != winding);
            let Some(&(eid, _, _)) = flipped else {
                break;
            };

            let across = triangles
                .iter()
                .find(|(tid, t)| !self.in_cavity.contains(tid) && t.edges.contains(&eid));
            let Some((across, _)) = across else {
                // an outer edge the point does not lie exactly on
                tracing::trace!(?eid, "fan triangle would be inverted");
                self.bad_triangles.clear();
                return Err(MeshError::DegenerateTriangle);
            };
            self.in_cavity.insert(across);
            self.bad_triangles.push(across);
        }

        if let Err(err) = self.check_rim(triangles) {
            self.bad_triangles.clear();
            return Err(err);
        }

        let new_vertex = vertices.next_id();
        let first_edge = edges.next_id().as_usize();

        for i in 0..self.boundary.len() {
            let (eid, v1, v2) = self.boundary[i];
            let spoke_v2 = self.spoke(v2, new_vertex, first_edge);
            let spoke_v1 = self.spoke(v1, new_vertex, first_edge);

            let circle = match circumcircle(
                domain,
                &[vertices.get_unchecked(v1), vertices.get_unchecked(v2), point],
            ) {
                Ok(circle) => circle,
                Err(err) => {
                    self.bad_triangles.clear();
                    return Err(err);
                }
            };

            self.new_triangles.push(Triangle {
                points: [v1, v2, new_vertex],
                edges: [eid, spoke_v2, spoke_v1],
                circumcircle: circle,
            });
        }

        tracing::trace!(
            bad = self.bad_triangles.len(),
            boundary = self.new_triangles.len(),
            interior = self.interior_edges.len(),
            "staged cavity"
        );

        Ok(())
    }

    /// Sort the cavity's edges into rim edges and edges to remove.
    fn collect_boundary(&mut self, vertices: &Vertices, triangles: &TriangleStore, point: Barycentric) {
        self.edge_refs.clear();
        self.boundary.clear();
        self.interior_edges.clear();

        for tid in &self.bad_triangles {
            let Some(triangle) = triangles.get(*tid) else {
                continue;
            };
            for eid in triangle.edges {
                *self.edge_refs.entry(eid).or_insert(0) += 1;
            }
        }

        for tid in &self.bad_triangles {
            let Some(triangle) = triangles.get(*tid) else {
                continue;
            };
            for (i, eid) in triangle.edges.iter().enumerate() {
                if self.edge_refs.get(eid).copied() != Some(1) {
                    if !self.interior_edges.contains(eid) {
                        self.interior_edges.push(*eid);
                    }
                    continue;
                }

                let v1 = triangle.points[i];
                let v2 = triangle.points[(i + 1) % 3];

                // the point sits on this outer edge: the edge is split in two
                // by the spokes of its neighbours instead of getting a flat
                // triangle
                let ends = [vertices.get_unchecked(v1), vertices.get_unchecked(v2), point];
                if Barycentric::common_side(&ends).is_some() {
                    self.interior_edges.push(*eid);
                    continue;
                }

                self.boundary.push((*eid, v1, v2));
            }
        }
    }

    /// The rim must be a single simple loop (or path, after an outer edge
    /// split) through every cavity vertex.
    fn check_rim(&mut self, triangles: &TriangleStore) -> Result<(), MeshError> {
        self.rim_degree.clear();
        for (_, v1, v2) in &self.boundary {
            self.rim_degree.entry(*v1).or_default().0 += 1;
            self.rim_degree.entry(*v2).or_default().1 += 1;
        }
        if self.rim_degree.values().any(|(out, inc)| *out > 1 || *inc > 1) {
            tracing::trace!("cavity rim touches itself");
            return Err(MeshError::DegenerateTriangle);
        }

        // a vertex inside the cavity would be left behind unreferenced
        for tid in &self.bad_triangles {
            let Some(triangle) = triangles.get(*tid) else {
                continue;
            };
            if let Some(v) = triangle.points.iter().find(|v| !self.rim_degree.contains_key(*v)) {
                tracing::trace!(?v, "vertex enclosed by the cavity");
                return Err(MeshError::DegenerateTriangle);
            }
        }
        Ok(())
    }

    /// Spoke from `v` to the new vertex, created once per insertion.
    fn spoke(&mut self, v: VertexId, new_vertex: VertexId, first_edge: usize) -> EdgeId {
        let new_edges = &mut self.new_edges;
        *self.spokes.entry(v).or_insert_with(|| {
            new_edges.push(Edge::new(v, new_vertex));
            EdgeId::from_index(first_edge + new_edges.len() - 1)
        })
    }
}
