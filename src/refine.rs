//! Viewer driven refinement.
//!
//! A [`Refiner`] owns its work queue and the viewer position sampled at the
//! start of a pass. Each queued triangle gets a target level from its
//! distance to the viewer; a triangle whose circumradius is too large for
//! that level is split and the triangles that replace it are queued again.

use std::collections::{HashSet, VecDeque};

use crate::{
    lod::LodConfig,
    observer::Observer,
    utils::{dist2_to_segment, dist2_to_triangle},
    Barycentric, Mesh, Point, TriangleId,
};

/// Source of the viewer position, sampled once per pass.
pub trait ViewerSource {
    fn viewer_position(&self) -> Point;
}

impl ViewerSource for Point {
    fn viewer_position(&self) -> Point {
        *self
    }
}

impl<F: Fn() -> Point> ViewerSource for F {
    fn viewer_position(&self) -> Point {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefineConfig {
    pub lod: LodConfig,
    /// Most insertions a single [`Refiner::run`] performs before returning,
    /// bounds the work done per frame
    pub insertion_budget: usize,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            lod: LodConfig::default(),
            insertion_budget: 100_000,
        }
    }
}

impl RefineConfig {
    pub fn new(lod: LodConfig) -> Self {
        Self {
            lod,
            ..Default::default()
        }
    }

    pub fn insertion_budget(mut self, budget: usize) -> Self {
        self.insertion_budget = budget;
        self
    }
}

/// Counters for the current pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// live triangles compared against their target level
    pub evaluated: usize,
    /// accepted insertions
    pub inserted: usize,
    /// too coarse triangles left as they were, every split point refused
    pub dropped: usize,
    /// queued ids already replaced when dequeued
    pub stale: usize,
    /// the last run stopped on the insertion budget with work left
    pub budget_exhausted: bool,
}

/// Where a too coarse triangle gets split.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SplitPoint {
    Circumcenter(Barycentric),
    /// the circumcenter fell outside, split the outer edge closest to it
    OuterEdge(Barycentric),
    Centroid(Barycentric),
}

impl SplitPoint {
    fn point(&self) -> Barycentric {
        match self {
            Self::Circumcenter(p) | Self::OuterEdge(p) | Self::Centroid(p) => *p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Refiner {
    config: RefineConfig,
    viewer: Point,
    queue: VecDeque<TriangleId>,
    queued: HashSet<TriangleId>,
    stats: PassStats,
    /// insertions done by the current `run` call
    run_insertions: usize,
}

impl Refiner {
    pub fn new(config: RefineConfig) -> Self {
        Self {
            config,
            viewer: Point::default(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            stats: PassStats::default(),
            run_insertions: 0,
        }
    }

    pub fn config(&self) -> &RefineConfig {
        &self.config
    }

    /// Viewer position of the current pass
    pub fn viewer(&self) -> Point {
        self.viewer
    }

    pub fn stats(&self) -> PassStats {
        self.stats
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the current pass has nothing left to examine
    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    /// Start a pass: sample the viewer and queue every live triangle.
    pub fn begin_pass(&mut self, mesh: &Mesh, viewer: &impl ViewerSource) {
        self.begin_pass_with_observer(mesh, viewer, &mut ())
    }

    pub fn begin_pass_with_observer(
        &mut self,
        mesh: &Mesh,
        viewer: &impl ViewerSource,
        observer: &mut impl Observer,
    ) {
        self.viewer = viewer.viewer_position();
        self.queue.clear();
        self.queued.clear();
        self.stats = PassStats::default();

        for (tid, _) in mesh.triangles().iter() {
            self.enqueue(tid);
        }

        tracing::debug!(viewer = ?self.viewer, queued = self.queue.len(), "refinement pass started");
        observer.pass_started(self.viewer, mesh);
    }

    /// [`Self::begin_pass`] then [`Self::run`].
    pub fn refine(&mut self, mesh: &mut Mesh, viewer: &impl ViewerSource) -> PassStats {
        self.refine_with_observer(mesh, viewer, &mut ())
    }

    pub fn refine_with_observer(
        &mut self,
        mesh: &mut Mesh,
        viewer: &impl ViewerSource,
        observer: &mut impl Observer,
    ) -> PassStats {
        self.begin_pass_with_observer(mesh, viewer, observer);
        self.run_with_observer(mesh, observer)
    }

    /// Drain the queue, or stop once the insertion budget is spent. A later
    /// call resumes the same pass where this one stopped.
    pub fn run(&mut self, mesh: &mut Mesh) -> PassStats {
        self.run_with_observer(mesh, &mut ())
    }

    pub fn run_with_observer(&mut self, mesh: &mut Mesh, observer: &mut impl Observer) -> PassStats {
        self.run_insertions = 0;
        self.stats.budget_exhausted = false;

        while self.step_with_observer(mesh, observer) {}

        tracing::debug!(
            evaluated = self.stats.evaluated,
            inserted = self.stats.inserted,
            dropped = self.stats.dropped,
            left = self.queue.len(),
            "refinement run done"
        );
        if self.is_done() {
            observer.pass_done(&self.stats, mesh);
        }
        self.stats
    }

    /// Examine one queued triangle. Returns false when there is no work left
    /// for this run, either the queue is empty or the budget is spent.
    pub fn step(&mut self, mesh: &mut Mesh) -> bool {
        self.step_with_observer(mesh, &mut ())
    }

    pub fn step_with_observer(&mut self, mesh: &mut Mesh, observer: &mut impl Observer) -> bool {
        if self.run_insertions >= self.config.insertion_budget {
            self.stats.budget_exhausted = !self.queue.is_empty();
            return false;
        }
        let Some(tid) = self.queue.pop_front() else {
            return false;
        };
        self.queued.remove(&tid);

        let (Some(triangle), Some(points)) = (mesh.triangle(tid), mesh.triangle_points(tid)) else {
            self.stats.stale += 1;
            return true;
        };
        self.stats.evaluated += 1;

        let radius_sq = triangle.circumcircle.radius_sq;
        let level = self.level_of(points);
        let limit = self
            .config
            .lod
            .max_radius_sq(level, mesh.root_radius_sq());
        let split = radius_sq > limit;
        observer.candidate_evaluated(tid, level, split, mesh);
        if !split {
            return true;
        }

        for candidate in Self::split_points(mesh, tid) {
            match mesh.insert_with_observer(candidate.point(), observer) {
                Ok(insertion) => {
                    self.stats.inserted += 1;
                    self.run_insertions += 1;
                    // an outer edge split may land outside this circumcircle
                    if !insertion.removed.contains(&tid) {
                        self.enqueue(tid);
                    }
                    for created in insertion.created {
                        self.enqueue(created);
                    }
                    return true;
                }
                Err(err) if err.is_recoverable() => {
                    tracing::trace!(?tid, ?candidate, %err, "split point refused");
                }
                Err(err) => {
                    tracing::warn!(?tid, %err, "split failed");
                    break;
                }
            }
        }

        self.stats.dropped += 1;
        true
    }

    /// Target level of a live triangle, from its distance to the viewer.
    pub fn target_level(&self, mesh: &Mesh, tid: TriangleId) -> Option<u32> {
        mesh.triangle_points(tid).map(|points| self.level_of(points))
    }

    fn level_of(&self, points: [Point; 3]) -> u32 {
        let d2 = dist2_to_triangle(self.viewer, points);
        self.config.lod.target_subdivision_level(d2)
    }

    fn enqueue(&mut self, tid: TriangleId) {
        if self.queued.insert(tid) {
            self.queue.push_back(tid);
        }
    }

    /// Split points to try in order: the circumcenter when it lies in the
    /// domain, else the midpoint of the outer edge nearest to it; the
    /// centroid last.
    fn split_points(mesh: &Mesh, tid: TriangleId) -> Vec<SplitPoint> {
        let mut points = Vec::with_capacity(2);
        let (Some(triangle), Some(corners)) = (mesh.triangle(tid), mesh.triangle_barycentric(tid))
        else {
            return points;
        };

        let center = triangle.circumcircle.center;
        if center.min_weight() >= 0. {
            points.push(SplitPoint::Circumcenter(center));
        } else if let Some(midpoint) = Self::nearest_outer_edge_midpoint(mesh, center) {
            points.push(SplitPoint::OuterEdge(midpoint));
        }
        points.push(SplitPoint::Centroid(Barycentric::centroid(&corners)));
        points
    }

    fn nearest_outer_edge_midpoint(mesh: &Mesh, target: Barycentric) -> Option<Barycentric> {
        let domain = mesh.domain();
        let target_xy = domain.to_cartesian(target);
        let vertices = mesh.vertices();

        mesh.edges()
            .iter()
            .filter_map(|(_, edge)| {
                let p = vertices.get(edge.p)?;
                let q = vertices.get(edge.q)?;
                Barycentric::common_side(&[p, q])?;
                let d2 = dist2_to_segment(target_xy, domain.to_cartesian(p), domain.to_cartesian(q));
                Some((d2, p, q))
            })
            .min_by(|(d1, _, _), (d2, _, _)| d1.total_cmp(d2))
            .map(|(_, p, q)| {
                // exact zeros on the shared side survive the average
                Barycentric::new((p.a + q.a) / 2., (p.b + q.b) / 2., (p.c + q.c) / 2.)
            })
    }
}

impl Default for Refiner {
    fn default() -> Self {
        Self::new(RefineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeshError;

    fn scenario_mesh() -> Mesh {
        Mesh::new([Point::new(0., 0.), Point::new(10., 0.), Point::new(5., 10.)]).unwrap()
    }

    #[derive(Default)]
    struct CountingOb {
        inserted: usize,
        rejected: usize,
        evaluated: usize,
        passes: usize,
    }

    impl Observer for CountingOb {
        fn vertex_inserted(&mut self, _insertion: &crate::Insertion, _mesh: &Mesh) {
            self.inserted += 1;
        }

        fn insertion_rejected(&mut self, _point: Barycentric, _error: &MeshError, _mesh: &Mesh) {
            self.rejected += 1;
        }

        fn candidate_evaluated(&mut self, _tid: TriangleId, _level: u32, _split: bool, _mesh: &Mesh) {
            self.evaluated += 1;
        }

        fn pass_done(&mut self, _stats: &PassStats, _mesh: &Mesh) {
            self.passes += 1;
        }
    }

    /// every live triangle meets its target once a pass drains
    fn assert_converged(refiner: &Refiner, mesh: &Mesh) {
        let lod = refiner.config().lod;
        for (tid, t) in mesh.triangles().iter() {
            let level = refiner.target_level(mesh, tid).unwrap();
            let limit = lod.max_radius_sq(level, mesh.root_radius_sq());
            assert!(
                t.circumcircle.radius_sq <= limit,
                "{tid:?} level {level} r2 {} > {limit}",
                t.circumcircle.radius_sq
            );
        }
    }

    #[test]
    fn test_far_viewer_keeps_mesh() {
        let mut mesh = scenario_mesh();
        let mut refiner = Refiner::new(RefineConfig::new(LodConfig::new(100., 5.).unwrap()));

        let stats = refiner.refine(&mut mesh, &Point::new(1e6, 1e6));
        assert_eq!(stats.evaluated, 1);
        assert_eq!(stats.inserted, 0);
        assert!(refiner.is_done());
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_refines_near_viewer() {
        let mut mesh = scenario_mesh();
        let mut refiner = Refiner::new(RefineConfig::new(LodConfig::new(10., 2.).unwrap()));
        let mut ob = CountingOb::default();

        let viewer = Point::new(5., 3.);
        let stats = refiner.refine_with_observer(&mut mesh, &viewer, &mut ob);

        assert!(stats.inserted > 0);
        assert!(!stats.budget_exhausted);
        assert_eq!(ob.inserted, stats.inserted);
        assert_eq!(ob.evaluated, stats.evaluated);
        assert_eq!(ob.passes, 1);
        // refused split points may still have used a vertex slot
        assert!(mesh.vertex_count() >= 3 + stats.inserted);
        assert!(mesh.vertex_count() <= 3 + stats.inserted + ob.rejected);
        assert_eq!(stats.dropped, 0);
        mesh.validate().unwrap();
        assert_converged(&refiner, &mesh);

        // nothing left to do for the same viewer
        let again = refiner.refine(&mut mesh, &viewer);
        assert_eq!(again.inserted, 0);
    }

    #[test]
    fn test_density_falls_off() {
        let mut mesh = scenario_mesh();
        let mut refiner = Refiner::new(RefineConfig::new(LodConfig::new(10., 3.).unwrap()));
        refiner.refine(&mut mesh, &Point::new(2., 1.));
        mesh.validate().unwrap();

        // more vertices around the viewer than around the far corner
        let near = Point::new(2., 1.);
        let far = Point::new(5., 9.);
        let count_within = |c: Point| {
            mesh.vertices()
                .iter()
                .filter(|(_, p)| mesh.domain().to_cartesian(*p).dist2(c) < 4.)
                .count()
        };
        assert!(count_within(near) > count_within(far));
    }

    #[test]
    fn test_budget_resumes() {
        let mut mesh = scenario_mesh();
        let mut refiner =
            Refiner::new(RefineConfig::new(LodConfig::new(10., 2.).unwrap()).insertion_budget(3));

        let mut ob = CountingOb::default();
        refiner.begin_pass(&mesh, &Point::new(5., 3.));
        let first = refiner.run_with_observer(&mut mesh, &mut ob);
        assert_eq!(first.inserted, 3);
        assert!(first.budget_exhausted);
        assert!(!refiner.is_done());
        // a budget stop is not the end of the pass
        assert_eq!(ob.passes, 0);

        let mut runs = 1;
        while !refiner.is_done() {
            refiner.run_with_observer(&mut mesh, &mut ob);
            runs += 1;
            assert!(runs < 10_000);
        }
        assert_eq!(ob.passes, 1);
        assert!(!refiner.stats().budget_exhausted);
        mesh.validate().unwrap();
        assert_converged(&refiner, &mesh);
    }

    #[test]
    fn test_viewer_closure_is_sampled_per_pass() {
        use std::cell::Cell;

        let mut mesh = scenario_mesh();
        let mut refiner = Refiner::new(RefineConfig::new(LodConfig::new(10., 2.).unwrap()));
        let position = Cell::new(Point::new(1e6, 1e6));
        let source = || position.get();

        refiner.begin_pass(&mesh, &source);
        position.set(Point::new(5., 3.));
        // the pass keeps the position it started with
        refiner.run(&mut mesh);
        assert_eq!(refiner.viewer(), Point::new(1e6, 1e6));
        assert_eq!(mesh.triangle_count(), 1);

        refiner.refine(&mut mesh, &source);
        assert_eq!(refiner.viewer(), Point::new(5., 3.));
        assert!(mesh.triangle_count() > 1);
    }

    #[test]
    fn test_stale_ids_are_skipped() {
        let mut mesh = scenario_mesh();
        let mut refiner = Refiner::new(RefineConfig::new(LodConfig::new(10., 2.).unwrap()));
        refiner.begin_pass(&mesh, &Point::new(5., 3.));
        // replace the only queued triangle behind the refiner's back
        mesh.insert_from_cartesian(5., 3.).unwrap();

        assert!(refiner.step(&mut mesh));
        assert_eq!(refiner.stats().stale, 1);
        assert!(!refiner.step(&mut mesh));
    }

    #[test]
    fn test_outer_edge_split_point() {
        let mut mesh = scenario_mesh();
        // a flat triangle along the bottom edge, circumcenter below y = 0
        mesh.insert_from_cartesian(5., 0.5).unwrap();
        let (tid, _) = mesh
            .triangles()
            .iter()
            .find(|(_, t)| t.has_point(crate::VertexId(0)) && t.has_point(crate::VertexId(1)))
            .unwrap();

        let points = Refiner::split_points(&mesh, tid);
        match points[0] {
            SplitPoint::OuterEdge(p) => {
                assert_eq!(p.c, 0.);
                let xy = mesh.domain().to_cartesian(p);
                assert!((xy.x - 5.).abs() < 1e-9 && xy.y.abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(points.last(), Some(SplitPoint::Centroid(_))));
    }
}
