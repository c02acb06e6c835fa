use crate::{
    refine::PassStats, Barycentric, Insertion, Mesh, MeshError, Point, TriangleId,
};

/// Observer for the mesh and the refiner, used to monitor how the mesh
/// evolves. Quite useful for visual debugging, check the draw demo.
#[allow(unused_variables)]
pub trait Observer {
    /// A vertex was inserted and its cavity rebuilt
    fn vertex_inserted(&mut self, insertion: &Insertion, mesh: &Mesh) {}

    /// An insertion was refused, the mesh is unchanged apart from the vertex
    /// slot a [`MeshError::PointOutsideCavity`] still consumes
    fn insertion_rejected(&mut self, point: Barycentric, error: &MeshError, mesh: &Mesh) {}

    /// A refinement pass sampled the viewer and seeded its queue
    fn pass_started(&mut self, viewer: Point, mesh: &Mesh) {}

    /// A queued triangle was compared against its target level
    #[inline]
    fn candidate_evaluated(&mut self, triangle_id: TriangleId, level: u32, split: bool, mesh: &Mesh) {}

    /// The refiner queue drained. A run stopped by its insertion budget does
    /// not count, the pass is done once a later run empties the queue
    fn pass_done(&mut self, stats: &PassStats, mesh: &Mesh) {}
}

/// Default dummy observer, blank impl, so all calls should be optimized out by compiler.
impl Observer for () {}
