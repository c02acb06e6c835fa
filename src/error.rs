use crate::{Barycentric, VertexId};

/// Errors raised while building or mutating a [`crate::Mesh`].
///
/// Every insertion error is detected before the mesh is touched, except
/// [`MeshError::PointOutsideCavity`], which still consumes a vertex slot.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The outer triangle has (near) zero area, so no barycentric frame exists.
    #[error("outer triangle is degenerate")]
    DegenerateDomain,

    /// Circumcenter normalization sum vanished for a candidate triangle.
    #[error("triangle has degenerate circumgeometry")]
    DegenerateTriangle,

    #[error("barycentric weights sum to {sum}, expected 1")]
    InvalidBarycentricCoordinate { sum: f64 },

    /// No live circumcircle strictly encloses the point. The vertex was still
    /// appended and keeps its index.
    #[error("point {vertex:?} is not enclosed by any circumcircle")]
    PointOutsideCavity { vertex: VertexId },

    #[error("point {point:?} lies outside the outer triangle")]
    PointOutsideDomain { point: Barycentric },

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

impl MeshError {
    /// Whether a refinement pass may drop the offending candidate and go on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::DegenerateDomain | Self::InvalidConfig(_))
    }
}

/// Invariant violations reported by [`crate::Mesh::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("edge {edge:?} is referenced by {count} triangles")]
    EdgeReferenceCount { edge: crate::EdgeId, count: usize },

    #[error("triangle {triangle:?} references removed edge {edge:?}")]
    DanglingEdge {
        triangle: crate::TriangleId,
        edge: crate::EdgeId,
    },

    #[error("triangle {triangle:?} edges do not form a cycle")]
    BrokenCycle { triangle: crate::TriangleId },

    #[error("vertex {vertex:?} lies inside the circumcircle of {triangle:?}")]
    DelaunayViolation {
        triangle: crate::TriangleId,
        vertex: VertexId,
    },

    #[error("triangle {triangle:?} is not wound like the outer triangle")]
    InvertedTriangle { triangle: crate::TriangleId },

    /// Doubled areas, the triangles overlap or leave gaps.
    #[error("triangles cover {covered}, the outer triangle {expected}")]
    CoverageMismatch { covered: f64, expected: f64 },

    #[error("two live edges join the same vertices {0:?}")]
    DuplicateEdge(crate::Edge),
}
