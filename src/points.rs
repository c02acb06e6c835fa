use crate::shape::Barycentric;

/// Type alias to the underlying type for VertexId.
/// VertexId compare is in hot path, e.g, cavity edge lookup, triangle membership
type NumType = u32;

/// new type for vertex id, it is the index in the append-only vertex store
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexId(pub(crate) NumType);

impl VertexId {
    /// Get the inner value as usize
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self(index as NumType)
    }

    /// Whether this is one of the three outer corners
    pub fn is_corner(&self) -> bool {
        self.0 < 3
    }
}

/// Vertex store.
///
/// Append only: an id, once handed out, always refers to the same point, even
/// after no triangle references the vertex anymore.
#[derive(Clone, Debug)]
pub struct Vertices {
    points: Vec<Barycentric>,
}

impl Vertices {
    /// A store holding the three outer corners at ids 0, 1, 2.
    pub fn with_corners() -> Self {
        Self {
            points: Barycentric::CORNERS.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The id the next pushed vertex will receive
    pub fn next_id(&self) -> VertexId {
        VertexId::from_index(self.points.len())
    }

    pub fn push(&mut self, point: Barycentric) -> VertexId {
        let id = self.next_id();
        self.points.push(point);
        id
    }

    /// get point for id
    pub fn get(&self, id: VertexId) -> Option<Barycentric> {
        self.points.get(id.as_usize()).copied()
    }

    /// helper used in the crate when the id is known to come from this store
    pub(crate) fn get_unchecked(&self, id: VertexId) -> Barycentric {
        debug_assert!(id.as_usize() < self.points.len());
        self.points[id.as_usize()]
    }

    /// iter all points
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, Barycentric)> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, p)| (VertexId::from_index(idx), *p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices() {
        let mut vertices = Vertices::with_corners();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices.next_id(), VertexId(3));

        let id = vertices.push(Barycentric::new(0.2, 0.3, 0.5));
        assert_eq!(id, VertexId(3));
        assert!(!id.is_corner());
        assert!(VertexId(2).is_corner());
        assert_eq!(vertices.get(id), Some(Barycentric::new(0.2, 0.3, 0.5)));
        assert_eq!(vertices.get(VertexId(0)), Some(Barycentric::new(1., 0., 0.)));
        assert_eq!(vertices.get(VertexId(9)), None);
        assert_eq!(vertices.iter().count(), 4);
    }
}
