use crate::shape::Edge;

#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn as_usize(&self) -> usize {
        self.0
    }

    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Edge store, same tombstone layout as [`crate::triangles::TriangleStore`].
///
/// An edge lives exactly as long as at least one live triangle references it.
#[derive(Debug, Clone, Default)]
pub struct EdgeStore {
    edges: Vec<Option<Edge>>,
    live: usize,
}

impl EdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns number of live edges
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The id the next inserted edge will receive
    pub(crate) fn next_id(&self) -> EdgeId {
        EdgeId::from_index(self.edges.len())
    }

    pub fn insert(&mut self, edge: Edge) -> EdgeId {
        let id = self.next_id();
        self.edges.push(Some(edge));
        self.live += 1;
        id
    }

    pub fn remove(&mut self, id: EdgeId) -> Option<Edge> {
        let removed = self.edges.get_mut(id.as_usize())?.take();
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub fn get(&self, id: EdgeId) -> Option<Edge> {
        *self.edges.get(id.as_usize())?
    }

    /// iter live edges
    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| e.map(|e| (EdgeId::from_index(idx), e)))
    }
}
