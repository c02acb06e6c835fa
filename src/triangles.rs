use crate::shape::Triangle;

#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TriangleId(usize);

impl TriangleId {
    pub fn as_usize(&self) -> usize {
        self.0
    }

    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Triangle store.
///
/// Removed triangles leave a tombstone so ids never get reused; a stale id
/// held by the refiner simply resolves to `None`.
// Note: for n vertices there are around 2n live triangles, while the number
//       of slots grows with the total number of cavity rebuilds.
#[derive(Debug, Clone, Default)]
pub struct TriangleStore {
    triangles: Vec<Option<Triangle>>,
    live: usize,
}

impl TriangleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns number of live triangles
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated, live or removed
    pub fn slots(&self) -> usize {
        self.triangles.len()
    }

    /// insert a new triangle
    pub fn insert(&mut self, triangle: Triangle) -> TriangleId {
        let id = TriangleId::from_index(self.triangles.len());
        self.triangles.push(Some(triangle));
        self.live += 1;
        id
    }

    /// mark the slot removed, returning the triangle it held
    pub fn remove(&mut self, id: TriangleId) -> Option<Triangle> {
        let removed = self.triangles.get_mut(id.as_usize())?.take();
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub fn get(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id.as_usize())?.as_ref()
    }

    pub fn contains(&self, id: TriangleId) -> bool {
        self.get(id).is_some()
    }

    /// iter live triangles
    pub fn iter(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> {
        self.triangles
            .iter()
            .enumerate()
            .filter_map(|(idx, t)| t.as_ref().map(|t| (TriangleId::from_index(idx), t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        edges::EdgeId,
        shape::{Barycentric, Circumcircle},
        VertexId,
    };

    fn triangle(a: usize, b: usize, c: usize) -> Triangle {
        Triangle {
            points: [
                VertexId::from_index(a),
                VertexId::from_index(b),
                VertexId::from_index(c),
            ],
            edges: [EdgeId::from_index(0); 3],
            circumcircle: Circumcircle {
                center: Barycentric::new(1. / 3., 1. / 3., 1. / 3.),
                radius_sq: 1.,
            },
        }
    }

    #[test]
    fn test_triangles() {
        let mut triangles = TriangleStore::new();
        let t1 = triangles.insert(triangle(0, 1, 2));
        let t2 = triangles.insert(triangle(1, 2, 3));
        assert_eq!(triangles.len(), 2);

        let removed = triangles.remove(t1).unwrap();
        assert_eq!(removed.points[0], VertexId::from_index(0));
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles.slots(), 2);
        assert!(!triangles.contains(t1));
        assert!(triangles.contains(t2));

        // removing twice is a no-op
        assert!(triangles.remove(t1).is_none());
        assert_eq!(triangles.len(), 1);

        // ids are not reused
        let t3 = triangles.insert(triangle(2, 3, 4));
        assert_ne!(t3, t1);
        assert_eq!(
            triangles.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            vec![t2, t3]
        );
    }

    #[test]
    fn test_unknown_id() {
        let triangles = TriangleStore::new();
        assert!(triangles.get(TriangleId::from_index(0)).is_none());
        assert!(triangles.get(TriangleId::from_index(usize::MAX)).is_none());
    }
}
