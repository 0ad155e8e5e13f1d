use crate::graph::adjacency::HeapGraph;
use crate::types::ObjectIndex;

/// Stage 3 output: a preorder DFS forest over the reference graph.
///
/// DFS numbers live in `[1, R]`; number 0 is reserved for the synthetic
/// super-root that every tree root of the forest hangs off. `dfnum[i]` is
/// `u32::MAX` for objects no root reaches.
pub struct TraversedHeap {
    pub(crate) addresses: Vec<u64>,
    pub(crate) sizes: Vec<u64>,
    pub(crate) roots: Vec<ObjectIndex>,
    pub(crate) pred: Vec<Vec<ObjectIndex>>,
    /// Node space -> DFS number.
    pub(crate) dfnum: Vec<u32>,
    /// DFS number -> node; `vertex[0]` is the super-root slot.
    pub(crate) vertex: Vec<ObjectIndex>,
    /// DFS number -> DFS number of the DFS-tree parent; 0 for tree roots.
    pub(crate) parent: Vec<u32>,
}

impl HeapGraph {
    /// Iterates the root set in enumeration order and numbers every object
    /// first reached from it. The traversal keeps an explicit stack with a
    /// saved child cursor per frame, so reference chains deeper than the
    /// native call stack still complete.
    ///
    /// The forward adjacency is released here; the solver needs only `pred`.
    pub fn traverse(self) -> TraversedHeap {
        let n = self.succ.len();
        let mut dfnum = vec![u32::MAX; n];
        let mut vertex = vec![ObjectIndex::MAX];
        let mut parent = vec![u32::MAX];
        let mut stack: Vec<(ObjectIndex, usize)> = Vec::new();

        for &root in &self.roots {
            if dfnum[root as usize] != u32::MAX {
                continue;
            }
            dfnum[root as usize] = vertex.len() as u32;
            vertex.push(root);
            parent.push(0);
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let v = frame.0;
                let succs = &self.succ[v as usize];
                if frame.1 < succs.len() {
                    let w = succs[frame.1];
                    frame.1 += 1;
                    if dfnum[w as usize] == u32::MAX {
                        dfnum[w as usize] = vertex.len() as u32;
                        vertex.push(w);
                        parent.push(dfnum[v as usize]);
                        stack.push((w, 0));
                    }
                } else {
                    stack.pop();
                }
            }
        }

        TraversedHeap {
            addresses: self.addresses,
            sizes: self.sizes,
            roots: self.roots,
            pred: self.pred,
            dfnum,
            vertex,
            parent,
        }
    }
}

impl TraversedHeap {
    /// Number of objects reached from the root set.
    pub fn reachable_count(&self) -> usize {
        self.vertex.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::index::EnumeratedHeap;
    use crate::testutil::MockHeap;

    fn traverse(heap: &MockHeap) -> TraversedHeap {
        EnumeratedHeap::enumerate(heap)
            .unwrap()
            .build_graph(heap, 1)
            .unwrap()
            .traverse()
    }

    #[test]
    fn test_preorder_numbering_on_chain() {
        let heap = MockHeap::new(
            &[(0x100, 1), (0x200, 1), (0x300, 1)],
            &[(0x100, 0x200), (0x200, 0x300)],
            &[0x100],
        );
        let t = traverse(&heap);

        assert_eq!(t.reachable_count(), 3);
        assert_eq!(t.dfnum, vec![1, 2, 3]);
        assert_eq!(t.vertex, vec![ObjectIndex::MAX, 0, 1, 2]);
        assert_eq!(t.parent, vec![u32::MAX, 0, 1, 2]);
    }

    #[test]
    fn test_unreached_objects_keep_the_sentinel() {
        let heap = MockHeap::new(
            &[(0x100, 1), (0x200, 1), (0x300, 1)],
            &[(0x100, 0x200)],
            &[0x100],
        );
        let t = traverse(&heap);

        assert_eq!(t.reachable_count(), 2);
        assert_eq!(t.dfnum[2], u32::MAX);
    }

    #[test]
    fn test_forest_with_two_roots() {
        let heap = MockHeap::new(
            &[(0x100, 1), (0x200, 1), (0x300, 1)],
            &[(0x100, 0x300), (0x200, 0x300)],
            &[0x100, 0x200],
        );
        let t = traverse(&heap);

        // 0x300 is claimed by the first root's tree; 0x200 starts a new tree
        // whose parent slot points at the super-root.
        assert_eq!(t.dfnum, vec![1, 3, 2]);
        assert_eq!(t.parent, vec![u32::MAX, 0, 1, 0]);
    }

    #[test]
    fn test_cycle_terminates() {
        let heap = MockHeap::new(
            &[(0x100, 1), (0x200, 1)],
            &[(0x100, 0x200), (0x200, 0x100), (0x200, 0x200)],
            &[0x100],
        );
        let t = traverse(&heap);
        assert_eq!(t.reachable_count(), 2);
        assert_eq!(t.dfnum, vec![1, 2]);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        // Deep enough to blow a native stack if the traversal recursed.
        let depth = 200_000u64;
        let objects: Vec<(u64, u64)> = (0..depth).map(|i| (0x1000 + i * 8, 1)).collect();
        let edges: Vec<(u64, u64)> = (0..depth - 1)
            .map(|i| (0x1000 + i * 8, 0x1000 + (i + 1) * 8))
            .collect();
        let heap = MockHeap::new(&objects, &edges, &[0x1000]);
        let t = traverse(&heap);
        assert_eq!(t.reachable_count(), depth as usize);
    }
}
