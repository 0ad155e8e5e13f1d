use crate::graph::index::EnumeratedHeap;
use crate::types::{EngineError, ObjectIndex};
use crate::walker::HeapWalker;
use rayon::prelude::*;

/// Stage 2 output: forward and reverse adjacency over the dense index space.
///
/// `succ[i]` holds the resolved outbound references of object `i`; `pred[i]`
/// is its mirror. Null (zero) and unresolved reference targets are dropped;
/// parallel edges and self-loops are preserved, the dominator algorithm is
/// insensitive to multiplicity.
pub struct HeapGraph {
    pub(crate) addresses: Vec<u64>,
    pub(crate) sizes: Vec<u64>,
    pub(crate) roots: Vec<ObjectIndex>,
    pub(crate) succ: Vec<Vec<ObjectIndex>>,
    pub(crate) pred: Vec<Vec<ObjectIndex>>,
}

impl EnumeratedHeap {
    /// Resolves every object's outbound references through the address map
    /// and materializes both adjacency directions. With `worker_threads > 1`
    /// the extraction fans out over chunked index ranges; shards are merged
    /// serially in chunk order, so the result is identical to a serial build.
    ///
    /// Consumes the enumeration; the address map is released here.
    pub fn build_graph<W>(self, walker: &W, worker_threads: usize) -> Result<HeapGraph, EngineError>
    where
        W: HeapWalker + Sync,
    {
        let n = self.addresses.len();
        let mut succ = vec![Vec::new(); n];
        let mut pred = vec![Vec::new(); n];

        if worker_threads > 1 && n > 0 {
            let chunk_len = n.div_ceil(worker_threads);
            let shards: Vec<Result<Vec<(ObjectIndex, ObjectIndex)>, EngineError>> = self
                .addresses
                .par_chunks(chunk_len)
                .enumerate()
                .map(|(chunk_idx, chunk)| {
                    let base = chunk_idx * chunk_len;
                    let mut scratch = Vec::new();
                    let mut edges = Vec::new();
                    for (offset, &addr) in chunk.iter().enumerate() {
                        let from = (base + offset) as ObjectIndex;
                        self.extract_edges(walker, addr, from, &mut scratch, &mut edges)?;
                    }
                    Ok(edges)
                })
                .collect();

            for shard in shards {
                for (from, to) in shard? {
                    succ[from as usize].push(to);
                    pred[to as usize].push(from);
                }
            }
        } else {
            let mut scratch = Vec::new();
            let mut edges = Vec::new();
            for i in 0..n {
                edges.clear();
                self.extract_edges(
                    walker,
                    self.addresses[i],
                    i as ObjectIndex,
                    &mut scratch,
                    &mut edges,
                )?;
                for &(from, to) in &edges {
                    succ[from as usize].push(to);
                    pred[to as usize].push(from);
                }
            }
        }

        Ok(HeapGraph {
            addresses: self.addresses,
            sizes: self.sizes,
            roots: self.roots,
            succ,
            pred,
        })
    }

    fn extract_edges<W: HeapWalker>(
        &self,
        walker: &W,
        addr: u64,
        from: ObjectIndex,
        scratch: &mut Vec<u64>,
        edges: &mut Vec<(ObjectIndex, ObjectIndex)>,
    ) -> Result<(), EngineError> {
        scratch.clear();
        walker
            .references(addr, scratch)
            .map_err(EngineError::Walker)?;
        for &target in scratch.iter() {
            if target == 0 {
                continue;
            }
            if let Some(&to) = self.addr_to_idx.get(&target) {
                edges.push((from, to));
            }
        }
        Ok(())
    }
}

impl HeapGraph {
    pub fn object_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn edge_count(&self) -> usize {
        self.succ.iter().map(Vec::len).sum()
    }

    pub fn successors(&self, i: ObjectIndex) -> &[ObjectIndex] {
        &self.succ[i as usize]
    }

    pub fn predecessors(&self, i: ObjectIndex) -> &[ObjectIndex] {
        &self.pred[i as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockHeap;

    fn build(heap: &MockHeap, threads: usize) -> HeapGraph {
        EnumeratedHeap::enumerate(heap)
            .unwrap()
            .build_graph(heap, threads)
            .unwrap()
    }

    #[test]
    fn test_forward_and_reverse_edges() {
        let heap = MockHeap::new(
            &[(0x100, 10), (0x200, 20), (0x300, 30)],
            &[(0x100, 0x200), (0x100, 0x300), (0x200, 0x300)],
            &[0x100],
        );
        let graph = build(&heap, 1);

        assert_eq!(graph.successors(0), &[1, 2]);
        assert_eq!(graph.successors(1), &[2]);
        assert_eq!(graph.predecessors(2), &[0, 1]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_null_and_unresolved_targets_are_dropped() {
        let heap = MockHeap::new(
            &[(0x100, 10), (0x200, 20)],
            &[(0x100, 0), (0x100, 0xdead), (0x100, 0x200)],
            &[0x100],
        );
        let graph = build(&heap, 1);

        assert_eq!(graph.successors(0), &[1]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_loops_and_parallel_edges_preserved() {
        let heap = MockHeap::new(
            &[(0x100, 10), (0x200, 20)],
            &[(0x100, 0x100), (0x100, 0x200), (0x100, 0x200)],
            &[0x100],
        );
        let graph = build(&heap, 1);

        assert_eq!(graph.successors(0), &[0, 1, 1]);
        assert_eq!(graph.predecessors(0), &[0]);
        assert_eq!(graph.predecessors(1), &[0, 0]);
    }

    #[test]
    fn test_parallel_build_matches_serial() {
        let mut objects = Vec::new();
        let mut edges = Vec::new();
        for i in 0..97u64 {
            objects.push((0x1000 + i * 16, 8 + i));
            // A mix of chain, skip and back edges across chunk boundaries.
            edges.push((0x1000 + i * 16, 0x1000 + ((i + 1) % 97) * 16));
            edges.push((0x1000 + i * 16, 0x1000 + ((i * 7) % 97) * 16));
        }
        let heap = MockHeap::new(&objects, &edges, &[0x1000]);

        let serial = build(&heap, 1);
        let fanned = build(&heap, 4);
        assert_eq!(serial.succ, fanned.succ);
        assert_eq!(serial.pred, fanned.pred);
    }
}
