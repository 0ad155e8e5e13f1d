use crate::analysis::lengauer_tarjan::DominatedHeap;
use crate::types::{EngineError, ObjectIndex};
use fixedbitset::FixedBitSet;

/// Stage 5 output and the engine's externally visible result: per reachable
/// object, its immediate dominator, the bytes retained by its dominator
/// subtree and the number of objects in it.
pub struct RetentionAnalysis {
    pub(crate) addresses: Vec<u64>,
    pub(crate) sizes: Vec<u64>,
    pub(crate) roots: Vec<ObjectIndex>,
    pub(crate) dfnum: Vec<u32>,
    pub(crate) idom: Vec<ObjectIndex>,
    pub(crate) dom_size: Vec<u64>,
    pub(crate) dom_count: Vec<u32>,
}

impl DominatedHeap {
    /// Inverts `idom` into children lists and sums sizes and counts over the
    /// dominator tree in iterative post-order: every frame is pushed twice,
    /// once to expand its children and once, flagged, to fold them.
    ///
    /// Walks start at every reachable object with no dominator - the roots
    /// plus objects dominated by no single node - so each reachable object
    /// is folded into exactly one walk. The visited guard only matters for
    /// malformed dominator relations; by construction it never fires.
    pub fn aggregate(self) -> RetentionAnalysis {
        let n = self.addresses.len();
        let mut children: Vec<Vec<ObjectIndex>> = vec![Vec::new(); n];
        for i in 0..n {
            let d = self.idom[i];
            if d != ObjectIndex::MAX {
                children[d as usize].push(i as ObjectIndex);
            }
        }

        let mut dom_size = vec![0u64; n];
        let mut dom_count = vec![0u32; n];
        let mut visited = FixedBitSet::with_capacity(n);
        let mut stack: Vec<(ObjectIndex, bool)> = Vec::new();

        for i in 0..n {
            if self.dfnum[i] == u32::MAX || self.idom[i] != ObjectIndex::MAX {
                continue;
            }
            stack.push((i as ObjectIndex, false));
            while let Some((v, expanded)) = stack.pop() {
                if expanded {
                    let mut size = self.sizes[v as usize];
                    let mut count = 1u32;
                    for &c in &children[v as usize] {
                        size += dom_size[c as usize];
                        count += dom_count[c as usize];
                    }
                    dom_size[v as usize] = size;
                    dom_count[v as usize] = count;
                } else {
                    if visited.put(v as usize) {
                        continue;
                    }
                    stack.push((v, true));
                    for &c in &children[v as usize] {
                        stack.push((c, false));
                    }
                }
            }
        }

        RetentionAnalysis {
            addresses: self.addresses,
            sizes: self.sizes,
            roots: self.roots,
            dfnum: self.dfnum,
            idom: self.idom,
            dom_size,
            dom_count,
        }
    }
}

impl RetentionAnalysis {
    pub fn object_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn reachable_count(&self) -> usize {
        self.dfnum.iter().filter(|&&d| d != u32::MAX).count()
    }

    pub fn is_reachable(&self, i: ObjectIndex) -> bool {
        self.dfnum[i as usize] != u32::MAX
    }

    pub fn address_of(&self, i: ObjectIndex) -> u64 {
        self.addresses[i as usize]
    }

    pub fn object_size(&self, i: ObjectIndex) -> u64 {
        self.sizes[i as usize]
    }

    pub fn roots(&self) -> &[ObjectIndex] {
        &self.roots
    }

    /// `None` for roots, for objects dominated by no single node, and for
    /// unreachable objects.
    pub fn immediate_dominator(&self, i: ObjectIndex) -> Option<ObjectIndex> {
        match self.idom[i as usize] {
            ObjectIndex::MAX => None,
            d => Some(d),
        }
    }

    /// Bytes retained by `i`'s dominator subtree; `None` if unreachable.
    pub fn retained_size(&self, i: ObjectIndex) -> Option<u64> {
        self.is_reachable(i).then(|| self.dom_size[i as usize])
    }

    /// Objects in `i`'s dominator subtree, including itself; `None` if
    /// unreachable.
    pub fn retained_count(&self, i: ObjectIndex) -> Option<u32> {
        self.is_reachable(i).then(|| self.dom_count[i as usize])
    }

    /// Post-run consistency check: dominator chains must stay inside the
    /// reachable set and point strictly upward in DFS order, and the
    /// retained sizes of dominator-less objects must conserve the total
    /// reachable size.
    pub(crate) fn self_check(&self) -> Result<(), EngineError> {
        let mut total = 0u64;
        let mut top = 0u64;
        for i in 0..self.addresses.len() {
            if self.dfnum[i] == u32::MAX {
                if self.idom[i] != ObjectIndex::MAX {
                    return Err(EngineError::Invariant(format!(
                        "unreachable object {i} was assigned a dominator"
                    )));
                }
                continue;
            }
            total += self.sizes[i];
            match self.idom[i] {
                ObjectIndex::MAX => top += self.dom_size[i],
                d => {
                    if self.dfnum[d as usize] == u32::MAX {
                        return Err(EngineError::Invariant(format!(
                            "dominator of object {i} is unreachable"
                        )));
                    }
                    if self.dfnum[d as usize] >= self.dfnum[i] {
                        return Err(EngineError::Invariant(format!(
                            "dominator of object {i} does not precede it in DFS order"
                        )));
                    }
                }
            }
        }
        if total != top {
            return Err(EngineError::Invariant(format!(
                "retained sizes do not conserve the heap: top-level {top} != reachable {total}"
            )));
        }
        Ok(())
    }
}
