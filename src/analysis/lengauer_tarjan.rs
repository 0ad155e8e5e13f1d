//! Lengauer-Tarjan dominator solver.
//!
//! Implements the classic algorithm from "A Fast Algorithm for Finding
//! Dominators in a Flowgraph" (Lengauer & Tarjan, 1979): one pass over the
//! vertices in decreasing DFS order computing semidominators and implicitly
//! defining immediate dominators through buckets, followed by an ascending
//! fix-up pass.
//!
//! All solver state lives in DFS-number space. Slot 0 is the synthetic
//! super-root: it is the DFS parent of every tree root of the forest and
//! acts as an implicit predecessor of each of them, which makes the
//! multi-root case a plain single-root run. A node whose immediate dominator
//! comes out as the super-root is dominated by no single reachable object
//! and reports "no dominator" - this covers the roots themselves as well as
//! objects reached independently from several roots.
//!
//! Time complexity: O(E log V); the working arrays are freed when the solve
//! completes.

use crate::analysis::dfs::TraversedHeap;
use crate::types::ObjectIndex;

const NONE: u32 = u32::MAX;

/// Stage 4 output: immediate dominators in node space.
pub struct DominatedHeap {
    pub(crate) addresses: Vec<u64>,
    pub(crate) sizes: Vec<u64>,
    pub(crate) roots: Vec<ObjectIndex>,
    pub(crate) dfnum: Vec<u32>,
    /// `idom[i]` is `ObjectIndex::MAX` for roots, for objects dominated by
    /// no single node, and for unreachable objects.
    pub(crate) idom: Vec<ObjectIndex>,
}

impl TraversedHeap {
    pub fn solve(self) -> DominatedHeap {
        let r = self.reachable_count();
        let n = self.addresses.len();
        let mut idom = vec![ObjectIndex::MAX; n];

        if r > 0 {
            let mut state = SolverState::new(r + 1);
            // DFS-space immediate dominators; filled by the bucket step,
            // finalized by the fix-up pass.
            let mut idom_dfs = vec![NONE; r + 1];

            for w in (1..=r as u32).rev() {
                let node = self.vertex[w as usize];

                // Semidominator of w: minimum over eval of every numbered
                // predecessor. Unnumbered predecessors are unreachable and
                // contribute nothing.
                for &p in &self.pred[node as usize] {
                    let v = self.dfnum[p as usize];
                    if v == NONE {
                        continue;
                    }
                    let u = state.eval(v);
                    if state.semi[u as usize] < state.semi[w as usize] {
                        state.semi[w as usize] = state.semi[u as usize];
                    }
                }
                // Tree roots have the virtual super-root edge as an extra
                // predecessor, which pins their semidominator to 0.
                if self.parent[w as usize] == 0 {
                    state.semi[w as usize] = 0;
                }

                let s = state.semi[w as usize];
                state.bucket[s as usize].push(w);
                let p = self.parent[w as usize];
                state.link(p, w);

                // Implicitly define the idom of everything bucketed on w's
                // parent.
                let drained = std::mem::take(&mut state.bucket[p as usize]);
                for v in drained {
                    let u = state.eval(v);
                    idom_dfs[v as usize] = if state.semi[u as usize] < state.semi[v as usize] {
                        u
                    } else {
                        p
                    };
                }
            }

            // Fix-up pass, ascending: where the semidominator was not the
            // immediate dominator, forward through the already-final entry.
            for w in 1..=r {
                let d = idom_dfs[w];
                if d != state.semi[w] {
                    idom_dfs[w] = idom_dfs[d as usize];
                }
            }

            // Back to node space, stripping the super-root.
            for w in 1..=r {
                let d = idom_dfs[w];
                idom[self.vertex[w] as usize] = if d == 0 {
                    ObjectIndex::MAX
                } else {
                    self.vertex[d as usize]
                };
            }
        }

        // pred and the solver arrays are released here.
        DominatedHeap {
            addresses: self.addresses,
            sizes: self.sizes,
            roots: self.roots,
            dfnum: self.dfnum,
            idom,
        }
    }
}

impl DominatedHeap {
    pub fn immediate_dominator(&self, i: ObjectIndex) -> Option<ObjectIndex> {
        match self.idom[i as usize] {
            ObjectIndex::MAX => None,
            d => Some(d),
        }
    }
}

/// The eval/link forest with path compression, in DFS-number space.
struct SolverState {
    semi: Vec<u32>,
    ancestor: Vec<u32>,
    label: Vec<u32>,
    bucket: Vec<Vec<u32>>,
    /// Scratch for the compression walk; reused across eval calls.
    path: Vec<u32>,
}

impl SolverState {
    fn new(len: usize) -> Self {
        Self {
            semi: (0..len as u32).collect(),
            ancestor: vec![NONE; len],
            label: (0..len as u32).collect(),
            bucket: vec![Vec::new(); len],
            path: Vec::new(),
        }
    }

    fn link(&mut self, v: u32, w: u32) {
        self.ancestor[w as usize] = v;
    }

    /// Returns `v` if it is a forest root, otherwise compresses v's ancestor
    /// path and returns the label with the minimum semidominator seen on it.
    fn eval(&mut self, v: u32) -> u32 {
        if self.ancestor[v as usize] == NONE {
            return v;
        }
        self.compress(v);
        self.label[v as usize]
    }

    fn compress(&mut self, v: u32) {
        // Collect the chain from v up to the node directly below the forest
        // root, then rewrite labels and ancestors walking back down. The
        // explicit stack keeps compression safe on paths as deep as the DFS
        // itself.
        self.path.clear();
        let mut cur = v;
        while self.ancestor[self.ancestor[cur as usize] as usize] != NONE {
            self.path.push(cur);
            cur = self.ancestor[cur as usize];
        }
        while let Some(x) = self.path.pop() {
            let a = self.ancestor[x as usize];
            if self.semi[self.label[a as usize] as usize]
                < self.semi[self.label[x as usize] as usize]
            {
                self.label[x as usize] = self.label[a as usize];
            }
            self.ancestor[x as usize] = self.ancestor[a as usize];
        }
    }
}
