use crate::types::{EngineError, ObjectIndex};
use crate::walker::HeapWalker;
use ahash::{AHashMap, AHashSet};

/// Stage 1 output: the raw address space compressed into dense indices.
///
/// Walks the heap exactly once, assigning each object an index in `[0, N)` in
/// enumeration order. Parallel arrays hold the raw address and shallow size
/// per index; the address map is kept alive only until the reference graph is
/// built.
#[derive(Debug)]
pub struct EnumeratedHeap {
    pub(crate) addr_to_idx: AHashMap<u64, ObjectIndex>,
    pub(crate) addresses: Vec<u64>,
    pub(crate) sizes: Vec<u64>,
    pub(crate) roots: Vec<ObjectIndex>,
}

impl EnumeratedHeap {
    pub fn enumerate<W: HeapWalker>(walker: &W) -> Result<Self, EngineError> {
        let mut addresses = Vec::new();
        let mut sizes = Vec::new();
        let mut addr_to_idx = AHashMap::new();

        for object in walker.objects().map_err(EngineError::Walker)? {
            let object = object.map_err(EngineError::Walker)?;
            if object.address == 0 {
                return Err(EngineError::Walker(anyhow::anyhow!(
                    "walker enumerated an object at the null address"
                )));
            }
            let idx = addresses.len() as ObjectIndex;
            addresses.push(object.address);
            sizes.push(object.size);
            if addr_to_idx.insert(object.address, idx).is_some() {
                return Err(EngineError::Walker(anyhow::anyhow!(
                    "walker enumerated address {:#x} twice",
                    object.address
                )));
            }
        }

        // Roots are deduplicated; addresses that never showed up as objects
        // (the dump may root regions that are not enumerable) are dropped.
        let mut seen = AHashSet::new();
        let mut roots = Vec::new();
        for addr in walker.roots().map_err(EngineError::Walker)? {
            if !seen.insert(addr) {
                continue;
            }
            if let Some(&idx) = addr_to_idx.get(&addr) {
                roots.push(idx);
            }
        }

        Ok(Self {
            addr_to_idx,
            addresses,
            sizes,
            roots,
        })
    }

    pub fn object_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn roots(&self) -> &[ObjectIndex] {
        &self.roots
    }

    pub fn index_of(&self, address: u64) -> Option<ObjectIndex> {
        self.addr_to_idx.get(&address).copied()
    }

    pub fn address_of(&self, index: ObjectIndex) -> u64 {
        self.addresses[index as usize]
    }
}
