use crate::walker::{HeapObject, HeapWalker, ObjectIter};
use ahash::AHashMap;
use anyhow::Result;

/// In-memory heap for unit tests: enumeration order follows the object
/// list, references follow the edge list.
pub(crate) struct MockHeap {
    objects: Vec<HeapObject>,
    references: AHashMap<u64, Vec<u64>>,
    roots: Vec<u64>,
    type_names: AHashMap<u64, String>,
}

impl MockHeap {
    pub fn new(objects: &[(u64, u64)], edges: &[(u64, u64)], roots: &[u64]) -> Self {
        let mut references: AHashMap<u64, Vec<u64>> = AHashMap::new();
        for &(from, to) in edges {
            references.entry(from).or_default().push(to);
        }
        Self {
            objects: objects
                .iter()
                .map(|&(address, size)| HeapObject { address, size })
                .collect(),
            references,
            roots: roots.to_vec(),
            type_names: AHashMap::new(),
        }
    }

    pub fn with_type_name(mut self, address: u64, name: &str) -> Self {
        self.type_names.insert(address, name.to_string());
        self
    }
}

impl HeapWalker for MockHeap {
    fn objects(&self) -> Result<ObjectIter<'_>> {
        Ok(Box::new(self.objects.iter().map(|&o| Ok(o))))
    }

    fn references(&self, address: u64, out: &mut Vec<u64>) -> Result<()> {
        if let Some(targets) = self.references.get(&address) {
            out.extend_from_slice(targets);
        }
        Ok(())
    }

    fn roots(&self) -> Result<Vec<u64>> {
        Ok(self.roots.clone())
    }

    fn type_name(&self, address: u64) -> Option<String> {
        self.type_names.get(&address).cloned()
    }
}
