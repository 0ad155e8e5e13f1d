use crate::analysis::retention::RetentionAnalysis;
use crate::types::ObjectIndex;
use crate::walker::HeapWalker;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Reverse;
use std::fmt;

/// Columnar bulk extract over reachable objects only, in ascending index
/// order. All four columns are positionally aligned. "No dominator" is
/// encoded as address 0, which is never a valid object.
#[derive(Debug, Clone, Serialize)]
pub struct DominatorColumns {
    pub object_addresses: Vec<u64>,
    pub immediate_dominators: Vec<u64>,
    pub dominated_sizes: Vec<u64>,
    pub dominated_counts: Vec<i32>,
}

/// One record of the top-K view. `type_name` is advisory, resolved through
/// the walker.
#[derive(Debug, Clone, Serialize)]
pub struct RetainedObject {
    pub object_address: u64,
    pub immediate_dominator: u64,
    pub dominated_size: u64,
    pub dominated_count: i32,
    pub object_size: u64,
    pub type_name: Option<String>,
}

impl fmt::Display for RetainedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#x} retains {} across {} objects ({})",
            self.object_address,
            format_bytes(self.dominated_size),
            self.dominated_count,
            self.type_name.as_deref().unwrap_or("?"),
        )
    }
}

impl RetentionAnalysis {
    pub fn columns(&self) -> DominatorColumns {
        let mut columns = DominatorColumns {
            object_addresses: Vec::new(),
            immediate_dominators: Vec::new(),
            dominated_sizes: Vec::new(),
            dominated_counts: Vec::new(),
        };
        for i in 0..self.object_count() as ObjectIndex {
            if !self.is_reachable(i) {
                continue;
            }
            columns.object_addresses.push(self.address_of(i));
            columns.immediate_dominators.push(
                self.immediate_dominator(i)
                    .map_or(0, |d| self.address_of(d)),
            );
            columns.dominated_sizes.push(self.dom_size[i as usize]);
            let count = self.dom_count[i as usize];
            debug_assert!(count <= i32::MAX as u32);
            columns.dominated_counts.push(count as i32);
        }
        columns
    }

    /// The `k` reachable objects retaining the most bytes, descending.
    pub fn top_retainers<W: HeapWalker>(&self, walker: &W, k: usize) -> Vec<RetainedObject> {
        (0..self.object_count() as ObjectIndex)
            .filter(|&i| self.is_reachable(i))
            .sorted_by_key(|&i| Reverse(self.dom_size[i as usize]))
            .take(k)
            .map(|i| RetainedObject {
                object_address: self.address_of(i),
                immediate_dominator: self
                    .immediate_dominator(i)
                    .map_or(0, |d| self.address_of(d)),
                dominated_size: self.dom_size[i as usize],
                dominated_count: self.dom_count[i as usize] as i32,
                object_size: self.object_size(i),
                type_name: walker.type_name(self.address_of(i)),
            })
            .collect()
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.2} KB", b as f64 / KB as f64),
        b => format!("{b} bytes"),
    }
}
