pub mod dfs;
pub mod lengauer_tarjan;
pub mod retention;

pub use dfs::TraversedHeap;
pub use lengauer_tarjan::DominatedHeap;
pub use retention::RetentionAnalysis;
