mod analysis;
mod graph;
mod progress;
mod report;
#[cfg(test)]
mod testutil;
mod types;
mod walker;

pub use analysis::dfs::TraversedHeap;
pub use analysis::lengauer_tarjan::DominatedHeap;
pub use analysis::retention::RetentionAnalysis;
pub use graph::adjacency::HeapGraph;
pub use graph::index::EnumeratedHeap;
pub use progress::{ConsoleProgress, NullProgress, Phase, ProgressSink};
pub use report::{DominatorColumns, RetainedObject};
pub use types::{EngineError, ObjectIndex};
pub use walker::{HeapObject, HeapWalker, ObjectIter};

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Worker threads for reference extraction in the graph-build stage.
    /// Everything else is inherently serial.
    pub worker_threads: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { worker_threads: 1 }
    }
}

/// Runs the full pipeline over the walker's heap: enumerate and compress,
/// build the reference graph, traverse, solve dominators, aggregate
/// retention. Emits a progress notification at each stage boundary and
/// verifies the result before returning it.
pub fn analyze<W>(
    walker: &W,
    options: &AnalysisOptions,
    progress: &dyn ProgressSink,
) -> Result<RetentionAnalysis, EngineError>
where
    W: HeapWalker + Sync,
{
    progress.phase(Phase::Enumerate);
    let enumerated = EnumeratedHeap::enumerate(walker)?;

    progress.phase(Phase::BuildGraph);
    let graph = enumerated.build_graph(walker, options.worker_threads)?;

    progress.phase(Phase::Traverse);
    let traversed = graph.traverse();

    progress.phase(Phase::Dominators);
    let dominated = traversed.solve();

    progress.phase(Phase::Aggregate);
    let results = dominated.aggregate();
    results.self_check()?;

    progress.phase(Phase::Complete);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockHeap;
    use std::sync::Mutex;

    struct RecordingSink(Mutex<Vec<Phase>>);

    impl ProgressSink for RecordingSink {
        fn phase(&self, phase: Phase) {
            self.0.lock().unwrap().push(phase);
        }
    }

    #[test]
    fn test_analyze_reports_every_phase_in_order() {
        let heap = MockHeap::new(&[(0x100, 10), (0x200, 20)], &[(0x100, 0x200)], &[0x100]);
        let sink = RecordingSink(Mutex::new(Vec::new()));

        let results = analyze(&heap, &AnalysisOptions::default(), &sink).unwrap();

        assert_eq!(results.retained_size(0), Some(30));
        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![
                Phase::Enumerate,
                Phase::BuildGraph,
                Phase::Traverse,
                Phase::Dominators,
                Phase::Aggregate,
                Phase::Complete,
            ]
        );
    }

    #[test]
    fn test_analyze_empty_heap() {
        let heap = MockHeap::new(&[], &[], &[]);
        let results = analyze(&heap, &AnalysisOptions::default(), &NullProgress).unwrap();

        assert_eq!(results.object_count(), 0);
        assert_eq!(results.reachable_count(), 0);
        let columns = results.columns();
        assert!(columns.object_addresses.is_empty());
    }

    #[test]
    fn test_analyze_with_zero_roots() {
        let heap = MockHeap::new(&[(0x100, 10)], &[], &[]);
        let results = analyze(&heap, &AnalysisOptions::default(), &NullProgress).unwrap();

        assert_eq!(results.object_count(), 1);
        assert_eq!(results.reachable_count(), 0);
        assert!(results.columns().object_addresses.is_empty());
    }
}
