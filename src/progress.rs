use indicatif::{ProgressBar, ProgressStyle};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enumerate,
    BuildGraph,
    Traverse,
    Dominators,
    Aggregate,
    Complete,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Enumerate => "Phase 1",
            Phase::BuildGraph => "Phase 2",
            Phase::Traverse => "Phase 3",
            Phase::Dominators => "Phase 4",
            Phase::Aggregate => "Phase 5",
            Phase::Complete => "Complete",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Phase::Enumerate => "enumerating objects",
            Phase::BuildGraph => "building reference graph",
            Phase::Traverse => "depth-first traversal",
            Phase::Dominators => "computing dominators",
            Phase::Aggregate => "aggregating retained sizes",
            Phase::Complete => "done",
        }
    }
}

/// Push-only progress notifications, emitted at stage boundaries. Sinks must
/// be non-blocking and thread-safe; there is no back-channel.
pub trait ProgressSink: Send + Sync {
    fn phase(&self, phase: Phase);
}

/// Discards all notifications.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn phase(&self, _phase: Phase) {}
}

/// Spinner on stderr showing the current phase.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn phase(&self, phase: Phase) {
        if phase == Phase::Complete {
            self.bar.finish_with_message(phase.label());
        } else {
            self.bar
                .set_message(format!("{}: {}", phase.label(), phase.description()));
        }
    }
}
