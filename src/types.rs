/// Dense index of an object in the compressed heap, assigned in enumeration
/// order. `ObjectIndex::MAX` is the in-array sentinel for "no object": an
/// unreachable node in `dfnum`, or "no dominator" in `idom`.
pub type ObjectIndex = u32;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The heap walker failed while being consumed. Fatal; the engine does
    /// not retry.
    #[error("heap walker failed: {0}")]
    Walker(#[source] anyhow::Error),

    /// An internal consistency check failed after the pipeline completed.
    /// Indicates a bug in the engine, not in the input.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}
