use anyhow::Result;

/// One enumerated heap object: its raw address and its shallow size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapObject {
    pub address: u64,
    pub size: u64,
}

/// Boxed object stream, so implementors can return whatever iterator shape
/// their dump format produces.
pub type ObjectIter<'a> = Box<dyn Iterator<Item = Result<HeapObject>> + 'a>;

/// The heap-walker collaborator the engine consumes. The walker owns the raw
/// dump; the engine reads it exactly once per stage and never writes back.
///
/// Addresses are opaque 64-bit values. Address 0 is never a valid object; a
/// reference target of 0 means "null".
///
/// All failures are fatal to the analysis. The engine offers no retry.
pub trait HeapWalker {
    /// Walk every typed object once. The stream must be finite and each
    /// address unique. Objects without a resolvable type are simply not
    /// yielded.
    fn objects(&self) -> Result<ObjectIter<'_>>;

    /// Append the outbound reference targets of the object at `address` to
    /// `out`. Targets may be 0 (null) or point at regions that were never
    /// enumerated as objects; the engine drops those.
    fn references(&self, address: u64, out: &mut Vec<u64>) -> Result<()>;

    /// Root object addresses (stack roots, statics, handles). May contain
    /// duplicates and addresses that resolve to no enumerated object.
    fn roots(&self) -> Result<Vec<u64>>;

    /// Advisory type name for reporting. Not consulted during analysis.
    fn type_name(&self, _address: u64) -> Option<String> {
        None
    }
}
