use thiserror::Error;

/// Errors reported by the collection engine.
///
/// Contract violations met in the middle of a layout or render pass (an index beyond the
/// flattened item count, a missing section) are not returned: the engine logs them and panics,
/// since they always point at a bug in the supplied provider tree.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("index {index} is out of range for {count} items")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("header source provides {headers} headers for {sections} sections")]
    HeaderCountMismatch { headers: usize, sections: usize },

    #[error("a drag session is already active")]
    DragInProgress,

    #[error("no drag session is active")]
    NoActiveDrag,

    #[error("the provider owning this item does not accept reordering")]
    NotReorderable,

    #[error("no visible element at ({x}, {y})")]
    NoElementAt { x: f32, y: f32 },
}

/// Aborts the current pass on a contract violation.
#[track_caller]
pub(crate) fn contract_violation(err: Error) -> ! {
    cerror!(error = %err, "provider contract violation");
    panic!("cellkit: provider contract violation: {err}")
}
