use crate::{Insets, Point, Size};

/// A lightweight, serializable snapshot of the host geometry of a viewport.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
///
/// This is useful for restoring scroll position across sessions without coupling the engine to
/// any specific UI framework. See [`crate::Viewport::geometry`] and
/// [`crate::Viewport::restore_geometry`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryState {
    pub bounds_size: Size,
    pub content_offset: Point,
    pub safe_area: Insets,
}
