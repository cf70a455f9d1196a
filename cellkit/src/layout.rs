//! Pluggable layout strategies.
//!
//! The engine never positions items itself: it hands a [`Layout`] the item count, the container
//! size and a measuring callback, and caches the returned [`LayoutFrames`] for the pass.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::{Axis, Insets, Point, Rect, Size};

/// A layout strategy.
///
/// `size_at(index, container)` returns the (cached) measured size of item `index`. Strategies
/// must emit frames whose leading edge along [`Layout::axis`] never decreases with the index;
/// visible-range lookups rely on it.
pub trait Layout: fmt::Debug + Send + Sync {
    fn axis(&self) -> Axis;

    fn layout(
        &self,
        container: Size,
        count: usize,
        size_at: &mut dyn FnMut(usize, Size) -> Size,
    ) -> LayoutFrames;
}

/// Frames produced by one layout run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutFrames {
    axis: Axis,
    frames: Vec<Rect>,
    content_size: Size,
    max_main_extent: f32,
}

impl LayoutFrames {
    pub fn new(axis: Axis, frames: Vec<Rect>, content_size: Size) -> Self {
        let max_main_extent = frames
            .iter()
            .map(|f| f.size.main(axis))
            .fold(0.0f32, f32::max);
        Self {
            axis,
            frames,
            content_size,
            max_main_extent,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<Rect> {
        self.frames.get(index).copied()
    }

    pub fn frames(&self) -> &[Rect] {
        &self.frames
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Calls `f` with every index whose frame intersects `visible`, in ascending order.
    pub fn for_each_visible(&self, visible: Rect, mut f: impl FnMut(usize)) {
        let axis = self.axis;
        let lo = visible.min_main(axis);
        let hi = visible.max_main(axis);
        let reach = self.max_main_extent;

        // No frame can end past `lo` while starting before `lo - reach`.
        let start = self
            .frames
            .partition_point(|fr| fr.min_main(axis) + reach <= lo);
        let end = self.frames.partition_point(|fr| fr.min_main(axis) < hi);
        for i in start..end.max(start) {
            if self.frames[i].intersects(&visible) {
                f(i);
            }
        }
    }

    fn translated(mut self, delta: Point, grow: Size) -> Self {
        for frame in &mut self.frames {
            *frame = frame.offset_by(delta);
        }
        self.content_size = Size::new(
            self.content_size.width + grow.width,
            self.content_size.height + grow.height,
        );
        self
    }
}

/// Vertical flow: items fill rows left to right and wrap when the row is full.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowLayout {
    /// Space between items in a row.
    pub spacing: f32,
    /// Space between rows.
    pub line_spacing: f32,
}

impl FlowLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f32) -> Self {
        self.line_spacing = line_spacing;
        self
    }
}

impl Layout for FlowLayout {
    fn axis(&self) -> Axis {
        Axis::Vertical
    }

    fn layout(
        &self,
        container: Size,
        count: usize,
        size_at: &mut dyn FnMut(usize, Size) -> Size,
    ) -> LayoutFrames {
        let mut frames = Vec::with_capacity(count);
        let mut x = 0.0f32;
        let mut y = 0.0f32;
        let mut row_height = 0.0f32;
        let mut row_len = 0usize;
        let mut max_x = 0.0f32;

        for i in 0..count {
            let size = size_at(i, container);
            if row_len > 0 && x + size.width > container.width {
                y += row_height + self.line_spacing;
                x = 0.0;
                row_height = 0.0;
                row_len = 0;
            }
            frames.push(Rect::new(x, y, size.width, size.height));
            max_x = max_x.max(x + size.width);
            x += size.width + self.spacing;
            row_height = row_height.max(size.height);
            row_len += 1;
        }

        let height = if count == 0 { 0.0 } else { y + row_height };
        LayoutFrames::new(Axis::Vertical, frames, Size::new(max_x, height))
    }
}

/// Horizontal single line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowLayout {
    pub spacing: f32,
}

impl RowLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }
}

impl Layout for RowLayout {
    fn axis(&self) -> Axis {
        Axis::Horizontal
    }

    fn layout(
        &self,
        container: Size,
        count: usize,
        size_at: &mut dyn FnMut(usize, Size) -> Size,
    ) -> LayoutFrames {
        let mut frames = Vec::with_capacity(count);
        let mut x = 0.0f32;
        let mut max_y = 0.0f32;
        for i in 0..count {
            let size = size_at(i, container);
            frames.push(Rect::new(x, 0.0, size.width, size.height));
            max_y = max_y.max(size.height);
            x += size.width;
            if i + 1 < count {
                x += self.spacing;
            }
        }
        LayoutFrames::new(Axis::Horizontal, frames, Size::new(x, max_y))
    }
}

/// Wraps another layout and pads it by `insets`.
#[derive(Clone, Debug)]
pub struct InsetLayout {
    pub inner: Arc<dyn Layout>,
    pub insets: Insets,
}

impl InsetLayout {
    pub fn new(inner: impl Layout + 'static, insets: Insets) -> Self {
        Self {
            inner: Arc::new(inner),
            insets,
        }
    }
}

impl Layout for InsetLayout {
    fn axis(&self) -> Axis {
        self.inner.axis()
    }

    fn layout(
        &self,
        container: Size,
        count: usize,
        size_at: &mut dyn FnMut(usize, Size) -> Size,
    ) -> LayoutFrames {
        let inner = container.inset_by(self.insets);
        self.inner.layout(inner, count, size_at).translated(
            Point::new(self.insets.left, self.insets.top),
            Size::new(
                self.insets.left + self.insets.right,
                self.insets.top + self.insets.bottom,
            ),
        )
    }
}
