//! Drag-to-reorder.
//!
//! `Idle -> Dragging -> {Committing, Cancelling} -> Idle`. A session starts on a long press over
//! a visible element, swaps it with neighbours of the same owning provider while it moves, and
//! is torn down on the [`Viewport::tick`] after it was ended or cancelled. The owner's reorder
//! callback only runs for a committed session that moved at least once.

use alloc::string::String;
use alloc::vec::Vec;

use crate::provider::ReorderCallback;
use crate::{Axis, Element, ElementId, Error, Point, Rect, Viewport};

/// Phase of the drag session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragPhase {
    Dragging,
    /// Ended; the reorder is reported on the next tick.
    Committing,
    /// Cancelled; nothing is reported.
    Cancelling,
}

/// Phase of an already-recognized long-press gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// Public snapshot of the drag session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragInfo {
    pub element: ElementId,
    pub phase: DragPhase,
    /// Local index of the dragged item inside its owning provider.
    pub from: usize,
    /// Local index the item would be reported at, once it moved.
    pub to: Option<usize>,
    /// Current frame of the dragged element.
    pub frame: Rect,
}

pub(crate) struct DragSession {
    pub(crate) element: ElementId,
    pub(crate) identifier: String,
    owner_path: Vec<usize>,
    axis: Axis,
    on_reorder: ReorderCallback,
    initial_local: usize,
    last_reordered: Option<usize>,
    initial_frame: Rect,
    /// The slot the element settles into when released.
    old_frame: Rect,
    pub(crate) frame: Rect,
    /// Gesture location of the previous event, in content coordinates.
    location: Point,
    pub(crate) phase: DragPhase,
}

impl<V: Element> Viewport<V> {
    pub fn drag(&self) -> Option<DragInfo> {
        self.drag.as_ref().map(|drag| DragInfo {
            element: drag.element,
            phase: drag.phase,
            from: drag.initial_local,
            to: drag.last_reordered,
            frame: drag.frame,
        })
    }

    /// Routes a long-press gesture event to the drag state machine.
    pub fn handle_long_press(&mut self, phase: GesturePhase, location: Point) -> Result<(), Error> {
        match phase {
            GesturePhase::Began => self.begin_drag(location).map(|_| ()),
            GesturePhase::Changed => self.drag_moved(location),
            GesturePhase::Ended => {
                self.end_drag();
                Ok(())
            }
            GesturePhase::Cancelled => {
                self.cancel_drag();
                Ok(())
            }
        }
    }

    /// Starts dragging the top-most visible element at `location`.
    pub fn begin_drag(&mut self, location: Point) -> Result<ElementId, Error> {
        if self.drag.is_some() {
            return Err(Error::DragInProgress);
        }
        if !self.provider().can_reorder() {
            return Err(Error::NotReorderable);
        }
        let no_element = Error::NoElementAt {
            x: location.x,
            y: location.y,
        };
        let element = self.element_at_point(location).ok_or(no_element.clone())?;
        let position = self
            .visible
            .position_of_cell(element)
            .ok_or(no_element.clone())?;
        let index = self.visible.indexes[position];
        let identifier = self.visible.identifiers[position].clone();

        let owner = self.flattened.locate(index)?;
        let on_reorder = owner
            .owner
            .hooks()
            .on_reorder
            .clone()
            .ok_or(Error::NotReorderable)?;

        let alpha = self.options.drag_alpha;
        let entry = self.elements.get_mut(&element).ok_or(no_element)?;
        let initial_frame = entry.frame;
        let frame = initial_frame.centered_at(location);
        entry.view.set_frame(frame);
        entry.view.set_alpha(alpha);

        cdebug!(index, local = owner.local, "drag began");
        self.drag = Some(DragSession {
            element,
            identifier,
            owner_path: owner.path,
            axis: owner.axis,
            on_reorder,
            initial_local: owner.local,
            last_reordered: None,
            initial_frame,
            old_frame: initial_frame,
            frame,
            location,
            phase: DragPhase::Dragging,
        });
        Ok(element)
    }

    /// Moves the dragged element to `location` and swaps it with a neighbour once its edge
    /// enters the neighbour's midline band.
    pub fn drag_moved(&mut self, location: Point) -> Result<(), Error> {
        let phase = self
            .drag
            .as_ref()
            .map(|drag| drag.phase)
            .ok_or(Error::NoActiveDrag)?;
        if phase == DragPhase::Dragging {
            self.drag_to(location);
        }
        Ok(())
    }

    /// Releases the dragged element into its last accepted slot. The reorder is reported on the
    /// next tick. Ignored without an active drag.
    pub fn end_drag(&mut self) {
        self.conclude(DragPhase::Committing);
    }

    /// Like [`Viewport::end_drag`], without reporting anything.
    pub fn cancel_drag(&mut self) {
        self.conclude(DragPhase::Cancelling);
    }

    fn conclude(&mut self, phase: DragPhase) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if drag.phase != DragPhase::Dragging {
            return;
        }
        drag.phase = phase;
        drag.frame = drag.old_frame;
        let (element, frame) = (drag.element, drag.old_frame);
        cdebug!(?phase, "drag concluding");

        let ctx = self.context(element, self.index_of(element));
        if let Some(entry) = self.elements.get_mut(&element) {
            entry.animator.update(&mut entry.view, frame, &ctx);
        }
    }

    pub(crate) fn drag_to(&mut self, location: Point) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.frame = drag.frame.centered_at(location);
        let (element, frame) = (drag.element, drag.frame);
        if let Some(entry) = self.elements.get_mut(&element) {
            entry.view.set_frame(frame);
        }
        self.detect_swap(location);
        if let Some(drag) = self.drag.as_mut() {
            drag.location = location;
        }
    }

    fn detect_swap(&mut self, location: Point) {
        let Some(drag) = self.drag.as_ref() else {
            return;
        };
        let axis = drag.axis;
        let frame = drag.frame;
        let to_begin = location.main(axis) < drag.location.main(axis);

        // The lowest visible neighbour of the same owner that overlaps the dragged element.
        let mut neighbour = None;
        for (position, &element) in self.visible.cells.iter().enumerate() {
            if element == drag.element {
                continue;
            }
            let Some(entry) = self.elements.get(&element) else {
                continue;
            };
            if !entry.frame.intersects(&frame) {
                continue;
            }
            let index = self.visible.indexes[position];
            let Ok(candidate) = self.flattened.locate(index) else {
                continue;
            };
            if candidate.path == drag.owner_path && !candidate.is_sticky() {
                neighbour = Some((element, index, candidate.local, entry.frame));
                break;
            }
        }
        let Some((neighbour, index, local, neighbour_frame)) = neighbour else {
            return;
        };

        let band = self.options.reorder_hysteresis;
        let mid = neighbour_frame.mid_main(axis);
        let edge = if to_begin {
            frame.min_main(axis)
        } else {
            frame.max_main(axis)
        };
        if !(edge > mid - band && edge < mid + band) {
            return;
        }

        let target = neighbour_frame.with_main_origin(axis, drag.old_frame.min_main(axis));
        let ctx = self.context(neighbour, Some(index));
        if let Some(entry) = self.elements.get_mut(&neighbour) {
            entry.frame = target;
            entry.animator.update(&mut entry.view, target, &ctx);
        }

        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.old_frame = neighbour_frame;
        drag.last_reordered = Some(if neighbour_frame == drag.initial_frame {
            drag.initial_local
        } else if drag.last_reordered == Some(local) {
            if to_begin {
                local.saturating_sub(1)
            } else {
                local + 1
            }
        } else {
            local
        });
        cdebug!(
            neighbour = local,
            target = ?drag.last_reordered,
            to_begin,
            "drag swapped"
        );
    }

    /// Nudges the content offset while the dragged element hangs past a viewport edge, then
    /// re-evaluates the visible set and swaps.
    pub(crate) fn autoscroll(&mut self) {
        let Some(drag) = self.drag.as_ref() else {
            return;
        };
        let axis = drag.axis;
        let frame = drag.frame;
        let location = drag.location;
        let bounds = self.bounds();
        let step = self.options.autoscroll_step.max(0.0);

        let offset = if frame.max_main(axis) > bounds.max_main(axis) {
            (frame.max_main(axis) - bounds.max_main(axis)).min(step)
        } else if frame.min_main(axis) < bounds.min_main(axis) {
            -(bounds.min_main(axis) - frame.min_main(axis)).min(step)
        } else {
            return;
        };

        let max = (self.content_size.main(axis) - self.bounds_size().main(axis)).max(0.0);
        let current = self.content_offset.main(axis);
        let next = (current + offset).min(max).max(0.0);
        let delta = next - current;
        if delta == 0.0 {
            return;
        }
        ctrace!(delta, "drag autoscroll");
        self.content_offset = self.content_offset.with_main(axis, next);
        self.load_cells();
        self.drag_to(location.with_main(axis, location.main(axis) + delta));
    }

    /// Tears the concluded session down: reports a committed reorder, releases a detached
    /// element and reloads.
    pub(crate) fn finish_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if drag.phase == DragPhase::Committing {
            if let Some(to) = drag.last_reordered {
                cdebug!(from = drag.initial_local, to, "drag committed");
                (drag.on_reorder)(drag.initial_local, to);
            }
        } else {
            cdebug!("drag cancelled");
        }
        if let Some(entry) = self.elements.get_mut(&drag.element) {
            entry.view.set_alpha(1.0);
        }
        if self.visible.position_of_cell(drag.element).is_none() {
            self.recycle(drag.element);
        }
        self.reload();
    }
}
