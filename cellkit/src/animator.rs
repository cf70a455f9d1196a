use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::{ElementId, Point, Rect};

/// The narrow surface the engine needs from a visual element.
pub trait Element {
    fn set_frame(&mut self, frame: Rect);

    fn set_alpha(&mut self, _alpha: f32) {}
}

/// Read-only view of the viewport handed to animators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationContext {
    pub element: ElementId,
    /// Flattened index of the element, `None` for elements leaving the visible set.
    pub index: Option<usize>,
    pub is_reloading: bool,
    /// A drag session is active (including its settle phase).
    pub is_dragging: bool,
    pub reload_count: usize,
    /// The viewport in content coordinates.
    pub bounds: Rect,
    pub content_offset: Point,
}

impl AnimationContext {
    pub fn has_reloaded(&self) -> bool {
        self.reload_count > 0
    }
}

/// Signals the end of an out-of-band transition.
///
/// Cloned handles share one flag; the engine polls it on its next tick.
#[derive(Clone, Debug, Default)]
pub struct Completion(Arc<AtomicBool>);

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_complete(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What happens to an element after [`Animator::delete`].
#[derive(Clone, Debug, Default)]
pub enum Removal {
    /// Return the element to the reuse pool right away.
    #[default]
    Immediate,
    /// Keep the element alive until the completion fires.
    Deferred(Completion),
}

/// Lifecycle hooks the engine calls while reconciling the visible set.
///
/// The defaults place elements without any transition.
pub trait Animator<V>: Send + Sync {
    fn insert(&self, view: &mut V, frame: Rect, _ctx: &AnimationContext)
    where
        V: Element,
    {
        view.set_frame(frame);
        view.set_alpha(1.0);
    }

    fn delete(&self, _view: &mut V, _frame: Rect, _ctx: &AnimationContext) -> Removal {
        Removal::Immediate
    }

    fn update(&self, view: &mut V, frame: Rect, _ctx: &AnimationContext)
    where
        V: Element,
    {
        view.set_frame(frame);
    }

    /// Called for elements that survived a reload which moved the content offset by `delta`.
    fn shift(&self, _view: &mut V, _delta: Point, _frame: Rect, _ctx: &AnimationContext) {}
}

/// Places elements immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateAnimator;

impl<V: Element> Animator<V> for ImmediateAnimator {}
