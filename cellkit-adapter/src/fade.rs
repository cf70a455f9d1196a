use cellkit::{AnimationContext, Animator, Completion, Element, Point, Rect, Removal};

use crate::{Easing, Timeline};

/// An [`Element`] that reports the values it currently shows, so transitions can start from
/// them.
pub trait Animated: Element {
    fn frame(&self) -> Rect;

    fn alpha(&self) -> f32;
}

/// Fades elements in and out and glides moved elements to their new frame.
///
/// - Inserts fade in only during a reload after the first one, and only inside the viewport.
///   The fade starts later the farther the element is from the content offset.
/// - Visible elements leaving during a reload fade out; their removal is deferred until the
///   fade finished. Everything else is removed right away.
/// - Moves glide during reloads and drags and snap otherwise (plain scrolling, pinned headers).
///
/// Tweens are registered on a [`Timeline`]; something has to advance it (see
/// [`crate::Driver`]).
#[derive(Clone, Debug)]
pub struct FadeAnimator {
    timeline: Timeline,
    pub insert_ms: u64,
    pub delete_ms: u64,
    pub update_ms: u64,
    /// Stagger of insert fades, in points of distance from the content offset per millisecond.
    pub stagger_points_per_ms: f32,
    pub easing: Easing,
}

impl FadeAnimator {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            insert_ms: 500,
            delete_ms: 250,
            update_ms: 600,
            stagger_points_per_ms: 3.0,
            easing: Easing::EaseOutCubic,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn with_durations(mut self, insert_ms: u64, delete_ms: u64, update_ms: u64) -> Self {
        self.insert_ms = insert_ms;
        self.delete_ms = delete_ms;
        self.update_ms = update_ms;
        self
    }

    pub fn with_stagger(mut self, points_per_ms: f32) -> Self {
        self.stagger_points_per_ms = points_per_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    fn stagger_ms(&self, frame: Rect, content_offset: Point) -> u64 {
        if self.stagger_points_per_ms <= 0.0 {
            return 0;
        }
        let d = frame.origin - content_offset;
        ((d.x * d.x + d.y * d.y).sqrt() / self.stagger_points_per_ms) as u64
    }
}

impl<V: Animated> Animator<V> for FadeAnimator {
    fn insert(&self, view: &mut V, frame: Rect, ctx: &AnimationContext) {
        view.set_frame(frame);
        if ctx.is_reloading && ctx.has_reloaded() && ctx.bounds.intersects(&frame) {
            view.set_alpha(0.0);
            let delay = self.stagger_ms(frame, ctx.content_offset);
            self.timeline
                .animate_alpha(ctx.element, 0.0, 1.0, delay, self.insert_ms, self.easing);
        } else {
            view.set_alpha(1.0);
        }
    }

    fn delete(&self, view: &mut V, frame: Rect, ctx: &AnimationContext) -> Removal {
        if ctx.is_reloading && ctx.bounds.intersects(&frame) {
            let completion = Completion::new();
            self.timeline
                .animate_alpha(ctx.element, view.alpha(), 0.0, 0, self.delete_ms, self.easing);
            self.timeline.on_finish(ctx.element, completion.clone());
            Removal::Deferred(completion)
        } else {
            self.timeline.cancel(ctx.element);
            view.set_alpha(1.0);
            Removal::Immediate
        }
    }

    fn update(&self, view: &mut V, frame: Rect, ctx: &AnimationContext) {
        let current = view.frame();
        if current != frame {
            if ctx.is_reloading || ctx.is_dragging {
                self.timeline
                    .animate_frame(ctx.element, current, frame, 0, self.update_ms, self.easing);
            } else {
                self.timeline.stop_frame(ctx.element);
                view.set_frame(frame);
            }
        }
        let alpha = view.alpha();
        if alpha < 1.0 && ctx.is_reloading {
            self.timeline
                .animate_alpha(ctx.element, alpha, 1.0, 0, self.update_ms, self.easing);
        }
    }

    fn shift(&self, view: &mut V, delta: Point, _frame: Rect, ctx: &AnimationContext) {
        view.set_frame(view.frame().offset_by(delta));
        self.timeline.shift(ctx.element, delta);
    }
}
