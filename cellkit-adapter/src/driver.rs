use std::sync::Arc;

use cellkit::{Element, Error, GesturePhase, Insets, Point, Size, Viewport};

use crate::{
    Animated, Easing, FadeAnimator, ScrollAnchor, Timeline, Tween, capture_first_visible_anchor,
    reload_anchored,
};

/// A framework-neutral frame driver that owns a [`Viewport`] and the [`Timeline`] its animators
/// register on.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_resize` / `on_safe_area` / `on_scroll` when the scroll surface changes
/// - `on_tap` / `on_long_press` with already-recognized gestures
/// - `tick(now_ms)` each frame; it returns whether another frame is needed
///
/// For UI scroll containers, read [`Viewport::content_offset`] after `tick()` to set the real
/// scroll position while a tween or a drag autoscroll is running.
#[derive(Debug)]
pub struct Driver<V> {
    viewport: Viewport<V>,
    timeline: Timeline,
    tween: Option<Tween<Point>>,
}

impl<V: Animated + 'static> Driver<V> {
    /// Wraps `viewport` and installs a [`FadeAnimator`] on a fresh timeline as its default
    /// animator.
    pub fn new(mut viewport: Viewport<V>) -> Self {
        let timeline = Timeline::new();
        viewport.set_animator(Arc::new(FadeAnimator::new(timeline.clone())));
        Self::from_parts(viewport, timeline)
    }
}

impl<V: Element> Driver<V> {
    /// Wraps `viewport` as is. Animators of the viewport are expected to register on `timeline`.
    pub fn from_parts(viewport: Viewport<V>, timeline: Timeline) -> Self {
        Self {
            viewport,
            timeline,
            tween: None,
        }
    }

    pub fn viewport(&self) -> &Viewport<V> {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport<V> {
        &mut self.viewport
    }

    pub fn into_viewport(self) -> Viewport<V> {
        self.viewport
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_scroll_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn cancel_scroll_animation(&mut self) {
        self.tween = None;
    }

    /// Whether another [`Driver::tick`] is needed: running tweens, a scroll animation, a drag
    /// session or removals awaiting their transition.
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
            || self.timeline.is_animating()
            || self.viewport.is_dragging()
            || self.viewport.pending_removals() > 0
    }

    pub fn on_resize(&mut self, size: Size) {
        self.viewport.set_bounds_size(size);
        self.viewport.layout();
    }

    pub fn on_safe_area(&mut self, safe_area: Insets) {
        self.viewport.set_safe_area(safe_area);
        self.viewport.layout();
    }

    /// Call this when the UI reports a content offset change (e.g. user wheel/drag).
    ///
    /// This cancels any active scroll tween.
    pub fn on_scroll(&mut self, offset: Point) {
        self.cancel_scroll_animation();
        self.viewport.set_content_offset(offset);
        self.viewport.layout();
    }

    /// Dispatches a tap at `point` (content coordinates). Returns the flattened index hit.
    pub fn on_tap(&mut self, point: Point) -> Option<usize> {
        self.viewport.tap(point)
    }

    /// Routes a long-press gesture to the viewport's drag session. A started drag cancels any
    /// active scroll tween.
    pub fn on_long_press(&mut self, phase: GesturePhase, point: Point) -> Result<(), Error> {
        if phase == GesturePhase::Began {
            self.cancel_scroll_animation();
        }
        self.viewport.handle_long_press(phase, point)
    }

    /// Reloads the viewport, keeping the first visible item where it is on screen.
    ///
    /// Returns `false` when the reload was deferred or the item is gone.
    pub fn reload_anchored(&mut self) -> bool {
        let Some(anchor) = self.capture_anchor() else {
            self.viewport.reload();
            return false;
        };
        self.cancel_scroll_animation();
        reload_anchored(&mut self.viewport, &anchor)
    }

    pub fn capture_anchor(&self) -> Option<ScrollAnchor> {
        capture_first_visible_anchor(&self.viewport)
    }

    /// Applies a scroll to `offset` immediately (no animation). Returns the applied (clamped)
    /// offset.
    pub fn scroll_to_offset(&mut self, offset: Point) -> Point {
        self.cancel_scroll_animation();
        let offset = self.viewport.clamp_content_offset(offset);
        self.viewport.set_content_offset(offset);
        self.viewport.layout();
        offset
    }

    /// Starts a tween to `offset`. Returns the clamped target offset.
    pub fn start_tween_to_offset(
        &mut self,
        offset: Point,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Point {
        let to = self.viewport.clamp_content_offset(offset);
        let from = self.viewport.content_offset();
        self.tween = Some(Tween::new(from, to, now_ms, duration_ms, easing));
        to
    }

    /// Starts a tween that brings the leading edge of `index` to the leading edge of the
    /// viewport. Returns the clamped target offset.
    pub fn start_tween_to_index(
        &mut self,
        index: usize,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Result<Point, Error> {
        let frame = self.viewport.frame_at(index)?;
        Ok(self.start_tween_to_offset(frame.origin, now_ms, duration_ms, easing))
    }

    /// Advances one frame:
    /// - moves the content offset along an active scroll tween
    /// - writes the sampled values of running animations into their elements
    /// - lets the viewport retire finished removals and advance its drag session
    /// - runs whatever layout pass the viewport needs
    ///
    /// Returns whether another frame is needed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if let Some(tween) = self.tween {
            let offset = self.viewport.clamp_content_offset(tween.sample(now_ms));
            self.viewport.set_content_offset(offset);
            if tween.is_done(now_ms) {
                self.tween = None;
            }
        }

        let viewport = &mut self.viewport;
        self.timeline.advance(now_ms, |element, sample| {
            let Some(view) = viewport.view_mut(element) else {
                return;
            };
            if let Some(frame) = sample.frame {
                view.set_frame(frame);
            }
            if let Some(alpha) = sample.alpha {
                view.set_alpha(alpha);
            }
        });

        self.viewport.tick();
        self.viewport.layout();
        self.is_animating()
    }
}
