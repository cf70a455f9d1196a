use crate::*;

use std::sync::{Arc, Mutex};

use cellkit::{
    Axis, Completion, Element, Error, GesturePhase, ItemProvider, ItemSource, Point, Rect, Size,
    SizeKey, ViewType, Viewport,
};

#[derive(Clone, Debug, Default, PartialEq)]
struct Card {
    label: String,
    frame: Rect,
    alpha: f32,
}

impl Element for Card {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }
}

impl Animated for Card {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }
}

/// Full-width cards, 50 points tall.
struct Cards(Vec<String>);

impl ItemSource<Card> for Cards {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn identifier(&self, index: usize) -> String {
        self.0[index].clone()
    }

    fn view_type(&self, _index: usize) -> ViewType {
        "card"
    }

    fn size_key(&self, index: usize) -> SizeKey {
        SizeKey::Identifier(self.0[index].clone())
    }

    fn measure(&self, _index: usize, container: Size, _axis: Axis) -> Size {
        Size::new(container.width, 50.0)
    }

    fn make_view(&self, _index: usize) -> Card {
        Card::default()
    }

    fn update(&self, view: &mut Card, index: usize) {
        view.label = self.0[index].clone();
    }
}

fn cards(ids: &[&str]) -> ItemProvider<Card> {
    ItemProvider::new(Cards(ids.iter().map(|s| s.to_string()).collect()))
}

fn numbered(n: usize) -> ItemProvider<Card> {
    ItemProvider::new(Cards((0..n).map(|i| format!("item-{i}")).collect()))
}

fn driver(provider: ItemProvider<Card>, bounds: Size) -> Driver<Card> {
    let mut d = Driver::new(Viewport::new(provider));
    d.on_resize(bounds);
    d
}

fn view_at(d: &Driver<Card>, index: usize) -> &Card {
    let element = d.viewport().element_at(index).unwrap();
    d.viewport().view(element).unwrap()
}

#[test]
fn easing_curves_hit_both_ends() {
    for easing in [
        Easing::Linear,
        Easing::SmoothStep,
        Easing::EaseInOutCubic,
        Easing::EaseOutCubic,
    ] {
        assert_eq!(easing.sample(0.0), 0.0);
        assert_eq!(easing.sample(1.0), 1.0);
    }
}

#[test]
fn tween_waits_for_its_start_and_clamps_at_the_end() {
    let t = Tween::new(0.0f32, 100.0, 10, 100, Easing::Linear);
    assert_eq!(t.sample(0), 0.0);
    assert_eq!(t.sample(60), 50.0);
    assert_eq!(t.sample(500), 100.0);
    assert!(!t.is_done(100));
    assert!(t.is_done(110));

    let mut r = Tween::new(
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rect::new(100.0, 0.0, 30.0, 10.0),
        0,
        100,
        Easing::Linear,
    );
    assert_eq!(r.sample(50), Rect::new(50.0, 0.0, 20.0, 10.0));
    r.retarget(50, Rect::new(50.0, 50.0, 20.0, 10.0), 10);
    assert_eq!(r.from, Rect::new(50.0, 0.0, 20.0, 10.0));
    assert_eq!(r.sample(55), Rect::new(50.0, 25.0, 20.0, 10.0));
}

#[test]
fn first_reload_places_elements_without_animating() {
    let d = driver(numbered(10), Size::new(100.0, 200.0));
    assert_eq!(d.viewport().visible().len(), 4);
    assert!(d.timeline().is_empty());
    assert!(!d.is_animating());
    assert_eq!(view_at(&d, 3).alpha, 1.0);
    assert_eq!(view_at(&d, 3).frame, Rect::new(0.0, 150.0, 100.0, 50.0));
}

#[test]
fn timeline_fires_completions_after_the_final_sample() {
    let mut d = driver(numbered(4), Size::new(100.0, 200.0));
    let element = d.viewport().element_at(0).unwrap();
    let done = Completion::new();
    d.timeline()
        .animate_alpha(element, 0.0, 1.0, 0, 100, Easing::Linear);
    d.timeline().on_finish(element, done.clone());

    assert!(d.tick(50));
    assert_eq!(view_at(&d, 0).alpha, 0.5);
    assert!(!done.is_complete());

    assert!(!d.tick(100));
    assert_eq!(view_at(&d, 0).alpha, 1.0);
    assert!(done.is_complete());
    assert!(d.timeline().is_empty());

    // Nothing running: completes right away.
    let idle = Completion::new();
    d.timeline().on_finish(element, idle.clone());
    assert!(idle.is_complete());
}

#[test]
fn later_reloads_fade_inserts_in_and_glide_moves() {
    let mut d = driver(cards(&["a", "b"]), Size::new(100.0, 200.0));
    let b = d.viewport().element_at(1).unwrap();

    d.viewport_mut().set_provider(cards(&["a", "new", "b"]));
    assert!(d.tick(0));
    assert_eq!(d.viewport().element_at(2), Some(b));
    assert_eq!(view_at(&d, 1).alpha, 0.0);
    assert_eq!(view_at(&d, 2).frame, Rect::new(0.0, 50.0, 100.0, 50.0));
    assert_eq!(d.timeline().len(), 2);

    // The fade of `new` is staggered by its distance from the content offset.
    d.tick(16);
    assert_eq!(view_at(&d, 1).alpha, 0.0);

    assert!(!d.tick(700));
    assert_eq!(view_at(&d, 1).alpha, 1.0);
    assert_eq!(view_at(&d, 2).frame, Rect::new(0.0, 100.0, 100.0, 50.0));
}

#[test]
fn visible_deletions_fade_out_before_removal() {
    let mut d = driver(cards(&["a", "b", "c"]), Size::new(100.0, 200.0));
    let b = d.viewport().element_at(1).unwrap();

    d.viewport_mut().set_provider(cards(&["a", "c"]));
    d.tick(0);
    assert_eq!(d.viewport().pending_removals(), 1);
    assert_eq!(d.viewport().element_count(), 3);

    d.tick(100);
    let alpha = d.viewport().view(b).unwrap().alpha;
    assert!(alpha > 0.0 && alpha < 1.0, "alpha={alpha}");
    assert_eq!(d.viewport().pending_removals(), 1);

    d.tick(250);
    assert_eq!(d.viewport().pending_removals(), 0);
    assert_eq!(d.viewport().element_count(), 2);
    assert!(d.viewport().view(b).is_none());
    assert_eq!(d.viewport().pool().len_of("card"), 1);
}

#[test]
fn scrolling_swaps_elements_without_transitions() {
    let mut d = driver(numbered(20), Size::new(100.0, 200.0));
    d.on_scroll(Point::new(0.0, 300.0));
    assert_eq!(d.viewport().visible().indexes(), &[6, 7, 8, 9]);
    assert_eq!(d.viewport().pending_removals(), 0);
    assert!(d.timeline().is_empty());
    assert!(!d.is_animating());
    assert_eq!(view_at(&d, 6).alpha, 1.0);
}

#[test]
fn anchor_preserves_position_across_prepend() {
    let mut d = driver(numbered(20), Size::new(100.0, 200.0));
    d.on_scroll(Point::new(0.0, 520.0));

    let anchor = capture_first_visible_anchor(d.viewport()).unwrap();
    assert_eq!(anchor.identifier, "item-10");
    assert_eq!(anchor.offset_in_viewport, Point::new(0.0, 20.0));
    let kept = d.viewport().element_at(10).unwrap();

    let mut ids = vec!["new-0".to_string(), "new-1".to_string(), "new-2".to_string()];
    ids.extend((0..20).map(|i| format!("item-{i}")));
    d.viewport_mut().set_provider(ItemProvider::new(Cards(ids)));
    assert!(reload_anchored(d.viewport_mut(), &anchor));

    let vp = d.viewport();
    assert_eq!(vp.content_offset(), Point::new(0.0, 670.0));
    assert_eq!(vp.content_offset_change(), Point::new(0.0, 150.0));
    assert_eq!(vp.visible().indexes(), &[13, 14, 15, 16, 17]);
    assert_eq!(vp.element_at(13), Some(kept));
    assert_eq!(vp.view(kept).unwrap().frame, Rect::new(0.0, 650.0, 100.0, 50.0));
    // Survivors were shifted with the offset: nothing moves on screen.
    assert!(d.timeline().is_empty());
}

#[test]
fn anchor_applies_to_the_current_layout() {
    let mut d = driver(numbered(20), Size::new(100.0, 200.0));
    d.on_scroll(Point::new(0.0, 520.0));
    let anchor = d.capture_anchor().unwrap();

    d.on_scroll(Point::ZERO);
    assert!(apply_anchor(d.viewport_mut(), &anchor));
    assert_eq!(d.viewport().content_offset(), Point::new(0.0, 520.0));

    let missing = ScrollAnchor {
        identifier: "gone".into(),
        offset_in_viewport: Point::ZERO,
    };
    assert!(!apply_anchor(d.viewport_mut(), &missing));
}

#[test]
fn driver_reports_reorders_on_the_tick_after_release() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let provider = numbered(10).on_reorder(move |from, to| sink.lock().unwrap().push((from, to)));
    let mut d = driver(provider, Size::new(100.0, 500.0));
    let neighbour = d.viewport().element_at(3).unwrap();

    d.on_long_press(GesturePhase::Began, Point::new(50.0, 125.0))
        .unwrap();
    d.on_long_press(GesturePhase::Changed, Point::new(50.0, 140.0))
        .unwrap();
    assert!(d.is_animating());
    assert!(d.timeline().is_animating_element(neighbour));

    d.tick(300);
    assert!(d.viewport().is_dragging());

    d.on_long_press(GesturePhase::Ended, Point::new(50.0, 140.0))
        .unwrap();
    d.tick(316);
    assert_eq!(*log.lock().unwrap(), vec![(2, 3)]);
    assert!(!d.viewport().is_dragging());

    while d.tick(1_000) {}
    assert_eq!(view_at(&d, 2).alpha, 1.0);
    assert_eq!(view_at(&d, 2).frame, Rect::new(0.0, 100.0, 100.0, 50.0));
    assert_eq!(
        d.on_long_press(GesturePhase::Changed, Point::ZERO),
        Err(Error::NoActiveDrag)
    );
}

#[test]
fn tween_drives_the_content_offset() {
    let mut d = driver(numbered(100), Size::new(100.0, 200.0));

    let to = d
        .start_tween_to_index(40, 0, 100, Easing::SmoothStep)
        .unwrap();
    assert_eq!(to, Point::new(0.0, 2000.0));

    let mut last = 0.0f32;
    for now_ms in [0u64, 10, 20, 40, 80, 100, 120] {
        d.tick(now_ms);
        let y = d.viewport().content_offset().y;
        assert!(y >= last);
        last = y;
    }
    assert!(!d.is_scroll_animating());
    assert_eq!(d.viewport().content_offset(), to);
    assert_eq!(d.viewport().visible().indexes().first(), Some(&40));

    assert_eq!(
        d.start_tween_to_index(99, 200, 100, Easing::Linear),
        Ok(Point::new(0.0, 4800.0))
    );
    d.on_scroll(Point::new(0.0, 10.0));
    assert!(!d.is_scroll_animating());
    assert_eq!(
        d.start_tween_to_index(100, 300, 100, Easing::Linear),
        Err(Error::IndexOutOfRange {
            index: 100,
            count: 100
        })
    );
}

#[test]
fn taps_reach_the_owning_provider() {
    let taps = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&taps);
    let provider = numbered(5).on_tap(move |i| sink.lock().unwrap().push(i));
    let mut d = driver(provider, Size::new(100.0, 200.0));

    assert_eq!(d.on_tap(Point::new(10.0, 60.0)), Some(1));
    assert_eq!(d.on_tap(Point::new(10.0, 260.0)), None);
    assert_eq!(*taps.lock().unwrap(), vec![1]);
}
