use cellkit::{Axis, Element, ItemProvider, ItemSource, Point, Rect, Size, ViewType, Viewport};
use cellkit_adapter::{capture_first_visible_anchor, reload_anchored};

#[derive(Debug, Default)]
struct Bubble {
    text: String,
    frame: Rect,
}

impl Element for Bubble {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

struct Messages(Vec<u64>);

impl ItemSource<Bubble> for Messages {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn identifier(&self, index: usize) -> String {
        format!("msg-{}", self.0[index])
    }

    fn view_type(&self, _index: usize) -> ViewType {
        "bubble"
    }

    fn measure(&self, index: usize, container: Size, _axis: Axis) -> Size {
        Size::new(container.width, 30.0 + (self.0[index] % 3) as f32 * 12.0)
    }

    fn make_view(&self, _index: usize) -> Bubble {
        Bubble::default()
    }

    fn update(&self, view: &mut Bubble, index: usize) {
        view.text = format!("message {}", self.0[index]);
    }
}

fn main() {
    // Example: preserve visual scroll position across "prepend" (chat/timeline load older
    // messages).
    //
    // The adapter flow is typically:
    // 1) capture an anchor (identifier + offset_in_viewport) before data changes
    // 2) swap in the new provider
    // 3) reload through the anchor so the same item stays in the same place
    let mut v = Viewport::new(ItemProvider::new(Messages((1000..1100).collect())));
    v.set_bounds_size(Size::new(300.0, 400.0));
    v.set_content_offset(Point::new(0.0, 1_000.0));
    v.layout();

    let anchor = capture_first_visible_anchor(&v).expect("something must be visible");
    println!("before prepend: off={:?} anchor={anchor:?}", v.content_offset());

    v.set_provider(ItemProvider::new(Messages((950..1100).collect())));
    let ok = reload_anchored(&mut v, &anchor);

    println!(
        "after prepend: ok={ok} off={:?} shift={:?}",
        v.content_offset(),
        v.content_offset_change()
    );
}
