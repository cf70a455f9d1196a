use cellkit::{Axis, Element, ItemProvider, ItemSource, Rect, Size, ViewType, Viewport};
use cellkit_adapter::{Animated, Driver, Easing};

#[derive(Debug, Default)]
struct Card {
    title: String,
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

struct Cards(Vec<&'static str>);

impl ItemSource<Card> for Cards {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn identifier(&self, index: usize) -> String {
        self.0[index].to_string()
    }

    fn view_type(&self, _index: usize) -> ViewType {
        "card"
    }

    fn measure(&self, _index: usize, container: Size, _axis: Axis) -> Size {
        Size::new(container.width, 64.0)
    }

    fn make_view(&self, _index: usize) -> Card {
        Card::default()
    }

    fn update(&self, view: &mut Card, index: usize) {
        view.title = self.0[index].to_string();
    }
}

fn print(d: &Driver<Card>, now_ms: u64) {
    println!("t={now_ms}ms");
    d.viewport().for_each_rendered(|_, card| {
        println!("  {:<8} y={:>6.1} alpha={:.2}", card.title, card.frame.origin.y, card.alpha);
    });
}

fn main() {
    // Example: a frame loop driving fade/glide transitions and a tweened scroll. An adapter
    // would render the viewport's elements after every tick and stop ticking once `tick`
    // returns false.
    let mut d = Driver::new(Viewport::new(ItemProvider::new(Cards(vec![
        "inbox", "drafts", "sent", "archive",
    ]))));
    d.on_resize(Size::new(320.0, 200.0));

    d.viewport_mut().set_provider(ItemProvider::new(Cards(vec![
        "inbox", "starred", "sent", "archive", "spam",
    ])));

    let mut now_ms = 0u64;
    while d.tick(now_ms) {
        if now_ms % 160 == 0 {
            print(&d, now_ms);
        }
        now_ms += 16;
    }
    print(&d, now_ms);

    let target = d
        .start_tween_to_index(4, now_ms, 240, Easing::SmoothStep)
        .expect("index 4 exists");
    while d.tick(now_ms) {
        now_ms += 16;
    }
    println!("scrolled to {target:?} at t={now_ms}ms");
}
