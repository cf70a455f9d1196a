// Example: drag-to-reorder driven by already-recognized long-press events.
use std::sync::{Arc, Mutex};

use cellkit::{
    Axis, Element, GesturePhase, ItemProvider, ItemSource, Point, Rect, Size, ViewType, Viewport,
};

#[derive(Debug, Default)]
struct Row {
    title: String,
    frame: Rect,
    alpha: f32,
}

impl Element for Row {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }
}

struct Todo(Arc<Mutex<Vec<String>>>);

impl Todo {
    fn title(&self, index: usize) -> String {
        self.0.lock().map(|v| v[index].clone()).unwrap_or_default()
    }
}

impl ItemSource<Row> for Todo {
    fn len(&self) -> usize {
        self.0.lock().map(|v| v.len()).unwrap_or_default()
    }

    fn identifier(&self, index: usize) -> String {
        self.title(index)
    }

    fn view_type(&self, _index: usize) -> ViewType {
        "row"
    }

    fn measure(&self, _index: usize, container: Size, _axis: Axis) -> Size {
        Size::new(container.width, 44.0)
    }

    fn make_view(&self, _index: usize) -> Row {
        Row::default()
    }

    fn update(&self, view: &mut Row, index: usize) {
        view.title = self.title(index);
    }
}

fn main() {
    let items = Arc::new(Mutex::new(
        ["milk", "eggs", "bread", "butter", "coffee", "tea"]
            .map(String::from)
            .to_vec(),
    ));
    let model = Arc::clone(&items);
    let provider = ItemProvider::new(Todo(Arc::clone(&items))).on_reorder(move |from, to| {
        if let Ok(mut items) = model.lock() {
            let item = items.remove(from);
            items.insert(to, item);
        }
    });

    let mut v = Viewport::new(provider);
    v.set_bounds_size(Size::new(200.0, 400.0));
    v.layout();

    // Press on "eggs" and drag it down past "bread" and "butter".
    let press = Point::new(100.0, 66.0);
    v.handle_long_press(GesturePhase::Began, press).unwrap();
    for y in (70..=170).step_by(10) {
        v.handle_long_press(GesturePhase::Changed, Point::new(100.0, y as f32))
            .unwrap();
        v.tick();
    }
    println!("drag={:?}", v.drag());
    v.handle_long_press(GesturePhase::Ended, Point::new(100.0, 170.0))
        .unwrap();
    v.tick();

    println!("order={:?}", items.lock().unwrap());
    for (index, _, element) in v.visible().iter() {
        let row = v.view(element).unwrap();
        println!("  {index}: {} {:?}", row.title, row.frame);
    }
}
