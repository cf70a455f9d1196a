// Example: a data-backed list, a scroll and a content change.
use cellkit::{
    Axis, DataSource, Element, ItemProvider, Point, Rect, Size, ViewBinding, ViewType, Viewport,
};

#[derive(Debug, Default)]
struct Label {
    text: String,
    frame: Rect,
}

impl Element for Label {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

struct Labels;

impl ViewBinding for Labels {
    type Data = String;
    type View = Label;

    fn view_type(&self, _data: &String) -> ViewType {
        "label"
    }

    fn make_view(&self, _data: &String) -> Label {
        Label::default()
    }

    fn configure(&self, view: &mut Label, data: &String) {
        view.text.clone_from(data);
    }

    fn fit_size(&self, data: &String, target: Size, _axis: Axis) -> Size {
        // One line per 20 characters.
        let lines = data.len().div_ceil(20).max(1);
        Size::new(target.width, 18.0 * lines as f32)
    }
}

fn source(n: usize) -> DataSource<Labels> {
    let data = (0..n)
        .map(|i| format!("message #{i}: {}", "lorem ipsum ".repeat(i % 4)))
        .collect();
    DataSource::new(data, Labels).with_identifier(|_, text: &String| {
        text.split(':').next().unwrap_or_default().to_string()
    })
}

fn dump(v: &Viewport<Label>) {
    v.for_each_rendered(|element, label| {
        println!("  {element:?} {:?} {}", label.frame, label.text);
    });
}

fn main() {
    let mut v = Viewport::new(ItemProvider::new(source(1_000)));
    v.set_bounds_size(Size::new(240.0, 120.0));
    v.layout();
    println!("content_size={:?}", v.content_size());
    println!("visible={:?}", v.visible().indexes());
    dump(&v);

    v.set_content_offset(Point::new(0.0, 5_000.0));
    v.layout();
    println!("after scroll: visible={:?} pooled={}", v.visible().indexes(), v.pool().len());

    // Replacing the provider keeps elements whose identifier survives.
    v.set_provider(ItemProvider::new(source(2_000)));
    v.layout();
    println!("after reload #{}: visible={:?}", v.reload_count(), v.visible().indexes());
    dump(&v);
}
