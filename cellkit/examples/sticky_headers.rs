// Example: sections with sticky headers and a nested horizontal row.
use cellkit::{
    Axis, Element, HeaderProvider, ItemProvider, ItemSource, Point, Provider, Rect, RowLayout,
    SectionProvider, Size, ViewType, Viewport,
};

#[derive(Debug, Default)]
struct Tile {
    text: String,
    frame: Rect,
}

impl Element for Tile {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

struct Texts {
    texts: Vec<String>,
    size: Size,
}

impl Texts {
    fn new(texts: impl IntoIterator<Item = String>, size: Size) -> Self {
        Self {
            texts: texts.into_iter().collect(),
            size,
        }
    }
}

impl ItemSource<Tile> for Texts {
    fn len(&self) -> usize {
        self.texts.len()
    }

    fn identifier(&self, index: usize) -> String {
        self.texts[index].clone()
    }

    fn view_type(&self, _index: usize) -> ViewType {
        "tile"
    }

    fn measure(&self, _index: usize, container: Size, axis: Axis) -> Size {
        match axis {
            Axis::Vertical => Size::new(container.width, self.size.height),
            Axis::Horizontal => self.size,
        }
    }

    fn make_view(&self, _index: usize) -> Tile {
        Tile::default()
    }

    fn update(&self, view: &mut Tile, index: usize) {
        view.text.clone_from(&self.texts[index]);
    }
}

fn main() {
    let sections: Vec<Provider<Tile>> = (0..5)
        .map(|s| {
            let rows = ItemProvider::new(Texts::new(
                (0..8).map(|i| format!("s{s}-row{i}")),
                Size::new(0.0, 40.0),
            ));
            let carousel = ItemProvider::new(Texts::new(
                (0..10).map(|i| format!("s{s}-card{i}")),
                Size::new(90.0, 60.0),
            ))
            .with_layout(RowLayout::new().with_spacing(8.0));
            SectionProvider::new(vec![carousel.into(), rows.into()])
                .with_identifier(format!("section-{s}"))
                .into()
        })
        .collect();
    let headers = Texts::new((0..5).map(|s| format!("Header {s}")), Size::new(0.0, 30.0));
    let root = HeaderProvider::new(headers, sections)
        .expect("one header per section")
        .with_sticky(true);

    let mut v = Viewport::new(root);
    v.set_bounds_size(Size::new(320.0, 200.0));
    v.layout();

    for y in [0.0, 150.0, 330.0, 700.0] {
        v.set_content_offset(Point::new(0.0, y));
        v.layout();
        println!("offset={y}");
        for (index, identifier, element) in v.visible().iter().take(4) {
            let tile = v.view(element).unwrap();
            println!("  {index} {identifier} {:?} {}", tile.frame, tile.text);
        }
    }
}
