//! Flattening of a provider tree into one contiguous index space.
//!
//! Every leaf item of the tree gets one flattened index in `[0, len)`, in tree order. Each node
//! keeps a prefix table of where its slots begin in its own index range, so resolving an index
//! costs one binary search per nesting level.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::binding::ItemSource;
use crate::emitter::IndexEmitter;
use crate::key::KeyMap;
use crate::layout::LayoutFrames;
use crate::provider::{Provider, Slot};
use crate::size_cache::SizeCache;
use crate::{Animator, Axis, Error, Insets, Point, Rect, Size};

/// A flattened index resolved back into the provider tree.
pub struct Location<V> {
    pub index: usize,
    /// Section slots walked from the root down to the owning provider.
    pub path: Vec<usize>,
    /// Slot of the item inside its owning provider.
    pub slot: usize,
    /// Index reported to the owner's hooks: the item index, or the section index for headers.
    pub local: usize,
    /// Layout frame in content coordinates.
    pub frame: Rect,
    pub axis: Axis,
    pub owner: Arc<Provider<V>>,
    pub source: Arc<dyn ItemSource<V>>,
    /// The innermost animator set along the path.
    pub animator: Option<Arc<dyn Animator<V>>>,
    sticky_body: Option<Rect>,
}

impl<V> Location<V> {
    /// The frame with sticky-header pinning applied against `viewport`.
    pub fn pinned_frame(&self, viewport: Rect) -> Rect {
        let Some(body) = self.sticky_body else {
            return self.frame;
        };
        let axis = self.axis;
        let len = self.frame.size.main(axis);
        let pinned = self
            .frame
            .min_main(axis)
            .max(viewport.min_main(axis).min(body.max_main(axis) - len));
        self.frame.with_main_origin(axis, pinned)
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky_body.is_some()
    }
}

impl<V> core::fmt::Debug for Location<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Location")
            .field("index", &self.index)
            .field("path", &self.path)
            .field("slot", &self.slot)
            .field("local", &self.local)
            .field("frame", &self.frame)
            .field("axis", &self.axis)
            .finish_non_exhaustive()
    }
}

struct Node<V> {
    provider: Arc<Provider<V>>,
    begins: Vec<usize>,
    children: Vec<Option<Node<V>>>,
    count: usize,
    frames: LayoutFrames,
    sizes: SizeCache,
    laid_out_for: Option<Size>,
}

/// Size caches taken from a previous flattening, keyed by provider address.
type CarriedSizes = KeyMap<usize, SizeCache>;

fn provider_key<V>(provider: &Arc<Provider<V>>) -> usize {
    Arc::as_ptr(provider).addr()
}

impl<V> Node<V> {
    fn new(provider: Arc<Provider<V>>, carried: &mut CarriedSizes) -> Self {
        let slots = provider.number_of_items();
        let mut begins = Vec::with_capacity(slots);
        let mut children = Vec::with_capacity(slots);
        let mut count = 0usize;
        for slot in 0..slots {
            begins.push(count);
            match provider.section(slot) {
                Some(section) => {
                    let child = Node::new(Arc::clone(section), carried);
                    count += child.count;
                    children.push(Some(child));
                }
                None => {
                    count += 1;
                    children.push(None);
                }
            }
        }
        let sizes = carried
            .remove(&provider_key(&provider))
            .map_or_else(SizeCache::new, SizeCache::carry_over);
        Self {
            provider,
            begins,
            children,
            count,
            frames: LayoutFrames::default(),
            sizes,
            laid_out_for: None,
        }
    }

    fn take_sizes(&mut self, out: &mut CarriedSizes) {
        let sizes = core::mem::replace(&mut self.sizes, SizeCache::new());
        out.insert(provider_key(&self.provider), sizes);
        for child in self.children.iter_mut().flatten() {
            child.take_sizes(out);
        }
    }

    /// The slot containing local flattened index `index` (`index < self.count`).
    fn slot_of(&self, index: usize) -> usize {
        self.begins
            .partition_point(|&begin| begin <= index)
            .saturating_sub(1)
    }

    fn layout(&mut self, container: Size) -> Size {
        if self.laid_out_for == Some(container) {
            return self.frames.content_size();
        }
        let slots = self.children.len();
        let Self {
            provider,
            children,
            frames,
            sizes,
            laid_out_for,
            ..
        } = self;
        let provider: &Provider<V> = provider;
        let layout = provider.layout();
        let axis = layout.axis();

        let mut size_at = |slot: usize, container: Size| -> Size {
            if let Some(child) = children[slot].as_mut() {
                return child.layout(container);
            }
            match provider.slot(slot) {
                Slot::Item { source, local } => {
                    sizes.prepare(container);
                    sizes.get_or_measure(source.size_key(local), || {
                        source.measure(local, container, axis)
                    })
                }
                Slot::Section(_) => Size::ZERO,
            }
        };
        *frames = layout.layout(container, slots, &mut size_at);
        debug_assert_eq!(frames.len(), slots, "layout must emit one frame per slot");
        ctrace!(
            slots,
            width = container.width,
            height = container.height,
            "laid out provider"
        );
        *laid_out_for = Some(container);
        frames.content_size()
    }

    fn invalidate(&mut self) {
        self.laid_out_for = None;
        for child in self.children.iter_mut().flatten() {
            child.invalidate();
        }
    }

    fn measurements(&self) -> usize {
        self.sizes.misses()
            + self
                .children
                .iter()
                .flatten()
                .map(Node::measurements)
                .sum::<usize>()
    }

    fn emit_visible(&self, visible: Rect, base: usize, out: &mut IndexEmitter<'_>) {
        let sticky = self.provider.is_sticky();
        self.frames.for_each_visible(visible, |slot| {
            // A visible section body keeps its pinned header on screen.
            if sticky && slot % 2 == 1 {
                out.emit(base + self.begins[slot - 1]);
            }
            match &self.children[slot] {
                Some(child) => {
                    let origin = self.frames.frames()[slot].origin;
                    child.emit_visible(
                        visible.offset_by(Point::ZERO - origin),
                        base + self.begins[slot],
                        out,
                    );
                }
                None => out.emit(base + self.begins[slot]),
            }
        });
    }
}

/// A provider tree flattened into `[0, len)`, with cached layout.
pub struct Flattened<V> {
    root: Node<V>,
    insets: Insets,
}

impl<V> Flattened<V> {
    /// Flattens `root`. Content is laid out inside `insets`.
    pub fn new(root: Arc<Provider<V>>, insets: Insets) -> Self {
        let root = Node::new(root, &mut CarriedSizes::new());
        cdebug!(len = root.count, "flattened provider tree");
        Self { root, insets }
    }

    /// Flattens `root` again, keeping the identifier-keyed measurements of every provider that
    /// is still part of the tree.
    pub fn reflatten(&mut self, root: Arc<Provider<V>>, insets: Insets) {
        let mut carried = CarriedSizes::new();
        self.root.take_sizes(&mut carried);
        // The old tree is still alive here, so provider addresses are unique.
        let node = Node::new(root, &mut carried);
        cdebug!(len = node.count, dropped = carried.len(), "reflattened provider tree");
        self.root = node;
        self.insets = insets;
    }

    pub fn provider(&self) -> &Arc<Provider<V>> {
        &self.root.provider
    }

    pub fn len(&self) -> usize {
        self.root.count
    }

    pub fn is_empty(&self) -> bool {
        self.root.count == 0
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    /// Moves the content inside new insets. Takes effect with the next layout.
    pub fn set_insets(&mut self, insets: Insets) {
        if self.insets != insets {
            self.insets = insets;
            self.root.invalidate();
        }
    }

    fn origin(&self) -> Point {
        Point::new(self.insets.left, self.insets.top)
    }

    /// Lays the tree out against `container`. Nodes already laid out for the size they are
    /// handed are not laid out again.
    pub fn layout(&mut self, container: Size) -> Size {
        self.root.layout(container);
        self.content_size()
    }

    /// Forces the next [`Flattened::layout`] to run every strategy again. Measured sizes are
    /// kept.
    pub fn invalidate_layout(&mut self) {
        self.root.invalidate();
    }

    /// Content extent including the insets.
    pub fn content_size(&self) -> Size {
        let size = self.root.frames.content_size();
        Size::new(
            size.width + self.insets.left + self.insets.right,
            size.height + self.insets.top + self.insets.bottom,
        )
    }

    /// Number of item measurements performed since the tree was last flattened.
    pub fn measurements(&self) -> usize {
        self.root.measurements()
    }

    pub fn locate(&self, index: usize) -> Result<Location<V>, Error> {
        let count = self.len();
        if index >= count {
            return Err(Error::IndexOutOfRange { index, count });
        }

        let mut node = &self.root;
        let mut rest = index;
        let mut origin = self.origin();
        let mut path = Vec::new();
        let mut animator = None;
        loop {
            if let Some(a) = &node.provider.hooks().animator {
                animator = Some(Arc::clone(a));
            }
            let slot = node.slot_of(rest);
            let frame = node.frames.frame(slot).unwrap_or_default().offset_by(origin);

            if let Some(child) = &node.children[slot] {
                path.push(slot);
                rest -= node.begins[slot];
                origin = frame.origin;
                node = child;
                continue;
            }

            let Slot::Item { source, local } = node.provider.slot(slot) else {
                return Err(Error::IndexOutOfRange { index, count });
            };
            let axis = node.provider.layout().axis();
            let sticky_body = if node.provider.is_sticky() && slot % 2 == 0 {
                node.frames
                    .frame(slot + 1)
                    .map(|body| body.offset_by(origin))
            } else {
                None
            };
            return Ok(Location {
                index,
                path,
                slot,
                local,
                frame,
                axis,
                owner: Arc::clone(&node.provider),
                source: Arc::clone(source),
                animator,
                sticky_body,
            });
        }
    }

    /// Like [`Flattened::locate`], but treats an out-of-range index as a broken provider
    /// contract.
    pub(crate) fn resolve(&self, index: usize) -> Location<V> {
        match self.locate(index) {
            Ok(location) => location,
            Err(err) => crate::error::contract_violation(err),
        }
    }

    /// The raw identifier of `index`: slot identifiers along the path joined with `.`.
    ///
    /// Panics when `index` is out of range.
    pub fn identifier(&self, index: usize) -> String {
        let count = self.len();
        if index >= count {
            crate::error::contract_violation(Error::IndexOutOfRange { index, count });
        }
        let mut out = String::new();
        let mut node = &self.root;
        let mut rest = index;
        loop {
            let slot = node.slot_of(rest);
            out.push_str(&node.provider.identifier_at(slot));
            match &node.children[slot] {
                Some(child) => {
                    out.push('.');
                    rest -= node.begins[slot];
                    node = child;
                }
                None => return out,
            }
        }
    }

    /// First index whose raw identifier equals `identifier`.
    pub fn find(&self, identifier: &str) -> Option<usize> {
        (0..self.len()).find(|&index| self.identifier(index) == identifier)
    }

    /// Calls `f` with every index whose layout frame intersects `visible`, plus the sticky
    /// headers of visible sections, in strictly ascending order.
    pub fn for_each_visible_index(&self, visible: Rect, f: &mut dyn FnMut(usize)) {
        let mut emitter = IndexEmitter::new(self.len(), f);
        self.root
            .emit_visible(visible.offset_by(Point::ZERO - self.origin()), 0, &mut emitter);
    }

    pub fn visible_indexes(&self, visible: Rect) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_visible_index(visible, &mut |index| out.push(index));
        out
    }
}

impl<V> core::fmt::Debug for Flattened<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Flattened")
            .field("len", &self.len())
            .field("insets", &self.insets)
            .field("content_size", &self.content_size())
            .finish()
    }
}
