use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::animator::{AnimationContext, Completion, Removal};
use crate::binding::ViewType;
use crate::drag::DragSession;
use crate::flatten::{Flattened, Location};
use crate::key::{KeyMap, KeySet};
use crate::{
    Animator, Element, ElementId, Error, GeometryState, ImmediateAnimator, Insets, Point,
    Provider, Rect, ReusePool, Size, ViewportOptions, VisibleSet,
};

/// Side-table entry for an element owned by the viewport.
pub(crate) struct ElementEntry<V> {
    pub(crate) view: V,
    pub(crate) view_type: ViewType,
    /// The last frame handed to the animator.
    pub(crate) frame: Rect,
    pub(crate) animator: Arc<dyn Animator<V>>,
}

/// A headless collection viewport.
///
/// This type is intentionally UI-agnostic:
/// - The host owns the scroll surface and feeds in geometry (bounds size, content offset,
///   safe area) and gestures.
/// - Visual elements are created through the provider tree and owned here; the host renders
///   them with [`Viewport::for_each_rendered`].
/// - Nothing happens behind the host's back: work is done in [`Viewport::layout`] and
///   [`Viewport::tick`].
///
/// For tweened animators, scroll anchoring and a frame driver, see the `cellkit-adapter`
/// crate.
pub struct Viewport<V> {
    pub(crate) options: ViewportOptions,
    provider: Arc<Provider<V>>,
    pub(crate) flattened: Flattened<V>,
    animator: Arc<dyn Animator<V>>,
    pool: ReusePool<V>,

    bounds_size: Size,
    pub(crate) content_offset: Point,
    safe_area: Insets,
    pub(crate) content_size: Size,
    last_load_bounds: Option<Rect>,
    last_container: Option<Size>,
    content_offset_change: Point,

    needs_reload: bool,
    needs_invalidate_layout: bool,
    is_loading_cell: bool,
    is_reloading: bool,
    reload_count: usize,

    pub(crate) visible: VisibleSet,
    identifier_cache: KeyMap<usize, String>,
    pub(crate) elements: KeyMap<ElementId, ElementEntry<V>>,
    dying: Vec<(ElementId, Completion)>,
    pub(crate) drag: Option<DragSession>,
    next_id: u64,
}

impl<V: Element> Viewport<V> {
    pub fn new(provider: impl Into<Provider<V>>) -> Self {
        Self::with_options(provider, ViewportOptions::default())
    }

    pub fn with_options(provider: impl Into<Provider<V>>, options: ViewportOptions) -> Self {
        let provider = Arc::new(provider.into());
        let insets = options.content_insets;
        cdebug!(
            items = provider.number_of_items(),
            reorderable = provider.can_reorder(),
            "Viewport::new"
        );
        Self {
            flattened: Flattened::new(Arc::clone(&provider), insets),
            provider,
            animator: Arc::new(ImmediateAnimator),
            pool: ReusePool::with_capacity_per_type(options.pool_capacity_per_type),
            options,
            bounds_size: Size::ZERO,
            content_offset: Point::ZERO,
            safe_area: Insets::ZERO,
            content_size: Size::ZERO,
            last_load_bounds: None,
            last_container: None,
            content_offset_change: Point::ZERO,
            needs_reload: true,
            needs_invalidate_layout: false,
            is_loading_cell: false,
            is_reloading: false,
            reload_count: 0,
            visible: VisibleSet::default(),
            identifier_cache: KeyMap::new(),
            elements: KeyMap::new(),
            dying: Vec::new(),
            drag: None,
            next_id: 0,
        }
    }

    /// Sets the animator used for items whose providers carry none.
    pub fn with_animator(mut self, animator: Arc<dyn Animator<V>>) -> Self {
        self.animator = animator;
        self
    }

    pub fn set_animator(&mut self, animator: Arc<dyn Animator<V>>) {
        self.animator = animator;
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    /// Replaces the options. The reuse pool keeps the capacity it was created with.
    pub fn set_options(&mut self, options: ViewportOptions) {
        if options.content_insets != self.options.content_insets
            || options.visible_insets != self.options.visible_insets
        {
            self.needs_invalidate_layout = true;
        }
        self.options = options;
        ctrace!("Viewport::set_options");
    }

    pub fn provider(&self) -> &Arc<Provider<V>> {
        &self.provider
    }

    /// Replaces the provider tree. Takes effect with the next reload.
    pub fn set_provider(&mut self, provider: impl Into<Provider<V>>) {
        self.set_provider_arc(Arc::new(provider.into()));
    }

    pub fn set_provider_arc(&mut self, provider: Arc<Provider<V>>) {
        self.provider = provider;
        self.needs_reload = true;
    }

    pub fn flattened(&self) -> &Flattened<V> {
        &self.flattened
    }

    pub fn set_needs_reload(&mut self) {
        self.needs_reload = true;
    }

    pub fn set_needs_invalidate_layout(&mut self) {
        self.needs_invalidate_layout = true;
    }

    pub fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    pub fn needs_invalidate_layout(&self) -> bool {
        self.needs_invalidate_layout
    }

    pub fn is_reloading(&self) -> bool {
        self.is_reloading
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Number of completed full reloads.
    pub fn reload_count(&self) -> usize {
        self.reload_count
    }

    pub fn has_reloaded(&self) -> bool {
        self.reload_count > 0
    }

    pub fn bounds_size(&self) -> Size {
        self.bounds_size
    }

    pub fn set_bounds_size(&mut self, size: Size) {
        self.bounds_size = size;
    }

    pub fn content_offset(&self) -> Point {
        self.content_offset
    }

    pub fn set_content_offset(&mut self, offset: Point) {
        self.content_offset = offset;
    }

    pub fn safe_area(&self) -> Insets {
        self.safe_area
    }

    pub fn set_safe_area(&mut self, safe_area: Insets) {
        if self.safe_area != safe_area {
            self.safe_area = safe_area;
            self.needs_invalidate_layout = true;
        }
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// How far the last reload moved the content offset.
    pub fn content_offset_change(&self) -> Point {
        self.content_offset_change
    }

    /// The viewport in content coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.content_offset, self.bounds_size)
    }

    /// The region in which items count as visible: the bounds grown by `visible_insets`.
    pub fn visible_frame(&self) -> Rect {
        self.bounds().outset_by(self.options.visible_insets)
    }

    /// The region sticky headers pin against.
    fn pin_frame(&self) -> Rect {
        self.bounds().inset_by(self.safe_area)
    }

    fn layout_insets(&self) -> Insets {
        self.options.content_insets + self.safe_area
    }

    /// The size handed to the root layout.
    pub fn container_size(&self) -> Size {
        self.bounds_size.inset_by(self.layout_insets())
    }

    /// Clamps `offset` so the viewport stays inside the content.
    pub fn clamp_content_offset(&self, offset: Point) -> Point {
        let max_x = (self.content_size.width - self.bounds_size.width).max(0.0);
        let max_y = (self.content_size.height - self.bounds_size.height).max(0.0);
        Point::new(offset.x.clamp(0.0, max_x), offset.y.clamp(0.0, max_y))
    }

    pub fn geometry(&self) -> GeometryState {
        GeometryState {
            bounds_size: self.bounds_size,
            content_offset: self.content_offset,
            safe_area: self.safe_area,
        }
    }

    pub fn restore_geometry(&mut self, state: GeometryState) {
        self.set_bounds_size(state.bounds_size);
        self.set_content_offset(state.content_offset);
        self.set_safe_area(state.safe_area);
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn pool(&self) -> &ReusePool<V> {
        &self.pool
    }

    /// Number of live elements: visible, detached by a drag, or awaiting removal.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Elements whose removal transition has not completed yet.
    pub fn pending_removals(&self) -> usize {
        self.dying.len()
    }

    pub fn view(&self, element: ElementId) -> Option<&V> {
        self.elements.get(&element).map(|entry| &entry.view)
    }

    pub fn view_mut(&mut self, element: ElementId) -> Option<&mut V> {
        self.elements.get_mut(&element).map(|entry| &mut entry.view)
    }

    /// The last frame the engine assigned to `element`.
    pub fn frame_of(&self, element: ElementId) -> Option<Rect> {
        match &self.drag {
            Some(drag) if drag.element == element => Some(drag.frame),
            _ => self.elements.get(&element).map(|entry| entry.frame),
        }
    }

    /// Calls `f` for every live element in back-to-front order: elements awaiting removal,
    /// then the visible set in index order, then the dragged element.
    pub fn for_each_rendered(&self, mut f: impl FnMut(ElementId, &V)) {
        let dragged = self.drag.as_ref().map(|d| d.element);
        let order = self
            .dying
            .iter()
            .map(|(element, _)| *element)
            .chain(
                self.visible
                    .cells
                    .iter()
                    .copied()
                    .filter(|&c| Some(c) != dragged),
            )
            .chain(dragged);
        for element in order {
            if let Some(entry) = self.elements.get(&element) {
                f(element, &entry.view);
            }
        }
    }

    /// Runs whatever the current state calls for: a full reload, a relayout, or a visible-range
    /// update after a scroll.
    pub fn layout(&mut self) {
        if self.needs_reload {
            self.reload();
        } else if self.needs_invalidate_layout || self.last_container != Some(self.container_size())
        {
            self.invalidate_layout();
        } else if self.last_load_bounds != Some(self.bounds()) {
            self.load_cells();
        }
    }

    pub fn reload(&mut self) {
        self.reload_with(|_| None);
    }

    /// Full reload: re-flattens the provider tree, lays it out, then diffs the visible set with
    /// a cleared identifier cache.
    ///
    /// `adjust` runs after the relayout and may return a new content offset. The offset delta
    /// is handed to [`Animator::shift`] for every element that survives the reload.
    ///
    /// Deferred (and `adjust` dropped) while a reload or a drag is in progress.
    pub fn reload_with(&mut self, adjust: impl FnOnce(&Self) -> Option<Point>) {
        if self.is_reloading || self.drag.is_some() {
            cdebug!(
                reloading = self.is_reloading,
                dragging = self.drag.is_some(),
                "Viewport::reload deferred"
            );
            self.needs_reload = true;
            return;
        }
        self.is_reloading = true;

        let container = self.container_size();
        self.flattened
            .reflatten(Arc::clone(&self.provider), self.layout_insets());
        self.content_size = self.flattened.layout(container);
        self.last_container = Some(container);

        let previous = self.content_offset;
        if let Some(offset) = adjust(self) {
            self.content_offset = offset;
        }
        self.content_offset_change = self.content_offset - previous;

        self.reconcile(true);
        self.provider.did_reload();

        self.reload_count += 1;
        self.needs_reload = false;
        self.needs_invalidate_layout = false;
        self.last_load_bounds = Some(self.bounds());
        self.is_reloading = false;
        cdebug!(
            items = self.flattened.len(),
            visible = self.visible.len(),
            reload_count = self.reload_count,
            "Viewport::reload"
        );
    }

    /// Relayout without identity churn, followed by a visible-range update.
    ///
    /// Deferred while cells are loading, a reload or a drag is in progress, or before the first
    /// reload.
    pub fn invalidate_layout(&mut self) {
        if self.is_loading_cell
            || self.is_reloading
            || self.reload_count == 0
            || self.drag.is_some()
        {
            cdebug!("Viewport::invalidate_layout deferred");
            self.needs_invalidate_layout = true;
            return;
        }
        let container = self.container_size();
        self.flattened.set_insets(self.layout_insets());
        self.flattened.invalidate_layout();
        self.content_size = self.flattened.layout(container);
        self.last_container = Some(container);
        self.needs_invalidate_layout = false;
        cdebug!(
            width = container.width,
            height = container.height,
            "Viewport::invalidate_layout"
        );
        self.load_cells();
    }

    /// Brings the visible set in line with the current bounds.
    pub fn load_cells(&mut self) {
        if self.is_loading_cell || self.is_reloading || self.reload_count == 0 {
            return;
        }
        self.is_loading_cell = true;
        self.reconcile(false);
        if self.drag.is_none() {
            self.update_moved_frames();
        }
        self.last_load_bounds = Some(self.bounds());
        self.is_loading_cell = false;
    }

    /// Per-frame housekeeping: returns finished removals to the pool and advances the drag
    /// session (autoscroll, or teardown once the drag was ended or cancelled).
    pub fn tick(&mut self) {
        self.drain_removals();
        match self.drag.as_ref().map(|d| d.phase) {
            Some(crate::DragPhase::Dragging) => self.autoscroll(),
            Some(crate::DragPhase::Committing | crate::DragPhase::Cancelling) => {
                self.finish_drag()
            }
            None => {}
        }
    }

    /// Drops every element, the reuse pool, the identifier cache and any drag session. The next
    /// [`Viewport::layout`] starts over with a first reload.
    pub fn teardown(&mut self) {
        cdebug!(elements = self.elements.len(), "Viewport::teardown");
        self.drag = None;
        self.elements.clear();
        self.dying.clear();
        self.visible = VisibleSet::default();
        self.identifier_cache.clear();
        self.pool.clear();
        self.reload_count = 0;
        self.needs_reload = true;
        self.needs_invalidate_layout = false;
        self.last_load_bounds = None;
        self.last_container = None;
    }

    /// The top-most visible element containing `point` (content coordinates).
    pub fn element_at_point(&self, point: Point) -> Option<ElementId> {
        if let Some(drag) = self.drag.as_ref().filter(|d| d.frame.contains(point)) {
            return Some(drag.element);
        }
        let dragged = self.drag.as_ref().map(|d| d.element);
        self.visible
            .cells
            .iter()
            .rev()
            .copied()
            .filter(|&c| Some(c) != dragged)
            .find(|c| {
                self.elements
                    .get(c)
                    .is_some_and(|entry| entry.frame.contains(point))
            })
    }

    /// Flattened index of the top-most visible element at `point`.
    pub fn index_at(&self, point: Point) -> Option<usize> {
        self.element_at_point(point)
            .and_then(|element| self.index_of(element))
    }

    /// Flattened index a visible element currently shows.
    pub fn index_of(&self, element: ElementId) -> Option<usize> {
        self.visible
            .position_of_cell(element)
            .map(|position| self.visible.indexes[position])
    }

    /// The visible element showing `index`.
    pub fn element_at(&self, index: usize) -> Option<ElementId> {
        self.visible
            .position_of_index(index)
            .map(|position| self.visible.cells[position])
    }

    /// Layout frame of `index` in content coordinates, with sticky headers pinned.
    pub fn frame_at(&self, index: usize) -> Result<Rect, Error> {
        let pin = self.pin_frame();
        self.flattened
            .locate(index)
            .map(|location| location.pinned_frame(pin))
    }

    /// Dispatches a tap to the provider owning the top-most visible element at `point`.
    ///
    /// Returns the flattened index that was hit.
    pub fn tap(&mut self, point: Point) -> Option<usize> {
        let index = self.index_at(point)?;
        let location = self.flattened.resolve(index);
        ctrace!(index, local = location.local, "Viewport::tap");
        if let Some(on_tap) = &location.owner.hooks().on_tap {
            on_tap(location.local);
        }
        Some(index)
    }

    pub(crate) fn context(&self, element: ElementId, index: Option<usize>) -> AnimationContext {
        AnimationContext {
            element,
            index,
            is_reloading: self.is_reloading,
            is_dragging: self.drag.is_some(),
            reload_count: self.reload_count,
            bounds: self.bounds(),
            content_offset: self.content_offset,
        }
    }

    fn animator_for(&self, location: &Location<V>) -> Arc<dyn Animator<V>> {
        location
            .animator
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.animator))
    }

    /// The diff/reuse pass.
    ///
    /// Maps the new visible indexes to disambiguated identifiers, hands elements whose
    /// identifier disappeared to their animator's delete path, reuses elements whose identifier
    /// survived (rebinding those now at another index) and creates the rest. With `force`, the
    /// identifier cache is dropped first and every surviving element is rebound and moved to
    /// its new frame.
    fn reconcile(&mut self, force: bool) {
        let new_indexes = self.flattened.visible_indexes(self.visible_frame());
        if !force && new_indexes == self.visible.indexes {
            return;
        }
        if force {
            self.identifier_cache.clear();
        }

        let new_identifiers = self.identifiers_for(&new_indexes);
        let dragged = self.drag.as_ref().map(|d| (d.element, d.identifier.clone()));
        let old = core::mem::take(&mut self.visible);

        let mut existing: KeyMap<String, (ElementId, usize)> = KeyMap::new();
        {
            let wanted: KeySet<&str> = new_identifiers.iter().map(String::as_str).collect();
            let old_items = old.indexes.iter().zip(&old.identifiers).zip(&old.cells);
            for ((&old_index, identifier), &element) in old_items {
                if wanted.contains(identifier.as_str()) {
                    existing.insert(identifier.clone(), (element, old_index));
                } else if dragged.as_ref().is_none_or(|(d, _)| *d != element) {
                    self.delete_element(element);
                }
            }
        }
        // The dragged element outlives its slot and is picked up again if the slot comes back.
        if let Some((element, identifier)) = dragged {
            existing.entry(identifier).or_insert((element, usize::MAX));
        }

        let pin = self.pin_frame();
        let delta = self.content_offset_change;
        let dragged = self.drag.as_ref().map(|d| d.element);
        let mut cells = Vec::with_capacity(new_indexes.len());
        for (&index, identifier) in new_indexes.iter().zip(&new_identifiers) {
            let location = self.flattened.resolve(index);
            let frame = location.pinned_frame(pin);
            let element = match existing.remove(identifier) {
                Some((element, _)) if Some(element) == dragged => element,
                Some((element, _)) if force => {
                    self.refresh_element(element, &location, frame, delta);
                    element
                }
                Some((element, old_index)) => {
                    // A disambiguated identifier may now name a different index.
                    if old_index != index {
                        self.rebind_element(element, &location);
                    }
                    element
                }
                None => self.insert_element(&location, frame),
            };
            cells.push(element);
        }

        cdebug!(
            force,
            from = ?old.indexes.first().zip(old.indexes.last()),
            to = ?new_indexes.first().zip(new_indexes.last()),
            inserted = new_identifiers
                .iter()
                .filter(|id| !old.identifiers.contains(id))
                .count(),
            deleted = old
                .identifiers
                .iter()
                .filter(|id| !new_identifiers.contains(id))
                .count(),
            "Viewport::reconcile"
        );
        self.visible = VisibleSet {
            indexes: new_indexes,
            identifiers: new_identifiers,
            cells,
        };
        self.visible.check_invariants();
    }

    /// Identifiers for `indexes`, unique within the pass: a repeated identifier `x` becomes
    /// `x(1)`, `x(2)`, ...
    fn identifiers_for(&mut self, indexes: &[usize]) -> Vec<String> {
        let mut used: KeySet<String> = KeySet::new();
        let mut out = Vec::with_capacity(indexes.len());
        for &index in indexes {
            let cached = self
                .identifier_cache
                .get(&index)
                .filter(|cached| !used.contains(*cached))
                .cloned();
            let identifier = match cached {
                Some(identifier) => identifier,
                None => {
                    let base = self.flattened.identifier(index);
                    let mut candidate = base.clone();
                    let mut n = 1usize;
                    while used.contains(&candidate) {
                        candidate = format!("{base}({n})");
                        n += 1;
                    }
                    if candidate != base {
                        cwarn!(
                            identifier = %base,
                            disambiguated = %candidate,
                            index,
                            "duplicate identifier"
                        );
                    }
                    self.identifier_cache.insert(index, candidate.clone());
                    candidate
                }
            };
            used.insert(identifier.clone());
            out.push(identifier);
        }
        out
    }

    fn insert_element(&mut self, location: &Location<V>, frame: Rect) -> ElementId {
        let source = &location.source;
        let view_type = source.view_type(location.local);
        let mut view = match self.pool.dequeue(view_type) {
            Some(view) => view,
            None => {
                ctrace!(view_type, "reuse pool miss");
                source.make_view(location.local)
            }
        };
        source.update(&mut view, location.local);

        let element = ElementId(self.next_id);
        self.next_id += 1;
        let animator = self.animator_for(location);
        let ctx = self.context(element, Some(location.index));
        animator.insert(&mut view, frame, &ctx);
        self.elements.insert(
            element,
            ElementEntry {
                view,
                view_type,
                frame,
                animator,
            },
        );
        element
    }

    fn refresh_element(
        &mut self,
        element: ElementId,
        location: &Location<V>,
        frame: Rect,
        delta: Point,
    ) {
        let animator = self.animator_for(location);
        let ctx = self.context(element, Some(location.index));
        let Some(entry) = self.elements.get_mut(&element) else {
            return;
        };
        location.source.update(&mut entry.view, location.local);
        animator.shift(&mut entry.view, delta, frame, &ctx);
        animator.update(&mut entry.view, frame, &ctx);
        entry.frame = frame;
        entry.animator = animator;
    }

    fn rebind_element(&mut self, element: ElementId, location: &Location<V>) {
        if let Some(entry) = self.elements.get_mut(&element) {
            location.source.update(&mut entry.view, location.local);
        }
    }

    fn delete_element(&mut self, element: ElementId) {
        let ctx = self.context(element, None);
        let Some(entry) = self.elements.get_mut(&element) else {
            return;
        };
        match entry.animator.delete(&mut entry.view, entry.frame, &ctx) {
            Removal::Immediate => self.recycle(element),
            Removal::Deferred(completion) => self.dying.push((element, completion)),
        }
    }

    pub(crate) fn recycle(&mut self, element: ElementId) {
        if let Some(entry) = self.elements.remove(&element) {
            self.pool.recycle(entry.view_type, entry.view);
        }
    }

    fn drain_removals(&mut self) {
        if self.dying.is_empty() {
            return;
        }
        let (done, pending): (Vec<_>, Vec<_>) = core::mem::take(&mut self.dying)
            .into_iter()
            .partition(|(_, completion)| completion.is_complete());
        self.dying = pending;
        for (element, _) in done {
            self.recycle(element);
        }
    }

    /// Moves visible elements whose layout frame changed since it was last assigned (relayout,
    /// pinned headers).
    fn update_moved_frames(&mut self) {
        let pin = self.pin_frame();
        for position in 0..self.visible.len() {
            let index = self.visible.indexes[position];
            let element = self.visible.cells[position];
            let frame = self.flattened.resolve(index).pinned_frame(pin);
            let ctx = self.context(element, Some(index));
            let Some(entry) = self.elements.get_mut(&element) else {
                continue;
            };
            if entry.frame != frame {
                entry.frame = frame;
                entry.animator.update(&mut entry.view, frame, &ctx);
            }
        }
    }
}

impl<V> core::fmt::Debug for Viewport<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Viewport")
            .field("options", &self.options)
            .field("flattened", &self.flattened)
            .field("bounds_size", &self.bounds_size)
            .field("content_offset", &self.content_offset)
            .field("content_size", &self.content_size)
            .field("reload_count", &self.reload_count)
            .field("visible", &self.visible)
            .field("dragging", &self.drag.is_some())
            .finish_non_exhaustive()
    }
}
