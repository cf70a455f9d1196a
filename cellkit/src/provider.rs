//! The provider tree.
//!
//! A provider describes a contiguous range of items: how many there are, how they are
//! identified, sized, laid out and bound to visual elements. Providers nest: a
//! [`SectionProvider`] maps each of its slots onto a child provider, a [`HeaderProvider`]
//! interleaves one header slot before each child section.
//!
//! Providers are immutable once handed to a [`crate::Viewport`]. Structural changes take effect
//! by replacing the root with [`crate::Viewport::set_provider`].

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::binding::ItemSource;
use crate::layout::{FlowLayout, Layout};
use crate::{Animator, Error};

/// Receives `(from, to)` local indexes once a drag is committed.
pub type ReorderCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Receives the local index of a tapped item.
pub type TapCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Called after every full reload.
pub type ReloadCallback = Arc<dyn Fn() + Send + Sync>;

/// Hooks shared by every provider kind.
pub struct Hooks<V> {
    pub animator: Option<Arc<dyn Animator<V>>>,
    pub on_reorder: Option<ReorderCallback>,
    pub on_tap: Option<TapCallback>,
    pub on_reload: Option<ReloadCallback>,
}

impl<V> Default for Hooks<V> {
    fn default() -> Self {
        Self {
            animator: None,
            on_reorder: None,
            on_tap: None,
            on_reload: None,
        }
    }
}

impl<V> Clone for Hooks<V> {
    fn clone(&self) -> Self {
        Self {
            animator: self.animator.clone(),
            on_reorder: self.on_reorder.clone(),
            on_tap: self.on_tap.clone(),
            on_reload: self.on_reload.clone(),
        }
    }
}

impl<V> fmt::Debug for Hooks<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("animator", &self.animator.is_some())
            .field("on_reorder", &self.on_reorder.is_some())
            .field("on_tap", &self.on_tap.is_some())
            .field("on_reload", &self.on_reload.is_some())
            .finish()
    }
}

/// A leaf: items come straight from an [`ItemSource`].
pub struct ItemProvider<V> {
    pub identifier: Option<String>,
    pub source: Arc<dyn ItemSource<V>>,
    pub layout: Arc<dyn Layout>,
    pub hooks: Hooks<V>,
}

/// A composite whose slots map 1:1 onto child providers.
pub struct SectionProvider<V> {
    pub identifier: Option<String>,
    pub sections: Vec<Arc<Provider<V>>>,
    pub layout: Arc<dyn Layout>,
    pub hooks: Hooks<V>,
}

/// A composite that precedes every child section with a header item.
///
/// Slot `2k` is the header of section `k`, slot `2k + 1` is the section itself. A reorder
/// callback on this provider reorders sections (header drags report section indexes).
pub struct HeaderProvider<V> {
    pub identifier: Option<String>,
    pub headers: Arc<dyn ItemSource<V>>,
    pub sections: Vec<Arc<Provider<V>>>,
    pub layout: Arc<dyn Layout>,
    /// Pins each header to the leading edge of the viewport while its section is visible.
    pub sticky: bool,
    pub hooks: Hooks<V>,
}

/// A node of the provider tree.
pub enum Provider<V> {
    Items(ItemProvider<V>),
    Sections(SectionProvider<V>),
    Headers(HeaderProvider<V>),
}

/// Where a slot of a provider leads to.
pub enum Slot<'a, V> {
    /// A direct item; `local` indexes the source that renders it.
    Item {
        source: &'a Arc<dyn ItemSource<V>>,
        local: usize,
    },
    Section(&'a Arc<Provider<V>>),
}

impl<V> ItemProvider<V> {
    /// Creates a leaf laid out with a default [`FlowLayout`].
    pub fn new(source: impl ItemSource<V> + 'static) -> Self {
        Self::from_source(Arc::new(source))
    }

    pub fn from_source(source: Arc<dyn ItemSource<V>>) -> Self {
        Self {
            identifier: None,
            source,
            layout: Arc::new(FlowLayout::default()),
            hooks: Hooks::default(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Arc::new(layout);
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks<V>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_animator(mut self, animator: Arc<dyn Animator<V>>) -> Self {
        self.hooks.animator = Some(animator);
        self
    }

    pub fn on_reorder(mut self, f: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.hooks.on_reorder = Some(Arc::new(f));
        self
    }

    pub fn on_tap(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hooks.on_tap = Some(Arc::new(f));
        self
    }

    pub fn on_reload(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_reload = Some(Arc::new(f));
        self
    }
}

impl<V> SectionProvider<V> {
    pub fn new(sections: Vec<Provider<V>>) -> Self {
        Self {
            identifier: None,
            sections: sections.into_iter().map(Arc::new).collect(),
            layout: Arc::new(FlowLayout::default()),
            hooks: Hooks::default(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Arc::new(layout);
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks<V>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_animator(mut self, animator: Arc<dyn Animator<V>>) -> Self {
        self.hooks.animator = Some(animator);
        self
    }

    pub fn on_reload(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_reload = Some(Arc::new(f));
        self
    }
}

impl<V> HeaderProvider<V> {
    /// Fails when `headers` does not provide exactly one item per section.
    pub fn new(
        headers: impl ItemSource<V> + 'static,
        sections: Vec<Provider<V>>,
    ) -> Result<Self, Error> {
        Self::from_source(Arc::new(headers), sections)
    }

    pub fn from_source(
        headers: Arc<dyn ItemSource<V>>,
        sections: Vec<Provider<V>>,
    ) -> Result<Self, Error> {
        if headers.len() != sections.len() {
            return Err(Error::HeaderCountMismatch {
                headers: headers.len(),
                sections: sections.len(),
            });
        }
        Ok(Self {
            identifier: None,
            headers,
            sections: sections.into_iter().map(Arc::new).collect(),
            layout: Arc::new(FlowLayout::default()),
            sticky: false,
            hooks: Hooks::default(),
        })
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Arc::new(layout);
        self
    }

    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks<V>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_animator(mut self, animator: Arc<dyn Animator<V>>) -> Self {
        self.hooks.animator = Some(animator);
        self
    }

    /// Reorders sections: receives `(from, to)` section indexes.
    pub fn on_reorder(mut self, f: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.hooks.on_reorder = Some(Arc::new(f));
        self
    }

    /// Receives the section index of a tapped header.
    pub fn on_tap(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hooks.on_tap = Some(Arc::new(f));
        self
    }

    pub fn on_reload(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_reload = Some(Arc::new(f));
        self
    }

    fn section_identifier(&self, section: usize) -> String {
        self.sections[section]
            .identifier()
            .map_or_else(|| format!("{section}"), String::from)
    }
}

impl<V> Provider<V> {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Items(p) => p.identifier.as_deref(),
            Self::Sections(p) => p.identifier.as_deref(),
            Self::Headers(p) => p.identifier.as_deref(),
        }
    }

    /// Number of slots of this node (not flattened).
    pub fn number_of_items(&self) -> usize {
        match self {
            Self::Items(p) => p.source.len(),
            Self::Sections(p) => p.sections.len(),
            Self::Headers(p) => p.sections.len() * 2,
        }
    }

    /// Identifier of slot `at` of this node.
    ///
    /// Panics when `at` is out of range.
    pub fn identifier_at(&self, at: usize) -> String {
        self.check_slot(at);
        match self {
            Self::Items(p) => p.source.identifier(at),
            Self::Sections(p) => p.sections[at]
                .identifier()
                .map_or_else(|| format!("{at}"), String::from),
            Self::Headers(p) => {
                let section = p.section_identifier(at / 2);
                if at % 2 == 0 {
                    format!("{section}-header")
                } else {
                    section
                }
            }
        }
    }

    /// The child provider behind slot `at`, if that slot is a section.
    pub fn section(&self, at: usize) -> Option<&Arc<Provider<V>>> {
        match self.slot(at) {
            Slot::Section(child) => Some(child),
            Slot::Item { .. } => None,
        }
    }

    /// Resolves slot `at`. Panics when `at` is out of range.
    pub fn slot(&self, at: usize) -> Slot<'_, V> {
        self.check_slot(at);
        match self {
            Self::Items(p) => Slot::Item {
                source: &p.source,
                local: at,
            },
            Self::Sections(p) => Slot::Section(&p.sections[at]),
            Self::Headers(p) => {
                if at % 2 == 0 {
                    Slot::Item {
                        source: &p.headers,
                        local: at / 2,
                    }
                } else {
                    Slot::Section(&p.sections[at / 2])
                }
            }
        }
    }

    pub fn layout(&self) -> &Arc<dyn Layout> {
        match self {
            Self::Items(p) => &p.layout,
            Self::Sections(p) => &p.layout,
            Self::Headers(p) => &p.layout,
        }
    }

    pub fn hooks(&self) -> &Hooks<V> {
        match self {
            Self::Items(p) => &p.hooks,
            Self::Sections(p) => &p.hooks,
            Self::Headers(p) => &p.hooks,
        }
    }

    pub fn is_sticky(&self) -> bool {
        matches!(self, Self::Headers(p) if p.sticky)
    }

    /// Whether this node or any descendant accepts reordering.
    pub fn can_reorder(&self) -> bool {
        if self.hooks().on_reorder.is_some() {
            return true;
        }
        match self {
            Self::Items(_) => false,
            Self::Sections(p) => p.sections.iter().any(|s| s.can_reorder()),
            Self::Headers(p) => p.sections.iter().any(|s| s.can_reorder()),
        }
    }

    /// Runs `on_reload` hooks bottom-up.
    pub fn did_reload(&self) {
        match self {
            Self::Items(_) => {}
            Self::Sections(p) => p.sections.iter().for_each(|s| s.did_reload()),
            Self::Headers(p) => p.sections.iter().for_each(|s| s.did_reload()),
        }
        if let Some(hook) = &self.hooks().on_reload {
            hook();
        }
    }

    fn check_slot(&self, at: usize) {
        let count = self.number_of_items();
        if at >= count {
            crate::error::contract_violation(Error::IndexOutOfRange { index: at, count });
        }
    }
}

impl<V> From<ItemProvider<V>> for Provider<V> {
    fn from(p: ItemProvider<V>) -> Self {
        Self::Items(p)
    }
}

impl<V> From<SectionProvider<V>> for Provider<V> {
    fn from(p: SectionProvider<V>) -> Self {
        Self::Sections(p)
    }
}

impl<V> From<HeaderProvider<V>> for Provider<V> {
    fn from(p: HeaderProvider<V>) -> Self {
        Self::Headers(p)
    }
}

impl<V> fmt::Debug for Provider<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Items(_) => "Items",
            Self::Sections(_) => "Sections",
            Self::Headers(_) => "Headers",
        };
        f.debug_struct("Provider")
            .field("kind", &kind)
            .field("identifier", &self.identifier())
            .field("number_of_items", &self.number_of_items())
            .field("hooks", self.hooks())
            .finish()
    }
}
