//! A headless, provider-driven collection engine.
//!
//! For adapter-level utilities (tweened animators, anchoring, a frame driver), see the
//! `cellkit-adapter` crate.
//!
//! A caller describes its content as a tree of providers: leaves that bind data items to visual
//! elements, and composites that nest sections (optionally preceded by headers). The engine
//! flattens the tree into one contiguous index space, lays it out through pluggable
//! [`Layout`] strategies, and keeps only the elements intersecting the viewport alive:
//! - scroll-driven visible-range updates that skip work when the range did not change
//! - identifier-based diffing on reload, so surviving items keep their element
//! - a per-type reuse pool for elements leaving the screen
//! - drag-to-reorder delegated to the provider that owns the dragged item
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport bounds size, content offset and safe-area insets
//! - a [`ViewBinding`] (or [`ItemSource`]) creating and configuring visual elements
//! - already-recognized tap and long-press events
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod animator;
mod binding;
mod drag;
mod emitter;
mod error;
mod flatten;
mod key;
mod layout;
mod options;
mod pool;
mod provider;
mod size_cache;
mod state;
mod types;
mod viewport;
mod visible;


pub use animator::{AnimationContext, Animator, Completion, Element, ImmediateAnimator, Removal};
pub use binding::{DataSource, IdentifierFn, ItemSource, SizeKey, ViewBinding, ViewType};
pub use drag::{DragInfo, DragPhase, GesturePhase};
pub use error::Error;
pub use flatten::{Flattened, Location};
pub use layout::{FlowLayout, InsetLayout, Layout, LayoutFrames, RowLayout};
pub use options::ViewportOptions;
pub use pool::ReusePool;
pub use provider::{
    HeaderProvider, Hooks, ItemProvider, Provider, ReloadCallback, ReorderCallback,
    SectionProvider, Slot, TapCallback,
};
pub use state::GeometryState;
pub use types::{Axis, ElementId, Insets, Point, Rect, Size};
pub use viewport::Viewport;
pub use visible::VisibleSet;
