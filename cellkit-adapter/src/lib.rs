//! Adapter utilities for the `cellkit` crate.
//!
//! The `cellkit` crate is UI-agnostic and focuses on the core math and state. This crate
//! provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - Tweens and easing curves, sampled by the adapter's clock
//! - A [`Timeline`] of running element animations and a [`FadeAnimator`] registering on it
//! - A [`Driver`] wiring geometry changes, gestures and frame ticks into a viewport
//! - Scroll anchoring (e.g. prepend in chat/timelines without visual jumps)
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![forbid(unsafe_code)]

mod anchor;
mod driver;
mod fade;
mod timeline;
mod tween;

#[cfg(test)]
mod tests;

pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor, reload_anchored};
pub use driver::Driver;
pub use fade::{Animated, FadeAnimator};
pub use timeline::{Sample, Timeline};
pub use tween::{Easing, Lerp, Tween};
