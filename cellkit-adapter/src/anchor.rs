use cellkit::{Element, Point, Viewport};

/// A scroll anchor that can be used to preserve visual position across data changes.
///
/// Typical use cases:
/// - chat/timeline "prepend" (load older messages above) without content jumping
/// - any reorder/replace where you want the viewport to stay anchored to an item identity
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor {
    /// Flattened identifier of the anchor item (before disambiguation).
    pub identifier: String,
    /// The distance from the anchor item's origin to the content offset.
    pub offset_in_viewport: Point,
}

/// Captures an anchor for the first visible item. Pinned sticky headers are skipped.
///
/// Returns `None` if nothing is visible.
pub fn capture_first_visible_anchor<V: Element>(v: &Viewport<V>) -> Option<ScrollAnchor> {
    let flattened = v.flattened();
    let location = v
        .visible()
        .indexes()
        .iter()
        .filter_map(|&index| flattened.locate(index).ok())
        .find(|location| !location.is_sticky())?;
    Some(ScrollAnchor {
        identifier: flattened.identifier(location.index),
        offset_in_viewport: v.content_offset() - location.frame.origin,
    })
}

/// Applies a previously captured anchor by adjusting the content offset against the current
/// layout. Call [`Viewport::layout`] afterwards.
///
/// Returns `true` when the anchor was successfully applied.
pub fn apply_anchor<V: Element>(v: &mut Viewport<V>, anchor: &ScrollAnchor) -> bool {
    let Some(offset) = anchored_offset(v, anchor) else {
        return false;
    };
    v.set_content_offset(offset);
    true
}

/// Reloads `v` and moves the content offset so the anchor item stays where it was on screen.
/// Elements that survive the reload are shifted along with the offset.
///
/// Returns `false` when the reload was deferred or the anchor item is gone.
pub fn reload_anchored<V: Element>(v: &mut Viewport<V>, anchor: &ScrollAnchor) -> bool {
    let mut applied = false;
    v.reload_with(|v| {
        let offset = anchored_offset(v, anchor);
        applied = offset.is_some();
        offset
    });
    applied
}

fn anchored_offset<V: Element>(v: &Viewport<V>, anchor: &ScrollAnchor) -> Option<Point> {
    let flattened = v.flattened();
    let index = flattened.find(&anchor.identifier)?;
    let origin = flattened.locate(index).ok()?.frame.origin;
    Some(v.clamp_content_offset(origin + anchor.offset_in_viewport))
}
