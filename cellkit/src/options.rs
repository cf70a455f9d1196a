use crate::Insets;

/// Configuration for [`crate::Viewport`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewportOptions {
    /// Half-width of the band around a neighbour's midline that the dragged element's edge must
    /// enter before the two swap places.
    pub reorder_hysteresis: f32,

    /// Maximum content-offset nudge per tick while a dragged element hangs past a viewport edge.
    pub autoscroll_step: f32,

    /// Opacity of the element being dragged.
    pub drag_alpha: f32,

    /// Extra margin around the viewport in which items still count as visible.
    pub visible_insets: Insets,

    /// Insets between the viewport bounds and the laid out content.
    pub content_insets: Insets,

    /// Elements kept per view type in the reuse pool.
    pub pool_capacity_per_type: usize,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            reorder_hysteresis: 20.0,
            autoscroll_step: 5.0,
            drag_alpha: 0.7,
            visible_insets: Insets::ZERO,
            content_insets: Insets::ZERO,
            pool_capacity_per_type: crate::ReusePool::<()>::DEFAULT_CAPACITY_PER_TYPE,
        }
    }
}

impl ViewportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reorder_hysteresis(mut self, reorder_hysteresis: f32) -> Self {
        self.reorder_hysteresis = reorder_hysteresis;
        self
    }

    pub fn with_autoscroll_step(mut self, autoscroll_step: f32) -> Self {
        self.autoscroll_step = autoscroll_step;
        self
    }

    pub fn with_drag_alpha(mut self, drag_alpha: f32) -> Self {
        self.drag_alpha = drag_alpha;
        self
    }

    /// Sets the overscan margin, in points.
    pub fn with_visible_insets(mut self, visible_insets: Insets) -> Self {
        self.visible_insets = visible_insets;
        self
    }

    pub fn with_content_insets(mut self, content_insets: Insets) -> Self {
        self.content_insets = content_insets;
        self
    }

    pub fn with_pool_capacity_per_type(mut self, capacity: usize) -> Self {
        self.pool_capacity_per_type = capacity;
        self
    }
}
