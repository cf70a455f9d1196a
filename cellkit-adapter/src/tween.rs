use cellkit::{Point, Rect, Size};

/// Values a [`Tween`] can interpolate.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Point {
    fn lerp(self, to: Self, t: f32) -> Self {
        Point::new(self.x.lerp(to.x, t), self.y.lerp(to.y, t))
    }
}

impl Lerp for Size {
    fn lerp(self, to: Self, t: f32) -> Self {
        Size::new(self.width.lerp(to.width, t), self.height.lerp(to.height, t))
    }
}

impl Lerp for Rect {
    fn lerp(self, to: Self, t: f32) -> Self {
        Rect::from_origin_size(self.origin.lerp(to.origin, t), self.size.lerp(to.size, t))
    }
}

/// A time-based interpolation between two values, sampled by the adapter's clock.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, start_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }

    /// The value at `now_ms`. Before `start_ms` this is `from`.
    pub fn sample(&self, now_ms: u64) -> T {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        let t = (elapsed as f32 / self.duration_ms as f32).clamp(0.0, 1.0);
        self.from.lerp(self.to, self.easing.sample(t))
    }

    /// Restarts from the current value towards `new_to`.
    pub fn retarget(&mut self, now_ms: u64, new_to: T, duration_ms: u64) {
        let cur = self.sample(now_ms);
        *self = Self::new(cur, new_to, now_ms, duration_ms, self.easing);
    }
}

impl Tween<Rect> {
    /// Moves both ends by `delta`.
    pub fn offset_by(&mut self, delta: Point) {
        self.from = self.from.offset_by(delta);
        self.to = self.to.offset_by(delta);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    #[default]
    SmoothStep,
    EaseInOutCubic,
    /// Overshoot-free approximation of a damped spring.
    EaseOutCubic,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
            Self::EaseOutCubic => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
        }
    }
}
