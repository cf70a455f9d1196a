use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cellkit::{Completion, ElementId, Point, Rect};

use crate::{Easing, Tween};

/// Values sampled for one element on a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    pub frame: Option<Rect>,
    pub alpha: Option<f32>,
}

#[derive(Default)]
struct Track {
    frame: Option<Tween<Rect>>,
    alpha: Option<Tween<f32>>,
    completion: Option<Completion>,
}

impl Track {
    fn is_done(&self, now_ms: u64) -> bool {
        self.frame.is_none_or(|t| t.is_done(now_ms)) && self.alpha.is_none_or(|t| t.is_done(now_ms))
    }

    fn sample(&self, now_ms: u64) -> Sample {
        Sample {
            frame: self.frame.map(|t| t.sample(now_ms)),
            alpha: self.alpha.map(|t| t.sample(now_ms)),
        }
    }

    fn finish(self) {
        if let Some(completion) = self.completion {
            completion.complete();
        }
    }
}

#[derive(Default)]
struct State {
    now_ms: u64,
    tracks: HashMap<ElementId, Track>,
}

/// Running element animations, advanced by the adapter's clock.
///
/// Animators register tweens while the viewport reconciles; the frame driver samples them on
/// every tick and writes the values into the elements. Cloned handles share one timeline.
#[derive(Clone, Default)]
pub struct Timeline {
    state: Arc<Mutex<State>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clock value of the last [`Timeline::advance`].
    pub fn now_ms(&self) -> u64 {
        self.lock().now_ms
    }

    pub fn len(&self) -> usize {
        self.lock().tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tracks.is_empty()
    }

    pub fn is_animating(&self) -> bool {
        !self.is_empty()
    }

    pub fn is_animating_element(&self, element: ElementId) -> bool {
        self.lock().tracks.contains_key(&element)
    }

    /// Tweens the frame of `element` from `from` to `to`, starting `delay_ms` from now.
    pub fn animate_frame(
        &self,
        element: ElementId,
        from: Rect,
        to: Rect,
        delay_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) {
        let mut state = self.lock();
        let start = state.now_ms + delay_ms;
        let track = state.tracks.entry(element).or_default();
        track.frame = Some(Tween::new(from, to, start, duration_ms, easing));
    }

    /// Tweens the opacity of `element`, starting `delay_ms` from now.
    pub fn animate_alpha(
        &self,
        element: ElementId,
        from: f32,
        to: f32,
        delay_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) {
        let mut state = self.lock();
        let start = state.now_ms + delay_ms;
        let track = state.tracks.entry(element).or_default();
        track.alpha = Some(Tween::new(from, to, start, duration_ms, easing));
    }

    /// Completes `completion` once every tween of `element` finished. Completes it right away
    /// when `element` has nothing running.
    pub fn on_finish(&self, element: ElementId, completion: Completion) {
        let mut state = self.lock();
        match state.tracks.get_mut(&element) {
            Some(track) => {
                if let Some(previous) = track.completion.replace(completion) {
                    previous.complete();
                }
            }
            None => completion.complete(),
        }
    }

    /// Moves a running frame tween by `delta`.
    pub fn shift(&self, element: ElementId, delta: Point) {
        if let Some(tween) = self
            .lock()
            .tracks
            .get_mut(&element)
            .and_then(|track| track.frame.as_mut())
        {
            tween.offset_by(delta);
        }
    }

    /// Drops the frame tween of `element`, keeping any opacity tween.
    pub fn stop_frame(&self, element: ElementId) {
        let mut state = self.lock();
        let Some(track) = state.tracks.get_mut(&element) else {
            return;
        };
        track.frame = None;
        if track.alpha.is_none() {
            if let Some(track) = state.tracks.remove(&element) {
                track.finish();
            }
        }
    }

    /// Drops everything running for `element`. A pending completion fires.
    pub fn cancel(&self, element: ElementId) {
        let track = self.lock().tracks.remove(&element);
        if let Some(track) = track {
            track.finish();
        }
    }

    /// Moves the clock to `now_ms`, hands the current values of every running track to `apply`
    /// and retires finished tracks (firing their completions after their final values were
    /// applied).
    pub fn advance(&self, now_ms: u64, mut apply: impl FnMut(ElementId, Sample)) {
        let (samples, finished) = {
            let mut state = self.lock();
            state.now_ms = state.now_ms.max(now_ms);
            let now_ms = state.now_ms;
            let samples: Vec<(ElementId, Sample)> = state
                .tracks
                .iter()
                .map(|(&element, track)| (element, track.sample(now_ms)))
                .collect();
            let done: Vec<ElementId> = state
                .tracks
                .iter()
                .filter(|(_, track)| track.is_done(now_ms))
                .map(|(&element, _)| element)
                .collect();
            let finished: Vec<Track> = done
                .into_iter()
                .filter_map(|element| state.tracks.remove(&element))
                .collect();
            (samples, finished)
        };
        for (element, sample) in samples {
            apply(element, sample);
        }
        finished.into_iter().for_each(Track::finish);
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Timeline")
            .field("now_ms", &state.now_ms)
            .field("tracks", &state.tracks.len())
            .finish()
    }
}
