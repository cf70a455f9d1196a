use crate::binding::SizeKey;
use crate::key::KeyMap;
use crate::Size;

/// Measured sizes for one provider node, valid for a single container size.
///
/// Measurement is assumed to be expensive, so identical content is measured at most once per
/// container size. Identifier-keyed entries also survive a reload of the same provider.
#[derive(Debug)]
pub(crate) struct SizeCache {
    container: Size,
    sizes: KeyMap<SizeKey, Size>,
    misses: usize,
}

impl SizeCache {
    pub(crate) fn new() -> Self {
        Self {
            container: Size::ZERO,
            sizes: KeyMap::new(),
            misses: 0,
        }
    }

    /// The entries worth keeping across a reload. Positional keys name whatever ends up at
    /// that slot next, so only identifier keys are carried.
    pub(crate) fn carry_over(mut self) -> Self {
        self.sizes
            .retain(|key, _| matches!(key, SizeKey::Identifier(_)));
        self.misses = 0;
        self
    }

    /// Drops every entry when the container size changed since the last lookup.
    pub(crate) fn prepare(&mut self, container: Size) {
        if self.container != container {
            self.sizes.clear();
            self.container = container;
        }
    }

    pub(crate) fn get_or_measure(&mut self, key: SizeKey, measure: impl FnOnce() -> Size) -> Size {
        if let Some(size) = self.sizes.get(&key) {
            return *size;
        }
        let size = measure();
        self.misses = self.misses.saturating_add(1);
        self.sizes.insert(key, size);
        size
    }

    /// Number of measurements performed since construction or the last carry-over.
    pub(crate) fn misses(&self) -> usize {
        self.misses
    }
}
