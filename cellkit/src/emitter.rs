/// Forwards flattened indexes to a sink in strictly ascending order.
///
/// Sticky headers are reported once by their own frame and again by their visible section, so
/// repeats of the last index are dropped. Anything else that is not strictly ascending or in
/// range breaks the visible-set invariant and is dropped too.
pub(crate) struct IndexEmitter<'a> {
    count: usize,
    last: Option<usize>,
    sink: &'a mut dyn FnMut(usize),
}

impl<'a> IndexEmitter<'a> {
    pub(crate) fn new(count: usize, sink: &'a mut dyn FnMut(usize)) -> Self {
        Self {
            count,
            last: None,
            sink,
        }
    }

    pub(crate) fn emit(&mut self, index: usize) {
        if self.last == Some(index) {
            return;
        }
        let ascending = self.last.is_none_or(|last| index > last);
        if index >= self.count || !ascending {
            cwarn!(index, count = self.count, last = ?self.last, "dropped visible index");
            debug_assert!(
                index < self.count && ascending,
                "visible index {index} out of order or range"
            );
            return;
        }
        self.last = Some(index);
        (self.sink)(index);
    }
}
