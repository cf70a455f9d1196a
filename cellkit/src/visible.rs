use alloc::string::String;
use alloc::vec::Vec;

use crate::ElementId;

/// The elements currently on screen, as three parallel sequences in ascending index order.
///
/// Only the viewport mutates it, and only by replacing it wholesale at the end of a
/// reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleSet {
    pub(crate) indexes: Vec<usize>,
    pub(crate) identifiers: Vec<String>,
    pub(crate) cells: Vec<ElementId>,
}

impl VisibleSet {
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Flattened indexes, strictly increasing.
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// Disambiguated identifiers, pairwise distinct.
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn cells(&self) -> &[ElementId] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, ElementId)> + '_ {
        self.indexes
            .iter()
            .zip(&self.identifiers)
            .zip(&self.cells)
            .map(|((&index, identifier), &cell)| (index, identifier.as_str(), cell))
    }

    pub fn position_of_cell(&self, cell: ElementId) -> Option<usize> {
        self.cells.iter().position(|&c| c == cell)
    }

    pub fn position_of_index(&self, index: usize) -> Option<usize> {
        self.indexes.binary_search(&index).ok()
    }

    pub(crate) fn check_invariants(&self) {
        debug_assert_eq!(self.indexes.len(), self.identifiers.len());
        debug_assert_eq!(self.indexes.len(), self.cells.len());
        debug_assert!(
            self.indexes.windows(2).all(|w| w[0] < w[1]),
            "visible indexes must be strictly increasing"
        );
    }
}
