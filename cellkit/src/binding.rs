use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{Axis, Size};

/// Reuse-pool key naming the kind of visual element an item needs.
pub type ViewType = &'static str;

/// Key under which a measured item size is cached for the duration of a pass.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeKey {
    /// Content identity: items with the same identifier share a measurement.
    Identifier(String),
    /// Positional fallback when the content has no stable identity.
    Slot { index: usize, view_type: ViewType },
}

/// The external view layer: creates visual elements for data items, configures them and
/// optionally measures them.
pub trait ViewBinding: Send + Sync {
    type Data: Send + Sync;
    type View;

    fn view_type(&self, data: &Self::Data) -> ViewType;

    /// Creates a fresh, unconfigured element. Called only when the reuse pool is empty.
    fn make_view(&self, data: &Self::Data) -> Self::View;

    fn configure(&self, view: &mut Self::View, data: &Self::Data);

    /// Size the element reports for `data` without measuring. Takes precedence over
    /// [`ViewBinding::fit_size`].
    fn intrinsic_size(&self, _data: &Self::Data, _target: Size) -> Option<Size> {
        None
    }

    /// Fit-to-size probe. `target` is unbounded (`f32::INFINITY`) along `axis`.
    ///
    /// Treated as expensive; the engine caches its result per pass.
    fn fit_size(&self, data: &Self::Data, target: Size, axis: Axis) -> Size;
}

/// Everything a leaf provider needs from its items.
pub trait ItemSource<V>: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn identifier(&self, index: usize) -> String;

    fn view_type(&self, index: usize) -> ViewType;

    fn size_key(&self, index: usize) -> SizeKey {
        SizeKey::Slot {
            index,
            view_type: self.view_type(index),
        }
    }

    /// Measures item `index` against a container of size `container`, scrolling along `axis`.
    fn measure(&self, index: usize, container: Size, axis: Axis) -> Size;

    fn make_view(&self, index: usize) -> V;

    /// Binds item `index` into `view` (fresh or reused).
    fn update(&self, view: &mut V, index: usize);
}

/// Maps an item to its identifier.
pub type IdentifierFn<D> = Arc<dyn Fn(usize, &D) -> String + Send + Sync>;

/// An [`ItemSource`] over an owned list of data items and a [`ViewBinding`].
pub struct DataSource<B: ViewBinding> {
    data: Vec<B::Data>,
    binding: B,
    identifier: IdentifierFn<B::Data>,
    size_by_identifier: bool,
}

impl<B: ViewBinding> DataSource<B> {
    /// Items are identified by their index until [`DataSource::with_identifier`] is used.
    pub fn new(data: Vec<B::Data>, binding: B) -> Self {
        Self {
            data,
            binding,
            identifier: Arc::new(|i, _| i.to_string()),
            size_by_identifier: false,
        }
    }

    /// Sets the identifier mapper. Sizes are then cached by identifier rather than by slot.
    pub fn with_identifier(
        mut self,
        identifier: impl Fn(usize, &B::Data) -> String + Send + Sync + 'static,
    ) -> Self {
        self.identifier = Arc::new(identifier);
        self.size_by_identifier = true;
        self
    }

    pub fn with_size_by_identifier(mut self, size_by_identifier: bool) -> Self {
        self.size_by_identifier = size_by_identifier;
        self
    }

    pub fn data(&self) -> &[B::Data] {
        &self.data
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    fn item(&self, index: usize) -> &B::Data {
        match self.data.get(index) {
            Some(item) => item,
            None => crate::error::contract_violation(crate::Error::IndexOutOfRange {
                index,
                count: self.data.len(),
            }),
        }
    }
}

impl<B: ViewBinding> core::fmt::Debug for DataSource<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DataSource")
            .field("len", &self.data.len())
            .field("size_by_identifier", &self.size_by_identifier)
            .finish_non_exhaustive()
    }
}

impl<B: ViewBinding> ItemSource<B::View> for DataSource<B> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn identifier(&self, index: usize) -> String {
        (self.identifier)(index, self.item(index))
    }

    fn view_type(&self, index: usize) -> ViewType {
        self.binding.view_type(self.item(index))
    }

    fn size_key(&self, index: usize) -> SizeKey {
        if self.size_by_identifier {
            SizeKey::Identifier(self.identifier(index))
        } else {
            SizeKey::Slot {
                index,
                view_type: self.view_type(index),
            }
        }
    }

    fn measure(&self, index: usize, container: Size, axis: Axis) -> Size {
        let data = self.item(index);
        if let Some(size) = self.binding.intrinsic_size(data, container) {
            return size;
        }
        let target = match axis {
            Axis::Vertical => Size::new(container.width, f32::INFINITY),
            Axis::Horizontal => Size::new(f32::INFINITY, container.height),
        };
        self.binding.fit_size(data, target, axis)
    }

    fn make_view(&self, index: usize) -> B::View {
        self.binding.make_view(self.item(index))
    }

    fn update(&self, view: &mut B::View, index: usize) {
        self.binding.configure(view, self.item(index));
    }
}
