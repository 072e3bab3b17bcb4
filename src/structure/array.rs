//! Typed data arrays.
//!
//! `DataArray<T>` is a thin owner of a boxed [`DataStore`]. The object graph
//! stores arrays type-erased as [`AnyDataArray`], a closed enum with one
//! variant per [`DataType`]. Going from `AnyDataArray` back to a concrete
//! `DataArray<T>` is done with [`ArrayElement::project`].

use crate::error::{DataGraphError, Result};
use crate::structure::store::{DataStore, DataStoreBuf, EmptyDataStore, StoreKind};
use crate::types::{DataType, Element};
use crate::dispatch_data_type;

/// Whether new storage should be real or metadata-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMode {
    #[default]
    Materialized,
    Placeholder,
}

/// An N-dimensional table of typed tuples.
#[derive(Debug, Clone)]
pub struct DataArray<T: Element> {
    store: Box<dyn DataStore<T>>,
}

impl<T: Element> DataArray<T> {
    pub fn new(tuple_shape: &[usize], component_shape: &[usize], mode: StoreMode) -> Result<Self> {
        let store: Box<dyn DataStore<T>> = match mode {
            StoreMode::Materialized => Box::new(DataStoreBuf::new(tuple_shape, component_shape)?),
            StoreMode::Placeholder => Box::new(EmptyDataStore::new(tuple_shape, component_shape)?),
        };
        Ok(Self { store })
    }

    pub fn from_store(store: Box<dyn DataStore<T>>) -> Self {
        Self { store }
    }

    pub fn from_vec(data: Vec<T>, tuple_shape: &[usize], component_shape: &[usize]) -> Result<Self> {
        Ok(Self {
            store: Box::new(DataStoreBuf::from_vec(data, tuple_shape, component_shape)?),
        })
    }

    pub fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    pub fn store(&self) -> &dyn DataStore<T> {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn DataStore<T> {
        self.store.as_mut()
    }

    /// Element slice; fails for placeholder arrays.
    pub fn values(&self) -> Result<&[T]> {
        self.store
            .as_slice()
            .ok_or_else(|| DataGraphError::PlaceholderStore(format!("{} array", T::DATA_TYPE)))
    }

    /// Mutable element slice; fails for placeholder arrays.
    pub fn values_mut(&mut self) -> Result<&mut [T]> {
        self.store
            .as_mut_slice()
            .ok_or_else(|| DataGraphError::PlaceholderStore(format!("{} array", T::DATA_TYPE)))
    }

    pub fn get_component(&self, tuple: usize, component: usize) -> Result<T> {
        self.store.get_component(tuple, component)
    }

    pub fn set_component(&mut self, tuple: usize, component: usize, value: T) -> Result<()> {
        self.store.set_component(tuple, component, value)
    }

    pub fn tuple_shape(&self) -> &[usize] {
        self.store.tuple_shape()
    }

    pub fn component_shape(&self) -> &[usize] {
        self.store.component_shape()
    }

    pub fn number_of_tuples(&self) -> usize {
        self.store.number_of_tuples()
    }

    pub fn number_of_components(&self) -> usize {
        self.store.number_of_components()
    }

    pub fn size(&self) -> usize {
        self.store.size()
    }

    pub fn reshape_tuples(&mut self, tuple_shape: &[usize]) -> Result<()> {
        self.store.reshape_tuples(tuple_shape)
    }

    /// Whether [`reshape_tuples`](Self::reshape_tuples) would accept this shape.
    pub fn check_reshape(&self, tuple_shape: &[usize]) -> Result<()> {
        self.store.check_reshape(tuple_shape).map(|_| ())
    }

    pub fn is_placeholder(&self) -> bool {
        self.store.kind() == StoreKind::Placeholder
    }
}

/// Element types that can be wrapped into and projected out of [`AnyDataArray`].
pub trait ArrayElement: Element {
    fn wrap(array: DataArray<Self>) -> AnyDataArray;

    fn project(array: &AnyDataArray) -> Option<&DataArray<Self>>;

    fn project_mut(array: &mut AnyDataArray) -> Option<&mut DataArray<Self>>;
}

macro_rules! any_data_array {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        /// A data array of any supported element kind.
        #[derive(Debug, Clone)]
        pub enum AnyDataArray {
            $($variant(DataArray<$ty>),)+
        }

        $(
            impl ArrayElement for $ty {
                fn wrap(array: DataArray<Self>) -> AnyDataArray {
                    AnyDataArray::$variant(array)
                }

                fn project(array: &AnyDataArray) -> Option<&DataArray<Self>> {
                    match array {
                        AnyDataArray::$variant(a) => Some(a),
                        _ => None,
                    }
                }

                fn project_mut(array: &mut AnyDataArray) -> Option<&mut DataArray<Self>> {
                    match array {
                        AnyDataArray::$variant(a) => Some(a),
                        _ => None,
                    }
                }
            }

            impl From<DataArray<$ty>> for AnyDataArray {
                fn from(array: DataArray<$ty>) -> Self {
                    AnyDataArray::$variant(array)
                }
            }
        )+
    };
}

/// Forward a method call to the typed array inside.
macro_rules! with_array {
    ($array:expr, $a:ident => $body:expr) => {
        match $array {
            AnyDataArray::Int8($a) => $body,
            AnyDataArray::UInt8($a) => $body,
            AnyDataArray::Int16($a) => $body,
            AnyDataArray::UInt16($a) => $body,
            AnyDataArray::Int32($a) => $body,
            AnyDataArray::UInt32($a) => $body,
            AnyDataArray::Int64($a) => $body,
            AnyDataArray::UInt64($a) => $body,
            AnyDataArray::Float32($a) => $body,
            AnyDataArray::Float64($a) => $body,
            AnyDataArray::Boolean($a) => $body,
        }
    };
}

any_data_array! {
    Int8 => i8,
    UInt8 => u8,
    Int16 => i16,
    UInt16 => u16,
    Int32 => i32,
    UInt32 => u32,
    Int64 => i64,
    UInt64 => u64,
    Float32 => f32,
    Float64 => f64,
    Boolean => bool,
}

impl AnyDataArray {
    /// Create an array of the kind selected at runtime.
    pub fn new(
        data_type: DataType,
        tuple_shape: &[usize],
        component_shape: &[usize],
        mode: StoreMode,
    ) -> Result<Self> {
        dispatch_data_type!(data_type, T => {
            Ok(<T as ArrayElement>::wrap(DataArray::<T>::new(tuple_shape, component_shape, mode)?))
        })
    }

    /// Same type and shape, fresh storage; values are not copied.
    pub fn empty_like(&self, mode: StoreMode) -> Result<Self> {
        Self::new(self.data_type(), self.tuple_shape(), self.component_shape(), mode)
    }

    pub fn data_type(&self) -> DataType {
        with_array!(self, a => a.data_type())
    }

    pub fn tuple_shape(&self) -> &[usize] {
        with_array!(self, a => a.tuple_shape())
    }

    pub fn component_shape(&self) -> &[usize] {
        with_array!(self, a => a.component_shape())
    }

    pub fn number_of_tuples(&self) -> usize {
        with_array!(self, a => a.number_of_tuples())
    }

    pub fn number_of_components(&self) -> usize {
        with_array!(self, a => a.number_of_components())
    }

    pub fn size(&self) -> usize {
        with_array!(self, a => a.size())
    }

    pub fn is_placeholder(&self) -> bool {
        with_array!(self, a => a.is_placeholder())
    }

    pub fn reshape_tuples(&mut self, tuple_shape: &[usize]) -> Result<()> {
        with_array!(self, a => a.reshape_tuples(tuple_shape))
    }

    pub fn check_reshape(&self, tuple_shape: &[usize]) -> Result<()> {
        with_array!(self, a => a.check_reshape(tuple_shape))
    }

    /// Flat read widened to f64.
    pub fn value_as_f64(&self, index: usize) -> Result<f64> {
        with_array!(self, a => a.store().get_value(index).map(Element::to_f64))
    }

    /// Flat write narrowed from f64.
    pub fn set_value_from_f64(&mut self, index: usize, value: f64) -> Result<()> {
        with_array!(self, a => a.store_mut().set_value(index, Element::from_f64(value)))
    }

    /// Typed view, `None` when `T` is not this array's kind.
    pub fn as_typed<T: ArrayElement>(&self) -> Option<&DataArray<T>> {
        T::project(self)
    }

    pub fn as_typed_mut<T: ArrayElement>(&mut self) -> Option<&mut DataArray<T>> {
        T::project_mut(self)
    }
}
