//! Backing storage for data arrays.
//!
//! Two-variant design:
//! - **`DataStoreBuf`**: materialized, owns a `Vec<T>` of `tuples * components`.
//! - **`EmptyDataStore`**: placeholder, shape and type only. Created by
//!   preflight so that planning a huge array costs nothing.
//!
//! Both sit behind the `DataStore` trait. The trait has no downcast hook, so
//! code holding a `&dyn DataStore<T>` can only reach element data through the
//! bounds-checked accessors, which report `PlaceholderStore` for placeholders.

use crate::error::{DataGraphError, Result};
use crate::types::Element;
use std::fmt;
use std::marker::PhantomData;

/// Which variant backs an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Materialized,
    Placeholder,
}

/// Product of a shape's extents (1 for an empty shape).
///
/// Only for shapes already accepted by [`checked_shape_size`]; stores and
/// matrices check their shapes on construction.
#[inline]
pub fn shape_size(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Product of a shape's extents, `ShapeMismatch` when it overflows `usize`.
pub fn checked_shape_size(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
        .ok_or_else(|| DataGraphError::ShapeMismatch(format!("shape {:?} overflows the element count", shape)))
}

/// Tuples times components for a pair of shapes, checked for overflow.
pub fn checked_element_count(tuple_shape: &[usize], component_shape: &[usize]) -> Result<usize> {
    let tuples = checked_shape_size(tuple_shape)?;
    let components = checked_shape_size(component_shape)?;
    tuples.checked_mul(components).ok_or_else(|| {
        DataGraphError::ShapeMismatch(format!(
            "{:?} tuples of {:?} components overflow the element count",
            tuple_shape, component_shape
        ))
    })
}

/// Storage of `tuples * components` elements of type `T`.
pub trait DataStore<T: Element>: fmt::Debug + Send + Sync {
    fn kind(&self) -> StoreKind;

    fn tuple_shape(&self) -> &[usize];

    fn component_shape(&self) -> &[usize];

    /// Whether `reshape_tuples` may change the total element count.
    fn supports_reallocation(&self) -> bool;

    /// Change the tuple shape. Component shape is fixed for the life of a store.
    fn reshape_tuples(&mut self, tuple_shape: &[usize]) -> Result<()>;

    /// Check that `reshape_tuples(tuple_shape)` would succeed, without
    /// changing anything. Returns the new element count.
    fn check_reshape(&self, tuple_shape: &[usize]) -> Result<usize> {
        let new_len = check_shapes(tuple_shape, self.component_shape())?;
        if new_len != self.size() && !self.supports_reallocation() {
            return Err(DataGraphError::ShapeMismatch(format!(
                "fixed store of {} elements cannot hold {}",
                self.size(),
                new_len
            )));
        }
        Ok(new_len)
    }

    /// Flat element read.
    fn get_value(&self, index: usize) -> Result<T>;

    /// Flat element write.
    fn set_value(&mut self, index: usize, value: T) -> Result<()>;

    fn as_slice(&self) -> Option<&[T]>;

    fn as_mut_slice(&mut self) -> Option<&mut [T]>;

    fn clone_box(&self) -> Box<dyn DataStore<T>>;

    fn number_of_tuples(&self) -> usize {
        shape_size(self.tuple_shape())
    }

    fn number_of_components(&self) -> usize {
        shape_size(self.component_shape())
    }

    /// Tuple count times component count.
    fn size(&self) -> usize {
        self.number_of_tuples() * self.number_of_components()
    }

    fn is_placeholder(&self) -> bool {
        self.kind() == StoreKind::Placeholder
    }

    fn get_component(&self, tuple: usize, component: usize) -> Result<T> {
        let index = self.component_index(tuple, component)?;
        self.get_value(index)
    }

    fn set_component(&mut self, tuple: usize, component: usize, value: T) -> Result<()> {
        let index = self.component_index(tuple, component)?;
        self.set_value(index, value)
    }

    /// Flat index of a (tuple, component) pair, bounds-checked on both axes.
    fn component_index(&self, tuple: usize, component: usize) -> Result<usize> {
        let tuples = self.number_of_tuples();
        let components = self.number_of_components();
        if tuple >= tuples {
            return Err(DataGraphError::IndexOutOfBounds {
                index: tuple,
                len: tuples,
            });
        }
        if component >= components {
            return Err(DataGraphError::IndexOutOfBounds {
                index: component,
                len: components,
            });
        }
        Ok(tuple * components + component)
    }

    fn fill(&mut self, value: T) -> Result<()> {
        match self.as_mut_slice() {
            Some(slice) => {
                slice.fill(value);
                Ok(())
            }
            None => Err(placeholder_error::<T>()),
        }
    }
}

impl<T: Element> Clone for Box<dyn DataStore<T>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

fn placeholder_error<T: Element>() -> DataGraphError {
    DataGraphError::PlaceholderStore(format!("{} placeholder store", T::DATA_TYPE))
}

/// Validate a shape pair and return its element count.
fn check_shapes(tuple_shape: &[usize], component_shape: &[usize]) -> Result<usize> {
    if tuple_shape.is_empty() || component_shape.is_empty() {
        return Err(DataGraphError::ShapeMismatch(
            "tuple and component shapes must have at least one dimension".to_string(),
        ));
    }
    if component_shape.contains(&0) {
        return Err(DataGraphError::ShapeMismatch(
            "component extents must be positive".to_string(),
        ));
    }
    checked_element_count(tuple_shape, component_shape)
}

// ==================== Materialized ====================

/// Materialized store: a contiguous, tuple-major buffer.
#[derive(Debug, Clone)]
pub struct DataStoreBuf<T: Element> {
    data: Vec<T>,
    tuple_shape: Vec<usize>,
    component_shape: Vec<usize>,
    resizable: bool,
}

impl<T: Element> DataStoreBuf<T> {
    /// Allocate a store with every element set to `T::default()`.
    pub fn new(tuple_shape: &[usize], component_shape: &[usize]) -> Result<Self> {
        let len = check_shapes(tuple_shape, component_shape)?;
        Ok(Self {
            data: vec![T::default(); len],
            tuple_shape: tuple_shape.to_vec(),
            component_shape: component_shape.to_vec(),
            resizable: true,
        })
    }

    /// Wrap existing values; `data.len()` must match the shapes.
    pub fn from_vec(data: Vec<T>, tuple_shape: &[usize], component_shape: &[usize]) -> Result<Self> {
        let expected = check_shapes(tuple_shape, component_shape)?;
        if data.len() != expected {
            return Err(DataGraphError::ShapeMismatch(format!(
                "{} values supplied for a store of {} elements",
                data.len(),
                expected
            )));
        }
        Ok(Self {
            data,
            tuple_shape: tuple_shape.to_vec(),
            component_shape: component_shape.to_vec(),
            resizable: true,
        })
    }

    /// Disallow reallocation; later reshapes must keep the element count.
    pub fn fixed(mut self) -> Self {
        self.resizable = false;
        self
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Element> DataStore<T> for DataStoreBuf<T> {
    fn kind(&self) -> StoreKind {
        StoreKind::Materialized
    }

    fn tuple_shape(&self) -> &[usize] {
        &self.tuple_shape
    }

    fn component_shape(&self) -> &[usize] {
        &self.component_shape
    }

    fn supports_reallocation(&self) -> bool {
        self.resizable
    }

    fn reshape_tuples(&mut self, tuple_shape: &[usize]) -> Result<()> {
        let new_len = self.check_reshape(tuple_shape)?;
        if new_len != self.data.len() {
            self.data.resize(new_len, T::default());
        }
        self.tuple_shape = tuple_shape.to_vec();
        Ok(())
    }

    fn get_value(&self, index: usize) -> Result<T> {
        self.data
            .get(index)
            .copied()
            .ok_or(DataGraphError::IndexOutOfBounds {
                index,
                len: self.data.len(),
            })
    }

    fn set_value(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.data.len();
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(DataGraphError::IndexOutOfBounds { index, len }),
        }
    }

    fn as_slice(&self) -> Option<&[T]> {
        Some(&self.data)
    }

    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        Some(&mut self.data)
    }

    fn clone_box(&self) -> Box<dyn DataStore<T>> {
        Box::new(self.clone())
    }
}

// ==================== Placeholder ====================

/// Placeholder store: shape and type metadata only.
#[derive(Debug, Clone)]
pub struct EmptyDataStore<T: Element> {
    tuple_shape: Vec<usize>,
    component_shape: Vec<usize>,
    _marker: PhantomData<T>,
}

impl<T: Element> EmptyDataStore<T> {
    pub fn new(tuple_shape: &[usize], component_shape: &[usize]) -> Result<Self> {
        check_shapes(tuple_shape, component_shape)?;
        Ok(Self {
            tuple_shape: tuple_shape.to_vec(),
            component_shape: component_shape.to_vec(),
            _marker: PhantomData,
        })
    }
}

impl<T: Element> DataStore<T> for EmptyDataStore<T> {
    fn kind(&self) -> StoreKind {
        StoreKind::Placeholder
    }

    fn tuple_shape(&self) -> &[usize] {
        &self.tuple_shape
    }

    fn component_shape(&self) -> &[usize] {
        &self.component_shape
    }

    fn supports_reallocation(&self) -> bool {
        true
    }

    fn reshape_tuples(&mut self, tuple_shape: &[usize]) -> Result<()> {
        check_shapes(tuple_shape, &self.component_shape)?;
        self.tuple_shape = tuple_shape.to_vec();
        Ok(())
    }

    fn get_value(&self, _index: usize) -> Result<T> {
        Err(placeholder_error::<T>())
    }

    fn set_value(&mut self, _index: usize, _value: T) -> Result<()> {
        Err(placeholder_error::<T>())
    }

    fn as_slice(&self) -> Option<&[T]> {
        None
    }

    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        None
    }

    fn clone_box(&self) -> Box<dyn DataStore<T>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_is_tuples_times_components() {
        let store = DataStoreBuf::<f32>::new(&[5, 2], &[3]).unwrap();
        assert_eq!(store.number_of_tuples(), 10);
        assert_eq!(store.number_of_components(), 3);
        assert_eq!(store.size(), 30);
        assert_eq!(store.as_slice().unwrap().len(), 30);
    }

    #[test]
    fn test_component_access_is_bounds_checked() {
        let mut store = DataStoreBuf::<i32>::new(&[4], &[2]).unwrap();
        store.set_component(3, 1, 42).unwrap();
        assert_eq!(store.get_component(3, 1).unwrap(), 42);
        assert_eq!(store.get_value(7).unwrap(), 42);
        assert!(matches!(
            store.get_component(4, 0),
            Err(DataGraphError::IndexOutOfBounds { index: 4, len: 4 })
        ));
        assert!(store.set_component(0, 2, 1).is_err());
    }

    #[test]
    fn test_reshape_reallocates_materialized() {
        let mut store = DataStoreBuf::<u8>::new(&[2], &[1]).unwrap();
        store.fill(9).unwrap();
        store.reshape_tuples(&[4]).unwrap();
        assert_eq!(store.as_slice().unwrap(), &[9, 9, 0, 0]);
    }

    #[test]
    fn test_fixed_store_rejects_resize() {
        let mut store = DataStoreBuf::<u8>::new(&[2, 3], &[1]).unwrap().fixed();
        assert!(store.reshape_tuples(&[3, 2]).is_ok());
        assert!(matches!(
            store.reshape_tuples(&[7]),
            Err(DataGraphError::ShapeMismatch(_))
        ));
        assert_eq!(store.tuple_shape(), &[3, 2]);
    }

    #[test]
    fn test_placeholder_has_metadata_only() {
        let mut store = EmptyDataStore::<f64>::new(&[1_000_000_000], &[3]).unwrap();
        assert!(store.is_placeholder());
        assert_eq!(store.size(), 3_000_000_000);
        assert!(store.as_slice().is_none());
        assert!(matches!(
            store.get_value(0),
            Err(DataGraphError::PlaceholderStore(_))
        ));
        store.reshape_tuples(&[10]).unwrap();
        assert_eq!(store.number_of_tuples(), 10);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(DataStoreBuf::from_vec(vec![1i16, 2, 3], &[3], &[1]).is_ok());
        assert!(DataStoreBuf::from_vec(vec![1i16, 2, 3], &[2], &[1]).is_err());
    }

    #[test]
    fn test_empty_shapes_rejected() {
        assert!(DataStoreBuf::<i8>::new(&[], &[1]).is_err());
        assert!(EmptyDataStore::<i8>::new(&[1], &[0]).is_err());
    }

    #[test]
    fn test_overflowing_shapes_rejected() {
        assert!(matches!(
            checked_shape_size(&[usize::MAX, 2]),
            Err(DataGraphError::ShapeMismatch(_))
        ));
        assert!(matches!(
            checked_element_count(&[usize::MAX / 2 + 1], &[2]),
            Err(DataGraphError::ShapeMismatch(_))
        ));
        assert_eq!(checked_element_count(&[4, 3], &[2]).unwrap(), 24);

        assert!(matches!(
            EmptyDataStore::<f32>::new(&[usize::MAX, 2], &[1]),
            Err(DataGraphError::ShapeMismatch(_))
        ));
        assert!(matches!(
            DataStoreBuf::<u8>::new(&[usize::MAX], &[3]),
            Err(DataGraphError::ShapeMismatch(_))
        ));

        let mut store = EmptyDataStore::<f32>::new(&[4], &[3]).unwrap();
        assert!(store.reshape_tuples(&[usize::MAX]).is_err());
        assert_eq!(store.tuple_shape(), &[4]);
    }

    #[test]
    fn test_check_reshape_leaves_store_untouched() {
        let store = DataStoreBuf::<u8>::new(&[2, 3], &[1]).unwrap().fixed();
        assert_eq!(store.check_reshape(&[6]).unwrap(), 6);
        assert!(store.check_reshape(&[7]).is_err());
        assert_eq!(store.tuple_shape(), &[2, 3]);
    }
}
