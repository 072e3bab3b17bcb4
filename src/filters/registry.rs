use crate::error::{DataGraphError, Result};
use crate::filter::Filter;
use crate::filters::{CopyArrayInstanceFilter, CreateDataArrayFilter, CreateDataGroupFilter, MoveDataFilter};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Filter prototypes keyed by UUID.
///
/// Instances are handed out as clones so every pipeline node owns its own.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: BTreeMap<Uuid, Box<dyn Filter>>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in filters.
    pub fn with_core_filters() -> Self {
        let mut registry = Self::new();
        let core: [Box<dyn Filter>; 4] = [
            Box::new(CreateDataGroupFilter),
            Box::new(CreateDataArrayFilter),
            Box::new(CopyArrayInstanceFilter),
            Box::new(MoveDataFilter),
        ];
        for filter in core {
            if let Err(err) = registry.register(filter) {
                tracing::error!("Failed to register built-in filter: {}", err);
            }
        }
        registry
    }

    /// Add a filter; fails when its UUID is taken.
    pub fn register(&mut self, filter: Box<dyn Filter>) -> Result<()> {
        let uuid = filter.uuid();
        if let Some(existing) = self.filters.get(&uuid) {
            return Err(DataGraphError::DuplicateKey(format!(
                "{} ({} already registered as {})",
                uuid,
                filter.class_name(),
                existing.class_name()
            )));
        }
        tracing::debug!("Registered filter {} ({})", filter.class_name(), uuid);
        self.filters.insert(uuid, filter);
        Ok(())
    }

    pub fn get(&self, uuid: &Uuid) -> Option<&dyn Filter> {
        self.filters.get(uuid).map(|f| f.as_ref())
    }

    /// A fresh instance of the filter with this UUID.
    pub fn create(&self, uuid: &Uuid) -> Option<Box<dyn Filter>> {
        self.filters.get(uuid).map(|f| f.clone_box())
    }

    /// Look up by machine name or class name.
    pub fn find_by_name(&self, name: &str) -> Option<&dyn Filter> {
        self.filters
            .values()
            .find(|f| f.name() == name || f.class_name() == name)
            .map(|f| f.as_ref())
    }

    /// Filters sorted by human name.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Filter> {
        let mut filters: Vec<&dyn Filter> = self.filters.values().map(|f| f.as_ref()).collect();
        filters.sort_by_key(|f| f.human_name());
        filters.into_iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_filters_registered() {
        let registry = FilterRegistry::with_core_filters();
        assert_eq!(registry.len(), 4);
        let filter = registry.create(&CreateDataArrayFilter::UUID).unwrap();
        assert_eq!(filter.class_name(), "CreateDataArrayFilter");
        assert!(registry.find_by_name("move_data").is_some());
        assert!(registry.find_by_name("CopyArrayInstanceFilter").is_some());
    }

    #[test]
    fn test_duplicate_uuid_rejected() {
        let mut registry = FilterRegistry::with_core_filters();
        let err = registry.register(Box::new(MoveDataFilter)).unwrap_err();
        assert!(matches!(err, DataGraphError::DuplicateKey(_)));
    }

    #[test]
    fn test_iter_sorted_by_human_name() {
        let registry = FilterRegistry::with_core_filters();
        let names: Vec<_> = registry.iter().map(|f| f.human_name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
