//! Runtime values keyed by parameter name.

use crate::error::{DataGraphError, Result};
use crate::parameters::value::{ArgValue, FromArgValue};
use std::collections::BTreeMap;

/// Parameter key → runtime value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: BTreeMap<String, ArgValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; fails when the key is already present.
    pub fn insert(&mut self, key: &str, value: impl Into<ArgValue>) -> Result<()> {
        if self.values.contains_key(key) {
            return Err(DataGraphError::DuplicateKey(key.to_string()));
        }
        self.values.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Add or replace a value.
    pub fn insert_or_assign(&mut self, key: &str, value: impl Into<ArgValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Builder form of [`insert_or_assign`](Self::insert_or_assign).
    pub fn with(mut self, key: &str, value: impl Into<ArgValue>) -> Self {
        self.insert_or_assign(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Typed read.
    ///
    /// # Panics
    ///
    /// Panics when the key is missing or holds another kind. Arguments are
    /// merged with parameter defaults and validated before a filter sees
    /// them, so either case is a bug in the filter, not in the data.
    pub fn value<T: FromArgValue>(&self, key: &str) -> T {
        match self.try_value(key) {
            Ok(value) => value,
            Err(err) => panic!("Arguments::value::<{}>: {}", std::any::type_name::<T>(), err),
        }
    }

    /// Typed read that reports problems instead of panicking.
    pub fn try_value<T: FromArgValue>(&self, key: &str) -> Result<T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| DataGraphError::MissingInput(format!("argument '{}'", key)))?;
        T::from_arg(value).ok_or_else(|| {
            DataGraphError::parameter(key, format!("holds a {} value, not {}", value.kind(), T::KIND))
        })
    }

    /// Overlay `other` onto `self`; keys in `other` win.
    pub fn merged_with(mut self, other: &Arguments) -> Self {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_path;
    use crate::structure::DataPath;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut args = Arguments::new();
        args.insert("a", 1i64).unwrap();
        assert!(matches!(args.insert("a", 2i64), Err(DataGraphError::DuplicateKey(_))));
        args.insert_or_assign("a", 3i64);
        assert_eq!(args.value::<i64>("a"), 3);
    }

    #[test]
    fn test_typed_reads() {
        let args = Arguments::new()
            .with("path", data_path!["A", "B"])
            .with("flag", true);
        assert_eq!(args.value::<DataPath>("path"), data_path!["A", "B"]);
        assert!(args.value::<bool>("flag"));
        assert!(args.try_value::<i64>("flag").is_err());
        assert!(matches!(
            args.try_value::<i64>("missing"),
            Err(DataGraphError::MissingInput(_))
        ));
    }

    #[test]
    #[should_panic(expected = "Arguments::value")]
    fn test_wrong_type_panics() {
        let args = Arguments::new().with("flag", true);
        let _: f64 = args.value("flag");
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let defaults = Arguments::new().with("a", 1i64).with("b", 2i64);
        let given = Arguments::new().with("b", 5i64);
        let merged = defaults.merged_with(&given);
        assert_eq!(merged.value::<i64>("a"), 1);
        assert_eq!(merged.value::<i64>("b"), 5);
    }
}
