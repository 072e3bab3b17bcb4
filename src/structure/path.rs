//! Hierarchical addresses into a [`DataStructure`](super::DataStructure).
//!
//! A `DataPath` is an immutable list of name segments. Its text form joins the
//! segments with [`DataPath::SEPARATOR`]; `from_string` parses that form back
//! losslessly. The empty path addresses the structure root.

use crate::error::{DataGraphError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DataPath {
    segments: Vec<String>,
}

impl DataPath {
    pub const SEPARATOR: char = '/';

    /// The empty path (the structure root).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from segments, rejecting empty segments and segments
    /// containing the separator.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            Self::check_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// Parse the canonical text form. A single leading separator is accepted.
    pub fn from_string(text: &str) -> Result<Self> {
        let trimmed = text.strip_prefix(Self::SEPARATOR).unwrap_or(text);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Self::new(trimmed.split(Self::SEPARATOR))
    }

    /// Validate a single object name.
    pub fn check_segment(segment: &str) -> Result<()> {
        if segment.is_empty() || segment.contains(Self::SEPARATOR) {
            return Err(DataGraphError::InvalidName(segment.to_string()));
        }
        Ok(())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path with its last segment dropped.
    pub fn parent(&self) -> DataPath {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// The path with `name` appended.
    pub fn create_child_path(&self, name: &str) -> Result<DataPath> {
        Self::check_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Last segment; fails on the empty path.
    pub fn target_name(&self) -> Result<&str> {
        self.segments
            .last()
            .map(String::as_str)
            .ok_or(DataGraphError::EmptyPath)
    }

    /// Same path with the last segment replaced.
    pub fn with_target_name(&self, name: &str) -> Result<DataPath> {
        if self.is_empty() {
            return Err(DataGraphError::EmptyPath);
        }
        self.parent().create_child_path(name)
    }

    pub fn starts_with(&self, prefix: &DataPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Swap `old` for `new` at the front of this path, if it starts with `old`.
    pub fn replace_prefix(&self, old: &DataPath, new: &DataPath) -> Option<DataPath> {
        if !self.starts_with(old) {
            return None;
        }
        let mut segments = new.segments.clone();
        segments.extend_from_slice(&self.segments[old.len()..]);
        Some(Self { segments })
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for DataPath {
    type Err = DataGraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

impl Serialize for DataPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        DataPath::from_string(&text).map_err(serde::de::Error::custom)
    }
}

/// Build a `DataPath` from string literals, panicking on invalid segments.
///
/// Intended for tests and constant paths.
#[macro_export]
macro_rules! data_path {
    () => {
        $crate::structure::DataPath::root()
    };
    ($($segment:expr),+ $(,)?) => {
        $crate::structure::DataPath::new([$($segment),+]).expect("invalid data path literal")
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parent_of_single_segment_is_empty() {
        let path = DataPath::new(["Data"]).unwrap();
        assert!(path.parent().is_empty());
        assert!(path.parent().parent().is_empty());
    }

    #[test]
    fn test_child_path() {
        let path = DataPath::new(["Data"]).unwrap();
        let child = path.create_child_path("Values").unwrap();
        assert_eq!(child.to_string(), "Data/Values");
        assert_eq!(child.parent(), path);
        assert!(path.create_child_path("a/b").is_err());
        assert!(path.create_child_path("").is_err());
    }

    #[test]
    fn test_target_name() {
        assert_eq!(
            DataPath::from_string("A/B/C").unwrap().target_name().unwrap(),
            "C"
        );
        assert!(matches!(
            DataPath::root().target_name(),
            Err(DataGraphError::EmptyPath)
        ));
    }

    #[test]
    fn test_from_string_edge_cases() {
        assert!(DataPath::from_string("").unwrap().is_empty());
        assert_eq!(
            DataPath::from_string("/A/B").unwrap(),
            DataPath::new(["A", "B"]).unwrap()
        );
        assert!(DataPath::from_string("A//B").is_err());
        assert!(DataPath::from_string("A/").is_err());
    }

    #[test]
    fn test_replace_prefix() {
        let path = DataPath::from_string("A/B/C").unwrap();
        let old = DataPath::from_string("A/B").unwrap();
        let new = DataPath::from_string("X").unwrap();
        assert_eq!(
            path.replace_prefix(&old, &new).unwrap().to_string(),
            "X/C"
        );
        assert!(new.replace_prefix(&old, &path).is_none());
    }

    #[test]
    fn test_serde_uses_text_form() {
        let path = data_path!["Data", "Values"];
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"Data/Values\"");
        let parsed: DataPath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, path);
    }

    proptest! {
        #[test]
        fn prop_string_round_trip(segments in prop::collection::vec("[A-Za-z0-9 _.-]{1,12}", 0..8)) {
            let path = DataPath::new(segments.clone()).unwrap();
            let parsed = DataPath::from_string(&path.to_string()).unwrap();
            prop_assert_eq!(parsed.segments(), &segments[..]);
            prop_assert_eq!(parsed, path);
        }
    }
}
