//! Identity type for objects in a [`DataStructure`](super::DataStructure).
//!
//! IDs are allocated from a per-structure monotonically increasing counter
//! and never reused. `0` is reserved for the structure root, which is not an
//! object of its own but takes part in parent bookkeeping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key into `DataStructure::objects`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct DataObjectId(pub u64);

impl DataObjectId {
    /// Pseudo-parent of every top-level object.
    pub const ROOT: DataObjectId = DataObjectId(0);

    /// First ID handed out by a fresh structure.
    pub const FIRST: DataObjectId = DataObjectId(1);

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn next(self) -> DataObjectId {
        DataObjectId(self.0 + 1)
    }

    /// Map an optional parent to the internal parent key.
    #[inline]
    pub fn parent_or_root(parent: Option<DataObjectId>) -> DataObjectId {
        parent.unwrap_or(Self::ROOT)
    }
}

impl fmt::Debug for DataObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "DataObjectId(ROOT)")
        } else {
            write!(f, "DataObjectId({})", self.0)
        }
    }
}

impl fmt::Display for DataObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_id() {
        assert!(DataObjectId::ROOT.is_root());
        assert!(!DataObjectId::FIRST.is_root());
        assert_eq!(DataObjectId::parent_or_root(None), DataObjectId::ROOT);
        assert_eq!(
            DataObjectId::parent_or_root(Some(DataObjectId(7))),
            DataObjectId(7)
        );
    }

    #[test]
    fn test_next_is_strictly_increasing() {
        let id = DataObjectId(41);
        assert!(id.next() > id);
        assert_eq!(id.next().value(), 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(DataObjectId(3).to_string(), "#3");
        assert_eq!(DataObjectId::ROOT.to_string(), "<root>");
        assert_eq!(format!("{:?}", DataObjectId(3)), "DataObjectId(3)");
    }
}
