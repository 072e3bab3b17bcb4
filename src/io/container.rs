//! On-disk container layout.
//!
//! A container file is a bincode stream of a [`ContainerHeader`] followed by
//! the root [`Entry`]. Entries form a tree of groups, datasets and links, each
//! carrying typed [`AttributeValue`]s:
//!
//! ```text
//! root (group)          DataStructureRoot = 1, NextObjectId = n
//! ├── Group (group)     ObjectType, ObjectId, Importable, ...
//! │   └── Values (dataset)
//! └── Shared (link)     ObjectType, ObjectId, Importable
//! ```

use crate::error::{DataGraphError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use bincode::Options;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// First bytes of every container file.
pub const MAGIC: [u8; 8] = *b"DGRAPH\0\0";

/// Newest layout this build reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

// Attribute keys shared by reader, writer and factories.
pub const ATTR_ROOT_TAG: &str = "DataStructureRoot";
pub const ATTR_NEXT_OBJECT_ID: &str = "NextObjectId";
pub const ATTR_OBJECT_TYPE: &str = "ObjectType";
pub const ATTR_OBJECT_ID: &str = "ObjectId";
pub const ATTR_IMPORTABLE: &str = "Importable";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerHeader {
    pub magic: [u8; 8],
    pub version: u32,
    pub created: DateTime<Utc>,
}

impl ContainerHeader {
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            created: Utc::now(),
        }
    }

    fn check(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(DataGraphError::MalformedContainer("bad magic header".into()));
        }
        if self.version == 0 || self.version > FORMAT_VERSION {
            return Err(DataGraphError::MalformedContainer(format!(
                "unsupported format version {} (newest supported is {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }
}

impl Default for ContainerHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    UIntList(Vec<u64>),
    FloatList(Vec<f64>),
}

/// Attribute name → value, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: AttributeValue) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn missing(key: &str) -> DataGraphError {
        DataGraphError::MalformedContainer(format!("missing attribute '{}'", key))
    }

    fn wrong(key: &str, expected: &str) -> DataGraphError {
        DataGraphError::MalformedContainer(format!("attribute '{}' is not {}", key, expected))
    }

    pub fn u64(&self, key: &str) -> Result<u64> {
        match self.get(key).ok_or_else(|| Self::missing(key))? {
            AttributeValue::UInt(v) => Ok(*v),
            AttributeValue::Int(v) if *v >= 0 => Ok(*v as u64),
            _ => Err(Self::wrong(key, "an unsigned integer")),
        }
    }

    pub fn optional_u64(&self, key: &str) -> Result<Option<u64>> {
        if self.contains(key) {
            self.u64(key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn text(&self, key: &str) -> Result<&str> {
        match self.get(key).ok_or_else(|| Self::missing(key))? {
            AttributeValue::Text(v) => Ok(v),
            _ => Err(Self::wrong(key, "text")),
        }
    }

    pub fn usize_list(&self, key: &str) -> Result<Vec<usize>> {
        match self.get(key).ok_or_else(|| Self::missing(key))? {
            AttributeValue::UIntList(v) => v
                .iter()
                .map(|&x| usize::try_from(x).map_err(|_| Self::wrong(key, "a list of sizes")))
                .collect(),
            _ => Err(Self::wrong(key, "a list of sizes")),
        }
    }

    pub fn float_list(&self, key: &str) -> Result<&[f64]> {
        match self.get(key).ok_or_else(|| Self::missing(key))? {
            AttributeValue::FloatList(v) => Ok(v),
            _ => Err(Self::wrong(key, "a list of floats")),
        }
    }
}

/// What an [`Entry`] holds besides attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Named children.
    Group,
    /// Raw little-endian element bytes.
    Dataset,
    /// Another occurrence of an object already written elsewhere.
    Link,
}

/// One node of the container tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    pub attributes: Attributes,
    pub data: Vec<u8>,
    pub children: Vec<Entry>,
}

impl Entry {
    pub fn group(name: &str, attributes: Attributes) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::Group,
            attributes,
            data: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn dataset(name: &str, attributes: Attributes, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::Dataset,
            attributes,
            data,
            children: Vec::new(),
        }
    }

    pub fn link(name: &str, attributes: Attributes) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::Link,
            attributes,
            data: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&Entry> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Same layout as `bincode::serialize`, with reads capped at `limit` bytes.
fn decode_options(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
}

/// A header plus the root entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub header: ContainerHeader,
    pub root: Entry,
}

impl Container {
    pub fn new(root: Entry) -> Self {
        Self {
            header: ContainerHeader::new(),
            root,
        }
    }

    pub fn write_to(&self, writer: impl Write) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        bincode::serialize_into(&mut writer, &self.header)?;
        bincode::serialize_into(&mut writer, &self.root)?;
        writer.flush()?;
        Ok(())
    }

    /// Decode a container from a stream, checking the header before the body.
    pub fn read_from(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Decode a container held in memory.
    ///
    /// Length prefixes are bounded by the input size, so a damaged prefix is
    /// reported as `MalformedContainer` instead of driving an allocation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let limit = bytes.len() as u64;
        let mut cursor = bytes;
        let header: ContainerHeader = decode_options(limit)
            .deserialize_from(&mut cursor)
            .map_err(|e| DataGraphError::MalformedContainer(format!("unreadable header: {}", e)))?;
        header.check()?;
        let root: Entry = decode_options(limit)
            .deserialize_from(&mut cursor)
            .map_err(|e| DataGraphError::MalformedContainer(format!("unreadable body: {}", e)))?;
        Ok(Self { header, root })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        tracing::debug!("Writing container {:?}", path);
        self.write_to(File::create(path)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading container {:?}", path);
        Self::from_bytes(&std::fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_round_trip() {
        let mut attributes = Attributes::new();
        attributes.set(ATTR_ROOT_TAG, AttributeValue::UInt(1));
        let mut root = Entry::group("", attributes);
        root.children.push(Entry::dataset("Values", Attributes::new(), vec![1, 2, 3]));
        let container = Container::new(root);

        let mut bytes = Vec::new();
        container.write_to(&mut bytes).unwrap();
        let decoded = Container::read_from(bytes.as_slice()).unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn test_bad_magic() {
        let mut header = ContainerHeader::new();
        header.magic = *b"NOTADGC!";
        let mut bytes = bincode::serialize(&header).unwrap();
        bytes.extend(bincode::serialize(&Entry::group("", Attributes::new())).unwrap());
        let err = Container::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, DataGraphError::MalformedContainer(_)));
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut header = ContainerHeader::new();
        header.version = FORMAT_VERSION + 1;
        let bytes = bincode::serialize(&header).unwrap();
        assert!(Container::read_from(bytes.as_slice()).is_err());
    }

    #[test]
    fn test_damaged_length_prefix_rejected() {
        let mut bytes = bincode::serialize(&ContainerHeader::new()).unwrap();
        // Root entry name claiming a terabyte of text
        bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
        bytes.extend_from_slice(b"root");
        let err = Container::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DataGraphError::MalformedContainer(_)));

        let mut bytes = bincode::serialize(&ContainerHeader::new()).unwrap();
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            Container::read_from(bytes.as_slice()),
            Err(DataGraphError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_tolerated() {
        let container = Container::new(Entry::group("", Attributes::new()));
        let mut bytes = Vec::new();
        container.write_to(&mut bytes).unwrap();
        bytes.extend_from_slice(&[0xAB; 4]);
        assert_eq!(Container::from_bytes(&bytes).unwrap(), container);
    }

    #[test]
    fn test_attribute_accessors() {
        let mut attributes = Attributes::new();
        attributes.set("n", AttributeValue::UInt(4));
        attributes.set("shape", AttributeValue::UIntList(vec![2, 3]));
        attributes.set("name", AttributeValue::Text("x".into()));
        assert_eq!(attributes.u64("n").unwrap(), 4);
        assert_eq!(attributes.usize_list("shape").unwrap(), vec![2, 3]);
        assert_eq!(attributes.text("name").unwrap(), "x");
        assert!(attributes.text("n").is_err());
        assert_eq!(attributes.optional_u64("absent").unwrap(), None);
    }
}
