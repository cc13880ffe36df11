use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{FolderId, ItemKind, RecordId};

/// Fields beyond identity and parentage. Opaque to the engine and passed through unchanged.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Shared capability of folders and records: an id, a display name, and a parent link.
///
/// `parent_id() == None` means the item sits directly under the root sentinel.
pub trait Item {
    type Id: Clone + Eq + Hash + fmt::Display;
    const KIND: ItemKind;

    fn id(&self) -> &Self::Id;
    fn name(&self) -> &str;
    fn parent_id(&self) -> Option<&FolderId>;
}

/// Borrowed reference to a direct child, used when patching a parent's children view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChildRef<'a> {
    Folder(&'a FolderId),
    Record(&'a RecordId),
}

/// Direct child ids of a folder. A cache: always derivable from `parent_id` links.
///
/// Order follows the order of the children in the flat collections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildrenView {
    #[serde(default)]
    pub folders: Vec<FolderId>,
    #[serde(default)]
    pub records: Vec<RecordId>,
}

impl ChildrenView {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folders.len() + self.records.len()
    }

    pub fn contains(&self, child: ChildRef<'_>) -> bool {
        match child {
            ChildRef::Folder(id) => self.folders.contains(id),
            ChildRef::Record(id) => self.records.contains(id),
        }
    }

    /// Append at the end; a child already present is left where it is.
    pub(crate) fn push(&mut self, child: ChildRef<'_>) {
        if self.contains(child) {
            return;
        }
        match child {
            ChildRef::Folder(id) => self.folders.push(id.clone()),
            ChildRef::Record(id) => self.records.push(id.clone()),
        }
    }

    pub(crate) fn remove(&mut self, child: ChildRef<'_>) {
        match child {
            ChildRef::Folder(id) => self.folders.retain(|c| c != id),
            ChildRef::Record(id) => self.records.retain(|c| c != id),
        }
    }
}

/// A folder as stored in the flat `folders` collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(alias = "_id")]
    pub id: FolderId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// Recomputed by the engine on every write; whatever a payload carries here is dropped.
    #[serde(default, deserialize_with = "discard_children")]
    pub children: ChildrenView,
    #[serde(flatten)]
    pub metadata: Metadata,
}

/// A file entry as stored in the flat `records` collection. Terminal: never a parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    #[serde(flatten)]
    pub metadata: Metadata,
}

fn discard_children<'de, D>(deserializer: D) -> std::result::Result<ChildrenView, D::Error>
where
    D: Deserializer<'de>,
{
    serde::de::IgnoredAny::deserialize(deserializer)?;
    Ok(ChildrenView::default())
}

impl Folder {
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            children: ChildrenView::default(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Record {
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Item for Folder {
    type Id = FolderId;
    const KIND: ItemKind = ItemKind::Folder;

    fn id(&self) -> &FolderId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_id(&self) -> Option<&FolderId> {
        self.parent_id.as_ref()
    }
}

impl Item for Record {
    type Id = RecordId;
    const KIND: ItemKind = ItemKind::Record;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_id(&self) -> Option<&FolderId> {
        self.parent_id.as_ref()
    }
}
