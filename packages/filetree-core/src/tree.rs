use serde::{Deserialize, Serialize};

use crate::ids::FolderId;
use crate::item::{Folder, Metadata, Record};

/// Nested children of a tree node, fully materialized.
///
/// Equality and drop walk the subtree with an explicit stack, so arbitrarily deep trees can
/// be compared and released.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TreeChildren {
    #[serde(default)]
    pub folders: Vec<FolderNode>,
    #[serde(default)]
    pub records: Vec<Record>,
}

/// A folder inside the render tree, embedding its own subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    #[serde(alias = "_id")]
    pub id: FolderId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    #[serde(default)]
    pub children: TreeChildren,
    #[serde(flatten)]
    pub metadata: Metadata,
}

/// Entry point of the render tree. The root is the sentinel parent: its label is carried
/// through from a bulk load for display but never becomes anyone's `parent_id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RootTree {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub children: TreeChildren,
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl TreeChildren {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.records.is_empty()
    }
}

impl PartialEq for TreeChildren {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.records != b.records || a.folders.len() != b.folders.len() {
                return false;
            }
            for (x, y) in a.folders.iter().zip(&b.folders) {
                if x.id != y.id
                    || x.name != y.name
                    || x.parent_id != y.parent_id
                    || x.metadata != y.metadata
                {
                    return false;
                }
                pending.push((&x.children, &y.children));
            }
        }
        true
    }
}

impl Drop for TreeChildren {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.folders);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children.folders);
        }
    }
}

impl FolderNode {
    pub(crate) fn from_folder(folder: &Folder, children: TreeChildren) -> Self {
        Self {
            id: folder.id.clone(),
            name: folder.name.clone(),
            parent_id: folder.parent_id.clone(),
            children,
            metadata: folder.metadata.clone(),
        }
    }
}

impl RootTree {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of folders and records reachable from the root.
    pub fn count(&self) -> (usize, usize) {
        let mut folders = 0;
        let mut records = self.children.records.len();
        let mut stack: Vec<&FolderNode> = self.children.folders.iter().collect();
        while let Some(node) = stack.pop() {
            folders += 1;
            records += node.children.records.len();
            stack.extend(node.children.folders.iter());
        }
        (folders, records)
    }

    /// Locate the materialized subtree of a folder.
    pub fn find_folder(&self, id: &FolderId) -> Option<&FolderNode> {
        let mut stack: Vec<&FolderNode> = self.children.folders.iter().collect();
        while let Some(node) = stack.pop() {
            if &node.id == id {
                return Some(node);
            }
            stack.extend(node.children.folders.iter());
        }
        None
    }

    pub(crate) fn relabel(mut self, label: &RootTree) -> Self {
        self.id = label.id.clone();
        self.name = label.name.clone();
        self.metadata = label.metadata.clone();
        self
    }
}
