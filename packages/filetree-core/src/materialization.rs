//! Conversions between the flat collections and the nested render tree.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::ids::{FolderId, ItemKind, RecordId};
use crate::item::{ChildrenView, Folder, Record};
use crate::parent_index::ParentIndex;
use crate::tree::{FolderNode, RootTree, TreeChildren};

/// Build the nested tree from the flat collections, starting at the root sentinel.
///
/// Items whose parent chain does not lead back to the root (orphans, or folders caught in a
/// loop) are left out of the tree. They stay in the flat collections for diagnostics.
///
/// The walk keeps its own stack, so nesting depth is bounded by memory rather than by the
/// call stack.
pub fn structure(folders: &[Folder], records: &[Record]) -> RootTree {
    let index = ParentIndex::build(folders, records);
    let mut visited: HashSet<&FolderId> = HashSet::new();
    let mut placed = 0;
    let mut stack = vec![Frame::open(&index, None)];

    let children = loop {
        let next = match stack.last_mut() {
            Some(top) => top.pending.next(),
            None => break TreeChildren::default(),
        };
        if let Some(folder) = next {
            if visited.insert(&folder.id) {
                placed += 1;
                stack.push(Frame::open(&index, Some(folder)));
            }
            continue;
        }

        let Some(mut done) = stack.pop() else {
            break TreeChildren::default();
        };
        let parent = done.folder.map(|f| &f.id);
        for record in index.child_records(parent) {
            placed += 1;
            done.out.records.push(record.clone());
        }
        match (done.folder, stack.last_mut()) {
            (Some(folder), Some(up)) => {
                up.out.folders.push(FolderNode::from_folder(folder, done.out));
            }
            _ => break done.out,
        }
    };

    let dropped = (folders.len() + records.len()).saturating_sub(placed);
    if dropped > 0 {
        tracing::debug!(dropped, "unreachable items excluded from the tree");
    }

    RootTree {
        children,
        ..RootTree::default()
    }
}

/// One open folder during materialization: the children still to visit and what has been
/// built so far. `folder` is `None` for the root sentinel.
struct Frame<'a> {
    folder: Option<&'a Folder>,
    pending: std::vec::IntoIter<&'a Folder>,
    out: TreeChildren,
}

impl<'a> Frame<'a> {
    fn open(index: &ParentIndex<'a>, folder: Option<&'a Folder>) -> Self {
        let pending: Vec<&'a Folder> = index.child_folders(folder.map(|f| &f.id)).collect();
        Self {
            folder,
            pending: pending.into_iter(),
            out: TreeChildren::default(),
        }
    }
}

/// Flatten an externally supplied tree in pre-order.
///
/// Every item's `parent_id` is taken from where it sits in the tree, not from the payload;
/// items directly under the root get the root sentinel. Each folder's children view is
/// derived from its nested children. Repeated ids are rejected.
pub fn destructure(tree: &RootTree) -> Result<(Vec<Folder>, Vec<Record>)> {
    let mut folders = Vec::new();
    let mut records = Vec::new();
    let mut folder_ids: HashSet<&FolderId> = HashSet::new();
    let mut record_ids: HashSet<&RecordId> = HashSet::new();
    // (parent, its nested children, next folder to descend into)
    let mut stack: Vec<(Option<&FolderId>, &TreeChildren, usize)> = vec![(None, &tree.children, 0)];

    while let Some((parent, children, next)) = stack.last_mut() {
        let (parent, children) = (*parent, *children);
        if let Some(node) = children.folders.get(*next) {
            *next += 1;
            if !folder_ids.insert(&node.id) {
                return Err(Error::duplicate(ItemKind::Folder, &node.id));
            }
            folders.push(Folder {
                id: node.id.clone(),
                name: node.name.clone(),
                parent_id: parent.cloned(),
                children: ChildrenView {
                    folders: node.children.folders.iter().map(|f| f.id.clone()).collect(),
                    records: node.children.records.iter().map(|r| r.id.clone()).collect(),
                },
                metadata: node.metadata.clone(),
            });
            stack.push((Some(&node.id), &node.children, 0));
            continue;
        }

        for record in &children.records {
            if !record_ids.insert(&record.id) {
                return Err(Error::duplicate(ItemKind::Record, &record.id));
            }
            records.push(Record {
                parent_id: parent.cloned(),
                ..record.clone()
            });
        }
        stack.pop();
    }
    Ok((folders, records))
}
