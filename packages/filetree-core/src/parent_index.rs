use std::collections::HashMap;

use crate::ids::FolderId;
use crate::item::{ChildRef, ChildrenView, Folder, Record};

#[derive(Default)]
struct Slots {
    folders: Vec<usize>,
    records: Vec<usize>,
}

/// Positions of the direct children of every parent (the root sentinel included), built in
/// one pass over the flat collections. Child order follows collection order.
pub struct ParentIndex<'a> {
    folders: &'a [Folder],
    records: &'a [Record],
    root: Slots,
    by_parent: HashMap<&'a FolderId, Slots>,
}

impl<'a> ParentIndex<'a> {
    pub fn build(folders: &'a [Folder], records: &'a [Record]) -> Self {
        let mut root = Slots::default();
        let mut by_parent: HashMap<&'a FolderId, Slots> = HashMap::new();
        for (pos, folder) in folders.iter().enumerate() {
            match &folder.parent_id {
                None => root.folders.push(pos),
                Some(parent) => by_parent.entry(parent).or_default().folders.push(pos),
            }
        }
        for (pos, record) in records.iter().enumerate() {
            match &record.parent_id {
                None => root.records.push(pos),
                Some(parent) => by_parent.entry(parent).or_default().records.push(pos),
            }
        }
        Self {
            folders,
            records,
            root,
            by_parent,
        }
    }

    fn slots(&self, parent: Option<&FolderId>) -> Option<&Slots> {
        match parent {
            None => Some(&self.root),
            Some(id) => self.by_parent.get(id),
        }
    }

    pub fn child_folders(&self, parent: Option<&FolderId>) -> impl Iterator<Item = &'a Folder> + '_ {
        let folders = self.folders;
        self.slots(parent)
            .into_iter()
            .flat_map(|slots| slots.folders.iter())
            .map(move |&pos| &folders[pos])
    }

    pub fn child_records(&self, parent: Option<&FolderId>) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.records;
        self.slots(parent)
            .into_iter()
            .flat_map(|slots| slots.records.iter())
            .map(move |&pos| &records[pos])
    }

    /// Children view derived from `parent_id` links alone.
    pub fn children_view(&self, parent: Option<&FolderId>) -> ChildrenView {
        ChildrenView {
            folders: self.child_folders(parent).map(|f| f.id.clone()).collect(),
            records: self.child_records(parent).map(|r| r.id.clone()).collect(),
        }
    }
}

/// Append `child` to the children view of `parent`. Returns `false` when there is no such
/// folder (root sentinel or orphan reference); nothing is touched in that case.
pub(crate) fn attach(folders: &mut [Folder], parent: Option<&FolderId>, child: ChildRef<'_>) -> bool {
    match parent.and_then(|id| folders.iter_mut().find(|f| &f.id == id)) {
        Some(folder) => {
            folder.children.push(child);
            true
        }
        None => false,
    }
}

/// Remove `child` from the children view of `parent`.
pub(crate) fn detach(folders: &mut [Folder], parent: Option<&FolderId>, child: ChildRef<'_>) -> bool {
    match parent.and_then(|id| folders.iter_mut().find(|f| &f.id == id)) {
        Some(folder) => {
            folder.children.remove(child);
            true
        }
        None => false,
    }
}
