use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::action::Action;
use crate::cascade::{ancestor_chain, collect_descendant_folders, introduces_cycle};
use crate::error::{Error, Result};
use crate::ids::{FolderId, ItemKind, RecordId};
use crate::item::{ChildRef, ChildrenView, Folder, Item, Record};
use crate::materialization::{destructure, structure};
use crate::parent_index::{attach, detach, ParentIndex};
use crate::tree::RootTree;

/// Immutable snapshot of a user's folders and records.
///
/// The flat collections are authoritative; `root_tree` is always `structure(folders,
/// records)`. Each part sits behind an `Arc`, so a transition only allocates the parts it
/// changes and earlier snapshots stay valid for anyone still holding them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    root_tree: Arc<RootTree>,
    folders: Arc<Vec<Folder>>,
    records: Arc<Vec<Record>>,
}

/// Pure transition: `(state, action) -> state'`. On error `state` is the snapshot to keep.
pub fn apply(state: &Workspace, action: Action) -> Result<Workspace> {
    state.apply(action)
}

fn position<T: Item>(items: &[T], id: &T::Id) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk load from a nested tree, as `READ_FILES` does.
    pub fn from_tree(tree: &RootTree) -> Result<Self> {
        let (folders, records) = destructure(tree)?;
        let root_tree = structure(&folders, &records).relabel(tree);
        Ok(Self {
            root_tree: Arc::new(root_tree),
            folders: Arc::new(folders),
            records: Arc::new(records),
        })
    }

    /// Hydrate from flat collections supplied by a loader. Children views and the tree are
    /// recomputed; parent links are taken as given, so callers that cannot trust their
    /// source should follow up with [`Workspace::validate_invariants`].
    pub fn from_collections(mut folders: Vec<Folder>, records: Vec<Record>) -> Self {
        let views: Vec<ChildrenView> = {
            let index = ParentIndex::build(&folders, &records);
            folders.iter().map(|f| index.children_view(Some(&f.id))).collect()
        };
        for (folder, view) in folders.iter_mut().zip(views) {
            folder.children = view;
        }
        let root_tree = structure(&folders, &records);
        Self {
            root_tree: Arc::new(root_tree),
            folders: Arc::new(folders),
            records: Arc::new(records),
        }
    }

    pub fn apply(&self, action: Action) -> Result<Workspace> {
        let kind = action.kind();
        let result = match action {
            Action::Reset => Ok(Workspace::default()),
            Action::ReadFiles(tree) => Self::from_tree(&tree),
            Action::CreateFolder(folder) => self.create_folder(folder),
            Action::UpdateFolder(folder) => self.update_folder(folder),
            Action::DeleteFolder { id } => self.delete_folder(&id),
            Action::CreateRecord(record) => self.create_record(record),
            Action::UpdateRecord(record) => self.update_record(record),
            Action::DeleteRecord { id } => self.delete_record(&id),
        };
        match &result {
            Ok(next) => tracing::debug!(
                action = kind,
                folders = next.folders.len(),
                records = next.records.len(),
                "applied workspace action"
            ),
            Err(err) => tracing::warn!(action = kind, error = %err, "rejected workspace action"),
        }
        result
    }

    pub fn root_tree(&self) -> &RootTree {
        &self.root_tree
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.records.is_empty()
    }

    pub fn folder(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| &f.id == id)
    }

    pub fn record(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Direct children of a folder, or of the root sentinel for `None`.
    pub fn children_of(&self, parent: Option<&FolderId>) -> Result<ChildrenView> {
        match parent {
            None => Ok(ParentIndex::build(&self.folders, &self.records).children_view(None)),
            Some(id) => self
                .folder(id)
                .map(|f| f.children.clone())
                .ok_or_else(|| Error::not_found(ItemKind::Folder, id)),
        }
    }

    /// Breadcrumb path: the top-level folder first, `id` last.
    pub fn ancestors(&self, id: &FolderId) -> Result<Vec<&Folder>> {
        ancestor_chain(&self.folders, id)
    }

    /// Folders whose `parent_id` names a folder that does not exist.
    pub fn orphaned_folders(&self) -> Vec<&Folder> {
        let ids = self.folder_ids();
        self.folders
            .iter()
            .filter(|f| f.parent_id.as_ref().is_some_and(|p| !ids.contains(p)))
            .collect()
    }

    /// Records whose `parent_id` names a folder that does not exist.
    pub fn orphaned_records(&self) -> Vec<&Record> {
        let ids = self.folder_ids();
        self.records
            .iter()
            .filter(|r| r.parent_id.as_ref().is_some_and(|p| !ids.contains(p)))
            .collect()
    }

    /// True when every part is the same allocation as in `other`, i.e. nothing was rebuilt.
    pub fn shares_storage_with(&self, other: &Workspace) -> bool {
        Arc::ptr_eq(&self.root_tree, &other.root_tree)
            && Arc::ptr_eq(&self.folders, &other.folders)
            && Arc::ptr_eq(&self.records, &other.records)
    }

    /// Validate id uniqueness, referential integrity, acyclicity, children views, and that
    /// the tree matches the flat collections. Intended for tests and diagnostics.
    pub fn validate_invariants(&self) -> Result<()> {
        let mut folder_ids = HashSet::new();
        for folder in self.folders.iter() {
            if !folder_ids.insert(&folder.id) {
                return Err(Error::duplicate(ItemKind::Folder, &folder.id));
            }
        }
        let mut record_ids = HashSet::new();
        for record in self.records.iter() {
            if !record_ids.insert(&record.id) {
                return Err(Error::duplicate(ItemKind::Record, &record.id));
            }
        }

        if let Some(folder) = self.orphaned_folders().first() {
            return Err(orphan(*folder));
        }
        if let Some(record) = self.orphaned_records().first() {
            return Err(orphan(*record));
        }

        for folder in self.folders.iter() {
            ancestor_chain(&self.folders, &folder.id)?;
        }

        let index = ParentIndex::build(&self.folders, &self.records);
        for folder in self.folders.iter() {
            if index.children_view(Some(&folder.id)) != folder.children {
                return Err(Error::InconsistentState(format!(
                    "children view of folder {} does not match parent links",
                    folder.id
                )));
            }
        }

        if structure(&self.folders, &self.records).children != self.root_tree.children {
            return Err(Error::InconsistentState(
                "root tree diverged from flat collections".into(),
            ));
        }
        Ok(())
    }

    fn folder_ids(&self) -> HashSet<&FolderId> {
        self.folders.iter().map(|f| &f.id).collect()
    }

    /// Next snapshot from new collections; the tree is rebuilt, the root label kept.
    fn rebuilt(&self, folders: Arc<Vec<Folder>>, records: Arc<Vec<Record>>) -> Workspace {
        let root_tree = structure(&folders, &records).relabel(&self.root_tree);
        Workspace {
            root_tree: Arc::new(root_tree),
            folders,
            records,
        }
    }

    /// Copy the folder collection and patch children views, unless none of the `parents`
    /// exists in it; then the current allocation is shared.
    fn relinked(
        &self,
        parents: &[Option<&FolderId>],
        patch: impl FnOnce(&mut Vec<Folder>),
    ) -> Arc<Vec<Folder>> {
        let touches = parents
            .iter()
            .flatten()
            .any(|id| self.folders.iter().any(|f| &f.id == *id));
        if !touches {
            return Arc::clone(&self.folders);
        }
        let mut folders = (*self.folders).clone();
        patch(&mut folders);
        Arc::new(folders)
    }

    fn warn_if_orphaned<T: Item>(&self, item: &T) {
        if let Some(parent) = item.parent_id() {
            if position(self.folders.as_slice(), parent).is_none() {
                tracing::warn!(
                    kind = %T::KIND,
                    id = %item.id(),
                    parent = %parent,
                    "item references a missing parent"
                );
            }
        }
    }

    fn create_folder(&self, mut folder: Folder) -> Result<Workspace> {
        if position(self.folders.as_slice(), &folder.id).is_some() {
            return Err(Error::duplicate(ItemKind::Folder, &folder.id));
        }
        if let Some(parent) = &folder.parent_id {
            if introduces_cycle(&self.folders, &folder.id, parent) {
                return Err(Error::cycle(&folder.id));
            }
        }
        self.warn_if_orphaned(&folder);
        // Orphans that already name this id as their parent are adopted.
        folder.children =
            ParentIndex::build(&self.folders, &self.records).children_view(Some(&folder.id));

        let id = folder.id.clone();
        let parent = folder.parent_id.clone();
        let mut folders = (*self.folders).clone();
        folders.push(folder);
        attach(&mut folders, parent.as_ref(), ChildRef::Folder(&id));
        Ok(self.rebuilt(Arc::new(folders), Arc::clone(&self.records)))
    }

    fn update_folder(&self, mut folder: Folder) -> Result<Workspace> {
        let Some(pos) = position(self.folders.as_slice(), &folder.id) else {
            return Err(Error::not_found(ItemKind::Folder, &folder.id));
        };
        let previous = &self.folders[pos];
        let moved = previous.parent_id != folder.parent_id;
        if moved {
            if let Some(parent) = &folder.parent_id {
                if introduces_cycle(&self.folders, &folder.id, parent) {
                    return Err(Error::cycle(&folder.id));
                }
            }
            self.warn_if_orphaned(&folder);
        }
        // Its own children are untouched by the update, so the cached view carries over.
        folder.children = previous.children.clone();

        let mut folders = (*self.folders).clone();
        if moved {
            let id = folder.id.clone();
            let old_parent = previous.parent_id.clone();
            let new_parent = folder.parent_id.clone();
            folders.remove(pos);
            detach(&mut folders, old_parent.as_ref(), ChildRef::Folder(&id));
            folders.push(folder);
            attach(&mut folders, new_parent.as_ref(), ChildRef::Folder(&id));
        } else {
            folders[pos] = folder;
        }
        Ok(self.rebuilt(Arc::new(folders), Arc::clone(&self.records)))
    }

    fn delete_folder(&self, id: &FolderId) -> Result<Workspace> {
        let Some(pos) = position(self.folders.as_slice(), id) else {
            tracing::debug!(folder = %id, "delete of unknown folder ignored");
            return Ok(self.clone());
        };
        let removed: HashSet<FolderId> = collect_descendant_folders(&self.folders, id)?
            .into_iter()
            .collect();
        let former_parent = self.folders[pos].parent_id.clone();

        let mut folders: Vec<Folder> = self
            .folders
            .iter()
            .filter(|f| !removed.contains(&f.id))
            .cloned()
            .collect();
        detach(&mut folders, former_parent.as_ref(), ChildRef::Folder(id));

        let contained = |r: &Record| r.parent_id.as_ref().is_some_and(|p| removed.contains(p));
        let records = if self.records.iter().any(contained) {
            Arc::new(self.records.iter().filter(|&r| !contained(r)).cloned().collect())
        } else {
            Arc::clone(&self.records)
        };
        tracing::debug!(
            folder = %id,
            folders_removed = removed.len(),
            records_removed = self.records.len() - records.len(),
            "cascaded folder delete"
        );
        Ok(self.rebuilt(Arc::new(folders), records))
    }

    fn create_record(&self, record: Record) -> Result<Workspace> {
        if position(self.records.as_slice(), &record.id).is_some() {
            return Err(Error::duplicate(ItemKind::Record, &record.id));
        }
        self.warn_if_orphaned(&record);
        let id = record.id.clone();
        let parent = record.parent_id.clone();
        let folders = self.relinked(&[parent.as_ref()], |folders| {
            attach(folders, parent.as_ref(), ChildRef::Record(&id));
        });
        let mut records = (*self.records).clone();
        records.push(record);
        Ok(self.rebuilt(folders, Arc::new(records)))
    }

    fn update_record(&self, record: Record) -> Result<Workspace> {
        let Some(pos) = position(self.records.as_slice(), &record.id) else {
            return Err(Error::not_found(ItemKind::Record, &record.id));
        };
        let old_parent = self.records[pos].parent_id.clone();
        let mut records = (*self.records).clone();
        if old_parent == record.parent_id {
            records[pos] = record;
            return Ok(self.rebuilt(Arc::clone(&self.folders), Arc::new(records)));
        }

        self.warn_if_orphaned(&record);
        let id = record.id.clone();
        let new_parent = record.parent_id.clone();
        let folders = self.relinked(&[old_parent.as_ref(), new_parent.as_ref()], |folders| {
            detach(folders, old_parent.as_ref(), ChildRef::Record(&id));
            attach(folders, new_parent.as_ref(), ChildRef::Record(&id));
        });
        records.remove(pos);
        records.push(record);
        Ok(self.rebuilt(folders, Arc::new(records)))
    }

    fn delete_record(&self, id: &RecordId) -> Result<Workspace> {
        let Some(pos) = position(self.records.as_slice(), id) else {
            tracing::debug!(record = %id, "delete of unknown record ignored");
            return Ok(self.clone());
        };
        let parent = self.records[pos].parent_id.clone();
        let folders = self.relinked(&[parent.as_ref()], |folders| {
            detach(folders, parent.as_ref(), ChildRef::Record(id));
        });
        let mut records = (*self.records).clone();
        records.remove(pos);
        Ok(self.rebuilt(folders, Arc::new(records)))
    }
}

fn orphan<T: Item>(item: &T) -> Error {
    Error::OrphanReference {
        kind: T::KIND,
        id: item.id().to_string(),
        parent: item.parent_id().map(ToString::to_string).unwrap_or_default(),
    }
}
