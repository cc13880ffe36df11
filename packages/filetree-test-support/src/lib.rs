//! Shared fixtures and an independent consistency oracle for workspace test suites.
//!
//! The oracle deliberately avoids the engine's own index and materializer: it recomputes
//! every derived view with plain linear scans so a bug in the fast path cannot hide itself.

use std::collections::HashSet;

use filetree_core::{
    Action, ChildrenView, Folder, FolderId, FolderNode, Record, RecordId, RootTree, TreeChildren,
    Workspace,
};

pub fn fid(id: &str) -> FolderId {
    FolderId::new(id)
}

pub fn rid(id: &str) -> RecordId {
    RecordId::new(id)
}

pub fn folder(id: &str, parent: Option<&str>) -> Folder {
    Folder::new(id, format!("folder {id}"), parent.map(fid))
}

pub fn record(id: &str, parent: Option<&str>) -> Record {
    Record::new(id, format!("{id}.bin"), parent.map(fid)).with_metadata("size", id.len() as u64)
}

/// Nested folder node for bulk-load payloads. `parent_id` is left empty on purpose: the
/// loader must derive it from position.
pub fn node(id: &str, folders: Vec<FolderNode>, records: Vec<Record>) -> FolderNode {
    FolderNode {
        id: fid(id),
        name: format!("folder {id}"),
        parent_id: None,
        children: TreeChildren { folders, records },
        metadata: Default::default(),
    }
}

pub fn tree(folders: Vec<FolderNode>, records: Vec<Record>) -> RootTree {
    RootTree {
        children: TreeChildren { folders, records },
        ..RootTree::default()
    }
}

/// Apply every action in order, panicking on the first rejection.
pub fn apply_all(start: &Workspace, actions: impl IntoIterator<Item = Action>) -> Workspace {
    actions.into_iter().fold(start.clone(), |ws, action| {
        let kind = action.kind();
        ws.apply(action)
            .unwrap_or_else(|err| panic!("{kind} rejected: {err}"))
    })
}

/// Two top-level folders, a nested branch, and records at every level:
///
/// ```text
/// docs/            r-root
///   docs/work/     r-docs
///     docs/work/q1/  r-q1
/// media/           r-media
/// ```
pub fn sample_workspace() -> Workspace {
    apply_all(
        &Workspace::new(),
        [
            Action::CreateFolder(folder("docs", None)),
            Action::CreateFolder(folder("work", Some("docs"))),
            Action::CreateFolder(folder("q1", Some("work"))),
            Action::CreateFolder(folder("media", None)),
            Action::CreateRecord(record("r-root", None)),
            Action::CreateRecord(record("r-docs", Some("docs"))),
            Action::CreateRecord(record("r-q1", Some("q1"))),
            Action::CreateRecord(record("r-media", Some("media"))),
        ],
    )
}

pub fn folder_ids(ws: &Workspace) -> Vec<String> {
    let mut ids: Vec<String> = ws.folders().iter().map(|f| f.id.to_string()).collect();
    ids.sort();
    ids
}

pub fn record_ids(ws: &Workspace) -> Vec<String> {
    let mut ids: Vec<String> = ws.records().iter().map(|r| r.id.to_string()).collect();
    ids.sort();
    ids
}

/// Assert every standing invariant with naive recomputation. Orphans are allowed only when
/// `allow_orphans` is set; they must then be absent from the tree.
pub fn assert_consistent(ws: &Workspace, allow_orphans: bool) {
    let folders = ws.folders();
    let records = ws.records();

    let unique_folders: HashSet<_> = folders.iter().map(|f| &f.id).collect();
    assert_eq!(unique_folders.len(), folders.len(), "duplicate folder ids");
    let unique_records: HashSet<_> = records.iter().map(|r| &r.id).collect();
    assert_eq!(unique_records.len(), records.len(), "duplicate record ids");

    let parents = folders
        .iter()
        .map(|f| &f.parent_id)
        .chain(records.iter().map(|r| &r.parent_id));
    for parent in parents.flatten() {
        if !allow_orphans {
            assert!(unique_folders.contains(parent), "dangling parent {parent}");
        }
    }

    for f in folders {
        let mut seen = HashSet::new();
        let mut current = Some(&f.id);
        while let Some(id) = current {
            assert!(seen.insert(id.clone()), "cycle through {}", f.id);
            current = folders
                .iter()
                .find(|g| &g.id == id)
                .and_then(|g| g.parent_id.as_ref());
        }
    }

    for f in folders {
        let expected = ChildrenView {
            folders: folders
                .iter()
                .filter(|c| c.parent_id.as_ref() == Some(&f.id))
                .map(|c| c.id.clone())
                .collect(),
            records: records
                .iter()
                .filter(|c| c.parent_id.as_ref() == Some(&f.id))
                .map(|c| c.id.clone())
                .collect(),
        };
        assert_eq!(f.children, expected, "stale children view on {}", f.id);
    }

    assert_eq!(
        ws.root_tree().children,
        naive_children(None, folders, records),
        "tree diverged from flat collections"
    );
}

fn naive_children(parent: Option<&FolderId>, folders: &[Folder], records: &[Record]) -> TreeChildren {
    TreeChildren {
        folders: folders
            .iter()
            .filter(|f| f.parent_id.as_ref() == parent)
            .map(|f| FolderNode {
                id: f.id.clone(),
                name: f.name.clone(),
                parent_id: f.parent_id.clone(),
                children: naive_children(Some(&f.id), folders, records),
                metadata: f.metadata.clone(),
            })
            .collect(),
        records: records
            .iter()
            .filter(|r| r.parent_id.as_ref() == parent)
            .cloned()
            .collect(),
    }
}
