//! Ancestry reasoning over the folder forest: cascade expansion for deletes, cycle checks
//! for moves, and breadcrumb chains.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::ids::{FolderId, ItemKind};
use crate::item::Folder;
use crate::parent_index::ParentIndex;

/// The folder `id` followed by all of its descendant folders, in breadth-first order.
///
/// Expansion runs at most `folders.len()` rounds. Meeting the starting folder again means
/// the parent links contain a loop; that is reported as `IntegrityCycle` instead of
/// returning an unbounded set.
pub fn collect_descendant_folders(folders: &[Folder], id: &FolderId) -> Result<Vec<FolderId>> {
    if !folders.iter().any(|f| &f.id == id) {
        return Err(Error::not_found(ItemKind::Folder, id));
    }

    let index = ParentIndex::build(folders, &[]);
    let mut collected = vec![id.clone()];
    let mut seen: HashSet<&FolderId> = HashSet::from([id]);
    let mut frontier: Vec<&FolderId> = vec![id];

    for depth in 0..folders.len() {
        if frontier.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for parent in frontier {
            for child in index.child_folders(Some(parent)) {
                if &child.id == id {
                    return Err(Error::cycle(id));
                }
                if seen.insert(&child.id) {
                    collected.push(child.id.clone());
                    next.push(&child.id);
                }
            }
        }
        tracing::trace!(folder = %id, depth, added = next.len(), "expanded cascade frontier");
        frontier = next;
    }

    if !frontier.is_empty() {
        return Err(Error::cycle(id));
    }
    Ok(collected)
}

/// Whether re-parenting `node` under `new_parent` would make `node` its own ancestor.
///
/// A parent chain that loops without passing through `node` also counts: the move would
/// attach `node` to a region that already violates acyclicity.
pub fn introduces_cycle(folders: &[Folder], node: &FolderId, new_parent: &FolderId) -> bool {
    let parents: HashMap<&FolderId, Option<&FolderId>> = folders
        .iter()
        .map(|f| (&f.id, f.parent_id.as_ref()))
        .collect();

    let mut current = Some(new_parent);
    let mut steps = 0;
    while let Some(id) = current {
        if id == node || steps > folders.len() {
            return true;
        }
        steps += 1;
        current = parents.get(id).copied().flatten();
    }
    false
}

/// Folders from the top level down to `id` (inclusive).
pub fn ancestor_chain<'a>(folders: &'a [Folder], id: &FolderId) -> Result<Vec<&'a Folder>> {
    let by_id: HashMap<&FolderId, &Folder> = folders.iter().map(|f| (&f.id, f)).collect();
    let mut chain = Vec::new();
    let mut current = match by_id.get(id) {
        Some(folder) => *folder,
        None => return Err(Error::not_found(ItemKind::Folder, id)),
    };
    loop {
        if chain.len() >= folders.len() {
            return Err(Error::cycle(id));
        }
        chain.push(current);
        match &current.parent_id {
            None => break,
            Some(parent) => match by_id.get(parent) {
                Some(folder) => current = *folder,
                None => {
                    return Err(Error::OrphanReference {
                        kind: ItemKind::Folder,
                        id: current.id.to_string(),
                        parent: parent.to_string(),
                    })
                }
            },
        }
    }
    chain.reverse();
    Ok(chain)
}
