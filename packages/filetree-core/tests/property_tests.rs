use std::collections::HashSet;

use filetree_core::{destructure, structure, Action, Error, Folder, FolderId, Record, Workspace};
use filetree_test_support::{assert_consistent, folder_ids, record_ids};
use proptest::prelude::*;

/// Interpret raw numbers as an action whose parent is drawn from the folders that exist
/// right now, so every generated parent link is valid.
fn interpret(ws: &Workspace, (kind, item, parent): (u8, usize, usize)) -> Action {
    let existing: Vec<FolderId> = ws.folders().iter().map(|f| f.id.clone()).collect();
    let parent = match parent % (existing.len() + 1) {
        0 => None,
        n => Some(existing[n - 1].clone()),
    };
    let folder_id = format!("f{item}");
    let record_id = format!("r{item}");
    match kind % 6 {
        0 => Action::CreateFolder(Folder::new(folder_id, "new", parent)),
        1 => Action::UpdateFolder(Folder::new(folder_id, "moved", parent)),
        2 => Action::delete_folder(folder_id),
        3 => Action::CreateRecord(Record::new(record_id, "new", parent)),
        4 => Action::UpdateRecord(Record::new(record_id, "moved", parent)),
        _ => Action::delete_record(record_id),
    }
}

fn steps() -> impl Strategy<Value = Vec<(u8, usize, usize)>> {
    prop::collection::vec((0u8..6, 0usize..6, 0usize..8), 1..40)
}

fn build(raw: Vec<(u8, usize, usize)>) -> Workspace {
    raw.into_iter().fold(Workspace::new(), |ws, step| {
        let action = interpret(&ws, step);
        ws.apply(action).unwrap_or(ws)
    })
}

proptest! {
    #[test]
    fn invariants_hold_after_every_step(raw in steps()) {
        let mut ws = Workspace::new();
        for step in raw {
            let action = interpret(&ws, step);
            match ws.apply(action) {
                Ok(next) => ws = next,
                Err(err) => {
                    prop_assert!(matches!(
                        err,
                        Error::DuplicateId { .. } | Error::NotFound { .. } | Error::IntegrityCycle { .. }
                    ), "unexpected error: {:?}", err);
                }
            }
            assert_consistent(&ws, false);
            prop_assert!(ws.validate_invariants().is_ok());
        }
    }

    #[test]
    fn flat_to_tree_round_trip(raw in steps()) {
        let ws = build(raw);
        let (mut folders, mut records) = destructure(ws.root_tree()).unwrap();
        prop_assert_eq!(structure(&folders, &records).children, ws.root_tree().children.clone());

        let mut expected_folders = ws.folders().to_vec();
        let mut expected_records = ws.records().to_vec();
        folders.sort_by(|a, b| a.id.cmp(&b.id));
        records.sort_by(|a, b| a.id.cmp(&b.id));
        expected_folders.sort_by(|a, b| a.id.cmp(&b.id));
        expected_records.sort_by(|a, b| a.id.cmp(&b.id));
        prop_assert_eq!(folders, expected_folders);
        prop_assert_eq!(records, expected_records);
    }

    #[test]
    fn cascade_delete_removes_exactly_the_subtree(raw in steps(), pick in 0usize..6) {
        let ws = build(raw);
        prop_assume!(!ws.folders().is_empty());
        let target = ws.folders()[pick % ws.folders().len()].id.clone();

        // naive descendant closure
        let mut doomed: HashSet<FolderId> = HashSet::from([target.clone()]);
        loop {
            let before = doomed.len();
            for f in ws.folders() {
                if f.parent_id.as_ref().is_some_and(|p| doomed.contains(p)) {
                    doomed.insert(f.id.clone());
                }
            }
            if doomed.len() == before {
                break;
            }
        }

        let next = ws.apply(Action::DeleteFolder { id: target }).unwrap();
        assert_consistent(&next, false);

        let expected_folders: Vec<String> = folder_ids(&ws)
            .into_iter()
            .filter(|id| !doomed.contains(&FolderId::new(id.as_str())))
            .collect();
        let expected_records: Vec<String> = ws
            .records()
            .iter()
            .filter(|r| !r.parent_id.as_ref().is_some_and(|p| doomed.contains(p)))
            .map(|r| r.id.to_string())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert_eq!(folder_ids(&next), expected_folders);
        prop_assert_eq!(record_ids(&next), expected_records);
        for r in next.records() {
            prop_assert_eq!(Some(r), ws.record(&r.id));
        }
    }
}
