use filetree_core::{Action, Error, Folder, Workspace};
use filetree_test_support::{
    apply_all, assert_consistent, fid, folder, folder_ids, record, record_ids, rid,
    sample_workspace,
};

#[test]
fn deleting_the_top_folder_empties_the_workspace() {
    let ws = apply_all(
        &Workspace::new(),
        [
            Action::CreateFolder(folder("A", None)),
            Action::CreateFolder(folder("B", Some("A"))),
            Action::CreateRecord(record("r1", Some("B"))),
            Action::delete_folder("A"),
        ],
    );
    assert!(ws.folders().is_empty());
    assert!(ws.records().is_empty());
    assert!(ws.root_tree().children.is_empty());
}

#[test]
fn cascade_removes_exactly_the_subtree() {
    let ws = sample_workspace();
    let next = ws.apply(Action::delete_folder("work")).unwrap();
    assert_consistent(&next, false);

    assert_eq!(folder_ids(&next), vec!["docs", "media"]);
    assert_eq!(record_ids(&next), vec!["r-docs", "r-media", "r-root"]);
    let docs = next.folder(&fid("docs")).unwrap();
    assert!(docs.children.folders.is_empty());
    assert_eq!(docs.children.records.len(), 1);

    // untouched items are value-equal to before
    assert_eq!(next.folder(&fid("media")), ws.folder(&fid("media")));
    assert_eq!(next.records().len() + 1, ws.records().len());
}

#[test]
fn deleting_a_leaf_folder_keeps_siblings() {
    let ws = apply_all(
        &sample_workspace(),
        [
            Action::CreateFolder(folder("q2", Some("work"))),
            Action::delete_folder("q1"),
        ],
    );
    assert_consistent(&ws, false);
    assert_eq!(ws.folder(&fid("work")).unwrap().children.folders, vec![fid("q2")]);
    assert!(ws.record(&rid("r-q1")).is_none());
}

#[test]
fn cycle_in_loaded_data_aborts_the_delete() {
    // Only a loader bypassing the reducer can produce this shape.
    let ws = Workspace::from_collections(
        vec![
            Folder::new("p", "P", Some(fid("q"))),
            Folder::new("q", "Q", Some(fid("p"))),
            Folder::new("ok", "OK", None),
        ],
        vec![record("inside", Some("p"))],
    );
    assert!(matches!(ws.validate_invariants(), Err(Error::IntegrityCycle { .. })));

    let err = ws.apply(Action::delete_folder("p")).unwrap_err();
    assert_eq!(err, Error::IntegrityCycle { folder: "p".into() });
    assert_eq!(ws.folders().len(), 3);
    assert_eq!(ws.records().len(), 1);
}
