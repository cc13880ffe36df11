use std::io;
use std::sync::{Arc, Mutex};

use filetree_core::{Action, Error, ItemKind, Workspace};
use filetree_test_support::{apply_all, assert_consistent, fid, folder, record, rid};

#[test]
fn moving_under_a_missing_parent_hides_the_folder_from_the_tree() {
    let ws = apply_all(
        &Workspace::new(),
        [
            Action::CreateFolder(folder("A", None)),
            Action::UpdateFolder(folder("A", Some("Z"))),
        ],
    );
    assert!(ws.root_tree().children.folders.is_empty());
    assert_eq!(ws.folders().len(), 1);
    assert_eq!(ws.folders()[0].parent_id, Some(fid("Z")));
    assert_consistent(&ws, true);

    assert_eq!(ws.orphaned_folders().len(), 1);
    assert_eq!(
        ws.validate_invariants().unwrap_err(),
        Error::OrphanReference {
            kind: ItemKind::Folder,
            id: "A".into(),
            parent: "Z".into()
        }
    );
}

#[test]
fn orphaned_records_are_reported_but_not_rendered() {
    let ws = Workspace::new()
        .apply(Action::CreateRecord(record("lost", Some("nowhere"))))
        .unwrap();
    assert!(ws.root_tree().is_empty());
    assert_eq!(ws.orphaned_records()[0].id, rid("lost"));
    assert!(matches!(
        ws.validate_invariants(),
        Err(Error::OrphanReference { kind: ItemKind::Record, .. })
    ));
}

#[test]
fn creating_the_missing_parent_adopts_its_orphans() {
    let ws = apply_all(
        &Workspace::new(),
        [
            Action::CreateFolder(folder("child", Some("late"))),
            Action::CreateRecord(record("file", Some("late"))),
            Action::CreateFolder(folder("late", None)),
        ],
    );
    ws.validate_invariants().unwrap();
    assert_consistent(&ws, false);

    let late = ws.folder(&fid("late")).unwrap();
    assert_eq!(late.children.folders, vec![fid("child")]);
    assert_eq!(late.children.records, vec![rid("file")]);
    assert_eq!(ws.root_tree().count(), (2, 1));
}

#[test]
fn adopting_an_orphan_cannot_close_a_loop() {
    let ws = Workspace::new()
        .apply(Action::CreateFolder(folder("x", Some("n"))))
        .unwrap();
    let err = ws
        .apply(Action::CreateFolder(folder("n", Some("x"))))
        .unwrap_err();
    assert!(matches!(err, Error::IntegrityCycle { .. }));
}

#[test]
fn breadcrumbs_stop_at_a_missing_parent() {
    let ws = apply_all(
        &Workspace::new(),
        [
            Action::CreateFolder(folder("a", Some("gone"))),
            Action::CreateFolder(folder("b", Some("a"))),
        ],
    );
    assert!(matches!(
        ws.ancestors(&fid("b")),
        Err(Error::OrphanReference { .. })
    ));
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn missing_parent_is_warned_once_not_on_every_action() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let ws = apply_all(
            &Workspace::new(),
            [
                Action::CreateRecord(record("lost", Some("nowhere"))),
                Action::CreateFolder(folder("a", None)),
                Action::CreateRecord(record("r", Some("a"))),
                Action::DeleteRecord { id: rid("r") },
            ],
        );
        assert!(ws.validate_invariants().is_err());
    });

    let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    assert_eq!(text.matches("references a missing parent").count(), 1, "{text}");
    assert!(text.contains("lost"));
    assert!(!text.contains("unreachable"));
}
