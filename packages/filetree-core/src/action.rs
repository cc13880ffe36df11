use serde::{Deserialize, Serialize};

use crate::ids::{FolderId, RecordId};
use crate::item::{Folder, Record};
use crate::tree::RootTree;

/// The workspace mutations, tagged the way the web client dispatches them:
/// `{"type": "CREATE_FOLDER", "payload": {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Drop everything; used on logout and session reset.
    #[serde(alias = "RESET_STORES")]
    Reset,
    /// Bulk load from a nested tree. Replaces the current state, never merges.
    ReadFiles(RootTree),
    CreateFolder(Folder),
    /// Replace the folder with the same id; a changed `parent_id` moves it.
    UpdateFolder(Folder),
    /// Remove the folder, its descendant folders, and every record inside them.
    DeleteFolder {
        #[serde(alias = "_id")]
        id: FolderId,
    },
    CreateRecord(Record),
    UpdateRecord(Record),
    DeleteRecord {
        #[serde(alias = "_id")]
        id: RecordId,
    },
}

impl Action {
    pub fn delete_folder(id: impl Into<FolderId>) -> Self {
        Action::DeleteFolder { id: id.into() }
    }

    pub fn delete_record(id: impl Into<RecordId>) -> Self {
        Action::DeleteRecord { id: id.into() }
    }

    /// Wire tag of the action, for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Reset => "RESET",
            Action::ReadFiles(_) => "READ_FILES",
            Action::CreateFolder(_) => "CREATE_FOLDER",
            Action::UpdateFolder(_) => "UPDATE_FOLDER",
            Action::DeleteFolder { .. } => "DELETE_FOLDER",
            Action::CreateRecord(_) => "CREATE_RECORD",
            Action::UpdateRecord(_) => "UPDATE_RECORD",
            Action::DeleteRecord { .. } => "DELETE_RECORD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_client_action_objects() {
        let action: Action = serde_json::from_value(json!({
            "type": "CREATE_FOLDER",
            "payload": { "_id": "f1", "name": "Docs", "parentId": null }
        }))
        .unwrap();
        assert_eq!(action, Action::CreateFolder(Folder::new("f1", "Docs", None)));

        let delete: Action = serde_json::from_value(json!({
            "type": "DELETE_RECORD",
            "payload": { "_id": "r1", "name": "ignored.txt", "parentId": "f1" }
        }))
        .unwrap();
        assert_eq!(delete, Action::delete_record("r1"));
    }

    #[test]
    fn reset_accepts_the_legacy_tag_without_payload() {
        let action: Action = serde_json::from_value(json!({ "type": "RESET_STORES" })).unwrap();
        assert_eq!(action, Action::Reset);
        assert_eq!(action.kind(), "RESET");
    }
}
