use filetree_core::{Action, Error, FolderId, RootTree, Workspace};

/// Holder of the current snapshot: the single writer that serializes actions coming from
/// the UI. Rejected actions leave the current snapshot in place.
#[derive(Clone, Debug, Default)]
pub struct Session {
    current: Workspace,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Workspace {
        &self.current
    }

    pub fn dispatch(&mut self, action: Action) -> Result<&Workspace, Error> {
        self.current = self.current.apply(action)?;
        Ok(&self.current)
    }

    /// Decode a client action object (`{"type": ..., "payload": ...}`) and apply it.
    pub fn dispatch_json(&mut self, action_json: &str) -> Result<&Workspace, String> {
        let action: Action = serde_json::from_str(action_json).map_err(|e| e.to_string())?;
        self.dispatch(action).map_err(|e| e.to_string())
    }

    /// Bulk load the tree returned by the files endpoint.
    pub fn load_tree_json(&mut self, tree_json: &str) -> Result<&Workspace, String> {
        let tree: RootTree = serde_json::from_str(tree_json).map_err(|e| e.to_string())?;
        let ws = self.dispatch(Action::ReadFiles(tree)).map_err(|e| e.to_string())?;
        tracing::info!(
            folders = ws.folders().len(),
            records = ws.records().len(),
            "workspace loaded"
        );
        Ok(ws)
    }

    pub fn reset(&mut self) -> Result<&Workspace, Error> {
        self.dispatch(Action::Reset)
    }

    /// Breadcrumb names from the top-level folder down to `folder_id`.
    pub fn breadcrumbs(&self, folder_id: &str) -> Result<Vec<String>, String> {
        self.current
            .ancestors(&FolderId::new(folder_id))
            .map(|chain| chain.into_iter().map(|f| f.name.clone()).collect())
            .map_err(|e| e.to_string())
    }

    pub fn snapshot_json(&self) -> Result<String, String> {
        serde_json::to_string(&self.current).map_err(|e| e.to_string())
    }
}
