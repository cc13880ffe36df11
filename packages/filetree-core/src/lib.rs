#![forbid(unsafe_code)]
//! Core state engine for a folder/record workspace.
//! Folders and records live in flat collections linked by `parent_id`; the nested tree used
//! for rendering is always derived from them. The engine is a pure transition function and
//! stays free of I/O so it can be embedded natively or behind the WASM bridge.

pub mod action;
pub mod cascade;
pub mod error;
pub mod ids;
pub mod item;
pub mod materialization;
pub mod parent_index;
pub mod tree;
pub mod workspace;

pub use action::Action;
pub use cascade::collect_descendant_folders;
pub use error::{Error, Result};
pub use ids::{FolderId, ItemKind, RecordId};
pub use item::{ChildRef, ChildrenView, Folder, Item, Metadata, Record};
pub use materialization::{destructure, structure};
pub use parent_index::ParentIndex;
pub use tree::{FolderNode, RootTree, TreeChildren};
pub use workspace::{apply, Workspace};
