use thiserror::Error;

use crate::ids::ItemKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ItemKind, id: String },
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: ItemKind, id: String },
    #[error("{kind} {id} references missing parent folder {parent}")]
    OrphanReference {
        kind: ItemKind,
        id: String,
        parent: String,
    },
    #[error("folder hierarchy cycle through {folder}")]
    IntegrityCycle { folder: String },
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}

impl Error {
    pub(crate) fn not_found(kind: ItemKind, id: impl ToString) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: ItemKind, id: impl ToString) -> Self {
        Error::DuplicateId {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn cycle(folder: impl ToString) -> Self {
        Error::IntegrityCycle {
            folder: folder.to_string(),
        }
    }
}
