//! Classification errors
//!
//! Configuration errors, user cancellation and stale-reference failures
//! share one enum so callers can match on the outcome of any operation.

use thiserror::Error;

use crate::api::ApiError;
use crate::model::{CategoryId, ItemId};

pub type ClassifyResult<T> = Result<T, ClassifyError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("categories array is required and cannot be empty")]
    NoCategories,

    #[error("unknown category '{0}'")]
    UnknownCategory(CategoryId),

    #[error("unknown item '{0}'")]
    UnknownItem(ItemId),

    #[error("classification is read only")]
    ReadOnly,

    #[error("dialog is already open")]
    AlreadyOpen,

    #[error("User cancelled")]
    Cancelled,

    #[error("No items in selected group")]
    EmptyGroup,

    #[error("No items were found to update")]
    NothingToUpdate,

    #[error("Please enter a name for the classification")]
    MissingTemplateName,

    #[error("Name is required")]
    MissingGroupName,

    #[error("No base groups were selected for the composite group. Nothing saved.")]
    NoBaseGroups,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ClassifyError {
    /// True for the user dismissing a dialog, which callers usually swallow
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClassifyError::Cancelled)
    }
}
