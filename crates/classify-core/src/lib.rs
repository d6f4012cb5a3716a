//! ClassifyIt Core
//!
//! Headless state for the classification dialog and the tag editor.
//! Layered like this:
//! - model / classification: plain records and the result map
//! - classifier: the canonical item store every view projects from
//! - dialog: open/close lifecycle around a classifier
//! - groups / templates / composite: bulk reassignment features
//! - api / notify / tags / form: collaborators and the tag catalog

mod error;
mod model;
mod classification;
mod options;
mod text;
mod classifier;
mod dialog;
mod groups;
mod templates;
mod composite;
mod notify;
mod api;
mod tags;
mod form;

#[cfg(test)]
mod testing;

pub use error::{ClassifyError, ClassifyResult};
pub use model::{Category, CategoryId, Group, GroupId, Item, ItemId, TagId, Template, TemplateId};
pub use classification::ClassificationResult;
pub use options::{ClassifyOptions, Depth, DialogOptions};
pub use text::{natural_cmp, normalize_text};
pub use classifier::{Checkpoint, Classifier, Counters, ItemRecord, ToolbarButton};
pub use dialog::{ClassifyDialog, DialogButton, DialogFrame, DialogOutcome, DialogSurface, LaneBinding};
pub use groups::{apply_group, apply_resolved, CompositeLookup, GroupLookup, GroupSelection, StaticGroups};
pub use templates::{TemplateBook, TemplateChoice};
pub use composite::{GroupPicker, AVAILABLE_GROUPS, SELECTED_GROUPS};
pub use notify::{report, report_error, NoticeKind, Notifier};
pub use api::{Action, ApiClient, ApiEnvelope, ApiError, RawReply, Success, TagRecord, Transport};
pub use tags::{TagCatalog, TagChange, TagEditor, TagEditorOptions, TagError, TagOption};
pub use form::{submit, FormData, FormDialog, FormResult, FormValidator, RequiredFields};
