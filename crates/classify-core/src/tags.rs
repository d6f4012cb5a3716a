//! Tag Catalog
//!
//! Options of one tag catalog plus the dialog that edits them: search,
//! add, inline rename, delete, copy to clipboard. Mutations go through the
//! backend first and only touch the catalog when it accepts them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{ApiClient, ApiError, Transport};
use crate::model::TagId;
use crate::notify::{NoticeKind, Notifier};
use crate::text::{natural_cmp, normalize_text};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("Required")]
    Required,

    #[error("Value \"{0}\" already exists")]
    DuplicateValue(TagId),

    #[error("Already exists \"{new}\" as: \"{existing}\"")]
    DuplicateText { new: String, existing: String },

    #[error("tag editor is read only")]
    ReadOnly,

    #[error("unknown tag '{0}'")]
    UnknownTag(TagId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOption {
    pub value: TagId,
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

impl TagOption {
    pub fn new(value: impl Into<TagId>, text: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            selected,
        }
    }
}

/// A catalog mutation confirmed by the backend
#[derive(Debug, Clone, PartialEq)]
pub enum TagChange {
    Added(TagOption),
    Renamed { value: TagId, text: String },
    Removed(TagId),
    /// Options fetched for the current item, merged into the catalog
    Loaded(Vec<TagOption>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagCatalog {
    options: IndexMap<TagId, TagOption>,
    editing: Option<TagId>,
}

impl TagCatalog {
    pub fn new(options: Vec<TagOption>) -> Self {
        let mut catalog = Self::default();
        catalog.merge(options);
        catalog
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, value: &TagId) -> Option<&TagOption> {
        self.options.get(value)
    }

    /// Why `text` (with optional `value`) cannot be added or used as a rename.
    /// `exclude` skips the option being renamed.
    pub fn validate(&self, value: Option<&TagId>, text: &str, exclude: Option<&TagId>) -> Result<(), TagError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TagError::Required);
        }
        let normalized = normalize_text(text);
        for (existing_value, option) in &self.options {
            if exclude == Some(existing_value) {
                continue;
            }
            if value == Some(existing_value) {
                return Err(TagError::DuplicateValue(existing_value.clone()));
            }
            if normalize_text(&option.text) == normalized {
                return Err(TagError::DuplicateText {
                    new: text.to_string(),
                    existing: option.text.clone(),
                });
            }
        }
        Ok(())
    }

    /// Options in natural text order
    pub fn sorted(&self) -> Vec<&TagOption> {
        let mut options: Vec<&TagOption> = self.options.values().collect();
        options.sort_by(|a, b| natural_cmp(&a.text, &b.text));
        options
    }

    /// Sorted options whose text contains `term`, ignoring case and accents
    pub fn filter(&self, term: &str) -> Vec<&TagOption> {
        let needle = normalize_text(term);
        self.sorted()
            .into_iter()
            .filter(|o| needle.is_empty() || normalize_text(&o.text).contains(&needle))
            .collect()
    }

    pub fn selected_texts(&self) -> Vec<&str> {
        self.options
            .values()
            .filter(|o| o.selected)
            .map(|o| o.text.as_str())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Selected texts, one per line; `None` when nothing is selected
    pub fn clipboard_payload(&self) -> Option<String> {
        let texts = self.selected_texts();
        (!texts.is_empty()).then(|| texts.join("\n"))
    }

    /// Every listed text, one per line, for the dialog header copy button
    pub fn listing_payload(&self, term: &str) -> Option<String> {
        let texts: Vec<&str> = self.filter(term).into_iter().map(|o| o.text.trim()).filter(|t| !t.is_empty()).collect();
        (!texts.is_empty()).then(|| texts.join("\n"))
    }

    pub fn toggle(&mut self, value: &TagId) {
        if let Some(option) = self.options.get_mut(value) {
            option.selected = !option.selected;
        }
    }

    // ========================
    // Inline editing
    // ========================

    pub fn editing(&self) -> Option<&TagId> {
        self.editing.as_ref()
    }

    /// Start editing one option, cancelling any other edit in progress
    pub fn start_edit(&mut self, value: &TagId) {
        if self.options.contains_key(value) {
            self.editing = Some(value.clone());
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // ========================
    // Changes
    // ========================

    fn merge(&mut self, options: Vec<TagOption>) {
        for option in options {
            match self.options.get_mut(&option.value) {
                Some(existing) => {
                    existing.text = option.text;
                    existing.selected |= option.selected;
                }
                None => {
                    self.options.insert(option.value.clone(), option);
                }
            }
        }
    }

    pub fn apply(&mut self, change: TagChange) {
        match change {
            TagChange::Added(option) => {
                self.options.insert(option.value.clone(), option);
            }
            TagChange::Renamed { value, text } => {
                if let Some(option) = self.options.get_mut(&value) {
                    option.text = text;
                }
                if self.editing.as_ref() == Some(&value) {
                    self.editing = None;
                }
            }
            TagChange::Removed(value) => {
                self.options.shift_remove(&value);
                if self.editing.as_ref() == Some(&value) {
                    self.editing = None;
                }
            }
            TagChange::Loaded(options) => self.merge(options),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagEditorOptions {
    pub api_url: String,
    pub dialog_title: String,
    pub confirm_delete: bool,
    pub read_only: bool,
    pub catalog_id: String,
    pub item_id: Option<String>,
    pub item_table: Option<String>,
    /// Show a classify button per option
    pub classifier: bool,
}

impl Default for TagEditorOptions {
    fn default() -> Self {
        Self {
            api_url: "./api/mock".to_string(),
            dialog_title: "Edit Categories".to_string(),
            confirm_delete: true,
            read_only: false,
            catalog_id: String::new(),
            item_id: None,
            item_table: None,
            classifier: false,
        }
    }
}

/// Backend-backed editing of a [`TagCatalog`]. Each call returns the change
/// to apply, or `None` after telling the user what went wrong.
pub struct TagEditor<T> {
    client: ApiClient<T>,
    options: TagEditorOptions,
}

impl<T: Transport> TagEditor<T> {
    pub fn new(client: ApiClient<T>, options: TagEditorOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &TagEditorOptions {
        &self.options
    }

    async fn refuse<N: Notifier + ?Sized>(&self, notifier: &N, error: TagError) -> Option<TagChange> {
        notifier.alert(&error.to_string(), "Notice", NoticeKind::Info).await;
        None
    }

    async fn failed<N: Notifier + ?Sized>(&self, notifier: &N, error: ApiError, fallback: &str) -> Option<TagChange> {
        let message = match &error {
            ApiError::Transport(_) | ApiError::Http { .. } => "Could not reach the server".to_string(),
            ApiError::Rejected(reason) => format!("Error: {}", reason),
            ApiError::Decode(_) => format!("Error: {}", fallback),
        };
        log::warn!("tag catalog {}: {}", self.options.catalog_id, error);
        notifier.alert(&message, "Notice", NoticeKind::Info).await;
        None
    }

    pub async fn add<N: Notifier + ?Sized>(&self, catalog: &TagCatalog, text: &str, notifier: &N) -> Option<TagChange> {
        if self.options.read_only {
            return self.refuse(notifier, TagError::ReadOnly).await;
        }
        let text = text.trim();
        if let Err(e) = catalog.validate(None, text, None) {
            return self.refuse(notifier, e).await;
        }
        match self.client.add_tag(&self.options.catalog_id, text).await {
            Ok(value) => Some(TagChange::Added(TagOption::new(value, text, true))),
            Err(e) => self.failed(notifier, e, "Could not add the tag").await,
        }
    }

    pub async fn rename<N: Notifier + ?Sized>(
        &self,
        catalog: &TagCatalog,
        value: &TagId,
        text: &str,
        notifier: &N,
    ) -> Option<TagChange> {
        if self.options.read_only {
            return self.refuse(notifier, TagError::ReadOnly).await;
        }
        let text = text.trim();
        if let Err(e) = catalog.validate(None, text, Some(value)) {
            return self.refuse(notifier, e).await;
        }
        catalog.get(value)?;
        match self.client.update_tag(&self.options.catalog_id, value, text).await {
            Ok(()) => Some(TagChange::Renamed {
                value: value.clone(),
                text: text.to_string(),
            }),
            Err(e) => self.failed(notifier, e, "Could not rename the tag").await,
        }
    }

    pub async fn delete<N: Notifier + ?Sized>(&self, catalog: &TagCatalog, value: &TagId, notifier: &N) -> Option<TagChange> {
        if self.options.read_only {
            return self.refuse(notifier, TagError::ReadOnly).await;
        }
        let option = catalog.get(value)?;
        if self.options.confirm_delete {
            let question = format!("Confirm delete: \"{}\"?", option.text);
            if !notifier.confirm(&question, "Confirm", NoticeKind::Warning).await {
                return None;
            }
        }
        match self.client.delete_tag(&self.options.catalog_id, value).await {
            Ok(()) => Some(TagChange::Removed(value.clone())),
            Err(e) => self.failed(notifier, e, "Could not delete the tag").await,
        }
    }

    /// Whole catalog as the backend lists it, nothing selected
    pub async fn fetch_catalog(&self) -> Result<TagChange, ApiError> {
        let records = self.client.list_tags(&self.options.catalog_id).await?;
        Ok(TagChange::Loaded(
            records.into_iter().map(|r| TagOption::new(r.id, r.text, false)).collect(),
        ))
    }

    /// Tags of the configured item. Failures are only logged.
    pub async fn fetch_item_tags(&self) -> Option<TagChange> {
        let item_id = self.options.item_id.as_deref()?;
        let table = self.options.item_table.as_deref().unwrap_or("");
        match self.client.item_tags(&self.options.catalog_id, item_id, table).await {
            Ok(tags) => Some(TagChange::Loaded(tags)),
            Err(e) => {
                log::error!("fetching tags of item {} failed: {}", item_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTransport, RecordingNotifier};
    use pretty_assertions::assert_eq;

    fn catalog() -> TagCatalog {
        TagCatalog::new(vec![
            TagOption::new("10", "Hardware", true),
            TagOption::new("11", "Office", false),
            TagOption::new("12", "Periférico 10", true),
            TagOption::new("13", "periférico 2", false),
        ])
    }

    fn editor(transport: &FakeTransport, options: TagEditorOptions) -> TagEditor<FakeTransport> {
        TagEditor::new(ApiClient::new(transport.clone(), "./api/mock"), options)
    }

    #[test]
    fn test_validate_messages() {
        let c = catalog();
        assert_eq!(c.validate(None, "  ", None), Err(TagError::Required));
        assert_eq!(
            c.validate(None, " OFFICE ", None).unwrap_err().to_string(),
            "Already exists \"OFFICE\" as: \"Office\""
        );
        assert_eq!(
            c.validate(Some(&"11".into()), "Anything", None),
            Err(TagError::DuplicateValue("11".into()))
        );
        // Renaming an option to its own text is fine
        assert_eq!(c.validate(None, "office", Some(&"11".into())), Ok(()));
        // Accents do not make a different tag
        assert!(c.validate(None, "periferico 2", None).is_err());
    }

    #[test]
    fn test_sorted_and_filtered() {
        let c = catalog();
        let texts: Vec<&str> = c.sorted().iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["Hardware", "Office", "periférico 2", "Periférico 10"]);

        let texts: Vec<&str> = c.filter("PERIFE").iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["periférico 2", "Periférico 10"]);
    }

    #[test]
    fn test_clipboard_payload() {
        let c = catalog();
        assert_eq!(c.clipboard_payload().unwrap(), "Hardware\nPeriférico 10");
        assert_eq!(TagCatalog::default().clipboard_payload(), None);
        assert_eq!(c.listing_payload("").unwrap(), "Hardware\nOffice\nperiférico 2\nPeriférico 10");
    }

    #[test]
    fn test_single_inline_edit() {
        let mut c = catalog();
        c.start_edit(&"10".into());
        c.start_edit(&"11".into());
        assert_eq!(c.editing(), Some(&TagId::from("11")));
        c.start_edit(&"nope".into());
        assert_eq!(c.editing(), Some(&TagId::from("11")));
        c.apply(TagChange::Removed("11".into()));
        assert_eq!(c.editing(), None);
        assert_eq!(c.len(), 3);
    }

    #[tokio::test]
    async fn test_add_applies_backend_id() {
        let transport = FakeTransport::default();
        transport.reply(200, r#"{"success": true, "data": {"id": 99}}"#);
        let notifier = RecordingNotifier::default();
        let mut c = catalog();

        let change = editor(&transport, TagEditorOptions::default())
            .add(&c, " Cables ", &notifier)
            .await
            .unwrap();
        c.apply(change);
        assert_eq!(c.get(&"99".into()), Some(&TagOption::new("99", "Cables", true)));
        assert!(notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_add_duplicate_never_reaches_backend() {
        let transport = FakeTransport::default();
        let notifier = RecordingNotifier::default();
        let change = editor(&transport, TagEditorOptions::default())
            .add(&catalog(), "hardware", &notifier)
            .await;
        assert!(change.is_none());
        assert!(transport.requests().is_empty());
        assert_eq!(notifier.alert_messages(), vec!["Already exists \"hardware\" as: \"Hardware\""]);
    }

    #[tokio::test]
    async fn test_rename_rejected_leaves_catalog() {
        let transport = FakeTransport::default();
        transport.reply(200, r#"{"success": false, "error": "Tag not found"}"#);
        let notifier = RecordingNotifier::default();
        let c = catalog();
        let change = editor(&transport, TagEditorOptions::default())
            .rename(&c, &"11".into(), "Desk", &notifier)
            .await;
        assert!(change.is_none());
        assert_eq!(c.get(&"11".into()).unwrap().text, "Office");
        assert_eq!(notifier.alert_messages(), vec!["Error: Tag not found"]);
    }

    #[tokio::test]
    async fn test_delete_asks_first() {
        let transport = FakeTransport::default();
        transport.reply(200, r#"{"success": true}"#);
        let c = catalog();
        let editor = editor(&transport, TagEditorOptions::default());

        let declined = RecordingNotifier::answering(&[false]);
        assert!(editor.delete(&c, &"11".into(), &declined).await.is_none());
        assert_eq!(declined.asked(), vec!["Confirm delete: \"Office\"?"]);
        assert!(transport.requests().is_empty());

        let accepted = RecordingNotifier::answering(&[true]);
        let change = editor.delete(&c, &"11".into(), &accepted).await;
        assert_eq!(change, Some(TagChange::Removed("11".into())));
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let transport = FakeTransport::default();
        transport.fail("offline");
        let notifier = RecordingNotifier::default();
        let options = TagEditorOptions {
            confirm_delete: false,
            ..TagEditorOptions::default()
        };
        let change = editor(&transport, options).delete(&catalog(), &"10".into(), &notifier).await;
        assert!(change.is_none());
        assert_eq!(notifier.alert_messages(), vec!["Could not reach the server"]);
    }

    #[tokio::test]
    async fn test_read_only_refuses() {
        let transport = FakeTransport::default();
        let notifier = RecordingNotifier::default();
        let options = TagEditorOptions {
            read_only: true,
            ..TagEditorOptions::default()
        };
        assert!(editor(&transport, options).add(&catalog(), "New", &notifier).await.is_none());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_item_tags_merges() {
        let transport = FakeTransport::default();
        transport.reply(
            200,
            r#"{"success": true, "data": {"tags": [{"value": "11", "text": "Office", "selected": true}, {"value": "20", "text": "Cables"}]}}"#,
        );
        let options = TagEditorOptions {
            item_id: Some("p1".into()),
            ..TagEditorOptions::default()
        };
        let mut c = catalog();
        let change = editor(&transport, options).fetch_item_tags().await.unwrap();
        c.apply(change);
        assert!(c.get(&"11".into()).unwrap().selected);
        assert!(!c.get(&"20".into()).unwrap().selected);
        assert_eq!(c.len(), 5);
        assert_eq!(transport.requests()[0][2], ("item_id".to_string(), "p1".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_item_tags_needs_item() {
        let transport = FakeTransport::default();
        assert!(editor(&transport, TagEditorOptions::default()).fetch_item_tags().await.is_none());
        assert!(transport.requests().is_empty());
    }
}
