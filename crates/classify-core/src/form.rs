//! Form dialog
//!
//! State behind a generic "fill in fields, then save" modal: dirty
//! tracking, discard confirmation and an async validator whose message is
//! shown inline instead of closing.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::notify::{NoticeKind, Notifier};

pub type FormData = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct FormResult {
    pub saved: bool,
    pub data: FormData,
}

#[async_trait(?Send)]
pub trait FormValidator {
    /// Error message to show, or `None` when the data may be saved
    async fn validate(&self, data: &FormData) -> Option<String>;
}

/// Rejects the form while any listed field is blank
#[derive(Debug, Clone, Default)]
pub struct RequiredFields {
    fields: Vec<(String, String)>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.fields.push((name.into(), label.into()));
        self
    }
}

#[async_trait(?Send)]
impl FormValidator for RequiredFields {
    async fn validate(&self, data: &FormData) -> Option<String> {
        self.fields
            .iter()
            .find(|(name, _)| data.get(name).map_or(true, |v| v.trim().is_empty()))
            .map(|(_, label)| format!("{} is required", label))
    }
}

/// Run the validator and produce the saved result, or the inline error
pub async fn submit<V: FormValidator + ?Sized>(data: FormData, validator: Option<&V>) -> Result<FormResult, String> {
    if let Some(validator) = validator {
        if let Some(error) = validator.validate(&data).await {
            return Err(error);
        }
    }
    Ok(FormResult { saved: true, data })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormDialog {
    pub title: String,
    pub save_label: String,
    pub cancel_label: String,
    pub fields: FormData,
    pub warn_if_dirty: bool,
    pub dirty: bool,
    pub error: Option<String>,
    /// True while the validator runs; the save button shows "Checking..."
    pub checking: bool,
}

impl FormDialog {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            save_label: "OK".to_string(),
            cancel_label: "Cancel".to_string(),
            fields: FormData::new(),
            warn_if_dirty: false,
            dirty: false,
            error: None,
            checking: false,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn warn_if_dirty(mut self, warn: bool) -> Self {
        self.warn_if_dirty = warn;
        self
    }

    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// User input into a field
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
        if self.warn_if_dirty {
            self.dirty = true;
        }
    }

    /// Cancel/close request. Returns true when the dialog may close.
    pub async fn attempt_close<N: Notifier + ?Sized>(&self, notifier: &N) -> bool {
        if self.warn_if_dirty && self.dirty {
            return notifier.confirm("Discard changes?", "Unsaved Data", NoticeKind::Question).await;
        }
        true
    }

    /// Save request. `Some` closes the dialog with the result; `None` keeps
    /// it open with [`FormDialog::error`] set.
    pub async fn save<V: FormValidator + ?Sized>(&mut self, validator: Option<&V>) -> Option<FormResult> {
        self.error = None;
        self.checking = true;
        let outcome = submit(self.fields.clone(), validator).await;
        self.checking = false;
        match outcome {
            Ok(result) => Some(result),
            Err(error) => {
                self.error = Some(error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;
    use pretty_assertions::assert_eq;

    fn group_form() -> FormDialog {
        FormDialog::new("New composite group")
            .with_field("name", "")
            .with_field("description", "")
            .warn_if_dirty(true)
    }

    #[tokio::test]
    async fn test_clean_form_closes_without_asking() {
        let notifier = RecordingNotifier::default();
        assert!(group_form().attempt_close(&notifier).await);
        assert!(notifier.asked().is_empty());
    }

    #[tokio::test]
    async fn test_dirty_form_asks_before_discarding() {
        let mut form = group_form();
        form.set_field("name", "Desk");
        assert!(form.dirty);

        let keep = RecordingNotifier::answering(&[false]);
        assert!(!form.attempt_close(&keep).await);
        assert_eq!(keep.asked(), vec!["Discard changes?"]);

        let discard = RecordingNotifier::answering(&[true]);
        assert!(form.attempt_close(&discard).await);
    }

    #[tokio::test]
    async fn test_validator_error_stays_inline() {
        let validator = RequiredFields::new().field("name", "Name");
        let mut form = group_form();
        assert_eq!(form.save(Some(&validator)).await, None);
        assert_eq!(form.error.as_deref(), Some("Name is required"));

        form.set_field("name", "Desk");
        let result = form.save(Some(&validator)).await.unwrap();
        assert!(result.saved);
        assert_eq!(result.data.get("name").map(String::as_str), Some("Desk"));
        assert_eq!(form.error, None);
    }

    #[tokio::test]
    async fn test_submit_without_validator() {
        let data: FormData = [("a".to_string(), "1".to_string())].into_iter().collect();
        let result = submit::<RequiredFields>(data.clone(), None).await.unwrap();
        assert_eq!(result, FormResult { saved: true, data });
    }
}
