//! Widget Configuration
//!
//! Options a host page passes when constructing the widget or opening its dialog.

use serde::{Deserialize, Serialize};

use crate::model::{CategoryId, Group, Template};

/// Nesting level of a widget instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    #[default]
    Root,
    /// Opened from another widget; may never spawn a further level
    Nested,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifyOptions {
    pub title: String,
    pub item_name_plural: String,
    pub editable: bool,
    pub show_item_buttons: bool,
    /// Category for items whose own category is missing or undeclared.
    /// `None` means the first declared category.
    pub fallback_category: Option<CategoryId>,

    pub templates_enabled: bool,
    pub can_save_templates: bool,
    /// Also store saved templates through the backend
    pub persist_templates: bool,
    pub templates: Vec<Template>,

    pub groups_enabled: bool,
    pub groups_editable: bool,
    pub groups: Vec<Group>,

    pub api_url: String,
    pub depth: Depth,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            title: "Classification".to_string(),
            item_name_plural: "Items".to_string(),
            editable: true,
            show_item_buttons: true,
            fallback_category: None,
            templates_enabled: true,
            can_save_templates: false,
            persist_templates: false,
            templates: Vec::new(),
            groups_enabled: false,
            groups_editable: false,
            groups: Vec::new(),
            api_url: "./api/mock".to_string(),
            depth: Depth::Root,
        }
    }
}

impl ClassifyOptions {
    /// Configuration of the composite-group picker opened from "Manage Groups"
    pub fn nested_picker(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            item_name_plural: "Groups".to_string(),
            editable: true,
            show_item_buttons: true,
            templates_enabled: false,
            can_save_templates: false,
            groups_enabled: false,
            groups_editable: false,
            depth: Depth::Nested,
            ..Self::default()
        }
    }

    /// "Manage Groups" is only offered by an editable root instance
    pub fn manage_groups_enabled(&self) -> bool {
        self.editable && self.groups_enabled && self.groups_editable && self.depth == Depth::Root
    }

    pub fn template_manager_enabled(&self) -> bool {
        self.editable && self.templates_enabled && (self.can_save_templates || !self.templates.is_empty())
    }
}

/// Per-open overrides for the dialog frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogOptions {
    pub title: Option<String>,
    pub width: String,
    pub height: String,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            title: None,
            width: "95vw".to_string(),
            height: "85vh".to_string(),
        }
    }
}

impl DialogOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}
