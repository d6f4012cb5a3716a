//! Composite group picker
//!
//! A second classification dialog over the existing groups instead of
//! items, with two fixed columns. Its configuration is always
//! [`Depth::Nested`], so it cannot offer group management itself.

use crate::classification::ClassificationResult;
use crate::dialog::ClassifyDialog;
use crate::error::{ClassifyError, ClassifyResult};
use crate::model::{Category, CategoryId, Group, GroupId, Item, ItemId};
use crate::options::ClassifyOptions;

pub const AVAILABLE_GROUPS: &str = "available_groups";
pub const SELECTED_GROUPS: &str = "selected_groups";

pub struct GroupPicker {
    dialog: ClassifyDialog,
}

impl GroupPicker {
    pub fn new(groups: &[Group]) -> ClassifyResult<Self> {
        let categories = vec![
            Category::new(AVAILABLE_GROUPS, "Disponible"),
            Category::new(SELECTED_GROUPS, "En Grupo"),
        ];
        let items = groups
            .iter()
            .map(|g| Item::new(ItemId::new(g.id.as_str()), format!("{} ({})", g.name, g.item_count), Some(AVAILABLE_GROUPS)))
            .collect();
        let options = ClassifyOptions::nested_picker("Select base groups");
        Ok(Self {
            dialog: ClassifyDialog::new(categories, items, options)?,
        })
    }

    pub fn dialog(&mut self) -> &mut ClassifyDialog {
        &mut self.dialog
    }

    pub fn into_dialog(self) -> ClassifyDialog {
        self.dialog
    }

    /// Build the composite group record from the picker's saved result
    pub fn compose(name: &str, description: &str, result: &ClassificationResult) -> ClassifyResult<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClassifyError::MissingGroupName);
        }
        let selected: Vec<GroupId> = result
            .bucket(&CategoryId::from(SELECTED_GROUPS))
            .iter()
            .map(|id| GroupId::new(id.as_str()))
            .collect();
        if selected.is_empty() {
            return Err(ClassifyError::NoBaseGroups);
        }
        let mut group = Group::new(
            format!("composite_{}", chrono::Utc::now().timestamp_millis()),
            name,
            selected.len(),
        );
        group.description = description.trim().to_string();
        group.composite_of = selected;
        Ok(group)
    }
}
