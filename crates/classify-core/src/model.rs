//! Classification Records
//!
//! Categories, items, groups and templates as host pages supply them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::classification::ClassificationResult;

/// Ids arrive as JSON strings or numbers; both end up as text
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
            RawId::Float(f) => f.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

string_id!(
    /// Category identifier
    CategoryId
);
string_id!(
    /// Item identifier (numeric ids are kept in their decimal form)
    ItemId
);
string_id!(GroupId);
string_id!(TemplateId);
string_id!(
    /// Tag value inside a tag catalog
    TagId
);

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

/// A named bucket items can be classified into. Declaration order drives
/// the left/right navigation between columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(id),
            label: label.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Column heading: the title when present, otherwise the label
    pub fn heading(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.label)
    }
}

/// An item to classify, as supplied by the host page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(default, alias = "category", alias = "classification")]
    pub category_id: Option<CategoryId>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, display_name: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            category_id: category.map(CategoryId::from),
        }
    }
}

/// A named, externally defined subset of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub item_count: usize,
    /// Base groups of a composite group; empty for plain groups
    #[serde(default, rename = "baseGroupIds", skip_serializing_if = "Vec::is_empty")]
    pub composite_of: Vec<GroupId>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_count: usize) -> Self {
        Self {
            id: GroupId::new(id),
            name: name.into(),
            description: String::new(),
            item_count,
            composite_of: Vec::new(),
        }
    }

    pub fn is_composite(&self) -> bool {
        !self.composite_of.is_empty()
    }
}

/// A saved snapshot of a full categorization ("plantilla")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub classification: ClassificationResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_accepts_numbers_and_strings() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"[101, "p2", 3.0]"#).unwrap();
        assert_eq!(ids, vec![ItemId::from("101"), ItemId::from("p2"), ItemId::from("3")]);
    }

    #[test]
    fn test_item_field_aliases() {
        let item: Item = serde_json::from_str(r#"{"id": 7, "name": "Mouse", "category": "b"}"#).unwrap();
        assert_eq!(item.display_name, "Mouse");
        assert_eq!(item.category_id, Some(CategoryId::from("b")));

        let bare: Item = serde_json::from_str(r#"{"id": 8, "displayName": "Hub"}"#).unwrap();
        assert!(bare.category_id.is_none());
    }

    #[test]
    fn test_category_heading_prefers_title() {
        let plain = Category::new("yes", "Si");
        assert_eq!(plain.heading(), "Si");
        let titled = Category::new("yes", "Si").with_title("Approved");
        assert_eq!(titled.heading(), "Approved");
    }

    #[test]
    fn test_group_composite_wire_name() {
        let group: Group = serde_json::from_str(
            r#"{"id": "c1", "name": "Both", "itemCount": 2, "baseGroupIds": ["g1", "g2"]}"#,
        )
        .unwrap();
        assert!(group.is_composite());
        assert_eq!(group.composite_of.len(), 2);
    }
}
