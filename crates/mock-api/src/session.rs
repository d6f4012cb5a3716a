//! Per-visitor mock data, seeded on first contact.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use classify_core::{Group, GroupId, ItemId, TagId, TagRecord, Template};
use indexmap::IndexSet;
use serde::Serialize;

/// An object being classified
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemItem {
    pub id: ItemId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SessionData {
    pub system_items: Vec<SystemItem>,
    pub tags: Vec<TagRecord>,
    pub groups: Vec<Group>,
    pub group_items: HashMap<GroupId, Vec<ItemId>>,
    pub templates: Vec<Template>,
    /// Item id -> tags applied to it
    pub item_tags: HashMap<ItemId, Vec<TagId>>,
}

impl SessionData {
    pub fn seeded() -> Self {
        let item = |id: &str, name: &str| SystemItem {
            id: id.into(),
            name: name.to_string(),
        };
        let tag = |id: &str, text: &str| TagRecord {
            id: id.into(),
            text: text.to_string(),
        };
        let mut basic = Group::new("g1", "Basic Set", 0);
        basic.description = "Essential gear".to_string();

        Self {
            system_items: vec![
                item("p1", "Laptop Pro"),
                item("p2", "Mouse Wireless"),
                item("p3", "Keyboard Mechanical"),
                item("p4", "Monitor 4K"),
                item("p5", "USB-C Hub"),
            ],
            tags: vec![tag("10", "Hardware"), tag("11", "Office"), tag("12", "Peripheral")],
            groups: vec![basic],
            group_items: HashMap::from([(GroupId::from("g1"), vec![ItemId::from("p2"), ItemId::from("p3")])]),
            templates: Vec::new(),
            item_tags: HashMap::from([
                (ItemId::from("p1"), vec![TagId::from("10"), TagId::from("12")]),
                (ItemId::from("p2"), vec![TagId::from("12")]),
            ]),
        }
    }

    /// Members of a group; composite groups resolve to the union of their bases
    pub fn members(&self, group: &GroupId) -> Vec<ItemId> {
        let Some(found) = self.groups.iter().find(|g| &g.id == group) else {
            return Vec::new();
        };
        if !found.is_composite() {
            return self.group_items.get(group).cloned().unwrap_or_default();
        }
        let mut union = IndexSet::new();
        for base in &found.composite_of {
            union.extend(self.group_items.get(base).cloned().unwrap_or_default());
        }
        union.into_iter().collect()
    }

    /// How many items carry the tag
    pub fn tag_usage(&self, tag: &TagId) -> usize {
        self.item_tags.values().filter(|tags| tags.contains(tag)).count()
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionData>>>,
}

impl SessionStore {
    /// Run `f` on the session, creating a seeded one for unknown ids.
    /// Returns the id actually used and whether it is new.
    pub fn with_session<R>(&self, id: Option<&str>, f: impl FnOnce(&mut SessionData) -> R) -> (String, bool, R) {
        let mut sessions = match self.inner.lock() {
            Ok(guard) => guard,
            // A panicking handler leaves the data usable for a mock
            Err(poisoned) => poisoned.into_inner(),
        };
        let (id, fresh) = match id {
            Some(id) if sessions.contains_key(id) => (id.to_string(), false),
            _ => (uuid::Uuid::new_v4().to_string(), true),
        };
        let data = sessions.entry(id.clone()).or_insert_with(SessionData::seeded);
        let result = f(data);
        (id, fresh, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_group_members() {
        let data = SessionData::seeded();
        assert_eq!(data.members(&"g1".into()), vec![ItemId::from("p2"), ItemId::from("p3")]);
        assert!(data.members(&"nope".into()).is_empty());
    }

    #[test]
    fn tag_usage_counts_items() {
        let data = SessionData::seeded();
        assert_eq!(data.tag_usage(&"12".into()), 2);
        assert_eq!(data.tag_usage(&"11".into()), 0);
    }

    #[test]
    fn unknown_session_gets_fresh_seed() {
        let store = SessionStore::default();
        let (id, fresh, _) = store.with_session(Some("forged"), |data| data.tags.clear());
        assert!(fresh);
        assert_ne!(id, "forged");

        let (same, fresh, count) = store.with_session(Some(id.as_str()), |data| data.tags.len());
        assert_eq!(same, id);
        assert!(!fresh);
        assert_eq!(count, 0);
    }
}
