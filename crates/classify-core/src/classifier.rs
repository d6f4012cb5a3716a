//! Classifier Store
//!
//! The single source of truth for which item sits in which category.
//! Views render lanes from here; every move (drag, button, bulk, template)
//! updates lane membership and the item's own category in the same call,
//! and the toolbar pressed-state is derived from that one record.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use crate::classification::ClassificationResult;
use crate::error::{ClassifyError, ClassifyResult};
use crate::model::{Category, CategoryId, Item, ItemId, Template};
use crate::options::ClassifyOptions;
use crate::text::{natural_cmp, normalize_text};

/// An item as tracked by the store
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub display_name: String,
    pub category_id: CategoryId,
    /// False while hidden by the search filter
    pub visible: bool,
}

/// One per-category button on an item's toolbar
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarButton {
    pub target: CategoryId,
    pub label: String,
    pub pressed: bool,
}

/// Visible counts per category plus the visible total
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counters {
    pub per_category: IndexMap<CategoryId, usize>,
    pub visible_total: usize,
}

impl Counters {
    pub fn count(&self, category: &CategoryId) -> usize {
        self.per_category.get(category).copied().unwrap_or(0)
    }
}

/// Saved lane layout, restored when a dialog is cancelled
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    lanes: IndexMap<CategoryId, Vec<ItemId>>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    categories: Vec<Category>,
    fallback: CategoryId,
    options: ClassifyOptions,
    lanes: IndexMap<CategoryId, Vec<ItemId>>,
    records: HashMap<ItemId, ItemRecord>,
    search: String,
    flashing: Option<ItemId>,
}

/// Resolve the fallback category: the configured override when it is declared,
/// otherwise the first category.
fn default_category_id(categories: &[Category], wanted: Option<&CategoryId>) -> CategoryId {
    let first = categories[0].id.clone();
    match wanted {
        None => first,
        Some(id) if categories.iter().any(|c| &c.id == id) => id.clone(),
        Some(id) => {
            log::warn!("fallback category '{}' is not declared, using '{}'", id, first);
            first
        }
    }
}

impl Classifier {
    pub fn new(categories: Vec<Category>, items: Vec<Item>, options: ClassifyOptions) -> ClassifyResult<Self> {
        if categories.is_empty() {
            return Err(ClassifyError::NoCategories);
        }

        let fallback = default_category_id(&categories, options.fallback_category.as_ref());
        let mut lanes: IndexMap<CategoryId, Vec<ItemId>> =
            categories.iter().map(|c| (c.id.clone(), Vec::new())).collect();
        let mut records = HashMap::with_capacity(items.len());

        for item in items {
            if records.contains_key(&item.id) {
                log::warn!("duplicate item id '{}' ignored", item.id);
                continue;
            }
            let category_id = match item.category_id {
                Some(id) if lanes.contains_key(&id) => id,
                other => {
                    log::warn!(
                        "item '{}' has invalid category {:?}, assigned to '{}'",
                        item.id,
                        other.as_ref().map(CategoryId::as_str),
                        fallback
                    );
                    fallback.clone()
                }
            };
            if let Some(lane) = lanes.get_mut(&category_id) {
                lane.push(item.id.clone());
            }
            records.insert(
                item.id.clone(),
                ItemRecord {
                    id: item.id,
                    display_name: item.display_name,
                    category_id,
                    visible: true,
                },
            );
        }

        Ok(Self {
            categories,
            fallback,
            options,
            lanes,
            records,
            search: String::new(),
            flashing: None,
        })
    }

    // ========================
    // Read access
    // ========================

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Left and right neighbours of a column, for the navigation footer
    pub fn neighbours(&self, id: &CategoryId) -> (Option<&Category>, Option<&Category>) {
        match self.categories.iter().position(|c| &c.id == id) {
            Some(i) => (
                i.checked_sub(1).and_then(|l| self.categories.get(l)),
                self.categories.get(i + 1),
            ),
            None => (None, None),
        }
    }

    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    pub fn fallback(&self) -> &CategoryId {
        &self.fallback
    }

    pub fn is_editable(&self) -> bool {
        self.options.editable
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.records.contains_key(id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&ItemRecord> {
        self.records.get(id)
    }

    /// Item ids of a category, in display order
    pub fn lane(&self, category: &CategoryId) -> &[ItemId] {
        self.lanes.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Records of a category, in display order
    pub fn lane_items(&self, category: &CategoryId) -> Vec<&ItemRecord> {
        self.lane(category).iter().filter_map(|id| self.records.get(id)).collect()
    }

    /// Per-category buttons for an item, pressed on its current category
    pub fn toolbar(&self, id: &ItemId) -> Vec<ToolbarButton> {
        let current = self.records.get(id).map(|r| &r.category_id);
        self.categories
            .iter()
            .map(|c| ToolbarButton {
                target: c.id.clone(),
                label: c.label.clone(),
                pressed: current == Some(&c.id),
            })
            .collect()
    }

    /// Current categorization, one bucket per declared category
    pub fn value(&self) -> ClassificationResult {
        let mut result = ClassificationResult::with_categories(self.lanes.keys());
        for (category, ids) in &self.lanes {
            for id in ids {
                result.push(category, id.clone());
            }
        }
        result
    }

    /// Items with their current category written back, in display order
    pub fn items(&self) -> Vec<Item> {
        self.lanes
            .values()
            .flatten()
            .filter_map(|id| self.records.get(id))
            .map(|r| Item {
                id: r.id.clone(),
                display_name: r.display_name.clone(),
                category_id: Some(r.category_id.clone()),
            })
            .collect()
    }

    pub fn counters(&self) -> Counters {
        let per_category: IndexMap<CategoryId, usize> = self
            .lanes
            .iter()
            .map(|(category, ids)| {
                let visible = ids
                    .iter()
                    .filter(|id| self.records.get(*id).is_some_and(|r| r.visible))
                    .count();
                (category.clone(), visible)
            })
            .collect();
        let visible_total = per_category.values().sum();
        Counters { per_category, visible_total }
    }

    // ========================
    // Search
    // ========================

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Hide items whose display name does not contain the term
    pub fn search(&mut self, term: &str) {
        let needle = normalize_text(term);
        for record in self.records.values_mut() {
            record.visible = needle.is_empty() || normalize_text(&record.display_name).contains(&needle);
        }
        self.search = term.to_string();
    }

    // ========================
    // Moves
    // ========================

    fn ensure_editable(&self) -> ClassifyResult<()> {
        if self.options.editable {
            Ok(())
        } else {
            Err(ClassifyError::ReadOnly)
        }
    }

    fn ensure_category(&self, id: &CategoryId) -> ClassifyResult<()> {
        if self.lanes.contains_key(id) {
            Ok(())
        } else {
            Err(ClassifyError::UnknownCategory(id.clone()))
        }
    }

    /// Take an item out of its lane and put it into `target` at `index`
    /// (end of lane when `None`), updating the record at the same time.
    fn relocate(&mut self, id: &ItemId, target: &CategoryId, index: Option<usize>) {
        let Some(record) = self.records.get_mut(id) else {
            return;
        };
        if let Some(lane) = self.lanes.get_mut(&record.category_id) {
            lane.retain(|other| other != id);
        }
        record.category_id = target.clone();
        if let Some(lane) = self.lanes.get_mut(target) {
            let at = index.unwrap_or(lane.len()).min(lane.len());
            lane.insert(at, id.clone());
        }
    }

    /// Button-click move. Returns false when the item already sits in `target`.
    pub fn move_item(&mut self, id: &ItemId, target: &CategoryId, feedback: bool) -> ClassifyResult<bool> {
        self.ensure_editable()?;
        self.ensure_category(target)?;
        let current = match self.records.get(id) {
            Some(record) => record.category_id.clone(),
            None => return Err(ClassifyError::UnknownItem(id.clone())),
        };
        if &current == target {
            return Ok(false);
        }
        self.relocate(id, target, None);
        if feedback {
            self.flashing = Some(id.clone());
        }
        Ok(true)
    }

    /// Drag completion: the item lands in `target` at `index`.
    /// Dropping inside the same lane reorders it.
    pub fn drop_item(&mut self, id: &ItemId, target: &CategoryId, index: Option<usize>) -> ClassifyResult<()> {
        self.ensure_editable()?;
        self.ensure_category(target)?;
        let Some(record) = self.records.get(id) else {
            return Err(ClassifyError::UnknownItem(id.clone()));
        };
        // An index taken before removal shifts by one when moving down the same lane
        let index = match index {
            Some(i) if &record.category_id == target => {
                let from = self.lane(target).iter().position(|other| other == id);
                match from {
                    Some(from) if from < i => Some(i - 1),
                    _ => Some(i),
                }
            }
            other => other,
        };
        self.relocate(id, target, index);
        log::debug!("dropped '{}' into '{}' at {:?}", id, target, index);
        Ok(())
    }

    /// Move every item of `from` that the search filter leaves visible
    pub fn move_visible(&mut self, from: &CategoryId, to: &CategoryId) -> ClassifyResult<usize> {
        self.ensure_editable()?;
        self.ensure_category(from)?;
        self.ensure_category(to)?;
        if from == to {
            return Ok(0);
        }
        let visible: Vec<ItemId> = self
            .lane(from)
            .iter()
            .filter(|id| self.records.get(*id).is_some_and(|r| r.visible))
            .cloned()
            .collect();
        for id in &visible {
            self.relocate(id, to, None);
        }
        Ok(visible.len())
    }

    /// Reorder a lane alphabetically A-Z (natural order)
    pub fn sort_category(&mut self, category: &CategoryId) -> ClassifyResult<()> {
        self.ensure_editable()?;
        self.ensure_category(category)?;
        let records = &self.records;
        if let Some(lane) = self.lanes.get_mut(category) {
            lane.sort_by(|a, b| {
                let left = records.get(a).map(|r| r.display_name.as_str()).unwrap_or("");
                let right = records.get(b).map(|r| r.display_name.as_str()).unwrap_or("");
                natural_cmp(left, right)
            });
        }
        Ok(())
    }

    /// Put the listed items into `target`, skipping ids not tracked here.
    /// Returns how many distinct listed items exist.
    pub fn apply_group_items(&mut self, ids: &[ItemId], target: &CategoryId) -> ClassifyResult<usize> {
        self.ensure_editable()?;
        self.ensure_category(target)?;
        let unique: IndexSet<&ItemId> = ids.iter().collect();
        let mut moved = 0;
        for id in unique {
            if !self.records.contains_key(id) {
                continue;
            }
            if self.records.get(id).is_some_and(|r| &r.category_id != target) {
                self.relocate(id, target, None);
            }
            moved += 1;
        }
        Ok(moved)
    }

    /// Re-apply a saved categorization. Stale item ids and categories that
    /// are no longer declared are skipped silently.
    pub fn apply_template(&mut self, template: &Template) -> ClassifyResult<usize> {
        self.ensure_editable()?;
        let mut applied = 0;
        for (category, ids) in template.classification.iter() {
            if !self.lanes.contains_key(category) {
                log::debug!("template '{}' names undeclared category '{}'", template.name, category);
                continue;
            }
            for id in ids {
                let Some(record) = self.records.get(id) else {
                    continue;
                };
                if &record.category_id != category {
                    self.relocate(id, category, None);
                }
                applied += 1;
            }
        }
        Ok(applied)
    }

    // ========================
    // Feedback and checkpoints
    // ========================

    pub fn is_flashing(&self, id: &ItemId) -> bool {
        self.flashing.as_ref() == Some(id)
    }

    pub fn clear_flash(&mut self) {
        self.flashing = None;
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint { lanes: self.lanes.clone() }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        for (category, ids) in &checkpoint.lanes {
            for id in ids {
                if let Some(record) = self.records.get_mut(id) {
                    record.category_id = category.clone();
                }
            }
        }
        self.lanes = checkpoint.lanes;
        self.flashing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ab() -> Vec<Category> {
        vec![Category::new("a", "A"), Category::new("b", "B")]
    }

    fn cat(id: &str) -> CategoryId {
        CategoryId::from(id)
    }

    fn id(id: &str) -> ItemId {
        ItemId::from(id)
    }

    fn sample() -> Classifier {
        let items = vec![
            Item::new(1, "Laptop Pro", Some("a")),
            Item::new(2, "Mouse Wireless", Some("a")),
            Item::new(3, "Keyboard", Some("b")),
            Item::new(4, "Monitor 4K", Some("a")),
            Item::new(5, "USB-C Hub", Some("b")),
        ];
        Classifier::new(ab(), items, ClassifyOptions::default()).unwrap()
    }

    /// Lane membership, record category and toolbar pressed-state agree
    fn assert_in_sync(c: &Classifier, item: &str, expected: &str) {
        let record = c.item(&id(item)).unwrap();
        assert_eq!(record.category_id, cat(expected));
        assert!(c.lane(&cat(expected)).contains(&id(item)));
        let pressed: Vec<_> = c.toolbar(&id(item)).into_iter().filter(|b| b.pressed).collect();
        assert_eq!(pressed.len(), 1);
        assert_eq!(pressed[0].target, cat(expected));
    }

    #[test]
    fn test_empty_categories_rejected() {
        let err = Classifier::new(vec![], vec![], ClassifyOptions::default()).unwrap_err();
        assert_eq!(err, ClassifyError::NoCategories);
    }

    #[test]
    fn test_invalid_category_falls_back_to_first() {
        let items = vec![Item::new(1, "One", Some("a")), Item::new(2, "Two", Some("x"))];
        let c = Classifier::new(ab(), items, ClassifyOptions::default()).unwrap();
        assert_eq!(c.item(&id("2")).unwrap().category_id, cat("a"));
        let expected: ClassificationResult = [("a", vec!["1", "2"]), ("b", vec![])].into_iter().collect();
        assert_eq!(c.value(), expected);
    }

    #[test]
    fn test_missing_category_uses_configured_fallback() {
        let options = ClassifyOptions {
            fallback_category: Some(cat("b")),
            ..ClassifyOptions::default()
        };
        let items = vec![Item::new(1, "One", None), Item::new(2, "Two", Some(""))];
        let c = Classifier::new(ab(), items, options).unwrap();
        assert_eq!(c.lane(&cat("b")), &[id("1"), id("2")]);
    }

    #[test]
    fn test_undeclared_fallback_override_ignored() {
        let options = ClassifyOptions {
            fallback_category: Some(cat("zzz")),
            ..ClassifyOptions::default()
        };
        let c = Classifier::new(ab(), vec![Item::new(1, "One", None)], options).unwrap();
        assert_eq!(c.fallback(), &cat("a"));
    }

    #[test]
    fn test_every_item_lands_in_a_declared_category() {
        let items = (0..20u32)
            .map(|n| Item::new(n, format!("Item {}", n), Some(["a", "b", "q", ""][(n % 4) as usize])))
            .collect();
        let c = Classifier::new(ab(), items, ClassifyOptions::default()).unwrap();
        for item in c.items() {
            let category = item.category_id.unwrap();
            assert!(c.categories().iter().any(|k| k.id == category));
        }
    }

    #[test]
    fn test_value_partitions_items_exactly_once() {
        let mut c = sample();
        c.move_item(&id("1"), &cat("b"), false).unwrap();
        c.drop_item(&id("3"), &cat("a"), Some(0)).unwrap();
        c.move_visible(&cat("b"), &cat("a")).unwrap();

        let value = c.value();
        assert_eq!(value.total(), 5);
        let mut seen: Vec<_> = value.iter().flat_map(|(_, ids)| ids.clone()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let items = vec![Item::new(1, "One", Some("b")), Item::new(1, "Again", Some("a"))];
        let c = Classifier::new(ab(), items, ClassifyOptions::default()).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.item(&id("1")).unwrap().display_name, "One");
        assert_eq!(c.value().total(), 1);
    }

    #[test]
    fn test_button_move_keeps_all_views_in_sync() {
        let mut c = sample();
        assert!(c.move_item(&id("2"), &cat("b"), true).unwrap());
        assert_in_sync(&c, "2", "b");
        assert!(c.is_flashing(&id("2")));
        assert_eq!(c.lane(&cat("b")).last(), Some(&id("2")));
        assert_eq!(c.counters().count(&cat("b")), 3);
    }

    #[test]
    fn test_move_to_same_category_is_noop() {
        let mut c = sample();
        assert!(!c.move_item(&id("1"), &cat("a"), true).unwrap());
        assert_eq!(c.lane(&cat("a")), &[id("1"), id("2"), id("4")]);
        assert!(!c.is_flashing(&id("1")));
    }

    #[test]
    fn test_move_errors() {
        let mut c = sample();
        assert_eq!(
            c.move_item(&id("1"), &cat("zzz"), false),
            Err(ClassifyError::UnknownCategory(cat("zzz")))
        );
        assert_eq!(
            c.move_item(&id("99"), &cat("b"), false),
            Err(ClassifyError::UnknownItem(id("99")))
        );
    }

    #[test]
    fn test_read_only_refuses_mutation() {
        let options = ClassifyOptions {
            editable: false,
            ..ClassifyOptions::default()
        };
        let mut c = Classifier::new(ab(), vec![Item::new(1, "One", Some("a"))], options).unwrap();
        assert_eq!(c.move_item(&id("1"), &cat("b"), false), Err(ClassifyError::ReadOnly));
        assert_eq!(c.drop_item(&id("1"), &cat("b"), None), Err(ClassifyError::ReadOnly));
        assert_eq!(c.move_visible(&cat("a"), &cat("b")), Err(ClassifyError::ReadOnly));
        assert_eq!(c.sort_category(&cat("a")), Err(ClassifyError::ReadOnly));
        assert_in_sync(&c, "1", "a");
    }

    #[test]
    fn test_drop_inserts_at_index_and_syncs() {
        let mut c = sample();
        c.drop_item(&id("4"), &cat("b"), Some(1)).unwrap();
        assert_eq!(c.lane(&cat("b")), &[id("3"), id("4"), id("5")]);
        assert_in_sync(&c, "4", "b");
        assert_eq!(c.counters().count(&cat("a")), 2);
    }

    #[test]
    fn test_drop_reorders_within_lane() {
        let mut c = sample();
        // "1" dragged below "4": index 3 was computed with "1" still in the lane
        c.drop_item(&id("1"), &cat("a"), Some(3)).unwrap();
        assert_eq!(c.lane(&cat("a")), &[id("2"), id("4"), id("1")]);
        c.drop_item(&id("1"), &cat("a"), Some(0)).unwrap();
        assert_eq!(c.lane(&cat("a")), &[id("1"), id("2"), id("4")]);
    }

    #[test]
    fn test_search_hides_and_counts() {
        let mut c = sample();
        c.search("  MO ");
        let visible: Vec<_> = c.lane_items(&cat("a")).into_iter().filter(|r| r.visible).map(|r| r.id.clone()).collect();
        assert_eq!(visible, vec![id("2"), id("4")]);
        let counters = c.counters();
        assert_eq!(counters.count(&cat("a")), 2);
        assert_eq!(counters.count(&cat("b")), 0);
        assert_eq!(counters.visible_total, 2);

        c.search("");
        assert_eq!(c.counters().visible_total, 5);
    }

    #[test]
    fn test_move_visible_only_moves_filtered_items_in_order() {
        let mut c = sample();
        c.search("m");
        let moved = c.move_visible(&cat("a"), &cat("b")).unwrap();
        assert_eq!(moved, 2);
        assert_eq!(c.lane(&cat("a")), &[id("1")]);
        assert_eq!(c.lane(&cat("b")), &[id("3"), id("5"), id("2"), id("4")]);
        assert_in_sync(&c, "2", "b");
        assert_in_sync(&c, "4", "b");
    }

    #[test]
    fn test_sort_category_natural_order() {
        let items = vec![
            Item::new(1, "Item 10", Some("a")),
            Item::new(2, "item 2", Some("a")),
            Item::new(3, "Item 1", Some("a")),
        ];
        let mut c = Classifier::new(ab(), items, ClassifyOptions::default()).unwrap();
        c.sort_category(&cat("a")).unwrap();
        assert_eq!(c.lane(&cat("a")), &[id("3"), id("2"), id("1")]);
    }

    #[test]
    fn test_apply_group_items_counts_existing_only() {
        let mut c = sample();
        let moved = c.apply_group_items(&[id("3"), id("7")], &cat("b")).unwrap();
        assert_eq!(moved, 1);
        assert_in_sync(&c, "3", "b");

        let moved = c.apply_group_items(&[id("1"), id("2")], &cat("b")).unwrap();
        assert_eq!(moved, 2);
        assert_in_sync(&c, "1", "b");
    }

    #[test]
    fn test_move_leaves_other_item_views_equal() {
        let mut c = sample();
        let toolbar = c.toolbar(&id("2"));
        let visible = c.item(&id("2")).map(|r| r.visible);
        c.move_item(&id("1"), &cat("b"), true).unwrap();
        assert_eq!(c.toolbar(&id("2")), toolbar);
        assert_eq!(c.item(&id("2")).map(|r| r.visible), visible);
        assert!(!c.is_flashing(&id("2")));
    }

    #[test]
    fn test_apply_group_items_counts_repeated_ids_once() {
        let mut c = sample();
        let moved = c.apply_group_items(&[id("3"), id("3"), id("7")], &cat("a")).unwrap();
        assert_eq!(moved, 1);
        assert_in_sync(&c, "3", "a");
        assert_eq!(c.lane(&cat("a")).iter().filter(|i| **i == id("3")).count(), 1);
    }

    #[test]
    fn test_apply_template_skips_stale_ids() {
        let mut c = sample();
        let template = Template {
            id: "pl_1".into(),
            name: "Everything in b".to_string(),
            description: String::new(),
            classification: [("b", vec!["1", "2", "404"]), ("gone", vec!["4"])].into_iter().collect(),
        };
        let applied = c.apply_template(&template).unwrap();
        assert_eq!(applied, 2);
        let value = c.value();
        assert!(value.category_of(&id("404")).is_none());
        assert_eq!(value.bucket(&cat("b")), &[id("3"), id("5"), id("1"), id("2")]);
        assert_in_sync(&c, "4", "a");
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut c = sample();
        let before = c.value();
        let checkpoint = c.checkpoint();
        c.move_item(&id("1"), &cat("b"), true).unwrap();
        c.move_visible(&cat("a"), &cat("b")).unwrap();
        c.restore(checkpoint);
        assert_eq!(c.value(), before);
        assert_in_sync(&c, "1", "a");
        assert!(!c.is_flashing(&id("1")));
    }

    #[test]
    fn test_neighbours() {
        let c = Classifier::new(
            vec![Category::new("a", "A"), Category::new("b", "B"), Category::new("c", "C")],
            vec![],
            ClassifyOptions::default(),
        )
        .unwrap();
        let (left, right) = c.neighbours(&cat("a"));
        assert!(left.is_none());
        assert_eq!(right.unwrap().id, cat("b"));
        let (left, right) = c.neighbours(&cat("c"));
        assert_eq!(left.unwrap().id, cat("b"));
        assert!(right.is_none());
    }
}
