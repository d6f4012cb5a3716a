//! Group-based bulk move
//!
//! A group names a subset of items resolved by a lookup (usually the
//! backend). Applying a group moves every member present in the dialog
//! to one target category.

use std::collections::HashMap;

use async_trait::async_trait;
use indexmap::IndexSet;

use crate::classifier::Classifier;
use crate::error::{ClassifyError, ClassifyResult};
use crate::model::{CategoryId, Group, GroupId, ItemId};

#[async_trait(?Send)]
pub trait GroupLookup {
    async fn group_items(&self, group: &GroupId) -> ClassifyResult<Vec<ItemId>>;
}

/// In-memory membership table
#[derive(Debug, Clone, Default)]
pub struct StaticGroups {
    members: HashMap<GroupId, Vec<ItemId>>,
}

impl StaticGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: impl Into<GroupId>, items: Vec<ItemId>) -> Self {
        self.members.insert(group.into(), items);
        self
    }
}

#[async_trait(?Send)]
impl GroupLookup for StaticGroups {
    async fn group_items(&self, group: &GroupId) -> ClassifyResult<Vec<ItemId>> {
        Ok(self.members.get(group).cloned().unwrap_or_default())
    }
}

/// Resolves composite groups locally as the union of their base groups,
/// delegating everything else to `inner`
pub struct CompositeLookup<'a, L: GroupLookup> {
    groups: &'a [Group],
    inner: &'a L,
}

impl<'a, L: GroupLookup> CompositeLookup<'a, L> {
    pub fn new(groups: &'a [Group], inner: &'a L) -> Self {
        Self { groups, inner }
    }
}

#[async_trait(?Send)]
impl<'a, L: GroupLookup> GroupLookup for CompositeLookup<'a, L> {
    async fn group_items(&self, group: &GroupId) -> ClassifyResult<Vec<ItemId>> {
        let composite = self.groups.iter().find(|g| &g.id == group && g.is_composite());
        let Some(composite) = composite else {
            return self.inner.group_items(group).await;
        };

        // One level only: base groups are looked up directly
        let mut union = IndexSet::new();
        for base in &composite.composite_of {
            union.extend(self.inner.group_items(base).await?);
        }
        Ok(union.into_iter().collect())
    }
}

/// Selector state of the group bar: pick a group, then a target, then apply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSelection {
    pub group: Option<GroupId>,
    pub target: Option<CategoryId>,
    pub busy: bool,
}

impl GroupSelection {
    pub fn choose_group(&mut self, group: Option<GroupId>) {
        self.group = group;
        if self.group.is_none() {
            self.target = None;
        }
    }

    pub fn choose_target(&mut self, target: Option<CategoryId>) {
        if self.target_enabled() {
            self.target = target;
        }
    }

    pub fn target_enabled(&self) -> bool {
        self.group.is_some() && !self.busy
    }

    pub fn apply_enabled(&self) -> bool {
        self.group.is_some() && self.target.is_some() && !self.busy
    }

    /// Claim the chosen pair for an apply; the selector stays busy until
    /// [`GroupSelection::reset`]
    pub fn begin(&mut self) -> Option<(GroupId, CategoryId)> {
        if !self.apply_enabled() {
            return None;
        }
        self.busy = true;
        self.group.clone().zip(self.target.clone())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Move already-resolved group members into `target`
pub fn apply_resolved(classifier: &mut Classifier, ids: &[ItemId], target: &CategoryId) -> ClassifyResult<usize> {
    if ids.is_empty() {
        return Err(ClassifyError::EmptyGroup);
    }
    match classifier.apply_group_items(ids, target)? {
        0 => Err(ClassifyError::NothingToUpdate),
        moved => {
            log::info!("moved {} group items into '{}'", moved, target);
            Ok(moved)
        }
    }
}

pub async fn apply_group<L: GroupLookup + ?Sized>(
    classifier: &mut Classifier,
    lookup: &L,
    group: &GroupId,
    target: &CategoryId,
) -> ClassifyResult<usize> {
    if !classifier.is_editable() {
        return Err(ClassifyError::ReadOnly);
    }
    let ids = lookup.group_items(group).await?;
    apply_resolved(classifier, &ids, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Item};
    use crate::options::ClassifyOptions;
    use pretty_assertions::assert_eq;

    fn classifier() -> Classifier {
        Classifier::new(
            vec![Category::new("a", "A"), Category::new("b", "B")],
            vec![
                Item::new(1, "One", Some("a")),
                Item::new(2, "Two", Some("a")),
                Item::new(3, "Three", Some("a")),
            ],
            ClassifyOptions::default(),
        )
        .unwrap()
    }

    fn ids(raw: &[u32]) -> Vec<ItemId> {
        raw.iter().copied().map(ItemId::from).collect()
    }

    #[tokio::test]
    async fn test_apply_group_counts_present_items() {
        let lookup = StaticGroups::new().with_group("g1", ids(&[3, 7]));
        let mut c = classifier();
        let moved = apply_group(&mut c, &lookup, &"g1".into(), &"b".into()).await.unwrap();
        assert_eq!(moved, 1);
        assert_eq!(c.lane(&"b".into()), ids(&[3]).as_slice());
    }

    #[tokio::test]
    async fn test_apply_group_errors() {
        let lookup = StaticGroups::new()
            .with_group("empty", vec![])
            .with_group("stale", ids(&[40, 41]));
        let mut c = classifier();
        assert_eq!(
            apply_group(&mut c, &lookup, &"empty".into(), &"b".into()).await,
            Err(ClassifyError::EmptyGroup)
        );
        assert_eq!(
            apply_group(&mut c, &lookup, &"stale".into(), &"b".into()).await,
            Err(ClassifyError::NothingToUpdate)
        );
        assert_eq!(ClassifyError::NothingToUpdate.to_string(), "No items were found to update");
    }

    #[tokio::test]
    async fn test_apply_group_read_only() {
        let lookup = StaticGroups::new().with_group("g1", ids(&[1]));
        let mut c = Classifier::new(
            vec![Category::new("a", "A"), Category::new("b", "B")],
            vec![Item::new(1, "One", Some("a"))],
            ClassifyOptions {
                editable: false,
                ..ClassifyOptions::default()
            },
        )
        .unwrap();
        assert_eq!(
            apply_group(&mut c, &lookup, &"g1".into(), &"b".into()).await,
            Err(ClassifyError::ReadOnly)
        );
    }

    #[tokio::test]
    async fn test_composite_resolves_union_of_bases() {
        let inner = StaticGroups::new()
            .with_group("g1", ids(&[1, 2]))
            .with_group("g2", ids(&[2, 3]));
        let mut composite = Group::new("composite_1", "Both", 2);
        composite.composite_of = vec!["g1".into(), "g2".into()];
        let groups = vec![Group::new("g1", "G1", 2), Group::new("g2", "G2", 2), composite];

        let lookup = CompositeLookup::new(&groups, &inner);
        assert_eq!(lookup.group_items(&"composite_1".into()).await.unwrap(), ids(&[1, 2, 3]));
        assert_eq!(lookup.group_items(&"g2".into()).await.unwrap(), ids(&[2, 3]));
    }

    #[test]
    fn test_selection_enables_in_order() {
        let mut selection = GroupSelection::default();
        assert!(!selection.target_enabled());
        selection.choose_target(Some("b".into()));
        assert!(selection.target.is_none());

        selection.choose_group(Some("g1".into()));
        assert!(selection.target_enabled());
        assert!(!selection.apply_enabled());
        selection.choose_target(Some("b".into()));
        assert!(selection.apply_enabled());

        selection.reset();
        assert_eq!(selection, GroupSelection::default());
    }

    #[test]
    fn test_selection_busy_until_reset() {
        let mut selection = GroupSelection::default();
        assert_eq!(selection.begin(), None);

        selection.choose_group(Some("g1".into()));
        selection.choose_target(Some("b".into()));
        assert_eq!(selection.begin(), Some(("g1".into(), "b".into())));
        assert!(selection.busy);
        assert!(!selection.apply_enabled());
        assert!(!selection.target_enabled());
        // a second click while the lookup runs does nothing
        assert_eq!(selection.begin(), None);

        selection.reset();
        assert!(selection.group.is_none());
        assert!(selection.target.is_none());
        assert!(!selection.busy);
    }
}
