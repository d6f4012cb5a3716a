//! Classification Result
//!
//! Mapping of category id to the ordered item ids it holds.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{CategoryId, ItemId};

/// Category id → ordered item ids, in category declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationResult(IndexMap<CategoryId, Vec<ItemId>>);

impl ClassificationResult {
    /// Empty buckets for every given category
    pub fn with_categories<'a>(ids: impl IntoIterator<Item = &'a CategoryId>) -> Self {
        Self(ids.into_iter().map(|id| (id.clone(), Vec::new())).collect())
    }

    pub fn push(&mut self, category: &CategoryId, item: ItemId) {
        self.0.entry(category.clone()).or_default().push(item);
    }

    pub fn bucket(&self, category: &CategoryId) -> &[ItemId] {
        self.0.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryId, &Vec<ItemId>)> {
        self.0.iter()
    }

    pub fn categories(&self) -> impl Iterator<Item = &CategoryId> {
        self.0.keys()
    }

    /// Number of item ids across all buckets
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn category_of(&self, item: &ItemId) -> Option<&CategoryId> {
        self.0
            .iter()
            .find(|(_, ids)| ids.contains(item))
            .map(|(category, _)| category)
    }

    pub fn into_inner(self) -> IndexMap<CategoryId, Vec<ItemId>> {
        self.0
    }
}

impl<C: Into<CategoryId>, I: Into<ItemId>> FromIterator<(C, Vec<I>)> for ClassificationResult {
    fn from_iter<T: IntoIterator<Item = (C, Vec<I>)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(c, ids)| (c.into(), ids.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_object() {
        let result: ClassificationResult = [("a", vec!["1", "2"]), ("b", vec![])].into_iter().collect();
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"a":["1","2"],"b":[]}"#);
    }

    #[test]
    fn test_category_of_and_total() {
        let result: ClassificationResult = [("a", vec!["1"]), ("b", vec!["2", "3"])].into_iter().collect();
        assert_eq!(result.total(), 3);
        assert_eq!(result.category_of(&ItemId::from("3")), Some(&CategoryId::from("b")));
        assert_eq!(result.category_of(&ItemId::from("9")), None);
        assert!(result.bucket(&CategoryId::from("zzz")).is_empty());
    }
}
