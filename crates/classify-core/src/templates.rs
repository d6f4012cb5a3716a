//! Templates
//!
//! Saved full categorizations that can be re-applied to the dialog later.

use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::error::{ClassifyError, ClassifyResult};
use crate::model::{Template, TemplateId};

/// One entry of the template selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateChoice {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateBook {
    templates: Vec<Template>,
}

impl TemplateBook {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn find(&self, id: &TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| &t.id == id)
    }

    pub fn push(&mut self, template: Template) {
        self.templates.push(template);
    }

    pub fn options(&self) -> Vec<TemplateChoice> {
        self.templates
            .iter()
            .map(|t| TemplateChoice {
                id: t.id.clone(),
                name: t.name.clone(),
                description: t.description.clone(),
            })
            .collect()
    }

    fn next_id(&self) -> TemplateId {
        let mut millis = chrono::Utc::now().timestamp_millis();
        loop {
            let id = TemplateId::new(format!("pl_{}", millis));
            if self.find(&id).is_none() {
                return id;
            }
            millis += 1;
        }
    }

    /// Snapshot the classifier's current value under a new template
    pub fn save_current(&mut self, classifier: &Classifier, name: &str, description: &str) -> ClassifyResult<Template> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClassifyError::MissingTemplateName);
        }
        let template = Template {
            id: self.next_id(),
            name: name.to_string(),
            description: description.trim().to_string(),
            classification: classifier.value(),
        };
        log::info!("saved template '{}' as {}", template.name, template.id);
        self.templates.push(template.clone());
        Ok(template)
    }

    /// Apply a stored template, returning how many items it placed
    pub fn apply(&self, classifier: &mut Classifier, id: &TemplateId) -> ClassifyResult<usize> {
        match self.find(id) {
            Some(template) => classifier.apply_template(template),
            None => {
                log::debug!("template {} not found", id);
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, CategoryId, Item, ItemId};
    use crate::options::ClassifyOptions;
    use pretty_assertions::assert_eq;

    fn classifier() -> Classifier {
        Classifier::new(
            vec![Category::new("a", "A"), Category::new("b", "B")],
            vec![Item::new(1, "One", Some("a")), Item::new(2, "Two", Some("b"))],
            ClassifyOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_save_requires_name() {
        let mut book = TemplateBook::default();
        assert_eq!(
            book.save_current(&classifier(), "   ", ""),
            Err(ClassifyError::MissingTemplateName)
        );
        assert!(book.is_empty());
    }

    #[test]
    fn test_save_then_apply_restores_layout() {
        let mut book = TemplateBook::default();
        let mut c = classifier();
        let saved = book.save_current(&c, " Baseline ", "first").unwrap();
        assert!(saved.id.as_str().starts_with("pl_"));
        assert_eq!(saved.name, "Baseline");

        c.move_item(&ItemId::from("1"), &CategoryId::from("b"), false).unwrap();
        let applied = book.apply(&mut c, &saved.id).unwrap();
        assert_eq!(applied, 2);
        assert_eq!(c.value(), saved.classification);
    }

    #[test]
    fn test_ids_unique_within_book() {
        let mut book = TemplateBook::default();
        let c = classifier();
        let first = book.save_current(&c, "One", "").unwrap();
        let second = book.save_current(&c, "Two", "").unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(book.options().len(), 2);
        assert_eq!(book.options()[1].name, "Two");
    }

    #[test]
    fn test_apply_unknown_template_is_noop() {
        let book = TemplateBook::default();
        let mut c = classifier();
        let before = c.value();
        assert_eq!(book.apply(&mut c, &TemplateId::from("pl_404")), Ok(0));
        assert_eq!(c.value(), before);
    }
}
