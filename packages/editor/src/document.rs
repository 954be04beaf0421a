//! # Document
//!
//! Ordered sections of components plus the reference registry that maps
//! component names to their sections. The document owns every section and
//! component; everything else (selection, history, operations) refers to
//! components by name.
//!
//! ## Models
//!
//! [`DocumentModel`] is the persisted form and doubles as a structural
//! snapshot: two documents are considered equal when their models are.
//!
//! ```json
//! {"sections": [{"name": "s1", "components": [
//!     {"componentClass": "Paragraph", "name": "p1", "text": "Hello", ...}
//! ]}]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::component::Component;
use crate::errors::OperationError;
use crate::factory::ComponentFactory;
use crate::operations::Operation;
use crate::registry::Registry;
use crate::render::RenderNode;
use crate::section::Section;
use crate::utils::Attrs;

/// Location of a component in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub section: usize,
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct Document {
    sections: Vec<Section>,
    registry: Registry,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style section append; a duplicate name is skipped
    pub fn with_section(mut self, name: impl Into<String>) -> Self {
        if let Err(err) = self.add_section(Section::new(name)) {
            debug!(error = %err, "Section not added");
        }
        self
    }

    pub fn add_section(&mut self, section: Section) -> Result<(), OperationError> {
        if self.section(section.name()).is_some() {
            return Err(OperationError::DuplicateSection(section.name().to_string()));
        }
        for component in section.components() {
            self.registry.register(component.name(), section.name());
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name() == name)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Number of components across all sections
    pub fn len(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn component(&self, name: &str) -> Option<&dyn Component> {
        let section = self.section(self.registry.lookup(name)?)?;
        section.get(section.index_of(name)?)
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut dyn Component> {
        let section_name = self.registry.lookup(name)?.to_string();
        let section = self.section_mut(&section_name)?;
        let index = section.index_of(name)?;
        let component = section.get_mut(index)?;
        Some(component.as_mut())
    }

    /// All components in document order
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.sections.iter().flat_map(|s| s.components())
    }

    pub fn position_of(&self, name: &str) -> Option<Position> {
        let section_name = self.registry.lookup(name)?;
        let section = self.sections.iter().position(|s| s.name() == section_name)?;
        let index = self.sections[section].index_of(name)?;
        Some(Position { section, index })
    }

    pub fn index_in_section(&self, name: &str) -> Option<usize> {
        self.position_of(name).map(|p| p.index)
    }

    /// Component preceding `name` in document order, across sections
    pub fn component_before(&self, name: &str) -> Option<&dyn Component> {
        let mut previous = None;
        for component in self.components() {
            if component.name() == name {
                return previous;
            }
            previous = Some(component);
        }
        None
    }

    /// Component following `name` in document order, across sections
    pub fn component_after(&self, name: &str) -> Option<&dyn Component> {
        let mut components = self.components();
        components.find(|c| c.name() == name)?;
        components.next()
    }

    /// Components from `start` to `end` inclusive, in document order
    pub fn components_between(&self, start: &str, end: &str) -> Vec<&dyn Component> {
        let mut inside = false;
        let mut result = Vec::new();
        for component in self.components() {
            if component.name() == start {
                inside = true;
            }
            if inside {
                result.push(component);
            }
            if inside && component.name() == end {
                break;
            }
        }
        result
    }

    /// Insert a component into `section`, registering it; returns the
    /// (clamped) index used
    pub fn insert_component(
        &mut self,
        section: &str,
        index: usize,
        component: Box<dyn Component>,
    ) -> Result<usize, OperationError> {
        let name = component.name().to_string();
        if self.registry.contains(&name) {
            return Err(OperationError::DuplicateComponent(name));
        }

        let target = self
            .section_mut(section)
            .ok_or_else(|| OperationError::SectionNotFound(section.to_string()))?;
        let index = target.insert(index, component);
        self.registry.register(name, section);
        Ok(index)
    }

    /// Remove and deregister a component; returns its section name and index
    pub fn remove_component(&mut self, name: &str) -> Option<(String, usize, Box<dyn Component>)> {
        let section_name = self.registry.lookup(name)?.to_string();
        let (index, component) = self.section_mut(&section_name)?.remove(name)?;
        self.registry.deregister(name);
        Some((section_name, index, component))
    }

    /// Delete operations for a registered component; the undo reinserts it
    /// at its current index plus `index_offset`
    pub fn delete_ops(&self, name: &str, index_offset: usize) -> Vec<Operation> {
        match (self.component(name), self.index_in_section(name)) {
            (Some(component), Some(index)) => component.delete_ops(index + index_offset),
            _ => Vec::new(),
        }
    }

    /// Structural snapshot / persisted model
    pub fn snapshot(&self) -> DocumentModel {
        DocumentModel {
            sections: self
                .sections
                .iter()
                .map(|section| SectionModel {
                    name: section.name().to_string(),
                    components: section
                        .components()
                        .map(|component| ComponentModel {
                            component_class: component.class_name().to_string(),
                            name: component.name().to_string(),
                            attrs: component.attrs(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn to_json_model(&self) -> Value {
        serde_json::to_value(self.snapshot()).unwrap_or(Value::Null)
    }

    /// Rebuild a document from its model using the factory's classes
    pub fn from_model(
        model: &DocumentModel,
        factory: &ComponentFactory,
    ) -> Result<Document, OperationError> {
        let mut doc = Document::new();
        for section_model in &model.sections {
            doc.add_section(Section::new(section_model.name.clone()))?;
            for (index, component_model) in section_model.components.iter().enumerate() {
                let component = factory.create(
                    &component_model.component_class,
                    component_model.name.clone(),
                    &component_model.attrs,
                )?;
                doc.insert_component(&section_model.name, index, component)?;
            }
        }
        Ok(doc)
    }

    pub fn from_json_model(
        value: &Value,
        factory: &ComponentFactory,
    ) -> Result<Document, OperationError> {
        let model: DocumentModel = serde_json::from_value(value.clone())
            .map_err(|e| OperationError::InvalidModel(e.to_string()))?;
        Self::from_model(&model, factory)
    }

    pub fn render(&self) -> RenderNode {
        RenderNode::element("article").with_children(self.sections.iter().map(|section| {
            RenderNode::element("section")
                .with_attr("name", section.name())
                .with_children(section.components().map(|c| c.render()))
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub sections: Vec<SectionModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionModel {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentModel {
    pub component_class: String,
    pub name: String,
    #[serde(flatten)]
    pub attrs: Attrs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Figure, Paragraph, YouTubeComponent};
    use serde_json::json;

    fn sample() -> Document {
        let mut doc = Document::new().with_section("s1").with_section("s2");
        doc.insert_component("s1", 0, Box::new(Paragraph::with_text("p1", "Hello")))
            .unwrap();
        doc.insert_component(
            "s1",
            1,
            Box::new(YouTubeComponent::new("v1".to_string(), &Attrs::new())),
        )
        .unwrap();
        doc.insert_component("s2", 0, Box::new(Paragraph::with_text("p2", "World")))
            .unwrap();
        doc
    }

    #[test]
    fn test_lookup_through_registry() {
        let doc = sample();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.component("v1").map(|c| c.class_name()), Some("YouTubeComponent"));
        assert_eq!(doc.position_of("p2"), Some(Position { section: 1, index: 0 }));
        assert_eq!(doc.registry().lookup("p2"), Some("s2"));
    }

    #[test]
    fn test_insert_into_missing_section_fails() {
        let mut doc = sample();

        let result = doc.insert_component("nope", 0, Box::new(Paragraph::with_text("p9", "")));

        assert_eq!(result, Err(OperationError::SectionNotFound("nope".to_string())));
        assert!(!doc.contains("p9"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut doc = sample();

        let result = doc.insert_component("s2", 0, Box::new(Paragraph::with_text("p1", "")));

        assert_eq!(result, Err(OperationError::DuplicateComponent("p1".to_string())));
    }

    #[test]
    fn test_duplicate_section_skipped_by_builder() {
        let doc = Document::new().with_section("s1").with_section("s1");
        assert_eq!(doc.sections().len(), 1);

        let mut doc = doc;
        let result = doc.add_section(Section::new("s1"));
        assert_eq!(result, Err(OperationError::DuplicateSection("s1".to_string())));
    }

    #[test]
    fn test_neighbors_cross_sections() {
        let doc = sample();

        assert_eq!(doc.component_after("v1").map(|c| c.name()), Some("p2"));
        assert_eq!(doc.component_before("p2").map(|c| c.name()), Some("v1"));
        assert!(doc.component_before("p1").is_none());
        assert!(doc.component_after("p2").is_none());
    }

    #[test]
    fn test_remove_deregisters() {
        let mut doc = sample();

        let (section, index, removed) = doc.remove_component("v1").unwrap();

        assert_eq!(section, "s1");
        assert_eq!(index, 1);
        assert_eq!(removed.name(), "v1");
        assert!(!doc.contains("v1"));
        assert!(doc.remove_component("v1").is_none());
    }

    #[test]
    fn test_delete_ops_use_current_index() {
        let doc = sample();

        let ops = doc.delete_ops("v1", 2);

        match &ops[0].undo {
            crate::operations::Step::InsertComponent { index, section, .. } => {
                assert_eq!(*index, 3);
                assert_eq!(section, "s1");
            }
            other => panic!("Expected insertComponent, got {:?}", other),
        }
        assert!(doc.delete_ops("missing", 0).is_empty());
    }

    #[test]
    fn test_model_round_trip() {
        let factory = ComponentFactory::with_defaults();
        let mut doc = sample();
        doc.insert_component(
            "s2",
            1,
            Box::new(Figure::new("f1".to_string(), &Attrs::new().with("src", "a.png"))),
        )
        .unwrap();

        let json = doc.to_json_model();
        let rebuilt = Document::from_json_model(&json, &factory).unwrap();

        assert_eq!(rebuilt.snapshot(), doc.snapshot());
        assert_eq!(json["sections"][0]["components"][0]["componentClass"], json!("Paragraph"));
        assert_eq!(json["sections"][0]["components"][0]["text"], json!("Hello"));
    }

    #[test]
    fn test_invalid_model() {
        let factory = ComponentFactory::with_defaults();

        let result = Document::from_json_model(&json!({"sections": 3}), &factory);

        assert!(matches!(result, Err(OperationError::InvalidModel(_))));
    }

    #[test]
    fn test_render_document() {
        let doc = sample();
        let html = doc.render().to_html();

        assert!(html.starts_with("<article><section name=\"s1\"><p name=\"p1\">Hello</p><figure"));
        assert!(html.ends_with(
            "<section name=\"s2\"><p name=\"p2\">World</p></section></article>"
        ));
    }
}
