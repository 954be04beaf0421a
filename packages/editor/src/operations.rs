//! # Operations
//!
//! Every edit is an [`Operation`]: a `do` step and the `undo` step that
//! reverses it. Steps address components by name and serialize to the
//! persisted/transmitted JSON shape:
//!
//! ```json
//! {
//!   "do":   {"op": "insertComponent", "componentClass": "YouTubeComponent",
//!            "section": "s1", "component": "c1", "index": 0,
//!            "attrs": {"src": "..."}, "cursorOffset": 0},
//!   "undo": {"op": "deleteComponent", "component": "c1"}
//! }
//! ```
//!
//! ## Step Semantics
//!
//! ### insertComponent
//! - Constructs the component from `componentClass` + `attrs`
//! - Index is clamped to the section length
//! - Fails on unknown section/class or a name that is already registered
//!
//! ### deleteComponent
//! - Removes and deregisters the component
//! - Clears any selection pointing at it
//! - Missing name is a no-op so replayed histories never fail on it
//!
//! ### updateComponent, insertChars, deleteChars
//! - Missing name is a no-op
//! - Char steps on non-text components are no-ops

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::{Component, Format};
use crate::document::Document;
use crate::errors::OperationError;
use crate::factory::ComponentFactory;
use crate::render::DocumentChange;
use crate::selection::{Cursor, Selection};
use crate::utils::Attrs;

/// A single state transition on the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    InsertComponent {
        component_class: String,
        component: String,
        section: String,
        index: usize,
        #[serde(default)]
        attrs: Attrs,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor_offset: Option<usize>,
    },

    DeleteComponent {
        component: String,
    },

    UpdateComponent {
        component: String,
        attrs: Attrs,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor_offset: Option<usize>,
    },

    InsertChars {
        component: String,
        index: usize,
        value: String,
        /// Formats to restore after insertion (set when undoing a deletion)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        formats: Option<Vec<Format>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor_offset: Option<usize>,
    },

    DeleteChars {
        component: String,
        index: usize,
        count: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor_offset: Option<usize>,
    },
}

impl Step {
    /// Name of the component this step addresses
    pub fn component(&self) -> &str {
        match self {
            Step::InsertComponent { component, .. }
            | Step::DeleteComponent { component }
            | Step::UpdateComponent { component, .. }
            | Step::InsertChars { component, .. }
            | Step::DeleteChars { component, .. } => component,
        }
    }

    /// Debug name matching the serialized `op` tag
    pub fn name(&self) -> &'static str {
        match self {
            Step::InsertComponent { .. } => "insertComponent",
            Step::DeleteComponent { .. } => "deleteComponent",
            Step::UpdateComponent { .. } => "updateComponent",
            Step::InsertChars { .. } => "insertChars",
            Step::DeleteChars { .. } => "deleteChars",
        }
    }

    /// Apply this step
    ///
    /// Returns the resulting change, or `None` when the step was skipped
    /// because its component no longer exists.
    pub fn apply(
        &self,
        doc: &mut Document,
        factory: &ComponentFactory,
        selection: &mut Selection,
    ) -> Result<Option<DocumentChange>, OperationError> {
        debug!(op = self.name(), component = %self.component(), "Applying step");

        match self {
            Step::InsertComponent {
                component_class,
                component,
                section,
                index,
                attrs,
                cursor_offset,
            } => {
                if doc.section(section).is_none() {
                    return Err(OperationError::SectionNotFound(section.clone()));
                }
                if doc.contains(component) {
                    debug!(component = %component, "Insert skipped, component already present");
                    return Ok(None);
                }

                let instance = factory.create(component_class, component.clone(), attrs)?;
                let node = instance.render();
                let index = doc.insert_component(section, *index, instance)?;

                if let Some(offset) = cursor_offset {
                    Self::place_cursor(doc, selection, component, *offset);
                }

                Ok(Some(DocumentChange::ComponentInserted {
                    section: section.clone(),
                    index,
                    component: component.clone(),
                    node,
                }))
            }

            Step::DeleteComponent { component } => {
                let Some((section, _index, _removed)) = doc.remove_component(component) else {
                    debug!(component = %component, "Delete skipped, component not found");
                    return Ok(None);
                };

                selection.invalidate(component);

                Ok(Some(DocumentChange::ComponentRemoved {
                    section,
                    component: component.clone(),
                }))
            }

            Step::UpdateComponent {
                component,
                attrs,
                cursor_offset,
            } => {
                let Some(target) = doc.component_mut(component) else {
                    debug!(component = %component, "Update skipped, component not found");
                    return Ok(None);
                };

                target.apply_attrs(attrs);
                let node = target.render();
                let len = target.len();

                selection.clamp(component, len);
                if let Some(offset) = cursor_offset {
                    Self::place_cursor(doc, selection, component, *offset);
                }

                Ok(Some(DocumentChange::ComponentUpdated {
                    component: component.clone(),
                    node,
                }))
            }

            Step::InsertChars {
                component,
                index,
                value,
                formats,
                cursor_offset,
            } => {
                let paragraph = doc.component_mut(component).and_then(|c| c.as_paragraph_mut());
                let Some(paragraph) = paragraph else {
                    debug!(component = %component, "Insert chars skipped, no text component");
                    return Ok(None);
                };

                paragraph.insert_chars(*index, value);
                if let Some(formats) = formats {
                    paragraph.set_formats(formats.clone());
                }
                let node = paragraph.render();

                if let Some(offset) = cursor_offset {
                    Self::place_cursor(doc, selection, component, *offset);
                }

                Ok(Some(DocumentChange::ComponentUpdated {
                    component: component.clone(),
                    node,
                }))
            }

            Step::DeleteChars {
                component,
                index,
                count,
                cursor_offset,
            } => {
                let paragraph = doc.component_mut(component).and_then(|c| c.as_paragraph_mut());
                let Some(paragraph) = paragraph else {
                    debug!(component = %component, "Delete chars skipped, no text component");
                    return Ok(None);
                };

                paragraph.delete_chars(*index, *count);
                let node = paragraph.render();
                let len = paragraph.char_len();

                selection.clamp(component, len);
                if let Some(offset) = cursor_offset {
                    Self::place_cursor(doc, selection, component, *offset);
                }

                Ok(Some(DocumentChange::ComponentUpdated {
                    component: component.clone(),
                    node,
                }))
            }
        }
    }

    fn place_cursor(doc: &Document, selection: &mut Selection, component: &str, offset: usize) {
        let len = doc.component(component).map(|c| c.len()).unwrap_or(0);
        selection.set_cursor(Cursor::new(component, offset.min(len)));
    }
}

/// Reversible `do`/`undo` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "do")]
    pub do_step: Step,
    pub undo: Step,
}

impl Operation {
    pub fn new(do_step: Step, undo: Step) -> Self {
        Self { do_step, undo }
    }

    /// The same pair with `do` and `undo` swapped
    pub fn inverse(&self) -> Operation {
        Operation {
            do_step: self.undo.clone(),
            undo: self.do_step.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insert_op() -> Operation {
        Operation::new(
            Step::InsertComponent {
                component_class: "YouTubeComponent".to_string(),
                component: "c1".to_string(),
                section: "s1".to_string(),
                index: 2,
                attrs: Attrs::new().with("src", "https://www.youtube.com/embed/x"),
                cursor_offset: Some(0),
            },
            Step::DeleteComponent {
                component: "c1".to_string(),
            },
        )
    }

    #[test]
    fn test_operation_json_shape() {
        let value = serde_json::to_value(insert_op()).unwrap();

        assert_eq!(
            value,
            json!({
                "do": {
                    "op": "insertComponent",
                    "componentClass": "YouTubeComponent",
                    "component": "c1",
                    "section": "s1",
                    "index": 2,
                    "attrs": {"src": "https://www.youtube.com/embed/x"},
                    "cursorOffset": 0
                },
                "undo": {"op": "deleteComponent", "component": "c1"}
            })
        );
    }

    #[test]
    fn test_operation_serialization() {
        let op = insert_op();

        let text = serde_json::to_string(&op).unwrap();
        let parsed: Operation = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, op);
    }

    #[test]
    fn test_parse_external_update_without_cursor() {
        let parsed: Operation = serde_json::from_value(json!({
            "do": {"op": "updateComponent", "component": "c1", "attrs": {"caption": "new"}},
            "undo": {"op": "updateComponent", "component": "c1", "attrs": {"caption": null}}
        }))
        .unwrap();

        assert_eq!(parsed.do_step.name(), "updateComponent");
        assert_eq!(parsed.undo.component(), "c1");
    }

    #[test]
    fn test_inverse_swaps_steps() {
        let op = insert_op();
        let inverse = op.inverse();

        assert_eq!(inverse.do_step, op.undo);
        assert_eq!(inverse.undo, op.do_step);
    }
}
