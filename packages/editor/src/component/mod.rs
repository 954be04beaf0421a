//! # Components
//!
//! A component is one editable unit inside a section: a paragraph, a figure,
//! an embedded video. Every variant implements [`Component`], which is the
//! whole contract the operation model relies on:
//!
//! - Length in content units (atomic embeds are always 1)
//! - A JSON model and a full attribute set to rebuild it from
//! - Insert/delete/update operation pairs
//! - Selection placement on click
//! - A render tree for the DOM adapter
//!
//! Construction never fails. Missing attributes leave the component in a
//! placeholder state.

mod figure;
mod paragraph;
mod youtube;

pub use figure::{Figure, IMAGE_URL_REGEX};
pub use paragraph::{Format, FormatKind, Paragraph, ParagraphType};
pub use youtube::{YouTubeComponent, YOUTUBE_URL_REGEXS};

use serde_json::Value;

use crate::operations::{Operation, Step};
use crate::render::RenderNode;
use crate::selection::{Cursor, Selection};
use crate::utils::Attrs;

pub trait Component: std::fmt::Debug {
    /// Unique name used to address this component in operations
    fn name(&self) -> &str;

    /// Class name used by `insertComponent` to rebuild this component
    fn class_name(&self) -> &'static str;

    /// Name of the owning section, if inserted
    fn section(&self) -> Option<&str>;

    fn set_section(&mut self, section: Option<String>);

    /// Content length (character count for text, 1 for atomic components)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full attribute set, enough to reconstruct an equal component
    fn attrs(&self) -> Attrs;

    /// Overwrite the attributes present in `attrs`; `null` resets a value
    fn apply_attrs(&mut self, attrs: &Attrs);

    fn render(&self) -> RenderNode;

    /// Serializable snapshot: `{name, ...attrs}`
    fn json_model(&self) -> Value {
        self.attrs().with("name", self.name()).into_value()
    }

    /// Operations that insert this component into `section` at `index`
    fn insert_ops(&self, section: &str, index: usize) -> Vec<Operation> {
        vec![Operation::new(
            Step::InsertComponent {
                component_class: self.class_name().to_string(),
                component: self.name().to_string(),
                section: section.to_string(),
                index,
                attrs: self.attrs(),
                cursor_offset: Some(0),
            },
            Step::DeleteComponent {
                component: self.name().to_string(),
            },
        )]
    }

    /// Operations that delete this component; `index` is where the undo
    /// reinserts it
    ///
    /// Detached components (no owning section) produce no operations.
    fn delete_ops(&self, index: usize) -> Vec<Operation> {
        let Some(section) = self.section() else {
            return Vec::new();
        };

        vec![Operation::new(
            Step::DeleteComponent {
                component: self.name().to_string(),
            },
            Step::InsertComponent {
                component_class: self.class_name().to_string(),
                component: self.name().to_string(),
                section: section.to_string(),
                index,
                attrs: self.attrs(),
                cursor_offset: None,
            },
        )]
    }

    /// Operations that set `attrs`; the undo restores the previous values
    fn update_ops(&self, attrs: Attrs, cursor_offset: Option<usize>) -> Vec<Operation> {
        let previous = self.attrs().project(&attrs);

        vec![Operation::new(
            Step::UpdateComponent {
                component: self.name().to_string(),
                attrs,
                cursor_offset,
            },
            Step::UpdateComponent {
                component: self.name().to_string(),
                attrs: previous,
                cursor_offset,
            },
        )]
    }

    /// Place the cursor on this component
    fn handle_click(&self, selection: &mut Selection) {
        selection.set_cursor(Cursor::new(self.name(), 0));
    }

    /// Place the cursor at a text offset; atomic components ignore it
    fn handle_click_at(&self, selection: &mut Selection, _offset: usize) {
        self.handle_click(selection);
    }

    fn as_paragraph(&self) -> Option<&Paragraph> {
        None
    }

    fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        None
    }
}

/// Read an optional string attribute, treating empty strings as absent
pub(crate) fn optional(attrs: &Attrs, key: &str) -> Option<String> {
    attrs.str(key).filter(|s| !s.is_empty()).map(str::to_string)
}
