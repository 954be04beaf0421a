//! # Render Adapter
//!
//! Components never touch the browser DOM. Each one describes its DOM as a
//! [`RenderNode`] tree, and the editor reports every applied step as a
//! [`DocumentChange`] to registered [`ChangeObserver`]s. A browser binding
//! observes those changes and patches the real elements.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::selection::Selection;

/// Pure description of a DOM subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RenderNode {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<RenderNode>,
    },

    Text { content: String },
}

impl RenderNode {
    pub fn element(tag: impl Into<String>) -> Self {
        RenderNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        RenderNode::Text {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let RenderNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: RenderNode) -> Self {
        if let RenderNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: impl IntoIterator<Item = RenderNode>) -> Self {
        if let RenderNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            RenderNode::Element { tag, .. } => Some(tag),
            RenderNode::Text { .. } => None,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            RenderNode::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            RenderNode::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Element { children, .. } => children,
            RenderNode::Text { .. } => &[],
        }
    }

    /// Find the first descendant (or self) with the given tag
    pub fn find(&self, tag: &str) -> Option<&RenderNode> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(tag))
    }

    /// Serialize to HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            RenderNode::Text { content } => out.push_str(&escape(content)),
            RenderNode::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape(value));
                    out.push('"');
                }
                out.push('>');

                if is_void(tag) {
                    return;
                }

                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "img" | "hr" | "input")
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Model change reported after a step is applied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DocumentChange {
    ComponentInserted {
        section: String,
        index: usize,
        component: String,
        node: RenderNode,
    },

    ComponentRemoved {
        section: String,
        component: String,
    },

    ComponentUpdated {
        component: String,
        node: RenderNode,
    },

    SelectionChanged { selection: Selection },
}

impl DocumentChange {
    pub fn component(&self) -> Option<&str> {
        match self {
            DocumentChange::ComponentInserted { component, .. }
            | DocumentChange::ComponentRemoved { component, .. }
            | DocumentChange::ComponentUpdated { component, .. } => Some(component),
            DocumentChange::SelectionChanged { .. } => None,
        }
    }
}

/// Receives model changes (e.g. a DOM patcher)
pub trait ChangeObserver: std::fmt::Debug {
    fn on_change(&mut self, change: &DocumentChange);
}

/// Observer that records every change; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Rc<RefCell<Vec<DocumentChange>>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<DocumentChange> {
        self.changes.borrow().clone()
    }

    pub fn take(&self) -> Vec<DocumentChange> {
        std::mem::take(&mut *self.changes.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.changes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.borrow().is_empty()
    }
}

impl ChangeObserver for ChangeLog {
    fn on_change(&mut self, change: &DocumentChange) {
        self.changes.borrow_mut().push(change.clone());
    }
}
