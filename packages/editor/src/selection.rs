//! # Selection
//!
//! The user's editing position. A selection is empty, a collapsed cursor, or
//! a range between two cursors in document order. Cursors name components,
//! so every endpoint must refer to a component that exists: deleting a
//! component invalidates any selection touching it.

use serde::{Deserialize, Serialize};

use crate::document::{Document, Position};

/// Position inside a component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub component: String,
    pub offset: usize,
}

impl Cursor {
    pub fn new(component: impl Into<String>, offset: usize) -> Self {
        Self {
            component: component.into(),
            offset,
        }
    }

    fn key(&self, doc: &Document) -> Option<(Position, usize)> {
        doc.position_of(&self.component).map(|position| (position, self.offset))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,

    Cursor { cursor: Cursor },

    Range { start: Cursor, end: Cursor },
}

impl Selection {
    pub fn set_cursor(&mut self, cursor: Cursor) {
        *self = Selection::Cursor { cursor };
    }

    pub fn clear(&mut self) {
        *self = Selection::None;
    }

    /// Select between two cursors, ordering them by document position
    ///
    /// Equal endpoints collapse to a cursor. Returns `false` (and clears the
    /// selection) when either endpoint names a missing component.
    pub fn select(&mut self, doc: &Document, a: Cursor, b: Cursor) -> bool {
        let (Some(key_a), Some(key_b)) = (a.key(doc), b.key(doc)) else {
            self.clear();
            return false;
        };

        *self = if key_a == key_b {
            Selection::Cursor { cursor: a }
        } else if key_a < key_b {
            Selection::Range { start: a, end: b }
        } else {
            Selection::Range { start: b, end: a }
        };
        true
    }

    /// Place the cursor for a click on `component`, clamping the offset
    pub fn resolve_click(
        &mut self,
        doc: &Document,
        component: &str,
        offset: usize,
    ) -> Option<Cursor> {
        let target = doc.component(component)?;
        target.handle_click_at(self, offset);
        self.cursor().cloned()
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self, Selection::Cursor { .. })
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            Selection::Cursor { cursor } => Some(cursor),
            _ => None,
        }
    }

    pub fn range(&self) -> Option<(&Cursor, &Cursor)> {
        match self {
            Selection::Range { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// Start of the selection (the cursor itself when collapsed)
    pub fn start(&self) -> Option<&Cursor> {
        match self {
            Selection::None => None,
            Selection::Cursor { cursor } => Some(cursor),
            Selection::Range { start, .. } => Some(start),
        }
    }

    pub fn end(&self) -> Option<&Cursor> {
        match self {
            Selection::None => None,
            Selection::Cursor { cursor } => Some(cursor),
            Selection::Range { end, .. } => Some(end),
        }
    }

    pub fn contains_component(&self, name: &str) -> bool {
        match self {
            Selection::None => false,
            Selection::Cursor { cursor } => cursor.component == name,
            Selection::Range { start, end } => start.component == name || end.component == name,
        }
    }

    /// Reset the selection if any endpoint refers to `name`
    pub fn invalidate(&mut self, name: &str) {
        if self.contains_component(name) {
            self.clear();
        }
    }

    /// Clamp endpoints on `name` to at most `len`
    pub fn clamp(&mut self, name: &str, len: usize) {
        let clamp = |cursor: &mut Cursor| {
            if cursor.component == name && cursor.offset > len {
                cursor.offset = len;
            }
        };
        match self {
            Selection::None => {}
            Selection::Cursor { cursor } => clamp(cursor),
            Selection::Range { start, end } => {
                clamp(start);
                clamp(end);
            }
        }
    }

    /// Move one unit left; ranges collapse to their start
    pub fn move_left(&mut self, doc: &Document) {
        let cursor = match &*self {
            Selection::None => return,
            Selection::Range { start, .. } => start.clone(),
            Selection::Cursor { cursor } => {
                let Some(component) = doc.component(&cursor.component) else {
                    self.clear();
                    return;
                };
                if cursor.offset > 0 {
                    let offset = cursor.offset.min(component.len()).saturating_sub(1);
                    Cursor::new(component.name(), offset)
                } else if let Some(previous) = doc.component_before(&cursor.component) {
                    Cursor::new(previous.name(), previous.len())
                } else {
                    return;
                }
            }
        };
        self.set_cursor(cursor);
    }

    /// Move one unit right; ranges collapse to their end
    pub fn move_right(&mut self, doc: &Document) {
        let cursor = match &*self {
            Selection::None => return,
            Selection::Range { end, .. } => end.clone(),
            Selection::Cursor { cursor } => {
                let Some(component) = doc.component(&cursor.component) else {
                    self.clear();
                    return;
                };
                if cursor.offset < component.len() {
                    Cursor::new(component.name(), cursor.offset + 1)
                } else if let Some(next) = doc.component_after(&cursor.component) {
                    Cursor::new(next.name(), 0)
                } else {
                    return;
                }
            }
        };
        self.set_cursor(cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Paragraph, YouTubeComponent};
    use crate::utils::Attrs;

    fn doc() -> Document {
        let mut doc = Document::new().with_section("s1").with_section("s2");
        doc.insert_component("s1", 0, Box::new(Paragraph::with_text("p1", "ab")))
            .unwrap();
        doc.insert_component(
            "s1",
            1,
            Box::new(YouTubeComponent::new("v1".to_string(), &Attrs::new())),
        )
        .unwrap();
        doc.insert_component("s2", 0, Box::new(Paragraph::with_text("p2", "cd")))
            .unwrap();
        doc
    }

    #[test]
    fn test_select_orders_endpoints() {
        let doc = doc();
        let mut selection = Selection::default();

        assert!(selection.select(&doc, Cursor::new("p2", 1), Cursor::new("p1", 1)));

        let (start, end) = selection.range().unwrap();
        assert_eq!(start, &Cursor::new("p1", 1));
        assert_eq!(end, &Cursor::new("p2", 1));
    }

    #[test]
    fn test_equal_endpoints_collapse() {
        let doc = doc();
        let mut selection = Selection::default();

        selection.select(&doc, Cursor::new("p1", 1), Cursor::new("p1", 1));

        assert!(selection.is_collapsed());
    }

    #[test]
    fn test_select_missing_component_clears() {
        let doc = doc();
        let mut selection = Selection::default();
        selection.set_cursor(Cursor::new("p1", 0));

        assert!(!selection.select(&doc, Cursor::new("p1", 0), Cursor::new("gone", 0)));
        assert!(selection.is_none());
    }

    #[test]
    fn test_invalidate_only_matching() {
        let mut selection = Selection::Range {
            start: Cursor::new("p1", 0),
            end: Cursor::new("p2", 1),
        };

        selection.invalidate("v1");
        assert!(!selection.is_none());

        selection.invalidate("p2");
        assert!(selection.is_none());
    }

    #[test]
    fn test_move_right_crosses_components_and_sections() {
        let doc = doc();
        let mut selection = Selection::default();
        selection.set_cursor(Cursor::new("p1", 2));

        selection.move_right(&doc);
        assert_eq!(selection.cursor(), Some(&Cursor::new("v1", 0)));

        selection.move_right(&doc);
        selection.move_right(&doc);
        assert_eq!(selection.cursor(), Some(&Cursor::new("p2", 0)));

        selection.set_cursor(Cursor::new("p2", 2));
        selection.move_right(&doc);
        assert_eq!(selection.cursor(), Some(&Cursor::new("p2", 2)));
    }

    #[test]
    fn test_move_left_crosses_into_previous_end() {
        let doc = doc();
        let mut selection = Selection::default();
        selection.set_cursor(Cursor::new("p2", 0));

        selection.move_left(&doc);
        assert_eq!(selection.cursor(), Some(&Cursor::new("v1", 1)));

        selection.set_cursor(Cursor::new("p1", 0));
        selection.move_left(&doc);
        assert_eq!(selection.cursor(), Some(&Cursor::new("p1", 0)));
    }

    #[test]
    fn test_range_collapses_on_move() {
        let doc = doc();
        let mut selection = Selection::default();
        selection.select(&doc, Cursor::new("p1", 1), Cursor::new("p2", 1));

        let mut left = selection.clone();
        left.move_left(&doc);
        selection.move_right(&doc);

        assert_eq!(left.cursor(), Some(&Cursor::new("p1", 1)));
        assert_eq!(selection.cursor(), Some(&Cursor::new("p2", 1)));
    }

    #[test]
    fn test_stale_cursor_is_cleared_on_move() {
        let doc = doc();
        let mut selection = Selection::default();
        selection.set_cursor(Cursor::new("gone", 0));

        selection.move_right(&doc);

        assert!(selection.is_none());
    }

    #[test]
    fn test_resolve_click() {
        let doc = doc();
        let mut selection = Selection::default();

        let paragraph = selection.resolve_click(&doc, "p1", 9);
        assert_eq!(paragraph, Some(Cursor::new("p1", 2)));

        let video = selection.resolve_click(&doc, "v1", 3);
        assert_eq!(video, Some(Cursor::new("v1", 0)));

        assert!(selection.resolve_click(&doc, "gone", 0).is_none());
    }

    #[test]
    fn test_clamp() {
        let mut selection = Selection::default();
        selection.set_cursor(Cursor::new("p1", 5));

        selection.clamp("p1", 2);

        assert_eq!(selection.cursor(), Some(&Cursor::new("p1", 2)));
    }
}
