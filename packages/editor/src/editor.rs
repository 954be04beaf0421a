//! # Editor
//!
//! Executor facade owning the document, the component factory, the selection,
//! the undo stack and the change observers.
//!
//! ## Flow
//!
//! ```text
//! helper (type_text, paste, ...) → component ops → execute → Step::apply
//!                                                      ↓
//!                                        undo stack + observers notified
//! ```
//!
//! Every mutation goes through [`Editor::execute`] or
//! [`Editor::execute_batch`], so anything done through the helpers can be
//! undone and its operations replayed elsewhere.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::component::{Component, FormatKind, Paragraph};
use crate::config::EditorConfig;
use crate::document::{Document, DocumentModel};
use crate::errors::OperationError;
use crate::factory::ComponentFactory;
use crate::operations::{Operation, Step};
use crate::render::{ChangeObserver, DocumentChange, RenderNode};
use crate::selection::{Cursor, Selection};
use crate::undo_stack::UndoStack;
use crate::utils::{Attrs, IdGenerator};

#[derive(Debug)]
pub struct Editor {
    document: Document,
    factory: ComponentFactory,
    selection: Selection,
    undo_stack: UndoStack,
    ids: IdGenerator,
    observers: Vec<Box<dyn ChangeObserver>>,
}

impl Editor {
    pub fn new(document: Document) -> Self {
        Self::with_config(document, &EditorConfig::default())
    }

    /// Editor with the built-in factory, class defaults and undo limit from
    /// `config`
    pub fn with_config(document: Document, config: &EditorConfig) -> Self {
        let mut factory = ComponentFactory::with_defaults();
        for (class_name, defaults) in &config.class_defaults {
            factory.set_class_defaults(class_name.clone(), defaults.clone());
        }

        let ids = match &config.id_seed {
            Some(seed) => IdGenerator::new(seed),
            None => IdGenerator::from_clock(),
        };

        Self {
            document,
            factory,
            selection: Selection::default(),
            undo_stack: UndoStack::with_max_levels(config.max_undo_levels),
            ids,
            observers: Vec::new(),
        }
    }

    /// Editor with a document rebuilt from its JSON model
    pub fn from_json_model(value: &Value, config: &EditorConfig) -> Result<Self, OperationError> {
        let mut editor = Self::with_config(Document::new(), config);
        editor.load_json(value)?;
        Ok(editor)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn factory(&self) -> &ComponentFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut ComponentFactory {
        &mut self.factory
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    pub fn add_observer(&mut self, observer: Box<dyn ChangeObserver>) {
        self.observers.push(observer);
    }

    /// Fresh component name
    pub fn next_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Replace the document; selection and history are reset
    pub fn load_json(&mut self, value: &Value) -> Result<(), OperationError> {
        self.document = Document::from_json_model(value, &self.factory)?;
        self.undo_stack.clear();
        self.set_selection(Selection::None);
        info!(components = self.document.len(), "Loaded document");
        Ok(())
    }

    pub fn to_json_model(&self) -> Value {
        self.document.to_json_model()
    }

    pub fn snapshot(&self) -> DocumentModel {
        self.document.snapshot()
    }

    pub fn render(&self) -> RenderNode {
        self.document.render()
    }

    fn notify(&mut self, change: DocumentChange) {
        for observer in &mut self.observers {
            observer.on_change(&change);
        }
    }

    pub fn set_selection(&mut self, selection: Selection) {
        if self.selection != selection {
            self.selection = selection;
            self.notify(DocumentChange::SelectionChanged {
                selection: self.selection.clone(),
            });
        }
    }

    fn apply_step(&mut self, step: &Step) -> Result<(), OperationError> {
        let before = self.selection.clone();

        let change = step.apply(&mut self.document, &self.factory, &mut self.selection)?;
        if let Some(change) = change {
            self.notify(change);
        }

        if self.selection != before {
            self.notify(DocumentChange::SelectionChanged {
                selection: self.selection.clone(),
            });
        }
        Ok(())
    }

    /// Apply `operation.do` and record it
    ///
    /// A failing step leaves the undo stack untouched.
    pub fn execute(&mut self, operation: Operation) -> Result<(), OperationError> {
        self.apply_step(&operation.do_step)?;
        info!(
            op = operation.do_step.name(),
            component = %operation.do_step.component(),
            "Executed operation"
        );
        self.undo_stack.record(operation);
        Ok(())
    }

    /// Apply operations in order and record them as one undo step
    ///
    /// On failure the operations already applied are reverted and nothing is
    /// recorded.
    pub fn execute_batch(&mut self, operations: Vec<Operation>) -> Result<(), OperationError> {
        if operations.is_empty() {
            return Ok(());
        }

        let steps: Vec<(&Step, &Step)> = operations
            .iter()
            .map(|operation| (&operation.do_step, &operation.undo))
            .collect();
        self.apply_reverting(&steps)?;

        info!(operations = operations.len(), "Executed batch");
        self.undo_stack.record_all(operations);
        Ok(())
    }

    /// Group subsequent `execute` calls into one undo step
    pub fn begin_batch(&mut self) {
        self.undo_stack.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.undo_stack.end_batch();
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        self.undo_stack.set_batch_description(description);
    }

    /// Run `edit` inside a batch unless one is already open
    fn batched<T>(
        &mut self,
        description: &str,
        edit: impl FnOnce(&mut Self) -> Result<T, OperationError>,
    ) -> Result<T, OperationError> {
        let owns_batch = !self.undo_stack.is_batching();
        if owns_batch {
            self.undo_stack.begin_batch();
            self.undo_stack.set_batch_description(description);
        }
        let result = edit(self);
        if owns_batch {
            self.undo_stack.end_batch();
        }
        result
    }

    /// Revert the most recent undo step
    ///
    /// Returns `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, OperationError> {
        self.undo_stack.end_batch();
        let Some(batch) = self.undo_stack.pop_undo() else {
            debug!("Nothing to undo");
            return Ok(false);
        };

        let steps: Vec<(&Step, &Step)> = batch
            .operations
            .iter()
            .rev()
            .map(|operation| (&operation.undo, &operation.do_step))
            .collect();
        let failure = self.apply_reverting(&steps).err();
        if let Some(err) = failure {
            self.undo_stack.push_undo(batch);
            return Err(err);
        }

        info!(operations = batch.operations.len(), "Undo");
        self.undo_stack.push_redo(batch);
        Ok(true)
    }

    /// Reapply the most recently undone step
    ///
    /// Returns `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, OperationError> {
        self.undo_stack.end_batch();
        let Some(batch) = self.undo_stack.pop_redo() else {
            debug!("Nothing to redo");
            return Ok(false);
        };

        let steps: Vec<(&Step, &Step)> = batch
            .operations
            .iter()
            .map(|operation| (&operation.do_step, &operation.undo))
            .collect();
        let failure = self.apply_reverting(&steps).err();
        if let Some(err) = failure {
            self.undo_stack.push_redo(batch);
            return Err(err);
        }

        info!(operations = batch.operations.len(), "Redo");
        self.undo_stack.push_undo(batch);
        Ok(true)
    }

    /// Apply each `(step, inverse)` pair in order
    ///
    /// When a step fails the inverses of the steps already applied run in
    /// reverse, leaving the document as it was before the call.
    fn apply_reverting(&mut self, steps: &[(&Step, &Step)]) -> Result<(), OperationError> {
        for (applied, (step, _)) in steps.iter().enumerate() {
            if let Err(err) = self.apply_step(step) {
                warn!(
                    op = step.name(),
                    error = %err,
                    reverted = applied,
                    "Step failed, reverting"
                );
                for (_, inverse) in steps[..applied].iter().rev() {
                    if let Err(revert_err) = self.apply_step(inverse) {
                        warn!(op = inverse.name(), error = %revert_err, "Revert step failed");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.undo_description()
    }

    /// Insert a component into `section` at `index`
    pub fn insert_component(
        &mut self,
        component: &dyn Component,
        section: &str,
        index: usize,
    ) -> Result<(), OperationError> {
        let ops = component.insert_ops(section, index);
        self.execute_batch(ops)
    }

    /// Delete a component by name; `Ok(false)` if it does not exist
    pub fn delete_component(&mut self, name: &str) -> Result<bool, OperationError> {
        let ops = self.document.delete_ops(name, 0);
        if ops.is_empty() {
            return Ok(false);
        }
        self.execute_batch(ops)?;
        Ok(true)
    }

    /// Set attributes on a component; `Ok(false)` if it does not exist
    pub fn update_component(&mut self, name: &str, attrs: Attrs) -> Result<bool, OperationError> {
        let Some(component) = self.document.component(name) else {
            return Ok(false);
        };
        let ops = component.update_ops(attrs, None);
        self.execute_batch(ops)?;
        Ok(true)
    }

    /// Place the cursor for a click on `component` at a text offset
    pub fn click(&mut self, component: &str, offset: usize) -> Option<Cursor> {
        let mut selection = self.selection.clone();
        let cursor = selection.resolve_click(&self.document, component, offset)?;
        self.set_selection(selection);
        Some(cursor)
    }

    /// Select between two cursors; `false` if either names a missing component
    pub fn select(&mut self, a: Cursor, b: Cursor) -> bool {
        let mut selection = self.selection.clone();
        let selected = selection.select(&self.document, a, b);
        self.set_selection(selection);
        selected
    }

    pub fn move_left(&mut self) {
        let mut selection = self.selection.clone();
        selection.move_left(&self.document);
        self.set_selection(selection);
    }

    pub fn move_right(&mut self) {
        let mut selection = self.selection.clone();
        selection.move_right(&self.document);
        self.set_selection(selection);
    }

    /// Type text at the cursor, replacing the selected range if any
    ///
    /// With the cursor on an atomic component, the text goes into a new
    /// paragraph inserted after it. Returns `Ok(false)` without a selection.
    pub fn type_text(&mut self, value: &str) -> Result<bool, OperationError> {
        if value.is_empty() || self.selection.is_none() {
            return Ok(false);
        }

        self.batched("Typing", |editor| {
            if editor.selection.range().is_some() {
                editor.delete_selection()?;
            }
            let Some(cursor) = editor.selection.cursor().cloned() else {
                return Ok(false);
            };
            let Some(component) = editor.document.component(&cursor.component) else {
                return Ok(false);
            };

            if let Some(paragraph) = component.as_paragraph() {
                let ops = paragraph.insert_chars_ops(cursor.offset, value);
                editor.execute_batch(ops)?;
                return Ok(true);
            }

            let (Some(section), Some(index)) = (
                component.section().map(str::to_string),
                editor.document.index_in_section(&cursor.component),
            ) else {
                return Ok(false);
            };
            let name = editor.next_id();
            let paragraph = Paragraph::with_text(name.clone(), value);
            let op = Operation::new(
                Step::InsertComponent {
                    component_class: Paragraph::CLASS_NAME.to_string(),
                    component: name.clone(),
                    section,
                    index: index + 1,
                    attrs: paragraph.attrs(),
                    cursor_offset: Some(paragraph.char_len()),
                },
                Step::DeleteComponent { component: name },
            );
            editor.execute(op)?;
            Ok(true)
        })
    }

    /// Delete backwards from the cursor, or delete the selected range
    ///
    /// - Inside a paragraph: removes the previous character
    /// - At the start of a paragraph: merges it into a preceding paragraph,
    ///   or deletes a preceding atomic component
    /// - On an atomic component: deletes it
    pub fn backspace(&mut self) -> Result<bool, OperationError> {
        if self.selection.range().is_some() {
            return self.delete_selection();
        }
        let Some(cursor) = self.selection.cursor().cloned() else {
            return Ok(false);
        };
        let Some(component) = self.document.component(&cursor.component) else {
            return Ok(false);
        };

        let Some(paragraph) = component.as_paragraph() else {
            let target = self.neighbour_cursor(&cursor.component, &cursor.component);
            self.delete_component(&cursor.component)?;
            if let Some(target) = target {
                self.set_selection(Selection::Cursor { cursor: target });
            }
            return Ok(true);
        };

        let offset = cursor.offset.min(paragraph.char_len());
        if offset > 0 {
            let ops = paragraph.delete_chars_ops(offset - 1, 1);
            self.execute_batch(ops)?;
            return Ok(true);
        }

        let Some(previous) = self.document.component_before(&cursor.component) else {
            return Ok(false);
        };

        let ops = match previous.as_paragraph() {
            Some(head) => {
                let mut ops = head.update_ops(
                    head.joined_attrs(head.char_len(), paragraph, 0),
                    Some(head.char_len()),
                );
                ops.extend(self.document.delete_ops(&cursor.component, 0));
                ops
            }
            None => self.document.delete_ops(previous.name(), 0),
        };
        self.execute_batch(ops)?;
        Ok(true)
    }

    fn selected_range(&self) -> Option<(Cursor, Cursor)> {
        self.selection
            .range()
            .map(|(start, end)| (start.clone(), end.clone()))
    }

    /// Cursor just outside the components `first..=last`: the end of the
    /// component before them, else the start of the one after
    fn neighbour_cursor(&self, first: &str, last: &str) -> Option<Cursor> {
        self.document
            .component_before(first)
            .map(|previous| Cursor::new(previous.name(), previous.len()))
            .or_else(|| {
                self.document
                    .component_after(last)
                    .map(|next| Cursor::new(next.name(), 0))
            })
    }

    /// Delete everything inside the selected range
    ///
    /// Partially selected paragraphs keep their outer text; when both ends
    /// are paragraphs the end paragraph's remainder is joined onto the start.
    /// The cursor collapses to the start of the former range.
    pub fn delete_selection(&mut self) -> Result<bool, OperationError> {
        let Some((start, end)) = self.selected_range() else {
            return Ok(false);
        };

        let names: Vec<String> = self
            .document
            .components_between(&start.component, &end.component)
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let (Some(first), Some(last)) = (
            self.document.component(&start.component),
            self.document.component(&end.component),
        ) else {
            self.set_selection(Selection::None);
            return Ok(false);
        };

        if start.component == end.component {
            let Some(paragraph) = first.as_paragraph() else {
                let target = self.neighbour_cursor(&start.component, &end.component);
                self.delete_component(&start.component)?;
                self.set_selection(match target {
                    Some(cursor) => Selection::Cursor { cursor },
                    None => Selection::None,
                });
                return Ok(true);
            };
            let count = end.offset.saturating_sub(start.offset);
            let ops = paragraph.delete_chars_ops(start.offset, count);
            self.execute_batch(ops)?;
            self.set_selection(Selection::Cursor { cursor: start });
            return Ok(true);
        }

        // Deletions run in reverse document order so each recorded index is
        // still valid when the undo reinserts front to back
        let delete_reversed = |doc: &Document, names: &[String]| -> Vec<Operation> {
            names.iter().rev().flat_map(|name| doc.delete_ops(name, 0)).collect()
        };

        let (ops, cursor) = match (first.as_paragraph(), last.as_paragraph()) {
            (Some(head), Some(tail)) => {
                let mut ops = delete_reversed(&self.document, &names[1..]);
                let joined = head.joined_attrs(start.offset, tail, end.offset);
                ops.extend(head.update_ops(joined, Some(start.offset)));
                let offset = start.offset.min(head.char_len());
                (ops, Some(Cursor::new(start.component.clone(), offset)))
            }
            (Some(head), None) => {
                let mut ops = delete_reversed(&self.document, &names[1..]);
                ops.extend(head.delete_chars_ops(start.offset, head.char_len()));
                let offset = start.offset.min(head.char_len());
                (ops, Some(Cursor::new(start.component.clone(), offset)))
            }
            (None, Some(tail)) => {
                let mut ops = tail.delete_chars_ops(0, end.offset);
                ops.extend(delete_reversed(&self.document, &names[..names.len() - 1]));
                (ops, Some(Cursor::new(end.component.clone(), 0)))
            }
            (None, None) => {
                let fallback = self.neighbour_cursor(&start.component, &end.component);
                (delete_reversed(&self.document, &names), fallback)
            }
        };

        self.execute_batch(ops)?;
        self.set_selection(match cursor {
            Some(cursor) => Selection::Cursor { cursor },
            None => Selection::None,
        });
        Ok(true)
    }

    /// Toggle an inline format over the selected range
    ///
    /// The format is removed only when every selected paragraph already has
    /// it over its selected part; otherwise it is applied everywhere.
    pub fn format_selection(
        &mut self,
        kind: FormatKind,
        href: Option<&str>,
    ) -> Result<bool, OperationError> {
        let Some((start, end)) = self.selected_range() else {
            return Ok(false);
        };

        let spans: Vec<(&Paragraph, usize, usize)> = self
            .document
            .components_between(&start.component, &end.component)
            .into_iter()
            .filter_map(|component| {
                let paragraph = component.as_paragraph()?;
                let from = if component.name() == start.component { start.offset } else { 0 };
                let to = if component.name() == end.component {
                    end.offset
                } else {
                    paragraph.char_len()
                };
                Some((paragraph, from, to.min(paragraph.char_len())))
            })
            .filter(|(_, from, to)| from < to)
            .collect();

        let all_formatted = spans
            .iter()
            .all(|(paragraph, from, to)| paragraph.is_formatted(kind, href, *from, *to));

        let ops: Vec<Operation> = spans
            .iter()
            .filter(|(paragraph, from, to)| {
                all_formatted || !paragraph.is_formatted(kind, href, *from, *to)
            })
            .flat_map(|(paragraph, from, to)| paragraph.format_ops(kind, href, *from, *to))
            .collect();

        if ops.is_empty() {
            return Ok(false);
        }
        self.execute_batch(ops)?;
        Ok(true)
    }

    /// Paste free-form input
    ///
    /// Input matching a registered pattern becomes a component inserted after
    /// the cursor's component; anything else is typed as text. Returns the
    /// name of the inserted component.
    pub fn paste(&mut self, input: &str) -> Result<Option<String>, OperationError> {
        let Some(component) = self.factory.match_input(input, &mut self.ids) else {
            debug!("Pasted input matched no component, typing as text");
            self.type_text(input)?;
            return Ok(None);
        };

        self.batched("Paste", |editor| {
            if editor.selection.range().is_some() {
                editor.delete_selection()?;
            }

            let anchor = editor
                .selection
                .cursor()
                .and_then(|cursor| editor.document.position_of(&cursor.component));
            let (section, index) = match anchor {
                Some(position) => (
                    editor.document.sections()[position.section].name().to_string(),
                    position.index + 1,
                ),
                None => match editor.document.sections().last() {
                    Some(section) => (section.name().to_string(), section.len()),
                    None => return Err(OperationError::SectionNotFound(String::new())),
                },
            };

            editor.insert_component(component.as_ref(), &section, index)?;
            Ok(Some(component.name().to_string()))
        })
    }
}
