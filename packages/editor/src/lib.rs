//! # Carbon Editor
//!
//! Operation model for the carbon block editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ input: typing, paste, click, commands       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Editor executor facade              │
//! │  - Components produce do/undo operations    │
//! │  - Factory resolves pasted links            │
//! │  - Undo stack with batches                  │
//! │  - Selection kept valid across deletes      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ render: RenderNode tree + DocumentChange    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Operations are the only way to mutate**: every edit is a `do`/`undo`
//!    pair, so history and replay come for free
//! 2. **Names, not references**: operations, selection and history address
//!    components by name through the document's registry
//! 3. **Pure model**: rendering is derived, observers receive changes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carbon_editor::{Cursor, Document, Editor, EditorConfig, Paragraph};
//!
//! let mut doc = Document::new().with_section("main");
//! doc.insert_component("main", 0, Box::new(Paragraph::with_text("p1", "Hello")))?;
//!
//! let mut editor = Editor::with_config(doc, &EditorConfig::load(".")?);
//! editor.click("p1", 5);
//! editor.type_text(" world")?;
//!
//! // Pasting a YouTube link inserts a video after the cursor's paragraph
//! editor.paste("https://www.youtube.com/watch?v=abc12345678")?;
//!
//! editor.undo()?;
//! println!("{}", editor.render().to_html());
//! ```

mod component;
mod config;
mod document;
mod editor;
mod errors;
mod factory;
mod operations;
mod registry;
mod render;
mod section;
mod selection;
mod undo_stack;
mod utils;

pub use component::{
    Component, Figure, Format, FormatKind, Paragraph, ParagraphType, YouTubeComponent,
    IMAGE_URL_REGEX, YOUTUBE_URL_REGEXS,
};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::{ComponentModel, Document, DocumentModel, Position, SectionModel};
pub use editor::Editor;
pub use errors::{EditorError, OperationError};
pub use factory::{ClassConstructor, ComponentFactory, InputConstructor};
pub use operations::{Operation, Step};
pub use registry::Registry;
pub use render::{ChangeLog, ChangeObserver, DocumentChange, RenderNode};
pub use section::Section;
pub use selection::{Cursor, Selection};
pub use undo_stack::{OperationBatch, UndoStack};
pub use utils::{seed_from, Attrs, IdGenerator};
