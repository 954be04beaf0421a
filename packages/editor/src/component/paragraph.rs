use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{optional, Component};
use crate::operations::{Operation, Step};
use crate::render::RenderNode;
use crate::selection::{Cursor, Selection};
use crate::utils::{opt_str, Attrs};

/// Block type of a paragraph, serialized as its tag name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphType {
    #[default]
    #[serde(rename = "p")]
    Paragraph,
    #[serde(rename = "h1")]
    MainHeader,
    #[serde(rename = "h2")]
    SecondaryHeader,
    #[serde(rename = "h3")]
    ThirdHeader,
    #[serde(rename = "blockquote")]
    Quote,
    #[serde(rename = "pre")]
    Code,
}

impl ParagraphType {
    pub fn tag(self) -> &'static str {
        match self {
            ParagraphType::Paragraph => "p",
            ParagraphType::MainHeader => "h1",
            ParagraphType::SecondaryHeader => "h2",
            ParagraphType::ThirdHeader => "h3",
            ParagraphType::Quote => "blockquote",
            ParagraphType::Code => "pre",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(ParagraphType::Paragraph),
            "h1" => Some(ParagraphType::MainHeader),
            "h2" => Some(ParagraphType::SecondaryHeader),
            "h3" => Some(ParagraphType::ThirdHeader),
            "blockquote" => Some(ParagraphType::Quote),
            "pre" => Some(ParagraphType::Code),
            _ => None,
        }
    }
}

/// Inline format kinds, in nesting order (outermost first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Link,
    Bold,
    Italic,
    Code,
    Strike,
}

impl FormatKind {
    fn tag(self) -> &'static str {
        match self {
            FormatKind::Link => "a",
            FormatKind::Bold => "strong",
            FormatKind::Italic => "em",
            FormatKind::Code => "code",
            FormatKind::Strike => "s",
        }
    }
}

/// Inline format over the char range `from..to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    #[serde(rename = "type")]
    pub kind: FormatKind,
    pub from: usize,
    pub to: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Format {
    pub fn new(kind: FormatKind, from: usize, to: usize) -> Self {
        Self {
            kind,
            from,
            to,
            href: None,
        }
    }

    pub fn link(from: usize, to: usize, href: impl Into<String>) -> Self {
        Self {
            kind: FormatKind::Link,
            from,
            to,
            href: Some(href.into()),
        }
    }

    fn same_style(&self, kind: FormatKind, href: Option<&str>) -> bool {
        self.kind == kind && self.href.as_deref() == href
    }
}

/// Text block: paragraph, header, quote or code block
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    name: String,
    section: Option<String>,
    text: String,
    pub paragraph_type: ParagraphType,
    pub placeholder: Option<String>,
    formats: Vec<Format>,
}

impl Paragraph {
    pub const CLASS_NAME: &'static str = "Paragraph";

    pub fn new(name: String, attrs: &Attrs) -> Self {
        let mut paragraph = Self {
            name,
            section: None,
            text: String::new(),
            paragraph_type: ParagraphType::default(),
            placeholder: None,
            formats: Vec::new(),
        };
        paragraph.apply_attrs(attrs);
        paragraph
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name.into(), &Attrs::new().with("text", text.into()))
    }

    pub fn boxed(name: String, attrs: &Attrs) -> Box<dyn Component> {
        Box::new(Self::new(name, attrs))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Replace formats, dropping empty and out-of-range ones
    pub fn set_formats(&mut self, formats: Vec<Format>) {
        let len = self.char_len();
        self.formats = formats
            .into_iter()
            .map(|mut format| {
                format.to = format.to.min(len);
                format
            })
            .filter(|format| format.from < format.to)
            .collect();
        sort_formats(&mut self.formats);
    }

    fn byte_index(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }

    /// Insert `value` at a char offset (clamped), shifting formats
    pub fn insert_chars(&mut self, offset: usize, value: &str) {
        let offset = offset.min(self.char_len());
        let count = value.chars().count();
        let at = self.byte_index(offset);
        self.text.insert_str(at, value);

        for format in &mut self.formats {
            if format.from >= offset {
                format.from += count;
                format.to += count;
            } else if format.to > offset {
                format.to += count;
            }
        }
    }

    /// Delete `count` chars at a char offset (clamped), shrinking formats
    pub fn delete_chars(&mut self, offset: usize, count: usize) {
        let len = self.char_len();
        let start = offset.min(len);
        let end = offset.saturating_add(count).min(len);
        if start == end {
            return;
        }

        let (start_byte, end_byte) = (self.byte_index(start), self.byte_index(end));
        self.text.replace_range(start_byte..end_byte, "");

        let removed = end - start;
        let shrink = |position: usize| -> usize {
            if position <= start {
                position
            } else if position >= end {
                position - removed
            } else {
                start
            }
        };
        for format in &mut self.formats {
            format.from = shrink(format.from);
            format.to = shrink(format.to);
        }
        self.formats.retain(|format| format.from < format.to);
    }

    /// Substring by char range (clamped)
    pub fn slice(&self, from: usize, to: usize) -> String {
        let to = to.min(self.char_len());
        let from = from.min(to);
        self.text.chars().skip(from).take(to - from).collect()
    }

    /// Text and formats of this paragraph cut at `at`, followed by `other`
    /// from its offset `from`
    pub fn joined_attrs(&self, at: usize, other: &Paragraph, from: usize) -> Attrs {
        let at = at.min(self.char_len());
        let from = from.min(other.char_len());

        let mut text = self.slice(0, at);
        text.push_str(&other.slice(from, other.char_len()));

        let mut formats: Vec<Format> = self
            .formats
            .iter()
            .filter(|format| format.from < at)
            .map(|format| Format {
                to: format.to.min(at),
                ..format.clone()
            })
            .collect();
        formats.extend(other.formats.iter().filter(|format| format.to > from).map(|format| Format {
            from: format.from.max(from) - from + at,
            to: format.to - from + at,
            ..format.clone()
        }));
        sort_formats(&mut formats);

        Attrs::new()
            .with("text", text)
            .with("formats", formats_value(&formats))
    }

    /// Operations inserting `value` at `offset`; the cursor lands after it
    pub fn insert_chars_ops(&self, offset: usize, value: &str) -> Vec<Operation> {
        let offset = offset.min(self.char_len());
        let count = value.chars().count();
        if count == 0 {
            return Vec::new();
        }

        vec![Operation::new(
            Step::InsertChars {
                component: self.name.clone(),
                index: offset,
                value: value.to_string(),
                formats: None,
                cursor_offset: Some(offset + count),
            },
            Step::DeleteChars {
                component: self.name.clone(),
                index: offset,
                count,
                cursor_offset: Some(offset),
            },
        )]
    }

    /// Operations deleting `count` chars at `offset`
    ///
    /// The undo re-inserts the text and restores the formats exactly, since
    /// formats fully inside the deleted range cannot be rebuilt by shifting.
    pub fn delete_chars_ops(&self, offset: usize, count: usize) -> Vec<Operation> {
        let len = self.char_len();
        let start = offset.min(len);
        let end = offset.saturating_add(count).min(len);
        if start == end {
            return Vec::new();
        }

        vec![Operation::new(
            Step::DeleteChars {
                component: self.name.clone(),
                index: start,
                count: end - start,
                cursor_offset: Some(start),
            },
            Step::InsertChars {
                component: self.name.clone(),
                index: start,
                value: self.slice(start, end),
                formats: Some(self.formats.clone()),
                cursor_offset: Some(end),
            },
        )]
    }

    /// Whether `from..to` is entirely covered by formats of this style
    pub fn is_formatted(
        &self,
        kind: FormatKind,
        href: Option<&str>,
        from: usize,
        to: usize,
    ) -> bool {
        let mut covered = from;
        let mut spans: Vec<&Format> = self
            .formats
            .iter()
            .filter(|f| f.same_style(kind, href))
            .collect();
        spans.sort_by_key(|f| f.from);

        for span in spans {
            if span.from > covered {
                break;
            }
            covered = covered.max(span.to);
            if covered >= to {
                return true;
            }
        }
        covered >= to
    }

    /// Formats after toggling a style over `from..to`
    ///
    /// Removes the style when the range is fully covered, otherwise applies
    /// it and merges overlapping spans of the same style.
    pub fn toggled_formats(
        &self,
        kind: FormatKind,
        href: Option<&str>,
        from: usize,
        to: usize,
    ) -> Vec<Format> {
        let to = to.min(self.char_len());
        if from >= to {
            return self.formats.clone();
        }

        if self.is_formatted(kind, href, from, to) {
            let mut result = Vec::new();
            for format in &self.formats {
                if !format.same_style(kind, href) || format.to <= from || format.from >= to {
                    result.push(format.clone());
                    continue;
                }
                if format.from < from {
                    result.push(Format {
                        to: from,
                        ..format.clone()
                    });
                }
                if format.to > to {
                    result.push(Format {
                        from: to,
                        ..format.clone()
                    });
                }
            }
            sort_formats(&mut result);
            return result;
        }

        let mut merged = Format {
            kind,
            from,
            to,
            href: href.map(str::to_string),
        };
        let mut result = Vec::new();
        for format in &self.formats {
            let overlaps = format.from <= merged.to && format.to >= merged.from;
            if format.same_style(kind, href) && overlaps {
                merged.from = merged.from.min(format.from);
                merged.to = merged.to.max(format.to);
            } else {
                result.push(format.clone());
            }
        }
        result.push(merged);
        sort_formats(&mut result);
        result
    }

    /// Operations toggling a style over `from..to`
    pub fn format_ops(
        &self,
        kind: FormatKind,
        href: Option<&str>,
        from: usize,
        to: usize,
    ) -> Vec<Operation> {
        let formats = self.toggled_formats(kind, href, from, to);
        if formats == self.formats {
            return Vec::new();
        }

        self.update_ops(Attrs::new().with("formats", formats_value(&formats)), None)
    }

    /// Split the text into runs with the set of formats active on each
    fn runs(&self) -> Vec<(String, Vec<&Format>)> {
        let len = self.char_len();
        let mut boundaries = vec![0, len];
        for format in &self.formats {
            boundaries.push(format.from.min(len));
            boundaries.push(format.to.min(len));
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        boundaries
            .windows(2)
            .filter(|pair| pair[0] < pair[1])
            .map(|pair| {
                let mut active: Vec<&Format> = self
                    .formats
                    .iter()
                    .filter(|f| f.from <= pair[0] && f.to >= pair[1])
                    .collect();
                active.sort_by_key(|f| f.kind);
                (self.slice(pair[0], pair[1]), active)
            })
            .collect()
    }
}

fn sort_formats(formats: &mut [Format]) {
    formats.sort_by(|a, b| (a.from, a.to, a.kind).cmp(&(b.from, b.to, b.kind)));
}

fn formats_value(formats: &[Format]) -> Value {
    serde_json::to_value(formats).unwrap_or(Value::Array(Vec::new()))
}

impl Component for Paragraph {
    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    fn set_section(&mut self, section: Option<String>) {
        self.section = section;
    }

    fn len(&self) -> usize {
        self.char_len()
    }

    fn attrs(&self) -> Attrs {
        Attrs::new()
            .with("text", self.text.clone())
            .with("paragraphType", self.paragraph_type.tag())
            .with("placeholder", opt_str(&self.placeholder))
            .with("formats", formats_value(&self.formats))
    }

    fn apply_attrs(&mut self, attrs: &Attrs) {
        if attrs.contains_key("text") {
            self.text = attrs.str_or("text", "").to_string();
        }
        if attrs.contains_key("paragraphType") {
            self.paragraph_type = attrs
                .str("paragraphType")
                .and_then(ParagraphType::from_tag)
                .unwrap_or_default();
        }
        if attrs.contains_key("placeholder") {
            self.placeholder = optional(attrs, "placeholder");
        }
        if let Some(value) = attrs.get("formats") {
            let formats = serde_json::from_value(value.clone()).unwrap_or_default();
            self.set_formats(formats);
        } else if attrs.contains_key("text") {
            // Re-clamp existing formats against the new text
            let formats = std::mem::take(&mut self.formats);
            self.set_formats(formats);
        }
    }

    fn render(&self) -> RenderNode {
        let mut dom =
            RenderNode::element(self.paragraph_type.tag()).with_attr("name", self.name.clone());

        if self.text.is_empty() {
            if let Some(placeholder) = &self.placeholder {
                dom = dom.with_attr("placeholder", placeholder.clone());
            }
            return dom.with_child(RenderNode::element("br"));
        }

        let children = self.runs().into_iter().map(|(text, active)| {
            active.into_iter().rev().fold(RenderNode::text(text), |inner, format| {
                let mut wrapper = RenderNode::element(format.kind.tag());
                if let Some(href) = &format.href {
                    wrapper = wrapper.with_attr("href", href.clone());
                }
                wrapper.with_child(inner)
            })
        });

        dom.with_children(children)
    }

    fn handle_click_at(&self, selection: &mut Selection, offset: usize) {
        selection.set_cursor(Cursor::new(self.name.clone(), offset.min(self.char_len())));
    }

    fn as_paragraph(&self) -> Option<&Paragraph> {
        Some(self)
    }

    fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counts_chars() {
        let paragraph = Paragraph::with_text("p1", "héllo");
        assert_eq!(paragraph.len(), 5);
    }

    #[test]
    fn test_insert_and_delete_chars() {
        let mut paragraph = Paragraph::with_text("p1", "Hello world");

        paragraph.insert_chars(5, ",");
        assert_eq!(paragraph.text(), "Hello, world");

        paragraph.delete_chars(5, 1);
        assert_eq!(paragraph.text(), "Hello world");

        paragraph.insert_chars(100, "!");
        assert_eq!(paragraph.text(), "Hello world!");
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut paragraph = Paragraph::with_text("p1", "añb");

        paragraph.insert_chars(2, "é");
        assert_eq!(paragraph.text(), "añéb");

        paragraph.delete_chars(1, 2);
        assert_eq!(paragraph.text(), "ab");
    }

    #[test]
    fn test_formats_shift_on_insert() {
        let mut paragraph = Paragraph::with_text("p1", "Hello world");
        paragraph.set_formats(vec![Format::new(FormatKind::Bold, 6, 11)]);

        paragraph.insert_chars(0, ">> ");

        assert_eq!(paragraph.formats(), &[Format::new(FormatKind::Bold, 9, 14)]);
    }

    #[test]
    fn test_formats_inside_deleted_range_are_dropped() {
        let mut paragraph = Paragraph::with_text("p1", "Hello world");
        paragraph.set_formats(vec![
            Format::new(FormatKind::Bold, 0, 5),
            Format::new(FormatKind::Italic, 7, 9),
        ]);

        paragraph.delete_chars(6, 5);

        assert_eq!(paragraph.text(), "Hello ");
        assert_eq!(paragraph.formats(), &[Format::new(FormatKind::Bold, 0, 5)]);
    }

    #[test]
    fn test_toggle_format_adds_then_removes() {
        let paragraph = Paragraph::with_text("p1", "Hello world");

        let added = paragraph.toggled_formats(FormatKind::Bold, None, 0, 5);
        assert_eq!(added, vec![Format::new(FormatKind::Bold, 0, 5)]);

        let mut bold = paragraph.clone();
        bold.set_formats(added);
        let removed = bold.toggled_formats(FormatKind::Bold, None, 1, 3);
        assert_eq!(
            removed,
            vec![Format::new(FormatKind::Bold, 0, 1), Format::new(FormatKind::Bold, 3, 5)]
        );
    }

    #[test]
    fn test_toggle_format_merges_overlaps() {
        let mut paragraph = Paragraph::with_text("p1", "Hello world");
        paragraph.set_formats(vec![Format::new(FormatKind::Italic, 0, 3)]);

        let formats = paragraph.toggled_formats(FormatKind::Italic, None, 2, 8);

        assert_eq!(formats, vec![Format::new(FormatKind::Italic, 0, 8)]);
    }

    #[test]
    fn test_links_with_different_targets_do_not_merge() {
        let mut paragraph = Paragraph::with_text("p1", "Hello world");
        paragraph.set_formats(vec![Format::link(0, 5, "https://a.example")]);

        let formats = paragraph.toggled_formats(FormatKind::Link, Some("https://b.example"), 3, 8);

        assert_eq!(formats.len(), 2);
    }

    #[test]
    fn test_render_nested_formats() {
        let mut paragraph = Paragraph::with_text("p1", "Hello world");
        paragraph.set_formats(vec![
            Format::new(FormatKind::Bold, 0, 5),
            Format::new(FormatKind::Italic, 0, 5),
        ]);

        assert_eq!(
            paragraph.render().to_html(),
            "<p name=\"p1\"><strong><em>Hello</em></strong> world</p>"
        );
    }

    #[test]
    fn test_render_empty_with_placeholder() {
        let attrs = Attrs::new().with("placeholder", "Write...");
        let paragraph = Paragraph::new("p1".to_string(), &attrs);

        assert_eq!(
            paragraph.render().to_html(),
            "<p name=\"p1\" placeholder=\"Write...\"><br></p>"
        );
    }

    #[test]
    fn test_attrs_round_trip() {
        let mut paragraph = Paragraph::new(
            "p1".to_string(),
            &Attrs::new().with("text", "Title").with("paragraphType", "h2"),
        );
        paragraph.set_formats(vec![Format::link(0, 5, "https://example.com")]);

        let rebuilt = Paragraph::new("p1".to_string(), &paragraph.attrs());

        assert_eq!(rebuilt, paragraph);
        assert_eq!(rebuilt.paragraph_type, ParagraphType::SecondaryHeader);
    }

    #[test]
    fn test_click_clamps_offset() {
        let paragraph = Paragraph::with_text("p1", "abc");
        let mut selection = Selection::default();

        paragraph.handle_click_at(&mut selection, 10);

        assert_eq!(selection.cursor().unwrap().offset, 3);
    }

    #[test]
    fn test_joined_attrs_shift_formats() {
        let mut head = Paragraph::with_text("p1", "Hello there");
        head.set_formats(vec![Format::new(FormatKind::Bold, 0, 8)]);
        let mut tail = Paragraph::with_text("p2", "big world");
        tail.set_formats(vec![Format::new(FormatKind::Italic, 2, 9)]);

        let joined = Paragraph::new("p1".to_string(), &head.joined_attrs(6, &tail, 4));

        assert_eq!(joined.text(), "Hello world");
        assert_eq!(
            joined.formats(),
            &[
                Format::new(FormatKind::Bold, 0, 6),
                Format::new(FormatKind::Italic, 6, 11),
            ]
        );
    }
}
