use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

use super::{optional, Component};
use crate::errors::OperationError;
use crate::factory::ComponentFactory;
use crate::render::RenderNode;
use crate::utils::{opt_str, Attrs};

/// Regexes matching YouTube URLs; group 1 captures the video id
pub const YOUTUBE_URL_REGEXS: &[&str] = &[
    r#"(?:https?://(?:www\.)?youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/ ]{11})"#,
];

static YOUTUBE_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    YOUTUBE_URL_REGEXS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

const CONTAINER_TAG_NAME: &str = "figure";
const VIDEO_OVERLAY_TAG_NAME: &str = "div";
const VIDEO_TAG_NAME: &str = "iframe";
const CAPTION_TAG_NAME: &str = "figcaption";
const VIDEO_OVERLAY_CLASS_NAME: &str = "video-overlay";

/// Embedded YouTube video
///
/// Stored `src` is always the canonical embed URL when the input was a
/// recognizable YouTube link.
#[derive(Debug, Clone, PartialEq)]
pub struct YouTubeComponent {
    name: String,
    section: Option<String>,
    pub src: String,
    pub caption: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl YouTubeComponent {
    pub const CLASS_NAME: &'static str = "YouTubeComponent";

    pub fn defaults() -> Attrs {
        Attrs::new()
            .with("src", "")
            .with("caption", Value::Null)
            .with("width", "100%")
            .with("height", "360px")
    }

    /// Build from attributes layered over [`Self::defaults`]
    pub fn new(name: String, attrs: &Attrs) -> Self {
        let params = Attrs::extend(&Self::defaults(), attrs);

        Self {
            name,
            section: None,
            src: params.str_or("src", "").to_string(),
            caption: optional(&params, "caption"),
            width: optional(&params, "width"),
            height: optional(&params, "height"),
        }
    }

    pub fn boxed(name: String, attrs: &Attrs) -> Box<dyn Component> {
        Box::new(Self::new(name, attrs))
    }

    /// Build from a pasted link, keeping the raw link as `src` when it is
    /// not a recognizable YouTube URL
    pub fn from_link(name: String, link: &str) -> Self {
        let src = Self::extract_video_id(link)
            .map(|id| Self::embed_src_from_id(&id))
            .unwrap_or_else(|| link.to_string());

        Self::new(name, &Attrs::new().with("src", src))
    }

    pub fn boxed_from_link(name: String, link: &str) -> Box<dyn Component> {
        Box::new(Self::from_link(name, link))
    }

    /// Video id from the first matching pattern
    pub fn extract_video_id(link: &str) -> Option<String> {
        YOUTUBE_URL_PATTERNS
            .iter()
            .find_map(|regex| regex.captures(link))
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
    }

    pub fn embed_src_from_id(id: &str) -> String {
        format!("https://www.youtube.com/embed/{id}?rel=0&amp;showinfo=0&amp;iv_load_policy=3")
    }

    /// Register the YouTube URL patterns with a factory
    pub fn register_regexes(factory: &mut ComponentFactory) -> Result<(), OperationError> {
        for pattern in YOUTUBE_URL_REGEXS {
            factory.register_regex(pattern, Self::boxed_from_link)?;
        }
        Ok(())
    }
}

impl Component for YouTubeComponent {
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
        1
    }

    fn attrs(&self) -> Attrs {
        Attrs::new()
            .with("src", self.src.clone())
            .with("caption", opt_str(&self.caption))
            .with("width", opt_str(&self.width))
            .with("height", opt_str(&self.height))
    }

    fn apply_attrs(&mut self, attrs: &Attrs) {
        if attrs.contains_key("src") {
            self.src = attrs.str_or("src", "").to_string();
        }
        if attrs.contains_key("caption") {
            self.caption = optional(attrs, "caption");
        }
        if attrs.contains_key("width") {
            self.width = optional(attrs, "width");
        }
        if attrs.contains_key("height") {
            self.height = optional(attrs, "height");
        }
    }

    fn json_model(&self) -> Value {
        json!({
            "name": self.name,
            "src": self.src,
            "caption": self.caption,
        })
    }

    fn render(&self) -> RenderNode {
        let mut dom = RenderNode::element(CONTAINER_TAG_NAME)
            .with_attr("contenteditable", "false")
            .with_attr("name", self.name.clone())
            .with_child(
                RenderNode::element(VIDEO_OVERLAY_TAG_NAME)
                    .with_attr("class", VIDEO_OVERLAY_CLASS_NAME),
            );

        if let Some(caption) = &self.caption {
            dom = dom.with_child(
                RenderNode::element(CAPTION_TAG_NAME)
                    .with_attr("contenteditable", "true")
                    .with_child(RenderNode::text(caption.clone())),
            );
        }

        if !self.src.is_empty() {
            let mut video = RenderNode::element(VIDEO_TAG_NAME)
                .with_attr("src", self.src.clone())
                .with_attr("frameborder", "0")
                .with_attr("allowfullscreen", "true");
            if let Some(width) = &self.width {
                video = video.with_attr("width", width.clone());
            }
            if let Some(height) = &self.height {
                video = video.with_attr("height", height.clone());
            }
            dom = dom.with_child(video);
        }

        dom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Step;
    use crate::selection::Selection;

    const EXPECTED_SRC: &str =
        "https://www.youtube.com/embed/abc12345678?rel=0&amp;showinfo=0&amp;iv_load_policy=3";

    #[test]
    fn test_watch_url_becomes_embed_src() {
        let video = YouTubeComponent::from_link(
            "v1".to_string(),
            "https://www.youtube.com/watch?v=abc12345678",
        );
        assert_eq!(video.src, EXPECTED_SRC);
    }

    #[test]
    fn test_short_and_embed_urls() {
        let short = YouTubeComponent::from_link("v1".to_string(), "https://youtu.be/abc12345678");
        let embed = YouTubeComponent::from_link(
            "v2".to_string(),
            "https://www.youtube.com/embed/abc12345678",
        );
        let extra = YouTubeComponent::from_link(
            "v3".to_string(),
            "http://youtube.com/watch?feature=share&v=abc12345678&t=10",
        );

        assert_eq!(short.src, EXPECTED_SRC);
        assert_eq!(embed.src, EXPECTED_SRC);
        assert_eq!(extra.src, EXPECTED_SRC);
    }

    #[test]
    fn test_unmatched_link_is_kept_verbatim() {
        let video = YouTubeComponent::from_link("v1".to_string(), "https://vimeo.com/12345");
        assert_eq!(video.src, "https://vimeo.com/12345");
    }

    #[test]
    fn test_length_is_always_one() {
        let empty = YouTubeComponent::new("v1".to_string(), &Attrs::new());
        let full = YouTubeComponent::new(
            "v2".to_string(),
            &Attrs::new().with("src", EXPECTED_SRC).with("caption", "A video"),
        );

        assert_eq!(empty.len(), 1);
        assert_eq!(full.len(), 1);
    }

    #[test]
    fn test_defaults_applied() {
        let video = YouTubeComponent::new("v1".to_string(), &Attrs::new());

        assert_eq!(video.src, "");
        assert_eq!(video.caption, None);
        assert_eq!(video.width.as_deref(), Some("100%"));
        assert_eq!(video.height.as_deref(), Some("360px"));
    }

    #[test]
    fn test_empty_src_renders_placeholder() {
        let video = YouTubeComponent::new("v1".to_string(), &Attrs::new());
        let dom = video.render();

        assert_eq!(dom.tag(), Some("figure"));
        assert_eq!(dom.attr("contenteditable"), Some("false"));
        assert_eq!(dom.attr("name"), Some("v1"));
        assert!(dom.find("iframe").is_none());
        assert!(dom.find("figcaption").is_none());
        assert_eq!(dom.children()[0].attr("class"), Some("video-overlay"));
    }

    #[test]
    fn test_render_with_src_and_caption() {
        let video = YouTubeComponent::new(
            "v1".to_string(),
            &Attrs::new().with("src", EXPECTED_SRC).with("caption", "Launch"),
        );
        let dom = video.render();

        let iframe = dom.find("iframe").unwrap();
        assert_eq!(iframe.attr("src"), Some(EXPECTED_SRC));
        assert_eq!(iframe.attr("width"), Some("100%"));
        assert_eq!(iframe.attr("height"), Some("360px"));
        assert_eq!(iframe.attr("frameborder"), Some("0"));
        assert_eq!(dom.find("figcaption").unwrap().attr("contenteditable"), Some("true"));
    }

    #[test]
    fn test_json_model() {
        let video = YouTubeComponent::new("v1".to_string(), &Attrs::new().with("src", "s"));

        assert_eq!(video.json_model(), json!({"name": "v1", "src": "s", "caption": null}));
    }

    #[test]
    fn test_insert_ops_shape() {
        let video = YouTubeComponent::new("v1".to_string(), &Attrs::new().with("src", "s"));
        let ops = video.insert_ops("s1", 3);

        assert_eq!(ops.len(), 1);
        match &ops[0].do_step {
            Step::InsertComponent {
                component_class,
                section,
                index,
                cursor_offset,
                attrs,
                ..
            } => {
                assert_eq!(component_class, "YouTubeComponent");
                assert_eq!(section, "s1");
                assert_eq!(*index, 3);
                assert_eq!(*cursor_offset, Some(0));
                assert_eq!(attrs.str("src"), Some("s"));
            }
            other => panic!("Expected insertComponent, got {:?}", other),
        }
        assert_eq!(
            ops[0].undo,
            Step::DeleteComponent {
                component: "v1".to_string()
            }
        );
    }

    #[test]
    fn test_detached_component_has_no_delete_ops() {
        let video = YouTubeComponent::new("v1".to_string(), &Attrs::new());
        assert!(video.delete_ops(0).is_empty());
    }

    #[test]
    fn test_click_places_cursor_at_start() {
        let video = YouTubeComponent::new("v1".to_string(), &Attrs::new());
        let mut selection = Selection::default();

        video.handle_click_at(&mut selection, 5);

        let cursor = selection.cursor().unwrap();
        assert_eq!(cursor.component, "v1");
        assert_eq!(cursor.offset, 0);
    }
}
