use serde_json::Value;

use super::{optional, Component};
use crate::errors::OperationError;
use crate::factory::ComponentFactory;
use crate::render::RenderNode;
use crate::utils::{opt_str, Attrs};

/// Matches direct links to image files
pub const IMAGE_URL_REGEX: &str = r"(?i)^https?://\S+\.(?:png|jpe?g|gif|webp|svg)(?:\?\S*)?$";

/// Image with an optional caption
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    name: String,
    section: Option<String>,
    pub src: String,
    pub caption: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl Figure {
    pub const CLASS_NAME: &'static str = "Figure";

    pub fn new(name: String, attrs: &Attrs) -> Self {
        Self {
            name,
            section: None,
            src: attrs.str_or("src", "").to_string(),
            caption: optional(attrs, "caption"),
            width: optional(attrs, "width"),
            height: optional(attrs, "height"),
        }
    }

    pub fn boxed(name: String, attrs: &Attrs) -> Box<dyn Component> {
        Box::new(Self::new(name, attrs))
    }

    pub fn boxed_from_link(name: String, link: &str) -> Box<dyn Component> {
        Box::new(Self::new(name, &Attrs::new().with("src", link)))
    }

    pub fn register_regexes(factory: &mut ComponentFactory) -> Result<(), OperationError> {
        factory.register_regex(IMAGE_URL_REGEX, Self::boxed_from_link)
    }
}

impl Component for Figure {
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
        let mut model = Attrs::new()
            .with("name", self.name.clone())
            .with("src", self.src.clone())
            .with("caption", opt_str(&self.caption));
        if let Some(width) = &self.width {
            model.insert("width", width.clone());
        }
        if let Some(height) = &self.height {
            model.insert("height", height.clone());
        }
        model.into_value()
    }

    fn render(&self) -> RenderNode {
        let mut dom = RenderNode::element("figure")
            .with_attr("contenteditable", "false")
            .with_attr("name", self.name.clone());

        if self.src.is_empty() {
            dom = dom.with_child(
                RenderNode::element("div").with_attr("class", "figure-placeholder"),
            );
        } else {
            let mut image = RenderNode::element("img").with_attr("src", self.src.clone());
            if let Some(width) = &self.width {
                image = image.with_attr("width", width.clone());
            }
            if let Some(height) = &self.height {
                image = image.with_attr("height", height.clone());
            }
            dom = dom.with_child(image);
        }

        if let Some(caption) = &self.caption {
            dom = dom.with_child(
                RenderNode::element("figcaption")
                    .with_attr("contenteditable", "true")
                    .with_child(RenderNode::text(caption.clone())),
            );
        }

        dom
    }
}
