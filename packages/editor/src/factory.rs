//! # Component Factory
//!
//! Two registries:
//!
//! - **Classes**: `componentClass` name → constructor from attributes. Used
//!   to rebuild components from `insertComponent` steps and document models.
//! - **Patterns**: regex → constructor from raw input. Used to turn pasted
//!   or typed text (e.g. a YouTube link) into a component. Patterns are
//!   tested in registration order and the first match wins.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::component::{Component, Figure, Paragraph, YouTubeComponent};
use crate::errors::OperationError;
use crate::utils::{Attrs, IdGenerator};

/// Builds a component from its name and attributes
pub type ClassConstructor = fn(String, &Attrs) -> Box<dyn Component>;

/// Builds a component from its name and the raw matched input
pub type InputConstructor = fn(String, &str) -> Box<dyn Component>;

#[derive(Default)]
pub struct ComponentFactory {
    classes: HashMap<String, ClassConstructor>,
    patterns: Vec<(Regex, InputConstructor)>,
    class_defaults: HashMap<String, Attrs>,
}

impl ComponentFactory {
    /// Empty factory with no classes or patterns
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with the built-in component classes and link patterns
    ///
    /// YouTube patterns are registered before the image pattern.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory.register_class(Paragraph::CLASS_NAME, Paragraph::boxed);
        factory.register_class(Figure::CLASS_NAME, Figure::boxed);
        factory.register_class(YouTubeComponent::CLASS_NAME, YouTubeComponent::boxed);

        for (pattern, result) in [
            ("youtube", YouTubeComponent::register_regexes(&mut factory)),
            ("image", Figure::register_regexes(&mut factory)),
        ] {
            if let Err(err) = result {
                warn!(pattern, error = %err, "Skipping built-in pattern");
            }
        }

        factory
    }

    pub fn register_class(&mut self, class_name: impl Into<String>, constructor: ClassConstructor) {
        self.classes.insert(class_name.into(), constructor);
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    /// Default attributes merged under the attributes passed to `create`
    pub fn set_class_defaults(&mut self, class_name: impl Into<String>, defaults: Attrs) {
        self.class_defaults.insert(class_name.into(), defaults);
    }

    /// Compile and register an input pattern
    pub fn register_regex(
        &mut self,
        pattern: &str,
        constructor: InputConstructor,
    ) -> Result<(), OperationError> {
        let regex = Regex::new(pattern).map_err(|e| OperationError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.patterns.push((regex, constructor));
        Ok(())
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Construct a registered class
    pub fn create(
        &self,
        class_name: &str,
        name: String,
        attrs: &Attrs,
    ) -> Result<Box<dyn Component>, OperationError> {
        let constructor = self
            .classes
            .get(class_name)
            .ok_or_else(|| OperationError::UnknownComponentClass(class_name.to_string()))?;

        match self.class_defaults.get(class_name) {
            Some(defaults) => Ok(constructor(name, &Attrs::extend(defaults, attrs))),
            None => Ok(constructor(name, attrs)),
        }
    }

    /// Resolve free-form input to a component using the first matching
    /// pattern; the constructor receives the input with surrounding
    /// whitespace trimmed
    pub fn match_input(&self, input: &str, ids: &mut IdGenerator) -> Option<Box<dyn Component>> {
        let input = input.trim();
        let (regex, constructor) = self.patterns.iter().find(|(regex, _)| regex.is_match(input))?;
        debug!(pattern = %regex.as_str(), "Input matched component pattern");
        Some(constructor(ids.next_id(), input))
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&String> = self.classes.keys().collect();
        classes.sort();
        let patterns: Vec<&str> = self.patterns.iter().map(|(regex, _)| regex.as_str()).collect();

        f.debug_struct("ComponentFactory")
            .field("classes", &classes)
            .field("patterns", &patterns)
            .field("class_defaults", &self.class_defaults)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> IdGenerator {
        IdGenerator::new("factory-test")
    }

    #[test]
    fn test_youtube_link_resolves() {
        let factory = ComponentFactory::with_defaults();

        let component = factory
            .match_input("https://www.youtube.com/watch?v=abc12345678", &mut ids())
            .unwrap();

        assert_eq!(component.class_name(), "YouTubeComponent");
        assert_eq!(
            component.attrs().str("src"),
            Some("https://www.youtube.com/embed/abc12345678?rel=0&amp;showinfo=0&amp;iv_load_policy=3")
        );
    }

    #[test]
    fn test_image_link_resolves() {
        let factory = ComponentFactory::with_defaults();

        let component = factory.match_input("  https://example.com/cat.png ", &mut ids()).unwrap();

        assert_eq!(component.class_name(), "Figure");
        assert_eq!(component.attrs().str("src"), Some("https://example.com/cat.png"));
    }

    #[test]
    fn test_plain_text_does_not_match() {
        let factory = ComponentFactory::with_defaults();
        assert!(factory.match_input("just some words", &mut ids()).is_none());
    }

    #[test]
    fn test_first_registered_pattern_wins() {
        let mut factory = ComponentFactory::new();
        factory.register_regex(r"example\.com", Figure::boxed_from_link).unwrap();
        factory.register_regex(r".*", YouTubeComponent::boxed_from_link).unwrap();

        let first = factory.match_input("https://example.com/a", &mut ids()).unwrap();
        let second = factory.match_input("anything", &mut ids()).unwrap();

        assert_eq!(first.class_name(), "Figure");
        assert_eq!(second.class_name(), "YouTubeComponent");
        assert_eq!(second.attrs().str("src"), Some("anything"));
    }

    #[test]
    fn test_invalid_pattern_reported() {
        let mut factory = ComponentFactory::new();

        let result = factory.register_regex("(unclosed", Figure::boxed_from_link);

        assert!(matches!(result, Err(OperationError::InvalidPattern { .. })));
        assert_eq!(factory.pattern_count(), 0);
    }

    #[test]
    fn test_unknown_class() {
        let factory = ComponentFactory::with_defaults();

        let result = factory.create("Carousel", "c1".to_string(), &Attrs::new());

        assert!(matches!(result, Err(OperationError::UnknownComponentClass(_))));
    }

    #[test]
    fn test_class_defaults_merged_under_attrs() {
        let mut factory = ComponentFactory::with_defaults();
        factory.set_class_defaults(
            "YouTubeComponent",
            Attrs::new().with("height", "480px").with("width", "640px"),
        );

        let component = factory
            .create("YouTubeComponent", "v1".to_string(), &Attrs::new().with("width", "50%"))
            .unwrap();

        assert_eq!(component.attrs().str("height"), Some("480px"));
        assert_eq!(component.attrs().str("width"), Some("50%"));
    }
}
