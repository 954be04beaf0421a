//! Ordered container of components within a document region.

use crate::component::Component;

#[derive(Debug)]
pub struct Section {
    name: String,
    components: Vec<Box<dyn Component>>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| c.as_ref())
    }

    pub fn get(&self, index: usize) -> Option<&dyn Component> {
        self.components.get(index).map(|c| c.as_ref())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name() == name)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn Component>> {
        self.components.get_mut(index)
    }

    /// Insert at `index` clamped to the section length; returns the index used
    pub(crate) fn insert(&mut self, index: usize, mut component: Box<dyn Component>) -> usize {
        let index = index.min(self.components.len());
        component.set_section(Some(self.name.clone()));
        self.components.insert(index, component);
        index
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<(usize, Box<dyn Component>)> {
        let index = self.index_of(name)?;
        let mut component = self.components.remove(index);
        component.set_section(None);
        Some((index, component))
    }
}
