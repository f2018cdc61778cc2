//! In-memory report tree

use std::collections::HashMap;

/// One element of a parsed report document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportNode {
    /// Element name, e.g. `testcase`, `skipped`, `failure`
    pub tag: String,
    attributes: HashMap<String, String>,
    children: Vec<ReportNode>,
    text: Option<String>,
}

impl ReportNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: ReportNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn push_child(&mut self, child: ReportNode) {
        self.children.push(child);
    }

    /// Append character data; adjacent chunks are concatenated
    pub fn push_text(&mut self, chunk: &str) {
        match &mut self.text {
            Some(text) => text.push_str(chunk),
            None => self.text = Some(chunk.to_string()),
        }
    }

    /// Attribute value, or `None` when the attribute is not present.
    ///
    /// An attribute written as `name=""` yields `Some("")`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct children with the given tag, in document order
    pub fn children(&self, tag: &str) -> Vec<&ReportNode> {
        self.children.iter().filter(|c| c.tag == tag).collect()
    }

    /// All direct children, in document order
    pub fn all_children(&self) -> &[ReportNode] {
        &self.children
    }

    /// Text content, if the element had any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Attribute names, sorted for stable display
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
