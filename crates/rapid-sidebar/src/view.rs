#![forbid(unsafe_code)]

//! A tiny retained view tree.
//!
//! Panels describe themselves as [`ViewNode`] trees built by pure functions
//! of their state. The host diffs or paints the tree; this crate only
//! guarantees that equal state produces an equal tree.

/// One element: a tag, CSS-like classes, attributes, optional text, children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewNode {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// `div` with one class, the most common shape.
    #[must_use]
    pub fn div(class: &str) -> Self {
        Self::new("div").class(class)
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    #[must_use]
    pub fn class_if(self, class: &str, on: bool) -> Self {
        if on { self.class(class) } else { self }
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = ViewNode>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search, including `self`.
    #[must_use]
    pub fn find(&self, class: &str) -> Option<&ViewNode> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(class))
    }

    /// Every node carrying `class`, in document order.
    #[must_use]
    pub fn find_all(&self, class: &str) -> Vec<&ViewNode> {
        let mut out = Vec::new();
        self.collect(class, &mut out);
        out
    }

    fn collect<'a>(&'a self, class: &str, out: &mut Vec<&'a ViewNode>) {
        if self.has_class(class) {
            out.push(self);
        }
        for child in &self.children {
            child.collect(class, out);
        }
    }

    /// All text in document order, space separated.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            parts.push(text);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }
}

/// A host attachment point. The router writes its tree here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mount {
    id: String,
    tree: Option<ViewNode>,
    revision: u64,
}

impl Mount {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tree: None,
            revision: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn tree(&self) -> Option<&ViewNode> {
        self.tree.as_ref()
    }

    /// Bumped only when a render produced a different tree.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the tree; returns true when it changed.
    pub fn commit(&mut self, tree: ViewNode) -> bool {
        if self.tree.as_ref() == Some(&tree) {
            return false;
        }
        self.tree = Some(tree);
        self.revision += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ViewNode {
        ViewNode::div("sidebar")
            .child(ViewNode::div("header").text("Note"))
            .child(
                ViewNode::div("body")
                    .child(ViewNode::new("li").class("row").text("a"))
                    .child(ViewNode::new("li").class("row").text("b")),
            )
    }

    #[test]
    fn classes_are_unique() {
        let node = ViewNode::div("a").class("a").class_if("b", false);
        assert_eq!(node.classes, vec!["a".to_owned()]);
    }

    #[test]
    fn find_and_text() {
        let tree = sample();
        assert_eq!(tree.find("header").and_then(|n| n.text.as_deref()), Some("Note"));
        assert_eq!(tree.find_all("row").len(), 2);
        assert_eq!(tree.text_content(), "Note a b");
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn mount_revision_tracks_changes_only() {
        let mut mount = Mount::new("sidebar");
        assert!(mount.commit(sample()));
        assert!(!mount.commit(sample()));
        assert_eq!(mount.revision(), 1);
        assert!(mount.commit(ViewNode::div("other")));
        assert_eq!(mount.revision(), 2);
    }
}
