//! Inclusion trees built from dot-separated include paths.
//!
//! Every segment of every path is marked as included, not only the leaf:
//! requesting `comments.author` includes the comments as well as their
//! authors. Paths sharing a prefix share one subtree.

use std::convert::Infallible;
use std::str::FromStr;

use indexmap::IndexMap;

/// One level of an inclusion tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionNode {
    include: bool,
    children: IndexMap<String, InclusionNode>,
}

impl InclusionNode {
    /// A node whose resources are added to `included`.
    pub fn included() -> Self {
        Self {
            include: true,
            children: IndexMap::new(),
        }
    }

    /// A node that is only traversed to reach deeper includes.
    pub fn pass_through() -> Self {
        Self::default()
    }

    /// Add a child node.
    pub fn with_child(mut self, name: impl Into<String>, child: InclusionNode) -> Self {
        self.children.insert(name.into(), child);
        self
    }

    /// Check whether resources reached at this node are included.
    pub fn is_included(&self) -> bool {
        self.include
    }

    /// Check if there are deeper includes.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Get a child node by field name.
    pub fn get(&self, name: &str) -> Option<&InclusionNode> {
        self.children.get(name)
    }

    /// Iterate over `(field name, child)` pairs in first-requested order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &InclusionNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Names of the children that are themselves included.
    ///
    /// A resource reached at this node carries relationship linkage for
    /// exactly these names.
    pub fn linkage_names(&self) -> Vec<String> {
        self.children
            .iter()
            .filter(|(_, node)| node.include)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn insert_segments<'a>(&mut self, mut segments: impl Iterator<Item = &'a str>) {
        if let Some(segment) = segments.next() {
            let child = self.children.entry(segment.to_string()).or_default();
            child.include = true;
            child.insert_segments(segments);
        }
    }

    fn merge(&mut self, other: InclusionNode) {
        self.include |= other.include;
        for (name, node) in other.children {
            self.children.entry(name).or_default().merge(node);
        }
    }
}

/// Parsed include paths.
///
/// ```rust
/// use sideload_core::InclusionTree;
///
/// let tree = InclusionTree::parse(["comments.author", "comments.post", "author"]);
///
/// assert!(tree.contains("comments"));
/// assert!(tree.contains("comments.author"));
/// assert_eq!(tree.linkage_names(), vec!["comments", "author"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionTree {
    root: InclusionNode,
}

impl InclusionTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of dot-separated paths.
    pub fn parse<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.add_path(path.as_ref());
        }
        tree
    }

    /// Add one dot-separated path. Whitespace around segments is trimmed.
    pub fn add_path(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        self.root.insert_segments(path.split('.').map(str::trim));
    }

    /// Merge another tree into this one, unioning shared subtrees.
    pub fn merge(mut self, other: InclusionTree) -> Self {
        self.root.merge(other.root);
        self
    }

    /// The synthetic root; its children are the top-level field names.
    pub fn root(&self) -> &InclusionNode {
        &self.root
    }

    /// Look up the node for a dot-separated path.
    pub fn get(&self, path: &str) -> Option<&InclusionNode> {
        path.split('.')
            .try_fold(&self.root, |node, segment| node.get(segment.trim()))
    }

    /// Check if a dot-separated path is present.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Top-level field names that are included.
    pub fn linkage_names(&self) -> Vec<String> {
        self.root.linkage_names()
    }

    /// Check if no paths were requested.
    pub fn is_empty(&self) -> bool {
        !self.root.has_children()
    }

    /// Get the number of top-level includes.
    pub fn len(&self) -> usize {
        self.root.children.len()
    }
}

impl FromStr for InclusionTree {
    type Err = Infallible;

    /// Parse a comma-separated list of paths, e.g. `"comments,comments.author"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s.split(',')))
    }
}

impl<S: AsRef<str>> FromIterator<S> for InclusionTree {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::parse(iter)
    }
}

/// Split comma-separated entries, trim them, and drop blanks and duplicates
/// while keeping first-seen order.
pub fn normalize_paths<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paths: Vec<String> = Vec::new();
    for entry in entries {
        for path in entry.as_ref().split(',').map(str::trim) {
            if !path.is_empty() && !paths.iter().any(|p| p == path) {
                paths.push(path.to_string());
            }
        }
    }
    paths
}
