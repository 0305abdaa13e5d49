//! In-memory translation tree of one language.
//!
//! A [`TranslationTree`] maps key segments to either a leaf string or a
//! nested namespace. Entry order follows the source file, so a tree read
//! from JSON and written back keeps its key order.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::{Map, Value};

use crate::core::error::TreeError;
use crate::core::key::TranslationKey;

/// Kind of node found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Leaf,
    Namespace,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Leaf => "leaf",
            NodeKind::Namespace => "namespace",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(String),
    Namespace(TranslationTree),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Namespace(_) => NodeKind::Namespace,
        }
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Namespace(_) => None,
        }
    }
}

/// Result of [`TranslationTree::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Leaf(&'a str),
    Namespace(&'a TranslationTree),
    Absent,
}

impl Lookup<'_> {
    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            Lookup::Leaf(_) => Some(NodeKind::Leaf),
            Lookup::Namespace(_) => Some(NodeKind::Namespace),
            Lookup::Absent => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Lookup::Leaf(_))
    }
}

/// Nested key → string definitions. Equality compares content, not entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTree {
    entries: IndexMap<String, Node>,
}

impl TranslationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a JSON object.
    ///
    /// Strings become leaves, objects become namespaces. Numbers and booleans
    /// are kept as leaves holding their JSON text, arrays become namespaces
    /// keyed by element index, and `null` values and empty key names are
    /// dropped.
    pub fn from_json(map: &Map<String, Value>) -> Self {
        let mut tree = Self::new();
        for (name, value) in map {
            if name.is_empty() {
                tracing::debug!("skipping entry with an empty key name");
                continue;
            }
            if let Some(node) = node_from_json(value) {
                tree.entries.insert(name.clone(), node);
            }
        }
        tree
    }

    /// Build a tree from a JSON object whose entry names may hold several
    /// segments joined by `separator`.
    ///
    /// `{"home.title": "Home"}` and `{"home": {"title": "Home"}}` load to the
    /// same tree, and flat and nested entries for one namespace merge. A name
    /// that would split into an empty segment (`"Loading..."`) stays a single
    /// segment. Entries that disagree on shape fail with a shape conflict.
    pub fn from_json_split(map: &Map<String, Value>, separator: &str) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for (name, value) in map {
            if name.is_empty() {
                tracing::debug!("skipping entry with an empty key name");
                continue;
            }
            let node = match value {
                Value::Object(inner) => Node::Namespace(Self::from_json_split(inner, separator)?),
                other => match node_from_json(other) {
                    Some(node) => node,
                    None => continue,
                },
            };
            merge_node(&mut tree, name, &[], &split_name(name, separator), node)?;
        }
        Ok(tree)
    }

    /// Build a tree from flat `(key, value)` pairs.
    ///
    /// A later duplicate overwrites an earlier value; entries that disagree
    /// on shape (`a` and `a.b` both leaves) fail with a shape conflict.
    pub fn from_flat<I>(entries: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (TranslationKey, String)>,
    {
        let mut tree = Self::new();
        for (key, value) in entries {
            tree.set(&key, value)?;
        }
        Ok(tree)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn get(&self, key: &TranslationKey) -> Lookup<'_> {
        match self.get_node(key) {
            Some(Node::Leaf(value)) => Lookup::Leaf(value),
            Some(Node::Namespace(tree)) => Lookup::Namespace(tree),
            None => Lookup::Absent,
        }
    }

    pub fn get_node(&self, key: &TranslationKey) -> Option<&Node> {
        let (last, prefix) = key.segments().split_last()?;
        let mut current = self;
        for segment in prefix {
            match current.entries.get(segment)? {
                Node::Namespace(child) => current = child,
                Node::Leaf(_) => return None,
            }
        }
        current.entries.get(last)
    }

    /// Set a leaf value, creating intermediate namespaces.
    ///
    /// Returns the previous value when the leaf already existed.
    pub fn set(
        &mut self,
        key: &TranslationKey,
        value: impl Into<String>,
    ) -> Result<Option<String>, TreeError> {
        let current = self.namespace_for(key)?;
        let last = key.leaf_name();
        match current.entries.get_mut(last) {
            Some(Node::Leaf(existing)) => Ok(Some(std::mem::replace(existing, value.into()))),
            Some(Node::Namespace(_)) => Err(TreeError::ShapeConflict {
                key: key.to_string(),
                at: key.to_string(),
                found: NodeKind::Namespace.as_str(),
            }),
            None => {
                current.entries.insert(last.to_string(), Node::Leaf(value.into()));
                Ok(None)
            }
        }
    }

    /// Put `node` at `key`, whatever was there before.
    ///
    /// An existing entry keeps its position. Fails only when a strict prefix
    /// of `key` is a leaf.
    pub fn replace(&mut self, key: &TranslationKey, node: Node) -> Result<Option<Node>, TreeError> {
        let current = self.namespace_for(key)?;
        Ok(current.entries.insert(key.leaf_name().to_string(), node))
    }

    /// Remove a leaf. Namespaces emptied by the removal are removed as well,
    /// up to the root.
    pub fn delete(&mut self, key: &TranslationKey) -> Option<String> {
        match remove_node(self, key.segments(), true)? {
            Node::Leaf(value) => Some(value),
            Node::Namespace(_) => None,
        }
    }

    /// Remove any node (leaf or namespace) with the same pruning as [`Self::delete`].
    pub fn remove(&mut self, key: &TranslationKey) -> Option<Node> {
        remove_node(self, key.segments(), false)
    }

    /// Lazy depth-first iterator over leaves in entry order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            stack: vec![self.entries.iter()],
            path: Vec::new(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    pub fn leaf_paths(&self) -> BTreeSet<TranslationKey> {
        self.leaves().map(|(key, _)| key).collect()
    }

    pub fn namespace_paths(&self) -> BTreeSet<TranslationKey> {
        self.node_paths()
            .into_iter()
            .filter(|(_, kind)| *kind == NodeKind::Namespace)
            .map(|(key, _)| key)
            .collect()
    }

    /// Every node path with its kind, depth-first in entry order.
    pub fn node_paths(&self) -> Vec<(TranslationKey, NodeKind)> {
        let mut out = Vec::new();
        collect_nodes(self, &mut Vec::new(), &mut out);
        out
    }

    /// Nested JSON object in entry order.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, node) in &self.entries {
            let value = match node {
                Node::Leaf(value) => Value::String(value.clone()),
                Node::Namespace(child) => child.to_json(),
            };
            map.insert(name.clone(), value);
        }
        Value::Object(map)
    }

    /// Copy with every level sorted by key name.
    pub fn sorted(&self) -> Self {
        let mut entries: IndexMap<String, Node> = self
            .entries
            .iter()
            .map(|(name, node)| {
                let node = match node {
                    Node::Leaf(value) => Node::Leaf(value.clone()),
                    Node::Namespace(child) => Node::Namespace(child.sorted()),
                };
                (name.clone(), node)
            })
            .collect();
        entries.sort_keys();
        Self { entries }
    }

    /// Walk to the namespace that holds the last segment of `key`, creating
    /// missing namespaces on the way.
    fn namespace_for(&mut self, key: &TranslationKey) -> Result<&mut TranslationTree, TreeError> {
        let segments = key.segments();
        let prefix = &segments[..segments.len().saturating_sub(1)];
        let mut current = self;
        for (depth, segment) in prefix.iter().enumerate() {
            let node = current
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Node::Namespace(TranslationTree::new()));
            match node {
                Node::Namespace(child) => current = child,
                Node::Leaf(_) => {
                    return Err(TreeError::ShapeConflict {
                        key: key.to_string(),
                        at: segments[..=depth].join("."),
                        found: NodeKind::Leaf.as_str(),
                    });
                }
            }
        }
        Ok(current)
    }
}

fn node_from_json(value: &Value) -> Option<Node> {
    match value {
        Value::String(s) => Some(Node::Leaf(s.clone())),
        Value::Number(n) => Some(Node::Leaf(n.to_string())),
        Value::Bool(b) => Some(Node::Leaf(b.to_string())),
        Value::Null => None,
        Value::Object(map) => Some(Node::Namespace(TranslationTree::from_json(map))),
        Value::Array(items) => {
            let mut tree = TranslationTree::new();
            for (index, item) in items.iter().enumerate() {
                if let Some(node) = node_from_json(item) {
                    tree.entries.insert(index.to_string(), node);
                }
            }
            Some(Node::Namespace(tree))
        }
    }
}

fn split_name(name: &str, separator: &str) -> Vec<String> {
    let parts: Vec<&str> = if separator.is_empty() {
        Vec::new()
    } else {
        name.split(separator).collect()
    };
    if parts.len() < 2 || parts.iter().any(|part| part.is_empty()) {
        return vec![name.to_string()];
    }
    parts.into_iter().map(str::to_string).collect()
}

/// Insert `node` at `segments` below `at`. Namespaces merge, a leaf replaces
/// a leaf, anything else is a shape conflict reported against `name`.
fn merge_node(
    tree: &mut TranslationTree,
    name: &str,
    at: &[String],
    segments: &[String],
    node: Node,
) -> Result<(), TreeError> {
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };
    let conflict = |path: &[String], found: NodeKind| TreeError::ShapeConflict {
        key: name.to_string(),
        at: path.join("."),
        found: found.as_str(),
    };

    let mut path = at.to_vec();
    let mut current = tree;
    for segment in parents {
        path.push(segment.clone());
        match current
            .entries
            .entry(segment.clone())
            .or_insert_with(|| Node::Namespace(TranslationTree::new()))
        {
            Node::Namespace(child) => current = child,
            Node::Leaf(_) => return Err(conflict(&path, NodeKind::Leaf)),
        }
    }
    path.push(last.clone());

    match current.entries.entry(last.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(node);
        }
        Entry::Occupied(mut slot) => match (slot.get_mut(), node) {
            (Node::Leaf(existing), Node::Leaf(value)) => *existing = value,
            (Node::Namespace(existing), Node::Namespace(incoming)) => {
                for (child_name, child) in incoming.entries {
                    merge_node(existing, name, &path, std::slice::from_ref(&child_name), child)?;
                }
            }
            (found, _) => return Err(conflict(&path, found.kind())),
        },
    }
    Ok(())
}

fn remove_node(tree: &mut TranslationTree, segments: &[String], leaf_only: bool) -> Option<Node> {
    let (first, rest) = segments.split_first()?;
    if rest.is_empty() {
        if leaf_only && !matches!(tree.entries.get(first), Some(Node::Leaf(_))) {
            return None;
        }
        return tree.entries.shift_remove(first);
    }

    let Some(Node::Namespace(child)) = tree.entries.get_mut(first) else {
        return None;
    };
    let removed = remove_node(child, rest, leaf_only)?;
    if child.is_empty() {
        tree.entries.shift_remove(first);
    }
    Some(removed)
}

fn collect_nodes<'a>(
    tree: &'a TranslationTree,
    path: &mut Vec<&'a str>,
    out: &mut Vec<(TranslationKey, NodeKind)>,
) {
    for (name, node) in &tree.entries {
        path.push(name);
        out.push((TranslationKey::from_tree_path(path), node.kind()));
        if let Node::Namespace(child) = node {
            collect_nodes(child, path, out);
        }
        path.pop();
    }
}

/// Iterator returned by [`TranslationTree::leaves`].
pub struct Leaves<'a> {
    stack: Vec<indexmap::map::Iter<'a, String, Node>>,
    path: Vec<&'a str>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (TranslationKey, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.last_mut()?.next() {
                Some((name, Node::Leaf(value))) => {
                    self.path.push(name);
                    let key = TranslationKey::from_tree_path(&self.path);
                    self.path.pop();
                    return Some((key, value.as_str()));
                }
                Some((name, Node::Namespace(child))) => {
                    self.path.push(name);
                    self.stack.push(child.entries.iter());
                }
                None => {
                    self.stack.pop();
                    self.path.pop();
                }
            }
        }
    }
}
