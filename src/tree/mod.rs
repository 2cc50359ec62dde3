//! Arena-backed tree of timing counters.
//!
//! A [`CallTree`] owns every [`Node`] in a flat vector. Children are reached
//! through a name-ordered map of [`NodeId`]s and each node keeps the id of its
//! parent so that an invocation can be added to the whole ancestor chain. The
//! parent id is only a back reference: nodes are owned by the arena, never by
//! their parent, so dropping a tree of any depth is a single `Vec` drop.
//!
//! Copy and subtract walk the tree with an explicit stack, so deeply nested
//! categories cannot overflow the call stack.

use std::collections::BTreeMap;

use crate::types::Micros;

/// Display name of the root node in reports.
pub const ROOT_NAME: &str = "/";

/// Path separator between nested node names.
pub const PATH_SEPARATOR: char = '/';

/// Index of a node inside the [`CallTree`] that created it.
///
/// Ids are only meaningful for the tree that returned them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One accounting unit: how often a path was entered and for how long.
#[derive(Clone, Debug, Default)]
pub struct Node {
    calls: i64,
    total_us: Micros,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
}

impl Node {
    fn with_parent(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    /// Number of recorded invocations at or below this node.
    pub fn calls(&self) -> i64 {
        self.calls
    }

    /// Accumulated duration of those invocations in microseconds.
    pub fn total_us(&self) -> Micros {
        self.total_us
    }

    /// Mean duration per call, or zero when nothing was recorded.
    pub fn average_us(&self) -> Micros {
        if self.calls > 0 {
            self.total_us / self.calls
        } else {
            0
        }
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in name order.
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Names of the direct children in order.
    pub fn child_names(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    /// Whether the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Tree of counters rooted at an unnamed node.
#[derive(Clone, Debug)]
pub struct CallTree {
    nodes: Vec<Node>,
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CallTree {
    /// Creates a tree holding only an empty root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::with_parent(None)],
        }
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Looks up a direct child without creating it.
    pub fn get_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent).children.get(name).copied()
    }

    /// Returns the child named `name`, creating an empty one if absent.
    pub fn child(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(id) = self.get_child(parent, name) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::with_parent(Some(parent)));
        self.nodes[parent.index()]
            .children
            .insert(name.to_owned(), id);
        id
    }

    /// Resolves a `/`-separated path below the root; empty segments are skipped.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        path.split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root(), |id, segment| self.get_child(id, segment))
    }

    /// Adds one call of `duration_us` to `id` and to every ancestor of `id`.
    ///
    /// Negative durations count as zero and counters saturate at
    /// [`Micros::MAX`], so every ancestor sees the same update.
    pub fn add_invocation(&mut self, id: NodeId, duration_us: Micros) {
        let duration_us = duration_us.max(0);
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &mut self.nodes[current.index()];
            node.calls = node.calls.saturating_add(1);
            node.total_us = node.total_us.saturating_add(duration_us);
            cursor = node.parent;
        }
    }

    /// Records an invocation at `category/name`, creating both levels on demand.
    pub fn record(&mut self, category: &str, name: &str, duration_us: Micros) -> NodeId {
        let root = self.root();
        let category = self.child(root, category);
        let leaf = self.child(category, name);
        self.add_invocation(leaf, duration_us);
        leaf
    }

    /// Copies the subtree under `id` into an independent tree rooted at that node.
    ///
    /// The copied root has no parent; counters and structure are preserved.
    pub fn copy_subtree(&self, id: NodeId) -> CallTree {
        let source = self.node(id);
        let mut out = CallTree {
            nodes: Vec::with_capacity(self.nodes.len()),
        };
        out.nodes.push(Node {
            calls: source.calls,
            total_us: source.total_us,
            parent: None,
            children: BTreeMap::new(),
        });
        let mut stack = vec![(id, out.root())];
        while let Some((src, dst)) = stack.pop() {
            for (name, child) in &self.nodes[src.index()].children {
                let from = &self.nodes[child.index()];
                let copy = NodeId(out.nodes.len() as u32);
                out.nodes.push(Node {
                    calls: from.calls,
                    total_us: from.total_us,
                    parent: Some(dst),
                    children: BTreeMap::new(),
                });
                out.nodes[dst.index()].children.insert(name.clone(), copy);
                stack.push((*child, copy));
            }
        }
        out
    }

    /// Subtracts `other`'s counters from this tree, matching nodes by name.
    ///
    /// The roots are always subtracted. Below them only children present on
    /// both sides are subtracted: a child missing from `other` keeps its
    /// absolute counters and children that only `other` has are ignored.
    pub fn subtract(&mut self, other: &CallTree) {
        let mut stack = vec![(self.root(), other.root())];
        while let Some((mine, theirs)) = stack.pop() {
            let subtrahend = other.node(theirs);
            let node = &mut self.nodes[mine.index()];
            node.calls = node.calls.saturating_sub(subtrahend.calls);
            node.total_us = node.total_us.saturating_sub(subtrahend.total_us);
            stack.extend(node.children.iter().filter_map(|(name, child)| {
                other.get_child(theirs, name).map(|matched| (*child, matched))
            }));
        }
    }

    /// Zeroes every counter and drops all children.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0] = Node::with_parent(None);
    }

    /// Depth-first, name-ordered traversal starting at the root.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![(self.root(), 0, String::new(), ROOT_NAME)],
        }
    }
}

/// Structural equality: same paths with the same counters in the same order.
impl PartialEq for CallTree {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.walk().zip(other.walk()).all(|(a, b)| {
                a.depth == b.depth
                    && a.path == b.path
                    && a.node.calls == b.node.calls
                    && a.node.total_us == b.node.total_us
            })
    }
}

impl Eq for CallTree {}

/// A node visited by [`CallTree::walk`].
#[derive(Debug)]
pub struct Visit<'a> {
    /// Distance from the root, which is depth zero.
    pub depth: usize,
    /// `/`-joined names from the root; empty for the root itself.
    pub path: String,
    /// Own name, [`ROOT_NAME`] for the root.
    pub name: &'a str,
    /// Id of the visited node.
    pub id: NodeId,
    /// The visited node.
    pub node: &'a Node,
}

impl Visit<'_> {
    /// Path for display, using [`ROOT_NAME`] for the root.
    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            ROOT_NAME
        } else {
            &self.path
        }
    }
}

/// Iterator returned by [`CallTree::walk`].
pub struct Walk<'a> {
    tree: &'a CallTree,
    stack: Vec<(NodeId, usize, String, &'a str)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth, path, name) = self.stack.pop()?;
        let node = self.tree.node(id);
        for (child_name, child) in node.children.iter().rev() {
            let child_path = if path.is_empty() {
                child_name.clone()
            } else {
                format!("{path}{PATH_SEPARATOR}{child_name}")
            };
            self.stack
                .push((*child, depth + 1, child_path, child_name.as_str()));
        }
        Some(Visit {
            depth,
            path,
            name,
            id,
            node,
        })
    }
}
