//! Route Node Tree Model
//!
//! Uniform in-memory representation of one route: an arena of [`RouteNode`]s
//! addressed by [`NodeId`]. Ownership flows root-to-leaf through each node's
//! `children`; the `parent` link is a plain index used only for navigation.
//!
//! Every tree owns its order counter. Orders are handed out by
//! [`RouteTree::create_node`] and, read in pre-order, must reproduce creation
//! order (see [`RouteTree::verify_order`]).

use crate::result::{RouteCoverageError, RouteCoverageResult};
use serde::Serialize;

/// Index of a node inside its [`RouteTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One routing step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteNode {
    /// Routing-step keyword (e.g. "to", "choice")
    pub name: String,
    /// Creation order within the owning tree
    pub order: u32,
    /// Route id, inherited from the root
    pub route_id: Option<String>,
    /// Source file, inherited from the root
    pub source_file: Option<String>,
    /// First line of the step in its source (1-indexed)
    pub line_start: Option<usize>,
    /// Last line of the step in its source (1-indexed)
    pub line_end: Option<usize>,
    #[serde(skip)]
    parent: Option<NodeId>,
    #[serde(skip)]
    children: Vec<NodeId>,
}

impl RouteNode {
    /// Parent of this node, `None` for the root
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in traversal order
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// An ordered tree of routing steps rooted at the route's entry point
#[derive(Debug, Clone)]
pub struct RouteTree {
    nodes: Vec<RouteNode>,
    next_order: u32,
}

impl RouteTree {
    /// Create a tree whose root gets order 0
    #[must_use]
    pub fn new(root_name: &str) -> Self {
        Self::with_start_order(root_name, 0)
    }

    /// Create a tree whose root gets `start` as its order
    #[must_use]
    pub fn with_start_order(root_name: &str, start: u32) -> Self {
        let root = RouteNode {
            name: root_name.to_string(),
            order: start,
            route_id: None,
            source_file: None,
            line_start: None,
            line_end: None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            next_order: start.saturating_add(1),
        }
    }

    /// The root node id
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The root node
    #[must_use]
    pub fn root_node(&self) -> &RouteNode {
        &self.nodes[0]
    }

    /// Route id of the tree (stored on the root)
    #[must_use]
    pub fn route_id(&self) -> Option<&str> {
        self.root_node().route_id.as_deref()
    }

    /// Source file of the tree (stored on the root)
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.root_node().source_file.as_deref()
    }

    /// Number of nodes, root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has its root, so it is never empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> &RouteNode {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, id: NodeId) -> &mut RouteNode {
        &mut self.nodes[id.0]
    }

    /// Create a detached node under `parent`.
    ///
    /// The node takes the next order value and inherits the parent's route id
    /// and source file. It is not listed among the parent's children until
    /// [`append_child`](Self::append_child) or
    /// [`prepend_child`](Self::prepend_child) is called.
    pub fn create_node(&mut self, parent: NodeId, name: &str) -> NodeId {
        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        let (route_id, source_file) = {
            let p = &self.nodes[parent.0];
            (p.route_id.clone(), p.source_file.clone())
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(RouteNode {
            name: name.to_string(),
            order,
            route_id,
            source_file,
            line_start: None,
            line_end: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        id
    }

    /// Add `child` after the existing children of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Add `child` before the existing children of `parent`.
    ///
    /// Used while assembling a chain that is walked from its last call backward.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    /// Create a node and append it to `parent`
    pub fn add_node(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.create_node(parent, name);
        self.append_child(parent, id);
        id
    }

    /// Set the route id on the root and every node created so far
    pub fn set_route_id(&mut self, route_id: Option<&str>) {
        for node in &mut self.nodes {
            node.route_id = route_id.map(str::to_string);
        }
    }

    /// Set the source file on the root and every node created so far
    pub fn set_source_file(&mut self, file: Option<&str>) {
        for node in &mut self.nodes {
            node.source_file = file.map(str::to_string);
        }
    }

    /// Set the line span of a node
    pub fn set_lines(&mut self, id: NodeId, start: Option<usize>, end: Option<usize>) {
        let node = &mut self.nodes[id.0];
        node.line_start = start;
        node.line_end = end;
    }

    /// Depth of a node (root is 0)
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent;
        while let Some(p) = current {
            depth += 1;
            current = self.nodes[p.0].parent;
        }
        depth
    }

    /// Pre-order walk: a node before its children, children in stored order
    #[must_use]
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![(self.root(), 0)],
        }
    }

    /// Check that pre-order reproduces creation order
    pub fn verify_order(&self) -> RouteCoverageResult<()> {
        let mut previous: Option<u32> = None;
        for (id, _) in self.pre_order() {
            let order = self.node(id).order;
            if let Some(prev) = previous {
                if order <= prev {
                    return Err(RouteCoverageError::OrderViolation {
                        expected_after: prev,
                        found: order,
                    });
                }
            }
            previous = Some(order);
        }
        Ok(())
    }

    /// Human-readable rendering, one `"<order>\t<indent><name>"` line per node
    #[must_use]
    pub fn dump(&self, indent_unit: usize) -> String {
        self.pre_order()
            .map(|(id, level)| {
                let node = self.node(id);
                format!("{}\t{}{}", node.order, " ".repeat(indent_unit * level), node.name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Iterator over `(node, depth)` in pre-order
#[derive(Debug)]
pub struct PreOrder<'a> {
    tree: &'a RouteTree,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for PreOrder<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let children = &self.tree.node(id).children;
        self.stack
            .extend(children.iter().rev().map(|&child| (child, depth + 1)));
        Some((id, depth))
    }
}
