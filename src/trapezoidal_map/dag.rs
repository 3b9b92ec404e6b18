use anyhow::{anyhow, ensure};
use smallvec::SmallVec;
use std::{collections::HashSet, fmt::Display};

use super::trapezoid::Trapezoid;
use crate::edge::Edge;
use crate::error::{Degeneracy, Error};
use crate::point::{Point, Positioning};

/// A Directed Acyclic Graph (DAG) of x-, y- and trapezoid-nodes.
///
/// It turns out this is the kind of graph you need to represent a trapezoidal map. A tree won't cut
/// it because some nodes need to have multiple parents. This happens notably when a new edge crosses
/// multiple trapezoids, in which case these trapezoids are replaced with y-nodes that may share a
/// common child trapezoid-node.
///
/// These kinds of graphs are generally implemented using pointers, but this is not very practical
/// or idiomatic in Rust, so here it is implemented using an arena. This means that it is actually
/// backed by a simple [`Vec`], and we keep track of the nodes using [`NodeId`]s. Each node knows its
/// parents, which act as a reference count: a node is released as soon as it has no parent left,
/// and its slot is recycled for the next node.
///
/// Note: This implementation is influenced by:
/// - [This blog post](https://dev.to/deciduously/no-more-tears-no-more-knots-arena-allocated-trees-in-rust-44k6)
/// - [indextree](https://crates.io/crates/indextree)
#[derive(Debug, Clone)]
pub(crate) struct Dag {
    arena: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
}

/// Handle to a node of the search structure.
///
/// Trapezoids live in the trapezoid-nodes, so the id of a trapezoid-node is also the id of its
/// trapezoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the DAG.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parents: SmallVec<[NodeId; 2]>,
}

/// The three kinds of nodes of a trapezoidal map.
///
/// The inner nodes can only be x- and y-nodes, while the leaf nodes can only be trapezoid-nodes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Splits the plane at a vertex: `left` holds what is left of `point`, `right` the rest.
    X {
        point: Point,
        left: NodeId,
        right: NodeId,
    },
    /// Splits the plane along an edge.
    Y {
        edge: Edge,
        below: NodeId,
        above: NodeId,
    },
    /// A cell of the decomposition.
    Trap(Trapezoid),
}

impl NodeKind {
    fn children(&self) -> Option<[NodeId; 2]> {
        match *self {
            NodeKind::X { left, right, .. } => Some([left, right]),
            NodeKind::Y { below, above, .. } => Some([below, above]),
            NodeKind::Trap(..) => None,
        }
    }
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parents: SmallVec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// The two children of an x- or y-node.
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.kind.children()
    }

    pub fn trapezoid(&self) -> Option<&Trapezoid> {
        match &self.kind {
            NodeKind::Trap(trap) => Some(trap),
            _ => None,
        }
    }

    pub fn has_child(&self, child: NodeId) -> bool {
        self.children().map_or(false, |children| children.contains(&child))
    }

    pub fn has_parent(&self, parent: NodeId) -> bool {
        self.parents.contains(&parent)
    }
}

fn corrupted(msg: impl Into<String>) -> Error {
    Error::Corrupted(msg.into())
}

impl Dag {
    /// Constructs a new DAG whose root is a trapezoid-node.
    pub(crate) fn new(trap: Trapezoid) -> Self {
        Dag {
            arena: vec![Some(Node::new(NodeKind::Trap(trap)))],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    /// Makes a parentless node the new root.
    pub(crate) fn set_root(&mut self, id: NodeId) -> Result<(), Error> {
        if !self.node(id)?.parents.is_empty() {
            return Err(corrupted(format!("root {} cannot have parents", id)));
        }
        self.root = id;
        Ok(())
    }

    /// Returns the number of live nodes in the DAG.
    pub(crate) fn count(&self) -> usize {
        self.arena.len() - self.free.len()
    }

    /// Get a shared reference to the node with index `id`, if it exists.
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.get(id)
            .ok_or_else(|| corrupted(format!("node {} does not exist", id)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        self.get_mut(id)
            .ok_or_else(|| corrupted(format!("node {} does not exist", id)))
    }

    /// An iterator over the live nodes of the DAG.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.arena
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| node.as_ref().map(|node| (NodeId(idx), node)))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(idx) => {
                self.arena[idx] = Some(node);
                NodeId(idx)
            }
            None => {
                self.arena.push(Some(node));
                NodeId(self.arena.len() - 1)
            }
        }
    }

    /// Adds a new node to the DAG and registers it as a parent of its children.
    pub(crate) fn add(&mut self, kind: NodeKind) -> Result<NodeId, Error> {
        let children = kind.children();
        let id = self.alloc(Node::new(kind));
        for child in children.into_iter().flatten() {
            self.add_parent(child, id)?;
        }
        Ok(id)
    }

    /// Adds a new trapezoid-node. Returns the id of the node, which is also the id of the trapezoid.
    pub(crate) fn add_trap(&mut self, trap: Trapezoid) -> NodeId {
        self.alloc(Node::new(NodeKind::Trap(trap)))
    }

    pub(crate) fn trap(&self, id: NodeId) -> Result<&Trapezoid, Error> {
        self.node(id)?
            .trapezoid()
            .ok_or_else(|| corrupted(format!("node {} is not a trapezoid", id)))
    }

    pub(crate) fn trap_mut(&mut self, id: NodeId) -> Result<&mut Trapezoid, Error> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Trap(trap) => Ok(trap),
            _ => Err(corrupted(format!("node {} is not a trapezoid", id))),
        }
    }

    pub(crate) fn add_parent(&mut self, id: NodeId, parent: NodeId) -> Result<(), Error> {
        if id == parent {
            return Err(corrupted(format!("node {} cannot be its own parent", id)));
        }
        let node = self.node_mut(id)?;
        if node.has_parent(parent) {
            return Err(corrupted(format!("node {} already has parent {}", id, parent)));
        }
        node.parents.push(parent);
        Ok(())
    }

    /// Removes a parent from the node. Returns `true` if no parent remains.
    pub(crate) fn remove_parent(&mut self, id: NodeId, parent: NodeId) -> Result<bool, Error> {
        let node = self.node_mut(id)?;
        let pos = node
            .parents
            .iter()
            .position(|&p| p == parent)
            .ok_or_else(|| corrupted(format!("{} is not a parent of node {}", parent, id)))?;
        node.parents.remove(pos);
        Ok(node.parents.is_empty())
    }

    /// Makes `new` a child of `id` in place of `old`.
    pub(crate) fn replace_child(
        &mut self,
        id: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), Error> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::X { left: a, right: b, .. } | NodeKind::Y { below: a, above: b, .. } => {
                if *a == old {
                    *a = new;
                } else if *b == old {
                    *b = new;
                } else {
                    return Err(corrupted(format!("{} is not a child of node {}", old, id)));
                }
            }
            NodeKind::Trap(..) => {
                return Err(corrupted(format!("trapezoid-node {} has no children", id)))
            }
        }
        self.remove_parent(old, id)?;
        self.add_parent(new, id)
    }

    /// Replaces the node with `new` in all of its parents.
    ///
    /// Each parent is removed from the node as its child is replaced, so the node ends up with no
    /// parents at all.
    pub(crate) fn replace_with(&mut self, id: NodeId, new: NodeId) -> Result<(), Error> {
        loop {
            let Some(&parent) = self.node(id)?.parents.first() else {
                return Ok(());
            };
            self.replace_child(parent, id, new)?;
        }
    }

    /// Releases a node along with the descendants that are not shared with the rest of the DAG.
    ///
    /// A child is only released when the node being released was its last parent.
    pub(crate) fn release(&mut self, id: NodeId) -> Result<(), Error> {
        let mut to_release = vec![id];
        while let Some(id) = to_release.pop() {
            if !self.node(id)?.parents.is_empty() {
                return Err(corrupted(format!("node {} is released but has parents", id)));
            }
            let node = self
                .arena
                .get_mut(id.0)
                .and_then(Option::take)
                .ok_or_else(|| corrupted(format!("node {} does not exist", id)))?;
            self.free.push(id.0);
            for child in node.children().into_iter().flatten() {
                if self.remove_parent(child, id)? {
                    to_release.push(child);
                }
            }
        }
        Ok(())
    }

    /// Finds the node containing `point`.
    ///
    /// This is a trapezoid-node, unless the point is exactly on a vertex or an edge, in which case
    /// the search stops at the corresponding x- or y-node.
    pub(crate) fn search_point(&self, point: &Point) -> Result<NodeId, Error> {
        let mut id = self.root;
        loop {
            id = match &self.node(id)?.kind {
                NodeKind::Trap(..) => return Ok(id),
                NodeKind::X {
                    point: vertex,
                    left,
                    right,
                } => {
                    if point == vertex {
                        return Ok(id);
                    } else if point.is_right_of(vertex) {
                        *right
                    } else {
                        *left
                    }
                }
                NodeKind::Y { edge, below, above } => match edge.point_orientation(point) {
                    Positioning::On => return Ok(id),
                    Positioning::Left => *above,
                    Positioning::Right => *below,
                },
            }
        }
    }

    /// Finds the trapezoid containing the left endpoint of `edge`, i.e. the first trapezoid that
    /// the edge crosses.
    ///
    /// When the search meets an edge sharing an endpoint with `edge`, the position of the left
    /// endpoint is ambiguous and the slopes are compared instead.
    pub(crate) fn search_edge(&self, edge: &Edge) -> Result<NodeId, Error> {
        let mut id = self.root;
        loop {
            id = match &self.node(id)?.kind {
                NodeKind::Trap(..) => return Ok(id),
                NodeKind::X { point, left, right } => {
                    if edge.left == *point || edge.left.is_right_of(point) {
                        *right
                    } else {
                        *left
                    }
                }
                NodeKind::Y {
                    edge: other,
                    below,
                    above,
                } => {
                    let is_above = if edge.left == other.left {
                        // Common left endpoint: the steeper edge is above
                        let (slope, other_slope) = (edge.slope(), other.slope());
                        if slope == other_slope {
                            return Err(Degeneracy::CollinearEdges {
                                first: *other,
                                second: *edge,
                            }
                            .into());
                        }
                        slope > other_slope
                    } else if edge.right == other.right {
                        // Common right endpoint: the steeper edge is below
                        let (slope, other_slope) = (edge.slope(), other.slope());
                        if slope == other_slope {
                            return Err(Degeneracy::CollinearEdges {
                                first: *other,
                                second: *edge,
                            }
                            .into());
                        }
                        slope < other_slope
                    } else {
                        match other.point_orientation(&edge.left) {
                            Positioning::On => {
                                return Err(Degeneracy::PointOnEdge {
                                    point: edge.left,
                                    edge: *other,
                                }
                                .into())
                            }
                            Positioning::Left => true,
                            Positioning::Right => false,
                        }
                    };
                    if is_above {
                        *above
                    } else {
                        *below
                    }
                }
            }
        }
    }

    /// The nodes reachable from the root, parents first.
    pub(crate) fn topological_order(&self) -> Result<Vec<NodeId>, Error> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(self.root, false)];
        while let Some((id, finished)) = stack.pop() {
            if finished {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for child in self.node(id)?.children().into_iter().flatten().rev() {
                if !visited.contains(&child) {
                    stack.push((child, false));
                }
            }
        }
        order.reverse();
        Ok(order)
    }

    /// Checks that parents and children agree with each other, that every live node is reachable
    /// from the root, and that the trapezoids are consistent with their neighbours.
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        let root = self.node(self.root)?;
        ensure!(root.parents.is_empty(), "Root {} has parents", self.root);

        let reachable = self.topological_order()?;
        ensure!(
            reachable.len() == self.count(),
            "{} nodes are alive but only {} are reachable from the root",
            self.count(),
            reachable.len()
        );

        for &id in &reachable {
            let node = self.node(id)?;
            for (i, &parent) in node.parents.iter().enumerate() {
                ensure!(parent != id, "Node {} is its own parent", id);
                ensure!(
                    !node.parents[..i].contains(&parent),
                    "Node {} has parent {} twice",
                    id,
                    parent
                );
                let parent_node = self
                    .get(parent)
                    .ok_or_else(|| anyhow!("Parent {} of node {} does not exist", parent, id))?;
                ensure!(
                    parent_node.has_child(id),
                    "Parent {} is missing child {}",
                    parent,
                    id
                );
            }
            match node.children() {
                Some(children) => {
                    ensure!(
                        children[0] != children[1],
                        "Both children of node {} are {}",
                        id,
                        children[0]
                    );
                    for child in children {
                        ensure!(
                            self.node(child)?.has_parent(id),
                            "Child {} is missing parent {}",
                            child,
                            id
                        );
                    }
                }
                None => self.validate_trap(id)?,
            }
        }

        Ok(())
    }
}
