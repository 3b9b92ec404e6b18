use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use super::dag::{Dag, NodeId, NodeKind};
use crate::error::Error;

/// Statistics about the shape of a search structure.
///
/// Shared nodes are only counted once.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub x_node_count: usize,
    pub y_node_count: usize,
    pub trapezoid_count: usize,
    /// Largest number of parents of a single node.
    pub max_parent_count: usize,
    /// Length of the longest path from the root.
    pub max_depth: usize,
    /// Mean length of the longest path from the root to each trapezoid.
    pub mean_trapezoid_depth: f64,
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} x-nodes, {} y-nodes, {} trapezoids, max parent count {}, max depth {}, mean trapezoid depth {:.2}",
            self.x_node_count,
            self.y_node_count,
            self.trapezoid_count,
            self.max_parent_count,
            self.max_depth,
            self.mean_trapezoid_depth
        )
    }
}

impl Dag {
    pub(crate) fn stats(&self) -> Result<Stats, Error> {
        let order = self.topological_order()?;
        let mut depths: HashMap<NodeId, usize> = HashMap::with_capacity(order.len());
        let mut stats = Stats {
            x_node_count: 0,
            y_node_count: 0,
            trapezoid_count: 0,
            max_parent_count: 0,
            max_depth: 0,
            mean_trapezoid_depth: 0.,
        };
        let mut trapezoid_depths = 0;

        // Parents come first, so the depth of a node is final when it is reached
        for id in order {
            let node = self.node(id)?;
            let depth = depths.get(&id).copied().unwrap_or(0);
            stats.max_parent_count = stats.max_parent_count.max(node.parents.len());
            stats.max_depth = stats.max_depth.max(depth);
            match node.kind {
                NodeKind::X { .. } => stats.x_node_count += 1,
                NodeKind::Y { .. } => stats.y_node_count += 1,
                NodeKind::Trap(..) => {
                    stats.trapezoid_count += 1;
                    trapezoid_depths += depth;
                }
            }
            for child in node.children().into_iter().flatten() {
                let child_depth = depths.entry(child).or_insert(0);
                *child_depth = (*child_depth).max(depth + 1);
            }
        }

        if stats.trapezoid_count > 0 {
            stats.mean_trapezoid_depth = trapezoid_depths as f64 / stats.trapezoid_count as f64;
        }
        Ok(stats)
    }

    /// Writes the nodes below the root, one per line and indented by depth. Shared nodes are
    /// written every time they are reached.
    pub(crate) fn dump(&self) -> Result<String, Error> {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id)?;
            let indent = "  ".repeat(depth);
            let line = match &node.kind {
                NodeKind::X { point, .. } => format!("{}X {}\n", indent, point),
                NodeKind::Y { edge, .. } => format!("{}Y {}\n", indent, edge),
                NodeKind::Trap(trap) => format!("{}{}\n", indent, trap),
            };
            out.push_str(&line);
            // Pushed in reverse so that left and below are written first
            for child in node.children().into_iter().flatten().rev() {
                stack.push((child, depth + 1));
            }
        }
        Ok(out)
    }

    /// Compares two DAGs by value, starting from their roots.
    pub(crate) fn structurally_eq(&self, other: &Dag) -> bool {
        let mut compared = HashSet::new();
        let mut stack = vec![(self.root(), other.root())];
        while let Some((id, other_id)) = stack.pop() {
            if !compared.insert((id, other_id)) {
                continue;
            }
            let (Some(node), Some(other_node)) = (self.get(id), other.get(other_id)) else {
                return false;
            };
            match (&node.kind, &other_node.kind) {
                (
                    NodeKind::X { point, left, right },
                    NodeKind::X {
                        point: other_point,
                        left: other_left,
                        right: other_right,
                    },
                ) if point == other_point => {
                    stack.push((*left, *other_left));
                    stack.push((*right, *other_right));
                }
                (
                    NodeKind::Y { edge, below, above },
                    NodeKind::Y {
                        edge: other_edge,
                        below: other_below,
                        above: other_above,
                    },
                ) if edge == other_edge => {
                    stack.push((*below, *other_below));
                    stack.push((*above, *other_above));
                }
                (NodeKind::Trap(trap), NodeKind::Trap(other_trap))
                    if trap.same_bounds(other_trap) => {}
                _ => return false,
            }
        }
        true
    }
}
