//! Layered layout for the live dependency graph.
//!
//! Produces the drawing structure for a board view: tickets bucketed into
//! layers so that dependencies sit in shallower layers than their dependants,
//! plus the full edge list. The input edge set may contain cycles, duplicate
//! and dangling dependency entries, and self-references; none of these fail
//! the layout. Output is deterministic for identical input.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::Ticket;

/// A directed edge from a dependant ticket to one of its dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    /// The ticket that depends
    pub from: String,
    /// The ticket depended upon
    pub to: String,
}

/// Result of a layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphLayout {
    /// Ticket IDs bucketed by depth, shallowest first. Within a layer the
    /// order is the final barycenter ordering.
    pub layers: Vec<Vec<String>>,
    /// All edges between laid-out tickets, sorted by (from, to).
    pub edges: Vec<LayoutEdge>,
}

impl GraphLayout {
    /// True when the live graph had nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Number of alternating barycenter sweeps applied to the seeded layers.
const BARYCENTER_SWEEPS: usize = 4;

/// Compute the layered layout of the live portion of a ticket snapshot.
///
/// Terminal tickets are dropped first, then tickets with no dependency edge
/// to or from another live ticket. Layer assignment peels leaves (tickets
/// whose remaining dependencies are all peeled) round by round; when a cycle
/// stalls a round, the lexicographically smallest remaining ID is peeled as
/// an honorary leaf. Layers are then re-tightened so every ticket sits one
/// past its deepest already-peeled dependency, which keeps edges pointing
/// from deeper to shallower layers everywhere except at forced cycle breaks.
pub fn layout_graph(tickets: &[Ticket]) -> GraphLayout {
    let live: HashMap<&str, &Ticket> = tickets
        .iter()
        .filter(|t| t.is_live())
        .map(|t| (t.id.as_str(), t))
        .collect();

    // Edges where both endpoints are live; self-references and duplicate
    // dependency entries collapse here. The edge set defines the node set,
    // so isolated tickets fall out for free.
    let mut edge_pairs: Vec<(&str, &str)> = Vec::new();
    for ticket in live.values() {
        for dep in &ticket.dependencies {
            if dep != &ticket.id && live.contains_key(dep.as_str()) {
                edge_pairs.push((ticket.id.as_str(), dep.as_str()));
            }
        }
    }
    edge_pairs.sort_unstable();
    edge_pairs.dedup();

    if edge_pairs.is_empty() {
        return GraphLayout::default();
    }

    // Arena: nodes sorted by ID so that index order is lexicographic order.
    let mut node_ids: Vec<&str> = edge_pairs
        .iter()
        .flat_map(|&(from, to)| [from, to])
        .collect();
    node_ids.sort_unstable();
    node_ids.dedup();
    let index_of: HashMap<&str, usize> =
        node_ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let n = node_ids.len();
    let mut deps: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(from, to) in &edge_pairs {
        let f = index_of[from];
        let t = index_of[to];
        deps[f].push(t);
        dependents[t].push(f);
    }

    // Leaf peeling. A node is ready once all of its dependencies are peeled;
    // a stalled round (every remaining node inside some cycle) force-peels
    // the smallest remaining index instead.
    let mut remaining = vec![true; n];
    let mut pending = deps.iter().map(Vec::len).collect::<Vec<_>>();
    let mut peel_order: Vec<usize> = Vec::with_capacity(n);
    while peel_order.len() < n {
        let ready: Vec<usize> = (0..n)
            .filter(|&i| remaining[i] && pending[i] == 0)
            .collect();
        let round = if ready.is_empty() {
            match (0..n).find(|&i| remaining[i]) {
                Some(forced) => vec![forced],
                None => break,
            }
        } else {
            ready
        };
        for i in round {
            remaining[i] = false;
            peel_order.push(i);
            for &d in &dependents[i] {
                if remaining[d] {
                    pending[d] = pending[d].saturating_sub(1);
                }
            }
        }
    }

    // Re-tighten in peel order: depth is one past the deepest dependency
    // peeled earlier. Dependencies peeled later belong to a broken cycle and
    // are ignored.
    let mut depth = vec![0usize; n];
    let mut placed = vec![false; n];
    for &i in &peel_order {
        depth[i] = deps[i]
            .iter()
            .filter(|&&d| placed[d])
            .map(|&d| depth[d] + 1)
            .max()
            .unwrap_or(0);
        placed[i] = true;
    }

    // Bucket by depth; iterating indices in order seeds each layer
    // alphabetically.
    let max_depth = depth.iter().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
    for i in 0..n {
        layers[depth[i]].push(i);
    }

    for sweep in 0..BARYCENTER_SWEEPS {
        if sweep % 2 == 0 {
            for li in 1..layers.len() {
                let (below, layer) = {
                    let (head, tail) = layers.split_at_mut(li);
                    (&head[li - 1], &mut tail[0])
                };
                reorder_by_barycenter(layer, below, &deps);
            }
        } else {
            for li in (0..layers.len().saturating_sub(1)).rev() {
                let (layer, above) = {
                    let (head, tail) = layers.split_at_mut(li + 1);
                    (&mut head[li], &tail[0])
                };
                reorder_by_barycenter(layer, above, &dependents);
            }
        }
    }

    let layers = layers
        .into_iter()
        .map(|layer| layer.into_iter().map(|i| node_ids[i].to_string()).collect())
        .collect();
    let edges = edge_pairs
        .into_iter()
        .map(|(from, to)| LayoutEdge {
            from: from.to_string(),
            to: to.to_string(),
        })
        .collect();

    GraphLayout { layers, edges }
}

/// Stable-sort `layer` by the mean position of each node's neighbors in the
/// adjacent, already-ordered layer. Nodes with no neighbor there keep their
/// relative order after all nodes that have one.
fn reorder_by_barycenter(layer: &mut [usize], adjacent: &[usize], neighbors: &[Vec<usize>]) {
    let position: HashMap<usize, usize> =
        adjacent.iter().enumerate().map(|(pos, &i)| (i, pos)).collect();

    let barycenter = |node: usize| -> Option<f64> {
        let positions: Vec<usize> = neighbors[node]
            .iter()
            .filter_map(|d| position.get(d).copied())
            .collect();
        if positions.is_empty() {
            None
        } else {
            Some(positions.iter().sum::<usize>() as f64 / positions.len() as f64)
        }
    };

    layer.sort_by(|&a, &b| match (barycenter(a), barycenter(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
