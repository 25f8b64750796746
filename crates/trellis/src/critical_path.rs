//! Maximal dependency chains through the live graph.
//!
//! A chain starts at a ticket nothing live depends on and follows dependency
//! edges downward until no live, unvisited dependency remains. The longest
//! chains are the ones most likely to gate delivery, so results are ranked
//! by length.

use std::collections::{HashMap, HashSet};

use crate::domain::Ticket;

/// Number of chains returned when the caller passes a limit of zero.
pub const DEFAULT_LIMIT: usize = 5;

/// Enumerate maximal dependency chains among live tickets, longest first.
///
/// Every maximal branch is its own chain: a diamond produces one chain per
/// side. A ticket already on the walk is never re-entered, so cycles shorten
/// chains rather than hang them; dangling dependency IDs are skipped. Ties
/// in length order lexicographically by the joined ID sequence. At most
/// `limit` chains are returned; zero selects [`DEFAULT_LIMIT`].
pub fn critical_paths(tickets: &[Ticket], limit: usize) -> Vec<Vec<String>> {
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };

    let live: HashMap<&str, &Ticket> = tickets
        .iter()
        .filter(|t| t.is_live())
        .map(|t| (t.id.as_str(), t))
        .collect();

    // Live dependencies per node, sorted for a deterministic walk.
    let mut deps_of: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut has_live_dependent: HashSet<&str> = HashSet::new();
    for (&id, ticket) in &live {
        let mut deps: Vec<&str> = ticket
            .dependencies
            .iter()
            .map(String::as_str)
            .filter(|d| *d != id && live.contains_key(d))
            .collect();
        deps.sort_unstable();
        deps.dedup();
        for &d in &deps {
            has_live_dependent.insert(d);
        }
        deps_of.insert(id, deps);
    }

    // Roots are live tickets nothing live depends on. A graph that is all
    // cycle has none; every node seeds a walk then.
    let mut roots: Vec<&str> = live
        .keys()
        .copied()
        .filter(|id| !has_live_dependent.contains(id))
        .collect();
    if roots.is_empty() {
        roots = live.keys().copied().collect();
    }
    roots.sort_unstable();

    let mut chains: Vec<Vec<String>> = Vec::new();
    let mut on_path: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();
    for root in roots {
        walk(root, &deps_of, &mut path, &mut on_path, &mut chains);
    }

    chains.sort();
    chains.dedup();
    chains.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.join(" ").cmp(&b.join(" "))));
    chains.truncate(limit);
    chains
}

fn walk<'a>(
    node: &'a str,
    deps_of: &HashMap<&'a str, Vec<&'a str>>,
    path: &mut Vec<&'a str>,
    on_path: &mut HashSet<&'a str>,
    chains: &mut Vec<Vec<String>>,
) {
    path.push(node);
    on_path.insert(node);

    let next: Vec<&str> = deps_of
        .get(node)
        .map(|deps| {
            deps.iter()
                .copied()
                .filter(|d| !on_path.contains(d))
                .collect()
        })
        .unwrap_or_default();

    if next.is_empty() {
        chains.push(path.iter().map(|s| s.to_string()).collect());
    } else {
        for dep in next {
            walk(dep, deps_of, path, on_path, chains);
        }
    }

    on_path.remove(node);
    path.pop();
}
