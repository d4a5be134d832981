//! Dependency-graph helpers backing [`super::PackageQuery::filter_leaves`] and
//! [`super::PackageQuery::filter_unneeded`].

use crate::internal::id::SolvableId;
use crate::pool::Pool;
use crate::solvmap::SolvableSet;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{Graph, NodeIndex};
use std::collections::{HashMap, VecDeque};

/// Builds a directed graph over `members`, with an edge `a -> b` whenever `a`
/// requires (or, if `install_weak_deps`, recommends) a reldep that `b` provides and
/// `b` is also in `members`.
fn build_requires_graph(
    pool: &Pool,
    members: &SolvableSet,
    install_weak_deps: bool,
) -> (Graph<SolvableId, ()>, HashMap<SolvableId, NodeIndex>) {
    let mut graph = Graph::<SolvableId, ()>::new();
    let mut node_of: HashMap<SolvableId, NodeIndex> = HashMap::new();
    for id in members.iter() {
        node_of.insert(id, graph.add_node(id));
    }

    for id in members.iter() {
        let pkg = pool.solvable(id).package();
        let mut reldeps: Vec<_> = pkg.edges.requires.clone();
        if install_weak_deps {
            reldeps.extend(pkg.edges.recommends.clone());
        }
        for reldep_id in reldeps {
            let Ok(providers) = pool.whatprovides_reldep(reldep_id) else {
                continue;
            };
            for provider in providers {
                if provider == id {
                    continue;
                }
                if let Some(&target) = node_of.get(&provider) {
                    graph.add_edge(node_of[&id], target, ());
                }
            }
        }
    }

    (graph, node_of)
}

/// Strongly connected components (via Kosaraju's algorithm) with no incoming edge
/// from a node outside the component: nothing left in `members` still depends on
/// them, so they are safe removal candidates.
fn leaf_components(pool: &Pool, members: &SolvableSet, install_weak_deps: bool) -> Vec<Vec<SolvableId>> {
    let (graph, _node_of) = build_requires_graph(pool, members, install_weak_deps);
    let sccs = kosaraju_scc(&graph);

    let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
    for (idx, component) in sccs.iter().enumerate() {
        for &node in component {
            component_of.insert(node, idx);
        }
    }

    let mut has_incoming = vec![false; sccs.len()];
    for edge in graph.edge_indices() {
        let (src, dst) = graph.edge_endpoints(edge).unwrap();
        let src_component = component_of[&src];
        let dst_component = component_of[&dst];
        if src_component != dst_component {
            has_incoming[dst_component] = true;
        }
    }

    sccs.into_iter()
        .enumerate()
        .filter(|(idx, _)| !has_incoming[*idx])
        .map(|(_, component)| component.into_iter().map(|node| graph[node]).collect())
        .collect()
}

pub(super) fn compute_leaves(pool: &Pool, members: &SolvableSet, install_weak_deps: bool) -> SolvableSet {
    let mut keep = SolvableSet::empty(pool.nsolvables());
    for component in leaf_components(pool, members, install_weak_deps) {
        for id in component {
            keep.add(id);
        }
    }
    keep
}

pub(super) fn compute_leaf_groups(
    pool: &Pool,
    members: &SolvableSet,
    install_weak_deps: bool,
) -> Vec<Vec<SolvableId>> {
    leaf_components(pool, members, install_weak_deps)
}

/// Every installed solvable reachable from `roots` by following requires edges
/// (through the resolved whatprovides index), including the roots themselves.
pub(super) fn dependency_closure(pool: &Pool, roots: &SolvableSet) -> SolvableSet {
    let mut visited = SolvableSet::empty(pool.nsolvables());
    let mut queue: VecDeque<SolvableId> = VecDeque::new();
    for id in roots.iter() {
        visited.add(id);
        queue.push_back(id);
    }

    while let Some(id) = queue.pop_front() {
        let pkg = pool.solvable(id).package();
        for &reldep_id in &pkg.edges.requires {
            let Ok(providers) = pool.whatprovides_reldep(reldep_id) else {
                continue;
            };
            for provider in providers {
                if !visited.contains(provider) {
                    visited.add(provider);
                    queue.push_back(provider);
                }
            }
        }
    }

    visited
}
