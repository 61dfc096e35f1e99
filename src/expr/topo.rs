//! Parameter-definition ordering.
//!
//! The definition table maps names to expressions that may reference other
//! defined names. Generated code declares one local per definition, so the
//! declarations must come out in dependency order. Names that are defined
//! nowhere are free model parameters and stay out of the ordering; they
//! become runtime table lookups.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::{ExprError, WeightExpr};

/// Order `defs` so every name appears after every defined name it
/// references. Ties resolve to table order, so the result is deterministic.
/// A dependency cycle is an error naming one parameter on the cycle.
pub fn toposort_params(defs: &[(String, WeightExpr)]) -> Result<Vec<String>, ExprError> {
    // Nodes are added in table order, so node index == table slot.
    let mut graph: DiGraph<(), ()> = DiGraph::new();
    let mut node_of: HashMap<&str, NodeIndex> = HashMap::new();
    for (name, _) in defs {
        node_of.insert(name.as_str(), graph.add_node(()));
    }
    for (name, body) in defs {
        for dep in body.params() {
            if let Some(&dep_node) = node_of.get(dep.as_str()) {
                graph.add_edge(dep_node, node_of[name.as_str()], ());
            }
        }
    }

    toposort(&graph, None)
        .map_err(|cycle| ExprError::Cycle(defs[cycle.node_id().index()].0.clone()))?;

    // The graph is acyclic; drain it smallest-slot-first.
    let mut indegree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(slot, _)| slot)
        .collect();
    let mut order = Vec::with_capacity(defs.len());
    while let Some(&slot) = ready.iter().next() {
        ready.remove(&slot);
        order.push(defs[slot].0.clone());
        for user in graph.neighbors_directed(NodeIndex::new(slot), Direction::Outgoing) {
            indegree[user.index()] -= 1;
            if indegree[user.index()] == 0 {
                ready.insert(user.index());
            }
        }
    }
    Ok(order)
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr;

    fn defs(pairs: &[(&str, WeightExpr)]) -> Vec<(String, WeightExpr)> {
        pairs
            .iter()
            .map(|(n, e)| (n.to_string(), e.clone()))
            .collect()
    }

    #[test]
    fn test_dependency_before_user() {
        let table = defs(&[
            ("match", expr::not(expr::param("gap"))),
            ("gap", expr::mul(expr::param("gapOpen"), expr::int(2))),
        ]);
        let order = toposort_params(&table).unwrap();
        assert_eq!(order, vec!["gap".to_string(), "match".to_string()]);
    }

    #[test]
    fn test_free_names_ignored() {
        // gapOpen is referenced but never defined: it must not show up.
        let table = defs(&[("gap", expr::param("gapOpen"))]);
        let order = toposort_params(&table).unwrap();
        assert_eq!(order, vec!["gap".to_string()]);
    }

    #[test]
    fn test_independent_defs_keep_table_order() {
        let table = defs(&[
            ("c", expr::dbl(0.3)),
            ("a", expr::dbl(0.1)),
            ("b", expr::dbl(0.2)),
        ]);
        let order = toposort_params(&table).unwrap();
        assert_eq!(
            order,
            vec!["c".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_chain_with_interleaved_free_names() {
        let table = defs(&[
            ("top", expr::add(expr::param("mid"), expr::param("freeA"))),
            ("mid", expr::mul(expr::param("base"), expr::param("freeB"))),
            ("base", expr::not(expr::param("freeC"))),
        ]);
        let order = toposort_params(&table).unwrap();
        assert_eq!(
            order,
            vec!["base".to_string(), "mid".to_string(), "top".to_string()]
        );
    }

    #[test]
    fn test_cycle_is_an_error() {
        let table = defs(&[
            ("a", expr::param("b")),
            ("b", expr::param("a")),
        ]);
        let err = toposort_params(&table).unwrap_err();
        assert!(err.to_string().contains("cycle"));

        let table = defs(&[("selfish", expr::exp(expr::param("selfish")))]);
        assert!(toposort_params(&table).is_err());
    }
}
