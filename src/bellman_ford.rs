// bellman_ford.rs - Negative-cycle detection over the conversion graph

use std::collections::{HashMap, HashSet};

use crate::graph::ConversionGraph;

/// Find a negative-weight cycle reachable from `start`.
///
/// Standard Bellman-Ford: |V|-1 relaxation rounds, then one more scan over
/// every edge. Any edge that still relaxes proves a negative cycle, which is
/// reconstructed by walking predecessor pointers until a node repeats.
///
/// Returns the cycle in forward-traversal order, closed (first == last), or
/// `None` when the graph has no reachable negative cycle or `start` is not a
/// node of the graph.
pub fn find_negative_cycle(graph: &ConversionGraph, start: &str) -> Option<Vec<String>> {
    if !graph.contains_key(start) {
        return None;
    }

    let mut distances: HashMap<&str, f64> =
        graph.keys().map(|node| (node.as_str(), f64::INFINITY)).collect();
    let mut predecessors: HashMap<&str, Option<&str>> =
        graph.keys().map(|node| (node.as_str(), None)).collect();
    distances.insert(start, 0.0);

    for _ in 0..graph.len().saturating_sub(1) {
        for (node, edges) in graph {
            let from_dist = distances[node.as_str()];
            if !from_dist.is_finite() {
                continue; // unreachable so far, nothing to relax
            }
            for (neighbor, weight) in edges {
                let to_dist = distances.get(neighbor.as_str()).copied().unwrap_or(f64::INFINITY);
                if from_dist + weight < to_dist {
                    distances.insert(neighbor.as_str(), from_dist + weight);
                    predecessors.insert(neighbor.as_str(), Some(node.as_str()));
                }
            }
        }
    }

    // One more scan: an edge that still relaxes proves a negative cycle
    // reachable through its target. Apply the relaxation first so the
    // predecessor chain from the target closes into the cycle, then walk it.
    for (node, edges) in graph {
        let from_dist = distances[node.as_str()];
        if !from_dist.is_finite() {
            continue;
        }
        for (neighbor, weight) in edges {
            let to_dist = distances.get(neighbor.as_str()).copied().unwrap_or(f64::INFINITY);
            if from_dist + weight < to_dist {
                distances.insert(neighbor.as_str(), from_dist + weight);
                predecessors.insert(neighbor.as_str(), Some(node.as_str()));
                if let Some(cycle) = reconstruct_cycle(&predecessors, neighbor.as_str()) {
                    return Some(cycle);
                }
            }
        }
    }

    None
}

/// Walk predecessor pointers from `from` until a node repeats (the cycle
/// entry point), then collect the cycle members and reverse them into
/// forward order ending back at the entry point.
fn reconstruct_cycle(
    predecessors: &HashMap<&str, Option<&str>>,
    from: &str,
) -> Option<Vec<String>> {
    let mut visited = HashSet::new();
    let mut current = from;
    while visited.insert(current) {
        current = predecessors.get(current).copied().flatten()?;
    }
    let cycle_start = current;

    let mut cycle = vec![cycle_start.to_string()];
    let mut current = predecessors.get(cycle_start).copied().flatten()?;
    while current != cycle_start {
        cycle.push(current.to_string());
        current = predecessors.get(current).copied().flatten()?;
    }
    cycle.push(cycle_start.to_string());
    cycle.reverse();

    // Closed with at least one intermediate node; anything shorter is a
    // self-loop artifact and not a tradable cycle.
    if cycle.len() >= 3 {
        Some(cycle)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str, f64)]) -> ConversionGraph {
        let mut graph = ConversionGraph::new();
        for (from, to, weight) in edges {
            graph.entry(from.to_string()).or_default().push((to.to_string(), *weight));
            graph.entry(to.to_string()).or_default();
        }
        graph
    }

    fn cycle_weight(graph: &ConversionGraph, cycle: &[String]) -> f64 {
        cycle
            .windows(2)
            .map(|hop| {
                graph[&hop[0]]
                    .iter()
                    .find(|(to, _)| *to == hop[1])
                    .map(|(_, weight)| *weight)
                    .expect("cycle edge must exist in graph")
            })
            .sum()
    }

    #[test]
    fn no_negative_cycle_returns_none() {
        let graph = graph(&[
            ("USDT", "BTC", 1.0),
            ("BTC", "ETH", 2.0),
            ("ETH", "USDT", 1.5),
        ]);
        assert!(find_negative_cycle(&graph, "USDT").is_none());
    }

    #[test]
    fn missing_start_returns_none() {
        let graph = graph(&[("USDT", "BTC", -1.0), ("BTC", "USDT", -1.0)]);
        assert!(find_negative_cycle(&graph, "EUR").is_none());
    }

    #[test]
    fn detects_single_negative_cycle() {
        // USDT -> BTC -> ETH -> USDT sums to -0.5
        let graph = graph(&[
            ("USDT", "BTC", 1.0),
            ("BTC", "ETH", -2.0),
            ("ETH", "USDT", 0.5),
        ]);
        let cycle = find_negative_cycle(&graph, "USDT").expect("cycle must be found");

        assert_eq!(cycle.first(), cycle.last());
        assert!(cycle.len() >= 3, "closed cycle needs an intermediate node: {:?}", cycle);
        assert!(cycle_weight(&graph, &cycle) < 0.0);
    }

    #[test]
    fn cycle_unreachable_from_start_is_not_reported() {
        // The negative loop lives in a component the start never reaches.
        let graph = graph(&[
            ("USDT", "BTC", 1.0),
            ("EUR", "GBP", -2.0),
            ("GBP", "EUR", -2.0),
        ]);
        assert!(find_negative_cycle(&graph, "USDT").is_none());
    }

    #[test]
    fn isolated_nodes_do_not_disturb_detection() {
        let mut graph = graph(&[
            ("USDT", "BTC", -1.0),
            ("BTC", "ETH", -1.0),
            ("ETH", "USDT", -1.0),
        ]);
        graph.insert("DOGE".to_string(), Vec::new());

        let cycle = find_negative_cycle(&graph, "USDT").expect("cycle must be found");
        assert!(!cycle.contains(&"DOGE".to_string()));
        assert!(cycle_weight(&graph, &cycle) < 0.0);
    }

    #[test]
    fn two_hop_cycle_is_closed_and_negative() {
        let graph = graph(&[("USDT", "BTC", -1.0), ("BTC", "USDT", 0.5)]);
        let cycle = find_negative_cycle(&graph, "USDT").expect("cycle must be found");
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 3);
        assert!(cycle_weight(&graph, &cycle) < 0.0);
    }
}
