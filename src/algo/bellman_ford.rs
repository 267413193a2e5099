use tracing::debug;

use super::*;

/// Result of [`ShortestPaths::bellman_ford`].
///
/// If `has_negative_cycle` is set, the distances in `tree` are not final. `affected_nodes` then
/// contains every node whose distance could still be improved by one more relaxation pass; this is
/// not a full enumeration of the cycle.
#[derive(Debug, Clone)]
pub struct BellmanFordResult<'a, G: NodeKeys> {
    pub tree: ShortestPathTree<'a, G>,
    pub has_negative_cycle: bool,
    pub affected_nodes: Vec<G::Key>,
}

/// Relaxes all edges once and returns the number of improved distances
fn relax_all<G: AdjacencyList>(
    graph: &G,
    distances: &mut [Weight],
    mut predecessors: Option<&mut [Option<OptionalNode>]>,
) -> usize {
    let mut improved = 0;
    for u in graph.vertices() {
        let du = distances[u as usize];
        if !du.is_finite() {
            continue;
        }

        for e in graph.out_edges_of(u) {
            let v = e.target as usize;
            if du + e.weight < distances[v] {
                distances[v] = du + e.weight;
                if let Some(preds) = predecessors.as_deref_mut() {
                    preds[v] = OptionalNode::new(u);
                }
                improved += 1;
            }
        }
    }
    improved
}

/// Bellman-Ford from handle `s`. Undirected edges are relaxed in both directions.
pub(crate) fn bellman_ford_from<G>(graph: &G, s: Node) -> BellmanFordResult<'_, G>
where
    G: AdjacencyList + NodeKeys,
{
    let mut distances = vec![Weight::INFINITY; graph.node_bound()];
    let mut predecessors = vec![None; graph.node_bound()];
    distances[s as usize] = 0.0;

    let mut passes = 0;
    for _ in 1..graph.len() {
        passes += 1;
        if relax_all(graph, &mut distances, Some(predecessors.as_mut_slice())) == 0 {
            break;
        }
    }

    // one more pass: any improvement now is caused by a negative cycle
    let mut affected = graph.vertex_bitset_unset();
    let mut affected_nodes = Vec::new();
    for u in graph.vertices() {
        let du = distances[u as usize];
        if !du.is_finite() {
            continue;
        }
        for e in graph.out_edges_of(u) {
            if du + e.weight < distances[e.target as usize] && !affected.set_bit(e.target) {
                affected_nodes.push(e.target);
            }
        }
    }

    let has_negative_cycle = !affected_nodes.is_empty();
    if has_negative_cycle {
        debug!(
            source = ?graph.key_of(s),
            affected = affected_nodes.len(),
            "Bellman-Ford detected a negative cycle"
        );
    } else {
        debug!(source = ?graph.key_of(s), passes, "Bellman-Ford converged");
    }

    BellmanFordResult {
        tree: ShortestPathTree::new(graph, s, distances, predecessors),
        has_negative_cycle,
        affected_nodes: graph.keys_of(affected_nodes),
    }
}

/// Bellman-Ford from a virtual source connected to every node with weight `0`
pub(crate) fn negative_cycle_exists<G: AdjacencyList>(graph: &G) -> bool {
    let mut distances = vec![Weight::INFINITY; graph.node_bound()];
    for u in graph.vertices() {
        distances[u as usize] = 0.0;
    }

    // the virtual source adds one node, hence `n` passes
    for _ in 0..graph.len() {
        if relax_all(graph, &mut distances, None) == 0 {
            return false;
        }
    }
    relax_all(graph, &mut distances, None) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_node_negative_cycle() {
        let mut g: Graph<&str> = Graph::directed();
        g.add_edges([("A", "B", -5.0), ("B", "A", 1.0)]).unwrap();

        assert!(g.has_negative_cycle());
        let result = g.bellman_ford(&"A").unwrap();
        assert!(result.has_negative_cycle);
        assert!(!result.affected_nodes.is_empty());
        assert!(g.floyd_warshall().has_negative_cycle());

        assert!(matches!(
            g.bellman_ford_path(&"A", &"B"),
            Err(GraphError::InvalidOperation(_))
        ));
    }

    #[test]
    fn unreachable_negative_cycle() {
        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([(0, 1, 2.0), (2, 3, -2.0), (3, 2, 1.0)]).unwrap();

        let result = g.bellman_ford(&0).unwrap();
        assert!(!result.has_negative_cycle);
        assert!(result.affected_nodes.is_empty());
        assert!(g.has_negative_cycle());

        assert_eq!(
            g.bellman_ford_path(&0, &1).unwrap().map(|p| p.distance),
            Some(2.0)
        );
        assert_eq!(g.bellman_ford_path(&0, &2).unwrap(), None);
    }

    #[test]
    fn negative_weights_without_cycle() {
        let mut g: Graph<char> = Graph::directed();
        g.add_edges([
            ('s', 'a', 4.0),
            ('s', 'b', 5.0),
            ('b', 'a', -3.0),
            ('a', 'c', 2.0),
            ('c', 'd', -1.0),
        ])
        .unwrap();

        assert!(!g.has_negative_cycle());
        let path = g.bellman_ford_path(&'s', &'d').unwrap().unwrap();
        assert_eq!(path.nodes, vec!['s', 'b', 'a', 'c', 'd']);
        assert_eq!(path.distance, 3.0);

        let result = g.bellman_ford(&'s').unwrap();
        assert_eq!(result.tree.distance_to(&'a').unwrap(), 2.0);
        assert_eq!(result.tree.predecessor_of(&'a').unwrap(), Some(&'b'));
    }

    #[test]
    fn undirected_negative_edge_is_a_cycle() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edges([(0, 1, 1.0), (1, 2, -1.0)]).unwrap();

        assert!(g.has_negative_cycle());
        assert!(g.bellman_ford(&0).unwrap().has_negative_cycle);

        g.remove_edge(&1, &2);
        assert!(!g.has_negative_cycle());
    }
}
