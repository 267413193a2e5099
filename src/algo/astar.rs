use super::*;

/// A* search from `source` to `target`.
///
/// Nodes are expanded in order of `g(u) + h(u)` where `g` is the best known distance from
/// `source` and `h` is the user-supplied `heuristic`. A closed node is reopened whenever a
/// shorter path to it is found, hence the result is optimal for every heuristic that never
/// overestimates the remaining distance. Consistent heuristics never reopen a node.
/// The zero heuristic reduces A* to Dijkstra.
///
/// Fails with [`GraphError::InvalidOperation`] if a negative edge is relaxed.
///
/// # Example
/// ```
/// use wgraphs::{prelude::*, algo::*};
///
/// let mut g: Graph<(i32, i32)> = Graph::undirected();
/// g.add_edges([((0, 0), (0, 1), 1.0), ((0, 1), (1, 1), 1.0), ((0, 0), (1, 1), 3.0)]).unwrap();
///
/// let manhattan = |&(x, y): &(i32, i32)| ((1 - x).abs() + (1 - y).abs()) as f64;
/// let path = g.astar(&(0, 0), &(1, 1), manhattan).unwrap().unwrap();
/// assert_eq!(path.distance, 2.0);
/// ```
pub fn astar_path<G, H>(
    graph: &G,
    source: &G::Key,
    target: &G::Key,
    heuristic: H,
) -> Result<Option<Path<G::Key>>>
where
    G: AdjacencyList + NodeKeys,
    H: Fn(&G::Key) -> Weight,
{
    let s = graph.try_node_of(source)?;
    let t = graph.try_node_of(target)?;

    let mut distances = vec![Weight::INFINITY; graph.node_bound()];
    let mut predecessors: Vec<Option<OptionalNode>> = vec![None; graph.node_bound()];
    let mut closed = graph.vertex_bitset_unset();

    let mut queue = PriorityQueue::new();
    distances[s as usize] = 0.0;
    queue.enqueue(s, heuristic(source));

    while let Some((u, _)) = queue.dequeue() {
        if closed.set_bit(u) {
            continue;
        }

        if u == t {
            let mut nodes = vec![t];
            let mut cur = t;
            while let Some(p) = predecessors[cur as usize] {
                cur = p.get();
                nodes.push(cur);
            }
            nodes.reverse();

            return Ok(Some(Path {
                distance: distances[t as usize],
                nodes: graph.keys_of(nodes),
            }));
        }

        let du = distances[u as usize];
        for e in graph.out_edges_of(u) {
            ensure_operation!(
                e.weight >= 0.0,
                "A* does not support negative weight {} on edge ({:?}, {:?})",
                e.weight,
                graph.key_of(e.source),
                graph.key_of(e.target)
            );

            let v = e.target as usize;
            let candidate = du + e.weight;
            if candidate < distances[v] {
                distances[v] = candidate;
                predecessors[v] = OptionalNode::new(u);
                closed.clear_bit(e.target);
                queue.enqueue(e.target, candidate + heuristic(graph.key_of(e.target)));
            }
        }
    }

    Ok(None)
}
