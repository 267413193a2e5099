use tracing::debug;

use super::*;

/// All-pairs shortest paths using dense `n x n` distance and predecessor matrices.
///
/// Nodes are mapped to compact ordinals first, so removed nodes do not occupy space.
/// Negative weights are supported; a negative diagonal entry after the computation
/// indicates a negative cycle.
///
/// # Example
/// ```
/// use wgraphs::{prelude::*, algo::*};
///
/// let mut g: Graph<&str> = Graph::directed();
/// g.add_edges([("A", "B", 1.0), ("B", "C", -2.0), ("A", "C", 5.0)]).unwrap();
///
/// let fw = g.floyd_warshall();
/// assert!(!fw.has_negative_cycle());
/// assert_eq!(fw.distance(&"A", &"C").unwrap(), -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct FloydWarshall<'a, G> {
    graph: &'a G,
    /// Maps node handles to ordinals; `None` for removed nodes
    ordinals: Vec<Option<usize>>,
    nodes: Vec<Node>,
    distances: Vec<Weight>,
    /// `predecessors[i * n + j]` is the ordinal preceding `j` on the shortest path from `i`
    predecessors: Vec<Option<OptionalNode>>,
    has_negative_cycle: bool,
}

impl<'a, G> FloydWarshall<'a, G>
where
    G: AdjacencyList + NodeKeys,
{
    /// Computes all pairwise distances. Takes `O(n^3)` time and `O(n^2)` space.
    pub fn new(graph: &'a G) -> Self {
        let nodes: Vec<Node> = graph.vertices().collect();
        let n = nodes.len();

        let mut ordinals = vec![None; graph.node_bound()];
        for (i, &u) in nodes.iter().enumerate() {
            ordinals[u as usize] = Some(i);
        }

        let mut distances = vec![Weight::INFINITY; n * n];
        let mut predecessors = vec![None; n * n];
        for i in 0..n {
            distances[i * n + i] = 0.0;
        }

        for (i, &u) in nodes.iter().enumerate() {
            for e in graph.out_edges_of(u) {
                let Some(j) = ordinals[e.target as usize] else {
                    continue;
                };
                if e.weight < distances[i * n + j] {
                    distances[i * n + j] = e.weight;
                    predecessors[i * n + j] = OptionalNode::new(i as Node);
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let d_ik = distances[i * n + k];
                if !d_ik.is_finite() {
                    continue;
                }
                for j in 0..n {
                    let candidate = d_ik + distances[k * n + j];
                    if candidate < distances[i * n + j] {
                        distances[i * n + j] = candidate;
                        predecessors[i * n + j] = predecessors[k * n + j];
                    }
                }
            }
        }

        let has_negative_cycle = (0..n).any(|i| distances[i * n + i] < 0.0);
        if has_negative_cycle {
            debug!(nodes = n, "Floyd-Warshall detected a negative cycle");
        }

        Self {
            graph,
            ordinals,
            nodes,
            distances,
            predecessors,
            has_negative_cycle,
        }
    }

    /// Returns *true* if the graph contains a cycle of negative total weight.
    /// Distances are meaningless in this case.
    pub fn has_negative_cycle(&self) -> bool {
        self.has_negative_cycle
    }

    fn ordinal_of(&self, key: &G::Key) -> Result<usize> {
        let u = self.graph.try_node_of(key)?;
        self.ordinals[u as usize].ok_or_else(|| GraphError::node_not_found(key))
    }

    /// Returns the distance from `source` to `target`; `INFINITY` if unreachable
    pub fn distance(&self, source: &G::Key, target: &G::Key) -> Result<Weight> {
        let n = self.nodes.len();
        Ok(self.distances[self.ordinal_of(source)? * n + self.ordinal_of(target)?])
    }

    /// Returns a shortest path from `source` to `target` or `None` if it is unreachable.
    /// Fails with [`GraphError::InvalidOperation`] if the graph has a negative cycle.
    pub fn path(&self, source: &G::Key, target: &G::Key) -> Result<Option<Path<G::Key>>> {
        let n = self.nodes.len();
        let i = self.ordinal_of(source)?;
        let j = self.ordinal_of(target)?;
        ensure_operation!(
            !self.has_negative_cycle,
            "paths are undefined in presence of a negative cycle"
        );

        let distance = self.distances[i * n + j];
        if !distance.is_finite() {
            return Ok(None);
        }

        let mut ordinals = vec![j];
        let mut cur = j;
        while cur != i {
            let Some(p) = self.predecessors[i * n + cur] else {
                return Ok(None);
            };
            cur = p.get() as usize;
            ordinals.push(cur);
        }
        ordinals.reverse();

        Ok(Some(Path {
            distance,
            nodes: ordinals
                .into_iter()
                .map(|o| self.graph.key_of(self.nodes[o]).clone())
                .collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([
            (0, 1, 3.0),
            (0, 2, 8.0),
            (1, 3, 1.0),
            (3, 2, 2.0),
            (2, 0, -4.0),
            (4, 0, 1.0),
        ])
        .unwrap();

        let fw = g.floyd_warshall();
        assert!(!fw.has_negative_cycle());
        assert_eq!(fw.distance(&0, &2).unwrap(), 6.0);
        assert_eq!(fw.distance(&2, &3).unwrap(), 0.0);
        assert_eq!(fw.distance(&0, &4).unwrap(), Weight::INFINITY);
        assert_eq!(
            fw.path(&2, &3).unwrap(),
            Some(Path {
                distance: 0.0,
                nodes: vec![2, 0, 1, 3]
            })
        );
        assert_eq!(fw.path(&1, &4).unwrap(), None);
        assert!(fw.distance(&0, &9).is_err());
    }

    #[test]
    fn removed_nodes_are_skipped() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edges([(0, 1, 1.0), (1, 2, 1.0), (0, 2, 5.0)]).unwrap();
        g.remove_node(&1);

        let fw = g.floyd_warshall();
        assert_eq!(fw.distance(&0, &2).unwrap(), 5.0);
        assert!(fw.distance(&0, &1).is_err());
    }

    #[test]
    fn negative_self_loop() {
        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([(0, 1, 1.0), (1, 1, -1.0)]).unwrap();

        let fw = g.floyd_warshall();
        assert!(fw.has_negative_cycle());
        assert!(matches!(
            fw.path(&0, &1),
            Err(GraphError::InvalidOperation(_))
        ));
    }
}
