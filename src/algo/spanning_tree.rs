use tracing::debug;

use super::*;

/// A minimum spanning tree given by its edges as `(source, target, weight)`
#[derive(Debug, Clone, PartialEq)]
pub struct SpanningTree<K> {
    pub edges: Vec<(K, K, Weight)>,
    pub total_weight: Weight,
}

impl<K> SpanningTree<K> {
    fn from_records<G>(graph: &G, records: Vec<(Node, Node, Weight)>) -> Self
    where
        G: NodeKeys<Key = K>,
        K: NodeKey,
    {
        let total_weight = records.iter().map(|&(_, _, w)| w).sum();
        Self {
            edges: records
                .into_iter()
                .map(|(u, v, w)| (graph.key_of(u).clone(), graph.key_of(v).clone(), w))
                .collect(),
            total_weight,
        }
    }
}

fn ensure_spanning<G: AdjacencyList>(graph: &G, tree_edges: usize) -> Result<()> {
    ensure_operation!(
        tree_edges + 1 >= graph.len(),
        "graph is disconnected; no spanning tree exists"
    );
    Ok(())
}

/// Minimum spanning trees of connected undirected graphs.
///
/// Self-loops are never part of a spanning tree. Both algorithms fail with
/// [`GraphError::InvalidOperation`] on directed or disconnected graphs.
pub trait SpanningTrees: AdjacencyList + NodeKeys {
    /// Kruskal's algorithm: scans all edges by increasing weight and keeps every edge that joins
    /// two different sets of a [`UnionFind`]. Edges are reported in the order they were added.
    ///
    /// # Example
    /// ```
    /// use wgraphs::{prelude::*, algo::*};
    ///
    /// let mut g: Graph<&str> = Graph::undirected();
    /// g.add_edges([("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 5.0)]).unwrap();
    ///
    /// let tree = g.kruskal_mst().unwrap();
    /// assert_eq!(tree.total_weight, 3.0);
    /// assert_eq!(tree.edges, vec![("A", "B", 1.0), ("B", "C", 2.0)]);
    /// ```
    fn kruskal_mst(&self) -> Result<SpanningTree<Self::Key>> {
        ensure_operation!(self.is_undirected(), "spanning trees require an undirected graph");

        let mut edges = self
            .edge_records()
            .filter(|e| !e.is_loop())
            .map(|e| (e.source, e.target, e.weight))
            .collect::<Vec<_>>();
        edges.sort_by(|a, b| a.2.total_cmp(&b.2));

        let mut sets = UnionFind::from_elements(self.vertices());
        let mut tree = Vec::with_capacity(self.len().saturating_sub(1));
        for (u, v, w) in edges {
            if sets.union(u, v) {
                tree.push((u, v, w));
                if tree.len() + 1 == self.len() {
                    break;
                }
            }
        }

        ensure_spanning(self, tree.len())?;
        debug!(edges = tree.len(), "Kruskal finished");
        Ok(SpanningTree::from_records(self, tree))
    }

    /// Prim's algorithm: grows a tree from the first node, always adding the lightest edge
    /// leaving the tree. Uses a [`PriorityQueue`] of candidate edges with lazy deletion.
    /// Edges are oriented away from the first node and reported in the order they were added.
    fn prim_mst(&self) -> Result<SpanningTree<Self::Key>> {
        ensure_operation!(self.is_undirected(), "spanning trees require an undirected graph");

        let Some(start) = self.vertices().next() else {
            return Ok(SpanningTree {
                edges: Vec::new(),
                total_weight: 0.0,
            });
        };

        let mut in_tree = self.vertex_bitset_unset();
        let mut queue = PriorityQueue::new();
        let mut tree = Vec::with_capacity(self.len() - 1);

        in_tree.set_bit(start);
        for e in self.out_edges_of(start) {
            queue.enqueue((start, e.target), e.weight);
        }

        while let Some(((u, v), w)) = queue.dequeue() {
            if in_tree.set_bit(v) {
                continue;
            }
            tree.push((u, v, w));

            for e in self.out_edges_of(v) {
                if !in_tree.get_bit(e.target) {
                    queue.enqueue((v, e.target), e.weight);
                }
            }
        }

        ensure_spanning(self, tree.len())?;
        debug!(edges = tree.len(), "Prim finished");
        Ok(SpanningTree::from_records(self, tree))
    }
}

impl<G: AdjacencyList + NodeKeys> SpanningTrees for G {}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::testing::*;

    #[test]
    fn small_tree() {
        let mut g: Graph<char> = Graph::undirected();
        g.add_edges([
            ('a', 'b', 4.0),
            ('a', 'c', 1.0),
            ('b', 'c', 2.0),
            ('b', 'd', 5.0),
            ('c', 'd', 8.0),
            ('d', 'd', -3.0),
        ])
        .unwrap();

        let kruskal = g.kruskal_mst().unwrap();
        assert_eq!(
            kruskal.edges,
            vec![('a', 'c', 1.0), ('b', 'c', 2.0), ('b', 'd', 5.0)]
        );
        assert_eq!(kruskal.total_weight, 8.0);

        let prim = g.prim_mst().unwrap();
        assert_eq!(
            prim.edges,
            vec![('a', 'c', 1.0), ('c', 'b', 2.0), ('b', 'd', 5.0)]
        );
        assert_eq!(prim.total_weight, 8.0);
    }

    #[test]
    fn disconnected_and_directed_graphs_fail() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edges([(0, 1, 1.0), (2, 3, 1.0)]).unwrap();
        assert!(matches!(g.kruskal_mst(), Err(GraphError::InvalidOperation(_))));
        assert!(matches!(g.prim_mst(), Err(GraphError::InvalidOperation(_))));

        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        assert!(matches!(g.kruskal_mst(), Err(GraphError::InvalidOperation(_))));
        assert!(matches!(g.prim_mst(), Err(GraphError::InvalidOperation(_))));
    }

    #[test]
    fn trivial_graphs() {
        let mut g: Graph<u32> = Graph::undirected();
        assert!(g.kruskal_mst().unwrap().edges.is_empty());
        assert_eq!(g.prim_mst().unwrap().total_weight, 0.0);

        g.add_node(0);
        assert!(g.kruskal_mst().unwrap().edges.is_empty());
        assert!(g.prim_mst().unwrap().edges.is_empty());
    }

    #[test]
    fn kruskal_and_prim_agree() {
        let rng = &mut Pcg64Mcg::seed_from_u64(13);
        let mut trees = 0;
        for _ in 0..20 {
            let g = random_weighted_graph(rng, 40, 0.15, false);
            let kruskal = g.kruskal_mst();
            let prim = g.prim_mst();

            match (kruskal, prim) {
                (Ok(kruskal), Ok(prim)) => {
                    assert_eq!(kruskal.edges.len(), g.node_count() - 1);
                    assert_eq!(prim.edges.len(), g.node_count() - 1);
                    assert_close(kruskal.total_weight, prim.total_weight);
                    trees += 1;
                }
                (Err(_), Err(_)) => assert!(!g.is_connected()),
                _ => panic!("Kruskal and Prim disagree on connectivity"),
            }
        }
        assert!(trees > 0);
    }
}
