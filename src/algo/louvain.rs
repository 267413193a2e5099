/*!
# Louvain Community Detection

The graph is first compressed into a [`Level`]: an undirected weighted multigraph over compact
ordinals with self-loop weights kept separately. Directed graphs are symmetrized by adding up the
weights of both directions. Each round of [`Louvain`] moves single nodes between neighboring
communities until no move yields a positive gain, then collapses every community into a single
node of the next level.
*/

use fxhash::FxHashMap;
use rand::{Rng, seq::SliceRandom};
use tracing::{debug, trace};

use super::*;

/// Gains below this threshold are treated as zero
const GAIN_EPSILON: f64 = 1e-12;

/// Undirected weighted multigraph used during aggregation
#[derive(Debug, Clone)]
pub(crate) struct Level {
    adjacency: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
    /// Weighted degrees; self-loops are counted twice
    degrees: Vec<f64>,
    /// Twice the total edge weight
    total_degree: f64,
}

impl Level {
    /// Compresses the alive nodes of `graph` in handle order
    pub(crate) fn from_graph<G: AdjacencyList>(graph: &G, ordinals: &[Option<usize>]) -> Self {
        let n = graph.number_of_nodes() as usize;
        let mut merged: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); n];
        let mut self_loops = vec![0.0; n];

        for e in graph.edge_records() {
            let (Some(i), Some(j)) = (ordinals[e.source as usize], ordinals[e.target as usize])
            else {
                continue;
            };
            if i == j {
                self_loops[i] += e.weight;
            } else {
                *merged[i].entry(j).or_default() += e.weight;
                *merged[j].entry(i).or_default() += e.weight;
            }
        }

        Self::from_parts(merged, self_loops)
    }

    fn from_parts(merged: Vec<FxHashMap<usize, f64>>, self_loops: Vec<f64>) -> Self {
        let adjacency: Vec<Vec<(usize, f64)>> = merged
            .into_iter()
            .map(|nbs| {
                let mut nbs: Vec<_> = nbs.into_iter().collect();
                nbs.sort_unstable_by_key(|&(j, _)| j);
                nbs
            })
            .collect();

        let degrees: Vec<f64> = adjacency
            .iter()
            .zip(&self_loops)
            .map(|(nbs, &l)| 2.0 * l + nbs.iter().map(|&(_, w)| w).sum::<f64>())
            .collect();
        let total_degree = degrees.iter().sum();

        Self {
            adjacency,
            self_loops,
            degrees,
            total_degree,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// `Q = sum_c (L_c / m - resolution * (d_c / 2m)^2)` where `L_c` is the weight inside
    /// community `c` and `d_c` the sum of degrees in `c`. Returns `0` for edgeless levels.
    pub(crate) fn modularity(&self, community: &[usize], resolution: f64) -> f64 {
        if self.total_degree <= 0.0 {
            return 0.0;
        }

        let mut inside: FxHashMap<usize, f64> = FxHashMap::default();
        let mut degree: FxHashMap<usize, f64> = FxHashMap::default();
        for i in 0..self.len() {
            let c = community[i];
            let internal = self.self_loops[i]
                + self.adjacency[i]
                    .iter()
                    .filter(|&&(j, _)| community[j] == c)
                    .map(|&(_, w)| w / 2.0)
                    .sum::<f64>();
            *inside.entry(c).or_default() += internal;
            *degree.entry(c).or_default() += self.degrees[i];
        }

        let m = self.total_degree / 2.0;
        degree
            .into_iter()
            .map(|(c, d)| {
                let l = inside.get(&c).copied().unwrap_or(0.0);
                l / m - resolution * (d / self.total_degree).powi(2)
            })
            .sum()
    }

    /// One pass of local moving over `order`; returns the number of moved nodes.
    /// `totals[c]` must hold the summed degree of community `c`.
    pub(crate) fn move_nodes(
        &self,
        order: &[usize],
        community: &mut [usize],
        totals: &mut [f64],
        resolution: f64,
    ) -> usize {
        let mut moves = 0;
        let mut links: FxHashMap<usize, f64> = FxHashMap::default();
        let mut candidates = Vec::new();

        for &i in order {
            links.clear();
            candidates.clear();
            for &(j, w) in &self.adjacency[i] {
                let c = community[j];
                let entry = links.entry(c).or_insert_with(|| {
                    candidates.push(c);
                    0.0
                });
                *entry += w;
            }

            let current = community[i];
            let k_i = self.degrees[i];
            totals[current] -= k_i;

            let gain = |c: usize| {
                links.get(&c).copied().unwrap_or(0.0)
                    - resolution * totals[c] * k_i / self.total_degree
            };

            let mut best = current;
            let mut best_gain = gain(current);
            for &c in &candidates {
                let g = gain(c);
                if g > best_gain + GAIN_EPSILON {
                    best = c;
                    best_gain = g;
                }
            }

            totals[best] += k_i;
            if best != current {
                community[i] = best;
                moves += 1;
            }
        }

        moves
    }

    /// Runs local moving passes until no node moves; returns the community of every node
    fn local_moving<R: Rng>(&self, resolution: f64, shuffle: bool, rng: &mut R) -> Vec<usize> {
        let mut community: Vec<usize> = (0..self.len()).collect();
        let mut totals = self.degrees.clone();
        let mut order: Vec<usize> = (0..self.len()).collect();

        loop {
            if shuffle {
                order.shuffle(rng);
            }
            let moves = self.move_nodes(&order, &mut community, &mut totals, resolution);
            trace!(moves, "Louvain local moving pass");
            if moves == 0 {
                return community;
            }
        }
    }

    /// Collapses every community into one node; `community` must be compact
    fn aggregate(&self, community: &[usize], count: usize) -> Self {
        let mut merged: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); count];
        let mut self_loops = vec![0.0; count];

        for i in 0..self.len() {
            let ci = community[i];
            self_loops[ci] += self.self_loops[i];
            for &(j, w) in &self.adjacency[i] {
                let cj = community[j];
                if ci == cj {
                    // every internal edge is seen from both endpoints
                    self_loops[ci] += w / 2.0;
                } else {
                    *merged[ci].entry(cj).or_default() += w;
                }
            }
        }

        Self::from_parts(merged, self_loops)
    }
}

/// Renumbers communities to `0..count` in order of first appearance
fn compact(community: &[usize]) -> (Vec<usize>, usize) {
    let mut ids: FxHashMap<usize, usize> = FxHashMap::default();
    let renumbered = community
        .iter()
        .map(|&c| {
            let next = ids.len();
            *ids.entry(c).or_insert(next)
        })
        .collect();
    (renumbered, ids.len())
}

/// Groups the alive nodes of `graph` by `membership[ordinal]`, ordered by first member
pub(crate) fn group_communities<G: NodeKeys>(
    graph: &G,
    nodes: &[Node],
    membership: &[usize],
) -> Vec<Vec<G::Key>> {
    let (membership, count) = compact(membership);
    let mut communities = vec![Vec::new(); count];
    for (&u, &c) in nodes.iter().zip(&membership) {
        communities[c].push(graph.key_of(u).clone());
    }
    communities
}

/// Maps node handles to compact ordinals
pub(crate) fn compact_ordinals<G: GraphNodeOrder>(graph: &G) -> (Vec<Node>, Vec<Option<usize>>) {
    let nodes: Vec<Node> = graph.vertices().collect();
    let mut ordinals = vec![None; graph.node_bound()];
    for (i, &u) in nodes.iter().enumerate() {
        ordinals[u as usize] = Some(i);
    }
    (nodes, ordinals)
}

/// Computes the modularity of a partition.
///
/// `Q = sum_c (L_c / m - resolution * (d_c / 2m)^2)` where `m` is the total edge weight,
/// `L_c` the weight of edges inside community `c` and `d_c` the summed weighted degree of its
/// members. Directed graphs are symmetrized. Nodes not contained in any community count as
/// singletons.
///
/// Fails with [`GraphError::NodeNotFound`] for unknown keys and with
/// [`GraphError::InvalidParameter`] if a node appears in more than one community.
pub fn modularity<G>(graph: &G, communities: &[Vec<G::Key>], resolution: f64) -> Result<f64>
where
    G: AdjacencyList + NodeKeys,
{
    let (nodes, ordinals) = compact_ordinals(graph);
    let n = nodes.len();
    let mut membership: Vec<Option<usize>> = vec![None; n];

    for (c, members) in communities.iter().enumerate() {
        for key in members {
            let u = graph.try_node_of(key)?;
            let Some(i) = ordinals[u as usize] else {
                return Err(GraphError::node_not_found(key));
            };
            ensure_parameter!(
                membership[i].is_none(),
                "{key:?} is contained in more than one community"
            );
            membership[i] = Some(c);
        }
    }

    let offset = communities.len();
    let membership: Vec<usize> = membership
        .into_iter()
        .enumerate()
        .map(|(i, c)| c.unwrap_or(offset + i))
        .collect();

    Ok(Level::from_graph(graph, &ordinals).modularity(&membership, resolution))
}

/// Result of [`Louvain::run`]
#[derive(Debug, Clone)]
pub struct LouvainResult<K> {
    /// Communities ordered by their first member in node insertion order
    pub communities: Vec<Vec<K>>,
    pub modularity: f64,
    /// Number of aggregation levels computed
    pub iterations: usize,
}

/// Louvain modularity optimization.
///
/// Every level consists of repeated local moving passes, committing only strictly positive
/// gains, until no node moves. The communities are then aggregated into super-nodes and the next
/// level starts. The algorithm stops once a level improves modularity by at most `tolerance` or
/// after `max_iterations` levels. Weights must be non-negative.
///
/// With `shuffle`, nodes are visited in a random order per pass; otherwise in insertion order.
///
/// # Example
/// ```
/// use rand::SeedableRng;
/// use rand_pcg::Pcg64Mcg;
/// use wgraphs::{prelude::*, algo::*, gens::*};
///
/// let mut g: Graph<u32> = Graph::undirected();
/// g.connect_clique([0, 1, 2]).unwrap();
/// g.connect_clique([3, 4, 5]).unwrap();
/// g.add_edge(2, 3, 1.0).unwrap();
///
/// let result = Louvain::new().run(&g, &mut Pcg64Mcg::seed_from_u64(1)).unwrap();
/// assert_eq!(result.communities, vec![vec![0, 1, 2], vec![3, 4, 5]]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Louvain {
    resolution: f64,
    max_iterations: usize,
    tolerance: f64,
    shuffle: bool,
}

impl Default for Louvain {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_iterations: 100,
            tolerance: 1e-6,
            shuffle: true,
        }
    }
}

impl Louvain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values above `1` favor smaller communities, values below `1` larger ones
    pub fn set_resolution(&mut self, resolution: f64) {
        self.resolution = resolution;
    }

    /// Values above `1` favor smaller communities, values below `1` larger ones
    pub fn resolution(mut self, resolution: f64) -> Self {
        self.set_resolution(resolution);
        self
    }

    /// Maximum number of aggregation levels
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    /// Maximum number of aggregation levels
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.set_max_iterations(max_iterations);
        self
    }

    /// Minimum modularity improvement required to compute another level
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    /// Minimum modularity improvement required to compute another level
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.set_tolerance(tolerance);
        self
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.set_shuffle(shuffle);
        self
    }

    /// Fails with [`GraphError::InvalidParameter`] on a negative or non-finite resolution and
    /// with [`GraphError::InvalidOperation`] if the graph has negative weights.
    pub fn run<G, R>(&self, graph: &G, rng: &mut R) -> Result<LouvainResult<G::Key>>
    where
        G: AdjacencyList + NodeKeys,
        R: Rng,
    {
        ensure_parameter!(
            self.resolution.is_finite() && self.resolution >= 0.0,
            "resolution must be non-negative, got {}",
            self.resolution
        );
        ensure_operation!(
            !graph.has_negative_weights(),
            "Louvain does not support negative weights"
        );

        let (nodes, ordinals) = compact_ordinals(graph);
        let mut level = Level::from_graph(graph, &ordinals);
        let mut membership: Vec<usize> = (0..nodes.len()).collect();
        let mut modularity = level.modularity(&membership, self.resolution);

        let mut iterations = 0;
        while iterations < self.max_iterations && level.len() > 0 {
            iterations += 1;

            let community = level.local_moving(self.resolution, self.shuffle, rng);
            let (community, count) = compact(&community);
            let improved = level.modularity(&community, self.resolution);
            let gain = improved - modularity;

            if gain > 0.0 {
                for c in membership.iter_mut() {
                    *c = community[*c];
                }
                modularity = improved;
            }
            debug!(
                level = iterations,
                communities = count,
                modularity,
                "Louvain level finished"
            );

            if gain <= self.tolerance || count == level.len() {
                break;
            }
            level = level.aggregate(&community, count);
        }

        Ok(LouvainResult {
            communities: group_communities(graph, &nodes, &membership),
            modularity,
            iterations,
        })
    }
}

/// Community detection with default configuration directly on graphs.
/// All randomness is drawn from the provided `rng`.
pub trait CommunityDetection: AdjacencyList + NodeKeys {
    /// See [`Louvain`]
    fn louvain<R: Rng>(&self, rng: &mut R) -> Result<LouvainResult<Self::Key>> {
        Louvain::new().run(self, rng)
    }

    /// Asynchronous, unweighted label propagation; see [`LabelPropagation`]
    fn label_propagation<R: Rng>(&self, rng: &mut R) -> Result<LabelPropagationResult<Self::Key>> {
        LabelPropagation::new().run(self, rng)
    }

    /// See [`modularity`](fn@modularity)
    fn modularity(&self, communities: &[Vec<Self::Key>], resolution: f64) -> Result<f64> {
        modularity(self, communities, resolution)
    }
}

impl<G: AdjacencyList + NodeKeys> CommunityDetection for G {}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{gens::*, testing::*};

    fn barbell() -> Graph<u32> {
        let mut g = Graph::undirected();
        g.connect_clique([0, 1, 2, 3]).unwrap();
        g.connect_clique([4, 5, 6, 7]).unwrap();
        g.add_edge(3, 4, 1.0).unwrap();
        g
    }

    #[test]
    fn barbell_has_two_communities() {
        let g = barbell();
        for seed in 0..5 {
            let rng = &mut Pcg64Mcg::seed_from_u64(seed);
            let result = g.louvain(rng).unwrap();

            let mut communities = result.communities.clone();
            for c in &mut communities {
                c.sort_unstable();
            }
            communities.sort_unstable();
            assert_eq!(communities, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
            assert!(result.modularity > 0.3);
            assert_close(
                result.modularity,
                g.modularity(&result.communities, 1.0).unwrap(),
            );
        }
    }

    #[test]
    fn modularity_values() {
        let g = barbell();
        let halves = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
        assert_close(modularity(&g, &halves, 1.0).unwrap(), 2.0 * (6.0 / 13.0 - 0.25));

        let everything = vec![(0..8).collect_vec()];
        assert_close(modularity(&g, &everything, 1.0).unwrap(), 0.0);

        // missing nodes are singletons
        assert_close(
            modularity(&g, &[], 1.0).unwrap(),
            modularity(&g, &(0..8).map(|u| vec![u]).collect_vec(), 1.0).unwrap(),
        );

        assert!(matches!(
            modularity(&g, &[vec![0, 1], vec![1]], 1.0),
            Err(GraphError::InvalidParameter(_))
        ));
        assert!(matches!(
            modularity(&g, &[vec![42]], 1.0),
            Err(GraphError::NodeNotFound(_))
        ));

        let empty: Graph<u32> = Graph::undirected();
        assert_eq!(modularity(&empty, &[], 1.0).unwrap(), 0.0);
    }

    #[test]
    fn local_moves_increase_modularity() {
        let rng = &mut Pcg64Mcg::seed_from_u64(7);
        for _ in 0..10 {
            let g = random_graph(rng, 50, 0.08, false);
            let (_, ordinals) = compact_ordinals(&g);
            let level = Level::from_graph(&g, &ordinals);

            let mut community: Vec<usize> = (0..level.len()).collect();
            let mut totals = level.degrees.clone();
            let singletons = level.modularity(&community, 1.0);
            let mut previous = singletons;

            let mut order: Vec<usize> = (0..level.len()).collect();
            loop {
                order.shuffle(rng);
                let moves = level.move_nodes(&order, &mut community, &mut totals, 1.0);
                let current = level.modularity(&community, 1.0);
                if moves == 0 {
                    assert_close(current, previous);
                    break;
                }
                assert!(current > previous);
                previous = current;
            }

            let result = g.louvain(rng).unwrap();
            assert!(result.modularity >= singletons);
        }
    }

    #[test]
    fn aggregation_preserves_modularity() {
        let rng = &mut Pcg64Mcg::seed_from_u64(3);
        let g = random_graph(rng, 40, 0.1, false);
        let (_, ordinals) = compact_ordinals(&g);
        let level = Level::from_graph(&g, &ordinals);

        let (community, count) = compact(&level.local_moving(1.0, true, rng));
        let coarse = level.aggregate(&community, count);

        assert_close(coarse.total_degree, level.total_degree);
        assert_close(
            coarse.modularity(&(0..count).collect_vec(), 1.0),
            level.modularity(&community, 1.0),
        );
    }

    #[test]
    fn directed_and_degenerate_inputs() {
        let mut g: Graph<u32> = Graph::directed();
        g.connect_cycle([0, 1, 2]).unwrap();
        g.connect_cycle([3, 4, 5]).unwrap();
        g.add_edge(2, 3, 1.0).unwrap();

        let rng = &mut Pcg64Mcg::seed_from_u64(1);
        let result = Louvain::new().shuffle(false).run(&g, rng).unwrap();
        assert_eq!(result.communities, vec![vec![0, 1, 2], vec![3, 4, 5]]);

        let mut isolated: Graph<u32> = Graph::undirected();
        isolated.add_node(0);
        isolated.add_node(1);
        let result = isolated.louvain(rng).unwrap();
        assert_eq!(result.communities, vec![vec![0], vec![1]]);
        assert_eq!(result.modularity, 0.0);

        assert!(matches!(
            Louvain::new().resolution(-1.0).run(&g, rng),
            Err(GraphError::InvalidParameter(_))
        ));
        g.add_edge(0, 5, -1.0).unwrap();
        assert!(matches!(
            g.louvain(rng),
            Err(GraphError::InvalidOperation(_))
        ));
    }
}
