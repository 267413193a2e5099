use itertools::Itertools;

use super::*;

/// Connects given keys into common substructures.
///
/// Missing keys are added as nodes. Edges get weight [`DEFAULT_WEIGHT`] and edges that already
/// exist are skipped, so overlapping substructures can be combined freely.
/// All methods fail only if the graph configuration rejects an edge (e.g. a self-loop).
pub trait Substructures: NodeKeys {
    /// Connects consecutive keys by an edge.
    ///
    /// # Example
    /// ```rust
    /// use wgraphs::{prelude::*, gens::*};
    ///
    /// let mut g: Graph<&str> = Graph::undirected();
    /// g.connect_path(["A", "B", "C"]).unwrap();
    ///
    /// assert!(g.has_edge(&"A", &"B"));
    /// assert!(g.has_edge(&"C", &"B"));
    /// assert!(!g.has_edge(&"A", &"C"));
    /// ```
    fn connect_path<P>(&mut self, keys: P) -> Result<()>
    where
        P: IntoIterator<Item = Self::Key>;

    /// Connects consecutive keys and the last key back to the first.
    /// A single key does not form a cycle and yields no edge.
    ///
    /// # Example
    /// ```rust
    /// use wgraphs::{prelude::*, gens::*};
    ///
    /// let mut g: Graph<u32> = Graph::directed();
    /// g.connect_cycle([0, 1, 2]).unwrap();
    ///
    /// assert!(g.has_edge(&0, &1));
    /// assert!(g.has_edge(&1, &2));
    /// assert!(g.has_edge(&2, &0));
    /// ```
    fn connect_cycle<C>(&mut self, keys: C) -> Result<()>
    where
        C: IntoIterator<Item = Self::Key>;

    /// Connects every pair of distinct keys. Directed graphs receive both orientations.
    fn connect_clique<C>(&mut self, keys: C) -> Result<()>
    where
        C: IntoIterator<Item = Self::Key>;
}

impl<K, N, E> Substructures for Graph<K, N, E>
where
    K: NodeKey,
    N: Default,
    E: Clone + Default,
{
    fn connect_path<P>(&mut self, keys: P) -> Result<()>
    where
        P: IntoIterator<Item = Self::Key>,
    {
        let mut iter = keys.into_iter();
        let Some(mut prev) = iter.next() else {
            return Ok(());
        };

        self.add_node(prev.clone());
        for cur in iter {
            self.try_connect(prev, cur.clone())?;
            prev = cur;
        }
        Ok(())
    }

    fn connect_cycle<C>(&mut self, keys: C) -> Result<()>
    where
        C: IntoIterator<Item = Self::Key>,
    {
        let keys = keys.into_iter().collect_vec();
        if let [first, .., last] = keys.as_slice() {
            let closing = (last.clone(), first.clone());
            self.connect_path(keys)?;
            self.try_connect(closing.0, closing.1)?;
        } else {
            self.connect_path(keys)?;
        }
        Ok(())
    }

    fn connect_clique<C>(&mut self, keys: C) -> Result<()>
    where
        C: IntoIterator<Item = Self::Key>,
    {
        let keys = keys.into_iter().unique().collect_vec();
        for (i, u) in keys.iter().enumerate() {
            self.add_node(u.clone());
            for v in &keys[i + 1..] {
                self.try_connect(u.clone(), v.clone())?;
                if self.is_directed() {
                    self.try_connect(v.clone(), u.clone())?;
                }
            }
        }
        Ok(())
    }
}

trait TryConnect<K> {
    fn try_connect(&mut self, source: K, target: K) -> Result<()>;
}

impl<K, N, E> TryConnect<K> for Graph<K, N, E>
where
    K: NodeKey,
    N: Default,
    E: Clone + Default,
{
    /// Adds the edge unless it already exists
    fn try_connect(&mut self, source: K, target: K) -> Result<()> {
        if self.has_edge(&source, &target) {
            return Ok(());
        }
        self.add_edge(source, target, DEFAULT_WEIGHT)
    }
}
