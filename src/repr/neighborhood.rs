use fxhash::FxHashMap;

use super::*;

/// Entries of a [`Neighborhood`] are addressed by the neighbor they point to
pub trait Adjacent {
    /// Returns the neighbor this entry points to
    fn neighbor(&self) -> Node;
}

impl<E> Adjacent for EdgeRecord<E> {
    fn neighbor(&self) -> Node {
        self.target
    }
}

impl Adjacent for Node {
    fn neighbor(&self) -> Node {
        *self
    }
}

/// Adjacency of a single node: at most one entry per neighbor, iterated in insertion order.
///
/// Entries live in a `Vec`, and a position map allows O(1) lookups by neighbor.
/// Removing an entry shifts all later entries to keep the insertion order intact.
#[derive(Debug, Clone)]
pub struct Neighborhood<T> {
    entries: Vec<T>,
    positions: FxHashMap<Node, usize>,
}

impl<T> Default for Neighborhood<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: FxHashMap::default(),
        }
    }
}

impl<T: Adjacent> Neighborhood<T> {
    /// Creates an empty Neighborhood
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of neighbors in the Neighborhood
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns *true* if there are no neighbors
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns *true* if `v` is in the Neighborhood
    pub fn contains(&self, v: Node) -> bool {
        self.positions.contains_key(&v)
    }

    /// Returns the entry pointing to `v` if it exists
    pub fn get(&self, v: Node) -> Option<&T> {
        self.positions.get(&v).map(|&i| &self.entries[i])
    }

    /// Returns a mutable reference to the entry pointing to `v` if it exists
    pub fn get_mut(&mut self, v: Node) -> Option<&mut T> {
        self.positions.get(&v).map(|&i| &mut self.entries[i])
    }

    /// Inserts an entry. An existing entry for the same neighbor is replaced in place and returned.
    pub fn insert(&mut self, entry: T) -> Option<T> {
        let v = entry.neighbor();
        if let Some(&i) = self.positions.get(&v) {
            Some(std::mem::replace(&mut self.entries[i], entry))
        } else {
            self.positions.insert(v, self.entries.len());
            self.entries.push(entry);
            None
        }
    }

    /// Removes the entry pointing to `v` and returns it if it existed
    pub fn remove(&mut self, v: Node) -> Option<T> {
        let pos = self.positions.remove(&v)?;
        let entry = self.entries.remove(pos);
        for e in &self.entries[pos..] {
            if let Some(p) = self.positions.get_mut(&e.neighbor()) {
                *p -= 1;
            }
        }
        Some(entry)
    }

    /// Returns an iterator over all entries in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Returns an iterator over all neighbors in insertion order
    pub fn neighbors(&self) -> impl Iterator<Item = Node> + '_ {
        self.entries.iter().map(Adjacent::neighbor)
    }

    /// Removes all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn insertion_order_survives_removal() {
        let mut nbs: Neighborhood<Node> = Neighborhood::new();
        for v in [5, 3, 9, 1] {
            assert!(nbs.insert(v).is_none());
        }
        assert_eq!(nbs.insert(3), Some(3));
        assert_eq!(nbs.len(), 4);

        assert_eq!(nbs.remove(3), Some(3));
        assert_eq!(nbs.remove(3), None);
        assert_eq!(nbs.neighbors().collect_vec(), vec![5, 9, 1]);

        assert!(nbs.contains(1));
        assert_eq!(nbs.get(1), Some(&1));
        assert!(nbs.remove(1).is_some());
        assert_eq!(nbs.neighbors().collect_vec(), vec![5, 9]);

        nbs.clear();
        assert!(nbs.is_empty());
        assert!(!nbs.contains(5));
    }

    #[test]
    fn records_are_replaced_in_place() {
        let mut nbs = Neighborhood::new();
        for (target, weight) in [(2, 1.0), (4, 2.0), (7, 3.0)] {
            nbs.insert(EdgeRecord {
                source: 0,
                target,
                weight,
                data: (),
            });
        }

        let old = nbs.insert(EdgeRecord {
            source: 0,
            target: 4,
            weight: 10.0,
            data: (),
        });
        assert_eq!(old.map(|e| e.weight), Some(2.0));
        assert_eq!(nbs.iter().map(|e| e.weight).collect_vec(), vec![1.0, 10.0, 3.0]);

        if let Some(e) = nbs.get_mut(7) {
            e.weight = -1.0;
        }
        assert_eq!(nbs.get(7).map(|e| e.weight), Some(-1.0));
    }
}
