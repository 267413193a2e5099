use std::hash::Hash;

use fxhash::FxHashMap;

/// A disjoint-set forest over arbitrary hashable elements with path compression and
/// union by rank.
///
/// Elements have to be registered via [`UnionFind::make_set`] or are registered implicitly
/// by [`UnionFind::union`]. Queries on unregistered elements never fail: `find` returns `None`
/// and `connected` returns *false*.
#[derive(Debug, Clone)]
pub struct UnionFind<T> {
    parent: FxHashMap<T, T>,
    rank: FxHashMap<T, u32>,
    num_sets: usize,
}

impl<T: Clone + Eq + Hash> Default for UnionFind<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> UnionFind<T> {
    /// Creates an empty forest
    pub fn new() -> Self {
        Self {
            parent: FxHashMap::default(),
            rank: FxHashMap::default(),
            num_sets: 0,
        }
    }

    /// Creates a forest of singletons
    pub fn from_elements<I: IntoIterator<Item = T>>(elements: I) -> Self {
        let mut uf = Self::new();
        for x in elements {
            uf.make_set(x);
        }
        uf
    }

    /// Registers `x` as a singleton set. Returns *false* if `x` was already registered.
    pub fn make_set(&mut self, x: T) -> bool {
        if self.parent.contains_key(&x) {
            return false;
        }

        self.parent.insert(x.clone(), x.clone());
        self.rank.insert(x, 0);
        self.num_sets += 1;
        true
    }

    /// Returns the number of registered elements
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns *true* if no element is registered
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the number of disjoint sets
    pub fn number_of_sets(&self) -> usize {
        self.num_sets
    }

    /// Returns the representative of the set containing `x`.
    /// All elements on the path from `x` to the root are attached to the root directly.
    pub fn find(&mut self, x: &T) -> Option<T> {
        let mut root = x;
        loop {
            let parent = self.parent.get(root)?;
            if parent == root {
                break;
            }
            root = parent;
        }
        let root = root.clone();

        let mut cur = x.clone();
        while cur != root {
            match self.parent.insert(cur, root.clone()) {
                Some(next) => cur = next,
                None => break,
            }
        }

        Some(root)
    }

    /// Merges the sets containing `a` and `b`; unregistered elements are registered first.
    /// Returns *true* if two distinct sets were merged.
    ///
    /// On equal ranks, the root of `b` is attached under the root of `a`.
    pub fn union(&mut self, a: T, b: T) -> bool {
        self.make_set(a.clone());
        self.make_set(b.clone());

        let (Some(root_a), Some(root_b)) = (self.find(&a), self.find(&b)) else {
            return false;
        };
        if root_a == root_b {
            return false;
        }

        let rank_a = self.rank[&root_a];
        let rank_b = self.rank[&root_b];

        if rank_a < rank_b {
            self.parent.insert(root_a, root_b);
        } else {
            if rank_a == rank_b {
                self.rank.insert(root_a.clone(), rank_a + 1);
            }
            self.parent.insert(root_b, root_a);
        }

        self.num_sets -= 1;
        true
    }

    /// Returns *true* if both elements are registered and belong to the same set
    pub fn connected(&mut self, a: &T, b: &T) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Returns all sets. Elements are grouped by representative; neither the order of the
    /// sets nor the order within a set is specified.
    pub fn sets(&mut self) -> Vec<Vec<T>> {
        let elements: Vec<T> = self.parent.keys().cloned().collect();

        let mut index: FxHashMap<T, usize> = FxHashMap::default();
        let mut sets: Vec<Vec<T>> = Vec::with_capacity(self.num_sets);
        for x in elements {
            let Some(root) = self.find(&x) else {
                continue;
            };
            let i = *index.entry(root).or_insert_with(|| {
                sets.push(Vec::new());
                sets.len() - 1
            });
            sets[i].push(x);
        }
        sets
    }
}
