use std::cmp::Ordering;

/// An array-backed binary min-heap of `(item, priority)` pairs.
///
/// The order of priorities is given by a comparator which defaults to ascending [`PartialOrd`]
/// (incomparable values such as `NaN` are treated as equal). Items with equal priority are
/// dequeued in no particular order.
///
/// There is no index from item to heap position: [`PriorityQueue::update_priority`] performs a
/// linear scan. Shortest-path algorithms therefore re-insert items with improved priority and
/// skip stale entries on dequeue instead.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T, P = f64> {
    heap: Vec<(T, P)>,
    cmp: fn(&P, &P) -> Ordering,
}

fn ascending<P: PartialOrd>(a: &P, b: &P) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

impl<T, P: PartialOrd> Default for PriorityQueue<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: PartialOrd> PriorityQueue<T, P> {
    /// Creates an empty min-heap
    pub fn new() -> Self {
        Self::with_comparator(ascending::<P>)
    }
}

impl<T, P> PriorityQueue<T, P> {
    /// Creates an empty heap whose root is the minimum with respect to `cmp`
    pub fn with_comparator(cmp: fn(&P, &P) -> Ordering) -> Self {
        Self {
            heap: Vec::new(),
            cmp,
        }
    }

    /// Returns the number of stored items
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns *true* if the heap holds no items
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Removes all items
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Inserts an item with the given priority
    pub fn enqueue(&mut self, item: T, priority: P) {
        self.heap.push((item, priority));
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes and returns the item with minimum priority
    pub fn dequeue(&mut self) -> Option<(T, P)> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let min = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        min
    }

    /// Returns the item with minimum priority without removing it
    pub fn peek(&self) -> Option<(&T, &P)> {
        self.heap.first().map(|(item, priority)| (item, priority))
    }

    /// Changes the priority of the first stored occurrence of `item`.
    /// Returns *false* if the item is not part of the heap.
    pub fn update_priority(&mut self, item: &T, priority: P) -> bool
    where
        T: PartialEq,
    {
        let Some(pos) = self.heap.iter().position(|(x, _)| x == item) else {
            return false;
        };

        self.heap[pos].1 = priority;
        let pos = self.sift_up(pos);
        self.sift_down(pos);
        true
    }

    fn less(&self, i: usize, j: usize) -> bool {
        (self.cmp)(&self.heap[i].1, &self.heap[j].1) == Ordering::Less
    }

    /// Moves the entry at `pos` upwards and returns its final position
    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.heap.swap(pos, parent);
            pos = parent;
        }
        pos
    }

    fn sift_down(&mut self, mut pos: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;

            let mut smallest = pos;
            if left < n && self.less(left, smallest) {
                smallest = left;
            }
            if right < n && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }

            self.heap.swap(pos, smallest);
            pos = smallest;
        }
    }
}
