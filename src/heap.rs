//! Array-backed binary min-heap keyed by weight.
//!
//! `std::collections::BinaryHeap` would also do, but the sift rules here
//! are fixed so tie-breaking stays identical from run to run: an element
//! only moves past another when its weight is strictly smaller.

/// Anything that can be ordered by a frequency weight.
pub trait Weighted {
    /// The ordering key.
    fn weight(&self) -> u64;
}

/// Min-priority queue ordered solely by [`Weighted::weight`].
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<T>,
}

impl<T: Weighted> MinHeap<T> {
    /// Create an empty heap that can hold `capacity` elements without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Number of queued elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append `value` and sift it toward the root.
    pub fn insert(&mut self, value: T) {
        self.elements.push(value);
        let mut i = self.elements.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.elements[i].weight() < self.elements[parent].weight() {
                self.elements.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    /// Remove and return the minimum-weight element, or `None` when empty.
    pub fn extract_min(&mut self) -> Option<T> {
        if self.elements.is_empty() {
            return None;
        }
        let min = self.elements.swap_remove(0);
        self.sift_down(0);
        Some(min)
    }

    /// Peek at the minimum-weight element.
    pub fn peek(&self) -> Option<&T> {
        self.elements.first()
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.elements.len();
        loop {
            let l = 2 * i + 1;
            let r = l + 1;
            let mut smallest = i;

            if l < n && self.elements[l].weight() < self.elements[smallest].weight() {
                smallest = l;
            }
            if r < n && self.elements[r].weight() < self.elements[smallest].weight() {
                smallest = r;
            }
            if smallest == i {
                return;
            }
            self.elements.swap(i, smallest);
            i = smallest;
        }
    }

    #[cfg(test)]
    fn is_valid(&self) -> bool {
        (1..self.elements.len())
            .all(|i| self.elements[(i - 1) / 2].weight() <= self.elements[i].weight())
    }
}
