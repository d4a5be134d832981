//! A growable, ordered sequence of raw libsolv-style ids.
//!
//! [`IdQueue`] backs the job buffer that is handed to the solver: each job is a
//! `(flag_word, selector_id)` pair, pushed with [`IdQueue::push_pair`]. It is also used
//! wherever the pool or the goal driver needs a plain ordered list of ids (e.g. the
//! result of [`crate::solvmap::SolvableSet::to_id_queue`]).

use std::slice::Iter;

/// A raw, unwrapped id as stored in an [`IdQueue`]. Unlike the typed ids in
/// [`crate::internal::id`], a `RawId` carries no information about what kind of thing it
/// identifies; that's the whole point of a job queue, which interleaves flag words and
/// selector ids in a single stream.
pub type RawId = i32;

#[derive(Debug, Clone, Default)]
pub struct IdQueue {
    elements: Vec<RawId>,
}

impl IdQueue {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn reserve(&mut self, additional: usize) {
        self.elements.reserve(additional);
    }

    pub fn push_back(&mut self, id: RawId) {
        self.elements.push(id);
    }

    /// Pushes a `(flag_word, selector_id)` job pair in one call, as jobs are always added
    /// two elements at a time.
    pub fn push_pair(&mut self, flag_word: RawId, selector_id: RawId) {
        self.elements.push(flag_word);
        self.elements.push(selector_id);
    }

    pub fn sort(&mut self) {
        self.elements.sort_unstable();
    }

    pub fn sort_unique(&mut self) {
        self.sort();
        self.elements.dedup();
    }

    pub fn iter(&self) -> Iter<'_, RawId> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[RawId] {
        &self.elements
    }

    /// Iterates over `(flag_word, selector_id)` pairs, as produced by [`Self::push_pair`].
    /// Panics if the queue holds an odd number of elements.
    pub fn pairs(&self) -> impl Iterator<Item = (RawId, RawId)> + '_ {
        assert_eq!(self.elements.len() % 2, 0, "job queue has an odd length");
        self.elements.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

impl std::ops::Index<usize> for IdQueue {
    type Output = RawId;

    fn index(&self, index: usize) -> &RawId {
        &self.elements[index]
    }
}

impl std::ops::AddAssign<&IdQueue> for IdQueue {
    fn add_assign(&mut self, rhs: &IdQueue) {
        self.elements.extend_from_slice(&rhs.elements);
    }
}

impl FromIterator<RawId> for IdQueue {
    fn from_iter<T: IntoIterator<Item = RawId>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IdQueue {
    type Item = &'a RawId;
    type IntoIter = Iter<'a, RawId>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_and_index() {
        let mut q = IdQueue::new();
        q.push_back(1);
        q.push_back(2);
        assert_eq!(q.len(), 2);
        assert_eq!(q[0], 1);
        assert_eq!(q[1], 2);
    }

    #[test]
    fn pairs_roundtrip() {
        let mut q = IdQueue::new();
        q.push_pair(10, 100);
        q.push_pair(20, 200);
        let collected: Vec<_> = q.pairs().collect();
        assert_eq!(collected, vec![(10, 100), (20, 200)]);
    }

    #[test]
    fn sort_unique_dedups() {
        let mut q: IdQueue = [3, 1, 2, 1, 3].into_iter().collect();
        q.sort_unique();
        assert_eq!(q.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn clear_resets_len() {
        let mut q: IdQueue = [1, 2, 3].into_iter().collect();
        q.clear();
        assert!(q.is_empty());
    }
}
