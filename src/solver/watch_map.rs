use crate::internal::id::{ClauseId, SolvableId};

/// Maps each solvable to the clauses currently watching it.
///
/// The teacher this solver is modeled on threads an intrusive linked list through
/// `ClauseState` itself to avoid a second allocation per watch. This crate instead
/// keeps a plain bucket per solvable; it costs one `Vec` per watched solvable instead
/// of a handful of extra `u32`s per clause, which is a fine trade given this solver
/// runs far more often per process than a one-shot dependency solve and correctness
/// here can't be checked by a compiler pass alone.
pub(crate) struct WatchMap {
    buckets: Vec<Vec<ClauseId>>,
}

impl WatchMap {
    pub(crate) fn new() -> Self {
        Self { buckets: Vec::new() }
    }

    pub(crate) fn initialize(&mut self, solvable_count: usize) {
        self.buckets = vec![Vec::new(); solvable_count];
    }

    fn bucket_mut(&mut self, solvable: SolvableId) -> &mut Vec<ClauseId> {
        &mut self.buckets[u32::from(solvable) as usize]
    }

    pub(crate) fn watching(&self, solvable: SolvableId) -> &[ClauseId] {
        &self.buckets[u32::from(solvable) as usize]
    }

    pub(crate) fn watch_solvable(&mut self, solvable: SolvableId, clause_id: ClauseId) {
        self.bucket_mut(solvable).push(clause_id);
    }

    pub(crate) fn unwatch_solvable(&mut self, solvable: SolvableId, clause_id: ClauseId) {
        let bucket = self.bucket_mut(solvable);
        if let Some(pos) = bucket.iter().position(|&c| c == clause_id) {
            bucket.swap_remove(pos);
        }
    }
}
