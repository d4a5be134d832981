use crate::internal::id::{ClauseId, SolvableId};
use crate::solver::decision::Decision;
use crate::solver::decision_map::DecisionMap;

/// Tracks the assignments made to solvables, keeping a log that supports
/// backtracking and a dense map for O(1) value queries.
pub(crate) struct DecisionTracker {
    map: DecisionMap,
    stack: Vec<Decision>,
    propagate_index: usize,
}

impl DecisionTracker {
    pub(crate) fn new(solvable_count: usize) -> Self {
        Self {
            map: DecisionMap::new(solvable_count),
            stack: Vec::new(),
            propagate_index: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub(crate) fn assigned_value(&self, solvable_id: SolvableId) -> Option<bool> {
        self.map.value(solvable_id)
    }

    pub(crate) fn map(&self) -> &DecisionMap {
        &self.map
    }

    pub(crate) fn stack(&self) -> impl Iterator<Item = Decision> + DoubleEndedIterator + '_ {
        self.stack.iter().copied()
    }

    pub(crate) fn level(&self, solvable_id: SolvableId) -> u32 {
        self.map.level(solvable_id)
    }

    pub(crate) fn find_clause_for_assignment(&self, solvable_id: SolvableId) -> Option<ClauseId> {
        self.stack
            .iter()
            .find(|d| d.solvable_id == solvable_id)
            .map(|d| d.derived_from)
    }

    /// Attempts to add a decision.
    ///
    /// Returns `Ok(true)` if the solvable was undecided, `Ok(false)` if it was already
    /// decided to the same value, and `Err(())` if it was decided to the opposite
    /// value (a conflict).
    pub(crate) fn try_add_decision(&mut self, decision: Decision, level: u32) -> Result<bool, ()> {
        match self.map.value(decision.solvable_id) {
            None => {
                self.map.set(decision.solvable_id, decision.value, level);
                self.stack.push(decision);
                Ok(true)
            }
            Some(value) if value == decision.value => Ok(false),
            _ => Err(()),
        }
    }

    pub(crate) fn undo_until(&mut self, level: u32) {
        while let Some(decision) = self.stack.last() {
            if self.level(decision.solvable_id) <= level {
                break;
            }
            self.undo_last();
        }
    }

    pub(crate) fn undo_last(&mut self) -> (Decision, u32) {
        let decision = self.stack.pop().unwrap();
        self.map.reset(decision.solvable_id);
        self.propagate_index = self.stack.len();

        let level = self
            .stack
            .last()
            .map(|top| self.map.level(top.solvable_id))
            .unwrap_or(0);
        (decision, level)
    }

    /// Returns the next decision for which unit propagation still needs to run.
    /// Side-effect: the decision is marked as propagated.
    pub(crate) fn next_unpropagated(&mut self) -> Option<Decision> {
        let decision = *self.stack[self.propagate_index..].first()?;
        self.propagate_index += 1;
        Some(decision)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::internal::arena::ArenaId;

    fn sid(i: usize) -> SolvableId {
        SolvableId::from_usize(i)
    }

    #[test]
    fn add_and_query_decision() {
        let mut t = DecisionTracker::new(4);
        let d = Decision::new(sid(1), true, ClauseId::install_root());
        assert_eq!(t.try_add_decision(d, 1), Ok(true));
        assert_eq!(t.assigned_value(sid(1)), Some(true));
    }

    #[test]
    fn conflicting_decision_errs() {
        let mut t = DecisionTracker::new(4);
        t.try_add_decision(Decision::new(sid(1), true, ClauseId::install_root()), 1)
            .unwrap();
        let result = t.try_add_decision(Decision::new(sid(1), false, ClauseId::install_root()), 1);
        assert_eq!(result, Err(()));
    }

    #[test]
    fn undo_until_restores_level() {
        let mut t = DecisionTracker::new(4);
        t.try_add_decision(Decision::new(sid(1), true, ClauseId::install_root()), 1)
            .unwrap();
        t.try_add_decision(Decision::new(sid(2), true, ClauseId::install_root()), 2)
            .unwrap();
        t.undo_until(1);
        assert_eq!(t.assigned_value(sid(2)), None);
        assert_eq!(t.assigned_value(sid(1)), Some(true));
    }
}
