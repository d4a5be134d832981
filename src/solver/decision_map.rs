use crate::internal::id::SolvableId;
use std::cmp::Ordering;

/// Packs a bool value and a decision level into one `i64`.
///
/// = 0: undecided
/// > 0: level at which the solvable was decided true
/// < 0: level at which the solvable was decided false
#[repr(transparent)]
#[derive(Copy, Clone)]
struct DecisionAndLevel(i64);

impl DecisionAndLevel {
    fn undecided() -> DecisionAndLevel {
        DecisionAndLevel(0)
    }

    fn set(&mut self, value: bool, level: u32) {
        self.0 = if value { level as i64 } else { -(level as i64) };
    }

    fn value(self) -> Option<bool> {
        match self.0.cmp(&0) {
            Ordering::Less => Some(false),
            Ordering::Equal => None,
            Ordering::Greater => Some(true),
        }
    }

    fn level(self) -> u32 {
        self.0.unsigned_abs() as u32
    }
}

/// A dense map of the current assignment to every solvable, indexed directly by the
/// solvable's raw id. The solver holds exactly one instance, sized up front to the
/// pool's solvable count; unlike [`crate::internal::mapping::Mapping`] (used for the
/// pool's sparser, incrementally-grown tables) this never needs to resize mid-search.
pub(crate) struct DecisionMap {
    levels: Vec<DecisionAndLevel>,
}

impl DecisionMap {
    pub(crate) fn new(solvable_count: usize) -> Self {
        Self {
            levels: vec![DecisionAndLevel::undecided(); solvable_count],
        }
    }

    pub(crate) fn reset(&mut self, solvable_id: SolvableId) {
        self.levels[u32::from(solvable_id) as usize] = DecisionAndLevel::undecided();
    }

    pub(crate) fn set(&mut self, solvable_id: SolvableId, value: bool, level: u32) {
        self.levels[u32::from(solvable_id) as usize].set(value, level);
    }

    pub(crate) fn level(&self, solvable_id: SolvableId) -> u32 {
        self.levels[u32::from(solvable_id) as usize].level()
    }

    pub(crate) fn value(&self, solvable_id: SolvableId) -> Option<bool> {
        self.levels[u32::from(solvable_id) as usize].value()
    }
}
