//! The resolved output of a successful goal: an ordered list of classified steps.

use crate::internal::id::SolvableId;

/// How a solvable participates in a resolved transaction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransactionStepKind {
    Install,
    Erase,
    Upgrade,
    Downgrade,
    Reinstall,
    Obsoleted,
    Change,
}

#[derive(Debug, Clone)]
pub struct TransactionStep {
    pub solvable: SolvableId,
    pub kind: TransactionStepKind,
}

/// An ordered list of transaction steps, in solver-defined order. Callers must not
/// reorder the steps; the order reflects internal dependency ordering the RPM
/// transaction executor relies on.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub steps: Vec<TransactionStep>,
}

impl Transaction {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, solvable: SolvableId, kind: TransactionStepKind) {
        self.steps.push(TransactionStep { solvable, kind });
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn installs(&self) -> impl Iterator<Item = SolvableId> + '_ {
        self.steps
            .iter()
            .filter(|s| s.kind == TransactionStepKind::Install)
            .map(|s| s.solvable)
    }

    pub fn erasures(&self) -> impl Iterator<Item = SolvableId> + '_ {
        self.steps
            .iter()
            .filter(|s| s.kind == TransactionStepKind::Erase)
            .map(|s| s.solvable)
    }

    pub fn upgrades(&self) -> impl Iterator<Item = SolvableId> + '_ {
        self.steps
            .iter()
            .filter(|s| s.kind == TransactionStepKind::Upgrade)
            .map(|s| s.solvable)
    }

    pub fn downgrades(&self) -> impl Iterator<Item = SolvableId> + '_ {
        self.steps
            .iter()
            .filter(|s| s.kind == TransactionStepKind::Downgrade)
            .map(|s| s.solvable)
    }

    pub fn of_kind(&self, kind: TransactionStepKind) -> impl Iterator<Item = SolvableId> + '_ {
        self.steps.iter().filter(move |s| s.kind == kind).map(|s| s.solvable)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::internal::arena::ArenaId;

    #[test]
    fn filters_by_kind() {
        let mut tx = Transaction::new();
        tx.push(SolvableId::from_usize(1), TransactionStepKind::Install);
        tx.push(SolvableId::from_usize(2), TransactionStepKind::Erase);
        assert_eq!(tx.installs().count(), 1);
        assert_eq!(tx.erasures().count(), 1);
    }
}
