//! CNF clauses: the hard-dependency rules the CDCL search is built from.

use crate::internal::arena::Arena;
use crate::internal::id::{LearntClauseId, ReldepId, SolvableId};
use crate::solver::decision_map::DecisionMap;
use std::fmt;

/// A literal: a solvable id together with whether it is negated in this clause.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct Literal {
    pub(crate) solvable_id: SolvableId,
    pub(crate) negate: bool,
}

impl Literal {
    /// The value this literal needs the solvable to have in order to satisfy the
    /// clause it belongs to.
    pub(crate) fn satisfying_value(self) -> bool {
        !self.negate
    }

    /// `Some(true)` if the literal is currently satisfied, `Some(false)` if currently
    /// falsified, `None` if the solvable is undecided.
    pub(crate) fn eval(self, decision_map: &DecisionMap) -> Option<bool> {
        decision_map
            .value(self.solvable_id)
            .map(|value| value == self.satisfying_value())
    }
}

/// The semantic content of a clause: what kind of rule it is and the solvables/reldep
/// it concerns. Kept separate from the watched-literal bookkeeping in
/// [`ClauseState`].
#[derive(Debug, Clone)]
pub(crate) enum Clause {
    /// The synthetic root solvable must be installed. Seeds the search; not watched.
    InstallRoot,
    /// `parent` requires `dep`; satisfying the clause means installing `parent`
    /// implies installing one of `candidates` (the whatprovides set for `dep`,
    /// captured at clause construction time).
    Requires {
        parent: SolvableId,
        dep: ReldepId,
        candidates: Vec<SolvableId>,
    },
    /// `a` and `b` may not both be installed, because one's `conflicts` matched the
    /// other (`dep` names the reldep that matched, for problem reporting).
    Conflicts {
        a: SolvableId,
        b: SolvableId,
        dep: ReldepId,
    },
    /// `a` and `b` share a name that is not installonly; only one variant may ever be
    /// installed at a time.
    ForbidMultipleInstances { a: SolvableId, b: SolvableId },
    /// `obsoleter` obsoletes `obsoleted`; both may not be installed simultaneously.
    Obsoletes {
        obsoleter: SolvableId,
        obsoleted: SolvableId,
    },
    /// `forbidden` is locked out because a different same-name solvable was locked by
    /// a job.
    Lock { forbidden: SolvableId },
    /// A clause learnt during conflict analysis.
    Learnt(LearntClauseId),
}

impl Clause {
    /// Computes the literals of this clause, resolving `Learnt` against the solver's
    /// learnt-clause arena.
    pub(crate) fn literals(&self, learnt_clauses: &Arena<LearntClauseId, Vec<Literal>>) -> Vec<Literal> {
        match self {
            Clause::InstallRoot => vec![Literal {
                solvable_id: SolvableId::root(),
                negate: false,
            }],
            Clause::Requires {
                parent, candidates, ..
            } => {
                let mut literals = Vec::with_capacity(candidates.len() + 1);
                literals.push(Literal {
                    solvable_id: *parent,
                    negate: true,
                });
                literals.extend(candidates.iter().map(|&c| Literal {
                    solvable_id: c,
                    negate: false,
                }));
                literals
            }
            Clause::Conflicts { a, b, .. } | Clause::ForbidMultipleInstances { a, b } => vec![
                Literal {
                    solvable_id: *a,
                    negate: true,
                },
                Literal {
                    solvable_id: *b,
                    negate: true,
                },
            ],
            Clause::Obsoletes { obsoleter, obsoleted } => vec![
                Literal {
                    solvable_id: *obsoleter,
                    negate: true,
                },
                Literal {
                    solvable_id: *obsoleted,
                    negate: true,
                },
            ],
            Clause::Lock { forbidden } => vec![Literal {
                solvable_id: *forbidden,
                negate: true,
            }],
            Clause::Learnt(id) => learnt_clauses[*id].clone(),
        }
    }
}

/// A clause together with its current two watched literals. Two watches per clause is
/// the standard CDCL invariant: as long as a clause has two literals that are either
/// satisfied or undecided, it cannot yet force a decision.
#[derive(Debug, Clone)]
pub(crate) struct ClauseState {
    pub(crate) kind: Clause,
    literals: Vec<Literal>,
    /// Indices into `literals` of the (up to) two currently watched literals. Equal
    /// to each other (both zero) when the clause has fewer than two literals, i.e. is
    /// an assertion handled outside the watch scheme.
    watch_indices: [usize; 2],
}

impl ClauseState {
    pub(crate) fn new(kind: Clause, learnt_clauses: &Arena<LearntClauseId, Vec<Literal>>) -> Self {
        let literals = kind.literals(learnt_clauses);
        let watch_indices = if literals.len() >= 2 { [0, 1] } else { [0, 0] };
        Self {
            kind,
            literals,
            watch_indices,
        }
    }

    pub(crate) fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// A clause with fewer than two literals can never be re-watched on conflict; it
    /// is propagated directly as an assignment rather than through the watch lists.
    pub(crate) fn is_assertion(&self) -> bool {
        self.literals.len() < 2
    }

    pub(crate) fn has_watches(&self) -> bool {
        self.literals.len() >= 2
    }

    pub(crate) fn watched_solvables(&self) -> [SolvableId; 2] {
        [
            self.literals[self.watch_indices[0]].solvable_id,
            self.literals[self.watch_indices[1]].solvable_id,
        ]
    }

    pub(crate) fn watched_literals(&self) -> [Literal; 2] {
        [
            self.literals[self.watch_indices[0]],
            self.literals[self.watch_indices[1]],
        ]
    }

    /// Index (0 or 1) of the watch slot currently pointed at `solvable`, if any.
    pub(crate) fn watch_index_for(&self, solvable: SolvableId) -> Option<usize> {
        if self.literals[self.watch_indices[0]].solvable_id == solvable {
            Some(0)
        } else if self.literals[self.watch_indices[1]].solvable_id == solvable {
            Some(1)
        } else {
            None
        }
    }

    /// Looks for a literal other than the two currently watched ones that is not
    /// falsified under `decision_map`. If found, moves the watch at `watch_index`
    /// there and returns the new watched solvable.
    pub(crate) fn find_new_watch(
        &mut self,
        watch_index: usize,
        decision_map: &DecisionMap,
    ) -> Option<SolvableId> {
        let other_index = self.watch_indices[1 - watch_index];
        for (i, literal) in self.literals.iter().enumerate() {
            if i == other_index || i == self.watch_indices[watch_index] {
                continue;
            }
            if literal.eval(decision_map) != Some(false) {
                self.watch_indices[watch_index] = i;
                return Some(literal.solvable_id);
            }
        }
        None
    }

    /// The literal still watched after `find_new_watch` fails to find a replacement:
    /// the clause now forces this literal's value (unit propagation), unless it's
    /// already satisfied.
    pub(crate) fn unit_literal(&self, watch_index: usize) -> Literal {
        self.literals[self.watch_indices[1 - watch_index]]
    }
}

pub(crate) struct ClauseDebug<'a> {
    pub(crate) clause: &'a ClauseState,
    pub(crate) resolve: &'a dyn Fn(SolvableId) -> String,
}

impl<'a> fmt::Display for ClauseDebug<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.clause.kind {
            Clause::InstallRoot => write!(f, "install root"),
            Clause::Requires { parent, .. } => {
                write!(f, "{} requires a dependency with no remaining candidates", (self.resolve)(*parent))
            }
            Clause::Conflicts { a, b, .. } => {
                write!(f, "{} conflicts with {}", (self.resolve)(*a), (self.resolve)(*b))
            }
            Clause::ForbidMultipleInstances { a, b } => {
                write!(f, "only one of {} and {} may be installed", (self.resolve)(*a), (self.resolve)(*b))
            }
            Clause::Obsoletes { obsoleter, obsoleted } => {
                write!(f, "{} obsoletes {}", (self.resolve)(*obsoleter), (self.resolve)(*obsoleted))
            }
            Clause::Lock { forbidden } => {
                write!(f, "{} is locked out by a conflicting lock job", (self.resolve)(*forbidden))
            }
            Clause::Learnt(id) => write!(f, "learnt clause #{}", id.to_usize_for_debug()),
        }
    }
}

impl LearntClauseId {
    fn to_usize_for_debug(self) -> usize {
        use crate::internal::arena::ArenaId;
        self.to_usize()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sid(i: usize) -> SolvableId {
        use crate::internal::arena::ArenaId;
        SolvableId::from_usize(i)
    }

    #[test]
    fn requires_clause_literals() {
        let learnt = Arena::new();
        let clause = Clause::Requires {
            parent: sid(1),
            dep: crate::internal::id::ReldepId::from_usize(0),
            candidates: vec![sid(2), sid(3)],
        };
        let state = ClauseState::new(clause, &learnt);
        assert_eq!(state.literals().len(), 3);
        assert!(state.literals()[0].negate);
        assert!(!state.literals()[1].negate);
    }

    #[test]
    fn lock_clause_is_assertion() {
        let learnt = Arena::new();
        let clause = Clause::Lock { forbidden: sid(1) };
        let state = ClauseState::new(clause, &learnt);
        assert!(state.is_assertion());
        assert!(!state.has_watches());
    }

    #[test]
    fn literal_satisfying_value() {
        let positive = Literal {
            solvable_id: sid(1),
            negate: false,
        };
        let negative = Literal {
            solvable_id: sid(1),
            negate: true,
        };
        assert!(positive.satisfying_value());
        assert!(!negative.satisfying_value());
    }
}
