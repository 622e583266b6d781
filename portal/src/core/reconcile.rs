//! Set reconciliation for many-to-many memberships.
//!
//! The backend can only attach or detach one member at a time, so syncing an
//! edited membership means computing the minimal set of those calls.

use std::collections::BTreeSet;

use crate::core::ids::ProfessorId;

/// Members to attach and detach. Both sets iterate in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff<T: Ord> {
    pub added: BTreeSet<T>,
    pub removed: BTreeSet<T>,
}

impl<T: Ord + Clone> Diff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// `(base ∪ added) \ removed`.
    pub fn apply_to(&self, base: &BTreeSet<T>) -> BTreeSet<T> {
        base.union(&self.added)
            .filter(|member| !self.removed.contains(*member))
            .cloned()
            .collect()
    }
}

/// `added = current \ original`, `removed = original \ current`.
///
/// The two results are disjoint because each is taken against the other set.
pub fn reconcile<T: Ord + Clone>(original: &BTreeSet<T>, current: &BTreeSet<T>) -> Diff<T> {
    Diff {
        added: current.difference(original).cloned().collect(),
        removed: original.difference(current).cloned().collect(),
    }
}

/// Professors assigned to one course: the loaded snapshot plus the edited set.
///
/// `original` is captured once at load time and never changes; only
/// `current` is edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    original: BTreeSet<ProfessorId>,
    current: BTreeSet<ProfessorId>,
}

impl Assignment {
    pub fn loaded(ids: impl IntoIterator<Item = ProfessorId>) -> Self {
        let original: BTreeSet<ProfessorId> = ids.into_iter().collect();
        Self {
            current: original.clone(),
            original,
        }
    }

    pub fn original(&self) -> &BTreeSet<ProfessorId> {
        &self.original
    }

    pub fn current(&self) -> &BTreeSet<ProfessorId> {
        &self.current
    }

    /// Returns `false` if the professor was already assigned.
    pub fn assign(&mut self, professor: ProfessorId) -> bool {
        self.current.insert(professor)
    }

    /// Returns `false` if the professor was not assigned.
    pub fn unassign(&mut self, professor: &ProfessorId) -> bool {
        self.current.remove(professor)
    }

    pub fn diff(&self) -> Diff<ProfessorId> {
        reconcile(&self.original, &self.current)
    }

    pub fn is_dirty(&self) -> bool {
        self.original != self.current
    }
}
