//! Ordered collection of task references.

use std::fmt;
use std::sync::Arc;

use super::task::same_task;
use super::{TaskRef, Tasker};

/// Ordered sequence of tasks. Order carries no scheduling meaning.
///
/// Membership is by reference identity, never by attribute equality.
#[derive(Clone, Default)]
pub struct Tasks {
    items: Vec<TaskRef>,
}

impl Tasks {
    /// Empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Sum of member weights, saturating at `u64::MAX`.
    #[must_use]
    pub fn weight(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |total, task| total.saturating_add(task.weight()))
    }

    /// Members currently not locked, in order.
    #[must_use]
    pub fn unlocked(&self) -> Self {
        self.items
            .iter()
            .filter(|task| !task.is_locked())
            .cloned()
            .collect()
    }

    /// Members currently locked, in order.
    #[must_use]
    pub fn locked(&self) -> Self {
        self.items
            .iter()
            .filter(|task| task.is_locked())
            .cloned()
            .collect()
    }

    /// Walk members accumulating weight; return the first whose running
    /// total exceeds `point`.
    ///
    /// With `point` drawn uniformly from `[0, weight())` this selects each
    /// member with probability proportional to its weight.
    #[must_use]
    pub fn pick(&self, point: u64) -> Option<&TaskRef> {
        let mut current = 0u64;
        for task in &self.items {
            current = current.saturating_add(task.weight());
            if point < current {
                return Some(task);
            }
        }
        None
    }

    /// Reference-identity membership test. Accepts concrete handles such as
    /// `Arc<Task>` as well as [`TaskRef`].
    #[must_use]
    pub fn contains<T: Tasker + ?Sized>(&self, task: &Arc<T>) -> bool {
        self.items.iter().any(|t| same_task(t, task))
    }

    /// Append `task` unless already present. Returns whether it was added.
    pub fn push_unique(&mut self, task: TaskRef) -> bool {
        if self.contains(&task) {
            return false;
        }
        self.items.push(task);
        true
    }

    /// Drop every member that is one of `tasks`. Returns how many were removed.
    pub fn remove_all(&mut self, tasks: &[TaskRef]) -> usize {
        let before = self.items.len();
        self.items
            .retain(|t| !tasks.iter().any(|gone| same_task(t, gone)));
        before - self.items.len()
    }

    /// Remove every member.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate members in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskRef> {
        self.items.iter()
    }

    /// Borrow the members as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[TaskRef] {
        &self.items
    }
}

impl FromIterator<TaskRef> for Tasks {
    fn from_iter<I: IntoIterator<Item = TaskRef>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<TaskRef>> for Tasks {
    fn from(items: Vec<TaskRef>) -> Self {
        Self { items }
    }
}

impl IntoIterator for Tasks {
    type Item = TaskRef;
    type IntoIter = std::vec::IntoIter<TaskRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tasks {
    type Item = &'a TaskRef;
    type IntoIter = std::slice::Iter<'a, TaskRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Tasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, task) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{task}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Debug for Tasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}
