//! Search Observer

use crate::combos::ComboId;

/// Observer trait for watching the combo search as it runs.
///
/// Callbacks fire for every branch the exhaustive search explores and every
/// time a branch replaces the best result at its depth. When no observer is
/// given the solver uses [`NoopObserver`] and the calls compile away.
pub trait SearchObserver {
    /// Called before recursing into a branch that applies `combo` `count` times.
    ///
    /// `depth` is the number of combos already chosen above this branch.
    fn on_branch(&mut self, depth: usize, combo: &ComboId, count: u32);

    /// Called when a branch becomes the best seen so far at `depth`.
    fn on_improvement(&mut self, _depth: usize, _total_discount_minor: i64) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_branch(&mut self, _depth: usize, _combo: &ComboId, _count: u32) {}
}

/// Observer that counts explored branches and improvements.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BranchCounter {
    /// Branches explored
    pub branches: u64,

    /// Times a branch replaced the best at its depth
    pub improvements: u64,

    /// Deepest level reached
    pub max_depth: usize,
}

impl SearchObserver for BranchCounter {
    fn on_branch(&mut self, depth: usize, _combo: &ComboId, _count: u32) {
        self.branches += 1;
        self.max_depth = self.max_depth.max(depth + 1);
    }

    fn on_improvement(&mut self, _depth: usize, _total_discount_minor: i64) {
        self.improvements += 1;
    }
}
