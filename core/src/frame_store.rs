//! Frame store: the loaded snapshot sequence and the current index.
//!
//! RULE: every index write goes through `set_index`, which ignores
//! out-of-range requests. An empty store answers every query with
//! `None` or zero.

use crate::{
    error::ObserverResult,
    snapshot::{validate_sequence, Snapshot},
    types::FrameIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Back,
}

impl StepDirection {
    /// Index one step away from `from`, if it exists below `len`.
    pub fn apply(&self, from: FrameIndex, len: usize) -> Option<FrameIndex> {
        match self {
            Self::Forward => from.checked_add(1).filter(|next| *next < len),
            Self::Back    => from.checked_sub(1),
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameStore {
    frames:  Vec<Snapshot>,
    current: FrameIndex,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole sequence and rewind to frame 0.
    /// A malformed sequence is rejected and the previous one kept.
    pub fn load(&mut self, frames: Vec<Snapshot>) -> ObserverResult<()> {
        validate_sequence(&frames)?;
        self.frames = frames;
        self.current = 0;
        Ok(())
    }

    pub fn current_index(&self) -> FrameIndex {
        self.current
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last_index(&self) -> Option<FrameIndex> {
        self.frames.len().checked_sub(1)
    }

    pub fn is_at_last(&self) -> bool {
        self.last_index() == Some(self.current)
    }

    pub fn contains(&self, index: FrameIndex) -> bool {
        index < self.frames.len()
    }

    pub fn get(&self, index: FrameIndex) -> Option<&Snapshot> {
        self.frames.get(index)
    }

    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.frames.get(self.current)
    }

    /// Returns false, leaving the index alone, when `index` is out of range.
    pub fn set_index(&mut self, index: FrameIndex) -> bool {
        if !self.contains(index) {
            log::debug!("ignoring out-of-range frame {index} (have {})", self.frames.len());
            return false;
        }
        self.current = index;
        true
    }

    /// Move one frame. Returns whether the index moved.
    pub fn step(&mut self, direction: StepDirection) -> bool {
        match direction.apply(self.current, self.frames.len()) {
            Some(next) => self.set_index(next),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(n: usize) -> FrameStore {
        let mut store = FrameStore::new();
        store
            .load((0..n).map(|_| Snapshot::new(1000.0)).collect())
            .expect("valid frames");
        store
    }

    #[test]
    fn set_index_ignores_out_of_range() {
        let mut store = store_with(3);
        assert!(store.set_index(2));
        assert_eq!(store.current_index(), 2);
        assert!(!store.set_index(3));
        assert_eq!(store.current_index(), 2);
    }

    #[test]
    fn step_stops_at_both_ends() {
        let mut store = store_with(2);
        assert!(!store.step(StepDirection::Back));
        assert!(store.step(StepDirection::Forward));
        assert!(!store.step(StepDirection::Forward));
        assert_eq!(store.current_index(), 1);
        assert!(store.is_at_last());
    }

    #[test]
    fn empty_store_answers_none() {
        let mut store = store_with(0);
        assert!(store.current_snapshot().is_none());
        assert_eq!(store.last_index(), None);
        assert!(!store.step(StepDirection::Forward));
        assert!(!store.set_index(0));
        assert!(!store.is_at_last());
    }
}
