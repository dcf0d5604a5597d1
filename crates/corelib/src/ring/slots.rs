//! Sorted slot storage shared by both ring variants.
//!
//! # Invariants
//!
//! - `slots` is strictly increasing (sorted, no duplicates)
//! - `slots.len() == labels.len()`, and `labels[i]` owns `slots[i]`
//!
//! Every mutation goes through [`SlotTable::insert`] or
//! [`SlotTable::remove`], which keep both vectors aligned.

use crate::error::{Error, Result};

/// Parallel sorted vectors of slot positions and their labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTable {
    slots: Vec<u64>,
    labels: Vec<String>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binary search for `slot`.
    ///
    /// `Ok(i)` if the slot is occupied at index `i`, otherwise `Err(i)` with
    /// the index where it would be inserted.
    #[inline]
    pub fn search(&self, slot: u64) -> std::result::Result<usize, usize> {
        self.slots.binary_search(&slot)
    }

    /// Label occupying `slot`, if any.
    pub fn label_at(&self, slot: u64) -> Option<&str> {
        self.search(slot).ok().map(|i| self.labels[i].as_str())
    }

    /// Insert `label` at `slot`, keeping the table sorted.
    ///
    /// # Errors
    ///
    /// [`Error::Collision`] if the slot is already occupied; the table is
    /// left unchanged.
    pub fn insert(&mut self, slot: u64, label: String) -> Result<()> {
        match self.search(slot) {
            Ok(i) => Err(Error::Collision {
                slot,
                label,
                existing: self.labels[i].clone(),
            }),
            Err(i) => {
                self.slots.insert(i, slot);
                self.labels.insert(i, label);
                Ok(())
            }
        }
    }

    /// Remove `label` from `slot` and return it.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] unless `slot` is occupied by exactly `label`.
    pub fn remove(&mut self, slot: u64, label: &str) -> Result<String> {
        match self.search(slot) {
            Ok(i) if self.labels[i] == label => {
                self.slots.remove(i);
                Ok(self.labels.remove(i))
            }
            _ => Err(Error::NotFound(label.to_owned())),
        }
    }

    /// Label owning `slot`: the first occupied slot at or after it, wrapping
    /// to index 0 past the last slot. `None` only for an empty table.
    #[inline]
    pub fn successor(&self, slot: u64) -> Option<&str> {
        if self.slots.is_empty() {
            return None;
        }
        let mut index = self.slots.partition_point(|&s| s < slot);
        if index == self.slots.len() {
            index = 0;
        }
        Some(self.labels[index].as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(slot, label)` pairs in ring order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> + '_ {
        self.slots
            .iter()
            .copied()
            .zip(self.labels.iter().map(String::as_str))
    }

    /// Occupied slots in ascending order.
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    /// Labels, index-aligned with [`SlotTable::slots`].
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
