//! Equivalence classes over dense node identifiers, with a tombstone class.
//!
//! Tracks which original node identifiers have been merged into the same
//! surviving node. Removed identifiers are not ejected from the numbering:
//! they are unioned with a reserved "removed" sentinel class so that lookups
//! keep working after deletion.

use serde::{Deserialize, Serialize};

/// Compressed union-find over `0..len()` with a removed-sentinel class.
///
/// Before [`compress`](Self::compress), entries form a leader forest where
/// every parent index is no greater than its child. After compression each
/// entry holds a small dense class id, and growth and joins are forbidden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EqClasses {
    entries: Vec<u32>,
    /// Number of classes after compression; 0 while uncompressed.
    num_classes: u32,
    /// Identifier whose class is the removed class. Never unset.
    removed: Option<u32>,
}

impl EqClasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers ever added.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of classes after compression; 0 while uncompressed.
    pub fn num_classes(&self) -> u32 {
        self.num_classes
    }

    pub fn is_compressed(&self) -> bool {
        self.num_classes != 0
    }

    /// Add one identifier in its own singleton class, returning it.
    ///
    /// # Panics
    ///
    /// Panics if the structure has been compressed.
    pub fn grow_by_one(&mut self) -> u32 {
        assert!(!self.is_compressed(), "cannot grow compressed classes");
        let id = self.entries.len() as u32;
        self.entries.push(id);
        id
    }

    /// Leader of an identifier's class: the smallest member.
    ///
    /// # Panics
    ///
    /// Panics if the structure has been compressed or `id` is out of range.
    pub fn find_leader(&self, id: u32) -> u32 {
        assert!(!self.is_compressed(), "leaders only exist uncompressed");
        let mut cur = id as usize;
        while self.entries[cur] as usize != cur {
            cur = self.entries[cur] as usize;
        }
        cur as u32
    }

    /// Join the classes of `a` and `b`, returning the surviving leader.
    ///
    /// # Panics
    ///
    /// Panics if the structure has been compressed.
    pub fn join(&mut self, a: u32, b: u32) -> u32 {
        let la = self.find_leader(a);
        let lb = self.find_leader(b);
        let (lo, hi) = if la <= lb { (la, lb) } else { (lb, la) };
        self.entries[hi as usize] = lo;
        // Shorten the chains walked to reach the old leaders.
        self.entries[a as usize] = lo.min(a);
        self.entries[b as usize] = lo.min(b);
        lo
    }

    /// Union `id`'s class with the removed class. The first removal elects
    /// `id`'s class as the removed class.
    pub fn remove(&mut self, id: u32) {
        match self.removed {
            Some(sentinel) => {
                self.join(id, sentinel);
            }
            None => self.removed = Some(id),
        }
    }

    /// Whether `id`'s class is the removed class. Valid both before and
    /// after compression.
    pub fn is_removed(&self, id: u32) -> bool {
        let Some(sentinel) = self.removed else {
            return false;
        };
        self.same_class(id, sentinel)
    }

    /// Whether two identifiers are in the same class.
    pub fn same_class(&self, a: u32, b: u32) -> bool {
        if self.is_compressed() {
            self.entries[a as usize] == self.entries[b as usize]
        } else {
            self.find_leader(a) == self.find_leader(b)
        }
    }

    /// Renumber all classes to dense small integers, in order of their
    /// smallest member. Growth and joins are forbidden afterwards.
    pub fn compress(&mut self) {
        if self.is_compressed() {
            return;
        }
        let mut next = 0u32;
        for i in 0..self.entries.len() {
            let parent = self.entries[i] as usize;
            if parent == i {
                self.entries[i] = next;
                next += 1;
            } else {
                // The parent index is smaller than i, so its entry already
                // holds the class id.
                self.entries[i] = self.entries[parent];
            }
        }
        self.num_classes = next;
    }

    /// Dense class id of `id`, or `None` if `id` has been removed.
    ///
    /// # Panics
    ///
    /// Panics unless the structure has been compressed.
    pub fn class_id(&self, id: u32) -> Option<u32> {
        assert!(self.is_compressed(), "class ids require compression");
        if self.is_removed(id) {
            return None;
        }
        Some(self.entries[id as usize])
    }

    /// All identifiers sharing a class with `id`. Linear scan.
    pub fn members(&self, id: u32) -> Vec<u32> {
        (0..self.entries.len() as u32)
            .filter(|&other| self.same_class(id, other))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_then_join() {
        let mut eq = EqClasses::new();
        for _ in 0..4 {
            eq.grow_by_one();
        }
        assert_eq!(eq.len(), 4);
        assert!(!eq.same_class(0, 3));

        eq.join(0, 3);
        assert!(eq.same_class(0, 3));
        assert!(!eq.same_class(0, 1));
        assert_eq!(eq.find_leader(3), 0);
    }

    #[test]
    fn join_is_transitive() {
        let mut eq = EqClasses::new();
        for _ in 0..5 {
            eq.grow_by_one();
        }
        eq.join(1, 2);
        eq.join(2, 4);
        assert!(eq.same_class(1, 4));
        assert_eq!(eq.members(4), vec![1, 2, 4]);
    }

    #[test]
    fn removal_survives_compression() {
        let mut eq = EqClasses::new();
        for _ in 0..4 {
            eq.grow_by_one();
        }
        eq.remove(1);
        eq.remove(2);
        assert!(eq.is_removed(1));
        assert!(eq.is_removed(2));
        assert!(!eq.is_removed(0));

        eq.compress();
        assert!(eq.is_removed(1));
        assert!(eq.is_removed(2));
        assert_eq!(eq.class_id(1), None);
        assert_eq!(eq.class_id(0), Some(0));
    }

    #[test]
    fn compression_assigns_dense_ids() {
        let mut eq = EqClasses::new();
        for _ in 0..6 {
            eq.grow_by_one();
        }
        eq.join(0, 2);
        eq.join(3, 5);
        eq.compress();
        assert_eq!(eq.num_classes(), 4);
        assert_eq!(eq.class_id(0), eq.class_id(2));
        assert_eq!(eq.class_id(3), eq.class_id(5));
        assert_ne!(eq.class_id(0), eq.class_id(1));
        // Class ids are dense small integers.
        let max = (0..6).filter_map(|i| eq.class_id(i)).max().unwrap();
        assert!(max < 4);
    }

    #[test]
    #[should_panic]
    fn growth_after_compression_panics() {
        let mut eq = EqClasses::new();
        eq.grow_by_one();
        eq.compress();
        eq.grow_by_one();
    }
}
