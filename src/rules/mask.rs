//! Fixed-length legal-action mask aligned with the codec's id space.

use serde::{Deserialize, Serialize};

use crate::core::ActionId;

/// Bitset over `0..len` action ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionMask {
    words: Vec<u64>,
    len: usize,
}

impl ActionMask {
    /// An all-false mask.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Length of the id space (not the number of legal ids).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no action is legal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// # Panics
    ///
    /// Panics if `id` is outside the mask.
    pub fn insert(&mut self, id: ActionId) {
        let index = id.index();
        assert!(index < self.len, "action id {index} outside mask of length {}", self.len);
        self.words[index / 64] |= 1 << (index % 64);
    }

    #[must_use]
    pub fn contains(&self, id: ActionId) -> bool {
        let index = id.index();
        index < self.len && self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Number of legal ids.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Legal ids in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros();
                bits &= bits - 1;
                Some(ActionId((w * 64) as u32 + bit))
            })
        })
    }

    /// Dense boolean view, e.g. for a policy head.
    #[must_use]
    pub fn to_bools(&self) -> Vec<bool> {
        (0..self.len).map(|i| self.contains(ActionId(i as u32))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_contains() {
        let mut mask = ActionMask::new(130);
        assert!(mask.is_empty());

        mask.insert(ActionId(0));
        mask.insert(ActionId(64));
        mask.insert(ActionId(129));

        assert!(mask.contains(ActionId(64)));
        assert!(!mask.contains(ActionId(63)));
        assert!(!mask.contains(ActionId(500)));
        assert_eq!(mask.count(), 3);
        assert!(!mask.is_empty());
    }

    #[test]
    fn test_iter_in_order() {
        let mut mask = ActionMask::new(200);
        for id in [150, 3, 64, 65] {
            mask.insert(ActionId(id));
        }
        let ids: Vec<_> = mask.iter().map(ActionId::raw).collect();
        assert_eq!(ids, vec![3, 64, 65, 150]);
    }

    #[test]
    fn test_to_bools() {
        let mut mask = ActionMask::new(5);
        mask.insert(ActionId(1));
        mask.insert(ActionId(4));
        assert_eq!(mask.to_bools(), vec![false, true, false, false, true]);
    }

    #[test]
    #[should_panic(expected = "outside mask")]
    fn test_insert_out_of_range() {
        ActionMask::new(10).insert(ActionId(10));
    }
}
