//! Word-backed bit set for explicit state sets.
//!
//! This module provides the storage behind [`ExplicitSet`][crate::symbolic::ExplicitSet]:
//! a dense bit vector with in-place set algebra. Indices are game node indices.

/// A bit set backed by a vector of u64 words.
///
/// Each bit corresponds to a node index. The bit set grows as needed when
/// inserting beyond the current capacity. Equality ignores trailing zero words,
/// so two sets with the same members compare equal regardless of capacity.
#[derive(Debug, Clone, Default)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of set bits (cached for O(1) len())
    count: usize,
}

impl BitSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    fn words_for(bits: usize) -> usize {
        (bits + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD
    }

    /// Creates a new empty bit set with the given capacity (in bits).
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; Self::words_for(capacity)],
            count: 0,
        }
    }

    /// Creates a bit set with the first `n` bits set.
    pub fn full(n: usize) -> Self {
        let mut words = vec![u64::MAX; Self::words_for(n)];
        let rem = n % Self::BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << rem) - 1;
            }
        }
        Self { words, count: n }
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        match self.words.get(word_idx) {
            Some(word) => word & (1u64 << bit_idx) != 0,
            None => false,
        }
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }
        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        if was_clear {
            self.words[word_idx] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        if word_idx >= self.words.len() {
            return false;
        }
        let mask = 1u64 << bit_idx;
        let was_set = self.words[word_idx] & mask != 0;
        if was_set {
            self.words[word_idx] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    fn recount(&mut self) {
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// In-place union: `self ∪= other`.
    pub fn union_with(&mut self, other: &BitSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
        self.recount();
    }

    /// In-place intersection: `self ∩= other`.
    pub fn intersect_with(&mut self, other: &BitSet) {
        for (i, a) in self.words.iter_mut().enumerate() {
            *a &= other.words.get(i).copied().unwrap_or(0);
        }
        self.recount();
    }

    /// In-place difference: `self ∖= other`.
    pub fn difference_with(&mut self, other: &BitSet) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
        self.recount();
    }

    /// In-place complement relative to the first `n` bits.
    pub fn complement_within(&mut self, n: usize) {
        let full = BitSet::full(n);
        self.words.resize(full.words.len().max(self.words.len()), 0);
        for (i, a) in self.words.iter_mut().enumerate() {
            *a = !*a & full.words.get(i).copied().unwrap_or(0);
        }
        self.recount();
    }

    /// Returns true if every bit of `self` is also set in `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(i, a)| a & !other.words.get(i).copied().unwrap_or(0) == 0)
    }

    /// Clears all bits.
    pub fn clear(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
        self.count = 0;
    }

    /// Returns an iterator over all set bit indices, in increasing order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        if self.count != other.count {
            return false;
        }
        let n = self.words.len().max(other.words.len());
        (0..n).all(|i| self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0))
    }
}

impl Eq for BitSet {}

impl Extend<usize> for BitSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for index in iter {
            self.insert(index);
        }
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut bs = BitSet::default();
        bs.extend(iter);
        bs
    }
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let bs = BitSet::default();
        assert!(bs.is_empty());
        assert_eq!(bs.len(), 0);
        assert!(!bs.contains(0));
        assert!(!bs.contains(100));
    }

    #[test]
    fn test_insert_remove() {
        let mut bs = BitSet::new(100);
        assert!(bs.insert(42));
        assert!(!bs.insert(42));
        assert!(bs.contains(42));
        assert!(bs.remove(42));
        assert!(!bs.remove(42));
        assert!(bs.is_empty());
    }

    #[test]
    fn test_full() {
        let bs = BitSet::full(70);
        assert_eq!(bs.len(), 70);
        assert!(bs.contains(0));
        assert!(bs.contains(69));
        assert!(!bs.contains(70));

        let exact = BitSet::full(64);
        assert_eq!(exact.len(), 64);
        assert!(!exact.contains(64));
    }

    #[test]
    fn test_iter_across_words() {
        let bs: BitSet = [5, 10, 3, 64, 65].into_iter().collect();
        let indices: Vec<_> = bs.iter().collect();
        assert_eq!(indices, vec![3, 5, 10, 64, 65]);
    }

    #[test]
    fn test_algebra() {
        let a: BitSet = [1, 2, 3, 100].into_iter().collect();
        let b: BitSet = [3, 4, 100].into_iter().collect();

        let mut u = a.clone();
        u.union_with(&b);
        assert_eq!(u.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 100]);

        let mut i = a.clone();
        i.intersect_with(&b);
        assert_eq!(i.iter().collect::<Vec<_>>(), vec![3, 100]);

        let mut d = a.clone();
        d.difference_with(&b);
        assert_eq!(d.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(d.is_subset(&a));
        assert!(!a.is_subset(&d));
    }

    #[test]
    fn test_complement_within() {
        let mut bs: BitSet = [0, 2].into_iter().collect();
        bs.complement_within(5);
        assert_eq!(bs.iter().collect::<Vec<_>>(), vec![1, 3, 4]);
        bs.complement_within(5);
        assert_eq!(bs.iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_eq_ignores_capacity() {
        let mut a = BitSet::new(1000);
        a.insert(7);
        let b: BitSet = [7].into_iter().collect();
        assert_eq!(a, b);
        a.insert(900);
        assert_ne!(a, b);
    }

    #[test]
    fn test_clear() {
        let mut bs: BitSet = [1, 50, 99].into_iter().collect();
        bs.clear();
        assert!(bs.is_empty());
        assert!(!bs.contains(50));
    }
}
