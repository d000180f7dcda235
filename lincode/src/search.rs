//! Exhaustive searches over error patterns and codewords.

use crate::element::Element;
use crate::error::ECCError;
use crate::linalg::{syndrome, vec_mat_mul_mod2};
use crate::shape::Dims;
use crate::tensor::{matrix_dims, Tensor};
use crate::view::{NdArray, NdArrayMut};
use rustc_hash::FxHashSet;

/// All binary vectors of a fixed length with weight up to `max_weight`
///
/// Iteration visits the weight classes in increasing order, so every vector of weight `w`
/// is produced before any vector of weight `w + 1`. Within a class the order is reverse
/// lexicographic: `1100` comes before `1010`. The generator can be iterated any number
/// of times, and each iteration starts over from the zero vector.
///
/// ```
/// use lincode::search::ErrorVectors;
/// use lincode::NdArray;
///
/// let patterns = ErrorVectors::new(4, 2).unwrap();
/// let weights: Vec<usize> = patterns.iter().map(|e| e.weight()).collect();
/// assert_eq!(weights, vec![0, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorVectors {
    length: usize,
    max_weight: usize,
}

impl ErrorVectors {
    /// # Errors
    ///
    /// `WeightExceedsLength` if `max_weight > length`
    pub fn new(length: usize, max_weight: usize) -> Result<Self, ECCError> {
        if max_weight > length {
            return Err(ECCError::WeightExceedsLength { max_weight, length });
        }
        Ok(ErrorVectors { length, max_weight })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn max_weight(&self) -> usize {
        self.max_weight
    }

    pub fn iter(&self) -> ErrorVectorsIter {
        ErrorVectorsIter {
            pattern: vec![0; self.length],
            weight: 0,
            max_weight: self.max_weight,
            done: false,
        }
    }
}

impl IntoIterator for &ErrorVectors {
    type Item = Tensor<u8>;
    type IntoIter = ErrorVectorsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator produced by [`ErrorVectors::iter`]
#[derive(Clone, Debug)]
pub struct ErrorVectorsIter {
    pattern: Vec<u8>,
    weight: usize,
    max_weight: usize,
    done: bool,
}

impl ErrorVectorsIter {
    /// Weight of the vector the next call to `next` yields
    pub fn weight(&self) -> usize {
        self.weight
    }
}

impl Iterator for ErrorVectorsIter {
    type Item = Tensor<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = Tensor::from_parts(Dims::from([self.pattern.len()]), self.pattern.clone());

        // stepping past the last pattern of a class leaves `1..10..0` behind, which only
        // needs one more leading one to become the first pattern of the next class
        if !prev_permutation(&mut self.pattern) {
            if self.weight == self.max_weight {
                self.done = true;
            } else {
                self.pattern[self.weight] = 1;
                self.weight += 1;
            }
        }
        Some(current)
    }
}

/// Rearranges `v` into the previous permutation in lexicographic order. If `v` is already
/// the smallest, sorts it descending and returns `false`.
fn prev_permutation<T: Ord>(v: &mut [T]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] <= v[i] {
        i -= 1;
    }
    if i == 0 {
        v.reverse();
        return false;
    }
    let mut j = v.len() - 1;
    while v[j] >= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

/// The parity pattern of a syndrome, usable as a hash key whatever the element type
pub(crate) fn syndrome_key<A: NdArray + ?Sized>(s: &A) -> Vec<u8> {
    s.iter().map(|x| u8::from(x.is_odd())).collect()
}

/// Smallest weight of a non-zero codeword in the row space of `g`
///
/// Enumerates all `2^k` combinations of the rows of `g`, so it is only practical for
/// small `k`. Rows are weighted by the bits of a binary counter, lowest bit first.
///
/// # Errors
///
/// `SearchTooLarge` if `2^k` is not addressable, `NoNonzeroCodeword` if every combination
/// is zero (e.g. a zero generator)
pub fn minimum_distance<A: NdArray>(g: &A) -> Result<usize, ECCError> {
    let (k, _) = matrix_dims(g)?;
    if k >= usize::BITS as usize {
        return Err(ECCError::SearchTooLarge { dimension: k });
    }

    let mut coefs = Tensor::<A::Elem>::zeros([k]);
    let mut min: Option<usize> = None;
    for counter in 1usize..(1 << k) {
        for bit in 0..k {
            coefs.set(&[bit], <A::Elem as Element>::from_bool((counter >> bit) & 1 == 1));
        }
        let w = vec_mat_mul_mod2(&coefs, g)?.weight();
        if w != 0 {
            min = Some(min.map_or(w, |m| m.min(w)));
        }
    }
    min.ok_or(ECCError::NoNonzeroCodeword)
}

/// Largest weight among the minimum-weight representatives of the cosets of the code
/// with check matrix `h`
///
/// Walks every error pattern of length `n` in increasing weight and records the weight of
/// each pattern whose syndrome is new. The walk stops as soon as all `2^(n-k)` syndromes
/// have been seen.
pub fn covering_radius<A: NdArray<Elem = u8>>(h: &A) -> Result<usize, ECCError> {
    let (redundancy, n) = matrix_dims(h)?;
    let cosets = u32::try_from(redundancy)
        .ok()
        .and_then(|r| 1usize.checked_shl(r));

    let mut seen = FxHashSet::default();
    let mut radius = 0;
    for e in &ErrorVectors::new(n, n)? {
        if seen.insert(syndrome_key(&syndrome(h, &e)?)) {
            radius = radius.max(e.weight());
            if Some(seen.len()) == cosets {
                break;
            }
        }
    }
    log::debug!("covering radius {radius} over {} syndromes", seen.len());
    Ok(radius)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::linalg::dual_code;

    #[test]
    fn patterns_in_weight_then_reverse_lex_order() {
        let patterns: Vec<Vec<u8>> = ErrorVectors::new(4, 2)
            .unwrap()
            .iter()
            .map(Tensor::into_vec)
            .collect();
        assert_eq!(
            patterns,
            vec![
                vec![0, 0, 0, 0],
                vec![1, 0, 0, 0],
                vec![0, 1, 0, 0],
                vec![0, 0, 1, 0],
                vec![0, 0, 0, 1],
                vec![1, 1, 0, 0],
                vec![1, 0, 1, 0],
                vec![1, 0, 0, 1],
                vec![0, 1, 1, 0],
                vec![0, 1, 0, 1],
                vec![0, 0, 1, 1],
            ]
        );
    }

    #[test]
    fn pattern_counts_are_binomial_sums() {
        for (n, w, count) in [(0, 0, 1), (1, 1, 2), (5, 5, 32), (7, 1, 8), (10, 3, 176)] {
            let patterns = ErrorVectors::new(n, w).unwrap();
            assert_eq!(patterns.iter().count(), count, "n = {n}, w = {w}");
        }
    }

    #[test]
    fn generator_restarts() {
        let patterns = ErrorVectors::new(6, 2).unwrap();
        let first: Vec<_> = patterns.iter().collect();
        let second: Vec<_> = (&patterns).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn iterator_reports_upcoming_weight() {
        let patterns = ErrorVectors::new(3, 3).unwrap();
        let mut it = patterns.iter();
        loop {
            let w = it.weight();
            match it.next() {
                Some(e) => assert_eq!(e.weight(), w),
                None => break,
            }
        }
    }

    #[test]
    fn weight_cannot_exceed_length() {
        assert!(matches!(
            ErrorVectors::new(3, 4),
            Err(ECCError::WeightExceedsLength {
                max_weight: 4,
                length: 3
            })
        ));
    }

    #[test]
    fn prev_permutation_steps_down() {
        let mut v = [1, 0, 1];
        assert!(prev_permutation(&mut v));
        assert_eq!(v, [0, 1, 1]);
        let mut v = [0, 0, 1, 1];
        let mut n = 1;
        while prev_permutation(&mut v) {
            n += 1;
        }
        assert_eq!(n, 1);
        assert_eq!(v, [1, 1, 0, 0]);
    }

    fn hamming74() -> Tensor<u8> {
        Tensor::from_rows(&[
            vec![1, 0, 0, 0, 1, 1, 0],
            vec![0, 1, 0, 0, 1, 0, 1],
            vec![0, 0, 1, 0, 0, 1, 1],
            vec![0, 0, 0, 1, 1, 1, 1],
        ])
        .unwrap()
    }

    #[test]
    fn hamming_distance_and_radius() {
        let g = hamming74();
        assert_eq!(minimum_distance(&g).unwrap(), 3);
        let h = dual_code(&g).unwrap();
        assert_eq!(covering_radius(&h).unwrap(), 1);
    }

    #[test]
    fn distance_may_exceed_dimension() {
        let repetition = Tensor::<u8>::ones([1, 5]);
        assert_eq!(minimum_distance(&repetition).unwrap(), 5);
        let h = dual_code(&repetition).unwrap();
        assert_eq!(covering_radius(&h).unwrap(), 2);
    }

    #[test]
    fn zero_generator_has_no_distance() {
        assert!(matches!(
            minimum_distance(&Tensor::<u8>::zeros([2, 4])),
            Err(ECCError::NoNonzeroCodeword)
        ));
    }
}
