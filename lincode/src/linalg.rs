//! Linear algebra over GF(2) on top of [`NdArray`].
//!
//! Entries may be arbitrary integers; every routine here reduces them modulo 2.

use crate::element::Element;
use crate::error::{LinAlgError, ShapeError};
use crate::shape::Dims;
use crate::tensor::{matrix_dims, Tensor};
use crate::view::{NdArray, NdArrayMut};

/// Elementary row operations over GF(2)
pub trait RowOps {
    /// Adds row `from` onto row `to`, modulo 2
    fn add_row(&mut self, from: usize, to: usize);
    fn swap_rows(&mut self, from: usize, to: usize);
}

impl<M: NdArrayMut> RowOps for M {
    fn add_row(&mut self, from: usize, to: usize) {
        for j in 0..self.shape().extent(1) {
            let v = self.at(&[from, j]);
            let x = self.at_mut(&[to, j]);
            *x = x.add_mod2(v);
        }
    }

    fn swap_rows(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        for j in 0..self.shape().extent(1) {
            let tmp = self.at(&[from, j]);
            let v = self.at(&[to, j]);
            self.set(&[from, j], v);
            self.set(&[to, j], tmp);
        }
    }
}

/// Gauss-Jordan elimination that expects a pivot on the diagonal of every pivot column
///
/// With `homogeneous` set, the first `min(rows, cols)` columns are pivot columns. Otherwise
/// the last column is treated as a right-hand side and the first `cols - 1` columns are
/// pivot columns. On success the pivot block is the identity and every other row is zero
/// in the pivot columns. The matrix is reduced modulo 2 first.
///
/// # Errors
///
/// `NoPivot` for the first pivot column with no odd entry at or below the diagonal. The
/// matrix is left partially reduced in that case.
pub fn gauss_reduce<M: NdArrayMut>(m: &mut M, homogeneous: bool) -> Result<(), LinAlgError> {
    let (rows, cols) = matrix_dims(m)?;
    let pivot_cols = if homogeneous {
        rows.min(cols)
    } else {
        cols.saturating_sub(1)
    };
    m.reduce_mod2();

    for j in 0..pivot_cols {
        let pivot = (j..rows)
            .find(|&i| m.at(&[i, j]).is_odd())
            .ok_or(LinAlgError::NoPivot { column: j })?;
        if pivot != j {
            m.swap_rows(pivot, j);
        }
        for i in 0..rows {
            if i != j && m.at(&[i, j]).is_odd() {
                m.add_row(j, i);
            }
        }
    }
    Ok(())
}

/// Brings a matrix into reduced row echelon form and returns the pivot columns
///
/// Unlike [`gauss_reduce`] this never fails on a singular block: columns without a pivot
/// are skipped, so the number of pivots is the rank.
pub fn reduced_echelon<M: NdArrayMut>(m: &mut M) -> Result<Vec<usize>, ShapeError> {
    let (rows, cols) = matrix_dims(m)?;
    m.reduce_mod2();

    let mut row = 0;
    let mut pcol = 0;
    let mut pcols = vec![];
    while row < rows {
        let mut next_row = None;
        'outer: while pcol < cols {
            for i in row..rows {
                if m.at(&[i, pcol]).is_odd() {
                    next_row = Some(i);
                    break 'outer;
                }
            }
            pcol += 1;
        }

        if let Some(row1) = next_row {
            if row != row1 {
                m.swap_rows(row, row1);
            }
            for i in (row1 + 1)..rows {
                if m.at(&[i, pcol]).is_odd() {
                    m.add_row(row, i);
                }
            }
            row += 1;
            pcols.push(pcol);
            pcol += 1;
        } else {
            break;
        }
    }

    for (row, &pcol) in pcols.iter().enumerate().rev() {
        for i in 0..row {
            if m.at(&[i, pcol]).is_odd() {
                m.add_row(row, i);
            }
        }
    }

    Ok(pcols)
}

/// Rank over GF(2)
pub fn rank<A: NdArray>(m: &A) -> Result<usize, ShapeError> {
    Ok(reduced_echelon(&mut m.to_tensor())?.len())
}

/// Computes a full-rank parity-check matrix of the code generated by the rows of `g`
///
/// For a `k x n` generator the result is `(n - k) x n`, and every row of it is
/// orthogonal to every row of `g` over GF(2). When the leading `k x k` block of `g`
/// reduces to the identity, the result has the systematic form `[A^t | I]` where
/// `[I | A]` is the reduced generator. Otherwise pivots are taken wherever they occur.
///
/// # Errors
///
/// `RankDeficient` if the rows of `g` are linearly dependent.
pub fn dual_code<A: NdArray>(g: &A) -> Result<Tensor<A::Elem>, LinAlgError> {
    let (k, n) = matrix_dims(g)?;
    if k > n {
        return Err(LinAlgError::RankDeficient { rank: n, rows: k });
    }

    let mut reduced = g.to_tensor();
    match gauss_reduce(&mut reduced, true) {
        Ok(()) => Ok(systematic_dual(&reduced, k, n)?),
        Err(LinAlgError::NoPivot { column }) => {
            log::debug!("no pivot in column {column}, reducing {k}x{n} generator with column pivoting");
            let mut reduced = g.to_tensor();
            let pivots = reduced_echelon(&mut reduced)?;
            if pivots.len() < k {
                return Err(LinAlgError::RankDeficient {
                    rank: pivots.len(),
                    rows: k,
                });
            }
            Ok(pivoted_dual(&reduced, &pivots, n))
        }
        Err(e) => Err(e),
    }
}

/// `[A^t | I]` from a generator reduced to `[I | A]`. Over GF(2), `-A^t` is `A^t`.
fn systematic_dual<T: Element>(reduced: &Tensor<T>, k: usize, n: usize) -> Result<Tensor<T>, ShapeError> {
    let r = n - k;
    let mut h = Tensor::zeros([r, n]);
    let a = reduced.window(&[0, k], &[k, r])?;
    h.window_mut(&[0, 0], &[r, k])?.assign_transposed(&a)?;
    h.window_mut(&[0, k], &[r, r])?.assign(&Tensor::identity(r))?;
    Ok(h)
}

/// One check row per free column `f`: a one at `f`, and the entries of column `f` of the
/// reduced generator at the pivot columns.
fn pivoted_dual<T: Element>(reduced: &Tensor<T>, pivots: &[usize], n: usize) -> Tensor<T> {
    let free: Vec<usize> = (0..n).filter(|c| !pivots.contains(c)).collect();
    let mut h = Tensor::zeros([free.len(), n]);
    for (r, &f) in free.iter().enumerate() {
        h[[r, f]] = T::ONE;
        for (i, &p) in pivots.iter().enumerate() {
            h[[r, p]] = reduced[[i, f]];
        }
    }
    h
}

/// Finds the coefficient vector `x` of length `k` with `x G = b` over GF(2)
///
/// Reduces the `n x (k + 1)` augmented matrix `[G^t | b^t]`, built through windows and a
/// broadcast of `b`, and reads `x` off the last column.
///
/// # Errors
///
/// `NoPivot` if the rows of `g` are dependent, and `NotInRowSpace` if `b` is not a
/// combination of them.
pub fn solve<A, B>(g: &A, b: &B) -> Result<Tensor<A::Elem>, LinAlgError>
where
    A: NdArray,
    B: NdArray<Elem = A::Elem>,
{
    let (k, n) = matrix_dims(g)?;
    if b.shape() != Dims::from([n]).as_shape() {
        return Err(ShapeError::DimensionMismatch {
            expected: Dims::from([n]),
            found: b.shape().to_dims(),
        }
        .into());
    }

    let mut aug = Tensor::zeros([n, k + 1]);
    aug.window_mut(&[0, 0], &[n, k])?.assign_transposed(g)?;
    aug.window_mut(&[0, k], &[n, 1])?.assign_transposed(&b.repeat(1))?;
    gauss_reduce(&mut aug, false)?;

    if (k..n).any(|i| aug[[i, k]].is_odd()) {
        return Err(LinAlgError::NotInRowSpace);
    }
    Ok(Tensor::build([k], |idx| aug[[idx[0], k]]))
}

/// Integer matrix product
pub fn matmul<A, B>(a: &A, b: &B) -> Result<Tensor<A::Elem>, ShapeError>
where
    A: NdArray,
    B: NdArray<Elem = A::Elem>,
{
    product(a, b, |acc, x, y| acc + x * y)
}

/// Matrix product over GF(2), reducing after every term so no intermediate can overflow
pub fn matmul_mod2<A, B>(a: &A, b: &B) -> Result<Tensor<A::Elem>, ShapeError>
where
    A: NdArray,
    B: NdArray<Elem = A::Elem>,
{
    product(a, b, |acc, x, y| acc.add_mod2(x.mul_mod2(y)))
}

fn product<A, B>(
    a: &A,
    b: &B,
    step: impl Fn(A::Elem, A::Elem, A::Elem) -> A::Elem,
) -> Result<Tensor<A::Elem>, ShapeError>
where
    A: NdArray,
    B: NdArray<Elem = A::Elem>,
{
    let (rows, inner) = matrix_dims(a)?;
    let (inner2, cols) = matrix_dims(b)?;
    if inner != inner2 {
        return Err(ShapeError::DimensionMismatch {
            expected: Dims::from([inner, cols]),
            found: b.shape().to_dims(),
        });
    }
    Ok(Tensor::build([rows, cols], |idx| {
        (0..inner).fold(<A::Elem as Element>::ZERO, |acc, l| {
            step(acc, a.at(&[idx[0], l]), b.at(&[l, idx[1]]))
        })
    }))
}

/// `a * b^t` over GF(2): entry `(i, j)` is the parity of row `i` of `a` dotted with row `j`
/// of `b`
pub fn mul_transpose_mod2<A, B>(a: &A, b: &B) -> Result<Tensor<A::Elem>, ShapeError>
where
    A: NdArray,
    B: NdArray<Elem = A::Elem>,
{
    let (rows, inner) = matrix_dims(a)?;
    let (cols, inner2) = matrix_dims(b)?;
    if inner != inner2 {
        return Err(ShapeError::DimensionMismatch {
            expected: Dims::from([cols, inner]),
            found: b.shape().to_dims(),
        });
    }
    Ok(Tensor::build([rows, cols], |idx| {
        let (x, y) = (a.row(idx[0]), b.row(idx[1]));
        (0..inner).fold(<A::Elem as Element>::ZERO, |acc, l| {
            acc.add_mod2(x.at(&[l]).mul_mod2(y.at(&[l])))
        })
    }))
}

fn check_vectors<A, B>(a: &A, b: &B) -> Result<usize, ShapeError>
where
    A: NdArray + ?Sized,
    B: NdArray + ?Sized,
{
    if a.rank() != 1 {
        return Err(ShapeError::RankMismatch {
            expected: 1,
            found: a.rank(),
        });
    }
    if a.shape() != b.shape() {
        return Err(ShapeError::mismatch(a.shape(), b.shape()));
    }
    Ok(a.len())
}

/// Integer dot product of two vectors of equal length
pub fn dot<A, B>(a: &A, b: &B) -> Result<A::Elem, ShapeError>
where
    A: NdArray + ?Sized,
    B: NdArray<Elem = A::Elem> + ?Sized,
{
    let len = check_vectors(a, b)?;
    Ok((0..len).fold(<A::Elem as Element>::ZERO, |acc, i| acc + a.at(&[i]) * b.at(&[i])))
}

/// Dot product over GF(2)
pub fn dot_mod2<A, B>(a: &A, b: &B) -> Result<A::Elem, ShapeError>
where
    A: NdArray + ?Sized,
    B: NdArray<Elem = A::Elem> + ?Sized,
{
    let len = check_vectors(a, b)?;
    Ok((0..len).fold(<A::Elem as Element>::ZERO, |acc, i| {
        acc.add_mod2(a.at(&[i]).mul_mod2(b.at(&[i])))
    }))
}

/// Row vector times matrix over GF(2), e.g. encoding a message with a generator
pub fn vec_mat_mul_mod2<V, M>(v: &V, m: &M) -> Result<Tensor<V::Elem>, ShapeError>
where
    V: NdArray,
    M: NdArray<Elem = V::Elem>,
{
    let row = matmul_mod2(&v.repeat(1), m)?;
    Ok(row.row(0).to_tensor())
}

/// The syndrome `H w^t` of a word `w` under the check matrix `h`, as a vector
pub fn syndrome<H, W>(h: &H, w: &W) -> Result<Tensor<H::Elem>, ShapeError>
where
    H: NdArray,
    W: NdArray<Elem = H::Elem>,
{
    let s = mul_transpose_mod2(&w.repeat(1), h)?;
    Ok(s.row(0).to_tensor())
}

/// Returns `true` if every row of `a` is orthogonal to every row of `b` over GF(2)
pub fn is_orthogonal<A, B>(a: &A, b: &B) -> Result<bool, ShapeError>
where
    A: NdArray,
    B: NdArray<Elem = A::Elem>,
{
    Ok(mul_transpose_mod2(a, b)?.weight() == 0)
}

/// Returns `true` if the rows of `g` are pairwise orthogonal, each row included
pub fn is_self_orthogonal<A: NdArray>(g: &A) -> Result<bool, ShapeError> {
    is_orthogonal(g, g)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn bits(rows: &[&[u8]]) -> Tensor<u8> {
        Tensor::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn gauss_reduce_produces_identity_block() {
        let mut m = bits(&[&[0, 1, 1, 0], &[1, 1, 0, 1], &[1, 0, 0, 0]]);
        gauss_reduce(&mut m, true).unwrap();
        let left = m.window(&[0, 0], &[3, 3]).unwrap();
        assert!(left.nd_eq(&Tensor::identity(3)));
    }

    #[test]
    fn gauss_reduce_reports_missing_pivot() {
        let mut m = bits(&[&[0, 1, 1], &[0, 1, 0]]);
        assert_eq!(
            gauss_reduce(&mut m, true),
            Err(LinAlgError::NoPivot { column: 0 })
        );
        assert_eq!(
            gauss_reduce(&mut Tensor::<u8>::zeros([3]), true),
            Err(LinAlgError::Shape(ShapeError::RankMismatch {
                expected: 2,
                found: 1
            }))
        );
    }

    #[test]
    fn gauss_reduce_on_a_window() {
        let mut m = Tensor::<u8>::zeros([4, 5]);
        m.window_mut(&[1, 1], &[3, 3])
            .unwrap()
            .assign(&bits(&[&[1, 1, 0], &[0, 1, 1], &[1, 1, 1]]))
            .unwrap();
        let mut w = m.window_mut(&[1, 1], &[3, 3]).unwrap();
        gauss_reduce(&mut w, true).unwrap();
        assert!(w.nd_eq(&Tensor::identity(3)));
        assert_eq!(m.row(0).weight(), 0);
    }

    #[test]
    fn signed_entries_are_reduced() {
        let mut m = Tensor::from_rows(&[vec![-1i8, 0], vec![3, -1]]).unwrap();
        gauss_reduce(&mut m, true).unwrap();
        assert_eq!(m, Tensor::identity(2));
    }

    #[test]
    fn echelon_pivots_and_rank() {
        let mut m = bits(&[&[0, 1, 1, 0, 1], &[0, 1, 0, 1, 1], &[0, 0, 1, 1, 0]]);
        let pivots = reduced_echelon(&mut m).unwrap();
        assert_eq!(pivots, vec![1, 2]);
        assert_eq!(m.row(2).weight(), 0);
        assert_eq!(rank(&bits(&[&[1, 1], &[1, 1]])).unwrap(), 1);
        assert_eq!(rank(&Tensor::<u8>::identity(7)).unwrap(), 7);
    }

    #[test]
    fn rank_of_random_product() {
        let mut rng = SmallRng::seed_from_u64(1);
        let a = Tensor::<u8>::random_full_rank(&mut rng, 6, 10);
        let b = Tensor::<u8>::random_full_rank(&mut rng, 6, 6);
        let p = matmul_mod2(&b, &a).unwrap();
        assert_eq!(rank(&p).unwrap(), 6);
    }

    #[test]
    fn dual_of_systematic_generator() {
        let g = bits(&[&[1, 0, 0, 1], &[0, 1, 0, 1], &[0, 0, 1, 1]]);
        let h = dual_code(&g).unwrap();
        assert_eq!(h, bits(&[&[1, 1, 1, 1]]));
        assert!(is_orthogonal(&g, &h).unwrap());
    }

    #[test]
    fn dual_needs_column_pivoting() {
        let g = bits(&[&[0, 1, 1, 0], &[0, 0, 1, 1]]);
        let h = dual_code(&g).unwrap();
        assert_eq!(h.dims(), &Dims::from([2, 4]));
        assert!(is_orthogonal(&g, &h).unwrap());
        assert_eq!(rank(&h).unwrap(), 2);
    }

    #[test]
    fn dual_of_dependent_rows() {
        let g = bits(&[&[1, 1, 0], &[1, 1, 0]]);
        assert_eq!(
            dual_code(&g),
            Err(LinAlgError::RankDeficient { rank: 1, rows: 2 })
        );
    }

    #[test]
    fn random_duals_are_orthogonal_and_full_rank() {
        let mut rng = SmallRng::seed_from_u64(3);
        for (k, n) in [(1, 5), (4, 7), (5, 12), (9, 9)] {
            let g = Tensor::<u8>::random_full_rank(&mut rng, k, n);
            let h = dual_code(&g).unwrap();
            assert_eq!(h.dims(), &Dims::from([n - k, n]));
            assert!(is_orthogonal(&g, &h).unwrap());
            assert_eq!(rank(&h).unwrap(), n - k);
        }
    }

    #[test]
    fn solve_recovers_coefficients() {
        let mut rng = SmallRng::seed_from_u64(5);
        let g = Tensor::<u8>::random_full_rank(&mut rng, 5, 11);
        for _ in 0..20 {
            let x = Tensor::<u8>::random_bits(&mut rng, [5]);
            let b = vec_mat_mul_mod2(&x, &g).unwrap();
            assert_eq!(solve(&g, &b).unwrap(), x);
        }
    }

    #[test]
    fn solve_outside_row_space() {
        let g = bits(&[&[1, 0, 0, 1], &[0, 1, 0, 1]]);
        let b = Tensor::vector(vec![0u8, 0, 1, 0]);
        assert_eq!(solve(&g, &b), Err(LinAlgError::NotInRowSpace));
        let short = Tensor::vector(vec![0u8, 0, 1]);
        assert!(matches!(solve(&g, &short), Err(LinAlgError::Shape(_))));
    }

    #[test]
    fn products() {
        let a = Tensor::from_rows(&[vec![1i32, 2], vec![3, 4]]).unwrap();
        let b = Tensor::from_rows(&[vec![5i32, 6, 7], vec![8, 9, 10]]).unwrap();
        let p = matmul(&a, &b).unwrap();
        assert_eq!(p.as_slice(), &[21, 24, 27, 47, 54, 61]);
        assert_eq!(matmul_mod2(&a, &b).unwrap().as_slice(), &[1, 0, 1, 1, 0, 1]);
        assert!(matmul(&b, &a).is_err());

        let t = mul_transpose_mod2(&a, &a).unwrap();
        assert_eq!(t.as_slice(), &[1, 1, 1, 1]);
    }

    #[test]
    fn large_entries_do_not_overflow() {
        let a = Tensor::<u8>::filled([1, 300], 255);
        let b = Tensor::<u8>::filled([300, 1], 255);
        assert_eq!(matmul_mod2(&a, &b).unwrap().as_slice(), &[0]);
    }

    #[test]
    fn dot_products() {
        let u = Tensor::vector(vec![1i32, 2, 3]);
        let v = Tensor::vector(vec![4i32, 5, 6]);
        assert_eq!(dot(&u, &v).unwrap(), 32);
        assert_eq!(dot_mod2(&u, &v).unwrap(), 0);
        assert!(dot(&u, &Tensor::vector(vec![1i32])).is_err());
    }

    #[test]
    fn syndrome_of_codeword_is_zero() {
        let g = bits(&[&[1, 0, 0, 1], &[0, 1, 0, 1], &[0, 0, 1, 1]]);
        let h = dual_code(&g).unwrap();
        let c = vec_mat_mul_mod2(&Tensor::vector(vec![1u8, 1, 0]), &g).unwrap();
        assert_eq!(c.as_slice(), &[1, 1, 0, 0]);
        assert_eq!(syndrome(&h, &c).unwrap().weight(), 0);
        let w = Tensor::vector(vec![1u8, 1, 1, 0]);
        assert_eq!(syndrome(&h, &w).unwrap().as_slice(), &[1]);
    }

    #[test]
    fn self_orthogonality() {
        let g = bits(&[&[1, 1, 0, 0], &[0, 0, 1, 1]]);
        assert!(is_self_orthogonal(&g).unwrap());
        let g = bits(&[&[1, 0, 0, 0], &[0, 0, 1, 1]]);
        assert!(!is_self_orthogonal(&g).unwrap());
    }
}
