use crate::element::Element;
use crate::error::ShapeError;
use crate::linalg::RowOps;
use crate::shape::{Dims, Shape};
use crate::view::{NdArray, NdArrayMut};
use rand::Rng;
use std::fmt;
use std::ops::{Index, IndexMut};

/// A dense, row-major array of any rank
///
/// Equality is structural: two tensors are equal when their shapes are equal and their
/// elements agree at every coordinate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tensor<T> {
    shape: Dims,
    data: Vec<T>,
}

impl<T> Tensor<T> {
    /// Wraps a row-major buffer
    ///
    /// # Errors
    ///
    /// `LengthMismatch` if `data` does not hold exactly one element per coordinate
    pub fn from_vec(shape: impl Into<Dims>, data: Vec<T>) -> Result<Self, ShapeError> {
        let shape = shape.into();
        if shape.len() != data.len() {
            return Err(ShapeError::LengthMismatch {
                shape,
                len: data.len(),
            });
        }
        Ok(Tensor { shape, data })
    }

    #[inline]
    pub(crate) fn from_parts(shape: Dims, data: Vec<T>) -> Self {
        debug_assert_eq!(shape.len(), data.len());
        Tensor { shape, data }
    }

    #[inline]
    pub fn dims(&self) -> &Dims {
        &self.shape
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Extent of axis 0
    #[inline]
    pub fn rows(&self) -> usize {
        self.shape.extent(0)
    }

    /// Extent of axis 1
    #[inline]
    pub fn cols(&self) -> usize {
        self.shape.extent(1)
    }
}

impl<T: Clone> Tensor<T> {
    pub fn filled(shape: impl Into<Dims>, value: T) -> Self {
        let shape = shape.into();
        let data = vec![value; shape.len()];
        Tensor { shape, data }
    }
}

impl<T: Element> Tensor<T> {
    pub fn zeros(shape: impl Into<Dims>) -> Self {
        Tensor::filled(shape, T::ZERO)
    }

    pub fn ones(shape: impl Into<Dims>) -> Self {
        Tensor::filled(shape, T::ONE)
    }

    /// Builds a tensor by evaluating `f` at every coordinate in row-major order
    pub fn build(shape: impl Into<Dims>, mut f: impl FnMut(&[usize]) -> T) -> Self {
        let shape = shape.into();
        let data = shape.coords().map(|c| f(&c)).collect();
        Tensor { shape, data }
    }

    /// The `size` x `size` identity matrix
    pub fn identity(size: usize) -> Self {
        Tensor::build([size, size], |idx| T::from_bool(idx[0] == idx[1]))
    }

    /// The length-`len` vector with a single one at `index`
    pub fn unit(len: usize, index: usize) -> Self {
        let mut v = Tensor::zeros([len]);
        v.set(&[index], T::ONE);
        v
    }

    /// A rank-1 tensor holding `data`
    pub fn vector(data: Vec<T>) -> Self {
        Tensor {
            shape: Dims::from([data.len()]),
            data,
        }
    }

    /// A matrix from a list of equally long rows
    ///
    /// # Errors
    ///
    /// `LengthMismatch` if the rows are ragged
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, ShapeError> {
        let cols = rows.first().map_or(0, Vec::len);
        let data: Vec<T> = rows.iter().flatten().copied().collect();
        Tensor::from_vec([rows.len(), cols], data)
    }

    /// Uniformly random entries in {0, 1}
    pub fn random_bits(rng: &mut impl Rng, shape: impl Into<Dims>) -> Self {
        Tensor::build(shape, |_| T::from_bool(rng.random()))
    }

    /// A random `rows` x `cols` matrix of full row rank over GF(2)
    ///
    /// Starts from `[I | R]` for random `R`, mixes rows and shuffles columns, so the result
    /// is generally not in standard form.
    ///
    /// # Panics
    ///
    /// Panics if `rows > cols`.
    pub fn random_full_rank(rng: &mut impl Rng, rows: usize, cols: usize) -> Self {
        assert!(
            rows <= cols,
            "a {rows}x{cols} matrix cannot have full row rank"
        );
        let mut m = Tensor::build([rows, cols], |idx| {
            if idx[1] < rows {
                T::from_bool(idx[0] == idx[1])
            } else {
                T::from_bool(rng.random())
            }
        });

        if rows > 1 {
            for _ in 0..10 * rows * rows {
                let r1 = rng.random_range(0..rows);
                let mut r2 = rng.random_range(0..rows - 1);
                if r2 >= r1 {
                    r2 += 1;
                }
                m.add_row(r1, r2);
            }
        }

        for c in (1..cols).rev() {
            let d = rng.random_range(0..=c);
            m.swap_cols(c, d);
        }

        m
    }

    /// Exchanges two columns of a matrix
    pub fn swap_cols(&mut self, c1: usize, c2: usize) {
        if c1 == c2 {
            return;
        }
        for i in 0..self.rows() {
            let tmp = self[[i, c1]];
            self[[i, c1]] = self[[i, c2]];
            self[[i, c2]] = tmp;
        }
    }

    /// The same elements under a different shape with the same number of elements
    ///
    /// # Errors
    ///
    /// `LengthMismatch` if the element counts differ
    pub fn reshape(self, shape: impl Into<Dims>) -> Result<Self, ShapeError> {
        Tensor::from_vec(shape, self.data)
    }

    /// Stacks two matrices with the same number of columns on top of each other
    pub fn vstack<A, B>(top: &A, bottom: &B) -> Result<Self, ShapeError>
    where
        A: NdArray<Elem = T>,
        B: NdArray<Elem = T>,
    {
        let (r1, c) = matrix_dims(top)?;
        let (r2, c2) = matrix_dims(bottom)?;
        if c != c2 {
            return Err(ShapeError::DimensionMismatch {
                expected: Dims::from([r2, c]),
                found: bottom.shape().to_dims(),
            });
        }
        let mut m = Tensor::zeros([r1 + r2, c]);
        m.window_mut(&[0, 0], &[r1, c])?.assign(top)?;
        m.window_mut(&[r1, 0], &[r2, c])?.assign(bottom)?;
        Ok(m)
    }

    /// Places two matrices with the same number of rows side by side
    pub fn hstack<A, B>(left: &A, right: &B) -> Result<Self, ShapeError>
    where
        A: NdArray<Elem = T>,
        B: NdArray<Elem = T>,
    {
        let (r, c1) = matrix_dims(left)?;
        let (r2, c2) = matrix_dims(right)?;
        if r != r2 {
            return Err(ShapeError::DimensionMismatch {
                expected: Dims::from([r, c2]),
                found: right.shape().to_dims(),
            });
        }
        let mut m = Tensor::zeros([r, c1 + c2]);
        m.window_mut(&[0, 0], &[r, c1])?.assign(left)?;
        m.window_mut(&[0, c1], &[r, c2])?.assign(right)?;
        Ok(m)
    }
}

/// `(rows, cols)` of a rank-2 array
pub(crate) fn matrix_dims<A: NdArray + ?Sized>(a: &A) -> Result<(usize, usize), ShapeError> {
    if a.rank() != 2 {
        return Err(ShapeError::RankMismatch {
            expected: 2,
            found: a.rank(),
        });
    }
    Ok((a.shape().extent(0), a.shape().extent(1)))
}

impl<T: Element> NdArray for Tensor<T> {
    type Elem = T;

    #[inline]
    fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    fn at(&self, index: &[usize]) -> T {
        self.data[self.shape.offset_of(index)]
    }

    fn to_tensor(&self) -> Tensor<T> {
        self.clone()
    }
}

impl<T: Element> NdArrayMut for Tensor<T> {
    #[inline]
    fn at_mut(&mut self, index: &[usize]) -> &mut T {
        let offset = self.shape.offset_of(index);
        &mut self.data[offset]
    }

    fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T, const N: usize> Index<[usize; N]> for Tensor<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; N]) -> &T {
        &self.data[self.shape.offset_of(&index)]
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Tensor<T> {
    #[inline]
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let offset = self.shape.offset_of(&index);
        &mut self.data[offset]
    }
}

impl<T: Element> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank() {
            1 => {
                write!(f, "[")?;
                for (i, x) in self.data.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
            2 => {
                for i in 0..self.rows() {
                    for j in 0..self.cols() {
                        write!(f, " {} ", self[[i, j]])?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            _ => write!(f, "{}", self.to_text()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::linalg::rank;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn from_vec_checks_length() {
        let t = Tensor::from_vec([2, 3], vec![1u8, 0, 1, 1, 1, 0]).unwrap();
        assert_eq!(t.at(&[1, 1]), 1);
        assert_eq!(t[[0, 1]], 0);
        assert_eq!(
            Tensor::from_vec([2, 3], vec![1u8; 5]).unwrap_err(),
            ShapeError::LengthMismatch {
                shape: Dims::from([2, 3]),
                len: 5
            }
        );
    }

    #[test]
    fn identity() {
        let m = Tensor::<u8>::identity(10);
        for i in 0..10 {
            for j in 0..10 {
                assert_eq!(m[[i, j]] == 1, i == j);
            }
        }
    }

    #[test]
    fn rows_must_not_be_ragged() {
        let m = Tensor::from_rows(&[vec![1u8, 0], vec![0, 1]]).unwrap();
        assert_eq!(m, Tensor::identity(2));
        assert!(Tensor::from_rows(&[vec![1u8, 0], vec![1]]).is_err());
    }

    #[test]
    fn equality_is_structural() {
        let a = Tensor::<u8>::zeros([2, 3]);
        let b = Tensor::<u8>::zeros([3, 2]);
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);
        assert_eq!(a.clone().reshape([3, 2]).unwrap(), b);
    }

    #[test]
    fn stacking() {
        let i = Tensor::<u8>::identity(2);
        let o = Tensor::<u8>::ones([2, 3]);
        let h = Tensor::hstack(&i, &o).unwrap();
        assert_eq!(h.dims(), &Dims::from([2, 5]));
        assert_eq!(h.weight(), 8);
        let v = Tensor::vstack(&i, &Tensor::<u8>::zeros([1, 2])).unwrap();
        assert_eq!(v.as_slice(), &[1, 0, 0, 1, 0, 0]);
        assert!(Tensor::vstack(&i, &o).is_err());
    }

    #[test]
    fn random_full_rank_has_full_rank() {
        let mut rng = SmallRng::seed_from_u64(1);
        for (rows, cols) in [(1, 1), (3, 7), (8, 20), (12, 12)] {
            let m = Tensor::<u8>::random_full_rank(&mut rng, rows, cols);
            assert_eq!(rank(&m).unwrap(), rows);
        }
    }

    #[test]
    fn random_bits_are_bits() {
        let mut rng = SmallRng::seed_from_u64(7);
        let m = Tensor::<u8>::random_bits(&mut rng, [16, 16]);
        assert!(m.iter().all(|x| x <= 1));
        assert!(m.weight() > 0);
    }

    #[test]
    fn display() {
        let v = Tensor::vector(vec![1u8, 0, 1]);
        assert_eq!(format!("{}", v), "[1, 0, 1]");
        let m = Tensor::<u8>::identity(2);
        assert_eq!(format!("{}", m), " 1  0 \n 0  1 \n");
    }
}
