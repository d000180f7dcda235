//! The array protocol shared by [`Tensor`] and every view, and the views themselves.
//!
//! A view is generic over its base. Because [`NdArray`] is implemented for `&A` and
//! `&mut A`, the same view type can borrow an array (shared or exclusively) or take
//! ownership of a temporary that was moved into it:
//!
//! ```
//! use lincode::{NdArray, NdArrayMut, Tensor, Window};
//!
//! let mut t = Tensor::<u8>::zeros([4, 4]);
//! t.window_mut(&[1, 1], &[2, 2]).unwrap().fill(1);
//! assert_eq!(t.weight(), 4);
//!
//! // owning window over a temporary
//! let w = Window::new(Tensor::<u8>::identity(3), &[1, 0], &[2, 3]).unwrap();
//! assert_eq!(w.at(&[0, 1]), 1);
//! ```

use crate::element::Element;
use crate::error::ShapeError;
use crate::shape::{Coords, Dims, Shape};
use crate::tensor::Tensor;
use smallvec::SmallVec;
use std::io;

type IndexBuf = SmallVec<[usize; 4]>;

/// Read access to a rank-agnostic array of [`Element`]s
pub trait NdArray {
    type Elem: Element;

    fn shape(&self) -> &Shape;

    /// Returns the element at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` does not address an element of `self.shape()`. Cyclic views are
    /// the exception: they wrap every coordinate into range.
    fn at(&self, index: &[usize]) -> Self::Elem;

    #[inline]
    fn rank(&self) -> usize {
        self.shape().rank()
    }

    #[inline]
    fn len(&self) -> usize {
        self.shape().len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the elements in row-major order
    fn iter(&self) -> Elements<'_, Self> {
        Elements {
            array: self,
            coords: self.shape().coords(),
        }
    }

    /// Number of non-zero entries
    fn weight(&self) -> usize {
        self.iter()
            .filter(|&x| x != <Self::Elem as Element>::ZERO)
            .count()
    }

    /// Structural equality: same shape, then same elements
    fn nd_eq<B: NdArray<Elem = Self::Elem> + ?Sized>(&self, other: &B) -> bool {
        self.shape() == other.shape()
            && self.shape().coords().all(|c| self.at(&c) == other.at(&c))
    }

    /// Copies the contents into a new [`Tensor`]
    fn to_tensor(&self) -> Tensor<Self::Elem> {
        Tensor::from_parts(self.shape().to_dims(), self.iter().collect())
    }

    /// Writes the shape, the `%%%` delimiter and the row-major entries
    fn write_text<W: io::Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        crate::text::write_text(self, out)
    }

    fn to_text(&self) -> String {
        crate::text::to_text(self)
    }

    /// A rectangular window, see [`Window::new`]
    fn window(&self, offsets: &[usize], extents: &[usize]) -> Result<Window<&Self>, ShapeError>
    where
        Self: Sized,
    {
        Window::new(self, offsets, extents)
    }

    fn cyclic(&self) -> Cyclic<&Self>
    where
        Self: Sized,
    {
        Cyclic::new(self)
    }

    /// The sub-array obtained by fixing axis 0 at `index`
    fn row(&self, index: usize) -> Row<&Self>
    where
        Self: Sized,
    {
        Row::new(self, index)
    }

    fn repeat(&self, count: usize) -> Repeat<&Self>
    where
        Self: Sized,
    {
        Repeat::new(self, count)
    }
}

/// Write access on top of [`NdArray`]
pub trait NdArrayMut: NdArray {
    /// Returns a mutable reference to the element at `index`
    ///
    /// # Panics
    ///
    /// Same conditions as [`NdArray::at`].
    fn at_mut(&mut self, index: &[usize]) -> &mut Self::Elem;

    #[inline]
    fn set(&mut self, index: &[usize], value: Self::Elem) {
        *self.at_mut(index) = value;
    }

    /// Applies `f` to every element in place
    fn map_inplace(&mut self, mut f: impl FnMut(Self::Elem) -> Self::Elem) {
        let shape = self.shape().to_dims();
        for c in shape.coords() {
            let x = self.at_mut(&c);
            *x = f(*x);
        }
    }

    fn fill(&mut self, value: Self::Elem) {
        self.map_inplace(|_| value);
    }

    /// Replaces every element by its residue modulo 2
    fn reduce_mod2(&mut self) {
        self.map_inplace(Element::mod2);
    }

    /// Sets `self[i] = f(self[i], other[i])` for every coordinate `i`
    ///
    /// # Errors
    ///
    /// If `other` does not have exactly the shape of `self`
    fn combine<B: NdArray<Elem = Self::Elem> + ?Sized>(
        &mut self,
        other: &B,
        mut f: impl FnMut(Self::Elem, Self::Elem) -> Self::Elem,
    ) -> Result<(), ShapeError> {
        if self.shape() != other.shape() {
            return Err(ShapeError::mismatch(self.shape(), other.shape()));
        }
        let shape = self.shape().to_dims();
        for c in shape.coords() {
            let y = other.at(&c);
            let x = self.at_mut(&c);
            *x = f(*x, y);
        }
        Ok(())
    }

    fn assign<B: NdArray<Elem = Self::Elem> + ?Sized>(&mut self, src: &B) -> Result<(), ShapeError> {
        self.combine(src, |_, y| y)
    }

    /// Elementwise sum, wrapping on overflow
    fn add_assign_from<B: NdArray<Elem = Self::Elem> + ?Sized>(
        &mut self,
        other: &B,
    ) -> Result<(), ShapeError> {
        self.combine(other, Element::wrapping_add)
    }

    /// Elementwise difference, wrapping on overflow, so `0u8 - 1` leaves `255`
    fn sub_assign_from<B: NdArray<Elem = Self::Elem> + ?Sized>(
        &mut self,
        other: &B,
    ) -> Result<(), ShapeError> {
        self.combine(other, Element::wrapping_sub)
    }

    /// Elementwise product, wrapping on overflow
    fn mul_assign_from<B: NdArray<Elem = Self::Elem> + ?Sized>(
        &mut self,
        other: &B,
    ) -> Result<(), ShapeError> {
        self.combine(other, Element::wrapping_mul)
    }

    /// Multiplies every element by `factor`, wrapping on overflow
    fn scale(&mut self, factor: Self::Elem) {
        self.map_inplace(|x| x.wrapping_mul(factor));
    }

    /// Writes `self[i][j] = src[j][i]` without materializing the transpose
    ///
    /// # Errors
    ///
    /// If either side is not a matrix, or if `self.shape()` is not `src.shape()` reversed
    fn assign_transposed<B: NdArray<Elem = Self::Elem> + ?Sized>(
        &mut self,
        src: &B,
    ) -> Result<(), ShapeError> {
        for rank in [self.rank(), src.rank()] {
            if rank != 2 {
                return Err(ShapeError::RankMismatch {
                    expected: 2,
                    found: rank,
                });
            }
        }
        let expected = src.shape().reversed();
        if self.shape() != expected.as_shape() {
            return Err(ShapeError::mismatch(&expected, self.shape()));
        }
        let (rows, cols) = (self.shape().extent(0), self.shape().extent(1));
        for i in 0..rows {
            for j in 0..cols {
                let v = src.at(&[j, i]);
                self.set(&[i, j], v);
            }
        }
        Ok(())
    }

    /// Fills every coordinate of `self` from a cyclic source of the same rank, which wraps
    /// the coordinates that fall outside its own shape
    fn tile_from<B: NdArray<Elem = Self::Elem>>(&mut self, src: &Cyclic<B>) -> Result<(), ShapeError> {
        if src.rank() != self.rank() {
            return Err(ShapeError::RankMismatch {
                expected: self.rank(),
                found: src.rank(),
            });
        }
        let shape = self.shape().to_dims();
        for c in shape.coords() {
            let v = src.at(&c);
            self.set(&c, v);
        }
        Ok(())
    }

    fn window_mut(
        &mut self,
        offsets: &[usize],
        extents: &[usize],
    ) -> Result<Window<&mut Self>, ShapeError>
    where
        Self: Sized,
    {
        Window::new(self, offsets, extents)
    }

    fn cyclic_mut(&mut self) -> Cyclic<&mut Self>
    where
        Self: Sized,
    {
        Cyclic::new(self)
    }

    fn row_mut(&mut self, index: usize) -> Row<&mut Self>
    where
        Self: Sized,
    {
        Row::new(self, index)
    }
}

impl<A: NdArray + ?Sized> NdArray for &A {
    type Elem = A::Elem;

    #[inline]
    fn shape(&self) -> &Shape {
        (**self).shape()
    }

    #[inline]
    fn at(&self, index: &[usize]) -> Self::Elem {
        (**self).at(index)
    }
}

impl<A: NdArray + ?Sized> NdArray for &mut A {
    type Elem = A::Elem;

    #[inline]
    fn shape(&self) -> &Shape {
        (**self).shape()
    }

    #[inline]
    fn at(&self, index: &[usize]) -> Self::Elem {
        (**self).at(index)
    }
}

impl<A: NdArrayMut + ?Sized> NdArrayMut for &mut A {
    #[inline]
    fn at_mut(&mut self, index: &[usize]) -> &mut Self::Elem {
        (**self).at_mut(index)
    }
}

/// Row-major iterator over the elements of an [`NdArray`]
pub struct Elements<'a, A: ?Sized> {
    array: &'a A,
    coords: Coords<'a>,
}

impl<A: NdArray + ?Sized> Iterator for Elements<'_, A> {
    type Item = A::Elem;

    fn next(&mut self) -> Option<Self::Item> {
        self.coords.next().map(|c| self.array.at(&c))
    }
}

/// A rectangular sub-region of its base: axis `i` spans `[offsets[i], offsets[i] + extents[i])`
#[derive(Clone, Debug)]
pub struct Window<A> {
    base: A,
    offsets: Dims,
    shape: Dims,
}

impl<A: NdArray> Window<A> {
    /// # Errors
    ///
    /// `RankMismatch` if the geometry does not have the rank of the base, and
    /// `WindowOutOfBounds` if the window does not fit inside the base on some axis
    pub fn new(base: A, offsets: &[usize], extents: &[usize]) -> Result<Self, ShapeError> {
        let rank = base.rank();
        for found in [offsets.len(), extents.len()] {
            if found != rank {
                return Err(ShapeError::RankMismatch {
                    expected: rank,
                    found,
                });
            }
        }
        for axis in 0..rank {
            let end = offsets[axis] + extents[axis];
            let extent = base.shape().extent(axis);
            if end > extent {
                return Err(ShapeError::WindowOutOfBounds {
                    axis,
                    offset: offsets[axis],
                    end,
                    extent,
                });
            }
        }
        Ok(Window {
            base,
            offsets: offsets.into(),
            shape: extents.into(),
        })
    }

    pub fn offsets(&self) -> &[usize] {
        self.offsets.as_slice()
    }

    pub fn into_inner(self) -> A {
        self.base
    }

    #[inline]
    fn base_index(&self, index: &[usize]) -> IndexBuf {
        self.shape.check_index(index);
        index
            .iter()
            .zip(self.offsets.as_slice())
            .map(|(i, o)| i + o)
            .collect()
    }
}

impl<A: NdArray> NdArray for Window<A> {
    type Elem = A::Elem;

    #[inline]
    fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    fn at(&self, index: &[usize]) -> Self::Elem {
        self.base.at(&self.base_index(index))
    }
}

impl<A: NdArrayMut> NdArrayMut for Window<A> {
    #[inline]
    fn at_mut(&mut self, index: &[usize]) -> &mut Self::Elem {
        let index = self.base_index(index);
        self.base.at_mut(&index)
    }
}

/// Periodic view: same shape as its base, but every coordinate is taken modulo the extent
/// of its axis
#[derive(Clone, Debug)]
pub struct Cyclic<A> {
    base: A,
}

impl<A: NdArray> Cyclic<A> {
    pub fn new(base: A) -> Self {
        Cyclic { base }
    }

    pub fn into_inner(self) -> A {
        self.base
    }

    /// Maps a signed coordinate into range, `((i % e) + e) % e` on every axis
    ///
    /// # Panics
    ///
    /// Panics if the rank is wrong or an axis has extent 0.
    pub fn wrap(&self, index: &[isize]) -> IndexBuf {
        let shape = self.base.shape();
        assert_eq!(
            index.len(),
            shape.rank(),
            "index of rank {} used against shape {}",
            index.len(),
            shape
        );
        index
            .iter()
            .zip(shape.as_slice())
            .map(|(&i, &e)| {
                assert!(e > 0, "cannot wrap an index around an empty axis");
                i.rem_euclid(e as isize) as usize
            })
            .collect()
    }

    /// Element at a signed coordinate, e.g. `[-1]` is the last element of a vector
    pub fn at_wrapped(&self, index: &[isize]) -> A::Elem {
        self.base.at(&self.wrap(index))
    }

    fn wrap_unsigned(&self, index: &[usize]) -> IndexBuf {
        let shape = self.base.shape();
        assert_eq!(
            index.len(),
            shape.rank(),
            "index of rank {} used against shape {}",
            index.len(),
            shape
        );
        index
            .iter()
            .zip(shape.as_slice())
            .map(|(&i, &e)| {
                assert!(e > 0, "cannot wrap an index around an empty axis");
                i % e
            })
            .collect()
    }
}

impl<A: NdArrayMut> Cyclic<A> {
    pub fn at_wrapped_mut(&mut self, index: &[isize]) -> &mut A::Elem {
        let index = self.wrap(index);
        self.base.at_mut(&index)
    }
}

impl<A: NdArray> NdArray for Cyclic<A> {
    type Elem = A::Elem;

    #[inline]
    fn shape(&self) -> &Shape {
        self.base.shape()
    }

    #[inline]
    fn at(&self, index: &[usize]) -> Self::Elem {
        self.base.at(&self.wrap_unsigned(index))
    }
}

impl<A: NdArrayMut> NdArrayMut for Cyclic<A> {
    #[inline]
    fn at_mut(&mut self, index: &[usize]) -> &mut Self::Elem {
        let index = self.wrap_unsigned(index);
        self.base.at_mut(&index)
    }
}

/// Fixes axis 0 of the base, leaving a view of rank one less
#[derive(Clone, Debug)]
pub struct Row<A> {
    base: A,
    index: usize,
}

impl<A: NdArray> Row<A> {
    /// # Panics
    ///
    /// Panics if the base has rank 0 or `index` is out of bounds on axis 0.
    pub fn new(base: A, index: usize) -> Self {
        assert!(base.rank() > 0, "cannot take a row of a rank-0 array");
        let extent = base.shape().extent(0);
        if index >= extent {
            panic!("row {index} out of bounds for axis 0 with extent {extent}");
        }
        Row { base, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    fn base_index(&self, index: &[usize]) -> IndexBuf {
        std::iter::once(self.index)
            .chain(index.iter().copied())
            .collect()
    }
}

impl<A: NdArray> NdArray for Row<A> {
    type Elem = A::Elem;

    #[inline]
    fn shape(&self) -> &Shape {
        self.base.shape().tail()
    }

    #[inline]
    fn at(&self, index: &[usize]) -> Self::Elem {
        self.base.at(&self.base_index(index))
    }
}

impl<A: NdArrayMut> NdArrayMut for Row<A> {
    #[inline]
    fn at_mut(&mut self, index: &[usize]) -> &mut Self::Elem {
        let index = self.base_index(index);
        self.base.at_mut(&index)
    }
}

/// Read-only broadcast of the base along a new leading axis of extent `count`
///
/// Every outer index re-reads the base, nothing is copied.
#[derive(Clone, Debug)]
pub struct Repeat<A> {
    base: A,
    shape: Dims,
}

impl<A: NdArray> Repeat<A> {
    pub fn new(base: A, count: usize) -> Self {
        let shape = std::iter::once(count)
            .chain(base.shape().as_slice().iter().copied())
            .collect();
        Repeat { base, shape }
    }

    pub fn into_inner(self) -> A {
        self.base
    }
}

impl<A: NdArray> NdArray for Repeat<A> {
    type Elem = A::Elem;

    #[inline]
    fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    fn at(&self, index: &[usize]) -> Self::Elem {
        self.shape.check_index(index);
        self.base.at(&index[1..])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn counting(rows: usize, cols: usize) -> Tensor<i32> {
        Tensor::build([rows, cols], |idx| (idx[0] * cols + idx[1]) as i32)
    }

    #[test]
    fn window_reads_through_offsets() {
        let t = counting(4, 5);
        let w = t.window(&[1, 2], &[2, 3]).unwrap();
        assert_eq!(w.shape().as_slice(), &[2, 3]);
        assert_eq!(w.at(&[0, 0]), 7);
        assert_eq!(w.at(&[1, 2]), 14);
    }

    #[test]
    fn nested_windows_compose() {
        let t = counting(6, 6);
        let outer = t.window(&[1, 1], &[4, 4]).unwrap();
        let inner = outer.window(&[2, 1], &[2, 2]).unwrap();
        assert_eq!(inner.at(&[0, 0]), t.at(&[3, 2]));
        assert_eq!(inner.at(&[1, 1]), t.at(&[4, 3]));
    }

    #[test]
    fn window_out_of_bounds() {
        let t = counting(3, 3);
        assert_eq!(
            t.window(&[1, 0], &[3, 3]).unwrap_err(),
            ShapeError::WindowOutOfBounds {
                axis: 0,
                offset: 1,
                end: 4,
                extent: 3
            }
        );
        assert!(matches!(
            t.window(&[0], &[1]),
            Err(ShapeError::RankMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn window_index_out_of_bounds() {
        let t = counting(3, 3);
        let w = t.window(&[0, 0], &[2, 2]).unwrap();
        w.at(&[2, 0]);
    }

    #[test]
    fn window_mut_writes_into_base() {
        let mut t = Tensor::<i32>::zeros([3, 4]);
        t.window_mut(&[1, 1], &[2, 2]).unwrap().fill(7);
        assert_eq!(t.weight(), 4);
        assert_eq!(t.at(&[2, 2]), 7);
        assert_eq!(t.at(&[0, 0]), 0);
    }

    #[test]
    fn unsigned_arithmetic_wraps() {
        let mut t = Tensor::<u8>::zeros([2]);
        t.sub_assign_from(&Tensor::ones([2])).unwrap();
        assert_eq!(t.as_slice(), &[255, 255]);
        t.add_assign_from(&Tensor::filled([2], 2)).unwrap();
        assert_eq!(t.as_slice(), &[1, 1]);
        t.scale(255);
        t.mul_assign_from(&Tensor::filled([2], 3)).unwrap();
        assert_eq!(t.as_slice(), &[253, 253]);
        t.reduce_mod2();
        assert_eq!(t, Tensor::ones([2]));
    }

    #[test]
    fn owning_window() {
        let w = Window::new(counting(3, 3), &[1, 1], &[2, 2]).unwrap();
        assert_eq!(w.at(&[1, 1]), 8);
        let t = w.into_inner();
        assert_eq!(t.len(), 9);
    }

    #[test]
    fn cyclic_wraps_negative_indices() {
        let v = Tensor::<i32>::build([5], |idx| idx[0] as i32);
        let c = v.cyclic();
        assert_eq!(c.shape(), v.shape());
        assert_eq!(c.at_wrapped(&[-1]), 4);
        assert_eq!(c.at_wrapped(&[-6]), 4);
        assert_eq!(c.at_wrapped(&[12]), 2);
        assert_eq!(c.at(&[7]), 2);
    }

    #[test]
    fn cyclic_mut_writes_wrapped() {
        let mut v = Tensor::<u8>::zeros([3]);
        *v.cyclic_mut().at_wrapped_mut(&[-1]) = 1;
        assert_eq!(v.as_slice(), &[0, 0, 1]);
    }

    #[test]
    fn rows_are_lower_rank_views() {
        let t = Tensor::<i32>::build([2, 3, 4], |idx| (idx[0] * 100 + idx[1] * 10 + idx[2]) as i32);
        let r = t.row(1);
        assert_eq!(r.shape().as_slice(), &[3, 4]);
        let rr = r.row(2);
        assert_eq!(rr.shape().as_slice(), &[4]);
        assert_eq!(rr.at(&[3]), 123);
    }

    #[test]
    fn row_mut_writes_into_base() {
        let mut t = Tensor::<u8>::zeros([3, 3]);
        t.row_mut(1).fill(1);
        assert_eq!(t.as_slice(), &[0, 0, 0, 1, 1, 1, 0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "row 3 out of bounds")]
    fn row_out_of_bounds() {
        let t = counting(3, 3);
        t.row(3);
    }

    #[test]
    fn repeat_broadcasts_lazily() {
        let v = Tensor::<u8>::vector(vec![1, 0, 1]);
        let r = v.repeat(4);
        assert_eq!(r.shape().as_slice(), &[4, 3]);
        for i in 0..4 {
            assert!(r.row(i).nd_eq(&v));
        }
    }

    #[test]
    fn combine_requires_same_shape() {
        let mut a = counting(2, 3);
        let b = counting(2, 3);
        a.add_assign_from(&b).unwrap();
        assert_eq!(a.at(&[1, 2]), 10);
        a.sub_assign_from(&b).unwrap();
        assert!(a.nd_eq(&b));
        a.mul_assign_from(&b).unwrap();
        assert_eq!(a.at(&[1, 1]), 16);

        let c = counting(3, 2);
        assert_eq!(
            a.combine(&c, |x, _| x).unwrap_err(),
            ShapeError::DimensionMismatch {
                expected: Dims::from([2, 3]),
                found: Dims::from([3, 2]),
            }
        );
    }

    #[test]
    fn scale_and_map() {
        let mut a = counting(2, 2);
        a.scale(3);
        assert_eq!(a.as_slice(), &[0, 3, 6, 9]);
        a.map_inplace(|x| x + 1);
        assert_eq!(a.as_slice(), &[1, 4, 7, 10]);
        a.reduce_mod2();
        assert_eq!(a.as_slice(), &[1, 0, 1, 0]);
    }

    #[test]
    fn assign_transposed_swaps_axes() {
        let src = counting(2, 3);
        let mut dest = Tensor::<i32>::zeros([3, 2]);
        dest.assign_transposed(&src).unwrap();
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(dest.at(&[i, j]), src.at(&[j, i]));
            }
        }
        let mut wrong = Tensor::<i32>::zeros([2, 3]);
        assert!(matches!(
            wrong.assign_transposed(&src),
            Err(ShapeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn assign_transposed_into_window() {
        let src = counting(2, 2);
        let mut dest = Tensor::<i32>::zeros([3, 4]);
        dest.window_mut(&[1, 2], &[2, 2])
            .unwrap()
            .assign_transposed(&src)
            .unwrap();
        assert_eq!(dest.at(&[1, 3]), src.at(&[1, 0]));
        assert_eq!(dest.at(&[2, 2]), src.at(&[0, 1]));
        assert_eq!(dest.at(&[0, 0]), 0);
    }

    #[test]
    fn tile_from_cyclic_source() {
        let block = Tensor::<i32>::build([2, 2], |idx| (idx[0] * 2 + idx[1]) as i32);
        let mut t = Tensor::<i32>::zeros([4, 6]);
        t.tile_from(&block.cyclic()).unwrap();
        for c in t.shape().to_dims().coords() {
            assert_eq!(t.at(&c), block.at(&[c[0] % 2, c[1] % 2]));
        }
        let v = Tensor::<i32>::zeros([2]);
        assert!(t.tile_from(&v.cyclic()).is_err());
    }

    #[test]
    fn structural_equality_checks_shape_first() {
        let a = Tensor::<u8>::zeros([2, 3]);
        let b = Tensor::<u8>::zeros([3, 2]);
        assert!(!a.nd_eq(&b));
        assert!(a.nd_eq(&a.window(&[0, 0], &[2, 3]).unwrap()));
    }
}
