use ref_cast::RefCast;
use std::fmt;
use std::ops::Deref;

/// The extents of an array, one per axis, as a borrowed slice
///
/// `Shape` is to [`Dims`] what `str` is to `String`: views and containers hand out `&Shape`,
/// while anything that needs to keep a shape around stores a [`Dims`].
#[derive(RefCast, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct Shape([usize]);

/// An owned [`Shape`]
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Dims(Vec<usize>);

impl Shape {
    #[inline]
    pub fn new(extents: &[usize]) -> &Shape {
        Shape::ref_cast(extents)
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of axes
    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Extent of `axis`
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.rank()`.
    #[inline]
    pub fn extent(&self, axis: usize) -> usize {
        self.0[axis]
    }

    /// Number of elements, i.e. the product of all extents
    #[inline]
    pub fn len(&self) -> usize {
        self.0.iter().product()
    }

    /// Number of elements, or `None` if the product of the extents overflows `usize`
    pub fn checked_len(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &e| acc.checked_mul(e))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn to_dims(&self) -> Dims {
        Dims(self.0.to_vec())
    }

    /// The shape left after dropping axis 0
    ///
    /// # Panics
    ///
    /// Panics on a rank-0 shape.
    #[inline]
    pub fn tail(&self) -> &Shape {
        assert!(self.rank() > 0, "a rank-0 shape has no leading axis");
        Shape::ref_cast(&self.0[1..])
    }

    /// The shape with its axes in reverse order
    pub fn reversed(&self) -> Dims {
        self.0.iter().rev().copied().collect()
    }

    /// Returns `true` if `index` has the right rank and lies inside every extent
    pub fn contains(&self, index: &[usize]) -> bool {
        index.len() == self.rank() && index.iter().zip(self.0.iter()).all(|(i, e)| i < e)
    }

    /// Fail fast on an index that does not address an element of this shape
    ///
    /// # Panics
    ///
    /// Panics if the index has the wrong rank or is out of bounds on some axis.
    #[inline]
    pub fn check_index(&self, index: &[usize]) {
        assert_eq!(
            index.len(),
            self.rank(),
            "index of rank {} used against shape {}",
            index.len(),
            self
        );
        for (axis, (&i, &e)) in index.iter().zip(self.0.iter()).enumerate() {
            if i >= e {
                panic!("index {i} out of bounds for axis {axis} with extent {e}");
            }
        }
    }

    /// Row-major offset of `index` in a contiguous buffer of this shape
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds, see [`Shape::check_index`].
    #[inline]
    pub fn offset_of(&self, index: &[usize]) -> usize {
        self.check_index(index);
        index
            .iter()
            .zip(self.0.iter())
            .fold(0, |offset, (&i, &e)| offset * e + i)
    }

    /// Iterates over all coordinates of this shape in row-major order
    pub fn coords(&self) -> Coords<'_> {
        Coords {
            shape: self,
            next: if self.is_empty() {
                None
            } else {
                Some(vec![0; self.rank()])
            },
        }
    }
}

/// Row-major iterator over the coordinates of a [`Shape`]
pub struct Coords<'a> {
    shape: &'a Shape,
    next: Option<Vec<usize>>,
}

impl Iterator for Coords<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut succ = current.clone();
        for axis in (0..succ.len()).rev() {
            succ[axis] += 1;
            if succ[axis] < self.shape.extent(axis) {
                self.next = Some(succ);
                break;
            }
            succ[axis] = 0;
        }
        Some(current)
    }
}

impl Dims {
    #[inline]
    pub fn as_shape(&self) -> &Shape {
        Shape::ref_cast(&self.0)
    }
}

impl Deref for Dims {
    type Target = Shape;
    fn deref(&self) -> &Self::Target {
        self.as_shape()
    }
}

impl AsRef<Shape> for Dims {
    fn as_ref(&self) -> &Shape {
        self.as_shape()
    }
}

impl AsRef<Shape> for Shape {
    fn as_ref(&self) -> &Shape {
        self
    }
}

impl From<Vec<usize>> for Dims {
    fn from(value: Vec<usize>) -> Self {
        Dims(value)
    }
}

impl From<&[usize]> for Dims {
    fn from(value: &[usize]) -> Self {
        Dims(value.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Dims {
    fn from(value: [usize; N]) -> Self {
        Dims(value.to_vec())
    }
}

impl From<&Shape> for Dims {
    fn from(value: &Shape) -> Self {
        value.to_dims()
    }
}

impl From<Dims> for Vec<usize> {
    fn from(value: Dims) -> Self {
        value.0
    }
}

impl FromIterator<usize> for Dims {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Dims(Vec::from_iter(iter))
    }
}

impl PartialEq<Shape> for Dims {
    fn eq(&self, other: &Shape) -> bool {
        self.as_shape() == other
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (axis, e) in self.0.iter().enumerate() {
            if axis > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", e)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_shape().fmt(f)
    }
}
