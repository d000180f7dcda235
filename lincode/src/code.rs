use std::cell::OnceCell;
use std::fmt;
use std::io;
use std::str::FromStr;

use crate::error::{ECCError, ParseError, ShapeError};
use crate::linalg::{dual_code, is_self_orthogonal, matmul_mod2, syndrome, vec_mat_mul_mod2};
use crate::search::{covering_radius, minimum_distance};
use crate::shape::{Dims, Shape};
use crate::tensor::{matrix_dims, Tensor};
use crate::view::{NdArray, NdArrayMut};

/// Which matrix a code file holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixKind {
    Generator,
    Check,
}

impl MatrixKind {
    pub fn token(self) -> &'static str {
        match self {
            MatrixKind::Generator => "generator",
            MatrixKind::Check => "check",
        }
    }
}

impl FromStr for MatrixKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generator" => Ok(MatrixKind::Generator),
            "check" => Ok(MatrixKind::Check),
            other => Err(ParseError::UnknownKind(other.to_owned())),
        }
    }
}

/// A binary linear `[n, k]` code, held as a generator matrix `G` (k x n) together with a
/// parity-check matrix `H` ((n - k) x n) such that `G H^t = 0` over GF(2)
///
/// Either matrix determines the other. The minimum distance and the covering radius are
/// found by exhaustive search the first time they are asked for, then cached.
#[derive(Clone, Debug)]
pub struct LinearCode {
    generator: Tensor<u8>,
    check: Tensor<u8>,
    distance: OnceCell<usize>,
    covering_radius: OnceCell<usize>,
}

impl LinearCode {
    /// # Errors
    ///
    /// `EmptyCode` if `generator` has no rows, and a linear algebra error if it is not a
    /// full-rank matrix
    pub fn from_generator(mut generator: Tensor<u8>) -> Result<Self, ECCError> {
        let (k, n) = matrix_dims(&generator)?;
        if k == 0 {
            return Err(ECCError::EmptyCode);
        }
        generator.reduce_mod2();
        let check = dual_code(&generator)?;
        log::debug!("derived {}x{} check matrix from {k}x{n} generator", n - k, n);
        Ok(Self::from_parts(generator, check))
    }

    /// # Errors
    ///
    /// A linear algebra error if `check` is not a full-rank matrix, and `EmptyCode` if it
    /// has rank `n`, leaving only the zero codeword
    pub fn from_check(mut check: Tensor<u8>) -> Result<Self, ECCError> {
        let (r, n) = matrix_dims(&check)?;
        check.reduce_mod2();
        let generator = dual_code(&check)?;
        if generator.rows() == 0 {
            return Err(ECCError::EmptyCode);
        }
        log::debug!("derived {}x{n} generator from {r}x{n} check matrix", n - r);
        Ok(Self::from_parts(generator, check))
    }

    fn from_parts(generator: Tensor<u8>, check: Tensor<u8>) -> Self {
        LinearCode {
            generator,
            check,
            distance: OnceCell::new(),
            covering_radius: OnceCell::new(),
        }
    }

    /// Records a distance known from the construction, skipping the search
    pub(crate) fn with_known_distance(self, d: usize) -> Self {
        let _ = self.distance.set(d);
        self
    }

    #[inline]
    pub fn generator(&self) -> &Tensor<u8> {
        &self.generator
    }

    #[inline]
    pub fn check(&self) -> &Tensor<u8> {
        &self.check
    }

    /// Message length `k`
    #[inline]
    pub fn block_length(&self) -> usize {
        self.generator.rows()
    }

    /// Codeword length `n`
    #[inline]
    pub fn length(&self) -> usize {
        self.generator.cols()
    }

    /// Encodes a message of length `k` into a codeword of length `n`
    ///
    /// # Errors
    ///
    /// If `message` is not a vector of length `k`
    pub fn encode<A: NdArray<Elem = u8>>(&self, message: &A) -> Result<Tensor<u8>, ECCError> {
        expect_word(message, self.block_length())?;
        Ok(vec_mat_mul_mod2(message, &self.generator)?)
    }

    /// Each row of `to_encode` represents a message being encoded
    /// That is to say `to_encode` is R by `k`
    /// and after encoding we get a result of R by `n`
    ///
    /// # Errors
    ///
    /// If the number of columns of `to_encode` are incorrect for the dimension
    /// of the codespace
    pub fn encode_rows<A: NdArray<Elem = u8>>(&self, to_encode: &A) -> Result<Tensor<u8>, ECCError> {
        let (rows, cols) = matrix_dims(to_encode)?;
        if cols != self.block_length() {
            return Err(ShapeError::DimensionMismatch {
                expected: Dims::from([rows, self.block_length()]),
                found: to_encode.shape().to_dims(),
            }
            .into());
        }
        Ok(matmul_mod2(to_encode, &self.generator)?)
    }

    /// `H w^t` for a word of length `n`
    pub fn syndrome<A: NdArray<Elem = u8>>(&self, word: &A) -> Result<Tensor<u8>, ECCError> {
        expect_word(word, self.length())?;
        Ok(syndrome(&self.check, word)?)
    }

    pub fn is_codeword<A: NdArray<Elem = u8>>(&self, word: &A) -> Result<bool, ECCError> {
        Ok(self.syndrome(word)?.weight() == 0)
    }

    /// Is the code contained in its own dual
    pub fn is_self_orthogonal(&self) -> bool {
        matches!(is_self_orthogonal(&self.generator), Ok(true))
    }

    /// Minimum distance `d`, searched over all `2^k` codewords on first use
    pub fn distance(&self) -> Result<usize, ECCError> {
        if let Some(&d) = self.distance.get() {
            return Ok(d);
        }
        let d = minimum_distance(&self.generator)?;
        log::debug!("minimum distance of [{}, {}] code is {d}", self.length(), self.block_length());
        Ok(*self.distance.get_or_init(|| d))
    }

    /// Covering radius `r`, searched over error patterns on first use
    pub fn covering_radius(&self) -> Result<usize, ECCError> {
        if let Some(&r) = self.covering_radius.get() {
            return Ok(r);
        }
        let r = covering_radius(&self.check)?;
        Ok(*self.covering_radius.get_or_init(|| r))
    }

    /// the standard `[n,k,d]_q` notation
    pub fn n_k_d_q(&self) -> Result<[usize; 4], ECCError> {
        Ok([self.length(), self.block_length(), self.distance()?, 2])
    }

    /// Give the rate of information transfer.
    /// For a codespace of dimension `k` and codewords of length `n`
    /// the information transfer is slowed by a factor of `k/n`.
    /// This is compensated by the benefit of being able to detect and correct errors.
    pub fn rate(&self) -> f64 {
        self.block_length() as f64 / self.length() as f64
    }

    /// Is the generator in standard form `[I | P]`
    pub fn is_standard(&self) -> bool {
        let k = self.block_length();
        self.generator
            .window(&[0, 0], &[k, k])
            .is_ok_and(|left| left.nd_eq(&Tensor::identity(k)))
    }

    /// Writes `generator` followed by the generator matrix
    pub fn write_generator<W: io::Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", MatrixKind::Generator.token())?;
        self.generator.write_text(out)?;
        writeln!(out)
    }

    /// Writes `check` followed by the check matrix
    pub fn write_check<W: io::Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", MatrixKind::Check.token())?;
        self.check.write_text(out)?;
        writeln!(out)
    }

    /// Reads a code from tokens: `generator` or `check`, then the matrix
    pub fn from_tokens<'a, I>(tokens: &mut I) -> Result<Self, ECCError>
    where
        I: Iterator<Item = &'a str>,
    {
        let kind: MatrixKind = tokens.next().ok_or(ParseError::UnexpectedEnd)?.parse()?;
        let matrix = Tensor::from_tokens(tokens)?;
        match kind {
            MatrixKind::Generator => LinearCode::from_generator(matrix),
            MatrixKind::Check => LinearCode::from_check(matrix),
        }
    }

    /// Reads a whole code file
    pub fn read_from<R: io::Read>(mut reader: R) -> Result<Self, ECCError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        text.parse()
    }
}

fn expect_word<A: NdArray + ?Sized>(word: &A, len: usize) -> Result<(), ShapeError> {
    if word.shape() != Shape::new(&[len]) {
        return Err(ShapeError::DimensionMismatch {
            expected: Dims::from([len]),
            found: word.shape().to_dims(),
        });
    }
    Ok(())
}

impl FromStr for LinearCode {
    type Err = ECCError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let code = LinearCode::from_tokens(&mut tokens)?;
        match tokens.next() {
            Some(extra) => Err(ParseError::InvalidToken(extra.to_owned()).into()),
            None => Ok(code),
        }
    }
}

impl fmt::Display for LinearCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}", self.length(), self.block_length())?;
        if let Some(d) = self.distance.get() {
            write!(f, ", {}", d)?;
        }
        write!(f, "] binary linear code")
    }
}
