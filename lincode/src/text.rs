//! Whitespace-separated text format for arrays.
//!
//! An array is written as its extents, each followed by a space, then the delimiter
//! `%%%`, then every element in row-major order, each followed by a space. A 2x3 matrix
//! becomes `2 3 %%%1 0 1 0 1 1 `. When reading, the delimiter may be glued to the tokens
//! around it or stand on its own, and any whitespace separates tokens.

use crate::element::Element;
use crate::error::ParseError;
use crate::shape::Dims;
use crate::tensor::Tensor;
use crate::view::NdArray;
use std::fmt;
use std::io;
use std::str::FromStr;

pub const DELIMITER: &str = "%%%";

/// Renders an array in the text format through `Display`
struct Text<'a, A: ?Sized>(&'a A);

impl<A: NdArray + ?Sized> fmt::Display for Text<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in self.0.shape().as_slice() {
            write!(f, "{} ", e)?;
        }
        f.write_str(DELIMITER)?;
        for x in self.0.iter() {
            write!(f, "{} ", x)?;
        }
        Ok(())
    }
}

pub fn write_text<A, W>(array: &A, out: &mut W) -> io::Result<()>
where
    A: NdArray + ?Sized,
    W: io::Write + ?Sized,
{
    write!(out, "{}", Text(array))
}

pub fn to_text<A: NdArray + ?Sized>(array: &A) -> String {
    Text(array).to_string()
}

fn parse_extent(token: &str) -> Result<usize, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidToken(token.to_string()))
}

fn parse_value<T: Element>(token: &str) -> Result<T, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidToken(token.to_string()))
}

impl<T: Element> Tensor<T> {
    /// Reads one array from a stream of whitespace-separated tokens, consuming exactly
    /// the tokens that belong to it
    ///
    /// # Errors
    ///
    /// `UnexpectedEnd` if the stream runs dry, `MissingDelimiter` if it ends while still
    /// reading the shape, `ShapeTooLarge` if the element count overflows `usize`, and
    /// `InvalidToken` for anything that does not parse
    pub fn from_tokens<'a, I>(tokens: &mut I) -> Result<Self, ParseError>
    where
        I: Iterator<Item = &'a str>,
    {
        let mut extents = Vec::new();
        let mut glued = None;
        loop {
            let Some(token) = tokens.next() else {
                return Err(if extents.is_empty() {
                    ParseError::UnexpectedEnd
                } else {
                    ParseError::MissingDelimiter
                });
            };
            if let Some((before, after)) = token.split_once(DELIMITER) {
                if !before.is_empty() {
                    extents.push(parse_extent(before)?);
                }
                if !after.is_empty() {
                    glued = Some(after);
                }
                break;
            }
            extents.push(parse_extent(token)?);
        }

        let shape = Dims::from(extents);
        let len = shape
            .checked_len()
            .ok_or_else(|| ParseError::ShapeTooLarge(shape.clone()))?;
        // sized by the values actually read, never by the header alone
        let mut data = Vec::new();
        if let Some(token) = glued {
            if len == 0 {
                return Err(ParseError::InvalidToken(token.to_string()));
            }
            data.push(parse_value(token)?);
        }
        while data.len() < len {
            let token = tokens.next().ok_or(ParseError::UnexpectedEnd)?;
            data.push(parse_value(token)?);
        }
        Ok(Tensor::from_parts(shape, data))
    }
}

impl<T: Element> FromStr for Tensor<T> {
    type Err = ParseError;

    /// Parses a string holding exactly one array
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let t = Tensor::from_tokens(&mut tokens)?;
        match tokens.next() {
            Some(extra) => Err(ParseError::InvalidToken(extra.to_string())),
            None => Ok(t),
        }
    }
}
