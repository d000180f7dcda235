//! `lincode` is a Rust library for working with binary linear error-correcting codes. Some
//! features include:
//! - building generator / parity-check matrix pairs from either side
//! - exhaustive minimum distance and covering radius searches
//! - bounded-distance syndrome decoding
//! - classical constructions (Hadamard matrices, the extended Golay code, first-order
//!   Hadamard codes)
//! - a plain-text format for matrices and code files
//!
//! Everything is written against a small rank-agnostic array protocol:
//! - [`Tensor`]: a dense row-major array of integers of any rank
//! - [`NdArray`] / [`NdArrayMut`]: read and write access shared by tensors and views
//! - [`Window`], [`Cyclic`], [`Row`] and [`Repeat`]: zero-copy views that borrow their
//!   base or own it, and nest inside each other
//!
//! The GF(2) routines in [`linalg`] and [`search`] only use the protocol, so they run on
//! windows of a larger matrix as well as on tensors.

#![allow(
    clippy::needless_range_loop,
    clippy::uninlined_format_args,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::len_without_is_empty
)]
pub mod code;
pub mod constructions;
pub mod decoder;
pub mod element;
pub mod error;
pub mod linalg;
pub mod search;
pub mod shape;
pub mod tensor;
pub mod text;
pub mod view;

pub use code::{LinearCode, MatrixKind};
pub use decoder::{DecodeOutcome, SyndromeDecoder, SyndromeTable};
pub use element::Element;
pub use error::{ECCError, LinAlgError, ParseError, ShapeError};
pub use linalg::RowOps;
pub use search::ErrorVectors;
pub use shape::{Dims, Shape};
pub use tensor::Tensor;
pub use view::{Cyclic, NdArray, NdArrayMut, Repeat, Row, Window};
