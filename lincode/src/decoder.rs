//! Bounded-distance syndrome decoding.

use log::{debug, info, trace};
use rustc_hash::FxHashMap;

use crate::code::LinearCode;
use crate::element::Element;
use crate::error::ECCError;
use crate::linalg::{solve, syndrome};
use crate::search::{syndrome_key, ErrorVectors};
use crate::tensor::{matrix_dims, Tensor};
use crate::view::{NdArray, NdArrayMut};

/// Coset leaders indexed by syndrome
///
/// Built from every error pattern up to a maximum weight. Patterns are visited in
/// increasing weight, and the first pattern seen for a syndrome is kept, so each leader has
/// minimum weight within its coset among the patterns searched.
#[derive(Clone, Debug)]
pub struct SyndromeTable {
    leaders: FxHashMap<Vec<u8>, Tensor<u8>>,
    max_weight: usize,
}

impl SyndromeTable {
    pub fn build<A: NdArray<Elem = u8>>(check: &A, max_weight: usize) -> Result<Self, ECCError> {
        let (_, n) = matrix_dims(check)?;
        let mut leaders = FxHashMap::default();
        for e in &ErrorVectors::new(n, max_weight)? {
            let key = syndrome_key(&syndrome(check, &e)?);
            leaders.entry(key).or_insert(e);
        }
        debug!(
            "syndrome table holds {} coset leaders of weight <= {max_weight}",
            leaders.len()
        );
        Ok(SyndromeTable {
            leaders,
            max_weight,
        })
    }

    /// The coset leader for `syndrome`, if one of weight at most `max_weight` exists
    pub fn leader<A: NdArray + ?Sized>(&self, syndrome: &A) -> Option<&Tensor<u8>> {
        self.leaders.get(&syndrome_key(syndrome))
    }

    pub fn max_weight(&self) -> usize {
        self.max_weight
    }

    pub fn len(&self) -> usize {
        self.leaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty()
    }
}

/// Result of decoding one received word
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The word was within the decoding radius of a codeword
    Decoded {
        message: Tensor<u8>,
        /// Number of flipped positions that were corrected
        corrected: usize,
    },
    /// The syndrome has no coset leader within the decoding radius
    Uncorrectable,
}

impl DecodeOutcome {
    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeOutcome::Decoded { .. })
    }

    pub fn message(&self) -> Option<&Tensor<u8>> {
        match self {
            DecodeOutcome::Decoded { message, .. } => Some(message),
            DecodeOutcome::Uncorrectable => None,
        }
    }

    pub fn into_message(self) -> Option<Tensor<u8>> {
        match self {
            DecodeOutcome::Decoded { message, .. } => Some(message),
            DecodeOutcome::Uncorrectable => None,
        }
    }
}

/// Corrects up to `t` flipped bits per word by syndrome lookup, then solves for the message
///
/// ```
/// use lincode::{LinearCode, SyndromeDecoder, Tensor, NdArrayMut};
///
/// let code: LinearCode = "generator 1 3 %%%1 1 1".parse().unwrap();
/// let decoder = SyndromeDecoder::new(&code).unwrap();
/// let mut word = code.encode(&Tensor::vector(vec![1])).unwrap();
/// word.set(&[1], 0);
/// let outcome = decoder.decode(&word).unwrap();
/// assert_eq!(outcome.message(), Some(&Tensor::vector(vec![1])));
/// ```
#[derive(Debug)]
pub struct SyndromeDecoder<'a> {
    code: &'a LinearCode,
    table: SyndromeTable,
}

impl<'a> SyndromeDecoder<'a> {
    /// Decoder with radius `t = (d - 1) / 2`, which needs the minimum distance of `code`
    pub fn new(code: &'a LinearCode) -> Result<Self, ECCError> {
        let d = code.distance()?;
        let t = d.saturating_sub(1) / 2;
        info!(
            "decoding [{}, {}, {d}] code, correcting up to {t} errors",
            code.length(),
            code.block_length()
        );
        Self::with_radius(code, t)
    }

    /// Decoder with a caller-chosen radius
    ///
    /// A radius above `(d - 1) / 2` still decodes every word, but the correction may land
    /// on the wrong codeword.
    pub fn with_radius(code: &'a LinearCode, radius: usize) -> Result<Self, ECCError> {
        let table = SyndromeTable::build(code.check(), radius)?;
        info!("syndrome table has {} entries for radius {radius}", table.len());
        Ok(SyndromeDecoder { code, table })
    }

    pub fn code(&self) -> &LinearCode {
        self.code
    }

    pub fn radius(&self) -> usize {
        self.table.max_weight()
    }

    pub fn table(&self) -> &SyndromeTable {
        &self.table
    }

    /// # Errors
    ///
    /// `DimensionMismatch` if `received` is not a vector of length `n`. A word that is too
    /// corrupted is not an error but [`DecodeOutcome::Uncorrectable`].
    pub fn decode<A: NdArray<Elem = u8>>(&self, received: &A) -> Result<DecodeOutcome, ECCError> {
        let s = self.code.syndrome(received)?;
        let Some(leader) = self.table.leader(&s) else {
            debug!(
                "failed decoding: syndrome {} has no coset leader of weight <= {}",
                s,
                self.radius()
            );
            return Ok(DecodeOutcome::Uncorrectable);
        };

        let mut corrected = received.to_tensor();
        corrected.combine(leader, Element::add_mod2)?;
        let message = solve(self.code.generator(), &corrected)?;
        trace!("syndrome {} -> corrected {} -> message {}", s, corrected, message);
        Ok(DecodeOutcome::Decoded {
            message,
            corrected: leader.weight(),
        })
    }
}
