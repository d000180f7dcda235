//! Classical matrices and codes, assembled through views.

use crate::code::LinearCode;
use crate::error::ECCError;
use crate::tensor::Tensor;
use crate::view::{NdArray, NdArrayMut};

/// Largest message length accepted by [`hadamard_code`], whose length grows as `2^k`
pub const MAX_HADAMARD_DIMENSION: usize = 16;

pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

/// Paley construction of an `n x n` Hadamard matrix, for `n - 1` a prime `p ≡ 3 (mod 4)`
///
/// The first row and column are all ones. The remaining `p x p` block is the circulant of
/// the quadratic character of GF(p), read through a cyclic view, minus the identity.
pub fn hadamard_paley(n: usize) -> Result<Tensor<i8>, ECCError> {
    let p = n.wrapping_sub(1);
    if n == 0 || !is_prime(p) || p % 4 != 3 {
        return Err(ECCError::InvalidParameter(format!(
            "Paley construction needs n - 1 to be a prime congruent to 3 mod 4, got n = {n}"
        )));
    }

    let mut chi = Tensor::<i8>::filled([p], -1);
    chi.set(&[0], 0);
    for i in 1..p {
        chi.set(&[(i * i) % p], 1);
    }
    let rep = chi.cyclic();

    let mut a = Tensor::<i8>::ones([n, n]);
    let mut q = a.window_mut(&[1, 1], &[p, p])?;
    for i in 0..p {
        for j in 0..p {
            q.set(&[i, j], rep.at_wrapped(&[j as isize - i as isize]));
        }
    }
    q.sub_assign_from(&Tensor::identity(p))?;
    Ok(a)
}

/// Sylvester construction of an `n x n` Hadamard matrix, for `n` a power of two
///
/// The half-size matrix is tiled over all four quadrants, then the bottom-right quadrant is
/// negated.
pub fn hadamard_sylvester(n: usize) -> Result<Tensor<i8>, ECCError> {
    if !n.is_power_of_two() {
        return Err(ECCError::InvalidParameter(format!(
            "Sylvester construction needs a power of two, got n = {n}"
        )));
    }
    if n == 1 {
        return Ok(Tensor::ones([1, 1]));
    }

    let half = hadamard_sylvester(n / 2)?;
    let mut a = Tensor::<i8>::ones([n, n]);
    a.tile_from(&half.cyclic())?;
    a.window_mut(&[n / 2, n / 2], &[n / 2, n / 2])?
        .map_inplace(|x| -x);
    Ok(a)
}

/// Maps the positive entries of a `±1` matrix to 1 and everything else to 0
pub fn to_binary<A: NdArray<Elem = i8>>(m: &A) -> Tensor<u8> {
    Tensor::build(m.shape(), |idx| u8::from(m.at(idx) > 0))
}

/// Generator of the extended binary Golay code, a `[24, 12, 8]` code
///
/// Left block is the identity. The right block is derived from the binarized Paley
/// matrix of order 12: its lower-right 11x11 corner is complemented and written
/// transposed into rows 1..12, columns 12..23.
pub fn golay24() -> Tensor<u8> {
    assemble_golay24().expect("the Golay construction only uses fixed, valid geometry")
}

fn assemble_golay24() -> Result<Tensor<u8>, ECCError> {
    let mut g = Tensor::<u8>::ones([12, 24]);
    g.window_mut(&[0, 0], &[12, 12])?
        .assign(&Tensor::identity(12))?;

    let mut a = to_binary(&hadamard_paley(12)?);
    let mut v = a.window_mut(&[1, 1], &[11, 11])?;
    v.map_inplace(|x| x ^ 1);
    g.window_mut(&[1, 12], &[11, 11])?.assign_transposed(&v)?;
    g.set(&[0, 23], 0);
    Ok(g)
}

/// First-order Hadamard code of dimension `k`
///
/// Column `z` of the generator holds the binary expansion of `z`, most significant bit in
/// row 0, for every `z` in `0..2^k`, so the code has length `2^k` and distance `2^(k-1)`.
/// The augmented variant keeps only the columns with the top bit set, giving length
/// `2^(k-1)`.
pub fn hadamard_code(k: usize, augmented: bool) -> Result<LinearCode, ECCError> {
    if k == 0 || k > MAX_HADAMARD_DIMENSION {
        return Err(ECCError::InvalidParameter(format!(
            "Hadamard code dimension must lie in 1..={MAX_HADAMARD_DIMENSION}, got {k}"
        )));
    }
    let n = 1usize << k;
    let start = if augmented { n >> 1 } else { 0 };
    let g = Tensor::<u8>::build([k, n - start], |idx| {
        (((start + idx[1]) >> (k - 1 - idx[0])) & 1) as u8
    });

    let d = match (augmented, k) {
        (false, _) => n >> 1,
        (true, 1) => 1,
        (true, _) => n >> 2,
    };
    Ok(LinearCode::from_generator(g)?.with_known_distance(d))
}
