//! Wire representation of arbitrary-precision integers.
//!
//! A big integer is a sign byte followed by the little-endian bytes of its
//! magnitude. The length of the magnitude is carried by the enclosing tag:
//! one byte for [`Tag::SmallBig`], four bytes for [`Tag::LargeBig`].
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::tag::Tag;
use crate::{Error, Result};

/// Builds an integer from a sign byte and a little-endian magnitude.
///
/// Any non-zero sign byte means negative. A zero magnitude is zero
/// regardless of the sign byte.
pub fn decode_magnitude(sign: u8, magnitude: &[u8]) -> BigInt {
    let magnitude = BigUint::from_bytes_le(magnitude);
    let sign = if sign == 0 { Sign::Plus } else { Sign::Minus };
    BigInt::from_biguint(sign, magnitude)
}

/// Splits an integer into its sign byte and minimal little-endian magnitude.
///
/// Zero has an empty magnitude and a positive sign.
pub fn encode(value: &BigInt) -> (u8, Vec<u8>) {
    if value.is_zero() {
        return (0, Vec::new());
    }
    let (sign, magnitude) = value.to_bytes_le();
    let sign = if sign == Sign::Minus { 1 } else { 0 };
    (sign, magnitude)
}

/// Picks the tag able to carry a magnitude of `len` bytes.
pub fn tag_for_len(len: usize) -> Result<Tag> {
    if len <= usize::from(u8::MAX) {
        Ok(Tag::SmallBig)
    } else if u32::try_from(len).is_ok() {
        Ok(Tag::LargeBig)
    } else {
        Err(Error::Overflow {
            what: "integer magnitude",
            len,
        })
    }
}
