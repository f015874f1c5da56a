use crate::error::Error;
use crate::result::Result;

use num_bigint::BigInt;
use num_bigint::Sign;
use num_traits::ToPrimitive;
use num_traits::Zero;

// the num_bigint radix conversions (from_radix_be and friends) only take
// u8 digits, which caps them at a radix of 256. FF3 admits radices up to
// 2**16, so the conversions are done longhand here.

/// Interpret `digits` as a base-`radix` integer in which `digits[0]` is
/// the least-significant numeral.
pub fn num_rev(digits: &[u16], radix: usize) -> Result<BigInt> {
    let mut n = BigInt::from(0u8);

    for &d in digits.iter().rev() {
        if d as usize >= radix {
            return Err(Error::StringNotInRadix);
        }
        n = n * radix + d;
    }

    Ok(n)
}

/// The inverse of [`num_rev`]: fill `out` with the base-`radix` digits of
/// `n`, least-significant numeral first, zero-padding the high positions
/// when `n` is short.
///
/// The caller reduces `n` modulo `radix**out.len()` beforehand; a value
/// that still does not fit is reported as an error rather than truncated.
pub fn str_rev(n: &BigInt, out: &mut [u16], radix: usize) -> Result<()> {
    if n.sign() == Sign::Minus {
        return Err(Error::invalid(
            "cannot convert a negative integer to numerals",
        ));
    }

    let r = BigInt::from(radix);
    let mut q = n.clone();

    for d in out.iter_mut() {
        let rem = &q % &r;
        q /= &r;
        // rem is in [0, radix) and radix <= 2**16
        *d = rem.to_u16().unwrap();
    }

    if !q.is_zero() {
        return Err(Error::invalid(&format!(
            "integer does not fit in {} numerals of radix {}",
            out.len(),
            radix
        )));
    }

    Ok(())
}
