//! The FF3 algorithm
//!
//! The FF3 algorithm supports key sizes of 128, 192, and 256 bits.
//! The length of the tweak is specified by the algorithm as 64 bits.
//!
//! This implementation contains a "context" structure, called FF3,
//! that holds the encryption key, the default tweak, and some other
//! parameters related to the algorithm. Once this structure has
//! been created, it can be used to encrypt and decrypt data
//!
//! # Example
//! ```rust
//! let ff3 = ff3_fpe::ff3::FF3::new_with_radix(
//!     &[
//!         0xef, 0x43, 0x59, 0xd8, 0xd5, 0x80, 0xaa, 0x4f,
//!         0x7f, 0x03, 0x6d, 0x6f, 0x04, 0xfc, 0x6a, 0x94,
//!     ],    // the encryption key
//!     // the default tweak
//!     &[0x9a, 0x76, 0x8a, 0x92, 0xf6, 0x0e, 0x12, 0xd8],
//!     26,   // radix specifies the number of characters in the alphabet
//! ).unwrap();
//!
//! let pt = "0123456789abcdefghi";
//! let ct = "g2pk40i992fn20cjakb";
//!
//! let out = ff3.encrypt(pt, None).unwrap();
//! assert!(out == ct);
//!
//! let out = ff3.decrypt(&ct, None).unwrap();
//! assert!(out == pt);
//! ```

use crate::aes;
use crate::alphabet::Alphabet;
use crate::error::Error;
use crate::numeral;
use crate::result::Result;

use num_bigint::BigInt;
use num_bigint::Sign;
use num_traits::Euclid;

const ROUNDS: u8 = 8;
const TWEAK_LEN: usize = 8;

// both halves of the input must encode at least this many distinct
// values, which is what the minimum text length is derived from
const FEISTEL_MIN: f64 = 100.0;

enum CipherType {
    Encrypt,
    Decrypt,
}

/// The FF3 context structure
pub struct FF3 {
    cipher: aes::Cipher,
    alpha: Alphabet,
    twk: [u8; TWEAK_LEN],
    min_len: usize,
    max_len: usize,
}

/// Round parameters by parity of the round index: even rounds produce a
/// half of length `u` under the right tweak half, odd rounds a half of
/// length `v` under the left. The same schedule serves both directions.
fn round_params<'a>(
    i: u8,
    u: usize,
    v: usize,
    tl: &'a [u8; 4],
    tr: &'a [u8; 4],
    pow_u: &'a BigInt,
    pow_v: &'a BigInt,
) -> (usize, &'a [u8; 4], &'a BigInt) {
    if i % 2 == 0 {
        (u, tr, pow_u)
    } else {
        (v, tl, pow_v)
    }
}

/// The 16-byte AES input for round `i`: the tweak half with the round
/// counter folded into its last byte, followed by the opposite half's
/// integer value as 12 big-endian bytes, right-aligned over a zeroed pad.
fn round_block(w: &[u8; 4], i: u8, n: &BigInt) -> Result<[u8; 16]> {
    let mut p = [0u8; 16];

    p[..4].copy_from_slice(w);
    p[3] ^= i;

    // cannot exceed 12 bytes while the text length bounds hold, since
    // radix**max_len <= 2**192 caps either half at 2**96
    let (_, bytes) = n.to_bytes_be();
    if bytes.len() > 12 {
        return Err(Error::invalid("half value does not fit in 12 bytes"));
    }
    p[16 - bytes.len()..].copy_from_slice(&bytes);

    Ok(p)
}

impl FF3 {
    /// Create a new FF3 context
    ///
    /// The supplied key may be any of the lengths supported by AES. It is
    /// byte-reversed before keying AES, as the algorithm requires.
    ///
    /// The default tweak must be exactly 8 bytes as per the algorithm
    /// specification. A different tweak may be supplied during the encrypt
    /// and decrypt operations.
    ///
    /// The radix is the number of characters in the alphabet; it must be
    /// between 2 and 65536, and each character may appear only once.
    pub fn new(key: &[u8], twk: &[u8], alpha: &str) -> Result<Self> {
        Self::with_alphabet(key, twk, Alphabet::new(Some(alpha), None)?)
    }

    /// Create a new FF3 context over the first `radix` characters of the
    /// default alphabet
    ///
    /// Contexts built this way stay interoperable with data produced by
    /// older deployments of this algorithm family, which is the reason the
    /// default alphabet's letter ordering must never change.
    pub fn new_with_radix(key: &[u8], twk: &[u8], radix: usize) -> Result<Self> {
        if radix < 2 {
            return Err(Error::invalid(&format!(
                "invalid radix; must be at least 2, got {}",
                radix
            )));
        }

        Self::with_alphabet(key, twk, Alphabet::new(None, Some(radix))?)
    }

    fn with_alphabet(key: &[u8], twk: &[u8], alpha: Alphabet) -> Result<Self> {
        let radix = alpha.radix();
        if radix < 2 {
            return Err(Error::invalid(&format!(
                "invalid radix; must be at least 2, got {}",
                radix
            )));
        }

        // the minimum required length is given by the inequality:
        // radix**minlen >= 100
        //
        // therefore:
        //  minlen = ceil(log_radix(100))
        //         = ceil(log_10(100) / log_10(radix))
        let min_len =
            (FEISTEL_MIN.log10() / (radix as f64).log10()).ceil() as usize;

        // maxlen for ff3:
        //   = 2 * log_radix(2**96)
        //   = 2 * 96 / log2(radix)
        //   = 192 / log2(radix)
        let max_len = (192f64 / (radix as f64).log2()).floor() as usize;

        if min_len > max_len {
            return Err(Error::invalid(&format!(
                "unsupported radix; minimum text length {} exceeds the maximum {}",
                min_len, max_len
            )));
        }

        if twk.len() != TWEAK_LEN {
            return Err(Error::TweakLengthInvalid);
        }
        let mut t = [0u8; TWEAK_LEN];
        t.copy_from_slice(twk);

        // the key is reversed for ff3
        let mut k = key.to_vec();
        k.reverse();

        Ok(FF3 {
            cipher: aes::Cipher::new(&k)?,
            alpha: alpha,
            twk: t,
            min_len: min_len,
            max_len: max_len,
        })
    }

    fn validate_text_length(&self, n: usize) -> Result<()> {
        // the upper bound is exclusive; texts of exactly max_len numerals
        // are rejected to stay interoperable with existing implementations
        if n < self.min_len || n >= self.max_len {
            return Err(Error::invalid(&format!(
                "invalid text length; expected between {} and {} characters, got {}",
                self.min_len,
                self.max_len - 1,
                n
            )));
        }

        Ok(())
    }

    /// AES over a 16-byte block with the bytes reversed on the way in and
    /// on the way out, which is how FF3 invokes the block cipher. Operates
    /// on fresh copies; the caller's block is left untouched.
    fn ciph(&self, p: &[u8; 16]) -> [u8; 16] {
        let mut src = *p;
        src.reverse();

        let mut dst = [0u8; 16];
        self.cipher.encrypt_block(&src, &mut dst);
        dst.reverse();

        dst
    }

    fn cipher_numerals(
        &self,
        x: &[u16],
        opt_twk: Option<&[u8]>,
        which: CipherType,
    ) -> Result<Vec<u16>> {
        let radix = self.alpha.radix();

        let n = x.len();
        self.validate_text_length(n)?;

        let t: &[u8] = match opt_twk {
            None => &self.twk,
            Some(t) => t,
        };
        if t.len() != TWEAK_LEN {
            return Err(Error::TweakLengthInvalid);
        }

        // (step 1) the left half gets the extra numeral on odd lengths
        let v = n / 2;
        let u = n - v;

        // (step 2) the numeral convention is least-significant first, so
        // the halves are taken from the input without any reordering
        let mut a = x[..u].to_vec();
        let mut b = x[u..].to_vec();

        // (step 3) tl and tr are the first and last four tweak bytes
        let mut tl = [0u8; 4];
        tl.copy_from_slice(&t[..4]);
        let mut tr = [0u8; 4];
        tr.copy_from_slice(&t[4..]);

        // later on radix**m where m is either u or v is needed. just
        // calculate them both here. note that u either equals v or is
        // one more than v
        let mut pow_v: BigInt = radix.into();
        pow_v = pow_v.pow(v as u32);
        let mut pow_u = pow_v.clone();
        if u != v {
            pow_u *= radix;
        }

        // scratch for the rewritten half, sized for the longer one
        let mut c = vec![0u16; u];

        match which {
            CipherType::Encrypt => {
                for i in 0..ROUNDS {
                    let (m, w, modulus) =
                        round_params(i, u, v, &tl, &tr, &pow_u, &pow_v);

                    // (steps 4i, 4ii) the AES input is built from the
                    // numeral value of the half that is kept this round
                    let p =
                        round_block(w, i, &numeral::num_rev(&b, radix)?)?;

                    // (steps 4iii, 4iv)
                    let s = self.ciph(&p);
                    let y = BigInt::from_bytes_be(Sign::Plus, &s);

                    // (step 4v)
                    let mut acc = numeral::num_rev(&a, radix)? + y;
                    acc = acc.rem_euclid(modulus);

                    // (step 4vi)
                    numeral::str_rev(&acc, &mut c[..m], radix)?;

                    // (steps 4vii, 4viii)
                    std::mem::swap(&mut a, &mut b);
                    b.clear();
                    b.extend_from_slice(&c[..m]);
                }
            }
            CipherType::Decrypt => {
                // the rounds run in reverse; the per-round parameters are
                // selected by the absolute round index, same as above
                for i in (0..ROUNDS).rev() {
                    let (m, w, modulus) =
                        round_params(i, u, v, &tl, &tr, &pow_u, &pow_v);

                    let p =
                        round_block(w, i, &numeral::num_rev(&a, radix)?)?;

                    // AES runs in the encrypt direction here too; FF3
                    // inverts a round by subtraction
                    let s = self.ciph(&p);
                    let y = BigInt::from_bytes_be(Sign::Plus, &s);

                    // rem_euclid keeps the difference in [0, modulus)
                    let mut acc = numeral::num_rev(&b, radix)? - y;
                    acc = acc.rem_euclid(modulus);

                    numeral::str_rev(&acc, &mut c[..m], radix)?;

                    std::mem::swap(&mut a, &mut b);
                    a.clear();
                    a.extend_from_slice(&c[..m]);
                }
            }
        }

        // (step 5)
        Ok([a, b].concat())
    }

    // common function to convert the input String to numerals before the
    // cipher operation and back again after
    fn cipher_string(
        &self,
        inp: &str,
        opt_twk: Option<&[u8]>,
        which: CipherType,
    ) -> Result<String> {
        let numerals = self.alpha.encode(inp)?;
        let out = self.cipher_numerals(&numerals, opt_twk, which)?;
        self.alpha.decode(&out)
    }

    /// Encrypt a string
    ///
    /// If the tweak is not None, then the specified tweak will be used
    /// instead of the default specified by the context structure.
    pub fn encrypt(&self, pt: &str, twk: Option<&[u8]>) -> Result<String> {
        self.cipher_string(pt, twk, CipherType::Encrypt)
    }

    /// Decrypt a string
    ///
    /// If the tweak is not None, then the specified tweak will be used
    /// instead of the default specified by the context structure. The
    /// tweak used must match that used during encryption.
    pub fn decrypt(&self, ct: &str, twk: Option<&[u8]>) -> Result<String> {
        self.cipher_string(ct, twk, CipherType::Decrypt)
    }
}

fn cipher(
    key: &[u8],
    twk: &[u8],
    txt: &str,
    alpha: &str,
    op: fn(&FF3, &str, Option<&[u8]>) -> Result<String>,
) -> Result<String> {
    let ff3 = FF3::new(key, twk, alpha)?;
    return op(&ff3, txt, None);
}

pub fn encrypt(key: &[u8], twk: &[u8], pt: &str, alpha: &str) -> Result<String> {
    return cipher(key, twk, pt, alpha, FF3::encrypt);
}

pub fn decrypt(key: &[u8], twk: &[u8], ct: &str, alpha: &str) -> Result<String> {
    return cipher(key, twk, ct, alpha, FF3::decrypt);
}

#[cfg(test)]
mod tests {
    use super::FF3;
    use crate::error::Error;
    use crate::result::Result;

    use std::collections::HashSet;

    const KEY128: &str = "EF4359D8D580AA4F7F036D6F04FC6A94";
    const TWEAK: &str = "D8E7920AFA330A73";

    fn context() -> Result<FF3> {
        FF3::new_with_radix(
            &hex::decode(KEY128).unwrap(),
            &hex::decode(TWEAK).unwrap(),
            10,
        )
    }

    #[test]
    fn test_kat_docstring() -> Result<()> {
        // Example from the module docstring
        let ff3 = FF3::new_with_radix(
            &hex::decode(KEY128).unwrap(),
            &hex::decode("9A768A92F60E12D8").unwrap(),
            26,
        )?;

        let ct = ff3.encrypt("0123456789abcdefghi", None)?;
        assert_eq!(ct, "g2pk40i992fn20cjakb");
        Ok(())
    }

    #[test]
    fn test_key_sizes_roundtrip() -> Result<()> {
        let tweak = [0u8; 8];
        let plaintext = "123456789012";

        let keys = vec![vec![0u8; 16], vec![1u8; 24], vec![2u8; 32]];
        for k in keys {
            let ff3 = FF3::new_with_radix(&k, &tweak, 10)?;
            let ct = ff3.encrypt(plaintext, None)?;
            let dt = ff3.decrypt(&ct, None)?;
            assert_eq!(dt, plaintext);
        }

        Ok(())
    }

    #[test]
    fn test_invalid_key_length() {
        assert!(FF3::new_with_radix(&[0u8; 15], &[0u8; 8], 10).is_err());
        assert!(FF3::new_with_radix(&[0u8; 0], &[0u8; 8], 10).is_err());
    }

    #[test]
    fn test_tweak_invalid_length() {
        let key = vec![0u8; 16];

        for bad in [7usize, 9] {
            let res = FF3::new_with_radix(&key, &vec![0u8; bad], 10);
            assert_eq!(res.err(), Some(Error::TweakLengthInvalid));
        }

        // the per-call override is validated the same way
        let ff3 = FF3::new_with_radix(&key, &[0u8; 8], 10).unwrap();
        let res = ff3.encrypt("123456", Some(&[0u8; 7]));
        assert_eq!(res.err(), Some(Error::TweakLengthInvalid));
    }

    #[test]
    fn test_invalid_radix() {
        let key = vec![0u8; 16];
        assert!(FF3::new_with_radix(&key, &[0u8; 8], 0).is_err());
        assert!(FF3::new_with_radix(&key, &[0u8; 8], 1).is_err());
        assert!(FF3::new(&key, &[0u8; 8], "a").is_err());
    }

    #[test]
    fn test_alphabet_duplicates() {
        let res = FF3::new(&[0u8; 16], &[0u8; 8], "1123456789");
        assert!(res.is_err());
    }

    // for radix 10 the admissible lengths are 2 through 56; 57 numerals
    // would still fit the arithmetic but is excluded, see
    // validate_text_length
    #[test]
    fn test_text_length_bounds() -> Result<()> {
        let ff3 = context()?;

        assert!(ff3.encrypt("1", None).is_err());
        assert!(ff3.encrypt(&"1".repeat(57), None).is_err());

        for n in [2usize, 56] {
            let pt = "7".repeat(n);
            let ct = ff3.encrypt(&pt, None)?;
            assert_eq!(ct.len(), n);
            assert_eq!(ff3.decrypt(&ct, None)?, pt);
        }

        Ok(())
    }

    #[test]
    fn test_string_not_in_radix() -> Result<()> {
        let ff3 = context()?;
        let res = ff3.encrypt("12x456", None);
        assert_eq!(res.err(), Some(Error::StringNotInRadix));
        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<()> {
        let ff3 = context()?;
        let a = ff3.encrypt("890121234567890000", None)?;
        let b = ff3.encrypt("890121234567890000", None)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_default_tweak_equals_explicit() -> Result<()> {
        let ff3 = context()?;
        let twk = hex::decode(TWEAK).unwrap();
        assert_eq!(
            ff3.encrypt("890121234567890000", None)?,
            ff3.encrypt("890121234567890000", Some(&twk))?
        );
        Ok(())
    }

    #[test]
    fn test_tweak_sensitivity() -> Result<()> {
        let ff3 = context()?;
        let pt = "890121234567890000";

        let base = ff3.encrypt(pt, None)?;
        let mut twk = hex::decode(TWEAK).unwrap();
        twk[5] ^= 0x01;
        let flipped = ff3.encrypt(pt, Some(&twk))?;

        assert_ne!(base, flipped);
        assert_eq!(ff3.decrypt(&flipped, Some(&twk))?, pt);
        Ok(())
    }

    // the key must be byte-reversed before keying AES; a context built
    // from the reversed key must therefore be a different permutation
    #[test]
    fn test_key_reversal_matters() -> Result<()> {
        let key = hex::decode(KEY128).unwrap();
        let mut rev = key.clone();
        rev.reverse();

        let twk = hex::decode(TWEAK).unwrap();
        let a = FF3::new_with_radix(&key, &twk, 10)?;
        let b = FF3::new_with_radix(&rev, &twk, 10)?;

        let pt = "890121234567890000";
        assert_ne!(a.encrypt(pt, None)?, b.encrypt(pt, None)?);
        Ok(())
    }

    #[test]
    fn test_injectivity_sample() -> Result<()> {
        let ff3 = context()?;

        let mut seen = HashSet::new();
        for i in 0..200u32 {
            let pt = format!("{:012}", i);
            let ct = ff3.encrypt(&pt, None)?;
            assert_eq!(ct.len(), 12);
            assert!(seen.insert(ct), "ciphertext collision for {}", pt);
        }

        Ok(())
    }

    #[test]
    fn test_custom_alphabet_roundtrip() -> Result<()> {
        let ff3 = FF3::new(
            &hex::decode(KEY128).unwrap(),
            &hex::decode(TWEAK).unwrap(),
            "!@#$%^&*()abcdef",
        )?;

        let pt = "(*@!abc#)^$%fed&";
        let ct = ff3.encrypt(pt, None)?;
        assert_eq!(ct.len(), pt.len());
        assert!(ct.chars().all(|c| "!@#$%^&*()abcdef".contains(c)));
        assert_eq!(ff3.decrypt(&ct, None)?, pt);
        Ok(())
    }

    #[test]
    fn test_one_shot_functions() -> Result<()> {
        let key = hex::decode(KEY128).unwrap();
        let twk = hex::decode(TWEAK).unwrap();

        let ct = super::encrypt(&key, &twk, "890121234567890000", "0123456789")?;
        assert_eq!(ct, "750918814058654607");
        assert_eq!(
            super::decrypt(&key, &twk, &ct, "0123456789")?,
            "890121234567890000"
        );
        Ok(())
    }
}
