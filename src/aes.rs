use crate::error::Error;
use crate::result::Result;

use aes::cipher::BlockEncrypt;
use aes::cipher::KeyInit;

enum AesType {
    Aes128(aes::Aes128),
    Aes192(aes::Aes192),
    Aes256(aes::Aes256),
}

/// A fixed-key AES primitive encrypting one 16-byte block at a time.
///
/// FF3 only ever uses the forward direction of AES, even when decrypting,
/// so no decryptor is kept.
pub struct Cipher {
    enc: AesType,
}

macro_rules! construct_cipher {
    ($type:ident, $key:expr) => {
        Cipher {
            enc: AesType::$type(aes::$type::new($key.into())),
        }
    };
}

impl Cipher {
    pub fn new(key: &[u8]) -> Result<Cipher> {
        Ok(match key.len() {
            16 => construct_cipher!(Aes128, key),
            24 => construct_cipher!(Aes192, key),
            32 => construct_cipher!(Aes256, key),
            _ => {
                return Err(Error::invalid(&format!(
                    "invalid key length; expected 16, 24, or 32 bytes, got {}",
                    key.len()
                )))
            }
        })
    }

    pub fn encrypt_block(&self, src: &[u8; 16], dst: &mut [u8; 16]) {
        match &self.enc {
            AesType::Aes128(e) => e.encrypt_block_b2b(src.into(), dst.into()),
            AesType::Aes192(e) => e.encrypt_block_b2b(src.into(), dst.into()),
            AesType::Aes256(e) => e.encrypt_block_b2b(src.into(), dst.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cipher;
    use crate::result::Result;

    // FIPS-197 appendix C example vectors
    #[test]
    fn test_fips197_examples() -> Result<()> {
        let pt: [u8; 16] = hex::decode("00112233445566778899aabbccddeeff")
            .unwrap()
            .try_into()
            .unwrap();

        let cases = [
            (
                "000102030405060708090a0b0c0d0e0f",
                "69c4e0d86a7b0430d8cdb78070b4c55a",
            ),
            (
                "000102030405060708090a0b0c0d0e0f1011121314151617",
                "dda97ca4864cdfe06eaf70a0ec0d7191",
            ),
            (
                "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
                "8ea2b7ca516745bfeafc49904b496089",
            ),
        ];

        for (key, ct) in cases {
            let cipher = Cipher::new(&hex::decode(key).unwrap())?;
            let mut out = [0u8; 16];
            cipher.encrypt_block(&pt, &mut out);
            assert_eq!(hex::encode(out), ct);
        }

        Ok(())
    }

    #[test]
    fn test_bad_key_length() {
        assert!(Cipher::new(&[0; 15]).is_err());
        assert!(Cipher::new(&[0; 33]).is_err());
    }
}
