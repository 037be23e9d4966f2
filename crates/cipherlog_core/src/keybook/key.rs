//! Stream cipher key.
//!
//! A [`CipherKey`] wraps the secret material for one rotation interval of
//! the log: a 128-bit nonce (the AES-128 key) and a counter base. The
//! transform it produces is AES-128-CTR where the 16-byte counter register
//! starts at `counter_base + offset`.
//!
//! The counter is advanced by the **raw byte offset**, not a block index.
//! This is deliberate and must not be "corrected": existing ciphertext was
//! produced under this addressing scheme, and changing it to block-granular
//! addressing would silently break every stored byte. The consequence is
//! that encrypt and decrypt only agree when both sides pass the exact same
//! absolute offset - a mismatch produces wrong plaintext, not an error.

use crate::error::{CoreError, CoreResult};
use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the nonce (and the AES-128 key it doubles as) in bytes.
pub const NONCE_SIZE: usize = 16;

/// AES-128 in CTR mode, the full 16-byte IV treated as one big-endian
/// counter register.
type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// A symmetric stream cipher key governing one byte range of a log.
///
/// Immutable after construction: rotation never mutates a key in place,
/// it inserts a new one. The secret nonce is zeroized on drop and redacted
/// from debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    nonce: [u8; NONCE_SIZE],
    counter_base: u64,
}

/// Serialized form of a [`CipherKey`]: `{"nonce": hex, "iv": integer}`.
///
/// The nonce is 32 lowercase hex characters; `iv` is the counter base.
/// The field name `iv` is the wire format - renaming it would break every
/// persisted key book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Hex-encoded nonce.
    pub nonce: String,
    /// Counter base.
    pub iv: u64,
}

impl CipherKey {
    /// Generates a fresh random key with counter base 0.
    #[must_use]
    pub fn generate() -> Self {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self {
            nonce,
            counter_base: 0,
        }
    }

    /// Creates a key from raw parts.
    #[must_use]
    pub fn new(nonce: [u8; NONCE_SIZE], counter_base: u64) -> Self {
        Self {
            nonce,
            counter_base,
        }
    }

    /// Returns the counter base.
    #[must_use]
    pub fn counter_base(&self) -> u64 {
        self.counter_base
    }

    /// Encrypts `data` located at absolute byte position `offset` in the
    /// stream this key governs.
    ///
    /// Length-preserving. The same call with the same arguments is its own
    /// inverse (see [`decrypt`](Self::decrypt)).
    #[must_use]
    pub fn encrypt(&self, data: &[u8], offset: u64) -> Vec<u8> {
        self.apply_keystream(data, offset)
    }

    /// Decrypts `data` located at absolute byte position `offset`.
    ///
    /// CTR mode XORs a keystream, so decryption is the identical
    /// transform; the separate name exists for call-site clarity. There is
    /// no authentication: a wrong key or wrong offset yields wrong
    /// plaintext, never an error.
    #[must_use]
    pub fn decrypt(&self, data: &[u8], offset: u64) -> Vec<u8> {
        self.apply_keystream(data, offset)
    }

    fn apply_keystream(&self, data: &[u8], offset: u64) -> Vec<u8> {
        // counter register starts at counter_base + byte offset; u128 so
        // the sum cannot wrap
        let counter = u128::from(self.counter_base) + u128::from(offset);
        let mut cipher = Aes128Ctr::new(&self.nonce.into(), &counter.to_be_bytes().into());

        let mut out = data.to_vec();
        cipher.apply_keystream(&mut out);
        out
    }

    /// Serializes this key to its portable record form.
    #[must_use]
    pub fn to_record(&self) -> KeyRecord {
        KeyRecord {
            nonce: hex::encode(self.nonce),
            iv: self.counter_base,
        }
    }

    /// Rebuilds a key from its record form.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if the nonce is not valid
    /// hex or does not decode to exactly [`NONCE_SIZE`] bytes.
    pub fn from_record(record: &KeyRecord) -> CoreResult<Self> {
        let bytes = hex::decode(&record.nonce)
            .map_err(|err| CoreError::invalid_argument(format!("nonce is not valid hex: {err}")))?;

        let nonce: [u8; NONCE_SIZE] = bytes.try_into().map_err(|_| {
            CoreError::invalid_argument(format!(
                "nonce must be {} hex characters ({NONCE_SIZE} bytes)",
                NONCE_SIZE * 2
            ))
        })?;

        Ok(Self {
            nonce,
            counter_base: record.iv,
        })
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherKey")
            .field("nonce", &"[REDACTED]")
            .field("counter_base", &self.counter_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_key() -> CipherKey {
        CipherKey::new([0x42; NONCE_SIZE], 0)
    }

    #[test]
    fn encrypt_decrypt_round_trips() {
        let key = test_key();
        let plaintext = b"the quick brown fox";

        let ciphertext = key.encrypt(plaintext, 128);
        assert_ne!(&ciphertext, plaintext);
        assert_eq!(key.decrypt(&ciphertext, 128), plaintext);
    }

    #[test]
    fn transform_preserves_length() {
        let key = test_key();
        for len in [0usize, 1, 15, 16, 17, 1000] {
            let data = vec![0xaa; len];
            assert_eq!(key.encrypt(&data, 7).len(), len);
        }
    }

    #[test]
    fn encrypt_and_decrypt_are_the_same_transform() {
        let key = test_key();
        let data = b"symmetric";
        assert_eq!(key.encrypt(data, 3), key.decrypt(data, 3));
    }

    #[test]
    fn wrong_offset_yields_wrong_plaintext() {
        let key = test_key();
        let plaintext = b"offset sensitive payload";

        let ciphertext = key.encrypt(plaintext, 50);
        assert_ne!(key.decrypt(&ciphertext, 51), plaintext);
    }

    #[test]
    fn counter_base_shifts_the_keystream() {
        let base0 = CipherKey::new([7; NONCE_SIZE], 0);
        let base9 = CipherKey::new([7; NONCE_SIZE], 9);
        let data = b"same nonce, different base";

        assert_ne!(base0.encrypt(data, 0), base9.encrypt(data, 0));
        // base + offset is what addresses the keystream, so these agree
        assert_eq!(base0.encrypt(data, 9), base9.encrypt(data, 0));
    }

    #[test]
    fn generated_keys_are_distinct() {
        let a = CipherKey::generate();
        let b = CipherKey::generate();
        assert_ne!(a.to_record().nonce, b.to_record().nonce);
        assert_eq!(a.counter_base(), 0);
    }

    #[test]
    fn record_round_trips() {
        let key = CipherKey::new([0xab; NONCE_SIZE], 17);
        let record = key.to_record();
        assert_eq!(record.nonce, "ab".repeat(NONCE_SIZE));
        assert_eq!(record.iv, 17);

        let rebuilt = CipherKey::from_record(&record).unwrap();
        let data = b"round trip through the record";
        assert_eq!(rebuilt.decrypt(&key.encrypt(data, 33), 33), data);
    }

    #[test]
    fn record_nonce_is_lowercase_hex() {
        let record = CipherKey::generate().to_record();
        assert_eq!(record.nonce.len(), NONCE_SIZE * 2);
        assert!(record
            .nonce
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn from_record_rejects_bad_nonces() {
        let not_hex = KeyRecord {
            nonce: "zz".repeat(NONCE_SIZE),
            iv: 0,
        };
        assert!(matches!(
            CipherKey::from_record(&not_hex),
            Err(CoreError::InvalidArgument { .. })
        ));

        let too_short = KeyRecord {
            nonce: "abcd".to_string(),
            iv: 0,
        };
        assert!(matches!(
            CipherKey::from_record(&too_short),
            Err(CoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn debug_redacts_the_nonce() {
        let rendered = format!("{:?}", test_key());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("42"));
    }

    proptest! {
        #[test]
        fn round_trip_any_buffer_and_offset(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            offset in 0u64..1_000_000,
        ) {
            let key = test_key();
            prop_assert_eq!(key.decrypt(&key.encrypt(&data, offset), offset), data);
        }
    }
}
