// Copyright 2022 Sebastian Ramacher
// SPDX-License-Identifier: MIT

//! The authenticated cipher contract and the session state machine enforcing it.

use core::fmt;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;
use subtle::ConstantTimeEq;

use crate::{Algorithm, Engine, Error, KEY_SIZE, NONCE_SIZE, Result, TAG_SIZE};

/// Lifecycle phase of a session.
///
/// Phases are ordered; a session only ever moves forward until it is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Key and nonce are not both set yet.
    Fresh,
    /// Key and nonce are set; no data has been processed.
    KeyAndNonceSet,
    /// Associated data is being absorbed.
    AbsorbingAssociatedData,
    /// Payload is being encrypted or decrypted.
    ProcessingPayload,
    /// The tag has been computed.
    Finalized,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Fresh => "fresh",
            Phase::KeyAndNonceSet => "key-and-nonce-set",
            Phase::AbsorbingAssociatedData => "absorbing-associated-data",
            Phase::ProcessingPayload => "processing-payload",
            Phase::Finalized => "finalized",
        })
    }
}

/// Streaming authenticated encryption with associated data.
///
/// A single operation runs [`clear`](Self::clear), [`set_key`](Self::set_key) and
/// [`set_nonce`](Self::set_nonce) (in either order), zero or more
/// [`add_associated_data`](Self::add_associated_data) calls, zero or more encrypt or decrypt
/// calls, and ends with [`compute_tag`](Self::compute_tag) or [`verify_tag`](Self::verify_tag).
/// Calls out of this order fail with [`Error::InvalidState`].
///
/// Ciphertext and tag do not depend on how associated data and payload are split across calls.
/// Plaintext returned by the decrypt operations is unauthenticated until
/// [`verify_tag`](Self::verify_tag) succeeds; callers must discard it on
/// [`Error::TagMismatch`].
pub trait AuthenticatedCipher {
    /// Algorithm implemented by this cipher.
    fn algorithm(&self) -> Algorithm;

    /// Current phase of the operation.
    fn phase(&self) -> Phase;

    /// Size of the key in bytes.
    fn key_size(&self) -> usize {
        KEY_SIZE
    }

    /// Size of the nonce in bytes.
    fn nonce_size(&self) -> usize {
        NONCE_SIZE
    }

    /// Size of the tag in bytes.
    fn tag_size(&self) -> usize {
        TAG_SIZE
    }

    /// Discards all state and returns to [`Phase::Fresh`].
    fn clear(&mut self);

    /// Sets the key. The last key set before data is processed is used.
    fn set_key(&mut self, key: &[u8]) -> Result<()>;

    /// Sets the nonce. The last nonce set before data is processed is used.
    fn set_nonce(&mut self, nonce: &[u8]) -> Result<()>;

    /// Absorbs associated data.
    fn add_associated_data(&mut self, data: &[u8]) -> Result<()>;

    /// Encrypts the buffer in place.
    fn encrypt_in_place(&mut self, buffer: &mut [u8]) -> Result<()>;

    /// Decrypts the buffer in place.
    fn decrypt_in_place(&mut self, buffer: &mut [u8]) -> Result<()>;

    /// Finalizes the operation and returns the tag.
    fn compute_tag(&mut self) -> Result<[u8; TAG_SIZE]>;

    /// Finalizes the operation, if not done yet, and compares the tag with `tag` in constant
    /// time.
    fn verify_tag(&mut self, tag: &[u8]) -> Result<()>;

    /// Encrypts `input` into `output`, which must have the same length.
    fn encrypt(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        Error::check_length(input.len(), output.len())?;
        output.copy_from_slice(input);
        self.encrypt_in_place(output).inspect_err(|_| output.fill(0))
    }

    /// Decrypts `input` into `output`, which must have the same length.
    fn decrypt(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        Error::check_length(input.len(), output.len())?;
        output.copy_from_slice(input);
        self.decrypt_in_place(output).inspect_err(|_| output.fill(0))
    }

    /// Encrypts a chunk of plaintext and returns the ciphertext.
    #[cfg(feature = "alloc")]
    fn encrypt_chunk(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut buffer = plaintext.to_vec();
        self.encrypt_in_place(&mut buffer)?;
        Ok(buffer)
    }

    /// Decrypts a chunk of ciphertext and returns the plaintext.
    #[cfg(feature = "alloc")]
    fn decrypt_chunk(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let mut buffer = ciphertext.to_vec();
        self.decrypt_in_place(&mut buffer)?;
        Ok(buffer)
    }
}

/// A streaming operation of the engine `E`.
///
/// The session owns all of its state. Independent sessions share nothing and may be used from
/// different threads.
pub struct Session<E: Engine> {
    engine: E,
    phase: Phase,
    key: Option<[u8; KEY_SIZE]>,
    nonce: Option<[u8; NONCE_SIZE]>,
    tag: Option<[u8; TAG_SIZE]>,
    associated_data_len: u64,
    payload_len: u64,
}

impl<E: Engine> Session<E> {
    /// Creates a fresh session.
    pub fn new() -> Self {
        Self {
            engine: E::default(),
            phase: Phase::Fresh,
            key: None,
            nonce: None,
            tag: None,
            associated_data_len: 0,
            payload_len: 0,
        }
    }

    fn enter(&mut self, phase: Phase) {
        log::trace!("{}: {} -> {}", E::ALGORITHM, self.phase, phase);
        self.phase = phase;
    }

    fn reject(&self, operation: &'static str) -> Error {
        log::debug!(
            "{}: rejected `{}` in phase {}",
            E::ALGORITHM,
            operation,
            self.phase
        );
        Error::InvalidState {
            operation,
            phase: self.phase,
        }
    }

    fn key_material_changed(&mut self) {
        if self.phase == Phase::Fresh && self.key.is_some() && self.nonce.is_some() {
            self.enter(Phase::KeyAndNonceSet);
        }
    }

    /// Moves forward to `target`, running the engine transitions on the way.
    fn advance(&mut self, target: Phase, operation: &'static str) -> Result<()> {
        if self.phase == Phase::Fresh || self.phase > target {
            return Err(self.reject(operation));
        }

        if self.phase == Phase::KeyAndNonceSet {
            let (Some(key), Some(nonce)) = (self.key.as_ref(), self.nonce.as_ref()) else {
                return Err(self.reject(operation));
            };
            self.engine.initialize(key, nonce);
            self.enter(Phase::AbsorbingAssociatedData);
        }

        if target >= Phase::ProcessingPayload && self.phase == Phase::AbsorbingAssociatedData {
            self.engine.finish_associated_data(self.associated_data_len);
            self.enter(Phase::ProcessingPayload);
        }

        Ok(())
    }

    fn finalize(&mut self, operation: &'static str) -> Result<[u8; TAG_SIZE]> {
        if self.phase == Phase::Finalized {
            return Err(self.reject(operation));
        }
        self.advance(Phase::ProcessingPayload, operation)?;

        let tag = self.engine.finalize();
        self.tag = Some(tag);
        log::trace!(
            "{}: finalized after {} bytes of associated data and {} bytes of payload",
            E::ALGORITHM,
            self.associated_data_len,
            self.payload_len
        );
        self.enter(Phase::Finalized);
        Ok(tag)
    }
}

impl<E: Engine> Default for Session<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Engine> fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("algorithm", &E::ALGORITHM)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "zeroize")]
impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.key.zeroize();
        self.nonce.zeroize();
        self.tag.zeroize();
    }
}

impl<E: Engine> AuthenticatedCipher for Session<E> {
    fn algorithm(&self) -> Algorithm {
        E::ALGORITHM
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn clear(&mut self) {
        // replacing the engine drops, and with `zeroize` wipes, the old state
        self.engine = E::default();
        #[cfg(feature = "zeroize")]
        {
            use zeroize::Zeroize;

            self.key.zeroize();
            self.nonce.zeroize();
            self.tag.zeroize();
        }
        self.key = None;
        self.nonce = None;
        self.tag = None;
        self.associated_data_len = 0;
        self.payload_len = 0;
        self.enter(Phase::Fresh);
    }

    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        Error::check_length(KEY_SIZE, key.len())?;
        if self.phase > Phase::KeyAndNonceSet {
            return Err(self.reject("set_key"));
        }
        let mut k = [0u8; KEY_SIZE];
        k.copy_from_slice(key);
        self.key = Some(k);
        self.key_material_changed();
        Ok(())
    }

    fn set_nonce(&mut self, nonce: &[u8]) -> Result<()> {
        Error::check_length(NONCE_SIZE, nonce.len())?;
        if self.phase > Phase::KeyAndNonceSet {
            return Err(self.reject("set_nonce"));
        }
        let mut n = [0u8; NONCE_SIZE];
        n.copy_from_slice(nonce);
        self.nonce = Some(n);
        self.key_material_changed();
        Ok(())
    }

    fn add_associated_data(&mut self, data: &[u8]) -> Result<()> {
        self.advance(Phase::AbsorbingAssociatedData, "add_associated_data")?;
        self.engine.absorb_associated_data(data);
        self.associated_data_len += data.len() as u64;
        Ok(())
    }

    fn encrypt_in_place(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.advance(Phase::ProcessingPayload, "encrypt")?;
        self.engine.encrypt_in_place(buffer);
        self.payload_len += buffer.len() as u64;
        Ok(())
    }

    fn decrypt_in_place(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.advance(Phase::ProcessingPayload, "decrypt")?;
        self.engine.decrypt_in_place(buffer);
        self.payload_len += buffer.len() as u64;
        Ok(())
    }

    fn compute_tag(&mut self) -> Result<[u8; TAG_SIZE]> {
        self.finalize("compute_tag")
    }

    fn verify_tag(&mut self, tag: &[u8]) -> Result<()> {
        Error::check_length(TAG_SIZE, tag.len())?;
        let expected = match (self.phase, self.tag) {
            (Phase::Finalized, Some(expected)) => expected,
            _ => self.finalize("verify_tag")?,
        };

        if bool::from(expected.as_slice().ct_eq(tag)) {
            Ok(())
        } else {
            log::debug!("{}: tag verification failed", E::ALGORITHM);
            Err(Error::TagMismatch)
        }
    }
}
