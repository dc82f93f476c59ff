// Copyright 2022 Sebastian Ramacher
// SPDX-License-Identifier: MIT

//! Lightweight authenticated encryption with ACORN-128 and ASCON-128.
//!
//! Both ciphers take a 128-bit key and a 128-bit nonce and produce a 128-bit tag. They are
//! exposed in two ways:
//!
//! * as streaming sessions ([`Session`], [`Cipher`]) that follow the
//!   [`AuthenticatedCipher`] contract: set key and nonce, absorb associated data, process the
//!   payload in chunks of any size, then compute or verify the tag;
//! * as one-shot [`aead`] ciphers ([`Acorn128`], [`Ascon128`]).
//!
//! ```
//! use lw_aead::{Algorithm, AuthenticatedCipher, Cipher};
//!
//! let key = [0x11u8; 16];
//! let nonce = [0x22u8; 16];
//!
//! let mut cipher = Cipher::new(Algorithm::Ascon128);
//! cipher.set_key(&key)?;
//! cipher.set_nonce(&nonce)?;
//! cipher.add_associated_data(b"header")?;
//! let mut buffer = *b"secret";
//! cipher.encrypt_in_place(&mut buffer)?;
//! let tag = cipher.compute_tag()?;
//!
//! cipher.clear();
//! cipher.set_key(&key)?;
//! cipher.set_nonce(&nonce)?;
//! cipher.add_associated_data(b"header")?;
//! cipher.decrypt_in_place(&mut buffer)?;
//! cipher.verify_tag(&tag)?;
//! assert_eq!(&buffer, b"secret");
//! # Ok::<(), lw_aead::Error>(())
//! ```

#![no_std]
#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

#[cfg(not(any(feature = "acorn", feature = "ascon")))]
compile_error!("at least one of the `acorn` or `ascon` features must be enabled");

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub use aead::{self, AeadCore, AeadInPlace, Key, KeyInit, Nonce, Tag};

#[cfg(feature = "acorn")]
mod acorn_impl;
#[cfg(feature = "ascon")]
mod ascon_impl;
mod cipher;
mod error;
mod session;

#[cfg(feature = "acorn")]
pub use acorn_impl::{Acorn128, AcornState};
#[cfg(feature = "ascon")]
pub use ascon_impl::{Ascon128, AsconState};
pub use cipher::{Algorithm, Cipher};
pub use error::{Error, Result};
pub use session::{AuthenticatedCipher, Phase, Session};

/// Key size in bytes.
pub const KEY_SIZE: usize = 16;
/// Nonce size in bytes.
pub const NONCE_SIZE: usize = 16;
/// Tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Streaming session for ACORN-128.
#[cfg(feature = "acorn")]
pub type Acorn128Session = Session<AcornState>;
/// Streaming session for ASCON-128.
#[cfg(feature = "ascon")]
pub type Ascon128Session = Session<AsconState>;

/// Internal state of one of the authenticated ciphers.
///
/// An engine only transforms its own state; the order of calls is enforced by [`Session`].
/// Every engine is driven as follows: [`initialize`](Engine::initialize), any number of
/// [`absorb_associated_data`](Engine::absorb_associated_data) calls,
/// [`finish_associated_data`](Engine::finish_associated_data) exactly once, any number of
/// payload calls, and [`finalize`](Engine::finalize) exactly once.
pub trait Engine: Default {
    /// The algorithm implemented by this engine.
    const ALGORITHM: Algorithm;

    /// Loads key and nonce and runs the initialization rounds.
    fn initialize(&mut self, key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE]);

    /// Absorbs associated data. Consecutive calls behave like one call on the concatenation.
    fn absorb_associated_data(&mut self, data: &[u8]);

    /// Closes the associated data and separates it from the payload.
    ///
    /// `associated_data_len` is the total number of associated data bytes absorbed.
    fn finish_associated_data(&mut self, associated_data_len: u64);

    /// Encrypts the buffer in place.
    fn encrypt_in_place(&mut self, buffer: &mut [u8]);

    /// Decrypts the buffer in place.
    fn decrypt_in_place(&mut self, buffer: &mut [u8]);

    /// Finalizes the state and returns the tag.
    fn finalize(&mut self) -> [u8; TAG_SIZE];

    /// One-shot encryption of `buffer` returning the tag.
    fn encrypt_impl(
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> Result<[u8; TAG_SIZE]> {
        let mut session = Session::<Self>::new();
        session.set_key(key)?;
        session.set_nonce(nonce)?;
        session.add_associated_data(associated_data)?;
        session.encrypt_in_place(buffer)?;
        session.compute_tag()
    }

    /// One-shot decryption of `buffer`.
    ///
    /// If the tag does not verify, the buffer is wiped before the error is returned.
    fn decrypt_impl(
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &[u8],
    ) -> Result<()> {
        let mut session = Session::<Self>::new();
        session.set_key(key)?;
        session.set_nonce(nonce)?;
        session.add_associated_data(associated_data)?;
        session.decrypt_in_place(buffer)?;
        session.verify_tag(tag).inspect_err(|_| buffer.fill(0))
    }
}
