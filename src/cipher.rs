// Copyright 2022 Sebastian Ramacher
// SPDX-License-Identifier: MIT

use core::fmt;

#[cfg(feature = "acorn")]
use crate::AcornState;
#[cfg(feature = "ascon")]
use crate::AsconState;
use crate::{AuthenticatedCipher, Phase, Result, Session, TAG_SIZE};

/// The supported authenticated ciphers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// ACORN-128 (CAESAR final portfolio, v3).
    #[cfg(feature = "acorn")]
    Acorn128,
    /// ASCON-128 (v1.2).
    #[cfg(feature = "ascon")]
    Ascon128,
}

impl Algorithm {
    /// Human readable name of the algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "acorn")]
            Algorithm::Acorn128 => "ACORN-128",
            #[cfg(feature = "ascon")]
            Algorithm::Ascon128 => "ASCON-128",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A session of one of the supported algorithms, selected at construction.
#[derive(Debug)]
pub enum Cipher {
    /// ACORN-128 session.
    #[cfg(feature = "acorn")]
    Acorn128(Session<AcornState>),
    /// ASCON-128 session.
    #[cfg(feature = "ascon")]
    Ascon128(Session<AsconState>),
}

macro_rules! dispatch {
    ($cipher:expr, $session:ident => $body:expr) => {
        match $cipher {
            #[cfg(feature = "acorn")]
            Cipher::Acorn128($session) => $body,
            #[cfg(feature = "ascon")]
            Cipher::Ascon128($session) => $body,
        }
    };
}

impl Cipher {
    /// Creates a fresh session of `algorithm`.
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            #[cfg(feature = "acorn")]
            Algorithm::Acorn128 => Cipher::Acorn128(Session::new()),
            #[cfg(feature = "ascon")]
            Algorithm::Ascon128 => Cipher::Ascon128(Session::new()),
        }
    }
}

impl From<Algorithm> for Cipher {
    fn from(algorithm: Algorithm) -> Self {
        Self::new(algorithm)
    }
}

#[cfg(feature = "acorn")]
impl From<Session<AcornState>> for Cipher {
    fn from(session: Session<AcornState>) -> Self {
        Cipher::Acorn128(session)
    }
}

#[cfg(feature = "ascon")]
impl From<Session<AsconState>> for Cipher {
    fn from(session: Session<AsconState>) -> Self {
        Cipher::Ascon128(session)
    }
}

impl AuthenticatedCipher for Cipher {
    fn algorithm(&self) -> Algorithm {
        dispatch!(self, session => session.algorithm())
    }

    fn phase(&self) -> Phase {
        dispatch!(self, session => session.phase())
    }

    fn clear(&mut self) {
        dispatch!(self, session => session.clear())
    }

    fn set_key(&mut self, key: &[u8]) -> Result<()> {
        dispatch!(self, session => session.set_key(key))
    }

    fn set_nonce(&mut self, nonce: &[u8]) -> Result<()> {
        dispatch!(self, session => session.set_nonce(nonce))
    }

    fn add_associated_data(&mut self, data: &[u8]) -> Result<()> {
        dispatch!(self, session => session.add_associated_data(data))
    }

    fn encrypt_in_place(&mut self, buffer: &mut [u8]) -> Result<()> {
        dispatch!(self, session => session.encrypt_in_place(buffer))
    }

    fn decrypt_in_place(&mut self, buffer: &mut [u8]) -> Result<()> {
        dispatch!(self, session => session.decrypt_in_place(buffer))
    }

    fn compute_tag(&mut self) -> Result<[u8; TAG_SIZE]> {
        dispatch!(self, session => session.compute_tag())
    }

    fn verify_tag(&mut self, tag: &[u8]) -> Result<()> {
        dispatch!(self, session => session.verify_tag(tag))
    }
}

#[cfg(all(test, feature = "acorn", feature = "ascon"))]
mod tests {
    use super::*;

    #[test]
    fn new_selects_algorithm() {
        for algorithm in [Algorithm::Acorn128, Algorithm::Ascon128] {
            let cipher = Cipher::new(algorithm);
            assert_eq!(cipher.algorithm(), algorithm);
            assert_eq!(cipher.phase(), Phase::Fresh);
        }
    }

    #[test]
    fn names() {
        assert_eq!(Algorithm::Acorn128.name(), "ACORN-128");
        assert_eq!(Algorithm::Ascon128.name(), "ASCON-128");
    }
}
