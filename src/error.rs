// Copyright 2022 Sebastian Ramacher
// SPDX-License-Identifier: MIT

//! Error types reported by cipher sessions.

use crate::session::Phase;

/// Result type alias for session operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by [`AuthenticatedCipher`](crate::AuthenticatedCipher) operations.
///
/// All errors are local and deterministic. A session that reported an error can always be
/// recovered with [`clear`](crate::AuthenticatedCipher::clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A key, nonce, tag or output buffer did not have the required length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// The operation is not permitted in the current phase of the session.
    #[error("`{operation}` is not permitted in phase {phase}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Phase the session was in when the operation was rejected.
        phase: Phase,
    },

    /// Authentication tag verification failed.
    #[error("authentication tag mismatch")]
    TagMismatch,
}

impl Error {
    pub(crate) fn check_length(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::InvalidLength { expected, actual })
        }
    }
}

impl From<Error> for aead::Error {
    fn from(_: Error) -> Self {
        aead::Error
    }
}
