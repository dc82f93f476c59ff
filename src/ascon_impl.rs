// Copyright 2022 Sebastian Ramacher
// SPDX-License-Identifier: MIT

//! ASCON-128 works on the 64-bit rate word `state[0]`, loaded big-endian. `idx` is the position
//! of the next byte within that word; a full word triggers the 6-round permutation. Associated
//! data is padded only if some was absorbed, the payload is always padded.

use aead::{
    KeySizeUser,
    consts::{U0, U6, U12, U16},
    generic_array::typenum::Unsigned,
};
use ascon_core::State;

use crate::{
    AeadCore, AeadInPlace, Algorithm, Engine, KEY_SIZE, Key, KeyInit, NONCE_SIZE, Nonce, TAG_SIZE,
    Tag,
};

const ASCON_K: usize = 128;
const ASCON_RATE: usize = 64;
const ASCON_A: usize = 12;
const ASCON_B: usize = 6;
const ASCON_IV: u64 = u64::from_be_bytes([
    ASCON_K as u8,
    ASCON_RATE as u8,
    ASCON_A as u8,
    ASCON_B as u8,
    0,
    0,
    0,
    0,
]);

/// Rate in bytes.
const RATE: usize = ASCON_RATE / 8;

/// Padding word for a block holding `len` bytes.
#[inline]
const fn pad(len: usize) -> u64 {
    0x80 << (56 - 8 * len)
}

/// Loads up to 8 bytes into a big-endian word, zero-filling the missing bytes.
#[inline]
fn load_bytes(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= RATE);

    let mut tmp = [0u8; RATE];
    tmp[..bytes.len()].copy_from_slice(bytes);
    u64::from_be_bytes(tmp)
}

/// Stores the leading `bytes.len()` bytes of a big-endian word.
#[inline]
fn store_bytes(word: u64, bytes: &mut [u8]) {
    let len = bytes.len();
    bytes.copy_from_slice(&word.to_be_bytes()[..len]);
}

/// ASCON-128 engine: the 320-bit permutation state, the cached key, and the position of the next
/// byte within the current 64-bit rate block.
#[derive(Clone, Default)]
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub struct AsconState {
    state: State,
    key: [u64; 2],
    idx: usize,
}

impl AsconState {
    #[inline]
    fn shift(&self) -> usize {
        (RATE - 1 - self.idx) * 8
    }

    fn permute_n<R: Unsigned>(&mut self) {
        if R::USIZE == 12 {
            self.state.permute_12();
        } else if R::USIZE == 6 {
            self.state.permute_6();
        } else {
            self.state.permute_n(R::USIZE);
        }
        self.idx = 0;
    }

    fn advance(&mut self) {
        self.idx += 1;
        if self.idx == RATE {
            self.permute_n::<U6>();
        }
    }

    fn absorb_byte(&mut self, byte: u8) {
        self.state[0] ^= u64::from(byte) << self.shift();
        self.advance();
    }

    fn encrypt_byte(&mut self, byte: u8) -> u8 {
        let shift = self.shift();
        self.state[0] ^= u64::from(byte) << shift;
        let ret = (self.state[0] >> shift) as u8;
        self.advance();
        ret
    }

    fn decrypt_byte(&mut self, byte: u8) -> u8 {
        let shift = self.shift();
        let ret = (self.state[0] >> shift) as u8 ^ byte;
        self.state[0] = (self.state[0] & !(0xff << shift)) | (u64::from(byte) << shift);
        self.advance();
        ret
    }

    /// Number of bytes missing to complete the current block, limited to `len`.
    fn head_len(&self, len: usize) -> usize {
        ((RATE - self.idx) % RATE).min(len)
    }

    fn absorb_bytes(&mut self, bytes: &[u8]) {
        let (head, tail) = bytes.split_at(self.head_len(bytes.len()));

        // process until full block reached
        for byte in head {
            self.absorb_byte(*byte);
        }

        // process full blocks
        let mut blocks = tail.chunks_exact(RATE);
        for block in &mut blocks {
            self.state[0] ^= load_bytes(block);
            self.permute_n::<U6>();
        }

        // process remaining bytes
        let remainder = blocks.remainder();
        if !remainder.is_empty() {
            self.state[0] ^= load_bytes(remainder);
            self.idx = remainder.len();
        }
    }

    fn separate_domains(&mut self) {
        self.state[4] ^= 0x1;
    }

    fn pad_block(&mut self) {
        self.state[0] ^= pad(self.idx);
    }
}

impl Engine for AsconState {
    const ALGORITHM: Algorithm = Algorithm::Ascon128;

    fn initialize(&mut self, key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE]) {
        let k0 = load_bytes(&key[..8]);
        let k1 = load_bytes(&key[8..]);
        self.key = [k0, k1];
        self.state = State::new(
            ASCON_IV,
            k0,
            k1,
            load_bytes(&nonce[..8]),
            load_bytes(&nonce[8..]),
        );
        self.permute_n::<U12>();
        self.state[3] ^= k0;
        self.state[4] ^= k1;
    }

    fn absorb_associated_data(&mut self, data: &[u8]) {
        self.absorb_bytes(data);
    }

    fn finish_associated_data(&mut self, associated_data_len: u64) {
        // empty associated data is not padded, not even after an explicit empty call; the C++
        // CryptoLW library pads in that case
        if associated_data_len != 0 {
            self.pad_block();
            self.permute_n::<U6>();
        }
        self.separate_domains();
    }

    fn encrypt_in_place(&mut self, buffer: &mut [u8]) {
        let (head, tail) = buffer.split_at_mut(self.head_len(buffer.len()));
        for byte in head {
            *byte = self.encrypt_byte(*byte);
        }

        let mut blocks = tail.chunks_exact_mut(RATE);
        for block in &mut blocks {
            self.state[0] ^= load_bytes(block);
            store_bytes(self.state[0], block);
            self.permute_n::<U6>();
        }

        let remainder = blocks.into_remainder();
        if !remainder.is_empty() {
            self.state[0] ^= load_bytes(remainder);
            store_bytes(self.state[0], remainder);
            self.idx = remainder.len();
        }
    }

    fn decrypt_in_place(&mut self, buffer: &mut [u8]) {
        let (head, tail) = buffer.split_at_mut(self.head_len(buffer.len()));
        for byte in head {
            *byte = self.decrypt_byte(*byte);
        }

        let mut blocks = tail.chunks_exact_mut(RATE);
        for block in &mut blocks {
            let c = load_bytes(block);
            store_bytes(self.state[0] ^ c, block);
            self.state[0] = c;
            self.permute_n::<U6>();
        }

        let remainder = blocks.into_remainder();
        if !remainder.is_empty() {
            let len = remainder.len();
            let c = load_bytes(remainder);
            store_bytes(self.state[0] ^ c, remainder);
            self.state[0] = (self.state[0] & (u64::MAX >> (8 * len))) | c;
            self.idx = len;
        }
    }

    fn finalize(&mut self) -> [u8; TAG_SIZE] {
        self.pad_block();
        self.state[1] ^= self.key[0];
        self.state[2] ^= self.key[1];
        self.permute_n::<U12>();

        let mut tag = [0u8; TAG_SIZE];
        tag[..8].copy_from_slice(&u64::to_be_bytes(self.state[3] ^ self.key[0]));
        tag[8..].copy_from_slice(&u64::to_be_bytes(self.state[4] ^ self.key[1]));
        tag
    }
}

/// ASCON-128
#[derive(Clone)]
#[cfg_attr(feature = "zeroize", derive(zeroize::ZeroizeOnDrop))]
pub struct Ascon128 {
    k: [u8; KEY_SIZE],
}

impl AeadCore for Ascon128 {
    type NonceSize = U16;
    type TagSize = U16;
    type CiphertextOverhead = U0;
}

impl KeySizeUser for Ascon128 {
    type KeySize = U16;
}

impl KeyInit for Ascon128 {
    fn new(key: &Key<Self>) -> Self {
        Self { k: (*key).into() }
    }
}

impl AeadInPlace for Ascon128 {
    fn encrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<Tag<Self>> {
        AsconState::encrypt_impl(&self.k, nonce, associated_data, buffer)
            .map(|tag| tag.into())
            .map_err(Into::into)
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &Tag<Self>,
    ) -> aead::Result<()> {
        AsconState::decrypt_impl(&self.k, nonce, associated_data, buffer, tag).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert_eq!(u64::to_be_bytes(ASCON_IV), [0x80, 0x40, 0x0c, 0x06, 0, 0, 0, 0]);
        assert_eq!(pad(0), 0x8000_0000_0000_0000);
        assert_eq!(pad(7), 0x80);
    }

    #[test]
    fn permutation() {
        let mut x = AsconState::default();
        x.idx = 3;
        x.permute_n::<U12>();
        assert_eq!(x.idx, 0);
        let words: &[u64] = x.state.as_ref();
        assert_eq!(
            words,
            &[
                0x78ea7ae5cfebb108,
                0x9b9bfb8513b560f7,
                0x6937f83e03d11a50,
                0x3fe53f36f2c1178c,
                0x045d648e4def12c9,
            ][..]
        );

        let mut x = AsconState::default();
        x.permute_n::<U6>();
        let words: &[u64] = x.state.as_ref();
        assert_eq!(
            words,
            &[
                0x160c84f20faad4f1,
                0x21495b1b0ae33eef,
                0xe0377d04e23a914b,
                0x2b23481598ffa8ea,
                0x649af379ba83cd30,
            ][..]
        );
    }

    #[test]
    fn initial_state() {
        let key: [u8; KEY_SIZE] = core::array::from_fn(|i| i as u8);
        let mut state = AsconState::default();
        state.initialize(&key, &key);

        let mut expected = State::new(
            ASCON_IV,
            0x0001020304050607,
            0x08090a0b0c0d0e0f,
            0x0001020304050607,
            0x08090a0b0c0d0e0f,
        );
        expected.permute_12();
        expected[3] ^= 0x0001020304050607;
        expected[4] ^= 0x08090a0b0c0d0e0f;
        assert_eq!(state.state.as_bytes(), expected.as_bytes());
        assert_eq!(state.key, [0x0001020304050607, 0x08090a0b0c0d0e0f]);
    }

    #[test]
    fn bytewise_matches_blockwise() {
        let key = [0x5au8; KEY_SIZE];
        let nonce = [0xa5u8; NONCE_SIZE];
        let associated_data = [0x42u8; 19];
        let plaintext: [u8; 21] = core::array::from_fn(|i| i as u8);

        let mut blockwise = AsconState::default();
        blockwise.initialize(&key, &nonce);
        blockwise.absorb_associated_data(&associated_data);
        blockwise.finish_associated_data(associated_data.len() as u64);
        let mut expected = plaintext;
        blockwise.encrypt_in_place(&mut expected);
        let expected_tag = blockwise.finalize();

        let mut bytewise = AsconState::default();
        bytewise.initialize(&key, &nonce);
        for byte in associated_data.chunks(1) {
            bytewise.absorb_associated_data(byte);
        }
        bytewise.finish_associated_data(associated_data.len() as u64);
        let mut ciphertext = plaintext;
        for byte in ciphertext.chunks_mut(1) {
            bytewise.encrypt_in_place(byte);
        }
        assert_eq!(ciphertext, expected);
        assert_eq!(bytewise.finalize(), expected_tag);

        let mut decryptor = AsconState::default();
        decryptor.initialize(&key, &nonce);
        decryptor.absorb_associated_data(&associated_data);
        decryptor.finish_associated_data(associated_data.len() as u64);
        let (first, second) = ciphertext.split_at_mut(3);
        decryptor.decrypt_in_place(first);
        decryptor.decrypt_in_place(second);
        assert_eq!(ciphertext, plaintext);
        assert_eq!(decryptor.finalize(), expected_tag);
    }
}
