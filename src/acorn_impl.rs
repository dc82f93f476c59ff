// Copyright 2022 Sebastian Ramacher
// SPDX-License-Identifier: MIT

//! ACORN-128 keeps its 293-bit state in seven sub-registers, one per linear feedback shift
//! register plus the four topmost bits:
//!
//! | register | state bits | length |
//! |----------|------------|--------|
//! | 0        | 0..=60     | 61     |
//! | 1        | 61..=106   | 46     |
//! | 2        | 107..=153  | 47     |
//! | 3        | 154..=192  | 39     |
//! | 4        | 193..=229  | 37     |
//! | 5        | 230..=288  | 59     |
//! | 6        | 289..=292  | 4      |
//!
//! Bit 0 of each `u64` is the lowest state bit of the register. None of the taps read a bit that
//! an earlier step of the same batch has modified as long as at most 32 steps are batched, so
//! up to 32 steps are computed in parallel.

use aead::{
    KeySizeUser,
    consts::{U0, U16},
};

use crate::{
    AeadCore, AeadInPlace, Algorithm, Engine, KEY_SIZE, Key, KeyInit, NONCE_SIZE, Nonce, TAG_SIZE,
    Tag,
};

/// Lengths of the sub-registers in bits.
const LENGTHS: [u32; 7] = [61, 46, 47, 39, 37, 59, 4];

/// Control mask enabling a `ca`/`cb` term.
const ON: u64 = u64::MAX;
/// Control mask disabling a `ca`/`cb` term.
const OFF: u64 = 0;

/// Number of times the key is repeated after key, nonce and the first modified key block.
const INIT_KEY_REPEATS: usize = 11;
/// Number of blank 32-bit words run before the tag words.
const TAG_BLANK_WORDS: usize = 20;

#[inline(always)]
fn maj(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline(always)]
fn ch(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (!x & z)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Encrypt,
    Decrypt,
}

/// ACORN-128 engine.
#[derive(Clone, Default)]
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub struct AcornState {
    lfsr: [u64; 7],
}

impl AcornState {
    /// Runs `BITS` steps at once, consuming the low `BITS` bits of `input`.
    ///
    /// Returns the ciphertext bits when encrypting and the plaintext bits when decrypting.
    #[inline(always)]
    fn step<const BITS: u32>(&mut self, input: u64, ca: u64, cb: u64, direction: Direction) -> u64 {
        debug_assert!(BITS <= 32);

        let mask = (1u64 << BITS) - 1;
        let s = &mut self.lfsr;

        let s244 = s[5] >> 14;
        let s235 = s[5] >> 5;
        let s196 = s[4] >> 3;
        let s160 = s[3] >> 6;
        let s111 = s[2] >> 4;
        let s66 = s[1] >> 5;
        let s23 = s[0] >> 23;
        let s12 = s[0] >> 12;

        // linear feedback, top down so that every update reads the old value of the register
        // below
        let mut top = s[6] ^ ((s235 ^ s[5]) & mask);
        s[5] ^= (s196 ^ s[4]) & mask;
        s[4] ^= (s160 ^ s[3]) & mask;
        s[3] ^= (s111 ^ s[2]) & mask;
        s[2] ^= (s66 ^ s[1]) & mask;
        s[1] ^= (s23 ^ s[0]) & mask;

        // keystream
        let ks = (s12 ^ s[3] ^ maj(s235, s[1], s[4]) ^ ch(s[5], s111, s66)) & mask;
        let (m, output) = match direction {
            Direction::Encrypt => (input, input ^ ks),
            Direction::Decrypt => (input ^ ks, input ^ ks),
        };

        // nonlinear feedback
        let f = (s[0] ^ !s[2] ^ maj(s244, s23, s160) ^ (ca & s196) ^ (cb & ks) ^ m) & mask;
        top ^= f << 4;

        // shift
        for i in 0..5 {
            s[i] = (s[i] >> BITS) | ((s[i + 1] & mask) << (LENGTHS[i] - BITS));
        }
        s[5] = (s[5] >> BITS) | ((top & mask) << (LENGTHS[5] - BITS));
        s[6] = top >> BITS;

        output
    }

    #[inline]
    fn step_word(&mut self, word: u32, ca: u64, cb: u64) -> u32 {
        self.step::<32>(u64::from(word), ca, cb, Direction::Encrypt) as u32
    }

    fn absorb(&mut self, data: &[u8], ca: u64, cb: u64) {
        let mut words = data.chunks_exact(4);
        for word in &mut words {
            self.step_word(u32::from_le_bytes([word[0], word[1], word[2], word[3]]), ca, cb);
        }
        for byte in words.remainder() {
            self.step::<8>(u64::from(*byte), ca, cb, Direction::Encrypt);
        }
    }

    fn process(&mut self, buffer: &mut [u8], direction: Direction) {
        let mut words = buffer.chunks_exact_mut(4);
        for word in &mut words {
            let input = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            let output = self.step::<32>(u64::from(input), ON, OFF, direction) as u32;
            word.copy_from_slice(&output.to_le_bytes());
        }
        for byte in words.into_remainder() {
            *byte = self.step::<8>(u64::from(*byte), ON, OFF, direction) as u8;
        }
    }

    /// Absorbs a single `1` bit followed by 255 zero bits.
    fn pad(&mut self, cb: u64) {
        self.step_word(1, ON, cb);
        for _ in 0..3 {
            self.step_word(0, ON, cb);
        }
        for _ in 0..4 {
            self.step_word(0, OFF, cb);
        }
    }
}

impl Engine for AcornState {
    const ALGORITHM: Algorithm = Algorithm::Acorn128;

    fn initialize(&mut self, key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE]) {
        let words = |bytes: &[u8; 16]| -> [u32; 4] {
            core::array::from_fn(|i| {
                u32::from_le_bytes([
                    bytes[4 * i],
                    bytes[4 * i + 1],
                    bytes[4 * i + 2],
                    bytes[4 * i + 3],
                ])
            })
        };
        let k = words(key);
        let n = words(nonce);

        // 1792 steps: key, nonce, key with the first bit flipped, then the key repeated
        self.lfsr = [0; 7];
        for word in k.iter().chain(n.iter()) {
            self.step_word(*word, ON, ON);
        }
        self.step_word(k[0] ^ 1, ON, ON);
        for word in &k[1..] {
            self.step_word(*word, ON, ON);
        }
        for _ in 0..INIT_KEY_REPEATS {
            for word in &k {
                self.step_word(*word, ON, ON);
            }
        }
    }

    fn absorb_associated_data(&mut self, data: &[u8]) {
        self.absorb(data, ON, ON);
    }

    fn finish_associated_data(&mut self, _associated_data_len: u64) {
        self.pad(ON);
    }

    fn encrypt_in_place(&mut self, buffer: &mut [u8]) {
        self.process(buffer, Direction::Encrypt);
    }

    fn decrypt_in_place(&mut self, buffer: &mut [u8]) {
        self.process(buffer, Direction::Decrypt);
    }

    fn finalize(&mut self) -> [u8; TAG_SIZE] {
        self.pad(OFF);
        for _ in 0..TAG_BLANK_WORDS {
            self.step_word(0, ON, ON);
        }

        let mut tag = [0u8; TAG_SIZE];
        for chunk in tag.chunks_exact_mut(4) {
            chunk.copy_from_slice(&self.step_word(0, ON, ON).to_le_bytes());
        }
        tag
    }
}

/// ACORN-128
#[derive(Clone)]
#[cfg_attr(feature = "zeroize", derive(zeroize::ZeroizeOnDrop))]
pub struct Acorn128 {
    k: [u8; KEY_SIZE],
}

impl AeadCore for Acorn128 {
    type NonceSize = U16;
    type TagSize = U16;
    type CiphertextOverhead = U0;
}

impl KeySizeUser for Acorn128 {
    type KeySize = U16;
}

impl KeyInit for Acorn128 {
    fn new(key: &Key<Self>) -> Self {
        Self { k: (*key).into() }
    }
}

impl AeadInPlace for Acorn128 {
    fn encrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<Tag<Self>> {
        AcornState::encrypt_impl(&self.k, nonce, associated_data, buffer)
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
        AcornState::decrypt_impl(&self.k, nonce, associated_data, buffer, tag).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bit-serial ACORN-128 state, indexed by state bit.
    struct Reference([u8; 293]);

    impl Reference {
        fn from_state(state: &AcornState) -> Self {
            let mut bits = [0u8; 293];
            let mut pos = 0;
            for (register, len) in state.lfsr.iter().zip(LENGTHS) {
                for bit in 0..len {
                    bits[pos] = ((register >> bit) & 1) as u8;
                    pos += 1;
                }
            }
            Self(bits)
        }

        fn step(&mut self, m: u8, ca: u8, cb: u8) -> u8 {
            let s = &mut self.0;
            s[289] ^= s[235] ^ s[230];
            s[230] ^= s[196] ^ s[193];
            s[193] ^= s[160] ^ s[154];
            s[154] ^= s[111] ^ s[107];
            s[107] ^= s[66] ^ s[61];
            s[61] ^= s[23] ^ s[0];
            let ks = s[12]
                ^ s[154]
                ^ ((s[235] & s[61]) ^ (s[235] & s[193]) ^ (s[61] & s[193]))
                ^ ((s[230] & s[111]) ^ ((s[230] ^ 1) & s[66]));
            let f = s[0]
                ^ (s[107] ^ 1)
                ^ ((s[244] & s[23]) ^ (s[244] & s[160]) ^ (s[23] & s[160]))
                ^ (ca & s[196])
                ^ (cb & ks);
            s.copy_within(1.., 0);
            s[292] = f ^ m;
            ks
        }
    }

    fn pseudo_random_state() -> AcornState {
        let mut state = AcornState::default();
        state.initialize(&[0x3c; KEY_SIZE], &[0xc3; NONCE_SIZE]);
        state
    }

    #[test]
    fn word_steps_match_bit_serial_reference() {
        let mut state = pseudo_random_state();
        let mut reference = Reference::from_state(&state);

        for (input, ca, cb) in [
            (0xdead_beef_u32, ON, ON),
            (0x0123_4567, ON, OFF),
            (0x89ab_cdef, OFF, ON),
            (0, OFF, OFF),
        ] {
            let output = state.step_word(input, ca, cb);

            let mut expected = 0u32;
            for bit in 0..32 {
                let m = ((input >> bit) & 1) as u8;
                let ks = reference.step(m, (ca & 1) as u8, (cb & 1) as u8);
                expected |= u32::from(m ^ ks) << bit;
            }
            assert_eq!(output, expected);
            assert_eq!(Reference::from_state(&state).0, reference.0);
        }
    }

    #[test]
    fn byte_steps_match_word_steps() {
        let mut words = pseudo_random_state();
        let mut bytes = words.clone();

        let mut buffer = *b"0123456789abcdef";
        let mut expected = buffer;
        words.process(&mut expected, Direction::Encrypt);
        for byte in buffer.iter_mut() {
            *byte = bytes.step::<8>(u64::from(*byte), ON, OFF, Direction::Encrypt) as u8;
        }

        assert_eq!(buffer, expected);
        assert_eq!(words.lfsr, bytes.lfsr);
    }

    #[test]
    fn registers_stay_within_bounds() {
        let mut state = pseudo_random_state();
        let mut buffer = [0xffu8; 37];
        state.encrypt_in_place(&mut buffer);
        for (register, len) in state.lfsr.iter().zip(LENGTHS) {
            assert_eq!(register >> len, 0);
        }
    }

    #[test]
    fn all_zero_vector() {
        let mut state = AcornState::default();
        state.initialize(&[0; KEY_SIZE], &[0; NONCE_SIZE]);
        state.finish_associated_data(0);
        assert_eq!(
            state.finalize(),
            [
                0x83, 0x5e, 0x53, 0x17, 0x89, 0x6e, 0x86, 0xb2, 0x44, 0x71, 0x43, 0xc7, 0x4f,
                0x6f, 0xfc, 0x1e
            ]
        );
    }
}
