//! Generic bit-serial CRC engine.
//!
//! A CRC is described by a [`CrcParams`] value: polynomial, initial register,
//! final XOR and three behaviour flags (reflect input bytes, reflect the
//! output register, byte-swap the output register).  The register width is
//! the width of the unsigned integer type the parameters are built over, so
//! `CrcParams<u16>` describes a 16-bit CRC.
//!
//! # Algorithm
//! MSB-first polynomial division, one bit at a time.  No lookup tables are
//! built; cost is `O(8 * len)` time and `O(1)` space.  This engine only ever
//! checksums 124-byte MacBinary headers, where a table would cost more to
//! build than it saves.
//!
//! # Output order
//! After the last byte: reflect (if asked), then XOR with `final_xor`, then
//! byte-swap (if asked).

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Shl, Shr};

// ── Register width ────────────────────────────────────────────────────────────

/// An unsigned integer usable as a CRC register.
///
/// Shifts by less than [`Register::BITS`] discard overflow bits, which is
/// exactly the fixed-width wraparound the division loop relies on.
pub trait Register:
    Copy
    + Eq
    + fmt::Debug
    + fmt::LowerHex
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
    /// Register width in bits.
    const BITS: u32;
    const ZERO: Self;
    const ONE:  Self;

    /// Zero-extend a byte into the low 8 bits of the register.
    fn from_byte(b: u8) -> Self;

    fn swap_bytes(self) -> Self;

    /// Mask selecting the most significant bit.
    #[inline]
    fn top_bit() -> Self {
        Self::ONE << (Self::BITS - 1)
    }
}

macro_rules! impl_register {
    ($($t:ty),*) => {$(
        impl Register for $t {
            const BITS: u32 = <$t>::BITS;
            const ZERO: Self = 0;
            const ONE:  Self = 1;

            #[inline]
            fn from_byte(b: u8) -> Self { b as $t }

            #[inline]
            fn swap_bytes(self) -> Self { <$t>::swap_bytes(self) }
        }
    )*};
}

impl_register!(u8, u16, u32, u64);

/// Reverse the bit order of `n`: bit 0 swaps with bit `W-1`, bit 1 with
/// bit `W-2`, and so on, for a register of width `W`.
pub fn bit_reverse<T: Register>(mut n: T) -> T {
    let mut out = T::ZERO;
    for i in (0..T::BITS).rev() {
        out = out | ((n & T::ONE) << i);
        n = n >> 1;
    }
    out
}

#[inline]
fn identity(b: u8) -> u8 { b }

// ── Parameters ────────────────────────────────────────────────────────────────

/// Full description of one CRC variant.  Built once as a named constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcParams<T: Register> {
    pub polynomial:       T,
    pub initial:          T,
    pub final_xor:        T,
    pub reflect_input:    bool,
    pub reflect_output:   bool,
    pub byte_swap_output: bool,
}

/// CRC-16/XMODEM.  Used for the MacBinary header checksum.
pub const XMODEM: CrcParams<u16> = CrcParams {
    polynomial:       0x1021,
    initial:          0x0000,
    final_xor:        0x0000,
    reflect_input:    false,
    reflect_output:   false,
    byte_swap_output: false,
};

/// CRC-16/KERMIT.
pub const KERMIT: CrcParams<u16> = CrcParams {
    polynomial:       0x1021,
    initial:          0x0000,
    final_xor:        0x0000,
    reflect_input:    true,
    reflect_output:   true,
    byte_swap_output: false,
};

/// CRC-16/IBM-SDLC, better known as X-25.
pub const CRC16_X25: CrcParams<u16> = CrcParams {
    polynomial:       0x1021,
    initial:          0xFFFF,
    final_xor:        0xFFFF,
    reflect_input:    true,
    reflect_output:   true,
    byte_swap_output: false,
};

/// CRC-8/SMBUS.
pub const CRC8_SMBUS: CrcParams<u8> = CrcParams {
    polynomial:       0x07,
    initial:          0x00,
    final_xor:        0x00,
    reflect_input:    false,
    reflect_output:   false,
    byte_swap_output: false,
};

/// CRC-32/ISO-HDLC (zlib, PNG, Ethernet).
pub const CRC32_ISO_HDLC: CrcParams<u32> = CrcParams {
    polynomial:       0x04C1_1DB7,
    initial:          0xFFFF_FFFF,
    final_xor:        0xFFFF_FFFF,
    reflect_input:    true,
    reflect_output:   true,
    byte_swap_output: false,
};

/// CRC-32/BZIP2.
pub const CRC32_BZIP2: CrcParams<u32> = CrcParams {
    polynomial:       0x04C1_1DB7,
    initial:          0xFFFF_FFFF,
    final_xor:        0xFFFF_FFFF,
    reflect_input:    false,
    reflect_output:   false,
    byte_swap_output: false,
};

impl<T: Register> CrcParams<T> {
    /// Start an incremental computation.
    pub fn digest(&self) -> Digest<T> {
        Digest::new(*self)
    }

    /// One-shot checksum of `data`.
    pub fn checksum(&self, data: &[u8]) -> T {
        compute(data, self)
    }
}

/// Checksum `data` under `params`.
pub fn compute<T: Register>(data: &[u8], params: &CrcParams<T>) -> T {
    let mut digest = params.digest();
    digest.update(data);
    digest.finalize()
}

// ── Incremental digest ────────────────────────────────────────────────────────

/// Running CRC state.  Feeding the input in pieces gives the same result as
/// one [`compute`] call over the concatenation.
#[derive(Clone)]
pub struct Digest<T: Register> {
    params:   CrcParams<T>,
    register: T,
    /// Chosen once from `reflect_input`; never re-decided per byte.
    prep:     fn(u8) -> u8,
}

impl<T: Register> Digest<T> {
    pub fn new(params: CrcParams<T>) -> Self {
        let prep: fn(u8) -> u8 = if params.reflect_input {
            bit_reverse::<u8>
        } else {
            identity
        };
        Self { params, register: params.initial, prep }
    }

    pub fn update(&mut self, data: &[u8]) {
        let top   = T::top_bit();
        let shift = T::BITS - 8;
        let poly  = self.params.polynomial;
        let mut crc = self.register;

        for &byte in data {
            crc = crc ^ (T::from_byte((self.prep)(byte)) << shift);
            for _ in 0..8 {
                crc = if crc & top != T::ZERO {
                    (crc << 1) ^ poly
                } else {
                    crc << 1
                };
            }
        }

        self.register = crc;
    }

    pub fn finalize(self) -> T {
        let mut crc = self.register;
        if self.params.reflect_output {
            crc = bit_reverse(crc);
        }
        crc = crc ^ self.params.final_xor;
        if self.params.byte_swap_output {
            crc = crc.swap_bytes();
        }
        crc
    }
}

impl<T: Register> fmt::Debug for Digest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digest")
            .field("params", &self.params)
            .field("register", &format_args!("{:#x}", self.register))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CHECK: &[u8] = b"123456789";

    #[test]
    fn bit_reverse_known_vectors() {
        assert_eq!(bit_reverse(0b1010_1010u8), 0b0101_0101u8);
        assert_eq!(
            bit_reverse(0b0110_1001_0101_1010_0111_0101_0110_0101u32),
            0b1010_0110_1010_1110_0101_1010_1001_0110u32,
        );
        assert_eq!(bit_reverse(0x0001u16), 0x8000);
        assert_eq!(bit_reverse(0u64), 0);
    }

    #[test]
    fn catalogue_check_values() {
        assert_eq!(XMODEM.checksum(CHECK),         0x31C3);
        assert_eq!(KERMIT.checksum(CHECK),         0x2189);
        assert_eq!(CRC16_X25.checksum(CHECK),      0x906E);
        assert_eq!(CRC8_SMBUS.checksum(CHECK),     0xF4);
        assert_eq!(CRC32_ISO_HDLC.checksum(CHECK), 0xCBF4_3926);
        assert_eq!(CRC32_BZIP2.checksum(CHECK),    0xFC89_1918);
    }

    #[test]
    fn empty_input_is_initial_after_output_stage() {
        assert_eq!(XMODEM.checksum(&[]), 0);
        assert_eq!(CRC32_ISO_HDLC.checksum(&[]), 0);
    }

    #[test]
    fn byte_swap_applies_last() {
        let swapped = CrcParams { byte_swap_output: true, ..XMODEM };
        assert_eq!(swapped.checksum(CHECK), 0xC331);

        let x25_swapped = CrcParams { byte_swap_output: true, ..CRC16_X25 };
        assert_eq!(x25_swapped.checksum(CHECK), 0x6E90);
    }

    #[test]
    fn matches_crc32fast() {
        let data: Vec<u8> = (0u8..=255).cycle().take(1000).collect();
        assert_eq!(CRC32_ISO_HDLC.checksum(&data), crc32fast::hash(&data));
    }

    #[test]
    fn digest_pieces_match_one_shot() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut d = CRC16_X25.digest();
        for piece in data.chunks(7) {
            d.update(piece);
        }
        assert_eq!(d.finalize(), compute(data, &CRC16_X25));
    }

    proptest! {
        #[test]
        fn bit_reverse_is_self_inverse(a: u8, b: u16, c: u32, d: u64) {
            prop_assert_eq!(bit_reverse(bit_reverse(a)), a);
            prop_assert_eq!(bit_reverse(bit_reverse(b)), b);
            prop_assert_eq!(bit_reverse(bit_reverse(c)), c);
            prop_assert_eq!(bit_reverse(bit_reverse(d)), d);
        }

        #[test]
        fn bit_reverse_agrees_with_core(a: u8, b: u16, c: u32, d: u64) {
            prop_assert_eq!(bit_reverse(a), a.reverse_bits());
            prop_assert_eq!(bit_reverse(b), b.reverse_bits());
            prop_assert_eq!(bit_reverse(c), c.reverse_bits());
            prop_assert_eq!(bit_reverse(d), d.reverse_bits());
        }

        #[test]
        fn checksum_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(XMODEM.checksum(&data), XMODEM.checksum(&data));
        }

        #[test]
        fn single_bit_flip_changes_checksum(
            data in proptest::collection::vec(any::<u8>(), 1..256),
            pos  in any::<proptest::sample::Index>(),
            bit  in 0u8..8,
        ) {
            let mut flipped = data.clone();
            flipped[pos.index(data.len())] ^= 1 << bit;
            prop_assert_ne!(XMODEM.checksum(&data), XMODEM.checksum(&flipped));
        }
    }
}
