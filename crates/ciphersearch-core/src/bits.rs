//! Fixed-width bit vectors addressed LSB-first.
//!
//! A [`BitSeq`] stores `len` bits in little-endian `u64` words. Bit 0 is the
//! first emitted bit of a register (or the first character of a pattern), so a
//! sequence read in transmission order walks indices `0..len`.
//!
//! Invariant: every bit at a position `>= len` is zero. All mutating
//! operations re-establish it, which lets equality, hashing and radix
//! rendering work on the raw words.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAndAssign, BitOrAssign, BitXorAssign};

use crate::error::ParseBitsError;

const WORD_BITS: usize = 64;

/// Digit alphabet for radix 37..=62 (digits, upper case, lower case).
const DIGITS_WIDE: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
/// Digit alphabet for radix 2..=36.
const DIGITS_NARROW: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[inline]
const fn word_count(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

/// Fixed-width bit vector (LSB-first).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitSeq {
    words: Vec<u64>,
    len: usize,
}

impl BitSeq {
    /// All-zero vector of `len` bits.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; word_count(len)],
            len,
        }
    }

    /// All-ones vector of `len` bits (the mask `2^len - 1`).
    #[must_use]
    pub fn ones(len: usize) -> Self {
        let mut out = Self {
            words: vec![u64::MAX; word_count(len)],
            len,
        };
        out.trim();
        out
    }

    /// Vector of `len` bits holding `value` truncated modulo `2^len`.
    #[must_use]
    pub fn from_u64(value: u64, len: usize) -> Self {
        let mut out = Self::zeros(len);
        if let Some(w) = out.words.first_mut() {
            *w = value;
        }
        out.trim();
        out
    }

    /// Width in bits.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector has zero width.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read bit `i`; positions outside the window read as `false`.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    /// Set bit `i`.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    pub fn set(&mut self, i: usize) {
        assert!(i < self.len, "bit index {i} outside width {}", self.len);
        self.words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
    }

    /// Write `bit` at position `i`.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    pub fn assign(&mut self, i: usize, bit: bool) {
        assert!(i < self.len, "bit index {i} outside width {}", self.len);
        let mask = 1u64 << (i % WORD_BITS);
        if bit {
            self.words[i / WORD_BITS] |= mask;
        } else {
            self.words[i / WORD_BITS] &= !mask;
        }
    }

    /// Zero every bit, keeping the width.
    #[inline]
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Windowed left shift by one: bit `i` takes bit `i - 1`, bit `len - 1`
    /// falls off the window and bit 0 becomes zero.
    pub fn shl1(&mut self) {
        let mut carry = 0u64;
        for w in &mut self.words {
            let next = *w >> (WORD_BITS - 1);
            *w = (*w << 1) | carry;
            carry = next;
        }
        self.trim();
    }

    /// Bitwise complement within the window (`v XOR (2^len - 1)`).
    pub fn invert(&mut self) {
        for w in &mut self.words {
            *w = !*w;
        }
        self.trim();
    }

    /// Overwrite `self` with `other`, reusing the allocation.
    #[inline]
    pub fn copy_from(&mut self, other: &Self) {
        self.words.clone_from(&other.words);
        self.len = other.len;
    }

    /// Population count.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether no bit is set.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Parity (XOR-sum) of `self AND other`, computed without allocating.
    #[must_use]
    pub fn and_parity(&self, other: &Self) -> bool {
        let ones: u32 = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a & b).count_ones())
            .sum();
        ones & 1 == 1
    }

    /// Numeric value if it fits in a `u64`.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        match self.words.split_first() {
            None => Some(0),
            Some((low, high)) if high.iter().all(|&w| w == 0) => Some(*low),
            Some(_) => None,
        }
    }

    /// Iterate the bits in transmission order (bit 0 first).
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Render the numeric value in `radix` (2..=62), most significant digit
    /// first and without padding. Radix up to 36 uses lower-case letters;
    /// above that digits run `0-9A-Za-z`.
    ///
    /// # Panics
    /// Panics if `radix` is outside `2..=62`.
    #[must_use]
    pub fn to_str_radix(&self, radix: u32) -> String {
        assert!((2..=62).contains(&radix), "radix {radix} outside 2..=62");
        let alphabet: &[u8] = if radix <= 36 {
            DIGITS_NARROW
        } else {
            DIGITS_WIDE
        };
        let base = u128::from(radix);

        let mut work = self.words.clone();
        let mut digits = Vec::new();
        while work.iter().any(|&w| w != 0) {
            let mut rem = 0u128;
            for w in work.iter_mut().rev() {
                let cur = (rem << WORD_BITS) | u128::from(*w);
                // cur < base * 2^64, so the quotient fits a word.
                *w = (cur / base) as u64;
                rem = cur % base;
            }
            digits.push(alphabet[rem as usize]);
        }
        if digits.is_empty() {
            digits.push(b'0');
        }
        digits.iter().rev().map(|&d| char::from(d)).collect()
    }

    /// Bits in transmission order as a `0`/`1` string (bit 0 first).
    #[must_use]
    pub fn to_transmission_string(&self) -> String {
        self.iter().map(|b| if b { '1' } else { '0' }).collect()
    }

    /// Parse a `0`/`1` string in transmission order (first character is bit 0).
    pub fn parse_transmission(s: &str) -> Result<Self, ParseBitsError> {
        let mut bits = Vec::with_capacity(s.len());
        for (pos, ch) in s.chars().enumerate() {
            match ch {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return Err(ParseBitsError::InvalidChar { ch, pos }),
            }
        }
        Ok(bits.into_iter().collect())
    }

    fn trim(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

impl FromIterator<bool> for BitSeq {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let bits: Vec<bool> = iter.into_iter().collect();
        let mut out = Self::zeros(bits.len());
        for (i, bit) in bits.into_iter().enumerate() {
            if bit {
                out.set(i);
            }
        }
        out
    }
}

impl BitAndAssign<&BitSeq> for BitSeq {
    fn bitand_assign(&mut self, rhs: &BitSeq) {
        debug_assert_eq!(self.len, rhs.len, "bit vector width mismatch");
        for (a, b) in self.words.iter_mut().zip(&rhs.words) {
            *a &= *b;
        }
    }
}

impl BitOrAssign<&BitSeq> for BitSeq {
    fn bitor_assign(&mut self, rhs: &BitSeq) {
        debug_assert_eq!(self.len, rhs.len, "bit vector width mismatch");
        for (a, b) in self.words.iter_mut().zip(&rhs.words) {
            *a |= *b;
        }
        self.trim();
    }
}

impl BitXorAssign<&BitSeq> for BitSeq {
    fn bitxor_assign(&mut self, rhs: &BitSeq) {
        debug_assert_eq!(self.len, rhs.len, "bit vector width mismatch");
        for (a, b) in self.words.iter_mut().zip(&rhs.words) {
            *a ^= *b;
        }
        self.trim();
    }
}

/// Zero-padded binary, most significant bit first.
impl fmt::Display for BitSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = (0..self.len)
            .rev()
            .map(|i| if self.get(i) { '1' } else { '0' })
            .collect();
        f.pad(&s)
    }
}

/// Textual encoding used for sequences in result files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Radix {
    /// Zero-padded base 2, most significant bit first.
    Binary,
    /// Base 10.
    #[default]
    Decimal,
    /// Base 62 (`0-9A-Za-z`).
    Base62,
}

impl Radix {
    /// Numeric base.
    #[must_use]
    pub const fn base(self) -> u32 {
        match self {
            Self::Binary => 2,
            Self::Decimal => 10,
            Self::Base62 => 62,
        }
    }

    /// Render `bits` in this encoding.
    #[must_use]
    pub fn render(self, bits: &BitSeq) -> String {
        match self {
            Self::Binary => bits.to_string(),
            Self::Decimal | Self::Base62 => bits.to_str_radix(self.base()),
        }
    }
}
