//! Clock-controlled combiner used as the encryption oracle.
//!
//! R1's output decides, per plaintext bit, whether one extra bit of R2's
//! output is skipped before the next keystream bit is taken. The decimation
//! cursor therefore advances by one per plaintext bit plus one per set clock
//! bit, and reaches at most `2m - 1`. Callers supply a decimated sequence of
//! at least `2m` bits.

use crate::bits::BitSeq;

/// Keystream of length `m`: `source` decimated under control of `clock`.
pub fn keystream<'a>(
    clock: &'a BitSeq,
    source: &'a BitSeq,
    m: usize,
) -> impl Iterator<Item = bool> + 'a {
    let mut j = 0usize;
    (0..m).map(move |i| {
        if clock.get(i) {
            j += 1;
        }
        let bit = source.get(j);
        j += 1;
        bit
    })
}

/// Encrypt the first `m` plaintext bits: `c_i = x_j XOR p_i`.
#[must_use]
pub fn encrypt(clock: &BitSeq, decimated: &BitSeq, plaintext: &BitSeq, m: usize) -> BitSeq {
    debug_assert!(decimated.len() >= 2 * m, "decimated sequence shorter than 2m");
    keystream(clock, decimated, m)
        .enumerate()
        .map(|(i, k)| k ^ plaintext.get(i))
        .collect()
}

/// Whether encrypting `plaintext` reproduces `target` exactly. Stops at the
/// first differing bit.
#[must_use]
pub fn reproduces(clock: &BitSeq, decimated: &BitSeq, plaintext: &BitSeq, target: &BitSeq) -> bool {
    keystream(clock, decimated, target.len())
        .enumerate()
        .all(|(i, k)| k ^ plaintext.get(i) == target.get(i))
}
