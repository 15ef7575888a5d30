//! # Payload Cipher
//!
//! iReal Pro stores the music of a song scrambled. A scrambled payload starts
//! with the [`MAGIC`] marker; after it comes the notation with two
//! transforms applied:
//!
//! 1. **Substitution** of common runs: three spaces become `XyQ`, `| x`
//!    becomes `Kcl` and ` |` becomes `LZ`.
//! 2. **Block permutation**: each full 50-character block has three nested
//!    ranges reversed, each reversal leaving its middle pair in place. The
//!    net effect swaps offsets `p` and `49 - p` for `p` in `0..5` and
//!    `10..24`, an involution, so the same permutation scrambles and
//!    unscrambles.
//!
//! Unscrambling undoes the permutation first, then the substitution.
//! A trailing block shorter than 50 characters is stored as-is.

use tracing::trace;

/// Prefix identifying a scrambled payload.
pub const MAGIC: &str = "1r34LbKcu7";

const BLOCK: usize = 50;

/// Whether the payload carries the scrambling marker.
pub fn is_scrambled(payload: &str) -> bool {
    payload.starts_with(MAGIC)
}

/// Recover the plaintext notation from a scrambled payload.
///
/// Payloads without the marker are returned unchanged. Never fails:
/// truncated or corrupt data decodes as far as it goes.
///
/// # Example
/// ```
/// use ireal::cipher::unscramble;
///
/// assert_eq!(unscramble("[T44C   |G   Z"), "[T44C   |G   Z");
/// assert_eq!(unscramble("1r34LbKcu7[T44CXyQ|GXyQZ"), "[T44C   |G   Z");
/// ```
pub fn unscramble(payload: &str) -> String {
    let Some(body) = payload.strip_prefix(MAGIC) else {
        return payload.to_string();
    };
    let mut chars: Vec<char> = body.chars().collect();
    let blocks = permute_blocks(&mut chars);
    trace!(len = chars.len(), blocks, "unscrambling payload");

    let mut i = 0;
    while i < chars.len() {
        let rest = &chars[i..];
        if rest.starts_with(&['X', 'y', 'Q']) {
            chars[i..i + 3].copy_from_slice(&[' ', ' ', ' ']);
            i += 3;
        } else if rest.starts_with(&['K', 'c', 'l']) {
            chars[i..i + 3].copy_from_slice(&['|', ' ', 'x']);
            i += 3;
        } else if rest.starts_with(&['L', 'Z']) {
            chars[i..i + 2].copy_from_slice(&[' ', '|']);
            i += 2;
        } else {
            i += 1;
        }
    }

    chars.into_iter().collect()
}

/// Scramble plaintext notation the way iReal Pro stores it.
///
/// Inverse of [`unscramble`] for any plaintext that does not itself contain
/// the substitution tokens `XyQ`, `Kcl` or `LZ`.
pub fn scramble(plaintext: &str) -> String {
    let mut chars: Vec<char> = Vec::with_capacity(plaintext.len());
    let source: Vec<char> = plaintext.chars().collect();

    let mut i = 0;
    while i < source.len() {
        let rest = &source[i..];
        if rest.starts_with(&[' ', ' ', ' ']) {
            chars.extend(['X', 'y', 'Q']);
            i += 3;
        } else if rest.starts_with(&['|', ' ', 'x']) {
            chars.extend(['K', 'c', 'l']);
            i += 3;
        } else if rest.starts_with(&[' ', '|']) {
            chars.extend(['L', 'Z']);
            i += 2;
        } else {
            chars.push(source[i]);
            i += 1;
        }
    }

    permute_blocks(&mut chars);

    let mut out = String::with_capacity(MAGIC.len() + chars.len());
    out.push_str(MAGIC);
    out.extend(chars);
    out
}

/// Apply the three nested reversals to every full block. Returns the block count.
fn permute_blocks(chars: &mut [char]) -> usize {
    let mut blocks = 0;
    let mut i = 0;
    while i + BLOCK <= chars.len() {
        let block = &mut chars[i..i + BLOCK];
        reverse_span(block, 10, 29);
        reverse_span(block, 5, 39);
        reverse_span(block, 0, 49);
        blocks += 1;
        i += BLOCK;
    }
    blocks
}

/// Swap `start + k` with `start + last - k` for `k < last / 2`.
///
/// With an odd `last` the two middle characters stay where they are.
fn reverse_span(block: &mut [char], start: usize, last: usize) {
    for k in 0..last / 2 {
        block.swap(start + k, start + last - k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmarked_payload_is_unchanged() {
        assert_eq!(unscramble(""), "");
        assert_eq!(unscramble("1r34"), "1r34");
        assert_eq!(unscramble("[T44XyQ|Z"), "[T44XyQ|Z");
    }

    #[test]
    fn test_bare_marker_decodes_to_empty() {
        assert_eq!(unscramble(MAGIC), "");
    }

    #[test]
    fn test_substitutions() {
        let decoded = unscramble("1r34LbKcu7AXyQBKclCLZD");
        assert_eq!(decoded, "A   B| xC |D");
    }

    #[test]
    fn test_substitution_does_not_overlap() {
        // "XyQyQ": the first match consumes "XyQ", leaving "yQ" untouched
        assert_eq!(unscramble("1r34LbKcu7XyQyQ"), "   yQ");
        // "LLZ": no match at L, then "LZ"
        assert_eq!(unscramble("1r34LbKcu7LLZ"), "L |");
    }

    #[test]
    fn test_full_block_is_permuted() {
        let body = "abcdefghijklmnopqrstuvwxyz012345678901234567890123";
        let payload = format!("{}{}", MAGIC, body);
        let decoded = unscramble(&payload);
        assert_eq!(decoded.chars().count(), 50);
        assert_ne!(decoded, body);

        // Reversing [10,39], [5,44], [0,49] in order sends position p to:
        let source: Vec<char> = body.chars().collect();
        let out: Vec<char> = decoded.chars().collect();
        // positions 0..5 of the output come from 49..45 of the input
        assert_eq!(out[0], source[49]);
        assert_eq!(out[4], source[45]);
        // positions 5..10 of the output come from 5..10 of the input (reversed twice)
        assert_eq!(out[5], source[5]);
        assert_eq!(out[9], source[9]);
        // the middle band is reversed three times
        assert_eq!(out[10], source[39]);
        assert_eq!(out[39], source[10]);
        // the middle pair is never swapped
        assert_eq!(out[24], source[24]);
        assert_eq!(out[25], source[25]);
    }

    #[test]
    fn test_marker_plus_fifty_garbage_chars() {
        let garbage = "qwertyuiopasdfghjklzxcvbnmQWERTYUIOPASDFGHJ0123456";
        assert_eq!(garbage.chars().count(), 50);
        let decoded = unscramble(&format!("{}{}", MAGIC, garbage));
        assert_eq!(decoded.chars().count(), 50);
        let mut sorted_in: Vec<char> = garbage.chars().collect();
        let mut sorted_out: Vec<char> = decoded.chars().collect();
        sorted_in.sort_unstable();
        sorted_out.sort_unstable();
        assert_eq!(sorted_in, sorted_out, "permutation keeps every character");
    }

    #[test]
    fn test_short_trailing_block_is_untouched() {
        let tail = "abcdefghijklmnopqrstuvwxyz0123456789ABCD";
        assert_eq!(tail.len(), 40);
        assert_eq!(unscramble(&format!("{}{}", MAGIC, tail)), tail);
    }

    #[test]
    fn test_permutation_is_an_involution() {
        let mut chars: Vec<char> = "The quick brown fox jumps over the lazy dog, twice! The quick brown fox jumps over the lazy dog."
            .chars()
            .collect();
        let original = chars.clone();
        permute_blocks(&mut chars);
        assert_ne!(chars, original);
        permute_blocks(&mut chars);
        assert_eq!(chars, original);
    }

    #[test]
    fn test_scramble_round_trip() {
        let samples = [
            "",
            "[T44F7   |Bb7   |F7   |C-7 F7 |Bb7   |Bo7   |F7   |A-7 D7 |G-7   |C7   |F7 D7 |G-7 C7 Z",
            "{*AT44D- D-/C |Bh7, Bb7(A7b9) |D-/A G-7 |D-/F sEh,A7,|Y|lD- D-/C |Bh7, Bb7(A7b9) |D-/A G-7 |N1D-/F sEh,A7} Y|N2sD-,G-,lD- ]",
            "[T44C^7   | x  | x  |G7   Z",
        ];
        for plain in samples {
            let scrambled = scramble(plain);
            assert!(is_scrambled(&scrambled));
            assert_eq!(unscramble(&scrambled), plain, "round trip of {:?}", plain);
        }
    }

    #[test]
    fn test_known_payload() {
        let payload = "1r34LbKcu72TZL b7XyQx ZL lcKQyX7bBLZ x ZL x ZL lcK LZ xB44T[4F7XyQZ ";
        assert_eq!(
            unscramble(payload),
            "[T44Bb7   | x  | x  | x  |Bb7   | x  | x  | x  |T24F7   Z "
        );
    }

    #[test]
    fn test_known_multi_block_payload() {
        let payload = "1r34LbKcu7BZL l4E-Xy-EZL lcKQyX-AZ Lx ZL x ZL lcKQXyQKc4TA*{ x ZLA-XyQ lcKQyXEB*[} U> eniF<lcKQyX-E|LZ x |QyX7 la .yQ|ppQyXE|QyX7A|QyXB7ZL lcKQyXEZL7A|<D.CX9AZLFine> x  Z ";
        assert_eq!(
            unscramble(payload),
            "{*AT44E-   | x  | x  | x  |A-   | x  |E-   | x  |B7   |A-   |E-   | x<Fine> U }[*BE   | x  | x  | x  |A9   |ppA7 |E   | x  |B7   |A7   |E   |<D.C. al Fine> x  Z "
        );
    }

    #[test]
    fn test_non_ascii_payload_does_not_panic() {
        let payload = format!("{}{}", MAGIC, "é♭ø°Δ".repeat(15));
        let decoded = unscramble(&payload);
        assert_eq!(decoded.chars().count(), 75);
    }
}
