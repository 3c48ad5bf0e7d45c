// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-point softmax, Q17.14 scores → Q15 probabilities
//!
//! This is the accelerator toolchain's softmax, reproduced bit-for-bit. It
//! approximates `e^x` with `2^x` on each score rounded to an integer:
//!
//! 1. `base = max(scores) − 16.0` (in Q17.14, `16 << 14`)
//! 2. for every score above `base`: `sum += 1 << ((8192 + x − base) >> 14)`
//! 3. `out_base = 2^32 / sum`
//! 4. `p = sat16(out_base >> (17 + ((8191 + base − x) >> 14)))`, scores at
//!    or below `base` get `0`
//!
//! A single dominant score therefore yields `sat16(32768) = 32767`, and two
//! equal dominant scores yield `0x4000` each. Shifts are arithmetic, as on the
//! target.

use crate::types::{ProbabilityVector, ScoreVector};

/// Fractional bits of the accelerator's score format
pub const SCORE_FRAC_BITS: u32 = 14;

/// Scores more than this many integer units below the maximum contribute 0
const SOFTMAX_RANGE: i64 = 16;

/// Half of one Q17.14 unit, for round-to-nearest on the exponent
const HALF: i64 = 1 << (SCORE_FRAC_BITS - 1);

#[inline]
fn usat5(v: i64) -> u32 {
    v.clamp(0, 31) as u32
}

#[inline]
fn ssat16(v: i64) -> i16 {
    v.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Slice form of [`softmax_q17p14_q15`].
///
/// `probabilities` must be at least as long as `scores`; extra slots are left
/// untouched. Empty input is a no-op.
pub fn softmax_q17p14_q15_into(scores: &[i32], probabilities: &mut [i16]) {
    debug_assert!(probabilities.len() >= scores.len());

    let Some(max) = scores.iter().copied().max() else {
        return;
    };
    let base = i64::from(max) - (SOFTMAX_RANGE << SCORE_FRAC_BITS);

    let mut sum: i64 = 0;
    for &x in scores {
        let x = i64::from(x);
        if x > base {
            sum += 1i64 << usat5((HALF + x - base) >> SCORE_FRAC_BITS);
        }
    }

    // The maximum alone contributes 1 << 16, so sum is never zero here.
    let out_base = (1i64 << 32) / sum;

    for (&x, p) in scores.iter().zip(probabilities.iter_mut()) {
        let x = i64::from(x);
        *p = if x > base {
            let shift = usat5(17 + ((HALF - 1 + base - x) >> SCORE_FRAC_BITS));
            ssat16(out_base >> shift)
        } else {
            0
        };
    }
}

/// Softmax over a full score vector
///
/// # Example
/// ```
/// use nimbus_neural::{softmax_q17p14_q15, ScoreVector};
///
/// // Two tied leaders, two far below: each leader gets exactly 0.5 in Q15.
/// let scores = ScoreVector([10 << 14, 10 << 14, -(20 << 14), -(20 << 14)]);
/// let probs = softmax_q17p14_q15(&scores);
/// assert_eq!(probs.0, [0x4000, 0x4000, 0, 0]);
/// ```
pub fn softmax_q17p14_q15<const N: usize>(scores: &ScoreVector<N>) -> ProbabilityVector<N> {
    let mut out = ProbabilityVector::<N>::default();
    softmax_q17p14_q15_into(scores.as_slice(), out.as_mut_slice());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Q15_ONE;

    const ONE: i32 = 1 << SCORE_FRAC_BITS;

    #[test]
    fn test_single_dominant_class_saturates() {
        let probs = softmax_q17p14_q15(&ScoreVector([50 * ONE, 0, 0, 0]));
        assert_eq!(probs.0, [i16::MAX, 0, 0, 0]);
    }

    #[test]
    fn test_tied_leaders_split_evenly() {
        let probs = softmax_q17p14_q15(&ScoreVector([3 * ONE, 3 * ONE, -40 * ONE, -40 * ONE]));
        assert_eq!(probs.0, [0x4000, 0x4000, 0, 0]);
    }

    #[test]
    fn test_all_equal_scores() {
        let probs = softmax_q17p14_q15(&ScoreVector([ONE; 4]));
        assert_eq!(probs.0, [0x2000; 4]);
        assert_eq!(probs.total(), Q15_ONE);
    }

    #[test]
    fn test_one_unit_gap_halves_probability() {
        // 2^0 vs 2^-1: sum = 2^16 + 2^15, out_base = 2^32 / (3·2^15)
        let probs = softmax_q17p14_q15(&ScoreVector([2 * ONE, ONE]));
        let out_base = (1i64 << 32) / ((1 << 16) + (1 << 15));
        assert_eq!(i64::from(probs.0[0]), out_base >> 1);
        assert_eq!(i64::from(probs.0[1]), out_base >> 2);
        assert!(probs.0[0] > probs.0[1]);
    }

    #[test]
    fn test_scores_outside_window_are_zero() {
        // Exactly 16 units below the max sits on `base` and is excluded.
        let probs = softmax_q17p14_q15(&ScoreVector([16 * ONE, 0]));
        assert_eq!(probs.0[1], 0);
        let probs = softmax_q17p14_q15(&ScoreVector([16 * ONE, 1]));
        assert_eq!(probs.0[1], 0, "a sliver above base still rounds to zero");
    }

    #[test]
    fn test_extreme_scores_do_not_overflow() {
        let probs = softmax_q17p14_q15(&ScoreVector([i32::MAX, i32::MIN, 0, i32::MAX]));
        assert_eq!(probs.0, [0x4000, 0, 0, 0x4000]);
    }

    #[test]
    fn test_empty_input_is_noop() {
        let mut out: [i16; 0] = [];
        softmax_q17p14_q15_into(&[], &mut out);
    }

    #[test]
    fn test_sum_close_to_one() {
        let probs = softmax_q17p14_q15(&ScoreVector([
            5 * ONE + 1234,
            3 * ONE,
            4 * ONE + 9000,
            -2 * ONE,
        ]));
        let total = probs.total();
        assert!((Q15_ONE - total).abs() < Q15_ONE / 4, "total = {}", total);
    }
}
