// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Score vector → winning class

use crate::softmax::softmax_q17p14_q15;
use crate::types::{ClassificationResult, Confidence, ProbabilityVector, ScoreVector};

/// Index of the largest value. Ties go to the lowest index.
///
/// Returns `0` for an empty slice.
///
/// # Example
/// ```
/// use nimbus_neural::argmax_first;
///
/// assert_eq!(argmax_first(&[0x4000, 0x4000, 0, 0]), 0);
/// assert_eq!(argmax_first(&[1, 5, 5, 2]), 1);
/// ```
pub fn argmax_first(values: &[i16]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Softmax followed by argmax over the probabilities.
///
/// The probabilities are returned too so diagnostics can report every class.
pub fn classify<const N: usize>(
    scores: &ScoreVector<N>,
) -> (ProbabilityVector<N>, ClassificationResult) {
    let probabilities = softmax_q17p14_q15(scores);
    let result = pick(&probabilities);
    (probabilities, result)
}

fn pick<const N: usize>(probabilities: &ProbabilityVector<N>) -> ClassificationResult {
    let class_index = argmax_first(probabilities.as_slice());
    let probability = probabilities.as_slice().get(class_index).copied().unwrap_or(0);
    ClassificationResult {
        class_index,
        probability,
        confidence: Confidence::from_q15(probability),
    }
}

/// Classifier for an `N`-class model, holding the last probability vector
#[derive(Debug, Clone, Default)]
pub struct Classifier<const N: usize> {
    probabilities: ProbabilityVector<N>,
}

impl<const N: usize> Classifier<N> {
    pub const NUM_CLASSES: usize = N;

    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one cycle's scores, overwriting the stored probabilities
    pub fn classify(&mut self, scores: &ScoreVector<N>) -> ClassificationResult {
        self.probabilities = softmax_q17p14_q15(scores);
        pick(&self.probabilities)
    }

    /// Probabilities from the most recent [`Classifier::classify`] call
    pub fn probabilities(&self) -> &ProbabilityVector<N> {
        &self.probabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::softmax::SCORE_FRAC_BITS;

    const ONE: i32 = 1 << SCORE_FRAC_BITS;

    #[test]
    fn test_argmax_tie_first_wins() {
        assert_eq!(argmax_first(&[0x4000, 0x4000, 0, 0]), 0);
        assert_eq!(argmax_first(&[0, 7, 7, 7]), 1);
    }

    #[test]
    fn test_argmax_last_element() {
        assert_eq!(argmax_first(&[-3, -2, -1, 0]), 3);
    }

    #[test]
    fn test_argmax_empty() {
        assert_eq!(argmax_first(&[]), 0);
    }

    #[test]
    fn test_classify_tied_leaders() {
        let (probs, result) = classify(&ScoreVector([2 * ONE, 2 * ONE, -30 * ONE, -30 * ONE]));
        assert_eq!(probs.0, [0x4000, 0x4000, 0, 0]);
        assert_eq!(result.class_index, 0);
        assert_eq!(result.probability, 0x4000);
        assert_eq!(result.confidence.tenths_of_percent(), 500);
        assert_eq!(result.confidence.to_string(), "50.0%");
    }

    #[test]
    fn test_classify_dominant_last_class() {
        let (_, result) = classify(&ScoreVector([0, 0, 0, 40 * ONE]));
        assert_eq!(result.class_index, 3);
        assert_eq!(result.confidence.to_string(), "100.0%");
    }

    #[test]
    fn test_classifier_keeps_latest_probabilities() {
        let mut classifier = Classifier::<4>::new();
        classifier.classify(&ScoreVector([40 * ONE, 0, 0, 0]));
        let result = classifier.classify(&ScoreVector([0, 40 * ONE, 0, 0]));
        assert_eq!(result.class_index, 1);
        assert_eq!(classifier.probabilities().0, [0, i16::MAX, 0, 0]);
        assert_eq!(Classifier::<4>::NUM_CLASSES, 4);
    }
}
