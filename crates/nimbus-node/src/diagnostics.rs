// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Serial diagnostic output
//!
//! Line-oriented text on the board's console. Per cycle, optionally:
//!
//! ```text
//! [  65536] -> Class 0 cirrus: 0.0%        (print_scores)
//! Start                                    (dump_features)
//! stratus                                  (always: index or label)
//! 7F, 80, 81, ...                          (dump_features, 16 per line)
//! Create New File                          (dump_features)
//! ```
//!
//! The `Start` / hex / `Create New File` framing is what the host-side
//! `frame_decoder` tool parses. Console failures are logged and ignored.

use nimbus_config::{DiagnosticsConfig, ReportMode};
use nimbus_hal::SerialIO;
use nimbus_neural::{ClassificationResult, FeatureTensor, ProbabilityVector, ScoreVector};
use tracing::warn;

/// Opens a feature dump block
pub const DUMP_START: &str = "Start";
/// Closes a feature dump block
pub const DUMP_END: &str = "Create New File";
/// Hex values per dump line
pub const DUMP_VALUES_PER_LINE: usize = 16;

/// `[%7d] -> Class %d %s: %d.%d%%` for every class
pub fn score_lines<const N: usize>(
    scores: &ScoreVector<N>,
    probabilities: &ProbabilityVector<N>,
    labels: &[String],
) -> Vec<String> {
    scores
        .as_slice()
        .iter()
        .zip(probabilities.confidences())
        .enumerate()
        .map(|(i, (score, confidence))| {
            let label = labels.get(i).map(String::as_str).unwrap_or("?");
            format!("[{:7}] -> Class {} {}: {}", score, i, label, confidence)
        })
        .collect()
}

/// Winning class as an index or a label
pub fn result_line(result: &ClassificationResult, labels: &[String], mode: ReportMode) -> String {
    match (mode, labels.get(result.class_index)) {
        (ReportMode::Label, Some(label)) => label.clone(),
        _ => result.class_index.to_string(),
    }
}

/// Grayscale view of the tensor as `XX, ` separated hex, 16 values per line
pub fn feature_dump_lines(tensor: &FeatureTensor) -> Vec<String> {
    let gray: Vec<u8> = tensor.grayscale().collect();
    let chunks = gray.chunks(DUMP_VALUES_PER_LINE);
    let last = chunks.len().saturating_sub(1);
    chunks
        .enumerate()
        .map(|(n, chunk)| {
            let mut line = chunk
                .iter()
                .map(|v| format!("{:02X}", v))
                .collect::<Vec<_>>()
                .join(", ");
            if n != last {
                line.push_str(", ");
            }
            line
        })
        .collect()
}

/// Writes one cycle's diagnostics to the console
pub struct Diagnostics<S: SerialIO> {
    serial: S,
    config: DiagnosticsConfig,
    labels: Vec<String>,
}

impl<S: SerialIO> Diagnostics<S> {
    pub fn new(serial: S, config: DiagnosticsConfig, labels: Vec<String>) -> Self {
        Self {
            serial,
            config,
            labels,
        }
    }

    /// Free-form console line
    pub fn line(&mut self, text: &str) {
        if let Err(e) = self.serial.write_line(text) {
            warn!(target: "nimbus-node", "console write failed: {}", e);
        }
    }

    pub fn report<const N: usize>(
        &mut self,
        scores: &ScoreVector<N>,
        probabilities: &ProbabilityVector<N>,
        result: &ClassificationResult,
        tensor: &FeatureTensor,
    ) {
        if self.config.print_scores {
            for line in score_lines(scores, probabilities, &self.labels) {
                self.line(&line);
            }
        }

        let dump = self.config.dump_features;
        if dump {
            self.line(DUMP_START);
        }
        let text = result_line(result, &self.labels, self.config.report);
        self.line(&text);
        if dump {
            for line in feature_dump_lines(tensor) {
                self.line(&line);
            }
            self.line(DUMP_END);
        }

        if let Err(e) = self.serial.flush() {
            warn!(target: "nimbus-node", "console flush failed: {}", e);
        }
    }
}
