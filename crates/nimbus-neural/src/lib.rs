// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Nimbus Neural (Platform-Agnostic Numerics)
//!
//! Everything the node computes on the CPU between hardware stages:
//! - **Types**: frames, feature tensors, score/probability vectors, results
//! - **Features**: frame → accelerator input layout (luma or packed RGB)
//! - **Softmax**: accelerator-compatible Q17.14 → Q15 fixed-point softmax
//! - **Classifier**: argmax with first-max-wins tie-break and confidence
//!
//! Nothing in this crate touches hardware, blocks, or logs. All functions are
//! deterministic and write into caller-owned buffers so the node can reuse
//! the same storage every duty cycle.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod classifier;
pub mod error;
pub mod features;
pub mod softmax;
pub mod types;

pub use classifier::{argmax_first, classify, Classifier};
pub use error::{NeuralError, Result};
pub use features::{luma_pixel, pack_pixel, FeatureExtractor, PACKED_BIAS_XOR};
pub use softmax::{softmax_q17p14_q15, softmax_q17p14_q15_into};
pub use types::{
    ClassificationResult, Confidence, FeatureTensor, Frame, InputGeometry, InputVariant,
    ProbabilityVector, Rgb, ScoreVector, Q15_ONE,
};
