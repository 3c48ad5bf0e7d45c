// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for geometry checks

use thiserror::Error;

/// Errors raised when buffers or frames do not match the model input.
///
/// These are only produced by the explicit `check_*` helpers, which the node
/// calls once at startup. The per-cycle extraction path never checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NeuralError {
    #[error("frame is {actual_width}x{actual_height}, model expects {expected_width}x{expected_height}")]
    ResolutionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("frame buffer holds {actual} bytes, {expected} needed")]
    FrameTooShort { expected: usize, actual: usize },

    #[error("unsupported pixel stride {0} (expected 3 or 4 bytes per pixel)")]
    UnsupportedPixelStride(u8),

    #[error("tensor holds {actual} elements, model expects {expected}")]
    TensorLengthMismatch { expected: usize, actual: usize },
}

/// Result type for neural helpers
pub type Result<T> = core::result::Result<T, NeuralError>;
