// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Board implementations
///
/// Each board module implements the HAL traits defined in `crate::hal`.
///
/// Available boards:
/// - `sim` - threads and condition variables standing in for interrupts

#[cfg(feature = "sim")]
pub mod sim;
