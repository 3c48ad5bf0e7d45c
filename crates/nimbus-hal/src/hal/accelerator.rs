// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

/// Accelerator clock selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcceleratorClock {
    /// Peripheral clock
    Pclk,
    /// Internal primary oscillator
    Ipo,
}

/// Interrupt service routine invoked when inference completes.
///
/// Runs in interrupt context: it must only touch lock-free state.
pub type CompletionHandler = Arc<dyn Fn() + Send + Sync + 'static>;

/// CNN accelerator driver
///
/// Weights, bias and layer configuration are opaque to the node: the driver
/// knows the model it was built for.
pub trait CnnAccelerator {
    /// Platform-specific error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Human-readable accelerator name
    fn name(&self) -> &'static str;

    /// Power and clock the accelerator
    fn enable(&mut self, clock: AcceleratorClock, divider: u8) -> Result<(), Self::Error>;

    /// Reset and prepare the accelerator
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Load the kernel weights into accelerator memory
    fn load_weights(&mut self) -> Result<(), Self::Error>;

    /// Load the layer bias values
    fn load_bias(&mut self) -> Result<(), Self::Error>;

    /// Apply the layer configuration
    fn configure(&mut self) -> Result<(), Self::Error>;

    /// Install the completion interrupt handler. Replaces any previous one.
    fn set_completion_handler(&mut self, handler: CompletionHandler);

    /// Number of 32-bit input words the loaded model consumes
    fn input_words(&self) -> usize;

    /// Number of class scores the loaded model produces
    fn output_len(&self) -> usize;

    /// True while the input FIFO cannot accept another word
    fn input_fifo_full(&self) -> bool;

    /// Push one word into the input FIFO. Caller checks
    /// [`CnnAccelerator::input_fifo_full`] first.
    fn write_input(&mut self, word: u32);

    /// Start inference on the loaded input. Returns immediately.
    fn start(&mut self);

    /// Stop the accelerator clock after an inference
    fn stop(&mut self);

    /// Copy Q17.14 class scores out of accelerator memory
    fn unload(&mut self, scores: &mut [i32]);
}
