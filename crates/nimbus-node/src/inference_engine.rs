// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Accelerator wrapper
//!
//! The completion signal belongs to the engine: the interrupt handler it
//! installs sets an atomic flag, and only [`InferenceEngine::await_completion`]
//! reads it. Scores can only be unloaded with the [`InferenceDone`] token
//! that call returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nimbus_hal::{AcceleratorClock, CnnAccelerator, PowerManager};
use nimbus_neural::{FeatureTensor, ScoreVector};
use tracing::{debug, trace};

use crate::error::{NodeError, Result};
use crate::model::AcceleratorShape;

/// An inference has been started and not yet awaited
#[derive(Debug)]
#[must_use = "a started inference must be awaited"]
pub struct InferenceRunning {
    _private: (),
}

/// The completion interrupt for the last started inference has fired
#[derive(Debug)]
#[must_use = "a finished inference should be unloaded"]
pub struct InferenceDone {
    _private: (),
}

/// CNN accelerator plus its completion signal
pub struct InferenceEngine<A: CnnAccelerator> {
    accelerator: A,
    completion: Arc<AtomicBool>,
    clock: AcceleratorClock,
    divider: u8,
}

impl<A: CnnAccelerator> InferenceEngine<A> {
    pub fn new(accelerator: A, clock: AcceleratorClock, divider: u8) -> Self {
        Self {
            accelerator,
            completion: Arc::new(AtomicBool::new(false)),
            clock,
            divider,
        }
    }

    /// Power the accelerator, load the network and install the interrupt
    /// handler. Runs once at boot.
    pub fn bring_up(&mut self) -> Result<()> {
        let accelerator = &mut self.accelerator;
        accelerator
            .enable(self.clock, self.divider)
            .map_err(NodeError::accelerator)?;
        accelerator.init().map_err(NodeError::accelerator)?;
        accelerator.load_weights().map_err(NodeError::accelerator)?;
        accelerator.load_bias().map_err(NodeError::accelerator)?;
        accelerator.configure().map_err(NodeError::accelerator)?;

        let flag = Arc::clone(&self.completion);
        accelerator.set_completion_handler(Arc::new(move || flag.store(true, Ordering::Release)));

        debug!(
            target: "nimbus-node",
            "accelerator {} ready ({} input words, {} outputs)",
            accelerator.name(),
            accelerator.input_words(),
            accelerator.output_len()
        );
        Ok(())
    }

    pub fn shape(&self) -> AcceleratorShape {
        AcceleratorShape {
            input_words: self.accelerator.input_words(),
            output_len: self.accelerator.output_len(),
        }
    }

    pub fn accelerator(&self) -> &A {
        &self.accelerator
    }

    /// Push the tensor through the input FIFO, one word at a time
    pub fn load_input(&mut self, tensor: &FeatureTensor) {
        let mut stalls = 0u32;
        for word in tensor.words() {
            while self.accelerator.input_fifo_full() {
                stalls += 1;
                std::hint::spin_loop();
            }
            self.accelerator.write_input(word);
        }
        trace!(
            target: "nimbus-node",
            "loaded {} input words ({} FIFO stalls)",
            tensor.word_count(),
            stalls
        );
    }

    /// Start inference on the loaded input. Returns immediately.
    pub fn start(&mut self) -> InferenceRunning {
        self.completion.store(false, Ordering::Release);
        self.accelerator.start();
        InferenceRunning { _private: () }
    }

    /// Sleep until the completion interrupt has fired. No timeout.
    pub fn await_completion<P: PowerManager>(
        &self,
        running: InferenceRunning,
        power: &P,
    ) -> InferenceDone {
        let InferenceRunning { .. } = running;
        while !self.completion.load(Ordering::Acquire) {
            power.wait_for_interrupt();
        }
        InferenceDone { _private: () }
    }

    /// Copy out the class scores and stop the accelerator clock
    pub fn unload<const N: usize>(&mut self, done: InferenceDone, scores: &mut ScoreVector<N>) {
        let InferenceDone { .. } = done;
        self.accelerator.unload(scores.as_mut_slice());
        self.accelerator.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use nimbus_hal::sim::{SimBoard, SimConfig, SimModel, TraceEvent};

    fn board(latency: Duration) -> (nimbus_hal::Peripherals<SimBoard>, nimbus_hal::sim::SimHandles) {
        SimBoard::build(SimConfig {
            model: SimModel::fixed(40, vec![1 << 14, 2 << 14, 3 << 14, 4 << 14]),
            inference_latency: latency,
            ..SimConfig::default()
        })
    }

    #[test]
    fn test_full_inference_round() {
        let (p, handles) = board(Duration::from_millis(5));
        let mut engine = InferenceEngine::new(p.accelerator, AcceleratorClock::Pclk, 1);
        engine.bring_up().unwrap();
        assert_eq!(
            engine.shape(),
            AcceleratorShape {
                input_words: 40,
                output_len: 4
            }
        );

        let tensor = FeatureTensor::PackedRgb((0..40).collect());
        engine.load_input(&tensor);
        let running = engine.start();
        let done = engine.await_completion(running, &p.platform);

        let mut scores = ScoreVector::<4>::default();
        engine.unload(done, &mut scores);
        assert_eq!(scores.0, [1 << 14, 2 << 14, 3 << 14, 4 << 14]);

        let events = handles.trace.snapshot();
        assert!(events.contains(&TraceEvent::AcceleratorStart { words: 40 }));
        assert!(events.contains(&TraceEvent::AcceleratorUnload { completed: true }));
    }

    #[test]
    fn test_await_blocks_until_completion_signal() {
        let latency = Duration::from_millis(30);
        let (p, handles) = board(latency);
        let mut engine = InferenceEngine::new(p.accelerator, AcceleratorClock::Pclk, 1);
        engine.bring_up().unwrap();

        engine.load_input(&FeatureTensor::PackedRgb(vec![0; 40]));
        let started = std::time::Instant::now();
        let running = engine.start();
        let done = engine.await_completion(running, &p.platform);
        handles.trace.marker("awaited");

        assert!(started.elapsed() >= latency);
        let events = handles.trace.snapshot();
        let complete = events.iter().position(|e| *e == TraceEvent::AcceleratorComplete);
        let awaited = events.iter().position(|e| *e == TraceEvent::Marker("awaited"));
        assert!(complete.is_some() && complete < awaited);

        let mut scores = ScoreVector::<4>::default();
        engine.unload(done, &mut scores);
    }

    #[test]
    fn test_bring_up_rejects_zero_divider() {
        let (p, _) = board(Duration::from_millis(1));
        let mut engine = InferenceEngine::new(p.accelerator, AcceleratorClock::Ipo, 0);
        assert!(matches!(engine.bring_up(), Err(NodeError::Accelerator(_))));
    }
}
