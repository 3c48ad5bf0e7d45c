// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nimbus_neural::{InputGeometry, InputVariant};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::interrupt::InterruptLine;
use super::trace::{TraceEvent, TraceRecorder};
use super::SimError;
use crate::hal::{AcceleratorClock, CnnAccelerator, CompletionHandler};

/// Scoring function standing in for the network: input words → Q17.14 scores
pub type ScoreFn = Arc<dyn Fn(&[u32]) -> Vec<i32> + Send + Sync + 'static>;

/// The "network" the simulated accelerator runs
#[derive(Clone)]
pub struct SimModel {
    pub input_words: usize,
    pub output_len: usize,
    pub score: ScoreFn,
}

impl std::fmt::Debug for SimModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimModel")
            .field("input_words", &self.input_words)
            .field("output_len", &self.output_len)
            .finish_non_exhaustive()
    }
}

impl SimModel {
    /// Always returns `scores`
    pub fn fixed(input_words: usize, scores: Vec<i32>) -> Self {
        let output_len = scores.len();
        Self {
            input_words,
            output_len,
            score: Arc::new(move |_| scores.clone()),
        }
    }

    /// Picks a class from mean brightness: darkest input → class 0,
    /// brightest → last class. The winner scores 8.0, the rest 0.
    pub fn brightness(geometry: InputGeometry, classes: usize) -> Self {
        let variant = geometry.variant;
        Self {
            input_words: geometry.word_count(),
            output_len: classes,
            score: Arc::new(move |words| {
                let (sum, count) = brightness_sum(variant, words);
                let mean = if count == 0 { 0 } else { sum / count };
                let class = (mean as usize * classes / 256).min(classes.saturating_sub(1));
                let mut scores = vec![0; classes];
                if let Some(s) = scores.get_mut(class) {
                    *s = 8 << 14;
                }
                scores
            }),
        }
    }
}

/// Sum of unsigned (0..=255) brightness values and their count
fn brightness_sum(variant: InputVariant, words: &[u32]) -> (u64, u64) {
    match variant {
        InputVariant::Luma => {
            let sum = words
                .iter()
                .flat_map(|w| w.to_le_bytes())
                .map(|b| u64::from(b ^ 0x80))
                .sum();
            (sum, words.len() as u64 * 4)
        }
        InputVariant::PackedRgb => {
            let sum = words
                .iter()
                .map(|w| w ^ nimbus_neural::PACKED_BIAS_XOR)
                .map(|w| {
                    let [r, g, b, _] = w.to_le_bytes();
                    (u64::from(r) + u64::from(g) + u64::from(b)) / 3
                })
                .sum();
            (sum, words.len() as u64)
        }
    }
}

/// Accelerator whose completion interrupt fires from a worker thread
pub struct SimAccelerator {
    model: SimModel,
    latency: Duration,
    trace: TraceRecorder,
    irq: Arc<InterruptLine>,
    handler: Option<CompletionHandler>,
    enabled: bool,
    ready: bool,
    input: Vec<u32>,
    fifo_stall: Cell<bool>,
    scores: Arc<Mutex<Vec<i32>>>,
    done: Arc<AtomicBool>,
}

impl SimAccelerator {
    pub(crate) fn new(
        model: SimModel,
        latency: Duration,
        trace: TraceRecorder,
        irq: Arc<InterruptLine>,
    ) -> Self {
        Self {
            model,
            latency,
            trace,
            irq,
            handler: None,
            enabled: false,
            ready: false,
            input: Vec::new(),
            fifo_stall: Cell::new(false),
            scores: Arc::new(Mutex::new(Vec::new())),
            done: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CnnAccelerator for SimAccelerator {
    type Error = SimError;

    fn name(&self) -> &'static str {
        "sim-cnn"
    }

    fn enable(&mut self, clock: AcceleratorClock, divider: u8) -> Result<(), SimError> {
        if divider == 0 {
            return Err(SimError::SetupRejected {
                device: "accelerator",
                reason: "clock divider must be non-zero".to_string(),
            });
        }
        debug!(target: "nimbus-hal", "[SIM] accelerator enabled ({:?} / {})", clock, divider);
        self.enabled = true;
        Ok(())
    }

    fn init(&mut self) -> Result<(), SimError> {
        if !self.enabled {
            return Err(SimError::NotInitialized("accelerator clock"));
        }
        Ok(())
    }

    fn load_weights(&mut self) -> Result<(), SimError> {
        self.init()
    }

    fn load_bias(&mut self) -> Result<(), SimError> {
        self.init()
    }

    fn configure(&mut self) -> Result<(), SimError> {
        self.init()?;
        self.ready = true;
        Ok(())
    }

    fn set_completion_handler(&mut self, handler: CompletionHandler) {
        self.handler = Some(handler);
    }

    fn input_words(&self) -> usize {
        self.model.input_words
    }

    fn output_len(&self) -> usize {
        self.model.output_len
    }

    fn input_fifo_full(&self) -> bool {
        // Report full once after every 16 words so callers exercise the spin
        self.fifo_stall.replace(false)
    }

    fn write_input(&mut self, word: u32) {
        if self.input.is_empty() {
            self.trace.record(TraceEvent::AcceleratorInputBegin);
        }
        self.input.push(word);
        if self.input.len() % 16 == 0 {
            self.fifo_stall.set(true);
        }
    }

    fn start(&mut self) {
        if !self.ready {
            warn!(target: "nimbus-hal", "[SIM] accelerator started before configure");
        }
        let input = std::mem::take(&mut self.input);
        self.trace.record(TraceEvent::AcceleratorStart { words: input.len() });
        let scores = (self.model.score)(&input);

        self.done.store(false, Ordering::Release);
        let done = Arc::clone(&self.done);
        let out = Arc::clone(&self.scores);
        let trace = self.trace.clone();
        let irq = Arc::clone(&self.irq);
        let handler = self.handler.clone();
        let latency = self.latency;
        thread::spawn(move || {
            thread::sleep(latency);
            *out.lock() = scores;
            done.store(true, Ordering::Release);
            trace.record(TraceEvent::AcceleratorComplete);
            if let Some(handler) = handler {
                handler();
            }
            irq.raise();
        });
    }

    fn stop(&mut self) {
        debug!(target: "nimbus-hal", "[SIM] accelerator stopped");
    }

    fn unload(&mut self, scores: &mut [i32]) {
        let completed = self.done.load(Ordering::Acquire);
        self.trace.record(TraceEvent::AcceleratorUnload { completed });
        let out = self.scores.lock();
        for (slot, value) in scores.iter_mut().zip(out.iter()) {
            *slot = *value;
        }
    }
}
