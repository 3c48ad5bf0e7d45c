// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Duty-cycle controller
//!
//! Owns every device of a [`Board`] and runs the capture, infer and
//! transmit loop:
//!
//! ```text
//! INIT → CAPTURING → EXTRACTING → INFERRING → CLASSIFYING → TRANSMITTING → SLEEPING
//!             ↑                                                               │
//!             └──────────────────────── wake edge ────────────────────────────┘
//! ```
//!
//! Only one of capture, inference and transmission is ever in flight. The
//! sensor is powered down as soon as its frame is complete, before anything
//! is written to the accelerator. Frame, tensor and score buffers are
//! allocated once and reused every cycle.
//!
//! Faults (sensor setup, streaming overflow, model mismatch) come back as
//! [`NodeError`]; the caller reports them with
//! [`DutyCycleController::halt`]. Radio failures are logged and the cycle
//! carries on.

use std::convert::Infallible;

use nimbus_hal::{Board, GpioProvider, Peripherals, Platform, PowerManager, TimeProvider};
use nimbus_neural::{
    ClassificationResult, Classifier, FeatureExtractor, FeatureTensor, InputGeometry,
    ProbabilityVector, ScoreVector,
};
use tracing::{debug, error, info, warn};

use crate::diagnostics::Diagnostics;
use crate::error::{NodeError, Result};
use crate::frame_source::{FrameReady, FrameSource};
use crate::inference_engine::{InferenceDone, InferenceEngine};
use crate::model::{input_geometry, validate_model, NUM_CLASSES};
use crate::radio_reporter::{RadioPayload, RadioReporter};
use crate::settings::NodeSettings;
use crate::state::{CycleObserver, CycleState};

type PinOf<B> = <<B as Board>::Gpio as GpioProvider>::Pin;

/// The node's single thread of control
pub struct DutyCycleController<B: Board> {
    frames: FrameSource<B::Camera>,
    engine: InferenceEngine<B::Accelerator>,
    reporter: RadioReporter<B::Radio, PinOf<B>>,
    diagnostics: Diagnostics<B::Serial>,
    gpio: B::Gpio,
    platform: B::Platform,
    fault_led: PinOf<B>,
    settings: NodeSettings,
    extractor: FeatureExtractor,
    tensor: FeatureTensor,
    scores: ScoreVector<NUM_CLASSES>,
    classifier: Classifier<NUM_CLASSES>,
    state: CycleState,
    cycles: u64,
    geometry_checked: bool,
    observer: Option<Box<dyn CycleObserver>>,
}

impl<B: Board> DutyCycleController<B> {
    /// Take ownership of the board. No device is touched until
    /// [`DutyCycleController::init`].
    pub fn new(peripherals: Peripherals<B>, settings: NodeSettings) -> Self {
        let Peripherals {
            camera,
            accelerator,
            radio,
            gpio,
            serial,
            platform,
            pins,
        } = peripherals;

        let extractor = FeatureExtractor::new(input_geometry(settings.input_layout));
        Self {
            frames: FrameSource::new(camera, settings.sensor),
            engine: InferenceEngine::new(
                accelerator,
                settings.accelerator_clock,
                settings.accelerator_divider,
            ),
            reporter: RadioReporter::new(radio, pins.radio_reset, settings.tx, settings.radio_timing),
            diagnostics: Diagnostics::new(
                serial,
                settings.diagnostics.clone(),
                settings.labels.clone(),
            ),
            gpio,
            platform,
            fault_led: pins.fault_led,
            tensor: extractor.allocate(),
            extractor,
            settings,
            scores: ScoreVector::default(),
            classifier: Classifier::new(),
            state: CycleState::Init,
            cycles: 0,
            geometry_checked: false,
            observer: None,
        }
    }

    /// Call `observer` on every state entry
    pub fn set_observer<O: CycleObserver + 'static>(&mut self, observer: O) {
        self.observer = Some(Box::new(observer));
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn platform(&self) -> &B::Platform {
        &self.platform
    }

    pub fn geometry(&self) -> &InputGeometry {
        self.extractor.geometry()
    }

    /// Scores of the most recent cycle
    pub fn scores(&self) -> &ScoreVector<NUM_CLASSES> {
        &self.scores
    }

    /// Probabilities of the most recent cycle
    pub fn probabilities(&self) -> &ProbabilityVector<NUM_CLASSES> {
        self.classifier.probabilities()
    }

    fn enter(&mut self, state: CycleState) {
        debug_assert!(
            state == CycleState::Init || self.state.next() == state,
            "illegal transition {} -> {}",
            self.state,
            state
        );
        self.state = state;
        debug!(target: "nimbus-node", "→ {}", state);
        if let Some(observer) = self.observer.as_mut() {
            observer.on_state(state);
        }
    }

    /// INIT: bring up the accelerator, check the model, power and configure
    /// the sensor, start the first capture.
    pub fn init(&mut self) -> Result<()> {
        self.enter(CycleState::Init);
        info!(
            target: "nimbus-node",
            "initialising on {} ({} MHz)",
            self.platform.name(),
            self.platform.cpu_frequency_hz() / 1_000_000
        );

        self.engine.bring_up()?;
        let geometry = validate_model(&self.settings, self.engine.shape())?;
        self.tensor.check_against(&geometry)?;

        self.frames.power_on()?;
        self.frames.configure()?;
        self.platform.delay_ms(self.settings.sensor.power_up_delay_ms);
        self.frames.start_capture();

        info!(
            target: "nimbus-node",
            "ready: {}x{} {} input, {} classes",
            geometry.width,
            geometry.height,
            geometry.variant,
            NUM_CLASSES
        );
        Ok(())
    }

    /// One pass from CAPTURING through SLEEPING. Returns after the next wake
    /// edge, with the following capture already started.
    pub fn run_cycle(&mut self) -> Result<ClassificationResult> {
        let ready = self.capture()?;
        self.extract(ready)?;
        let done = self.infer();
        let result = self.classify(done);
        self.transmit(&result);
        self.cycles += 1;
        self.sleep()?;
        Ok(result)
    }

    /// INIT followed by `count` cycles. Consumes `count` wake edges.
    pub fn run_cycles(&mut self, count: u64) -> Result<Vec<ClassificationResult>> {
        self.init()?;
        (0..count).map(|_| self.run_cycle()).collect()
    }

    /// INIT followed by cycles forever. Only returns on a fault.
    pub fn run(&mut self) -> Result<Infallible> {
        self.init()?;
        loop {
            self.run_cycle()?;
        }
    }

    /// CAPTURING: wait for the frame, then power the sensor down
    fn capture(&mut self) -> Result<FrameReady> {
        self.enter(CycleState::Capturing);
        let ready = self.frames.wait_ready(&self.platform);
        self.frames.check_overflow()?;
        self.frames.power_off()?;
        Ok(ready)
    }

    /// EXTRACTING: frame → tensor, in place
    fn extract(&mut self, ready: FrameReady) -> Result<()> {
        self.enter(CycleState::Extracting);
        let frame = self.frames.read_frame(ready);
        if !self.geometry_checked {
            frame.check_against(self.extractor.geometry())?;
            self.geometry_checked = true;
        }
        self.extractor.extract(&frame, &mut self.tensor);
        Ok(())
    }

    /// INFERRING: load, start, sleep until the completion interrupt
    fn infer(&mut self) -> InferenceDone {
        self.enter(CycleState::Inferring);
        self.engine.load_input(&self.tensor);
        let running = self.engine.start();
        self.engine.await_completion(running, &self.platform)
    }

    /// CLASSIFYING: unload scores, softmax, argmax
    fn classify(&mut self, done: InferenceDone) -> ClassificationResult {
        self.enter(CycleState::Classifying);
        self.engine.unload(done, &mut self.scores);
        let result = self.classifier.classify(&self.scores);
        info!(
            target: "nimbus-node",
            "cycle {}: class {} ({}) {}",
            self.cycles + 1,
            result.class_index,
            self.settings
                .labels
                .get(result.class_index)
                .map(String::as_str)
                .unwrap_or("?"),
            result.confidence
        );
        self.diagnostics.report(
            &self.scores,
            self.classifier.probabilities(),
            &result,
            &self.tensor,
        );
        result
    }

    /// TRANSMITTING: report over LoRa; failures are not fatal
    fn transmit(&mut self, result: &ClassificationResult) {
        self.enter(CycleState::Transmitting);
        let payload = RadioPayload::new(result.class_index, self.settings.payload_suffix);
        if let Err(e) = self.reporter.report(&mut self.gpio, &self.platform, &payload) {
            warn!(target: "nimbus-node", "radio report failed, continuing: {}", e);
        }
    }

    /// SLEEPING: low-power wait for the wake edge, then restart the sensor
    fn sleep(&mut self) -> Result<()> {
        self.enter(CycleState::Sleeping);
        self.platform.sleep_until_wake();
        debug!(target: "nimbus-node", "woke after cycle {}", self.cycles);

        self.frames.power_on()?;
        self.frames.configure()?;
        self.platform.delay_ms(self.settings.sensor.power_up_delay_ms);
        self.frames.start_capture();
        Ok(())
    }

    /// Log the fault and light the indicator. Does not halt.
    pub fn signal_fault(&mut self, fault: &NodeError) {
        error!(target: "nimbus-node", "fatal fault in {}: {}", self.state, fault);
        if let Err(e) = self.gpio.set_high(self.fault_led) {
            warn!(target: "nimbus-node", "could not light fault indicator: {}", e);
        }
    }

    /// Light the fault indicator and stop forever
    pub fn halt(&mut self, fault: &NodeError) -> ! {
        self.signal_fault(fault);
        self.platform.halt()
    }
}
