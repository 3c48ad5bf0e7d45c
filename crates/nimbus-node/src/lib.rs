// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Nimbus Node
//!
//! The sensing node's control loop and the device wrappers it sequences:
//!
//! - [`FrameSource`] - image sensor, readiness-gated frame access
//! - [`InferenceEngine`] - accelerator, interrupt-driven completion
//! - [`RadioReporter`] - LoRa reset/configure/send with a bounded ack wait
//! - [`DutyCycleController`] - the capture, infer and transmit state machine
//!
//! Feature extraction and classification live in `nimbus-neural`; device
//! traits and the simulated board in `nimbus-hal`.
//!
//! ```no_run
//! use nimbus_config::NimbusConfig;
//! use nimbus_hal::sim::{SimBoard, SimConfig};
//! use nimbus_node::{DutyCycleController, NodeSettings};
//!
//! let settings = NodeSettings::from_config(&NimbusConfig::default()).unwrap();
//! let (peripherals, handles) = SimBoard::build(SimConfig::default());
//! handles.wake.fire_n(3);
//!
//! let mut node = DutyCycleController::new(peripherals, settings);
//! let results = node.run_cycles(3).unwrap();
//! assert_eq!(results.len(), 3);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod frame_source;
pub mod frames;
pub mod inference_engine;
pub mod model;
pub mod radio_reporter;
pub mod settings;
pub mod state;

pub use controller::DutyCycleController;
pub use diagnostics::Diagnostics;
pub use error::{NodeError, RadioError, Result};
pub use frame_source::{FrameReady, FrameSource};
pub use inference_engine::{InferenceDone, InferenceEngine, InferenceRunning};
pub use model::{input_geometry, validate_model, AcceleratorShape, NUM_CLASSES};
pub use radio_reporter::{RadioPayload, RadioReporter, RadioTiming, TxOutcome, PAYLOAD_LEN};
pub use settings::{NodeSettings, SensorSettings};
pub use state::{CycleObserver, CycleState};
