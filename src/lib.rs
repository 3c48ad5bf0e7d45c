// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Nimbus - edge sensing node
//!
//! A battery-powered node that wakes, captures a frame, runs a small CNN on
//! an on-chip accelerator, reports the winning class over LoRa and sleeps
//! again. This crate re-exports the workspace members.
//!
//! ## Feature Flags
//!
//! - **`node`** (default): duty-cycle controller and node binary
//! - **`sim`**: host-side simulated board
//! - **`file-logging`**: per-run JSON log files
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Numerics: nimbus-neural                                │
//! │  (frames, feature extraction, softmax, classifier)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Platform: nimbus-hal                                   │
//! │  (camera, accelerator, radio, GPIO, power traits + sim) │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application: nimbus-node                               │
//! │  (device sequencing, duty-cycle state machine)          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Configuration (`nimbus-config`) and logging (`nimbus-observability`) are
//! shared by every layer above the numerics.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nimbus::prelude::*;
//! use nimbus::hal::sim::{SimBoard, SimConfig};
//!
//! let settings = NodeSettings::from_config(&NimbusConfig::default())?;
//! let (peripherals, handles) = SimBoard::build(SimConfig::default());
//! handles.wake.fire();
//!
//! let mut node = DutyCycleController::new(peripherals, settings);
//! let result = node.run_cycles(1)?;
//! println!("class {}", result[0].class_index);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use nimbus_config as config;
pub use nimbus_hal as hal;
pub use nimbus_neural as neural;
pub use nimbus_observability as observability;

#[cfg(feature = "node")]
pub use nimbus_node as node;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, NimbusConfig};
    pub use crate::neural::{
        ClassificationResult, Classifier, FeatureExtractor, FeatureTensor, InputGeometry,
    };

    #[cfg(feature = "node")]
    pub use crate::node::{CycleState, DutyCycleController, NodeError, NodeSettings};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let config = NimbusConfig::default();
        assert_eq!(config.model.class_labels.len(), 4);
    }
}
